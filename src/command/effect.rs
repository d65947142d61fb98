use std::fmt;
use std::future::Future;
use std::time::Duration;

use futures_core::future::BoxFuture;
use thiserror::Error;

/// A deferred asynchronous unit of work that eventually yields a message.
///
/// Nothing runs until the runtime polls the future it spawns for it.
pub struct Effect<Msg> {
    future: BoxFuture<'static, Msg>,
}

impl<Msg: Send + 'static> Effect<Msg> {
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Msg> + Send + 'static,
    {
        Self {
            future: Box::pin(future),
        }
    }

    pub fn map<N, F>(self, f: F) -> Effect<N>
    where
        N: Send + 'static,
        F: FnOnce(Msg) -> N + Send + 'static,
    {
        let future = self.future;
        Effect::new(async move { f(future.await) })
    }

    pub fn into_future(self) -> BoxFuture<'static, Msg> {
        self.future
    }
}

impl<Msg> fmt::Debug for Effect<Msg> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Effect(..)")
    }
}

/// Outcome of [`with_timeout`] when the work did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EffectError<E> {
    #[error("effect failed: {0}")]
    Failed(E),

    #[error("effect timed out after {0:?}")]
    TimedOut(Duration),
}

/// Race `future` against a delay.
///
/// Timeouts are not part of the command algebra; an effect that needs one
/// wraps its work with this before handing it to `Command::from_effect`.
pub async fn with_timeout<F, T, E>(duration: Duration, future: F) -> Result<T, EffectError<E>>
where
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(duration, future).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(EffectError::Failed(err)),
        Err(_) => Err(EffectError::TimedOut(duration)),
    }
}
