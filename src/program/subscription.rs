use std::fmt;
use std::future::Future;
use std::time::Duration;

use futures_core::future::BoxFuture;

use crate::program::dispatch::Dispatch;

/// Key the runtime uses to tell whether a subscription is still wanted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(String);

impl SubscriptionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SubscriptionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SubscriptionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

const MIN_PERIOD: Duration = Duration::from_millis(1);

type Starter<Msg> = Box<dyn FnOnce(Dispatch<Msg>) -> BoxFuture<'static, ()> + Send>;

/// A long-running external event source.
///
/// Started once when its id first appears in a tier's subscription list and
/// cancelled when the id disappears or the tier is torn down.
pub struct Subscription<Msg> {
    id: SubscriptionId,
    start: Starter<Msg>,
}

impl<Msg: Send + 'static> Subscription<Msg> {
    pub fn new<F, Fut>(id: impl Into<SubscriptionId>, start: F) -> Self
    where
        F: FnOnce(Dispatch<Msg>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            id: id.into(),
            start: Box::new(move |dispatch| Box::pin(start(dispatch))),
        }
    }

    /// Emit `make()` every `period`, starting one period from now.
    /// Periods shorter than a millisecond are raised to one.
    pub fn every<F>(id: impl Into<SubscriptionId>, period: Duration, make: F) -> Self
    where
        F: Fn() -> Msg + Send + Sync + 'static,
    {
        let period = period.max(MIN_PERIOD);
        Self::new(id, move |dispatch| async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                dispatch.send(make());
            }
        })
    }

    pub fn id(&self) -> &SubscriptionId {
        &self.id
    }

    pub fn map<N, F>(self, f: F) -> Subscription<N>
    where
        N: Send + 'static,
        F: Fn(Msg) -> N + Send + Sync + 'static,
    {
        let start = self.start;
        Subscription {
            id: self.id,
            start: Box::new(move |dispatch: Dispatch<N>| start(dispatch.wrap(f))),
        }
    }

    pub(crate) fn start(self, dispatch: Dispatch<Msg>) -> BoxFuture<'static, ()> {
        (self.start)(dispatch)
    }
}

impl<Msg> fmt::Debug for Subscription<Msg> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Subscription").field(&self.id).finish()
    }
}
