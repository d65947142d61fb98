use futures_core::future::BoxFuture;
use tokio::runtime::Handle;

/// Where effects and subscriptions are run.
///
/// The runtime calls `spawn` synchronously at the point a command is
/// executed, so the order of `spawn` calls is the order effects were
/// initiated in.
pub trait EffectSpawner: Send + Sync {
    fn spawn(&self, task: BoxFuture<'static, ()>);
}

/// Spawns onto a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioSpawner {
    handle: Handle,
}

impl TokioSpawner {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// The runtime the caller is executing on, if any.
    pub fn current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }
}

impl EffectSpawner for TokioSpawner {
    fn spawn(&self, task: BoxFuture<'static, ()>) {
        drop(self.handle.spawn(task));
    }
}
