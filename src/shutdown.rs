use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// Owner side of a stop signal for [`Runtime::run`](crate::runtime::Runtime::run).
pub struct Shutdown {
    stopping: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self {
            stopping: Arc::new(AtomicBool::new(false)),
            notify: Arc::new(Notify::new()),
        }
    }

    pub fn signal(&self) {
        self.handle().signal();
    }

    pub fn is_shutting_down(&self) -> bool {
        self.stopping.load(Ordering::SeqCst)
    }

    pub fn handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            stopping: Arc::clone(&self.stopping),
            notify: Arc::clone(&self.notify),
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub struct ShutdownHandle {
    stopping: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl ShutdownHandle {
    pub fn is_shutting_down(&self) -> bool {
        self.stopping.load(Ordering::SeqCst)
    }

    pub fn signal(&self) {
        if !self.stopping.swap(true, Ordering::SeqCst) {
            tracing::info!("shutdown requested");
            self.notify.notify_waiters();
        }
    }

    /// Resolves once [`signal`](Self::signal) has been called, including
    /// calls made before `wait` started.
    pub async fn wait(&self) {
        // Register before reading the flag so a concurrent signal is not missed.
        let notified = self.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if self.is_shutting_down() {
            return;
        }
        notified.await;
    }
}
