use std::fmt;
use std::sync::Arc;

/// Handle a view or subscription uses to send messages back into the
/// dispatch loop. Sending never blocks and never runs an update inline.
pub struct Dispatch<Msg> {
    sink: Arc<dyn Fn(Msg) + Send + Sync>,
}

impl<Msg: 'static> Dispatch<Msg> {
    pub fn new<F>(sink: F) -> Self
    where
        F: Fn(Msg) + Send + Sync + 'static,
    {
        Self {
            sink: Arc::new(sink),
        }
    }

    pub fn send(&self, msg: Msg) {
        (self.sink)(msg)
    }

    /// A dispatch for another message type that converts before sending.
    pub fn wrap<M, F>(&self, f: F) -> Dispatch<M>
    where
        M: 'static,
        F: Fn(M) -> Msg + Send + Sync + 'static,
    {
        let sink = Arc::clone(&self.sink);
        Dispatch::new(move |msg| sink(f(msg)))
    }
}

impl<Msg> Clone for Dispatch<Msg> {
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<Msg> fmt::Debug for Dispatch<Msg> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Dispatch(..)")
    }
}
