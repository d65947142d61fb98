use std::any::Any;
use std::fmt;

use tokio::sync::mpsc::UnboundedSender;

use crate::program::Dispatch;

/// A message whose concrete type is known only to the tier that owns it.
pub(crate) type AnyMsg = Box<dyn Any + Send>;

/// Identity of one layout or page model instance.
///
/// Every `init` gets a fresh generation; messages and effect results carry
/// the generation they were produced for so that results arriving after a
/// teardown can be recognised and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything that enters the dispatch loop.
pub(crate) enum Envelope<SharedMsg> {
    Shared(SharedMsg),
    Layout { generation: Generation, msg: AnyMsg },
    Page { generation: Generation, msg: AnyMsg },
    Navigate(String),
}

/// Cloneable, `Send` entry point for the hosting environment: navigation
/// events and Shared messages from other tasks.
pub struct RuntimeHandle<SharedMsg> {
    tx: UnboundedSender<Envelope<SharedMsg>>,
}

impl<SharedMsg: Send + 'static> RuntimeHandle<SharedMsg> {
    pub(crate) fn new(tx: UnboundedSender<Envelope<SharedMsg>>) -> Self {
        Self { tx }
    }

    /// Queue a navigation. Returns false once the runtime has stopped.
    pub fn navigate(&self, location: impl Into<String>) -> bool {
        self.tx.send(Envelope::Navigate(location.into())).is_ok()
    }

    /// Queue a Shared message. Returns false once the runtime has stopped.
    pub fn send_shared(&self, msg: SharedMsg) -> bool {
        self.tx.send(Envelope::Shared(msg)).is_ok()
    }

    pub fn shared_dispatch(&self) -> Dispatch<SharedMsg> {
        let tx = self.tx.clone();
        Dispatch::new(move |msg| {
            let _ = tx.send(Envelope::Shared(msg));
        })
    }
}

impl<SharedMsg> Clone for RuntimeHandle<SharedMsg> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}
