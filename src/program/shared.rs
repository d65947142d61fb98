use crate::command::Command;
use crate::program::subscription::Subscription;

/// Command type returned by Shared's `init` and `update`.
pub type SharedCommand<S> = Command<<S as Shared>::Msg, <S as Shared>::Msg>;

/// The single application-wide state machine.
///
/// Layouts and pages only read `Model`; the one way to change it is a
/// `Command::from_shared` that the runtime feeds into [`Shared::update`].
pub trait Shared: Send + 'static {
    type Model: Send + 'static;
    type Msg: Send + 'static;

    fn init(&self) -> (Self::Model, SharedCommand<Self>);

    fn update(&self, msg: Self::Msg, model: Self::Model) -> (Self::Model, SharedCommand<Self>);

    /// External event sources wanted for the current model.
    fn subscriptions(&self, _model: &Self::Model) -> Vec<Subscription<Self::Msg>> {
        Vec::new()
    }
}
