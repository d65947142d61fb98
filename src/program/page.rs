use crate::command::Command;
use crate::program::dispatch::Dispatch;
use crate::program::layout::Layout;
use crate::program::shared::Shared;
use crate::program::subscription::Subscription;
use crate::routing::Route;

/// Command type returned by a page of application `S`.
pub type PageCommand<S, P, V> = Command<<P as Page<S, V>>::Msg, <S as Shared>::Msg>;

/// Model of the layout a page is rendered in.
pub type LayoutModelOf<S, P, V> = <<P as Page<S, V>>::Layout as Layout<S, V>>::Model;

/// Message type of the layout a page is rendered in.
pub type LayoutMsgOf<S, P, V> = <<P as Page<S, V>>::Layout as Layout<S, V>>::Msg;

/// Props type of the layout a page is rendered in.
pub type LayoutPropsOf<S, P, V> = <<P as Page<S, V>>::Layout as Layout<S, V>>::Props;

/// Read-only view of the tiers above a page, valid for one update call.
#[derive(Debug)]
pub struct Context<'a, SharedModel, LayoutModel> {
    pub shared: &'a SharedModel,
    pub layout: &'a LayoutModel,
    pub route: &'a Route,
}

/// State machine for a single routed view.
pub trait Page<S: Shared, V>: Send + 'static {
    /// The layout this page renders inside. A navigation between pages of
    /// the same layout keeps that layout's model alive.
    type Layout: Layout<S, V>;
    type Model: Send + 'static;
    type Msg: Send + 'static;

    fn init(&self, shared: &S::Model, route: &Route) -> (Self::Model, PageCommand<S, Self, V>);

    fn update(
        &self,
        msg: Self::Msg,
        model: Self::Model,
        ctx: &Context<'_, S::Model, LayoutModelOf<S, Self, V>>,
    ) -> (Self::Model, PageCommand<S, Self, V>);

    fn view(&self, model: &Self::Model, dispatch: &Dispatch<Self::Msg>) -> V;

    /// Split off messages meant for the layout. `Ok` is delivered to the
    /// layout's update, `Err` hands the message back to this page.
    fn to_layout_msg(&self, msg: Self::Msg) -> Result<LayoutMsgOf<S, Self, V>, Self::Msg> {
        Err(msg)
    }

    /// Sees every message the layout handles while this page is active.
    /// `Some` is delivered to this page's `update` right after the layout's.
    fn from_layout_msg(&self, _msg: &LayoutMsgOf<S, Self, V>) -> Option<Self::Msg> {
        None
    }

    /// Props for the layout, computed whenever a route selects this page.
    fn layout_props(&self, _shared: &S::Model, _route: &Route) -> LayoutPropsOf<S, Self, V> {
        Default::default()
    }

    fn subscriptions(&self, _model: &Self::Model) -> Vec<Subscription<Self::Msg>> {
        Vec::new()
    }

    /// Whether moving from `previous` to `next` (both served by this page)
    /// should discard the model and call `init` again. Defaults to keeping
    /// the model and calling [`Page::route_changed`].
    fn reinit_on(&self, _previous: &Route, _next: &Route) -> bool {
        false
    }

    /// Called instead of `init` when this page stays active across a route
    /// change it did not opt into re-initialising for.
    fn route_changed(
        &self,
        _route: &Route,
        model: Self::Model,
        _shared: &S::Model,
    ) -> (Self::Model, PageCommand<S, Self, V>) {
        (model, Command::none())
    }
}
