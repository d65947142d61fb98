use crate::command::Command;
use crate::program::dispatch::Dispatch;
use crate::program::shared::Shared;
use crate::routing::Route;

/// Command type returned by a layout of application `S`.
pub type LayoutCommand<S, L, V> = Command<<L as Layout<S, V>>::Msg, <S as Shared>::Msg>;

/// Chrome around a group of pages, kept alive across navigations between
/// those pages.
///
/// `V` is whatever the rendering layer draws; the runtime never looks inside.
pub trait Layout<S: Shared, V>: Send + 'static {
    type Model: Send + 'static;
    type Msg: Send + 'static;
    /// Per-page configuration, produced by [`Page::layout_props`] for every
    /// route the layout serves. Pages that don't care pass the default.
    ///
    /// [`Page::layout_props`]: crate::program::Page::layout_props
    type Props: Default + Send + 'static;

    /// Called when a route first selects this layout.
    fn init(
        &self,
        props: Self::Props,
        shared: &S::Model,
        route: &Route,
    ) -> (Self::Model, LayoutCommand<S, Self, V>);

    fn update(
        &self,
        msg: Self::Msg,
        model: Self::Model,
        shared: &S::Model,
    ) -> (Self::Model, LayoutCommand<S, Self, V>);

    /// Called when the route changes while this layout stays active, with
    /// the props of the page being navigated to. The default leaves the
    /// model untouched.
    fn route_changed(
        &self,
        _props: Self::Props,
        _route: &Route,
        model: Self::Model,
        _shared: &S::Model,
    ) -> (Self::Model, LayoutCommand<S, Self, V>) {
        (model, Command::none())
    }

    /// Wrap the rendered page in this layout's chrome.
    fn view(&self, model: &Self::Model, content: V, dispatch: &Dispatch<Self::Msg>) -> V;
}
