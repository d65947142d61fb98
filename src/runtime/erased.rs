//! Object-safe wrappers so that layouts and pages with different model and
//! message types can live in one registry.

use std::any::{type_name, Any, TypeId};
use std::marker::PhantomData;

use crate::command::Command;
use crate::program::{
    Context, Dispatch, Layout, LayoutModelOf, LayoutMsgOf, Page, Shared, Subscription,
};
use crate::routing::Route;
use crate::runtime::envelope::AnyMsg;
use crate::runtime::error::{Tier, TierError};

/// Command with the tier's local message type erased.
pub(crate) type ErasedCommand<SharedMsg> = Command<AnyMsg, SharedMsg>;

/// Layout props produced by a page, typed by that page's layout.
pub(crate) type AnyProps = Box<dyn Any + Send>;

/// Holds a tier model as `Option<M>` behind `dyn Any`, so it can be moved
/// out for an update and put back afterwards.
pub(crate) struct ModelSlot(Box<dyn Any + Send>);

impl ModelSlot {
    fn new<M: Send + 'static>(model: M) -> Self {
        Self(Box::new(Some(model)))
    }

    pub(crate) fn get<M: 'static>(&self) -> Option<&M> {
        self.0.downcast_ref::<Option<M>>()?.as_ref()
    }

    fn take<M: 'static>(&mut self) -> Option<M> {
        self.0.downcast_mut::<Option<M>>()?.take()
    }

    fn put<M: 'static>(&mut self, model: M) {
        if let Some(slot) = self.0.downcast_mut::<Option<M>>() {
            *slot = Some(model);
        }
    }
}

fn erase<M: Send + 'static>(msg: M) -> AnyMsg {
    Box::new(msg)
}

pub(crate) trait ErasedLayout<S: Shared, V>: Send {
    fn name(&self) -> &'static str;

    fn init(
        &self,
        props: AnyProps,
        shared: &S::Model,
        route: &Route,
    ) -> (ModelSlot, ErasedCommand<S::Msg>);

    fn update(
        &self,
        msg: AnyMsg,
        slot: &mut ModelSlot,
        shared: &S::Model,
    ) -> Result<ErasedCommand<S::Msg>, TierError>;

    fn route_changed(
        &self,
        props: AnyProps,
        route: &Route,
        slot: &mut ModelSlot,
        shared: &S::Model,
    ) -> Result<ErasedCommand<S::Msg>, TierError>;

    /// Returns `content` unchanged if the slot does not hold this layout's model.
    fn view(&self, slot: &ModelSlot, content: V, dispatch: &Dispatch<AnyMsg>) -> V;
}

pub(crate) struct LayoutAdapter<L, S, V> {
    layout: L,
    _tiers: PhantomData<fn() -> (S, V)>,
}

impl<L, S, V> LayoutAdapter<L, S, V> {
    pub(crate) fn new(layout: L) -> Self {
        Self {
            layout,
            _tiers: PhantomData,
        }
    }
}

impl<L, S, V> LayoutAdapter<L, S, V>
where
    S: Shared,
    L: Layout<S, V>,
{
    fn missing_model(&self) -> TierError {
        TierError::ModelMissing {
            tier: Tier::Layout,
            name: type_name::<L>(),
        }
    }

    /// Props always come from a page whose layout is `L`; anything else
    /// falls back to the default.
    fn props(&self, props: AnyProps) -> L::Props {
        match props.downcast::<L::Props>() {
            Ok(props) => *props,
            Err(_) => {
                tracing::warn!(layout = type_name::<L>(), "props of another type ignored");
                L::Props::default()
            }
        }
    }
}

impl<L, S, V> ErasedLayout<S, V> for LayoutAdapter<L, S, V>
where
    S: Shared,
    V: 'static,
    L: Layout<S, V>,
{
    fn name(&self) -> &'static str {
        type_name::<L>()
    }

    fn init(
        &self,
        props: AnyProps,
        shared: &S::Model,
        route: &Route,
    ) -> (ModelSlot, ErasedCommand<S::Msg>) {
        let (model, command) = self.layout.init(self.props(props), shared, route);
        (ModelSlot::new(model), command.map(erase))
    }

    fn update(
        &self,
        msg: AnyMsg,
        slot: &mut ModelSlot,
        shared: &S::Model,
    ) -> Result<ErasedCommand<S::Msg>, TierError> {
        let msg = msg.downcast::<L::Msg>().map_err(|_| TierError::MessageMismatch {
            tier: Tier::Layout,
            name: type_name::<L>(),
        })?;
        let model = slot.take::<L::Model>().ok_or_else(|| self.missing_model())?;
        let (model, command) = self.layout.update(*msg, model, shared);
        slot.put(model);
        Ok(command.map(erase))
    }

    fn route_changed(
        &self,
        props: AnyProps,
        route: &Route,
        slot: &mut ModelSlot,
        shared: &S::Model,
    ) -> Result<ErasedCommand<S::Msg>, TierError> {
        let model = slot.take::<L::Model>().ok_or_else(|| self.missing_model())?;
        let props = self.props(props);
        let (model, command) = self.layout.route_changed(props, route, model, shared);
        slot.put(model);
        Ok(command.map(erase))
    }

    fn view(&self, slot: &ModelSlot, content: V, dispatch: &Dispatch<AnyMsg>) -> V {
        match slot.get::<L::Model>() {
            Some(model) => {
                let dispatch = dispatch.wrap(erase::<L::Msg>);
                self.layout.view(model, content, &dispatch)
            }
            None => {
                tracing::warn!(error = %self.missing_model(), "layout view skipped");
                content
            }
        }
    }
}

pub(crate) trait ErasedPage<S: Shared, V>: Send {
    fn name(&self) -> &'static str;

    fn layout_key(&self) -> TypeId;

    fn layout_name(&self) -> &'static str;

    fn init(&self, shared: &S::Model, route: &Route) -> (ModelSlot, ErasedCommand<S::Msg>);

    fn update(
        &self,
        msg: AnyMsg,
        slot: &mut ModelSlot,
        shared: &S::Model,
        layout: &ModelSlot,
        route: &Route,
    ) -> Result<ErasedCommand<S::Msg>, TierError>;

    /// `Ok(Ok(_))` is addressed to the layout, `Ok(Err(_))` stays with the page.
    fn split_layout_msg(&self, msg: AnyMsg) -> Result<Result<AnyMsg, AnyMsg>, TierError>;

    /// The page's own message for a layout message, if it wants one.
    fn from_layout_msg(&self, msg: &AnyMsg) -> Option<AnyMsg>;

    fn layout_props(&self, shared: &S::Model, route: &Route) -> AnyProps;

    fn route_changed(
        &self,
        route: &Route,
        slot: &mut ModelSlot,
        shared: &S::Model,
    ) -> Result<ErasedCommand<S::Msg>, TierError>;

    fn reinit_on(&self, previous: &Route, next: &Route) -> bool;

    fn view(&self, slot: &ModelSlot, dispatch: &Dispatch<AnyMsg>) -> Option<V>;

    fn subscriptions(&self, slot: &ModelSlot) -> Vec<Subscription<AnyMsg>>;
}

pub(crate) struct PageAdapter<P, S, V> {
    page: P,
    _tiers: PhantomData<fn() -> (S, V)>,
}

impl<P, S, V> PageAdapter<P, S, V> {
    pub(crate) fn new(page: P) -> Self {
        Self {
            page,
            _tiers: PhantomData,
        }
    }
}

impl<P, S, V> PageAdapter<P, S, V>
where
    S: Shared,
    P: Page<S, V>,
{
    fn missing_model(&self, tier: Tier) -> TierError {
        let name = match tier {
            Tier::Layout => type_name::<P::Layout>(),
            _ => type_name::<P>(),
        };
        TierError::ModelMissing { tier, name }
    }
}

impl<P, S, V> ErasedPage<S, V> for PageAdapter<P, S, V>
where
    S: Shared,
    V: 'static,
    P: Page<S, V>,
{
    fn name(&self) -> &'static str {
        type_name::<P>()
    }

    fn layout_key(&self) -> TypeId {
        TypeId::of::<P::Layout>()
    }

    fn layout_name(&self) -> &'static str {
        type_name::<P::Layout>()
    }

    fn init(&self, shared: &S::Model, route: &Route) -> (ModelSlot, ErasedCommand<S::Msg>) {
        let (model, command) = self.page.init(shared, route);
        (ModelSlot::new(model), command.map(erase))
    }

    fn update(
        &self,
        msg: AnyMsg,
        slot: &mut ModelSlot,
        shared: &S::Model,
        layout: &ModelSlot,
        route: &Route,
    ) -> Result<ErasedCommand<S::Msg>, TierError> {
        let msg = msg.downcast::<P::Msg>().map_err(|_| TierError::MessageMismatch {
            tier: Tier::Page,
            name: type_name::<P>(),
        })?;
        let layout = layout
            .get::<LayoutModelOf<S, P, V>>()
            .ok_or_else(|| self.missing_model(Tier::Layout))?;
        let model = slot.take::<P::Model>().ok_or_else(|| self.missing_model(Tier::Page))?;
        let ctx = Context {
            shared,
            layout,
            route,
        };
        let (model, command) = self.page.update(*msg, model, &ctx);
        slot.put(model);
        Ok(command.map(erase))
    }

    fn split_layout_msg(&self, msg: AnyMsg) -> Result<Result<AnyMsg, AnyMsg>, TierError> {
        let msg = msg.downcast::<P::Msg>().map_err(|_| TierError::MessageMismatch {
            tier: Tier::Page,
            name: type_name::<P>(),
        })?;
        Ok(match self.page.to_layout_msg(*msg) {
            Ok(layout_msg) => Ok(erase(layout_msg)),
            Err(page_msg) => Err(erase(page_msg)),
        })
    }

    fn from_layout_msg(&self, msg: &AnyMsg) -> Option<AnyMsg> {
        let msg = msg.downcast_ref::<LayoutMsgOf<S, P, V>>()?;
        self.page.from_layout_msg(msg).map(erase)
    }

    fn layout_props(&self, shared: &S::Model, route: &Route) -> AnyProps {
        Box::new(self.page.layout_props(shared, route))
    }

    fn route_changed(
        &self,
        route: &Route,
        slot: &mut ModelSlot,
        shared: &S::Model,
    ) -> Result<ErasedCommand<S::Msg>, TierError> {
        let model = slot.take::<P::Model>().ok_or_else(|| self.missing_model(Tier::Page))?;
        let (model, command) = self.page.route_changed(route, model, shared);
        slot.put(model);
        Ok(command.map(erase))
    }

    fn reinit_on(&self, previous: &Route, next: &Route) -> bool {
        self.page.reinit_on(previous, next)
    }

    fn view(&self, slot: &ModelSlot, dispatch: &Dispatch<AnyMsg>) -> Option<V> {
        let model = slot.get::<P::Model>()?;
        let dispatch = dispatch.wrap(erase::<P::Msg>);
        Some(self.page.view(model, &dispatch))
    }

    fn subscriptions(&self, slot: &ModelSlot) -> Vec<Subscription<AnyMsg>> {
        match slot.get::<P::Model>() {
            Some(model) => self
                .page
                .subscriptions(model)
                .into_iter()
                .map(|sub| sub.map(erase))
                .collect(),
            None => Vec::new(),
        }
    }
}
