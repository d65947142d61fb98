use std::any::TypeId;
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, trace, warn};

use crate::command::{Command, Effect};
use crate::program::{Dispatch, Shared};
use crate::routing::Route;
use crate::runtime::app::App;
use crate::runtime::envelope::{AnyMsg, Envelope, Generation, RuntimeHandle};
use crate::runtime::erased::{AnyProps, ErasedCommand, ModelSlot};
use crate::runtime::error::{AppError, Tier, TierError};
use crate::runtime::history::NavigationHistory;
use crate::runtime::spawner::{EffectSpawner, TokioSpawner};
use crate::runtime::subscriptions::SubscriptionSet;
use crate::shutdown::ShutdownHandle;

type LoopCommand<SharedMsg> = Command<Envelope<SharedMsg>, SharedMsg>;

/// Counters describing what the dispatch loop has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    /// Messages delivered to an update function.
    pub dispatched: u64,
    /// Messages dropped because their tier instance was gone or their type
    /// did not match.
    pub discarded: u64,
    pub effects_started: u64,
    pub navigations: u64,
}

/// The tier instance a command was returned by. Its leaves only run while
/// that instance is still active.
#[derive(Debug, Clone, Copy)]
enum Origin {
    Shared,
    Layout(Generation),
    Page(Generation),
}

impl Origin {
    fn tier(self) -> Tier {
        match self {
            Origin::Shared => Tier::Shared,
            Origin::Layout(_) => Tier::Layout,
            Origin::Page(_) => Tier::Page,
        }
    }

    fn generation(self) -> Option<Generation> {
        match self {
            Origin::Shared => None,
            Origin::Layout(generation) | Origin::Page(generation) => Some(generation),
        }
    }
}

struct ActiveLayout {
    key: TypeId,
    generation: Generation,
    model: ModelSlot,
}

struct ActivePage {
    key: String,
    generation: Generation,
    route: Route,
    model: ModelSlot,
}

/// Owns every tier model and runs the dispatch loop.
///
/// All updates happen on the task that owns the runtime. Effects and
/// subscriptions run elsewhere and feed their messages back through an
/// unbounded channel, so an update never observes another update in
/// progress.
pub struct Runtime<S: Shared, V> {
    app: App<S, V>,
    shared: Option<S::Model>,
    layout: Option<ActiveLayout>,
    page: Option<ActivePage>,
    last_generation: u64,
    tx: UnboundedSender<Envelope<S::Msg>>,
    rx: UnboundedReceiver<Envelope<S::Msg>>,
    spawner: Arc<dyn EffectSpawner>,
    shared_subs: SubscriptionSet,
    page_subs: SubscriptionSet,
    history: NavigationHistory,
    stats: RuntimeStats,
}

impl<S: Shared, V: 'static> Runtime<S, V> {
    /// Start on the current tokio runtime and navigate to `location`.
    pub fn start(app: App<S, V>, location: &str) -> Result<Self, AppError> {
        let spawner = TokioSpawner::current().ok_or(AppError::NoAsyncRuntime)?;
        Ok(Self::start_with(app, location, Arc::new(spawner)))
    }

    /// Start with a caller-supplied spawner.
    ///
    /// Shared is initialised first and its command executed, then the
    /// initial navigation selects a layout and page.
    pub fn start_with(app: App<S, V>, location: &str, spawner: Arc<dyn EffectSpawner>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let history = NavigationHistory::new(app.history_limit);
        let mut runtime = Self {
            app,
            shared: None,
            layout: None,
            page: None,
            last_generation: 0,
            tx,
            rx,
            spawner,
            shared_subs: SubscriptionSet::new(),
            page_subs: SubscriptionSet::new(),
            history,
            stats: RuntimeStats::default(),
        };

        let (model, command) = runtime.app.shared.init();
        runtime.shared = Some(model);
        info!(location, "runtime started");
        runtime.execute(command.map(Envelope::Shared), Origin::Shared);
        runtime.sync_shared_subscriptions();
        runtime.navigate(location);
        runtime
    }

    // ── entry points ─────────────────────────────────────────────────

    pub fn dispatch_shared(&mut self, msg: S::Msg) {
        self.update_shared(msg);
    }

    /// Deliver `msg` to the active layout. Dropped with a warning if `M`
    /// is not that layout's message type.
    pub fn dispatch_layout<M: Send + 'static>(&mut self, msg: M) {
        match self.layout.as_ref().map(|active| active.generation) {
            Some(generation) => self.deliver(Envelope::Layout {
                generation,
                msg: Box::new(msg),
            }),
            None => self.discard(Tier::Layout, None),
        }
    }

    /// Deliver `msg` to the active page (or, via `to_layout_msg`, its layout).
    pub fn dispatch_page<M: Send + 'static>(&mut self, msg: M) {
        match self.page.as_ref().map(|active| active.generation) {
            Some(generation) => self.deliver(Envelope::Page {
                generation,
                msg: Box::new(msg),
            }),
            None => self.discard(Tier::Page, None),
        }
    }

    /// A dispatch bound to the current page instance. Messages sent after
    /// that page is torn down are discarded.
    pub fn page_dispatch<M: Send + 'static>(&self) -> Option<Dispatch<M>> {
        let generation = self.page.as_ref()?.generation;
        Some(self.page_sink(generation).wrap(|msg: M| Box::new(msg) as AnyMsg))
    }

    pub fn layout_dispatch<M: Send + 'static>(&self) -> Option<Dispatch<M>> {
        let generation = self.layout.as_ref()?.generation;
        Some(self.layout_sink(generation).wrap(|msg: M| Box::new(msg) as AnyMsg))
    }

    /// Resolve `location` and switch tiers, recording it in the history
    /// unless it names the route already shown.
    pub fn navigate(&mut self, location: &str) {
        self.go(location, true);
    }

    /// Step back in the history. Returns false if there is nothing behind.
    pub fn back(&mut self) -> bool {
        match self.history.back() {
            Some(location) => {
                self.go(&location, false);
                true
            }
            None => false,
        }
    }

    pub fn forward(&mut self) -> bool {
        match self.history.forward() {
            Some(location) => {
                self.go(&location, false);
                true
            }
            None => false,
        }
    }

    pub fn handle(&self) -> RuntimeHandle<S::Msg> {
        RuntimeHandle::new(self.tx.clone())
    }

    // ── loop ─────────────────────────────────────────────────────────

    /// Wait for the next queued message and process it.
    pub async fn next(&mut self) -> bool {
        match self.rx.recv().await {
            Some(envelope) => {
                self.deliver(envelope);
                true
            }
            None => false,
        }
    }

    /// Process everything already queued without waiting. Returns how many
    /// messages were taken off the queue.
    pub fn drain(&mut self) -> usize {
        let mut count = 0;
        while let Ok(envelope) = self.rx.try_recv() {
            self.deliver(envelope);
            count += 1;
        }
        count
    }

    /// Process messages until `shutdown` is signalled, then stop and hand
    /// back the final Shared model.
    pub async fn run(mut self, shutdown: ShutdownHandle) -> Option<S::Model> {
        loop {
            tokio::select! {
                _ = shutdown.wait() => break,
                envelope = self.rx.recv() => match envelope {
                    Some(envelope) => self.deliver(envelope),
                    None => break,
                },
            }
        }
        self.shutdown()
    }

    /// Cancel subscriptions and drop the layout and page. Effects already
    /// in flight finish but their results go nowhere.
    pub fn shutdown(mut self) -> Option<S::Model> {
        self.page_subs.clear();
        self.shared_subs.clear();
        self.page = None;
        self.layout = None;
        info!(
            dispatched = self.stats.dispatched,
            discarded = self.stats.discarded,
            effects = self.stats.effects_started,
            "runtime stopped"
        );
        self.shared.take()
    }

    // ── inspection ───────────────────────────────────────────────────

    pub fn shared_model(&self) -> Option<&S::Model> {
        self.shared.as_ref()
    }

    pub fn layout_model<M: 'static>(&self) -> Option<&M> {
        self.layout.as_ref()?.model.get::<M>()
    }

    pub fn page_model<M: 'static>(&self) -> Option<&M> {
        self.page.as_ref()?.model.get::<M>()
    }

    pub fn layout_generation(&self) -> Option<Generation> {
        self.layout.as_ref().map(|active| active.generation)
    }

    pub fn page_generation(&self) -> Option<Generation> {
        self.page.as_ref().map(|active| active.generation)
    }

    pub fn route(&self) -> Option<&Route> {
        self.page.as_ref().map(|active| &active.route)
    }

    pub fn history(&self) -> &NavigationHistory {
        &self.history
    }

    pub fn stats(&self) -> RuntimeStats {
        self.stats
    }

    /// Number of running Shared and page subscriptions.
    pub fn active_subscriptions(&self) -> usize {
        self.shared_subs.len() + self.page_subs.len()
    }

    /// Render the active page wrapped in its layout.
    pub fn view(&self) -> Option<V> {
        let page_active = self.page.as_ref()?;
        let layout_active = self.layout.as_ref()?;
        let page = self.app.pages.get(&page_active.key)?;
        let layout = self.app.layouts.get(&layout_active.key)?;
        let content = page.view(&page_active.model, &self.page_sink(page_active.generation))?;
        Some(layout.view(
            &layout_active.model,
            content,
            &self.layout_sink(layout_active.generation),
        ))
    }

    // ── dispatch ─────────────────────────────────────────────────────

    fn deliver(&mut self, envelope: Envelope<S::Msg>) {
        match envelope {
            Envelope::Shared(msg) => self.update_shared(msg),
            Envelope::Layout { generation, msg } => {
                if self.layout_generation() == Some(generation) {
                    self.update_layout(msg);
                } else {
                    self.discard(Tier::Layout, Some(generation));
                }
            }
            Envelope::Page { generation, msg } => {
                if self.page_generation() == Some(generation) {
                    self.route_page_msg(msg);
                } else {
                    self.discard(Tier::Page, Some(generation));
                }
            }
            Envelope::Navigate(location) => self.navigate(&location),
        }
    }

    fn discard(&mut self, tier: Tier, generation: Option<Generation>) {
        self.stats.discarded += 1;
        debug!(
            %tier,
            generation = generation.map(Generation::value),
            "message for inactive instance discarded"
        );
    }

    fn reject(&mut self, err: TierError) {
        self.stats.discarded += 1;
        warn!(error = %err, "message dropped");
    }

    /// Run each leaf of `command` in order. Messages and Shared messages are
    /// processed before the next leaf starts; effects are only initiated.
    /// Once `origin` has been torn down (typically by a navigate leaf) the
    /// remaining leaves are discarded.
    fn execute(&mut self, command: LoopCommand<S::Msg>, origin: Origin) {
        if let Command::Batch(commands) = command {
            for command in commands {
                self.execute(command, origin);
            }
            return;
        }
        if command.is_none() {
            return;
        }
        if !self.is_current(origin) {
            self.discard(origin.tier(), origin.generation());
            return;
        }
        match command {
            Command::Message(envelope) => self.deliver(envelope),
            Command::Effect(effect) => self.spawn_effect(effect),
            Command::Shared(msg) => self.update_shared(msg),
            Command::Navigate(location) => self.navigate(&location),
            Command::None | Command::Batch(_) => {}
        }
    }

    fn is_current(&self, origin: Origin) -> bool {
        match origin {
            Origin::Shared => true,
            Origin::Layout(generation) => self.layout_generation() == Some(generation),
            Origin::Page(generation) => self.page_generation() == Some(generation),
        }
    }

    fn spawn_effect(&mut self, effect: Effect<Envelope<S::Msg>>) {
        self.stats.effects_started += 1;
        let tx = self.tx.clone();
        let future = effect.into_future();
        self.spawner.spawn(Box::pin(async move {
            let envelope = future.await;
            if tx.send(envelope).is_err() {
                trace!("effect finished after runtime stopped");
            }
        }));
    }

    fn update_shared(&mut self, msg: S::Msg) {
        let Some(model) = self.shared.take() else {
            warn!("shared message after shutdown dropped");
            return;
        };
        self.stats.dispatched += 1;
        let (model, command) = self.app.shared.update(msg, model);
        self.shared = Some(model);
        trace!(tier = %Tier::Shared, "updated");
        self.execute(command.map(Envelope::Shared), Origin::Shared);
        self.sync_shared_subscriptions();
    }

    fn update_layout(&mut self, msg: AnyMsg) {
        let (Some(active), Some(shared)) = (self.layout.as_mut(), self.shared.as_ref()) else {
            return;
        };
        let Some(layout) = self.app.layouts.get(&active.key) else {
            return;
        };
        let generation = active.generation;
        let forwarded = self.page.as_ref().and_then(|page_active| {
            let page = self.app.pages.get(&page_active.key)?;
            Some((page_active.generation, page.from_layout_msg(&msg)?))
        });
        match layout.update(msg, &mut active.model, shared) {
            Ok(command) => {
                self.stats.dispatched += 1;
                trace!(tier = %Tier::Layout, %generation, "updated");
                self.execute(layout_command(generation, command), Origin::Layout(generation));
            }
            Err(err) => {
                self.reject(err);
                return;
            }
        }
        if let Some((page_generation, page_msg)) = forwarded {
            if self.page_generation() == Some(page_generation) {
                self.update_page(page_msg);
            } else {
                self.discard(Tier::Page, Some(page_generation));
            }
        }
    }

    fn route_page_msg(&mut self, msg: AnyMsg) {
        let Some(active) = self.page.as_ref() else {
            return;
        };
        let Some(page) = self.app.pages.get(&active.key) else {
            return;
        };
        match page.split_layout_msg(msg) {
            Ok(Ok(layout_msg)) => self.update_layout(layout_msg),
            Ok(Err(page_msg)) => self.update_page(page_msg),
            Err(err) => self.reject(err),
        }
    }

    fn update_page(&mut self, msg: AnyMsg) {
        let (Some(active), Some(layout), Some(shared)) =
            (self.page.as_mut(), self.layout.as_ref(), self.shared.as_ref())
        else {
            return;
        };
        let Some(page) = self.app.pages.get(&active.key) else {
            return;
        };
        let generation = active.generation;
        match page.update(msg, &mut active.model, shared, &layout.model, &active.route) {
            Ok(command) => {
                self.stats.dispatched += 1;
                trace!(tier = %Tier::Page, %generation, "updated");
                self.execute(page_command(generation, command), Origin::Page(generation));
                self.sync_page_subscriptions();
            }
            Err(err) => self.reject(err),
        }
    }

    // ── navigation ───────────────────────────────────────────────────

    /// Switch tiers for `location`. `record` pushes it onto the history;
    /// back and forward pass false since they only move the cursor.
    fn go(&mut self, location: &str, record: bool) {
        let route = match self.app.router.resolve(location) {
            Ok(route) => route,
            Err(reason) => {
                warn!(location, %reason, "no route matched");
                let path = location.split(['?', '#']).next().unwrap_or(location);
                Route::not_found(path)
            }
        };
        if self.page.as_ref().is_some_and(|active| active.route.same_target(&route)) {
            trace!(location, "route unchanged");
            return;
        }

        let key = route.name().to_string();
        let (Some(page), Some(shared)) = (self.app.pages.get(&key), self.shared.as_ref()) else {
            warn!(route = %key, "route has no page");
            return;
        };
        let layout_key = page.layout_key();
        let layout_name = page.layout_name();
        let props = page.layout_props(shared, &route);

        if record {
            self.history.push(location);
        }
        self.stats.navigations += 1;
        let epoch = self.stats.navigations;

        if self.layout.as_ref().map(|active| active.key) != Some(layout_key) {
            debug!(route = %key, layout = layout_name, "layout changed");
            self.teardown_page();
            self.teardown_layout();
            self.init_layout(layout_key, props, &route);
            if self.stats.navigations != epoch {
                return;
            }
            self.init_page(key, route);
            return;
        }

        self.layout_route_changed(props, &route);
        if self.stats.navigations != epoch {
            return;
        }

        let keep_page = match (self.page.as_ref(), self.app.pages.get(&key)) {
            (Some(active), Some(page)) => {
                active.key == key && !page.reinit_on(&active.route, &route)
            }
            _ => false,
        };
        if keep_page {
            self.page_route_changed(route);
        } else {
            self.teardown_page();
            self.init_page(key, route);
        }
    }

    fn init_layout(&mut self, key: TypeId, props: AnyProps, route: &Route) {
        let generation = self.next_generation();
        let (Some(layout), Some(shared)) = (self.app.layouts.get(&key), self.shared.as_ref()) else {
            return;
        };
        let (model, command) = layout.init(props, shared, route);
        debug!(layout = layout.name(), %generation, "layout initialised");
        self.layout = Some(ActiveLayout {
            key,
            generation,
            model,
        });
        self.execute(layout_command(generation, command), Origin::Layout(generation));
    }

    fn init_page(&mut self, key: String, route: Route) {
        let generation = self.next_generation();
        let (Some(page), Some(shared)) = (self.app.pages.get(&key), self.shared.as_ref()) else {
            return;
        };
        let (model, command) = page.init(shared, &route);
        debug!(page = page.name(), route = %key, %generation, "page initialised");
        self.page = Some(ActivePage {
            key,
            generation,
            route,
            model,
        });
        self.execute(page_command(generation, command), Origin::Page(generation));
        self.sync_page_subscriptions();
    }

    fn layout_route_changed(&mut self, props: AnyProps, route: &Route) {
        let (Some(active), Some(shared)) = (self.layout.as_mut(), self.shared.as_ref()) else {
            return;
        };
        let Some(layout) = self.app.layouts.get(&active.key) else {
            return;
        };
        let generation = active.generation;
        match layout.route_changed(props, route, &mut active.model, shared) {
            Ok(command) => {
                self.execute(layout_command(generation, command), Origin::Layout(generation));
            }
            Err(err) => self.reject(err),
        }
    }

    fn page_route_changed(&mut self, route: Route) {
        let (Some(active), Some(shared)) = (self.page.as_mut(), self.shared.as_ref()) else {
            return;
        };
        let Some(page) = self.app.pages.get(&active.key) else {
            return;
        };
        let generation = active.generation;
        let result = page.route_changed(&route, &mut active.model, shared);
        active.route = route;
        debug!(page = page.name(), %generation, "page kept across route change");
        match result {
            Ok(command) => {
                self.execute(page_command(generation, command), Origin::Page(generation));
                self.sync_page_subscriptions();
            }
            Err(err) => self.reject(err),
        }
    }

    fn teardown_page(&mut self) {
        self.page_subs.clear();
        if let Some(active) = self.page.take() {
            debug!(route = %active.key, generation = %active.generation, "page torn down");
        }
    }

    fn teardown_layout(&mut self) {
        if let Some(active) = self.layout.take() {
            debug!(generation = %active.generation, "layout torn down");
        }
    }

    fn next_generation(&mut self) -> Generation {
        self.last_generation += 1;
        Generation::new(self.last_generation)
    }

    // ── subscriptions and sinks ──────────────────────────────────────

    fn sync_shared_subscriptions(&mut self) {
        let Some(model) = self.shared.as_ref() else {
            return;
        };
        let wanted = self.app.shared.subscriptions(model);
        let tx = self.tx.clone();
        let dispatch = Dispatch::new(move |msg| {
            let _ = tx.send(Envelope::Shared(msg));
        });
        self.shared_subs.sync(wanted, &dispatch, self.spawner.as_ref());
    }

    fn sync_page_subscriptions(&mut self) {
        let Some(active) = self.page.as_ref() else {
            self.page_subs.clear();
            return;
        };
        let Some(page) = self.app.pages.get(&active.key) else {
            return;
        };
        let wanted = page.subscriptions(&active.model);
        let dispatch = self.page_sink(active.generation);
        self.page_subs.sync(wanted, &dispatch, self.spawner.as_ref());
    }

    fn page_sink(&self, generation: Generation) -> Dispatch<AnyMsg> {
        let tx = self.tx.clone();
        Dispatch::new(move |msg| {
            let _ = tx.send(Envelope::Page { generation, msg });
        })
    }

    fn layout_sink(&self, generation: Generation) -> Dispatch<AnyMsg> {
        let tx = self.tx.clone();
        Dispatch::new(move |msg| {
            let _ = tx.send(Envelope::Layout { generation, msg });
        })
    }
}

fn layout_command<SharedMsg: Send + 'static>(
    generation: Generation,
    command: ErasedCommand<SharedMsg>,
) -> LoopCommand<SharedMsg> {
    command.map(move |msg| Envelope::Layout { generation, msg })
}

fn page_command<SharedMsg: Send + 'static>(
    generation: Generation,
    command: ErasedCommand<SharedMsg>,
) -> LoopCommand<SharedMsg> {
    command.map(move |msg| Envelope::Page { generation, msg })
}
