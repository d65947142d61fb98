mod common;

use common::*;
use elmland::command::Command;
use elmland::program::{Context, Dispatch, Page};
use elmland::routing::{ParamKind, Route, RouteTemplate};
use elmland::runtime::{App, AppError, Runtime};

/// Page that wants a fresh model whenever its id changes, but not when
/// only the query does.
struct Reloading;

#[derive(Debug, PartialEq)]
struct ReloadModel {
    id: i64,
    route_changes: u32,
}

impl Page<Session, View> for Reloading {
    type Layout = MainLayout;
    type Model = ReloadModel;
    type Msg = ();

    fn init(
        &self,
        _shared: &SessionModel,
        route: &Route,
    ) -> (ReloadModel, Command<(), SessionMsg>) {
        let id = route.get::<i64>("id").unwrap_or_default();
        (ReloadModel { id, route_changes: 0 }, Command::none())
    }

    fn update(
        &self,
        _msg: (),
        model: ReloadModel,
        _ctx: &Context<'_, SessionModel, MainModel>,
    ) -> (ReloadModel, Command<(), SessionMsg>) {
        (model, Command::none())
    }

    fn view(&self, model: &ReloadModel, _dispatch: &Dispatch<()>) -> View {
        format!("item:{}", model.id)
    }

    fn reinit_on(&self, previous: &Route, next: &Route) -> bool {
        previous.get::<i64>("id") != next.get::<i64>("id")
    }

    fn route_changed(
        &self,
        _route: &Route,
        mut model: ReloadModel,
        _shared: &SessionModel,
    ) -> (ReloadModel, Command<(), SessionMsg>) {
        model.route_changes += 1;
        (model, Command::none())
    }
}

fn reloading_app() -> App<Session, View> {
    let template = RouteTemplate::parse("item", "/items/:id<int>")
        .unwrap()
        .with_query("tab", ParamKind::String, false)
        .unwrap();
    App::builder(Session)
        .layout(MainLayout)
        .page(template, Reloading)
        .not_found(NotFoundPage)
        .build()
        .unwrap()
}

#[test]
fn initial_location_selects_layout_and_page() {
    let (runtime, _) = start_at("/");

    assert_eq!(runtime.route().map(|r| r.name()), Some("home"));
    assert!(runtime.layout_model::<MainModel>().is_some());
    assert_eq!(runtime.page_model::<HomeModel>(), Some(&HomeModel::default()));
    assert_eq!(runtime.view().as_deref(), Some("[main]home:0"));
}

#[test]
fn same_layout_navigation_keeps_layout_model() {
    let (mut runtime, _) = start_at("/");
    runtime.dispatch_page(HomeMsg::ToggleSidebar);
    let layout_generation = runtime.layout_generation();
    let page_generation = runtime.page_generation();

    runtime.navigate("/users/42");

    assert_eq!(runtime.layout_generation(), layout_generation);
    assert_ne!(runtime.page_generation(), page_generation);
    let layout = runtime.layout_model::<MainModel>().unwrap();
    assert!(layout.sidebar_open, "layout state survives the page change");
    assert_eq!(layout.route_changes, vec!["user".to_string()]);
    assert_eq!(runtime.page_model::<UserModel>().unwrap().id, 42);
    assert_eq!(runtime.view().as_deref(), Some("[main+sidebar]user:42:loading"));
}

#[test]
fn different_layout_gets_fresh_models() {
    let (mut runtime, _) = start_at("/");
    runtime.dispatch_page(HomeMsg::ToggleSidebar);
    let main_generation = runtime.layout_generation();

    runtime.navigate("/login");
    assert_ne!(runtime.layout_generation(), main_generation);
    assert!(runtime.layout_model::<MainModel>().is_none());
    assert_eq!(runtime.layout_model::<AuthModel>().unwrap().banner, "welcome");
    assert_eq!(runtime.view().as_deref(), Some("[auth:welcome]login"));

    runtime.navigate("/");
    let layout = runtime.layout_model::<MainModel>().unwrap();
    assert!(!layout.sidebar_open, "coming back initialises MainLayout again");
    assert!(layout.route_changes.is_empty());
}

#[test]
fn same_page_with_new_params_keeps_model_by_default() {
    let (mut runtime, spawner) = start_at("/users/1");
    let generation = runtime.page_generation();
    assert_eq!(spawner.pending(), 1);

    runtime.navigate("/users/2");

    assert_eq!(runtime.page_generation(), generation);
    let page = runtime.page_model::<UserModel>().unwrap();
    assert_eq!(page.id, 2);
    assert_eq!(page.route_changes, 1);
    assert_eq!(spawner.pending(), 1, "init was not called again");
}

#[test]
fn page_that_opts_into_reinit_gets_a_fresh_model() {
    let mut runtime = Runtime::start_with(reloading_app(), "/items/1", RecordingSpawner::new());
    let layout_generation = runtime.layout_generation();
    let first = runtime.page_generation().unwrap();

    runtime.navigate("/items/1?tab=notes");
    assert_eq!(runtime.page_generation(), Some(first));
    assert_eq!(
        runtime.page_model::<ReloadModel>(),
        Some(&ReloadModel {
            id: 1,
            route_changes: 1
        })
    );

    runtime.navigate("/items/2");
    let second = runtime.page_generation().unwrap();
    assert!(second > first);
    assert_eq!(
        runtime.page_model::<ReloadModel>(),
        Some(&ReloadModel {
            id: 2,
            route_changes: 0
        })
    );
    assert_eq!(runtime.layout_generation(), layout_generation);
    assert_eq!(
        runtime.layout_model::<MainModel>().unwrap().route_changes,
        vec!["item".to_string(), "item".to_string()]
    );
    assert_eq!(runtime.view().as_deref(), Some("[main]item:2"));
}

#[test]
fn navigating_to_the_current_route_changes_nothing() {
    let (mut runtime, _) = start_at("/users/7");
    let generation = runtime.page_generation();

    runtime.navigate("/users/7#top");

    assert_eq!(runtime.page_generation(), generation);
    assert_eq!(runtime.page_model::<UserModel>().unwrap().route_changes, 0);
    assert!(runtime.layout_model::<MainModel>().unwrap().route_changes.is_empty());
}

#[test]
fn repeating_the_current_location_adds_no_history() {
    let (mut runtime, _) = start_at("/users/7");

    runtime.navigate("/users/7");
    runtime.navigate("/users/7/");

    assert_eq!(runtime.history().entries(), vec!["/users/7".to_string()]);
    assert!(!runtime.history().can_go_back());
    assert_eq!(runtime.stats().navigations, 1);
}

#[test]
fn pages_hand_props_to_their_layout() {
    let (mut runtime, _) = start_at("/");
    assert_eq!(runtime.layout_model::<MainModel>().unwrap().title, "Home");

    runtime.navigate("/users/8");
    assert_eq!(runtime.layout_model::<MainModel>().unwrap().title, "User 8");

    runtime.navigate("/nowhere");
    assert_eq!(
        runtime.layout_model::<MainModel>().unwrap().title,
        "",
        "pages without props hand over the default"
    );
}

#[test]
fn unknown_location_renders_not_found_page() {
    let (mut runtime, _) = start_at("/");

    runtime.navigate("/users/abc?x=1");

    let route = runtime.route().unwrap();
    assert!(route.is_not_found());
    assert_eq!(
        runtime.page_model::<NotFoundModel>().unwrap().path,
        "/users/abc"
    );
    assert_eq!(runtime.view().as_deref(), Some("[main]404:/users/abc"));
}

#[test]
fn navigate_command_runs_from_page_update() {
    let (mut runtime, _) = start_at("/");

    runtime.dispatch_page(HomeMsg::Open("/users/5".to_string()));

    assert_eq!(runtime.route().map(|r| r.name()), Some("user"));
    assert_eq!(runtime.page_model::<UserModel>().unwrap().id, 5);
}

#[test]
fn back_and_forward_replay_history() {
    let (mut runtime, _) = start_at("/");
    runtime.navigate("/users/1");
    runtime.navigate("/login");

    assert!(runtime.back());
    assert_eq!(runtime.route().map(|r| r.name()), Some("user"));
    assert!(runtime.back());
    assert_eq!(runtime.route().map(|r| r.name()), Some("home"));
    assert!(!runtime.back());

    assert!(runtime.forward());
    assert_eq!(runtime.page_model::<UserModel>().unwrap().id, 1);
    assert_eq!(runtime.history().len(), 3);
}

#[test]
fn handle_queues_navigation_until_drained() {
    let (mut runtime, _) = start_at("/");
    let handle = runtime.handle();

    assert!(handle.navigate("/login"));
    assert_eq!(runtime.route().map(|r| r.name()), Some("home"));

    assert_eq!(runtime.drain(), 1);
    assert_eq!(runtime.route().map(|r| r.name()), Some("login"));
}

#[test]
fn build_requires_not_found_page() {
    let result: Result<App<Session, View>, _> = App::builder(Session)
        .layout(MainLayout)
        .route("home", "/", HomePage)
        .build();

    assert!(matches!(result, Err(AppError::NotFoundPageMissing)));
}

#[test]
fn build_requires_every_page_layout() {
    let result: Result<App<Session, View>, _> = App::builder(Session)
        .layout(MainLayout)
        .route("login", "/login", LoginPage)
        .not_found(NotFoundPage)
        .build();

    assert!(matches!(result, Err(AppError::LayoutNotRegistered { .. })));
}

#[test]
fn build_reports_bad_templates() {
    let result: Result<App<Session, View>, _> = App::builder(Session)
        .layout(MainLayout)
        .route("user", "/users/:id<float>", UserPage)
        .not_found(NotFoundPage)
        .build();

    assert!(matches!(result, Err(AppError::Route(_))));
}

#[test]
fn start_outside_tokio_is_an_error() {
    let result = Runtime::start(fixture_app(), "/");
    assert!(matches!(result, Err(AppError::NoAsyncRuntime)));
}
