//! Shared fixtures: a small application with two layouts and a spawner
//! that holds effects until the test runs them.

#![allow(dead_code, unused_imports)]

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

use elmland::command::Command;
use elmland::program::{Context, Dispatch, Layout, Page, Shared};
use elmland::routing::Route;
use elmland::runtime::{App, EffectSpawner, Runtime};
use futures_core::future::BoxFuture;
use parking_lot::Mutex;
use tempfile::TempDir;

pub type View = String;

// ── Shared ───────────────────────────────────────────────────────────

pub struct Session;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionModel {
    pub logged_in: bool,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionMsg {
    SignIn,
    SetLoggedOut,
    Note(String),
}

impl Shared for Session {
    type Model = SessionModel;
    type Msg = SessionMsg;

    fn init(&self) -> (SessionModel, Command<SessionMsg, SessionMsg>) {
        (
            SessionModel {
                logged_in: true,
                notes: Vec::new(),
            },
            Command::none(),
        )
    }

    fn update(
        &self,
        msg: SessionMsg,
        mut model: SessionModel,
    ) -> (SessionModel, Command<SessionMsg, SessionMsg>) {
        match msg {
            SessionMsg::SignIn => model.logged_in = true,
            SessionMsg::SetLoggedOut => model.logged_in = false,
            SessionMsg::Note(note) => model.notes.push(note),
        }
        (model, Command::none())
    }
}

// ── Layouts ──────────────────────────────────────────────────────────

pub struct MainLayout;

#[derive(Debug, Clone, PartialEq)]
pub struct MainModel {
    pub sidebar_open: bool,
    pub route_changes: Vec<String>,
    pub logged_in_at_init: bool,
    pub title: String,
}

/// Supplied by each page; the not-found page leaves the title empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MainProps {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MainMsg {
    ToggleSidebar,
}

impl Layout<Session, View> for MainLayout {
    type Model = MainModel;
    type Msg = MainMsg;
    type Props = MainProps;

    fn init(
        &self,
        props: MainProps,
        shared: &SessionModel,
        _route: &Route,
    ) -> (MainModel, Command<MainMsg, SessionMsg>) {
        (
            MainModel {
                sidebar_open: false,
                route_changes: Vec::new(),
                logged_in_at_init: shared.logged_in,
                title: props.title,
            },
            Command::none(),
        )
    }

    fn update(
        &self,
        msg: MainMsg,
        mut model: MainModel,
        _shared: &SessionModel,
    ) -> (MainModel, Command<MainMsg, SessionMsg>) {
        match msg {
            MainMsg::ToggleSidebar => model.sidebar_open = !model.sidebar_open,
        }
        (model, Command::none())
    }

    fn route_changed(
        &self,
        props: MainProps,
        route: &Route,
        mut model: MainModel,
        _shared: &SessionModel,
    ) -> (MainModel, Command<MainMsg, SessionMsg>) {
        model.route_changes.push(route.name().to_string());
        model.title = props.title;
        (model, Command::none())
    }

    fn view(&self, model: &MainModel, content: View, _dispatch: &Dispatch<MainMsg>) -> View {
        let sidebar = if model.sidebar_open { "+sidebar" } else { "" };
        format!("[main{sidebar}]{content}")
    }
}

pub struct AuthLayout;

#[derive(Debug, Clone, PartialEq)]
pub struct AuthModel {
    pub banner: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthMsg {
    SetBanner(String),
}

impl Layout<Session, View> for AuthLayout {
    type Model = AuthModel;
    type Msg = AuthMsg;
    type Props = ();

    fn init(
        &self,
        _props: (),
        _shared: &SessionModel,
        _route: &Route,
    ) -> (AuthModel, Command<AuthMsg, SessionMsg>) {
        (
            AuthModel {
                banner: "welcome".to_string(),
            },
            Command::none(),
        )
    }

    fn update(
        &self,
        msg: AuthMsg,
        mut model: AuthModel,
        _shared: &SessionModel,
    ) -> (AuthModel, Command<AuthMsg, SessionMsg>) {
        match msg {
            AuthMsg::SetBanner(banner) => model.banner = banner,
        }
        (model, Command::none())
    }

    fn view(&self, model: &AuthModel, content: View, _dispatch: &Dispatch<AuthMsg>) -> View {
        format!("[auth:{}]{content}", model.banner)
    }
}

// ── Pages ────────────────────────────────────────────────────────────

pub struct HomePage;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HomeModel {
    pub clicks: u32,
    pub saw_logged_in: Vec<bool>,
    /// Sidebar state as seen each time the layout toggled it.
    pub sidebar_seen: Vec<bool>,
}

pub enum HomeMsg {
    Click,
    ToggleSidebar,
    Logout,
    Open(String),
    Note(String),
    Run(Box<Command<HomeMsg, SessionMsg>>),
    FromLayout(MainMsg),
}

impl Page<Session, View> for HomePage {
    type Layout = MainLayout;
    type Model = HomeModel;
    type Msg = HomeMsg;

    fn init(
        &self,
        _shared: &SessionModel,
        _route: &Route,
    ) -> (HomeModel, Command<HomeMsg, SessionMsg>) {
        (HomeModel::default(), Command::none())
    }

    fn update(
        &self,
        msg: HomeMsg,
        mut model: HomeModel,
        ctx: &Context<'_, SessionModel, MainModel>,
    ) -> (HomeModel, Command<HomeMsg, SessionMsg>) {
        if let HomeMsg::FromLayout(MainMsg::ToggleSidebar) = msg {
            model.sidebar_seen.push(ctx.layout.sidebar_open);
            return (model, Command::none());
        }
        model.saw_logged_in.push(ctx.shared.logged_in);
        match msg {
            HomeMsg::Click => {
                model.clicks += 1;
                (model, Command::none())
            }
            HomeMsg::Logout => (model, Command::from_shared(SessionMsg::SetLoggedOut)),
            HomeMsg::Open(location) => (model, Command::navigate(location)),
            HomeMsg::Note(note) => (model, Command::from_shared(SessionMsg::Note(note))),
            HomeMsg::Run(command) => (model, *command),
            HomeMsg::ToggleSidebar | HomeMsg::FromLayout(_) => (model, Command::none()),
        }
    }

    fn view(&self, model: &HomeModel, _dispatch: &Dispatch<HomeMsg>) -> View {
        format!("home:{}", model.clicks)
    }

    fn to_layout_msg(&self, msg: HomeMsg) -> Result<MainMsg, HomeMsg> {
        match msg {
            HomeMsg::ToggleSidebar => Ok(MainMsg::ToggleSidebar),
            other => Err(other),
        }
    }

    fn from_layout_msg(&self, msg: &MainMsg) -> Option<HomeMsg> {
        Some(HomeMsg::FromLayout(msg.clone()))
    }

    fn layout_props(&self, _shared: &SessionModel, _route: &Route) -> MainProps {
        MainProps {
            title: "Home".to_string(),
        }
    }
}

pub struct UserPage;

#[derive(Debug, Clone, PartialEq)]
pub struct UserModel {
    pub id: i64,
    pub name: Option<String>,
    pub error: Option<String>,
    pub route_changes: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UserMsg {
    Loaded(Result<String, String>),
}

impl Page<Session, View> for UserPage {
    type Layout = MainLayout;
    type Model = UserModel;
    type Msg = UserMsg;

    /// Starts loading the user as soon as the page opens; id 0 fails.
    fn init(
        &self,
        _shared: &SessionModel,
        route: &Route,
    ) -> (UserModel, Command<UserMsg, SessionMsg>) {
        let id = route.get::<i64>("id").unwrap_or_default();
        let load = Command::from_effect(
            async move {
                if id == 0 {
                    Err(format!("user {id} not found"))
                } else {
                    Ok(format!("user-{id}"))
                }
            },
            UserMsg::Loaded,
        );
        (
            UserModel {
                id,
                name: None,
                error: None,
                route_changes: 0,
            },
            load,
        )
    }

    fn update(
        &self,
        msg: UserMsg,
        mut model: UserModel,
        _ctx: &Context<'_, SessionModel, MainModel>,
    ) -> (UserModel, Command<UserMsg, SessionMsg>) {
        match msg {
            UserMsg::Loaded(Ok(name)) => model.name = Some(name),
            UserMsg::Loaded(Err(error)) => model.error = Some(error),
        }
        (model, Command::none())
    }

    fn route_changed(
        &self,
        route: &Route,
        mut model: UserModel,
        _shared: &SessionModel,
    ) -> (UserModel, Command<UserMsg, SessionMsg>) {
        model.id = route.get::<i64>("id").unwrap_or_default();
        model.route_changes += 1;
        (model, Command::none())
    }

    fn layout_props(&self, _shared: &SessionModel, route: &Route) -> MainProps {
        MainProps {
            title: format!("User {}", route.get::<i64>("id").unwrap_or_default()),
        }
    }

    fn view(&self, model: &UserModel, _dispatch: &Dispatch<UserMsg>) -> View {
        match &model.name {
            Some(name) => format!("user:{name}"),
            None => format!("user:{}:loading", model.id),
        }
    }
}

pub struct LoginPage;

#[derive(Debug, Clone, PartialEq)]
pub struct LoginModel {
    pub logged_in_at_init: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoginMsg {
    Submit,
}

impl Page<Session, View> for LoginPage {
    type Layout = AuthLayout;
    type Model = LoginModel;
    type Msg = LoginMsg;

    fn init(
        &self,
        shared: &SessionModel,
        _route: &Route,
    ) -> (LoginModel, Command<LoginMsg, SessionMsg>) {
        (
            LoginModel {
                logged_in_at_init: shared.logged_in,
            },
            Command::none(),
        )
    }

    fn update(
        &self,
        msg: LoginMsg,
        model: LoginModel,
        _ctx: &Context<'_, SessionModel, AuthModel>,
    ) -> (LoginModel, Command<LoginMsg, SessionMsg>) {
        match msg {
            LoginMsg::Submit => (
                model,
                Command::batch([Command::from_shared(SessionMsg::SignIn), Command::navigate("/")]),
            ),
        }
    }

    fn view(&self, _model: &LoginModel, _dispatch: &Dispatch<LoginMsg>) -> View {
        "login".to_string()
    }
}

pub struct NotFoundPage;

#[derive(Debug, Clone, PartialEq)]
pub struct NotFoundModel {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NotFoundMsg {}

impl Page<Session, View> for NotFoundPage {
    type Layout = MainLayout;
    type Model = NotFoundModel;
    type Msg = NotFoundMsg;

    fn init(
        &self,
        _shared: &SessionModel,
        route: &Route,
    ) -> (NotFoundModel, Command<NotFoundMsg, SessionMsg>) {
        (
            NotFoundModel {
                path: route.path().to_string(),
            },
            Command::none(),
        )
    }

    fn update(
        &self,
        msg: NotFoundMsg,
        _model: NotFoundModel,
        _ctx: &Context<'_, SessionModel, MainModel>,
    ) -> (NotFoundModel, Command<NotFoundMsg, SessionMsg>) {
        match msg {}
    }

    fn view(&self, model: &NotFoundModel, _dispatch: &Dispatch<NotFoundMsg>) -> View {
        format!("404:{}", model.path)
    }
}

/// The fixture application: `/`, `/users/:id<int>` and `/login`.
pub fn fixture_app() -> App<Session, View> {
    App::builder(Session)
        .layout(MainLayout)
        .layout(AuthLayout)
        .route("home", "/", HomePage)
        .route("user", "/users/:id<int>", UserPage)
        .route("login", "/login", LoginPage)
        .not_found(NotFoundPage)
        .build()
        .expect("fixture app should build")
}

// ── Effects ──────────────────────────────────────────────────────────

/// Queues every spawned task so tests decide when effects run.
#[derive(Default)]
pub struct RecordingSpawner {
    tasks: Mutex<VecDeque<BoxFuture<'static, ()>>>,
}

impl RecordingSpawner {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn pending(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Run queued tasks to completion, oldest first.
    pub async fn run_all(&self) {
        loop {
            let task = self.tasks.lock().pop_front();
            match task {
                Some(task) => task.await,
                None => break,
            }
        }
    }

    /// Drop queued tasks without running them.
    pub fn forget(&self) {
        self.tasks.lock().clear();
    }
}

impl EffectSpawner for RecordingSpawner {
    fn spawn(&self, task: BoxFuture<'static, ()>) {
        self.tasks.lock().push_back(task);
    }
}

/// Start the fixture application at `location` with a recording spawner.
pub fn start_at(location: &str) -> (Runtime<Session, View>, Arc<RecordingSpawner>) {
    let spawner = RecordingSpawner::new();
    let runtime = Runtime::start_with(fixture_app(), location, spawner.clone());
    (runtime, spawner)
}

/// Write `content` to an `elmland.toml` inside a fresh temp dir.
pub fn temp_manifest(content: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("elmland.toml");
    std::fs::write(&path, content).expect("Failed to write manifest");
    (dir, path)
}
