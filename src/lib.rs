//! Elm-architecture application runtime with typed routing.
//!
//! An application is three tiers of `init`/`update`/`view` state machines:
//! a single [`Shared`](program::Shared) tier, a [`Layout`](program::Layout)
//! per group of pages and a [`Page`](program::Page) per route. Updates
//! return a [`Command`](command::Command) and the [`Runtime`](runtime::Runtime)
//! carries it out.

pub mod command;
pub mod config;
pub mod logging;
pub mod program;
pub mod routing;
pub mod runtime;
pub mod shutdown;

pub use command::Command;
pub use program::{Context, Dispatch, Layout, Page, Shared, Subscription};
pub use routing::{Route, Router};
pub use runtime::{App, AppBuilder, AppError, Runtime, RuntimeHandle};
