//! Type-safe routing.
//!
//! ```text
//! "/users/42?tab=posts" ──→ Router::resolve ──→ Route { name: "user", id = 42, tab = "posts" }
//!                                   │
//!                                   └──→ NoMatch (caller shows the not-found page)
//! ```
//!
//! Templates are compared segment by segment in registration order; the
//! first template whose literals are equal and whose parameters all parse
//! wins.

mod error;
mod params;
mod route;
mod router;
mod template;

pub use error::RouteError;
pub use params::{FromParam, ParamKind, ParamValue};
pub use route::{NoMatch, Route, NOT_FOUND_ROUTE};
pub use router::Router;
pub use template::{QueryField, RouteTemplate, Segment};
