//! The three tiers an application is built from.
//!
//! ```text
//! Shared ──────────── one per application, outlives everything
//!   └── Layout ────── one active at a time, survives page changes within it
//!         └── Page ── one active at a time, replaced on every page change
//! ```
//!
//! Each tier is an `init`/`update`/`view` state machine. Updates are pure:
//! they take the model by value and hand back the next model plus a
//! [`Command`](crate::command::Command).

mod dispatch;
mod layout;
mod page;
mod shared;
mod subscription;

pub use dispatch::Dispatch;
pub use layout::{Layout, LayoutCommand};
pub use page::{Context, LayoutModelOf, LayoutMsgOf, LayoutPropsOf, Page, PageCommand};
pub use shared::{Shared, SharedCommand};
pub use subscription::{Subscription, SubscriptionId};
