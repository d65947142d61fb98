//! The dispatcher that owns all tier models.
//!
//! ```text
//!   view / subscription / effect / host
//!                  │
//!                  ▼
//!        mpsc::unbounded ──→ Runtime::deliver
//!                                 │ generation check
//!                 ┌───────────────┼────────────────┐
//!              Shared           Layout            Page ──to_layout_msg──→ Layout
//!                 └──────── execute(Command) ──────┘
//! ```

mod app;
mod dispatcher;
mod envelope;
mod erased;
mod error;
mod history;
mod spawner;
mod subscriptions;

pub use app::{App, AppBuilder};
pub use dispatcher::{Runtime, RuntimeStats};
pub use envelope::{Generation, RuntimeHandle};
pub use error::{AppError, Tier, TierError};
pub use history::NavigationHistory;
pub use spawner::{EffectSpawner, TokioSpawner};
