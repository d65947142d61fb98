//! Command algebra.
//!
//! Update functions never perform side effects; they return a [`Command`]
//! describing what they want done and the runtime executes it.
//!
//! ```text
//! update(msg, model) ──→ (model, Command) ──→ Runtime::execute
//!                                                  │
//!          ┌──────────────┬──────────────┬─────────┴──────┬────────────┐
//!       Message        Effect          Shared          Navigate      Batch
//!     (same tier)   (spawned, result  (Shared.update   (route        (each, left
//!                    re-enters loop)   immediately)     change)       to right)
//! ```

mod effect;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

pub use effect::{with_timeout, Effect, EffectError};

/// Description of work for the runtime, parameterised over the local message
/// type of the tier that produced it and the Shared message type.
pub enum Command<Msg, SharedMsg> {
    None,
    /// Re-dispatch a message to the originating tier.
    Message(Msg),
    Effect(Effect<Msg>),
    /// Dispatch a message to Shared's update, exactly once.
    Shared(SharedMsg),
    Navigate(String),
    Batch(Vec<Command<Msg, SharedMsg>>),
}

impl<Msg, SharedMsg> Command<Msg, SharedMsg> {
    pub fn none() -> Self {
        Command::None
    }

    pub fn of_msg(msg: Msg) -> Self {
        Command::Message(msg)
    }

    pub fn from_shared(msg: SharedMsg) -> Self {
        Command::Shared(msg)
    }

    pub fn navigate(location: impl Into<String>) -> Self {
        Command::Navigate(location.into())
    }

    /// Wrap fallible asynchronous work; `map_result` turns its outcome,
    /// success or failure, into a local message.
    pub fn from_effect<F, T, E, M>(future: F, map_result: M) -> Self
    where
        Msg: Send + 'static,
        F: Future<Output = Result<T, E>> + Send + 'static,
        M: FnOnce(Result<T, E>) -> Msg + Send + 'static,
    {
        Command::Effect(Effect::new(async move { map_result(future.await) }))
    }

    /// Wrap asynchronous work that cannot fail.
    pub fn perform<F, T, M>(future: F, map: M) -> Self
    where
        Msg: Send + 'static,
        F: Future<Output = T> + Send + 'static,
        M: FnOnce(T) -> Msg + Send + 'static,
    {
        Command::Effect(Effect::new(async move { map(future.await) }))
    }

    /// Combine commands. Nested batches are flattened and `None`s dropped,
    /// so `batch([none(), c])` is `c`.
    pub fn batch<I>(commands: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let mut leaves = Vec::new();
        for command in commands {
            command.flatten_into(&mut leaves);
        }
        if leaves.len() > 1 {
            Command::Batch(leaves)
        } else {
            leaves.pop().unwrap_or(Command::None)
        }
    }

    pub fn is_none(&self) -> bool {
        match self {
            Command::None => true,
            Command::Batch(commands) => commands.iter().all(Command::is_none),
            _ => false,
        }
    }

    /// Leaf commands in execution order.
    pub fn into_steps(self) -> Vec<Self> {
        let mut leaves = Vec::new();
        self.flatten_into(&mut leaves);
        leaves
    }

    fn flatten_into(self, out: &mut Vec<Self>) {
        match self {
            Command::None => {}
            Command::Batch(commands) => {
                for command in commands {
                    command.flatten_into(out);
                }
            }
            leaf => out.push(leaf),
        }
    }

    /// Lift the local message type; Shared messages and navigation pass
    /// through unchanged.
    pub fn map<N, F>(self, f: F) -> Command<N, SharedMsg>
    where
        Msg: Send + 'static,
        N: Send + 'static,
        F: Fn(Msg) -> N + Send + Sync + 'static,
    {
        self.map_with(&Arc::new(f))
    }

    fn map_with<N, F>(self, f: &Arc<F>) -> Command<N, SharedMsg>
    where
        Msg: Send + 'static,
        N: Send + 'static,
        F: Fn(Msg) -> N + Send + Sync + 'static,
    {
        match self {
            Command::None => Command::None,
            Command::Message(msg) => Command::Message(f(msg)),
            Command::Effect(effect) => {
                let f = Arc::clone(f);
                Command::Effect(effect.map(move |msg| f(msg)))
            }
            Command::Shared(msg) => Command::Shared(msg),
            Command::Navigate(location) => Command::Navigate(location),
            Command::Batch(commands) => Command::Batch(
                commands
                    .into_iter()
                    .map(|command| command.map_with(f))
                    .collect(),
            ),
        }
    }
}

impl<Msg, SharedMsg> Default for Command<Msg, SharedMsg> {
    fn default() -> Self {
        Command::None
    }
}

impl<Msg: fmt::Debug, SharedMsg: fmt::Debug> fmt::Debug for Command<Msg, SharedMsg> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::None => f.write_str("None"),
            Command::Message(msg) => f.debug_tuple("Message").field(msg).finish(),
            Command::Effect(effect) => fmt::Debug::fmt(effect, f),
            Command::Shared(msg) => f.debug_tuple("Shared").field(msg).finish(),
            Command::Navigate(location) => f.debug_tuple("Navigate").field(location).finish(),
            Command::Batch(commands) => f.debug_tuple("Batch").field(commands).finish(),
        }
    }
}
