use std::collections::{HashMap, HashSet};

use tokio::sync::oneshot;

use crate::program::{Dispatch, Subscription, SubscriptionId};
use crate::runtime::spawner::EffectSpawner;

/// Running subscriptions of one tier, keyed by id.
///
/// Each running task races its source against a stop channel; dropping the
/// sender is the cancellation signal.
#[derive(Default)]
pub(crate) struct SubscriptionSet {
    active: HashMap<SubscriptionId, oneshot::Sender<()>>,
}

impl SubscriptionSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Start subscriptions whose id is new and stop those whose id is gone.
    /// Subscriptions with an id already running are left alone.
    pub(crate) fn sync<M: Send + 'static>(
        &mut self,
        wanted: Vec<Subscription<M>>,
        dispatch: &Dispatch<M>,
        spawner: &dyn EffectSpawner,
    ) {
        let ids: HashSet<SubscriptionId> = wanted.iter().map(|sub| sub.id().clone()).collect();
        self.active.retain(|id, _| {
            let keep = ids.contains(id);
            if !keep {
                tracing::debug!(subscription = %id, "subscription stopped");
            }
            keep
        });

        for sub in wanted {
            if self.active.contains_key(sub.id()) {
                continue;
            }
            let id = sub.id().clone();
            let (stop_tx, stop_rx) = oneshot::channel::<()>();
            let source = sub.start(dispatch.clone());
            spawner.spawn(Box::pin(async move {
                tokio::select! {
                    _ = stop_rx => {}
                    _ = source => {}
                }
            }));
            tracing::debug!(subscription = %id, "subscription started");
            self.active.insert(id, stop_tx);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.active.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.active.len()
    }
}
