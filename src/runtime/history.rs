use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

/// Bounded back/forward stack of visited locations.
///
/// Cheap to clone; clones share the same entries so a host can read it
/// while the runtime owns the writer side.
#[derive(Debug, Clone)]
pub struct NavigationHistory {
    inner: Arc<Mutex<HistoryInner>>,
}

#[derive(Debug)]
struct HistoryInner {
    entries: VecDeque<String>,
    cursor: usize,
    limit: usize,
}

impl NavigationHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HistoryInner {
                entries: VecDeque::new(),
                cursor: 0,
                limit: limit.max(1),
            })),
        }
    }

    /// Record a new location. Anything ahead of the cursor is dropped.
    pub fn push(&self, location: &str) {
        let mut inner = self.inner.lock();
        if !inner.entries.is_empty() {
            let keep = inner.cursor + 1;
            inner.entries.truncate(keep);
        }
        inner.entries.push_back(location.to_string());
        while inner.entries.len() > inner.limit {
            inner.entries.pop_front();
        }
        inner.cursor = inner.entries.len() - 1;
    }

    pub fn back(&self) -> Option<String> {
        let mut inner = self.inner.lock();
        if inner.cursor == 0 {
            return None;
        }
        inner.cursor -= 1;
        inner.entries.get(inner.cursor).cloned()
    }

    pub fn forward(&self) -> Option<String> {
        let mut inner = self.inner.lock();
        if inner.cursor + 1 >= inner.entries.len() {
            return None;
        }
        inner.cursor += 1;
        inner.entries.get(inner.cursor).cloned()
    }

    pub fn current(&self) -> Option<String> {
        let inner = self.inner.lock();
        inner.entries.get(inner.cursor).cloned()
    }

    pub fn can_go_back(&self) -> bool {
        self.inner.lock().cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        let inner = self.inner.lock();
        inner.cursor + 1 < inner.entries.len()
    }

    pub fn entries(&self) -> Vec<String> {
        self.inner.lock().entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }
}
