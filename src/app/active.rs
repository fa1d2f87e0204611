//! # In-flight invocation tracker.
//!
//! [`ActiveTracker`] maintains the authoritative picture of which tasks are
//! currently mid-invocation, fed from the event stream and guarded by event
//! sequence numbers so out-of-order delivery cannot corrupt it. Its snapshot
//! names the stuck tasks when shutdown exceeds the grace period.
//!
//! ## Rules
//! - `TaskStarting` marks a task in flight; `TaskCompleted` / `TaskFailed` /
//!   `TriggerExhausted` clear it. Other events only advance the seq cursor.
//! - Events with `seq <= last_seq` for the task are rejected as stale.
//! - Reads (`snapshot`, `is_active`) are eventually consistent.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::events::{Event, EventKind};
use crate::tasks::TaskId;

/// Per-task state for ordering validation.
struct Entry {
    name: String,
    last_seq: u64,
    active: bool,
}

/// Thread-safe tracker of in-flight task invocations, keyed by [`TaskId`].
pub(crate) struct ActiveTracker {
    state: RwLock<HashMap<TaskId, Entry>>,
}

impl ActiveTracker {
    /// Creates an empty tracker.
    pub(crate) fn new() -> Self {
        Self {
            state: RwLock::new(HashMap::new()),
        }
    }

    /// Applies an event if it is newer than the last seen for its task.
    ///
    /// Returns true when the active flag changed.
    pub(crate) async fn update(&self, ev: &Event) -> bool {
        let (Some(id), Some(name)) = (ev.task_id, ev.task.as_deref()) else {
            return false;
        };

        let mut state = self.state.write().await;
        let entry = state.entry(id).or_insert_with(|| Entry {
            name: name.to_string(),
            last_seq: 0,
            active: false,
        });

        if ev.seq <= entry.last_seq {
            return false;
        }
        entry.last_seq = ev.seq;
        match ev.kind {
            EventKind::TaskStarting => {
                entry.active = true;
                true
            }
            EventKind::TaskCompleted | EventKind::TaskFailed | EventKind::TriggerExhausted => {
                entry.active = false;
                true
            }
            _ => false,
        }
    }

    /// Sorted names of tasks currently mid-invocation.
    pub(crate) async fn snapshot(&self) -> Vec<String> {
        let state = self.state.read().await;
        let mut active: Vec<String> = state
            .values()
            .filter(|e| e.active)
            .map(|e| e.name.clone())
            .collect();
        active.sort_unstable();
        active
    }

    /// True if the task is currently mid-invocation.
    #[cfg(test)]
    pub(crate) async fn is_active(&self, id: TaskId) -> bool {
        self.state
            .read()
            .await
            .get(&id)
            .map(|e| e.active)
            .unwrap_or(false)
    }
}
