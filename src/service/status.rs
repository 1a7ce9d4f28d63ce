use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Bookkeeping for background schema syncs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncStatus {
    pub last_attempt: Option<DateTime<Utc>>,
    pub last_success: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
    pub total_syncs: u64,
    pub last_error: Option<String>,
}

impl SyncStatus {
    pub fn is_healthy(&self) -> bool {
        self.consecutive_failures == 0
    }
}

pub(crate) struct SyncStatusTracker {
    status: ArcSwap<SyncStatus>,
}

impl SyncStatusTracker {
    pub(crate) fn new() -> Self {
        SyncStatusTracker {
            status: ArcSwap::from_pointee(SyncStatus::default()),
        }
    }

    pub(crate) fn get(&self) -> SyncStatus {
        SyncStatus::clone(&self.status.load())
    }

    pub(crate) fn record_success(&self) {
        let now = Utc::now();
        self.status.rcu(|current| {
            let mut next = SyncStatus::clone(current);
            next.last_attempt = Some(now);
            next.last_success = Some(now);
            next.consecutive_failures = 0;
            next.total_syncs += 1;
            next.last_error = None;
            Arc::new(next)
        });
    }

    pub(crate) fn record_failure(&self, error: &str) {
        let now = Utc::now();
        self.status.rcu(|current| {
            let mut next = SyncStatus::clone(current);
            next.last_attempt = Some(now);
            next.consecutive_failures = next.consecutive_failures.saturating_add(1);
            next.total_syncs += 1;
            next.last_error = Some(error.to_string());
            Arc::new(next)
        });
    }
}
