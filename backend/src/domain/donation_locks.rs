//! Per-donation serialisation of workflow mutations.
//!
//! Request creation and status transitions on the same donation must not
//! interleave inside one process. Each donation id maps to its own async
//! mutex; idle entries are pruned whenever a new guard is handed out.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use super::DonationId;

/// Registry of per-donation async mutexes.
#[derive(Debug, Default, Clone)]
pub struct DonationLocks {
    inner: Arc<Mutex<HashMap<DonationId, Arc<Mutex<()>>>>>,
}

impl DonationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `donation_id`.
    ///
    /// The guard releases the donation when dropped.
    pub async fn acquire(&self, donation_id: DonationId) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.inner.lock().await;
            slots.retain(|id, slot| *id == donation_id || Arc::strong_count(slot) > 1);
            Arc::clone(slots.entry(donation_id).or_default())
        };
        slot.lock_owned().await
    }

    /// Number of donations with a live lock entry.
    pub async fn tracked(&self) -> usize {
        self.inner.lock().await.len()
    }
}
