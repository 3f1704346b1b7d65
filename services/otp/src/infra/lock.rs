//! Per-tuple mutual exclusion for the supersede-then-create sequence.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::domain::types::{OtpMethod, OtpPurpose};

type TupleKey = (Uuid, OtpMethod, OtpPurpose);

/// Serializes sends per (user, method, purpose) so two concurrent sends
/// cannot both observe "no active record" and create two Active rows.
///
/// Entries are never evicted; the registry is bounded by the tuples that
/// actually send.
#[derive(Default)]
pub struct TupleLocks {
    inner: Mutex<HashMap<TupleKey, Arc<AsyncMutex<()>>>>,
}

impl TupleLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(
        &self,
        user_id: Uuid,
        method: OtpMethod,
        purpose: OtpPurpose,
    ) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().expect("tuple lock registry poisoned");
            Arc::clone(map.entry((user_id, method, purpose)).or_default())
        };
        lock.lock_owned().await
    }
}
