//! In-memory reference implementation of the record store.

use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use uuid::Uuid;

use crate::domain::repository::OtpRepository;
use crate::domain::types::{OtpMethod, OtpPurpose, OtpRecord, OtpStatus};
use crate::error::OtpServiceError;

/// Keeps records in a `Vec` behind a mutex. Suits tests and single-node
/// deployments; anything else wants a database-backed store implementing the
/// same trait.
#[derive(Clone, Default)]
pub struct InMemoryOtpRepository {
    records: Arc<Mutex<Vec<OtpRecord>>>,
}

impl InMemoryOtpRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored record, for inspection in tests.
    pub fn records(&self) -> Vec<OtpRecord> {
        self.records.lock().expect("record store poisoned").clone()
    }

    /// Seed a record directly, bypassing the send flow.
    pub fn insert(&self, record: OtpRecord) {
        self.records.lock().expect("record store poisoned").push(record);
    }
}

impl OtpRepository for InMemoryOtpRepository {
    async fn find_active(
        &self,
        user_id: Uuid,
        method: OtpMethod,
        purpose: OtpPurpose,
    ) -> Result<Option<OtpRecord>, OtpServiceError> {
        Ok(self
            .records
            .lock()
            .expect("record store poisoned")
            .iter()
            .find(|r| {
                r.user_id == user_id
                    && r.method == method
                    && r.purpose == purpose
                    && r.status == OtpStatus::Active
            })
            .cloned())
    }

    async fn create(&self, record: &OtpRecord) -> Result<(), OtpServiceError> {
        self.records
            .lock()
            .expect("record store poisoned")
            .push(record.clone());
        Ok(())
    }

    async fn save(&self, record: &OtpRecord) -> Result<(), OtpServiceError> {
        let mut records = self.records.lock().expect("record store poisoned");
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(slot) => {
                *slot = record.clone();
                Ok(())
            }
            None => Err(OtpServiceError::Internal(anyhow!(
                "save of unknown record {}",
                record.id
            ))),
        }
    }
}
