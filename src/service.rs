// 🧾 Equipment Service - Batch creation and single-record updates
//
// Batch policy: every candidate is validated and reported on its own, but
// the batch only persists when no candidate failed.

use crate::db::EquipmentStore;
use crate::entities::{EquipmentCandidate, EquipmentRecord};
use crate::error::{RegistryError, RegistryResult};
use crate::mask::{MaskCompiler, MaskPolicy};
use crate::validator::SerialNumberValidator;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

// ============================================================================
// BATCH RESULT
// ============================================================================

/// Per-candidate outcome of `create_many`, keyed by input position.
///
/// Every input index appears in exactly one of the two maps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchResult {
    pub successes: BTreeMap<usize, EquipmentRecord>,
    pub failures: BTreeMap<usize, String>,

    /// False when the batch was rolled back. Success ids are then not durable.
    pub committed: bool,
}

impl BatchResult {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} succeeded, {} failed, {}",
            self.successes.len(),
            self.failures.len(),
            if self.committed { "committed" } else { "rolled back" }
        )
    }
}

// ============================================================================
// EQUIPMENT SERVICE
// ============================================================================

pub struct EquipmentService {
    compiler: MaskCompiler,
}

impl EquipmentService {
    pub fn new(policy: MaskPolicy) -> Self {
        EquipmentService {
            compiler: MaskCompiler::new(policy),
        }
    }

    /// Validate and stage every candidate in one transaction.
    ///
    /// Failures never stop the loop. Staged rows are visible to the
    /// uniqueness check of later candidates. The transaction commits only
    /// when there are no failures; otherwise everything is rolled back and
    /// the full result is still returned.
    ///
    /// Errors only when the transaction itself cannot begin, commit or roll back.
    pub fn create_many(
        &self,
        conn: &mut Connection,
        candidates: &[EquipmentCandidate],
    ) -> RegistryResult<BatchResult> {
        let batch_id = Uuid::new_v4();
        let span = tracing::info_span!("create_many", %batch_id, candidates = candidates.len());
        let _enter = span.enter();

        let mut result = BatchResult::default();
        let validator = SerialNumberValidator::new(&self.compiler);
        let tx = conn.transaction()?;

        for (index, candidate) in candidates.iter().enumerate() {
            match stage(&validator, &tx, candidate) {
                Ok(record) => {
                    tracing::debug!(index, id = record.id, serial_number = %record.serial_number, "Staged equipment");
                    result.successes.insert(index, record);
                }
                Err(err) => {
                    if err.is_validation() {
                        tracing::warn!(index, serial_number = %candidate.serial_number, error = %err, "Rejected candidate");
                    } else {
                        tracing::error!(index, serial_number = %candidate.serial_number, error = %err, "Failed to stage candidate");
                    }
                    result.failures.insert(index, err.to_string());
                }
            }
        }

        if !result.is_clean() {
            tx.rollback()?;
            tracing::info!(
                successes = result.successes.len(),
                failures = result.failures.len(),
                "Batch rolled back"
            );
            return Ok(result);
        }

        tx.commit()?;
        result.committed = true;
        tracing::info!(successes = result.successes.len(), "Batch committed");

        Ok(result)
    }

    /// Apply new values to an existing record.
    ///
    /// The serial number is checked against the mask of the (possibly new)
    /// type. Existing records are not consulted, so a record may keep its
    /// own serial number; the storage index still rejects a collision with
    /// another live record. On any error nothing is written.
    pub fn update(
        &self,
        conn: &mut Connection,
        existing: &EquipmentRecord,
        data: &EquipmentCandidate,
    ) -> RegistryResult<EquipmentRecord> {
        let validator = SerialNumberValidator::new(&self.compiler);

        let tx = conn.transaction()?;
        validator.check_format(&*tx, data.equipment_type_id, &data.serial_number)?;
        tx.update_equipment(existing.id, data)?;
        tx.commit()?;

        tracing::info!(id = existing.id, serial_number = %data.serial_number, "Updated equipment");

        conn.fetch_with_type(existing.id)?
            .ok_or(RegistryError::RecordNotFound(existing.id))
    }

    /// `update` addressed by record id
    pub fn update_by_id(
        &self,
        conn: &mut Connection,
        id: i64,
        data: &EquipmentCandidate,
    ) -> RegistryResult<EquipmentRecord> {
        let existing = self.show(conn, id)?;
        self.update(conn, &existing, data)
    }

    pub fn show(&self, conn: &Connection, id: i64) -> RegistryResult<EquipmentRecord> {
        conn.fetch_with_type(id)?
            .ok_or(RegistryError::RecordNotFound(id))
    }

    /// Soft-delete a record; its serial number becomes available again.
    pub fn delete(&self, conn: &Connection, id: i64) -> RegistryResult<()> {
        if !conn.soft_delete_equipment(id)? {
            return Err(RegistryError::RecordNotFound(id));
        }
        tracing::info!(id, "Deleted equipment");
        Ok(())
    }
}

impl Default for EquipmentService {
    fn default() -> Self {
        Self::new(MaskPolicy::default())
    }
}

/// Validate one candidate and write it inside the open transaction.
fn stage(
    validator: &SerialNumberValidator<'_>,
    store: &Connection,
    candidate: &EquipmentCandidate,
) -> RegistryResult<EquipmentRecord> {
    validator.validate(store, candidate.equipment_type_id, &candidate.serial_number)?;
    store.create_equipment(candidate)
}
