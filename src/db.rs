use crate::entities::{EquipmentCandidate, EquipmentRecord, EquipmentType};
use crate::error::{RegistryError, RegistryResult};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// Column list for `equipment` queries.
const EQUIPMENT_COLUMNS: &str = "\
    e.id, e.equipment_type_id, e.serial_number, e.description, \
    e.created_at, e.updated_at, e.deleted_at";

/// Column list for `equipment_types` queries.
const TYPE_COLUMNS: &str = "t.id, t.name, t.mask, t.created_at, t.updated_at";

// ============================================================================
// REPOSITORY TRAITS
// ============================================================================

/// Read-only access to the equipment type catalog.
pub trait EquipmentTypeLookup {
    fn find_equipment_type(&self, id: i64) -> RegistryResult<Option<EquipmentType>>;
}

/// Equipment record storage.
///
/// Implemented for `Connection`; a `rusqlite::Transaction` derefs to one,
/// so writes made through it stay staged until the transaction commits.
pub trait EquipmentStore: EquipmentTypeLookup {
    /// True if a non-deleted record holds this (type, serial number) pair
    fn serial_number_exists(&self, equipment_type_id: i64, serial_number: &str)
        -> RegistryResult<bool>;

    fn create_equipment(&self, candidate: &EquipmentCandidate) -> RegistryResult<EquipmentRecord>;

    fn update_equipment(&self, id: i64, data: &EquipmentCandidate) -> RegistryResult<()>;

    /// Non-deleted record with its type resolved
    fn fetch_with_type(&self, id: i64) -> RegistryResult<Option<EquipmentRecord>>;

    /// Returns false when there was no live record to delete
    fn soft_delete_equipment(&self, id: i64) -> RegistryResult<bool>;
}

// ============================================================================
// SCHEMA
// ============================================================================

/// Open a database file in WAL mode and make sure the schema exists.
pub fn open_database(path: &Path) -> RegistryResult<Connection> {
    let conn = Connection::open(path)?;

    // Enable WAL mode for crash recovery
    let mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    tracing::debug!(path = %path.display(), journal_mode = %mode, "Opened equipment database");

    setup_database(&conn)?;
    Ok(conn)
}

pub fn setup_database(conn: &Connection) -> RegistryResult<()> {
    conn.pragma_update(None, "foreign_keys", "ON")?;

    // ==========================================================================
    // Equipment type catalog
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS equipment_types (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            mask TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Equipment records (soft-deleted rows keep deleted_at)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS equipment (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            equipment_type_id INTEGER NOT NULL REFERENCES equipment_types(id),
            serial_number TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            deleted_at TEXT
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    // Storage-level authority for (type, serial number) uniqueness
    conn.execute(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_equipment_type_serial
         ON equipment(equipment_type_id, serial_number)
         WHERE deleted_at IS NULL",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_equipment_serial ON equipment(serial_number)",
        [],
    )?;

    Ok(())
}

// ============================================================================
// ROW MAPPING
// ============================================================================

fn now() -> String {
    Utc::now().to_rfc3339()
}

fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Map `TYPE_COLUMNS` starting at `offset`.
fn type_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<EquipmentType> {
    let created_at: String = row.get(offset + 3)?;
    let updated_at: String = row.get(offset + 4)?;

    Ok(EquipmentType {
        id: row.get(offset)?,
        name: row.get(offset + 1)?,
        mask: row.get(offset + 2)?,
        created_at: parse_timestamp(offset + 3, &created_at)?,
        updated_at: parse_timestamp(offset + 4, &updated_at)?,
    })
}

/// Map `EQUIPMENT_COLUMNS`; the type is left unresolved.
fn record_from_row(row: &Row<'_>) -> rusqlite::Result<EquipmentRecord> {
    let created_at: String = row.get(4)?;
    let updated_at: String = row.get(5)?;
    let deleted_at: Option<String> = row.get(6)?;

    Ok(EquipmentRecord {
        id: row.get(0)?,
        equipment_type_id: row.get(1)?,
        serial_number: row.get(2)?,
        description: row.get(3)?,
        created_at: parse_timestamp(4, &created_at)?,
        updated_at: parse_timestamp(5, &updated_at)?,
        deleted_at: deleted_at.map(|s| parse_timestamp(6, &s)).transpose()?,
        equipment_type: None,
    })
}

/// True when the error is a UNIQUE constraint violation
fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn duplicate(err: rusqlite::Error, data: &EquipmentCandidate) -> RegistryError {
    if is_unique_violation(&err) {
        RegistryError::DuplicateSerialNumber {
            equipment_type_id: data.equipment_type_id,
            serial_number: data.serial_number.clone(),
        }
    } else {
        err.into()
    }
}

// ============================================================================
// REPOSITORY IMPLEMENTATION
// ============================================================================

impl EquipmentTypeLookup for Connection {
    fn find_equipment_type(&self, id: i64) -> RegistryResult<Option<EquipmentType>> {
        let query = format!("SELECT {TYPE_COLUMNS} FROM equipment_types t WHERE t.id = ?1");
        let found = self
            .query_row(&query, params![id], |row| type_from_row(row, 0))
            .optional()?;
        Ok(found)
    }
}

impl EquipmentStore for Connection {
    fn serial_number_exists(
        &self,
        equipment_type_id: i64,
        serial_number: &str,
    ) -> RegistryResult<bool> {
        let exists: bool = self.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM equipment
                WHERE equipment_type_id = ?1 AND serial_number = ?2 AND deleted_at IS NULL
            )",
            params![equipment_type_id, serial_number],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn create_equipment(&self, candidate: &EquipmentCandidate) -> RegistryResult<EquipmentRecord> {
        let timestamp = now();

        self.execute(
            "INSERT INTO equipment (
                equipment_type_id, serial_number, description, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?4)",
            params![
                candidate.equipment_type_id,
                candidate.serial_number,
                candidate.description,
                timestamp,
            ],
        )
        .map_err(|e| duplicate(e, candidate))?;

        let id = self.last_insert_rowid();
        self.fetch_with_type(id)?
            .ok_or(RegistryError::RecordNotFound(id))
    }

    fn update_equipment(&self, id: i64, data: &EquipmentCandidate) -> RegistryResult<()> {
        // updated_at only moves when a value actually changes
        let changed = self
            .execute(
                "UPDATE equipment
                 SET equipment_type_id = ?1,
                     serial_number = ?2,
                     description = ?3,
                     updated_at = CASE
                         WHEN equipment_type_id = ?1 AND serial_number = ?2 AND description = ?3
                         THEN updated_at
                         ELSE ?4
                     END
                 WHERE id = ?5 AND deleted_at IS NULL",
                params![
                    data.equipment_type_id,
                    data.serial_number,
                    data.description,
                    now(),
                    id,
                ],
            )
            .map_err(|e| duplicate(e, data))?;

        if changed == 0 {
            return Err(RegistryError::RecordNotFound(id));
        }
        Ok(())
    }

    fn fetch_with_type(&self, id: i64) -> RegistryResult<Option<EquipmentRecord>> {
        let query = format!(
            "SELECT {EQUIPMENT_COLUMNS}, {TYPE_COLUMNS}
             FROM equipment e
             JOIN equipment_types t ON t.id = e.equipment_type_id
             WHERE e.id = ?1 AND e.deleted_at IS NULL"
        );

        let found = self
            .query_row(&query, params![id], |row| {
                let mut record = record_from_row(row)?;
                record.equipment_type = Some(type_from_row(row, 7)?);
                Ok(record)
            })
            .optional()?;
        Ok(found)
    }

    fn soft_delete_equipment(&self, id: i64) -> RegistryResult<bool> {
        let timestamp = now();
        let changed = self.execute(
            "UPDATE equipment SET deleted_at = ?1, updated_at = ?1
             WHERE id = ?2 AND deleted_at IS NULL",
            params![timestamp, id],
        )?;
        Ok(changed > 0)
    }
}

// ============================================================================
// CATALOG & LISTING
// ============================================================================

/// Add an equipment type to the catalog
pub fn insert_equipment_type(conn: &Connection, name: &str, mask: &str) -> RegistryResult<EquipmentType> {
    let timestamp = now();

    conn.execute(
        "INSERT INTO equipment_types (name, mask, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?3)",
        params![name, mask, timestamp],
    )?;

    let id = conn.last_insert_rowid();
    conn.find_equipment_type(id)?
        .ok_or(RegistryError::EquipmentTypeNotFound(id))
}

/// All non-deleted records, oldest first
pub fn get_all_equipment(conn: &Connection) -> RegistryResult<Vec<EquipmentRecord>> {
    let query = format!(
        "SELECT {EQUIPMENT_COLUMNS} FROM equipment e
         WHERE e.deleted_at IS NULL
         ORDER BY e.id"
    );
    let mut stmt = conn.prepare(&query)?;

    let records = stmt
        .query_map([], record_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(records)
}

pub fn verify_count(conn: &Connection) -> RegistryResult<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM equipment WHERE deleted_at IS NULL",
        [],
        |row| row.get(0),
    )?;

    Ok(count)
}
