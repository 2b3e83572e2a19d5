// ⚠️ Registry Errors
// Every failure the validation and commit engine can report

/// Errors produced while compiling masks, validating serial numbers
/// or persisting equipment records.
///
/// Validation kinds are captured per item during batch creation.
/// `PersistenceFailure` is the only kind that aborts a batch.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Mask token '{token}' at position {position} has no matching rule")]
    InvalidMaskToken { token: char, position: usize },

    #[error("Mask '{mask}' could not be compiled: {source}")]
    MaskCompile {
        mask: String,
        #[source]
        source: regex::Error,
    },

    #[error("Equipment type {0} not found")]
    EquipmentTypeNotFound(i64),

    #[error("Serial number '{serial_number}' does not match mask '{mask}'")]
    SerialNumberFormatMismatch { serial_number: String, mask: String },

    #[error("Equipment with serial number '{serial_number}' already exists for type {equipment_type_id}")]
    DuplicateSerialNumber {
        equipment_type_id: i64,
        serial_number: String,
    },

    #[error("Equipment record {0} not found")]
    RecordNotFound(i64),

    #[error("Persistence failure: {0}")]
    PersistenceFailure(#[from] rusqlite::Error),
}

impl RegistryError {
    /// True for the kinds a batch records per item instead of aborting on.
    pub fn is_validation(&self) -> bool {
        !matches!(self, RegistryError::PersistenceFailure(_))
    }
}

pub type RegistryResult<T> = Result<T, RegistryError>;
