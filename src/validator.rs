// ✅ Serial Number Validator
// Type lookup → mask match → uniqueness, stopping at the first failure

use crate::db::EquipmentStore;
use crate::entities::EquipmentType;
use crate::error::{RegistryError, RegistryResult};
use crate::mask::MaskCompiler;

pub struct SerialNumberValidator<'a> {
    compiler: &'a MaskCompiler,
}

impl<'a> SerialNumberValidator<'a> {
    pub fn new(compiler: &'a MaskCompiler) -> Self {
        SerialNumberValidator { compiler }
    }

    /// Resolve the type and check the serial number against its mask.
    ///
    /// Does not look at existing records.
    pub fn check_format<S>(
        &self,
        store: &S,
        equipment_type_id: i64,
        serial_number: &str,
    ) -> RegistryResult<EquipmentType>
    where
        S: EquipmentStore + ?Sized,
    {
        let equipment_type = store
            .find_equipment_type(equipment_type_id)?
            .ok_or(RegistryError::EquipmentTypeNotFound(equipment_type_id))?;

        let matcher = self.compiler.compile(&equipment_type.mask)?;
        if !matcher.is_match(serial_number) {
            return Err(RegistryError::SerialNumberFormatMismatch {
                serial_number: serial_number.to_string(),
                mask: equipment_type.mask,
            });
        }

        Ok(equipment_type)
    }

    /// Full validation for a new record. Read-only.
    pub fn validate<S>(
        &self,
        store: &S,
        equipment_type_id: i64,
        serial_number: &str,
    ) -> RegistryResult<EquipmentType>
    where
        S: EquipmentStore + ?Sized,
    {
        let equipment_type = self.check_format(store, equipment_type_id, serial_number)?;

        if store.serial_number_exists(equipment_type_id, serial_number)? {
            return Err(RegistryError::DuplicateSerialNumber {
                equipment_type_id,
                serial_number: serial_number.to_string(),
            });
        }

        Ok(equipment_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{insert_equipment_type, setup_database};
    use crate::entities::EquipmentCandidate;
    use crate::mask::MaskPolicy;
    use rusqlite::Connection;

    fn setup() -> (Connection, i64) {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        let router = insert_equipment_type(&conn, "Router", "NNN-AA").unwrap();
        (conn, router.id)
    }

    #[test]
    fn test_valid_serial_number() {
        let (conn, type_id) = setup();
        let compiler = MaskCompiler::default();
        let validator = SerialNumberValidator::new(&compiler);

        let equipment_type = validator.validate(&conn, type_id, "123-AB").unwrap();
        assert_eq!(equipment_type.id, type_id);
    }

    #[test]
    fn test_unknown_type() {
        let (conn, _) = setup();
        let compiler = MaskCompiler::default();
        let validator = SerialNumberValidator::new(&compiler);

        let err = validator.validate(&conn, 404, "123-AB").unwrap_err();
        assert!(matches!(err, RegistryError::EquipmentTypeNotFound(404)));
    }

    #[test]
    fn test_format_mismatch() {
        let (conn, type_id) = setup();
        let compiler = MaskCompiler::default();
        let validator = SerialNumberValidator::new(&compiler);

        let err = validator.validate(&conn, type_id, "12-ABC").unwrap_err();
        assert!(matches!(err, RegistryError::SerialNumberFormatMismatch { .. }));
    }

    #[test]
    fn test_duplicate_after_format() {
        let (conn, type_id) = setup();
        conn.create_equipment(&EquipmentCandidate::new(type_id, "123-AB", ""))
            .unwrap();

        let compiler = MaskCompiler::default();
        let validator = SerialNumberValidator::new(&compiler);

        let err = validator.validate(&conn, type_id, "123-AB").unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateSerialNumber { .. }));

        // Format check alone does not care about existing records
        assert!(validator.check_format(&conn, type_id, "123-AB").is_ok());
    }

    #[test]
    fn test_mismatch_reported_before_duplicate() {
        let (conn, type_id) = setup();
        let compiler = MaskCompiler::default();
        let validator = SerialNumberValidator::new(&compiler);

        // Badly formatted and never stored: mask check comes first
        let err = validator.validate(&conn, type_id, "bad").unwrap_err();
        assert!(matches!(err, RegistryError::SerialNumberFormatMismatch { .. }));
    }

    #[test]
    fn test_invalid_mask_in_catalog() {
        let (conn, _) = setup();
        let broken = insert_equipment_type(&conn, "Broken", "NNQ").unwrap();

        let strict = MaskCompiler::new(MaskPolicy::Strict);
        let err = SerialNumberValidator::new(&strict)
            .validate(&conn, broken.id, "12Q")
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidMaskToken { token: 'Q', position: 2 }));

        let lenient = MaskCompiler::new(MaskPolicy::Lenient);
        assert!(SerialNumberValidator::new(&lenient)
            .validate(&conn, broken.id, "12Q")
            .is_ok());
    }
}
