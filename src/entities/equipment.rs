// 📦 Equipment - Candidates and persisted records
//
// A candidate is what the caller hands in; a record is what survives
// validation and commit. The pair (equipment_type_id, serial_number) is
// unique among records that are not soft-deleted.

use super::equipment_type::EquipmentType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// CANDIDATE
// ============================================================================

/// Unvalidated equipment entry, consumed once by validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentCandidate {
    pub equipment_type_id: i64,
    pub serial_number: String,

    #[serde(default, alias = "desc")]
    pub description: String,
}

impl EquipmentCandidate {
    pub fn new(equipment_type_id: i64, serial_number: &str, description: &str) -> Self {
        EquipmentCandidate {
            equipment_type_id,
            serial_number: serial_number.to_string(),
            description: description.to_string(),
        }
    }
}

// ============================================================================
// RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentRecord {
    pub id: i64,
    pub equipment_type_id: i64,
    pub serial_number: String,
    pub description: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Soft-delete marker
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,

    /// Resolved type, present when loaded with its type
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub equipment_type: Option<EquipmentType>,
}

impl EquipmentRecord {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// The fields an update would compare against
    pub fn as_candidate(&self) -> EquipmentCandidate {
        EquipmentCandidate {
            equipment_type_id: self.equipment_type_id,
            serial_number: self.serial_number.clone(),
            description: self.description.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_accepts_desc_alias() {
        let json = r#"{"equipment_type_id": 3, "serial_number": "123-AB", "desc": "router"}"#;
        let candidate: EquipmentCandidate = serde_json::from_str(json).unwrap();

        assert_eq!(candidate, EquipmentCandidate::new(3, "123-AB", "router"));
    }

    #[test]
    fn test_candidate_description_defaults_to_empty() {
        let json = r#"{"equipment_type_id": 3, "serial_number": "123-AB"}"#;
        let candidate: EquipmentCandidate = serde_json::from_str(json).unwrap();

        assert_eq!(candidate.description, "");
    }
}
