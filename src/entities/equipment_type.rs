// 🏷️ Equipment Type - Catalog entry defining a serial number format
//
// Owned by the external catalog; read-only from the engine's point of view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentType {
    pub id: i64,

    /// Display name ("TP-Link TL-WR74")
    pub name: String,

    /// Serial number mask over the N/A/a/X/Z alphabet
    pub mask: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
