// Entity Models
//
// Plain structs; persistence goes through the repository traits in `db`.

pub mod equipment;
pub mod equipment_type;

pub use equipment::{EquipmentCandidate, EquipmentRecord};
pub use equipment_type::EquipmentType;
