// Equipment Registry - Core Library
// Mask validation and all-or-nothing batch commits for equipment records

pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod import;
pub mod mask;
pub mod service;
pub mod validator;

// Re-export commonly used types
pub use config::RegistryConfig;
pub use db::{
    EquipmentStore, EquipmentTypeLookup,
    open_database, setup_database, insert_equipment_type, get_all_equipment, verify_count,
};
pub use entities::{EquipmentCandidate, EquipmentRecord, EquipmentType};
pub use error::{RegistryError, RegistryResult};
pub use import::{load_candidates, load_equipment_types, EquipmentTypeRow};
pub use mask::{CompiledMask, MaskCompiler, MaskPolicy, MaskToken};
pub use service::{BatchResult, EquipmentService};
pub use validator::SerialNumberValidator;
