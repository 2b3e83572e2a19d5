// 📂 CSV loaders for the command-line driver
//
// types.csv:      name,mask
// equipment.csv:  equipment_type_id,serial_number,description

use crate::entities::EquipmentCandidate;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EquipmentTypeRow {
    pub name: String,
    pub mask: String,
}

pub fn load_candidates(csv_path: &Path) -> Result<Vec<EquipmentCandidate>> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("Failed to open CSV file {}", csv_path.display()))?;
    read_candidates(file)
}

pub fn load_equipment_types(csv_path: &Path) -> Result<Vec<EquipmentTypeRow>> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("Failed to open CSV file {}", csv_path.display()))?;
    read_equipment_types(file)
}

pub fn read_candidates<R: Read>(reader: R) -> Result<Vec<EquipmentCandidate>> {
    let mut rdr = csv::Reader::from_reader(reader);

    let mut candidates = Vec::new();
    for (line, result) in rdr.deserialize().enumerate() {
        let candidate: EquipmentCandidate = result
            .with_context(|| format!("Failed to deserialize candidate on row {}", line + 1))?;
        candidates.push(candidate);
    }

    Ok(candidates)
}

pub fn read_equipment_types<R: Read>(reader: R) -> Result<Vec<EquipmentTypeRow>> {
    let mut rdr = csv::Reader::from_reader(reader);

    rdr.deserialize()
        .collect::<Result<Vec<EquipmentTypeRow>, _>>()
        .context("Failed to deserialize equipment type")
}
