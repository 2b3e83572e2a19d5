use crate::mask::MaskPolicy;
use anyhow::{anyhow, Result};
use std::path::PathBuf;

/// Registry configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryConfig {
    /// SQLite database file
    pub database_path: PathBuf,
    /// Treatment of mask characters without a rule
    pub mask_policy: MaskPolicy,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig {
            database_path: PathBuf::from("equipment.db"),
            mask_policy: MaskPolicy::Strict,
        }
    }
}

impl RegistryConfig {
    /// Load configuration from the environment (and `.env` if present).
    ///
    /// | Env Var                 | Default        |
    /// |-------------------------|----------------|
    /// | `EQUIPMENT_DB_PATH`     | `equipment.db` |
    /// | `EQUIPMENT_MASK_POLICY` | `strict`       |
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = RegistryConfig::default();

        let database_path = lookup("EQUIPMENT_DB_PATH")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.database_path);

        let mask_policy = match lookup("EQUIPMENT_MASK_POLICY") {
            Some(value) => value
                .parse::<MaskPolicy>()
                .map_err(|e| anyhow!("EQUIPMENT_MASK_POLICY: {}", e))?,
            None => defaults.mask_policy,
        };

        Ok(RegistryConfig {
            database_path,
            mask_policy,
        })
    }
}
