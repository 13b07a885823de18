use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{PipelineError, Result};
use crate::pipeline::processing::normalize::MinimumNightsPolicy;
use crate::pipeline::processing::quality_gate::ValidationConfig;
use crate::pipeline::storage::{Layer, TableRef};

/// Environment variable naming the config file
pub const CONFIG_PATH_ENV: &str = "PIPELINE_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub tables: TablesConfig,
    pub normalize: NormalizeConfig,
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root of the `<layer>/<table>.csv` layout
    pub root: PathBuf,
    pub log_dir: PathBuf,
}

/// Logical names of every table the pipeline reads or writes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TablesConfig {
    pub hosts_bronze: String,
    pub listings_bronze: String,
    pub hosts_silver: String,
    pub listings_silver: String,
    pub listings_w_hosts_gold: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    pub minimum_nights_policy: MinimumNightsPolicy,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("data"),
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl Default for TablesConfig {
    fn default() -> Self {
        Self {
            hosts_bronze: constants::HOSTS_BRONZE.to_string(),
            listings_bronze: constants::LISTINGS_BRONZE.to_string(),
            hosts_silver: constants::HOSTS_SILVER.to_string(),
            listings_silver: constants::LISTINGS_SILVER.to_string(),
            listings_w_hosts_gold: constants::LISTINGS_W_HOSTS_GOLD.to_string(),
        }
    }
}

impl TablesConfig {
    pub fn hosts_bronze(&self) -> TableRef {
        TableRef::new(Layer::Bronze, &self.hosts_bronze)
    }

    pub fn listings_bronze(&self) -> TableRef {
        TableRef::new(Layer::Bronze, &self.listings_bronze)
    }

    pub fn hosts_silver(&self) -> TableRef {
        TableRef::new(Layer::Silver, &self.hosts_silver)
    }

    pub fn listings_silver(&self) -> TableRef {
        TableRef::new(Layer::Silver, &self.listings_silver)
    }

    pub fn listings_w_hosts_gold(&self) -> TableRef {
        TableRef::new(Layer::Gold, &self.listings_w_hosts_gold)
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| PipelineError::Config(format!("Failed to read config file '{}': {}", path.display(), e)))?;

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `PIPELINE_CONFIG` when set, otherwise use the defaults
    pub fn from_env() -> Result<Self> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let names = [
            &self.tables.hosts_bronze,
            &self.tables.listings_bronze,
            &self.tables.hosts_silver,
            &self.tables.listings_silver,
            &self.tables.listings_w_hosts_gold,
        ];
        if let Some(blank) = names.iter().find(|n| n.trim().is_empty()) {
            return Err(PipelineError::Config(format!("Table names must not be empty (got {:?})", blank)));
        }
        if !self.validation.price_ceiling.is_finite() || self.validation.price_ceiling <= 0.0 {
            return Err(PipelineError::Config(format!(
                "price_ceiling must be a positive number, got {}",
                self.validation.price_ceiling
            )));
        }
        Ok(())
    }
}
