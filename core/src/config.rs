//! User configuration and data directory resolution

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::aggregate::TotalsPolicy;

pub const DATA_DIR_ENV: &str = "HABITUAL_DATA_DIR";
const CONFIG_FILE_NAME: &str = "config.json";
const DEFAULT_DIR_NAME: &str = ".habitual";
const DEFAULT_USER: &str = "local";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Owner id stamped on habits and check-ins
    pub user: String,

    /// How past days get their habit totals
    pub totals_policy: TotalsPolicy,
}

impl Config {
    pub fn new() -> Self {
        Self {
            user: DEFAULT_USER.to_string(),
            totals_policy: TotalsPolicy::default(),
        }
    }

    /// Reads `config.json` from `data_dir`; a missing file gives defaults.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config in {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self, data_dir: &Path) -> Result<()> {
        fs::create_dir_all(data_dir)?;
        let content = serde_json::to_string_pretty(self)?;
        fs::write(data_dir.join(CONFIG_FILE_NAME), content)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Picks the data directory: explicit flag, then `HABITUAL_DATA_DIR`, then
/// `~/.habitual`.
pub fn resolve_data_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    resolve_data_dir_from(explicit, std::env::var_os(DATA_DIR_ENV))
}

fn resolve_data_dir_from(explicit: Option<PathBuf>, env: Option<OsString>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    if let Some(dir) = env.filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home_dir = dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
    Ok(home_dir.join(DEFAULT_DIR_NAME))
}
