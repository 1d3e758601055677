// ⚙️ Settings - JSON configuration for validation and reconciliation runs
// Every section is optional; an empty object yields the defaults

use crate::reconciliation::ReconConfig;
use crate::schema::DEFAULT_TOLERANCE;
use crate::table::{ColumnDefault, Table};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationSettings {
    /// Absolute tolerance for monetary comparisons
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Input header → canonical column name, applied before validation
    #[serde(default)]
    pub column_aliases: BTreeMap<String, String>,

    /// Columns to add when the input lacks them, applied after aliases
    #[serde(default)]
    pub column_defaults: BTreeMap<String, ColumnDefault>,
}

impl ValidationSettings {
    /// Rename aliased headers, then fill in missing columns
    pub fn prepare(&self, table: &mut Table) {
        table.rename_columns(&self.column_aliases);
        table.fill_missing_columns(&self.column_defaults);
    }
}

impl Default for ValidationSettings {
    fn default() -> Self {
        ValidationSettings {
            tolerance: DEFAULT_TOLERANCE,
            column_aliases: BTreeMap::new(),
            column_defaults: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub validation: ValidationSettings,

    /// Required by `reconcile`, ignored by `validate`
    #[serde(default)]
    pub reconciliation: Option<ReconConfig>,
}

impl Settings {
    /// Load settings from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read settings file: {:?}", path.as_ref()))?;

        Self::from_json(&content)
            .with_context(|| format!("Invalid settings file: {:?}", path.as_ref()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let settings: Settings =
            serde_json::from_str(content).context("Failed to parse settings JSON")?;

        if !settings.validation.tolerance.is_finite() || settings.validation.tolerance < 0.0 {
            anyhow::bail!(
                "validation.tolerance must be a non-negative number, got {}",
                settings.validation.tolerance
            );
        }
        if let Some(recon) = &settings.reconciliation {
            recon.validate()?;
        }

        Ok(settings)
    }

    /// The reconciliation section, or an error naming what is missing
    pub fn reconciliation(&self) -> Result<&ReconConfig> {
        self.reconciliation
            .as_ref()
            .context("Settings have no \"reconciliation\" section")
    }
}
