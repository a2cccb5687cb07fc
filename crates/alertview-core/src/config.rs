use std::collections::BTreeMap;

use anyhow::{Context, Result};
use jsonschema::{validator_for, Validator};
use once_cell::sync::Lazy;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::grid::AUTO_GRID_LABEL;
use crate::labels::LabelResolver;
use crate::sorting::SortOrder;

#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub grid: GridConfig,
}

impl Config {
    /// Resolver built from `grid.sorting.custom_values`.
    pub fn label_resolver(&self) -> LabelResolver {
        LabelResolver::new(self.grid.sorting.custom_values.labels.clone())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct GridConfig {
    /// Default grid label: "@auto", "" (single grid), "@receiver" or a label name.
    #[serde(default = "default_grid_label")]
    pub label: String,
    /// Reverse the order of grids.
    #[serde(default)]
    pub reverse: bool,
    #[serde(default)]
    pub sorting: SortingConfig,
    #[serde(default)]
    pub auto: AutoGridConfig,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            label: default_grid_label(),
            reverse: false,
            sorting: SortingConfig::default(),
            auto: AutoGridConfig::default(),
        }
    }
}

fn default_grid_label() -> String {
    AUTO_GRID_LABEL.to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct SortingConfig {
    #[serde(default)]
    pub order: SortOrder,
    #[serde(default = "default_true")]
    pub reverse: bool,
    /// Label used when `order` is "label".
    #[serde(default = "default_sort_label")]
    pub label: String,
    #[serde(default)]
    pub custom_values: CustomValues,
}

impl Default for SortingConfig {
    fn default() -> Self {
        Self {
            order: SortOrder::default(),
            reverse: true,
            label: default_sort_label(),
            custom_values: CustomValues::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_sort_label() -> String {
    "alertname".to_string()
}

/// Display substitutions: label name -> raw value -> displayed value.
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct CustomValues {
    #[serde(default)]
    pub labels: BTreeMap<String, BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct AutoGridConfig {
    /// Labels never picked automatically.
    #[serde(default)]
    pub ignore: Vec<String>,
    /// Preferred labels, earlier entries win ties.
    #[serde(default)]
    pub order: Vec<String>,
}

static CONFIG_SCHEMA: Lazy<Validator> = Lazy::new(|| {
    let schema = schemars::schema_for!(Config);
    let schema_value = serde_json::to_value(&schema).expect("schema value");
    validator_for(&schema_value).expect("valid schema")
});

/// Returns the JSON schema describing the configuration structure.
///
/// # Panics
///
/// Panics if schema generation fails; this indicates a programming error.
pub fn config_schema_json() -> serde_json::Value {
    let schema = schemars::schema_for!(Config);
    serde_json::to_value(&schema).expect("schema json")
}

pub fn load_config(path: &str) -> Result<Config> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading config at {path}"))?;
    parse_config(&content).with_context(|| format!("parsing config at {path}"))
}

pub fn parse_config(content: &str) -> Result<Config> {
    let raw: toml::Value = toml::from_str(content)?;
    let json_value = serde_json::to_value(&raw)?;
    let validation_errors: Vec<_> = CONFIG_SCHEMA
        .iter_errors(&json_value)
        .map(|e| e.to_string())
        .collect();
    if !validation_errors.is_empty() {
        return Err(anyhow::anyhow!(validation_errors.join(", ")));
    }
    let cfg: Config = toml::from_str(content)?;
    Ok(cfg)
}
