//! TOML settings for `mapview`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use squaremap::{DEFAULT_DIAGONAL_COST, FieldOfVision, FieldOfVisionLimit, RouteAlgorithm};

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    pub field_of_vision: VisionConfig,
    pub route: RouteConfig,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct VisionConfig {
    /// Zero means unlimited.
    pub radius: i32,
    pub limit: FieldOfVisionLimit,
    pub algorithm: FieldOfVision,
    /// Add to the current view instead of replacing it.
    pub local: bool,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            radius: 8,
            limit: FieldOfVisionLimit::Included,
            algorithm: FieldOfVision::Basic,
            local: false,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RouteConfig {
    pub diagonal_cost: f64,
    pub algorithm: RouteAlgorithm,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self { diagonal_cost: DEFAULT_DIAGONAL_COST, algorithm: RouteAlgorithm::AStar }
    }
}

impl ToolConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}
