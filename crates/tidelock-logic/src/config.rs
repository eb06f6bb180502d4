//! Configuration loading and typed config structures for the randomizer.
//!
//! The canonical configuration lives in `tidelock.yaml` at the project
//! root. This module defines strongly-typed structs mirroring the YAML
//! structure and provides a loader that reads and validates the file.
//!
//! Every field has a sensible default, so a partial (or empty) file is
//! valid. The configuration is read-only for the engine: a run is a pure
//! function of `(seed, config, data)`.

use std::path::Path;

use serde::Deserialize;
use tidelock_types::{AssemblyMode, Distribution, InclusionLevel};

use crate::error::RandomizerError;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level randomizer configuration.
///
/// Numeric knobs are the budgets and tolerances consumed throughout the
/// recipe assembler and sphere expansion; the rest select strategies.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RandomizerConfig {
    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Ingredient-selection strategy.
    #[serde(default)]
    pub mode: AssemblyMode,

    /// Distribution shaping applied to random counts.
    #[serde(default)]
    pub distribution: Distribution,

    /// Maximum number of distinct ingredient types per recipe.
    #[serde(default = "default_max_ingredients_per_recipe")]
    pub max_ingredients_per_recipe: u32,

    /// Global cap on units of a single ingredient in one recipe.
    #[serde(default = "default_max_per_ingredient")]
    pub max_per_ingredient: u32,

    /// Maximum total inventory size (sum of `count * unit_size`) a recipe
    /// may cost.
    #[serde(default = "default_max_inventory_size_per_recipe")]
    pub max_inventory_size_per_recipe: u32,

    /// Size budget for a basic starting outpost; base-piece recipes stop
    /// accepting ingredients once 70% of it is spent.
    #[serde(default = "default_max_basic_outpost_size")]
    pub max_basic_outpost_size: u32,

    /// Relative tolerance band around a balanced recipe's value target.
    #[serde(default = "default_variance_tolerance")]
    pub variance_tolerance: f64,

    /// Fraction of the recipe value the balanced primary ingredient aims
    /// for (matched within ±10%).
    #[serde(default = "default_primary_ingredient_fraction")]
    pub primary_ingredient_fraction: f64,

    /// Cap on egg-category ingredients per recipe.
    #[serde(default = "default_max_eggs_as_ingredient")]
    pub max_eggs_as_ingredient: u32,

    /// How freely equipment may appear as an ingredient.
    #[serde(default)]
    pub equipment_as_ingredients: InclusionLevel,

    /// How freely tools may appear as an ingredient.
    #[serde(default)]
    pub tools_as_ingredients: InclusionLevel,

    /// How freely vehicle/workbench upgrades may appear as an ingredient.
    #[serde(default)]
    pub upgrades_as_ingredients: InclusionLevel,

    /// Seed every base-piece recipe with one consistent raw material.
    #[serde(default = "default_true")]
    pub use_base_theme: bool,

    /// Keep each upgrade's immediate predecessor in its recipe.
    #[serde(default = "default_true")]
    pub preserve_upgrade_chains: bool,

    /// Force a stalled sphere open by granting the cheapest blocking item
    /// instead of failing the run.
    #[serde(default = "default_true")]
    pub priority_fill: bool,

    /// Ceiling on sphere tiers, guaranteeing termination on pathological
    /// graphs.
    #[serde(default = "default_max_sphere_count")]
    pub max_sphere_count: u32,

    /// Logging configuration consumed by the CLI.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for RandomizerConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            mode: AssemblyMode::default(),
            distribution: Distribution::default(),
            max_ingredients_per_recipe: default_max_ingredients_per_recipe(),
            max_per_ingredient: default_max_per_ingredient(),
            max_inventory_size_per_recipe: default_max_inventory_size_per_recipe(),
            max_basic_outpost_size: default_max_basic_outpost_size(),
            variance_tolerance: default_variance_tolerance(),
            primary_ingredient_fraction: default_primary_ingredient_fraction(),
            max_eggs_as_ingredient: default_max_eggs_as_ingredient(),
            equipment_as_ingredients: InclusionLevel::default(),
            tools_as_ingredients: InclusionLevel::default(),
            upgrades_as_ingredients: InclusionLevel::default(),
            use_base_theme: true,
            preserve_upgrade_chains: true,
            priority_fill: true,
            max_sphere_count: default_max_sphere_count(),
            logging: LoggingConfig::default(),
        }
    }
}

impl RandomizerConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yml::from_str(&contents)?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    /// Reject budgets that make every recipe impossible.
    ///
    /// # Errors
    ///
    /// Returns [`RandomizerError::InvalidBudget`] naming the offending
    /// knob; this is a configuration error and aborts the run.
    pub fn validate(&self) -> Result<(), RandomizerError> {
        if self.max_ingredients_per_recipe == 0 {
            return Err(RandomizerError::InvalidBudget {
                setting: "max_ingredients_per_recipe",
                value: 0,
            });
        }
        if self.max_per_ingredient == 0 {
            return Err(RandomizerError::InvalidBudget {
                setting: "max_per_ingredient",
                value: 0,
            });
        }
        if self.max_inventory_size_per_recipe == 0 {
            return Err(RandomizerError::InvalidBudget {
                setting: "max_inventory_size_per_recipe",
                value: 0,
            });
        }
        if self.max_sphere_count == 0 {
            return Err(RandomizerError::InvalidBudget {
                setting: "max_sphere_count",
                value: 0,
            });
        }
        if !(0.0..=1.0).contains(&self.variance_tolerance) {
            return Err(RandomizerError::InvalidBudget {
                setting: "variance_tolerance",
                value: to_display_int(self.variance_tolerance),
            });
        }
        if !(0.0..=1.0).contains(&self.primary_ingredient_fraction) {
            return Err(RandomizerError::InvalidBudget {
                setting: "primary_ingredient_fraction",
                value: to_display_int(self.primary_ingredient_fraction),
            });
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Round a rejected float knob for display inside an integer error field.
#[allow(clippy::cast_possible_truncation)] // display-only, after rounding
fn to_display_int(value: f64) -> i64 {
    value.round() as i64
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_seed() -> u64 {
    42
}

const fn default_max_ingredients_per_recipe() -> u32 {
    5
}

const fn default_max_per_ingredient() -> u32 {
    5
}

const fn default_max_inventory_size_per_recipe() -> u32 {
    20
}

const fn default_max_basic_outpost_size() -> u32 {
    80
}

const fn default_variance_tolerance() -> f64 {
    0.2
}

const fn default_primary_ingredient_fraction() -> f64 {
    0.45
}

const fn default_max_eggs_as_ingredient() -> u32 {
    1
}

const fn default_max_sphere_count() -> u32 {
    64
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}
