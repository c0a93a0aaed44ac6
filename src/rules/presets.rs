// src/rules/presets.rs

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How finely an axis is sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepGranularity {
    Fine,
    Medium,
    Coarse,
}

impl StepGranularity {
    /// Price step in USD.
    pub fn price_step(self) -> f64 {
        match self {
            StepGranularity::Fine => 10.0,
            StepGranularity::Medium => 25.0,
            StepGranularity::Coarse => 50.0,
        }
    }

    /// Weight step in grams.
    pub fn weight_step(self) -> f64 {
        match self {
            StepGranularity::Fine => 100.0,
            StepGranularity::Medium => 500.0,
            StepGranularity::Coarse => 1_000.0,
        }
    }

    /// Size step in cm³.
    pub fn size_step(self) -> f64 {
        match self {
            StepGranularity::Fine => 100.0,
            StepGranularity::Medium => 500.0,
            StepGranularity::Coarse => 1_000.0,
        }
    }
}

/// Named bounds for a generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterPreset {
    pub description: String,
    pub max_price: f64,
    pub max_weight_g: f64,
    pub max_size_cm3: f64,
    pub price_steps: StepGranularity,
    pub weight_steps: StepGranularity,
    pub size_steps: StepGranularity,
    pub density_min: f64,
    pub density_max: f64,
}

/// Presets keyed by name (`full`, `medium`, `aggressive` by default).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterPresets(BTreeMap<String, FilterPreset>);

impl FilterPresets {
    pub fn get(&self, name: &str) -> Result<&FilterPreset, ConfigError> {
        self.0
            .get(name)
            .ok_or_else(|| ConfigError::UnknownPreset(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for preset in self.0.values() {
            for (field, value) in [
                ("preset max_price", preset.max_price),
                ("preset max_weight_g", preset.max_weight_g),
                ("preset max_size_cm3", preset.max_size_cm3),
            ] {
                if !(value > 0.0) || !value.is_finite() {
                    return Err(ConfigError::NonPositiveValue { field, value });
                }
            }
            if !(preset.density_min >= 0.0) {
                return Err(ConfigError::NegativeValue {
                    field: "preset density_min",
                    value: preset.density_min,
                });
            }
            if !(preset.density_max >= preset.density_min) {
                return Err(ConfigError::NonPositiveValue {
                    field: "preset density_max",
                    value: preset.density_max,
                });
            }
        }
        Ok(())
    }
}

impl Default for FilterPresets {
    fn default() -> Self {
        let mut presets = BTreeMap::new();
        presets.insert(
            "full".to_string(),
            FilterPreset {
                description: "Full parameter space".to_string(),
                max_price: 10_000.0,
                max_weight_g: 100_000.0,
                max_size_cm3: 50_000.0,
                price_steps: StepGranularity::Fine,
                weight_steps: StepGranularity::Fine,
                size_steps: StepGranularity::Fine,
                density_min: 0.01,
                density_max: 10.0,
            },
        );
        presets.insert(
            "medium".to_string(),
            FilterPreset {
                description: "Reduced parameter space".to_string(),
                max_price: 5_000.0,
                max_weight_g: 50_000.0,
                max_size_cm3: 30_000.0,
                price_steps: StepGranularity::Medium,
                weight_steps: StepGranularity::Medium,
                size_steps: StepGranularity::Medium,
                density_min: 0.05,
                density_max: 8.0,
            },
        );
        presets.insert(
            "aggressive".to_string(),
            FilterPreset {
                description: "Minimal parameter space".to_string(),
                max_price: 1_000.0,
                max_weight_g: 20_000.0,
                max_size_cm3: 20_000.0,
                price_steps: StepGranularity::Coarse,
                weight_steps: StepGranularity::Coarse,
                size_steps: StepGranularity::Coarse,
                density_min: 0.1,
                density_max: 5.0,
            },
        );
        Self(presets)
    }
}
