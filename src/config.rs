// src/config.rs

//! TOML configuration for the planner binary.
//!
//! Every section is optional; anything omitted falls back to the built-in
//! rule tables. Validation runs once at load so the generator and optimizer
//! only see checked structures.

use crate::demand::{ForecastDefaults, SeasonalFactors};
use crate::error::ConfigError;
use crate::generator::DEFAULT_MATERIALIZE_LIMIT;
use crate::model::ShippingOption;
use crate::planning::OptimizerConfig;
use crate::rules::tiers::{default_demand_tiers, default_markup_tiers};
use crate::rules::{BusinessRules, DemandTier, FilterPresets, MarkupTier};
use crate::solver::SolverEngine;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizationSettings {
    pub planning_months: u32,
    pub budget_per_month: f64,
    pub warehouse_capacity_m3: f64,
    pub solver_time_limit_seconds: u64,
    pub solver: SolverEngine,
    pub demand_multiplier: f64,
}

impl Default for OptimizationSettings {
    fn default() -> Self {
        let defaults = OptimizerConfig::default();
        Self {
            planning_months: defaults.planning_months,
            budget_per_month: defaults.budget_per_month,
            warehouse_capacity_m3: defaults.warehouse_capacity_m3,
            solver_time_limit_seconds: defaults.solver_time_limit_seconds,
            solver: defaults.solver,
            demand_multiplier: defaults.demand_multiplier,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastSettings {
    pub trend_factor: f64,
    pub demand_buffer: f64,
    /// January first; months past the list are neutral.
    pub seasonal_factors: Vec<f64>,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        let defaults = ForecastDefaults::default();
        Self {
            trend_factor: defaults.trend_factor,
            demand_buffer: defaults.demand_buffer,
            seasonal_factors: crate::demand::seasonal::DEFAULT_MONTHLY_FACTORS.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub max_candidates: usize,
    pub materialize_limit: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            max_candidates: 1_000,
            materialize_limit: DEFAULT_MATERIALIZE_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub markup_tiers: Vec<MarkupTier>,
    pub demand_tiers: Vec<DemandTier>,
    pub presets: FilterPresets,
    pub shipping: ShippingOption,
    pub optimization: OptimizationSettings,
    pub forecast: ForecastSettings,
    pub generation: GenerationSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            markup_tiers: default_markup_tiers(),
            demand_tiers: default_demand_tiers(),
            presets: FilterPresets::default(),
            shipping: ShippingOption::default(),
            optimization: OptimizationSettings::default(),
            forecast: ForecastSettings::default(),
            generation: GenerationSettings::default(),
        }
    }
}

impl AppConfig {
    /// Read, parse, and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.business_rules()?;
        self.presets.validate()?;
        self.optimizer_config().validate()?;

        for (field, value) in [
            ("forecast.trend_factor", self.forecast.trend_factor),
            ("forecast.demand_buffer", self.forecast.demand_buffer),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NonPositiveValue { field, value });
            }
        }
        if let Some(&value) = self
            .forecast
            .seasonal_factors
            .iter()
            .find(|f| !f.is_finite() || **f < 0.0)
        {
            return Err(ConfigError::NegativeValue {
                field: "forecast.seasonal_factors",
                value,
            });
        }
        if self.generation.materialize_limit == 0 {
            return Err(ConfigError::NonPositiveValue {
                field: "generation.materialize_limit",
                value: 0.0,
            });
        }
        Ok(())
    }

    pub fn business_rules(&self) -> Result<BusinessRules, ConfigError> {
        BusinessRules::new(self.markup_tiers.clone(), self.demand_tiers.clone())
    }

    /// One shared table for every product of a run.
    pub fn seasonal_factors(&self) -> Arc<SeasonalFactors> {
        Arc::new(SeasonalFactors::from_monthly(&self.forecast.seasonal_factors))
    }

    pub fn forecast_defaults(&self) -> ForecastDefaults {
        ForecastDefaults {
            trend_factor: self.forecast.trend_factor,
            demand_buffer: self.forecast.demand_buffer,
        }
    }

    pub fn optimizer_config(&self) -> OptimizerConfig {
        let opt = &self.optimization;
        OptimizerConfig {
            planning_months: opt.planning_months,
            budget_per_month: opt.budget_per_month,
            warehouse_capacity_m3: opt.warehouse_capacity_m3,
            shipping: self.shipping.clone(),
            solver_time_limit_seconds: opt.solver_time_limit_seconds,
            solver: opt.solver,
            demand_multiplier: opt.demand_multiplier,
        }
    }
}
