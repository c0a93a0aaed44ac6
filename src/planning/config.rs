// src/planning/config.rs

use crate::error::ConfigError;
use crate::model::ShippingOption;
use crate::solver::SolverEngine;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub planning_months: u32,
    pub budget_per_month: f64,
    /// Cumulative over the whole horizon, not per month.
    pub warehouse_capacity_m3: f64,
    pub shipping: ShippingOption,
    pub solver_time_limit_seconds: u64,
    pub solver: SolverEngine,
    /// Scales every forecast before the buffer is applied.
    pub demand_multiplier: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            planning_months: 1,
            budget_per_month: 12_000.0,
            warehouse_capacity_m3: 40.0,
            shipping: ShippingOption::default(),
            solver_time_limit_seconds: 60,
            solver: SolverEngine::MicroLp,
            demand_multiplier: 1.0,
        }
    }
}

impl OptimizerConfig {
    pub fn time_limit(&self) -> Duration {
        Duration::from_secs(self.solver_time_limit_seconds)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.planning_months < 1 {
            return Err(ConfigError::InvalidPlanningMonths(self.planning_months));
        }
        for (field, value) in [
            ("budget_per_month", self.budget_per_month),
            ("warehouse_capacity_m3", self.warehouse_capacity_m3),
            ("demand_multiplier", self.demand_multiplier),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::NegativeValue { field, value });
            }
        }
        if self.solver_time_limit_seconds == 0 {
            return Err(ConfigError::NonPositiveValue {
                field: "solver_time_limit_seconds",
                value: 0.0,
            });
        }
        self.shipping.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = OptimizerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.time_limit(), Duration::from_secs(60));
    }

    #[test]
    fn test_rejects_zero_months() {
        let config = OptimizerConfig {
            planning_months: 0,
            ..OptimizerConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidPlanningMonths(0)));
    }

    #[test]
    fn test_rejects_negative_budget() {
        let config = OptimizerConfig {
            budget_per_month: -1.0,
            ..OptimizerConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NegativeValue {
                field: "budget_per_month",
                value: -1.0
            })
        );
    }

    #[test]
    fn test_zero_budget_is_allowed() {
        let config = OptimizerConfig {
            budget_per_month: 0.0,
            ..OptimizerConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
