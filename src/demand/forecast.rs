// src/demand/forecast.rs

use crate::demand::seasonal::SeasonalFactors;
use std::sync::Arc;

/// Trend and buffer applied when a candidate is promoted to a product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastDefaults {
    pub trend_factor: f64,
    pub demand_buffer: f64,
}

impl Default for ForecastDefaults {
    fn default() -> Self {
        Self {
            trend_factor: 1.02,
            demand_buffer: 1.5,
        }
    }
}

/// Monthly demand forecast for one product.
///
/// The seasonal table is shared by every product in a run and cannot be
/// mutated through the handle.
#[derive(Debug, Clone, PartialEq)]
pub struct DemandForecast {
    pub base_demand: f64,
    pub seasonal_factors: Arc<SeasonalFactors>,
    pub trend_factor: f64,
    pub demand_buffer: f64,
}

impl DemandForecast {
    pub fn new(
        base_demand: f64,
        seasonal_factors: Arc<SeasonalFactors>,
        defaults: ForecastDefaults,
    ) -> Self {
        Self {
            base_demand,
            seasonal_factors,
            trend_factor: defaults.trend_factor,
            demand_buffer: defaults.demand_buffer,
        }
    }

    /// Point forecast: `base × seasonal(month) × trend^(month − 1)`.
    pub fn forecast_month(&self, month: u32) -> f64 {
        let seasonal = self.seasonal_factors.get(month);
        let trend = self.trend_factor.powi(month as i32 - 1);
        self.base_demand * seasonal * trend
    }

    /// Largest quantity that may be ordered in `month`.
    ///
    /// The buffer only widens the ceiling; it never changes the forecast.
    pub fn upper_bound(&self, month: u32, demand_multiplier: f64) -> u64 {
        let ceiling = self.forecast_month(month) * demand_multiplier * self.demand_buffer;
        if ceiling.is_finite() && ceiling > 0.0 {
            ceiling.floor() as u64
        } else {
            0
        }
    }

    /// Upper bounds for months `1..=planning_months`.
    pub fn upper_bounds(&self, planning_months: u32, demand_multiplier: f64) -> Vec<u64> {
        (1..=planning_months)
            .map(|month| self.upper_bound(month, demand_multiplier))
            .collect()
    }

    /// Reason the forecast cannot size decision variables, if any.
    pub fn validate(&self) -> Result<(), String> {
        if !self.base_demand.is_finite() || self.base_demand < 0.0 {
            return Err(format!("base_demand {} is not a non-negative number", self.base_demand));
        }
        if !self.trend_factor.is_finite() || self.trend_factor <= 0.0 {
            return Err(format!("trend_factor {} must be positive", self.trend_factor));
        }
        if !self.demand_buffer.is_finite() || self.demand_buffer <= 0.0 {
            return Err(format!("demand_buffer {} must be positive", self.demand_buffer));
        }
        Ok(())
    }
}
