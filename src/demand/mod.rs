// src/demand/mod.rs

pub mod forecast;
pub mod seasonal;

pub use forecast::{DemandForecast, ForecastDefaults};
pub use seasonal::SeasonalFactors;
