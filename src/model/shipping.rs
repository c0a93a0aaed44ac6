// src/model/shipping.rs

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Shipping cost and capacity profile shared by every product in a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingOption {
    pub name: String,
    pub cost_per_kg: f64,
    pub cost_per_m3: f64,
    /// Per-month shipment weight limit.
    pub max_weight_kg: f64,
    /// Per-month shipment volume limit.
    pub max_volume_m3: f64,
    pub crosses_border: bool,
    pub customs_duty_rate: f64,
    pub days_transit: u32,
}

impl ShippingOption {
    /// Duty rate actually charged on wholesale value.
    pub fn effective_duty_rate(&self) -> f64 {
        if self.crosses_border {
            self.customs_duty_rate
        } else {
            0.0
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("shipping.cost_per_kg", self.cost_per_kg),
            ("shipping.cost_per_m3", self.cost_per_m3),
            ("shipping.max_weight_kg", self.max_weight_kg),
            ("shipping.max_volume_m3", self.max_volume_m3),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::NegativeValue { field, value });
            }
        }
        if !(0.0..=1.0).contains(&self.customs_duty_rate) {
            return Err(ConfigError::InvalidDutyRate(self.customs_duty_rate));
        }
        Ok(())
    }
}

impl Default for ShippingOption {
    fn default() -> Self {
        Self {
            name: "standard".to_string(),
            cost_per_kg: 3.5,
            cost_per_m3: 80.0,
            max_weight_kg: 800.0,
            max_volume_m3: 15.0,
            crosses_border: true,
            customs_duty_rate: 0.12,
            days_transit: 3,
        }
    }
}
