// src/generator/filter.rs

use crate::error::GenerationError;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Accepted density band in kg/L.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DensityWindow {
    pub min: f64,
    pub max: f64,
}

impl DensityWindow {
    pub fn new(min: f64, max: f64) -> Result<Self, GenerationError> {
        if !min.is_finite() || !max.is_finite() || min < 0.0 || min > max {
            return Err(GenerationError::InvalidDensityWindow { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, density: f64) -> bool {
        self.min <= density && density <= self.max
    }
}

impl Default for DensityWindow {
    fn default() -> Self {
        Self {
            min: 0.01,
            max: 10.0,
        }
    }
}

/// Decides whether a (price, weight, size) combination is worth considering.
///
/// `Send + Sync` so one policy can be shared by concurrent generation runs.
pub trait RealismPolicy: Debug + Send + Sync {
    /// # Arguments
    /// * `price` - Wholesale price in USD.
    /// * `weight_g` - Weight in grams.
    /// * `size_cm3` - Volume in cm³.
    /// * `density` - Accepted density band.
    fn is_realistic(&self, price: f64, weight_g: f64, size_cm3: f64, density: &DensityWindow)
        -> bool;
}

/// Density bounds plus fixed retail plausibility rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicRealism;

impl RealismPolicy for HeuristicRealism {
    fn is_realistic(
        &self,
        price: f64,
        weight_g: f64,
        size_cm3: f64,
        density: &DensityWindow,
    ) -> bool {
        let weight_kg = weight_g / 1000.0;
        let volume_l = size_cm3 / 1000.0;

        let item_density = if volume_l > 0.0 {
            weight_kg / volume_l
        } else {
            0.0
        };
        if !density.contains(item_density) {
            return false;
        }

        let value_per_kg = if weight_kg > 0.0 {
            price / weight_kg
        } else {
            0.0
        };

        // Cheap goods are neither heavy nor bulky.
        if price < 10.0 && weight_kg > 5.0 {
            return false;
        }
        if price < 5.0 && size_cm3 > 10_000.0 {
            return false;
        }

        // Mid-range and luxury goods carry value density.
        if (100.0..=1_000.0).contains(&price) && value_per_kg < 10.0 {
            return false;
        }
        if price >= 1_000.0 && (value_per_kg < 50.0 || size_cm3 > 30_000.0) {
            return false;
        }

        // Large but feather-light, or tiny but heavy and cheap.
        if size_cm3 > 20_000.0 && weight_kg < 0.5 {
            return false;
        }
        if weight_kg > 10.0 && size_cm3 < 1_000.0 && price < 100.0 {
            return false;
        }

        true
    }
}

/// [`HeuristicRealism`] with an explicit density band.
pub fn is_realistic(
    price: f64,
    weight_g: f64,
    size_cm3: f64,
    density_min: f64,
    density_max: f64,
) -> bool {
    let window = DensityWindow {
        min: density_min,
        max: density_max,
    };
    HeuristicRealism.is_realistic(price, weight_g, size_cm3, &window)
}
