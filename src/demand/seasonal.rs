// src/demand/seasonal.rs

use std::collections::BTreeMap;

/// Month (1-12) to demand multiplier. Unmapped months are neutral.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalFactors {
    factors: BTreeMap<u32, f64>,
}

impl SeasonalFactors {
    pub fn from_map(factors: BTreeMap<u32, f64>) -> Self {
        Self { factors }
    }

    /// Factors given in calendar order starting with January.
    pub fn from_monthly(monthly: &[f64]) -> Self {
        let factors = monthly
            .iter()
            .enumerate()
            .map(|(i, &factor)| (i as u32 + 1, factor))
            .collect();
        Self { factors }
    }

    /// No seasonality at all.
    pub fn flat() -> Self {
        Self {
            factors: BTreeMap::new(),
        }
    }

    pub fn get(&self, month: u32) -> f64 {
        self.factors.get(&month).copied().unwrap_or(1.0)
    }
}

impl Default for SeasonalFactors {
    fn default() -> Self {
        Self::from_monthly(&DEFAULT_MONTHLY_FACTORS)
    }
}

pub const DEFAULT_MONTHLY_FACTORS: [f64; 12] =
    [0.8, 0.7, 0.9, 0.95, 1.0, 1.0, 1.05, 1.1, 1.15, 1.3, 1.5, 1.6];
