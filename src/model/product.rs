// src/model/product.rs

use crate::demand::{DemandForecast, ForecastDefaults, SeasonalFactors};
use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A point in the generated parameter space.
///
/// Field order is the column order of the candidates CSV.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProductCandidate {
    pub wholesale_price: f64,
    pub retail_price: f64,
    pub weight_g: f64,
    pub size_cm3: f64,
    pub shipping_cost_multiplier: f64,
    pub base_demand: f64,
}

impl ProductCandidate {
    pub fn margin(&self) -> f64 {
        self.retail_price - self.wholesale_price
    }

    /// Ranking key for top-N selection: unit margin times expected demand.
    pub fn profit_potential(&self) -> f64 {
        self.margin() * self.base_demand
    }
}

/// A product handed to the purchase order optimizer.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub wholesale_price: f64,
    pub retail_price: f64,
    pub size_cm3: f64,
    pub weight_g: f64,
    pub category: String,
    pub shipping_cost_multiplier: f64,
    pub demand_forecast: DemandForecast,
}

impl Product {
    /// Promote the `index`-th (1-based) candidate to a product with id `P000001` style.
    pub fn from_candidate(
        candidate: &ProductCandidate,
        index: usize,
        seasonal_factors: Arc<SeasonalFactors>,
        defaults: ForecastDefaults,
    ) -> Self {
        Self {
            id: product_id(index),
            name: format!("Product_{}", index),
            wholesale_price: candidate.wholesale_price,
            retail_price: candidate.retail_price,
            size_cm3: candidate.size_cm3,
            weight_g: candidate.weight_g,
            category: "General".to_string(),
            shipping_cost_multiplier: candidate.shipping_cost_multiplier,
            demand_forecast: DemandForecast::new(candidate.base_demand, seasonal_factors, defaults),
        }
    }

    pub fn margin(&self) -> f64 {
        self.retail_price - self.wholesale_price
    }

    pub fn weight_kg(&self) -> f64 {
        self.weight_g / 1000.0
    }

    pub fn volume_m3(&self) -> f64 {
        self.size_cm3 / 1_000_000.0
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        for (field, value) in [
            ("wholesale_price", self.wholesale_price),
            ("retail_price", self.retail_price),
            ("size_cm3", self.size_cm3),
            ("weight_g", self.weight_g),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ModelError::InvalidProduct {
                    id: self.id.clone(),
                    field,
                    value,
                });
            }
        }
        self.demand_forecast
            .validate()
            .map_err(|message| ModelError::InvalidForecast {
                id: self.id.clone(),
                message,
            })
    }
}

pub fn product_id(index: usize) -> String {
    format!("P{:06}", index)
}

/// Promote candidates in order; all products share one seasonal table.
pub fn promote_candidates(
    candidates: &[ProductCandidate],
    seasonal_factors: Arc<SeasonalFactors>,
    defaults: ForecastDefaults,
) -> Vec<Product> {
    candidates
        .iter()
        .enumerate()
        .map(|(i, candidate)| {
            Product::from_candidate(candidate, i + 1, Arc::clone(&seasonal_factors), defaults)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate() -> ProductCandidate {
        ProductCandidate {
            wholesale_price: 10.0,
            retail_price: 30.0,
            weight_g: 500.0,
            size_cm3: 1_000.0,
            shipping_cost_multiplier: 2.0,
            base_demand: 320.0,
        }
    }

    #[test]
    fn test_profit_potential() {
        assert_eq!(candidate().profit_potential(), 6_400.0);
    }

    #[test]
    fn test_promotion_assigns_ids_and_shares_seasonality() {
        let seasonal = Arc::new(SeasonalFactors::default());
        let products = promote_candidates(
            &[candidate(), candidate()],
            Arc::clone(&seasonal),
            ForecastDefaults::default(),
        );

        assert_eq!(products[0].id, "P000001");
        assert_eq!(products[1].id, "P000002");
        assert_eq!(products[1].name, "Product_2");
        assert_eq!(products[0].demand_forecast.base_demand, 320.0);
        assert_eq!(products[0].demand_forecast.trend_factor, 1.02);
        assert!(Arc::ptr_eq(
            &products[0].demand_forecast.seasonal_factors,
            &products[1].demand_forecast.seasonal_factors
        ));
        // Two products plus the local handle.
        assert_eq!(Arc::strong_count(&seasonal), 3);
    }

    #[test]
    fn test_unit_conversions() {
        let product = Product::from_candidate(
            &candidate(),
            1,
            Arc::new(SeasonalFactors::flat()),
            ForecastDefaults::default(),
        );
        assert_eq!(product.margin(), 20.0);
        assert_eq!(product.weight_kg(), 0.5);
        assert_eq!(product.volume_m3(), 0.001);
    }

    #[test]
    fn test_validate_rejects_negative_weight() {
        let mut product = Product::from_candidate(
            &candidate(),
            7,
            Arc::new(SeasonalFactors::flat()),
            ForecastDefaults::default(),
        );
        product.weight_g = -1.0;
        assert_eq!(
            product.validate(),
            Err(ModelError::InvalidProduct {
                id: "P000007".to_string(),
                field: "weight_g",
                value: -1.0,
            })
        );
    }
}
