// src/generator/space.rs

use crate::error::GenerationError;
use crate::generator::filter::{DensityWindow, RealismPolicy};
use crate::generator::GenerationParams;
use crate::model::ProductCandidate;
use crate::rules::BusinessRules;

/// The discretized axes of one generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSpace {
    pub prices: Vec<f64>,
    pub weights_g: Vec<f64>,
    pub sizes_cm3: Vec<f64>,
    pub freight_multipliers: Vec<f64>,
    pub density: DensityWindow,
}

impl CandidateSpace {
    pub fn from_params(params: &GenerationParams) -> Result<Self, GenerationError> {
        let density = DensityWindow::new(params.density.min, params.density.max)?;
        Ok(Self {
            prices: params.price.values("price")?,
            weights_g: params.weight_g.values("weight")?,
            sizes_cm3: params.size_cm3.values("size")?,
            freight_multipliers: params.freight.values("freight")?,
            density,
        })
    }

    /// Size of the unfiltered Cartesian product.
    pub fn total_combinations(&self) -> u128 {
        self.prices.len() as u128
            * self.weights_g.len() as u128
            * self.sizes_cm3.len() as u128
            * self.freight_multipliers.len() as u128
    }

    /// Lazily walk the product in price, weight, size, freight order,
    /// yielding only combinations the policy accepts.
    pub fn candidates<'a>(
        &'a self,
        rules: &'a BusinessRules,
        policy: &'a dyn RealismPolicy,
    ) -> Candidates<'a> {
        Candidates {
            space: self,
            rules,
            policy,
            cursor: [0; 3],
            current: None,
            freight_index: 0,
        }
    }
}

/// Price a (price, weight, size) point with the rule tables.
pub fn derive_candidate(
    rules: &BusinessRules,
    wholesale: f64,
    weight_g: f64,
    size_cm3: f64,
    shipping_cost_multiplier: f64,
) -> ProductCandidate {
    ProductCandidate {
        wholesale_price: wholesale,
        retail_price: rules.markup.retail_price(wholesale),
        weight_g,
        size_cm3,
        shipping_cost_multiplier,
        base_demand: rules.demand.base_demand(wholesale, size_cm3, weight_g),
    }
}

/// Streaming iterator over accepted candidates.
///
/// The filter and the tier lookups only depend on price, weight, and size, so
/// each accepted point is priced once and fanned out over the freight axis.
pub struct Candidates<'a> {
    space: &'a CandidateSpace,
    rules: &'a BusinessRules,
    policy: &'a dyn RealismPolicy,
    // Next (price, weight, size) indices to examine.
    cursor: [usize; 3],
    current: Option<ProductCandidate>,
    freight_index: usize,
}

impl<'a> Candidates<'a> {
    fn advance(&mut self) -> Option<(f64, f64, f64)> {
        let space = self.space;
        let [p, w, s] = self.cursor;
        if p >= space.prices.len() || space.weights_g.is_empty() || space.sizes_cm3.is_empty() {
            return None;
        }
        let point = (space.prices[p], space.weights_g[w], space.sizes_cm3[s]);

        self.cursor[2] += 1;
        if self.cursor[2] == space.sizes_cm3.len() {
            self.cursor[2] = 0;
            self.cursor[1] += 1;
            if self.cursor[1] == space.weights_g.len() {
                self.cursor[1] = 0;
                self.cursor[0] += 1;
            }
        }
        Some(point)
    }
}

impl Iterator for Candidates<'_> {
    type Item = ProductCandidate;

    fn next(&mut self) -> Option<ProductCandidate> {
        loop {
            if let Some(base) = self.current {
                if let Some(&multiplier) = self.space.freight_multipliers.get(self.freight_index) {
                    self.freight_index += 1;
                    return Some(ProductCandidate {
                        shipping_cost_multiplier: multiplier,
                        ..base
                    });
                }
                self.current = None;
            }

            let (price, weight_g, size_cm3) = self.advance()?;
            if self
                .policy
                .is_realistic(price, weight_g, size_cm3, &self.space.density)
            {
                self.current = Some(derive_candidate(self.rules, price, weight_g, size_cm3, 0.0));
                self.freight_index = 0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::filter::HeuristicRealism;
    use crate::generator::range::AxisRange;

    fn small_params() -> GenerationParams {
        GenerationParams {
            price: AxisRange::linear(10.0, 30.0, 10.0),
            weight_g: AxisRange::linear(500.0, 1_000.0, 500.0),
            size_cm3: AxisRange::linear(1_000.0, 2_000.0, 1_000.0),
            freight: AxisRange::linear(1.0, 2.0, 1.0),
            ..GenerationParams::default()
        }
    }

    /// Accept everything so enumeration order is observable.
    #[derive(Debug)]
    struct AcceptAll;

    impl RealismPolicy for AcceptAll {
        fn is_realistic(&self, _: f64, _: f64, _: f64, _: &DensityWindow) -> bool {
            true
        }
    }

    #[test]
    fn test_total_combinations() {
        let space = CandidateSpace::from_params(&small_params()).unwrap();
        assert_eq!(space.total_combinations(), 3 * 2 * 2 * 2);
    }

    #[test]
    fn test_enumeration_order_and_completeness() {
        let space = CandidateSpace::from_params(&small_params()).unwrap();
        let rules = BusinessRules::default();
        let all: Vec<_> = space.candidates(&rules, &AcceptAll).collect();

        assert_eq!(all.len(), 24);
        let first = &all[0];
        assert_eq!(
            (
                first.wholesale_price,
                first.weight_g,
                first.size_cm3,
                first.shipping_cost_multiplier
            ),
            (10.0, 500.0, 1_000.0, 1.0)
        );
        assert_eq!(all[1].shipping_cost_multiplier, 2.0);
        assert_eq!(all[2].size_cm3, 2_000.0);
        assert_eq!(all[4].weight_g, 1_000.0);
        assert_eq!(all[8].wholesale_price, 20.0);
        assert_eq!(all[23].wholesale_price, 30.0);
    }

    #[test]
    fn test_filtered_candidates_are_priced() {
        let space = CandidateSpace::from_params(&small_params()).unwrap();
        let rules = BusinessRules::default();
        let accepted: Vec<_> = space.candidates(&rules, &HeuristicRealism).collect();

        assert!(!accepted.is_empty());
        for candidate in &accepted {
            assert_eq!(candidate.retail_price, candidate.wholesale_price * 3.0);
            assert_eq!(candidate.base_demand, 320.0);
        }
    }

    #[test]
    fn test_empty_freight_axis_yields_nothing() {
        let mut space = CandidateSpace::from_params(&small_params()).unwrap();
        space.freight_multipliers.clear();
        let rules = BusinessRules::default();
        assert_eq!(space.candidates(&rules, &AcceptAll).count(), 0);
    }
}
