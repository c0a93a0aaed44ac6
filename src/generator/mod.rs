// src/generator/mod.rs

//! Candidate space generation.
//!
//! Enumerates the Cartesian product of price, weight, size, and freight axes,
//! drops implausible combinations, and prices the rest with the business rule
//! tables. With a candidate cap the product is streamed through a bounded
//! top-K so memory stays proportional to the cap.

pub mod filter;
pub mod range;
pub mod space;
pub mod top_k;

pub use filter::{is_realistic, DensityWindow, HeuristicRealism, RealismPolicy};
pub use range::{generate_range, AxisRange, StepScale};
pub use space::{derive_candidate, CandidateSpace, Candidates};
pub use top_k::TopK;

use crate::error::GenerationError;
use crate::model::ProductCandidate;
use crate::rules::{BusinessRules, FilterPreset};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Default ceiling on candidates materialized without a cap.
pub const DEFAULT_MATERIALIZE_LIMIT: u64 = 5_000_000;

/// Axis ranges and output policy for one generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Wholesale price in USD.
    pub price: AxisRange,
    pub weight_g: AxisRange,
    pub size_cm3: AxisRange,
    pub freight: AxisRange,
    pub density: DensityWindow,
    /// Keep only this many candidates, best profit potential first.
    /// A cap of zero means no cap.
    pub max_candidates: Option<usize>,
    /// Uncapped runs fail once more candidates than this are accepted.
    pub materialize_limit: u64,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            price: AxisRange::linear(1.0, 10_000.0, 10.0),
            weight_g: AxisRange::linear(2.0, 100_000.0, 2.0),
            size_cm3: AxisRange::linear(1.0, 50_000.0, 50.0),
            freight: AxisRange::linear(1.0, 5.0, 1.0),
            density: DensityWindow::default(),
            max_candidates: None,
            materialize_limit: DEFAULT_MATERIALIZE_LIMIT,
        }
    }
}

impl GenerationParams {
    /// Axes starting at 1 and bounded by the preset, freight 1-5.
    pub fn from_preset(preset: &FilterPreset) -> Self {
        Self {
            price: AxisRange::linear(1.0, preset.max_price, preset.price_steps.price_step()),
            weight_g: AxisRange::linear(
                1.0,
                preset.max_weight_g,
                preset.weight_steps.weight_step(),
            ),
            size_cm3: AxisRange::linear(1.0, preset.max_size_cm3, preset.size_steps.size_step()),
            freight: AxisRange::linear(1.0, 5.0, 1.0),
            density: DensityWindow {
                min: preset.density_min,
                max: preset.density_max,
            },
            ..Self::default()
        }
    }
}

/// Candidates plus counts for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutcome {
    pub candidates: Vec<ProductCandidate>,
    pub total_combinations: u128,
    /// Combinations that passed the filter, before any cap.
    pub accepted: u64,
}

/// Generate with the default [`HeuristicRealism`] policy.
pub fn generate_candidates(
    params: &GenerationParams,
    rules: &BusinessRules,
) -> Result<GenerationOutcome, GenerationError> {
    generate_candidates_with(params, rules, &HeuristicRealism)
}

#[instrument(skip_all, fields(max_candidates = ?params.max_candidates))]
pub fn generate_candidates_with(
    params: &GenerationParams,
    rules: &BusinessRules,
    policy: &dyn RealismPolicy,
) -> Result<GenerationOutcome, GenerationError> {
    let space = CandidateSpace::from_params(params)?;
    let total_combinations = space.total_combinations();

    debug!(
        prices = space.prices.len(),
        weights = space.weights_g.len(),
        sizes = space.sizes_cm3.len(),
        freight = space.freight_multipliers.len(),
        "axes generated"
    );
    info!(total_combinations, "enumerating candidate combinations");

    let outcome = match params.max_candidates.filter(|&cap| cap > 0) {
        Some(cap) => {
            let mut top = TopK::new(cap);
            for candidate in space.candidates(rules, policy) {
                top.push(candidate.profit_potential(), candidate);
            }
            let accepted = top.seen();
            // An uncut stream keeps enumeration order.
            let candidates = if accepted <= cap as u64 {
                top.into_arrival_order()
            } else {
                top.into_ranked()
            };
            GenerationOutcome {
                candidates,
                total_combinations,
                accepted,
            }
        }
        None => {
            let mut candidates = Vec::new();
            for candidate in space.candidates(rules, policy) {
                if candidates.len() as u64 >= params.materialize_limit {
                    return Err(GenerationError::ResourceExhausted {
                        accepted: candidates.len() as u64 + 1,
                        limit: params.materialize_limit,
                        total_combinations,
                    });
                }
                candidates.push(candidate);
            }
            let accepted = candidates.len() as u64;
            GenerationOutcome {
                candidates,
                total_combinations,
                accepted,
            }
        }
    };

    info!(
        kept = outcome.candidates.len(),
        accepted = outcome.accepted,
        total_combinations,
        "candidate generation complete"
    );
    Ok(outcome)
}

/// The `n` candidates with the highest profit potential, best first.
pub fn select_top_candidates(
    candidates: impl IntoIterator<Item = ProductCandidate>,
    n: usize,
) -> Vec<ProductCandidate> {
    let mut top = TopK::new(n);
    for candidate in candidates {
        top.push(candidate.profit_potential(), candidate);
    }
    top.into_ranked()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{DemandTier, FilterPresets};

    fn params() -> GenerationParams {
        GenerationParams {
            price: AxisRange::linear(1.0, 200.0, 7.0),
            weight_g: AxisRange::linear(100.0, 30_000.0, 1_500.0),
            size_cm3: AxisRange::linear(100.0, 40_000.0, 2_500.0),
            freight: AxisRange::linear(1.0, 3.0, 1.0),
            ..GenerationParams::default()
        }
    }

    #[test]
    fn test_demand_within_tier_caps() {
        let rules = BusinessRules::default();
        let outcome = generate_candidates(&params(), &rules).unwrap();
        assert!(outcome.accepted > 0);
        assert!((outcome.accepted as u128) < outcome.total_combinations);

        for candidate in &outcome.candidates {
            let tier: &DemandTier = rules.demand.tier_for(candidate.wholesale_price).unwrap();
            assert!(candidate.base_demand >= 1.0);
            assert!(candidate.base_demand <= tier.max_demand_monthly);
        }
    }

    #[test]
    fn test_cap_matches_full_sort() {
        let rules = BusinessRules::default();
        let all = generate_candidates(&params(), &rules).unwrap().candidates;

        let mut expected = all.clone();
        expected.sort_by(|a, b| b.profit_potential().total_cmp(&a.profit_potential()));
        expected.truncate(25);

        let capped = generate_candidates(
            &GenerationParams {
                max_candidates: Some(25),
                ..params()
            },
            &rules,
        )
        .unwrap();
        assert_eq!(capped.candidates, expected);
        assert_eq!(capped.accepted, all.len() as u64);
    }

    #[test]
    fn test_cap_above_count_keeps_enumeration_order() {
        let rules = BusinessRules::default();
        let all = generate_candidates(&params(), &rules).unwrap();
        let capped = generate_candidates(
            &GenerationParams {
                max_candidates: Some(all.candidates.len() + 10),
                ..params()
            },
            &rules,
        )
        .unwrap();
        assert_eq!(capped.candidates, all.candidates);
    }

    #[test]
    fn test_uncapped_run_reports_resource_exhaustion() {
        let rules = BusinessRules::default();
        let err = generate_candidates(
            &GenerationParams {
                materialize_limit: 10,
                ..params()
            },
            &rules,
        )
        .unwrap_err();
        assert!(err.is_resource_exhaustion());
    }

    #[test]
    fn test_zero_cap_keeps_everything() {
        let rules = BusinessRules::default();
        let all = generate_candidates(&params(), &rules).unwrap();
        let zero = generate_candidates(
            &GenerationParams {
                max_candidates: Some(0),
                ..params()
            },
            &rules,
        )
        .unwrap();
        assert!(!zero.candidates.is_empty());
        assert_eq!(zero.candidates, all.candidates);
        assert_eq!(zero.accepted, zero.candidates.len() as u64);

        // Still bounded like any uncapped run.
        let err = generate_candidates(
            &GenerationParams {
                max_candidates: Some(0),
                materialize_limit: 10,
                ..params()
            },
            &rules,
        )
        .unwrap_err();
        assert!(err.is_resource_exhaustion());
    }

    #[test]
    fn test_invalid_step_is_reported_per_axis() {
        let rules = BusinessRules::default();
        let err = generate_candidates(
            &GenerationParams {
                size_cm3: AxisRange::linear(1.0, 10.0, 0.0),
                ..params()
            },
            &rules,
        )
        .unwrap_err();
        assert_eq!(
            err,
            GenerationError::InvalidStep {
                axis: "size",
                step: 0.0
            }
        );
    }

    #[test]
    fn test_preset_params() {
        let presets = FilterPresets::default();
        let params = GenerationParams::from_preset(presets.get("aggressive").unwrap());
        assert_eq!(params.price, AxisRange::linear(1.0, 1_000.0, 50.0));
        assert_eq!(params.weight_g.max, 20_000.0);
        assert_eq!(params.density, DensityWindow { min: 0.1, max: 5.0 });
    }

    #[test]
    fn test_select_top_candidates() {
        let rules = BusinessRules::default();
        let all = generate_candidates(&params(), &rules).unwrap().candidates;
        let top = select_top_candidates(all.clone(), 3);
        assert_eq!(top.len(), 3);
        let best = all
            .iter()
            .map(ProductCandidate::profit_potential)
            .fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(top[0].profit_potential(), best);
    }
}
