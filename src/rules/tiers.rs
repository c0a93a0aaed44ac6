// src/rules/tiers.rs

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Demand used when a wholesale price falls outside every demand bracket.
pub const FALLBACK_DEMAND: f64 = 5.0;

/// Wholesale-cost bracket `[min_cost, max_cost)` mapped to a retail markup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkupTier {
    pub min_cost: f64,
    pub max_cost: f64,
    pub multiplier: f64,
}

impl MarkupTier {
    pub fn new(min_cost: f64, max_cost: f64, multiplier: f64) -> Self {
        Self {
            min_cost,
            max_cost,
            multiplier,
        }
    }

    pub fn contains(&self, cost: f64) -> bool {
        self.min_cost <= cost && cost < self.max_cost
    }
}

/// Price bracket `[min_price, max_price)` mapped to demand parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemandTier {
    pub min_price: f64,
    pub max_price: f64,
    pub base_demand_monthly: f64,
    #[serde(default = "default_demand_multiplier")]
    pub demand_multiplier: f64,
    pub max_demand_monthly: f64,
}

fn default_demand_multiplier() -> f64 {
    1.0
}

impl DemandTier {
    pub fn new(
        min_price: f64,
        max_price: f64,
        base_demand_monthly: f64,
        demand_multiplier: f64,
        max_demand_monthly: f64,
    ) -> Self {
        Self {
            min_price,
            max_price,
            base_demand_monthly,
            demand_multiplier,
            max_demand_monthly,
        }
    }

    pub fn contains(&self, price: f64) -> bool {
        self.min_price <= price && price < self.max_price
    }
}

/// Checks that brackets are non-empty, start at zero, and are contiguous.
fn validate_brackets(
    table: &'static str,
    brackets: impl Iterator<Item = (f64, f64)>,
) -> Result<(), ConfigError> {
    let mut previous_max: Option<f64> = None;
    let mut seen = 0usize;

    for (index, (min, max)) in brackets.enumerate() {
        seen += 1;
        if !min.is_finite() || !(max > min) {
            return Err(ConfigError::InvalidBracket {
                table,
                index,
                min,
                max,
            });
        }
        match previous_max {
            None if min != 0.0 => {
                return Err(ConfigError::TiersNotFromZero { table, start: min });
            }
            Some(expected) if expected != min => {
                return Err(ConfigError::BracketGap {
                    table,
                    index,
                    expected,
                    actual: min,
                });
            }
            _ => {}
        }
        previous_max = Some(max);
    }

    if seen == 0 {
        return Err(ConfigError::EmptyTiers { table });
    }
    Ok(())
}

/// Ordered, gap-free markup brackets.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkupTable {
    tiers: Vec<MarkupTier>,
}

impl MarkupTable {
    pub fn new(tiers: Vec<MarkupTier>) -> Result<Self, ConfigError> {
        validate_brackets("markup", tiers.iter().map(|t| (t.min_cost, t.max_cost)))?;
        for (index, tier) in tiers.iter().enumerate() {
            if !(tier.multiplier >= 1.0) || !tier.multiplier.is_finite() {
                return Err(ConfigError::InvalidMarkup {
                    index,
                    multiplier: tier.multiplier,
                });
            }
        }
        Ok(Self { tiers })
    }

    pub fn tiers(&self) -> &[MarkupTier] {
        &self.tiers
    }

    /// The bracket holding `wholesale`, or the last bracket past the top of the table.
    pub fn tier_for(&self, wholesale: f64) -> &MarkupTier {
        self.tiers
            .iter()
            .find(|tier| tier.contains(wholesale))
            .unwrap_or_else(|| &self.tiers[self.tiers.len() - 1])
    }

    /// Retail price for a wholesale cost.
    pub fn retail_price(&self, wholesale: f64) -> f64 {
        wholesale * self.tier_for(wholesale).multiplier
    }
}

/// Ordered, gap-free demand brackets keyed by wholesale price.
#[derive(Debug, Clone, PartialEq)]
pub struct DemandTable {
    tiers: Vec<DemandTier>,
}

impl DemandTable {
    pub fn new(tiers: Vec<DemandTier>) -> Result<Self, ConfigError> {
        validate_brackets("demand", tiers.iter().map(|t| (t.min_price, t.max_price)))?;
        for (index, tier) in tiers.iter().enumerate() {
            let problem = if !(tier.base_demand_monthly >= 0.0) {
                Some("base_demand_monthly must be non-negative")
            } else if !(tier.demand_multiplier >= 0.0) {
                Some("demand_multiplier must be non-negative")
            } else if !(tier.max_demand_monthly >= 1.0) {
                Some("max_demand_monthly must be at least 1")
            } else {
                None
            };
            if let Some(message) = problem {
                return Err(ConfigError::InvalidDemandTier {
                    index,
                    message: message.to_string(),
                });
            }
        }
        Ok(Self { tiers })
    }

    pub fn tiers(&self) -> &[DemandTier] {
        &self.tiers
    }

    pub fn tier_for(&self, price: f64) -> Option<&DemandTier> {
        self.tiers.iter().find(|tier| tier.contains(price))
    }

    /// Expected monthly demand for a candidate.
    ///
    /// Bulky (> 20,000 cm³) items halve, heavy (> 20 kg) items lose another 30%,
    /// and the result is clamped to `[1, max_demand_monthly]` of the tier.
    pub fn base_demand(&self, wholesale: f64, size_cm3: f64, weight_g: f64) -> f64 {
        let Some(tier) = self.tier_for(wholesale) else {
            debug!(wholesale, "price outside all demand tiers, using fallback demand");
            return FALLBACK_DEMAND;
        };

        let weight_kg = weight_g / 1000.0;
        let mut demand = tier.base_demand_monthly * tier.demand_multiplier;
        if size_cm3 > 20_000.0 {
            demand *= 0.5;
        }
        if weight_kg > 20.0 {
            demand *= 0.7;
        }

        demand.max(1.0).min(tier.max_demand_monthly)
    }
}

/// The read-only tables the generator prices and sizes candidates with.
#[derive(Debug, Clone, PartialEq)]
pub struct BusinessRules {
    pub markup: MarkupTable,
    pub demand: DemandTable,
}

impl BusinessRules {
    pub fn new(markup: Vec<MarkupTier>, demand: Vec<DemandTier>) -> Result<Self, ConfigError> {
        Ok(Self {
            markup: MarkupTable::new(markup)?,
            demand: DemandTable::new(demand)?,
        })
    }
}

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            markup: MarkupTable {
                tiers: default_markup_tiers(),
            },
            demand: DemandTable {
                tiers: default_demand_tiers(),
            },
        }
    }
}

pub fn default_markup_tiers() -> Vec<MarkupTier> {
    vec![
        MarkupTier::new(0.0, 50.0, 3.0),
        MarkupTier::new(50.0, 100.0, 2.5),
        MarkupTier::new(100.0, 500.0, 2.25),
        MarkupTier::new(500.0, 1_000.0, 2.0),
        MarkupTier::new(1_000.0, 3_000.0, 1.75),
        MarkupTier::new(3_000.0, 999_999.0, 1.5),
    ]
}

pub fn default_demand_tiers() -> Vec<DemandTier> {
    vec![
        DemandTier::new(0.0, 50.0, 320.0, 1.0, 500.0),
        DemandTier::new(50.0, 100.0, 280.0, 1.0, 400.0),
        DemandTier::new(100.0, 500.0, 240.0, 1.0, 300.0),
        DemandTier::new(500.0, 1_000.0, 200.0, 1.0, 200.0),
        DemandTier::new(1_000.0, 3_000.0, 160.0, 1.0, 100.0),
        DemandTier::new(3_000.0, 5_000.0, 120.0, 1.0, 50.0),
        DemandTier::new(5_000.0, 999_999.0, 80.0, 1.0, 20.0),
    ]
}
