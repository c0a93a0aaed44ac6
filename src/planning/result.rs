// src/planning/result.rs

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptimizationStatus {
    Optimal,
    /// Valid assignment, optimality not proven.
    Feasible,
    Infeasible,
    Error,
}

impl OptimizationStatus {
    /// OPTIMAL and FEASIBLE both carry an exportable plan.
    pub fn has_solution(self) -> bool {
        matches!(self, OptimizationStatus::Optimal | OptimizationStatus::Feasible)
    }
}

impl fmt::Display for OptimizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OptimizationStatus::Optimal => "OPTIMAL",
            OptimizationStatus::Feasible => "FEASIBLE",
            OptimizationStatus::Infeasible => "INFEASIBLE",
            OptimizationStatus::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// One product's order in one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderLine {
    pub name: String,
    pub quantity: u64,
    pub unit_wholesale: f64,
    pub total_cost: f64,
    pub unit_retail: f64,
    pub total_revenue: f64,
    pub margin: f64,
    pub weight_kg: f64,
    pub volume_m3: f64,
}

/// Month totals recomputed from the realized order lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthlyBreakdown {
    pub product_cost: f64,
    pub product_revenue: f64,
    pub gross_margin: f64,
    pub weight_shipping: f64,
    pub volume_shipping: f64,
    pub customs_duty: f64,
    pub total_costs: f64,
    pub net_profit: f64,
    pub weight_kg: f64,
    pub volume_m3: f64,
    pub items_ordered: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductTotal {
    pub name: String,
    pub total_quantity: u64,
    pub total_cost: f64,
    pub total_revenue: f64,
    pub total_margin: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SolveStats {
    pub variables: usize,
    pub constraints: usize,
    pub engine: String,
    #[serde(serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

/// Status-tagged outcome of one `optimize` call.
///
/// Anything other than OPTIMAL or FEASIBLE leaves the plan empty and the
/// objective at zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationResult {
    pub status: OptimizationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub objective_value: f64,
    /// month -> product id -> order line, every planned month present.
    pub purchase_orders: BTreeMap<u32, BTreeMap<String, OrderLine>>,
    pub monthly_breakdown: BTreeMap<u32, MonthlyBreakdown>,
    /// Products with a nonzero total quantity only.
    pub product_totals: BTreeMap<String, ProductTotal>,
    pub stats: SolveStats,
}

impl OptimizationResult {
    fn empty(status: OptimizationStatus, message: Option<String>) -> Self {
        Self {
            status,
            message,
            objective_value: 0.0,
            purchase_orders: BTreeMap::new(),
            monthly_breakdown: BTreeMap::new(),
            product_totals: BTreeMap::new(),
            stats: SolveStats::default(),
        }
    }

    pub fn infeasible() -> Self {
        Self::empty(OptimizationStatus::Infeasible, None)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::empty(OptimizationStatus::Error, Some(message.into()))
    }

    pub fn with_stats(mut self, stats: SolveStats) -> Self {
        self.stats = stats;
        self
    }

    /// Quantity ordered of `product_id` in `month`, 0 if none.
    pub fn quantity(&self, month: u32, product_id: &str) -> u64 {
        self.purchase_orders
            .get(&month)
            .and_then(|orders| orders.get(product_id))
            .map_or(0, |line| line.quantity)
    }

    pub fn total_units(&self) -> u64 {
        self.product_totals.values().map(|t| t.total_quantity).sum()
    }
}
