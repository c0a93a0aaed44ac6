// src/planning/reducer.rs

use crate::planning::result::{OptimizationResult, ProductTotal};

/// A product total paired with its id, as handed to exporters.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedProduct<'a> {
    pub id: &'a str,
    pub total: &'a ProductTotal,
}

/// Product totals by total margin, highest first, optionally cut to `top_n`.
///
/// Equal margins keep product id order.
pub fn rank_by_margin(result: &OptimizationResult, top_n: Option<usize>) -> Vec<RankedProduct<'_>> {
    let mut ranked: Vec<RankedProduct<'_>> = result
        .product_totals
        .iter()
        .map(|(id, total)| RankedProduct {
            id: id.as_str(),
            total,
        })
        .collect();
    ranked.sort_by(|a, b| b.total.total_margin.total_cmp(&a.total.total_margin));
    if let Some(n) = top_n {
        ranked.truncate(n);
    }
    ranked
}
