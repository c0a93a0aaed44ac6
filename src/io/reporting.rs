// src/io/reporting.rs

use crate::error::ExportError;
use crate::model::Product;
use crate::planning::{rank_by_margin, OptimizationResult};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::{info, warn};

/// One line of the product catalog export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogRow {
    pub id: String,
    pub name: String,
    pub wholesale_price: f64,
    pub retail_price: f64,
    pub weight_g: f64,
    pub size_cm3: f64,
    pub shipping_cost_multiplier: f64,
    pub base_demand: f64,
    pub total_quantity_ordered: u64,
    pub total_cost: f64,
    pub total_revenue: f64,
    pub total_margin: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Join the margin-ranked product totals with product parameters.
///
/// Money is rounded to cents. Totals without a matching product are skipped.
pub fn catalog_rows(
    result: &OptimizationResult,
    products: &[Product],
    top_n: Option<usize>,
) -> Vec<CatalogRow> {
    let by_id: HashMap<&str, &Product> = products.iter().map(|p| (p.id.as_str(), p)).collect();

    rank_by_margin(result, top_n)
        .into_iter()
        .filter_map(|ranked| {
            let Some(product) = by_id.get(ranked.id) else {
                warn!(id = ranked.id, "ordered product missing from input list");
                return None;
            };
            Some(CatalogRow {
                id: product.id.clone(),
                name: product.name.clone(),
                wholesale_price: round2(product.wholesale_price),
                retail_price: round2(product.retail_price),
                weight_g: product.weight_g,
                size_cm3: product.size_cm3,
                shipping_cost_multiplier: product.shipping_cost_multiplier,
                base_demand: product.demand_forecast.base_demand,
                total_quantity_ordered: ranked.total.total_quantity,
                total_cost: round2(ranked.total.total_cost),
                total_revenue: round2(ranked.total.total_revenue),
                total_margin: round2(ranked.total.total_margin),
            })
        })
        .collect()
}

/// Writes catalog rows to a CSV file, returning the row count.
///
/// # Arguments
/// * `path` - Destination file, e.g. `results/catalog.csv`.
/// * `rows` - Output of [`catalog_rows`].
pub fn write_catalog(path: impl AsRef<Path>, rows: &[CatalogRow]) -> Result<usize, ExportError> {
    let path = path.as_ref();
    let mut wtr = csv::Writer::from_path(path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;

    info!(rows = rows.len(), path = %path.display(), "catalog exported");
    Ok(rows.len())
}

/// Writes the full result as pretty JSON.
pub fn write_result_json(
    path: impl AsRef<Path>,
    result: &OptimizationResult,
) -> Result<(), ExportError> {
    let path = path.as_ref();
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, result)?;

    info!(path = %path.display(), status = %result.status, "result exported");
    Ok(())
}
