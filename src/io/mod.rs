// src/io/mod.rs

pub mod candidates;
pub mod reporting;

pub use candidates::{read_candidates, write_candidates};
pub use reporting::{catalog_rows, write_catalog, write_result_json, CatalogRow};
