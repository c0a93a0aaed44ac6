// src/model/mod.rs

pub mod product;
pub mod shipping;

pub use product::{product_id, promote_candidates, Product, ProductCandidate};
pub use shipping::ShippingOption;
