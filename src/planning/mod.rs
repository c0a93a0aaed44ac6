// src/planning/mod.rs

//! Multi-period purchase order optimization.

pub mod config;
pub mod engine;
pub mod reducer;
pub mod result;

pub use config::OptimizerConfig;
pub use engine::PurchaseOrderOptimizer;
pub use reducer::{rank_by_margin, RankedProduct};
pub use result::{
    MonthlyBreakdown, OptimizationResult, OptimizationStatus, OrderLine, ProductTotal, SolveStats,
};
