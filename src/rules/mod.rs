// src/rules/mod.rs

//! Business rule tables: markup and demand brackets, generation presets.

pub mod presets;
pub mod tiers;

pub use presets::{FilterPreset, FilterPresets, StepGranularity};
pub use tiers::{BusinessRules, DemandTable, DemandTier, MarkupTable, MarkupTier, FALLBACK_DEMAND};
