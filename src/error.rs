// src/error.rs

use std::time::Duration;
use thiserror::Error;

/// Malformed business rules or run parameters.
///
/// Raised once at load time; the generator and optimizer only ever see
/// validated structures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{table} tier list is empty")]
    EmptyTiers { table: &'static str },

    #[error("{table} tiers must start at 0, first bracket starts at {start}")]
    TiersNotFromZero { table: &'static str, start: f64 },

    #[error("{table} tier {index} is malformed: [{min}, {max})")]
    InvalidBracket {
        table: &'static str,
        index: usize,
        min: f64,
        max: f64,
    },

    #[error("{table} tier {index} does not continue the previous bracket (expected start {expected}, got {actual})")]
    BracketGap {
        table: &'static str,
        index: usize,
        expected: f64,
        actual: f64,
    },

    #[error("markup tier {index} has multiplier {multiplier}, must be >= 1")]
    InvalidMarkup { index: usize, multiplier: f64 },

    #[error("demand tier {index}: {message}")]
    InvalidDemandTier { index: usize, message: String },

    #[error("planning_months must be at least 1, got {0}")]
    InvalidPlanningMonths(u32),

    #[error("{field} must be a finite, non-negative number, got {value}")]
    NegativeValue { field: &'static str, value: f64 },

    #[error("{field} must be a finite, positive number, got {value}")]
    NonPositiveValue { field: &'static str, value: f64 },

    #[error("customs_duty_rate must lie in [0, 1], got {0}")]
    InvalidDutyRate(f64),

    #[error("unknown solver engine '{0}' (known engines: microlp, highs)")]
    UnknownSolver(String),

    #[error("unknown filter preset '{0}'")]
    UnknownPreset(String),

    #[error("failed to read config file {path}: {message}")]
    Io { path: String, message: String },

    #[error("failed to parse config file {path}: {message}")]
    Parse { path: String, message: String },
}

/// Failure while enumerating the candidate space.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error("{axis} axis step must be a finite number > 0, got {step}")]
    InvalidStep { axis: &'static str, step: f64 },

    #[error("{axis} axis is invalid: {message}")]
    InvalidAxis { axis: &'static str, message: String },

    #[error("density window [{min}, {max}] is invalid")]
    InvalidDensityWindow { min: f64, max: f64 },

    #[error(
        "candidate space too large: {accepted} candidates accepted out of {total_combinations} combinations \
         exceeds the limit of {limit}; narrow the axis ranges or set max_candidates to stream a top-N selection"
    )]
    ResourceExhausted {
        accepted: u64,
        limit: u64,
        total_combinations: u128,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl GenerationError {
    /// True when the caller should shrink the search space rather than retry as-is.
    pub fn is_resource_exhaustion(&self) -> bool {
        matches!(self, GenerationError::ResourceExhausted { .. })
    }
}

/// Invalid optimizer input detected while building the integer program.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("product {id}: {field} must be finite and non-negative, got {value}")]
    InvalidProduct {
        id: String,
        field: &'static str,
        value: f64,
    },

    #[error("product {id}: demand forecast is invalid: {message}")]
    InvalidForecast { id: String, message: String },

    #[error("duplicate product id {0}")]
    DuplicateId(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Outcome of the solving capability other than a usable assignment.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("solver engine '{engine}' is not available in this build")]
    Unavailable { engine: String },

    #[error("problem is infeasible")]
    Infeasible,

    #[error("problem is unbounded")]
    Unbounded,

    #[error("no feasible assignment found within the {}s time limit", limit.as_secs_f64())]
    TimedOut { limit: Duration },

    #[error("solve cancelled")]
    Cancelled,

    #[error("solver failure: {0}")]
    Backend(String),
}

/// The run was interrupted by the caller.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("optimization cancelled by user")]
pub struct Cancelled;

/// Failure writing or reading candidates and reports.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
