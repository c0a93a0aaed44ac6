// src/lib.rs

//! Product assortment planning.
//!
//! Two stages: [`generator`] enumerates plausible product candidates from
//! price/weight/size/freight axes and the business rule tables, and
//! [`planning`] turns a product list into a multi-month purchase plan by
//! solving an integer program through a [`solver::MilpSolver`].

pub mod config;
pub mod demand;
pub mod error;
pub mod generator;
pub mod io;
pub mod logging;
pub mod model;
pub mod planning;
pub mod rules;
pub mod solver;

pub use error::{Cancelled, ConfigError, ExportError, GenerationError, ModelError, SolverError};
