// src/solver/mod.rs

//! Engine-neutral MILP models and the engines that solve them.

pub mod budget;
pub mod cancel;
pub mod implementations;
pub mod model;
pub mod traits;

pub use budget::solve_with_budget;
pub use cancel::CancelToken;
pub use implementations::{MicroLpSolver, SolverEngine};
#[cfg(feature = "highs")]
pub use implementations::HighsSolver;
pub use model::{IntVar, LinearConstraint, LinearExpr, MilpModel, VarId};
pub use traits::{MilpSolver, RawSolution, SolveStatus};
