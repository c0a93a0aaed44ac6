// src/solver/traits.rs

use crate::error::SolverError;
use crate::solver::cancel::CancelToken;
use crate::solver::model::MilpModel;
use std::fmt::Debug;
use std::time::Duration;

/// How good the returned assignment is known to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Optimal,
    /// Valid but not proven optimal, e.g. the time limit cut the search short.
    Feasible,
}

/// An assignment for every variable of the model, in `VarId` order.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSolution {
    pub status: SolveStatus,
    pub values: Vec<f64>,
    pub objective_value: f64,
}

/// A mixed-integer solving capability.
///
/// We require `Send` + `Sync` because solves run on a worker thread and one
/// engine may serve several optimizations at once.
pub trait MilpSolver: Debug + Send + Sync {
    /// Engine name for logs and error messages.
    fn name(&self) -> &str;

    /// Whether the engine stops itself at `time_limit`.
    ///
    /// Engines that do get a grace period before the caller gives up on them,
    /// so a time-limited incumbent can still be reported as feasible.
    fn honors_time_limit(&self) -> bool {
        false
    }

    /// Maximize `model.objective` subject to `model.constraints`.
    ///
    /// # Arguments
    /// * `model` - Variables, objective, and `<=` constraints.
    /// * `time_limit` - Wall-clock budget for the search.
    /// * `cancel` - Raised when the caller stops waiting. Engines that can
    ///   should check it and return [`SolverError::Cancelled`].
    fn solve(
        &self,
        model: &MilpModel,
        time_limit: Duration,
        cancel: &CancelToken,
    ) -> Result<RawSolution, SolverError>;
}
