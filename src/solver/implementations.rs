// src/solver/implementations.rs

use crate::error::{ConfigError, SolverError};
use crate::solver::cancel::CancelToken;
use crate::solver::model::{LinearExpr, MilpModel, VarId};
use crate::solver::traits::{MilpSolver, RawSolution, SolveStatus};
use microlp::{
    ComparisonOp, OptimizationDirection, Problem, SolveOptions, SolveOutcome, TerminationReason,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

// =========================================================================
// 1. microlp (pure Rust, always available)
// =========================================================================

/// Longest stretch microlp searches before the cancel token is checked again.
const SLICE: Duration = Duration::from_millis(100);

fn map_microlp_error(err: microlp::Error) -> SolverError {
    match err {
        microlp::Error::Infeasible => SolverError::Infeasible,
        microlp::Error::Unbounded => SolverError::Unbounded,
        other => SolverError::Backend(other.to_string()),
    }
}

/// Sum repeated terms so every variable appears once per row.
fn merged_terms(expr: &LinearExpr) -> BTreeMap<usize, f64> {
    let mut merged = BTreeMap::new();
    for &(VarId(i), coefficient) in &expr.terms {
        *merged.entry(i).or_insert(0.0) += coefficient;
    }
    merged
}

fn build_problem(model: &MilpModel) -> Result<Problem, SolverError> {
    let objective = merged_terms(&model.objective);
    let mut problem = Problem::new(OptimizationDirection::Maximize);

    let mut vars = Vec::with_capacity(model.num_variables());
    for (i, var) in model.variables.iter().enumerate() {
        let upper = var.upper.floor();
        if upper < 0.0 {
            return Err(SolverError::Infeasible);
        }
        if upper > i32::MAX as f64 {
            return Err(SolverError::Backend(format!(
                "upper bound {} of {} exceeds the microlp integer range",
                var.upper, var.name
            )));
        }
        let coefficient = objective.get(&i).copied().unwrap_or(0.0);
        vars.push(problem.add_integer_var(coefficient, (0, upper as i32)));
    }

    for constraint in &model.constraints {
        let mut row = microlp::LinearExpr::empty();
        for (i, coefficient) in merged_terms(&constraint.expr) {
            row.add(vars[i], coefficient);
        }
        let rhs = constraint.rhs - constraint.expr.constant;
        problem.add_constraint(row, ComparisonOp::Le, rhs);
    }
    Ok(problem)
}

/// Branch-and-bound over the simplex in the `microlp` crate.
///
/// The search runs in slices of at most [`SLICE`] and is resumed until it
/// finishes, the time limit is spent or `cancel` fires. A time-limited
/// incumbent is reported as feasible.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicroLpSolver;

impl MicroLpSolver {
    fn run_sliced(
        &self,
        problem: &Problem,
        time_limit: Duration,
        cancel: &CancelToken,
    ) -> Result<SolveOutcome, SolverError> {
        let started = Instant::now();
        let mut options = SolveOptions::default();
        options.time_limit = Some(time_limit.min(SLICE));
        let mut outcome = problem.solve_with(options).map_err(map_microlp_error)?;
        let mut slices = 1u32;

        while outcome.termination_reason() == TerminationReason::TimeLimit {
            if cancel.is_cancelled() {
                debug!(slices, "microlp stopped on cancel");
                return Err(SolverError::Cancelled);
            }
            let remaining = time_limit.saturating_sub(started.elapsed());
            if remaining.is_zero() {
                break;
            }
            let mut resume = outcome.last_resume_options();
            resume.time_limit = Some(remaining.min(SLICE));
            outcome = outcome.resume_with(resume).map_err(map_microlp_error)?;
            slices += 1;
        }
        debug!(
            slices,
            elapsed_ms = started.elapsed().as_millis() as u64,
            reason = ?outcome.termination_reason(),
            "microlp finished"
        );
        Ok(outcome)
    }
}

impl MilpSolver for MicroLpSolver {
    fn name(&self) -> &str {
        "microlp"
    }

    fn honors_time_limit(&self) -> bool {
        true
    }

    fn solve(
        &self,
        model: &MilpModel,
        time_limit: Duration,
        cancel: &CancelToken,
    ) -> Result<RawSolution, SolverError> {
        let problem = build_problem(model)?;
        let outcome = self.run_sliced(&problem, time_limit, cancel)?;
        let solution = outcome
            .into_solution()
            .map_err(|_| SolverError::TimedOut { limit: time_limit })?;

        let status = match solution.termination_reason() {
            TerminationReason::ProvenOptimal => SolveStatus::Optimal,
            _ => SolveStatus::Feasible,
        };
        let values: Vec<f64> = solution.iter().map(|(_, value)| value).collect();
        let objective_value = model.objective.evaluate(&values);
        Ok(RawSolution {
            status,
            values,
            objective_value,
        })
    }
}

// =========================================================================
// 2. HiGHS (native, behind the `highs` feature)
// =========================================================================

#[cfg(feature = "highs")]
mod highs {
    use super::*;
    use good_lp::solvers::{SolutionStatus, WithTimeLimit};
    use good_lp::{
        variable, Expression, IntoAffineExpression, ProblemVariables, ResolutionError, Solution,
        SolverModel, Variable,
    };

    fn build_variables(model: &MilpModel) -> (ProblemVariables, Vec<Variable>) {
        let mut problem = ProblemVariables::new();
        let vars = model
            .variables
            .iter()
            .map(|var| {
                problem.add(
                    variable()
                        .integer()
                        .min(0.0)
                        .max(var.upper)
                        .name(var.name.clone()),
                )
            })
            .collect();
        (problem, vars)
    }

    fn to_expression(expr: &LinearExpr, vars: &[Variable]) -> Expression {
        let mut out = Expression::from(expr.constant);
        for &(VarId(i), coefficient) in &expr.terms {
            out += vars[i] * coefficient;
        }
        out
    }

    fn map_resolution_error(err: ResolutionError) -> SolverError {
        match err {
            ResolutionError::Infeasible => SolverError::Infeasible,
            ResolutionError::Unbounded => SolverError::Unbounded,
            other => SolverError::Backend(other.to_string()),
        }
    }

    /// The HiGHS MIP solver with its own time limit.
    ///
    /// HiGHS cannot be interrupted through good_lp, so a cancelled solve runs
    /// on until its time limit while the caller moves on.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct HighsSolver;

    impl MilpSolver for HighsSolver {
        fn name(&self) -> &str {
            "highs"
        }

        fn honors_time_limit(&self) -> bool {
            true
        }

        fn solve(
            &self,
            model: &MilpModel,
            time_limit: Duration,
            _cancel: &CancelToken,
        ) -> Result<RawSolution, SolverError> {
            let (problem, vars) = build_variables(model);
            let objective = to_expression(&model.objective, &vars);

            let mut lp = problem
                .maximise(objective)
                .using(good_lp::highs)
                .set_verbose(false)
                .with_time_limit(time_limit.as_secs_f64());
            for constraint in &model.constraints {
                lp.add_constraint(to_expression(&constraint.expr, &vars).leq(constraint.rhs));
            }

            let solution = lp.solve().map_err(map_resolution_error)?;
            let status = match solution.status() {
                SolutionStatus::Optimal => SolveStatus::Optimal,
                _ => SolveStatus::Feasible,
            };
            let values: Vec<f64> = vars.iter().map(|&var| solution.value(var)).collect();
            let objective_value = model.objective.evaluate(&values);
            Ok(RawSolution {
                status,
                values,
                objective_value,
            })
        }
    }
}

#[cfg(feature = "highs")]
pub use highs::HighsSolver;

// =========================================================================
// Engine selection
// =========================================================================

/// Solver engines known by name in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SolverEngine {
    #[default]
    MicroLp,
    Highs,
}

impl SolverEngine {
    pub fn name(self) -> &'static str {
        match self {
            SolverEngine::MicroLp => "microlp",
            SolverEngine::Highs => "highs",
        }
    }

    /// Instantiate the engine, if this build includes it.
    pub fn solver(self) -> Result<Arc<dyn MilpSolver>, SolverError> {
        match self {
            SolverEngine::MicroLp => Ok(Arc::new(MicroLpSolver)),
            #[cfg(feature = "highs")]
            SolverEngine::Highs => Ok(Arc::new(HighsSolver)),
            #[cfg(not(feature = "highs"))]
            SolverEngine::Highs => Err(SolverError::Unavailable {
                engine: self.name().to_string(),
            }),
        }
    }
}

impl fmt::Display for SolverEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SolverEngine {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "microlp" => Ok(SolverEngine::MicroLp),
            "highs" => Ok(SolverEngine::Highs),
            _ => Err(ConfigError::UnknownSolver(s.to_string())),
        }
    }
}

impl TryFrom<String> for SolverEngine {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SolverEngine> for String {
    fn from(engine: SolverEngine) -> Self {
        engine.name().to_string()
    }
}
