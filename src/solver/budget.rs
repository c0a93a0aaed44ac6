// src/solver/budget.rs

use crate::error::SolverError;
use crate::solver::cancel::CancelToken;
use crate::solver::model::MilpModel;
use crate::solver::traits::{MilpSolver, RawSolution, SolveStatus};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Extra wall clock granted to engines that stop themselves at the limit.
const GRACE_PERIOD: Duration = Duration::from_secs(2);

/// Raises the worker's token on every exit path of the waiting caller.
struct StopWorker(CancelToken);

impl Drop for StopWorker {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

/// Run `solver` on a worker thread, giving up on cancel or after `limit`.
///
/// A model without variables is answered directly. When the caller stops
/// waiting, the worker's own token is raised so a cooperative engine winds
/// down; its late result is dropped.
pub fn solve_with_budget(
    solver: Arc<dyn MilpSolver>,
    model: Arc<MilpModel>,
    limit: Duration,
    cancel: &CancelToken,
) -> Result<RawSolution, SolverError> {
    if model.num_variables() == 0 {
        return Ok(RawSolution {
            status: SolveStatus::Optimal,
            values: Vec::new(),
            objective_value: model.objective.constant,
        });
    }
    if cancel.is_cancelled() {
        return Err(SolverError::Cancelled);
    }

    let (tx, rx) = mpsc::channel();
    let worker_solver = Arc::clone(&solver);
    let worker_model = Arc::clone(&model);
    let stop = StopWorker(CancelToken::new());
    let worker_cancel = stop.0.clone();
    thread::Builder::new()
        .name(format!("milp-{}", solver.name()))
        .spawn(move || {
            let result = worker_solver.solve(&worker_model, limit, &worker_cancel);
            // The receiver is gone if the caller already gave up.
            let _ = tx.send(result);
        })
        .map_err(|e| SolverError::Backend(format!("failed to spawn solver thread: {e}")))?;

    let started = Instant::now();
    let deadline = if solver.honors_time_limit() {
        limit + GRACE_PERIOD
    } else {
        limit
    };

    loop {
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(result) => {
                debug!(
                    engine = solver.name(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "solver returned"
                );
                return result;
            }
            Err(RecvTimeoutError::Disconnected) => {
                return Err(SolverError::Backend(format!(
                    "{} solver thread exited without a result",
                    solver.name()
                )));
            }
            Err(RecvTimeoutError::Timeout) => {
                if cancel.is_cancelled() {
                    warn!(engine = solver.name(), "solve cancelled");
                    return Err(SolverError::Cancelled);
                }
                if started.elapsed() >= deadline {
                    warn!(
                        engine = solver.name(),
                        limit_secs = limit.as_secs_f64(),
                        "solve exceeded its time limit"
                    );
                    return Err(SolverError::TimedOut { limit });
                }
            }
        }
    }
}
