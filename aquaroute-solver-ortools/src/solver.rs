//! [`RouteSolver`] backed by an external solver script.

use aquaroute_core::{DispatchError, RouteSolver, SolveProblem, SolveResult, Stage};
use async_trait::async_trait;
use log::debug;

use crate::OrtoolsConfig;
use crate::parse::parse_solve_output;
use crate::runner::{Invocation, run_script};

/// Prefix of staged solver inputs.
pub const SOLVER_INPUT_PREFIX: &str = "vrp_input_";

/// Runs `<interpreter> <solver_script> <input>` and parses its JSON answer.
///
/// A problem without orders resolves to empty routes without spawning.
///
/// Each call stages its own input, so one instance can serve concurrent
/// requests.
#[derive(Debug, Clone)]
pub struct ProcessSolver {
    config: OrtoolsConfig,
}

impl ProcessSolver {
    /// Create a solver using `config`.
    #[must_use]
    pub const fn new(config: OrtoolsConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &OrtoolsConfig {
        &self.config
    }
}

#[async_trait]
impl RouteSolver for ProcessSolver {
    async fn solve(&self, problem: &SolveProblem) -> Result<SolveResult, DispatchError> {
        problem.validate()?;
        if problem.orders.is_empty() {
            debug!("no orders to assign; skipping the solver process");
            return Ok(SolveResult::new(Vec::new()));
        }
        let payload = serde_json::to_vec_pretty(problem).map_err(|source| {
            DispatchError::Serialise {
                stage: Stage::Solve,
                source,
            }
        })?;
        let invocation = Invocation {
            stage: Stage::Solve,
            prefix: SOLVER_INPUT_PREFIX,
        };
        let stdout = run_script(&self.config, &invocation, &payload).await?;
        parse_solve_output(&stdout)
    }
}
