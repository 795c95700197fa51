//! Process-backed solver and visualizer for the OR-Tools Python scripts.
//!
//! [`ProcessSolver`] and [`ProcessVisualizer`] implement the core ports by
//! running a script per call. The payload is handed over through a uniquely
//! named temp file (or stdin, see [`InputHandoff`]) and the answer is read
//! from stdout. Children are killed when a configured timeout elapses or the
//! calling future is dropped.
//!
//! ```no_run
//! use aquaroute_core::{Courier, Order, SolveProblem};
//! use aquaroute_solver_ortools::{OrtoolsConfig, solve_and_visualize};
//!
//! # async fn run() -> Result<(), aquaroute_core::DispatchError> {
//! let config = OrtoolsConfig::new("/srv/vrp");
//! let problem = SolveProblem::new(
//!     vec![Courier::new("courier1", 43.207, 76.893)],
//!     vec![Order::new("order1", 43.212, 76.842)],
//! );
//! let outcome = solve_and_visualize(&config, &problem).await?;
//! println!("{} routes", outcome.vrp_result.routes.len());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

mod config;
mod parse;
mod runner;
mod solver;
mod visualizer;

pub use config::{
    ConfigError, DEFAULT_IMAGE_FILE, DEFAULT_INTERPRETER, DEFAULT_SOLVER_SCRIPT,
    DEFAULT_VISUALIZER_SCRIPT, InputHandoff, OrtoolsConfig,
};
pub use solver::{ProcessSolver, SOLVER_INPUT_PREFIX};
pub use visualizer::{ProcessVisualizer, VISUALIZER_INPUT_PREFIX};

use aquaroute_core::{
    DispatchError, DispatchOutcome, Dispatcher, RouteSolver, RouteVisualizer, SolveProblem,
    SolveResult, VisualizationResult, VisualizeProblem,
};

/// Dispatcher wired to the Python scripts.
pub type OrtoolsDispatcher = Dispatcher<ProcessSolver, ProcessVisualizer>;

/// Build a dispatcher whose solver and visualizer share `config`.
#[must_use]
pub fn dispatcher(config: OrtoolsConfig) -> OrtoolsDispatcher {
    Dispatcher::new(ProcessSolver::new(config.clone()), ProcessVisualizer::new(config))
}

/// Run the solver script once.
///
/// # Errors
///
/// See [`ProcessSolver`].
pub async fn solve_vrp(
    config: &OrtoolsConfig,
    problem: &SolveProblem,
) -> Result<SolveResult, DispatchError> {
    ProcessSolver::new(config.clone()).solve(problem).await
}

/// Run the visualizer script once.
///
/// # Errors
///
/// See [`ProcessVisualizer`].
pub async fn visualize_routes(
    config: &OrtoolsConfig,
    problem: &VisualizeProblem,
) -> Result<VisualizationResult, DispatchError> {
    ProcessVisualizer::new(config.clone())
        .visualize(problem)
        .await
}

/// Solve, then render the solved routes.
///
/// # Errors
///
/// Returns [`DispatchError::Pipeline`] naming the step that failed.
pub async fn solve_and_visualize(
    config: &OrtoolsConfig,
    problem: &SolveProblem,
) -> Result<DispatchOutcome, DispatchError> {
    dispatcher(config.clone())
        .solve_and_visualize(problem)
        .await
}
