//! Interpreting script stdout.
//!
//! Solver output is parsed strictly: anything but a JSON object with `routes`
//! is an error. Visualizer output is parsed leniently and degrades to a
//! fallback result when it is not JSON.

use aquaroute_core::{DispatchError, SolveResult, Stage, VisualizationResult};
use camino::Utf8Path;
use serde_json::Value;

pub(crate) fn parse_solve_output(stdout: &str) -> Result<SolveResult, DispatchError> {
    serde_json::from_str(stdout).map_err(|source| {
        reported_error(stdout).unwrap_or_else(|| DispatchError::MalformedOutput {
            stage: Stage::Solve,
            source,
            stdout: stdout.to_owned(),
        })
    })
}

/// An `{"error": "..."}` answer from a solver that found no solution.
fn reported_error(stdout: &str) -> Option<DispatchError> {
    let value: Value = serde_json::from_str(stdout).ok()?;
    let message = value.get("error")?.as_str()?;
    Some(DispatchError::SolverReported {
        message: message.to_owned(),
    })
}

pub(crate) fn parse_visualization_output(stdout: &str, image_path: &Utf8Path) -> VisualizationResult {
    serde_json::from_str::<Value>(stdout).map_or_else(
        |_| VisualizationResult::fallback(stdout.trim(), image_path.as_str()),
        VisualizationResult::Reported,
    )
}
