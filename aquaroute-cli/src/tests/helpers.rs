//! Test helpers for writing requests and swapping in in-memory backends.

use super::*;
use crate::backend::BackendBuilder;
use aquaroute_core::test_support::{GreedySolver, RecordingVisualizer, StubSolver};
use aquaroute_core::{ProcessExit, RouteSolver, RouteVisualizer, SolveResult};
use aquaroute_solver_ortools::OrtoolsConfig;
use camino::Utf8Path;
use std::fs;

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directory");
    }
    fs::write(path, contents).expect("write file");
}

/// What the stub solver does when asked to solve.
#[derive(Debug, Clone)]
pub(super) enum SolverBehaviour {
    Greedy,
    Returning(SolveResult),
    Failing(&'static str),
}

/// Backend answering from memory instead of running scripts.
#[derive(Debug, Clone)]
pub(super) struct StubBackend {
    pub(super) solver: SolverBehaviour,
    pub(super) visualizer_message: &'static str,
}

impl Default for StubBackend {
    fn default() -> Self {
        Self {
            solver: SolverBehaviour::Greedy,
            visualizer_message: "Visualization saved",
        }
    }
}

impl BackendBuilder for StubBackend {
    fn solver(&self, _config: &OrtoolsConfig) -> Result<Box<dyn RouteSolver>, CliError> {
        Ok(match &self.solver {
            SolverBehaviour::Greedy => Box::new(GreedySolver::default()),
            SolverBehaviour::Returning(result) => Box::new(StubSolver::returning(result.clone())),
            SolverBehaviour::Failing(stderr) => {
                Box::new(StubSolver::failing(ProcessExit::Code(1), *stderr))
            }
        })
    }

    fn visualizer(&self, _config: &OrtoolsConfig) -> Result<Box<dyn RouteVisualizer>, CliError> {
        Ok(Box::new(RecordingVisualizer::printing(
            self.visualizer_message,
        )))
    }
}
