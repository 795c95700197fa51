//! Builds the solver and visualizer used by a command invocation.

use aquaroute_core::{RouteSolver, RouteVisualizer, Stage};
use aquaroute_solver_ortools::{OrtoolsConfig, ProcessSolver, ProcessVisualizer};

use crate::CliError;

/// Supplies the ports a command runs against.
pub(crate) trait BackendBuilder {
    fn solver(&self, config: &OrtoolsConfig) -> Result<Box<dyn RouteSolver>, CliError>;
    fn visualizer(&self, config: &OrtoolsConfig) -> Result<Box<dyn RouteVisualizer>, CliError>;
}

/// Runs the configured Python scripts, checking they exist first.
pub(crate) struct ProcessBackend;

impl BackendBuilder for ProcessBackend {
    fn solver(&self, config: &OrtoolsConfig) -> Result<Box<dyn RouteSolver>, CliError> {
        config.validate_for(&[Stage::Solve])?;
        Ok(Box::new(ProcessSolver::new(config.clone())))
    }

    fn visualizer(&self, config: &OrtoolsConfig) -> Result<Box<dyn RouteVisualizer>, CliError> {
        config.validate_for(&[Stage::Visualize])?;
        Ok(Box::new(ProcessVisualizer::new(config.clone())))
    }
}
