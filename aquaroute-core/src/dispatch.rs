//! Solver and visualizer ports plus the facade that sequences them.

use async_trait::async_trait;
use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    DispatchError, SolveProblem, SolveResult, Stage, VisualizationResult, VisualizeProblem,
};

/// Assign orders to couriers and order each courier's stops.
///
/// Implementations may run an external process or an in-process library;
/// callers only see the JSON contract. Implementations must be `Send + Sync`
/// so a single instance can serve concurrent requests.
#[async_trait]
pub trait RouteSolver: Send + Sync {
    /// Solve `problem`, producing one route per used courier.
    async fn solve(&self, problem: &SolveProblem) -> Result<SolveResult, DispatchError>;
}

/// Render computed routes, typically onto a map image.
#[async_trait]
pub trait RouteVisualizer: Send + Sync {
    /// Render `problem.routes`.
    async fn visualize(
        &self,
        problem: &VisualizeProblem,
    ) -> Result<VisualizationResult, DispatchError>;
}

#[async_trait]
impl<T: RouteSolver + ?Sized> RouteSolver for Box<T> {
    async fn solve(&self, problem: &SolveProblem) -> Result<SolveResult, DispatchError> {
        (**self).solve(problem).await
    }
}

#[async_trait]
impl<T: RouteVisualizer + ?Sized> RouteVisualizer for Box<T> {
    async fn visualize(
        &self,
        problem: &VisualizeProblem,
    ) -> Result<VisualizationResult, DispatchError> {
        (**self).visualize(problem).await
    }
}

/// Combined result of [`Dispatcher::solve_and_visualize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    /// Full solver output.
    pub vrp_result: SolveResult,
    /// Visualizer output for `vrp_result.routes`.
    pub visualization: VisualizationResult,
}

/// Runs a solver and a visualizer as one logical operation.
///
/// Visualization always runs strictly after a successful solve and receives
/// only the solved routes. A failure in either step fails the whole call;
/// nothing is retried.
#[derive(Debug, Clone)]
pub struct Dispatcher<S, V> {
    solver: S,
    visualizer: V,
}

impl<S, V> Dispatcher<S, V>
where
    S: RouteSolver,
    V: RouteVisualizer,
{
    /// Pair a solver with a visualizer.
    pub const fn new(solver: S, visualizer: V) -> Self {
        Self { solver, visualizer }
    }

    /// The configured solver.
    pub const fn solver(&self) -> &S {
        &self.solver
    }

    /// The configured visualizer.
    pub const fn visualizer(&self) -> &V {
        &self.visualizer
    }

    /// Solve `problem` without rendering.
    ///
    /// # Errors
    ///
    /// Propagates the solver's [`DispatchError`] unchanged.
    pub async fn solve(&self, problem: &SolveProblem) -> Result<SolveResult, DispatchError> {
        self.solver.solve(problem).await
    }

    /// Render pre-computed routes.
    ///
    /// # Errors
    ///
    /// Propagates the visualizer's [`DispatchError`] unchanged.
    pub async fn visualize(
        &self,
        problem: &VisualizeProblem,
    ) -> Result<VisualizationResult, DispatchError> {
        self.visualizer.visualize(problem).await
    }

    /// Solve `problem`, then render the resulting routes.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Pipeline`] naming the failed step. When the
    /// solve fails the visualizer is never invoked.
    pub async fn solve_and_visualize(
        &self,
        problem: &SolveProblem,
    ) -> Result<DispatchOutcome, DispatchError> {
        info!(
            "solving routes for {} couriers and {} orders",
            problem.couriers.len(),
            problem.orders.len()
        );
        let vrp_result = self
            .solver
            .solve(problem)
            .await
            .map_err(|source| DispatchError::pipeline(Stage::Solve, source))?;

        info!("rendering {} routes", vrp_result.routes.len());
        let request = problem.visualization_request(vrp_result.routes.clone());
        let visualization = self
            .visualizer
            .visualize(&request)
            .await
            .map_err(|source| DispatchError::pipeline(Stage::Visualize, source))?;

        Ok(DispatchOutcome {
            vrp_result,
            visualization,
        })
    }
}
