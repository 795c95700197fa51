//! Test doubles for the solver and visualizer ports.
//!
//! These run entirely in memory and record what they were asked to do, so
//! behaviour tests can assert on sequencing without spawning processes.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::{
    Courier, CourierRestrictions, DispatchError, Order, ProcessExit, Route, RouteSolver,
    RouteVisualizer, SolveProblem, SolveResult, Stage, VisualizationResult, VisualizeProblem,
};

/// Image path reported by [`RecordingVisualizer::printing`].
pub const STUB_IMAGE_PATH: &str = "vrp_routes_visualization.png";

#[derive(Debug, Clone)]
enum StubOutcome<T> {
    Succeed(T),
    Fail { exit: ProcessExit, stderr: String },
}

impl<T: Clone> StubOutcome<T> {
    fn produce(&self, stage: Stage) -> Result<T, DispatchError> {
        match self {
            Self::Succeed(value) => Ok(value.clone()),
            Self::Fail { exit, stderr } => Err(DispatchError::NonZeroExit {
                stage,
                exit: *exit,
                stderr: stderr.clone(),
            }),
        }
    }
}

/// Solver returning a fixed answer and recording each request.
#[derive(Debug)]
pub struct StubSolver {
    outcome: StubOutcome<SolveResult>,
    problems: Mutex<Vec<SolveProblem>>,
}

impl StubSolver {
    /// Always succeed with `result`.
    #[must_use]
    pub const fn returning(result: SolveResult) -> Self {
        Self {
            outcome: StubOutcome::Succeed(result),
            problems: Mutex::new(Vec::new()),
        }
    }

    /// Always fail as if the process exited with `exit` and wrote `stderr`.
    #[must_use]
    pub fn failing(exit: ProcessExit, stderr: impl Into<String>) -> Self {
        Self {
            outcome: StubOutcome::Fail {
                exit,
                stderr: stderr.into(),
            },
            problems: Mutex::new(Vec::new()),
        }
    }

    /// Number of solve calls received.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.problems().len()
    }

    /// Problems received, in call order.
    #[must_use]
    pub fn problems(&self) -> Vec<SolveProblem> {
        self.problems
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl RouteSolver for StubSolver {
    async fn solve(&self, problem: &SolveProblem) -> Result<SolveResult, DispatchError> {
        self.problems
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(problem.clone());
        self.outcome.produce(Stage::Solve)
    }
}

/// Visualizer returning a fixed answer and recording each request.
#[derive(Debug)]
pub struct RecordingVisualizer {
    outcome: StubOutcome<VisualizationResult>,
    calls: Mutex<Vec<VisualizeProblem>>,
}

impl RecordingVisualizer {
    /// Behave like a visualizer that printed `message` as free text.
    #[must_use]
    pub fn printing(message: impl Into<String>) -> Self {
        Self::returning(VisualizationResult::fallback(message, STUB_IMAGE_PATH))
    }

    /// Always succeed with `result`.
    #[must_use]
    pub const fn returning(result: VisualizationResult) -> Self {
        Self {
            outcome: StubOutcome::Succeed(result),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always fail as if the process exited with `exit` and wrote `stderr`.
    #[must_use]
    pub fn failing(exit: ProcessExit, stderr: impl Into<String>) -> Self {
        Self {
            outcome: StubOutcome::Fail {
                exit,
                stderr: stderr.into(),
            },
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Requests received, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<VisualizeProblem> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl RouteVisualizer for RecordingVisualizer {
    async fn visualize(
        &self,
        problem: &VisualizeProblem,
    ) -> Result<VisualizationResult, DispatchError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(problem.clone());
        self.outcome.produce(Stage::Visualize)
    }
}

/// In-memory solver that honours courier restrictions.
///
/// Each order goes to the eligible courier whose last stop is closest, using
/// squared degree distance. It makes no attempt at optimality; it exists so
/// tests can exercise realistic, restriction-respecting answers.
#[derive(Debug, Default)]
pub struct GreedySolver {
    calls: AtomicUsize,
}

impl GreedySolver {
    /// Number of solve calls received.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "nearest-stop selection compares planar distances"
)]
fn squared_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dlat = a.0 - b.0;
    let dlon = a.1 - b.1;
    dlat * dlat + dlon * dlon
}

#[async_trait]
impl RouteSolver for GreedySolver {
    async fn solve(&self, problem: &SolveProblem) -> Result<SolveResult, DispatchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        problem.validate()?;

        let mut tails: Vec<(f64, f64)> = problem.couriers.iter().map(|c| (c.lat, c.lon)).collect();
        let mut assigned: Vec<Vec<String>> = vec![Vec::new(); problem.couriers.len()];

        for order in &problem.orders {
            let target = (order.lat, order.lon);
            let chosen = tails
                .iter()
                .enumerate()
                .filter(|(idx, _)| problem.courier_restrictions.allows(&order.id, *idx))
                .min_by(|(_, a), (_, b)| {
                    squared_distance(**a, target).total_cmp(&squared_distance(**b, target))
                })
                .map(|(idx, _)| idx)
                .ok_or_else(|| DispatchError::SolverReported {
                    message: format!("order {} has no eligible courier", order.id),
                })?;
            if let (Some(tail), Some(stops)) = (tails.get_mut(chosen), assigned.get_mut(chosen)) {
                *tail = target;
                stops.push(order.id.clone());
            }
        }

        let routes = problem
            .couriers
            .iter()
            .zip(assigned)
            .filter(|(_, stops)| !stops.is_empty())
            .map(|(courier, stops)| Route::new(courier.id.clone(), stops))
            .collect();
        Ok(SolveResult::new(routes))
    }
}

/// Three couriers and ten orders around Almaty, with `order1` and `order2`
/// limited to couriers 1 and 2 and `order7` limited to courier 2.
#[must_use]
pub fn sample_problem() -> SolveProblem {
    let couriers = vec![
        Courier::new("courier1", 43.207262, 76.893349),
        Courier::new("courier2", 43.22, 76.85),
        Courier::new("courier3", 43.28, 76.95),
    ];
    let orders = vec![
        Order::new("order1", 43.212409, 76.842149),
        Order::new("order2", 43.249392, 76.887507),
        Order::new("order3", 43.245447, 76.903766),
        Order::new("order4", 43.230026, 76.94556),
        Order::new("order5", 43.228736, 76.839826),
        Order::new("order6", 43.292268, 76.931119),
        Order::new("order7", 43.261362, 76.929122),
        Order::new("order8", 43.236701, 76.845539),
        Order::new("order9", 43.257476, 76.905942),
        Order::new("order10", 43.236031, 76.837653),
    ];
    let restrictions = CourierRestrictions::new()
        .restrict("order1", [1, 2])
        .restrict("order2", [1, 2])
        .restrict("order7", [2]);
    SolveProblem::new(couriers, orders).with_restrictions(restrictions)
}
