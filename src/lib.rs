//! Facade crate for the Aquaroute dispatch helper.
//!
//! This crate re-exports the core domain types and exposes the process-backed
//! solver and visualizer behind a feature flag.

#![forbid(unsafe_code)]

pub use aquaroute_core::{
    AssignmentViolation, Courier, CourierRestrictions, Depot, DispatchError, DispatchOutcome,
    Dispatcher, Order, ProblemError, ProcessExit, Route, RouteSolver, RouteVisualizer, SolveProblem,
    SolveResult, SolutionReport, Stage, VisualizationResult, VisualizeProblem, verify_solution,
};

#[cfg(feature = "solver-ortools")]
pub use aquaroute_solver_ortools::{
    InputHandoff, OrtoolsConfig, OrtoolsDispatcher, ProcessSolver, ProcessVisualizer,
    solve_and_visualize, solve_vrp, visualize_routes,
};
