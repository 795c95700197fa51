//! Core domain types for the Aquaroute dispatch helper.
//!
//! A dispatch request pairs couriers with delivery orders, optionally narrows
//! which couriers may serve each order, and names a shared depot. Solving and
//! rendering happen behind the [`RouteSolver`] and [`RouteVisualizer`] ports;
//! [`Dispatcher`] sequences them into a single all-or-nothing operation.
//!
//! The JSON shapes in this crate are the wire contract with the external
//! solver and visualizer processes, so field names are fixed snake_case.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod dispatch;
mod error;
mod problem;
mod restriction;
mod site;
mod solution;
mod verify;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use dispatch::{DispatchOutcome, Dispatcher, RouteSolver, RouteVisualizer};
pub use error::{DispatchError, ProcessExit, Stage};
pub use problem::{ProblemError, SolveProblem, VisualizeProblem};
pub use restriction::CourierRestrictions;
pub use site::{Courier, DEFAULT_DEPOT_ID, DEFAULT_DEPOT_LAT, DEFAULT_DEPOT_LON, Depot, Order};
pub use solution::{Route, SolveResult, VisualizationResult};
pub use verify::{AssignmentViolation, RouteReport, SolutionReport, verify_solution};
