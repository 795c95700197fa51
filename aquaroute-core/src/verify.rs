//! Cross-check a solver answer against the request it was computed for.
//!
//! The external solver is a black box. This module confirms that an answer
//! covers every order exactly once, names only known couriers and orders,
//! and respects courier restrictions. It also measures each route with the
//! haversine formula.

use std::collections::{HashMap, HashSet};

use geo::{Haversine, Length, LineString};
use serde::Serialize;
use thiserror::Error;

use crate::{Order, SolveProblem, SolveResult};

/// A way in which a [`SolveResult`] contradicts its [`SolveProblem`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssignmentViolation {
    /// A route names a courier that was not in the request.
    #[error("route references unknown courier {courier_id:?}")]
    UnknownCourier {
        /// Courier id from the route.
        courier_id: String,
    },
    /// A route names an order that was not in the request.
    #[error("route for courier {courier_id:?} references unknown order {order_id:?}")]
    UnknownOrder {
        /// Courier whose route carries the order.
        courier_id: String,
        /// Unrecognised order id.
        order_id: String,
    },
    /// An order appears in more than one stop.
    #[error("order {order_id:?} is assigned more than once")]
    DuplicateAssignment {
        /// Repeated order id.
        order_id: String,
    },
    /// An order is not on any route.
    #[error("order {order_id:?} is not served by any route")]
    UnservedOrder {
        /// Missing order id.
        order_id: String,
    },
    /// An order was given to a courier its restriction excludes.
    #[error("order {order_id:?} may not be served by courier {courier_id:?} (index {courier_index})")]
    RestrictionViolated {
        /// Restricted order id.
        order_id: String,
        /// Courier that received it.
        courier_id: String,
        /// That courier's position in the request.
        courier_index: usize,
    },
}

/// Distance summary for one verified route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteReport {
    /// Courier driving the route.
    pub courier_id: String,
    /// Number of orders served.
    pub orders: usize,
    /// Haversine length of courier start, each stop, then the depot.
    pub distance_meters: f64,
}

/// Summary produced by [`verify_solution`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolutionReport {
    /// Per-route summaries, in result order.
    pub routes: Vec<RouteReport>,
    /// Sum of all route distances.
    pub total_distance_meters: f64,
}

/// Check that `result` is a complete, restriction-respecting assignment for
/// `problem`.
///
/// # Errors
///
/// Returns the first [`AssignmentViolation`] found, checking routes in order
/// and then looking for unserved orders.
///
/// # Examples
///
/// ```
/// use aquaroute_core::{Courier, Order, Route, SolveProblem, SolveResult, verify_solution};
///
/// let problem = SolveProblem::new(
///     vec![Courier::new("c1", 43.2, 76.9)],
///     vec![Order::new("o1", 43.21, 76.91)],
/// );
/// let result = SolveResult::new(vec![Route::new("c1", ["o1"])]);
/// let report = verify_solution(&problem, &result).unwrap();
/// assert_eq!(report.routes.len(), 1);
/// assert!(report.total_distance_meters > 0.0);
/// ```
pub fn verify_solution(
    problem: &SolveProblem,
    result: &SolveResult,
) -> Result<SolutionReport, AssignmentViolation> {
    let orders: HashMap<&str, &Order> = problem
        .orders
        .iter()
        .map(|order| (order.id.as_str(), order))
        .collect();
    let mut served: HashSet<&str> = HashSet::with_capacity(orders.len());
    let mut routes = Vec::with_capacity(result.routes.len());

    for route in &result.routes {
        let (courier_index, courier) = problem
            .couriers
            .iter()
            .enumerate()
            .find(|(_, courier)| courier.id == route.courier_id)
            .ok_or_else(|| AssignmentViolation::UnknownCourier {
                courier_id: route.courier_id.clone(),
            })?;

        let mut path = Vec::with_capacity(route.orders.len() + 2);
        path.push(courier.coord());
        for order_id in &route.orders {
            let order = orders.get(order_id.as_str()).ok_or_else(|| {
                AssignmentViolation::UnknownOrder {
                    courier_id: route.courier_id.clone(),
                    order_id: order_id.clone(),
                }
            })?;
            if !served.insert(order.id.as_str()) {
                return Err(AssignmentViolation::DuplicateAssignment {
                    order_id: order_id.clone(),
                });
            }
            if !problem.courier_restrictions.allows(order_id, courier_index) {
                return Err(AssignmentViolation::RestrictionViolated {
                    order_id: order_id.clone(),
                    courier_id: route.courier_id.clone(),
                    courier_index,
                });
            }
            path.push(order.coord());
        }
        path.push(problem.common_depot.coord());

        routes.push(RouteReport {
            courier_id: route.courier_id.clone(),
            orders: route.orders.len(),
            distance_meters: Haversine.length(&LineString::from(path)),
        });
    }

    if let Some(order) = problem
        .orders
        .iter()
        .find(|order| !served.contains(order.id.as_str()))
    {
        return Err(AssignmentViolation::UnservedOrder {
            order_id: order.id.clone(),
        });
    }

    let total_distance_meters = routes.iter().map(|route| route.distance_meters).sum();
    Ok(SolutionReport {
        routes,
        total_distance_meters,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_problem;
    use crate::{Courier, CourierRestrictions, Depot, Route};
    use rstest::{fixture, rstest};

    #[fixture]
    fn problem() -> SolveProblem {
        SolveProblem::new(
            vec![
                Courier::new("c1", 43.20, 76.89),
                Courier::new("c2", 43.22, 76.85),
            ],
            vec![
                Order::new("o1", 43.21, 76.84),
                Order::new("o2", 43.25, 76.88),
            ],
        )
        .with_restrictions(CourierRestrictions::new().restrict("o1", [1]))
    }

    #[rstest]
    fn accepts_complete_assignment(problem: SolveProblem) {
        let result = SolveResult::new(vec![
            Route::new("c2", ["o1"]),
            Route::new("c1", ["o2"]),
        ]);
        let report = verify_solution(&problem, &result).expect("valid assignment");
        assert_eq!(report.routes.len(), 2);
        let sum: f64 = report.routes.iter().map(|r| r.distance_meters).sum();
        assert_eq!(report.total_distance_meters, sum);
    }

    #[rstest]
    #[case::unknown_courier(
        vec![Route::new("c9", ["o1", "o2"])],
        AssignmentViolation::UnknownCourier { courier_id: "c9".into() }
    )]
    #[case::unknown_order(
        vec![Route::new("c2", ["o1", "o2", "o3"])],
        AssignmentViolation::UnknownOrder { courier_id: "c2".into(), order_id: "o3".into() }
    )]
    #[case::duplicate(
        vec![Route::new("c2", ["o1", "o2"]), Route::new("c1", ["o2"])],
        AssignmentViolation::DuplicateAssignment { order_id: "o2".into() }
    )]
    #[case::unserved(
        vec![Route::new("c2", ["o1"])],
        AssignmentViolation::UnservedOrder { order_id: "o2".into() }
    )]
    #[case::restricted(
        vec![Route::new("c1", ["o1", "o2"])],
        AssignmentViolation::RestrictionViolated {
            order_id: "o1".into(),
            courier_id: "c1".into(),
            courier_index: 0,
        }
    )]
    fn reports_violations(
        problem: SolveProblem,
        #[case] routes: Vec<Route>,
        #[case] expected: AssignmentViolation,
    ) {
        let result = SolveResult::new(routes);
        assert_eq!(verify_solution(&problem, &result), Err(expected));
    }

    #[rstest]
    fn route_distance_includes_return_to_depot() {
        let depot = Depot::new("hub", 0.0, 1.0);
        let problem = SolveProblem::new(
            vec![Courier::new("c1", 0.0, 0.0)],
            vec![Order::new("o1", 0.0, 0.5)],
        )
        .with_depot(depot);
        let result = SolveResult::new(vec![Route::new("c1", ["o1"])]);

        let report = verify_solution(&problem, &result).expect("valid assignment");
        let distance = report.routes.first().expect("one route").distance_meters;
        // One degree of longitude at the equator is roughly 111 km.
        assert!((110_000.0..112_500.0).contains(&distance), "{distance}");
    }

    #[rstest]
    fn empty_problem_verifies_trivially() {
        let problem = SolveProblem::new(vec![Courier::new("c1", 43.2, 76.9)], Vec::new());
        let report =
            verify_solution(&problem, &SolveResult::new(Vec::new())).expect("nothing to serve");
        assert!(report.routes.is_empty());
        assert_eq!(report.total_distance_meters, 0.0);
    }

    #[rstest]
    fn sample_problem_rejects_restricted_courier() {
        let problem = sample_problem();
        let mut orders: Vec<&str> = problem.orders.iter().map(|o| o.id.as_str()).collect();
        orders.retain(|id| *id != "order7");
        let result = SolveResult::new(vec![
            Route::new("courier2", orders),
            Route::new("courier1", ["order7"]),
        ]);
        assert!(matches!(
            verify_solution(&problem, &result),
            Err(AssignmentViolation::RestrictionViolated { courier_index: 0, .. })
        ));
    }
}
