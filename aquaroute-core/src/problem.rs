//! Input payloads handed to the external solver and visualizer.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::{CourierRestrictions, Courier, Depot, Order, Route};

/// A routing problem: couriers, orders, eligibility and a shared depot.
///
/// Serialises with the exact keys the solver reads: `couriers`, `orders`,
/// `courier_restrictions` and `common_depot`. When decoding, missing
/// or `null` restrictions mean "unrestricted" and a missing or `null` depot
/// falls back to [`Depot::default`].
///
/// # Examples
///
/// ```
/// use aquaroute_core::{Courier, CourierRestrictions, Order, SolveProblem};
///
/// let problem = SolveProblem::new(
///     vec![Courier::new("c1", 43.2, 76.9), Courier::new("c2", 43.22, 76.85)],
///     vec![Order::new("o1", 43.21, 76.84)],
/// )
/// .with_restrictions(CourierRestrictions::new().restrict("o1", [1]));
///
/// assert!(problem.validate().is_ok());
/// assert_eq!(problem.common_depot.id, "depot");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveProblem {
    /// Available couriers; restriction indices refer to positions here.
    pub couriers: Vec<Courier>,
    /// Orders awaiting assignment.
    pub orders: Vec<Order>,
    /// Per-order courier eligibility.
    #[serde(default, deserialize_with = "null_as_default")]
    pub courier_restrictions: CourierRestrictions,
    /// Start and end point for every route.
    #[serde(default, deserialize_with = "null_as_default")]
    pub common_depot: Depot,
}

/// Errors returned by [`SolveProblem::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProblemError {
    /// The request contained no couriers.
    #[error("at least one courier is required")]
    NoCouriers,
    /// Two couriers share an id.
    #[error("courier id {id:?} appears more than once")]
    DuplicateCourier {
        /// The repeated id.
        id: String,
    },
    /// Two orders share an id.
    #[error("order id {id:?} appears more than once")]
    DuplicateOrder {
        /// The repeated id.
        id: String,
    },
}

impl SolveProblem {
    /// Create an unrestricted problem using the default depot.
    #[must_use]
    pub fn new(couriers: Vec<Courier>, orders: Vec<Order>) -> Self {
        Self {
            couriers,
            orders,
            courier_restrictions: CourierRestrictions::new(),
            common_depot: Depot::default(),
        }
    }

    /// Replace the courier restrictions.
    #[must_use]
    pub fn with_restrictions(mut self, restrictions: CourierRestrictions) -> Self {
        self.courier_restrictions = restrictions;
        self
    }

    /// Replace the depot.
    #[must_use]
    pub fn with_depot(mut self, depot: Depot) -> Self {
        self.common_depot = depot;
        self
    }

    /// Check the caller-side preconditions.
    ///
    /// Couriers must be non-empty and ids unique. Orders may be empty.
    /// Restriction indices are deliberately left to the solver.
    ///
    /// # Errors
    ///
    /// Returns the first [`ProblemError`] encountered.
    pub fn validate(&self) -> Result<(), ProblemError> {
        if self.couriers.is_empty() {
            return Err(ProblemError::NoCouriers);
        }
        if let Some(id) = first_duplicate(self.couriers.iter().map(|c| c.id.as_str())) {
            return Err(ProblemError::DuplicateCourier { id: id.to_owned() });
        }
        if let Some(id) = first_duplicate(self.orders.iter().map(|o| o.id.as_str())) {
            return Err(ProblemError::DuplicateOrder { id: id.to_owned() });
        }
        Ok(())
    }

    /// Position of the courier with `id` in [`Self::couriers`].
    #[must_use]
    pub fn courier_index(&self, id: &str) -> Option<usize> {
        self.couriers.iter().position(|courier| courier.id == id)
    }

    /// Build the visualizer payload for `routes`, reusing this problem's
    /// couriers, orders and depot.
    #[must_use]
    pub fn visualization_request(&self, routes: Vec<Route>) -> VisualizeProblem {
        VisualizeProblem {
            couriers: self.couriers.clone(),
            orders: self.orders.clone(),
            routes,
            common_depot: self.common_depot.clone(),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn first_duplicate<'a>(mut ids: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut seen = HashSet::new();
    ids.find(|id| !seen.insert(*id))
}

/// Payload for the route visualizer.
///
/// Keys on the wire: `couriers`, `orders`, `routes` and `common_depot`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizeProblem {
    /// Couriers whose start positions are drawn.
    pub couriers: Vec<Courier>,
    /// Orders drawn as served or unserved.
    pub orders: Vec<Order>,
    /// Routes to draw, usually straight from a solve.
    pub routes: Vec<Route>,
    /// Depot drawn as the shared end point.
    #[serde(default, deserialize_with = "null_as_default")]
    pub common_depot: Depot,
}
