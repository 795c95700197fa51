//! Per-order courier eligibility.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Maps order ids to the couriers allowed to serve them.
///
/// Indices are 0-based positions into the request's courier list. Orders
/// absent from the map may be served by any courier; an order mapped to an
/// empty list may be served by none. Indices are not range-checked here, the
/// solver owns that decision.
///
/// Serialises as a plain JSON object, e.g. `{"order1": [1, 2]}`.
///
/// # Examples
///
/// ```
/// use aquaroute_core::CourierRestrictions;
///
/// let restrictions = CourierRestrictions::new().restrict("order7", [2]);
/// assert!(restrictions.allows("order7", 2));
/// assert!(!restrictions.allows("order7", 0));
/// assert!(restrictions.allows("order3", 0));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourierRestrictions(BTreeMap<String, Vec<usize>>);

impl CourierRestrictions {
    /// Create an empty, unrestricted mapping.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Limit `order_id` to the given courier indices, replacing any earlier
    /// entry for the same order.
    #[must_use]
    pub fn restrict(
        mut self,
        order_id: impl Into<String>,
        couriers: impl IntoIterator<Item = usize>,
    ) -> Self {
        self.0
            .insert(order_id.into(), couriers.into_iter().collect());
        self
    }

    /// Eligible courier indices for `order_id`, or `None` when unrestricted.
    #[must_use]
    pub fn allowed(&self, order_id: &str) -> Option<&[usize]> {
        self.0.get(order_id).map(Vec::as_slice)
    }

    /// Whether the courier at `courier_index` may serve `order_id`.
    #[must_use]
    pub fn allows(&self, order_id: &str, courier_index: usize) -> bool {
        self.allowed(order_id)
            .is_none_or(|allowed| allowed.contains(&courier_index))
    }

    /// Whether no order carries a restriction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of restricted orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over `(order_id, allowed_indices)` pairs in order-id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[usize])> {
        self.0
            .iter()
            .map(|(order, couriers)| (order.as_str(), couriers.as_slice()))
    }
}

impl<K, I> FromIterator<(K, I)> for CourierRestrictions
where
    K: Into<String>,
    I: IntoIterator<Item = usize>,
{
    fn from_iter<T: IntoIterator<Item = (K, I)>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Self::new(), |acc, (order, couriers)| {
                acc.restrict(order, couriers)
            })
    }
}
