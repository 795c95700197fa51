//! Couriers, orders and the shared depot.
//!
//! All three are plain `{ id, lat, lon }` records on the wire; they stay
//! distinct types so a courier can never be passed where an order is
//! expected.

use geo::Coord;
use serde::{Deserialize, Serialize};

/// Identifier used for [`Depot::default`].
pub const DEFAULT_DEPOT_ID: &str = "depot";
/// Latitude used for [`Depot::default`].
pub const DEFAULT_DEPOT_LAT: f64 = 43.16857;
/// Longitude used for [`Depot::default`].
pub const DEFAULT_DEPOT_LON: f64 = 76.89642;

macro_rules! site {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            /// Identifier, unique within a single request.
            pub id: String,
            /// Latitude in decimal degrees.
            pub lat: f64,
            /// Longitude in decimal degrees.
            pub lon: f64,
        }

        impl $name {
            #[doc = concat!("Construct a [`", stringify!($name), "`] at the given position.")]
            #[must_use]
            pub fn new(id: impl Into<String>, lat: f64, lon: f64) -> Self {
                Self {
                    id: id.into(),
                    lat,
                    lon,
                }
            }

            /// Position as a `geo` coordinate, with `x` as longitude.
            #[must_use]
            pub const fn coord(&self) -> Coord<f64> {
                Coord {
                    x: self.lon,
                    y: self.lat,
                }
            }
        }
    };
}

site! {
    /// A vehicle and its starting position.
    ///
    /// # Examples
    ///
    /// ```
    /// use aquaroute_core::Courier;
    ///
    /// let courier = Courier::new("courier1", 43.207262, 76.893349);
    /// assert_eq!(courier.coord().x, 76.893349);
    /// ```
    Courier
}

site! {
    /// A delivery stop that must be assigned to exactly one courier.
    Order
}

site! {
    /// Common start and end point for every route.
    Depot
}

impl Default for Depot {
    fn default() -> Self {
        Self::new(DEFAULT_DEPOT_ID, DEFAULT_DEPOT_LAT, DEFAULT_DEPOT_LON)
    }
}
