//! Results produced by the external solver and visualizer.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Orders assigned to one courier, in visiting order.
///
/// Every route implicitly starts at the courier's position and ends at the
/// depot. Solver-specific metrics such as `distance_meters` are kept
/// verbatim in [`Route::metrics`] so they survive a round trip to the
/// visualizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Id of the courier driving this route.
    pub courier_id: String,
    /// Order ids in visiting order.
    pub orders: Vec<String>,
    /// Any additional fields reported by the solver.
    #[serde(flatten)]
    pub metrics: Map<String, Value>,
}

impl Route {
    /// Construct a route without metrics.
    #[must_use]
    pub fn new<I, S>(courier_id: impl Into<String>, orders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            courier_id: courier_id.into(),
            orders: orders.into_iter().map(Into::into).collect(),
            metrics: Map::new(),
        }
    }
}

/// Solver output.
///
/// Only `routes` is interpreted; totals and other solver-defined fields are
/// carried in [`SolveResult::metrics`].
///
/// # Examples
///
/// ```
/// use aquaroute_core::SolveResult;
///
/// let json = r#"{
///     "routes": [{"courier_id": "c1", "orders": ["o1"], "distance_km": 3.2}],
///     "couriers_used": 1
/// }"#;
/// let result: SolveResult = serde_json::from_str(json).unwrap();
/// assert_eq!(result.routes[0].orders, ["o1"]);
/// assert_eq!(result.metrics["couriers_used"], 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveResult {
    /// One entry per courier that received orders.
    pub routes: Vec<Route>,
    /// Any additional top-level fields reported by the solver.
    #[serde(flatten)]
    pub metrics: Map<String, Value>,
}

impl SolveResult {
    /// Construct a result without metrics.
    #[must_use]
    pub fn new(routes: Vec<Route>) -> Self {
        Self {
            routes,
            metrics: Map::new(),
        }
    }

    /// Iterate over every assigned order id across all routes.
    pub fn assigned_orders(&self) -> impl Iterator<Item = &str> {
        self.routes
            .iter()
            .flat_map(|route| route.orders.iter().map(String::as_str))
    }
}

/// Visualizer output.
///
/// The visualizer may print JSON or free text. JSON is kept as
/// [`VisualizationResult::Reported`]; anything else degrades to
/// [`VisualizationResult::Fallback`], which serialises as
/// `{"success": true, "message": ..., "image_path": ...}`.
///
/// Decoding yields `Fallback` only for an object with exactly those three
/// keys; any other JSON stays `Reported` with every field intact.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum VisualizationResult {
    /// Best-effort result built from non-JSON output.
    Fallback {
        /// Always `true` when built by the visualizer adapter.
        success: bool,
        /// Trimmed text printed by the visualizer.
        message: String,
        /// Conventional location of the rendered image.
        image_path: String,
    },
    /// JSON printed by the visualizer.
    Reported(Value),
}

impl VisualizationResult {
    /// Build the fallback result for free-text output.
    #[must_use]
    pub fn fallback(message: impl Into<String>, image_path: impl Into<String>) -> Self {
        Self::Fallback {
            success: true,
            message: message.into(),
            image_path: image_path.into(),
        }
    }

    /// Path of the rendered image, if known.
    #[must_use]
    pub fn image_path(&self) -> Option<&str> {
        match self {
            Self::Fallback { image_path, .. } => Some(image_path),
            Self::Reported(value) => value.get("image_path").and_then(Value::as_str),
        }
    }

    /// Whether the visualizer reported success.
    ///
    /// Reported JSON without a boolean `success` field counts as success,
    /// since the process already exited cleanly.
    #[must_use]
    pub fn is_success(&self) -> bool {
        match self {
            Self::Fallback { success, .. } => *success,
            Self::Reported(value) => value
                .get("success")
                .and_then(Value::as_bool)
                .unwrap_or(true),
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FallbackFields {
    success: bool,
    message: String,
    image_path: String,
}

impl<'de> Deserialize<'de> for VisualizationResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match FallbackFields::deserialize(&value) {
            Ok(FallbackFields {
                success,
                message,
                image_path,
            }) => Self::Fallback {
                success,
                message,
                image_path,
            },
            Err(_) => Self::Reported(value),
        })
    }
}
