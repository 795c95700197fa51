//! [`RouteVisualizer`] backed by an external rendering script.

use aquaroute_core::{DispatchError, RouteVisualizer, Stage, VisualizationResult, VisualizeProblem};
use async_trait::async_trait;

use crate::OrtoolsConfig;
use crate::parse::parse_visualization_output;
use crate::runner::{Invocation, run_script};

/// Prefix of staged visualizer inputs.
pub const VISUALIZER_INPUT_PREFIX: &str = "viz_input_";

/// Runs `<interpreter> <visualizer_script> <input>`.
///
/// Output that is not JSON is not an error: it becomes a fallback result
/// pointing at [`OrtoolsConfig::image_path`].
#[derive(Debug, Clone)]
pub struct ProcessVisualizer {
    config: OrtoolsConfig,
}

impl ProcessVisualizer {
    /// Create a visualizer using `config`.
    #[must_use]
    pub const fn new(config: OrtoolsConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &OrtoolsConfig {
        &self.config
    }
}

#[async_trait]
impl RouteVisualizer for ProcessVisualizer {
    async fn visualize(
        &self,
        problem: &VisualizeProblem,
    ) -> Result<VisualizationResult, DispatchError> {
        let payload = serde_json::to_vec_pretty(problem).map_err(|source| {
            DispatchError::Serialise {
                stage: Stage::Visualize,
                source,
            }
        })?;
        let invocation = Invocation {
            stage: Stage::Visualize,
            prefix: VISUALIZER_INPUT_PREFIX,
        };
        let stdout = run_script(&self.config, &invocation, &payload).await?;
        Ok(parse_visualization_output(&stdout, &self.config.image_path()))
    }
}
