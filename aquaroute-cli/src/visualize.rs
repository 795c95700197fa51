//! Visualize command implementation for the Aquaroute CLI.

use std::io::Write;

use aquaroute_core::{RouteVisualizer, VisualizeProblem};
use aquaroute_solver_ortools::{InputHandoff, OrtoolsConfig};
use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::backend::{BackendBuilder, ProcessBackend};
use crate::common::{
    ProcessOptions, block_on, emit, load_request, require_existing, require_request_path,
};
use crate::{
    ARG_HANDOFF, ARG_IMAGE_PATH, ARG_INTERPRETER, ARG_OUTPUT, ARG_REQUEST, ARG_TIMEOUT_SECS,
    ARG_VISUALIZER_SCRIPT, ARG_WORKING_DIR, CliError, ENV_VISUALIZE_REQUEST,
};

/// CLI arguments for the `visualize` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Render routes produced by an earlier solve. The request \
                 holds couriers, orders, routes and an optional common_depot. \
                 Free-text visualizer output is reported as a success \
                 pointing at the image path.",
    about = "Render pre-computed routes"
)]
#[ortho_config(prefix = "AQUAROUTE")]
pub(crate) struct VisualizeArgs {
    /// Path to a JSON file containing couriers, orders and routes.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// Write the result to this file instead of stdout.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
    /// Interpreter used to run the visualizer script (default: python3).
    #[arg(long = ARG_INTERPRETER, value_name = "program")]
    #[serde(default)]
    pub(crate) interpreter: Option<String>,
    /// Directory the visualizer runs in (default: current directory).
    #[arg(long = ARG_WORKING_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) working_dir: Option<Utf8PathBuf>,
    /// Visualizer script, relative to the working directory.
    #[arg(long = ARG_VISUALIZER_SCRIPT, value_name = "path")]
    #[serde(default)]
    pub(crate) visualizer_script: Option<Utf8PathBuf>,
    /// Image path reported when the visualizer prints plain text.
    #[arg(long = ARG_IMAGE_PATH, value_name = "path")]
    #[serde(default)]
    pub(crate) image_path: Option<Utf8PathBuf>,
    /// Kill the visualizer after this many seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
    /// How the request reaches the visualizer: temp-file or stdin.
    #[arg(long = ARG_HANDOFF, value_name = "mode")]
    #[serde(default)]
    pub(crate) handoff: Option<InputHandoff>,
}

impl VisualizeArgs {
    pub(crate) fn into_config(self) -> Result<VisualizeConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        VisualizeConfig::try_from(merged)
    }
}

/// Resolved `visualize` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct VisualizeConfig {
    pub(crate) request_path: Utf8PathBuf,
    pub(crate) output: Option<Utf8PathBuf>,
    pub(crate) process: OrtoolsConfig,
}

impl TryFrom<VisualizeArgs> for VisualizeConfig {
    type Error = CliError;

    fn try_from(args: VisualizeArgs) -> Result<Self, Self::Error> {
        let request_path = require_request_path(args.request_path, ENV_VISUALIZE_REQUEST)?;
        let process = ProcessOptions {
            interpreter: args.interpreter,
            working_dir: args.working_dir,
            visualizer_script: args.visualizer_script,
            image_path: args.image_path,
            timeout_secs: args.timeout_secs,
            handoff: args.handoff,
            ..ProcessOptions::default()
        }
        .into_ortools_config();
        Ok(Self {
            request_path,
            output: args.output,
            process,
        })
    }
}

pub(super) fn run_visualize(args: VisualizeArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_visualize_with(args, &ProcessBackend, &mut stdout)
}

pub(super) fn run_visualize_with(
    args: VisualizeArgs,
    backend: &dyn BackendBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    require_existing(&config.request_path, ARG_REQUEST)?;
    let request: VisualizeProblem = load_request(&config.request_path)?;
    let visualizer = backend.visualizer(&config.process)?;
    let result = block_on(visualizer.visualize(&request))??;
    emit(&result, config.output.as_deref(), writer)
}
