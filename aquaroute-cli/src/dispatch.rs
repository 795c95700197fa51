//! Dispatch command: solve, then render the solved routes.

use std::io::Write;

use aquaroute_core::{DispatchOutcome, Dispatcher};
use aquaroute_solver_ortools::{InputHandoff, OrtoolsConfig};
use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::backend::{BackendBuilder, ProcessBackend};
use crate::common::{
    ProcessOptions, block_on, emit, load_problem, require_existing, require_request_path, verify,
};
use crate::{
    ARG_HANDOFF, ARG_IMAGE_PATH, ARG_INTERPRETER, ARG_OUTPUT, ARG_REQUEST, ARG_SOLVER_SCRIPT,
    ARG_TIMEOUT_SECS, ARG_VERIFY, ARG_VISUALIZER_SCRIPT, ARG_WORKING_DIR, CliError,
    ENV_DISPATCH_REQUEST,
};

/// CLI arguments for the `dispatch` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Solve a courier routing problem and render the resulting \
                 routes in one step. Rendering only starts after a \
                 successful solve; a failure in either step fails the \
                 command and nothing is printed.",
    about = "Solve and render a courier routing problem"
)]
#[ortho_config(prefix = "AQUAROUTE")]
pub(crate) struct DispatchArgs {
    /// Path to a JSON file containing the routing problem.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// Write the result to this file instead of stdout.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
    /// Reject answers that skip, duplicate or misassign orders.
    #[arg(long = ARG_VERIFY)]
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub(crate) verify: bool,
    /// Interpreter used to run both scripts (default: python3).
    #[arg(long = ARG_INTERPRETER, value_name = "program")]
    #[serde(default)]
    pub(crate) interpreter: Option<String>,
    /// Directory both scripts run in (default: current directory).
    #[arg(long = ARG_WORKING_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) working_dir: Option<Utf8PathBuf>,
    /// Solver script, relative to the working directory.
    #[arg(long = ARG_SOLVER_SCRIPT, value_name = "path")]
    #[serde(default)]
    pub(crate) solver_script: Option<Utf8PathBuf>,
    /// Visualizer script, relative to the working directory.
    #[arg(long = ARG_VISUALIZER_SCRIPT, value_name = "path")]
    #[serde(default)]
    pub(crate) visualizer_script: Option<Utf8PathBuf>,
    /// Image path reported when the visualizer prints plain text.
    #[arg(long = ARG_IMAGE_PATH, value_name = "path")]
    #[serde(default)]
    pub(crate) image_path: Option<Utf8PathBuf>,
    /// Kill either script after this many seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
    /// How requests reach the scripts: temp-file or stdin.
    #[arg(long = ARG_HANDOFF, value_name = "mode")]
    #[serde(default)]
    pub(crate) handoff: Option<InputHandoff>,
}

impl DispatchArgs {
    pub(crate) fn into_config(self) -> Result<DispatchConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        DispatchConfig::try_from(merged)
    }
}

/// Resolved `dispatch` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DispatchConfig {
    pub(crate) request_path: Utf8PathBuf,
    pub(crate) output: Option<Utf8PathBuf>,
    pub(crate) verify: bool,
    pub(crate) process: OrtoolsConfig,
}

impl TryFrom<DispatchArgs> for DispatchConfig {
    type Error = CliError;

    fn try_from(args: DispatchArgs) -> Result<Self, Self::Error> {
        let request_path = require_request_path(args.request_path, ENV_DISPATCH_REQUEST)?;
        let process = ProcessOptions {
            interpreter: args.interpreter,
            working_dir: args.working_dir,
            solver_script: args.solver_script,
            visualizer_script: args.visualizer_script,
            image_path: args.image_path,
            timeout_secs: args.timeout_secs,
            handoff: args.handoff,
        }
        .into_ortools_config();
        Ok(Self {
            request_path,
            output: args.output,
            verify: args.verify,
            process,
        })
    }
}

pub(super) fn run_dispatch(args: DispatchArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_dispatch_with(args, &ProcessBackend, &mut stdout)
}

pub(super) fn run_dispatch_with(
    args: DispatchArgs,
    backend: &dyn BackendBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    require_existing(&config.request_path, ARG_REQUEST)?;
    let outcome = execute_dispatch(&config, backend)?;
    emit(&outcome, config.output.as_deref(), writer)
}

fn execute_dispatch(
    config: &DispatchConfig,
    backend: &dyn BackendBuilder,
) -> Result<DispatchOutcome, CliError> {
    let problem = load_problem(&config.request_path)?;
    let dispatcher = Dispatcher::new(
        backend.solver(&config.process)?,
        backend.visualizer(&config.process)?,
    );
    let outcome = block_on(dispatcher.solve_and_visualize(&problem))??;
    if config.verify {
        verify(&problem, &outcome.vrp_result)?;
    }
    Ok(outcome)
}
