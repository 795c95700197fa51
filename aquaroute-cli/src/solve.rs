//! Solve command implementation for the Aquaroute CLI.

use std::io::Write;

use aquaroute_core::{RouteSolver, SolveResult};
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
    ARG_HANDOFF, ARG_INTERPRETER, ARG_OUTPUT, ARG_REQUEST, ARG_SOLVER_SCRIPT, ARG_TIMEOUT_SECS,
    ARG_VERIFY, ARG_WORKING_DIR, CliError, ENV_SOLVE_REQUEST,
};

/// CLI arguments for the `solve` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Solve a courier routing problem by running the external \
                 solver script. The request is a JSON file with couriers, \
                 orders, optional courier_restrictions and an optional \
                 common_depot; the solver's JSON answer is printed as-is.",
    about = "Solve a courier routing problem"
)]
#[ortho_config(prefix = "AQUAROUTE")]
pub(crate) struct SolveArgs {
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
    /// Interpreter used to run the solver script (default: python3).
    #[arg(long = ARG_INTERPRETER, value_name = "program")]
    #[serde(default)]
    pub(crate) interpreter: Option<String>,
    /// Directory the solver runs in (default: current directory).
    #[arg(long = ARG_WORKING_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) working_dir: Option<Utf8PathBuf>,
    /// Solver script, relative to the working directory.
    #[arg(long = ARG_SOLVER_SCRIPT, value_name = "path")]
    #[serde(default)]
    pub(crate) solver_script: Option<Utf8PathBuf>,
    /// Kill the solver after this many seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
    /// How the request reaches the solver: temp-file or stdin.
    #[arg(long = ARG_HANDOFF, value_name = "mode")]
    #[serde(default)]
    pub(crate) handoff: Option<InputHandoff>,
}

impl SolveArgs {
    pub(crate) fn into_config(self) -> Result<SolveConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SolveConfig::try_from(merged)
    }
}

/// Resolved `solve` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SolveConfig {
    pub(crate) request_path: Utf8PathBuf,
    pub(crate) output: Option<Utf8PathBuf>,
    pub(crate) verify: bool,
    pub(crate) process: OrtoolsConfig,
}

impl SolveConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.request_path, ARG_REQUEST)
    }
}

impl TryFrom<SolveArgs> for SolveConfig {
    type Error = CliError;

    fn try_from(args: SolveArgs) -> Result<Self, Self::Error> {
        let request_path = require_request_path(args.request_path, ENV_SOLVE_REQUEST)?;
        let process = ProcessOptions {
            interpreter: args.interpreter,
            working_dir: args.working_dir,
            solver_script: args.solver_script,
            timeout_secs: args.timeout_secs,
            handoff: args.handoff,
            ..ProcessOptions::default()
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

pub(super) fn run_solve(args: SolveArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_solve_with(args, &ProcessBackend, &mut stdout)
}

pub(super) fn run_solve_with(
    args: SolveArgs,
    backend: &dyn BackendBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    let result = execute_solve(&config, backend)?;
    emit(&result, config.output.as_deref(), writer)
}

pub(super) fn execute_solve(
    config: &SolveConfig,
    backend: &dyn BackendBuilder,
) -> Result<SolveResult, CliError> {
    let problem = load_problem(&config.request_path)?;
    let solver = backend.solver(&config.process)?;
    let result = block_on(solver.solve(&problem))??;
    if config.verify {
        verify(&problem, &result)?;
    }
    Ok(result)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<SolveConfig, CliError> {
    let merged = SolveArgs::merge_from_layers(layers).map_err(CliError::from)?;
    SolveConfig::try_from(merged)
}
