//! Command-line interface for solving and rendering courier dispatches.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod backend;
mod common;
mod dispatch;
mod error;
mod solve;
mod visualize;

pub use error::CliError;

use dispatch::DispatchArgs;
use solve::SolveArgs;
use visualize::VisualizeArgs;

pub(crate) const ARG_REQUEST: &str = "request-path";
pub(crate) const ARG_OUTPUT: &str = "output";
pub(crate) const ARG_VERIFY: &str = "verify";
pub(crate) const ARG_INTERPRETER: &str = "interpreter";
pub(crate) const ARG_WORKING_DIR: &str = "working-dir";
pub(crate) const ARG_SOLVER_SCRIPT: &str = "solver-script";
pub(crate) const ARG_VISUALIZER_SCRIPT: &str = "visualizer-script";
pub(crate) const ARG_IMAGE_PATH: &str = "image-path";
pub(crate) const ARG_TIMEOUT_SECS: &str = "timeout-secs";
pub(crate) const ARG_HANDOFF: &str = "handoff";
pub(crate) const ENV_SOLVE_REQUEST: &str = "AQUAROUTE_CMDS_SOLVE_REQUEST_PATH";
pub(crate) const ENV_VISUALIZE_REQUEST: &str = "AQUAROUTE_CMDS_VISUALIZE_REQUEST_PATH";
pub(crate) const ENV_DISPATCH_REQUEST: &str = "AQUAROUTE_CMDS_DISPATCH_REQUEST_PATH";

/// Run the Aquaroute CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Solve(args) => solve::run_solve(args),
        Command::Visualize(args) => visualize::run_visualize(args),
        Command::Dispatch(args) => dispatch::run_dispatch(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "aquaroute",
    about = "Assign delivery orders to couriers with an external OR-Tools solver",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Solve a routing problem and print the routes.
    Solve(SolveArgs),
    /// Render pre-computed routes onto a map.
    Visualize(VisualizeArgs),
    /// Solve a routing problem, then render the solved routes.
    Dispatch(DispatchArgs),
}

#[cfg(test)]
mod tests;
