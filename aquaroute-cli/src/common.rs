//! Helpers shared by the solve, visualize and dispatch commands.

use std::future::Future;
use std::io::{BufReader, Write};
use std::time::Duration;

use aquaroute_core::{SolveProblem, SolveResult, SolutionReport, verify_solution};
use aquaroute_fs::{create_utf8_file, ensure_parent_dir, file_is_file, open_utf8_file};
use aquaroute_solver_ortools::{InputHandoff, OrtoolsConfig};
use camino::{Utf8Path, Utf8PathBuf};
use log::info;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{ARG_REQUEST, CliError};

/// Process settings collected from any subcommand's arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ProcessOptions {
    pub(crate) interpreter: Option<String>,
    pub(crate) working_dir: Option<Utf8PathBuf>,
    pub(crate) solver_script: Option<Utf8PathBuf>,
    pub(crate) visualizer_script: Option<Utf8PathBuf>,
    pub(crate) image_path: Option<Utf8PathBuf>,
    pub(crate) timeout_secs: Option<u64>,
    pub(crate) handoff: Option<InputHandoff>,
}

impl ProcessOptions {
    /// Fill unset options from [`OrtoolsConfig::default`].
    pub(crate) fn into_ortools_config(self) -> OrtoolsConfig {
        let defaults = OrtoolsConfig::default();
        OrtoolsConfig {
            interpreter: self.interpreter.unwrap_or(defaults.interpreter),
            working_dir: self.working_dir.unwrap_or(defaults.working_dir),
            solver_script: self.solver_script.unwrap_or(defaults.solver_script),
            visualizer_script: self.visualizer_script.unwrap_or(defaults.visualizer_script),
            image_path: self.image_path,
            timeout: self.timeout_secs.map(Duration::from_secs),
            handoff: self.handoff.unwrap_or(defaults.handoff),
        }
    }
}

pub(crate) fn require_request_path(
    path: Option<Utf8PathBuf>,
    env: &'static str,
) -> Result<Utf8PathBuf, CliError> {
    path.ok_or(CliError::MissingArgument {
        field: ARG_REQUEST,
        env,
    })
}

pub(crate) fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::MissingSourceFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Loads a JSON-encoded request from disk.
pub(crate) fn load_request<T: DeserializeOwned>(path: &Utf8Path) -> Result<T, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenRequest {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| CliError::ParseRequest {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads and validates a [`SolveProblem`].
pub(crate) fn load_problem(path: &Utf8Path) -> Result<SolveProblem, CliError> {
    let problem: SolveProblem = load_request(path)?;
    problem
        .validate()
        .map_err(|source| CliError::InvalidRequest {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(problem)
}

/// Drive `future` to completion on a single-threaded runtime.
pub(crate) fn block_on<F: Future>(future: F) -> Result<F::Output, CliError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    Ok(runtime.block_on(future))
}

pub(crate) fn verify(
    problem: &SolveProblem,
    result: &SolveResult,
) -> Result<SolutionReport, CliError> {
    let report = verify_solution(problem, result).map_err(CliError::Verification)?;
    info!(
        "verified {} routes covering {} orders, {:.0} m in total",
        report.routes.len(),
        problem.orders.len(),
        report.total_distance_meters
    );
    Ok(report)
}

/// Write `value` as pretty JSON to `output`, or to `writer` when no output
/// path is set.
pub(crate) fn emit<T: Serialize>(
    value: &T,
    output: Option<&Utf8Path>,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let mut payload = serde_json::to_vec_pretty(value).map_err(CliError::SerialiseOutput)?;
    payload.push(b'\n');
    match output {
        Some(path) => {
            let create_error = |source| CliError::CreateOutput {
                path: path.to_path_buf(),
                source,
            };
            ensure_parent_dir(path).map_err(create_error)?;
            let mut file = create_utf8_file(path).map_err(create_error)?;
            file.write_all(&payload).map_err(CliError::WriteOutput)?;
            info!("wrote output to {path}");
        }
        None => writer.write_all(&payload).map_err(CliError::WriteOutput)?,
    }
    Ok(())
}
