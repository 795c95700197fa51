//! Failure taxonomy for solving and visualising routes.
//!
//! Every variant carries enough context (exit code, stderr, raw output) to
//! diagnose a failure without re-running the external process.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::ProblemError;

/// Which half of a dispatch produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Route solving.
    Solve,
    /// Route rendering.
    Visualize,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Solve => f.write_str("solver"),
            Self::Visualize => f.write_str("visualizer"),
        }
    }
}

/// How an external process ended when it did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessExit {
    /// The process returned this exit code.
    Code(i32),
    /// The process was terminated by a signal and has no exit code.
    Signalled,
}

impl ProcessExit {
    /// Map an optional exit code, as reported by the OS, to a [`ProcessExit`].
    #[must_use]
    pub const fn from_code(code: Option<i32>) -> Self {
        match code {
            Some(code) => Self::Code(code),
            None => Self::Signalled,
        }
    }
}

impl fmt::Display for ProcessExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "code {code}"),
            Self::Signalled => f.write_str("a signal"),
        }
    }
}

/// Errors returned by [`RouteSolver`](crate::RouteSolver),
/// [`RouteVisualizer`](crate::RouteVisualizer) and
/// [`Dispatcher`](crate::Dispatcher).
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The request failed local validation.
    #[error("invalid routing problem: {0}")]
    InvalidProblem(#[from] ProblemError),
    /// The input payload could not be encoded.
    #[error("failed to encode {stage} input: {source}")]
    Serialise {
        /// Stage whose input failed to encode.
        stage: Stage,
        /// Underlying encoder error.
        #[source]
        source: serde_json::Error,
    },
    /// The input payload could not be handed to the process.
    #[error("failed to stage {stage} input: {source}")]
    StageInput {
        /// Stage whose input could not be staged.
        stage: Stage,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// The process could not be started.
    #[error("failed to launch {stage} process {program:?}: {source}")]
    Launch {
        /// Stage that failed to start.
        stage: Stage,
        /// Program that was executed.
        program: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },
    /// Reading the process output failed.
    #[error("failed to collect {stage} output: {source}")]
    Io {
        /// Stage whose pipes failed.
        stage: Stage,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// The process ran but signalled failure.
    #[error("{stage} exited with {exit}: {stderr}")]
    NonZeroExit {
        /// Stage that failed.
        stage: Stage,
        /// Exit code, or the signal marker.
        exit: ProcessExit,
        /// Everything the process wrote to stderr, or its stdout diagnostic
        /// when stderr was empty.
        stderr: String,
    },
    /// The process succeeded but its stdout was not the expected JSON.
    #[error("failed to parse {stage} output: {source}\noutput: {stdout}")]
    MalformedOutput {
        /// Stage whose output was rejected.
        stage: Stage,
        /// Underlying decoder error.
        #[source]
        source: serde_json::Error,
        /// Raw stdout, kept for diagnosis.
        stdout: String,
    },
    /// The solver answered with an `{"error": ...}` object.
    #[error("solver reported an error: {message}")]
    SolverReported {
        /// Message supplied by the solver.
        message: String,
    },
    /// The process exceeded its deadline and was killed.
    #[error("{stage} did not finish within {timeout:?}")]
    Timeout {
        /// Stage that timed out.
        stage: Stage,
        /// Configured deadline.
        timeout: Duration,
    },
    /// A step of a combined solve-and-visualize run failed.
    #[error("solve and visualize failed at the {stage} step: {source}")]
    Pipeline {
        /// Step that failed.
        stage: Stage,
        /// Error from the failed step.
        #[source]
        source: Box<DispatchError>,
    },
}

impl DispatchError {
    /// Wrap `source` as a failure of the given pipeline step.
    #[must_use]
    pub fn pipeline(stage: Stage, source: Self) -> Self {
        Self::Pipeline {
            stage,
            source: Box::new(source),
        }
    }

    /// The stage the failure is attributed to, when known.
    #[must_use]
    pub const fn stage(&self) -> Option<Stage> {
        match self {
            Self::InvalidProblem(_) => None,
            Self::SolverReported { .. } => Some(Stage::Solve),
            Self::Serialise { stage, .. }
            | Self::StageInput { stage, .. }
            | Self::Launch { stage, .. }
            | Self::Io { stage, .. }
            | Self::NonZeroExit { stage, .. }
            | Self::MalformedOutput { stage, .. }
            | Self::Timeout { stage, .. }
            | Self::Pipeline { stage, .. } => Some(*stage),
        }
    }

    /// Whether the failure was caused by a deadline, at any nesting level.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Pipeline { source, .. } => source.is_timeout(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn non_zero_exit_message_names_code_and_stderr() {
        let err = DispatchError::NonZeroExit {
            stage: Stage::Solve,
            exit: ProcessExit::Code(3),
            stderr: "Traceback: no module named ortools".into(),
        };
        let message = err.to_string();
        assert!(message.contains("code 3"), "{message}");
        assert!(message.contains("no module named ortools"), "{message}");
    }

    #[rstest]
    fn malformed_output_message_embeds_stdout() {
        let source = serde_json::from_str::<serde_json::Value>("Solving...")
            .expect_err("text is not JSON");
        let err = DispatchError::MalformedOutput {
            stage: Stage::Solve,
            source,
            stdout: "Solving...".into(),
        };
        assert!(err.to_string().contains("output: Solving..."));
    }

    #[rstest]
    fn pipeline_wraps_inner_message() {
        let inner = DispatchError::SolverReported {
            message: "no solution".into(),
        };
        let err = DispatchError::pipeline(Stage::Solve, inner);
        let message = err.to_string();
        assert!(message.starts_with("solve and visualize failed"), "{message}");
        assert!(message.contains("no solution"), "{message}");
        assert_eq!(err.stage(), Some(Stage::Solve));
    }

    #[rstest]
    fn timeout_is_detected_through_pipeline() {
        let err = DispatchError::pipeline(
            Stage::Visualize,
            DispatchError::Timeout {
                stage: Stage::Visualize,
                timeout: Duration::from_secs(2),
            },
        );
        assert!(err.is_timeout());
    }

    #[rstest]
    #[case(Some(2), ProcessExit::Code(2))]
    #[case(None, ProcessExit::Signalled)]
    fn process_exit_maps_os_codes(#[case] code: Option<i32>, #[case] expected: ProcessExit) {
        assert_eq!(ProcessExit::from_code(code), expected);
    }
}
