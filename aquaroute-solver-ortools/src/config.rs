//! Process configuration for the Python solver and visualizer scripts.

use std::fmt;
use std::io;
use std::str::FromStr;
use std::time::Duration;

use aquaroute_core::Stage;
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Interpreter used to run both scripts.
pub const DEFAULT_INTERPRETER: &str = "python3";
/// Solver script, relative to the working directory.
pub const DEFAULT_SOLVER_SCRIPT: &str = "vrp_solver_api.py";
/// Visualizer script, relative to the working directory.
pub const DEFAULT_VISUALIZER_SCRIPT: &str = "visualize_routes_api.py";
/// File the visualizer writes into the working directory.
pub const DEFAULT_IMAGE_FILE: &str = "vrp_routes_visualization.png";

/// How the JSON payload reaches the child process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputHandoff {
    /// Write a uniquely named file and pass its path as the only argument.
    #[default]
    #[serde(alias = "temp_file")]
    TempFile,
    /// Pipe the payload into the child's standard input.
    Stdin,
}

impl fmt::Display for InputHandoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TempFile => f.write_str("temp-file"),
            Self::Stdin => f.write_str("stdin"),
        }
    }
}

impl FromStr for InputHandoff {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "temp-file" | "temp_file" | "file" => Ok(Self::TempFile),
            "stdin" => Ok(Self::Stdin),
            other => Err(format!(
                "unknown input handoff {other:?}; expected \"temp-file\" or \"stdin\""
            )),
        }
    }
}

/// Errors raised by [`OrtoolsConfig::validate`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The working directory does not exist or is not a directory.
    #[error("working directory {path} is not a directory")]
    WorkingDirMissing {
        /// Configured working directory.
        path: Utf8PathBuf,
    },
    /// A script does not exist or is not a regular file.
    #[error("{stage} script {path} is not a file")]
    ScriptMissing {
        /// Stage whose script is missing.
        stage: Stage,
        /// Script path resolved against the working directory.
        path: Utf8PathBuf,
    },
    /// The filesystem could not be inspected.
    #[error("failed to inspect {path}: {source}")]
    Inspect {
        /// Path being inspected.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Configuration shared by [`ProcessSolver`](crate::ProcessSolver) and
/// [`ProcessVisualizer`](crate::ProcessVisualizer).
///
/// Script paths are passed to the interpreter unchanged, with the child
/// running inside `working_dir`, so relative script paths resolve there.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use aquaroute_solver_ortools::{InputHandoff, OrtoolsConfig};
///
/// let config = OrtoolsConfig::new("/srv/vrp")
///     .with_timeout(Duration::from_secs(60))
///     .with_handoff(InputHandoff::Stdin);
/// assert_eq!(config.image_path(), "/srv/vrp/vrp_routes_visualization.png");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrtoolsConfig {
    /// Program that runs the scripts.
    pub interpreter: String,
    /// Directory the scripts run in and where temp inputs are staged.
    pub working_dir: Utf8PathBuf,
    /// Solver script path.
    pub solver_script: Utf8PathBuf,
    /// Visualizer script path.
    pub visualizer_script: Utf8PathBuf,
    /// Image location reported when the visualizer prints free text.
    /// Defaults to [`DEFAULT_IMAGE_FILE`] inside `working_dir`.
    pub image_path: Option<Utf8PathBuf>,
    /// Deadline for each process; `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Payload delivery mode.
    pub handoff: InputHandoff,
}

impl Default for OrtoolsConfig {
    fn default() -> Self {
        Self {
            interpreter: DEFAULT_INTERPRETER.to_owned(),
            working_dir: Utf8PathBuf::from("."),
            solver_script: Utf8PathBuf::from(DEFAULT_SOLVER_SCRIPT),
            visualizer_script: Utf8PathBuf::from(DEFAULT_VISUALIZER_SCRIPT),
            image_path: None,
            timeout: None,
            handoff: InputHandoff::TempFile,
        }
    }
}

impl OrtoolsConfig {
    /// Create a configuration running the default scripts in `working_dir`.
    #[must_use]
    pub fn new(working_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            ..Default::default()
        }
    }

    /// Set the interpreter.
    #[must_use]
    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    /// Set the solver script.
    #[must_use]
    pub fn with_solver_script(mut self, script: impl Into<Utf8PathBuf>) -> Self {
        self.solver_script = script.into();
        self
    }

    /// Set the visualizer script.
    #[must_use]
    pub fn with_visualizer_script(mut self, script: impl Into<Utf8PathBuf>) -> Self {
        self.visualizer_script = script.into();
        self
    }

    /// Set the image path reported by the fallback visualization result.
    #[must_use]
    pub fn with_image_path(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.image_path = Some(path.into());
        self
    }

    /// Set a per-process deadline.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the payload delivery mode.
    #[must_use]
    pub const fn with_handoff(mut self, handoff: InputHandoff) -> Self {
        self.handoff = handoff;
        self
    }

    /// Image location, falling back to [`DEFAULT_IMAGE_FILE`] in the working
    /// directory.
    ///
    /// Relative paths are made absolute against the current directory. The
    /// path is returned as configured if that fails.
    #[must_use]
    pub fn image_path(&self) -> Utf8PathBuf {
        let path = self
            .image_path
            .clone()
            .unwrap_or_else(|| self.working_dir.join(DEFAULT_IMAGE_FILE));
        std::path::absolute(&path)
            .ok()
            .and_then(|absolute| Utf8PathBuf::from_path_buf(absolute).ok())
            .unwrap_or(path)
    }

    /// Resolve `script` the way the child process will see it.
    #[must_use]
    pub fn resolve_script(&self, script: &Utf8Path) -> Utf8PathBuf {
        self.working_dir.join(script)
    }

    /// The script run for `stage`.
    #[must_use]
    pub fn script(&self, stage: Stage) -> &Utf8Path {
        match stage {
            Stage::Solve => &self.solver_script,
            Stage::Visualize => &self.visualizer_script,
        }
    }

    /// Check that the working directory and both scripts exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first missing path.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_for(&[Stage::Solve, Stage::Visualize])
    }

    /// Check that the working directory and the scripts for `stages` exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first missing path.
    pub fn validate_for(&self, stages: &[Stage]) -> Result<(), ConfigError> {
        let dir_ok = aquaroute_fs::dir_is_dir(&self.working_dir).map_err(|source| {
            ConfigError::Inspect {
                path: self.working_dir.clone(),
                source,
            }
        })?;
        if !dir_ok {
            return Err(ConfigError::WorkingDirMissing {
                path: self.working_dir.clone(),
            });
        }

        for &stage in stages {
            let path = self.resolve_script(self.script(stage));
            let is_file = aquaroute_fs::file_is_file(&path).map_err(|source| {
                ConfigError::Inspect {
                    path: path.clone(),
                    source,
                }
            })?;
            if !is_file {
                return Err(ConfigError::ScriptMissing { stage, path });
            }
        }
        Ok(())
    }
}
