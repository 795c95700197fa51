//! Spawning a script, handing it its payload and collecting its output.

use std::io;
use std::process::{Output, Stdio};
use std::time::Instant;

use aquaroute_core::{DispatchError, ProcessExit, Stage};
use aquaroute_fs::StagedInput;
use log::{debug, warn};
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::{InputHandoff, OrtoolsConfig};

/// One script invocation.
pub(crate) struct Invocation {
    pub(crate) stage: Stage,
    /// File name prefix for staged inputs.
    pub(crate) prefix: &'static str,
}

/// Run the script with `payload` and return its stdout once it exits with
/// status 0.
pub(crate) async fn run_script(
    config: &OrtoolsConfig,
    invocation: &Invocation,
    payload: &[u8],
) -> Result<String, DispatchError> {
    let stage = invocation.stage;
    let mut command = Command::new(&config.interpreter);
    command
        .arg(config.script(stage).as_str())
        .current_dir(config.working_dir.as_std_path())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = match config.handoff {
        InputHandoff::TempFile => {
            let staged = StagedInput::write(&config.working_dir, invocation.prefix, payload)
                .map_err(|source| DispatchError::StageInput { stage, source })?;
            command.arg(staged.path().as_str()).stdin(Stdio::null());
            let staged_path = staged.path().to_owned();

            let output = collect(command, config, stage, None).await;
            if let Err(err) = staged.release() {
                warn!("failed to remove {stage} input {staged_path}: {err}");
            }
            output
        }
        InputHandoff::Stdin => {
            command.stdin(Stdio::piped());
            collect(command, config, stage, Some(payload)).await
        }
    }?;

    let stdout = decode(stage, "stdout", output.stdout);
    if !output.status.success() {
        let stderr = decode(stage, "stderr", output.stderr);
        return Err(DispatchError::NonZeroExit {
            stage,
            exit: ProcessExit::from_code(output.status.code()),
            stderr: failure_detail(stderr, &stdout),
        });
    }
    Ok(stdout)
}

/// Diagnostic text for a failed run.
///
/// stderr wins when it has content. The Python scripts report failures as
/// `{"error": ...}` on stdout, so a blank stderr falls back to that message,
/// or to the trimmed stdout when it is not such an object.
fn failure_detail(stderr: String, stdout: &str) -> String {
    if !stderr.trim().is_empty() {
        return stderr;
    }
    let stdout = stdout.trim();
    serde_json::from_str::<Value>(stdout)
        .ok()
        .and_then(|value| value.get("error").and_then(Value::as_str).map(str::to_owned))
        .unwrap_or_else(|| stdout.to_owned())
}

async fn collect(
    mut command: Command,
    config: &OrtoolsConfig,
    stage: Stage,
    stdin: Option<&[u8]>,
) -> Result<Output, DispatchError> {
    debug!(
        "spawning {stage}: {:?} via {}",
        command.as_std(),
        config.handoff
    );
    let started = Instant::now();
    let mut child = command.spawn().map_err(|source| DispatchError::Launch {
        stage,
        program: config.interpreter.clone(),
        source,
    })?;

    let pipe = child.stdin.take();
    let run = async move {
        let feed = async move {
            match (pipe, stdin) {
                (Some(mut pipe), Some(bytes)) => match pipe.write_all(bytes).await {
                    Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
                    other => other,
                },
                _ => Ok(()),
            }
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        fed.and(output)
    };

    let output = match config.timeout {
        Some(timeout) => tokio::time::timeout(timeout, run)
            .await
            .map_err(|_| DispatchError::Timeout { stage, timeout })?,
        None => run.await,
    }
    .map_err(|source| DispatchError::Io { stage, source })?;

    debug!(
        "{stage} exited with {} after {:?}",
        output.status,
        started.elapsed()
    );
    Ok(output)
}

fn decode(stage: Stage, stream: &str, bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap_or_else(|err| {
        warn!("{stage} {stream} is not valid UTF-8; decoding lossily");
        String::from_utf8_lossy(err.as_bytes()).into_owned()
    })
}
