//! Child-process capability for the reconstruction binary.

use std::fs;
use std::path::Path;
use std::process::Command;

use log::{error, info};

use crate::error::DriverError;
use crate::settings::BSMEM;

/// Captured output of a finished child process.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, `None` if the process was killed by a signal.
    pub exit_code: Option<i32>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Something that can run an external program and capture its output.
///
/// The reconstruction pipelines are generic over this trait so tests can
/// substitute a scripted runner for the real binary.
pub trait ProcessRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<ProcessOutput, DriverError>;
}

/// Runs programs as real child processes.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<ProcessOutput, DriverError> {
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| DriverError::Spawn {
                program: program.to_string(),
                source,
            })?;
        Ok(ProcessOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        })
    }
}

/// Run bsmem with `args` and log the last reported iteration.
///
/// The full standard output is persisted to `full_stdout` when given (the
/// transcript is long; the log only gets the tail from the last
/// `Iteration` marker onward). A non-zero exit surfaces the captured
/// stderr and stdout in the returned error and writes no transcript.
pub fn run_bsmem<R: ProcessRunner>(
    runner: &R,
    args: &[String],
    full_stdout: Option<&Path>,
) -> Result<(), DriverError> {
    info!("Running '{} {}'", BSMEM, args.join(" "));
    let output = runner.run(BSMEM, args)?;
    if !output.success() {
        error!("bsmem failed:\n{}\n{}", output.stderr, output.stdout);
        return Err(DriverError::BsmemFailed {
            exit_code: output.exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
        });
    }
    if let Some(path) = full_stdout {
        fs::write(path, &output.stdout)?;
    }
    info!("Last iteration:\n{}", last_iteration(&output.stdout));
    Ok(())
}

/// Portion of a bsmem transcript from the last `Iteration` marker onward,
/// or the whole transcript if the marker never appears.
pub fn last_iteration(stdout: &str) -> &str {
    match stdout.rfind("Iteration") {
        Some(index) => &stdout[index..],
        None => stdout,
    }
}
