//! Errors surfaced by the reconstruction driver.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("bsmem exited with status {exit_code:?}:\n{stderr}\n{stdout}")]
    BsmemFailed {
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },
    #[error("two-step reconstruction from a model needs a pixel size")]
    PixelSizeRequired,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Fits(#[from] priorgen::fits::FitsError),
    #[error(transparent)]
    Prior(#[from] priorgen::PriorError),
}
