//! Errors surfaced by the prior-image synthesis pipeline.

use thiserror::Error;

/// Errors that can occur while synthesizing a prior image.
///
/// Every variant is terminal for the call that produced it; the pipeline
/// never returns a partial result.
#[derive(Error, Debug)]
pub enum PriorError {
    #[error("CDELT1/CDELT2 keywords missing, pixel size unknown")]
    MissingPixelSize,
    #[error("image pixels are not square (CDELT1={cdelt1}, CDELT2={cdelt2})")]
    NonSquarePixels { cdelt1: f64, cdelt2: f64 },
    #[error("Gaussian sigma must be positive, got {0} px")]
    NonPositiveSigma(f64),
    #[error("blur kernel width rounds to zero for sigma {0} px")]
    DegenerateKernel(f64),
    #[error("blurred image peak is zero, renormalization is undefined")]
    DegenerateImage,
}
