//! Prior/start image synthesis for regularized interferometric image
//! reconstruction.
//!
//! Takes a 2-D intensity image with an angular pixel scale, blurs it with
//! a Gaussian sized in milliarcseconds, rescales the result so its peak
//! matches the input's, and floors faint pixels to a small positive value.
//! The result is suitable as a start/prior image for a maximum-entropy
//! reconstruction. FITS container I/O is available behind the `fits-io`
//! feature.

pub mod convolve;
pub mod error;
#[cfg(feature = "fits-io")]
pub mod fits;
pub mod image;
pub mod kernel;
pub mod prior;

// Re-export key functionality for easier access
pub use convolve::{convolve2d, ConvolveMode, ConvolveOptions};
pub use error::PriorError;
pub use image::{KeywordValue, SkyImage, MAS_TO_DEG};
pub use kernel::gaussian_kernel;
pub use prior::{make_prior, DEFAULT_BLANK, FWHM_TO_SIGMA};
