//! Driver for the bsmem image-reconstruction binary.
//!
//! Builds command lines for one-step and two-step reconstructions from
//! optical-interferometry data, runs the binary through a swappable
//! process-runner capability, and chains the prior-image blur between the
//! passes of a two-step run.

pub mod driver;
pub mod error;
pub mod runner;
pub mod settings;

pub use driver::{
    output_filename, reconstruct_once, reconstruct_once_with_prior, reconstruct_two_step,
    reconstruct_two_step_with_prior, run_with_model, run_with_prior_image, ModelSettings,
    ReconstructionSetup, StepTwoSettings,
};
pub use error::DriverError;
pub use runner::{last_iteration, run_bsmem, ProcessOutput, ProcessRunner, SystemRunner};
pub use settings::{
    DataOptions, UseT3, WavRange, BSMEM, DEFAULT_DIM, DEFAULT_MODEL_TYPE, DEFAULT_MODEL_WIDTH,
    DEFAULT_STEP2_FWHM, DEFAULT_STEP2_THRESHOLD, DEFAULT_UVMAX1,
};
