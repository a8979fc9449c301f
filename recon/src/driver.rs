//! One-step and two-step reconstruction pipelines.
//!
//! Builds bsmem invocations, derives output filenames, and chains the
//! prior-image blur between the passes of a two-step run. Every pipeline
//! is generic over [`ProcessRunner`] and returns the path of the final
//! reconstructed image.

use std::path::{Path, PathBuf};

use priorgen::fits::{read_sky_image, write_sky_image};
use priorgen::{make_prior, SkyImage};

use crate::error::DriverError;
use crate::runner::{run_bsmem, ProcessRunner};
use crate::settings::{
    DataOptions, DEFAULT_DIM, DEFAULT_MODEL_TYPE, DEFAULT_MODEL_WIDTH, DEFAULT_STEP2_FWHM,
    DEFAULT_STEP2_THRESHOLD, DEFAULT_UVMAX1,
};

/// Start-model parameters for a model-start run.
#[derive(Debug, Clone)]
pub struct ModelSettings {
    /// Start-model type (0-4).
    pub modeltype: u32,
    /// Start-model width (mas).
    pub modelwidth: f64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            modeltype: DEFAULT_MODEL_TYPE,
            modelwidth: DEFAULT_MODEL_WIDTH,
        }
    }
}

/// Settings shared by every pass of a reconstruction.
#[derive(Debug, Clone)]
pub struct ReconstructionSetup {
    /// Reconstructed image width (pixels).
    pub dim: usize,
    /// Reconstructed image pixel size (mas). Optional for one-step model
    /// starts (bsmem chooses); required for two-step model starts.
    pub pixelsize: Option<f64>,
    /// Regularization hyperparameter; `None` selects automatic mode.
    pub alpha: Option<f64>,
    /// Data-selection and error-scaling options.
    pub data: DataOptions,
}

impl Default for ReconstructionSetup {
    fn default() -> Self {
        Self {
            dim: DEFAULT_DIM,
            pixelsize: None,
            alpha: None,
            data: DataOptions::default(),
        }
    }
}

/// Blur/threshold settings applied between the passes of a two-step run.
#[derive(Debug, Clone)]
pub struct StepTwoSettings {
    /// uv-radius cutoff for the first pass (waves).
    pub uvmax1: f64,
    /// FWHM of the Gaussian to blur the first pass output with (mas).
    pub fwhm: f64,
    /// Threshold relative to peak for the first pass output.
    pub threshold: f64,
}

impl Default for StepTwoSettings {
    fn default() -> Self {
        Self {
            uvmax1: DEFAULT_UVMAX1,
            fwhm: DEFAULT_STEP2_FWHM,
            threshold: DEFAULT_STEP2_THRESHOLD,
        }
    }
}

/// Output filename for reconstruction pass `iteration` of `datafile`:
/// a sibling `bsmem_<n>_<stem>.fits`.
pub fn output_filename(datafile: &Path, iteration: u32) -> PathBuf {
    let stem = datafile
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    datafile.with_file_name(format!("bsmem_{iteration}_{stem}.fits"))
}

/// Sidecar filename holding the full bsmem transcript for `outputfile`.
fn transcript_filename(outputfile: &Path) -> PathBuf {
    let stem = outputfile
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    outputfile.with_file_name(format!("{stem}-out.txt"))
}

fn common_args(datafile: &Path, outputfile: &Path, dim: usize) -> Vec<String> {
    vec![
        "--noui".to_string(),
        format!("--data={}", datafile.display()),
        "--clobber".to_string(),
        format!("--output={}", outputfile.display()),
        format!("--dim={dim}"),
    ]
}

fn append_alpha(args: &mut Vec<String>, alpha: Option<f64>) {
    match alpha {
        Some(alpha) => {
            args.push("--autoalpha=3".to_string());
            args.push(format!("--alpha={alpha:.6}"));
        }
        None => args.push("--autoalpha=4".to_string()),
    }
}

/// Run bsmem once, starting from a parametric model.
pub fn run_with_model<R: ProcessRunner>(
    runner: &R,
    datafile: &Path,
    outputfile: &Path,
    model: &ModelSettings,
    setup: &ReconstructionSetup,
) -> Result<(), DriverError> {
    let mut args = common_args(datafile, outputfile, setup.dim);
    args.push(format!("--mt={}", model.modeltype));
    args.push(format!("--mw={:.6}", model.modelwidth));
    if let Some(pixelsize) = setup.pixelsize {
        args.push(format!("--pixelsize={pixelsize:.6}"));
    }
    setup.data.append_args(&mut args);
    append_alpha(&mut args, setup.alpha);
    run_bsmem(runner, &args, Some(&transcript_filename(outputfile)))
}

/// Run bsmem once, starting from a prior image.
///
/// The image is serialized to a scratch FITS file that only lives for
/// the duration of the run.
pub fn run_with_prior_image<R: ProcessRunner>(
    runner: &R,
    datafile: &Path,
    outputfile: &Path,
    dim: usize,
    pixelsize: f64,
    image: &SkyImage,
    data: &DataOptions,
    alpha: Option<f64>,
) -> Result<(), DriverError> {
    let scratch = tempfile::tempdir()?;
    let imagefile = scratch.path().join("prior.fits");
    write_sky_image(&imagefile, image, true)?;

    let mut args = common_args(datafile, outputfile, dim);
    args.push(format!("--pixelsize={pixelsize:.6}"));
    args.push(format!("--sf={}", imagefile.display()));
    data.append_args(&mut args);
    append_alpha(&mut args, alpha);
    run_bsmem(runner, &args, Some(&transcript_filename(outputfile)))
}

/// Reconstruct by running bsmem once from a parametric start model.
///
/// Returns the output FITS filename, a sibling of `datafile`.
pub fn reconstruct_once<R: ProcessRunner>(
    runner: &R,
    datafile: &Path,
    model: &ModelSettings,
    setup: &ReconstructionSetup,
) -> Result<PathBuf, DriverError> {
    let outputfile = output_filename(datafile, 1);
    run_with_model(runner, datafile, &outputfile, model, setup)?;
    Ok(outputfile)
}

/// Reconstruct by running bsmem once from a prior image on disk.
///
/// The image's own dimensions and pixel scale size the reconstruction;
/// `setup.dim` and `setup.pixelsize` are not consulted.
pub fn reconstruct_once_with_prior<R: ProcessRunner>(
    runner: &R,
    datafile: &Path,
    imagefile: &Path,
    setup: &ReconstructionSetup,
) -> Result<PathBuf, DriverError> {
    let outputfile = output_filename(datafile, 1);
    let image = read_sky_image(imagefile, &[])?;
    let (dim, _) = image.dim();
    let pixelsize = image.pixel_size_mas()?;
    run_with_prior_image(
        runner,
        datafile,
        &outputfile,
        dim,
        pixelsize,
        &image,
        &setup.data,
        setup.alpha,
    )?;
    Ok(outputfile)
}

/// Reconstruct by running bsmem twice from a parametric start model.
///
/// The first pass is clamped to `second.uvmax1`; its output is blurred
/// and thresholded into a prior for the unclamped second pass.
pub fn reconstruct_two_step<R: ProcessRunner>(
    runner: &R,
    datafile: &Path,
    model: &ModelSettings,
    setup: &ReconstructionSetup,
    second: &StepTwoSettings,
) -> Result<PathBuf, DriverError> {
    let pixelsize = setup.pixelsize.ok_or(DriverError::PixelSizeRequired)?;

    let out1 = output_filename(datafile, 1);
    let mut first = setup.clone();
    first.data.uvmax = Some(second.uvmax1);
    run_with_model(runner, datafile, &out1, model, &first)?;

    let image1 = read_sky_image(&out1, &[])?;
    let prior = make_prior(&image1, second.fwhm, second.threshold, None)?;

    let out2 = output_filename(datafile, 2);
    let mut rest = setup.data.clone();
    rest.uvmax = None;
    run_with_prior_image(
        runner,
        datafile,
        &out2,
        setup.dim,
        pixelsize,
        &prior,
        &rest,
        setup.alpha,
    )?;
    Ok(out2)
}

/// Reconstruct by running bsmem twice from a prior image on disk.
pub fn reconstruct_two_step_with_prior<R: ProcessRunner>(
    runner: &R,
    datafile: &Path,
    imagefile: &Path,
    setup: &ReconstructionSetup,
    second: &StepTwoSettings,
) -> Result<PathBuf, DriverError> {
    let image1 = read_sky_image(imagefile, &[])?;
    let (dim, _) = image1.dim();
    let pixelsize = image1.pixel_size_mas()?;

    let out1 = output_filename(datafile, 1);
    let mut first = setup.data.clone();
    first.uvmax = Some(second.uvmax1);
    run_with_prior_image(
        runner, datafile, &out1, dim, pixelsize, &image1, &first, setup.alpha,
    )?;

    let intermediate = read_sky_image(&out1, &[])?;
    let prior = make_prior(&intermediate, second.fwhm, second.threshold, None)?;

    let out2 = output_filename(datafile, 2);
    let mut rest = setup.data.clone();
    rest.uvmax = None;
    run_with_prior_image(
        runner, datafile, &out2, dim, pixelsize, &prior, &rest, setup.alpha,
    )?;
    Ok(out2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_filename() {
        assert_eq!(
            output_filename(Path::new("/data/contest1.oifits"), 1),
            Path::new("/data/bsmem_1_contest1.fits")
        );
        assert_eq!(
            output_filename(Path::new("contest1.oifits"), 2),
            Path::new("bsmem_2_contest1.fits")
        );
    }

    #[test]
    fn test_transcript_filename() {
        assert_eq!(
            transcript_filename(Path::new("/data/bsmem_1_contest1.fits")),
            Path::new("/data/bsmem_1_contest1-out.txt")
        );
    }

    #[test]
    fn test_alpha_switches_automatic_mode() {
        let mut args = Vec::new();
        append_alpha(&mut args, None);
        assert_eq!(args, vec!["--autoalpha=4"]);

        let mut args = Vec::new();
        append_alpha(&mut args, Some(4000.0));
        assert_eq!(args, vec!["--autoalpha=3", "--alpha=4000.000000"]);
    }
}
