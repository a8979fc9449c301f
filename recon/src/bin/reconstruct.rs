//! Reconstruct an image from optical-interferometry data by driving
//! bsmem, optionally in two passes with a blurred prior in between.

use std::path::PathBuf;

use clap::Parser;
use log::info;
use recon::{
    reconstruct_once, reconstruct_once_with_prior, reconstruct_two_step,
    reconstruct_two_step_with_prior, DataOptions, ModelSettings, ReconstructionSetup,
    StepTwoSettings, SystemRunner, UseT3, WavRange, DEFAULT_DIM, DEFAULT_MODEL_TYPE,
    DEFAULT_MODEL_WIDTH, DEFAULT_STEP2_FWHM, DEFAULT_STEP2_THRESHOLD, DEFAULT_UVMAX1,
};

/// Parse a wavelength range string in format "MIN,MAX" (nm)
fn parse_wav_range(s: &str) -> Result<WavRange, String> {
    s.parse()
}

#[derive(Parser, Debug)]
#[command(
    name = "reconstruct",
    about = "Reconstruct an image from optical-interferometry data using bsmem",
    version
)]
struct Args {
    /// Input OIFITS data file
    datafile: PathBuf,

    /// Start from this prior FITS image instead of a parametric model
    #[arg(long)]
    image: Option<PathBuf>,

    /// Run bsmem twice, blurring the first result into a prior for the
    /// second run
    #[arg(long)]
    two_step: bool,

    /// Reconstructed image width (pixels)
    #[arg(long, default_value_t = DEFAULT_DIM)]
    dim: usize,

    /// Reconstructed image pixel size (mas)
    #[arg(long)]
    pixelsize: Option<f64>,

    /// Start-model type for model starts (0-4)
    #[arg(long, default_value_t = DEFAULT_MODEL_TYPE)]
    modeltype: u32,

    /// Start-model width for model starts (mas)
    #[arg(long, default_value_t = DEFAULT_MODEL_WIDTH)]
    modelwidth: f64,

    /// Wavelength range to select, as "MIN,MAX" in nm
    #[arg(long, value_parser = parse_wav_range)]
    wav: Option<WavRange>,

    /// Maximum uv radius to select (waves)
    #[arg(long)]
    uvmax: Option<f64>,

    /// Bispectrum usage mode
    #[arg(long, value_enum)]
    use_t3: Option<UseT3>,

    /// Assumed total flux
    #[arg(long)]
    flux: Option<f64>,

    /// Regularization hyperparameter (automatic if omitted)
    #[arg(long)]
    alpha: Option<f64>,

    /// uv-radius cutoff for the first pass of a two-step run (waves)
    #[arg(long, default_value_t = DEFAULT_UVMAX1)]
    uvmax1: f64,

    /// FWHM of the Gaussian applied between two-step passes (mas)
    #[arg(long, default_value_t = DEFAULT_STEP2_FWHM)]
    fwhm: f64,

    /// Threshold relative to peak applied between two-step passes
    #[arg(long, default_value_t = DEFAULT_STEP2_THRESHOLD)]
    threshold: f64,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let setup = ReconstructionSetup {
        dim: args.dim,
        pixelsize: args.pixelsize,
        alpha: args.alpha,
        data: DataOptions {
            wav: args.wav,
            uvmax: args.uvmax,
            use_t3: args.use_t3,
            flux: args.flux,
            ..DataOptions::default()
        },
    };
    let model = ModelSettings {
        modeltype: args.modeltype,
        modelwidth: args.modelwidth,
    };
    let second = StepTwoSettings {
        uvmax1: args.uvmax1,
        fwhm: args.fwhm,
        threshold: args.threshold,
    };
    let runner = SystemRunner;

    let outputfile = match (&args.image, args.two_step) {
        (Some(image), false) => {
            reconstruct_once_with_prior(&runner, &args.datafile, image, &setup)?
        }
        (Some(image), true) => {
            reconstruct_two_step_with_prior(&runner, &args.datafile, image, &setup, &second)?
        }
        (None, false) => reconstruct_once(&runner, &args.datafile, &model, &setup)?,
        (None, true) => reconstruct_two_step(&runner, &args.datafile, &model, &setup, &second)?,
    };

    info!("Reconstructed image written to {}", outputfile.display());
    println!("{}", outputfile.display());
    Ok(())
}
