//! Make an initial/prior image for bsmem from an existing FITS image.
//!
//! Blurs the input with a Gaussian sized in mas, rescales to the input
//! peak, floors faint pixels, and writes the result with a small
//! allow-list of header keywords carried over from the input.

use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;
use priorgen::fits::{read_sky_image, write_sky_image};
use priorgen::make_prior;

/// Header keywords copied through from the input image when present.
const COPY_KEYWORDS: &[&str] = &["HDUNAME", "ORIGIN", "OBJECT", "AUTHOR", "REFERENC"];

#[derive(Parser, Debug)]
#[command(
    name = "make_prior",
    about = "Make an initial/prior image for bsmem",
    version
)]
struct Args {
    /// Overwrite an existing output file
    #[arg(short, long)]
    overwrite: bool,

    /// Replacement value for pixels below threshold
    #[arg(short, long)]
    blank: Option<f64>,

    /// Input FITS image
    input_image: PathBuf,

    /// Output FITS image
    output_image: PathBuf,

    /// FWHM of Gaussian to convolve with in mas
    fwhm: f64,

    /// Threshold relative to peak intensity
    threshold: f64,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if !args.overwrite && args.output_image.exists() {
        bail!(
            "not creating '{}' as it already exists",
            args.output_image.display()
        );
    }

    let input = read_sky_image(&args.input_image, COPY_KEYWORDS)?;
    let mut output = make_prior(&input, args.fwhm, args.threshold, args.blank)?;
    output.copy_keywords(&input, COPY_KEYWORDS);
    write_sky_image(&args.output_image, &output, args.overwrite)?;
    Ok(())
}
