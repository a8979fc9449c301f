//! Blur-and-threshold synthesis of prior images.
//!
//! The pipeline: derive the angular pixel scale, blur the image with a
//! Gaussian whose FWHM is given in milliarcseconds, rescale so the output
//! peak equals the input peak, then floor every pixel below a relative
//! threshold. The output keeps only the pixel scale of the input plus a
//! provenance record; absolute sky coordinates are deliberately dropped
//! since the result is a relative prior, not an astrometric product.

use log::info;

use crate::convolve::{convolve2d, ConvolveMode, ConvolveOptions};
use crate::error::PriorError;
use crate::image::{KeywordValue, SkyImage, MAS_TO_DEG};
use crate::kernel::gaussian_kernel;

/// Ratio of a Gaussian's FWHM to its standard deviation, 2*sqrt(2*ln 2).
pub const FWHM_TO_SIGMA: f64 = 2.3548;

/// Replacement value for sub-threshold pixels when none is given.
pub const DEFAULT_BLANK: f64 = 1e-8;

/// Blur and threshold an image for use as a reconstruction prior.
///
/// The input is convolved (zero-padded, output dimensions unchanged) with
/// a Gaussian of the given FWHM, rescaled so the output peak exactly
/// equals the input peak, and every pixel strictly below `threshold`
/// times the peak is replaced with `blank`. Blurring can move the peak's
/// location; only its value is preserved.
///
/// The output image carries `CDELT1`/`CDELT2` set to the absolute pixel
/// increment, the input's history entries, and a new record of the
/// parameters used.
///
/// # Arguments
///
/// * `image` - Input image; needs `CDELT1`/`CDELT2` keywords
/// * `fwhm` - FWHM of the Gaussian to convolve with, in mas
/// * `threshold` - Threshold relative to peak intensity, in [0, 1]
/// * `blank` - Replacement for sub-threshold pixels, default
///   [`DEFAULT_BLANK`]; must stay positive for the result to be usable
///   as a multiplicative prior
///
/// # Errors
///
/// * `PriorError::MissingPixelSize` / `PriorError::NonSquarePixels` -
///   pixel-scale metadata absent or inconsistent
/// * `PriorError::NonPositiveSigma` / `PriorError::DegenerateKernel` -
///   the FWHM/pixel-size combination gives no usable kernel; note a
///   negative `CDELT1` drives sigma negative and lands here
/// * `PriorError::DegenerateImage` - the blurred image's peak is zero
///   (e.g. an all-zero input), renormalization would produce NaN
pub fn make_prior(
    image: &SkyImage,
    fwhm: f64,
    threshold: f64,
    blank: Option<f64>,
) -> Result<SkyImage, PriorError> {
    let blank = blank.unwrap_or(DEFAULT_BLANK);
    let pixelsize = image.pixel_size_mas()?;
    let minvalue = image.min_value();
    let maxvalue = image.max_value();
    info!("Image pixel size = {pixelsize} mas");
    info!("Image min = {minvalue:e}");
    info!("Image max = {maxvalue:e}");

    // Sign flows straight through from CDELT1; the kernel builder rejects
    // the resulting non-positive sigma.
    let sigma = fwhm / pixelsize / FWHM_TO_SIGMA;
    let lowest = threshold * maxvalue;

    let blur = gaussian_kernel(sigma)?;

    info!("Blurring image with sigma={sigma} px...");
    let mut result = convolve2d(
        &image.data().view(),
        &blur.view(),
        Some(ConvolveOptions {
            mode: ConvolveMode::Same,
        }),
    );
    info!("...blur done");

    let blurred_max = result.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if blurred_max == 0.0 {
        return Err(PriorError::DegenerateImage);
    }
    result.mapv_inplace(|v| v * maxvalue / blurred_max);

    info!("Thresholding image at {threshold} (blank={blank})...");
    result.mapv_inplace(|v| if v < lowest { blank } else { v });
    info!("...threshold done");

    let cdelt = pixelsize.abs() * MAS_TO_DEG;
    let mut out = SkyImage::new(result);
    out.set_keyword("CDELT1", KeywordValue::Real(cdelt));
    out.set_keyword("CDELT2", KeywordValue::Real(cdelt));
    for entry in image.history() {
        out.add_history(entry.clone());
    }
    out.add_history(format!("make_prior fwhm={fwhm:.6} threshold={threshold:.6}"));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array2;

    fn point_source_image(pixelsize_mas: f64) -> SkyImage {
        let mut data = Array2::zeros((64, 64));
        data[[32, 32]] = 1.0;
        let mut image = SkyImage::new(data);
        image.set_keyword("CDELT1", KeywordValue::Real(pixelsize_mas * MAS_TO_DEG));
        image.set_keyword("CDELT2", KeywordValue::Real(pixelsize_mas * MAS_TO_DEG));
        image
    }

    #[test]
    fn test_point_source_blur() {
        let image = point_source_image(0.5);
        let out = make_prior(&image, 2.0, 0.1, None).unwrap();

        assert_eq!(out.dim(), (64, 64));
        assert_relative_eq!(out.max_value(), 1.0, max_relative = 1e-10);
        assert_relative_eq!(out.pixel_size_mas().unwrap(), 0.5, max_relative = 1e-10);
        // Floor property: nothing below the blank value
        assert!(out.data().iter().all(|&v| v >= DEFAULT_BLANK));
    }

    #[test]
    fn test_peak_value_preserved_not_location() {
        // Asymmetric neighbours shift the blurred peak off the input's
        // peak pixel, but its value must still match the input peak
        let mut data = Array2::zeros((64, 64));
        data[[31, 32]] = 0.04;
        data[[32, 32]] = 1.0;
        data[[33, 32]] = 0.06;
        let mut image = SkyImage::new(data);
        image.set_keyword("CDELT1", KeywordValue::Real(0.5 * MAS_TO_DEG));
        image.set_keyword("CDELT2", KeywordValue::Real(0.5 * MAS_TO_DEG));

        let out = make_prior(&image, 2.0, 0.05, Some(0.0025)).unwrap();
        assert_eq!(out.dim(), (64, 64));
        assert_relative_eq!(out.max_value(), 1.0, max_relative = 1e-10);
        assert!(out.data().iter().all(|&v| v >= 0.0025));
    }

    #[test]
    fn test_all_zero_input_rejected() {
        let mut image = SkyImage::new(Array2::zeros((16, 16)));
        image.set_keyword("CDELT1", KeywordValue::Real(0.5 * MAS_TO_DEG));
        image.set_keyword("CDELT2", KeywordValue::Real(0.5 * MAS_TO_DEG));
        assert!(matches!(
            make_prior(&image, 2.0, 0.1, None),
            Err(PriorError::DegenerateImage)
        ));
    }

    #[test]
    fn test_missing_pixel_size_rejected() {
        let image = SkyImage::new(Array2::ones((8, 8)));
        assert!(matches!(
            make_prior(&image, 2.0, 0.1, None),
            Err(PriorError::MissingPixelSize)
        ));
    }

    #[test]
    fn test_non_square_pixels_rejected() {
        let mut image = SkyImage::new(Array2::ones((8, 8)));
        image.set_keyword("CDELT1", KeywordValue::Real(0.5 * MAS_TO_DEG));
        image.set_keyword("CDELT2", KeywordValue::Real(1.0 * MAS_TO_DEG));
        assert!(matches!(
            make_prior(&image, 2.0, 0.1, None),
            Err(PriorError::NonSquarePixels { .. })
        ));
    }

    #[test]
    fn test_negative_cdelt1_rejected() {
        // Negative increment (right-ascension convention) drives sigma
        // negative; the pipeline surfaces that instead of blurring
        let image = point_source_image(-0.5);
        assert!(matches!(
            make_prior(&image, 2.0, 0.1, None),
            Err(PriorError::NonPositiveSigma(_))
        ));
    }

    #[test]
    fn test_provenance_appended() {
        let mut image = point_source_image(0.5);
        image.add_history("earlier processing step");

        let out = make_prior(&image, 2.0, 0.1, None).unwrap();
        assert_eq!(out.history().len(), 2);
        assert_eq!(out.history()[0], "earlier processing step");
        assert!(out.history()[1].contains("fwhm=2.000000"));
        assert!(out.history()[1].contains("threshold=0.100000"));
    }

    #[test]
    fn test_output_increments_absolute() {
        // Output carries abs(pixelsize) on both axes even though the
        // derivation preserves sign internally
        let image = point_source_image(0.5);
        let out = make_prior(&image, 2.0, 0.1, None).unwrap();
        let cdelt1 = out.keyword("CDELT1").unwrap().as_real().unwrap();
        let cdelt2 = out.keyword("CDELT2").unwrap().as_real().unwrap();
        assert_relative_eq!(cdelt1, 0.5 * MAS_TO_DEG, max_relative = 1e-12);
        assert_eq!(cdelt1, cdelt2);
        assert!(cdelt1 > 0.0);
    }

    #[test]
    fn test_sub_threshold_pixels_floored() {
        let image = point_source_image(0.5);
        let out = make_prior(&image, 2.0, 0.5, None).unwrap();
        // With a 50% threshold the faint blur skirts collapse to blank
        let blanked = out.data().iter().filter(|&&v| v == DEFAULT_BLANK).count();
        assert!(blanked > 0);
        // Surviving pixels are all at or above the cut
        assert!(out
            .data()
            .iter()
            .all(|&v| v == DEFAULT_BLANK || v >= 0.5 - 1e-12));
    }
}
