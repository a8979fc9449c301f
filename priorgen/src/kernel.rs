//! Gaussian blur kernel construction.

use ndarray::Array2;

use crate::error::PriorError;

/// Build a square, unnormalized Gaussian kernel from a sigma in pixels.
///
/// The side length is `trunc(6 * sigma)` pixels and the Gaussian is
/// centred on `side / 2` (floating-point division), so even-sided kernels
/// are centred between cells. Cell `(i, j)` holds
/// `exp(-((i - c)^2 + (j - c)^2) / (2 * sigma^2))`.
///
/// The kernel does not sum to 1; callers that need a flux- or
/// peak-preserving blur rescale after convolving.
///
/// # Errors
///
/// * `PriorError::NonPositiveSigma` - sigma is zero or negative
/// * `PriorError::DegenerateKernel` - sigma below ~1/6 px, the side
///   length truncates to zero
pub fn gaussian_kernel(sigma: f64) -> Result<Array2<f64>, PriorError> {
    if !(sigma > 0.0) {
        return Err(PriorError::NonPositiveSigma(sigma));
    }
    let side = (6.0 * sigma) as usize;
    if side < 1 {
        return Err(PriorError::DegenerateKernel(sigma));
    }

    let centre = side as f64 / 2.0;
    Ok(Array2::from_shape_fn((side, side), |(i, j)| {
        let di = i as f64 - centre;
        let dj = j as f64 - centre;
        (-(di * di + dj * dj) / (2.0 * sigma * sigma)).exp()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_side_length_truncates() {
        assert_eq!(gaussian_kernel(1.0).unwrap().dim(), (6, 6));
        assert_eq!(gaussian_kernel(0.5).unwrap().dim(), (3, 3));
        // 6 * 1.8 = 10.8 truncates to 10
        assert_eq!(gaussian_kernel(1.8).unwrap().dim(), (10, 10));
    }

    #[test]
    fn test_centre_value() {
        // Even side: centre falls on a cell, peak value is exactly 1
        let kernel = gaussian_kernel(1.0).unwrap();
        assert_eq!(kernel[[3, 3]], 1.0);

        // Odd side: centre falls between cells
        let kernel = gaussian_kernel(0.5).unwrap();
        assert_relative_eq!(kernel[[1, 1]], (-1.0f64).exp(), max_relative = 1e-12);
    }

    #[test]
    fn test_weights_positive_and_bounded() {
        let kernel = gaussian_kernel(2.0).unwrap();
        assert!(kernel.iter().all(|&w| w > 0.0 && w <= 1.0));
    }

    #[test]
    fn test_non_positive_sigma() {
        assert!(matches!(
            gaussian_kernel(0.0),
            Err(PriorError::NonPositiveSigma(_))
        ));
        assert!(matches!(
            gaussian_kernel(-1.5),
            Err(PriorError::NonPositiveSigma(_))
        ));
    }

    #[test]
    fn test_tiny_sigma_degenerates() {
        assert!(matches!(
            gaussian_kernel(0.1),
            Err(PriorError::DegenerateKernel(_))
        ));
    }
}
