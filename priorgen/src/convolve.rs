//! Direct 2-D convolution over floating-point grids.
//!
//! Implements true convolution (the kernel is index-reversed relative to
//! correlation) with an implicit zero border, evaluated directly. Direct
//! evaluation is the right trade-off here: blur kernels are at most a few
//! tens of pixels wide and image grids a few hundred.

use ndarray::{s, Array2, ArrayView2};

/// Output sizing for [`convolve2d`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvolveMode {
    /// Every position with any overlap; dimensions `n + k - 1`.
    Full,
    /// Same dimensions as the input image: the centred slice of `Full`
    /// starting at `(k - 1) / 2` on each axis. Matches "same"-mode
    /// convolution in the common scientific libraries.
    Same,
    /// Only fully-overlapping positions; dimensions `n - k + 1`.
    Valid,
}

/// Options for [`convolve2d`].
#[derive(Debug, Clone, Copy)]
pub struct ConvolveOptions {
    pub mode: ConvolveMode,
}

impl Default for ConvolveOptions {
    fn default() -> Self {
        Self {
            mode: ConvolveMode::Same,
        }
    }
}

/// Convolve `image` with `kernel`.
///
/// Values beyond the image border are treated as zero; no edge
/// replication or wraparound. Output sizing is selected by
/// `options.mode`, defaulting to [`ConvolveMode::Same`].
///
/// # Arguments
///
/// * `image` - Input grid, dimensions (rows, columns)
/// * `kernel` - Convolution kernel
/// * `options` - Output sizing; `None` for the default
///
/// # Panics
///
/// Panics if either kernel dimension is zero, or in `Valid` mode if the
/// kernel does not fit inside the image.
pub fn convolve2d(
    image: &ArrayView2<f64>,
    kernel: &ArrayView2<f64>,
    options: Option<ConvolveOptions>,
) -> Array2<f64> {
    let options = options.unwrap_or_default();
    let (n1, n2) = image.dim();
    let (k1, k2) = kernel.dim();
    assert!(k1 > 0 && k2 > 0, "kernel must be non-empty");

    // Scatter each image sample over the kernel footprint; sparse inputs
    // (mostly-background astronomical frames) skip the inner loops.
    let mut full = Array2::zeros((n1 + k1 - 1, n2 + k2 - 1));
    for i in 0..n1 {
        for j in 0..n2 {
            let v = image[[i, j]];
            if v == 0.0 {
                continue;
            }
            for ki in 0..k1 {
                for kj in 0..k2 {
                    full[[i + ki, j + kj]] += v * kernel[[ki, kj]];
                }
            }
        }
    }

    match options.mode {
        ConvolveMode::Full => full,
        ConvolveMode::Same => {
            let (r0, c0) = ((k1 - 1) / 2, (k2 - 1) / 2);
            full.slice(s![r0..r0 + n1, c0..c0 + n2]).to_owned()
        }
        ConvolveMode::Valid => {
            assert!(
                n1 >= k1 && n2 >= k2,
                "Valid mode requires the kernel to fit inside the image"
            );
            full.slice(s![k1 - 1..n1, k2 - 1..n2]).to_owned()
        }
    }
}
