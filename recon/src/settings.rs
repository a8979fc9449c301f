//! Invocation settings for the external bsmem binary.

use clap::ValueEnum;

/// Name of the reconstruction executable, looked up on PATH.
pub const BSMEM: &str = "bsmem";

/// Default reconstructed image width in pixels.
pub const DEFAULT_DIM: usize = 128;

/// Default start-model type for model-start runs.
pub const DEFAULT_MODEL_TYPE: u32 = 3;

/// Default start-model width in mas.
pub const DEFAULT_MODEL_WIDTH: f64 = 10.0;

/// Default uv-radius cutoff for the first pass of a two-step run, in waves.
pub const DEFAULT_UVMAX1: f64 = 1.1e8;

/// Default blur FWHM applied between two-step passes, in mas.
pub const DEFAULT_STEP2_FWHM: f64 = 1.25;

/// Default relative threshold applied between two-step passes.
pub const DEFAULT_STEP2_THRESHOLD: f64 = 0.05;

/// Which bispectrum quantities the reconstruction should fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UseT3 {
    /// Triple amplitudes and closure phases.
    All,
    /// Triple amplitudes only.
    Amp,
    /// Closure phases only.
    Phi,
}

impl UseT3 {
    fn code(self) -> u32 {
        match self {
            UseT3::All => 1,
            UseT3::Amp => 2,
            UseT3::Phi => 3,
        }
    }
}

/// Wavelength range in nanometres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavRange {
    pub min: f64,
    pub max: f64,
}

impl std::str::FromStr for WavRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() != 2 {
            return Err("wavelength range must be in format 'MIN,MAX'".to_string());
        }
        let min = parts[0]
            .trim()
            .parse::<f64>()
            .map_err(|_| "invalid minimum wavelength".to_string())?;
        let max = parts[1]
            .trim()
            .parse::<f64>()
            .map_err(|_| "invalid maximum wavelength".to_string())?;
        if max < min {
            return Err(format!("wavelength range is empty ({min} > {max})"));
        }
        Ok(WavRange { min, max })
    }
}

/// Data-selection and error-scaling options forwarded to bsmem.
///
/// Every field is optional; `None` leaves the binary's own default in
/// effect. The a/b pairs scale and offset the error bars of the
/// corresponding observable.
#[derive(Debug, Clone, Default)]
pub struct DataOptions {
    /// Wavelength range to select (nm).
    pub wav: Option<WavRange>,
    /// Maximum uv radius to select (waves).
    pub uvmax: Option<f64>,
    /// Bispectrum usage mode.
    pub use_t3: Option<UseT3>,
    /// Assumed total flux.
    pub flux: Option<f64>,
    /// Squared-visibility error scale factor.
    pub v2a: Option<f64>,
    /// Squared-visibility error offset.
    pub v2b: Option<f64>,
    /// Triple-amplitude error scale factor.
    pub t3ampa: Option<f64>,
    /// Triple-amplitude error offset.
    pub t3ampb: Option<f64>,
    /// Closure-phase error scale factor.
    pub t3phia: Option<f64>,
    /// Closure-phase error offset.
    pub t3phib: Option<f64>,
}

impl DataOptions {
    /// Append the corresponding command-line flags to `args`.
    pub fn append_args(&self, args: &mut Vec<String>) {
        if let Some(wav) = &self.wav {
            args.push(format!("--wavmin={:.6}", wav.min));
            args.push(format!("--wavmax={:.6}", wav.max));
        }
        if let Some(uvmax) = self.uvmax {
            args.push(format!("--uvmax={uvmax:.6}"));
        }
        if let Some(use_t3) = self.use_t3 {
            args.push(format!("--ut3={}", use_t3.code()));
        }
        if let Some(flux) = self.flux {
            args.push(format!("--flux={flux:.6}"));
        }
        let scalings = [
            ("--v2a", self.v2a),
            ("--v2b", self.v2b),
            ("--t3ampa", self.t3ampa),
            ("--t3ampb", self.t3ampb),
            ("--t3phia", self.t3phia),
            ("--t3phib", self.t3phib),
        ];
        for (flag, value) in scalings {
            if let Some(value) = value {
                args.push(format!("{flag}={value:.6}"));
            }
        }
    }
}
