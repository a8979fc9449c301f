//! Sky image container shared by the synthesis pipeline and the FITS layer.

use std::collections::BTreeMap;

use ndarray::Array2;

use crate::error::PriorError;

/// Conversion factor from milliarcseconds to degrees.
pub const MAS_TO_DEG: f64 = 1.0 / 3600.0 / 1000.0;

/// A single FITS-style header value.
#[derive(Debug, Clone, PartialEq)]
pub enum KeywordValue {
    Real(f64),
    Int(i64),
    Text(String),
}

impl KeywordValue {
    /// Numeric value as `f64`, if this keyword is numeric.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            KeywordValue::Real(v) => Some(*v),
            KeywordValue::Int(v) => Some(*v as f64),
            KeywordValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            KeywordValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// 2-D intensity image with angular-scale metadata.
///
/// Pixel values are stored row-major as `Array2<f64>` with dimensions
/// (rows, columns). Per-axis angular increments live in the `CDELT1` and
/// `CDELT2` keywords in degrees per pixel, FITS style. The history list
/// is append-only and records provenance, one entry per processing step.
#[derive(Debug, Clone)]
pub struct SkyImage {
    data: Array2<f64>,
    keywords: BTreeMap<String, KeywordValue>,
    history: Vec<String>,
}

impl SkyImage {
    /// Create an image with no keywords and empty history.
    pub fn new(data: Array2<f64>) -> Self {
        Self {
            data,
            keywords: BTreeMap::new(),
            history: Vec::new(),
        }
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    /// Image dimensions as (rows, columns).
    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn keyword(&self, name: &str) -> Option<&KeywordValue> {
        self.keywords.get(name)
    }

    pub fn set_keyword(&mut self, name: impl Into<String>, value: KeywordValue) {
        self.keywords.insert(name.into(), value);
    }

    /// All keywords in name order.
    pub fn keywords(&self) -> impl Iterator<Item = (&str, &KeywordValue)> {
        self.keywords.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Append a provenance record. Existing entries are never replaced.
    pub fn add_history(&mut self, entry: impl Into<String>) {
        self.history.push(entry.into());
    }

    /// Copy the named keywords from `source`, best-effort.
    ///
    /// Keywords absent from `source` are silently skipped.
    pub fn copy_keywords(&mut self, source: &SkyImage, names: &[&str]) {
        for name in names {
            if let Some(value) = source.keyword(name) {
                self.set_keyword(*name, value.clone());
            }
        }
    }

    /// Smallest pixel value.
    pub fn min_value(&self) -> f64 {
        self.data.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Largest pixel value.
    pub fn max_value(&self) -> f64 {
        self.data.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Angular pixel size in milliarcseconds, from the `CDELT1`/`CDELT2`
    /// keywords.
    ///
    /// The sign of `CDELT1` is preserved (right-ascension convention gives
    /// a negative increment); callers needing a physical size must take
    /// the absolute value. The square-pixel check compares absolute
    /// magnitudes for exact equality.
    ///
    /// # Errors
    ///
    /// * `PriorError::MissingPixelSize` - either increment keyword is
    ///   absent or non-numeric
    /// * `PriorError::NonSquarePixels` - increment magnitudes differ
    pub fn pixel_size_mas(&self) -> Result<f64, PriorError> {
        let cdelt1 = self
            .keyword("CDELT1")
            .and_then(KeywordValue::as_real)
            .ok_or(PriorError::MissingPixelSize)?;
        let cdelt2 = self
            .keyword("CDELT2")
            .and_then(KeywordValue::as_real)
            .ok_or(PriorError::MissingPixelSize)?;
        if cdelt1.abs() != cdelt2.abs() {
            return Err(PriorError::NonSquarePixels { cdelt1, cdelt2 });
        }
        Ok(cdelt1 / MAS_TO_DEG)
    }
}
