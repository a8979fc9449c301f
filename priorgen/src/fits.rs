//! FITS container I/O for [`SkyImage`] values.
//!
//! Reads and writes double-precision 2-D primary HDUs. Pixel grids map to
//! `Array2<f64>` with dimensions (rows, columns); FITS stores axis 1
//! (columns) fastest, which matches the row-major array layout.

use std::path::Path;

use fitsio::hdu::HduInfo;
use fitsio::images::{ImageDescription, ImageType};
use fitsio::FitsFile;
use ndarray::{ArrayD, Ix2};
use thiserror::Error;

use crate::image::{KeywordValue, SkyImage};

#[derive(Error, Debug)]
pub enum FitsError {
    #[error("FITS I/O failed: {0}")]
    Cfitsio(#[from] fitsio::errors::Error),
    #[error("primary HDU of '{0}' is not a 2-D image")]
    NotA2dImage(String),
}

/// Read the primary HDU of `path` as a [`SkyImage`].
///
/// `CDELT1`/`CDELT2` are loaded when present. Keys named in `text_keys`
/// are loaded best-effort as text; a missing key is silently skipped.
pub fn read_sky_image<P: AsRef<Path>>(path: P, text_keys: &[&str]) -> Result<SkyImage, FitsError> {
    let path = path.as_ref();
    let mut fptr = FitsFile::open(path)?;
    let hdu = fptr.primary_hdu()?;

    match &hdu.info {
        HduInfo::ImageInfo { shape, .. } if shape.len() == 2 => {}
        _ => return Err(FitsError::NotA2dImage(path.display().to_string())),
    }

    let data: ArrayD<f64> = hdu.read_image(&mut fptr)?;
    let data = data
        .into_dimensionality::<Ix2>()
        .map_err(|_| FitsError::NotA2dImage(path.display().to_string()))?;

    let mut image = SkyImage::new(data);
    for key in ["CDELT1", "CDELT2"] {
        if let Ok(value) = hdu.read_key::<f64>(&mut fptr, key) {
            image.set_keyword(key, KeywordValue::Real(value));
        }
    }
    for key in text_keys {
        if let Ok(value) = hdu.read_key::<String>(&mut fptr, key) {
            image.set_keyword(*key, KeywordValue::Text(value));
        }
    }
    Ok(image)
}

/// Write `image` as the double-precision primary HDU of `path`.
///
/// Keywords are written in name order and history entries as HISTORY
/// cards. With `overwrite` set an existing file is clobbered; otherwise
/// creation fails.
pub fn write_sky_image<P: AsRef<Path>>(
    path: P,
    image: &SkyImage,
    overwrite: bool,
) -> Result<(), FitsError> {
    let (rows, cols) = image.dim();
    let description = ImageDescription {
        data_type: ImageType::Double,
        dimensions: &[rows, cols],
    };

    let new_file = FitsFile::create(path).with_custom_primary(&description);
    let mut fptr = if overwrite {
        new_file.overwrite().open()?
    } else {
        new_file.open()?
    };
    let hdu = fptr.primary_hdu()?;

    let pixels: Vec<f64> = image.data().iter().copied().collect();
    hdu.write_image(&mut fptr, &pixels)?;

    for (name, value) in image.keywords() {
        match value {
            KeywordValue::Real(v) => hdu.write_key(&mut fptr, name, *v)?,
            KeywordValue::Int(v) => hdu.write_key(&mut fptr, name, *v)?,
            KeywordValue::Text(v) => hdu.write_key(&mut fptr, name, v.clone())?,
        }
    }
    for entry in image.history() {
        hdu.write_key(&mut fptr, "HISTORY", entry.clone())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::MAS_TO_DEG;
    use approx::assert_relative_eq;
    use ndarray::Array2;

    fn sample_image() -> SkyImage {
        let mut data = Array2::zeros((16, 8));
        data[[4, 3]] = 1.0;
        data[[10, 6]] = 0.25;
        let mut image = SkyImage::new(data);
        image.set_keyword("CDELT1", KeywordValue::Real(0.5 * MAS_TO_DEG));
        image.set_keyword("CDELT2", KeywordValue::Real(0.5 * MAS_TO_DEG));
        image.set_keyword("OBJECT", KeywordValue::Text("alf Ori".to_string()));
        image.add_history("synthesized for round-trip test");
        image
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.fits");

        let image = sample_image();
        write_sky_image(&path, &image, false).unwrap();

        let back = read_sky_image(&path, &["OBJECT"]).unwrap();
        assert_eq!(back.dim(), (16, 8));
        assert_eq!(back.data()[[4, 3]], 1.0);
        assert_eq!(back.data()[[10, 6]], 0.25);
        assert_eq!(back.data()[[0, 0]], 0.0);
        assert_relative_eq!(back.pixel_size_mas().unwrap(), 0.5, max_relative = 1e-10);
        assert_eq!(back.keyword("OBJECT").unwrap().as_text(), Some("alf Ori"));
    }

    #[test]
    fn test_missing_text_keys_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.fits");
        write_sky_image(&path, &sample_image(), false).unwrap();

        let back = read_sky_image(&path, &["AUTHOR"]).unwrap();
        assert!(back.keyword("AUTHOR").is_none());
    }

    #[test]
    fn test_overwrite_required_for_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.fits");
        let image = sample_image();

        write_sky_image(&path, &image, false).unwrap();
        assert!(write_sky_image(&path, &image, false).is_err());
        write_sky_image(&path, &image, true).unwrap();
    }
}
