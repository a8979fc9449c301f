//! End-to-end checks of the prior synthesis pipeline through the public
//! API, including a pass through the FITS container layer.

use approx::assert_relative_eq;
use ndarray::Array2;
use priorgen::{make_prior, KeywordValue, PriorError, SkyImage, MAS_TO_DEG};

fn square_image(data: Array2<f64>, pixelsize_mas: f64) -> SkyImage {
    let mut image = SkyImage::new(data);
    image.set_keyword("CDELT1", KeywordValue::Real(pixelsize_mas * MAS_TO_DEG));
    image.set_keyword("CDELT2", KeywordValue::Real(pixelsize_mas * MAS_TO_DEG));
    image
}

#[test]
fn point_source_prior() {
    let mut data = Array2::zeros((64, 64));
    data[[32, 32]] = 1.0;
    let image = square_image(data, 0.5);

    let out = make_prior(&image, 2.0, 0.1, None).unwrap();

    assert_eq!(out.dim(), (64, 64));
    assert_relative_eq!(out.max_value(), 1.0, max_relative = 1e-10);
    assert_relative_eq!(out.pixel_size_mas().unwrap(), 0.5, max_relative = 1e-10);
    let cdelt1 = out.keyword("CDELT1").unwrap().as_real().unwrap();
    let cdelt2 = out.keyword("CDELT2").unwrap().as_real().unwrap();
    assert_relative_eq!(cdelt1, 0.5 * MAS_TO_DEG, max_relative = 1e-10);
    assert_relative_eq!(cdelt2, 0.5 * MAS_TO_DEG, max_relative = 1e-10);
}

#[test]
fn three_pixel_source_prior() {
    let mut data = Array2::zeros((64, 64));
    data[[31, 32]] = 0.04;
    data[[32, 32]] = 1.0;
    data[[33, 32]] = 0.06;
    let image = square_image(data, 0.5);

    let out = make_prior(&image, 2.0, 0.05, Some(0.0025)).unwrap();

    assert_eq!(out.dim(), (64, 64));
    assert_relative_eq!(out.max_value(), 1.0, max_relative = 1e-10);
    assert!(out.data().iter().all(|&v| v >= 0.0025));
}

#[test]
fn blank_input_is_an_error_not_nan() {
    let image = square_image(Array2::zeros((64, 64)), 0.5);
    match make_prior(&image, 2.0, 0.1, None) {
        Err(PriorError::DegenerateImage) => {}
        other => panic!("expected DegenerateImage, got {other:?}"),
    }
}

#[test]
fn provenance_survives_container_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prior.fits");

    let mut data = Array2::zeros((32, 32));
    data[[16, 16]] = 2.0;
    let mut image = square_image(data, 0.25);
    image.add_history("simulated frame");

    let prior = make_prior(&image, 1.0, 0.05, None).unwrap();
    assert_eq!(prior.history().len(), 2);
    assert_eq!(prior.history()[0], "simulated frame");

    priorgen::fits::write_sky_image(&path, &prior, false).unwrap();
    let back = priorgen::fits::read_sky_image(&path, &[]).unwrap();
    assert_eq!(back.dim(), (32, 32));
    assert_relative_eq!(back.pixel_size_mas().unwrap(), 0.25, max_relative = 1e-10);
    assert_relative_eq!(back.max_value(), 2.0, max_relative = 1e-10);
}
