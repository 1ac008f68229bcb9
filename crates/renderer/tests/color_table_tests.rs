//! Boundary behavior of the reflectivity calibration table.

use renderer::{Rgba, REFLECTIVITY, TRANSPARENT};

const BAND_10: Rgba = Rgba::new(4, 233, 231, 100);
const BAND_20: Rgba = Rgba::new(3, 0, 244, 140);
const BAND_70: Rgba = Rgba::new(248, 0, 253, 255);

#[test]
fn test_below_lowest_echo_is_transparent() {
    assert_eq!(REFLECTIVITY.color_of(4.999), TRANSPARENT);
    assert_eq!(REFLECTIVITY.color_of(-30.0), TRANSPARENT);
}

#[test]
fn test_bound_belongs_to_next_band() {
    assert_eq!(REFLECTIVITY.color_of(5.0), BAND_10);
    assert_eq!(REFLECTIVITY.color_of(19.999), BAND_20);
    assert_eq!(REFLECTIVITY.color_of(65.0), BAND_70);
    assert_eq!(REFLECTIVITY.color_of(65.001), BAND_70);
}

#[test]
fn test_overflow_at_and_above_last_bound() {
    let overflow = REFLECTIVITY.overflow();
    assert_eq!(overflow, Rgba::new(253, 253, 253, 255));
    assert_eq!(REFLECTIVITY.color_of(75.0), overflow);
    assert_eq!(REFLECTIVITY.color_of(f32::INFINITY), overflow);
    assert_ne!(REFLECTIVITY.color_of(74.999), overflow);
}

#[test]
fn test_missing_and_nan_are_transparent() {
    assert_eq!(REFLECTIVITY.color_of_cell(None), TRANSPARENT);
    assert_eq!(REFLECTIVITY.color_of(f32::NAN), TRANSPARENT);
}

#[test]
fn test_every_band_color_reachable() {
    let mut lower = f32::NEG_INFINITY;
    for band in REFLECTIVITY.bands() {
        let probe = if lower.is_finite() { lower } else { band.upper_bound - 1.0 };
        assert_eq!(REFLECTIVITY.color_of(probe), band.color, "bound {}", band.upper_bound);
        lower = band.upper_bound;
    }
}

#[test]
fn test_legend_serialization() {
    let json = serde_json::to_value(REFLECTIVITY).unwrap();
    let bands = json["bands"].as_array().unwrap();
    assert_eq!(bands.len(), REFLECTIVITY.bands().len());
    assert_eq!(bands[1]["upperBound"], 10.0);
    assert_eq!(bands[1]["color"]["r"], 4);
    assert_eq!(bands[1]["color"]["a"], 100);
    assert_eq!(json["overflow"]["g"], 253);
}
