//! End-to-end decode tests over synthetic messages.

use grib2_parser::{decode, normalize_longitude, Grib2Error};
use test_utils::{constant_message, reflectivity_scene, Grib2Builder, SCENE_4X3};

const KEY: &str = "MergedReflectivityQCComposite";

fn assert_close(actual: Option<f32>, expected: f32) {
    let actual = actual.expect("expected a valid cell");
    assert!(
        (actual - expected).abs() < 1e-4,
        "expected {expected}, got {actual}"
    );
}

// ============================================================================
// Metadata
// ============================================================================

#[test]
fn test_decode_geometry_and_time() {
    let message = decode(&reflectivity_scene(), KEY).unwrap();

    assert_eq!(message.indicator.discipline, 209);
    assert_eq!(message.identification.center, 161);
    assert_eq!(
        message.identification.reference_time.to_rfc3339(),
        "2025-06-14T18:42:36+00:00"
    );

    let geometry = &message.geometry;
    assert_eq!(geometry.points_x, 4);
    assert_eq!(geometry.points_y, 3);
    assert!((geometry.lat_first - 54.995).abs() < 1e-9);
    assert!((geometry.lon_first - 230.005).abs() < 1e-9);
    assert!((geometry.lat_last - 54.975).abs() < 1e-9);
    assert!((geometry.lon_last - 230.035).abs() < 1e-9);
    assert!((geometry.dx - 0.01).abs() < 1e-12);
    assert!((normalize_longitude(geometry.lon_first) + 129.995).abs() < 1e-9);

    assert_eq!(message.product.parameter_number, 16);
}

#[test]
fn test_negative_coordinates() {
    let bytes = Grib2Builder::mrms(2, 2)
        .with_corners(-10_500_000, -75_250_000, -10_510_000, -75_240_000)
        .build();
    let geometry = decode(&bytes, KEY).unwrap().geometry;
    assert!((geometry.lat_first + 10.5).abs() < 1e-9);
    assert!((geometry.lon_first + 75.25).abs() < 1e-9);
}

// ============================================================================
// Values
// ============================================================================

#[test]
fn test_decode_values_round_trip() {
    let message = decode(&reflectivity_scene(), KEY).unwrap();
    let values = message.grid.values();
    assert_eq!(values.len(), SCENE_4X3.len());
    for (decoded, expected) in values.iter().zip(SCENE_4X3.iter()) {
        match expected {
            Some(v) => assert_close(*decoded, *v),
            None => assert_eq!(*decoded, None),
        }
    }
}

#[test]
fn test_calibration_formula() {
    // Y = (R + X * 2^E) * 10^-D
    let cases: [(f32, i16, i16, u8, u32); 4] = [
        (0.0, 0, 0, 8, 200),
        (-320.0, 1, 1, 12, 1000),
        (1.5, -3, 0, 16, 40_000),
        (-999.0, 2, 2, 20, 700_123),
    ];
    for (r, e, d, width, x) in cases {
        let bytes = Grib2Builder::mrms(1, 1)
            .with_packing(r, e, d)
            .with_packed_values(&[x], width)
            .build();
        let message = decode(&bytes, KEY).unwrap();
        let expected =
            (f64::from(r) + f64::from(x) * 2f64.powi(e.into())) * 10f64.powi(-i32::from(d));
        assert_close(message.grid.values()[0], expected as f32);
    }
}

#[test]
fn test_bitmap_masks_cells_regardless_of_bits() {
    // Cell 1 is masked; the packed stream carries only cells 0 and 2, so the
    // value 99 must land in cell 2, not cell 1.
    let bytes = Grib2Builder::mrms(3, 1)
        .with_packed_values(&[10, 99], 8)
        .with_bitmap(&[true, false, true])
        .build();
    let values = decode(&bytes, KEY).unwrap().grid.values().to_vec();
    assert_eq!(values, vec![Some(10.0), None, Some(99.0)]);
}

#[test]
fn test_degenerate_constant_grid() {
    let bytes = constant_message(10, 10, 42.5);
    let message = decode(&bytes, KEY).unwrap();
    assert_eq!(message.packing.bit_width, 0);
    assert_eq!(message.grid.len(), 100);
    assert!(message.grid.values().iter().all(|v| *v == Some(42.5)));
}

#[test]
fn test_decode_is_deterministic() {
    let bytes = reflectivity_scene();
    let first = decode(&bytes, KEY).unwrap();
    let second = decode(&bytes, KEY).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_local_use_section_is_skipped() {
    let bytes = Grib2Builder::mrms(2, 1)
        .with_local_use(vec![1, 2, 3, 4])
        .with_packed_values(&[3, 4], 4)
        .build();
    let values = decode(&bytes, KEY).unwrap().grid.values().to_vec();
    assert_eq!(values, vec![Some(3.0), Some(4.0)]);
}

#[test]
fn test_missing_end_marker_tolerated() {
    let bytes = Grib2Builder::mrms(2, 2).without_end_marker().build();
    assert!(decode(&bytes, KEY).is_ok());
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_truncated_data_section() {
    // 5 cells at 12 bits need 60 bits = 8 bytes; drop the last byte.
    let mut packed = test_utils::pack_bits(&[1, 2, 3, 4, 4095], 12);
    packed.pop();
    let bytes = Grib2Builder::mrms(5, 1).with_raw_data(packed, 12).build();
    match decode(&bytes, KEY) {
        Err(Grib2Error::TruncatedData { cell, .. }) => assert_eq!(cell, 4),
        other => panic!("expected TruncatedData, got {other:?}"),
    }
}

#[test]
fn test_truncated_data_with_bitmap() {
    // Four of six cells are valid; only three 8-bit values follow, so the
    // fourth valid cell (index 5) overruns the payload.
    let bytes = Grib2Builder::mrms(6, 1)
        .with_raw_data(vec![10, 20, 30], 8)
        .with_bitmap(&[true, false, true, true, false, true])
        .build();
    assert_eq!(
        decode(&bytes, KEY).unwrap_err(),
        Grib2Error::TruncatedData {
            cell: 5,
            needed_bits: 32,
            available_bits: 24
        }
    );
}

#[test]
fn test_huge_declared_grid_with_empty_payload() {
    let bytes = Grib2Builder::mrms(65535, 65535)
        .with_raw_data(Vec::new(), 8)
        .build();
    let err = decode(&bytes, KEY).unwrap_err();
    assert_eq!(err.kind(), "TruncatedData");
    assert!(!err.is_unsupported());
}

#[test]
fn test_truncated_buffer() {
    let bytes = reflectivity_scene();
    let err = decode(&bytes[..bytes.len() - 10], KEY).unwrap_err();
    assert_eq!(err.kind(), "TruncatedInput");
}

#[test]
fn test_bad_magic() {
    let mut bytes = reflectivity_scene();
    bytes[0..4].copy_from_slice(b"BUFR");
    assert_eq!(decode(&bytes, KEY).unwrap_err().kind(), "MalformedHeader");
}

#[test]
fn test_edition_one_rejected() {
    let bytes = Grib2Builder::mrms(2, 2).with_edition(1).build();
    let err = decode(&bytes, KEY).unwrap_err();
    assert_eq!(err, Grib2Error::UnsupportedEdition(1));
    assert!(err.is_unsupported());
}

#[test]
fn test_unsupported_grid_template() {
    let bytes = Grib2Builder::mrms(2, 2).with_grid_template(30).build();
    assert_eq!(
        decode(&bytes, KEY).unwrap_err(),
        Grib2Error::UnsupportedGridTemplate(30)
    );
}

#[test]
fn test_unsupported_packing_template() {
    let bytes = Grib2Builder::mrms(2, 2).with_packing_template(41).build();
    assert_eq!(
        decode(&bytes, KEY).unwrap_err(),
        Grib2Error::UnsupportedPackingTemplate(41)
    );
}

#[test]
fn test_declared_points_mismatch() {
    let bytes = Grib2Builder::mrms(2, 2).with_declared_points(5).build();
    assert_eq!(
        decode(&bytes, KEY).unwrap_err(),
        Grib2Error::DimensionMismatch {
            points_x: 2,
            points_y: 2,
            declared: 5
        }
    );
}

#[test]
fn test_predefined_bitmap_rejected() {
    let bytes = Grib2Builder::mrms(2, 2).with_raw_bitmap(3, Vec::new()).build();
    assert_eq!(
        decode(&bytes, KEY).unwrap_err(),
        Grib2Error::UnsupportedBitmapIndicator(3)
    );
}

#[test]
fn test_corrupt_section_length() {
    let mut bytes = reflectivity_scene();
    // Section 1 length field starts right after the indicator
    bytes[16..20].copy_from_slice(&0u32.to_be_bytes());
    assert_eq!(decode(&bytes, KEY).unwrap_err().kind(), "InvalidSectionLength");
}

#[test]
fn test_garbage_after_data_section() {
    let mut bytes = Grib2Builder::mrms(2, 2).build();
    let len = bytes.len();
    bytes[len - 4..].copy_from_slice(b"XXXX");
    assert_eq!(decode(&bytes, KEY).unwrap_err().kind(), "MalformedHeader");
}
