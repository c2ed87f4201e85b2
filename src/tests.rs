use crate::{
    parse_bigdecimal_literal, parse_bigint_literal, parse_double, parse_double_u16, parse_float,
    parse_json_number, NumberParseError, SyntaxErrorReason,
};
use num_bigint::BigInt;

fn pd(s: &str) -> Result<f64, NumberParseError> {
    parse_double(s.as_bytes(), 0, s.len())
}

fn pf(s: &str) -> Result<f32, NumberParseError> {
    parse_float(s.as_bytes(), 0, s.len())
}

fn pj(s: &str) -> Result<f64, NumberParseError> {
    parse_json_number(s.as_bytes(), 0, s.len())
}

#[test]
fn simple_decimal_floats() {
    assert_eq!(pd("1.2e3").unwrap(), 1200.0);
    assert_eq!(pd("-0.5").unwrap(), -0.5);
    assert_eq!(pd("+3").unwrap(), 3.0);
    assert_eq!(pd("0").unwrap(), 0.0);
    assert!(pd("-0").unwrap().is_sign_negative());
}

#[test]
fn hex_float() {
    assert_eq!(pd("0x1.0p8").unwrap(), 256.0);
    assert_eq!(pd("0x1p0").unwrap(), 1.0);
    assert_eq!(pd("-0x1.8p1").unwrap(), -3.0);
}

#[test]
fn surrounding_whitespace_allowed_outside_json() {
    assert_eq!(pd("  1.5  ").unwrap(), 1.5);
    assert!(pj("  1.5  ").is_err());
}

#[test]
fn json_rejects_leading_zero() {
    assert!(pj("007").is_err());
    assert!(pj("01").is_err());
    assert_eq!(pj("0").unwrap(), 0.0);
    assert_eq!(pj("0.5").unwrap(), 0.5);
}

#[test]
fn json_rejects_leading_plus_and_hex() {
    assert!(pj("+1").is_err());
    assert!(pj("0x1p0").is_err());
}

#[test]
fn non_json_allows_leading_zeros_and_plus() {
    assert_eq!(pd("+0").unwrap(), 0.0);
    assert_eq!(pd("007").unwrap(), 7.0);
}

#[test]
fn f32_path() {
    assert_eq!(pf("3.14159").unwrap(), 3.14159_f32);
    assert!(pf("1e80").unwrap().is_infinite());
}

#[test]
fn u16_buffer_path() {
    let s: Vec<u16> = "1.2e3".encode_utf16().collect();
    assert_eq!(parse_double_u16(&s, 0, s.len()).unwrap(), 1200.0);
}

#[test]
fn malformed_inputs_rejected() {
    for bad in ["3e", "3e+", ".", "0x", "0x3.", "", "+", "-", "1.2.3", "1ee3"] {
        assert!(pd(bad).is_err(), "expected error for {:?}", bad);
    }
}

#[test]
fn empty_window_is_missing_digits() {
    let err = parse_double(b"1.2e3", 2, 0).unwrap_err();
    match err {
        NumberParseError::SyntaxError { reason, .. } => {
            assert_eq!(reason, SyntaxErrorReason::MissingDigits);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn out_of_bounds_window_is_illegal_offset_or_length() {
    let err = parse_double(b"1.5", 10, 5).unwrap_err();
    assert!(matches!(err, NumberParseError::IllegalOffsetOrLength { .. }));
}

#[test]
fn window_larger_than_max_input_length_rejected() {
    let buf = [b'1'; 8];
    let err = parse_double(&buf, 0, crate::MAX_INPUT_LENGTH + 1).unwrap_err();
    assert!(matches!(err, NumberParseError::IllegalOffsetOrLength { .. }));
}

#[test]
fn non_ascii_inside_digits_rejected() {
    // "1.2\u{00e9}3": a non-ASCII byte sits where a fraction digit is expected.
    let s = "1.2é3";
    let err = parse_double(s.as_bytes(), 0, s.len()).unwrap_err();
    assert!(matches!(err, NumberParseError::SyntaxError { .. }));
}

#[test]
fn exponent_magnitude_overflow_rejected() {
    let s = format!("1e{}", "9".repeat(40));
    assert!(pd(&s).is_err());
}

#[test]
fn many_nines_overflow_to_infinity_without_quadratic_blowup() {
    let s = "9".repeat(1_000_000);
    let v = pd(&s).unwrap();
    assert!(v.is_infinite());
}

#[test]
fn bigint_large_decimal() {
    let s = "123456789012345678901234567890";
    let v = parse_bigint_literal(s.as_bytes(), 0, s.len(), false).unwrap();
    let expected: BigInt = s.parse().unwrap();
    assert_eq!(v, expected);
}

#[test]
fn bigint_hex_and_sign() {
    assert_eq!(
        parse_bigint_literal(b"0x1F", 0, 4, false).unwrap(),
        BigInt::from(31)
    );
    assert_eq!(
        parse_bigint_literal(b"-42", 0, 3, false).unwrap(),
        BigInt::from(-42)
    );
}

#[test]
fn bigint_parallel_and_sequential_agree() {
    // Exercises the recursive and parallel digit-range regimes with
    // `tracing` enabled, so the regime-selection / cache-fill spans in
    // `core_num::digits` and `core_num::powers` actually run under a
    // subscriber at least once.
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();

    let s = "7".repeat(5000);
    let seq = parse_bigint_literal(s.as_bytes(), 0, s.len(), false).unwrap();
    let par = parse_bigint_literal(s.as_bytes(), 0, s.len(), true).unwrap();
    assert_eq!(seq, par);
}

#[test]
fn bigdecimal_small_fraction() {
    let s = "0.0000000000000000000000000000000000000001";
    let v = parse_bigdecimal_literal(s.as_bytes(), 0, s.len(), false).unwrap();
    assert_eq!(v.unscaled, BigInt::from(1));
    assert_eq!(v.scale, 40);
}

#[test]
fn bigdecimal_with_exponent() {
    let s = "1.25e3";
    let v = parse_bigdecimal_literal(s.as_bytes(), 0, s.len(), false).unwrap();
    assert_eq!(v.unscaled, BigInt::from(125));
    assert_eq!(v.scale, -1);
}

#[test]
fn many_digits_truncation_matches_standard_library() {
    let s = "9.9999999999999999999e0";
    let v = pd(s).unwrap();
    let expected: f64 = s.parse().unwrap();
    assert_eq!(v, expected);
}

#[test]
fn double_and_float_type_suffix_accepted() {
    assert_eq!(parse_double(b"1.5f", 0, 4).unwrap(), 1.5);
    assert_eq!(parse_double(b"1.5d", 0, 4).unwrap(), 1.5);
}
