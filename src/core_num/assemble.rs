//! Value assembler: combines the index ranges and flags produced by the
//! scanner into the final value, either by calling the rounding oracle
//! (`super::dec2flt::rawfp`) for fixed-width floats or by driving the
//! digit-range parser (`super::digits`) and the powers-of-ten cache
//! (`super::powers`) for arbitrary-precision integers and decimals.

use num_bigint::{BigInt, BigUint, Sign};

use super::dec2flt::rawfp::{round_decimal_to_float, round_hex_to_float, RawFloat};
use super::digits::{parse_digit_range, DEFAULT_PARALLEL_THRESHOLD, RECURSION_THRESHOLD};
use super::powers::PowersOfTenCache;
use super::scanner::NumberDescriptor;

/// Rounds the decimal number described by `d` to the nearest `T`, taking
/// the fast path (the scanner's packed 64-bit significand is exact) when
/// `digit_count <= 19`, and the re-parsed/truncated path otherwise.
pub fn assemble_decimal_float<T>(d: &NumberDescriptor) -> T
where
    T: RawFloat + super::dec2flt::rawfp::OverflowBounds,
{
    if d.significant_digit_count <= 19 {
        round_decimal_to_float(d.is_negative, d.packed_significand, d.exponent, false)
    } else {
        // `packed_significand` already holds the first 19 significant
        // digits (leading zeros skipped); every digit past the 19th was
        // dropped from the *least*-significant end, so its positional
        // weight must be added back into the exponent.
        let dropped = d.significant_digit_count - 19;
        let decimal_exponent = d.exponent + dropped as i64;
        round_decimal_to_float(
            d.is_negative,
            d.packed_significand,
            decimal_exponent,
            d.significand_truncated,
        )
    }
}

/// Rounds the hexadecimal-with-binary-exponent number described by `d` to
/// the nearest `T`. Unlike the decimal path, every hex digit contributes
/// exactly 4 exact bits, so there is never a sticky/truncation concern
/// feeding into the oracle (see `rawfp::round_hex_to_float`'s doc comment).
///
/// Addressed through the scanner's own `at` callback rather than a raw
/// `&[u8]` buffer, so it works uniformly for 8-bit and 16-bit code-unit
/// inputs; hex mantissas are at most a few dozen digits (a handful of
/// `f64`/`f32` ulps' worth), so there is no SWAR fast path here the way
/// there is for (potentially enormous) bigint hex literals.
pub fn assemble_hex_float<T>(at: &dyn Fn(usize) -> Option<u8>, d: &NumberDescriptor) -> T
where
    T: RawFloat + super::dec2flt::rawfp::OverflowBounds,
{
    let mantissa = hex_digits_to_biguint_via_at(at, d.integer_start, d.integer_end);
    let frac_digits = d.fraction_end - d.fraction_start;
    let (mantissa, binary_exponent) = if frac_digits == 0 {
        (mantissa, d.exponent)
    } else {
        let frac = hex_digits_to_biguint_via_at(at, d.fraction_start, d.fraction_end);
        let combined = (mantissa << (4 * frac_digits as u64)) + frac;
        (combined, d.exponent - 4 * frac_digits as i64)
    };
    round_hex_to_float(d.is_negative, mantissa, binary_exponent)
}

/// Digit-by-digit counterpart of [`hex_digits_to_biguint`] for callers
/// that only have an `at` callback (the scanner's buffer abstraction),
/// not a raw byte slice.
fn hex_digits_to_biguint_via_at(at: &dyn Fn(usize) -> Option<u8>, start: usize, end: usize) -> BigUint {
    let mut acc = BigUint::from(0u32);
    for idx in start..end {
        let b = at(idx).expect("scanner guarantees ASCII hex digits in range");
        acc = (acc << 4u32) + BigUint::from(hex_nibble(b));
    }
    acc
}

/// Parses `buf[start..end]`, a run of ASCII hex digits, into a
/// [`BigUint`] by processing 8 digits at a time through the SWAR hex
/// routine and falling back to a digit-by-digit loop for the remainder.
fn hex_digits_to_biguint(buf: &[u8], start: usize, end: usize) -> BigUint {
    let n = end - start;
    let preroll = n % 8;
    let mut acc = BigUint::from(0u32);
    let mut pos = start;
    for _ in 0..preroll {
        acc = (acc << 4u32) + BigUint::from(hex_nibble(buf[pos]));
        pos += 1;
    }
    while pos < end {
        let group = super::swar::try_parse_eight_hex_digits(buf, pos);
        debug_assert!(group >= 0, "scanner guarantees a valid hex digit run");
        acc = (acc << 32u32) + BigUint::from(group as u32);
        pos += 8;
    }
    acc
}

#[inline]
fn hex_nibble(b: u8) -> u32 {
    match b {
        b'0'..=b'9' => u32::from(b - b'0'),
        b'a'..=b'f' => u32::from(b - b'a' + 10),
        b'A'..=b'F' => u32::from(b - b'A' + 10),
        _ => unreachable!("scanner guarantees ASCII hex digits"),
    }
}

/// Parses a (decimal or `0x`-prefixed hex) bigint literal descriptor into
/// a signed [`BigInt`], applying the sign last.
///
/// `parallel` selects the parallel-fill/parallel-parse regime; passing
/// `false` is equivalent to setting the parallel threshold to infinity.
pub fn assemble_bigint(buf: &[u8], d: &NumberDescriptor, parallel: bool) -> BigInt {
    let magnitude = if d.is_hex {
        hex_digits_to_biguint(buf, d.integer_start, d.integer_end)
    } else {
        let unsigned = parse_decimal_range(buf, d.integer_start, d.integer_end, parallel);
        unsigned.to_biguint().expect("non-negative by construction")
    };
    apply_sign(magnitude, d.is_negative)
}

/// An arbitrary-precision decimal value: `unscaled * 10^(-scale)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BigDecimalValue {
    pub unscaled: BigInt,
    pub scale: i64,
}

/// Parses a decimal bigdecimal literal descriptor into a
/// [`BigDecimalValue`]: `significand = integer_part * 10^frac_digit_count
/// + fractional_part`, `scale = -exponent` (`exponent` is the scanner's
/// already-combined explicit-exponent-plus-point-shift field).
pub fn assemble_bigdecimal(buf: &[u8], d: &NumberDescriptor, parallel: bool) -> BigDecimalValue {
    let int_part = parse_decimal_range(buf, d.integer_start, d.integer_end, parallel);
    let frac_digit_count = (d.fraction_end - d.fraction_start) as u64;
    let frac_part = parse_decimal_range(buf, d.fraction_start, d.fraction_end, parallel);

    let significand = if frac_digit_count == 0 {
        int_part
    } else {
        int_part * BigInt::from(BigUint::from(10u32).pow(frac_digit_count as u32)) + frac_part
    };

    BigDecimalValue {
        unscaled: apply_sign(
            significand.to_biguint().expect("non-negative by construction"),
            d.is_negative,
        ),
        scale: -d.exponent,
    }
}

fn apply_sign(magnitude: BigUint, negative: bool) -> BigInt {
    if negative && magnitude != BigUint::from(0u32) {
        BigInt::from_biguint(Sign::Minus, magnitude)
    } else {
        BigInt::from_biguint(Sign::Plus, magnitude)
    }
}

/// Parses `buf[start..end]` as a (possibly empty) run of decimal digits,
/// dispatching through the digit-range parser's three regimes. An empty
/// range (no integer part, or no fractional part) parses as zero without
/// touching the cache or the parser at all.
fn parse_decimal_range(buf: &[u8], start: usize, end: usize, parallel: bool) -> BigInt {
    if start == end {
        return BigInt::from(0);
    }
    let n = end - start;
    let parallel_threshold = if parallel { DEFAULT_PARALLEL_THRESHOLD } else { usize::MAX };
    if n <= RECURSION_THRESHOLD {
        parse_digit_range(buf, start, end, None, parallel_threshold)
    } else {
        let cache = PowersOfTenCache::new();
        if parallel {
            cache.fill_range_parallel(n, RECURSION_THRESHOLD);
        } else {
            cache.fill_range(n, RECURSION_THRESHOLD);
        }
        parse_digit_range(buf, start, end, Some(&cache), parallel_threshold)
    }
}
