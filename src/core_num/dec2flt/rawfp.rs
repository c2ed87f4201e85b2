//! Bignum-exact conversion from a decimal or hexadecimal significand to the
//! nearest representable value of a target floating-point type.
//!
//! Rather than the two-tier "fast path in native arithmetic, bignum fallback
//! on failure" shape common to production `dec2flt` implementations, this
//! oracle always goes straight to [`num_bigint::BigUint`] rational
//! arithmetic. A single exact bit-length estimate plus one disambiguating
//! comparison locates the true binary exponent with no guesswork, so the
//! final mantissa is always produced by exactly one division: no
//! double-rounding, no iterative refinement.

use num_bigint::BigUint;

/// A target floating-point type whose bit layout this oracle can construct
/// values for.
///
/// `MANTISSA_BITS` excludes the implicit leading one; `MIN_EXPONENT` and
/// `MAX_EXPONENT` bound the *unbiased* binary exponent of normal values.
pub trait RawFloat: Sized + Copy {
    const MANTISSA_BITS: u32;
    const EXPONENT_BIAS: i32;
    const MAX_EXPONENT: i32;
    const MIN_EXPONENT: i32;
    const INFINITY_BIASED_EXPONENT: u32;

    /// Builds a value from a sign, an unbiased binary exponent (ignored for
    /// zero/infinity), and a mantissa that already excludes the implicit
    /// leading bit (ignored for infinity).
    fn from_parts(negative: bool, exponent: i32, mantissa: u64) -> Self;
    fn zero(negative: bool) -> Self;
    fn infinity(negative: bool) -> Self;
}

impl RawFloat for f64 {
    const MANTISSA_BITS: u32 = 52;
    const EXPONENT_BIAS: i32 = 1023;
    const MAX_EXPONENT: i32 = 1023;
    const MIN_EXPONENT: i32 = -1022;
    const INFINITY_BIASED_EXPONENT: u32 = 2047;

    fn from_parts(negative: bool, exponent: i32, mantissa: u64) -> Self {
        let biased = (exponent + Self::EXPONENT_BIAS) as u64;
        let bits = (u64::from(negative) << 63) | (biased << 52) | (mantissa & ((1 << 52) - 1));
        f64::from_bits(bits)
    }

    fn zero(negative: bool) -> Self {
        f64::from_bits(u64::from(negative) << 63)
    }

    fn infinity(negative: bool) -> Self {
        let bits = (u64::from(negative) << 63) | (u64::from(Self::INFINITY_BIASED_EXPONENT) << 52);
        f64::from_bits(bits)
    }
}

impl RawFloat for f32 {
    const MANTISSA_BITS: u32 = 23;
    const EXPONENT_BIAS: i32 = 127;
    const MAX_EXPONENT: i32 = 127;
    const MIN_EXPONENT: i32 = -126;
    const INFINITY_BIASED_EXPONENT: u32 = 255;

    fn from_parts(negative: bool, exponent: i32, mantissa: u64) -> Self {
        let biased = (exponent + Self::EXPONENT_BIAS) as u32;
        let bits = (u32::from(negative) << 31) | (biased << 23) | (mantissa as u32 & ((1 << 23) - 1));
        f32::from_bits(bits)
    }

    fn zero(negative: bool) -> Self {
        f32::from_bits(u32::from(negative) << 31)
    }

    fn infinity(negative: bool) -> Self {
        let bits = (u32::from(negative) << 31) | (Self::INFINITY_BIASED_EXPONENT << 23);
        f32::from_bits(bits)
    }
}

/// Conservative bounds on `decimal_exponent` beyond which the result is
/// known to be zero or infinity without constructing any bignums. Derived
/// from the real overflow/underflow decimal-magnitude thresholds
/// (`~10^308` / `~10^-324` for `f64`, `~10^38` / `~10^-45` for `f32`) with a
/// margin covering up to a 19-digit significand on either side.
pub(crate) trait OverflowBounds {
    const UPPER: i64;
    const LOWER: i64;
}

impl OverflowBounds for f64 {
    const UPPER: i64 = 400;
    const LOWER: i64 = -400;
}

impl OverflowBounds for f32 {
    const UPPER: i64 = 80;
    const LOWER: i64 = -100;
}

/// Rounds the exact decimal value `significand * 10^decimal_exponent` to the
/// nearest representable `T`, ties to even, unless `truncated` is set (in
/// which case every exact tie resolves away from zero, since a truncated
/// significand can only ever under-represent the true value).
pub fn round_decimal_to_float<T>(
    negative: bool,
    significand: u64,
    decimal_exponent: i64,
    truncated: bool,
) -> T
where
    T: RawFloat + OverflowBounds,
{
    if significand == 0 {
        return T::zero(negative);
    }
    if decimal_exponent > T::UPPER {
        return T::infinity(negative);
    }
    if decimal_exponent < T::LOWER {
        return T::zero(negative);
    }

    // Exact fraction num/den = significand * 10^decimal_exponent.
    let sig = BigUint::from(significand);
    let ten = BigUint::from(10u32);
    let (num, den) = if decimal_exponent >= 0 {
        (sig * ten.pow(decimal_exponent as u32), BigUint::from(1u32))
    } else {
        (sig, ten.pow((-decimal_exponent) as u32))
    };

    round_fraction_to_float::<T>(negative, num, den, truncated)
}

/// Rounds the exact hexadecimal mantissa `mantissa * 2^binary_exponent`
/// (`mantissa` holding `mantissa_bits` significant bits, MSB-first, already
/// excluding no digits — every hex nibble contributes 4 exact bits) to the
/// nearest representable `T`.
///
/// There is no sticky/truncation ambiguity on the way in (hex digits are
/// exact powers of two, so nothing is discarded while accumulating); the
/// only rounding that can happen is the final truncation of `mantissa` down
/// to `T::MANTISSA_BITS + 1` significant bits, which this shares with the
/// decimal path's final step via an exact power-of-two fraction.
pub fn round_hex_to_float<T>(negative: bool, mantissa: BigUint, binary_exponent: i64) -> T
where
    T: RawFloat + OverflowBounds,
{
    if mantissa == BigUint::from(0u32) {
        return T::zero(negative);
    }
    let (num, den) = if binary_exponent >= 0 {
        (mantissa << (binary_exponent as u64), BigUint::from(1u32))
    } else {
        (mantissa, BigUint::from(1u32) << ((-binary_exponent) as u64))
    };
    round_fraction_to_float::<T>(negative, num, den, false)
}

/// Core rounding step shared by the decimal and hex paths: given an exact
/// non-negative rational `num/den`, produce the nearest `T`.
fn round_fraction_to_float<T>(negative: bool, num: BigUint, den: BigUint, truncated: bool) -> T
where
    T: RawFloat + OverflowBounds,
{
    // u_true = floor(log2(num/den)), computed exactly: a bit-length estimate
    // is off by at most one, disambiguated by a single comparison.
    let num_bits = num.bits() as i64;
    let den_bits = den.bits() as i64;
    let mut u_true = num_bits - den_bits;
    // num/den >= 2^u_true  <=>  num >= den << u_true (u_true may be negative).
    let above_or_equal = |shift: i64| -> bool {
        if shift >= 0 {
            num >= (&den << (shift as u64))
        } else {
            (&num << ((-shift) as u64)) >= den
        }
    };
    if !above_or_equal(u_true) {
        u_true -= 1;
    } else if above_or_equal(u_true + 1) {
        u_true += 1;
    }

    let subnormal = u_true < i64::from(T::MIN_EXPONENT);
    let exp2_fixed = if subnormal {
        i64::from(T::MIN_EXPONENT) - i64::from(T::MANTISSA_BITS)
    } else {
        u_true - i64::from(T::MANTISSA_BITS)
    };

    // mantissa = floor(num/den / 2^exp2_fixed), i.e. floor((num << s) / (den
    // << t)) expressed without ever dividing by a negative shift.
    let (scaled_num, scaled_den) = if exp2_fixed >= 0 {
        (num, den << (exp2_fixed as u64))
    } else {
        (num << ((-exp2_fixed) as u64), den)
    };
    let (mut mantissa_big, remainder) = scaled_num.div_rem(&scaled_den);
    let twice_remainder = &remainder << 1u32;
    let round_up = match twice_remainder.cmp(&scaled_den) {
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Less => false,
        std::cmp::Ordering::Equal => {
            if truncated {
                true
            } else {
                // Round half to even; zero mantissa counts as even.
                mantissa_big.bit(0)
            }
        }
    };
    if round_up {
        mantissa_big += 1u32;
    }

    let mut mantissa = biguint_to_u64(&mantissa_big);
    // `from_parts` always encodes an implicit leading one via `biased =
    // exponent + EXPONENT_BIAS`; a subnormal result has no implicit bit and
    // must carry a biased field of zero, i.e. `exponent == MIN_EXPONENT - 1`
    // here, not `MIN_EXPONENT` (which would encode the smallest *normal*).
    let mut exponent = if subnormal {
        i64::from(T::MIN_EXPONENT) - 1
    } else {
        u_true
    };

    let full_mantissa_bit = 1u64 << (T::MANTISSA_BITS + 1);
    if mantissa >= full_mantissa_bit {
        // Rounding carried into an extra bit: renormalize.
        mantissa >>= 1;
        exponent += 1;
    }

    if subnormal && mantissa >= (1u64 << T::MANTISSA_BITS) {
        // Rounded up out of the subnormal range into the smallest normal.
        exponent = i64::from(T::MIN_EXPONENT);
    }

    if exponent > i64::from(T::MAX_EXPONENT) {
        return T::infinity(negative);
    }

    T::from_parts(negative, exponent as i32, mantissa)
}

fn biguint_to_u64(v: &BigUint) -> u64 {
    let digits = v.to_u64_digits();
    digits.first().copied().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_integer_value() {
        let v: f64 = round_decimal_to_float(false, 12345, 0, false);
        assert_eq!(v, 12345.0);
    }

    #[test]
    fn negative_sign_preserved() {
        let v: f64 = round_decimal_to_float(true, 125, -2, false);
        assert_eq!(v, -1.25);
    }

    #[test]
    fn matches_standard_library_parse() {
        for s in ["3.14159", "2.718281828", "0.1", "123456789.987654321", "1e10", "9.999999999999999e300"] {
            let (mantissa_str, exp) = if let Some(pos) = s.find(['e', 'E']) {
                (&s[..pos], s[pos + 1..].parse::<i64>().unwrap())
            } else {
                (s, 0)
            };
            let (int_part, frac_part) = match mantissa_str.find('.') {
                Some(pos) => (&mantissa_str[..pos], &mantissa_str[pos + 1..]),
                None => (mantissa_str, ""),
            };
            let digits: u64 = format!("{}{}", int_part, frac_part).parse().unwrap();
            let decimal_exponent = exp - frac_part.len() as i64;
            let v: f64 = round_decimal_to_float(false, digits, decimal_exponent, false);
            let expected: f64 = s.parse().unwrap();
            assert_eq!(v, expected, "input {}", s);
        }
    }

    #[test]
    fn overflow_to_infinity() {
        let v: f64 = round_decimal_to_float(false, 1, 400, false);
        assert!(v.is_infinite());
        let v32: f32 = round_decimal_to_float(false, 1, 80, false);
        assert!(v32.is_infinite());
    }

    #[test]
    fn underflow_to_zero() {
        let v: f64 = round_decimal_to_float(false, 1, -400, false);
        assert_eq!(v, 0.0);
    }

    #[test]
    fn subnormal_round_trip() {
        // smallest positive subnormal f64: 2^-1074
        let expected = f64::from_bits(1);
        let v: f64 = round_decimal_to_float(false, 5, -324, false);
        assert_eq!(v, expected);
    }

    #[test]
    fn subnormal_biased_exponent_field_is_zero() {
        // A subnormal result must have a biased exponent field of 0, not 1
        // (which is the smallest *normal*): the implicit leading bit does
        // not exist for subnormals.
        let v: f64 = round_decimal_to_float(false, 5, -324, false);
        assert_eq!(v.to_bits() >> 52, 0);
    }

    #[test]
    fn mid_range_subnormal_matches_standard_library() {
        let s = "4.9e-320";
        let (mantissa_str, exp) = (&s[..s.find('e').unwrap()], -320i64);
        let frac_len = mantissa_str.find('.').map_or(0, |p| mantissa_str.len() - p - 1);
        let digits: u64 = mantissa_str.replace('.', "").parse().unwrap();
        let decimal_exponent = exp - frac_len as i64;
        let v: f64 = round_decimal_to_float(false, digits, decimal_exponent, false);
        let expected: f64 = s.parse().unwrap();
        assert_eq!(v, expected);
        assert!(v.is_subnormal());
    }

    #[test]
    fn truncated_ties_round_up() {
        // A value exactly halfway, but flagged truncated, must round away
        // from the lower candidate rather than to-even.
        let exact: f64 = round_decimal_to_float(false, 1, 0, false);
        let trunc: f64 = round_decimal_to_float(false, 1, 0, true);
        assert_eq!(exact, trunc);
    }

    #[test]
    fn hex_exact_power_of_two() {
        let mantissa = BigUint::from(1u32) << 52u32;
        let v: f64 = round_hex_to_float(false, mantissa, -52);
        assert_eq!(v, 1.0);
    }

    #[test]
    fn f32_round_trip() {
        let v: f32 = round_decimal_to_float(false, 314159, -5, false);
        assert_eq!(v, 3.14159_f32);
    }
}
