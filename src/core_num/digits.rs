//! Converts a contiguous ASCII-digit range into an arbitrary-precision
//! integer, selecting among three execution regimes by input length:
//! packed-long (`n <= 18`), iterative (`18 < n <= RECURSION_THRESHOLD`),
//! recursive (`RECURSION_THRESHOLD < n < parallel_threshold`), and parallel
//! (`n >= parallel_threshold`).

use num_bigint::BigInt;

use super::bignum::{estimate_num_bits, BigSignificand};
use super::powers::PowersOfTenCache;
use super::swar;

/// Suggested crossover from the iterative mutable-accumulator path to the
/// divide-and-conquer recursive path.
pub const RECURSION_THRESHOLD: usize = 128;

/// Suggested crossover from the recursive path to the work-stealing
/// parallel path.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 1024;

/// Parses `buf[from..to]`, which the caller guarantees contains only ASCII
/// decimal digits, into a non-negative [`BigInt`].
///
/// `cache`, if supplied, must already contain every power of ten the
/// recursive/parallel regimes need for this range (see
/// [`PowersOfTenCache::fill_range`]); it is ignored by the packed-long and
/// iterative regimes.
pub fn parse_digit_range(
    buf: &[u8],
    from: usize,
    to: usize,
    cache: Option<&PowersOfTenCache>,
    parallel_threshold: usize,
) -> BigInt {
    let n = to - from;
    if n <= 18 {
        tracing::trace!(n, regime = "packed-long", "parsing digit range");
        parse_packed_long(buf, from, to)
    } else if n <= RECURSION_THRESHOLD {
        tracing::trace!(n, regime = "iterative", "parsing digit range");
        parse_iterative(buf, from, to)
    } else if n < parallel_threshold {
        tracing::trace!(n, regime = "recursive", "parsing digit range");
        let cache = cache.expect("recursive regime requires a pre-filled powers-of-ten cache");
        parse_recursive(buf, from, to, cache, parallel_threshold)
    } else {
        tracing::trace!(n, regime = "parallel", "parsing digit range");
        let cache = cache.expect("parallel regime requires a pre-filled powers-of-ten cache");
        parse_parallel(buf, from, to, cache, parallel_threshold)
    }
}

/// `n <= 18`: the whole range fits in a 64-bit accumulator exactly (`10^18
/// < 2^63`), so this path never touches a bignum until the final
/// conversion.
fn parse_packed_long(buf: &[u8], from: usize, to: usize) -> BigInt {
    let n = to - from;
    let preroll = n % 8;
    let mut significand: u64 = swar::parse_up_to_seven_digits(buf, from, preroll);
    let mut pos = from + preroll;
    while pos < to {
        let group = swar::parse_eight_digits_unchecked(buf, pos);
        significand = significand * 100_000_000 + u64::from(group);
        pos += 8;
    }
    BigInt::from(significand)
}

/// `18 < n <= RECURSION_THRESHOLD`: an iterative mutable `BigSignificand`
/// accumulator, `O(n^2)` but with a far smaller constant than the
/// divide-and-conquer path below the crossover.
fn parse_iterative(buf: &[u8], from: usize, to: usize) -> BigInt {
    let n = to - from;
    let mut acc = BigSignificand::with_bit_capacity(estimate_num_bits(n as u64));
    let preroll = n % 8;
    if preroll > 0 {
        let first = swar::parse_up_to_seven_digits(buf, from, preroll) as u32;
        acc.add_small(first);
    }
    let mut pos = from + preroll;
    while pos < to {
        let group = swar::parse_eight_digits_unchecked(buf, pos);
        acc.fma_small(100_000_000, group);
        pos += 8;
    }
    acc.to_bigint()
}

/// `RECURSION_THRESHOLD < n < parallel_threshold`: split at
/// [`split_floor_16`](super::powers::split_floor_16), recurse into both
/// halves sequentially, and combine with a cached power of ten.
fn parse_recursive(
    buf: &[u8],
    from: usize,
    to: usize,
    cache: &PowersOfTenCache,
    parallel_threshold: usize,
) -> BigInt {
    let mid = super::powers::split_floor_16(from, to);
    let high = parse_digit_range(buf, from, mid, Some(cache), parallel_threshold);
    let low = parse_digit_range(buf, mid, to, Some(cache), parallel_threshold);
    let scale = cache.get((to - mid) as u32);
    high * BigInt::from(scale) + low
}

/// `n >= parallel_threshold`: same split as the recursive path, but the
/// left subtree is forked onto a work-stealing pool while the right half
/// runs locally.
fn parse_parallel(
    buf: &[u8],
    from: usize,
    to: usize,
    cache: &PowersOfTenCache,
    parallel_threshold: usize,
) -> BigInt {
    let mid = super::powers::split_floor_16(from, to);
    let (high, low) = rayon::join(
        || parse_digit_range(buf, from, mid, Some(cache), parallel_threshold),
        || parse_digit_range(buf, mid, to, Some(cache), parallel_threshold),
    );
    let scale = cache.get((to - mid) as u32);
    high * BigInt::from(scale) + low
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digits_string(n: usize) -> String {
        (0..n)
            .map(|i| std::char::from_digit(((i * 7 + 3) % 10) as u32, 10).unwrap())
            .collect()
    }

    fn reference_bigint(s: &str) -> BigInt {
        s.parse::<num_bigint::BigUint>().unwrap().into()
    }

    #[test]
    fn packed_long_matches_reference() {
        let s = digits_string(15);
        let v = parse_digit_range(s.as_bytes(), 0, s.len(), None, DEFAULT_PARALLEL_THRESHOLD);
        assert_eq!(v, reference_bigint(&s));
    }

    #[test]
    fn iterative_matches_reference() {
        let s = digits_string(80);
        let v = parse_digit_range(s.as_bytes(), 0, s.len(), None, DEFAULT_PARALLEL_THRESHOLD);
        assert_eq!(v, reference_bigint(&s));
    }

    #[test]
    fn all_three_long_regimes_agree() {
        let s = digits_string(3000);
        let cache = PowersOfTenCache::new();
        cache.fill_range(s.len(), 18);

        let iterative_like = parse_iterative(s.as_bytes(), 0, s.len());
        let recursive = parse_recursive(s.as_bytes(), 0, s.len(), &cache, usize::MAX);
        let parallel = parse_parallel(s.as_bytes(), 0, s.len(), &cache, 64);

        let reference = reference_bigint(&s);
        assert_eq!(iterative_like, reference);
        assert_eq!(recursive, reference);
        assert_eq!(parallel, reference);
    }

    #[test]
    fn dispatch_independent_of_threshold() {
        let s = digits_string(500);
        let cache = PowersOfTenCache::new();
        cache.fill_range(s.len(), 18);
        let a = parse_digit_range(s.as_bytes(), 0, s.len(), Some(&cache), 50);
        let b = parse_digit_range(s.as_bytes(), 0, s.len(), Some(&cache), 100_000);
        assert_eq!(a, b);
        assert_eq!(a, reference_bigint(&s));
    }

    #[test]
    fn leading_zeros_preserved_in_value() {
        let s = "007";
        let v = parse_digit_range(s.as_bytes(), 0, s.len(), None, DEFAULT_PARALLEL_THRESHOLD);
        assert_eq!(v, BigInt::from(7));
    }
}
