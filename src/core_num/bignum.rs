//! `BigSignificand`: a fixed-capacity, in-place mutable unsigned big
//! integer used to accumulate a digit sequence (`x = x * base + group`)
//! without allocating a new bignum per digit group.
//!
//! Limbs are 32-bit, stored most-significant-first (`limbs[0]` is the most
//! significant limb). `first_nonzero_limb` bounds the live prefix: the
//! invariant `limbs[i] == 0` for all `i < first_nonzero_limb` holds after
//! every mutation.

use num_bigint::BigInt;

/// An in-place mutable unsigned integer of caller-fixed bit capacity.
///
/// `num_limbs` is `2 * ceil((bits + 63) / 64)`, giving one extra 64-bit
/// word of headroom so carries never have anywhere to overflow to as long
/// as the caller respects the declared capacity (`estimate_num_bits`
/// upper-bounds the true digit count, so this holds for the intended
/// use: accumulating exactly `n` decimal digits into a bignum sized for
/// `n` digits).
pub struct BigSignificand {
    limbs: Box<[u32]>,
    first_nonzero_limb: usize,
}

impl BigSignificand {
    /// Reserves `2 * ceil((bits + 63) / 64)` 32-bit limbs, all zero.
    ///
    /// `bits` must be greater than zero and fit in a signed 32-bit integer.
    pub fn with_bit_capacity(bits: u32) -> Self {
        assert!(bits > 0, "BigSignificand capacity must be positive");
        assert!(bits <= i32::MAX as u32, "BigSignificand capacity overflow");
        let num_64_words = ((bits as u64 + 63) / 64) as usize;
        let num_limbs = 2 * num_64_words * 2; // 2 limbs per 64-bit word, one word of headroom
        let limbs = vec![0u32; num_limbs].into_boxed_slice();
        let first_nonzero_limb = limbs.len();
        BigSignificand {
            limbs,
            first_nonzero_limb,
        }
    }

    #[inline]
    fn last_index(&self) -> usize {
        self.limbs.len() - 1
    }

    /// Multiplies the value in place by a 32-bit `k`.
    ///
    /// Walks limbs from the last down to `first_nonzero_limb`, computing
    /// `product = k * limb + carry` as a 64-bit value, writing the low 32
    /// bits back and propagating the high 32 bits as carry. A final
    /// nonzero carry is written into the next-lower limb and
    /// `first_nonzero_limb` advances there; it is a programmer error
    /// (reported via panic — a detected out-of-range write rather than
    /// silent truncation) if that limb does not exist.
    pub fn mul_small(&mut self, k: u32) {
        if k == 0 {
            for limb in self.limbs.iter_mut() {
                *limb = 0;
            }
            self.first_nonzero_limb = self.limbs.len();
            return;
        }
        self.fma_small(k, 0);
    }

    /// Like [`mul_small`](Self::mul_small), but the initial carry is
    /// `addend` instead of zero: `self = self * k + addend`.
    pub fn fma_small(&mut self, k: u32, addend: u32) {
        let mut carry: u64 = u64::from(addend);
        let last = self.last_index();
        // `first_nonzero_limb` starts at `limbs.len()` (one past the last
        // limb) on a freshly constructed accumulator, meaning "no nonzero
        // limb yet". Leading zero limbs multiplied by anything are still
        // zero, so it is always safe to clamp the walk to start no later
        // than `last`.
        let start = self.first_nonzero_limb.min(last);
        let mut i = last;
        loop {
            let product = u64::from(k) * u64::from(self.limbs[i]) + carry;
            self.limbs[i] = product as u32;
            carry = product >> 32;
            if i == start {
                break;
            }
            i -= 1;
        }
        let mut write_at = start;
        while carry != 0 {
            assert!(write_at > 0, "BigSignificand capacity exceeded");
            write_at -= 1;
            let sum = u64::from(self.limbs[write_at]) + carry;
            self.limbs[write_at] = sum as u32;
            carry = sum >> 32;
        }
        if write_at < self.first_nonzero_limb {
            self.first_nonzero_limb = write_at;
        }
        // A limb we just wrote into may still be zero (e.g. carry
        // overflowed by exactly one limb width); re-tighten the bound so
        // the invariant `limbs[i] == 0 for i < first_nonzero_limb` stays
        // the *tightest* such bound callers can rely on. Not required
        // for correctness of later mul/fma/add (they tolerate a looser
        // bound), but `to_bigint` benefits from a tight prefix.
        while self.first_nonzero_limb < self.limbs.len()
            && self.limbs[self.first_nonzero_limb] == 0
            && self.first_nonzero_limb < start
        {
            self.first_nonzero_limb += 1;
        }
    }

    /// Adds a 32-bit `v` in place. Equivalent to `fma_small(1, v)`: walk
    /// upward from the last limb while carry is nonzero, widening
    /// `first_nonzero_limb` to cover whatever limb the carry finally lands
    /// in.
    pub fn add_small(&mut self, v: u32) {
        self.fma_small(1, v);
    }

    /// Serializes all limbs most-significant-first into a byte array and
    /// constructs a non-negative signed bigint by treating that array as a
    /// two's-complement big-endian integer. `limbs[0]` is always zero (the
    /// headroom word), so the sign bit of the resulting byte array is
    /// always clear and the result is always non-negative.
    pub fn to_bigint(&self) -> BigInt {
        let mut bytes = Vec::with_capacity(self.limbs.len() * 4);
        for &limb in self.limbs.iter() {
            bytes.extend_from_slice(&limb.to_be_bytes());
        }
        BigInt::from_signed_bytes_be(&bytes)
    }

    #[cfg(test)]
    fn to_u128(&self) -> u128 {
        let mut acc: u128 = 0;
        for &limb in self.limbs.iter() {
            acc = (acc << 32) | u128::from(limb);
        }
        acc
    }
}

/// Upper-bounds `n * log2(10)` for all `n >= 0`, used to size a
/// `BigSignificand` before parsing `n` decimal digits. `3402 / 1024` is a
/// rational upper bound for `log2(10) ≈ 3.321928...` (`3402/1024 ≈
/// 3.322265625`).
pub fn estimate_num_bits(n_decimal_digits: u64) -> u32 {
    (((n_decimal_digits * 3402) >> 10) + 1) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_num_bits_upper_bounds_log2_10() {
        for n in 0..2000u64 {
            let bound = estimate_num_bits(n) as f64;
            let exact = n as f64 * 10f64.log2();
            assert!(
                bound >= exact.ceil() || (bound as f64) >= exact,
                "n={} bound={} exact={}",
                n,
                bound,
                exact
            );
        }
    }

    #[test]
    fn mul_small_matches_u128_math() {
        let mut big = BigSignificand::with_bit_capacity(64);
        big.add_small(1);
        big.mul_small(1_000_000_000);
        big.mul_small(1_000_000_000);
        assert_eq!(big.to_u128(), 1_000_000_000u128 * 1_000_000_000u128);
    }

    #[test]
    fn mul_small_is_associative_in_value() {
        let mut a = BigSignificand::with_bit_capacity(64);
        a.add_small(1);
        a.mul_small(123);
        a.mul_small(456);

        let mut b = BigSignificand::with_bit_capacity(64);
        b.add_small(1);
        b.mul_small(123u32.checked_mul(456).unwrap());

        assert_eq!(a.to_u128(), b.to_u128());
    }

    #[test]
    fn fma_small_accumulates_digit_groups() {
        // Simulate parsing "1234567890123456" in two groups of 8.
        let mut big = BigSignificand::with_bit_capacity(estimate_num_bits(16));
        big.add_small(12_345_678);
        big.fma_small(100_000_000, 90_123_456);
        assert_eq!(big.to_u128(), 1_234_567_890_123_456u128);
    }

    #[test]
    fn to_bigint_is_non_negative() {
        let mut big = BigSignificand::with_bit_capacity(64);
        big.add_small(42);
        let v = big.to_bigint();
        assert_eq!(v.sign(), num_bigint::Sign::Plus);
        assert_eq!(v, BigInt::from(42));
    }

    #[test]
    fn add_small_carries_across_limbs() {
        let mut big = BigSignificand::with_bit_capacity(64);
        big.add_small(u32::MAX);
        big.add_small(1);
        assert_eq!(big.to_u128(), u128::from(u32::MAX) + 1);
    }
}
