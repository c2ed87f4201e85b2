//! Core numeric-literal parser: decimal and hexadecimal floating-point,
//! arbitrary-precision integer, and arbitrary-precision decimal literals,
//! parsed from byte- (`&[u8]`) or character- (`&[u16]`) oriented input.
//!
//! This crate converts textual number syntax into precise numeric values:
//! correctly-rounded finite binary floats (ties-to-even, matching IEEE-754)
//! and bit-exact arbitrary-precision integers/decimals. It does not format
//! numbers back to text, perform arithmetic on the produced values, or
//! handle locale-aware digit sets, streaming, or incremental parsing.
//!
//! # Entry points
//!
//! - [`parse_double`] / [`parse_double_u16`], [`parse_float`] /
//!   [`parse_float_u16`]: a language float literal — optional surrounding
//!   whitespace, optional sign, optional `0x`-prefixed hex-with-binary-
//!   exponent form, optional single-character type suffix.
//! - [`parse_json_number`]: a JSON number per RFC 8259 — no whitespace
//!   inside the window, no hex, no type suffix, strict leading-zero policy.
//! - [`parse_bigint_literal`]: a decimal or `0x`-prefixed hex integer
//!   literal with optional sign, to an arbitrary-precision [`BigInt`].
//! - [`parse_bigdecimal_literal`]: a decimal literal with optional
//!   fraction and exponent, to a [`BigDecimalValue`].
//!
//! # Example
//!
//! ```
//! use numlit_parse::parse_double;
//!
//! assert_eq!(parse_double(b"1.2e3", 0, 5).unwrap(), 1200.0);
//! assert_eq!(parse_double(b"0x1.0p8", 0, 7).unwrap(), 256.0);
//! ```

#![deny(
    rust_2018_idioms,
    trivial_numeric_casts,
    unreachable_pub,
    unused_must_use,
    unused_qualifications
)]

#[allow(clippy::all, trivial_numeric_casts, unreachable_pub, unused_qualifications)]
mod core_num;

#[cfg(test)]
mod tests;

pub use core_num::assemble::BigDecimalValue;
pub use core_num::bignum::estimate_num_bits;
pub use core_num::dec2flt::rawfp::RawFloat;
pub use core_num::digits::{DEFAULT_PARALLEL_THRESHOLD, RECURSION_THRESHOLD};
pub use num_bigint::BigInt;

use core_num::assemble;
use core_num::dec2flt::rawfp::OverflowBounds;
use core_num::scanner::{scan, Grammar, NumberDescriptor};

mod sealed {
    pub trait Sealed {}
}

/// Ceiling on the window length (`offset..offset + length`) any entry
/// point will accept before parsing even begins. Past this, callers get
/// [`NumberParseError::IllegalOffsetOrLength`] rather than a `SyntaxError`,
/// since this is a precondition violation, not a grammar mismatch.
pub const MAX_INPUT_LENGTH: usize = 1 << 31;

/// Grammar ceiling on digit count for [`parse_bigint_literal`].
pub const MAX_DECIMAL_DIGITS: u64 = 646_456_993;

/// Grammar ceiling on digit count for [`parse_bigdecimal_literal`].
pub const MAX_DIGIT_COUNT: u64 = 1_292_782_621;

/// Cap on exponent-magnitude accumulation during scanning; matches
/// `i32::MAX`. Exponent digit runs that would exceed this saturate at this
/// value during the scan (rather than overflowing) and are then rejected
/// by the completeness check as [`SyntaxErrorReason::ValueExceedsLimits`].
pub const MAX_EXPONENT_NUMBER: i64 = i32::MAX as i64;

/// Suggested crossover from the scanner's plain digit-accumulation pass to
/// one that aggressively skips leading zero runs first. A performance
/// switch only — never affects the parsed value.
pub const MANY_DIGITS_THRESHOLD: usize = 32;

/// Errors produced by any entry point in this crate.
///
/// Two kinds: a precondition violation
/// ([`IllegalOffsetOrLength`](Self::IllegalOffsetOrLength)), reported
/// eagerly before any parsing; and a grammar mismatch
/// ([`SyntaxError`](Self::SyntaxError)), which carries the index where the
/// scanner detected the problem and a [`SyntaxErrorReason`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum NumberParseError {
    #[error("offset {offset} and length {length} are out of bounds for a buffer of size {buffer_len}")]
    IllegalOffsetOrLength {
        offset: usize,
        length: usize,
        buffer_len: usize,
    },
    #[error("syntax error at index {index}: {reason}")]
    SyntaxError {
        index: usize,
        reason: SyntaxErrorReason,
    },
}

/// The specific grammar rule a [`NumberParseError::SyntaxError`] violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum SyntaxErrorReason {
    #[error("empty input")]
    EmptyInput,
    #[error("unexpected character")]
    UnexpectedCharacter,
    #[error("missing required digits")]
    MissingDigits,
    #[error("duplicate decimal point")]
    DuplicateDecimalPoint,
    #[error("exponent indicator with no following digits")]
    UnterminatedExponent,
    #[error("non-ASCII code unit inside a digit or structural region")]
    NonAsciiInDigits,
    #[error("value exceeds grammar limits (digit count or exponent magnitude)")]
    ValueExceedsLimits,
}

/// Tunable thresholds and an optional injectable thread pool, bundled so
/// callers don't have to rely on crate-global constants or a default
/// `rayon` pool they don't control.
///
/// The plain entry points ([`parse_double`], [`parse_bigint_literal`],
/// etc.) delegate to their `*_with_config` sibling with
/// `ParseConfig::default()`.
#[derive(Clone)]
pub struct ParseConfig {
    /// Crossover from the iterative accumulator to the recursive
    /// divide-and-conquer digit-range parser.
    pub recursion_threshold: usize,
    /// Crossover from the recursive to the work-stealing parallel
    /// digit-range parser. Only consulted when a `parallel: true` flag is
    /// also passed at the call site (bigint/bigdecimal entry points); the
    /// float entry points never need it, since `digit_count <= 19` always
    /// takes the packed-long fast path.
    pub parallel_threshold: usize,
    /// Crossover to the leading-zero-skipping scanner variant. Currently
    /// a performance hint only; see `DESIGN.md` for why the scanner's
    /// leading-zero-skip optimization is not separately wired to it.
    pub many_digits_threshold: usize,
    /// An externally-owned work-stealing pool to run the parallel
    /// fork-join regime on. `None` uses `rayon`'s default global pool.
    pub pool: Option<std::sync::Arc<rayon::ThreadPool>>,
}

impl Default for ParseConfig {
    fn default() -> Self {
        ParseConfig {
            recursion_threshold: RECURSION_THRESHOLD,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            many_digits_threshold: MANY_DIGITS_THRESHOLD,
            pool: None,
        }
    }
}

impl ParseConfig {
    fn run<R: Send>(&self, f: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(f),
            None => f(),
        }
    }
}

/// A code unit an entry point can be addressed over: `u8` for byte
/// buffers, `u16` for UTF-16-style character buffers. Sealed — this
/// crate's scanner assumes every code unit maps to either an ASCII byte
/// or "not ASCII", which does not generalize past these two widths.
pub trait CodeUnit: sealed::Sealed + Copy {
    #[doc(hidden)]
    fn to_ascii_byte(self) -> Option<u8>;
}

impl sealed::Sealed for u8 {}
impl CodeUnit for u8 {
    #[inline]
    fn to_ascii_byte(self) -> Option<u8> {
        if self.is_ascii() {
            Some(self)
        } else {
            None
        }
    }
}

impl sealed::Sealed for u16 {}
impl CodeUnit for u16 {
    #[inline]
    fn to_ascii_byte(self) -> Option<u8> {
        if self < 0x80 {
            Some(self as u8)
        } else {
            None
        }
    }
}

fn check_bounds(buffer_len: usize, offset: usize, length: usize) -> Result<(), NumberParseError> {
    let in_bounds = length <= MAX_INPUT_LENGTH && offset <= buffer_len && length <= buffer_len - offset;
    if in_bounds {
        Ok(())
    } else {
        Err(NumberParseError::IllegalOffsetOrLength {
            offset,
            length,
            buffer_len,
        })
    }
}

fn at_fn<C: CodeUnit>(buf: &[C]) -> impl Fn(usize) -> Option<u8> + '_ {
    move |i| buf.get(i).and_then(|&c| c.to_ascii_byte())
}

fn scan_generic<C: CodeUnit>(
    buf: &[C],
    offset: usize,
    length: usize,
    grammar: Grammar,
) -> Result<NumberDescriptor, NumberParseError> {
    check_bounds(buf.len(), offset, length)?;
    let at = at_fn(buf);
    scan(&at, offset, length, grammar)
}

fn parse_float_generic<C: CodeUnit, T>(
    buf: &[C],
    offset: usize,
    length: usize,
) -> Result<T, NumberParseError>
where
    T: RawFloat + OverflowBounds,
{
    let d = scan_generic(buf, offset, length, Grammar::Float { allow_whitespace: true })?;
    if d.is_hex {
        let at = at_fn(buf);
        Ok(assemble::assemble_hex_float(&at, &d))
    } else {
        Ok(assemble::assemble_decimal_float(&d))
    }
}

/// Parses a `f64` float literal from a byte buffer.
///
/// `buf[offset..offset + length]` must hold a complete float literal:
/// optional surrounding whitespace, optional sign, decimal or
/// `0x`-prefixed hex-with-binary-exponent digits, optional type suffix.
/// The type suffix's legality for any particular caller dialect is that
/// caller's concern — this function accepts any single suffix character
/// the grammar allows (`f`/`F`/`d`/`D`) without interpreting it.
///
/// Float entry points never consult [`ParseConfig`]: `digit_count <= 19`
/// always takes the packed-long fast path, so there is no bignum regime
/// to tune. Use [`parse_double_with_config`] only if a future caller
/// needs to route through an injected thread pool for consistency with
/// nearby bigint/bigdecimal calls.
pub fn parse_double(buf: &[u8], offset: usize, length: usize) -> Result<f64, NumberParseError> {
    parse_float_generic(buf, offset, length)
}

/// [`parse_double`] with an explicit [`ParseConfig`] (see its doc comment
/// for why this is currently equivalent to [`parse_double`]).
pub fn parse_double_with_config(
    buf: &[u8],
    offset: usize,
    length: usize,
    config: &ParseConfig,
) -> Result<f64, NumberParseError> {
    config.run(|| parse_float_generic(buf, offset, length))
}

/// `u16`-buffer counterpart of [`parse_double`].
pub fn parse_double_u16(buf: &[u16], offset: usize, length: usize) -> Result<f64, NumberParseError> {
    parse_float_generic(buf, offset, length)
}

/// Parses an `f32` float literal from a byte buffer. See [`parse_double`].
pub fn parse_float(buf: &[u8], offset: usize, length: usize) -> Result<f32, NumberParseError> {
    parse_float_generic(buf, offset, length)
}

/// [`parse_float`] with an explicit [`ParseConfig`].
pub fn parse_float_with_config(
    buf: &[u8],
    offset: usize,
    length: usize,
    config: &ParseConfig,
) -> Result<f32, NumberParseError> {
    config.run(|| parse_float_generic(buf, offset, length))
}

/// `u16`-buffer counterpart of [`parse_float`].
pub fn parse_float_u16(buf: &[u16], offset: usize, length: usize) -> Result<f32, NumberParseError> {
    parse_float_generic(buf, offset, length)
}

/// Parses a JSON number (RFC 8259 `number` production) to an `f64`.
///
/// Unlike [`parse_double`]: no surrounding whitespace, no `+` sign on the
/// integer part, no hex, no type suffix, and a strict leading-zero policy
/// (a non-zero integer part may not itself start with `0`).
pub fn parse_json_number(buf: &[u8], offset: usize, length: usize) -> Result<f64, NumberParseError> {
    let d = scan_generic(buf, offset, length, Grammar::Json)?;
    Ok(assemble::assemble_decimal_float(&d))
}

/// Parses a decimal or `0x`-prefixed hex arbitrary-precision integer
/// literal with an optional sign.
///
/// `parallel` selects between the recursive (single-threaded) and
/// work-stealing-parallel regimes of the digit-range parser once the
/// digit count crosses [`DEFAULT_PARALLEL_THRESHOLD`]; passing `false` is
/// equivalent to setting that threshold to infinity.
pub fn parse_bigint_literal(
    buf: &[u8],
    offset: usize,
    length: usize,
    parallel: bool,
) -> Result<BigInt, NumberParseError> {
    parse_bigint_literal_with_config(buf, offset, length, parallel, &ParseConfig::default())
}

/// [`parse_bigint_literal`] with explicit [`ParseConfig`] tuning (e.g. an
/// injected thread pool for the parallel regime).
pub fn parse_bigint_literal_with_config(
    buf: &[u8],
    offset: usize,
    length: usize,
    parallel: bool,
    config: &ParseConfig,
) -> Result<BigInt, NumberParseError> {
    let d = scan_generic(buf, offset, length, Grammar::BigInt)?;
    Ok(config.run(|| assemble::assemble_bigint(buf, &d, parallel)))
}

/// Parses a decimal arbitrary-precision decimal literal (optional sign,
/// optional fraction, optional exponent) into a [`BigDecimalValue`].
///
/// See [`parse_bigint_literal`] for the meaning of `parallel`.
pub fn parse_bigdecimal_literal(
    buf: &[u8],
    offset: usize,
    length: usize,
    parallel: bool,
) -> Result<BigDecimalValue, NumberParseError> {
    parse_bigdecimal_literal_with_config(buf, offset, length, parallel, &ParseConfig::default())
}

/// [`parse_bigdecimal_literal`] with explicit [`ParseConfig`] tuning.
pub fn parse_bigdecimal_literal_with_config(
    buf: &[u8],
    offset: usize,
    length: usize,
    parallel: bool,
    config: &ParseConfig,
) -> Result<BigDecimalValue, NumberParseError> {
    let d = scan_generic(buf, offset, length, Grammar::BigDecimal)?;
    Ok(config.run(|| assemble::assemble_bigdecimal(buf, &d, parallel)))
}
