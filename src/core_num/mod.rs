//! Numeric parsing building blocks: SWAR digit recognition, a fixed-capacity
//! mutable bignum accumulator, a cache of powers of ten, the digit-range
//! parser built on both, the syntactic scanner, and the value assembler.

// All these modules are technically private and only exposed for testing:
pub mod assemble;
pub mod bignum;
pub mod dec2flt;
pub mod digits;
pub mod powers;
pub mod scanner;
pub mod swar;
