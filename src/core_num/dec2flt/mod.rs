//! The rounding oracle: given a decimal or hexadecimal significand, a
//! decimal/binary exponent, and a truncation flag, returns the
//! IEEE-754-nearest-even binary float.

pub mod rawfp;
