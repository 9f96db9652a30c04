//! Atomic value types for the transfer-function evaluation harness.
//!
//! The only type of consequence is [`Bits`], an unsigned integer with a
//! declared width between 1 and 64 bits. The wrapping arithmetic, overflow
//! detection, saturation, shifts, rotates, and extensions the abstract
//! domains and the evaluator need all live on it or in [`ops`].

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(unused_must_use)]

mod bits;

pub mod ops;

pub use bits::Bits;
