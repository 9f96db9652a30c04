//! Abstract-domain lattices over fixed-width bit-vectors.
//!
//! Every domain is a fixed-arity tuple of [`Bits`] slots sharing one width,
//! with a full lattice interface: bottom/top, meet/join, concretization,
//! enumeration, sampling, distance, and the on-disk slot codec. The four
//! implementations are [`KnownBits`], [`UConstRange`], [`SConstRange`], and
//! [`IntegerModulo`].

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(unused_must_use)]

mod codec;
mod known_bits;
mod modulo;
mod sconst_range;
mod uconst_range;

#[cfg(test)]
mod tests;

pub use codec::{CodecError, SLOT_BYTES};
pub use known_bits::{KnownBits, KnownBitsValues};
pub use modulo::{IntegerModulo, IntegerModuloValues, MODULI, PRIMES};
pub use sconst_range::{SConstRange, SConstRangeValues};
pub use uconst_range::{UConstRange, UConstRangeValues};

use core::fmt;

use rand::Rng;
use xfer_types::Bits;

/// A lattice of abstract values over bit-vectors of one width.
///
/// Values are immutable; every operation returns a fresh value. Binary
/// operations require equal widths, checked in debug builds. `bottom`
/// concretizes to the empty set and `top` to all `2^width` values.
pub trait AbstractDomain: Clone + PartialEq + fmt::Debug + fmt::Display + Sized {
    /// Number of bit-vector slots in a value of this domain.
    const SLOTS: usize;

    /// Lazy stream over the concrete values an abstract value contains.
    type Concrete: Iterator<Item = Bits> + Clone;

    /// The least element of the lattice at `width`; contains nothing.
    fn bottom(width: u32) -> Self;

    /// The greatest element of the lattice at `width`; contains everything.
    fn top(width: u32) -> Self;

    /// The singleton abstraction of one concrete value.
    fn from_concrete(value: Bits) -> Self;

    /// Rebuild a value from its serialized slots, normalizing as needed.
    fn from_slots(width: u32, slots: &[Bits]) -> Self;

    /// The slot tuple, in serialization order.
    fn slots(&self) -> Vec<Bits>;

    /// Shared width of every slot.
    fn width(&self) -> u32;

    /// Greatest lower bound.
    fn meet(&self, rhs: &Self) -> Self;

    /// Least upper bound.
    fn join(&self, rhs: &Self) -> Self;

    /// Whether the concretization is empty.
    fn is_bottom(&self) -> bool;

    /// Stream the concrete values; empty on bottom.
    fn concrete(&self) -> Self::Concrete;

    /// Number of concrete values, or `None` when it exceeds `u64`.
    fn cardinality(&self) -> Option<u64>;

    /// Draw a uniformly random valid, non-bottom element of `width`.
    fn sample<R: Rng + ?Sized>(rng: &mut R, width: u32) -> Self;

    /// Draw a uniformly random concrete member. Undefined on bottom.
    fn sample_concrete<R: Rng + ?Sized>(&self, rng: &mut R) -> Bits;

    /// Every valid element of the lattice at `width`.
    fn enumerate(width: u32) -> Vec<Self>;

    /// Domain-specific distance; zero exactly on equal valid values.
    fn distance(&self, rhs: &Self) -> u64;

    /// Upper bound of [`Self::distance`] at `width`, for normalization.
    fn max_distance(width: u32) -> u64;

    /// Whether this is the greatest element.
    fn is_top(&self) -> bool {
        *self == Self::top(self.width())
    }

    /// Whether this contains everything `rhs` contains.
    fn is_superset(&self, rhs: &Self) -> bool {
        self.meet(rhs) == *rhs
    }

    /// Fold [`Self::join`] over `values` starting from bottom.
    fn join_all<'a, I>(values: I, width: u32) -> Self
    where
        Self: 'a,
        I: IntoIterator<Item = &'a Self>,
    {
        values
            .into_iter()
            .fold(Self::bottom(width), |acc, v| acc.join(v))
    }

    /// Fold [`Self::meet`] over `values` starting from top.
    fn meet_all<'a, I>(values: I, width: u32) -> Self
    where
        Self: 'a,
        I: IntoIterator<Item = &'a Self>,
    {
        values
            .into_iter()
            .fold(Self::top(width), |acc, v| acc.meet(v))
    }

    /// Append the 12-byte encoding of every slot to `out`.
    fn serialize(&self, out: &mut Vec<u8>) {
        for slot in self.slots() {
            codec::write_slot(out, slot);
        }
    }

    /// Decode one value from `bytes` at `*offset`, advancing the offset.
    fn deserialize(bytes: &[u8], offset: &mut usize) -> Result<Self, CodecError> {
        let mut slots = Vec::with_capacity(Self::SLOTS);
        let mut width = 0;
        for i in 0..Self::SLOTS {
            let slot = codec::read_slot(bytes, offset)?;
            if i == 0 {
                width = slot.width();
            } else if slot.width() != width {
                return Err(CodecError::WidthMismatch {
                    expected: width,
                    found: slot.width(),
                });
            }
            slots.push(slot);
        }
        Ok(Self::from_slots(width, &slots))
    }
}
