use core::fmt;

use rand::Rng;
use xfer_types::Bits;

use crate::AbstractDomain;

/// The known-bits lattice: a pair of masks recording which bits are proven
/// zero and which are proven one.
///
/// A bit set in both masks is a conflict; such values concretize to nothing.
/// Top is the pair of empty masks (nothing known).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct KnownBits {
    zeros: Bits,
    ones: Bits,
}

impl KnownBits {
    /// Build from the known-zero and known-one masks.
    pub fn new(zeros: Bits, ones: Bits) -> Self {
        debug_assert_eq!(zeros.width(), ones.width());
        Self { zeros, ones }
    }

    /// Mask of bits known to be zero.
    pub fn zeros(&self) -> Bits {
        self.zeros
    }

    /// Mask of bits known to be one.
    pub fn ones(&self) -> Bits {
        self.ones
    }

    /// Mask of undetermined bits.
    pub fn unknown_mask(&self) -> Bits {
        !(self.zeros | self.ones)
    }

    /// Whether every bit is determined.
    pub fn is_constant(&self) -> bool {
        self.zeros.count_ones() + self.ones.count_ones() == self.width()
    }

    /// The single concrete value of a constant.
    pub fn constant(&self) -> Bits {
        debug_assert!(self.is_constant());
        self.ones
    }

    fn unknown_count(&self) -> u32 {
        self.width() - (self.zeros ^ self.ones).count_ones()
    }
}

/// Ascending walk over the concrete values of a [`KnownBits`] element.
///
/// Enumerates the submasks of the unknown mask, OR-ing each onto the
/// known-ones mask.
#[derive(Clone, Debug)]
pub struct KnownBitsValues {
    width: u32,
    ones: u64,
    unknown: u64,
    state: Option<u64>,
}

impl Iterator for KnownBitsValues {
    type Item = Bits;

    fn next(&mut self) -> Option<Bits> {
        let sub = self.state?;
        let value = Bits::new(self.width, self.ones | sub);
        let next = sub.wrapping_sub(self.unknown) & self.unknown;
        self.state = (next != 0).then_some(next);
        Some(value)
    }
}

impl AbstractDomain for KnownBits {
    const SLOTS: usize = 2;

    type Concrete = KnownBitsValues;

    fn bottom(width: u32) -> Self {
        let all = Bits::all_ones(width);
        Self { zeros: all, ones: all }
    }

    fn top(width: u32) -> Self {
        let none = Bits::zero(width);
        Self { zeros: none, ones: none }
    }

    fn from_concrete(value: Bits) -> Self {
        Self {
            zeros: !value,
            ones: value,
        }
    }

    fn from_slots(width: u32, slots: &[Bits]) -> Self {
        debug_assert_eq!(slots.len(), Self::SLOTS);
        debug_assert_eq!(slots[0].width(), width);
        Self::new(slots[0], slots[1])
    }

    fn slots(&self) -> Vec<Bits> {
        vec![self.zeros, self.ones]
    }

    fn width(&self) -> u32 {
        self.zeros.width()
    }

    fn meet(&self, rhs: &Self) -> Self {
        // More bits become known; conflicts mark the empty set.
        Self {
            zeros: self.zeros | rhs.zeros,
            ones: self.ones | rhs.ones,
        }
    }

    fn join(&self, rhs: &Self) -> Self {
        Self {
            zeros: self.zeros & rhs.zeros,
            ones: self.ones & rhs.ones,
        }
    }

    fn is_bottom(&self) -> bool {
        self.zeros.intersects(&self.ones)
    }

    fn concrete(&self) -> KnownBitsValues {
        KnownBitsValues {
            width: self.width(),
            ones: self.ones.to_u64(),
            unknown: self.unknown_mask().to_u64(),
            state: (!self.is_bottom()).then_some(0),
        }
    }

    fn cardinality(&self) -> Option<u64> {
        if self.is_bottom() {
            Some(0)
        } else {
            1u64.checked_shl(self.unknown_count())
        }
    }

    fn sample<R: Rng + ?Sized>(rng: &mut R, width: u32) -> Self {
        let mask = Bits::max_value(width).to_u64();
        loop {
            let zeros = rng.gen::<u64>() & mask;
            let ones = rng.gen::<u64>() & mask;
            if zeros & ones == 0 {
                return Self {
                    zeros: Bits::new(width, zeros),
                    ones: Bits::new(width, ones),
                };
            }
        }
    }

    fn sample_concrete<R: Rng + ?Sized>(&self, rng: &mut R) -> Bits {
        debug_assert!(!self.is_bottom());
        let free = rng.gen::<u64>() & self.unknown_mask().to_u64();
        Bits::new(self.width(), self.ones.to_u64() | free)
    }

    fn enumerate(width: u32) -> Vec<Self> {
        let max = Bits::max_value(width).to_u64();
        let mut out = Vec::new();
        for zeros in 0..=max {
            for ones in 0..=max {
                if zeros & ones != 0 {
                    continue;
                }
                out.push(Self {
                    zeros: Bits::new(width, zeros),
                    ones: Bits::new(width, ones),
                });
            }
        }
        out
    }

    fn distance(&self, rhs: &Self) -> u64 {
        match (self.is_bottom(), rhs.is_bottom()) {
            (true, true) => 0,
            (true, false) => u64::from(rhs.unknown_count()),
            (false, true) => u64::from(self.unknown_count()),
            (false, false) => u64::from(
                (self.zeros ^ rhs.zeros).count_ones() + (self.ones ^ rhs.ones).count_ones(),
            ),
        }
    }

    fn max_distance(width: u32) -> u64 {
        u64::from(width) * 2
    }
}

impl fmt::Display for KnownBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_bottom() {
            return write!(f, "(bottom)");
        }

        for i in (0..self.width()).rev() {
            let c = if self.ones.bit(i) {
                '1'
            } else if self.zeros.bit(i) {
                '0'
            } else {
                '?'
            };
            write!(f, "{c}")?;
        }

        if self.is_constant() {
            write!(f, " const: {}", self.constant())?;
        }
        if self.is_top() {
            write!(f, " (top)")?;
        }
        Ok(())
    }
}
