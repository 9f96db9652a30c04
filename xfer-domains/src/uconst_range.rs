use core::fmt;

use rand::Rng;
use xfer_types::{ops, Bits};

use crate::AbstractDomain;

/// Closed unsigned interval `[lo, hi]`.
///
/// An inverted pair (`lo > hi`) is the empty set; intervals never wrap.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct UConstRange {
    lo: Bits,
    hi: Bits,
}

impl UConstRange {
    /// Build from inclusive unsigned bounds.
    pub fn new(lo: Bits, hi: Bits) -> Self {
        debug_assert_eq!(lo.width(), hi.width());
        Self { lo, hi }
    }

    /// Inclusive lower bound.
    pub fn lo(&self) -> Bits {
        self.lo
    }

    /// Inclusive upper bound.
    pub fn hi(&self) -> Bits {
        self.hi
    }

    /// Whether the interval holds a single value.
    pub fn is_constant(&self) -> bool {
        self.lo == self.hi
    }
}

/// Ascending walk over the values of an unsigned interval.
#[derive(Clone, Debug)]
pub struct UConstRangeValues {
    width: u32,
    next: Option<u64>,
    end: u64,
}

impl Iterator for UConstRangeValues {
    type Item = Bits;

    fn next(&mut self) -> Option<Bits> {
        let cur = self.next?;
        self.next = (cur < self.end).then(|| cur + 1);
        Some(Bits::new(self.width, cur))
    }
}

impl AbstractDomain for UConstRange {
    const SLOTS: usize = 2;

    type Concrete = UConstRangeValues;

    fn bottom(width: u32) -> Self {
        Self {
            lo: Bits::max_value(width),
            hi: Bits::zero(width),
        }
    }

    fn top(width: u32) -> Self {
        Self {
            lo: Bits::zero(width),
            hi: Bits::max_value(width),
        }
    }

    fn from_concrete(value: Bits) -> Self {
        Self {
            lo: value,
            hi: value,
        }
    }

    fn from_slots(width: u32, slots: &[Bits]) -> Self {
        debug_assert_eq!(slots.len(), Self::SLOTS);
        debug_assert_eq!(slots[0].width(), width);
        Self::new(slots[0], slots[1])
    }

    fn slots(&self) -> Vec<Bits> {
        vec![self.lo, self.hi]
    }

    fn width(&self) -> u32 {
        self.lo.width()
    }

    fn meet(&self, rhs: &Self) -> Self {
        let lo = ops::umax(self.lo, rhs.lo);
        let hi = ops::umin(self.hi, rhs.hi);
        if lo.ugt(&hi) {
            Self::bottom(self.width())
        } else {
            Self { lo, hi }
        }
    }

    fn join(&self, rhs: &Self) -> Self {
        Self {
            lo: ops::umin(self.lo, rhs.lo),
            hi: ops::umax(self.hi, rhs.hi),
        }
    }

    fn is_bottom(&self) -> bool {
        self.lo.ugt(&self.hi)
    }

    fn concrete(&self) -> UConstRangeValues {
        UConstRangeValues {
            width: self.width(),
            next: (!self.is_bottom()).then(|| self.lo.to_u64()),
            end: self.hi.to_u64(),
        }
    }

    fn cardinality(&self) -> Option<u64> {
        if self.is_bottom() {
            Some(0)
        } else {
            (self.hi.to_u64() - self.lo.to_u64()).checked_add(1)
        }
    }

    fn sample<R: Rng + ?Sized>(rng: &mut R, width: u32) -> Self {
        let max = Bits::max_value(width).to_u64();
        let a = Bits::new(width, rng.gen_range(0..=max));
        let b = Bits::new(width, rng.gen_range(0..=max));
        if a.ule(&b) {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }

    fn sample_concrete<R: Rng + ?Sized>(&self, rng: &mut R) -> Bits {
        debug_assert!(!self.is_bottom());
        Bits::new(
            self.width(),
            rng.gen_range(self.lo.to_u64()..=self.hi.to_u64()),
        )
    }

    fn enumerate(width: u32) -> Vec<Self> {
        let max = Bits::max_value(width).to_u64();
        let mut out = Vec::new();
        for lo in 0..=max {
            for hi in lo..=max {
                out.push(Self {
                    lo: Bits::new(width, lo),
                    hi: Bits::new(width, hi),
                });
            }
        }
        out
    }

    fn distance(&self, rhs: &Self) -> u64 {
        match (self.is_bottom(), rhs.is_bottom()) {
            (true, true) => 0,
            (true, false) => ops::abdu(rhs.hi, rhs.lo).to_u64(),
            (false, true) => ops::abdu(self.hi, self.lo).to_u64(),
            (false, false) => {
                ops::abdu(self.lo, rhs.lo).to_u64() + ops::abdu(self.hi, rhs.hi).to_u64()
            }
        }
    }

    fn max_distance(width: u32) -> u64 {
        Bits::max_value(width).to_u64().saturating_mul(2)
    }
}

impl fmt::Display for UConstRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_bottom() {
            return write!(f, "(bottom)");
        }
        write!(f, "[{}, {}]", self.lo.to_u64(), self.hi.to_u64())?;
        if self.is_top() {
            write!(f, " (top)")?;
        }
        Ok(())
    }
}
