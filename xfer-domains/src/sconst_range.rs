use core::fmt;

use rand::Rng;
use xfer_types::{ops, Bits};

use crate::AbstractDomain;

/// Closed signed interval `[lo, hi]` in two's complement.
///
/// The twin of [`crate::UConstRange`] with every comparison and bound taken
/// signed. An inverted pair is the empty set.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SConstRange {
    lo: Bits,
    hi: Bits,
}

impl SConstRange {
    /// Build from inclusive signed bounds.
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

/// Ascending signed walk over the values of an interval.
#[derive(Clone, Debug)]
pub struct SConstRangeValues {
    width: u32,
    next: Option<i64>,
    end: i64,
}

impl Iterator for SConstRangeValues {
    type Item = Bits;

    fn next(&mut self) -> Option<Bits> {
        let cur = self.next?;
        self.next = (cur < self.end).then(|| cur + 1);
        Some(Bits::new(self.width, cur as u64))
    }
}

impl AbstractDomain for SConstRange {
    const SLOTS: usize = 2;

    type Concrete = SConstRangeValues;

    fn bottom(width: u32) -> Self {
        Self {
            lo: Bits::signed_max_value(width),
            hi: Bits::signed_min_value(width),
        }
    }

    fn top(width: u32) -> Self {
        Self {
            lo: Bits::signed_min_value(width),
            hi: Bits::signed_max_value(width),
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
        let lo = ops::smax(self.lo, rhs.lo);
        let hi = ops::smin(self.hi, rhs.hi);
        if lo.sgt(&hi) {
            Self::bottom(self.width())
        } else {
            Self { lo, hi }
        }
    }

    fn join(&self, rhs: &Self) -> Self {
        Self {
            lo: ops::smin(self.lo, rhs.lo),
            hi: ops::smax(self.hi, rhs.hi),
        }
    }

    fn is_bottom(&self) -> bool {
        self.lo.sgt(&self.hi)
    }

    fn concrete(&self) -> SConstRangeValues {
        SConstRangeValues {
            width: self.width(),
            next: (!self.is_bottom()).then(|| self.lo.to_i64()),
            end: self.hi.to_i64(),
        }
    }

    fn cardinality(&self) -> Option<u64> {
        if self.is_bottom() {
            return Some(0);
        }
        let span = i128::from(self.hi.to_i64()) - i128::from(self.lo.to_i64()) + 1;
        u64::try_from(span).ok()
    }

    fn sample<R: Rng + ?Sized>(rng: &mut R, width: u32) -> Self {
        let max = Bits::max_value(width).to_u64();
        let a = Bits::new(width, rng.gen_range(0..=max));
        let b = Bits::new(width, rng.gen_range(0..=max));
        if a.sle(&b) {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }

    fn sample_concrete<R: Rng + ?Sized>(&self, rng: &mut R) -> Bits {
        debug_assert!(!self.is_bottom());
        let value = rng.gen_range(self.lo.to_i64()..=self.hi.to_i64());
        Bits::new(self.width(), value as u64)
    }

    fn enumerate(width: u32) -> Vec<Self> {
        let min = Bits::signed_min_value(width).to_i64();
        let max = Bits::signed_max_value(width).to_i64();
        let mut out = Vec::new();
        for lo in min..=max {
            for hi in lo..=max {
                out.push(Self {
                    lo: Bits::new(width, lo as u64),
                    hi: Bits::new(width, hi as u64),
                });
            }
        }
        out
    }

    fn distance(&self, rhs: &Self) -> u64 {
        match (self.is_bottom(), rhs.is_bottom()) {
            (true, true) => 0,
            (true, false) => ops::abds(rhs.hi, rhs.lo).to_u64(),
            (false, true) => ops::abds(self.hi, self.lo).to_u64(),
            (false, false) => {
                ops::abds(self.lo, rhs.lo).to_u64() + ops::abds(self.hi, rhs.hi).to_u64()
            }
        }
    }

    fn max_distance(width: u32) -> u64 {
        Bits::max_value(width).to_u64().saturating_mul(2)
    }
}

impl fmt::Display for SConstRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_bottom() {
            return write!(f, "(bottom)");
        }
        write!(f, "[{}, {}]", self.lo.to_i64(), self.hi.to_i64())?;
        if self.is_top() {
            write!(f, " (top)")?;
        }
        Ok(())
    }
}
