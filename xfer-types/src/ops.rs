//! Free-function binary operations over [`Bits`] values.
//!
//! These cover the operations that do not read naturally as methods: order
//! selection, averages, absolute differences, high-half products, and gcd.
//! All functions require equal operand widths.

use crate::Bits;

/// The smaller of two values, compared unsigned.
pub fn umin(a: Bits, b: Bits) -> Bits {
    if a.ult(&b) {
        a
    } else {
        b
    }
}

/// The larger of two values, compared unsigned.
pub fn umax(a: Bits, b: Bits) -> Bits {
    if a.ugt(&b) {
        a
    } else {
        b
    }
}

/// The smaller of two values, compared signed.
pub fn smin(a: Bits, b: Bits) -> Bits {
    if a.slt(&b) {
        a
    } else {
        b
    }
}

/// The larger of two values, compared signed.
pub fn smax(a: Bits, b: Bits) -> Bits {
    if a.sgt(&b) {
        a
    } else {
        b
    }
}

/// Unsigned absolute difference.
pub fn abdu(a: Bits, b: Bits) -> Bits {
    if a.uge(&b) {
        a - b
    } else {
        b - a
    }
}

/// Signed absolute difference.
pub fn abds(a: Bits, b: Bits) -> Bits {
    if a.sge(&b) {
        a - b
    } else {
        b - a
    }
}

/// `floor((a + b) / 2)` without intermediate overflow, unsigned.
pub fn avg_floor_u(a: Bits, b: Bits) -> Bits {
    (a & b) + (a ^ b).lshr(1)
}

/// `floor((a + b) / 2)` without intermediate overflow, signed.
pub fn avg_floor_s(a: Bits, b: Bits) -> Bits {
    (a & b) + (a ^ b).ashr(1)
}

/// `ceil((a + b) / 2)` without intermediate overflow, unsigned.
pub fn avg_ceil_u(a: Bits, b: Bits) -> Bits {
    (a | b) - (a ^ b).lshr(1)
}

/// `ceil((a + b) / 2)` without intermediate overflow, signed.
pub fn avg_ceil_s(a: Bits, b: Bits) -> Bits {
    (a | b) - (a ^ b).ashr(1)
}

/// High half of the full unsigned product.
pub fn mulhu(a: Bits, b: Bits) -> Bits {
    debug_assert_eq!(a.width(), b.width());
    let full = u128::from(a.to_u64()) * u128::from(b.to_u64());
    Bits::new(a.width(), (full >> a.width()) as u64)
}

/// High half of the full signed product.
pub fn mulhs(a: Bits, b: Bits) -> Bits {
    debug_assert_eq!(a.width(), b.width());
    let full = i128::from(a.to_i64()) * i128::from(b.to_i64());
    Bits::new(a.width(), (full >> a.width()) as u64)
}

/// Greatest common divisor, treating both operands as unsigned.
pub fn gcd(a: Bits, b: Bits) -> Bits {
    debug_assert_eq!(a.width(), b.width());
    let width = a.width();
    let (mut a, mut b) = (a.to_u64(), b.to_u64());
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    Bits::new(width, a)
}

/// Position of the highest bit where `a` and `b` differ, if any.
pub fn most_significant_different_bit(a: Bits, b: Bits) -> Option<u32> {
    debug_assert_eq!(a.width(), b.width());
    if a == b {
        return None;
    }
    Some(a.width() - 1 - (a ^ b).leading_zeros())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b4(raw: u64) -> Bits {
        Bits::new(4, raw)
    }

    #[test]
    fn order_selection_respects_signedness() {
        // 0b1000 is -8 signed but 8 unsigned.
        assert_eq!(umax(b4(0b1000), b4(0b0001)), b4(0b1000));
        assert_eq!(smax(b4(0b1000), b4(0b0001)), b4(0b0001));
        assert_eq!(umin(b4(3), b4(3)), b4(3));
    }

    #[test]
    fn absolute_differences() {
        assert_eq!(abdu(b4(2), b4(9)), b4(7));
        // -7 and 2 are nine apart; width-4 wrap keeps the magnitude.
        assert_eq!(abds(b4(0b1001), b4(2)), b4(9));
    }

    #[rstest::rstest]
    #[case(3, 4, 3, 4)]
    #[case(3, 5, 4, 4)]
    #[case(15, 15, 15, 15)]
    #[case(0, 15, 7, 8)]
    fn unsigned_averages(
        #[case] a: u64,
        #[case] b: u64,
        #[case] floor: u64,
        #[case] ceil: u64,
    ) {
        assert_eq!(avg_floor_u(b4(a), b4(b)), b4(floor));
        assert_eq!(avg_ceil_u(b4(a), b4(b)), b4(ceil));
    }

    #[test]
    fn signed_averages_round_toward_minus_infinity() {
        // (-1 + 2) / 2: floor is 0, ceil is 1.
        let minus_one = b4(0b1111);
        assert_eq!(avg_floor_s(minus_one, b4(2)).to_i64(), 0);
        assert_eq!(avg_ceil_s(minus_one, b4(2)).to_i64(), 1);
        // (-3 + -4) / 2: floor is -4, ceil is -3.
        let a = b4((-3i64) as u64);
        let b = b4((-4i64) as u64);
        assert_eq!(avg_floor_s(a, b).to_i64(), -4);
        assert_eq!(avg_ceil_s(a, b).to_i64(), -3);
    }

    #[test]
    fn high_halves() {
        assert_eq!(mulhu(b4(15), b4(15)), b4(14)); // 225 = 0b1110_0001
        assert_eq!(mulhu(b4(3), b4(4)), b4(0));
        // -1 * -1 = 1, high half zero; -8 * -8 = 64, high half 4.
        assert_eq!(mulhs(b4(0b1111), b4(0b1111)), b4(0));
        assert_eq!(mulhs(b4(0b1000), b4(0b1000)), b4(4));
        let big = Bits::new(64, u64::MAX);
        assert_eq!(mulhu(big, big).to_u64(), u64::MAX - 1);
    }

    #[test]
    fn gcd_of_masked_values() {
        assert_eq!(gcd(b4(12), b4(8)), b4(4));
        assert_eq!(gcd(b4(7), b4(0)), b4(7));
        assert_eq!(gcd(b4(0), b4(0)), b4(0));
    }

    #[test]
    fn highest_differing_bit() {
        assert_eq!(most_significant_different_bit(b4(0b1010), b4(0b1010)), None);
        assert_eq!(
            most_significant_different_bit(b4(0b1010), b4(0b0010)),
            Some(3)
        );
        assert_eq!(
            most_significant_different_bit(b4(0b1010), b4(0b1011)),
            Some(0)
        );
    }
}
