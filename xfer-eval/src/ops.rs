//! Registry of concrete binary operations and their operand pre-conditions.
//!
//! Every operation is total over equal-width operands once its guard admits
//! the pair: `nsw`/`nuw` variants exclude overflowing pairs, division and
//! remainder exclude zero divisors, and the plain shifts exclude amounts at
//! or beyond the width. The `Exact` variants share their base operation's
//! semantics; they exist as distinct names for the bridged library lookups.

use xfer_types::{ops, Bits};

/// A concrete binary operation over bit-vectors.
pub type ConcreteFn = fn(Bits, Bits) -> Bits;

/// An operand pre-condition; pairs failing it are excluded from best
/// abstractions.
pub type GuardFn = fn(Bits, Bits) -> bool;

/// A named concrete operation with an optional operand guard.
pub struct ConcreteOp {
    /// Registry key, unique across [`TABLE`].
    pub name: &'static str,
    /// The operation itself.
    pub apply: ConcreteFn,
    /// Pre-condition over operand pairs, if any.
    pub guard: Option<GuardFn>,
}

impl ConcreteOp {
    /// Whether the guard (if any) admits the pair.
    pub fn admits(&self, lhs: Bits, rhs: Bits) -> bool {
        self.guard.map_or(true, |guard| guard(lhs, rhs))
    }
}

fn non_zero_rhs(_: Bits, rhs: Bits) -> bool {
    !rhs.is_zero()
}

fn in_width_shift(lhs: Bits, rhs: Bits) -> bool {
    rhs.to_u64() < u64::from(lhs.width())
}

fn no_sadd_wrap(lhs: Bits, rhs: Bits) -> bool {
    !lhs.sadd_ov(&rhs).1
}

fn no_uadd_wrap(lhs: Bits, rhs: Bits) -> bool {
    !lhs.uadd_ov(&rhs).1
}

fn no_add_wrap(lhs: Bits, rhs: Bits) -> bool {
    no_sadd_wrap(lhs, rhs) && no_uadd_wrap(lhs, rhs)
}

fn no_ssub_wrap(lhs: Bits, rhs: Bits) -> bool {
    !lhs.ssub_ov(&rhs).1
}

fn no_usub_wrap(lhs: Bits, rhs: Bits) -> bool {
    !lhs.usub_ov(&rhs).1
}

fn no_sub_wrap(lhs: Bits, rhs: Bits) -> bool {
    no_ssub_wrap(lhs, rhs) && no_usub_wrap(lhs, rhs)
}

fn no_smul_wrap(lhs: Bits, rhs: Bits) -> bool {
    !lhs.smul_ov(&rhs).1
}

fn no_umul_wrap(lhs: Bits, rhs: Bits) -> bool {
    !lhs.umul_ov(&rhs).1
}

fn no_mul_wrap(lhs: Bits, rhs: Bits) -> bool {
    no_smul_wrap(lhs, rhs) && no_umul_wrap(lhs, rhs)
}

fn no_sshl_wrap(lhs: Bits, rhs: Bits) -> bool {
    !lhs.sshl_ov_by(&rhs).1
}

fn no_ushl_wrap(lhs: Bits, rhs: Bits) -> bool {
    !lhs.ushl_ov_by(&rhs).1
}

fn no_shl_wrap(lhs: Bits, rhs: Bits) -> bool {
    no_sshl_wrap(lhs, rhs) && no_ushl_wrap(lhs, rhs)
}

macro_rules! op {
    ($name:literal, $apply:expr) => {
        ConcreteOp {
            name: $name,
            apply: $apply,
            guard: None,
        }
    };
    ($name:literal, $apply:expr, $guard:expr) => {
        ConcreteOp {
            name: $name,
            apply: $apply,
            guard: Some($guard),
        }
    };
}

/// Every operation the harness understands, sorted by name.
pub static TABLE: &[ConcreteOp] = &[
    op!("Abds", |l, r| ops::abds(l, r)),
    op!("Abdu", |l, r| ops::abdu(l, r)),
    op!("Add", |l, r| l + r),
    op!("AddNsw", |l, r| l + r, no_sadd_wrap),
    op!("AddNswNuw", |l, r| l + r, no_add_wrap),
    op!("AddNuw", |l, r| l + r, no_uadd_wrap),
    op!("And", |l, r| l & r),
    op!("Ashr", |l, r| l.ashr_by(&r), in_width_shift),
    op!("AshrExact", |l, r| l.ashr_by(&r), in_width_shift),
    op!("AvgCeilS", |l, r| ops::avg_ceil_s(l, r)),
    op!("AvgCeilU", |l, r| ops::avg_ceil_u(l, r)),
    op!("AvgFloorS", |l, r| ops::avg_floor_s(l, r)),
    op!("AvgFloorU", |l, r| ops::avg_floor_u(l, r)),
    op!("Lshr", |l, r| l.lshr_by(&r), in_width_shift),
    op!("LshrExact", |l, r| l.lshr_by(&r), in_width_shift),
    op!("Mods", |l, r| l.srem(&r), non_zero_rhs),
    op!("Modu", |l, r| l.urem(&r), non_zero_rhs),
    op!("Mul", |l, r| l * r),
    op!("MulNsw", |l, r| l * r, no_smul_wrap),
    op!("MulNswNuw", |l, r| l * r, no_mul_wrap),
    op!("MulNuw", |l, r| l * r, no_umul_wrap),
    op!("Mulhs", |l, r| ops::mulhs(l, r)),
    op!("Mulhu", |l, r| ops::mulhu(l, r)),
    op!("Or", |l, r| l | r),
    op!("SaddSat", |l, r| l.sadd_sat(&r)),
    op!("Sdiv", |l, r| l.sdiv(&r), non_zero_rhs),
    op!("SdivExact", |l, r| l.sdiv(&r), non_zero_rhs),
    op!("Shl", |l, r| l.shl_by(&r), in_width_shift),
    op!("ShlNsw", |l, r| l.shl_by(&r), no_sshl_wrap),
    op!("ShlNswNuw", |l, r| l.shl_by(&r), no_shl_wrap),
    op!("ShlNuw", |l, r| l.shl_by(&r), no_ushl_wrap),
    op!("Smax", |l, r| ops::smax(l, r)),
    op!("Smin", |l, r| ops::smin(l, r)),
    op!("SmulSat", |l, r| l.smul_sat(&r)),
    op!("SshlSat", |l, r| l.sshl_sat_by(&r)),
    op!("SsubSat", |l, r| l.ssub_sat(&r)),
    op!("Sub", |l, r| l - r),
    op!("SubNsw", |l, r| l - r, no_ssub_wrap),
    op!("SubNswNuw", |l, r| l - r, no_sub_wrap),
    op!("SubNuw", |l, r| l - r, no_usub_wrap),
    op!("UaddSat", |l, r| l.uadd_sat(&r)),
    op!("Udiv", |l, r| l.udiv(&r), non_zero_rhs),
    op!("UdivExact", |l, r| l.udiv(&r), non_zero_rhs),
    op!("Umax", |l, r| ops::umax(l, r)),
    op!("Umin", |l, r| ops::umin(l, r)),
    op!("UmulSat", |l, r| l.umul_sat(&r)),
    op!("UshlSat", |l, r| l.ushl_sat_by(&r)),
    op!("UsubSat", |l, r| l.usub_sat(&r)),
    op!("Xor", |l, r| l ^ r),
];

/// Look an operation up by name.
pub fn lookup(name: &str) -> Option<&'static ConcreteOp> {
    TABLE.iter().find(|op| op.name == name)
}
