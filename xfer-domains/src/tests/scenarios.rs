//! Pinned behaviors on hand-picked values.

use std::collections::BTreeSet;

use xfer_types::Bits;

use crate::{AbstractDomain, IntegerModulo, KnownBits, SConstRange, UConstRange};

fn b4(raw: u64) -> Bits {
    Bits::new(4, raw)
}

fn kb(zeros: u64, ones: u64) -> KnownBits {
    KnownBits::new(b4(zeros), b4(ones))
}

#[test]
fn known_bits_meet_and_join_at_width_4() {
    // Bits 3 and 2 known zero, bit 1 known one.
    let a = kb(0b1100, 0b0010);
    // Bit 3 known zero, bits 1 and 0 known one.
    let b = kb(0b1000, 0b0011);

    let meet = a.meet(&b);
    assert_eq!(meet, kb(0b1100, 0b0011));
    assert!(!meet.is_bottom());
    assert_eq!(
        meet.concrete().collect::<Vec<_>>(),
        vec![b4(0b0011)],
        "the meet pins every bit"
    );

    assert_eq!(a.join(&b), kb(0b1000, 0b0010));
}

#[test]
fn known_bits_conflicts_are_empty() {
    let conflicted = kb(0b0010, 0b0011);
    assert!(conflicted.is_bottom());
    assert_eq!(conflicted.concrete().count(), 0);
    assert_eq!(conflicted.cardinality(), Some(0));
}

#[test]
fn known_bits_distance() {
    let a = kb(0b1100, 0b0010);
    let b = kb(0b1000, 0b0011);
    // zeros differ in bit 2, ones differ in bit 0.
    assert_eq!(a.distance(&b), 2);
    assert_eq!(a.distance(&a), 0);
    // Against an empty value the distance is the unknown count of the other side.
    assert_eq!(a.distance(&KnownBits::bottom(4)), 1);
    assert_eq!(KnownBits::bottom(4).distance(&KnownBits::bottom(4)), 0);
}

#[test]
fn range_meets_detect_disjoint_intervals() {
    let low = UConstRange::new(b4(1), b4(4));
    let high = UConstRange::new(b4(9), b4(12));
    assert!(low.meet(&high).is_bottom());
    assert_eq!(low.join(&high), UConstRange::new(b4(1), b4(12)));
    assert_eq!(low.distance(&high), 16);
}

#[test]
fn signed_range_orders_by_sign() {
    // [-8, -1] and [0, 7] are adjacent in signed order.
    let negative = SConstRange::new(b4(0b1000), b4(0b1111));
    let positive = SConstRange::new(b4(0), b4(7));
    assert!(negative.meet(&positive).is_bottom());
    assert_eq!(negative.join(&positive), SConstRange::top(4));
    assert_eq!(
        negative.concrete().map(|x| x.to_i64()).collect::<Vec<_>>(),
        (-8..=-1).collect::<Vec<_>>()
    );
}

#[test]
fn modulo_singleton_of_seven() {
    let seven = IntegerModulo::from_concrete(b4(7));
    assert_eq!(seven.residues(), [1, 1, 2, 0, 7, 7]);
    assert!(seven.is_constant());
    assert_eq!(
        seven.concrete().collect::<Vec<_>>(),
        vec![b4(7)],
        "the progression step exceeds the width"
    );
}

#[test]
fn modulo_join_of_adjacent_singletons_loses_everything() {
    let seven = IntegerModulo::from_concrete(b4(7));
    let eight = IntegerModulo::from_concrete(b4(8));
    // 7 and 8 disagree modulo every active prime, so each slot goes unknown.
    assert_eq!(seven.join(&eight), IntegerModulo::top(4));
    assert_eq!(seven.distance(&eight), 12);
}

#[test]
fn modulo_meet_of_compatible_residues() {
    // r mod 2 = 1 crossed with r mod 13 = 2 pins 15 at width 4.
    let odd = IntegerModulo::from_slots(4, &[b4(1), b4(3), b4(5), b4(7), b4(11), b4(13)]);
    let two_mod_13 = IntegerModulo::from_slots(4, &[b4(2), b4(3), b4(5), b4(7), b4(11), b4(2)]);
    let meet = odd.meet(&two_mod_13);
    assert_eq!(meet.concrete().collect::<Vec<_>>(), vec![b4(15)]);
}

#[test]
fn modulo_incompatible_meets_are_empty() {
    // {5, 12} and {4, 15} share nothing at width 4; the reconciled base (26)
    // falls outside the width.
    let r7 = IntegerModulo::from_slots(4, &[b4(2), b4(3), b4(5), b4(5), b4(11), b4(13)]);
    let r11 = IntegerModulo::from_slots(4, &[b4(2), b4(3), b4(5), b4(7), b4(4), b4(13)]);
    assert_eq!(
        r7.concrete().collect::<BTreeSet<_>>(),
        BTreeSet::from([b4(5), b4(12)])
    );
    assert_eq!(
        r11.concrete().collect::<BTreeSet<_>>(),
        BTreeSet::from([b4(4), b4(15)])
    );

    let meet = r7.meet(&r11);
    assert!(meet.is_bottom());
    assert_eq!(meet.concrete().count(), 0);
}

#[test]
fn modulo_bad_singleton_folds_to_the_constant() {
    // Residues of 7 with the mod-3 slot unknown: only 7 itself fits width 4,
    // so construction collapses the value to the singleton.
    let folded = IntegerModulo::from_slots(4, &[b4(1), b4(3), b4(2), b4(0), b4(7), b4(7)]);
    assert_eq!(folded, IntegerModulo::from_concrete(b4(7)));
    assert!(folded.is_constant());
}

#[test]
fn modulo_bad_bottom_folds_to_bottom() {
    // Residues of 20: fully fixed, but 20 does not fit width 4.
    let folded = IntegerModulo::from_slots(4, &[b4(0), b4(2), b4(0), b4(6), b4(9), b4(7)]);
    assert_eq!(folded, IntegerModulo::bottom(4));
    assert!(folded.is_bottom());
}

#[test]
fn modulo_overflowed_primes_are_pinned_to_zero() {
    // Width 2 leaves only the primes 2 and 3 active.
    let top = IntegerModulo::top(2);
    assert_eq!(top.residues(), [2, 3, 0, 0, 0, 0]);
    let one = IntegerModulo::from_concrete(Bits::new(2, 1));
    assert_eq!(one.residues(), [1, 1, 0, 0, 0, 0]);
}

#[test]
fn display_formats() {
    assert_eq!(kb(0b1100, 0b0010).to_string(), "001?");
    assert_eq!(kb(0b1100, 0b0011).to_string(), "0011 const: 3");
    assert_eq!(KnownBits::top(4).to_string(), "???? (top)");
    assert_eq!(KnownBits::bottom(4).to_string(), "(bottom)");
    assert_eq!(UConstRange::new(b4(2), b4(9)).to_string(), "[2, 9]");
    assert_eq!(UConstRange::top(4).to_string(), "[0, 15] (top)");
    assert_eq!(
        SConstRange::new(b4(0b1000), b4(7)).to_string(),
        "[-8, 7] (top)"
    );
    assert_eq!(
        IntegerModulo::from_concrete(b4(7)).to_string(),
        "mods: 1 1 2 0 7 7"
    );
    assert_eq!(IntegerModulo::top(4).to_string(), "mods: T T T T T T (top)");
}
