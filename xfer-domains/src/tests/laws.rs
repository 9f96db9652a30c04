//! Lattice and concretization laws, checked on sampled elements of every
//! domain at the widths where exhaustive concretization stays cheap.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::{AbstractDomain, IntegerModulo, KnownBits, SConstRange, UConstRange};

fn triples<D: AbstractDomain>(seed: u64, widths: &[u32]) -> Vec<(D, D)> {
    let mut rng = StdRng::seed_from_u64(seed);
    widths
        .iter()
        .map(|w| (D::sample(&mut rng, *w), D::sample(&mut rng, *w)))
        .collect()
}

fn values_of<D: AbstractDomain>(v: &D) -> BTreeSet<u64> {
    v.concrete().map(|x| x.to_u64()).collect()
}

fn lattice_laws_hold<D: AbstractDomain>(seed: u64, widths: &[u32]) -> bool {
    triples::<D>(seed, widths).into_iter().all(|(a, b)| {
        let w = a.width();
        let top = D::top(w);
        let bottom = D::bottom(w);

        a.meet(&top) == a
            && a.meet(&bottom) == bottom
            && a.join(&top) == top
            && a.join(&bottom) == a
            && a.meet(&b) == b.meet(&a)
            && a.join(&b) == b.join(&a)
            && a.meet(&a.join(&b)) == a
            && a.join(&a.meet(&b)) == a
            && a.join(&b).is_superset(&a)
            && ((a == b) == (a.distance(&b) == 0))
            && a.distance(&a) == 0
    })
}

fn concretization_laws_hold<D: AbstractDomain>(seed: u64, widths: &[u32]) -> bool {
    triples::<D>(seed, widths).into_iter().all(|(a, b)| {
        let lhs = values_of(&a);
        let rhs = values_of(&b);

        let meet = values_of(&a.meet(&b));
        let join = values_of(&a.join(&b));

        let intersection: BTreeSet<u64> = lhs.intersection(&rhs).copied().collect();
        let union: BTreeSet<u64> = lhs.union(&rhs).copied().collect();

        meet == intersection && union.is_subset(&join)
    })
}

fn extremes_concretize_correctly<D: AbstractDomain>(widths: &[u32]) -> bool {
    widths.iter().all(|w| {
        let everything: BTreeSet<u64> = (0..=u64::MAX >> (64 - w)).collect();
        values_of(&D::bottom(*w)).is_empty() && values_of(&D::top(*w)) == everything
    })
}

fn cardinality_matches_enumeration<D: AbstractDomain>(seed: u64, widths: &[u32]) -> bool {
    triples::<D>(seed, widths).into_iter().all(|(a, b)| {
        a.cardinality() == Some(a.concrete().count() as u64)
            && b.cardinality() == Some(b.concrete().count() as u64)
    })
}

fn samples_are_never_bottom<D: AbstractDomain>(seed: u64, widths: &[u32]) -> bool {
    let mut rng = StdRng::seed_from_u64(seed);
    widths.iter().all(|w| {
        (0..16).all(|_| {
            let v = D::sample(&mut rng, *w);
            !v.is_bottom() && v.sample_concrete(&mut rng).width() == *w
        })
    })
}

fn sampled_members_are_members<D: AbstractDomain>(seed: u64, widths: &[u32]) -> bool {
    let mut rng = StdRng::seed_from_u64(seed);
    widths.iter().all(|w| {
        let v = D::sample(&mut rng, *w);
        let members = values_of(&v);
        (0..16).all(|_| members.contains(&v.sample_concrete(&mut rng).to_u64()))
    })
}

fn enumeration_is_valid_and_contains_top<D: AbstractDomain>(widths: &[u32]) -> bool {
    widths.iter().all(|w| {
        let all = D::enumerate(*w);
        all.iter().any(|v| v.is_top()) && all.iter().all(|v| !v.is_bottom())
    })
}

macro_rules! domain_law_suite {
    ($name:ident, $domain:ty, $widths:expr) => {
        mod $name {
            use super::*;

            const WIDTHS: &[u32] = $widths;

            #[quickcheck_macros::quickcheck]
            fn lattice_laws(seed: u64) -> bool {
                lattice_laws_hold::<$domain>(seed, WIDTHS)
            }

            #[quickcheck_macros::quickcheck]
            fn concretization_laws(seed: u64) -> bool {
                concretization_laws_hold::<$domain>(seed, WIDTHS)
            }

            #[quickcheck_macros::quickcheck]
            fn cardinality_counts(seed: u64) -> bool {
                cardinality_matches_enumeration::<$domain>(seed, WIDTHS)
            }

            #[quickcheck_macros::quickcheck]
            fn sampling_stays_valid(seed: u64) -> bool {
                samples_are_never_bottom::<$domain>(seed, WIDTHS)
                    && sampled_members_are_members::<$domain>(seed, WIDTHS)
            }

            #[test]
            fn bottom_and_top_concretize_correctly() {
                assert!(extremes_concretize_correctly::<$domain>(WIDTHS));
            }

            #[test]
            fn enumeration_is_clean() {
                assert!(enumeration_is_valid_and_contains_top::<$domain>(WIDTHS));
            }
        }
    };
}

domain_law_suite!(known_bits, KnownBits, &[1, 2, 3, 4]);
domain_law_suite!(uconst_range, UConstRange, &[1, 2, 3, 4]);
domain_law_suite!(sconst_range, SConstRange, &[1, 2, 3, 4]);
// Width 1 leaves the residue domain without an active modulus, collapsing the
// lattice to a single element; the laws are only meaningful from width 2 up.
domain_law_suite!(integer_modulo, IntegerModulo, &[2, 3, 4, 6]);

#[quickcheck_macros::quickcheck]
fn singletons_concretize_to_their_value(seed: u64) -> bool {
    use xfer_types::Bits;

    let mut rng = StdRng::seed_from_u64(seed);
    (2u32..=6).all(|w| {
        let raw = rand::Rng::gen_range(&mut rng, 0..=Bits::max_value(w).to_u64());
        let x = Bits::new(w, raw);
        values_of(&KnownBits::from_concrete(x)) == BTreeSet::from([raw])
            && values_of(&UConstRange::from_concrete(x)) == BTreeSet::from([raw])
            && values_of(&SConstRange::from_concrete(x)) == BTreeSet::from([raw])
            && values_of(&IntegerModulo::from_concrete(x)) == BTreeSet::from([raw])
    })
}
