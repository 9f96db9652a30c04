//! Evaluator tallies on corpora with known structure.

use xfer_domains::{AbstractDomain, KnownBits};

use crate::bridge::{baseline, BridgeDomain};
use crate::corpus::{Batch, BatchMeta, Regime};
use crate::eval::{Evaluator, NamedXfer};
use crate::generator::SampleGenerator;
use crate::oracle::BestAbstractor;
use crate::ops;
use crate::Error;

fn and_lattice_batch(width: u32) -> Batch<KnownBits> {
    let abstractor = BestAbstractor::new(ops::lookup("And").expect("known op"));
    let triples = SampleGenerator::new(abstractor).full_lattice::<KnownBits>(width);
    Batch {
        meta: BatchMeta {
            regime: Regime::Low,
            width,
            samples: triples.len(),
        },
        triples,
    }
}

fn named(name: &str) -> NamedXfer<KnownBits> {
    let func = baseline::<KnownBits>(name)
        .or_else(|| KnownBits::bridged(name))
        .expect("resolvable function");
    NamedXfer::new(name, func)
}

#[test]
fn strong_references_solve_everything() {
    // The known-bits AND transfer is optimal, so the reference meet always
    // equals the best column and every triple counts as solved.
    let batch = and_lattice_batch(2);
    let evaluator = Evaluator::new(vec![named("And"), named("top")], vec![named("And")]);
    let results = evaluator.eval_batch(&batch);

    assert_eq!(results.cases, batch.meta.samples as u64);
    assert_eq!(results.unsolved_cases, 0);
    assert_eq!(results.base_distance, 0);

    // Both candidates meet down to the reference meet, which is already best.
    for tally in &results.per_fn {
        assert_eq!(tally.exact, results.cases);
        assert_eq!(tally.sound, results.cases);
        assert_eq!(tally.distance, 0);
        assert_eq!(tally.unsolved_exact, 0);
        assert_eq!(tally.sound_distance, 0);
    }
}

#[test]
fn weak_references_expose_candidate_quality() {
    let batch = and_lattice_batch(2);
    let evaluator = Evaluator::new(
        vec![named("And"), named("top"), named("bottom")],
        vec![named("top")],
    );
    let results = evaluator.eval_batch(&batch);

    assert_eq!(results.cases, batch.meta.samples as u64);
    assert!(results.unsolved_cases > 0);
    assert!(results.base_distance > 0);

    let and = &results.per_fn[0];
    let top = &results.per_fn[1];
    let bottom = &results.per_fn[2];

    // The optimal candidate stays exact and sound everywhere.
    assert_eq!(and.exact, results.cases);
    assert_eq!(and.sound, results.cases);
    assert_eq!(and.distance, 0);
    assert_eq!(and.unsolved_exact, results.unsolved_cases);

    // A top candidate is always sound and reproduces the reference baseline.
    assert_eq!(top.sound, results.cases);
    assert_eq!(top.distance, results.base_distance);
    assert_eq!(top.exact, results.cases - results.unsolved_cases);

    // A bottom candidate claims an empty image: never sound, never exact,
    // and it falls back to the baseline distance.
    assert_eq!(bottom.sound, 0);
    assert_eq!(bottom.exact, 0);
    assert_eq!(bottom.sound_distance, results.base_distance);
}

#[test]
fn more_references_never_hurt() {
    let batch = and_lattice_batch(2);
    let weak = Evaluator::new(vec![named("top")], vec![named("top")]).eval_batch(&batch);
    let strong = Evaluator::new(vec![named("top")], vec![named("top"), named("And")])
        .eval_batch(&batch);

    assert!(strong.base_distance <= weak.base_distance);
    assert!(strong.unsolved_cases <= weak.unsolved_cases);
    assert_eq!(strong.cases, weak.cases);
}

#[test]
fn bottom_best_triples_are_skipped() {
    // AddNuw over singleton eights has no admissible pairs.
    let abstractor = BestAbstractor::new(ops::lookup("AddNuw").expect("known op"));
    let generator = SampleGenerator::new(abstractor);
    let triples = generator.full_lattice::<KnownBits>(2);
    let total_pairs = KnownBits::enumerate(2).len().pow(2);
    assert!(triples.len() < total_pairs, "some pairs must be skipped");

    let batch = Batch {
        meta: BatchMeta {
            regime: Regime::Low,
            width: 2,
            samples: triples.len(),
        },
        triples,
    };
    let evaluator = Evaluator::new(vec![named("top")], vec![named("top")]);
    let results = evaluator.eval_batch(&batch);
    assert_eq!(results.cases, batch.meta.samples as u64);
}

#[test]
fn high_mode_reports_image_sizes() {
    let batch = and_lattice_batch(3);
    let evaluator = Evaluator::new(vec![named("And")], vec![named("top")]);
    let results = evaluator.eval_high(&[batch.clone()]);
    assert_eq!(results.len(), 1);
    let high = &results[0];

    assert_eq!(high.samples, batch.triples.len() as u64);
    assert_eq!(high.unknown_sizes, 0);
    // Meeting with the reference can only shrink the image.
    assert!(high.per_fn[0].meet_size <= high.per_fn[0].syn_size);
    assert!(high.per_fn[0].meet_size <= high.ref_size);
    // AND of two conflict-free mask pairs never conflicts.
    assert_eq!(high.per_fn[0].bottoms, 0);
}

#[test]
fn final_mode_ranks_the_fixed_participants() {
    let batch = and_lattice_batch(2);
    let evaluator = Evaluator::new(Vec::new(), vec![named("And")]);
    let bridged = NamedXfer::new("And", KnownBits::bridged("And").expect("bridged"));
    let results = evaluator
        .eval_final(Some(&bridged), &[batch])
        .expect("final mode");
    assert_eq!(results.len(), 1);
    let results = &results[0];

    assert_eq!(results.names, ["top", "And", "library:And", "meet"]);
    // Final mode bumps the batch counters with zeros, so no case is solved.
    assert_eq!(results.unsolved_cases, results.cases);
    assert_eq!(results.base_distance, 0);

    let top = &results.per_fn[0];
    let reference = &results.per_fn[1];
    let library = &results.per_fn[2];
    let meet = &results.per_fn[3];

    // The optimal reference, library function, and their meet are exact on
    // every case; top only when the best abstraction is itself top.
    assert_eq!(reference.exact, results.cases);
    assert_eq!(reference.unsolved_exact, reference.exact);
    assert_eq!(library.exact, results.cases);
    assert_eq!(meet.exact, results.cases);
    assert!(top.exact < results.cases);
    assert!(top.distance > 0);
}

#[test]
fn final_mode_arity_is_enforced() {
    let evaluator = Evaluator::new(Vec::new(), vec![named("And"), named("top")]);
    let outcome = evaluator.eval_final(None, &[]);
    assert!(matches!(outcome, Err(Error::FinalModeArity)));
}
