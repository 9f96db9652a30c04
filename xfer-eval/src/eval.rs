//! The evaluator: transfer functions against pre-generated triples.

use rayon::prelude::*;
use xfer_domains::AbstractDomain;

use crate::corpus::{Batch, Triple};
use crate::results::{HighBwResults, Outcome, Results};
use crate::Error;

/// A transfer function lifted over one domain.
pub type XferFn<D> = fn(&D, &D) -> D;

/// A transfer function with its registry name.
#[derive(Clone)]
pub struct NamedXfer<D> {
    /// Registry name, used in result rows.
    pub name: String,
    /// The function itself.
    pub func: XferFn<D>,
}

impl<D> NamedXfer<D> {
    /// Pair a function with its name.
    pub fn new(name: impl Into<String>, func: XferFn<D>) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

/// Applies candidates and references to triples and accumulates metrics.
///
/// Holds no per-batch state; batches are evaluated independently and in
/// parallel, each one sequentially.
pub struct Evaluator<D> {
    candidates: Vec<NamedXfer<D>>,
    references: Vec<NamedXfer<D>>,
}

impl<D: AbstractDomain + Send + Sync> Evaluator<D> {
    /// Build an evaluator from candidate and reference functions.
    pub fn new(candidates: Vec<NamedXfer<D>>, references: Vec<NamedXfer<D>>) -> Self {
        Self {
            candidates,
            references,
        }
    }

    /// Evaluate one triple into `results`. Bottom-best triples are skipped.
    fn eval_single(&self, triple: &Triple<D>, results: &mut Results) {
        let Triple { lhs, rhs, best } = triple;
        if best.is_bottom() {
            return;
        }
        let width = lhs.width();

        let syn_out: Vec<D> = self
            .candidates
            .iter()
            .map(|f| (f.func)(lhs, rhs))
            .collect();
        let ref_out: Vec<D> = self
            .references
            .iter()
            .map(|f| (f.func)(lhs, rhs))
            .collect();

        let ref_meet = D::meet_all(ref_out.iter(), width);
        let solved = ref_meet == *best;
        let base_distance = ref_meet.distance(best);

        for (slot, out) in syn_out.iter().enumerate() {
            let after_meet = ref_meet.meet(out);
            let sound = after_meet.is_superset(best);
            let exact = after_meet == *best;
            let distance = after_meet.distance(best);
            results.record(
                slot,
                Outcome {
                    sound,
                    exact,
                    distance,
                    solved,
                    sound_distance: if sound { distance } else { base_distance },
                },
            );
        }

        results.bump_cases(solved, base_distance);
    }

    fn candidate_names(&self) -> Vec<String> {
        self.candidates.iter().map(|f| f.name.clone()).collect()
    }

    /// Evaluate one batch sequentially.
    pub fn eval_batch(&self, batch: &Batch<D>) -> Results {
        let mut results = Results::new(
            batch.meta.width,
            D::max_distance(batch.meta.width),
            self.candidate_names(),
        );
        for triple in &batch.triples {
            self.eval_single(triple, &mut results);
        }
        tracing::debug!(
            width = batch.meta.width,
            cases = results.cases,
            unsolved = results.unsolved_cases,
            "evaluated batch"
        );
        results
    }

    /// Evaluate every batch; batches run in parallel.
    pub fn eval(&self, batches: &[Batch<D>]) -> Vec<Results> {
        batches.par_iter().map(|b| self.eval_batch(b)).collect()
    }

    /// Size-of-image evaluation for batches with unreliable best columns.
    pub fn eval_high(&self, batches: &[Batch<D>]) -> Vec<HighBwResults> {
        batches
            .par_iter()
            .map(|batch| {
                let mut results = HighBwResults::new(batch.meta.width, self.candidate_names());
                for Triple { lhs, rhs, .. } in &batch.triples {
                    let ref_out: Vec<D> = self
                        .references
                        .iter()
                        .map(|f| (f.func)(lhs, rhs))
                        .collect();
                    let ref_meet = D::meet_all(ref_out.iter(), lhs.width());
                    let ref_size = results.add_size(ref_meet.cardinality());
                    results.ref_size += ref_size;

                    for (slot, f) in self.candidates.iter().enumerate() {
                        let out = (f.func)(lhs, rhs);
                        let syn_size = results.add_size(out.cardinality());
                        let meet_size = results.add_size(ref_meet.meet(&out).cardinality());
                        let tally = &mut results.per_fn[slot];
                        tally.syn_size += syn_size;
                        tally.meet_size += meet_size;
                        tally.bottoms += u64::from(out.is_bottom());
                    }
                    results.samples += 1;
                }
                results
            })
            .collect()
    }

    /// Rank the fixed final-mode participants: top, the single reference,
    /// the bridged library function when present, and the meet of reference
    /// and library. Requires exactly one reference and no candidates.
    pub fn eval_final(
        &self,
        bridged: Option<&NamedXfer<D>>,
        batches: &[Batch<D>],
    ) -> Result<Vec<Results>, Error> {
        if !self.candidates.is_empty() || self.references.len() != 1 {
            return Err(Error::FinalModeArity);
        }
        let reference = &self.references[0];

        let mut names = vec!["top".to_owned(), reference.name.clone()];
        if let Some(lib) = bridged {
            names.push(format!("library:{}", lib.name));
            names.push("meet".to_owned());
        }

        Ok(batches
            .par_iter()
            .map(|batch| {
                let width = batch.meta.width;
                let mut results =
                    Results::new(width, D::max_distance(width), names.clone());
                let top = D::top(width);

                for Triple { lhs, rhs, best } in &batch.triples {
                    if best.is_bottom() {
                        continue;
                    }

                    let ref_out = (reference.func)(lhs, rhs);
                    let mut rows = vec![top.clone(), ref_out.clone()];
                    if let Some(lib) = bridged {
                        let lib_out = (lib.func)(lhs, rhs);
                        let met = ref_out.meet(&lib_out);
                        rows.push(lib_out);
                        rows.push(met);
                    }

                    for (slot, out) in rows.iter().enumerate() {
                        results.record(
                            slot,
                            Outcome {
                                sound: false,
                                exact: *out == *best,
                                distance: out.distance(best),
                                solved: false,
                                sound_distance: 0,
                            },
                        );
                    }
                    results.bump_cases(false, 0);
                }
                results
            })
            .collect())
    }
}
