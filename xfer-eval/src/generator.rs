//! Corpus generation across the three regimes.

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::SeedableRng;
use xfer_domains::AbstractDomain;

use crate::corpus::{self, Batch, BatchMeta, Regime, Triple};
use crate::oracle::BestAbstractor;
use crate::Error;

/// Random-regime request: `samples` triples at `width`.
#[derive(Clone, Copy, Debug)]
pub struct MidSpec {
    /// Bit-width.
    pub width: u32,
    /// Number of triples to draw.
    pub samples: u32,
}

/// Approximated-regime request: `samples` triples at `width`, each best
/// column built from `draws` concrete samples.
#[derive(Clone, Copy, Debug)]
pub struct HighSpec {
    /// Bit-width.
    pub width: u32,
    /// Number of triples to draw.
    pub samples: u32,
    /// Concrete draws per best column.
    pub draws: u32,
}

/// What to generate for one run.
#[derive(Clone, Debug, Default)]
pub struct GenPlan {
    /// Widths to enumerate exhaustively.
    pub lows: Vec<u32>,
    /// Random sampling with exact best outputs.
    pub mids: Vec<MidSpec>,
    /// Random sampling with approximated best outputs.
    pub highs: Vec<HighSpec>,
}

/// Produces the evaluator's input corpus for one concrete operation.
pub struct SampleGenerator<'a> {
    oracle: BestAbstractor<'a>,
}

impl<'a> SampleGenerator<'a> {
    /// Bind the generator to an oracle.
    pub fn new(oracle: BestAbstractor<'a>) -> Self {
        Self { oracle }
    }

    /// Every input pair of the full lattice whose best output is non-bottom.
    pub fn full_lattice<D: AbstractDomain>(&self, width: u32) -> Vec<Triple<D>> {
        let lattice = D::enumerate(width);
        let mut triples = Vec::new();
        for lhs in &lattice {
            for rhs in &lattice {
                let best = self.oracle.best(lhs, rhs);
                if best.is_bottom() {
                    continue;
                }
                triples.push(Triple {
                    lhs: lhs.clone(),
                    rhs: rhs.clone(),
                    best,
                });
            }
        }
        tracing::debug!(width, triples = triples.len(), "enumerated full lattice");
        triples
    }

    /// Random pairs with exact best outputs; bottom bests are re-drawn.
    pub fn sampled<D: AbstractDomain>(
        &self,
        rng: &mut StdRng,
        spec: MidSpec,
    ) -> Vec<Triple<D>> {
        (0..spec.samples)
            .map(|_| {
                let (lhs, rhs, best) = self.oracle.sample_triple(rng, spec.width);
                Triple { lhs, rhs, best }
            })
            .collect()
    }

    /// Random pairs with approximated best outputs; bottoms are kept.
    pub fn sampled_approx<D: AbstractDomain>(
        &self,
        rng: &mut StdRng,
        spec: HighSpec,
    ) -> Vec<Triple<D>> {
        (0..spec.samples)
            .map(|_| {
                let (lhs, rhs, best) =
                    self.oracle
                        .sample_triple_approx(rng, spec.width, spec.draws);
                Triple { lhs, rhs, best }
            })
            .collect()
    }

    /// Generate every batch of `plan` in memory.
    ///
    /// Deterministic for a fixed `(seed, domain, plan)`.
    pub fn generate<D: AbstractDomain>(&self, plan: &GenPlan, seed: u64) -> Vec<Batch<D>> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut batches = Vec::new();

        for width in plan.lows.iter().copied() {
            let triples = self.full_lattice::<D>(width);
            batches.push(Batch {
                meta: BatchMeta {
                    regime: Regime::Low,
                    width,
                    samples: triples.len(),
                },
                triples,
            });
        }
        for spec in plan.mids.iter().copied() {
            let triples = self.sampled::<D>(&mut rng, spec);
            batches.push(Batch {
                meta: BatchMeta {
                    regime: Regime::Med,
                    width: spec.width,
                    samples: triples.len(),
                },
                triples,
            });
        }
        for spec in plan.highs.iter().copied() {
            let triples = self.sampled_approx::<D>(&mut rng, spec);
            batches.push(Batch {
                meta: BatchMeta {
                    regime: Regime::High,
                    width: spec.width,
                    samples: triples.len(),
                },
                triples,
            });
        }
        batches
    }

    /// Generate and persist every batch of `plan` under `dir`.
    pub fn generate_to_dir<D: AbstractDomain>(
        &self,
        plan: &GenPlan,
        seed: u64,
        dir: &Path,
    ) -> Result<Vec<PathBuf>, Error> {
        let batches = self.generate::<D>(plan, seed);
        let mut written = Vec::with_capacity(batches.len());
        for batch in &batches {
            let path = dir.join(batch.meta.file_name());
            corpus::write_batch(&path, &batch.triples)?;
            tracing::debug!(file = %path.display(), "wrote batch");
            written.push(path);
        }
        Ok(written)
    }
}
