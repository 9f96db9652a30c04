//! Best-abstraction oracle.
//!
//! For a concrete operation and two abstract inputs, the tightest abstract
//! output is the join of the singletons of every admissible concrete result.
//! The exhaustive form walks the cartesian product of the concretizations;
//! the sampled form replaces it with random draws for widths where the
//! product is prohibitive.

use itertools::iproduct;
use rand::Rng;
use xfer_domains::AbstractDomain;

use crate::ops::ConcreteOp;

/// Computes best abstractions for one concrete operation.
pub struct BestAbstractor<'a> {
    op: &'a ConcreteOp,
}

impl<'a> BestAbstractor<'a> {
    /// Bind the oracle to an operation.
    pub fn new(op: &'a ConcreteOp) -> Self {
        Self { op }
    }

    /// The operation this oracle evaluates.
    pub fn op(&self) -> &'a ConcreteOp {
        self.op
    }

    /// Tightest abstraction of the image of `lhs × rhs` under the operation.
    ///
    /// Bottom when no admissible pair exists; callers skip such inputs.
    pub fn best<D: AbstractDomain>(&self, lhs: &D, rhs: &D) -> D {
        debug_assert_eq!(lhs.width(), rhs.width());
        let width = lhs.width();
        iproduct!(lhs.concrete(), rhs.concrete())
            .filter(|(x, y)| self.op.admits(*x, *y))
            .fold(D::bottom(width), |acc, (x, y)| {
                acc.join(&D::from_concrete((self.op.apply)(x, y)))
            })
    }

    /// Approximate best abstraction from `draws` random concrete pairs.
    ///
    /// Used where the concretizations are too large to enumerate; the result
    /// under-approximates the true best abstraction and may be bottom.
    pub fn best_sampled<D, R>(&self, rng: &mut R, lhs: &D, rhs: &D, draws: u32) -> D
    where
        D: AbstractDomain,
        R: Rng + ?Sized,
    {
        debug_assert_eq!(lhs.width(), rhs.width());
        let mut acc = D::bottom(lhs.width());
        for _ in 0..draws {
            let x = lhs.sample_concrete(rng);
            let y = rhs.sample_concrete(rng);
            if self.op.admits(x, y) {
                acc = acc.join(&D::from_concrete((self.op.apply)(x, y)));
            }
        }
        acc
    }

    /// Draw a random input pair whose exact best abstraction is non-bottom.
    pub fn sample_triple<D, R>(&self, rng: &mut R, width: u32) -> (D, D, D)
    where
        D: AbstractDomain,
        R: Rng + ?Sized,
    {
        loop {
            let lhs = D::sample(rng, width);
            let rhs = D::sample(rng, width);
            let best = self.best(&lhs, &rhs);
            if !best.is_bottom() {
                return (lhs, rhs, best);
            }
        }
    }

    /// Draw a random input pair with a sampled (possibly bottom) best column.
    pub fn sample_triple_approx<D, R>(&self, rng: &mut R, width: u32, draws: u32) -> (D, D, D)
    where
        D: AbstractDomain,
        R: Rng + ?Sized,
    {
        let lhs = D::sample(rng, width);
        let rhs = D::sample(rng, width);
        let best = self.best_sampled(rng, &lhs, &rhs, draws);
        (lhs, rhs, best)
    }
}
