//! Per-batch metric accumulation and rendering.

use core::fmt;

/// Metrics of one transfer function on one triple.
#[derive(Clone, Copy, Debug)]
pub struct Outcome {
    /// The meet with the references still contains every concrete result.
    pub sound: bool,
    /// The meet with the references equals the best abstraction.
    pub exact: bool,
    /// Distance from the meet to the best abstraction.
    pub distance: u64,
    /// The reference meet alone already equals the best abstraction.
    pub solved: bool,
    /// `distance` when sound, otherwise the reference baseline distance.
    pub sound_distance: u64,
}

/// Accumulated metrics of one transfer function over a batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    /// Number of sound cases.
    pub sound: u64,
    /// Number of exact cases.
    pub exact: u64,
    /// Summed distance to best.
    pub distance: u64,
    /// Number of exact cases among unsolved triples.
    pub unsolved_exact: u64,
    /// Summed sound-or-baseline distance.
    pub sound_distance: u64,
}

impl Tally {
    fn record(&mut self, outcome: Outcome) {
        self.sound += u64::from(outcome.sound);
        self.exact += u64::from(outcome.exact);
        self.distance += outcome.distance;
        self.unsolved_exact += u64::from(!outcome.solved && outcome.exact);
        self.sound_distance += outcome.sound_distance;
    }
}

/// Metrics of one evaluation batch.
#[derive(Clone, Debug)]
pub struct Results {
    /// Bit-width of the batch.
    pub width: u32,
    /// Distance normalizer for this width.
    pub max_distance: u64,
    /// Evaluated triples.
    pub cases: u64,
    /// Triples the reference meet did not already solve.
    pub unsolved_cases: u64,
    /// Summed reference-meet distance to best.
    pub base_distance: u64,
    /// Display labels of the evaluated functions.
    pub names: Vec<String>,
    /// One tally per evaluated function, in `names` order.
    pub per_fn: Vec<Tally>,
}

impl Results {
    /// Fresh accumulator for `names.len()` functions at `width`.
    pub fn new(width: u32, max_distance: u64, names: Vec<String>) -> Self {
        let per_fn = vec![Tally::default(); names.len()];
        Self {
            width,
            max_distance,
            cases: 0,
            unsolved_cases: 0,
            base_distance: 0,
            names,
            per_fn,
        }
    }

    /// Fold one outcome into slot `slot`.
    pub fn record(&mut self, slot: usize, outcome: Outcome) {
        self.per_fn[slot].record(outcome);
    }

    /// Bump the per-batch counters after all slots of a triple are recorded.
    pub fn bump_cases(&mut self, solved: bool, base_distance: u64) {
        self.cases += 1;
        self.unsolved_cases += u64::from(!solved);
        self.base_distance += base_distance;
    }

    /// Reference-meet distance averaged over cases and the width normalizer.
    pub fn normalized_base_distance(&self) -> f64 {
        if self.cases == 0 || self.max_distance == 0 {
            return 0.0;
        }
        self.base_distance as f64 / (self.cases as f64 * self.max_distance as f64)
    }
}

fn write_row<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    values: impl Iterator<Item = T>,
) -> fmt::Result {
    write!(f, "{name}:\n[")?;
    for (i, value) in values.enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{value}")?;
    }
    writeln!(f, "]")
}

impl fmt::Display for Results {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "bw: {}", self.width)?;
        writeln!(f, "cases: {}", self.cases)?;
        writeln!(f, "unsolved_cases: {}", self.unsolved_cases)?;
        writeln!(
            f,
            "base_distance: {:.6}",
            self.normalized_base_distance()
        )?;
        write_row(f, "fns", self.names.iter())?;
        write_row(f, "sound", self.per_fn.iter().map(|t| t.sound))?;
        write_row(f, "distance", self.per_fn.iter().map(|t| t.distance))?;
        write_row(f, "exact", self.per_fn.iter().map(|t| t.exact))?;
        write_row(f, "unsolved_exact", self.per_fn.iter().map(|t| t.unsolved_exact))?;
        write_row(
            f,
            "sound_distance",
            self.per_fn.iter().map(|t| t.sound_distance),
        )
    }
}

/// Size-of-image metrics of one candidate over a high-bit-width batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HighTally {
    /// Summed candidate image sizes.
    pub syn_size: u64,
    /// Summed sizes of the candidate meet with the reference meet.
    pub meet_size: u64,
    /// Number of empty candidate outputs.
    pub bottoms: u64,
}

/// High-bit-width batch metrics, where the best column is unreliable.
#[derive(Clone, Debug)]
pub struct HighBwResults {
    /// Bit-width of the batch.
    pub width: u32,
    /// Evaluated triples.
    pub samples: u64,
    /// Summed reference-meet image sizes.
    pub ref_size: u64,
    /// Cardinalities too large to represent; counted as zero in the sums.
    pub unknown_sizes: u64,
    /// Display labels of the candidates.
    pub names: Vec<String>,
    /// One tally per candidate, in `names` order.
    pub per_fn: Vec<HighTally>,
}

impl HighBwResults {
    /// Fresh accumulator for `names.len()` candidates at `width`.
    pub fn new(width: u32, names: Vec<String>) -> Self {
        let per_fn = vec![HighTally::default(); names.len()];
        Self {
            width,
            samples: 0,
            ref_size: 0,
            unknown_sizes: 0,
            names,
            per_fn,
        }
    }

    /// Resolve a cardinality to its summand, counting unknowns aside.
    pub fn add_size(&mut self, size: Option<u64>) -> u64 {
        match size {
            Some(n) => n,
            None => {
                self.unknown_sizes += 1;
                0
            }
        }
    }
}

impl fmt::Display for HighBwResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "bw: {}", self.width)?;
        writeln!(f, "num samples: {}", self.samples)?;
        writeln!(f, "ref score: {}", self.ref_size)?;
        writeln!(f, "unknown sizes: {}", self.unknown_sizes)?;
        write_row(f, "fns", self.names.iter())?;
        write_row(f, "synth score sums", self.per_fn.iter().map(|t| t.syn_size))?;
        write_row(f, "meet score sums", self.per_fn.iter().map(|t| t.meet_size))?;
        write_row(f, "synth bottoms", self.per_fn.iter().map(|t| t.bottoms))
    }
}
