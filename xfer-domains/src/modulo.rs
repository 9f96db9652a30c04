use core::fmt;

use rand::Rng;
use xfer_types::Bits;

use crate::AbstractDomain;

/// Number of residue slots.
pub const MODULI: usize = 6;

/// The moduli: the first six primes.
pub const PRIMES: [u64; MODULI] = [2, 3, 5, 7, 11, 13];

/// Residue lattice modulo the first six primes.
///
/// Slot `i` holds a residue in `0..PRIMES[i]`, the sentinel `PRIMES[i]` for
/// "unknown modulo this prime", or `PRIMES[i] + 1` for bottom. A prime larger
/// than the width's value range plays no part; its slot is pinned to zero.
/// The fixed residues reconcile through the Chinese remainder theorem into a
/// base value `crt` and a step `modulus`, so the concretization is the
/// arithmetic progression `crt, crt + modulus, …` inside the width.
#[derive(Clone, Copy, Debug)]
pub struct IntegerModulo {
    width: u32,
    residues: [u64; MODULI],
    // Cached CRT reconstruction; a function of width and residues.
    crt: u64,
    modulus: u64,
    unknown: u32,
}

impl PartialEq for IntegerModulo {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width && self.residues == other.residues
    }
}

impl Eq for IntegerModulo {}

fn prime_overflowed(width: u32, slot: usize) -> bool {
    PRIMES[slot] > Bits::max_value(width).to_u64()
}

fn mod_inv(value: u64, modulus: u64) -> u64 {
    debug_assert!(modulus > 1);
    let mut a = (value % modulus) as i64;
    let mut b = modulus as i64;
    let (mut x0, mut x1) = (0i64, 1i64);
    while a > 1 {
        let q = a / b;
        let r = a % b;
        a = b;
        b = r;
        let t = x1 - q * x0;
        x1 = x0;
        x0 = t;
    }
    if x1 < 0 {
        x1 += modulus as i64;
    }
    x1 as u64
}

impl IntegerModulo {
    /// Residue tuple, sentinel-encoded as described on the type.
    pub fn residues(&self) -> [u64; MODULI] {
        self.residues
    }

    /// Whether every active residue is fixed.
    pub fn is_constant(&self) -> bool {
        self.unknown == 0
    }

    /// The single reconciled value of a constant.
    pub fn constant(&self) -> Bits {
        debug_assert!(self.is_constant());
        Bits::new(self.width, self.crt)
    }

    fn max(&self) -> u64 {
        Bits::max_value(self.width).to_u64()
    }

    /// All residues fixed but the reconciled value falls outside the width.
    fn is_bad_bottom(&self) -> bool {
        self.unknown == 0 && self.crt > self.max()
    }

    /// Unknown slots remain but only one progression member fits the width.
    fn is_bad_singleton(&self) -> bool {
        self.unknown != 0
            && self
                .crt
                .checked_add(self.modulus)
                .map_or(true, |next| next > self.max())
    }

    fn normalize(width: u32, residues: [u64; MODULI], fix_bad: bool) -> Self {
        let mut residues = residues;
        let mut unknown = 0;
        let mut modulus = 1u64;
        for (i, residue) in residues.iter().enumerate() {
            if *residue == PRIMES[i] {
                unknown += 1;
            } else if !prime_overflowed(width, i) {
                modulus *= PRIMES[i];
            }
        }

        let mut crt = 0u64;
        for (i, residue) in residues.iter().enumerate() {
            if *residue == PRIMES[i] || prime_overflowed(width, i) {
                continue;
            }
            let pp = modulus / PRIMES[i];
            crt += residue * mod_inv(pp, PRIMES[i]) * pp;
        }
        crt %= modulus;

        for (i, residue) in residues.iter_mut().enumerate() {
            if prime_overflowed(width, i) {
                *residue = 0;
            }
        }

        let value = Self {
            width,
            residues,
            crt,
            modulus,
            unknown,
        };
        if fix_bad {
            if value.is_bad_bottom() {
                return Self::bottom(width);
            }
            if value.is_bad_singleton() {
                return Self::from_concrete(Bits::new(width, value.crt));
            }
        }
        value
    }

    fn is_valid(&self) -> bool {
        if self.is_bad_bottom() || self.is_bad_singleton() {
            return false;
        }
        self.residues
            .iter()
            .enumerate()
            .all(|(i, residue)| *residue <= PRIMES[i])
    }
}

/// Walk along the arithmetic progression of an [`IntegerModulo`] value.
#[derive(Clone, Debug)]
pub struct IntegerModuloValues {
    width: u32,
    next: Option<u64>,
    step: u64,
    max: u64,
}

impl Iterator for IntegerModuloValues {
    type Item = Bits;

    fn next(&mut self) -> Option<Bits> {
        let cur = self.next?;
        self.next = cur
            .checked_add(self.step)
            .filter(|candidate| *candidate <= self.max);
        Some(Bits::new(self.width, cur))
    }
}

impl AbstractDomain for IntegerModulo {
    const SLOTS: usize = MODULI;

    type Concrete = IntegerModuloValues;

    fn bottom(width: u32) -> Self {
        let mut residues = [0u64; MODULI];
        let mut modulus = 1;
        for (i, residue) in residues.iter_mut().enumerate() {
            if prime_overflowed(width, i) {
                continue;
            }
            *residue = PRIMES[i] + 1;
            modulus *= PRIMES[i];
        }
        Self {
            width,
            residues,
            crt: 0,
            modulus,
            unknown: 0,
        }
    }

    fn top(width: u32) -> Self {
        let mut residues = [0u64; MODULI];
        for (i, residue) in residues.iter_mut().enumerate() {
            if prime_overflowed(width, i) {
                continue;
            }
            *residue = PRIMES[i];
        }
        Self {
            width,
            residues,
            crt: 0,
            modulus: 1,
            unknown: MODULI as u32,
        }
    }

    fn from_concrete(value: Bits) -> Self {
        let width = value.width();
        let mut residues = [0u64; MODULI];
        let mut modulus = 1;
        for (i, residue) in residues.iter_mut().enumerate() {
            if prime_overflowed(width, i) {
                continue;
            }
            *residue = value.to_u64() % PRIMES[i];
            modulus *= PRIMES[i];
        }
        Self {
            width,
            residues,
            crt: value.to_u64(),
            modulus,
            unknown: 0,
        }
    }

    fn from_slots(width: u32, slots: &[Bits]) -> Self {
        debug_assert_eq!(slots.len(), Self::SLOTS);
        let mut residues = [0u64; MODULI];
        for (residue, slot) in residues.iter_mut().zip(slots) {
            debug_assert_eq!(slot.width(), width);
            *residue = slot.to_u64();
        }
        Self::normalize(width, residues, true)
    }

    fn slots(&self) -> Vec<Bits> {
        self.residues
            .iter()
            .map(|residue| Bits::new(self.width, *residue))
            .collect()
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn meet(&self, rhs: &Self) -> Self {
        let mut residues = [0u64; MODULI];
        for i in 0..MODULI {
            let (a, b) = (self.residues[i], rhs.residues[i]);
            residues[i] = if a == b {
                a
            } else if a == PRIMES[i] {
                b
            } else if b == PRIMES[i] {
                a
            } else {
                // Fixed and different: the progressions are disjoint.
                return Self::bottom(self.width);
            };
        }
        Self::normalize(self.width, residues, false)
    }

    fn join(&self, rhs: &Self) -> Self {
        let mut residues = [0u64; MODULI];
        for i in 0..MODULI {
            let (a, b) = (self.residues[i], rhs.residues[i]);
            residues[i] = if a == b {
                a
            } else if a == PRIMES[i] + 1 {
                return *rhs;
            } else if b == PRIMES[i] + 1 {
                return *self;
            } else {
                PRIMES[i]
            };
        }
        Self::normalize(self.width, residues, false)
    }

    fn is_bottom(&self) -> bool {
        // Empty when a slot holds the bottom sentinel or when the reconciled
        // base already falls outside the width.
        self.crt > self.max()
            || self
                .residues
                .iter()
                .enumerate()
                .any(|(i, residue)| !prime_overflowed(self.width, i) && *residue > PRIMES[i])
    }

    fn concrete(&self) -> IntegerModuloValues {
        IntegerModuloValues {
            width: self.width,
            next: (!self.is_bottom()).then_some(self.crt),
            step: self.modulus,
            max: self.max(),
        }
    }

    fn cardinality(&self) -> Option<u64> {
        if self.is_bottom() {
            Some(0)
        } else {
            ((self.max() - self.crt) / self.modulus).checked_add(1)
        }
    }

    fn sample<R: Rng + ?Sized>(rng: &mut R, width: u32) -> Self {
        loop {
            let mut residues = [0u64; MODULI];
            for (i, residue) in residues.iter_mut().enumerate() {
                if prime_overflowed(width, i) {
                    continue;
                }
                // The sentinel is included so unknown slots get drawn too.
                *residue = rng.gen_range(0..=PRIMES[i]);
            }
            let value = Self::normalize(width, residues, false);
            if value.is_valid() {
                return value;
            }
        }
    }

    fn sample_concrete<R: Rng + ?Sized>(&self, rng: &mut R) -> Bits {
        debug_assert!(!self.is_bottom());
        match self.cardinality() {
            Some(count) => {
                let step = rng.gen_range(0..count);
                Bits::new(self.width, self.crt + step * self.modulus)
            }
            // Only the full 64-bit progression with step one overflows u64.
            None => Bits::new(self.width, rng.gen::<u64>()),
        }
    }

    fn enumerate(width: u32) -> Vec<Self> {
        let mut out = Vec::new();
        let mut current = [0u64; MODULI];
        loop {
            let value = Self::normalize(width, current, false);
            if !value.is_bad_bottom() && !value.is_bad_singleton() {
                out.push(value);
            }
            if value.is_top() {
                break;
            }

            let mut advanced = false;
            for i in 0..MODULI {
                if current[i] != PRIMES[i] && !prime_overflowed(width, i) {
                    for lower in current.iter_mut().take(i) {
                        *lower = 0;
                    }
                    current[i] += 1;
                    advanced = true;
                    break;
                }
            }
            if !advanced {
                break;
            }
        }
        out
    }

    fn distance(&self, rhs: &Self) -> u64 {
        let mut total = 0;
        for i in 0..MODULI {
            let (a, b) = (self.residues[i], rhs.residues[i]);
            if a != b {
                total += if a == PRIMES[i] || b == PRIMES[i] {
                    1
                } else {
                    2
                };
            }
        }
        total
    }

    fn max_distance(_width: u32) -> u64 {
        2 * MODULI as u64
    }
}

impl fmt::Display for IntegerModulo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_bottom() {
            return write!(f, "(bottom)");
        }

        write!(f, "mods:")?;
        for (i, residue) in self.residues.iter().enumerate() {
            if *residue == PRIMES[i] || prime_overflowed(self.width, i) {
                write!(f, " T")?;
            } else {
                write!(f, " {residue}")?;
            }
        }

        if self.is_top() {
            write!(f, " (top)")?;
        }
        Ok(())
    }
}
