//! On-disk triple corpus.
//!
//! A batch is one file of `(lhs, rhs, best)` triples at a single bit-width,
//! named `<regime>_bw_<width>_samples_<count>.bin`. The payload is the packed
//! slot stream of [`xfer_domains`]; there is no framing, so the name carries
//! the metadata a reader needs.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use xfer_domains::{AbstractDomain, SLOT_BYTES};

use crate::Error;

/// Two abstract inputs and the best abstract output for them.
#[derive(Clone, Debug, PartialEq)]
pub struct Triple<D> {
    /// Left abstract input.
    pub lhs: D,
    /// Right abstract input.
    pub rhs: D,
    /// Best (or approximated) abstract output.
    pub best: D,
}

/// How a batch was generated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Regime {
    /// Full lattice enumeration with exact best outputs.
    Low,
    /// Random inputs with exact best outputs.
    Med,
    /// Random inputs with sampled best outputs.
    High,
}

/// Identity of one batch file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchMeta {
    /// Generation regime.
    pub regime: Regime,
    /// Bit-width of every triple in the batch.
    pub width: u32,
    /// Number of triples.
    pub samples: usize,
}

impl BatchMeta {
    /// The file name this batch is stored under.
    pub fn file_name(&self) -> String {
        format!(
            "{}_bw_{}_samples_{}.bin",
            self.regime, self.width, self.samples
        )
    }

    /// Parse a corpus file name.
    pub fn parse(name: &str) -> Result<Self, Error> {
        let malformed = || Error::MalformedFilename(name.to_owned());

        let stem = name.strip_suffix(".bin").ok_or_else(malformed)?;
        let mut parts = stem.split('_');
        let regime = parts
            .next()
            .and_then(|p| Regime::from_str(p).ok())
            .ok_or_else(malformed)?;
        if parts.next() != Some("bw") {
            return Err(malformed());
        }
        let width = parts
            .next()
            .and_then(|p| p.parse::<u32>().ok())
            .filter(|w| (1..=64).contains(w))
            .ok_or_else(malformed)?;
        if parts.next() != Some("samples") {
            return Err(malformed());
        }
        let samples = parts
            .next()
            .and_then(|p| p.parse::<usize>().ok())
            .ok_or_else(malformed)?;
        if parts.next().is_some() {
            return Err(malformed());
        }

        Ok(Self {
            regime,
            width,
            samples,
        })
    }
}

/// A batch with its triples loaded.
#[derive(Clone, Debug)]
pub struct Batch<D> {
    /// Identity of the batch.
    pub meta: BatchMeta,
    /// The triples, in file order.
    pub triples: Vec<Triple<D>>,
}

/// Serialized size of one triple.
fn triple_bytes<D: AbstractDomain>() -> usize {
    3 * D::SLOTS * SLOT_BYTES
}

/// Write a batch payload to `path`.
pub fn write_batch<D: AbstractDomain>(path: &Path, triples: &[Triple<D>]) -> Result<(), Error> {
    let mut buf = Vec::with_capacity(triples.len() * triple_bytes::<D>());
    for triple in triples {
        debug_assert_eq!(triple.lhs.width(), triple.rhs.width());
        debug_assert_eq!(triple.lhs.width(), triple.best.width());
        triple.lhs.serialize(&mut buf);
        triple.rhs.serialize(&mut buf);
        triple.best.serialize(&mut buf);
    }
    fs::write(path, buf)?;
    Ok(())
}

/// Read `count` triples back from `path`.
pub fn read_batch<D: AbstractDomain>(path: &Path, count: usize) -> Result<Vec<Triple<D>>, Error> {
    let display = || path.display().to_string();
    let bytes = fs::read(path)?;

    let expected = count * triple_bytes::<D>();
    if bytes.len() != expected {
        return Err(Error::CorpusLength {
            path: display(),
            expected,
            found: bytes.len(),
        });
    }

    let mut triples = Vec::with_capacity(count);
    let mut offset = 0;
    for _ in 0..count {
        let lhs = D::deserialize(&bytes, &mut offset);
        let rhs = D::deserialize(&bytes, &mut offset);
        let best = D::deserialize(&bytes, &mut offset);
        match (lhs, rhs, best) {
            (Ok(lhs), Ok(rhs), Ok(best)) => {
                if lhs.width() != rhs.width() || lhs.width() != best.width() {
                    return Err(Error::Corpus {
                        path: display(),
                        source: xfer_domains::CodecError::WidthMismatch {
                            expected: lhs.width(),
                            found: if rhs.width() != lhs.width() {
                                rhs.width()
                            } else {
                                best.width()
                            },
                        },
                    });
                }
                triples.push(Triple { lhs, rhs, best });
            }
            (Err(source), ..) | (_, Err(source), _) | (.., Err(source)) => {
                return Err(Error::Corpus {
                    path: display(),
                    source,
                });
            }
        }
    }
    Ok(triples)
}

/// Load every `.bin` batch under `dir`, sorted by width then regime.
pub fn load_dir<D: AbstractDomain>(dir: &Path) -> Result<Vec<Batch<D>>, Error> {
    let mut found: Vec<(BatchMeta, PathBuf)> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().map_or(true, |ext| ext != "bin") {
            continue;
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        found.push((BatchMeta::parse(&name)?, path));
    }
    found.sort_by_key(|(meta, _)| (meta.width, meta.regime));

    let mut batches = Vec::with_capacity(found.len());
    for (meta, path) in found {
        let triples = read_batch::<D>(&path, meta.samples)?;
        tracing::debug!(
            file = %path.display(),
            width = meta.width,
            samples = meta.samples,
            "loaded batch"
        );
        batches.push(Batch { meta, triples });
    }
    Ok(batches)
}
