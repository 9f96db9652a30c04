//! Evaluation harness for abstract-domain transfer functions.
//!
//! Given a concrete operation over [`xfer_types::Bits`], candidate and
//! reference transfer functions over one of the [`xfer_domains`] lattices,
//! and a corpus of `(lhs, rhs, best)` triples, the evaluator measures how
//! sound, exact, and precise each candidate is. The [`oracle`] computes best
//! abstractions, the [`generator`] produces corpora, and [`corpus`] moves
//! them to and from disk.

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(unused_must_use)]

pub mod bridge;
pub mod corpus;
pub mod eval;
pub mod generator;
pub mod ops;
pub mod oracle;
pub mod results;

#[cfg(test)]
mod tests;

use xfer_domains::CodecError;

/// Failures surfaced to the drivers; all of them are fatal.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested domain name is not one of the four lattices.
    #[error("unknown domain: {0}")]
    UnknownDomain(String),
    /// The requested operation is not in the registry.
    #[error("unknown operation: {0}")]
    UnknownOp(String),
    /// A transfer-function name did not resolve for the chosen domain.
    #[error("unknown transfer function: {0}")]
    UnknownTransfer(String),
    /// Final mode needs exactly one reference and no candidates.
    #[error("final mode takes exactly one reference and no candidates")]
    FinalModeArity,
    /// The driver input ended before a required line.
    #[error("missing {0} on standard input")]
    MissingInput(&'static str),
    /// A generator spec line did not parse.
    #[error("malformed generator spec: {0}")]
    MalformedSpec(String),
    /// A corpus file name does not follow `<regime>_bw_<w>_samples_<n>.bin`.
    #[error("malformed corpus file name: {0}")]
    MalformedFilename(String),
    /// A corpus file did not decode cleanly.
    #[error("corpus file {path}: {source}")]
    Corpus {
        /// Offending file.
        path: String,
        /// Slot-level decoding failure.
        source: CodecError,
    },
    /// A corpus file was shorter or longer than its name promises.
    #[error("corpus file {path}: expected {expected} bytes, found {found}")]
    CorpusLength {
        /// Offending file.
        path: String,
        /// Byte length implied by the file name.
        expected: usize,
        /// Actual byte length.
        found: usize,
    },
    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
