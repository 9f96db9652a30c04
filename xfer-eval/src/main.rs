//! Evaluation driver.
//!
//! Reads the run description from standard input: corpus directory, domain
//! name, optional operation name (non-empty selects final mode), a line of
//! single-quoted candidate names, a line of single-quoted reference names,
//! and an opaque trailing source blob destined for an external compiler,
//! which this driver consumes and ignores. Transfer-function names resolve
//! against the built-in registry. One result block per batch goes to
//! standard output; diagnostics go to standard error.

use std::io::Read;
use std::path::Path;

use xfer_domains::{IntegerModulo, KnownBits, SConstRange, UConstRange};
use xfer_eval::bridge::{self, BridgeDomain};
use xfer_eval::corpus::{self, Batch, Regime};
use xfer_eval::eval::{Evaluator, NamedXfer};
use xfer_eval::{ops, Error};

struct Request {
    corpus_dir: String,
    domain: String,
    op_name: String,
    candidates: Vec<String>,
    references: Vec<String>,
}

fn quoted_names(line: &str) -> Vec<String> {
    line.split('\'').skip(1).step_by(2).map(str::to_owned).collect()
}

fn read_request() -> Result<Request, Error> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    let mut lines = input.lines();

    let corpus_dir = lines.next().ok_or(Error::MissingInput("corpus directory"))?;
    let domain = lines.next().ok_or(Error::MissingInput("domain name"))?;
    let op_name = lines.next().ok_or(Error::MissingInput("operation name"))?;
    let candidates = lines.next().ok_or(Error::MissingInput("candidate names"))?;
    let references = lines.next().ok_or(Error::MissingInput("reference names"))?;
    // The remainder is the transfer-function source blob for the external
    // compiler; nothing in this driver needs it.

    Ok(Request {
        corpus_dir: corpus_dir.trim().to_owned(),
        domain: domain.trim().to_owned(),
        op_name: op_name.trim().to_owned(),
        candidates: quoted_names(candidates),
        references: quoted_names(references),
    })
}

fn resolve_all<D: BridgeDomain>(names: &[String]) -> Result<Vec<NamedXfer<D>>, Error> {
    names
        .iter()
        .map(|name| {
            bridge::resolve::<D>(name)
                .map(|func| NamedXfer::new(name.clone(), func))
                .ok_or_else(|| Error::UnknownTransfer(name.clone()))
        })
        .collect()
}

fn run_domain<D>(request: &Request) -> Result<(), Error>
where
    D: BridgeDomain + Send + Sync,
{
    let batches = corpus::load_dir::<D>(Path::new(&request.corpus_dir))?;
    let references = resolve_all::<D>(&request.references)?;

    if request.op_name.is_empty() {
        let candidates = resolve_all::<D>(&request.candidates)?;
        let evaluator = Evaluator::new(candidates, references);

        let (exact, approx): (Vec<Batch<D>>, Vec<Batch<D>>) = batches
            .into_iter()
            .partition(|batch| batch.meta.regime != Regime::High);

        for results in evaluator.eval(&exact) {
            println!("{results}---");
        }
        for results in evaluator.eval_high(&approx) {
            println!("{results}---");
        }
    } else {
        if ops::lookup(&request.op_name).is_none() {
            return Err(Error::UnknownOp(request.op_name.clone()));
        }
        if !request.candidates.is_empty() {
            return Err(Error::FinalModeArity);
        }
        let evaluator = Evaluator::new(Vec::new(), references);
        let bridged =
            D::bridged(&request.op_name).map(|func| NamedXfer::new(request.op_name.clone(), func));

        for results in evaluator.eval_final(bridged.as_ref(), &batches)? {
            println!("{results}---");
        }
    }
    Ok(())
}

fn run() -> Result<(), Error> {
    let request = read_request()?;
    tracing::debug!(
        domain = %request.domain,
        corpus = %request.corpus_dir,
        "starting evaluation"
    );

    match request.domain.as_str() {
        "KnownBits" => run_domain::<KnownBits>(&request),
        "UConstRange" => run_domain::<UConstRange>(&request),
        "SConstRange" => run_domain::<SConstRange>(&request),
        "IntegerModulo" => run_domain::<IntegerModulo>(&request),
        other => Err(Error::UnknownDomain(other.to_owned())),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(error) = run() {
        eprintln!("{error}");
        std::process::exit(1);
    }
}
