//! Corpus generation driver.
//!
//! Reads the plan from standard input, one line each: output directory,
//! domain name, operation name, low widths (space-separated), mid specs
//! (`width:samples` pairs), high specs (`width:samples:draws` triples), and
//! the RNG seed. Empty regime lines are allowed. Writes one batch file per
//! regime and width into the output directory.

use std::io::Read;
use std::path::Path;

use xfer_domains::{AbstractDomain, IntegerModulo, KnownBits, SConstRange, UConstRange};
use xfer_eval::generator::{GenPlan, HighSpec, MidSpec, SampleGenerator};
use xfer_eval::oracle::BestAbstractor;
use xfer_eval::{ops, Error};

struct Request {
    out_dir: String,
    domain: String,
    op_name: String,
    plan: GenPlan,
    seed: u64,
}

fn parse_fields(spec: &str) -> Result<Vec<u64>, Error> {
    spec.split(':')
        .map(|field| {
            field
                .parse::<u64>()
                .map_err(|_| Error::MalformedSpec(spec.to_owned()))
        })
        .collect()
}

fn parse_lows(line: &str) -> Result<Vec<u32>, Error> {
    line.split_whitespace()
        .map(|spec| match parse_fields(spec)?.as_slice() {
            [width @ 1..=64] => Ok(*width as u32),
            _ => Err(Error::MalformedSpec(spec.to_owned())),
        })
        .collect()
}

fn parse_mids(line: &str) -> Result<Vec<MidSpec>, Error> {
    line.split_whitespace()
        .map(|spec| match parse_fields(spec)?.as_slice() {
            [width @ 1..=64, samples] => Ok(MidSpec {
                width: *width as u32,
                samples: *samples as u32,
            }),
            _ => Err(Error::MalformedSpec(spec.to_owned())),
        })
        .collect()
}

fn parse_highs(line: &str) -> Result<Vec<HighSpec>, Error> {
    line.split_whitespace()
        .map(|spec| match parse_fields(spec)?.as_slice() {
            [width @ 1..=64, samples, draws] => Ok(HighSpec {
                width: *width as u32,
                samples: *samples as u32,
                draws: *draws as u32,
            }),
            _ => Err(Error::MalformedSpec(spec.to_owned())),
        })
        .collect()
}

fn read_request() -> Result<Request, Error> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    let mut lines = input.lines();

    let out_dir = lines.next().ok_or(Error::MissingInput("output directory"))?;
    let domain = lines.next().ok_or(Error::MissingInput("domain name"))?;
    let op_name = lines.next().ok_or(Error::MissingInput("operation name"))?;
    let lows = parse_lows(lines.next().ok_or(Error::MissingInput("low widths"))?)?;
    let mids = parse_mids(lines.next().ok_or(Error::MissingInput("mid specs"))?)?;
    let highs = parse_highs(lines.next().ok_or(Error::MissingInput("high specs"))?)?;
    let seed_line = lines.next().ok_or(Error::MissingInput("seed"))?;
    let seed = seed_line
        .trim()
        .parse::<u64>()
        .map_err(|_| Error::MalformedSpec(seed_line.to_owned()))?;

    Ok(Request {
        out_dir: out_dir.trim().to_owned(),
        domain: domain.trim().to_owned(),
        op_name: op_name.trim().to_owned(),
        plan: GenPlan { lows, mids, highs },
        seed,
    })
}

fn run_domain<D: AbstractDomain>(request: &Request) -> Result<(), Error> {
    let op = ops::lookup(&request.op_name)
        .ok_or_else(|| Error::UnknownOp(request.op_name.clone()))?;
    let generator = SampleGenerator::new(BestAbstractor::new(op));
    let written =
        generator.generate_to_dir::<D>(&request.plan, request.seed, Path::new(&request.out_dir))?;
    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}

fn run() -> Result<(), Error> {
    let request = read_request()?;
    tracing::debug!(
        domain = %request.domain,
        op = %request.op_name,
        seed = request.seed,
        "generating corpus"
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
