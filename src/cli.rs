//! # CLI Execution
//!
//! Extracted from `main.rs` to keep the entry point slim: bound parsing,
//! job assembly, sink wiring, and the stderr summary.

use anyhow::{Context, Result};
use std::io::{self, Write};
use std::time::Instant;
use tracing::debug;

use primespan::driver::{self, SieveJob};
use primespan::output::STDOUT_BUFFER;
use primespan::segment::Mode;
use primespan::{parse_bound, resolve_workers};

use crate::Cli;

/// Run the requested sieve. Returns whether at least one prime was found.
pub fn run(cli: &Cli) -> Result<bool> {
    let (from, limit) = match cli.bounds.as_slice() {
        [limit] => (1, parse_bound(limit)?),
        [from, limit] => (parse_bound(from)?, parse_bound(limit)?),
        _ => unreachable!("clap enforces one or two bounds"),
    };
    let mode = if cli.print {
        Mode::Print
    } else if cli.sum {
        Mode::Sum
    } else {
        Mode::Count
    };
    let workers = resolve_workers(&cli.maxworkers)?;
    debug!(from, limit, ?mode, workers, "request parsed");

    let job = SieveJob {
        from,
        limit,
        mode,
        workers,
        quiet: cli.quiet,
    };

    let started = Instant::now();
    let report = if mode == Mode::Print {
        let stdout = io::stdout();
        let sink = io::BufWriter::with_capacity(STDOUT_BUFFER, stdout);
        driver::sieve_interval(&job, sink)?
    } else {
        driver::sieve_interval(&job, io::sink())?
    };

    if mode == Mode::Sum {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", report.sum).context("writing the sum to standard output")?;
    }

    if !cli.quiet {
        // The leading \r overwrites the progress line, as the progress
        // updates end in \r themselves.
        match mode {
            Mode::Count => eprintln!("\rPrimes found: {}", report.count),
            Mode::Sum => eprintln!("\rSum of primes: {}", report.sum),
            Mode::Print => {}
        }
        eprintln!("Seconds: {:.3}", started.elapsed().as_secs_f64());
    }

    Ok(report.count > 0)
}
