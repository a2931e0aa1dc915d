//! # Main — CLI Entry Point
//!
//! Parses the command line, initialises logging and the allocator, and
//! hands the request to [`cli::run`]. Exit codes follow the classic
//! sieve-tool convention: 0 when at least one prime was found, 1 when
//! none were, 2 for any error (bad arguments, bounds, allocation, or a
//! failed output write).

mod cli;

use clap::Parser;
use std::process::ExitCode;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(
    name = "primespan",
    about = "Count, sum, or print the primes in a 64-bit interval",
    version
)]
pub struct Cli {
    /// Interval bounds: `N` sieves [1, N]; `FROM N` sieves [FROM, N].
    /// Decimal and scientific notation (1e+10, 1.1e+10) are accepted.
    #[arg(value_name = "BOUND", num_args = 1..=2, required = true)]
    bounds: Vec<String>,

    /// Print the primes to standard output, one per line, ascending
    #[arg(short = 'p', long = "print", conflicts_with = "sum")]
    print: bool,

    /// Print the sum of the primes (limit at most 29505444490)
    #[arg(short = 's', long = "sum")]
    sum: bool,

    /// Suppress progress and summary output on standard error
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,

    /// Worker threads: an integer, a percentage of logical cores
    /// (`50%`), or `auto`
    #[arg(
        long = "maxworkers",
        alias = "threads",
        value_name = "COUNT",
        default_value = "100%"
    )]
    maxworkers: String,
}

fn main() -> ExitCode {
    // LOG_FORMAT=json switches to structured logs for collection; the
    // default is human-readable on stderr, filtered to `warn` so normal
    // runs emit nothing beyond the documented progress and summary.
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };
    if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter())
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter())
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();
    match cli::run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}
