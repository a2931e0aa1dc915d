//! # Primespan — Core Library
//!
//! Counts, sums, and enumerates the primes in an inclusive 64-bit interval
//! `[from, limit]` with a parallel segmented sieve. The sieve is
//! wheel-factored after Xuedong Luo's Algorithm 3 (CACM 32(3), 1989): only
//! integers coprime to 6 are represented, one bit each, and the small wheel
//! primes 5..17 (5..19 for limits at or above 10^12) are pre-sieved into a
//! template that every segment starts from.
//!
//! ## Module Organization
//!
//! - [`bits`] — byte-backed bit vector with popcount and a set-bit iterator
//! - [`wheel`] — wheel index algebra and the Luo composite recurrence
//! - [`tables`] — small-prime index table and the pre-sieve template
//! - [`segment`] — the per-segment sieving kernel and result emission
//! - [`driver`] — interval partitioning, worker threads, result gathering
//! - [`output`] — decimal formatting and the ordered print sink
//! - [`progress`] — percentage reporting on standard error
//!
//! ## Shared Utilities
//!
//! - [`isqrt`]: exact integer square root over the full u64 range.
//! - [`parse_bound`]: exact parsing of decimal and scientific bounds.
//! - [`resolve_workers`]: worker-count resolution (`auto`, `50%`, integer).
//!
//! ## Pipeline
//!
//! The driver builds two immutable tables on the main thread, splits the
//! interval into wheel-aligned segments, and hands segments to a fixed pool
//! of worker threads. Count and sum results reduce commutatively; printed
//! primes are gathered strictly in segment order so the output stream is
//! increasing and independent of the worker count.

pub mod bits;
pub mod driver;
pub mod output;
pub mod progress;
pub mod segment;
pub mod tables;
pub mod wheel;

use std::thread;

/// Largest supported interval end: 2^64 - 7, the greatest integer whose
/// wheel-adjusted segment arithmetic cannot wrap a u64.
pub const LIMIT_MAX: u64 = 18_446_744_073_709_551_609;

/// Largest interval end for sum mode. Past this the sum of all primes in
/// [1, limit] no longer fits in 64 bits.
pub const SUM_LIMIT_MAX: u64 = 29_505_444_490;

/// Errors surfaced by the sieve core.
///
/// Invariant violations (a segment width that is not a wheel multiple, a
/// bit index past an array end) are programming errors and panic instead.
#[derive(Debug, thiserror::Error)]
pub enum SieveError {
    /// A bound or option was rejected before any sieving started.
    #[error("{0}")]
    Input(String),

    /// A table or segment buffer could not be allocated.
    #[error("failed to allocate {bytes} bytes for {what}")]
    Allocation { what: &'static str, bytes: usize },

    /// A write to the print sink failed.
    #[error("writing primes to the output sink failed: {0}")]
    Output(#[from] std::io::Error),
}

/// Exact integer square root for the full u64 range.
///
/// Starts from the rounded f64 estimate and nudges it into place, so the
/// result is correct even where f64 cannot represent n (above 2^53).
pub fn isqrt(n: u64) -> u64 {
    if n == 0 {
        return 0;
    }
    let mut x = (n as f64).sqrt() as u64;
    while x.checked_mul(x).map_or(true, |sq| sq > n) {
        x -= 1;
    }
    while (x + 1).checked_mul(x + 1).is_some_and(|sq| sq <= n) {
        x += 1;
    }
    x
}

/// Parse an interval bound: a decimal integer, or scientific notation such
/// as `1e+10` and `1.1e+10`.
///
/// Scientific notation is evaluated exactly (integer mantissa scaling, no
/// float round trip), so every representable u64 parses to itself and a
/// mantissa with too many fractional digits is rejected rather than
/// silently truncated.
pub fn parse_bound(text: &str) -> Result<u64, SieveError> {
    let invalid = || {
        SieveError::Input(format!(
            "invalid bound {text:?}: expected a decimal integer or scientific notation like 1e+10"
        ))
    };
    let too_big = || SieveError::Input(format!("bound {text} does not fit in 64 bits"));

    let text = text.trim();
    if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        return text.parse::<u64>().map_err(|_| too_big());
    }

    let (mantissa, exponent) = text.split_once(['e', 'E']).ok_or_else(invalid)?;
    let exponent = exponent.strip_prefix('+').unwrap_or(exponent);
    if exponent.is_empty() || !exponent.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let exponent: u32 = exponent.parse().map_err(|_| too_big())?;

    let (whole, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if ![whole, frac]
        .iter()
        .all(|part| part.bytes().all(|b| b.is_ascii_digit()))
    {
        return Err(invalid());
    }

    let scale = exponent
        .checked_sub(frac.len() as u32)
        .ok_or_else(|| SieveError::Input(format!("bound {text} is not an integer")))?;
    let mut digits = String::with_capacity(whole.len() + frac.len());
    digits.push_str(whole);
    digits.push_str(frac);
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(0);
    }
    if digits.len() > 39 || scale > 38 {
        return Err(too_big());
    }
    let value: u128 = digits.parse().map_err(|_| too_big())?;
    let value = value.checked_mul(10u128.pow(scale)).ok_or_else(too_big)?;
    u64::try_from(value).map_err(|_| too_big())
}

/// Resolve a worker-count option to a concrete thread count.
///
/// Accepts `auto` (one per logical core), a percentage of logical cores
/// such as `50%`, or a plain integer. The result is always at least 1.
pub fn resolve_workers(text: &str) -> Result<usize, SieveError> {
    let logical = thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
    let text = text.trim();
    if text.eq_ignore_ascii_case("auto") {
        return Ok(logical);
    }
    if let Some(percent) = text.strip_suffix('%') {
        let percent: usize = percent
            .trim()
            .parse()
            .map_err(|_| SieveError::Input(format!("invalid worker percentage {text:?}")))?;
        return Ok((logical * percent / 100).max(1));
    }
    let count: usize = text.parse().map_err(|_| {
        SieveError::Input(format!(
            "invalid worker count {text:?}: expected an integer, a percentage, or `auto`"
        ))
    })?;
    Ok(count.max(1))
}
