//! # Driver — Interval Partitioning and Worker Coordination
//!
//! Validates the request, builds the shared tables on the main thread,
//! splits [from_adj, limit] into wheel-aligned segments, and runs a fixed
//! pool of OS threads over them: chunk c belongs to worker c mod T, the
//! static round-robin that keeps every worker on a predictable stride and
//! makes print-mode gathering resource-bounded.
//!
//! Count and sum reduce through shared atomics (the reduction is
//! commutative, so arrival order is irrelevant). Print output flows
//! through the ordered sink. The first failure of any kind cancels the
//! run: workers finish their current segment, discard its output, and
//! stop taking new chunks.

use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::thread;
use tracing::debug;

use crate::output::OrderedSink;
use crate::progress::Progress;
use crate::segment::{chunk_span, sieve_segment, Mode, SieveContext};
use crate::tables::{presieve_template, PrimeTable};
use crate::wheel::{WHEEL_MOD_17, WHEEL_MOD_19};
use crate::{SieveError, LIMIT_MAX, SUM_LIMIT_MAX};

/// Limits at or above this use the wheel that pre-sieves 19 as well.
pub const WIDE_WHEEL_MIN: u64 = 1_000_000_000_000;

/// Progress is only worth the stderr traffic past this interval end.
const PROGRESS_MIN_LIMIT: u64 = 2_000_000_000;

/// One sieve request.
pub struct SieveJob {
    pub from: u64,
    pub limit: u64,
    pub mode: Mode,
    pub workers: usize,
    pub quiet: bool,
}

/// Aggregated result. `sum` is meaningful in sum mode only.
#[derive(Debug)]
pub struct SieveReport {
    pub count: u64,
    pub sum: u64,
}

/// Reject impossible bounds before any allocation or sieving.
pub fn validate(job: &SieveJob) -> Result<(), SieveError> {
    if job.from < 1 {
        return Err(SieveError::Input(
            "the interval floor must be at least 1".into(),
        ));
    }
    if job.limit > LIMIT_MAX {
        return Err(SieveError::Input(format!(
            "limit exceeds {LIMIT_MAX} (2^64 - 7)"
        )));
    }
    if job.limit < job.from {
        return Err(SieveError::Input(format!(
            "invalid interval: limit {} is below floor {}",
            job.limit, job.from
        )));
    }
    if job.mode == Mode::Sum && job.limit > SUM_LIMIT_MAX {
        return Err(SieveError::Input(format!(
            "sum mode supports limits up to {SUM_LIMIT_MAX}; beyond that the sum overflows 64 bits"
        )));
    }
    Ok(())
}

/// Segment width for a given interval end: a wheel-modulus multiple,
/// scaled up with the magnitude of the limit so chunk counts stay sane.
pub fn step_size(limit: u64) -> u64 {
    if limit < WIDE_WHEEL_MIN {
        return WHEEL_MOD_17 * 12;
    }
    let scale = match limit {
        0..=9_999_999_999_999 => 1,
        10_000_000_000_000..=99_999_999_999_999 => 2,
        100_000_000_000_000..=999_999_999_999_999 => 3,
        1_000_000_000_000_000..=9_999_999_999_999_999 => 4,
        10_000_000_000_000_000..=99_999_999_999_999_999 => 5,
        100_000_000_000_000_000..=999_999_999_999_999_999 => 6,
        1_000_000_000_000_000_000..=9_999_999_999_999_999_999 => 7,
        _ => 8,
    };
    WHEEL_MOD_19 * scale
}

/// Round the floor down to a wheel boundary: the previous multiple of 6,
/// minus one more spoke, plus 1. The extra spoke keeps a floor that is
/// itself a prime ≡ 1 (mod 6) representable; candidates below the floor
/// are cleared from the first segment afterwards.
pub fn adjusted_floor(from: u64) -> u64 {
    if from > 5 {
        from - from % 6 - 6 + 1
    } else {
        1
    }
}

/// Build the immutable context shared by all workers.
pub fn prepare(from: u64, limit: u64) -> Result<SieveContext, SieveError> {
    let step_sz = step_size(limit);
    let wide = limit >= WIDE_WHEEL_MIN;
    let from_adj = adjusted_floor(from);
    let primes = PrimeTable::build(limit)?;
    let template = presieve_template(step_sz, from_adj, wide)?;
    Ok(SieveContext {
        from,
        limit,
        from_adj,
        step_sz,
        wide,
        primes,
        template,
    })
}

fn record_failure(slot: &Mutex<Option<SieveError>>, err: SieveError) {
    let mut guard = slot.lock().unwrap();
    if guard.is_none() {
        *guard = Some(err);
    }
}

/// Sieve the interval and reduce the per-segment results.
///
/// `sink` receives the print stream (it is untouched in count and sum
/// modes). The report is identical for every worker count, and in print
/// mode the bytes written to `sink` are too.
pub fn sieve_interval<W: Write + Send>(
    job: &SieveJob,
    sink: W,
) -> Result<SieveReport, SieveError> {
    validate(job)?;
    let ctx = prepare(job.from, job.limit)?;
    let workers = job.workers.max(1) as u64;
    let num_chunks = ctx.num_chunks();
    debug!(
        from = job.from,
        limit = job.limit,
        step_sz = ctx.step_sz,
        chunks = num_chunks,
        workers,
        "interval prepared"
    );

    let mode = job.mode;
    let counted = AtomicU64::new(0);
    let summed = AtomicU64::new(0);
    let cancel = AtomicBool::new(false);
    let failure: Mutex<Option<SieveError>> = Mutex::new(None);
    let sink = OrderedSink::new(sink, 2 * workers + 2);
    let progress = Progress::new(ctx.from_adj, job.limit);
    let announce = !job.quiet && mode != Mode::Print && job.limit > PROGRESS_MIN_LIMIT;

    thread::scope(|scope| {
        for worker in 0..workers {
            let ctx = &ctx;
            let counted = &counted;
            let summed = &summed;
            let cancel = &cancel;
            let failure = &failure;
            let sink = &sink;
            let progress = &progress;
            scope.spawn(move || {
                let mut chunk = worker;
                while chunk < num_chunks && !cancel.load(Ordering::Relaxed) {
                    match sieve_segment(ctx, chunk, mode) {
                        Ok(yielded) => {
                            counted.fetch_add(yielded.count, Ordering::Relaxed);
                            if mode == Mode::Sum {
                                summed.fetch_add(yielded.sum, Ordering::Relaxed);
                            }
                            if mode == Mode::Print {
                                if let Err(err) = sink.submit(chunk, yielded.lines) {
                                    record_failure(failure, err.into());
                                    cancel.store(true, Ordering::Relaxed);
                                    sink.abort();
                                    break;
                                }
                            }
                            if worker == 0 && announce {
                                progress.report(chunk_span(ctx, chunk).1);
                            }
                        }
                        Err(err) => {
                            record_failure(failure, err);
                            cancel.store(true, Ordering::Relaxed);
                            sink.abort();
                            break;
                        }
                    }
                    chunk += workers;
                }
            });
        }
    });

    if let Some(err) = failure.into_inner().unwrap() {
        return Err(err);
    }
    if mode == Mode::Print {
        sink.finish()?;
    }
    Ok(SieveReport {
        count: counted.into_inner(),
        sum: summed.into_inner(),
    })
}
