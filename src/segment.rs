//! # Segment — Per-Segment Sieving Kernel
//!
//! A segment is the unit of parallel work: a wheel-aligned sub-range of
//! the interval, sieved in isolation against the shared tables. The
//! kernel copies the pre-sieve template, fixes the interval boundaries,
//! clears the composites of every prime from the first non-template prime
//! up to √high, and then emits the segment's contribution in the
//! requested mode.
//!
//! All shared inputs travel in one immutable [`SieveContext`], built once
//! by the driver and passed by reference to every kernel invocation.

use crate::bits::BitSieve;
use crate::output::push_decimal;
use crate::tables::PrimeTable;
use crate::wheel::{candidate_offset, LuoRecurrence};
use crate::{isqrt, SieveError};

/// What each segment produces and how the driver combines results.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Count the primes; segments reduce by addition.
    Count,
    /// Sum the primes (64-bit modular addition; the caller bounds the
    /// interval so the true sum fits).
    Sum,
    /// Emit the primes in order, one decimal per line.
    Print,
}

/// Immutable inputs shared by every segment of a run.
pub struct SieveContext {
    /// Requested interval floor.
    pub from: u64,
    /// Requested interval end.
    pub limit: u64,
    /// Floor rounded down to a wheel boundary; first segment start.
    pub from_adj: u64,
    /// Segment width in integers, a multiple of the wheel modulus.
    pub step_sz: u64,
    /// Whether 19 is part of the pre-sieved wheel (limit >= 10^12).
    pub wide: bool,
    /// Prime markings for indices up to ⌊√limit⌋/3 (capped).
    pub primes: PrimeTable,
    /// Pre-sieve template copied into every segment.
    pub template: BitSieve,
}

impl SieveContext {
    /// Number of segments covering [from_adj, limit].
    pub fn num_chunks(&self) -> u64 {
        (self.limit - self.from_adj) / self.step_sz + 1
    }
}

/// Integer bounds of one segment. The end is capped at the interval
/// limit; the checked add also catches wrap past 2^64 near the top of
/// the domain.
pub fn chunk_span(ctx: &SieveContext, chunk_id: u64) -> (u64, u64) {
    let low = ctx.from_adj + ctx.step_sz * chunk_id;
    let high = match low.checked_add(ctx.step_sz - 1) {
        Some(h) if h <= ctx.limit => h,
        _ => ctx.limit,
    };
    (low, high)
}

/// One segment's contribution. `count` is always filled (it drives the
/// process exit code); `sum` and `lines` only for their modes.
pub struct SegmentYield {
    pub count: u64,
    pub sum: u64,
    pub lines: Vec<u8>,
}

/// Sieve one segment and emit its result.
pub fn sieve_segment(
    ctx: &SieveContext,
    chunk_id: u64,
    mode: Mode,
) -> Result<SegmentYield, SieveError> {
    let (low, high) = chunk_span(ctx, chunk_id);
    let m = (high - low + (high & 1)) / 3;
    let m2 = high / 3;
    let n_off = low - 1;
    let j_off = n_off / 3;
    let byte_len = ((m + 2 + 7) / 8) as usize;

    let mut seg = BitSieve::prefix_copy(&ctx.template, byte_len, "segment bit array")?;

    if low == 1 {
        // The template seeded its own wheel primes clear; in the segment
        // that actually contains 5, 7, 11, 13, 17 (19, 23) they are
        // primes, so restore bits 1..7 and keep bit 0 reserved.
        seg.overwrite_byte(0, 0xfe);
    }

    // Candidates below the requested floor live only in the first
    // segment, at local indices 1 and 2.
    if low == ctx.from_adj && n_off + candidate_offset(1) < ctx.from {
        seg.clear(1);
        if n_off + candidate_offset(2) < ctx.from {
            seg.clear(2);
        }
    }

    // The final segment clears the allocation tail and then the last one
    // or two in-range indices if they denote integers past the limit.
    if high == ctx.limit {
        seg.clear_from(m + 2);
        if n_off + candidate_offset(m + 1) > ctx.limit {
            seg.clear(m + 1);
            if n_off + candidate_offset(m) > ctx.limit {
                seg.clear(m);
            }
        }
    }

    let q = isqrt(high) / 3;
    let (mut rec, first) = if ctx.wide {
        (LuoRecurrence::past_wheel_19(), 7)
    } else {
        (LuoRecurrence::past_wheel_17(), 6)
    };
    for i in first..=q {
        let mut walk = rec.advance(i);
        if i > ctx.primes.top() {
            // Past the table cap every index is sieved as if prime,
            // except the multiples of 5 the residue exposes for free.
            if rec.residue(i) % 5 == 0 {
                continue;
            }
        } else if !ctx.primes.get(i) {
            continue;
        }
        walk.skip_to(j_off);
        while walk.position() <= m2 {
            seg.clear(walk.position() - j_off);
            walk.step();
        }
    }

    // 2 and 3 are outside the wheel; the segment containing 1 accounts
    // for them when the interval does.
    let two = low == 1 && ctx.from <= 2 && ctx.limit >= 2;
    let three = low == 1 && ctx.from <= 3 && ctx.limit >= 3;
    let count = seg.count_ones() + u64::from(two) + u64::from(three);

    match mode {
        Mode::Count => Ok(SegmentYield {
            count,
            sum: 0,
            lines: Vec::new(),
        }),
        Mode::Sum => {
            let mut sum: u64 = 0;
            if two {
                sum += 2;
            }
            if three {
                sum += 3;
            }
            for i in seg.iter_ones() {
                sum = sum.wrapping_add(n_off + candidate_offset(i));
            }
            Ok(SegmentYield {
                count,
                sum,
                lines: Vec::new(),
            })
        }
        Mode::Print => {
            // Worst case 20 digits plus the newline per prime.
            let cap = count as usize * 21;
            let mut lines = Vec::new();
            lines.try_reserve(cap).map_err(|_| SieveError::Allocation {
                what: "print buffer",
                bytes: cap,
            })?;
            if two {
                push_decimal(&mut lines, 2);
            }
            if three {
                push_decimal(&mut lines, 3);
            }
            for i in seg.iter_ones() {
                push_decimal(&mut lines, n_off + candidate_offset(i));
            }
            Ok(SegmentYield {
                count,
                sum: 0,
                lines,
            })
        }
    }
}
