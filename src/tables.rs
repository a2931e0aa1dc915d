//! # Tables — Small-Prime Index Table and Pre-Sieve Template
//!
//! Both tables are built once on the main thread before any worker starts
//! and are then shared read-only for the life of the run.
//!
//! The prime table marks which wheel indices up to ⌊√limit⌋/3 denote
//! primes, so the segment kernel can skip the composite indices outright
//! instead of walking their (pointless) sieve passes.
//!
//! The template is a segment-sized bit array with every multiple of the
//! wheel primes already cleared. Because the segment width is a multiple
//! of the wheel modulus, the cleared pattern tiles: copying the template
//! gives every segment its 5..17 (or 5..19) sieving for the price of a
//! memcpy, and workers resume sieving at the next prime up.

use crate::bits::BitSieve;
use crate::wheel::{LuoRecurrence, WHEEL_MOD_17, WHEEL_MOD_19};
use crate::{isqrt, SieveError};

/// Hard cap on prime-table indices: ⌊√(10^19)⌋/3. Bounds the table at
/// ~131 MiB for limits near 2^64; the segment kernel has a fallback for
/// sieve indices past the cap.
pub const PRIME_TABLE_CAP: u64 = 1_054_092_553;

/// Bit i set iff the integer at wheel index i is prime, for
/// i <= min(⌊√limit⌋/3, [`PRIME_TABLE_CAP`]).
pub struct PrimeTable {
    bits: BitSieve,
    top: u64,
}

impl PrimeTable {
    pub fn build(limit: u64) -> Result<Self, SieveError> {
        let top = (isqrt(limit) / 3).min(PRIME_TABLE_CAP);
        let mut bits = BitSieve::all_set(top + 2, "prime index table")?;
        bits.clear(0);

        let mut rec = LuoRecurrence::new();
        for i in 1..=top {
            let mut walk = rec.advance(i);
            if bits.get(i) {
                while walk.position() <= top {
                    bits.clear(walk.position());
                    walk.step();
                }
            }
        }
        Ok(PrimeTable { bits, top })
    }

    /// Highest index the table covers.
    #[inline]
    pub fn top(&self) -> u64 {
        self.top
    }

    /// Whether the integer at index i is prime. i must be <= `top()`.
    #[inline]
    pub fn get(&self, i: u64) -> bool {
        self.bits.get(i)
    }
}

/// Build the pre-sieve template for segments of `step_sz` integers,
/// anchored so that the first segment starts at `from_adj`.
///
/// The template spans `step_sz / 3` indices. Multiples of 5, 7, 11, 13,
/// 17 (and 19 when `wide`) are cleared starting from the first multiple
/// at or past `j_off = (from_adj - 1) / 3`. When the interval starts at
/// 1 the first byte is then seeded to 0xc0 (0x80 when wide): the wheel
/// primes clear their own bits, and the segment holding 1 undoes that
/// with a 0xfe patch. Bits past the span are cleared so copied tails
/// never leak set bits into a popcount.
pub fn presieve_template(
    step_sz: u64,
    from_adj: u64,
    wide: bool,
) -> Result<BitSieve, SieveError> {
    let modulus = if wide { WHEEL_MOD_19 } else { WHEEL_MOD_17 };
    assert!(
        step_sz % modulus == 0,
        "segment width {step_sz} is not a multiple of the wheel modulus {modulus}"
    );

    let sieve_sz = step_sz / 3;
    let mut template = BitSieve::all_set(sieve_sz + 2, "pre-sieve template")?;
    template.clear(0);

    let j_off = (from_adj - 1) / 3;
    let bit_cap = template.bit_capacity();
    let last = if wide { 6 } else { 5 };

    let mut rec = LuoRecurrence::new();
    for i in 1..=last {
        let mut walk = rec.advance(i);
        walk.skip_to(j_off);
        while walk.position() - j_off < bit_cap {
            template.clear(walk.position() - j_off);
            walk.step();
        }
    }

    if from_adj == 1 {
        // Seed bits 1..=5 (..=6 when wide) clear: in every later segment
        // those offsets land on multiples of the wheel primes, and the
        // first segment restores the primes themselves with 0xfe.
        template.overwrite_byte(0, if wide { 0x80 } else { 0xc0 });
    }

    template.clear_from(sieve_sz + 1);
    Ok(template)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wheel::candidate_offset;

    // ── Prime Index Table ───────────────────────────────────────────

    /// Spot checks against the wheel mapping: indices of 5, 29, 31, 97
    /// are prime; indices of 25, 35, 49, 95 are not.
    #[test]
    fn prime_table_marks_known_indices() {
        let table = PrimeTable::build(100_000_000).unwrap();
        for (i, expect) in [
            (1u64, true),   // 5
            (8, false),     // 25
            (9, true),      // 29
            (10, true),     // 31
            (11, false),    // 35
            (16, false),    // 49
            (31, false),    // 95
            (32, true),     // 97
        ] {
            assert_eq!(table.get(i), expect, "index {}", i);
        }
    }

    /// Every set index up to the top must denote a prime, checked by
    /// trial division, and every clear index a composite.
    #[test]
    fn prime_table_agrees_with_trial_division() {
        let table = PrimeTable::build(1_000_000).unwrap();
        assert_eq!(table.top(), 333);
        for i in 1..=table.top() {
            let v = candidate_offset(i);
            let is_prime = (2..).take_while(|d| d * d <= v).all(|d| v % d != 0);
            assert_eq!(table.get(i), is_prime, "index {} (value {})", i, v);
        }
    }

    /// Index 0 is reserved and must stay clear.
    #[test]
    fn prime_table_clears_index_zero() {
        let table = PrimeTable::build(10_000).unwrap();
        assert!(!table.get(0));
    }

    /// The cap kicks in only for limits past 10^19.
    #[test]
    fn prime_table_top_tracks_sqrt_until_cap() {
        assert_eq!(PrimeTable::build(10_000).unwrap().top(), 33);
        let capped = (isqrt(crate::LIMIT_MAX) / 3).min(PRIME_TABLE_CAP);
        assert_eq!(capped, PRIME_TABLE_CAP);
    }

    // ── Pre-Sieve Template ──────────────────────────────────────────

    /// With the narrow wheel, a surviving template bit must denote an
    /// integer coprime to 5·7·11·13·17, and a cleared bit (past the
    /// seed byte) a multiple of one of them. Checked exhaustively over
    /// one wheel period.
    #[test]
    fn template_clears_exactly_the_wheel_multiples() {
        let template = presieve_template(WHEEL_MOD_17, 1, false).unwrap();
        let sieve_sz = WHEEL_MOD_17 / 3;
        for i in 8..=sieve_sz {
            let v = candidate_offset(i);
            let has_wheel_factor = [5u64, 7, 11, 13, 17].iter().any(|&p| v % p == 0);
            assert_eq!(
                template.get(i),
                !has_wheel_factor,
                "index {} (value {})",
                i,
                v
            );
        }
    }

    /// The production-width template (510510 · 12) must equal twelve
    /// tilings of the single-period pattern, byte 0 aside.
    #[test]
    fn template_tiles_with_its_period() {
        let template = presieve_template(WHEEL_MOD_17 * 12, 1, false).unwrap();
        let period = WHEEL_MOD_17 / 3;
        for i in 8..2000u64 {
            for rep in 1..12 {
                assert_eq!(
                    template.get(i),
                    template.get(i + rep * period),
                    "index {} repetition {}",
                    i,
                    rep
                );
            }
        }
    }

    /// Interval start 1: byte 0 seeds the wheel primes clear, keeping
    /// the bits for 19 and 23 (just 23 on the wide wheel).
    #[test]
    fn template_seed_byte_at_one() {
        let narrow = presieve_template(WHEEL_MOD_17, 1, false).unwrap();
        assert_eq!(narrow.byte(0), 0xc0);
        let wide = presieve_template(WHEEL_MOD_19, 1, true).unwrap();
        assert_eq!(wide.byte(0), 0x80);
    }

    /// A template anchored mid-range keeps its first byte as pattern
    /// bits; only the reserved bit 0 is forced clear.
    #[test]
    fn template_anchored_past_one_keeps_pattern_byte() {
        // from_adj for an interval starting at 1000: 1000 - 4 - 6 + 1
        let template = presieve_template(WHEEL_MOD_17, 991, false).unwrap();
        assert_ne!(template.byte(0) & 0x3e, 0);
        assert!(!template.get(0));
        // value 995 = 990 + 5 sits at local index 1 and is divisible by 5
        assert!(!template.get(1));
        // value 997 at local index 2 is prime, hence still set
        assert!(template.get(2));
    }

    /// The wide wheel additionally clears multiples of 19.
    #[test]
    fn wide_template_clears_nineteens() {
        let template = presieve_template(WHEEL_MOD_19, 1, true).unwrap();
        // 19 · 23 = 437 at index 145; 19 · 19 = 361 at index 120
        assert!(!template.get(145));
        assert!(!template.get(120));
        // 23 · 23 = 529 survives (23 is not a wheel prime)
        assert!(template.get(176));
    }

    /// Everything past the span is clear, and the last in-span bit
    /// (the first integer of the next segment) is preserved.
    #[test]
    fn template_tail_is_clear_past_span() {
        let template = presieve_template(WHEEL_MOD_17, 1, false).unwrap();
        let sieve_sz = WHEEL_MOD_17 / 3;
        assert!(template.get(sieve_sz));
        for i in sieve_sz + 1..template.bit_capacity() {
            assert!(!template.get(i), "tail bit {} should be clear", i);
        }
    }

    /// Same bounds twice must produce identical bytes (the tables are
    /// deterministic and shareable).
    #[test]
    fn tables_are_deterministic() {
        let a = presieve_template(WHEEL_MOD_17 * 12, 991, false).unwrap();
        let b = presieve_template(WHEEL_MOD_17 * 12, 991, false).unwrap();
        assert_eq!(a.byte_len(), b.byte_len());
        for idx in 0..a.byte_len() {
            assert_eq!(a.byte(idx), b.byte(idx));
        }
    }

    #[test]
    #[should_panic(expected = "wheel modulus")]
    fn template_rejects_unaligned_width() {
        let _ = presieve_template(1_000_000, 1, false);
    }
}
