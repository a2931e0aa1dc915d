//! # Wheel — Index Algebra and the Luo Recurrence
//!
//! Only integers coprime to 6 carry a bit in the sieve. Index i >= 1
//! denotes 3i + 2 when i is odd and 3i + 1 when i is even; index 0 is
//! reserved and stays clear. Inside a segment whose first integer is
//! `low`, the bit at local index i denotes `n_off + candidate(i)` with
//! `n_off = low - 1`.
//!
//! ## The recurrence
//!
//! Enumerating the composites of the prime at index i needs no division.
//! The driver state (c, k, t) advances once per index:
//!
//! ```text
//! k := 3 - k;   c := c + 4ki;   t := t + 4k
//! ```
//!
//! after which c is the index of the prime's square and the walk
//! `j := c; j += ij; ij := t - ij` (with ij starting at 2i(3 - k) + 1)
//! visits exactly the indices of that prime's multiples that survive the
//! mod-6 wheel. This is the core trick of Luo's Algorithm 3.
//!
//! Two pre-advanced states let the segment kernel resume directly behind
//! the template primes: [`LuoRecurrence::past_wheel_17`] (next index 6,
//! first sieved prime 19) and [`LuoRecurrence::past_wheel_19`] (next
//! index 7, first sieved prime 23).

/// The integer denoted by wheel index i, relative to the segment offset:
/// 3i + 2 for odd i, 3i + 1 for even i. A single branch-free form covers
/// both parities, since 3i + 1 is even exactly when i is odd.
#[inline]
pub fn candidate_offset(i: u64) -> u64 {
    (3 * i + 1) | 1
}

/// Wheel modulus 2·3·5·7·11·13·17. Segment widths below 10^12 are
/// multiples of this so the five-prime template tiles exactly.
pub const WHEEL_MOD_17: u64 = 510_510;

/// Wheel modulus 2·3·5·7·11·13·17·19, used at and above 10^12.
pub const WHEEL_MOD_19: u64 = 9_699_690;

/// Driver state of the composite recurrence. Advancing it for index i
/// yields the walk that enumerates the composites of the prime at i.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LuoRecurrence {
    c: u64,
    k: u64,
    t: u64,
}

impl LuoRecurrence {
    /// State before index 1.
    pub fn new() -> Self {
        LuoRecurrence { c: 0, k: 1, t: 2 }
    }

    /// State after indices 1..=5 (primes 5, 7, 11, 13, 17); the next
    /// advance is for index 6, prime 19.
    pub fn past_wheel_17() -> Self {
        LuoRecurrence { c: 96, k: 2, t: 34 }
    }

    /// State after indices 1..=6 (primes 5 through 19); the next advance
    /// is for index 7, prime 23.
    pub fn past_wheel_19() -> Self {
        LuoRecurrence { c: 120, k: 1, t: 38 }
    }

    /// Advance past index i and return the composite walk for the prime
    /// at i. Must be called for every index in order, whether or not the
    /// walk is used; the state carries across indices.
    #[inline]
    pub fn advance(&mut self, i: u64) -> CompositeWalk {
        self.k = 3 - self.k;
        self.c += 4 * self.k * i;
        self.t += 4 * self.k;
        CompositeWalk {
            j: self.c,
            ij: 2 * i * (3 - self.k) + 1,
            t: self.t,
        }
    }

    /// The integer denoted by the most recently advanced index: 3i + k.
    #[inline]
    pub fn residue(&self, i: u64) -> u64 {
        3 * i + self.k
    }
}

impl Default for LuoRecurrence {
    fn default() -> Self {
        Self::new()
    }
}

/// Enumerates the wheel indices of one prime's multiples, starting at the
/// prime's square. Alternating increments `ij` and `t - ij` skip the
/// multiples the wheel already excludes.
#[derive(Clone, Copy, Debug)]
pub struct CompositeWalk {
    j: u64,
    ij: u64,
    t: u64,
}

impl CompositeWalk {
    /// Current composite index.
    #[inline]
    pub fn position(&self) -> u64 {
        self.j
    }

    /// Move to the next composite index.
    #[inline]
    pub fn step(&mut self) {
        self.j += self.ij;
        self.ij = self.t - self.ij;
    }

    /// Jump forward to the first position at or past `j_off` without
    /// iterating: one whole-period hop of `floor((j_off - j) / t) * t`
    /// plus at most two single steps. Positions already past `j_off`
    /// are left untouched.
    pub fn skip_to(&mut self, j_off: u64) {
        if self.j >= j_off {
            return;
        }
        self.j += (j_off - self.j) / self.t * self.t + self.ij;
        self.ij = self.t - self.ij;
        if self.j < j_off {
            self.j += self.ij;
            self.ij = self.t - self.ij;
        }
    }
}
