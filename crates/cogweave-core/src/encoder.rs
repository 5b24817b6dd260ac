//! # Prime / Matula Encoder
//!
//! Maps rooted trees written as balanced parentheses to natural numbers via
//! the Matula–Goebel correspondence, offset by one prime index:
//!
//! ```text
//! value(node) = Π prime_offset(value(child))     prime_offset(n) = (n+1)-th prime
//!
//! "()"      -> 1
//! "(())"    -> prime_offset(1) = 3
//! "(()())"  -> 3 · 3 = 9
//! "((()))"  -> prime_offset(3) = 7
//! ```
//!
//! Each value also gets a system level, a breadth/depth coordinate inside
//! the kernel bounds and a unit-magnitude complex phase.
//!
//! Primes come from a memoized, capacity-bounded sieve. Asking for a prime
//! index past the table is an error, never a wraparound.

use crate::primitives::{KERNEL_BREADTH, KERNEL_DEPTH, MAX_PRIMES, PHASE_STEP, PRIME_SIEVE_LIMIT};
use crate::CogError;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;
use std::ops::Mul;
use std::sync::LazyLock;

// =============================================================================
// PRIME TABLE
// =============================================================================

static SHARED_PRIMES: LazyLock<PrimeTable> =
    LazyLock::new(|| PrimeTable::sieve(PRIME_SIEVE_LIMIT, MAX_PRIMES));

/// Cached list of the first primes, produced by a Sieve of Eratosthenes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimeTable {
    primes: Vec<u32>,
}

impl PrimeTable {
    /// Sieve every prime `<= limit`, keeping at most `capacity` of them.
    #[must_use]
    pub fn sieve(limit: u32, capacity: usize) -> Self {
        let limit = limit as usize;
        let mut composite = vec![false; limit.saturating_add(1)];
        let mut primes = Vec::with_capacity(capacity.min(limit));

        for i in 2..=limit {
            if composite[i] {
                continue;
            }
            if primes.len() >= capacity {
                break;
            }
            primes.push(i as u32);
            let mut j = i.saturating_mul(i);
            while j <= limit {
                composite[j] = true;
                j += i;
            }
        }

        Self { primes }
    }

    /// The process-wide table (sieve limit 10 000, 1024 primes), built once.
    #[must_use]
    pub fn shared() -> &'static PrimeTable {
        &SHARED_PRIMES
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.primes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.primes.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u32] {
        &self.primes
    }

    /// The `n`-th prime, 1-based (`nth_prime(1) == 2`).
    pub fn nth_prime(&self, n: u64) -> Result<u64, CogError> {
        let out_of_range = || CogError::PrimeIndexOutOfRange {
            index: n,
            available: self.primes.len(),
        };
        let index = usize::try_from(n)
            .ok()
            .and_then(|n| n.checked_sub(1))
            .ok_or_else(out_of_range)?;
        self.primes
            .get(index)
            .map(|&p| u64::from(p))
            .ok_or_else(out_of_range)
    }

    /// The `(n+1)`-th prime (`prime_offset(0) == 2`).
    pub fn prime_offset(&self, n: u64) -> Result<u64, CogError> {
        let index = n.checked_add(1).ok_or(CogError::PrimeIndexOutOfRange {
            index: n,
            available: self.primes.len(),
        })?;
        self.nth_prime(index)
    }
}

/// [`PrimeTable::nth_prime`] on the shared table.
pub fn nth_prime(n: u64) -> Result<u64, CogError> {
    PrimeTable::shared().nth_prime(n)
}

/// [`PrimeTable::prime_offset`] on the shared table.
pub fn prime_offset(n: u64) -> Result<u64, CogError> {
    PrimeTable::shared().prime_offset(n)
}

/// Trial-division primality test.
#[must_use]
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut i = 3_u64;
    while i.saturating_mul(i) <= n {
        if n % i == 0 {
            return false;
        }
        i += 2;
    }
    true
}

/// Prime factors of `n` in ascending order, with multiplicity.
///
/// `factorize(0)` and `factorize(1)` are empty.
#[must_use]
pub fn factorize(n: u64) -> Vec<u64> {
    let mut factors = Vec::new();
    if n < 2 {
        return factors;
    }
    let mut n = n;
    while n % 2 == 0 {
        factors.push(2);
        n /= 2;
    }
    let mut i = 3_u64;
    while i.saturating_mul(i) <= n {
        while n % i == 0 {
            factors.push(i);
            n /= i;
        }
        i += 2;
    }
    if n > 2 {
        factors.push(n);
    }
    factors
}

// =============================================================================
// PHASE
// =============================================================================

/// A complex phase `re + i·im`, unit-magnitude when built from an angle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub re: f32,
    pub im: f32,
}

impl Phase {
    /// `1 + 0i`.
    pub const ONE: Phase = Phase { re: 1.0, im: 0.0 };

    /// `exp(i·theta)`.
    #[must_use]
    pub fn from_angle(theta: f32) -> Self {
        Self {
            re: theta.cos(),
            im: theta.sin(),
        }
    }

    #[must_use]
    pub fn magnitude(self) -> f32 {
        self.re.hypot(self.im)
    }

    /// Argument in `(-π, π]`.
    #[must_use]
    pub fn angle(self) -> f32 {
        self.im.atan2(self.re)
    }
}

impl Mul for Phase {
    type Output = Phase;

    fn mul(self, rhs: Phase) -> Phase {
        Phase {
            re: self.re * rhs.re - self.im * rhs.im,
            im: self.re * rhs.im + self.im * rhs.re,
        }
    }
}

/// `exp(i · ((phase_parameter + value·0.1) mod 2π))`.
#[must_use]
pub fn quantum_phase(value: u64, phase_parameter: f32) -> Phase {
    let theta = (phase_parameter + value as f32 * PHASE_STEP) % TAU;
    Phase::from_angle(theta)
}

/// Structural depth class of a matula value.
///
/// Small values use a fixed table; above 16 the level is
/// `floor(log2 value) + 1`. The jump from 4 (at 16) to 5 (at 17) is part of
/// the kernel coordinate layout and must not be smoothed.
#[must_use]
pub fn system_level(value: u64) -> u32 {
    match value {
        0 | 1 => 1,
        2..=4 => 2,
        5..=9 => 3,
        10..=16 => 4,
        _ => value.ilog2() + 1,
    }
}

// =============================================================================
// MATULA ENCODING
// =============================================================================

/// The encoding of one tree: integer value, level, kernel coordinate, phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatulaEncoding {
    pub matula_value: u64,
    pub system_level: u32,
    pub breadth_index: u32,
    pub depth_index: u32,
    pub phase: Phase,
}

impl MatulaEncoding {
    /// Degenerate encoding for empty or unbalanced expressions.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            matula_value: 1,
            system_level: 1,
            breadth_index: 0,
            depth_index: 0,
            phase: Phase::ONE,
        }
    }

    /// `[system_level, breadth, depth, value]` as floats.
    #[must_use]
    pub fn summary(&self) -> [f32; 4] {
        [
            self.system_level as f32,
            self.breadth_index as f32,
            self.depth_index as f32,
            self.matula_value as f32,
        ]
    }
}

/// Tree encoder bound to kernel breadth/depth limits.
#[derive(Debug, Clone, Copy)]
pub struct TreeEncoder {
    primes: &'static PrimeTable,
    breadth: u32,
    depth: u32,
}

impl Default for TreeEncoder {
    fn default() -> Self {
        Self::new(KERNEL_BREADTH as u32, KERNEL_DEPTH as u32)
    }
}

impl TreeEncoder {
    /// Encoder with the given coordinate bounds (a zero bound is treated as 1).
    #[must_use]
    pub fn new(breadth: u32, depth: u32) -> Self {
        Self {
            primes: PrimeTable::shared(),
            breadth: breadth.max(1),
            depth: depth.max(1),
        }
    }

    #[must_use]
    pub fn primes(&self) -> &'static PrimeTable {
        self.primes
    }

    /// Encode a parenthesis expression.
    ///
    /// Empty or unbalanced input yields [`MatulaEncoding::identity`].
    /// Characters other than `(` and `)` are ignored, and only the first
    /// top-level group is encoded; input without any group is a single leaf.
    pub fn encode(&self, expression: &str) -> Result<MatulaEncoding, CogError> {
        if expression.is_empty() || !is_balanced(expression) {
            return Ok(MatulaEncoding::identity());
        }
        let value = self.parse_value(expression)?;
        Ok(self.from_value(value, quantum_phase(value, 0.0)))
    }

    /// Graft `b` into `a`: values multiply, phase angles add.
    pub fn compose(
        &self,
        a: &MatulaEncoding,
        b: &MatulaEncoding,
    ) -> Result<MatulaEncoding, CogError> {
        let value = a
            .matula_value
            .checked_mul(b.matula_value)
            .ok_or(CogError::EncodingOverflow)?;
        Ok(self.from_value(value, a.phase * b.phase))
    }

    fn from_value(&self, value: u64, phase: Phase) -> MatulaEncoding {
        let breadth = u64::from(self.breadth);
        let depth = u64::from(self.depth);
        MatulaEncoding {
            matula_value: value,
            system_level: system_level(value),
            breadth_index: (value % breadth) as u32,
            depth_index: ((value / breadth) % depth) as u32,
            phase,
        }
    }

    /// Iterative evaluation so deeply nested input cannot exhaust the stack.
    fn parse_value(&self, expression: &str) -> Result<u64, CogError> {
        let mut open: Vec<u64> = Vec::new();
        for ch in expression.bytes() {
            match ch {
                b'(' => open.push(1),
                b')' => {
                    let Some(child) = open.pop() else {
                        return Ok(1);
                    };
                    let Some(parent) = open.last_mut() else {
                        return Ok(child);
                    };
                    let prime = self.primes.prime_offset(child)?;
                    *parent = parent
                        .checked_mul(prime)
                        .ok_or(CogError::EncodingOverflow)?;
                }
                _ => {}
            }
        }
        Ok(1)
    }
}

fn is_balanced(expression: &str) -> bool {
    let mut depth: usize = 0;
    for ch in expression.bytes() {
        match ch {
            b'(' => depth += 1,
            b')' => {
                let Some(next) = depth.checked_sub(1) else {
                    return false;
                };
                depth = next;
            }
            _ => {}
        }
    }
    depth == 0
}

/// Encode with the default 32 × 32 coordinate bounds.
pub fn encode_tree(expression: &str) -> Result<MatulaEncoding, CogError> {
    TreeEncoder::default().encode(expression)
}

/// Compose with the default 32 × 32 coordinate bounds.
pub fn compose(a: &MatulaEncoding, b: &MatulaEncoding) -> Result<MatulaEncoding, CogError> {
    TreeEncoder::default().compose(a, b)
}

// =============================================================================
// TESTS
// =============================================================================
