//! # Truth-Value Algebra
//!
//! PLN-style truth values and the pure combinators used by AtomSpace
//! inference.
//!
//! ```text
//! AND(a, b)         = (min(sa, sb), conf(ca, cb), min(na, nb))
//! OR(a, b)          = (max(sa, sb), conf(ca, cb), max(na, nb))
//! NOT(a)            = (1 - sa, ca, na)
//! deduction(a, b)   = (sa * sb,     conf(ca, cb), min(na, nb))
//! implication(p, c) = (1 - sp + sp*sc, conf(cp, cc), min(np, nc))
//!
//! conf(x, y) = x*y / (x + y - x*y)      (0 when the denominator is 0)
//! ```
//!
//! Deduction multiplies strengths; it is not AND.

use serde::{Deserialize, Serialize};

/// Clamp into `[lo, hi]`, mapping NaN to `lo`.
pub(crate) fn clamp_unit(value: f32, lo: f32, hi: f32) -> f32 {
    if value.is_nan() { lo } else { value.clamp(lo, hi) }
}

/// `lo <= value <= hi`; NaN is never in range.
pub(crate) fn in_range(value: f32, lo: f32, hi: f32) -> bool {
    (lo..=hi).contains(&value)
}

/// A PLN truth value. Strength and confidence always lie in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TruthValue {
    strength: f32,
    confidence: f32,
    count: u32,
}

impl Default for TruthValue {
    fn default() -> Self {
        Self::new(
            crate::primitives::DEFAULT_STRENGTH,
            crate::primitives::DEFAULT_CONFIDENCE,
            1,
        )
    }
}

impl TruthValue {
    /// Build a truth value, clamping strength and confidence.
    #[must_use]
    pub fn new(strength: f32, confidence: f32, count: u32) -> Self {
        Self {
            strength: clamp_unit(strength, 0.0, 1.0),
            confidence: clamp_unit(confidence, 0.0, 1.0),
            count,
        }
    }

    /// Whether the value is already what [`TruthValue::new`] would produce.
    pub(crate) fn is_normalized(&self) -> bool {
        in_range(self.strength, 0.0, 1.0) && in_range(self.confidence, 0.0, 1.0)
    }

    #[must_use]
    pub fn strength(&self) -> f32 {
        self.strength
    }

    #[must_use]
    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    #[must_use]
    pub fn count(&self) -> u32 {
        self.count
    }

    #[must_use]
    pub fn and(&self, other: &TruthValue) -> TruthValue {
        TruthValue::new(
            self.strength.min(other.strength),
            combine_confidence(self.confidence, other.confidence),
            self.count.min(other.count),
        )
    }

    #[must_use]
    pub fn or(&self, other: &TruthValue) -> TruthValue {
        TruthValue::new(
            self.strength.max(other.strength),
            combine_confidence(self.confidence, other.confidence),
            self.count.max(other.count),
        )
    }

    #[must_use]
    pub fn not(&self) -> TruthValue {
        TruthValue::new(1.0 - self.strength, self.confidence, self.count)
    }

    /// Transitive inference: `self` is A→B, `other` is B→C.
    #[must_use]
    pub fn deduction(&self, other: &TruthValue) -> TruthValue {
        TruthValue::new(
            self.strength * other.strength,
            combine_confidence(self.confidence, other.confidence),
            self.count.min(other.count),
        )
    }

    /// Material implication `self → other`.
    #[must_use]
    pub fn implication(&self, other: &TruthValue) -> TruthValue {
        TruthValue::new(
            1.0 - self.strength + self.strength * other.strength,
            combine_confidence(self.confidence, other.confidence),
            self.count.min(other.count),
        )
    }
}

/// `x*y / (x + y - x*y)`, or 0 when both inputs are 0.
#[must_use]
pub fn combine_confidence(x: f32, y: f32) -> f32 {
    let denominator = x + y - x * y;
    if denominator > 0.0 {
        clamp_unit(x * y / denominator, 0.0, 1.0)
    } else {
        0.0
    }
}

/// Binary PLN rule selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlnRule {
    And,
    Or,
    Deduction,
    Implication,
}

impl PlnRule {
    #[must_use]
    pub fn apply(self, a: &TruthValue, b: &TruthValue) -> TruthValue {
        match self {
            PlnRule::And => a.and(b),
            PlnRule::Or => a.or(b),
            PlnRule::Deduction => a.deduction(b),
            PlnRule::Implication => a.implication(b),
        }
    }
}
