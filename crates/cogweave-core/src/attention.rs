//! # Attention Economy
//!
//! ECAN attention values with their per-tick decay, and the standalone
//! [`AttentionAllocator`] used by simple agent attention pools.
//!
//! Clamps are part of the value type: short-term importance lives in
//! `[-1, 1]`, long-term and very-long-term importance in `[0, 1]`, whatever
//! sequence of updates is applied.

use crate::primitives::{ATTENTION_DECAY_RATE, ATTENTION_THRESHOLD, STI_TO_LTI_RATE};
use crate::truth::{clamp_unit, in_range};
use crate::CogError;
use serde::{Deserialize, Serialize};

// =============================================================================
// ATTENTION VALUE
// =============================================================================

/// ECAN attention value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AttentionValue {
    sti: f32,
    lti: f32,
    vlti: f32,
}

impl AttentionValue {
    /// Build an attention value, clamping every component.
    #[must_use]
    pub fn new(sti: f32, lti: f32, vlti: f32) -> Self {
        Self {
            sti: clamp_unit(sti, -1.0, 1.0),
            lti: clamp_unit(lti, 0.0, 1.0),
            vlti: clamp_unit(vlti, 0.0, 1.0),
        }
    }

    pub(crate) fn is_normalized(&self) -> bool {
        in_range(self.sti, -1.0, 1.0)
            && in_range(self.lti, 0.0, 1.0)
            && in_range(self.vlti, 0.0, 1.0)
    }

    #[must_use]
    pub fn sti(&self) -> f32 {
        self.sti
    }

    #[must_use]
    pub fn lti(&self) -> f32 {
        self.lti
    }

    #[must_use]
    pub fn vlti(&self) -> f32 {
        self.vlti
    }

    /// Add `delta` to STI, clamped.
    #[must_use]
    pub fn stimulated(&self, delta: f32) -> Self {
        Self::new(self.sti + delta, self.lti, self.vlti)
    }

    /// One ECAN tick: decay, then move part of any STI above the threshold
    /// into LTI.
    #[must_use]
    pub fn decayed(&self, params: &EcanParams) -> Self {
        let mut sti = self.sti * params.decay_rate;
        let mut lti = self.lti * params.decay_rate;
        if sti > params.sti_threshold {
            let transfer = sti * params.transfer_rate;
            lti += transfer;
            sti -= transfer;
        }
        Self::new(sti, lti, self.vlti)
    }
}

/// Parameters of the per-tick attention update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcanParams {
    pub decay_rate: f32,
    pub sti_threshold: f32,
    pub transfer_rate: f32,
}

impl Default for EcanParams {
    fn default() -> Self {
        Self {
            decay_rate: ATTENTION_DECAY_RATE,
            sti_threshold: ATTENTION_THRESHOLD,
            transfer_rate: STI_TO_LTI_RATE,
        }
    }
}

// =============================================================================
// ATTENTION ALLOCATOR
// =============================================================================

/// Attention pool an agent can spend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CognitiveFunction {
    Memory,
    Reasoning,
    Communication,
    SelfModification,
}

impl CognitiveFunction {
    pub const ALL: [CognitiveFunction; 4] = [
        CognitiveFunction::Memory,
        CognitiveFunction::Reasoning,
        CognitiveFunction::Communication,
        CognitiveFunction::SelfModification,
    ];

    fn slot(self) -> usize {
        match self {
            CognitiveFunction::Memory => 0,
            CognitiveFunction::Reasoning => 1,
            CognitiveFunction::Communication => 2,
            CognitiveFunction::SelfModification => 3,
        }
    }
}

const HISTORY_LEN: usize = 100;

/// Fixed-budget attention pool split across [`CognitiveFunction`]s.
#[derive(Debug, Clone)]
pub struct AttentionAllocator {
    total: f32,
    allocations: [f32; 4],
    min_threshold: f32,
    decay_rate: f32,
    novelty_bonus: f32,
    history: Vec<f32>,
    history_index: usize,
}

impl Default for AttentionAllocator {
    fn default() -> Self {
        Self {
            total: 1.0,
            allocations: [0.0; 4],
            min_threshold: 0.1,
            decay_rate: 0.01,
            novelty_bonus: 0.2,
            history: Vec::with_capacity(HISTORY_LEN),
            history_index: 0,
        }
    }
}

impl AttentionAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn total(&self) -> f32 {
        self.total
    }

    /// Sum of all allocations.
    #[must_use]
    pub fn allocated(&self) -> f32 {
        self.allocations.iter().sum()
    }

    #[must_use]
    pub fn allocation(&self, function: CognitiveFunction) -> f32 {
        self.allocations[function.slot()]
    }

    /// Whether an offer of `amount` is large enough to be processed.
    #[must_use]
    pub fn accepts(&self, amount: f32) -> bool {
        amount >= self.min_threshold
    }

    /// Grant `amount` to `function`.
    ///
    /// When the budget would be exceeded, existing allocations shrink
    /// proportionally to make room. Negative, non-finite or over-budget
    /// amounts are rejected.
    pub fn allocate(&mut self, amount: f32, function: CognitiveFunction) -> Result<(), CogError> {
        if !amount.is_finite() || amount < 0.0 || amount > self.total {
            return Err(CogError::InvalidAmount(format!(
                "attention allocation {amount} outside [0, {}]",
                self.total
            )));
        }

        let allocated = self.allocated();
        let excess = allocated + amount - self.total;
        if excess > 0.0 && allocated > 0.0 {
            let keep = 1.0 - (excess / allocated).min(1.0);
            for slot in &mut self.allocations {
                *slot *= keep;
            }
        }
        self.allocations[function.slot()] += amount;
        tracing::trace!(?function, amount, allocated = self.allocated(), "attention allocated");
        Ok(())
    }

    /// Shrink every allocation by the decay rate.
    pub fn decay(&mut self) {
        let keep = 1.0 - self.decay_rate;
        for slot in &mut self.allocations {
            *slot *= keep;
        }
    }

    /// `clamp(0.5 + novelty · novelty_bonus, 0, 1)`.
    #[must_use]
    pub fn salience(&self, novelty: f32) -> f32 {
        clamp_unit(0.5 + novelty * self.novelty_bonus, 0.0, 1.0)
    }

    /// Record a performance sample in the 100-entry ring.
    pub fn record_performance(&mut self, performance: f32) {
        if self.history.len() < HISTORY_LEN {
            self.history.push(performance);
        } else {
            self.history[self.history_index] = performance;
        }
        self.history_index = (self.history_index + 1) % HISTORY_LEN;
    }

    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Mean of the recorded samples, 0 when empty.
    #[must_use]
    pub fn mean_performance(&self) -> f32 {
        if self.history.is_empty() {
            return 0.0;
        }
        self.history.iter().sum::<f32>() / self.history.len() as f32
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_clamps_each_component() {
        let av = AttentionValue::new(3.0, -1.0, 2.0);
        assert_eq!(av.sti(), 1.0);
        assert_eq!(av.lti(), 0.0);
        assert_eq!(av.vlti(), 1.0);
        assert_eq!(AttentionValue::new(-5.0, 0.5, 0.5).sti(), -1.0);
    }

    #[test]
    fn decay_transfers_sti_into_lti() {
        let params = EcanParams::default();
        let av = AttentionValue::new(1.0, 0.0, 0.0).decayed(&params);
        // 0.95 decay, then 10% of 0.95 moved to LTI.
        assert!((av.sti() - 0.855).abs() < 1e-6);
        assert!((av.lti() - 0.095).abs() < 1e-6);

        let low = AttentionValue::new(0.1, 0.5, 0.0).decayed(&params);
        assert!((low.sti() - 0.095).abs() < 1e-6);
        assert!((low.lti() - 0.475).abs() < 1e-6);
    }

    #[test]
    fn negative_sti_only_decays() {
        let av = AttentionValue::new(-0.5, 0.0, 0.0).decayed(&EcanParams::default());
        assert!((av.sti() + 0.475).abs() < 1e-6);
        assert_eq!(av.lti(), 0.0);
    }

    #[test]
    fn allocator_shrinks_on_overflow() {
        let mut alloc = AttentionAllocator::new();
        alloc
            .allocate(0.6, CognitiveFunction::Memory)
            .expect("memory");
        alloc
            .allocate(0.3, CognitiveFunction::Reasoning)
            .expect("reasoning");
        alloc
            .allocate(0.4, CognitiveFunction::Communication)
            .expect("communication");
        assert!((alloc.allocated() - 1.0).abs() < 1e-5);
        assert!((alloc.allocation(CognitiveFunction::Memory) - 0.4).abs() < 1e-5);
        assert!((alloc.allocation(CognitiveFunction::Reasoning) - 0.2).abs() < 1e-5);
        assert!((alloc.allocation(CognitiveFunction::Communication) - 0.4).abs() < 1e-5);
    }

    #[test]
    fn allocator_rejects_bad_amounts() {
        let mut alloc = AttentionAllocator::new();
        assert!(alloc.allocate(-0.1, CognitiveFunction::Memory).is_err());
        assert!(alloc.allocate(f32::NAN, CognitiveFunction::Memory).is_err());
        assert!(alloc.allocate(1.5, CognitiveFunction::Memory).is_err());
        assert_eq!(alloc.allocated(), 0.0);
        assert!(!alloc.accepts(0.05));
        assert!(alloc.accepts(0.1));
    }

    #[test]
    fn allocator_decay_and_salience() {
        let mut alloc = AttentionAllocator::new();
        alloc
            .allocate(0.5, CognitiveFunction::SelfModification)
            .expect("allocate");
        alloc.decay();
        assert!((alloc.allocation(CognitiveFunction::SelfModification) - 0.495).abs() < 1e-6);
        assert!((alloc.salience(0.3) - 0.56).abs() < 1e-6);
        assert_eq!(alloc.salience(10.0), 1.0);
    }

    #[test]
    fn performance_history_is_a_ring() {
        let mut alloc = AttentionAllocator::new();
        for _ in 0..100 {
            alloc.record_performance(0.0);
        }
        for _ in 0..50 {
            alloc.record_performance(1.0);
        }
        assert_eq!(alloc.history_len(), 100);
        assert!((alloc.mean_performance() - 0.5).abs() < 1e-6);
    }
}
