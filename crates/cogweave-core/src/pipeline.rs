//! # Transduction Pipeline
//!
//! Mappings between the three representations:
//!
//! ```text
//!   Cogfluence unit ──cogfluence_to_atomspace──▶ Atom
//!        ▲                                        │
//!        └──tensor_to_cogfluence── Tensor ◀──atomspace_to_tensor
//! ```
//!
//! The free functions are stateless and never deduplicate: transducing the
//! same unit twice yields two atoms. [`Pipeline`] owns one store of each
//! kind plus a kernel and counts transductions.

use crate::atomspace::{AtomSpace, AtomSpaceStats};
use crate::attention::AttentionValue;
use crate::cogfluence::{CogfluenceStats, CogfluenceStore};
use crate::config::CogweaveConfig;
use crate::encoder::MatulaEncoding;
use crate::kernel::CognitiveKernel;
use crate::primitives::{KERNEL_COHERENCE, UNIT_EMBEDDING_DIM};
use crate::truth::TruthValue;
use crate::{AtomId, AtomType, CogError, Tensor, UnitId, UnitType};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// STATELESS MAPPINGS
// =============================================================================

/// Create an atom mirroring a knowledge unit.
///
/// The atom type follows [`AtomType::from`]`(UnitType)`, truth and attention
/// are copied (`sti = attention`, `lti = activation`), the embedding is the
/// unit's tensor encoding, and both sides record the mapping.
pub fn cogfluence_to_atomspace(
    store: &mut CogfluenceStore,
    space: &mut AtomSpace,
    unit: UnitId,
) -> Result<AtomId, CogError> {
    let source = store.unit(unit).ok_or(CogError::UnitNotFound(unit))?;
    let atom_type = AtomType::from(source.unit_type());
    let truth = TruthValue::new(source.truth_strength(), source.truth_confidence(), 1);
    let attention = AttentionValue::new(source.attention(), source.activation(), 0.0);
    let encoding = source.encoding().clone();
    let name = source.name().to_string();

    let atom = space.add_node(atom_type, &name)?;
    space.set_truth_value(atom, truth)?;
    space.set_attention_value(atom, attention)?;
    space.set_embedding(atom, encoding)?;
    space.set_source_unit(atom, unit)?;
    store.map_atom(unit, atom)?;

    tracing::debug!(%unit, %atom, %atom_type, "unit transduced to atom");
    Ok(atom)
}

/// The atom's embedding as a tensor, `None` if the atom is not live.
#[must_use]
pub fn atomspace_to_tensor(space: &AtomSpace, atom: AtomId) -> Option<Tensor> {
    space.atom_to_tensor(atom)
}

/// New concept unit carrying `tensor` as its embedding.
pub fn tensor_to_cogfluence(
    store: &mut CogfluenceStore,
    tensor: Tensor,
    name: &str,
) -> Result<UnitId, CogError> {
    store.add_unit(name, UnitType::Concept, Some(tensor))
}

/// Deterministic text embedding: `e[i] = ((i + len(text)) mod 256) / 255`,
/// with `len` in bytes.
#[must_use]
pub fn text_embedding(text: &str, dim: usize) -> Tensor {
    let len = text.len();
    (0..dim)
        .map(|i| ((i + len) % 256) as f32 / 255.0)
        .collect::<Vec<_>>()
        .into()
}

// =============================================================================
// PIPELINE
// =============================================================================

/// Result of [`Pipeline::full_pipeline`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineReceipt {
    pub input: String,
    pub unit: UnitId,
    pub atom: AtomId,
    pub tensor_len: usize,
}

impl fmt::Display for PipelineReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Processed: {} (Cogfluence:{}, OpenCog:{})",
            self.input, self.unit, self.atom
        )
    }
}

/// Counters across all three stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub atomspace: AtomSpaceStats,
    pub cogfluence: CogfluenceStats,
    pub total_transductions: u64,
    pub successful_transductions: u64,
}

/// One AtomSpace, one Cogfluence store and one kernel, wired together.
#[derive(Debug, Clone)]
pub struct Pipeline {
    atomspace: AtomSpace,
    cogfluence: CogfluenceStore,
    kernel: CognitiveKernel,
    total_transductions: u64,
    successful_transductions: u64,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(&CogweaveConfig::default())
    }
}

impl Pipeline {
    #[must_use]
    pub fn new(config: &CogweaveConfig) -> Self {
        Self {
            atomspace: AtomSpace::new(&config.atomspace),
            cogfluence: CogfluenceStore::new(&config.cogfluence),
            kernel: CognitiveKernel::from_config(&config.kernel),
            total_transductions: 0,
            successful_transductions: 0,
        }
    }

    pub(crate) fn from_parts(
        atomspace: AtomSpace,
        cogfluence: CogfluenceStore,
        kernel: CognitiveKernel,
        counters: (u64, u64),
    ) -> Self {
        Self {
            atomspace,
            cogfluence,
            kernel,
            total_transductions: counters.0,
            successful_transductions: counters.1,
        }
    }

    #[must_use]
    pub fn atomspace(&self) -> &AtomSpace {
        &self.atomspace
    }

    pub fn atomspace_mut(&mut self) -> &mut AtomSpace {
        &mut self.atomspace
    }

    #[must_use]
    pub fn cogfluence(&self) -> &CogfluenceStore {
        &self.cogfluence
    }

    pub fn cogfluence_mut(&mut self) -> &mut CogfluenceStore {
        &mut self.cogfluence
    }

    #[must_use]
    pub fn kernel(&self) -> &CognitiveKernel {
        &self.kernel
    }

    /// `(total, successful)` transduction counts.
    #[must_use]
    pub fn transductions(&self) -> (u64, u64) {
        (self.total_transductions, self.successful_transductions)
    }

    fn count<T>(&mut self, result: Result<T, CogError>) -> Result<T, CogError> {
        self.total_transductions += 1;
        if result.is_ok() {
            self.successful_transductions += 1;
        }
        result
    }

    /// [`cogfluence_to_atomspace`] on the owned stores.
    pub fn transduce_unit(&mut self, unit: UnitId) -> Result<AtomId, CogError> {
        let result = cogfluence_to_atomspace(&mut self.cogfluence, &mut self.atomspace, unit);
        self.count(result)
    }

    /// [`atomspace_to_tensor`] on the owned AtomSpace.
    pub fn transduce_atom(&mut self, atom: AtomId) -> Result<Tensor, CogError> {
        let result = atomspace_to_tensor(&self.atomspace, atom).ok_or(CogError::AtomNotFound(atom));
        self.count(result)
    }

    /// [`tensor_to_cogfluence`] on the owned store.
    pub fn ingest_tensor(&mut self, tensor: Tensor, name: &str) -> Result<UnitId, CogError> {
        let result = tensor_to_cogfluence(&mut self.cogfluence, tensor, name);
        self.count(result)
    }

    /// Embed `text`, store it as a unit, transduce it to an atom and back to
    /// a tensor.
    ///
    /// Fails without side effects if the unit cannot be created. Later
    /// stages keep whatever earlier stages produced.
    pub fn full_pipeline(&mut self, text: &str) -> Result<PipelineReceipt, CogError> {
        let embedding = text_embedding(text, UNIT_EMBEDDING_DIM);
        let unit = self
            .cogfluence
            .add_unit(text, UnitType::Concept, Some(embedding))?;
        let atom = self.transduce_unit(unit)?;
        let tensor = self.transduce_atom(atom)?;

        let receipt = PipelineReceipt {
            input: text.to_string(),
            unit,
            atom,
            tensor_len: tensor.len(),
        };
        tracing::debug!(%unit, %atom, "full pipeline completed");
        Ok(receipt)
    }

    /// Mean of the Cogfluence coherence, the mean live-atom strength and
    /// the fixed kernel term.
    pub fn coherence(&mut self) -> f32 {
        let cogfluence = self.cogfluence.compute_coherence();
        let atomspace = self.atomspace.stats().mean_strength;
        (cogfluence + atomspace + KERNEL_COHERENCE) / 3.0
    }

    /// One attention tick on the AtomSpace and one activation update on the
    /// Cogfluence store.
    pub fn tick(&mut self) {
        self.atomspace.update_attention_values();
        self.cogfluence.update_activations();
    }

    /// Encode a tree expression into the kernel.
    pub fn encode_expression(&mut self, expression: &str) -> Result<MatulaEncoding, CogError> {
        self.kernel.write(expression)
    }

    #[must_use]
    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            atomspace: self.atomspace.stats(),
            cogfluence: self.cogfluence.stats(),
            total_transductions: self.total_transductions,
            successful_transductions: self.successful_transductions,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CogfluenceConfig;

    #[test]
    fn text_embedding_formula() {
        let e = text_embedding("abc", 4);
        assert_eq!(e.as_slice(), &[3.0 / 255.0, 4.0 / 255.0, 5.0 / 255.0, 6.0 / 255.0]);
        let wrap = text_embedding(&"x".repeat(255), 2);
        assert_eq!(wrap.as_slice(), &[1.0, 0.0]);
    }

    #[test]
    fn unit_types_map_to_atom_types() {
        let mut store = CogfluenceStore::default();
        let mut space = AtomSpace::default();
        let rel = store.add_unit("r", UnitType::Relation, None).expect("r");
        let rule = store.add_unit("q", UnitType::Rule, None).expect("q");
        let pat = store.add_unit("p", UnitType::Pattern, None).expect("p");

        let a = cogfluence_to_atomspace(&mut store, &mut space, rel).expect("rel");
        let b = cogfluence_to_atomspace(&mut store, &mut space, rule).expect("rule");
        let c = cogfluence_to_atomspace(&mut store, &mut space, pat).expect("pat");
        assert_eq!(space.get(a).expect("a").atom_type(), AtomType::Inheritance);
        assert_eq!(space.get(b).expect("b").atom_type(), AtomType::Implication);
        assert_eq!(space.get(c).expect("c").atom_type(), AtomType::Concept);
    }

    #[test]
    fn transduction_copies_values_and_links_back() {
        let mut store = CogfluenceStore::default();
        let mut space = AtomSpace::default();
        let unit = store
            .add_unit("u", UnitType::Concept, Some(Tensor::from_vec(vec![1.0, 2.0])))
            .expect("unit");

        let atom = cogfluence_to_atomspace(&mut store, &mut space, unit).expect("atom");
        let mirrored = space.get(atom).expect("atom");
        assert_eq!(mirrored.truth_value(), TruthValue::new(0.8, 0.7, 1));
        assert_eq!(mirrored.attention_value(), AttentionValue::new(0.5, 0.5, 0.0));
        assert_eq!(mirrored.embedding().as_slice(), &[1.0, 2.0]);
        assert_eq!(mirrored.source_unit(), Some(unit));
        assert_eq!(store.unit(unit).expect("unit").atom(), Some(atom));

        // Not deduplicating.
        let again = cogfluence_to_atomspace(&mut store, &mut space, unit).expect("again");
        assert_ne!(atom, again);
        assert!(cogfluence_to_atomspace(&mut store, &mut space, UnitId(9)).is_err());
    }

    #[test]
    fn tensor_round_trip_through_units() {
        let mut store = CogfluenceStore::default();
        let tensor = Tensor::from_vec(vec![0.25; 16]);
        let unit = tensor_to_cogfluence(&mut store, tensor.clone(), "t").expect("unit");
        assert_eq!(store.unit(unit).expect("unit").embedding(), &tensor);
        assert_eq!(store.unit(unit).expect("unit").unit_type(), UnitType::Concept);
    }

    #[test]
    fn full_pipeline_receipt() {
        let mut pipeline = Pipeline::default();
        let receipt = pipeline.full_pipeline("hello").expect("pipeline");
        assert_eq!(receipt.unit, UnitId(1));
        assert_eq!(receipt.atom, AtomId(1));
        assert_eq!(receipt.tensor_len, 64);
        assert_eq!(
            receipt.to_string(),
            "Processed: hello (Cogfluence:1, OpenCog:1)"
        );
        assert_eq!(pipeline.transductions(), (2, 2));

        let atom = pipeline.atomspace().get(receipt.atom).expect("atom");
        assert_eq!(atom.embedding(), &text_embedding("hello", 64));
    }

    #[test]
    fn full_pipeline_fails_cleanly_when_store_is_full() {
        let config = CogweaveConfig {
            cogfluence: CogfluenceConfig {
                max_units: 0,
                ..CogfluenceConfig::default()
            },
            ..CogweaveConfig::default()
        };
        let mut pipeline = Pipeline::new(&config);
        assert!(pipeline.full_pipeline("x").is_err());
        assert!(pipeline.atomspace().is_empty());
        assert_eq!(pipeline.transductions(), (0, 0));
    }

    #[test]
    fn coherence_blends_three_terms() {
        let mut pipeline = Pipeline::default();
        assert!((pipeline.coherence() - 0.7 / 3.0).abs() < 1e-6);

        pipeline.full_pipeline("a").expect("a");
        pipeline.full_pipeline("bb").expect("bb");
        let cogfluence = pipeline.cogfluence_mut().compute_coherence();
        let expected = (cogfluence + 0.8 + 0.7) / 3.0;
        assert!((pipeline.coherence() - expected).abs() < 1e-6);
    }

    #[test]
    fn tick_advances_both_stores() {
        let mut pipeline = Pipeline::default();
        let receipt = pipeline.full_pipeline("tick").expect("pipeline");
        pipeline.tick();
        let unit = pipeline.cogfluence().unit(receipt.unit).expect("unit");
        assert!((unit.activation() - 0.475).abs() < 1e-6);
        let atom = pipeline.atomspace().get(receipt.atom).expect("atom");
        // sti 0.5 decays to 0.475, above threshold, so 10% moves to lti.
        assert!((atom.attention_value().sti() - 0.4275).abs() < 1e-6);
        assert_eq!(pipeline.cogfluence().clock(), 1);
    }

    #[test]
    fn encode_expression_writes_kernel() {
        let mut pipeline = Pipeline::default();
        let enc = pipeline.encode_expression("((()))").expect("encode");
        assert_eq!(enc.matula_value, 7);
        assert!(pipeline.kernel().coordinates_of(7).is_some());
    }
}
