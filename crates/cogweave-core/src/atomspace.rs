//! # AtomSpace
//!
//! Typed hypergraph of nodes and links carrying PLN truth values and ECAN
//! attention values.
//!
//! Atoms live in an arena indexed by `id - 1`. Ids are handed out in order,
//! start at 1 and are never recycled; deletion only sets a tombstone, so a
//! stale id can never resolve to an unrelated atom.
//!
//! Deleting an atom does not rewrite the outgoing/incoming lists of the
//! atoms that reference it. Those lists keep the dead id until the
//! referencing atoms are deleted themselves.

use crate::attention::{AttentionValue, EcanParams};
use crate::config::AtomSpaceConfig;
use crate::primitives::{
    ATOM_EMBEDDING_DIM, MAX_ATOM_NAME, SIMILARITY_LINK_THRESHOLD, SIMILARITY_MAX_CONFIDENCE,
};
use crate::truth::TruthValue;
use crate::types::bounded_name;
use crate::{AtomId, AtomType, CapacityKind, CogError, Tensor, UnitId};
use serde::{Deserialize, Serialize};

// =============================================================================
// ATOM
// =============================================================================

/// One node or link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    id: AtomId,
    name: String,
    atom_type: AtomType,
    truth: TruthValue,
    attention: AttentionValue,
    embedding: Tensor,
    outgoing: Vec<AtomId>,
    incoming: Vec<AtomId>,
    source_unit: Option<UnitId>,
    deleted: bool,
    created_at: u64,
    last_access: u64,
}

impl Atom {
    #[must_use]
    pub fn id(&self) -> AtomId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn atom_type(&self) -> AtomType {
        self.atom_type
    }

    #[must_use]
    pub fn truth_value(&self) -> TruthValue {
        self.truth
    }

    #[must_use]
    pub fn attention_value(&self) -> AttentionValue {
        self.attention
    }

    #[must_use]
    pub fn embedding(&self) -> &Tensor {
        &self.embedding
    }

    #[must_use]
    pub fn outgoing(&self) -> &[AtomId] {
        &self.outgoing
    }

    #[must_use]
    pub fn incoming(&self) -> &[AtomId] {
        &self.incoming
    }

    /// Knowledge unit this atom was transduced from, if any.
    #[must_use]
    pub fn source_unit(&self) -> Option<UnitId> {
        self.source_unit
    }

    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    #[must_use]
    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    #[must_use]
    pub fn last_access(&self) -> u64 {
        self.last_access
    }

    /// Binary link endpoints `(outgoing[0], outgoing[1])`.
    fn pair(&self) -> Option<(AtomId, AtomId)> {
        match self.outgoing.as_slice() {
            [first, second, ..] => Some((*first, *second)),
            _ => None,
        }
    }
}

/// `byte / 255` for the first name bytes, zero padded.
fn name_embedding(name: &str) -> Tensor {
    let mut embedding = Tensor::zeros(ATOM_EMBEDDING_DIM);
    for (slot, byte) in embedding.as_mut_slice().iter_mut().zip(name.bytes()) {
        *slot = f32::from(byte) / 255.0;
    }
    embedding
}

// =============================================================================
// STATISTICS
// =============================================================================

/// Snapshot of AtomSpace counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomSpaceStats {
    pub atoms: usize,
    pub live_atoms: usize,
    pub capacity: usize,
    pub total_inferences: u64,
    pub successful_inferences: u64,
    pub reasoning_accuracy: f32,
    /// Live atoms per type, in [`AtomType::ALL`] order.
    pub by_type: Vec<(AtomType, usize)>,
    pub mean_sti: f32,
    pub mean_lti: f32,
    pub mean_strength: f32,
}

// =============================================================================
// ATOMSPACE
// =============================================================================

/// Arena of atoms with its inference counters.
#[derive(Debug, Clone)]
pub struct AtomSpace {
    atoms: Vec<Atom>,
    max_atoms: usize,
    default_truth: TruthValue,
    ecan: EcanParams,
    clock: u64,
    total_inferences: u64,
    successful_inferences: u64,
}

impl Default for AtomSpace {
    fn default() -> Self {
        Self::new(&AtomSpaceConfig::default())
    }
}

impl AtomSpace {
    /// Create an empty AtomSpace.
    #[must_use]
    pub fn new(config: &AtomSpaceConfig) -> Self {
        Self {
            atoms: Vec::new(),
            max_atoms: config.max_atoms,
            default_truth: TruthValue::new(config.default_strength, config.default_confidence, 1),
            ecan: config.ecan,
            clock: 0,
            total_inferences: 0,
            successful_inferences: 0,
        }
    }

    /// Number of atoms ever created, deleted ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    #[must_use]
    pub fn live_count(&self) -> usize {
        self.iter().count()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.max_atoms
    }

    #[must_use]
    pub fn ecan_params(&self) -> &EcanParams {
        &self.ecan
    }

    /// Live atoms in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Atom> {
        self.atoms.iter().filter(|atom| !atom.deleted)
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn slot(id: AtomId) -> Option<usize> {
        usize::try_from(id.0).ok()?.checked_sub(1)
    }

    /// Resolve a live atom.
    #[must_use]
    pub fn get(&self, id: AtomId) -> Option<&Atom> {
        self.atoms
            .get(Self::slot(id)?)
            .filter(|atom| !atom.deleted)
    }

    fn get_mut(&mut self, id: AtomId) -> Result<&mut Atom, CogError> {
        let slot = Self::slot(id)
            .filter(|slot| self.atoms.get(*slot).is_some_and(|atom| !atom.deleted))
            .ok_or(CogError::AtomNotFound(id))?;
        let now = self.tick();
        let atom = &mut self.atoms[slot];
        atom.last_access = now;
        Ok(atom)
    }

    #[must_use]
    pub fn contains(&self, id: AtomId) -> bool {
        self.get(id).is_some()
    }

    fn ensure_capacity(&self) -> Result<(), CogError> {
        if self.atoms.len() >= self.max_atoms {
            return Err(CogError::CapacityExceeded {
                kind: CapacityKind::Atoms,
                limit: self.max_atoms,
            });
        }
        Ok(())
    }

    fn push(
        &mut self,
        atom_type: AtomType,
        name: String,
        embedding: Tensor,
        outgoing: Vec<AtomId>,
    ) -> AtomId {
        let id = AtomId(self.atoms.len() as u64 + 1);
        let now = self.tick();
        self.atoms.push(Atom {
            id,
            name,
            atom_type,
            truth: self.default_truth,
            attention: AttentionValue::default(),
            embedding,
            outgoing,
            incoming: Vec::new(),
            source_unit: None,
            deleted: false,
            created_at: now,
            last_access: now,
        });
        id
    }

    // -------------------------------------------------------------------------
    // Insertion / deletion
    // -------------------------------------------------------------------------

    /// Add a named atom. Names longer than 255 bytes are truncated.
    ///
    /// Any type tag is accepted; link tags on a node are how transduced
    /// relation and rule units are represented.
    pub fn add_node(&mut self, atom_type: AtomType, name: &str) -> Result<AtomId, CogError> {
        self.ensure_capacity()?;
        let name = bounded_name(name, MAX_ATOM_NAME);
        let embedding = name_embedding(&name);
        let id = self.push(atom_type, name, embedding, Vec::new());
        tracing::debug!(%id, %atom_type, "node added");
        Ok(id)
    }

    /// Add a link over `outgoing`, which must be non-empty and all live.
    pub fn add_link(
        &mut self,
        atom_type: AtomType,
        outgoing: &[AtomId],
    ) -> Result<AtomId, CogError> {
        if outgoing.is_empty() {
            return Err(CogError::InvalidLink("link has no targets".to_string()));
        }
        if let Some(missing) = outgoing.iter().find(|id| !self.contains(**id)) {
            return Err(CogError::InvalidLink(format!(
                "target {missing} is not a live atom"
            )));
        }
        self.ensure_capacity()?;

        let id = AtomId(self.atoms.len() as u64 + 1);
        let name = format!("link_{id}");
        let id = self.push(atom_type, name, Tensor::zeros(ATOM_EMBEDDING_DIM), outgoing.to_vec());
        for target in outgoing {
            if let Some(slot) = Self::slot(*target) {
                self.atoms[slot].incoming.push(id);
            }
        }
        tracing::debug!(%id, %atom_type, arity = outgoing.len(), "link added");
        Ok(id)
    }

    /// Tombstone an atom.
    pub fn delete(&mut self, id: AtomId) -> Result<(), CogError> {
        self.get_mut(id)?.deleted = true;
        tracing::debug!(%id, "atom deleted");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Values
    // -------------------------------------------------------------------------

    pub fn set_truth_value(&mut self, id: AtomId, truth: TruthValue) -> Result<(), CogError> {
        self.get_mut(id)?.truth = truth;
        Ok(())
    }

    #[must_use]
    pub fn truth_value(&self, id: AtomId) -> Option<TruthValue> {
        self.get(id).map(Atom::truth_value)
    }

    pub fn set_attention_value(
        &mut self,
        id: AtomId,
        attention: AttentionValue,
    ) -> Result<(), CogError> {
        self.get_mut(id)?.attention = attention;
        Ok(())
    }

    #[must_use]
    pub fn attention_value(&self, id: AtomId) -> Option<AttentionValue> {
        self.get(id).map(Atom::attention_value)
    }

    pub fn set_embedding(&mut self, id: AtomId, embedding: Tensor) -> Result<(), CogError> {
        self.get_mut(id)?.embedding = embedding;
        Ok(())
    }

    /// Record the knowledge unit an atom came from.
    pub fn set_source_unit(&mut self, id: AtomId, unit: UnitId) -> Result<(), CogError> {
        self.get_mut(id)?.source_unit = Some(unit);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // ECAN
    // -------------------------------------------------------------------------

    /// One attention tick over every live atom.
    pub fn update_attention_values(&mut self) {
        let params = self.ecan;
        for atom in self.atoms.iter_mut().filter(|atom| !atom.deleted) {
            atom.attention = atom.attention.decayed(&params);
        }
        tracing::trace!(atoms = self.atoms.len(), "attention values updated");
    }

    /// Split `amount` of STI evenly over the live outgoing targets, and
    /// separately over the live incoming links, of `source`.
    pub fn spread_attention(&mut self, source: AtomId, amount: f32) -> Result<(), CogError> {
        if amount.is_nan() {
            return Err(CogError::InvalidAmount("spread amount is NaN".to_string()));
        }
        let atom = self.get(source).ok_or(CogError::AtomNotFound(source))?;
        let outgoing = atom.outgoing.clone();
        let incoming = atom.incoming.clone();

        for neighbors in [outgoing, incoming] {
            if neighbors.is_empty() {
                continue;
            }
            let share = amount / neighbors.len() as f32;
            for target in neighbors {
                let target = Self::slot(target).and_then(|slot| self.atoms.get_mut(slot));
                if let Some(target) = target.filter(|atom| !atom.deleted) {
                    target.attention = target.attention.stimulated(share);
                }
            }
        }
        tracing::trace!(%source, amount, "attention spread");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // PLN inference
    // -------------------------------------------------------------------------

    /// Last live inheritance link whose first two targets are `(from, to)`.
    fn find_inheritance(&self, from: AtomId, to: AtomId) -> Option<&Atom> {
        self.iter()
            .filter(|atom| atom.atom_type == AtomType::Inheritance)
            .filter(|atom| atom.pair() == Some((from, to)))
            .last()
    }

    fn record_inference(&mut self, success: bool) {
        self.total_inferences += 1;
        if success {
            self.successful_inferences += 1;
        }
    }

    /// Deduce `a → c` from `a → b` and `b → c`.
    ///
    /// Returns `Ok(None)` when either premise is missing. The new link's
    /// strength is the product of the premise strengths.
    pub fn infer_inheritance(
        &mut self,
        a: AtomId,
        b: AtomId,
        c: AtomId,
    ) -> Result<Option<AtomId>, CogError> {
        let (Some(ab), Some(bc)) = (self.find_inheritance(a, b), self.find_inheritance(b, c)) else {
            return Ok(None);
        };
        let truth = ab.truth.deduction(&bc.truth);

        let link = self
            .add_link(AtomType::Inheritance, &[a, c])
            .and_then(|link| self.set_truth_value(link, truth).map(|()| link));
        self.record_inference(link.is_ok());
        let link = link?;
        tracing::debug!(
            %a,
            %c,
            strength = truth.strength(),
            confidence = truth.confidence(),
            "inheritance inferred"
        );
        Ok(Some(link))
    }

    /// Strength-weighted Jaccard similarity over live inheritance links,
    /// materialized as a similarity link when it exceeds 0.1.
    pub fn infer_similarity(&mut self, a: AtomId, b: AtomId) -> Result<Option<AtomId>, CogError> {
        let mut common = 0.0_f32;
        let mut total_a = 0.0_f32;
        let mut total_b = 0.0_f32;
        for atom in self.iter().filter(|atom| atom.atom_type == AtomType::Inheritance) {
            let Some((first, second)) = atom.pair() else {
                continue;
            };
            let touches_a = first == a || second == a;
            let touches_b = first == b || second == b;
            let strength = atom.truth.strength();
            if touches_a && touches_b {
                common += strength;
            }
            if touches_a {
                total_a += strength;
            }
            if touches_b {
                total_b += strength;
            }
        }

        let union = total_a + total_b - common;
        let similarity = if union > 0.0 { common / union } else { 0.0 };
        if similarity <= SIMILARITY_LINK_THRESHOLD {
            self.record_inference(false);
            return Ok(None);
        }

        let truth = TruthValue::new(
            similarity,
            SIMILARITY_MAX_CONFIDENCE.min(common / 10.0),
            1,
        );
        let link = self
            .add_link(AtomType::Similarity, &[a, b])
            .and_then(|link| self.set_truth_value(link, truth).map(|()| link));
        self.record_inference(link.is_ok());
        let link = link?;
        tracing::debug!(%a, %b, similarity, "similarity inferred");
        Ok(Some(link))
    }

    /// Cosine of the two embeddings when both have non-zero norm, otherwise
    /// the strength share of live multi-target links that contain both atoms.
    /// 0 when either atom is not live or the embedding widths differ.
    #[must_use]
    pub fn compute_similarity(&self, a: AtomId, b: AtomId) -> f32 {
        let (Some(atom_a), Some(atom_b)) = (self.get(a), self.get(b)) else {
            return 0.0;
        };
        let (ea, eb) = (&atom_a.embedding, &atom_b.embedding);
        if !ea.is_empty() && !eb.is_empty() {
            if ea.len() != eb.len() {
                return 0.0;
            }
            if let Some(cosine) = ea.try_cosine(eb) {
                return cosine;
            }
        }

        let mut shared = 0.0_f32;
        let mut total = 0.0_f32;
        for link in self.iter().filter(|atom| atom.outgoing.len() >= 2) {
            let has_a = link.outgoing.contains(&a);
            let has_b = link.outgoing.contains(&b);
            let strength = link.truth.strength();
            if has_a && has_b {
                shared += strength;
            }
            if has_a || has_b {
                total += strength;
            }
        }
        if total > 0.0 { shared / total } else { 0.0 }
    }

    /// Fraction of inferences that produced a link, 0 before any.
    #[must_use]
    pub fn reasoning_accuracy(&self) -> f32 {
        if self.total_inferences == 0 {
            0.0
        } else {
            self.successful_inferences as f32 / self.total_inferences as f32
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn query_by_type(&self, atom_type: AtomType) -> Vec<AtomId> {
        self.iter()
            .filter(|atom| atom.atom_type == atom_type)
            .map(Atom::id)
            .collect()
    }

    #[must_use]
    pub fn query_by_name(&self, name: &str) -> Vec<AtomId> {
        self.iter()
            .filter(|atom| atom.name == name)
            .map(Atom::id)
            .collect()
    }

    /// Links pointing at `id`, stale ones included. Empty if `id` is dead.
    #[must_use]
    pub fn query_incoming(&self, id: AtomId) -> Vec<AtomId> {
        self.get(id).map(|atom| atom.incoming.clone()).unwrap_or_default()
    }

    /// Targets of `id`, stale ones included. Empty if `id` is dead.
    #[must_use]
    pub fn query_outgoing(&self, id: AtomId) -> Vec<AtomId> {
        self.get(id).map(|atom| atom.outgoing.clone()).unwrap_or_default()
    }

    // -------------------------------------------------------------------------
    // Tensor bridge
    // -------------------------------------------------------------------------

    /// Copy of the atom's embedding.
    #[must_use]
    pub fn atom_to_tensor(&self, id: AtomId) -> Option<Tensor> {
        self.get(id).map(|atom| atom.embedding.clone())
    }

    /// New concept node carrying `tensor` as its embedding.
    pub fn tensor_to_atom(&mut self, tensor: Tensor, name: &str) -> Result<AtomId, CogError> {
        let id = self.add_node(AtomType::Concept, name)?;
        self.set_embedding(id, tensor)?;
        Ok(id)
    }

    // -------------------------------------------------------------------------
    // Statistics
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn stats(&self) -> AtomSpaceStats {
        let live = self.live_count();
        let mean = |f: fn(&Atom) -> f32| {
            if live == 0 {
                0.0
            } else {
                self.iter().map(f).sum::<f32>() / live as f32
            }
        };
        AtomSpaceStats {
            atoms: self.atoms.len(),
            live_atoms: live,
            capacity: self.max_atoms,
            total_inferences: self.total_inferences,
            successful_inferences: self.successful_inferences,
            reasoning_accuracy: self.reasoning_accuracy(),
            by_type: AtomType::ALL
                .iter()
                .map(|t| (*t, self.iter().filter(|atom| atom.atom_type == *t).count()))
                .collect(),
            mean_sti: mean(|atom| atom.attention.sti()),
            mean_lti: mean(|atom| atom.attention.lti()),
            mean_strength: mean(|atom| atom.truth.strength()),
        }
    }

    // -------------------------------------------------------------------------
    // Snapshot support
    // -------------------------------------------------------------------------

    /// Source unit of any atom record, deleted ones included.
    pub(crate) fn record_source_unit(&self, id: AtomId) -> Option<UnitId> {
        self.atoms.get(Self::slot(id)?)?.source_unit
    }

    pub(crate) fn to_record(&self) -> AtomSpaceRecord {
        AtomSpaceRecord {
            atoms: self.atoms.clone(),
            max_atoms: self.max_atoms,
            default_truth: self.default_truth,
            ecan: self.ecan,
            clock: self.clock,
            total_inferences: self.total_inferences,
            successful_inferences: self.successful_inferences,
        }
    }

    /// Rebuild from a decoded record, checking id density, value ranges,
    /// link targets and that every incoming list is the transpose of the
    /// outgoing lists.
    pub(crate) fn from_record(record: AtomSpaceRecord) -> Result<Self, CogError> {
        let invalid = |msg: String| Err(CogError::DeserializationError(msg));
        if !record.default_truth.is_normalized() {
            return invalid("default truth value out of range".to_string());
        }
        let atoms = record.atoms;
        if atoms.len() > record.max_atoms {
            return invalid(format!(
                "{} atoms exceed capacity {}",
                atoms.len(),
                record.max_atoms
            ));
        }

        let mut forward = Vec::new();
        for (slot, atom) in atoms.iter().enumerate() {
            if atom.id.0 != slot as u64 + 1 {
                return invalid(format!("atom {} stored at slot {slot}", atom.id));
            }
            if !atom.truth.is_normalized() || !atom.attention.is_normalized() {
                return invalid(format!("atom {} carries out-of-range values", atom.id));
            }
            for target in &atom.outgoing {
                if Self::slot(*target).is_none_or(|t| t >= atoms.len()) {
                    return invalid(format!("atom {} links to unknown {target}", atom.id));
                }
                forward.push((*target, atom.id));
            }
        }
        let mut backward: Vec<(AtomId, AtomId)> = atoms
            .iter()
            .flat_map(|atom| atom.incoming.iter().map(move |link| (atom.id, *link)))
            .collect();
        forward.sort_unstable();
        backward.sort_unstable();
        if forward != backward {
            return invalid("incoming lists do not mirror outgoing lists".to_string());
        }

        Ok(Self {
            atoms,
            max_atoms: record.max_atoms,
            default_truth: record.default_truth,
            ecan: record.ecan,
            clock: record.clock,
            total_inferences: record.total_inferences,
            successful_inferences: record.successful_inferences,
        })
    }
}

/// Serialized form of an [`AtomSpace`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct AtomSpaceRecord {
    pub(crate) atoms: Vec<Atom>,
    max_atoms: usize,
    default_truth: TruthValue,
    ecan: EcanParams,
    clock: u64,
    total_inferences: u64,
    successful_inferences: u64,
}

// =============================================================================
// TESTS
// =============================================================================
