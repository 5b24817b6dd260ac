//! # Cogfluence Store
//!
//! Named knowledge units with embeddings and symmetric relations, plus
//! ordered workflows whose execution nudges the activation of the units
//! they step through.
//!
//! Units and workflows draw ids from one counter, so a `UnitId` and a
//! `WorkflowId` from the same store never share a value. Units are never
//! removed.

use crate::config::CogfluenceConfig;
use crate::kernel::CognitiveKernel;
use crate::primitives::{
    ACTIVATION_DECAY, ATTENTION_EMA_WEIGHT, INITIAL_UNIT_ATTENTION, MAX_UNIT_NAME, RELATION_BOOST,
    STEP_ACTIVATION_BOOST, STEP_ATTENTION_BOOST, UNIT_TRUTH_CONFIDENCE, UNIT_TRUTH_STRENGTH,
};
use crate::truth::{clamp_unit, in_range};
use crate::types::bounded_name;
use crate::{AtomId, CapacityKind, CogError, Tensor, UnitId, UnitType, WorkflowId};
use serde::{Deserialize, Serialize};

// =============================================================================
// KNOWLEDGE UNIT
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeUnit {
    id: UnitId,
    name: String,
    unit_type: UnitType,
    embedding: Tensor,
    encoding: Tensor,
    atom: Option<AtomId>,
    truth_strength: f32,
    truth_confidence: f32,
    activation: f32,
    attention: f32,
    related: Vec<UnitId>,
    created_at: u64,
    last_modified: u64,
}

impl KnowledgeUnit {
    #[must_use]
    pub fn id(&self) -> UnitId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn unit_type(&self) -> UnitType {
        self.unit_type
    }

    #[must_use]
    pub fn embedding(&self) -> &Tensor {
        &self.embedding
    }

    /// Tensor mirror of the embedding, used for similarity and transduction.
    #[must_use]
    pub fn encoding(&self) -> &Tensor {
        &self.encoding
    }

    /// Atom this unit was transduced into, if any.
    #[must_use]
    pub fn atom(&self) -> Option<AtomId> {
        self.atom
    }

    #[must_use]
    pub fn truth_strength(&self) -> f32 {
        self.truth_strength
    }

    #[must_use]
    pub fn truth_confidence(&self) -> f32 {
        self.truth_confidence
    }

    #[must_use]
    pub fn activation(&self) -> f32 {
        self.activation
    }

    #[must_use]
    pub fn attention(&self) -> f32 {
        self.attention
    }

    #[must_use]
    pub fn related(&self) -> &[UnitId] {
        &self.related
    }

    #[must_use]
    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    #[must_use]
    pub fn last_modified(&self) -> u64 {
        self.last_modified
    }

    /// Cosine of the encodings when comparable; otherwise 0.5 for units of
    /// the same type and 0.1 for different types.
    #[must_use]
    pub fn similarity(&self, other: &KnowledgeUnit) -> f32 {
        self.encoding
            .try_cosine(&other.encoding)
            .unwrap_or(if self.unit_type == other.unit_type { 0.5 } else { 0.1 })
    }
}

// =============================================================================
// WORKFLOW
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    id: WorkflowId,
    name: String,
    steps: Vec<UnitId>,
    active: bool,
    current_step: usize,
    completion_ratio: f32,
    success_rate: f32,
    efficiency_score: f32,
    execution_count: u64,
}

impl Workflow {
    #[must_use]
    pub fn id(&self) -> WorkflowId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn steps(&self) -> &[UnitId] {
        &self.steps
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    #[must_use]
    pub fn completion_ratio(&self) -> f32 {
        self.completion_ratio
    }

    #[must_use]
    pub fn success_rate(&self) -> f32 {
        self.success_rate
    }

    #[must_use]
    pub fn efficiency_score(&self) -> f32 {
        self.efficiency_score
    }

    #[must_use]
    pub fn execution_count(&self) -> u64 {
        self.execution_count
    }
}

/// Outcome of one [`CogfluenceStore::execute_workflow`] call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub workflow: WorkflowId,
    pub steps_executed: usize,
    pub steps_skipped: usize,
    pub execution_count: u64,
    pub success_rate: f32,
}

/// Counters of a [`CogfluenceStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CogfluenceStats {
    pub units: usize,
    pub unit_capacity: usize,
    pub workflows: usize,
    pub workflow_capacity: usize,
    pub total_inferences: u64,
    pub successful_workflows: u64,
    pub global_activation: f32,
    pub coherence: f32,
    pub by_type: Vec<(UnitType, usize)>,
}

// =============================================================================
// STORE
// =============================================================================

#[derive(Debug, Clone)]
pub struct CogfluenceStore {
    units: Vec<KnowledgeUnit>,
    workflows: Vec<Workflow>,
    next_id: u64,
    max_units: usize,
    max_workflows: usize,
    global_activation: f32,
    embedding_dim: usize,
    clock: u64,
    total_inferences: u64,
    successful_workflows: u64,
    coherence: f32,
}

impl Default for CogfluenceStore {
    fn default() -> Self {
        Self::new(&CogfluenceConfig::default())
    }
}

impl CogfluenceStore {
    #[must_use]
    pub fn new(config: &CogfluenceConfig) -> Self {
        Self {
            units: Vec::new(),
            workflows: Vec::new(),
            next_id: 1,
            max_units: config.max_units,
            max_workflows: config.max_workflows,
            global_activation: clamp_unit(config.global_activation, 0.0, 1.0),
            embedding_dim: config.embedding_dim,
            clock: 0,
            total_inferences: 0,
            successful_workflows: 0,
            coherence: 0.0,
        }
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    #[must_use]
    pub fn global_activation(&self) -> f32 {
        self.global_activation
    }

    /// Logical time, advanced by every activation update.
    #[must_use]
    pub fn clock(&self) -> u64 {
        self.clock
    }

    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    #[must_use]
    pub fn workflow_count(&self) -> usize {
        self.workflows.len()
    }

    pub fn units(&self) -> impl Iterator<Item = &KnowledgeUnit> {
        self.units.iter()
    }

    pub fn workflows(&self) -> impl Iterator<Item = &Workflow> {
        self.workflows.iter()
    }

    fn unit_slot(&self, id: UnitId) -> Option<usize> {
        self.units.binary_search_by_key(&id, |unit| unit.id).ok()
    }

    fn workflow_slot(&self, id: WorkflowId) -> Option<usize> {
        self.workflows.binary_search_by_key(&id, |wf| wf.id).ok()
    }

    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&KnowledgeUnit> {
        self.unit_slot(id).map(|slot| &self.units[slot])
    }

    #[must_use]
    pub fn workflow(&self, id: WorkflowId) -> Option<&Workflow> {
        self.workflow_slot(id).map(|slot| &self.workflows[slot])
    }

    // -------------------------------------------------------------------------
    // Units
    // -------------------------------------------------------------------------

    /// Add a unit. Without an embedding the unit gets a zero vector.
    pub fn add_unit(
        &mut self,
        name: &str,
        unit_type: UnitType,
        embedding: Option<Tensor>,
    ) -> Result<UnitId, CogError> {
        if self.units.len() >= self.max_units {
            return Err(CogError::CapacityExceeded {
                kind: CapacityKind::Units,
                limit: self.max_units,
            });
        }
        let embedding = embedding.unwrap_or_else(|| Tensor::zeros(self.embedding_dim));
        let id = UnitId(self.next_id());
        self.units.push(KnowledgeUnit {
            id,
            name: bounded_name(name, MAX_UNIT_NAME),
            unit_type,
            encoding: embedding.clone(),
            embedding,
            atom: None,
            truth_strength: UNIT_TRUTH_STRENGTH,
            truth_confidence: UNIT_TRUTH_CONFIDENCE,
            activation: self.global_activation,
            attention: INITIAL_UNIT_ATTENTION,
            related: Vec::new(),
            created_at: self.clock,
            last_modified: self.clock,
        });
        tracing::debug!(%id, %unit_type, "knowledge unit added");
        Ok(id)
    }

    /// Add a unit whose embedding is the tree encoding summary of
    /// `expression`, zero padded to the store's embedding width.
    pub fn add_tree_unit(
        &mut self,
        name: &str,
        unit_type: UnitType,
        expression: &str,
        kernel: &mut CognitiveKernel,
    ) -> Result<UnitId, CogError> {
        let summary = kernel.encode(expression)?;
        let embedding = Tensor::from_vec(summary.to_vec()).resized(self.embedding_dim.max(4));
        self.add_unit(name, unit_type, Some(embedding))
    }

    /// Relate two distinct units in both directions. Repeated calls leave
    /// a single relation.
    pub fn add_relation(&mut self, a: UnitId, b: UnitId) -> Result<(), CogError> {
        if a == b {
            return Err(CogError::SelfRelation(a));
        }
        let slot_a = self.unit_slot(a).ok_or(CogError::UnitNotFound(a))?;
        let slot_b = self.unit_slot(b).ok_or(CogError::UnitNotFound(b))?;

        if !self.units[slot_a].related.contains(&b) {
            self.units[slot_a].related.push(b);
        }
        if !self.units[slot_b].related.contains(&a) {
            self.units[slot_b].related.push(a);
        }
        tracing::trace!(%a, %b, "relation added");
        Ok(())
    }

    /// Record the atom a unit was transduced into.
    pub fn map_atom(&mut self, unit: UnitId, atom: AtomId) -> Result<(), CogError> {
        let slot = self.unit_slot(unit).ok_or(CogError::UnitNotFound(unit))?;
        self.units[slot].atom = Some(atom);
        Ok(())
    }

    /// Similarity of two units, 0 when either is unknown.
    #[must_use]
    pub fn compute_similarity(&self, a: UnitId, b: UnitId) -> f32 {
        match (self.unit(a), self.unit(b)) {
            (Some(a), Some(b)) => a.similarity(b),
            _ => 0.0,
        }
    }

    /// Mean pairwise similarity over all units, stored as the store's
    /// coherence. 0 with fewer than two units.
    pub fn compute_coherence(&mut self) -> f32 {
        let mut total = 0.0_f32;
        let mut pairs = 0_usize;
        for (i, a) in self.units.iter().enumerate() {
            for b in &self.units[i + 1..] {
                total += a.similarity(b);
                pairs += 1;
            }
        }
        self.coherence = if pairs == 0 { 0.0 } else { total / pairs as f32 };
        self.coherence
    }

    /// Last value computed by [`Self::compute_coherence`].
    #[must_use]
    pub fn coherence(&self) -> f32 {
        self.coherence
    }

    /// Decay every activation, boost related units, then fold activation
    /// into attention with an 80/20 moving average.
    pub fn update_activations(&mut self) {
        for unit in &mut self.units {
            let mut activation = unit.activation * ACTIVATION_DECAY;
            if !unit.related.is_empty() {
                activation *= RELATION_BOOST;
            }
            unit.activation = clamp_unit(activation, 0.0, 1.0);
            let blended = unit.activation * ATTENTION_EMA_WEIGHT
                + unit.attention * (1.0 - ATTENTION_EMA_WEIGHT);
            unit.attention = clamp_unit(blended, 0.0, 1.0);
        }
        self.clock += 1;
    }

    // -------------------------------------------------------------------------
    // Workflows
    // -------------------------------------------------------------------------

    pub fn create_workflow(&mut self, name: &str) -> Result<WorkflowId, CogError> {
        if self.workflows.len() >= self.max_workflows {
            return Err(CogError::CapacityExceeded {
                kind: CapacityKind::Workflows,
                limit: self.max_workflows,
            });
        }
        let id = WorkflowId(self.next_id());
        self.workflows.push(Workflow {
            id,
            name: bounded_name(name, MAX_UNIT_NAME),
            steps: Vec::new(),
            active: false,
            current_step: 0,
            completion_ratio: 0.0,
            success_rate: 0.0,
            efficiency_score: 0.0,
            execution_count: 0,
        });
        tracing::debug!(%id, "workflow created");
        Ok(id)
    }

    /// Append a step. The unit must exist.
    pub fn add_workflow_step(
        &mut self,
        workflow: WorkflowId,
        unit: UnitId,
    ) -> Result<(), CogError> {
        let slot = self
            .workflow_slot(workflow)
            .ok_or(CogError::WorkflowNotFound(workflow))?;
        if self.unit_slot(unit).is_none() {
            return Err(CogError::UnitNotFound(unit));
        }
        self.workflows[slot].steps.push(unit);
        Ok(())
    }

    /// Walk the steps left to right, raising each unit's activation by 0.1
    /// and attention by 0.05 (both capped at 1). Steps whose unit does not
    /// resolve are skipped.
    pub fn execute_workflow(&mut self, workflow: WorkflowId) -> Result<WorkflowRun, CogError> {
        let slot = self
            .workflow_slot(workflow)
            .ok_or(CogError::WorkflowNotFound(workflow))?;
        if self.workflows[slot].steps.is_empty() {
            return Err(CogError::EmptyWorkflow(workflow));
        }

        let steps = self.workflows[slot].steps.clone();
        let step_count = steps.len();
        self.workflows[slot].active = true;

        let mut executed = 0;
        for (step, unit_id) in steps.into_iter().enumerate() {
            let wf = &mut self.workflows[slot];
            wf.current_step = step;
            wf.completion_ratio = step as f32 / step_count as f32;

            if let Some(unit_slot) = self.unit_slot(unit_id) {
                let unit = &mut self.units[unit_slot];
                unit.activation = (unit.activation + STEP_ACTIVATION_BOOST).min(1.0);
                unit.attention = (unit.attention + STEP_ATTENTION_BOOST).min(1.0);
                unit.last_modified = self.clock;
                executed += 1;
            } else {
                tracing::trace!(%workflow, %unit_id, "workflow step skipped");
            }
            self.total_inferences += 1;
        }

        let wf = &mut self.workflows[slot];
        wf.completion_ratio = 1.0;
        wf.active = false;
        wf.execution_count += 1;
        let n = wf.execution_count as f32;
        wf.success_rate = clamp_unit((n - 1.0) / n * wf.success_rate + 1.0 / n, 0.0, 1.0);
        wf.efficiency_score = (wf.efficiency_score + 0.1).min(1.0);
        let run = WorkflowRun {
            workflow,
            steps_executed: executed,
            steps_skipped: step_count - executed,
            execution_count: wf.execution_count,
            success_rate: wf.success_rate,
        };
        self.successful_workflows += 1;

        tracing::debug!(%workflow, steps = step_count, executed, "workflow executed");
        Ok(run)
    }

    #[must_use]
    pub fn stats(&self) -> CogfluenceStats {
        const TYPES: [UnitType; 5] = [
            UnitType::Concept,
            UnitType::Relation,
            UnitType::Workflow,
            UnitType::Rule,
            UnitType::Pattern,
        ];
        CogfluenceStats {
            units: self.units.len(),
            unit_capacity: self.max_units,
            workflows: self.workflows.len(),
            workflow_capacity: self.max_workflows,
            total_inferences: self.total_inferences,
            successful_workflows: self.successful_workflows,
            global_activation: self.global_activation,
            coherence: self.coherence,
            by_type: TYPES
                .iter()
                .map(|t| (*t, self.units.iter().filter(|u| u.unit_type == *t).count()))
                .collect(),
        }
    }

    // -------------------------------------------------------------------------
    // Snapshot support
    // -------------------------------------------------------------------------

    pub(crate) fn to_record(&self) -> CogfluenceRecord {
        CogfluenceRecord {
            units: self.units.clone(),
            workflows: self.workflows.clone(),
            next_id: self.next_id,
            max_units: self.max_units,
            max_workflows: self.max_workflows,
            global_activation: self.global_activation,
            embedding_dim: self.embedding_dim,
            clock: self.clock,
            total_inferences: self.total_inferences,
            successful_workflows: self.successful_workflows,
            coherence: self.coherence,
        }
    }

    /// Rebuild from a decoded record, checking id ordering and every
    /// relation and step reference.
    pub(crate) fn from_record(record: CogfluenceRecord) -> Result<Self, CogError> {
        let invalid = |msg: String| Err(CogError::DeserializationError(msg));
        if record.units.len() > record.max_units || record.workflows.len() > record.max_workflows {
            return invalid("cogfluence record exceeds its capacity".to_string());
        }
        let unit_ids: Vec<u64> = record.units.iter().map(|u| u.id.0).collect();
        let workflow_ids: Vec<u64> = record.workflows.iter().map(|w| w.id.0).collect();
        for ids in [&unit_ids, &workflow_ids] {
            if ids.windows(2).any(|w| w[0] >= w[1])
                || ids.iter().any(|id| *id == 0 || *id >= record.next_id)
            {
                return invalid("cogfluence ids out of order or beyond the counter".to_string());
            }
        }
        if unit_ids.iter().any(|id| workflow_ids.binary_search(id).is_ok()) {
            return invalid("unit and workflow ids collide".to_string());
        }

        let store = Self {
            units: record.units,
            workflows: record.workflows,
            next_id: record.next_id,
            max_units: record.max_units,
            max_workflows: record.max_workflows,
            global_activation: record.global_activation,
            embedding_dim: record.embedding_dim,
            clock: record.clock,
            total_inferences: record.total_inferences,
            successful_workflows: record.successful_workflows,
            coherence: record.coherence,
        };
        if !in_range(store.global_activation, 0.0, 1.0) {
            return invalid("global activation out of range".to_string());
        }
        for unit in &store.units {
            if unit.related.iter().any(|r| *r == unit.id || store.unit(*r).is_none()) {
                return invalid(format!("unit {} has an invalid relation", unit.id));
            }
            let values = [
                unit.truth_strength,
                unit.truth_confidence,
                unit.activation,
                unit.attention,
            ];
            if !values.iter().all(|v| in_range(*v, 0.0, 1.0)) {
                return invalid(format!("unit {} carries out-of-range values", unit.id));
            }
        }
        for wf in &store.workflows {
            if wf.steps.iter().any(|s| store.unit(*s).is_none()) {
                return invalid(format!("workflow {} steps through an unknown unit", wf.id));
            }
            let scores = [wf.completion_ratio, wf.success_rate, wf.efficiency_score];
            if !scores.iter().all(|v| in_range(*v, 0.0, 1.0)) {
                return invalid(format!("workflow {} carries out-of-range scores", wf.id));
            }
        }
        Ok(store)
    }
}

/// Serialized form of a [`CogfluenceStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct CogfluenceRecord {
    pub(crate) units: Vec<KnowledgeUnit>,
    pub(crate) workflows: Vec<Workflow>,
    next_id: u64,
    max_units: usize,
    max_workflows: usize,
    global_activation: f32,
    embedding_dim: usize,
    clock: u64,
    total_inferences: u64,
    successful_workflows: u64,
    coherence: f32,
}

// =============================================================================
// TESTS
// =============================================================================
