//! # Core Type Definitions
//!
//! This module contains the shared vocabulary of the cogweave substrate:
//! - Store identifiers (`AtomId`, `UnitId`, `WorkflowId`)
//! - Closed type tags (`AtomType`, `UnitType`)
//! - Error types (`CogError`)
//!
//! ## Identity Guarantees
//!
//! - Ids are store-scoped, start at 1 and are never recycled.
//! - Id 0 never names an entity; stale ids resolve to "not found".

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Identifier of an atom inside one [`crate::AtomSpace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AtomId(pub u64);

/// Identifier of a knowledge unit inside one [`crate::CogfluenceStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u64);

/// Identifier of a workflow inside one [`crate::CogfluenceStore`].
///
/// Workflows draw from the same counter as units, so the two never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WorkflowId(pub u64);

impl fmt::Display for AtomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// TYPE TAGS
// =============================================================================

/// Atom type tag. Nodes carry a name; links carry outgoing atoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtomType {
    Concept,
    Predicate,
    Variable,
    Inheritance,
    Evaluation,
    Implication,
    Similarity,
    Member,
}

impl AtomType {
    /// All atom types in tag order.
    pub const ALL: [AtomType; 8] = [
        AtomType::Concept,
        AtomType::Predicate,
        AtomType::Variable,
        AtomType::Inheritance,
        AtomType::Evaluation,
        AtomType::Implication,
        AtomType::Similarity,
        AtomType::Member,
    ];

    /// Whether this tag names a link type.
    #[must_use]
    pub fn is_link(self) -> bool {
        !matches!(
            self,
            AtomType::Concept | AtomType::Predicate | AtomType::Variable
        )
    }

    /// Stable lowercase name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            AtomType::Concept => "concept",
            AtomType::Predicate => "predicate",
            AtomType::Variable => "variable",
            AtomType::Inheritance => "inheritance",
            AtomType::Evaluation => "evaluation",
            AtomType::Implication => "implication",
            AtomType::Similarity => "similarity",
            AtomType::Member => "member",
        }
    }
}

impl fmt::Display for AtomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Knowledge-unit type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitType {
    Concept,
    Relation,
    Workflow,
    Rule,
    Pattern,
}

impl UnitType {
    /// Stable lowercase name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            UnitType::Concept => "concept",
            UnitType::Relation => "relation",
            UnitType::Workflow => "workflow",
            UnitType::Rule => "rule",
            UnitType::Pattern => "pattern",
        }
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unit type → atom type, as used by the Cogfluence → AtomSpace transduction.
impl From<UnitType> for AtomType {
    fn from(unit_type: UnitType) -> Self {
        match unit_type {
            UnitType::Concept => AtomType::Concept,
            UnitType::Relation => AtomType::Inheritance,
            UnitType::Rule => AtomType::Implication,
            UnitType::Workflow | UnitType::Pattern => AtomType::Concept,
        }
    }
}

// =============================================================================
// NAMES
// =============================================================================

/// Truncate `name` to at most `max_bytes`, never splitting a character.
pub(crate) fn bounded_name(name: &str, max_bytes: usize) -> String {
    if name.len() <= max_bytes {
        return name.to_string();
    }
    let mut end = max_bytes;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    name[..end].to_string()
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Which bounded collection ran out of room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityKind {
    Atoms,
    Units,
    Workflows,
}

impl fmt::Display for CapacityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapacityKind::Atoms => f.write_str("atoms"),
            CapacityKind::Units => f.write_str("knowledge units"),
            CapacityKind::Workflows => f.write_str("workflows"),
        }
    }
}

/// Errors that can occur in the cogweave core.
///
/// Every fallible constructive operation validates before it mutates, so an
/// `Err` always means "nothing happened".
#[derive(Debug, Error)]
pub enum CogError {
    /// The atom does not exist or has been deleted.
    #[error("Atom not found: {0}")]
    AtomNotFound(AtomId),

    /// The knowledge unit does not exist.
    #[error("Knowledge unit not found: {0}")]
    UnitNotFound(UnitId),

    /// The workflow does not exist.
    #[error("Workflow not found: {0}")]
    WorkflowNotFound(WorkflowId),

    /// No live atom carries the name.
    #[error("No atom named '{0}'")]
    AtomNameNotFound(String),

    /// A link was requested with no targets or with a dead target.
    #[error("Invalid link: {0}")]
    InvalidLink(String),

    /// A workflow without steps cannot run.
    #[error("Workflow {0} has no steps")]
    EmptyWorkflow(WorkflowId),

    /// A unit cannot relate to itself.
    #[error("Unit {0} cannot relate to itself")]
    SelfRelation(UnitId),

    /// A bounded store is full.
    #[error("Capacity exceeded: {kind} limit is {limit}")]
    CapacityExceeded { kind: CapacityKind, limit: usize },

    /// A prime index past the cached sieve was requested.
    #[error("Prime index {index} out of range (table holds {available})")]
    PrimeIndexOutOfRange { index: u64, available: usize },

    /// A tree expression's integer encoding does not fit in 64 bits.
    #[error("Tree encoding overflows u64")]
    EncodingOverflow,

    /// A numeric argument was rejected.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),

    /// A configuration file could not be used.
    #[error("Configuration error: {0}")]
    Config(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_type_maps_to_atom_type() {
        assert_eq!(AtomType::from(UnitType::Concept), AtomType::Concept);
        assert_eq!(AtomType::from(UnitType::Relation), AtomType::Inheritance);
        assert_eq!(AtomType::from(UnitType::Rule), AtomType::Implication);
        assert_eq!(AtomType::from(UnitType::Workflow), AtomType::Concept);
        assert_eq!(AtomType::from(UnitType::Pattern), AtomType::Concept);
    }

    #[test]
    fn link_tags() {
        assert!(!AtomType::Concept.is_link());
        assert!(!AtomType::Variable.is_link());
        assert!(AtomType::Inheritance.is_link());
        assert!(AtomType::Member.is_link());
    }

    #[test]
    fn bounded_name_respects_char_boundaries() {
        assert_eq!(bounded_name("short", 10), "short");
        assert_eq!(bounded_name("abcdef", 3), "abc");
        // "é" is two bytes; cutting at 2 would split it.
        assert_eq!(bounded_name("aé", 2), "a");
    }

    #[test]
    fn error_messages() {
        let err = CogError::CapacityExceeded {
            kind: CapacityKind::Atoms,
            limit: 4,
        };
        assert_eq!(err.to_string(), "Capacity exceeded: atoms limit is 4");
        assert_eq!(
            CogError::AtomNotFound(AtomId(7)).to_string(),
            "Atom not found: 7"
        );
    }
}
