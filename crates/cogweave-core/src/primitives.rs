//! # Innate Primitives
//!
//! Hardcoded constants for the cogweave CORE.
//!
//! Every store starts empty but with fixed numeric rules. These values are
//! the defaults behind [`crate::config`]; a config file may override the
//! tunable ones, never the format constants.

// =============================================================================
// ATOMSPACE
// =============================================================================

/// Default maximum number of atoms (live or tombstoned) in one AtomSpace.
pub const MAX_ATOMS: usize = 2048;

/// Maximum atom name length in bytes. Longer names are truncated.
pub const MAX_ATOM_NAME: usize = 255;

/// Width of the name-derived embedding given to every new atom.
pub const ATOM_EMBEDDING_DIM: usize = 128;

/// Default PLN strength for freshly created atoms.
pub const DEFAULT_STRENGTH: f32 = 0.8;

/// Default PLN confidence for freshly created atoms.
pub const DEFAULT_CONFIDENCE: f32 = 0.9;

/// Minimum strength-weighted Jaccard score before a similarity link is
/// materialized (strictly greater than).
pub const SIMILARITY_LINK_THRESHOLD: f32 = 0.1;

/// Upper bound on the confidence of an inferred similarity link.
pub const SIMILARITY_MAX_CONFIDENCE: f32 = 0.9;

// =============================================================================
// ECAN
// =============================================================================

/// Multiplicative decay applied to STI and LTI every attention tick.
pub const ATTENTION_DECAY_RATE: f32 = 0.95;

/// STI above this value feeds long-term importance.
pub const ATTENTION_THRESHOLD: f32 = 0.1;

/// Fraction of STI moved into LTI when above the threshold.
pub const STI_TO_LTI_RATE: f32 = 0.1;

// =============================================================================
// COGFLUENCE
// =============================================================================

/// Default maximum number of knowledge units.
pub const MAX_UNITS: usize = 1024;

/// Default maximum number of workflows.
pub const MAX_WORKFLOWS: usize = 64;

/// Maximum knowledge-unit / workflow name length in bytes.
pub const MAX_UNIT_NAME: usize = 127;

/// Width of the default (zero) unit embedding and of text embeddings.
pub const UNIT_EMBEDDING_DIM: usize = 64;

/// Initial activation of every new unit.
pub const GLOBAL_ACTIVATION: f32 = 0.5;

/// Initial attention value of every new unit.
pub const INITIAL_UNIT_ATTENTION: f32 = 0.5;

/// Default PLN strength mirrored on new units.
pub const UNIT_TRUTH_STRENGTH: f32 = 0.8;

/// Default PLN confidence mirrored on new units.
pub const UNIT_TRUTH_CONFIDENCE: f32 = 0.7;

/// Activation gained by a unit each time a workflow step touches it.
pub const STEP_ACTIVATION_BOOST: f32 = 0.1;

/// Attention gained by a unit each time a workflow step touches it.
pub const STEP_ATTENTION_BOOST: f32 = 0.05;

/// Periodic activation decay.
pub const ACTIVATION_DECAY: f32 = 0.95;

/// Periodic activation boost for units with at least one relation.
pub const RELATION_BOOST: f32 = 1.05;

/// Weight of activation in the attention moving average.
pub const ATTENTION_EMA_WEIGHT: f32 = 0.8;

// =============================================================================
// PRIME / MATULA ENCODER
// =============================================================================

/// Upper bound of the prime sieve.
pub const PRIME_SIEVE_LIMIT: u32 = 10_000;

/// Maximum number of primes kept by the sieve.
pub const MAX_PRIMES: usize = 1024;

/// Default number of system levels in the cognitive kernel.
pub const KERNEL_SYSTEMS: usize = 16;

/// Default breadth of the cognitive kernel.
pub const KERNEL_BREADTH: usize = 32;

/// Default depth of the cognitive kernel.
pub const KERNEL_DEPTH: usize = 32;

/// Number of matula values tracked by the matula→coordinate table.
pub const KERNEL_MATULA_SLOTS: usize = 1024;

/// Largest accepted number of kernel system levels.
pub const MAX_KERNEL_SYSTEMS: usize = 64;

/// Largest accepted kernel breadth.
pub const MAX_KERNEL_BREADTH: usize = 256;

/// Largest accepted kernel depth.
pub const MAX_KERNEL_DEPTH: usize = 256;

/// Largest accepted `systems × breadth × depth` (each cell holds two `f32`).
pub const MAX_KERNEL_CELLS: usize = MAX_KERNEL_SYSTEMS * MAX_KERNEL_BREADTH * MAX_KERNEL_DEPTH;

/// Largest accepted matula→coordinate table.
pub const MAX_KERNEL_MATULA_SLOTS: usize = 1 << 16;

/// Phase increment per unit of matula value.
pub const PHASE_STEP: f32 = 0.1;

/// Constant kernel contribution to the pipeline coherence metric.
pub const KERNEL_COHERENCE: f32 = 0.7;

// =============================================================================
// SNAPSHOT FORMAT
// =============================================================================

/// Snapshot magic, little-endian "CWVS".
pub const SNAPSHOT_MAGIC: u32 = u32::from_le_bytes(*b"CWVS");

/// Current snapshot format version.
///
/// Increment this when making breaking changes to the payload layout.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Maximum snapshot size accepted by the decoder (256 MiB).
pub const MAX_SNAPSHOT_SIZE: usize = 256 * 1024 * 1024;
