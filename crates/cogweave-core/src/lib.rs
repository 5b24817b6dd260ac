//! # cogweave-core
//!
//! The knowledge substrate for cogweave - THE LOGIC.
//!
//! Three representations of the same knowledge, and the mappings between
//! them:
//!
//! - **AtomSpace**: typed nodes and links with PLN truth values and ECAN
//!   attention values
//! - **Cogfluence**: named knowledge units with embeddings, relations and
//!   executable workflows
//! - **Tensors**: embeddings plus a Matula–Goebel prime encoding of rooted
//!   trees, written into a cognitive kernel tensor
//!
//! ## Architectural Constraints
//!
//! - Single-threaded and synchronous; every call returns immediately
//! - Entities are addressed by id handles, never by retained references
//! - Ids are store-scoped, start at 1 and are never recycled
//! - Failed operations mutate nothing
//! - No async, no network dependencies (pure Rust)

// =============================================================================
// MODULES
// =============================================================================

pub mod atomspace;
pub mod attention;
pub mod cogfluence;
pub mod config;
pub mod encoder;
pub mod kernel;
pub mod pipeline;
pub mod primitives;
pub mod snapshot;
pub mod tensor;
pub mod truth;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{AtomId, AtomType, CapacityKind, CogError, UnitId, UnitType, WorkflowId};

// =============================================================================
// RE-EXPORTS: Values
// =============================================================================

pub use attention::{AttentionAllocator, AttentionValue, CognitiveFunction, EcanParams};
pub use tensor::{Norm, Tensor};
pub use truth::{PlnRule, TruthValue, combine_confidence};

// =============================================================================
// RE-EXPORTS: Encoder & Kernel
// =============================================================================

pub use encoder::{
    MatulaEncoding, Phase, PrimeTable, TreeEncoder, compose, encode_tree, factorize, is_prime,
    nth_prime, prime_offset, quantum_phase, system_level,
};
pub use kernel::{CognitiveKernel, KernelCoordinate, TreeState};

// =============================================================================
// RE-EXPORTS: Stores
// =============================================================================

pub use atomspace::{Atom, AtomSpace, AtomSpaceStats};
pub use cogfluence::{CogfluenceStats, CogfluenceStore, KnowledgeUnit, Workflow, WorkflowRun};
pub use config::{AtomSpaceConfig, CogfluenceConfig, CogweaveConfig, KernelConfig};
pub use pipeline::{
    Pipeline, PipelineReceipt, PipelineStats, atomspace_to_tensor, cogfluence_to_atomspace,
    tensor_to_cogfluence, text_embedding,
};

// =============================================================================
// RE-EXPORTS: Snapshot
// =============================================================================

#[cfg(feature = "crypto-hash")]
pub use snapshot::snapshot_hash;
pub use snapshot::{SnapshotHeader, fnv1a32, pipeline_from_bytes, pipeline_to_bytes};
