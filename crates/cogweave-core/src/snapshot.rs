//! # Snapshot Format
//!
//! Binary serialization of a [`Pipeline`]'s stores.
//!
//! Format: 24-byte little-endian header + postcard payload.
//! - 4 bytes: magic ("CWVS")
//! - 4 bytes: version
//! - 4 bytes: knowledge unit count
//! - 4 bytes: workflow count
//! - 4 bytes: tensor count (one per atom record)
//! - 4 bytes: FNV-1a checksum of the payload
//!
//! The kernel is not persisted; it is rebuilt empty from its config.
//! File I/O lives in the app layer.
//!
//! Decoding checks the size bound, header, checksum and counts before the
//! payload is parsed, then checks every cross-reference before a store is
//! rebuilt.

use crate::atomspace::{AtomSpace, AtomSpaceRecord};
use crate::cogfluence::{CogfluenceRecord, CogfluenceStore};
use crate::config::KernelConfig;
use crate::kernel::CognitiveKernel;
use crate::pipeline::Pipeline;
use crate::primitives::{MAX_SNAPSHOT_SIZE, SNAPSHOT_MAGIC, SNAPSHOT_VERSION};
use crate::CogError;
use serde::{Deserialize, Serialize};

/// Size of the fixed header.
pub const HEADER_SIZE: usize = 24;

// =============================================================================
// HEADER
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
    pub unit_count: u32,
    pub workflow_count: u32,
    pub tensor_count: u32,
    pub checksum: u32,
}

impl SnapshotHeader {
    pub fn validate(&self) -> Result<(), CogError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(CogError::DeserializationError(
                "Invalid magic bytes".to_string(),
            ));
        }
        if self.version != SNAPSHOT_VERSION {
            return Err(CogError::DeserializationError(format!(
                "Unsupported version: {} (expected {})",
                self.version, SNAPSHOT_VERSION
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        let fields = [
            self.magic,
            self.version,
            self.unit_count,
            self.workflow_count,
            self.tensor_count,
            self.checksum,
        ];
        for (chunk, field) in bytes.chunks_exact_mut(4).zip(fields) {
            chunk.copy_from_slice(&field.to_le_bytes());
        }
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CogError> {
        let header = bytes.get(..HEADER_SIZE).ok_or_else(|| {
            CogError::DeserializationError("Header too short".to_string())
        })?;
        let mut fields = [0u32; 6];
        for (field, chunk) in fields.iter_mut().zip(header.chunks_exact(4)) {
            let mut word = [0u8; 4];
            word.copy_from_slice(chunk);
            *field = u32::from_le_bytes(word);
        }
        let [magic, version, unit_count, workflow_count, tensor_count, checksum] = fields;
        Ok(Self {
            magic,
            version,
            unit_count,
            workflow_count,
            tensor_count,
            checksum,
        })
    }
}

/// 32-bit FNV-1a.
#[must_use]
pub fn fnv1a32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0x811c_9dc5_u32, |hash, byte| {
        (hash ^ u32::from(*byte)).wrapping_mul(0x0100_0193)
    })
}

// =============================================================================
// PAYLOAD
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotPayload {
    atomspace: AtomSpaceRecord,
    cogfluence: CogfluenceRecord,
    total_transductions: u64,
    successful_transductions: u64,
}

fn count_field(len: usize, what: &str) -> Result<u32, CogError> {
    u32::try_from(len)
        .map_err(|_| CogError::SerializationError(format!("{what} count {len} exceeds u32")))
}

/// Serialize a pipeline to bytes (header + payload).
pub fn pipeline_to_bytes(pipeline: &Pipeline) -> Result<Vec<u8>, CogError> {
    let (total_transductions, successful_transductions) = pipeline.transductions();
    let payload = SnapshotPayload {
        atomspace: pipeline.atomspace().to_record(),
        cogfluence: pipeline.cogfluence().to_record(),
        total_transductions,
        successful_transductions,
    };
    let body =
        postcard::to_stdvec(&payload).map_err(|e| CogError::SerializationError(e.to_string()))?;

    let header = SnapshotHeader {
        magic: SNAPSHOT_MAGIC,
        version: SNAPSHOT_VERSION,
        unit_count: count_field(payload.cogfluence.units.len(), "unit")?,
        workflow_count: count_field(payload.cogfluence.workflows.len(), "workflow")?,
        tensor_count: count_field(payload.atomspace.atoms.len(), "tensor")?,
        checksum: fnv1a32(&body),
    };

    let mut bytes = Vec::with_capacity(HEADER_SIZE + body.len());
    bytes.extend_from_slice(&header.to_bytes());
    bytes.extend_from_slice(&body);
    tracing::debug!(bytes = bytes.len(), "snapshot encoded");
    Ok(bytes)
}

/// Rebuild a pipeline from bytes, with a fresh kernel built from `kernel`.
pub fn pipeline_from_bytes(bytes: &[u8], kernel: &KernelConfig) -> Result<Pipeline, CogError> {
    if bytes.len() > MAX_SNAPSHOT_SIZE {
        return Err(CogError::DeserializationError(format!(
            "Data size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_SNAPSHOT_SIZE
        )));
    }
    let header = SnapshotHeader::from_bytes(bytes)?;
    header.validate()?;

    let body = &bytes[HEADER_SIZE..];
    if fnv1a32(body) != header.checksum {
        return Err(CogError::DeserializationError(
            "Checksum mismatch".to_string(),
        ));
    }

    let payload: SnapshotPayload = postcard::from_bytes(body).map_err(|e| {
        CogError::DeserializationError(format!("Failed to deserialize snapshot: {e}"))
    })?;

    let counts = (
        payload.cogfluence.units.len(),
        payload.cogfluence.workflows.len(),
        payload.atomspace.atoms.len(),
    );
    if counts
        != (
            header.unit_count as usize,
            header.workflow_count as usize,
            header.tensor_count as usize,
        )
    {
        return Err(CogError::DeserializationError(
            "Header counts do not match payload".to_string(),
        ));
    }

    let atomspace = AtomSpace::from_record(payload.atomspace)?;
    let cogfluence = CogfluenceStore::from_record(payload.cogfluence)?;

    for unit in cogfluence.units() {
        if let Some(atom) = unit
            .atom()
            .filter(|atom| atom.0 == 0 || atom.0 > atomspace.len() as u64)
        {
            return Err(CogError::DeserializationError(format!(
                "unit {} maps to unknown atom {atom}",
                unit.id()
            )));
        }
    }
    // Deleted atoms keep their back-link, so check every record.
    if let Some(orphan) = (1..=atomspace.len() as u64)
        .filter_map(|id| atomspace.record_source_unit(crate::AtomId(id)))
        .find(|unit| cogfluence.unit(*unit).is_none())
    {
        return Err(CogError::DeserializationError(format!(
            "atom refers to unknown unit {orphan}"
        )));
    }

    tracing::debug!(
        units = header.unit_count,
        workflows = header.workflow_count,
        atoms = header.tensor_count,
        "snapshot decoded"
    );
    Ok(Pipeline::from_parts(
        atomspace,
        cogfluence,
        CognitiveKernel::from_config(kernel),
        (payload.total_transductions, payload.successful_transductions),
    ))
}

/// BLAKE3 digest of snapshot bytes, hex encoded.
#[cfg(feature = "crypto-hash")]
#[must_use]
pub fn snapshot_hash(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AtomType, UnitType};

    fn sample() -> Pipeline {
        let mut pipeline = Pipeline::default();
        pipeline.full_pipeline("alpha").expect("alpha");
        pipeline.full_pipeline("beta").expect("beta");
        let store = pipeline.cogfluence_mut();
        let a = store.add_unit("a", UnitType::Rule, None).expect("a");
        let wf = store.create_workflow("wf").expect("wf");
        store.add_workflow_step(wf, a).expect("step");
        let space = pipeline.atomspace_mut();
        let x = space.add_node(AtomType::Concept, "x").expect("x");
        let y = space.add_node(AtomType::Concept, "y").expect("y");
        space.add_link(AtomType::Inheritance, &[x, y]).expect("link");
        space.delete(x).expect("delete");
        pipeline
    }

    #[test]
    fn header_roundtrip() {
        let header = SnapshotHeader {
            magic: SNAPSHOT_MAGIC,
            version: SNAPSHOT_VERSION,
            unit_count: 3,
            workflow_count: 1,
            tensor_count: 9,
            checksum: 0xdead_beef,
        };
        let bytes = header.to_bytes();
        assert_eq!(&bytes[..4], b"CWVS");
        assert_eq!(SnapshotHeader::from_bytes(&bytes).expect("parse"), header);
    }

    #[test]
    fn fnv_reference_values() {
        assert_eq!(fnv1a32(b""), 0x811c_9dc5);
        assert_eq!(fnv1a32(b"a"), 0xe40c_292c);
    }

    #[test]
    fn pipeline_roundtrip_bit_exact() {
        let pipeline = sample();
        let bytes = pipeline_to_bytes(&pipeline).expect("encode");
        assert_eq!(&bytes[..4], b"CWVS");
        let header = SnapshotHeader::from_bytes(&bytes).expect("header");
        assert_eq!(header.unit_count, 3);
        assert_eq!(header.workflow_count, 1);
        assert_eq!(header.tensor_count, 5);

        let restored = pipeline_from_bytes(&bytes, &KernelConfig::default()).expect("decode");
        let again = pipeline_to_bytes(&restored).expect("re-encode");
        assert_eq!(bytes, again);
        assert_eq!(restored.transductions(), pipeline.transductions());
        assert_eq!(restored.atomspace().live_count(), 4);
    }

    #[test]
    fn corrupted_data_is_rejected() {
        let bytes = pipeline_to_bytes(&sample()).expect("encode");
        let config = KernelConfig::default();

        assert!(pipeline_from_bytes(&bytes[..10], &config).is_err());

        let mut bad_magic = bytes.clone();
        bad_magic[0] = b'X';
        assert!(pipeline_from_bytes(&bad_magic, &config).is_err());

        let mut bad_version = bytes.clone();
        bad_version[4] = 9;
        assert!(pipeline_from_bytes(&bad_version, &config).is_err());

        let mut bad_payload = bytes.clone();
        let last = bad_payload.len() - 1;
        bad_payload[last] ^= 0xff;
        assert!(matches!(
            pipeline_from_bytes(&bad_payload, &config),
            Err(CogError::DeserializationError(msg)) if msg.contains("Checksum")
        ));

        let mut bad_count = bytes;
        bad_count[8] = 99;
        assert!(pipeline_from_bytes(&bad_count, &config).is_err());
    }

    #[test]
    fn empty_pipeline_roundtrip() {
        let bytes = pipeline_to_bytes(&Pipeline::default()).expect("encode");
        let restored = pipeline_from_bytes(&bytes, &KernelConfig::default()).expect("decode");
        assert!(restored.atomspace().is_empty());
        assert_eq!(restored.cogfluence().unit_count(), 0);
    }

    #[cfg(feature = "crypto-hash")]
    #[test]
    fn hash_is_stable_hex() {
        let bytes = pipeline_to_bytes(&sample()).expect("encode");
        let h1 = snapshot_hash(&bytes);
        assert_eq!(h1.len(), 64);
        assert_eq!(h1, snapshot_hash(&bytes));
    }
}
