//! # Configuration
//!
//! Tunable parameters for each store. Every struct is `serde(default)`, so a
//! config file only needs to name the values it changes; the defaults are
//! the constants in [`crate::primitives`].

use crate::attention::EcanParams;
use crate::primitives::{
    DEFAULT_CONFIDENCE, DEFAULT_STRENGTH, GLOBAL_ACTIVATION, KERNEL_BREADTH, KERNEL_DEPTH,
    KERNEL_MATULA_SLOTS, KERNEL_SYSTEMS, MAX_ATOMS, MAX_KERNEL_BREADTH, MAX_KERNEL_CELLS,
    MAX_KERNEL_DEPTH, MAX_KERNEL_MATULA_SLOTS, MAX_KERNEL_SYSTEMS, MAX_UNITS, MAX_WORKFLOWS,
    UNIT_EMBEDDING_DIM,
};
use crate::CogError;
use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CogweaveConfig {
    pub atomspace: AtomSpaceConfig,
    pub cogfluence: CogfluenceConfig,
    pub kernel: KernelConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtomSpaceConfig {
    pub max_atoms: usize,
    pub default_strength: f32,
    pub default_confidence: f32,
    pub ecan: EcanParams,
}

impl Default for AtomSpaceConfig {
    fn default() -> Self {
        Self {
            max_atoms: MAX_ATOMS,
            default_strength: DEFAULT_STRENGTH,
            default_confidence: DEFAULT_CONFIDENCE,
            ecan: EcanParams::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CogfluenceConfig {
    pub max_units: usize,
    pub max_workflows: usize,
    pub global_activation: f32,
    /// Width of the zero embedding given to units created without one.
    pub embedding_dim: usize,
}

impl Default for CogfluenceConfig {
    fn default() -> Self {
        Self {
            max_units: MAX_UNITS,
            max_workflows: MAX_WORKFLOWS,
            global_activation: GLOBAL_ACTIVATION,
            embedding_dim: UNIT_EMBEDDING_DIM,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    pub systems: usize,
    pub breadth: usize,
    pub depth: usize,
    pub matula_slots: usize,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            systems: KERNEL_SYSTEMS,
            breadth: KERNEL_BREADTH,
            depth: KERNEL_DEPTH,
            matula_slots: KERNEL_MATULA_SLOTS,
        }
    }
}

fn check_unit_interval(field: &str, value: f32) -> Result<(), CogError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(CogError::Config(format!("{field} must be within [0, 1], got {value}")))
    }
}

impl CogweaveConfig {
    /// Reject values outside their documented ranges.
    pub fn validate(&self) -> Result<(), CogError> {
        let atomspace = &self.atomspace;
        check_unit_interval("atomspace.default_strength", atomspace.default_strength)?;
        check_unit_interval("atomspace.default_confidence", atomspace.default_confidence)?;
        check_unit_interval("atomspace.ecan.decay_rate", atomspace.ecan.decay_rate)?;
        check_unit_interval("atomspace.ecan.transfer_rate", atomspace.ecan.transfer_rate)?;
        if !atomspace.ecan.sti_threshold.is_finite() {
            return Err(CogError::Config(
                "atomspace.ecan.sti_threshold must be finite".to_string(),
            ));
        }
        check_unit_interval(
            "cogfluence.global_activation",
            self.cogfluence.global_activation,
        )?;

        let kernel = &self.kernel;
        check_bound("kernel.systems", kernel.systems, MAX_KERNEL_SYSTEMS)?;
        check_bound("kernel.breadth", kernel.breadth, MAX_KERNEL_BREADTH)?;
        check_bound("kernel.depth", kernel.depth, MAX_KERNEL_DEPTH)?;
        let cells = kernel
            .systems
            .checked_mul(kernel.breadth)
            .and_then(|n| n.checked_mul(kernel.depth))
            .filter(|&n| n <= MAX_KERNEL_CELLS);
        if cells.is_none() {
            return Err(CogError::Config(format!(
                "kernel.systems * breadth * depth must not exceed {MAX_KERNEL_CELLS}"
            )));
        }
        if kernel.matula_slots > MAX_KERNEL_MATULA_SLOTS {
            return Err(CogError::Config(format!(
                "kernel.matula_slots must not exceed {MAX_KERNEL_MATULA_SLOTS}, got {}",
                kernel.matula_slots
            )));
        }
        Ok(())
    }
}

fn check_bound(field: &str, value: usize, max: usize) -> Result<(), CogError> {
    if (1..=max).contains(&value) {
        Ok(())
    } else {
        Err(CogError::Config(format!("{field} must be within [1, {max}], got {value}")))
    }
}
