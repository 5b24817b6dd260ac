//! # Cognitive Kernel Tensor
//!
//! A dense `[systems × breadth × depth × 2]` store of complex phases written
//! at the coordinates produced by the tree encoder, plus a matula→coordinate
//! table for small values.
//!
//! One kernel may back several knowledge stores; every method except
//! [`CognitiveKernel::encode`] is read-only.

use crate::config::KernelConfig;
use crate::encoder::{MatulaEncoding, Phase, TreeEncoder};
use crate::primitives::{
    KERNEL_BREADTH, KERNEL_DEPTH, KERNEL_MATULA_SLOTS, KERNEL_SYSTEMS, MAX_KERNEL_BREADTH,
    MAX_KERNEL_DEPTH, MAX_KERNEL_MATULA_SLOTS, MAX_KERNEL_SYSTEMS, PHASE_STEP,
};
use crate::{CogError, Tensor};
use serde::{Deserialize, Serialize};

/// Position of an encoding inside the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelCoordinate {
    pub level: u32,
    pub breadth: u32,
    pub depth: u32,
}

/// One weighted tree state for [`CognitiveKernel::superposition`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeState {
    pub encoding: MatulaEncoding,
    pub amplitude: f32,
}

/// The kernel tensor.
#[derive(Debug, Clone)]
pub struct CognitiveKernel {
    systems: usize,
    breadth: usize,
    depth: usize,
    encoder: TreeEncoder,
    data: Vec<f32>,
    matula_table: Vec<Option<KernelCoordinate>>,
}

impl Default for CognitiveKernel {
    fn default() -> Self {
        Self::new(KERNEL_SYSTEMS, KERNEL_BREADTH, KERNEL_DEPTH)
    }
}

impl CognitiveKernel {
    /// Zeroed kernel with the given bounds.
    ///
    /// Each bound is clamped to `1..=MAX_KERNEL_*`; use
    /// [`crate::CogweaveConfig::validate`] to reject out-of-range configs instead.
    #[must_use]
    pub fn new(systems: usize, breadth: usize, depth: usize) -> Self {
        Self::with_slots(systems, breadth, depth, KERNEL_MATULA_SLOTS)
    }

    #[must_use]
    pub fn from_config(config: &KernelConfig) -> Self {
        Self::with_slots(
            config.systems,
            config.breadth,
            config.depth,
            config.matula_slots,
        )
    }

    fn with_slots(systems: usize, breadth: usize, depth: usize, slots: usize) -> Self {
        let systems = systems.clamp(1, MAX_KERNEL_SYSTEMS);
        let breadth = breadth.clamp(1, MAX_KERNEL_BREADTH);
        let depth = depth.clamp(1, MAX_KERNEL_DEPTH);
        let slots = slots.min(MAX_KERNEL_MATULA_SLOTS);
        let encoder = TreeEncoder::new(
            u32::try_from(breadth).unwrap_or(u32::MAX),
            u32::try_from(depth).unwrap_or(u32::MAX),
        );
        tracing::debug!(systems, breadth, depth, "cognitive kernel initialized");
        Self {
            systems,
            breadth,
            depth,
            encoder,
            data: vec![0.0; systems * breadth * depth * 2],
            matula_table: vec![None; slots],
        }
    }

    /// `(systems, breadth, depth)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.systems, self.breadth, self.depth)
    }

    #[must_use]
    pub fn encoder(&self) -> &TreeEncoder {
        &self.encoder
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    fn index(&self, level: usize, breadth: usize, depth: usize) -> Option<usize> {
        (level < self.systems && breadth < self.breadth && depth < self.depth).then(|| {
            level * self.breadth * self.depth * 2 + breadth * self.depth * 2 + depth * 2
        })
    }

    /// Encode `expression`, write its phase into the kernel and return the
    /// full encoding.
    ///
    /// Levels past the kernel's system bound are encoded but not stored.
    pub fn write(&mut self, expression: &str) -> Result<MatulaEncoding, CogError> {
        let encoding = self.encoder.encode(expression)?;
        let coordinate = KernelCoordinate {
            level: encoding.system_level,
            breadth: encoding.breadth_index,
            depth: encoding.depth_index,
        };

        if let Some(idx) = self.index(
            coordinate.level as usize,
            coordinate.breadth as usize,
            coordinate.depth as usize,
        ) {
            self.data[idx] = encoding.phase.re;
            self.data[idx + 1] = encoding.phase.im;
        } else {
            tracing::trace!(level = coordinate.level, "encoding outside kernel bounds");
        }

        if let Some(slot) = usize::try_from(encoding.matula_value)
            .ok()
            .and_then(|v| self.matula_table.get_mut(v))
        {
            *slot = Some(coordinate);
        }

        Ok(encoding)
    }

    /// [`Self::write`] returning `[level, breadth, depth, value]`.
    pub fn encode(&mut self, expression: &str) -> Result<[f32; 4], CogError> {
        self.write(expression).map(|enc| enc.summary())
    }

    /// Phase stored at a coordinate, `None` when out of bounds.
    #[must_use]
    pub fn phase_at(&self, level: usize, breadth: usize, depth: usize) -> Option<Phase> {
        self.index(level, breadth, depth).map(|idx| Phase {
            re: self.data[idx],
            im: self.data[idx + 1],
        })
    }

    /// Coordinate last recorded for a small matula value.
    #[must_use]
    pub fn coordinates_of(&self, matula_value: u64) -> Option<KernelCoordinate> {
        usize::try_from(matula_value)
            .ok()
            .and_then(|v| self.matula_table.get(v).copied().flatten())
    }

    /// Row-major `breadth × depth` pattern of `cos(b · p(d+1) · 0.1)`.
    pub fn phase_interference(&self, breadth: usize, depth: usize) -> Result<Tensor, CogError> {
        let primes = self.encoder.primes();
        let mut data = Vec::with_capacity(breadth * depth);
        for b in 0..breadth {
            for d in 0..depth {
                let prime = primes.nth_prime(d as u64 + 1)?;
                data.push((b as f32 * prime as f32 * PHASE_STEP).cos());
            }
        }
        Ok(Tensor::from_vec(data))
    }

    /// Rows of `[value, re, im, amplitude / ‖amplitudes‖₂]`.
    ///
    /// All-zero amplitudes normalize to 0 rather than NaN.
    #[must_use]
    pub fn superposition(&self, states: &[TreeState]) -> Vec<[f32; 4]> {
        let norm = states
            .iter()
            .map(|s| s.amplitude * s.amplitude)
            .sum::<f32>()
            .sqrt();
        states
            .iter()
            .map(|s| {
                let amplitude = if norm > 0.0 { s.amplitude / norm } else { 0.0 };
                [
                    s.encoding.matula_value as f32,
                    s.encoding.phase.re,
                    s.encoding.phase.im,
                    amplitude,
                ]
            })
            .collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_writes_phase_at_coordinate() {
        let mut kernel = CognitiveKernel::default();
        let summary = kernel.encode("(())").expect("encode");
        assert_eq!(summary, [2.0, 3.0, 0.0, 3.0]);

        let phase = kernel.phase_at(2, 3, 0).expect("in bounds");
        let expected = crate::encoder::quantum_phase(3, 0.0);
        assert_eq!(phase, expected);
        assert_eq!(
            kernel.coordinates_of(3),
            Some(KernelCoordinate {
                level: 2,
                breadth: 3,
                depth: 0
            })
        );
    }

    #[test]
    fn untouched_cells_are_zero() {
        let kernel = CognitiveKernel::new(4, 4, 4);
        assert_eq!(kernel.as_slice().len(), 4 * 4 * 4 * 2);
        assert_eq!(kernel.phase_at(1, 1, 1), Some(Phase { re: 0.0, im: 0.0 }));
        assert_eq!(kernel.phase_at(4, 0, 0), None);
        assert_eq!(kernel.coordinates_of(5), None);
    }

    #[test]
    fn oversized_bounds_are_clamped() {
        let config = KernelConfig {
            systems: usize::MAX / 4,
            breadth: 8,
            depth: 0,
            matula_slots: usize::MAX,
        };
        let kernel = CognitiveKernel::from_config(&config);
        assert_eq!(kernel.shape(), (MAX_KERNEL_SYSTEMS, 8, 1));
        assert_eq!(kernel.as_slice().len(), MAX_KERNEL_SYSTEMS * 8 * 2);
    }

    #[test]
    fn levels_past_bounds_are_not_stored() {
        let mut kernel = CognitiveKernel::new(2, 32, 32);
        // 243 has level 8, beyond two systems.
        let enc = kernel.write("(()()()()())").expect("encode");
        assert_eq!(enc.system_level, 8);
        assert!(kernel.as_slice().iter().all(|v| *v == 0.0));
        assert!(kernel.coordinates_of(243).is_some());
    }

    #[test]
    fn interference_pattern() {
        let kernel = CognitiveKernel::default();
        let pattern = kernel.phase_interference(2, 3).expect("pattern");
        assert_eq!(pattern.len(), 6);
        assert!(pattern.as_slice()[..3].iter().all(|v| (*v - 1.0).abs() < 1e-6));
        assert!((pattern.as_slice()[3] - (0.2_f32).cos()).abs() < 1e-6);
        assert!((pattern.as_slice()[5] - (0.5_f32).cos()).abs() < 1e-6);
        assert!(kernel.phase_interference(1, 2000).is_err());
    }

    #[test]
    fn superposition_normalizes_amplitudes() {
        let kernel = CognitiveKernel::default();
        let a = kernel.encoder().encode("(())").expect("a");
        let b = kernel.encoder().encode("(()())").expect("b");
        let rows = kernel.superposition(&[
            TreeState {
                encoding: a,
                amplitude: 3.0,
            },
            TreeState {
                encoding: b,
                amplitude: 4.0,
            },
        ]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], 3.0);
        assert!((rows[0][3] - 0.6).abs() < 1e-6);
        assert!((rows[1][3] - 0.8).abs() < 1e-6);

        let zero = kernel.superposition(&[TreeState {
            encoding: a,
            amplitude: 0.0,
        }]);
        assert_eq!(zero[0][3], 0.0);
    }
}
