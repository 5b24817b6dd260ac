//! # Tensor
//!
//! Dense 1-D `f32` tensor used for atom embeddings, unit encodings and the
//! values passed through the transduction pipeline.

use serde::{Deserialize, Serialize};

/// Norm selector for [`Tensor::norm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Norm {
    /// Sum of absolute values.
    L1,
    /// Euclidean length.
    L2,
    /// Largest absolute value.
    Inf,
}

/// An owned 1-D tensor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Tensor {
    data: Vec<f32>,
}

impl Tensor {
    /// A tensor of `len` zeros.
    #[must_use]
    pub fn zeros(len: usize) -> Self {
        Self {
            data: vec![0.0; len],
        }
    }

    /// Wrap existing values.
    #[must_use]
    pub fn from_vec(data: Vec<f32>) -> Self {
        Self { data }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Compute the requested norm.
    #[must_use]
    pub fn norm(&self, norm: Norm) -> f32 {
        match norm {
            Norm::L1 => self.data.iter().map(|v| v.abs()).sum(),
            Norm::L2 => self.data.iter().map(|v| v * v).sum::<f32>().sqrt(),
            Norm::Inf => self.data.iter().fold(0.0_f32, |acc, v| acc.max(v.abs())),
        }
    }

    /// Cosine similarity, or `None` when the lengths differ or either
    /// tensor has zero norm.
    #[must_use]
    pub fn try_cosine(&self, other: &Tensor) -> Option<f32> {
        if self.data.len() != other.data.len() {
            return None;
        }
        let mut dot = 0.0_f32;
        let mut norm_a = 0.0_f32;
        let mut norm_b = 0.0_f32;
        for (a, b) in self.data.iter().zip(&other.data) {
            dot += a * b;
            norm_a += a * a;
            norm_b += b * b;
        }
        if norm_a > 0.0 && norm_b > 0.0 {
            Some(dot / (norm_a.sqrt() * norm_b.sqrt()))
        } else {
            None
        }
    }

    /// Cosine similarity with 0 for incomparable tensors.
    #[must_use]
    pub fn cosine(&self, other: &Tensor) -> f32 {
        self.try_cosine(other).unwrap_or(0.0)
    }

    /// Copy of this tensor resized to `len`, zero-padding or truncating.
    #[must_use]
    pub fn resized(&self, len: usize) -> Self {
        let mut data = self.data.clone();
        data.resize(len, 0.0);
        Self { data }
    }
}

impl From<Vec<f32>> for Tensor {
    fn from(data: Vec<f32>) -> Self {
        Self::from_vec(data)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn norms() {
        let t = Tensor::from_vec(vec![3.0, -4.0]);
        assert_eq!(t.norm(Norm::L1), 7.0);
        assert!((t.norm(Norm::L2) - 5.0).abs() < 1e-6);
        assert_eq!(t.norm(Norm::Inf), 4.0);
        assert_eq!(Tensor::zeros(0).norm(Norm::Inf), 0.0);
    }

    #[test]
    fn cosine_of_parallel_vectors_is_one() {
        let a = Tensor::from_vec(vec![1.0, 2.0, 3.0]);
        let b = Tensor::from_vec(vec![2.0, 4.0, 6.0]);
        assert!((a.cosine(&b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_incomparable_is_zero() {
        let a = Tensor::from_vec(vec![1.0, 0.0]);
        assert_eq!(a.cosine(&Tensor::zeros(2)), 0.0);
        assert_eq!(a.cosine(&Tensor::from_vec(vec![1.0])), 0.0);
        assert!(a.try_cosine(&Tensor::zeros(2)).is_none());
    }

    #[test]
    fn resize_pads_and_truncates() {
        let t = Tensor::from_vec(vec![1.0, 2.0]);
        assert_eq!(t.resized(4).as_slice(), &[1.0, 2.0, 0.0, 0.0]);
        assert_eq!(t.resized(1).as_slice(), &[1.0]);
    }
}
