//! Deterministic feature-hashing encoder
//!
//! Hashes each lowercased whitespace token (trimmed of surrounding
//! punctuation, so "virus." and "virus" agree) into a bucket of the output
//! vector with a sign bit, then L2-normalizes. No model weights, no network:
//! this is the offline encoder the test suite runs on. Texts sharing tokens
//! land near each other, and identical text always produces an identical
//! vector.

use super::Encoder;
use crate::error::Result;
use async_trait::async_trait;
use sha2::{Digest, Sha256};

/// Feature-hashing encoder
pub struct HashingEncoder {
    dimension: usize,
}

impl HashingEncoder {
    /// Create an encoder producing vectors of the given dimension
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        for token in text.to_lowercase().split_whitespace() {
            let token = token.trim_matches(|c: char| !c.is_alphanumeric());
            if token.is_empty() {
                continue;
            }

            let digest = Sha256::digest(token.as_bytes());
            let bucket = digest
                .iter()
                .take(8)
                .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte));
            let index = (bucket % self.dimension as u64) as usize;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            vector[index] += sign;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }

        vector
    }
}

#[async_trait]
impl Encoder for HashingEncoder {
    async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed(text))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
