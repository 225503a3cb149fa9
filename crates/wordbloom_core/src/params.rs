//! Filter parameters agreed on by builder and reader.
//!
//! The framed artifact carries these in its header; only the legacy
//! headerless format needs them supplied out of band.
//!
//! FPR = (1 - e^(-kn/m))^k
use crate::consts::{DEFAULT_BLOOM_SIZE, DEFAULT_NUM_HASHES, MAX_BLOOM_BITS, MAX_HASHES};
use crate::errors::{Result, WordBloomError};
use crate::hashing::HashScheme;
use crate::normalize::Normalization;
use serde::{Deserialize, Serialize};
use std::f64::consts::LN_2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterParams {
    pub bloom_size: u32,
    pub num_hashes: u32,
    #[serde(default)]
    pub scheme: HashScheme,
    #[serde(default)]
    pub normalization: Normalization,
}

impl Default for FilterParams {
    fn default() -> Self { Self::reference() }
}

impl FilterParams {
    /// 1500 bits, 3 probes, MD5, exact words.
    pub fn reference() -> Self {
        Self {
            bloom_size: DEFAULT_BLOOM_SIZE,
            num_hashes: DEFAULT_NUM_HASHES,
            scheme: HashScheme::Md5,
            normalization: Normalization::EXACT,
        }
    }

    pub fn new(bloom_size: u32, num_hashes: u32) -> Self {
        Self { bloom_size, num_hashes, ..Self::reference() }
    }

    pub fn with_scheme(mut self, scheme: HashScheme) -> Self { self.scheme = scheme; self }

    pub fn with_normalization(mut self, n: Normalization) -> Self { self.normalization = n; self }

    pub fn validate(&self) -> Result<()> {
        if self.bloom_size == 0 || self.bloom_size > MAX_BLOOM_BITS {
            return Err(WordBloomError::InvalidParams(format!(
                "bloom_size {} outside 1..={MAX_BLOOM_BITS}", self.bloom_size
            )));
        }
        if self.num_hashes == 0 || self.num_hashes > MAX_HASHES {
            return Err(WordBloomError::InvalidParams(format!(
                "num_hashes {} outside 1..={MAX_HASHES}", self.num_hashes
            )));
        }
        Ok(())
    }

    /// Expected false positive rate after inserting `words` distinct words.
    pub fn expected_fpr(&self, words: usize) -> f64 {
        theoretical_fpr(self.bloom_size, words, self.num_hashes)
    }
}

pub fn theoretical_fpr(m: u32, n: usize, k: u32) -> f64 {
    if m == 0 {
        return 1.0;
    }
    let exponent = -(k as f64) * (n as f64) / (m as f64);
    (1.0 - exponent.exp()).powi(k as i32)
}

/// k = (m/n) * ln 2, clamped to `1..=MAX_HASHES`.
pub fn optimal_num_hashes(m: u32, n: usize) -> u32 {
    if n == 0 {
        return 1;
    }
    (((m as f64 / n as f64) * LN_2).round() as u32).clamp(1, MAX_HASHES)
}
