//! Read-only Bloom filter over a blocklist. Built once, then only queried.
use crate::bits::BitArray;
use crate::errors::{Result, WordBloomError};
use crate::hashing::{probes, Probes};
use crate::params::FilterParams;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BloomFilter {
    params: FilterParams,
    bits: BitArray,
}

impl BloomFilter {
    /// Pair decoded bits with their parameters; the bit length must equal `bloom_size`.
    pub fn from_parts(params: FilterParams, bits: BitArray) -> Result<Self> {
        params.validate()?;
        if bits.len() != params.bloom_size {
            return Err(WordBloomError::InvalidParams(format!(
                "bit array holds {} bits, params say {}", bits.len(), params.bloom_size
            )));
        }
        Ok(Self { params, bits })
    }

    pub(crate) fn empty(params: FilterParams) -> Self {
        Self { params, bits: BitArray::new(params.bloom_size) }
    }

    #[inline]
    pub fn params(&self) -> &FilterParams { &self.params }

    #[inline]
    pub fn bits(&self) -> &BitArray { &self.bits }

    #[inline]
    fn probes_of<'a>(&self, w: &'a str) -> Probes<'a> {
        probes(w, self.params.num_hashes, self.params.bloom_size, self.params.scheme)
    }

    /// Set the probe bits of `word`; returns the indices it touched.
    pub(crate) fn insert(&mut self, word: &str) -> Vec<u32> {
        let w = self.params.normalization.apply(word);
        let idxs: Vec<u32> = self.probes_of(&w).collect();
        for &idx in &idxs {
            self.bits.set(idx);
        }
        idxs
    }

    /// `false` means definitely absent; `true` means possibly present.
    pub fn might_contain(&self, word: &str) -> bool {
        let w = self.params.normalization.apply(word);
        self.probes_of(&w).all(|idx| self.bits.get(idx))
    }

    pub fn bits_set(&self) -> u32 { self.bits.count_ones() }

    /// FPR estimated from the fill ratio: (bits_set / m)^k.
    pub fn estimated_fpr(&self) -> f64 {
        self.bits.fill_ratio().powi(self.params.num_hashes as i32)
    }
}
