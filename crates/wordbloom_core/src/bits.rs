//! Fixed-size bit array, packed MSB-first (bit `i` is bit `7 - i % 8` of byte `i / 8`).
use crate::errors::{Result, WordBloomError};
use crate::utils::packed_len;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitArray {
    len_bits: u32,
    bytes: Vec<u8>,
}

impl BitArray {
    pub fn new(len_bits: u32) -> Self {
        Self { len_bits, bytes: vec![0u8; packed_len(len_bits)] }
    }

    /// Wrap packed bytes. Padding bits past `len_bits` are cleared.
    pub fn from_bytes(len_bits: u32, mut bytes: Vec<u8>) -> Result<Self> {
        let expected = packed_len(len_bits);
        if bytes.len() != expected {
            return Err(WordBloomError::SizeMismatch { expected, actual: bytes.len() });
        }
        let tail = len_bits % 8;
        if tail != 0 {
            if let Some(last) = bytes.last_mut() {
                *last &= 0xFFu8 << (8 - tail);
            }
        }
        Ok(Self { len_bits, bytes })
    }

    #[inline]
    pub fn len(&self) -> u32 { self.len_bits }

    #[inline]
    pub fn is_empty(&self) -> bool { self.len_bits == 0 }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] { &self.bytes }

    #[inline]
    fn locate(idx: u32) -> (usize, u8) {
        ((idx / 8) as usize, 0x80u8 >> (idx & 7))
    }

    /// Idempotent; bits are never cleared. Returns `false` and leaves the
    /// array untouched when `idx >= len_bits`, so padding stays zero.
    #[inline]
    pub(crate) fn set(&mut self, idx: u32) -> bool {
        if idx >= self.len_bits {
            return false;
        }
        let (byte, mask) = Self::locate(idx);
        self.bytes[byte] |= mask;
        true
    }

    /// `false` for any index past the end.
    #[inline]
    pub fn get(&self, idx: u32) -> bool {
        if idx >= self.len_bits {
            return false;
        }
        let (byte, mask) = Self::locate(idx);
        self.bytes[byte] & mask != 0
    }

    pub fn count_ones(&self) -> u32 {
        self.bytes.iter().map(|b| b.count_ones()).sum()
    }

    pub fn fill_ratio(&self) -> f64 {
        if self.len_bits == 0 { return 0.0; }
        self.count_ones() as f64 / self.len_bits as f64
    }

    /// Indices of set bits in ascending order.
    pub fn ones(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.len_bits).filter(move |&i| self.get(i))
    }
}
