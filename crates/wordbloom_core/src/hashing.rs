//! Probe scheme shared by the builder and every reader.
//!
//! A probe maps `(word, seed)` to a bit index in `[0, bloom_size)`. The seeded
//! digest schemes hash `word_bytes ++ decimal(seed)` and read the digest as a
//! big-endian integer; `Xxh3` derives all probes from two xxh3 values.
use crate::consts::{SCHEME_BLAKE3, SCHEME_MD5, SCHEME_SHA256, SCHEME_XXH3_DOUBLE, XXH3_STEP_SEED};
use crate::errors::{Result, WordBloomError};
use crate::utils::reduce_be;
use md5::Md5;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use xxhash_rust::xxh3::{xxh3_64, xxh3_64_with_seed};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashScheme {
    /// MD5 over `word ++ seed`; matches artifacts built by the reference tooling.
    #[default]
    Md5,
    Sha256,
    Blake3,
    /// Double hashing: `h1 + i*h2` with two xxh3 values.
    Xxh3,
}

impl HashScheme {
    pub fn tag(self) -> u8 {
        match self {
            HashScheme::Md5 => SCHEME_MD5,
            HashScheme::Sha256 => SCHEME_SHA256,
            HashScheme::Blake3 => SCHEME_BLAKE3,
            HashScheme::Xxh3 => SCHEME_XXH3_DOUBLE,
        }
    }

    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            SCHEME_MD5 => Ok(HashScheme::Md5),
            SCHEME_SHA256 => Ok(HashScheme::Sha256),
            SCHEME_BLAKE3 => Ok(HashScheme::Blake3),
            SCHEME_XXH3_DOUBLE => Ok(HashScheme::Xxh3),
            t => Err(WordBloomError::MalformedEncoding(format!("unknown hash scheme tag {t}"))),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            HashScheme::Md5 => "md5",
            HashScheme::Sha256 => "sha256",
            HashScheme::Blake3 => "blake3",
            HashScheme::Xxh3 => "xxh3",
        }
    }
}

/// Raw digest of `word ++ decimal(seed)` for the seeded schemes.
///
/// `Xxh3` has no per-seed digest; it returns the big-endian bytes of the
/// combined 64-bit probe value before reduction.
pub fn seeded_digest(word: &str, seed: u32, scheme: HashScheme) -> Vec<u8> {
    let seed_txt = seed.to_string();
    match scheme {
        HashScheme::Md5 => {
            let mut h = Md5::new();
            h.update(word.as_bytes());
            h.update(seed_txt.as_bytes());
            h.finalize().to_vec()
        }
        HashScheme::Sha256 => {
            let mut h = Sha256::new();
            h.update(word.as_bytes());
            h.update(seed_txt.as_bytes());
            h.finalize().to_vec()
        }
        HashScheme::Blake3 => {
            let mut h = blake3::Hasher::new();
            h.update(word.as_bytes());
            h.update(seed_txt.as_bytes());
            h.finalize().as_bytes().to_vec()
        }
        HashScheme::Xxh3 => {
            let (h1, h2) = xxh3_pair(word.as_bytes());
            h1.wrapping_add((seed as u64).wrapping_mul(h2)).to_be_bytes().to_vec()
        }
    }
}

#[inline]
fn xxh3_pair(bytes: &[u8]) -> (u64, u64) {
    // odd step so consecutive probes never collapse onto one index when m is a power of two
    (xxh3_64(bytes), xxh3_64_with_seed(bytes, XXH3_STEP_SEED) | 1)
}

/// Bit index for one `(word, seed)` pair. `bloom_size` must be non-zero.
pub fn probe(word: &str, seed: u32, bloom_size: u32, scheme: HashScheme) -> u32 {
    debug_assert!(bloom_size > 0);
    reduce_be(&seeded_digest(word, seed, scheme), bloom_size)
}

/// All `num_hashes` indices for `word`, seeds `0..num_hashes`.
pub fn probes(word: &str, num_hashes: u32, bloom_size: u32, scheme: HashScheme) -> Probes<'_> {
    let pair = match scheme {
        HashScheme::Xxh3 => Some(xxh3_pair(word.as_bytes())),
        _ => None,
    };
    Probes { word, seed: 0, num_hashes, bloom_size, scheme, pair }
}

pub struct Probes<'a> {
    word: &'a str,
    seed: u32,
    num_hashes: u32,
    bloom_size: u32,
    scheme: HashScheme,
    pair: Option<(u64, u64)>,
}

impl Iterator for Probes<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.seed >= self.num_hashes { return None; }
        let seed = self.seed;
        self.seed += 1;
        let idx = match self.pair {
            Some((h1, h2)) => (h1.wrapping_add((seed as u64).wrapping_mul(h2)) % self.bloom_size as u64) as u32,
            None => probe(self.word, seed, self.bloom_size, self.scheme),
        };
        Some(idx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = (self.num_hashes - self.seed.min(self.num_hashes)) as usize;
        (n, Some(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [HashScheme; 4] = [HashScheme::Md5, HashScheme::Sha256, HashScheme::Blake3, HashScheme::Xxh3];

    #[test]
    fn md5_matches_reference_indices() {
        // md5("die0") mod 64 == 36, md5("die1") mod 64 == 33
        assert_eq!(probe("die", 0, 64, HashScheme::Md5), 36);
        assert_eq!(probe("die", 1, 64, HashScheme::Md5), 33);
        assert_eq!(probe("hate", 0, 64, HashScheme::Md5), 52);
        let idx: Vec<u32> = probes("die", 3, 1500, HashScheme::Md5).collect();
        assert_eq!(idx, vec![356, 569, 319]);
    }

    #[test]
    fn md5_digest_is_word_then_decimal_seed() {
        // md5("die0")
        let d = seeded_digest("die", 0, HashScheme::Md5);
        assert_eq!(d.len(), 16);
        let mut h = Md5::new();
        h.update(b"die0");
        assert_eq!(d, h.finalize().to_vec());
    }

    #[test]
    fn probes_are_deterministic_and_in_range() {
        for scheme in ALL {
            for m in [1u32, 7, 64, 1500, 1 << 20] {
                for w in ["", "die", "can't stand", "ölü", "🙂"] {
                    let a: Vec<u32> = probes(w, 5, m, scheme).collect();
                    let b: Vec<u32> = probes(w, 5, m, scheme).collect();
                    assert_eq!(a, b);
                    assert_eq!(a.len(), 5);
                    assert!(a.iter().all(|&i| i < m), "{scheme:?} m={m} {a:?}");
                }
            }
        }
    }

    #[test]
    fn iterator_agrees_with_single_probe() {
        for scheme in ALL {
            let it: Vec<u32> = probes("abandon", 4, 997, scheme).collect();
            let one: Vec<u32> = (0..4).map(|s| probe("abandon", s, 997, scheme)).collect();
            assert_eq!(it, one, "{scheme:?}");
        }
    }

    #[test]
    fn seeds_spread_probes() {
        for scheme in ALL {
            let idx: std::collections::HashSet<u32> = probes("bastard", 7, 1 << 16, scheme).collect();
            assert!(idx.len() >= 5, "{scheme:?} gave {idx:?}");
        }
    }

    #[test]
    fn tags_roundtrip() {
        for scheme in ALL {
            assert_eq!(HashScheme::from_tag(scheme.tag()).unwrap(), scheme);
        }
        assert!(HashScheme::from_tag(0).is_err());
        assert!(HashScheme::from_tag(99).is_err());
    }
}
