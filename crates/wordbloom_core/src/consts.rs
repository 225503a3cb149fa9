// crates/wordbloom_core/src/consts.rs

pub const MAGIC_FILTER: &[u8; 4] = b"WBLF";
pub const VERSION: u16 = 1;

/// magic(4) + version(2) + scheme(1) + norm(1) + k(4) + m(4) + crc32(4)
pub const HDR_SIZE: usize = 20;

pub const DEFAULT_BLOOM_SIZE: u32 = 1500;
pub const DEFAULT_NUM_HASHES: u32 = 3;
pub const DEFAULT_THRESHOLD: i64 = -4;

pub const MAX_HASHES: u32 = 32;
pub const MAX_BLOOM_BITS: u32 = 1 << 30;

pub const SCHEME_MD5: u8 = 1;
pub const SCHEME_SHA256: u8 = 2;
pub const SCHEME_BLAKE3: u8 = 3;
pub const SCHEME_XXH3_DOUBLE: u8 = 4;

pub const NORM_FOLD_CASE: u8 = 0b01;
pub const NORM_TRIM_PUNCT: u8 = 0b10;

/// Second xxh3 seed for double hashing.
pub const XXH3_STEP_SEED: u64 = 0x9E37_79B9_7F4A_7C15;
