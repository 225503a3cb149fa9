//! Filter artifact codec.
//!
//! Framed layout (LE), base64 (standard alphabet, padded, unwrapped), one line:
//!   magic[4]   = "WBLF"
//!   version[2] = 1
//!   scheme[1]  = 1 md5, 2 sha256, 3 blake3, 4 xxh3
//!   norm[1]    = bit0 fold_case, bit1 trim_punctuation
//!   k[4]       = num_hashes
//!   m[4]       = bloom_size
//!   crc[4]     = crc32(payload)
//!   payload    = ceil(m/8) bytes, MSB-first
//!
//! Legacy layout is the bare base64 payload; `m`, `k` and the scheme must be
//! supplied by the reader.

use crate::bits::BitArray;
use crate::consts::{HDR_SIZE, MAGIC_FILTER, VERSION};
use crate::errors::{Result, WordBloomError};
use crate::filter::BloomFilter;
use crate::hashing::HashScheme;
use crate::normalize::Normalization;
use crate::params::FilterParams;
use crate::utils::{crc32, packed_len, read_u16, read_u32, write_atomic};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufRead, BufReader, Cursor, Read};
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    /// Parameter header + CRC + bits.
    #[default]
    Framed,
    /// Bits only, as produced by the reference tooling.
    Legacy,
}

fn malformed(msg: impl Into<String>) -> WordBloomError {
    WordBloomError::MalformedEncoding(msg.into())
}

pub fn encode_bytes(filter: &BloomFilter) -> Vec<u8> {
    let p = filter.params();
    let payload = filter.bits().as_bytes();
    let mut out = Vec::with_capacity(HDR_SIZE + payload.len());
    out.extend_from_slice(MAGIC_FILTER);
    out.extend_from_slice(&VERSION.to_le_bytes());
    out.push(p.scheme.tag());
    out.push(p.normalization.to_flags());
    out.extend_from_slice(&p.num_hashes.to_le_bytes());
    out.extend_from_slice(&p.bloom_size.to_le_bytes());
    out.extend_from_slice(&crc32(payload).to_le_bytes());
    out.extend_from_slice(payload);
    out
}

pub fn decode_bytes(data: &[u8]) -> Result<BloomFilter> {
    if data.len() < HDR_SIZE {
        return Err(malformed(format!("{} bytes is shorter than the {HDR_SIZE}-byte header", data.len())));
    }
    if &data[0..4] != MAGIC_FILTER {
        return Err(malformed("bad magic"));
    }
    let mut r = Cursor::new(&data[4..HDR_SIZE]);
    let version = read_u16(&mut r)?;
    if version != VERSION {
        return Err(malformed(format!("unsupported version {version}")));
    }
    let mut tags = [0u8; 2];
    r.read_exact(&mut tags)?;
    let scheme = HashScheme::from_tag(tags[0])?;
    let normalization = Normalization::from_flags(tags[1])?;
    let num_hashes = read_u32(&mut r)?;
    let bloom_size = read_u32(&mut r)?;
    let crc = read_u32(&mut r)?;

    let params = FilterParams { bloom_size, num_hashes, scheme, normalization };
    params.validate().map_err(|e| malformed(e.to_string()))?;

    let payload = &data[HDR_SIZE..];
    let expected = packed_len(bloom_size);
    if payload.len() != expected {
        return Err(WordBloomError::SizeMismatch { expected, actual: payload.len() });
    }
    if crc32(payload) != crc {
        return Err(malformed("payload checksum mismatch"));
    }
    BloomFilter::from_parts(params, BitArray::from_bytes(bloom_size, payload.to_vec())?)
}

/// Framed artifact text.
pub fn encode(filter: &BloomFilter) -> String {
    BASE64.encode(encode_bytes(filter))
}

pub fn decode(text: &str) -> Result<BloomFilter> {
    let raw = BASE64.decode(text.trim()).map_err(|e| malformed(format!("base64: {e}")))?;
    decode_bytes(&raw)
}

/// Headerless artifact text: base64 of the packed bits only.
pub fn encode_legacy(filter: &BloomFilter) -> String {
    BASE64.encode(filter.bits().as_bytes())
}

pub fn decode_legacy(text: &str, params: FilterParams) -> Result<BloomFilter> {
    params.validate()?;
    let raw = BASE64.decode(text.trim()).map_err(|e| malformed(format!("base64: {e}")))?;
    BloomFilter::from_parts(params, BitArray::from_bytes(params.bloom_size, raw)?)
}

pub fn encode_as(filter: &BloomFilter, format: ArtifactFormat) -> String {
    match format {
        ArtifactFormat::Framed => encode(filter),
        ArtifactFormat::Legacy => encode_legacy(filter),
    }
}

/// Decode either format; `params` is only consulted for `Legacy`.
pub fn decode_as(text: &str, format: ArtifactFormat, params: FilterParams) -> Result<BloomFilter> {
    match format {
        ArtifactFormat::Framed => decode(text),
        ArtifactFormat::Legacy => decode_legacy(text, params),
    }
}

/// Publish `text` + newline at `path` atomically (temp file, fsync, rename).
pub fn write_artifact(path: &Path, text: &str) -> Result<()> {
    let mut data = Vec::with_capacity(text.len() + 1);
    data.extend_from_slice(text.as_bytes());
    data.push(b'\n');
    write_atomic(path, &data)
}

/// First line of the artifact at `path`. Bytes that are not UTF-8 are
/// `MalformedEncoding`, like any other invalid payload character.
pub fn read_artifact(path: &Path) -> Result<String> {
    let mut raw = Vec::new();
    BufReader::new(fs::File::open(path)?).read_until(b'\n', &mut raw)?;
    let line = String::from_utf8(raw)
        .map_err(|e| malformed(format!("{}: not valid UTF-8 at byte {}", path.display(), e.utf8_error().valid_up_to())))?;
    if line.trim().is_empty() {
        return Err(malformed(format!("{} is empty", path.display())));
    }
    Ok(line.trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocklist::BlocklistEntry;
    use crate::builder::{build_filter, EmptyPolicy};

    fn die_filter(params: FilterParams) -> BloomFilter {
        let entries = vec![BlocklistEntry::new("die", -5), BlocklistEntry::new("hate", -3)];
        build_filter(&entries, -4, params, EmptyPolicy::Reject).unwrap().0
    }

    #[test]
    fn legacy_matches_reference_bytes() {
        let f = die_filter(FilterParams::new(64, 2));
        // bits 33 and 36 live in byte 4: 0b0100_1000
        assert_eq!(encode_legacy(&f), "AAAAAEgAAAA=");
        let back = decode_legacy("AAAAAEgAAAA=\n", FilterParams::new(64, 2)).unwrap();
        assert_eq!(back, f);
    }

    #[test]
    fn framed_roundtrip_carries_params() {
        let params = FilterParams::new(1500, 3)
            .with_scheme(HashScheme::Blake3)
            .with_normalization(Normalization { fold_case: true, trim_punctuation: false });
        let f = die_filter(params);
        let text = encode(&f);
        assert!(!text.contains('\n'));
        let back = decode(&text).unwrap();
        assert_eq!(back, f);
        assert_eq!(back.params(), &params);
        assert!(back.might_contain("DIE"));
    }

    #[test]
    fn header_layout() {
        let f = die_filter(FilterParams::new(64, 2));
        let raw = encode_bytes(&f);
        assert_eq!(&raw[0..4], b"WBLF");
        assert_eq!(&raw[4..6], &[1, 0]);
        assert_eq!(raw[6], 1);
        assert_eq!(raw[7], 0);
        assert_eq!(&raw[8..12], &2u32.to_le_bytes());
        assert_eq!(&raw[12..16], &64u32.to_le_bytes());
        assert_eq!(raw.len(), HDR_SIZE + 8);
        assert_eq!(&raw[HDR_SIZE..], &[0, 0, 0, 0, 0x48, 0, 0, 0]);
    }

    #[test]
    fn rejects_bad_base64() {
        assert!(matches!(decode("not base64!!"), Err(WordBloomError::MalformedEncoding(_))));
        assert!(matches!(
            decode_legacy("%%%", FilterParams::new(64, 2)),
            Err(WordBloomError::MalformedEncoding(_))
        ));
    }

    #[test]
    fn rejects_truncated_and_padded_payloads() {
        let f = die_filter(FilterParams::new(64, 2));
        let raw = encode_bytes(&f);
        assert!(matches!(
            decode_bytes(&raw[..raw.len() - 1]),
            Err(WordBloomError::SizeMismatch { expected: 8, actual: 7 })
        ));
        let mut longer = raw.clone();
        longer.push(0);
        assert!(matches!(decode_bytes(&longer), Err(WordBloomError::SizeMismatch { .. })));
        assert!(matches!(decode_bytes(&raw[..10]), Err(WordBloomError::MalformedEncoding(_))));
        assert!(matches!(
            decode_legacy("AAAAAEgA", FilterParams::new(64, 2)),
            Err(WordBloomError::SizeMismatch { expected: 8, actual: 6 })
        ));
    }

    #[test]
    fn rejects_corrupt_header_and_payload() {
        let f = die_filter(FilterParams::new(64, 2));
        let raw = encode_bytes(&f);

        let mut bad = raw.clone();
        bad[0] = b'X';
        assert!(matches!(decode_bytes(&bad), Err(WordBloomError::MalformedEncoding(_))));

        let mut bad = raw.clone();
        bad[4] = 9;
        assert!(matches!(decode_bytes(&bad), Err(WordBloomError::MalformedEncoding(_))));

        let mut bad = raw.clone();
        bad[6] = 42;
        assert!(matches!(decode_bytes(&bad), Err(WordBloomError::MalformedEncoding(_))));

        let mut bad = raw.clone();
        bad[8..12].copy_from_slice(&0u32.to_le_bytes());
        assert!(matches!(decode_bytes(&bad), Err(WordBloomError::MalformedEncoding(_))));

        let mut bad = raw.clone();
        bad[HDR_SIZE] = 0xFF;
        assert!(matches!(decode_bytes(&bad), Err(WordBloomError::MalformedEncoding(_))));
    }

    #[test]
    fn legacy_decode_of_framed_text_is_size_mismatch() {
        let f = die_filter(FilterParams::new(64, 2));
        assert!(matches!(
            decode_legacy(&encode(&f), FilterParams::new(64, 2)),
            Err(WordBloomError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn artifact_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bloom_filter_base64.txt");
        let f = die_filter(FilterParams::reference());
        for format in [ArtifactFormat::Framed, ArtifactFormat::Legacy] {
            write_artifact(&path, &encode_as(&f, format)).unwrap();
            let text = read_artifact(&path).unwrap();
            assert_eq!(decode_as(&text, format, FilterParams::reference()).unwrap(), f);
        }
        let empty = dir.path().join("empty.txt");
        fs::write(&empty, "").unwrap();
        assert!(read_artifact(&empty).is_err());
    }

    #[test]
    fn non_utf8_artifact_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bloom.txt");
        fs::write(&path, [0xff, 0xfe, b'A', b'A', b'\n']).unwrap();
        assert!(matches!(read_artifact(&path), Err(WordBloomError::MalformedEncoding(_))));
    }
}
