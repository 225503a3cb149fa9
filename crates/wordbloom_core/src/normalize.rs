//! Optional word normalisation shared by builder and reader.
//!
//! The default is exact pass-through: words are hashed byte-for-byte as they
//! appear in the blocklist and in the text. Any other setting is recorded in
//! the artifact header so both sides apply it identically.
use crate::consts::{NORM_FOLD_CASE, NORM_TRIM_PUNCT};
use crate::errors::{Result, WordBloomError};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Normalization {
    /// Unicode lowercase before hashing.
    #[serde(default)]
    pub fold_case: bool,
    /// Strip leading/trailing ASCII punctuation before hashing.
    #[serde(default)]
    pub trim_punctuation: bool,
}

impl Normalization {
    pub const EXACT: Self = Self { fold_case: false, trim_punctuation: false };

    pub fn is_exact(&self) -> bool { !self.fold_case && !self.trim_punctuation }

    pub fn apply<'a>(&self, word: &'a str) -> Cow<'a, str> {
        let mut w: &'a str = word;
        if self.trim_punctuation {
            w = w.trim_matches(|c: char| c.is_ascii_punctuation());
        }
        if self.fold_case && w.chars().any(|c| c.is_uppercase()) {
            return Cow::Owned(w.to_lowercase());
        }
        Cow::Borrowed(w)
    }

    pub fn to_flags(self) -> u8 {
        let mut f = 0u8;
        if self.fold_case { f |= NORM_FOLD_CASE; }
        if self.trim_punctuation { f |= NORM_TRIM_PUNCT; }
        f
    }

    pub fn from_flags(flags: u8) -> Result<Self> {
        if flags & !(NORM_FOLD_CASE | NORM_TRIM_PUNCT) != 0 {
            return Err(WordBloomError::MalformedEncoding(format!("unknown normalization flags {flags:#04x}")));
        }
        Ok(Self {
            fold_case: flags & NORM_FOLD_CASE != 0,
            trim_punctuation: flags & NORM_TRIM_PUNCT != 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_is_identity() {
        let n = Normalization::EXACT;
        for w in ["Die", " die", "die.", "DIE", "ölü"] {
            assert!(matches!(n.apply(w), Cow::Borrowed(x) if x == w));
        }
    }

    #[test]
    fn fold_case_lowercases() {
        let n = Normalization { fold_case: true, ..Default::default() };
        assert_eq!(n.apply("Die"), "die");
        assert_eq!(n.apply("ÖLÜ"), "ölü");
        assert!(matches!(n.apply("die"), Cow::Borrowed(_)));
    }

    #[test]
    fn trim_strips_ascii_punctuation_only_at_edges() {
        let n = Normalization { trim_punctuation: true, ..Default::default() };
        assert_eq!(n.apply("die."), "die");
        assert_eq!(n.apply("\"die!\""), "die");
        assert_eq!(n.apply("can't"), "can't");
        assert_eq!(n.apply("..."), "");
    }

    #[test]
    fn flags_roundtrip_and_reject_unknown_bits() {
        for n in [
            Normalization::EXACT,
            Normalization { fold_case: true, trim_punctuation: false },
            Normalization { fold_case: false, trim_punctuation: true },
            Normalization { fold_case: true, trim_punctuation: true },
        ] {
            assert_eq!(Normalization::from_flags(n.to_flags()).unwrap(), n);
        }
        assert!(matches!(Normalization::from_flags(0x80), Err(WordBloomError::MalformedEncoding(_))));
    }
}
