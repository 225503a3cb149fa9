//! Membership oracle: a load-once slot holding an immutable filter.
//!
//! Loading is a single blocking attempt; queries before a successful load
//! fail with `Uninitialized`. Once loaded the filter is shared read-only,
//! so queries take no locks.
use crate::codec::{decode_as, read_artifact, ArtifactFormat};
use crate::errors::{Result, WordBloomError};
use crate::filter::BloomFilter;
use crate::params::FilterParams;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use tracing::info;

#[derive(Debug, Default)]
pub struct MembershipOracle {
    slot: OnceLock<Arc<BloomFilter>>,
}

impl MembershipOracle {
    pub fn empty() -> Self { Self::default() }

    pub fn with_filter(filter: BloomFilter) -> Self {
        let slot = OnceLock::new();
        let _ = slot.set(Arc::new(filter));
        Self { slot }
    }

    pub fn is_loaded(&self) -> bool { self.slot.get().is_some() }

    pub fn load(&self, filter: BloomFilter) -> Result<()> {
        let p = *filter.params();
        let bits_set = filter.bits_set();
        self.slot.set(Arc::new(filter)).map_err(|_| WordBloomError::AlreadyLoaded)?;
        info!(
            bloom_size = p.bloom_size,
            num_hashes = p.num_hashes,
            scheme = p.scheme.name(),
            bits_set,
            "filter loaded"
        );
        Ok(())
    }

    /// Decode artifact text and load it. `legacy_params` is used only for `Legacy`.
    pub fn load_encoded(&self, text: &str, format: ArtifactFormat, legacy_params: FilterParams) -> Result<()> {
        self.load(decode_as(text, format, legacy_params)?)
    }

    pub fn load_path(&self, path: &Path, format: ArtifactFormat, legacy_params: FilterParams) -> Result<()> {
        let text = read_artifact(path)?;
        self.load_encoded(&text, format, legacy_params)
    }

    pub fn snapshot(&self) -> Option<Arc<BloomFilter>> { self.slot.get().cloned() }

    pub fn filter(&self) -> Result<&BloomFilter> {
        self.slot.get().map(|f| f.as_ref()).ok_or(WordBloomError::Uninitialized)
    }

    pub fn might_contain(&self, word: &str) -> Result<bool> {
        Ok(self.filter()?.might_contain(word))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocklist::BlocklistEntry;
    use crate::builder::{build_filter, EmptyPolicy};
    use crate::codec::encode;

    fn die_filter() -> BloomFilter {
        let entries = vec![BlocklistEntry::new("die", -5), BlocklistEntry::new("hate", -3)];
        build_filter(&entries, -4, FilterParams::new(64, 2), EmptyPolicy::Reject).unwrap().0
    }

    #[test]
    fn query_before_load_is_uninitialized() {
        let o = MembershipOracle::empty();
        assert!(!o.is_loaded());
        assert!(matches!(o.might_contain("die"), Err(WordBloomError::Uninitialized)));
        assert!(o.snapshot().is_none());
    }

    #[test]
    fn loads_once() {
        let o = MembershipOracle::empty();
        o.load(die_filter()).unwrap();
        assert!(o.might_contain("die").unwrap());
        assert!(!o.might_contain("hate").unwrap());
        assert!(matches!(o.load(die_filter()), Err(WordBloomError::AlreadyLoaded)));
    }

    #[test]
    fn failed_load_leaves_oracle_uninitialized() {
        let o = MembershipOracle::empty();
        assert!(o.load_encoded("garbage", ArtifactFormat::Framed, FilterParams::reference()).is_err());
        assert!(matches!(o.might_contain("die"), Err(WordBloomError::Uninitialized)));
        o.load_encoded(&encode(&die_filter()), ArtifactFormat::Framed, FilterParams::reference()).unwrap();
        assert!(o.might_contain("die").unwrap());
    }

    #[test]
    fn missing_artifact_is_io_error() {
        let o = MembershipOracle::empty();
        let err = o
            .load_path(Path::new("/nonexistent/bloom.txt"), ArtifactFormat::Framed, FilterParams::reference())
            .unwrap_err();
        assert!(matches!(err, WordBloomError::Io(_)));
    }

    #[test]
    fn non_utf8_artifact_is_malformed_and_leaves_oracle_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bloom.txt");
        std::fs::write(&path, [0xff, 0xfe, b'A', b'A', b'\n']).unwrap();
        let o = MembershipOracle::empty();
        let err = o.load_path(&path, ArtifactFormat::Framed, FilterParams::reference()).unwrap_err();
        assert!(matches!(err, WordBloomError::MalformedEncoding(_)));
        assert!(!o.is_loaded());
    }

    #[test]
    fn oracle_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MembershipOracle>();
        assert_send_sync::<Arc<BloomFilter>>();
    }
}
