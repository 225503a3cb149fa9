//! Filter builder: selects blocklist words and sets their probe bits.
use crate::blocklist::{select, BlocklistEntry};
use crate::errors::{Result, WordBloomError};
use crate::filter::BloomFilter;
use crate::params::{optimal_num_hashes, FilterParams};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

/// What to do when the threshold selects no words.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmptyPolicy {
    /// Fail with `EmptyBlocklist`.
    #[default]
    Reject,
    /// Emit an all-zero filter that reports every word absent.
    AllowEmpty,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildReport {
    pub words_selected: usize,
    pub distinct_words: usize,
    pub bits_set: u32,
    pub fill_ratio: f64,
    pub expected_fpr: f64,
    /// k that would minimise the FPR for this many distinct words.
    pub optimal_num_hashes: u32,
}

pub struct FilterBuilder {
    filter: BloomFilter,
    inserted: usize,
    distinct: HashSet<String>,
}

impl FilterBuilder {
    pub fn new(params: FilterParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { filter: BloomFilter::empty(params), inserted: 0, distinct: HashSet::new() })
    }

    /// Set every probe bit of `word`. Inserting a word again changes nothing.
    pub fn insert(&mut self, word: &str) {
        let probes = self.filter.insert(word);
        self.inserted += 1;
        debug!(word, ?probes, "inserted");
        let key = self.filter.params().normalization.apply(word);
        if !self.distinct.contains(key.as_ref()) {
            self.distinct.insert(key.into_owned());
        }
    }

    pub fn report(&self) -> BuildReport {
        let bits = self.filter.bits();
        BuildReport {
            words_selected: self.inserted,
            distinct_words: self.distinct.len(),
            bits_set: bits.count_ones(),
            fill_ratio: bits.fill_ratio(),
            expected_fpr: self.filter.params().expected_fpr(self.distinct.len()),
            optimal_num_hashes: optimal_num_hashes(self.filter.params().bloom_size, self.distinct.len()),
        }
    }

    pub fn finish(self) -> BloomFilter { self.filter }
}

/// Select `score <= threshold` and build the filter in one pass.
pub fn build_filter(
    entries: &[BlocklistEntry],
    threshold: i64,
    params: FilterParams,
    empty: EmptyPolicy,
) -> Result<(BloomFilter, BuildReport)> {
    let words = select(entries, threshold);
    if words.is_empty() && empty == EmptyPolicy::Reject {
        return Err(WordBloomError::EmptyBlocklist);
    }
    let mut b = FilterBuilder::new(params)?;
    for w in &words {
        b.insert(w);
    }
    let report = b.report();
    info!(
        entries = entries.len(),
        selected = report.words_selected,
        bits_set = report.bits_set,
        bloom_size = params.bloom_size,
        num_hashes = params.num_hashes,
        scheme = params.scheme.name(),
        "filter built"
    );
    Ok((b.finish(), report))
}
