//! Per-unit suppression on top of the membership oracle.
//!
//! A unit (sentence, line) is split on whitespace; if any word is possibly
//! present in the filter the whole unit is dropped, otherwise it passes
//! through unchanged.
use crate::errors::{Result, WordBloomError};
use crate::oracle::MembershipOracle;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Behaviour while no filter is loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoadFailurePolicy {
    /// Surface `Uninitialized`; the consumer must not start.
    #[default]
    RefuseToStart,
    /// Fail closed: every unit is suppressed.
    SuppressAll,
}

#[derive(Debug, Default)]
pub struct FilterStats {
    seen: AtomicU64,
    accepted: AtomicU64,
    suppressed: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub seen: u64,
    pub accepted: u64,
    pub suppressed: u64,
}

impl FilterStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            seen: self.seen.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            suppressed: self.suppressed.load(Ordering::Relaxed),
        }
    }
}

pub struct StreamFilter {
    oracle: Arc<MembershipOracle>,
    policy: LoadFailurePolicy,
    stats: FilterStats,
}

impl StreamFilter {
    pub fn new(oracle: Arc<MembershipOracle>, policy: LoadFailurePolicy) -> Self {
        Self { oracle, policy, stats: FilterStats::default() }
    }

    pub fn oracle(&self) -> &MembershipOracle { &self.oracle }

    pub fn policy(&self) -> LoadFailurePolicy { self.policy }

    pub fn stats(&self) -> StatsSnapshot { self.stats.snapshot() }

    /// First word of `unit` the filter flags, if any.
    pub fn first_blocked_word<'a>(&self, unit: &'a str) -> Result<Option<&'a str>> {
        let filter = self.oracle.filter()?;
        Ok(unit.split_whitespace().find(|w| filter.might_contain(w)))
    }

    /// `Some(unit)` unchanged when clean, `None` when suppressed.
    pub fn admit<'a>(&self, unit: &'a str) -> Result<Option<&'a str>> {
        let blocked = match self.first_blocked_word(unit) {
            Ok(hit) => hit.is_some(),
            Err(WordBloomError::Uninitialized) if self.policy == LoadFailurePolicy::SuppressAll => true,
            Err(e) => return Err(e),
        };
        self.stats.seen.fetch_add(1, Ordering::Relaxed);
        if blocked {
            self.stats.suppressed.fetch_add(1, Ordering::Relaxed);
            Ok(None)
        } else {
            self.stats.accepted.fetch_add(1, Ordering::Relaxed);
            Ok(Some(unit))
        }
    }
}
