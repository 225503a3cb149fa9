use crate::builder::EmptyPolicy;
use crate::codec::ArtifactFormat;
use crate::consts::DEFAULT_THRESHOLD;
use crate::errors::Result;
use crate::params::FilterParams;
use crate::utils::write_atomic;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Builder settings, loadable from JSON. Missing keys take reference defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub threshold: i64,
    pub params: FilterParams,
    pub empty_policy: EmptyPolicy,
    pub format: ArtifactFormat,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            params: FilterParams::reference(),
            empty_policy: EmptyPolicy::Reject,
            format: ArtifactFormat::Framed,
        }
    }
}

impl BuildConfig {
    /// Read `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let s = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&s)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_atomic(path, serde_json::to_string_pretty(self)?.as_bytes())
    }
}
