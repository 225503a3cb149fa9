//! Blocklist parser: one `word<TAB>score` pair per line.
//!
//! ```text
//! abandon	-2
//! can't stand	-3
//! die	-3
//! ```
//!
//! Words are kept verbatim. Scores must parse as signed integers.
use crate::errors::{Result, WordBloomError};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlocklistEntry {
    pub word: String,
    pub score: i64,
}

impl BlocklistEntry {
    pub fn new(word: impl Into<String>, score: i64) -> Self {
        Self { word: word.into(), score }
    }
}

/// Parse one line (1-based `line` for error reporting). `None` for blank lines.
pub fn parse_line(raw: &str, line: usize) -> Result<Option<BlocklistEntry>> {
    let raw = raw.strip_suffix('\r').unwrap_or(raw);
    if raw.trim().is_empty() {
        return Ok(None);
    }
    let (word, score) = raw.split_once('\t').ok_or_else(|| WordBloomError::InvalidInput {
        line,
        reason: "missing tab separator".into(),
    })?;
    let score = score.trim().parse::<i64>().map_err(|e| WordBloomError::InvalidInput {
        line,
        reason: format!("score {:?} is not an integer: {e}", score.trim()),
    })?;
    Ok(Some(BlocklistEntry { word: word.to_string(), score }))
}

pub fn parse_blocklist(content: &str) -> Result<Vec<BlocklistEntry>> {
    let mut out = Vec::new();
    for (i, raw) in content.lines().enumerate() {
        if let Some(e) = parse_line(raw, i + 1)? {
            out.push(e);
        }
    }
    Ok(out)
}

pub fn read_blocklist<R: BufRead>(reader: R) -> Result<Vec<BlocklistEntry>> {
    let mut out = Vec::new();
    for (i, raw) in reader.lines().enumerate() {
        if let Some(e) = parse_line(&raw?, i + 1)? {
            out.push(e);
        }
    }
    Ok(out)
}

pub fn load_blocklist(path: &Path) -> Result<Vec<BlocklistEntry>> {
    read_blocklist(BufReader::new(File::open(path)?))
}

/// Words whose score is at or below `threshold`, in input order.
pub fn select(entries: &[BlocklistEntry], threshold: i64) -> Vec<&str> {
    entries.iter().filter(|e| e.score <= threshold).map(|e| e.word.as_str()).collect()
}
