use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

use super::record::RawRecord;

/// The records of one corpus file
#[derive(Debug, Default)]
pub struct Corpus {
    pub records: Vec<RawRecord>,
    /// Entries dropped because they were not JSON objects
    pub skipped: usize,
}

/// Read a corpus file: a JSON array of heritage records
pub fn load_corpus<P: AsRef<Path>>(path: P) -> Result<Corpus> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read corpus file {}", path.display()))?;
    parse_corpus(&content).with_context(|| format!("Invalid corpus file {}", path.display()))
}

pub fn parse_corpus(json: &str) -> Result<Corpus> {
    let entries: Vec<Value> =
        serde_json::from_str(json).context("Corpus must be a JSON array of records")?;

    let mut corpus = Corpus::default();
    for (index, entry) in entries.into_iter().enumerate() {
        match RawRecord::from_value(entry) {
            Some(record) => corpus.records.push(record),
            None => {
                tracing::warn!("Skipping corpus entry {}: not a JSON object", index);
                corpus.skipped += 1;
            }
        }
    }

    Ok(corpus)
}
