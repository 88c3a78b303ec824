//! Tab-separated pattern file store.
//!
//! CTG translation-pattern files are UTF-16 text: one record per line, fields
//! separated by tabs, no header row. `parse` and `save` use the same encoding
//! so an annotated file round-trips through the tools that produced the input.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

/// Minimum tab-separated fields a line must carry to form a record.
const MIN_FIELDS: usize = 4;

/// UTF-16 byte-order marks.
const BOM_LE: [u8; 2] = [0xFF, 0xFE];
const BOM_BE: [u8; 2] = [0xFE, 0xFF];

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Not valid UTF-16: {0}")]
    Encoding(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One parsed line of a pattern file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternRecord {
    /// The regular expression to be explained.
    pub source_pattern: String,
    pub target_pattern: String,
    pub description: String,
    pub flags: String,
    /// Set exactly once by the annotation pipeline; `None` until then.
    pub explanation: Option<String>,
}

/// Summary statistics over a parsed record sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternStats {
    pub total_patterns: usize,
    pub unique_flags: usize,
}

/// Parse a pattern file into records, in file order.
///
/// Blank lines are dropped silently. Lines with fewer than four fields are
/// skipped with a warning; fields beyond the fourth are ignored.
pub fn parse(path: &Path) -> Result<Vec<PatternRecord>, StoreError> {
    if !path.exists() {
        return Err(StoreError::FileNotFound(path.to_path_buf()));
    }

    let bytes = fs::read(path)?;
    let text = decode_utf16(&bytes)?;

    let mut records = Vec::new();
    for (idx, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < MIN_FIELDS {
            warn!(
                line = idx + 1,
                fields = fields.len(),
                "Skipping malformed line"
            );
            continue;
        }

        records.push(PatternRecord {
            source_pattern: fields[0].to_string(),
            target_pattern: fields[1].to_string(),
            description: fields[2].to_string(),
            flags: fields[3].to_string(),
            explanation: None,
        });
    }

    Ok(records)
}

/// Serialize records back to disk, creating missing parent directories.
///
/// Column order is `source_pattern, target_pattern, description, flags`; an
/// `explanation` column is appended only when at least one record carries one
/// (records without one get an empty trailing field). No header row.
/// Overwrites the destination.
pub fn save(records: &[PatternRecord], path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let with_explanations = records.iter().any(|r| r.explanation.is_some());

    let mut content = String::new();
    for record in records {
        content.push_str(&record.source_pattern);
        content.push('\t');
        content.push_str(&record.target_pattern);
        content.push('\t');
        content.push_str(&record.description);
        content.push('\t');
        content.push_str(&record.flags);
        if with_explanations {
            content.push('\t');
            content.push_str(record.explanation.as_deref().unwrap_or(""));
        }
        content.push('\n');
    }

    fs::write(path, encode_utf16_le(&content))?;
    Ok(())
}

/// Summarize a parsed record sequence.
pub fn stats(records: &[PatternRecord]) -> PatternStats {
    let unique_flags: HashSet<&str> = records.iter().map(|r| r.flags.as_str()).collect();
    PatternStats {
        total_patterns: records.len(),
        unique_flags: unique_flags.len(),
    }
}

/// Decode UTF-16 bytes, honoring a BOM when present.
/// Without a BOM the bytes are taken as little-endian, matching the Windows
/// tooling that produces these files.
fn decode_utf16(bytes: &[u8]) -> Result<String, StoreError> {
    let (body, big_endian) = if bytes.starts_with(&BOM_BE) {
        (&bytes[2..], true)
    } else if bytes.starts_with(&BOM_LE) {
        (&bytes[2..], false)
    } else {
        (bytes, false)
    };

    if body.len() % 2 != 0 {
        return Err(StoreError::Encoding(
            "odd number of bytes for 16-bit code units".to_string(),
        ));
    }

    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|pair| {
            let pair = [pair[0], pair[1]];
            if big_endian {
                u16::from_be_bytes(pair)
            } else {
                u16::from_le_bytes(pair)
            }
        })
        .collect();

    String::from_utf16(&units).map_err(|e| StoreError::Encoding(e.to_string()))
}

/// Encode text as UTF-16 LE with a leading BOM.
fn encode_utf16_le(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(2 + text.len() * 2);
    bytes.extend_from_slice(&BOM_LE);
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    bytes
}
