//! Document source feeds.
//!
//! A [`DocumentSource`] is restartable: every rebuild calls
//! [`DocumentSource::records`] again and walks the whole collection forward.
//!
//! Items of the returned iterator follow one convention:
//!
//! - `Ok(record)` – a record to validate and index.
//! - `Err(LoupeError::MalformedDocument(_))` – an unreadable record; the
//!   writer skips it.
//! - any other `Err` – the feed itself failed; the rebuild is aborted.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::document::document::SourceRecord;
use crate::error::{LoupeError, Result};

/// Iterator over source records.
pub type RecordIter<'a> = Box<dyn Iterator<Item = Result<SourceRecord>> + Send + 'a>;

/// A restartable supplier of source records.
pub trait DocumentSource: Send + Sync {
    /// Start a new forward pass over the collection.
    fn records(&self) -> Result<RecordIter<'_>>;

    /// Human-readable description for logs.
    fn describe(&self) -> String;
}

/// An in-memory source.
#[derive(Clone, Debug, Default)]
pub struct VecSource {
    records: Vec<SourceRecord>,
}

impl VecSource {
    /// Create a source over the given records.
    pub fn new(records: Vec<SourceRecord>) -> Self {
        VecSource { records }
    }

    /// Append a record.
    pub fn push(&mut self, record: SourceRecord) {
        self.records.push(record);
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the source is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<SourceRecord> for VecSource {
    fn from_iter<I: IntoIterator<Item = SourceRecord>>(iter: I) -> Self {
        VecSource::new(iter.into_iter().collect())
    }
}

impl DocumentSource for VecSource {
    fn records(&self) -> Result<RecordIter<'_>> {
        Ok(Box::new(self.records.iter().cloned().map(Ok)))
    }

    fn describe(&self) -> String {
        format!("memory ({} records)", self.records.len())
    }
}

/// A JSON Lines file: one `{"url", "title", "time"}` object per line.
///
/// Blank lines are ignored. A line that is not a valid record is reported as
/// a malformed document; a read error is a feed failure.
#[derive(Clone, Debug)]
pub struct JsonlSource {
    path: PathBuf,
}

impl JsonlSource {
    /// Create a source reading the given file.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        JsonlSource {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentSource for JsonlSource {
    fn records(&self) -> Result<RecordIter<'_>> {
        let file = File::open(&self.path).map_err(|e| {
            LoupeError::source_feed(format!("cannot open {}: {e}", self.path.display()))
        })?;
        let reader = BufReader::new(file);

        let iter = reader
            .split(b'\n')
            .enumerate()
            .filter_map(move |(line_num, line)| {
                let line_num = line_num + 1;
                match line {
                    Ok(bytes) => parse_line(&bytes, line_num),
                    Err(e) => Some(Err(LoupeError::source_feed(format!(
                        "read error at line {line_num}: {e}"
                    )))),
                }
            });

        Ok(Box::new(iter))
    }

    fn describe(&self) -> String {
        format!("jsonl {}", self.path.display())
    }
}

/// Decode one raw line; `None` for blank lines.
fn parse_line(bytes: &[u8], line_num: usize) -> Option<Result<SourceRecord>> {
    let line = match std::str::from_utf8(bytes) {
        Ok(line) => line,
        Err(e) => {
            return Some(Err(LoupeError::malformed_document(format!(
                "line {line_num}: {e}"
            ))));
        }
    };
    if line.trim().is_empty() {
        return None;
    }
    Some(
        serde_json::from_str::<SourceRecord>(line)
            .map_err(|e| LoupeError::malformed_document(format!("line {line_num}: {e}"))),
    )
}
