//! Destinations for import outcomes.
//!
//! The coordinator hands every outcome to a [`RecordSink`], in input order.
//! [`JsonLinesSink`] appends one JSON object per line to four files in an
//! output directory; [`MemorySink`] keeps everything in vectors for tests
//! and embedding.

use crate::document::Document;
use crate::error::{ErrorKind, IngestError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Upserted documents.
pub const UPSERTS_FILE: &str = "upserts.jsonl";
/// Deleted record references.
pub const DELETES_FILE: &str = "deletes.jsonl";
/// Failed records.
pub const FAILURES_FILE: &str = "failures.jsonl";
/// Fields that had no rule.
pub const MISSING_RULES_FILE: &str = "missing_rules.jsonl";
/// Deduplicated upsert index written by [`reindex`].
pub const INDEX_FILE: &str = "index.json";

/// Structured diagnostic of a failed record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    /// Provider-local identifier (`001`), when the record had one.
    pub recid: Option<String>,
    /// Failure category.
    pub kind: ErrorKind,
    /// Subfield location of field-level failures.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub subfield: Option<String>,
    /// Rendered error.
    pub message: String,
    /// The raw record as JSON.
    pub raw_snippet: serde_json::Value,
}

impl Failure {
    /// Failure of record `recid` caused by `err`.
    #[must_use]
    pub fn new(recid: Option<&str>, err: &IngestError, raw_snippet: serde_json::Value) -> Self {
        Failure {
            recid: recid.map(str::to_string),
            kind: err.kind(),
            subfield: err.subfield().map(str::to_string),
            message: err.to_string(),
            raw_snippet,
        }
    }
}

/// Consumer of import outcomes.
pub trait RecordSink: Send {
    /// Create or replace the document keyed by `(provider, provider_recid)`.
    ///
    /// # Errors
    ///
    /// Any failure of the underlying store.
    fn upsert(&mut self, document: &Document) -> Result<()>;

    /// Remove a record of an allowlisted provider.
    ///
    /// # Errors
    ///
    /// Any failure of the underlying store.
    fn delete(&mut self, provider: &str, provider_recid: &str) -> Result<()>;

    /// Append to the failure log.
    ///
    /// # Errors
    ///
    /// Any failure of the underlying store.
    fn record_failure(&mut self, failure: &Failure) -> Result<()>;

    /// Count a field key that had no rule in `model`.
    ///
    /// # Errors
    ///
    /// Any failure of the underlying store.
    fn missing_rule(&mut self, model: &str, key: &str) -> Result<()>;

    /// Flush buffered output.
    ///
    /// # Errors
    ///
    /// Any failure of the underlying store.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// In-memory sink.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    /// Upserted documents.
    pub upserts: Vec<Document>,
    /// `(provider, provider_recid)` pairs.
    pub deletes: Vec<(String, String)>,
    /// Failure log.
    pub failures: Vec<Failure>,
    /// `(model, key)` pairs.
    pub missing_rules: Vec<(String, String)>,
}

impl MemorySink {
    /// Empty sink.
    #[must_use]
    pub fn new() -> Self {
        MemorySink::default()
    }
}

impl RecordSink for MemorySink {
    fn upsert(&mut self, document: &Document) -> Result<()> {
        self.upserts.push(document.clone());
        Ok(())
    }

    fn delete(&mut self, provider: &str, provider_recid: &str) -> Result<()> {
        self.deletes
            .push((provider.to_string(), provider_recid.to_string()));
        Ok(())
    }

    fn record_failure(&mut self, failure: &Failure) -> Result<()> {
        self.failures.push(failure.clone());
        Ok(())
    }

    fn missing_rule(&mut self, model: &str, key: &str) -> Result<()> {
        self.missing_rules.push((model.to_string(), key.to_string()));
        Ok(())
    }
}

/// Sink writing JSON lines into an output directory.
#[derive(Debug)]
pub struct JsonLinesSink {
    dir: PathBuf,
    upserts: BufWriter<File>,
    deletes: BufWriter<File>,
    failures: BufWriter<File>,
    missing_rules: BufWriter<File>,
}

fn append(path: &Path) -> Result<BufWriter<File>> {
    let file = fs::OpenOptions::new().create(true).append(true).open(path)?;
    Ok(BufWriter::new(file))
}

fn write_line<W: Write>(writer: &mut W, value: &impl Serialize) -> Result<()> {
    serde_json::to_writer(&mut *writer, value)?;
    writer.write_all(b"\n")?;
    Ok(())
}

impl JsonLinesSink {
    /// Open the four logs in `dir`, creating it if needed. Existing logs are
    /// appended to.
    ///
    /// # Errors
    ///
    /// `Io` when the directory or a file cannot be created.
    pub fn create(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(JsonLinesSink {
            upserts: append(&dir.join(UPSERTS_FILE))?,
            deletes: append(&dir.join(DELETES_FILE))?,
            failures: append(&dir.join(FAILURES_FILE))?,
            missing_rules: append(&dir.join(MISSING_RULES_FILE))?,
            dir,
        })
    }

    /// Output directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl RecordSink for JsonLinesSink {
    fn upsert(&mut self, document: &Document) -> Result<()> {
        write_line(&mut self.upserts, document)
    }

    fn delete(&mut self, provider: &str, provider_recid: &str) -> Result<()> {
        write_line(
            &mut self.deletes,
            &json!({ "provider": provider, "provider_recid": provider_recid }),
        )
    }

    fn record_failure(&mut self, failure: &Failure) -> Result<()> {
        write_line(&mut self.failures, failure)
    }

    fn missing_rule(&mut self, model: &str, key: &str) -> Result<()> {
        write_line(&mut self.missing_rules, &json!({ "model": model, "key": key }))
    }

    fn flush(&mut self) -> Result<()> {
        self.upserts.flush()?;
        self.deletes.flush()?;
        self.failures.flush()?;
        self.missing_rules.flush()?;
        Ok(())
    }
}

impl Drop for JsonLinesSink {
    fn drop(&mut self) {
        if let Err(err) = RecordSink::flush(self) {
            log::error!("failed to flush {}: {err}", self.dir.display());
        }
    }
}

/// Rebuild `index.json` from the upsert log of `dir`.
///
/// Documents are keyed by `(provider, provider_recid)`; a later upsert of
/// the same key replaces the earlier one but keeps its position. Returns the
/// number of indexed documents.
///
/// # Errors
///
/// `Io` when the log cannot be read or the index written, `Json` on a
/// corrupt log line.
pub fn reindex(dir: impl AsRef<Path>) -> Result<usize> {
    let dir = dir.as_ref();
    let log_path = dir.join(UPSERTS_FILE);
    let mut index: IndexMap<(String, String), serde_json::Value> = IndexMap::new();
    if log_path.exists() {
        for line in BufReader::new(File::open(&log_path)?).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let document: serde_json::Value = serde_json::from_str(&line)?;
            let key_part = |name: &str| {
                document
                    .get(name)
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            };
            let key = (key_part("provider"), key_part("provider_recid"));
            index.insert(key, document);
        }
    }
    let documents: Vec<serde_json::Value> = index.into_values().collect();
    let mut writer = BufWriter::new(File::create(dir.join(INDEX_FILE))?);
    serde_json::to_writer_pretty(&mut writer, &documents)?;
    writer.flush()?;
    log::info!("indexed {} documents in {}", documents.len(), dir.display());
    Ok(documents.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn document(provider: &str, recid: &str, title: &str) -> Document {
        Document {
            provider: Some(provider.into()),
            provider_recid: Some(recid.into()),
            title: Some(title.into()),
            ..Document::default()
        }
    }

    #[test]
    fn test_memory_sink_collects() {
        let mut sink = MemorySink::new();
        sink.upsert(&document("cds", "1", "A")).unwrap();
        sink.delete("ebl", "EBC2").unwrap();
        sink.missing_rule("cds.book", "999__").unwrap();
        assert_eq!(sink.upserts.len(), 1);
        assert_eq!(sink.deletes, vec![("ebl".to_string(), "EBC2".to_string())]);
        assert_eq!(sink.missing_rules[0].1, "999__");
    }

    #[test]
    fn test_json_lines_and_reindex() {
        let tmp = TempDir::new().unwrap();
        {
            let mut sink = JsonLinesSink::create(tmp.path()).unwrap();
            sink.upsert(&document("cds", "1", "First")).unwrap();
            sink.upsert(&document("cds", "2", "Second")).unwrap();
            sink.upsert(&document("cds", "1", "First, revised")).unwrap();
            sink.upsert(&document("ebl", "1", "Other provider")).unwrap();
            let failure = Failure::new(
                Some("3"),
                &IngestError::RecordModelMissing,
                serde_json::Value::Null,
            );
            sink.record_failure(&failure).unwrap();
        }

        let failures = fs::read_to_string(tmp.path().join(FAILURES_FILE)).unwrap();
        let line: serde_json::Value = serde_json::from_str(failures.trim()).unwrap();
        assert_eq!(line["kind"], "RECORD_MODEL_MISSING");
        assert_eq!(line["recid"], "3");

        assert_eq!(reindex(tmp.path()).unwrap(), 3);
        let index: Vec<serde_json::Value> =
            serde_json::from_str(&fs::read_to_string(tmp.path().join(INDEX_FILE)).unwrap()).unwrap();
        assert_eq!(index[0]["title"], "First, revised");
        assert_eq!(index[1]["provider_recid"], "2");
        assert_eq!(index[2]["provider"], "ebl");
    }

    #[test]
    fn test_reindex_without_log() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(reindex(tmp.path()).unwrap(), 0);
        assert!(tmp.path().join(INDEX_FILE).exists());
    }
}
