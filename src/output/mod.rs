//! Output collection
//!
//! Rendered documents are not written while models generate. They are appended to an
//! [`OutputCollector`] and materialized in one pass at the end of Generate:
//!
//! ```text
//! model.generate() → collector.add() ... → collector.materialize(writer) → DocumentWriter
//! ```
//!
//! The collector never reorders, transforms or deduplicates documents.

pub mod receipt;
pub mod writer;

pub use receipt::{DocumentDigest, GenerationReceipt};
pub use writer::{DocumentWriter, FileSystemWriter, MemoryWriter, WriteRequest};

use crate::error::GenerationError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

/// Sub-folder every document of a run lands in, relative to the output root
pub const ROOT_SUB_FOLDER: &str = ".";

/// Logical location of a document: a file name inside a sub-folder of the output root
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OutputPath {
    pub sub_folder: String,
    pub file_name: String,
}

impl OutputPath {
    pub fn new(sub_folder: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            sub_folder: sub_folder.into(),
            file_name: file_name.into(),
        }
    }

    /// Path relative to the output root
    pub fn relative(&self) -> PathBuf {
        Path::new(&self.sub_folder).join(&self.file_name)
    }
}

impl fmt::Display for OutputPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.sub_folder, self.file_name)
    }
}

/// A rendered JSON document with its destination. Key order is preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputDocument {
    content: Value,
    path: OutputPath,
}

impl OutputDocument {
    pub fn new(content: Value, path: OutputPath) -> Self {
        Self { content, path }
    }

    pub fn content(&self) -> &Value {
        &self.content
    }

    pub fn path(&self) -> &OutputPath {
        &self.path
    }

    /// Compact JSON text, exactly as written to disk
    pub fn to_json_string(&self) -> Result<String, GenerationError> {
        serde_json::to_string(&self.content).map_err(|source| GenerationError::Serialization {
            path: self.path.to_string(),
            source,
        })
    }
}

/// Result of replaying the collected documents into a writer
#[derive(Debug, Default)]
pub struct Materialized {
    pub written: Vec<PathBuf>,
    /// Collector positions of the documents the writer accepted, in write order
    pub delivered: Vec<usize>,
    pub failures: Vec<GenerationError>,
}

impl Materialized {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Accumulates documents for a single run
#[derive(Debug, Default)]
pub struct OutputCollector {
    documents: Vec<OutputDocument>,
}

impl OutputCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a document; duplicates are kept as separate entries
    pub fn add(
        &mut self,
        document: Value,
        file_name: impl Into<String>,
        sub_folder: impl Into<String>,
    ) {
        let path = OutputPath::new(sub_folder, file_name);
        tracing::trace!(path = %path, "collected document");
        self.documents.push(OutputDocument::new(document, path));
    }

    pub fn documents(&self) -> &[OutputDocument] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Documents the writer accepted during `materialized`
    pub fn delivered<'a>(
        &'a self,
        materialized: &'a Materialized,
    ) -> impl Iterator<Item = &'a OutputDocument> {
        materialized
            .delivered
            .iter()
            .filter_map(|&index| self.documents.get(index))
    }

    /// Replay every document, in the order added, to `writer`.
    ///
    /// A failed write does not stop the remaining ones. Calling this twice sends the
    /// same documents twice.
    pub fn materialize(&self, writer: &mut dyn DocumentWriter) -> Materialized {
        let mut result = Materialized::default();

        for (index, document) in self.documents.iter().enumerate() {
            let path = document.path();
            let content = match document.to_json_string() {
                Ok(content) => content,
                Err(error) => {
                    result.failures.push(error);
                    continue;
                }
            };

            match writer.write(&content, &path.file_name, &path.sub_folder) {
                Ok(written) => {
                    tracing::debug!(path = %written.display(), "materialized document");
                    result.written.push(written);
                    result.delivered.push(index);
                }
                Err(error) => {
                    tracing::warn!(path = %path, error = %error, "document write failed");
                    result.failures.push(GenerationError::Write {
                        path: path.to_string(),
                        reason: format!("{error:#}"),
                    });
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_preserves_order_and_duplicates() {
        let mut collector = OutputCollector::new();
        collector.add(json!({"TargetAddress": 1}), "a_config.json", ROOT_SUB_FOLDER);
        collector.add(json!({"TargetAddress": 2}), "b_config.json", ROOT_SUB_FOLDER);
        collector.add(json!({"TargetAddress": 3}), "a_config.json", ROOT_SUB_FOLDER);

        let names: Vec<_> = collector
            .documents()
            .iter()
            .map(|d| d.path().file_name.as_str())
            .collect();
        assert_eq!(names, ["a_config.json", "b_config.json", "a_config.json"]);
    }

    #[test]
    fn test_materialize_replays_in_order() {
        let mut collector = OutputCollector::new();
        collector.add(json!({"TargetAddress": 1}), "a_config.json", ROOT_SUB_FOLDER);
        collector.add(json!({"TargetAddress": 2}), "a_config.json", ROOT_SUB_FOLDER);

        let mut writer = MemoryWriter::new();
        let result = collector.materialize(&mut writer);

        assert!(result.is_complete());
        assert_eq!(writer.requests().len(), 2);
        assert_eq!(
            writer.content_of("a_config.json"),
            Some(r#"{"TargetAddress":2}"#)
        );
    }

    #[test]
    fn test_materialize_tracks_delivered_documents() {
        struct RejectB(MemoryWriter);
        impl DocumentWriter for RejectB {
            fn write(
                &mut self,
                content: &str,
                file_name: &str,
                sub_folder: &str,
            ) -> anyhow::Result<PathBuf> {
                anyhow::ensure!(!file_name.starts_with('b'), "read-only");
                self.0.write(content, file_name, sub_folder)
            }
        }

        let mut collector = OutputCollector::new();
        collector.add(json!({"TargetAddress": 1}), "a_config.json", ROOT_SUB_FOLDER);
        collector.add(json!({"TargetAddress": 2}), "b_config.json", ROOT_SUB_FOLDER);
        collector.add(json!({"TargetAddress": 3}), "c_config.json", ROOT_SUB_FOLDER);

        let mut writer = RejectB(MemoryWriter::new());
        let result = collector.materialize(&mut writer);

        assert_eq!(result.delivered, [0, 2]);
        assert_eq!(result.failures.len(), 1);
        let delivered: Vec<_> = collector
            .delivered(&result)
            .map(|d| d.path().file_name.as_str())
            .collect();
        assert_eq!(delivered, ["a_config.json", "c_config.json"]);
    }

    #[test]
    fn test_materialize_twice_resends() {
        let mut collector = OutputCollector::new();
        collector.add(json!({"TargetAddress": 1}), "a_config.json", ROOT_SUB_FOLDER);

        let mut writer = MemoryWriter::new();
        collector.materialize(&mut writer);
        collector.materialize(&mut writer);

        assert_eq!(writer.requests().len(), 2);
        assert_eq!(writer.files().len(), 1);
    }

    #[test]
    fn test_key_order_is_preserved() {
        let document = OutputDocument::new(
            json!({"Zeta": 1, "Alpha": {"Beta": 2}}),
            OutputPath::new(ROOT_SUB_FOLDER, "x.json"),
        );
        assert_eq!(
            document.to_json_string().unwrap(),
            r#"{"Zeta":1,"Alpha":{"Beta":2}}"#
        );
    }

    #[test]
    fn test_output_path_relative() {
        let path = OutputPath::new(ROOT_SUB_FOLDER, "dm_base_config.json");
        assert_eq!(path.relative(), PathBuf::from("./dm_base_config.json"));
        assert_eq!(path.to_string(), "./dm_base_config.json");
    }
}
