//! Generation receipts
//!
//! A receipt records the SHA-256 of every document a run produced. The receipt id is
//! derived from the document digests only, so identical input gives an identical id no
//! matter when the run happened.

use super::{Materialized, OutputCollector, OutputDocument, OutputPath};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// Hash of one materialized document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDigest {
    pub path: OutputPath,
    pub sha256: String,
}

/// Provenance record of one generation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReceipt {
    pub receipt_id: String,
    pub documents: Vec<DocumentDigest>,
    pub generated_at: DateTime<Utc>,
}

impl GenerationReceipt {
    /// Build a receipt over the documents a materialize pass actually delivered.
    ///
    /// Documents the writer refused have no digest.
    pub fn from_materialized(collector: &OutputCollector, materialized: &Materialized) -> Self {
        Self::from_documents(collector.delivered(materialized))
    }

    /// Build a receipt over `documents`.
    ///
    /// When the same path appears twice only the last document is recorded, matching
    /// what a last-write-wins writer leaves behind.
    pub fn from_documents<'a, I>(documents: I) -> Self
    where
        I: IntoIterator<Item = &'a OutputDocument>,
    {
        let mut digests: Vec<DocumentDigest> = Vec::new();

        for document in documents {
            // unserializable documents were never written, so they have no digest
            let Ok(content) = document.to_json_string() else {
                continue;
            };
            let digest = DocumentDigest {
                path: document.path().clone(),
                sha256: compute_string_hash(&content),
            };
            match digests.iter_mut().find(|d| d.path == digest.path) {
                Some(existing) => *existing = digest,
                None => digests.push(digest),
            }
        }

        Self {
            receipt_id: Self::generate_receipt_id(&digests),
            documents: digests,
            generated_at: Utc::now(),
        }
    }

    /// Deterministic id over the path-sorted digests
    fn generate_receipt_id(documents: &[DocumentDigest]) -> String {
        let mut sorted: Vec<&DocumentDigest> = documents.iter().collect();
        sorted.sort_by(|a, b| a.path.cmp(&b.path));

        let mut hasher = Sha256::new();
        for digest in sorted {
            hasher.update(digest.path.to_string().as_bytes());
            hasher.update(b":");
            hasher.update(digest.sha256.as_bytes());
            hasher.update(b"\n");
        }
        format!("{:x}", hasher.finalize())
    }

    /// Verify receipt integrity
    pub fn verify(&self) -> bool {
        self.receipt_id == Self::generate_receipt_id(&self.documents)
    }

    pub fn digest_of(&self, file_name: &str) -> Option<&DocumentDigest> {
        self.documents.iter().find(|d| d.path.file_name == file_name)
    }

    /// Save receipt to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Load receipt from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Compute SHA-256 hash of string
pub fn compute_string_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::ROOT_SUB_FOLDER;
    use serde_json::json;

    fn collector_with(entries: &[(&str, i64)]) -> OutputCollector {
        let mut collector = OutputCollector::new();
        for (name, address) in entries {
            collector.add(json!({"TargetAddress": address}), *name, ROOT_SUB_FOLDER);
        }
        collector
    }

    fn receipt_for(entries: &[(&str, i64)]) -> GenerationReceipt {
        GenerationReceipt::from_documents(collector_with(entries).documents())
    }

    #[test]
    fn test_receipt_id_is_order_independent() {
        let a = receipt_for(&[("a.json", 1), ("b.json", 2)]);
        let b = receipt_for(&[("b.json", 2), ("a.json", 1)]);
        assert_eq!(a.receipt_id, b.receipt_id);
        assert!(a.verify());
    }

    #[test]
    fn test_receipt_changes_with_content() {
        let a = receipt_for(&[("a.json", 1)]);
        let b = receipt_for(&[("a.json", 2)]);
        assert_ne!(a.receipt_id, b.receipt_id);
    }

    #[test]
    fn test_duplicate_paths_keep_last_digest() {
        let receipt = receipt_for(&[("a.json", 1), ("a.json", 2)]);
        assert_eq!(receipt.documents.len(), 1);
        assert_eq!(
            receipt.digest_of("a.json").unwrap().sha256,
            compute_string_hash(r#"{"TargetAddress":2}"#)
        );
    }

    #[test]
    fn test_tampered_receipt_fails_verification() {
        let mut receipt = receipt_for(&[("a.json", 1)]);
        receipt.documents[0].sha256 = compute_string_hash("tampered");
        assert!(!receipt.verify());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipts/run.json");
        let receipt = receipt_for(&[("a.json", 1)]);

        receipt.save(&path).unwrap();
        let loaded = GenerationReceipt::load(&path).unwrap();

        assert_eq!(loaded.receipt_id, receipt.receipt_id);
        assert!(loaded.verify());
    }

    #[test]
    fn test_refused_documents_have_no_digest() {
        let collector = collector_with(&[("a.json", 1), ("b.json", 2)]);
        let materialized = Materialized {
            written: vec!["./a.json".into()],
            delivered: vec![0],
            failures: Vec::new(),
        };

        let receipt = GenerationReceipt::from_materialized(&collector, &materialized);

        assert_eq!(receipt.documents.len(), 1);
        assert!(receipt.digest_of("b.json").is_none());
        assert_eq!(receipt.receipt_id, receipt_for(&[("a.json", 1)]).receipt_id);
    }
}
