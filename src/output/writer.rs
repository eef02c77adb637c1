//! Document writers
//!
//! [`DocumentWriter`] is the boundary to persistence. Two implementations ship with the crate:
//! - **FileSystemWriter**: atomic writes below an output root, optional backups
//! - **MemoryWriter**: records every request; used for dry runs and tests

use anyhow::{Result, anyhow};
use indexmap::IndexMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Persists `(content, file_name, sub_folder)` triples
pub trait DocumentWriter {
    /// Write one document and return where it ended up
    fn write(&mut self, content: &str, file_name: &str, sub_folder: &str) -> Result<PathBuf>;
}

// =============================================================================
// FileSystemWriter
// =============================================================================

/// Safe file writer with atomic operations
#[derive(Debug, Clone)]
pub struct FileSystemWriter {
    root: PathBuf,
    /// Copy an existing file to `<name>.bak` before overwriting it
    pub create_backups: bool,
}

impl FileSystemWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            create_backups: false,
        }
    }

    pub fn with_backups(mut self, create_backups: bool) -> Self {
        self.create_backups = create_backups;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, file_name: &str, sub_folder: &str) -> Result<PathBuf> {
        for part in [file_name, sub_folder] {
            if part.contains("..") || part.contains('\0') {
                return Err(anyhow!("Path traversal detected: {:?}", part));
            }
        }
        if Path::new(sub_folder).is_absolute() {
            return Err(anyhow!("Sub-folder must be relative: {:?}", sub_folder));
        }

        Ok(self.root.join(sub_folder).join(file_name))
    }

    fn check_permissions(&self, path: &Path) -> Result<()> {
        if path.exists() {
            let metadata = fs::metadata(path)?;
            if metadata.permissions().readonly() {
                return Err(anyhow!("File is read-only: {:?}", path));
            }
        }
        Ok(())
    }

    fn create_backup(&self, path: &Path) -> Result<PathBuf> {
        let file_name = path
            .file_name()
            .ok_or_else(|| anyhow!("Invalid file name"))?;
        let backup_path = path.with_file_name(format!("{}.bak", file_name.to_string_lossy()));

        fs::copy(path, &backup_path)?;
        tracing::debug!("Created backup: {:?}", backup_path);
        Ok(backup_path)
    }

    fn atomic_write(&self, path: &Path, content: &str) -> Result<()> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let mut temp_file = NamedTempFile::new_in(parent)?;
        temp_file.write_all(content.as_bytes())?;
        temp_file.flush()?;
        temp_file.persist(path)?;

        Ok(())
    }
}

impl DocumentWriter for FileSystemWriter {
    fn write(&mut self, content: &str, file_name: &str, sub_folder: &str) -> Result<PathBuf> {
        let path = self.resolve(file_name, sub_folder)?;

        self.check_permissions(&path)?;

        if self.create_backups && path.exists() {
            self.create_backup(&path)?;
        }

        self.atomic_write(&path, content)?;
        Ok(path)
    }
}

// =============================================================================
// MemoryWriter
// =============================================================================

/// One recorded write request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRequest {
    pub file_name: String,
    pub sub_folder: String,
    pub content: String,
}

/// Writer that keeps everything in memory. Later writes to the same path win.
#[derive(Debug, Default)]
pub struct MemoryWriter {
    requests: Vec<WriteRequest>,
    files: IndexMap<PathBuf, String>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request, in arrival order
    pub fn requests(&self) -> &[WriteRequest] {
        &self.requests
    }

    /// Final content per path, in first-write order
    pub fn files(&self) -> &IndexMap<PathBuf, String> {
        &self.files
    }

    /// Final content of a file in the root sub-folder
    pub fn content_of(&self, file_name: &str) -> Option<&str> {
        self.files
            .get(&Path::new(super::ROOT_SUB_FOLDER).join(file_name))
            .map(String::as_str)
    }
}

impl DocumentWriter for MemoryWriter {
    fn write(&mut self, content: &str, file_name: &str, sub_folder: &str) -> Result<PathBuf> {
        let path = Path::new(sub_folder).join(file_name);
        self.requests.push(WriteRequest {
            file_name: file_name.to_string(),
            sub_folder: sub_folder.to_string(),
            content: content.to_string(),
        });
        self.files.insert(path.clone(), content.to_string());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filesystem_writer_writes_below_root() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = FileSystemWriter::new(dir.path());

        let path = writer
            .write(r#"{"TargetAddress":4660}"#, "ClusterA_config.json", ".")
            .unwrap();

        assert!(path.starts_with(dir.path()));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            r#"{"TargetAddress":4660}"#
        );
    }

    #[test]
    fn test_filesystem_writer_creates_sub_folders() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = FileSystemWriter::new(dir.path());

        let path = writer.write("{}", "x.json", "nested/deeper").unwrap();

        assert_eq!(path, dir.path().join("nested/deeper").join("x.json"));
        assert!(path.exists());
    }

    #[test]
    fn test_filesystem_writer_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = FileSystemWriter::new(dir.path());

        assert!(writer.write("{}", "../escape.json", ".").is_err());
        assert!(writer.write("{}", "x.json", "../outside").is_err());
    }

    #[test]
    fn test_filesystem_writer_backup() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = FileSystemWriter::new(dir.path()).with_backups(true);

        writer.write("old", "x.json", ".").unwrap();
        writer.write("new", "x.json", ".").unwrap();

        let target = dir.path().join("./x.json");
        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
        assert_eq!(
            fs::read_to_string(dir.path().join("x.json.bak")).unwrap(),
            "old"
        );
    }

    #[test]
    fn test_memory_writer_last_write_wins() {
        let mut writer = MemoryWriter::new();
        writer.write("1", "a.json", ".").unwrap();
        writer.write("2", "b.json", ".").unwrap();
        writer.write("3", "a.json", ".").unwrap();

        assert_eq!(writer.requests().len(), 3);
        assert_eq!(writer.files().len(), 2);
        assert_eq!(writer.content_of("a.json"), Some("3"));
        assert_eq!(writer.content_of("b.json"), Some("2"));
    }
}
