//! Path Safety Guard
//!
//! Rejects file names that would escape the output sub-folder.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnsafeFileName {
    #[error("file name is empty")]
    Empty,

    #[error("file name '{name}' contains a path separator")]
    Separator { name: String },

    #[error("file name '{name}' contains a parent directory reference")]
    Traversal { name: String },

    #[error("file name '{name}' contains a NUL byte")]
    NulByte { name: String },

    #[error("file name '{name}' looks like an absolute path")]
    Absolute { name: String },
}

/// Validate that `name` is a plain file name
pub fn validate_file_name_safe(name: &str) -> Result<&str, UnsafeFileName> {
    if name.trim().is_empty() {
        return Err(UnsafeFileName::Empty);
    }

    if name.contains('\0') {
        return Err(UnsafeFileName::NulByte {
            name: name.to_string(),
        });
    }

    if name.contains("..") {
        return Err(UnsafeFileName::Traversal {
            name: name.to_string(),
        });
    }

    // Windows-style drive letters
    let mut chars = name.chars();
    if let (Some(first), Some(':')) = (chars.next(), chars.next()) {
        if first.is_ascii_alphabetic() {
            return Err(UnsafeFileName::Absolute {
                name: name.to_string(),
            });
        }
    }

    if name.contains('/') || name.contains('\\') {
        return Err(UnsafeFileName::Separator {
            name: name.to_string(),
        });
    }

    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_names_pass() {
        assert_eq!(
            validate_file_name_safe("ClusterA_config.json"),
            Ok("ClusterA_config.json")
        );
        assert!(validate_file_name_safe("dm_base_config.json").is_ok());
    }

    #[test]
    fn test_traversal_fails() {
        assert!(matches!(
            validate_file_name_safe("../etc/passwd"),
            Err(UnsafeFileName::Traversal { .. })
        ));
    }

    #[test]
    fn test_separators_fail() {
        assert!(matches!(
            validate_file_name_safe("nested/name.json"),
            Err(UnsafeFileName::Separator { .. })
        ));
        assert!(matches!(
            validate_file_name_safe("nested\\name.json"),
            Err(UnsafeFileName::Separator { .. })
        ));
    }

    #[test]
    fn test_absolute_and_empty_fail() {
        assert!(matches!(
            validate_file_name_safe("C:name.json"),
            Err(UnsafeFileName::Absolute { .. })
        ));
        assert_eq!(validate_file_name_safe("  "), Err(UnsafeFileName::Empty));
        assert!(matches!(
            validate_file_name_safe("a\0b"),
            Err(UnsafeFileName::NulByte { .. })
        ));
    }
}
