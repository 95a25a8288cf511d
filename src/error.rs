//! Error types for dxfdom

use std::io;
use thiserror::Error;

/// Main error type for dxfdom operations
#[derive(Debug, Error)]
pub enum DxfError {
    /// IO error occurred during file operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error parsing the DXF tag stream
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Stream does not start with a recognizable DXF header
    #[error("Invalid file header: {0}")]
    InvalidHeader(String),

    /// The requested dialect version cannot be written
    #[error("Unsupported DXF version: {0}")]
    UnsupportedVersion(String),

    /// Group code outside the ranges defined by the format
    #[error("Invalid group code: {0}")]
    InvalidCode(i32),

    /// Text could not be decoded with the file's code page
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// A distinct object with this name already exists in the registry
    #[error("Duplicate name: '{0}'")]
    DuplicateName(String),

    /// Built-in table entries cannot be renamed or removed
    #[error("'{0}' is reserved and cannot be modified")]
    ReservedName(String),

    /// The entry is still referenced by other objects
    #[error("'{name}' is in use by {count} object(s) and cannot be removed")]
    InUse { name: String, count: usize },

    /// The entity already belongs to another block
    #[error("Entity is already owned by block '{0}'")]
    AlreadyOwned(String),

    /// The entity does not belong to the block the operation went through
    #[error("Entity {handle:#X} is not owned by block '{block}'")]
    OwnershipMismatch { handle: u64, block: String },

    /// An attribute definition with this tag already exists in the block
    #[error("Duplicate attribute tag: '{0}'")]
    DuplicateTag(String),

    /// A hatch boundary references an entity owned by a different block
    #[error("Boundary entity {handle:#X} belongs to block '{block}'")]
    CrossBlockBoundary { handle: u64, block: String },

    /// Object not found in the document
    #[error("Object not found: handle {0:#X}")]
    ObjectNotFound(u64),

    /// Named object not found in the document
    #[error("Name not found: '{0}'")]
    NameNotFound(String),
}

/// Result type alias for dxfdom operations
pub type Result<T> = std::result::Result<T, DxfError>;

impl DxfError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        DxfError::Parse {
            line,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_use_display() {
        let err = DxfError::InUse {
            name: "L1".to_string(),
            count: 3,
        };
        assert_eq!(
            err.to_string(),
            "'L1' is in use by 3 object(s) and cannot be removed"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let dxf_err: DxfError = io_err.into();
        assert!(matches!(dxf_err, DxfError::Io(_)));
    }

    #[test]
    fn test_parse_error_carries_line() {
        let err = DxfError::parse(42, "bad code");
        assert!(err.to_string().contains("line 42"));
    }
}
