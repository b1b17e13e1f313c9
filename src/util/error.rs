//! Error types for the CATHODE library.

use std::path::PathBuf;
use thiserror::Error;

use crate::guid::ShortGuid;

/// Main error type for archive operations.
#[derive(Error, Debug)]
pub enum Error {
    /// File does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// A read ran past the end of the stream
    #[error("Unexpected end of file at position {0}")]
    UnexpectedEof(u64),

    /// A stored word offset or record does not sit on a 4-byte boundary
    #[error("Misaligned data at position {0}")]
    Misaligned(u64),

    /// Invalid data structure in file
    #[error("Invalid file structure: {0}")]
    InvalidStructure(String),

    /// Parameter pool or variable carries a type tag we do not know
    #[error("Unknown data type: {0}")]
    UnknownDataType(ShortGuid),

    /// Resource reference carries a kind tag we do not know
    #[error("Unknown resource kind: {0}")]
    UnknownResourceKind(ShortGuid),

    /// Function entity points at neither a built-in function nor a composite
    #[error("Unknown function type {function} on entity {entity} in composite {composite}")]
    UnknownFunctionType {
        composite: ShortGuid,
        entity: ShortGuid,
        function: ShortGuid,
    },

    /// Entity id is already used inside the composite
    #[error("Duplicate entity {entity} in composite {composite}")]
    DuplicateEntity { composite: ShortGuid, entity: ShortGuid },

    /// Composite id is already used inside the archive
    #[error("Duplicate composite {0}")]
    DuplicateComposite(ShortGuid),

    /// Entity not found by id
    #[error("Entity not found: {0}")]
    EntityNotFound(ShortGuid),

    /// Composite not found by id or name
    #[error("Composite not found: {0}")]
    CompositeNotFound(String),

    /// A parameter value was not registered in the pool before emission.
    /// Always an internal bug; the encode is aborted.
    #[error("Parameter {parameter} on entity {entity} has no pooled value")]
    PoolEntryMissing { entity: ShortGuid, parameter: ShortGuid },

    /// A resource reference sits where decoding would not put it back
    #[error("Resource {resource} in composite {composite} held by {holder} would not decode to the same owner")]
    MisplacedResource {
        composite: ShortGuid,
        holder: ShortGuid,
        resource: ShortGuid,
    },

    /// Text is not an `XX-XX-XX-XX` identifier
    #[error("Invalid ShortGuid: {0}")]
    InvalidGuid(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 conversion error
    #[error("Invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an invalid structure error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidStructure(msg.into())
    }

    /// True for failures of the underlying file or stream.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::FileNotFound(_) | Self::Io(_))
    }

    /// True when the archive bytes themselves are corrupt or unsupported.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedEof(_)
                | Self::Misaligned(_)
                | Self::InvalidStructure(_)
                | Self::UnknownDataType(_)
                | Self::UnknownResourceKind(_)
                | Self::UnknownFunctionType { .. }
                | Self::DuplicateEntity { .. }
                | Self::DuplicateComposite(_)
                | Self::Utf8(_)
        )
    }
}

/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::UnexpectedEof(128);
        assert!(e.to_string().contains("128"));

        let e = Error::UnknownDataType(ShortGuid::new(0x20EE4CF2));
        assert!(e.to_string().contains("F2-4C-EE-20"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.is_io());
        assert!(!err.is_structural());
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::invalid("bad block").is_structural());
        assert!(Error::FileNotFound(PathBuf::from("commands.pak")).is_io());
        let fatal = Error::PoolEntryMissing {
            entity: ShortGuid::INVALID,
            parameter: ShortGuid::INVALID,
        };
        assert!(!fatal.is_io());
        assert!(!fatal.is_structural());
        assert!(!Error::InvalidGuid("xx".into()).is_structural());
    }
}
