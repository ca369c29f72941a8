//! VFS error types.

use std::io;
use thiserror::Error;
use urifs_glob::PatternError;

/// VFS error type.
#[derive(Debug, Error)]
pub enum VfsError {
    /// File or directory not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Path already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Permission denied.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Backend has no writer.
    #[error("backend is read-only: {0}")]
    ReadOnly(String),

    /// Expected a directory.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// Expected a file.
    #[error("is a directory: {0}")]
    IsADirectory(String),

    /// Directory not empty.
    #[error("directory not empty: {0}")]
    DirectoryNotEmpty(String),

    /// Path escapes a rooted backend.
    #[error("path escapes root: {0}")]
    PathEscapesRoot(String),

    /// Operation attempted on the invalid backend (empty or unknown URI).
    #[error("no backend for uri: {0:?}")]
    InvalidBackend(String),

    /// Backend lacks an optional capability.
    #[error("{capability} not supported by backend {prefix}")]
    Unsupported {
        capability: &'static str,
        prefix: String,
    },

    /// Malformed glob pattern.
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] PatternError),

    /// Traversal stopped by its cancellation token.
    #[error("operation cancelled")]
    Cancelled,

    /// A backend call failed during a traversal.
    #[error("backend error at {uri}: {source}")]
    Backend {
        uri: String,
        #[source]
        source: Box<VfsError>,
    },

    /// Bad registry configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl VfsError {
    /// Create a NotFound error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    /// Create an AlreadyExists error.
    pub fn already_exists(path: impl Into<String>) -> Self {
        Self::AlreadyExists(path.into())
    }

    /// Create a PermissionDenied error.
    pub fn permission_denied(path: impl Into<String>) -> Self {
        Self::PermissionDenied(path.into())
    }

    /// Create a NotADirectory error.
    pub fn not_a_directory(path: impl Into<String>) -> Self {
        Self::NotADirectory(path.into())
    }

    /// Create an IsADirectory error.
    pub fn is_a_directory(path: impl Into<String>) -> Self {
        Self::IsADirectory(path.into())
    }

    /// Create a DirectoryNotEmpty error.
    pub fn directory_not_empty(path: impl Into<String>) -> Self {
        Self::DirectoryNotEmpty(path.into())
    }

    /// Create a PathEscapesRoot error.
    pub fn path_escapes_root(path: impl Into<String>) -> Self {
        Self::PathEscapesRoot(path.into())
    }

    /// Create an InvalidBackend error.
    pub fn invalid_backend(uri: impl Into<String>) -> Self {
        Self::InvalidBackend(uri.into())
    }

    /// Create an Unsupported error.
    pub fn unsupported(capability: &'static str, prefix: impl Into<String>) -> Self {
        Self::Unsupported {
            capability,
            prefix: prefix.into(),
        }
    }

    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an Other error.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Wrap a backend failure with the URI it happened at.
    ///
    /// Cancellation and errors that are already wrapped pass through.
    pub fn at(self, uri: impl Into<String>) -> Self {
        match self {
            Self::Cancelled | Self::Backend { .. } => self,
            other => Self::Backend {
                uri: uri.into(),
                source: Box::new(other),
            },
        }
    }

    /// Returns true if the operation was stopped rather than failed.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// The innermost cause, looking through [`VfsError::Backend`] wrappers.
    pub fn root_cause(&self) -> &VfsError {
        match self {
            Self::Backend { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Convert VfsError to std::io::Error for compatibility.
impl From<VfsError> for io::Error {
    fn from(e: VfsError) -> Self {
        match e {
            VfsError::NotFound(msg) => io::Error::new(io::ErrorKind::NotFound, msg),
            VfsError::AlreadyExists(msg) => io::Error::new(io::ErrorKind::AlreadyExists, msg),
            VfsError::PermissionDenied(msg) => {
                io::Error::new(io::ErrorKind::PermissionDenied, msg)
            }
            VfsError::ReadOnly(msg) => io::Error::new(io::ErrorKind::ReadOnlyFilesystem, msg),
            VfsError::NotADirectory(msg) => io::Error::new(io::ErrorKind::NotADirectory, msg),
            VfsError::IsADirectory(msg) => io::Error::new(io::ErrorKind::IsADirectory, msg),
            VfsError::DirectoryNotEmpty(msg) => {
                io::Error::new(io::ErrorKind::DirectoryNotEmpty, msg)
            }
            VfsError::PathEscapesRoot(msg) => {
                io::Error::new(io::ErrorKind::PermissionDenied, msg)
            }
            VfsError::InvalidBackend(msg) => io::Error::new(io::ErrorKind::InvalidInput, msg),
            e @ VfsError::Unsupported { .. } => {
                io::Error::new(io::ErrorKind::Unsupported, e.to_string())
            }
            VfsError::InvalidPattern(e) => io::Error::new(io::ErrorKind::InvalidInput, e),
            VfsError::Cancelled => io::Error::new(io::ErrorKind::Interrupted, "operation cancelled"),
            VfsError::Backend { source, .. } => (*source).into(),
            VfsError::Config(msg) => io::Error::new(io::ErrorKind::InvalidData, msg),
            VfsError::Io(e) => e,
            VfsError::Other(msg) => io::Error::other(msg),
        }
    }
}

/// VFS result type.
pub type VfsResult<T> = Result<T, VfsError>;
