use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SplitError>;

/// Failure outcome of a split run. Each variant aborts the whole run.
#[derive(Debug, Error)]
pub enum SplitError {
    #[error("source unreadable: {}: {message}", .path.display())]
    SourceUnreadable {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A page of an otherwise readable source could not be read or re-serialized.
    #[error("page {page_number} of {}: {message}", .path.display())]
    PageError {
        path: PathBuf,
        page_number: u32,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("source exceeds limit: {}: {message}", .path.display())]
    LimitExceeded { path: PathBuf, message: String },

    #[error("destination error: {}", .path.display())]
    DestinationError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write page {page_number} to {}", .path.display())]
    WriteError {
        path: PathBuf,
        page_number: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("archive error: {}: {message}", .path.display())]
    ArchiveError {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("failed to write manifest {}", .path.display())]
    ManifestError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    SourceUnreadable,
    PageError,
    LimitExceeded,
    DestinationError,
    WriteError,
    ArchiveError,
    ManifestError,
}

impl SplitError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SplitError::SourceUnreadable { .. } => ErrorKind::SourceUnreadable,
            SplitError::PageError { .. } => ErrorKind::PageError,
            SplitError::LimitExceeded { .. } => ErrorKind::LimitExceeded,
            SplitError::DestinationError { .. } => ErrorKind::DestinationError,
            SplitError::WriteError { .. } => ErrorKind::WriteError,
            SplitError::ArchiveError { .. } => ErrorKind::ArchiveError,
            SplitError::ManifestError { .. } => ErrorKind::ManifestError,
        }
    }

    pub(crate) fn source_unreadable(
        path: impl Into<PathBuf>,
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        SplitError::SourceUnreadable {
            path: path.into(),
            message: message.into(),
            source,
        }
    }

    pub(crate) fn page(
        path: impl Into<PathBuf>,
        page_number: u32,
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        SplitError::PageError {
            path: path.into(),
            page_number,
            message: message.into(),
            source,
        }
    }

    pub(crate) fn archive(
        path: impl Into<PathBuf>,
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        SplitError::ArchiveError {
            path: path.into(),
            message: message.into(),
            source,
        }
    }
}
