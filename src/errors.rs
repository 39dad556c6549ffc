use std::{io, path::PathBuf};

/// Error type shared by the catalog and the trash/restore/purge orchestrators.
#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    /// A source path, holding-area item or catalog record is absent.
    #[error("does not exist: {0}")]
    NotFound(String),

    /// A restore was requested by a path that no catalog record names.
    #[error("not an original path: {0}")]
    NotOriginalPath(PathBuf),

    /// The destination of a move or restore is already occupied.
    #[error("already exists: {0}")]
    Conflict(PathBuf),

    /// More than one catalog record matched a key expected to be unique.
    #[error("duplicates found for {0}")]
    Ambiguous(String),

    /// The catalog store failed to open, commit or roll back.
    #[error("catalog failure during {op}")]
    Storage {
        op: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    /// The disambiguation suffix search ran past its bound.
    #[error("no free name for {0} in the holding area")]
    ResourceExhausted(String),

    /// The operating system refused enumeration or removal.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf, #[source] io::Error),

    /// A path cannot be trashed or restored as given.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// An operation was rejected due to argument issues.
    #[error("invalid command input: {0}")]
    InvalidInput(String),

    /// File system I/O failure.
    #[error("I/O error while accessing {0}")]
    Io(PathBuf, #[source] io::Error),

    /// The item reached the holding area but its catalog record was not written.
    #[error("moved to {moved_to} but the catalog is out of sync for it")]
    CatalogOutOfSync {
        moved_to: PathBuf,
        #[source]
        source: Box<CoreError>,
    },

    /// The item was restored but its catalog record could not be deleted.
    #[error("restored to {restored_to} but its catalog record is dangling")]
    DanglingRecord {
        restored_to: PathBuf,
        #[source]
        source: Box<CoreError>,
    },
}

impl CoreError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn ambiguous(message: impl Into<String>) -> Self {
        Self::Ambiguous(message.into())
    }

    pub fn conflict(path: impl Into<PathBuf>) -> Self {
        Self::Conflict(path.into())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn storage(op: &'static str, source: rusqlite::Error) -> Self {
        Self::Storage { op, source }
    }

    /// Wraps an I/O failure, keeping permission problems distinguishable.
    pub fn io(path: impl Into<PathBuf>, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.into(), error),
            _ => Self::Io(path.into(), error),
        }
    }

    /// Renders the error with its chain of sources on one line.
    pub fn report(&self) -> String {
        let mut line = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            line.push_str(": ");
            line.push_str(&cause.to_string());
            source = cause.source();
        }
        line
    }
}

/// Shared result alias for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_maps_permission_denied() {
        let err = CoreError::io("/x", io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, CoreError::PermissionDenied(..)));

        let err = CoreError::io("/x", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, CoreError::Io(..)));
    }

    #[test]
    fn test_report_includes_sources() {
        let inner = CoreError::io("/db", io::Error::new(io::ErrorKind::Other, "disk full"));
        let err = CoreError::CatalogOutOfSync {
            moved_to: PathBuf::from("/trash/a.txt"),
            source: Box::new(inner),
        };
        let line = err.report();
        assert!(line.starts_with("moved to /trash/a.txt"));
        assert!(line.contains("I/O error while accessing /db"));
        assert!(line.ends_with("disk full"));
    }
}
