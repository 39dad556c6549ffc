use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

use crate::fs::FileSystem;
use crate::helpers::resolve_path;

/// Verb requested by the command layer.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum CommandKind {
    Put,
    List,
    Restore,
    Empty,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Put => "put",
            Self::List => "list",
            Self::Restore => "restore",
            Self::Empty => "empty",
        }
    }

    /// Whether the verb operates on a list of user-supplied paths.
    pub fn takes_paths(&self) -> bool {
        matches!(self, Self::Put | Self::Restore)
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One row of the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrashEntry {
    pub id: i64,
    /// `None` when the stored timestamp could not be parsed.
    pub timestamp: Option<DateTime<Utc>>,
    /// Basename inside the holding area, disambiguation suffix included.
    pub name: String,
    pub original_path: PathBuf,
}

/// The directory standing in for the trash.
///
/// The path is always absolute and resolved, so it compares directly with
/// resolved input paths.
#[derive(Debug, Clone)]
pub struct HoldingArea {
    path: PathBuf,
}

impl HoldingArea {
    /// Resolves `path` against the working directory; it need not exist yet.
    pub fn new(path: impl AsRef<Path>) -> crate::Result<Self> {
        Ok(Self {
            path: resolve_path(path.as_ref())?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Location of a direct child with the given name.
    pub fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    /// True when `path` is the holding area itself or lies beneath it.
    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.path)
    }

    /// Creates the directory if absent; returns whether it had to be created.
    pub fn ensure(&self, fs: &dyn FileSystem) -> crate::Result<bool> {
        if fs.exists(&self.path) {
            return Ok(false);
        }
        fs.create_dir_all(&self.path)?;
        Ok(true)
    }
}

/// A completed move into the holding area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trashed {
    pub name: String,
    pub destination: PathBuf,
    pub original_path: PathBuf,
}

/// A completed reverse move out of the holding area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restored {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Tally of a batch of per-path operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchReport {
    pub fn record<T, E>(&mut self, outcome: &Result<T, E>) {
        match outcome {
            Ok(_) => self.succeeded += 1,
            Err(_) => self.failed += 1,
        }
    }

    pub fn status(&self) -> ExitStatusLike {
        if self.failed == 0 {
            ExitStatusLike::Ok
        } else {
            ExitStatusLike::RuntimeError
        }
    }
}

/// Result of emptying the holding area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeReport {
    /// Catalogued items physically removed.
    pub removed: usize,
    /// Catalogued items whose removal failed.
    pub failed: usize,
    /// Direct children left afterwards; `None` when the directory could not be listed.
    pub remaining: Option<usize>,
}

impl PurgeReport {
    pub fn status(&self) -> ExitStatusLike {
        if self.failed == 0 {
            ExitStatusLike::Ok
        } else {
            ExitStatusLike::RuntimeError
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatusLike {
    Ok,
    Usage,
    BadArgument,
    RuntimeError,
}

impl ExitStatusLike {
    pub fn as_code(self) -> u8 {
        match self {
            Self::Ok => 0,
            Self::Usage => 1,
            Self::BadArgument => 2,
            Self::RuntimeError => 5,
        }
    }
}
