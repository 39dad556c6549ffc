//! One invocation of the tool: open the resources once, run a verb, release.

use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

use crate::catalog::{Catalog, SqliteCatalog};
use crate::config::Settings;
use crate::errors::CoreError;
use crate::fs::{FileSystem, RealFileSystem};
use crate::helpers::format_catalog_time;
use crate::models::{CommandKind, ExitStatusLike, HoldingArea};
use crate::notify::Notifier;
use crate::purge::PurgeManager;
use crate::restore::RestoreResolver;
use crate::trash::TrashEngine;

/// Shown in long listings when a row's timestamp cannot be parsed.
pub const UNKNOWN_TRASH_TIME: &str = "????-??-?? ??:??:??";

/// A verb together with its operands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Put(Vec<PathBuf>),
    List { long: bool },
    Restore(Vec<String>),
    Empty,
}

impl Action {
    /// Checks the operand count against the verb.
    pub fn from_parts(kind: CommandKind, paths: Vec<String>, long: bool) -> crate::Result<Self> {
        if kind.takes_paths() && paths.is_empty() {
            return Err(CoreError::invalid_input(format!("{kind} requires at least one path")));
        }
        if !kind.takes_paths() && !paths.is_empty() {
            return Err(CoreError::invalid_input(format!(
                "unexpected arguments: {}",
                paths.join(", ")
            )));
        }
        if long && kind != CommandKind::List {
            return Err(CoreError::invalid_input("--long only applies to list"));
        }

        Ok(match kind {
            CommandKind::Put => Self::Put(paths.into_iter().map(PathBuf::from).collect()),
            CommandKind::List => Self::List { long },
            CommandKind::Restore => Self::Restore(paths),
            CommandKind::Empty => Self::Empty,
        })
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            Self::Put(_) => CommandKind::Put,
            Self::List { .. } => CommandKind::List,
            Self::Restore(_) => CommandKind::Restore,
            Self::Empty => CommandKind::Empty,
        }
    }
}

/// Resources held for the length of one invocation.
///
/// The catalog connection is released when the session is dropped or closed.
pub struct Session<'n> {
    holding: HoldingArea,
    catalog: SqliteCatalog,
    fs: Box<dyn FileSystem>,
    notifier: &'n dyn Notifier,
}

impl<'n> Session<'n> {
    pub fn open(settings: &Settings, notifier: &'n dyn Notifier) -> crate::Result<Self> {
        Self::open_with(settings, Box::new(RealFileSystem), notifier)
    }

    /// Creates the holding area if absent and opens the catalog.
    pub fn open_with(
        settings: &Settings,
        fs: Box<dyn FileSystem>,
        notifier: &'n dyn Notifier,
    ) -> crate::Result<Self> {
        let holding = HoldingArea::new(&settings.holding_area)?;
        if holding.ensure(fs.as_ref())? {
            notifier.notify_success(&format!("Created {}", holding.path().display()));
        }

        if let Some(parent) = settings.catalog_path.parent() {
            if !parent.as_os_str().is_empty() && !fs.exists(parent) {
                fs.create_dir_all(parent)?;
            }
        }
        let catalog = SqliteCatalog::open(&settings.catalog_path)?;

        Ok(Self {
            holding,
            catalog,
            fs,
            notifier,
        })
    }

    pub fn holding_area(&self) -> &HoldingArea {
        &self.holding
    }

    pub fn catalog(&self) -> &SqliteCatalog {
        &self.catalog
    }

    /// Runs `action`, writing listings to `out`.
    pub fn run(&mut self, action: &Action, out: &mut dyn Write) -> ExitStatusLike {
        debug!(verb = %action.kind(), "running");
        match action {
            Action::Put(paths) => TrashEngine::new(
                &self.holding,
                self.fs.as_ref(),
                &mut self.catalog,
                self.notifier,
            )
            .move_all(paths.as_slice())
            .status(),
            Action::Restore(inputs) => RestoreResolver::new(
                &self.holding,
                self.fs.as_ref(),
                &mut self.catalog,
                self.notifier,
            )
            .restore_all(inputs.as_slice())
            .status(),
            Action::Empty => {
                match PurgeManager::new(
                    &self.holding,
                    self.fs.as_ref(),
                    &mut self.catalog,
                    self.notifier,
                )
                .empty()
                {
                    Ok(report) => report.status(),
                    Err(_) => ExitStatusLike::RuntimeError,
                }
            }
            Action::List { long } => match self.list(*long, out) {
                Ok(_) => ExitStatusLike::Ok,
                Err(err) => {
                    self.notifier.notify_error(&err.report());
                    ExitStatusLike::RuntimeError
                }
            },
        }
    }

    /// Writes one `name -> original path` line per row; returns the row count.
    pub fn list(&self, long: bool, out: &mut dyn Write) -> crate::Result<usize> {
        let entries = self.catalog.list_all()?;
        for entry in &entries {
            let line = if long {
                let time = entry
                    .timestamp
                    .as_ref()
                    .map(format_catalog_time)
                    .unwrap_or_else(|| UNKNOWN_TRASH_TIME.to_string());
                format!("{time}  {} -> {}", entry.name, entry.original_path.display())
            } else {
                format!("{} -> {}", entry.name, entry.original_path.display())
            };
            writeln!(out, "{line}").map_err(|err| CoreError::io("<stdout>", err))?;
        }
        Ok(entries.len())
    }

    /// Releases the catalog connection explicitly.
    pub fn close(self) -> crate::Result<()> {
        self.catalog.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_from_parts() {
        assert_eq!(
            Action::from_parts(CommandKind::Put, vec!["a".into()], false).unwrap(),
            Action::Put(vec![PathBuf::from("a")])
        );
        assert_eq!(
            Action::from_parts(CommandKind::List, vec![], true).unwrap(),
            Action::List { long: true }
        );
        assert!(Action::from_parts(CommandKind::Restore, vec![], false).is_err());

        let err = Action::from_parts(CommandKind::Empty, vec!["x".into(), "y".into()], false).unwrap_err();
        assert_eq!(err.to_string(), "invalid command input: unexpected arguments: x, y");

        assert!(Action::from_parts(CommandKind::Put, vec!["a".into()], true).is_err());
    }
}
