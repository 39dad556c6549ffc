//! Putting trashed items back where they came from.
//!
//! A restore request names either an item in the holding area or the path the
//! item used to occupy. Either way the reverse move happens before the catalog
//! row is deleted, so an interruption leaves the item in place and at worst a
//! stale row behind.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::catalog::Catalog;
use crate::errors::CoreError;
use crate::fs::FileSystem;
use crate::helpers::{file_name_string, join_normalized, resolve_path};
use crate::models::{BatchReport, HoldingArea, Restored, TrashEntry};
use crate::notify::Notifier;

/// How a restore request was understood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreTarget {
    /// Full path of an item inside the holding area.
    TrashRelative(PathBuf),
    /// Absolute path the item occupied before it was trashed.
    Original(PathBuf),
}

pub struct RestoreResolver<'a> {
    holding: &'a HoldingArea,
    fs: &'a dyn FileSystem,
    catalog: &'a mut dyn Catalog,
    notifier: &'a dyn Notifier,
}

impl<'a> RestoreResolver<'a> {
    pub fn new(
        holding: &'a HoldingArea,
        fs: &'a dyn FileSystem,
        catalog: &'a mut dyn Catalog,
        notifier: &'a dyn Notifier,
    ) -> Self {
        Self {
            holding,
            fs,
            catalog,
            notifier,
        }
    }

    /// Restores every input in order; a failure is reported and the batch goes on.
    pub fn restore_all<S: AsRef<str>>(&mut self, inputs: &[S]) -> BatchReport {
        let mut report = BatchReport::default();
        for input in inputs {
            let outcome = self.restore(input.as_ref());
            report.record(&outcome);
        }
        report
    }

    /// Classifies `input`, restores the matching item and notifies the outcome.
    pub fn restore(&mut self, input: &str) -> crate::Result<Restored> {
        let outcome = self.classify(input).and_then(|target| match target {
            RestoreTarget::TrashRelative(path) => self.restore_from_trash(&path),
            RestoreTarget::Original(path) => self.restore_from_original(&path),
        });

        match outcome {
            Ok(restored) => {
                self.notifier.notify_success(&format!(
                    "{} -> {}",
                    restored.from.display(),
                    restored.to.display()
                ));
                Ok(restored)
            }
            Err(err) => {
                if let CoreError::DanglingRecord { restored_to, .. } = &err {
                    self.notifier
                        .notify_success(&format!("{input} -> {}", restored_to.display()));
                }
                self.notifier.notify_error(&err.report());
                Err(err)
            }
        }
    }

    /// Decides whether `input` names a holding-area item or an original path.
    pub fn classify(&self, input: &str) -> crate::Result<RestoreTarget> {
        let absolute = resolve_path(Path::new(input))?;
        if self.holding.contains(&absolute) {
            return Ok(RestoreTarget::TrashRelative(absolute));
        }

        let inside = join_normalized(self.holding.path(), Path::new(input));
        if self.holding.contains(&inside) && self.fs.exists(&inside) {
            return Ok(RestoreTarget::TrashRelative(inside));
        }

        Ok(RestoreTarget::Original(absolute))
    }

    /// Restores the holding-area item at `path` (a direct child of the holding area).
    pub fn restore_from_trash(&mut self, path: &Path) -> crate::Result<Restored> {
        if !self.fs.exists(path) {
            return Err(CoreError::not_found(path.display().to_string()));
        }
        if path.parent() != Some(self.holding.path()) {
            return Err(CoreError::InvalidPath(format!(
                "{} is not a top-level item of {}",
                path.display(),
                self.holding.path().display()
            )));
        }

        let name = file_name_string(path)
            .ok_or_else(|| CoreError::InvalidPath(path.display().to_string()))?;
        let entry = self
            .catalog
            .find_by_name(&name)?
            .ok_or_else(|| CoreError::not_found(format!("no catalog record for {}", path.display())))?;

        self.reverse_move(&entry, path)
    }

    /// Restores the item recorded as having lived at `original_path`.
    pub fn restore_from_original(&mut self, original_path: &Path) -> crate::Result<Restored> {
        let mut entries = self.catalog.find_by_original_path(original_path)?;
        let entry = match entries.len() {
            0 => return Err(CoreError::NotOriginalPath(original_path.to_path_buf())),
            1 => entries.remove(0),
            _ => return Err(CoreError::ambiguous(original_path.display().to_string())),
        };

        let from = self.holding.join(&entry.name);
        if !self.fs.exists(&from) {
            return Err(CoreError::not_found(format!(
                "{} (catalog record {} has no item in the holding area)",
                from.display(),
                entry.id
            )));
        }

        self.reverse_move(&entry, &from)
    }

    fn reverse_move(&mut self, entry: &TrashEntry, from: &Path) -> crate::Result<Restored> {
        let to = entry.original_path.clone();
        if self.fs.exists(&to) {
            return Err(CoreError::conflict(to));
        }

        let created = match to.parent() {
            Some(parent) => self.recreate_parent(parent)?,
            None => Vec::new(),
        };

        if let Err(err) = self.fs.move_path(from, &to) {
            self.remove_created(&created);
            return Err(err);
        }

        if let Err(err) = self.catalog.delete_by_name(&entry.name) {
            return Err(CoreError::DanglingRecord {
                restored_to: to,
                source: Box::new(err),
            });
        }

        Ok(Restored {
            from: from.to_path_buf(),
            to,
        })
    }

    /// Creates the missing ancestors of a restore target, returning them deepest first.
    fn recreate_parent(&self, parent: &Path) -> crate::Result<Vec<PathBuf>> {
        let missing: Vec<PathBuf> = parent
            .ancestors()
            .take_while(|dir| !dir.as_os_str().is_empty() && !self.fs.exists(dir))
            .map(Path::to_path_buf)
            .collect();
        if !missing.is_empty() {
            debug!(parent = %parent.display(), "recreating missing parent for restore");
            self.fs.create_dir_all(parent)?;
        }
        Ok(missing)
    }

    fn remove_created(&self, created: &[PathBuf]) {
        for dir in created {
            if let Err(err) = self.fs.remove_empty_dir(dir) {
                debug!(dir = %dir.display(), error = %err.report(), "left recreated directory behind");
                break;
            }
        }
    }
}
