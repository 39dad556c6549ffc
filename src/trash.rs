//! Moving paths into the holding area.

use std::path::Path;
use tracing::debug;

use crate::catalog::Catalog;
use crate::errors::CoreError;
use crate::fs::FileSystem;
use crate::helpers::{
    disambiguated_name, file_name_string, resolve_path, sanitize_user_path,
    MAX_DISAMBIGUATION_SUFFIX,
};
use crate::models::{BatchReport, HoldingArea, Trashed};
use crate::notify::Notifier;

/// Relocates paths into the holding area and records where they came from.
pub struct TrashEngine<'a> {
    holding: &'a HoldingArea,
    fs: &'a dyn FileSystem,
    catalog: &'a mut dyn Catalog,
    notifier: &'a dyn Notifier,
    max_suffix: u32,
}

impl<'a> TrashEngine<'a> {
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
            max_suffix: MAX_DISAMBIGUATION_SUFFIX,
        }
    }

    /// Caps the disambiguation search at `max_suffix`.
    pub fn with_max_suffix(mut self, max_suffix: u32) -> Self {
        self.max_suffix = max_suffix;
        self
    }

    /// Trashes every path in order; a failure is reported and the batch goes on.
    pub fn move_all<P: AsRef<Path>>(&mut self, paths: &[P]) -> BatchReport {
        let mut report = BatchReport::default();
        for path in paths {
            let outcome = self.move_to_trash(path.as_ref());
            report.record(&outcome);
        }
        report
    }

    /// Moves one path into the holding area and notifies the outcome.
    ///
    /// `CatalogOutOfSync` means the item did move; only its record is missing.
    pub fn move_to_trash(&mut self, path: &Path) -> crate::Result<Trashed> {
        let input = sanitize_user_path(path);
        match self.trash_one(path) {
            Ok(trashed) => {
                self.notifier
                    .notify_success(&format!("{input} -> {}", trashed.destination.display()));
                Ok(trashed)
            }
            Err(err) => {
                if let CoreError::CatalogOutOfSync { moved_to, .. } = &err {
                    self.notifier
                        .notify_success(&format!("{input} -> {}", moved_to.display()));
                }
                self.notifier.notify_error(&err.report());
                Err(err)
            }
        }
    }

    /// First name not physically present in the holding area.
    ///
    /// Disambiguation goes by what is on disk, not by what the catalog says.
    pub fn resolve_name(&self, basename: &str) -> crate::Result<String> {
        let mut candidate = basename.to_string();
        let mut suffix = 0;
        while self.fs.exists(&self.holding.join(&candidate)) {
            suffix += 1;
            if suffix > self.max_suffix {
                return Err(CoreError::ResourceExhausted(basename.to_string()));
            }
            candidate = disambiguated_name(basename, suffix);
        }
        if suffix > 0 {
            debug!(basename, name = %candidate, "disambiguated holding-area name");
        }
        Ok(candidate)
    }

    fn trash_one(&mut self, path: &Path) -> crate::Result<Trashed> {
        // Checked, moved and recorded under the same resolved path.
        let original_path = resolve_path(path)?;
        if !self.fs.exists(&original_path) {
            return Err(CoreError::not_found(sanitize_user_path(path)));
        }

        if self.holding.contains(&original_path) || self.holding.path().starts_with(&original_path) {
            return Err(CoreError::InvalidPath(format!(
                "{} overlaps the holding area",
                original_path.display()
            )));
        }
        let basename = file_name_string(&original_path)
            .ok_or_else(|| CoreError::InvalidPath(sanitize_user_path(path)))?;

        let name = self.resolve_name(&basename)?;
        let destination = self.holding.join(&name);
        self.fs.move_path(&original_path, &destination)?;

        if let Err(err) = self.catalog.insert(&name, &original_path) {
            return Err(CoreError::CatalogOutOfSync {
                moved_to: destination,
                source: Box::new(err),
            });
        }

        Ok(Trashed {
            name,
            destination,
            original_path,
        })
    }
}
