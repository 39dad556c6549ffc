use tracing::debug;

use crate::catalog::Catalog;
use crate::errors::CoreError;
use crate::fs::FileSystem;
use crate::models::{HoldingArea, PurgeReport};
use crate::notify::Notifier;

/// Irreversibly empties the holding area and the catalog together.
pub struct PurgeManager<'a> {
    holding: &'a HoldingArea,
    fs: &'a dyn FileSystem,
    catalog: &'a mut dyn Catalog,
    notifier: &'a dyn Notifier,
}

impl<'a> PurgeManager<'a> {
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

    /// Removes every catalogued item, then truncates the catalog.
    ///
    /// Untracked children of the holding area are left alone and only counted.
    /// An `Err` means the catalog could not be read or truncated.
    pub fn empty(&mut self) -> crate::Result<PurgeReport> {
        let entries = self.catalog.list_all()?;
        let mut report = PurgeReport::default();

        for entry in &entries {
            let path = self.holding.join(&entry.name);
            if !self.fs.exists(&path) {
                debug!(name = %entry.name, "catalogued item already absent");
                continue;
            }
            let removal = if self.fs.is_dir(&path) {
                self.fs.remove_tree(&path)
            } else {
                self.fs.remove_file(&path)
            };
            match removal {
                Ok(()) => report.removed += 1,
                Err(err) => {
                    report.failed += 1;
                    self.notifier.notify_error(&err.report());
                }
            }
        }

        self.notifier.notify_success(&format!(
            "removed {} items from {}",
            report.removed,
            self.holding.path().display()
        ));

        if let Err(err) = self.catalog.truncate() {
            self.notifier.notify_error(&err.report());
            return Err(err);
        }

        report.remaining = self.count_remaining();
        Ok(report)
    }

    /// Counts what is left; any problem here is a warning, never a failure.
    fn count_remaining(&self) -> Option<usize> {
        let holding = self.holding.path().display();
        match self.fs.list_dir(self.holding.path()) {
            Ok(children) => {
                if !children.is_empty() {
                    self.notifier
                        .notify_warning(&format!("{} items still in {holding}", children.len()));
                }
                Some(children.len())
            }
            Err(CoreError::PermissionDenied(..)) => {
                self.notifier
                    .notify_warning(&format!("permission denied: could not list {holding}"));
                None
            }
            Err(err) => {
                self.notifier.notify_warning(&err.report());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SqliteCatalog;
    use crate::fs::RealFileSystem;
    use crate::notify::MemoryNotifier;
    use std::fs;
    use std::path::Path;

    #[test]
    fn test_empty_skips_absent_items() {
        let temp = tempfile::TempDir::new().unwrap();
        let holding = HoldingArea::new(temp.path().join("trash")).unwrap();
        fs::create_dir_all(holding.path()).unwrap();
        fs::write(holding.join("here.txt"), "").unwrap();

        let mut catalog = SqliteCatalog::open_in_memory().unwrap();
        catalog.insert("here.txt", Path::new("/w/here.txt")).unwrap();
        catalog.insert("gone.txt", Path::new("/w/gone.txt")).unwrap();
        let notifier = MemoryNotifier::new();

        let report = PurgeManager::new(&holding, &RealFileSystem, &mut catalog, &notifier)
            .empty()
            .unwrap();
        assert_eq!(report, PurgeReport { removed: 1, failed: 0, remaining: Some(0) });
        assert!(catalog.list_all().unwrap().is_empty());
        assert!(notifier.errors().is_empty());
        assert!(notifier.warnings().is_empty());
        assert!(notifier.successes()[0].starts_with("removed 1 items from"));
    }

    #[test]
    fn test_empty_missing_holding_area_is_soft() {
        let temp = tempfile::TempDir::new().unwrap();
        let holding = HoldingArea::new(temp.path().join("never-created")).unwrap();
        let mut catalog = SqliteCatalog::open_in_memory().unwrap();
        let notifier = MemoryNotifier::new();

        let report = PurgeManager::new(&holding, &RealFileSystem, &mut catalog, &notifier)
            .empty()
            .unwrap();
        assert_eq!(report.remaining, None);
        assert_eq!(report.status().as_code(), 0);
        assert!(notifier.errors().is_empty());
        assert_eq!(notifier.warnings().len(), 1);
    }
}
