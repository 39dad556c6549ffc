//! Locations of the holding area and the catalog.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Environment variable overriding the holding-area directory.
pub const TRASH_FOLDER_VAR: &str = "TRASH_FOLDER";

/// Environment variable overriding the catalog file.
pub const TRASH_DATABASE_VAR: &str = "TRASH_DATABASE";

const DEFAULT_FOLDER_NAME: &str = ".Trash";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub holding_area: PathBuf,
    pub catalog_path: PathBuf,
}

impl Settings {
    pub fn new(holding_area: impl Into<PathBuf>, catalog_path: impl Into<PathBuf>) -> Self {
        Self {
            holding_area: holding_area.into(),
            catalog_path: catalog_path.into(),
        }
    }

    /// Resolves settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var_os(key), dirs::home_dir())
    }

    /// Resolves settings from `lookup`, falling back to `<home>/.Trash` and a
    /// sibling `<holding area>.db`.
    pub fn from_lookup<F>(lookup: F, home: Option<PathBuf>) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let set = |key: &str| lookup(key).filter(|value| !value.is_empty()).map(PathBuf::from);

        let holding_area = set(TRASH_FOLDER_VAR).unwrap_or_else(|| {
            home.unwrap_or_else(|| PathBuf::from("."))
                .join(DEFAULT_FOLDER_NAME)
        });
        let catalog_path = set(TRASH_DATABASE_VAR).unwrap_or_else(|| default_catalog_path(&holding_area));

        Self {
            holding_area,
            catalog_path,
        }
    }

    pub fn with_holding_area(mut self, holding_area: impl Into<PathBuf>) -> Self {
        self.holding_area = holding_area.into();
        self
    }

    pub fn with_catalog_path(mut self, catalog_path: impl Into<PathBuf>) -> Self {
        self.catalog_path = catalog_path.into();
        self
    }
}

/// `<holding area>.db`, ignoring any trailing separator on the folder.
pub fn default_catalog_path(holding_area: &Path) -> PathBuf {
    let mut name: OsString = holding_area.components().as_path().as_os_str().to_owned();
    name.push(".db");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<OsString> {
        let vars: HashMap<String, OsString> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), OsString::from(v)))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_under_home() {
        let settings = Settings::from_lookup(lookup(&[]), Some(PathBuf::from("/home/u")));
        assert_eq!(settings.holding_area, PathBuf::from("/home/u/.Trash"));
        assert_eq!(settings.catalog_path, PathBuf::from("/home/u/.Trash.db"));
    }

    #[test]
    fn test_folder_override_moves_default_catalog() {
        let settings = Settings::from_lookup(
            lookup(&[(TRASH_FOLDER_VAR, "/data/bin/")]),
            Some(PathBuf::from("/home/u")),
        );
        assert_eq!(settings.holding_area, PathBuf::from("/data/bin/"));
        assert_eq!(settings.catalog_path, PathBuf::from("/data/bin.db"));
    }

    #[test]
    fn test_database_override_and_empty_values() {
        let settings = Settings::from_lookup(
            lookup(&[(TRASH_FOLDER_VAR, ""), (TRASH_DATABASE_VAR, "/var/trash.sqlite")]),
            None,
        );
        assert_eq!(settings.holding_area, PathBuf::from("./.Trash"));
        assert_eq!(settings.catalog_path, PathBuf::from("/var/trash.sqlite"));
    }

    #[test]
    fn test_builder_overrides() {
        let settings = Settings::new("/a", "/a.db")
            .with_holding_area("/b")
            .with_catalog_path("/c.db");
        assert_eq!(settings, Settings::new("/b", "/c.db"));
    }
}
