//! Path and naming helpers shared by the trash, restore and purge paths.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::errors::CoreError;

/// Format the catalog store uses for its `TIME` column (`CURRENT_TIMESTAMP`).
pub const CATALOG_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Highest disambiguation suffix tried before giving up on a name.
pub const MAX_DISAMBIGUATION_SUFFIX: u32 = 65_535;

/// Returns a user-safe, trimmed path string that can be used in logs and messages.
pub fn sanitize_user_path(path: &Path) -> String {
    path.display().to_string().trim().to_string()
}

/// Resolves `path` against `base` and folds `.` and `..` segments lexically.
///
/// Symlinks are not followed, so a trashed symlink is recorded under the name
/// the user gave rather than under its target.
pub fn join_normalized(base: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            Component::Normal(part) => normalized.push(part),
        }
    }
    normalized
}

/// Absolute, normalized form of `path` relative to the process working directory.
pub fn absolute_path(path: &Path) -> crate::Result<PathBuf> {
    let cwd = std::env::current_dir().map_err(|err| CoreError::io(".", err))?;
    Ok(join_normalized(&cwd, path))
}

/// Absolute path naming the same entry the kernel would open for `path`.
///
/// The parent is canonicalized, so `link/..` lands where the link points, while
/// the final component is kept as given and a symlink still names itself. When
/// the parent does not exist the path is folded lexically instead.
pub fn resolve_path(path: &Path) -> crate::Result<PathBuf> {
    let cwd = std::env::current_dir().map_err(|err| CoreError::io(".", err))?;
    let joined = cwd.join(path);

    let canonical = match (joined.parent(), joined.file_name()) {
        (Some(parent), Some(name)) => fs::canonicalize(parent).map(|parent| parent.join(name)),
        _ => fs::canonicalize(&joined),
    };
    match canonical {
        Ok(resolved) => Ok(resolved),
        Err(err) => {
            debug!(path = %joined.display(), error = %err, "parent not resolvable, folding lexically");
            Ok(join_normalized(&cwd, path))
        }
    }
}

/// Basename of an already normalized path, if it has a usable one.
pub fn file_name_string(path: &Path) -> Option<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
}

/// Splits a basename into stem and extension, the extension keeping its dot.
///
/// Leading dots belong to the stem, so `.bashrc` has no extension while
/// `archive.tar.gz` has the extension `.gz`.
pub fn split_extension(name: &str) -> (&str, &str) {
    let skip = name.len() - name.trim_start_matches('.').len();
    match name[skip..].rfind('.') {
        Some(idx) => name.split_at(skip + idx),
        None => (name, ""),
    }
}

/// Name with the disambiguation suffix inserted before the extension.
pub fn disambiguated_name(name: &str, suffix: u32) -> String {
    let (stem, ext) = split_extension(name);
    format!("{stem}.{suffix}{ext}")
}

/// Parses a catalog timestamp into a UTC datetime.
pub fn parse_catalog_time(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, CATALOG_TIME_FORMAT)
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.with_timezone(&Utc)))
}

/// Serializes a UTC datetime the way the catalog stores it.
pub fn format_catalog_time(time: &DateTime<Utc>) -> String {
    time.format(CATALOG_TIME_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("a.txt"), ("a", ".txt"));
        assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_extension("Makefile"), ("Makefile", ""));
        assert_eq!(split_extension(".bashrc"), (".bashrc", ""));
        assert_eq!(split_extension("..hidden.md"), ("..hidden", ".md"));
        assert_eq!(split_extension("trailing."), ("trailing", "."));
    }

    #[test]
    fn test_disambiguated_name_goes_before_extension() {
        assert_eq!(disambiguated_name("a.txt", 1), "a.1.txt");
        assert_eq!(disambiguated_name("a.txt", 2), "a.2.txt");
        assert_eq!(disambiguated_name("photos", 3), "photos.3");
        assert_eq!(disambiguated_name(".profile", 1), ".profile.1");
    }

    #[test]
    fn test_join_normalized() {
        let base = Path::new("/home/user/work");
        assert_eq!(join_normalized(base, Path::new("notes.txt")), PathBuf::from("/home/user/work/notes.txt"));
        assert_eq!(join_normalized(base, Path::new("./dir/")), PathBuf::from("/home/user/work/dir"));
        assert_eq!(join_normalized(base, Path::new("../other/./x")), PathBuf::from("/home/user/other/x"));
        assert_eq!(join_normalized(base, Path::new("/tmp/a/../b")), PathBuf::from("/tmp/b"));
        assert_eq!(join_normalized(base, Path::new("/../..")), PathBuf::from("/"));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_path_follows_parent_links_only() {
        let temp = tempfile::TempDir::new().unwrap();
        let root = fs::canonicalize(temp.path()).unwrap();
        fs::create_dir_all(root.join("a")).unwrap();
        fs::create_dir_all(root.join("b/c")).unwrap();
        std::os::unix::fs::symlink(root.join("b/c"), root.join("a/link")).unwrap();

        assert_eq!(resolve_path(&root.join("a/link/../x")).unwrap(), root.join("b/x"));
        assert_eq!(resolve_path(&root.join("a/link")).unwrap(), root.join("a/link"));
        assert_eq!(resolve_path(&root.join("a/./")).unwrap(), root.join("a"));
        assert_eq!(
            resolve_path(&root.join("gone/deeper/../x")).unwrap(),
            root.join("gone/x")
        );
    }

    #[test]
    fn test_file_name_string() {
        assert_eq!(file_name_string(Path::new("/tmp/report.txt")).as_deref(), Some("report.txt"));
        assert_eq!(file_name_string(Path::new("/")), None);
    }

    #[test]
    fn test_parse_catalog_time() {
        let dt = parse_catalog_time("2024-03-09 17:45:02").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 3, 9));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (17, 45, 2));
        assert_eq!(format_catalog_time(&dt), "2024-03-09 17:45:02");

        assert!(parse_catalog_time("2024-03-09T17:45:02Z").is_some());
        assert!(parse_catalog_time("yesterday").is_none());
    }
}
