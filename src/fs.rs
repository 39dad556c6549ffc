use crate::errors::CoreError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Filesystem capability the orchestrators are written against.
///
/// Keeping this trait narrow makes it easy to substitute a failing backend in
/// tests without touching the catalog.
pub trait FileSystem: Send + Sync {
    /// Returns true when path exists (symlink-aware: a dangling link exists).
    fn exists(&self, path: &Path) -> bool;

    /// Returns true for a real directory; a symlink to a directory is not one.
    fn is_dir(&self, path: &Path) -> bool;

    /// Creates a directory and all missing parent directories.
    fn create_dir_all(&self, path: &Path) -> crate::Result<()>;

    /// Moves a file, directory or symlink, crossing volume boundaries if needed.
    fn move_path(&self, from: &Path, to: &Path) -> crate::Result<()>;

    /// Removes a file or symlink.
    fn remove_file(&self, path: &Path) -> crate::Result<()>;

    /// Forcefully removes a whole directory tree.
    fn remove_tree(&self, path: &Path) -> crate::Result<()>;

    /// Removes a directory only if it is empty.
    fn remove_empty_dir(&self, path: &Path) -> crate::Result<()>;

    /// Lists directory children as concrete paths.
    fn list_dir(&self, path: &Path) -> crate::Result<Vec<PathBuf>>;
}

/// Default filesystem implementation backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn is_dir(&self, path: &Path) -> bool {
        fs::symlink_metadata(path)
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
    }

    fn create_dir_all(&self, path: &Path) -> crate::Result<()> {
        fs::create_dir_all(path).map_err(|err| CoreError::io(path, err))
    }

    fn move_path(&self, from: &Path, to: &Path) -> crate::Result<()> {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err) if is_cross_device(&err) => {
                debug!(from = %from.display(), to = %to.display(), "rename crosses devices, copying");
                copy_recursive(from, to)?;
                if self.is_dir(from) {
                    self.remove_tree(from)
                } else {
                    self.remove_file(from)
                }
            }
            Err(err) => Err(CoreError::io(from, err)),
        }
    }

    fn remove_file(&self, path: &Path) -> crate::Result<()> {
        fs::remove_file(path).map_err(|err| CoreError::io(path, err))
    }

    fn remove_tree(&self, path: &Path) -> crate::Result<()> {
        let status = force_remove(path)
            .status()
            .map_err(|err| CoreError::io(path, err))?;
        if status.success() {
            return Ok(());
        }
        let message = format!("{} exited with {status}", FORCE_REMOVE_COMMAND.0);
        Err(CoreError::io(path, io::Error::new(io::ErrorKind::Other, message)))
    }

    fn remove_empty_dir(&self, path: &Path) -> crate::Result<()> {
        fs::remove_dir(path).map_err(|err| CoreError::io(path, err))
    }

    fn list_dir(&self, path: &Path) -> crate::Result<Vec<PathBuf>> {
        fs::read_dir(path)
            .map_err(|err| CoreError::io(path, err))?
            .map(|entry| entry.map(|v| v.path()))
            .collect::<Result<Vec<PathBuf>, io::Error>>()
            .map_err(|err| CoreError::io(path, err))
    }
}

// Tree-walking removal is slow and brittle on large trees, so directories are
// handed to the platform tool.
// `--` ends option parsing, so a path starting with `-` stays a path.
#[cfg(not(windows))]
const FORCE_REMOVE_COMMAND: (&str, &[&str]) = ("rm", &["-rf", "--"]);

#[cfg(windows)]
const FORCE_REMOVE_COMMAND: (&str, &[&str]) = ("cmd", &["/C", "rmdir", "/S", "/Q"]);

fn force_remove(path: &Path) -> Command {
    let (program, args) = FORCE_REMOVE_COMMAND;
    let mut command = Command::new(program);
    command.args(args).arg(path);
    command
}

#[cfg(unix)]
fn is_cross_device(err: &io::Error) -> bool {
    err.raw_os_error() == Some(libc::EXDEV)
}

#[cfg(windows)]
fn is_cross_device(err: &io::Error) -> bool {
    // ERROR_NOT_SAME_DEVICE
    err.raw_os_error() == Some(17)
}

#[cfg(not(any(unix, windows)))]
fn is_cross_device(_err: &io::Error) -> bool {
    false
}

/// Copies `from` to `to`, preserving symlinks and recursing into directories.
pub(crate) fn copy_recursive(from: &Path, to: &Path) -> crate::Result<()> {
    let meta = fs::symlink_metadata(from).map_err(|err| CoreError::io(from, err))?;
    let file_type = meta.file_type();

    if file_type.is_symlink() {
        return copy_symlink(from, to);
    }

    if file_type.is_dir() {
        fs::create_dir(to).map_err(|err| CoreError::io(to, err))?;
        for entry in fs::read_dir(from).map_err(|err| CoreError::io(from, err))? {
            let entry = entry.map_err(|err| CoreError::io(from, err))?;
            copy_recursive(&entry.path(), &to.join(entry.file_name()))?;
        }
        return fs::set_permissions(to, meta.permissions()).map_err(|err| CoreError::io(to, err));
    }

    fs::copy(from, to).map(|_| ()).map_err(|err| CoreError::io(from, err))
}

#[cfg(unix)]
fn copy_symlink(from: &Path, to: &Path) -> crate::Result<()> {
    let target = fs::read_link(from).map_err(|err| CoreError::io(from, err))?;
    std::os::unix::fs::symlink(target, to).map_err(|err| CoreError::io(to, err))
}

#[cfg(not(unix))]
fn copy_symlink(from: &Path, to: &Path) -> crate::Result<()> {
    fs::copy(from, to).map(|_| ()).map_err(|err| CoreError::io(from, err))
}
