//! Catalogued trash can over a plain directory.
//! Items are moved into a holding area rather than deleted, and a SQLite
//! catalog remembers where each one came from so it can be restored or purged.

pub mod app;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod fs;
pub mod helpers;
pub mod models;
pub mod notify;
pub mod purge;
pub mod restore;
pub mod trash;

pub use app::{Action, Session};
pub use catalog::{Catalog, SqliteCatalog};
pub use config::Settings;
pub use errors::{CoreError, Result};
pub use fs::{FileSystem, RealFileSystem};
pub use helpers::{
    absolute_path,
    disambiguated_name,
    resolve_path,
    sanitize_user_path,
    split_extension,
    CATALOG_TIME_FORMAT,
    MAX_DISAMBIGUATION_SUFFIX,
};
pub use models::{
    BatchReport,
    CommandKind,
    ExitStatusLike,
    HoldingArea,
    PurgeReport,
    Restored,
    TrashEntry,
    Trashed,
};
pub use notify::{ConsoleNotifier, MemoryNotifier, Notice, Notifier};
pub use purge::PurgeManager;
pub use restore::{RestoreResolver, RestoreTarget};
pub use trash::TrashEngine;

/// Re-export a small stable API surface for command crates.
pub mod prelude {
    pub use crate::{
        app::*,
        catalog::{Catalog, SqliteCatalog},
        config::Settings,
        errors::{CoreError, Result},
        fs::{FileSystem, RealFileSystem},
        models::*,
        notify::*,
    };
}
