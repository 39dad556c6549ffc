//! Durable ledger correlating holding-area names with original paths.
//!
//! Every mutation runs inside its own short transaction. A failed rollback is
//! logged and the original failure is what the caller sees.

use rusqlite::{params, Connection, Row, Transaction};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::errors::CoreError;
use crate::helpers::parse_catalog_time;
use crate::models::TrashEntry;

const CREATE_TABLE: &str = "\
CREATE TABLE IF NOT EXISTS TRASH(
    ID INTEGER PRIMARY KEY AUTOINCREMENT,
    TIME DATETIME DEFAULT CURRENT_TIMESTAMP,
    NAME TEXT NOT NULL,
    PATH TEXT NOT NULL
);";

const INSERT: &str = "INSERT INTO TRASH(NAME, PATH) VALUES (?1, ?2)";
const SELECT_ALL: &str = "SELECT ID, TIME, NAME, PATH FROM TRASH ORDER BY ID";
const SELECT_BY_NAME: &str = "SELECT ID, TIME, NAME, PATH FROM TRASH WHERE NAME = ?1 ORDER BY ID";
const SELECT_BY_PATH: &str = "SELECT ID, TIME, NAME, PATH FROM TRASH WHERE PATH = ?1 ORDER BY ID";
const DELETE_BY_NAME: &str = "DELETE FROM TRASH WHERE NAME = ?1";
const DELETE_ALL: &str = "DELETE FROM TRASH";

/// Ledger operations the orchestrators rely on.
pub trait Catalog {
    /// Records a newly trashed item and returns its id.
    fn insert(&mut self, name: &str, original_path: &Path) -> crate::Result<i64>;

    /// Exact match on the holding-area name; several rows is `Ambiguous`.
    fn find_by_name(&self, name: &str) -> crate::Result<Option<TrashEntry>>;

    /// All rows recorded for an original path; callers refuse anything but one.
    fn find_by_original_path(&self, path: &Path) -> crate::Result<Vec<TrashEntry>>;

    /// Removes the rows carrying `name`, returning how many went.
    fn delete_by_name(&mut self, name: &str) -> crate::Result<usize>;

    /// Every row in id order.
    fn list_all(&self) -> crate::Result<Vec<TrashEntry>>;

    /// Removes every row. The schema is left in place.
    fn truncate(&mut self) -> crate::Result<()>;
}

/// `Catalog` backed by a single SQLite table.
#[derive(Debug)]
pub struct SqliteCatalog {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteCatalog {
    /// Opens (creating if needed) the catalog file and ensures the schema.
    pub fn open(path: &Path) -> crate::Result<Self> {
        let conn = Connection::open(path).map_err(|err| CoreError::storage("open", err))?;
        debug!(path = %path.display(), "catalog opened");
        Self::with_connection(conn, Some(path.to_path_buf()))
    }

    /// Catalog living only as long as the value; used by tests.
    pub fn open_in_memory() -> crate::Result<Self> {
        let conn = Connection::open_in_memory().map_err(|err| CoreError::storage("open", err))?;
        Self::with_connection(conn, None)
    }

    fn with_connection(conn: Connection, path: Option<PathBuf>) -> crate::Result<Self> {
        conn.execute_batch(CREATE_TABLE)
            .map_err(|err| CoreError::storage("create schema", err))?;
        Ok(Self { conn, path })
    }

    /// File backing the catalog, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Closes the connection, surfacing errors that dropping would swallow.
    pub fn close(self) -> crate::Result<()> {
        self.conn
            .close()
            .map_err(|(_, err)| CoreError::storage("close", err))
    }

    fn with_transaction<T>(
        &mut self,
        op: &'static str,
        f: impl FnOnce(&Transaction<'_>) -> rusqlite::Result<T>,
    ) -> crate::Result<T> {
        let tx = self
            .conn
            .transaction()
            .map_err(|err| CoreError::storage(op, err))?;

        match f(&tx) {
            Ok(value) => {
                tx.commit().map_err(|err| CoreError::storage(op, err))?;
                debug!(op, "catalog transaction committed");
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback) = tx.rollback() {
                    warn!(op, error = %rollback, "catalog rollback failed");
                }
                Err(CoreError::storage(op, err))
            }
        }
    }

    fn query(&self, op: &'static str, sql: &str, key: Option<&str>) -> crate::Result<Vec<TrashEntry>> {
        let run = || -> rusqlite::Result<Vec<TrashEntry>> {
            let mut stmt = self.conn.prepare(sql)?;
            let rows = match key {
                Some(key) => stmt.query_map(params![key], entry_from_row)?,
                None => stmt.query_map([], entry_from_row)?,
            };
            rows.collect()
        };
        run().map_err(|err| CoreError::storage(op, err))
    }
}

impl Catalog for SqliteCatalog {
    fn insert(&mut self, name: &str, original_path: &Path) -> crate::Result<i64> {
        let path = original_path.to_string_lossy();
        self.with_transaction("insert", |tx| {
            tx.execute(INSERT, params![name, &*path])?;
            Ok(tx.last_insert_rowid())
        })
    }

    fn find_by_name(&self, name: &str) -> crate::Result<Option<TrashEntry>> {
        let mut rows = self.query("find by name", SELECT_BY_NAME, Some(name))?;
        match rows.len() {
            0 => Ok(None),
            1 => Ok(rows.pop()),
            _ => Err(CoreError::ambiguous(name)),
        }
    }

    fn find_by_original_path(&self, path: &Path) -> crate::Result<Vec<TrashEntry>> {
        let key = path.to_string_lossy();
        self.query("find by original path", SELECT_BY_PATH, Some(&*key))
    }

    fn delete_by_name(&mut self, name: &str) -> crate::Result<usize> {
        self.with_transaction("delete", |tx| tx.execute(DELETE_BY_NAME, params![name]))
    }

    fn list_all(&self) -> crate::Result<Vec<TrashEntry>> {
        self.query("list", SELECT_ALL, None)
    }

    fn truncate(&mut self) -> crate::Result<()> {
        self.with_transaction("truncate", |tx| {
            tx.execute(DELETE_ALL, [])?;
            tx.execute_batch(CREATE_TABLE)
        })
    }
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<TrashEntry> {
    let time: Option<String> = row.get(1)?;
    let path: String = row.get(3)?;
    Ok(TrashEntry {
        id: row.get(0)?,
        timestamp: time.as_deref().and_then(parse_catalog_time),
        name: row.get(2)?,
        original_path: PathBuf::from(path),
    })
}
