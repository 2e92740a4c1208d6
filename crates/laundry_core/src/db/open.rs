//! Opening the laundry database.
//!
//! Every connection handed out here has `foreign_keys=ON`, the latest schema
//! and seeded lookup tables. Callers own the connection and lend it to
//! repositories; nothing here keeps a handle.

use super::migrations::apply_migrations;
use super::seed::seed_database;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// What happens after the schema is in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOptions {
    /// Insert demo clients/admins when the respective table is empty.
    pub seed_demo_contacts: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            seed_demo_contacts: true,
        }
    }
}

enum Target<'a> {
    File(&'a Path),
    Memory,
}

impl Target<'_> {
    fn mode(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Memory => "memory",
        }
    }
}

/// Opens (creating if needed) the database file at `path`.
///
/// Missing parent directories are created.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_db_with(path, OpenOptions::default())
}

pub fn open_db_with(path: impl AsRef<Path>, options: OpenOptions) -> DbResult<Connection> {
    open_target(Target::File(path.as_ref()), options)
}

/// Opens a private in-memory database, mainly for tests.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_db_in_memory_with(OpenOptions::default())
}

pub fn open_db_in_memory_with(options: OpenOptions) -> DbResult<Connection> {
    open_target(Target::Memory, options)
}

fn open_target(target: Target<'_>, options: OpenOptions) -> DbResult<Connection> {
    let started_at = Instant::now();
    let mode = target.mode();

    let result = connect(&target).and_then(|mut conn| {
        prepare_connection(&mut conn, options)?;
        Ok(conn)
    });

    let duration_ms = started_at.elapsed().as_millis();
    match &result {
        Ok(_) => info!("event=db_open module=db status=ok mode={mode} duration_ms={duration_ms}"),
        Err(err) => error!(
            "event=db_open module=db status=error mode={mode} duration_ms={duration_ms} error_code={} error={err}",
            error_code(err)
        ),
    }
    result
}

fn connect(target: &Target<'_>) -> DbResult<Connection> {
    match target {
        Target::File(path) => {
            if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            Ok(Connection::open(path)?)
        }
        Target::Memory => Ok(Connection::open_in_memory()?),
    }
}

fn prepare_connection(conn: &mut Connection, options: OpenOptions) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_migrations(conn)?;
    seed_database(conn, options.seed_demo_contacts)
}

fn error_code(err: &DbError) -> &'static str {
    match err {
        DbError::Io(_) => "db_dir_failed",
        DbError::UnsupportedSchemaVersion { .. } => "db_schema_too_new",
        DbError::Sqlite(_) => "db_sqlite_failed",
    }
}
