//! Read-only repositories over the two lookup tables.
//!
//! # Invariants
//! - Lookup rows are written only by bootstrap seeding; these repositories
//!   expose reads only.
//! - An unknown code in storage is `InvalidData`, never silently skipped.

use super::{ensure_connection_ready, RepoError, RepoResult};
use crate::model::status::{
    ApplicationStatus, ApplicationStatusCode, PollutionLevel, PollutionStatus,
};
use rusqlite::{Connection, OptionalExtension};

const LOOKUP_COLUMNS: &[&str] = &["code", "name", "comment"];

/// Repository interface for the `PollutionStatus` lookup table.
pub trait PollutionStatusRepository {
    fn find_all(&self) -> RepoResult<Vec<PollutionStatus>>;
    fn find_by_id(&self, code: PollutionLevel) -> RepoResult<Option<PollutionStatus>>;
}

/// Repository interface for the `ApplicationStatus` lookup table.
pub trait ApplicationStatusRepository {
    fn find_all(&self) -> RepoResult<Vec<ApplicationStatus>>;
    fn find_by_id(&self, code: ApplicationStatusCode) -> RepoResult<Option<ApplicationStatus>>;
}

/// SQLite-backed pollution status lookup.
pub struct SqlitePollutionStatusRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePollutionStatusRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "PollutionStatus", LOOKUP_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl PollutionStatusRepository for SqlitePollutionStatusRepository<'_> {
    fn find_all(&self) -> RepoResult<Vec<PollutionStatus>> {
        load_lookup_rows(self.conn, "PollutionStatus")?
            .into_iter()
            .map(|(code, name, comment)| {
                Ok(PollutionStatus {
                    code: parse_pollution_code(&code)?,
                    name,
                    comment,
                })
            })
            .collect()
    }

    fn find_by_id(&self, code: PollutionLevel) -> RepoResult<Option<PollutionStatus>> {
        let row = load_lookup_row(self.conn, "PollutionStatus", code.as_str())?;
        Ok(row.map(|(name, comment)| PollutionStatus {
            code,
            name,
            comment,
        }))
    }
}

/// SQLite-backed application status lookup.
pub struct SqliteApplicationStatusRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteApplicationStatusRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "ApplicationStatus", LOOKUP_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl ApplicationStatusRepository for SqliteApplicationStatusRepository<'_> {
    fn find_all(&self) -> RepoResult<Vec<ApplicationStatus>> {
        load_lookup_rows(self.conn, "ApplicationStatus")?
            .into_iter()
            .map(|(code, name, comment)| {
                Ok(ApplicationStatus {
                    code: parse_status_code(&code)?,
                    name,
                    comment,
                })
            })
            .collect()
    }

    fn find_by_id(&self, code: ApplicationStatusCode) -> RepoResult<Option<ApplicationStatus>> {
        let row = load_lookup_row(self.conn, "ApplicationStatus", code.as_str())?;
        Ok(row.map(|(name, comment)| ApplicationStatus {
            code,
            name,
            comment,
        }))
    }
}

pub(crate) fn parse_pollution_code(value: &str) -> RepoResult<PollutionLevel> {
    PollutionLevel::parse(value).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid pollution code `{value}`"))
    })
}

pub(crate) fn parse_status_code(value: &str) -> RepoResult<ApplicationStatusCode> {
    ApplicationStatusCode::parse(value).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid application status code `{value}`"))
    })
}

fn load_lookup_rows(
    conn: &Connection,
    table: &'static str,
) -> RepoResult<Vec<(String, String, Option<String>)>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT code, name, comment FROM {table} ORDER BY rowid ASC;"
    ))?;
    let mut rows = stmt.query([])?;
    let mut values = Vec::new();
    while let Some(row) = rows.next()? {
        values.push((row.get("code")?, row.get("name")?, row.get("comment")?));
    }
    Ok(values)
}

fn load_lookup_row(
    conn: &Connection,
    table: &'static str,
    code: &str,
) -> RepoResult<Option<(String, Option<String>)>> {
    let row = conn
        .query_row(
            &format!("SELECT name, comment FROM {table} WHERE code = ?1;"),
            [code],
            |row| Ok((row.get("name")?, row.get("comment")?)),
        )
        .optional()?;
    Ok(row)
}
