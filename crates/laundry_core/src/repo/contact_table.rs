//! SQL shared by the `Client` and `Admin` tables.
//!
//! Both tables have identical columns; the table name is always one of the
//! two `&'static str` constants, never caller input.

use super::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

pub(crate) const CLIENT_TABLE: &str = "Client";
pub(crate) const ADMIN_TABLE: &str = "Admin";

const CONTACT_COLUMNS: &[&str] = &["id", "last_name", "name", "patronymic", "phone", "email"];

/// Owned row read back from a contact table.
pub(crate) struct ContactRow {
    pub id: i64,
    pub last_name: String,
    pub name: String,
    pub patronymic: String,
    pub phone: String,
    pub email: String,
}

/// Borrowed column values written to a contact table.
pub(crate) struct ContactParams<'a> {
    pub last_name: &'a str,
    pub name: &'a str,
    pub patronymic: &'a str,
    pub phone: &'a str,
    pub email: &'a str,
}

pub(crate) fn ensure_ready(conn: &Connection, table: &'static str) -> RepoResult<()> {
    ensure_connection_ready(conn, table, CONTACT_COLUMNS)
}

pub(crate) fn find_all(conn: &Connection, table: &str) -> RepoResult<Vec<ContactRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, last_name, name, patronymic, phone, email
         FROM {table}
         ORDER BY id ASC;"
    ))?;
    let mut rows = stmt.query([])?;
    let mut contacts = Vec::new();
    while let Some(row) = rows.next()? {
        contacts.push(parse_contact_row(row)?);
    }
    Ok(contacts)
}

pub(crate) fn find_by_id(conn: &Connection, table: &str, id: i64) -> RepoResult<Option<ContactRow>> {
    let row = conn
        .query_row(
            &format!(
                "SELECT id, last_name, name, patronymic, phone, email
                 FROM {table}
                 WHERE id = ?1;"
            ),
            [id],
            parse_contact_row,
        )
        .optional()?;
    Ok(row)
}

pub(crate) fn insert(conn: &Connection, table: &str, contact: &ContactParams<'_>) -> RepoResult<i64> {
    conn.execute(
        &format!(
            "INSERT INTO {table} (last_name, name, patronymic, phone, email)
             VALUES (?1, ?2, ?3, ?4, ?5);"
        ),
        params![
            contact.last_name,
            contact.name,
            contact.patronymic,
            contact.phone,
            contact.email,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub(crate) fn update(
    conn: &Connection,
    table: &'static str,
    id: i64,
    contact: &ContactParams<'_>,
) -> RepoResult<()> {
    let changed = conn.execute(
        &format!(
            "UPDATE {table}
             SET
                last_name = ?1,
                name = ?2,
                patronymic = ?3,
                phone = ?4,
                email = ?5
             WHERE id = ?6;"
        ),
        params![
            contact.last_name,
            contact.name,
            contact.patronymic,
            contact.phone,
            contact.email,
            id,
        ],
    )?;

    if changed == 0 {
        return Err(RepoError::NotFound { entity: table, id });
    }
    Ok(())
}

pub(crate) fn delete(conn: &Connection, table: &str, id: i64) -> RepoResult<bool> {
    let changed = conn.execute(&format!("DELETE FROM {table} WHERE id = ?1;"), [id])?;
    Ok(changed > 0)
}

/// Keeps the lowest id per phone number and deletes the other rows.
pub(crate) fn delete_duplicate_phones(conn: &Connection, table: &str) -> RepoResult<usize> {
    let removed = conn.execute(
        &format!(
            "DELETE FROM {table}
             WHERE id NOT IN (
                SELECT MIN(id)
                FROM {table}
                GROUP BY phone
             );"
        ),
        [],
    )?;
    Ok(removed)
}

fn parse_contact_row(row: &Row<'_>) -> rusqlite::Result<ContactRow> {
    Ok(ContactRow {
        id: row.get("id")?,
        last_name: row.get("last_name")?,
        name: row.get("name")?,
        patronymic: row.get("patronymic")?,
        phone: row.get("phone")?,
        email: row.get("email")?,
    })
}
