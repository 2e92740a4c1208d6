//! Admin repository contract and SQLite implementation.
//!
//! Admins own no applications, so deletes touch a single row.

use super::contact_table::{self, ContactParams, ContactRow, ADMIN_TABLE};
use super::RepoResult;
use crate::model::contact::{Admin, AdminId};
use rusqlite::Connection;

/// Repository interface for admin persistence.
pub trait AdminRepository {
    /// All admins in id order.
    fn find_all(&self) -> RepoResult<Vec<Admin>>;
    fn find_by_id(&self, id: AdminId) -> RepoResult<Option<Admin>>;
    /// Inserts when `admin.id` is `None`, otherwise updates that row.
    fn save(&self, admin: Admin) -> RepoResult<Admin>;
    fn delete(&self, id: AdminId) -> RepoResult<bool>;
    /// Returns the number of admin rows removed.
    fn delete_duplicate_phones(&self) -> RepoResult<usize>;
}

/// SQLite-backed admin repository.
pub struct SqliteAdminRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAdminRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        contact_table::ensure_ready(conn, ADMIN_TABLE)?;
        Ok(Self { conn })
    }
}

impl AdminRepository for SqliteAdminRepository<'_> {
    fn find_all(&self) -> RepoResult<Vec<Admin>> {
        let rows = contact_table::find_all(self.conn, ADMIN_TABLE)?;
        Ok(rows.into_iter().map(admin_from_row).collect())
    }

    fn find_by_id(&self, id: AdminId) -> RepoResult<Option<Admin>> {
        let row = contact_table::find_by_id(self.conn, ADMIN_TABLE, id)?;
        Ok(row.map(admin_from_row))
    }

    fn save(&self, mut admin: Admin) -> RepoResult<Admin> {
        admin.validate()?;

        match admin.id {
            Some(id) => contact_table::update(self.conn, ADMIN_TABLE, id, &params_of(&admin))?,
            None => {
                let id = contact_table::insert(self.conn, ADMIN_TABLE, &params_of(&admin))?;
                admin.id = Some(id);
            }
        }
        Ok(admin)
    }

    fn delete(&self, id: AdminId) -> RepoResult<bool> {
        contact_table::delete(self.conn, ADMIN_TABLE, id)
    }

    fn delete_duplicate_phones(&self) -> RepoResult<usize> {
        contact_table::delete_duplicate_phones(self.conn, ADMIN_TABLE)
    }
}

fn params_of(admin: &Admin) -> ContactParams<'_> {
    ContactParams {
        last_name: &admin.last_name,
        name: &admin.name,
        patronymic: &admin.patronymic,
        phone: &admin.phone,
        email: &admin.email,
    }
}

fn admin_from_row(row: ContactRow) -> Admin {
    Admin {
        id: Some(row.id),
        last_name: row.last_name,
        name: row.name,
        patronymic: row.patronymic,
        phone: row.phone,
        email: row.email,
    }
}
