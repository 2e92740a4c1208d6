//! Client repository contract and SQLite implementation.
//!
//! # Invariants
//! - Deleting a client removes its applications in the same transaction.
//! - Duplicate cleanup keeps the lowest id per phone number and cascades to
//!   the applications of removed rows.

use super::contact_table::{self, ContactParams, ContactRow, CLIENT_TABLE};
use super::RepoResult;
use crate::model::contact::{Client, ClientId};
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Repository interface for client persistence.
pub trait ClientRepository {
    /// All clients in id order.
    fn find_all(&self) -> RepoResult<Vec<Client>>;
    fn find_by_id(&self, id: ClientId) -> RepoResult<Option<Client>>;
    /// Inserts when `client.id` is `None`, otherwise updates that row.
    fn save(&self, client: Client) -> RepoResult<Client>;
    /// Deletes the client and all its applications. Returns whether the
    /// client row existed.
    fn delete(&self, id: ClientId) -> RepoResult<bool>;
    /// Returns the number of client rows removed.
    fn delete_duplicate_phones(&self) -> RepoResult<usize>;
}

/// SQLite-backed client repository.
pub struct SqliteClientRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteClientRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        contact_table::ensure_ready(conn, CLIENT_TABLE)?;
        Ok(Self { conn })
    }
}

impl ClientRepository for SqliteClientRepository<'_> {
    fn find_all(&self) -> RepoResult<Vec<Client>> {
        let rows = contact_table::find_all(self.conn, CLIENT_TABLE)?;
        Ok(rows.into_iter().map(client_from_row).collect())
    }

    fn find_by_id(&self, id: ClientId) -> RepoResult<Option<Client>> {
        let row = contact_table::find_by_id(self.conn, CLIENT_TABLE, id)?;
        Ok(row.map(client_from_row))
    }

    fn save(&self, mut client: Client) -> RepoResult<Client> {
        client.validate()?;

        match client.id {
            Some(id) => contact_table::update(self.conn, CLIENT_TABLE, id, &params_of(&client))?,
            None => {
                let id = contact_table::insert(self.conn, CLIENT_TABLE, &params_of(&client))?;
                client.id = Some(id);
            }
        }
        Ok(client)
    }

    fn delete(&self, id: ClientId) -> RepoResult<bool> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute("DELETE FROM Application WHERE client_id = ?1;", [id])?;
        let removed = contact_table::delete(&tx, CLIENT_TABLE, id)?;
        tx.commit()?;
        Ok(removed)
    }

    fn delete_duplicate_phones(&self) -> RepoResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "DELETE FROM Application
             WHERE client_id IN (
                SELECT id
                FROM Client
                WHERE id NOT IN (
                    SELECT MIN(id)
                    FROM Client
                    GROUP BY phone
                )
             );",
            [],
        )?;
        let removed = contact_table::delete_duplicate_phones(&tx, CLIENT_TABLE)?;
        tx.commit()?;
        Ok(removed)
    }
}

fn params_of(client: &Client) -> ContactParams<'_> {
    ContactParams {
        last_name: &client.last_name,
        name: &client.name,
        patronymic: &client.patronymic,
        phone: &client.phone,
        email: &client.email,
    }
}

fn client_from_row(row: ContactRow) -> Client {
    Client {
        id: Some(row.id),
        last_name: row.last_name,
        name: row.name,
        patronymic: row.patronymic,
        phone: row.phone,
        email: row.email,
    }
}
