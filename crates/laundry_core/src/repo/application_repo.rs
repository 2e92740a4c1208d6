//! Application repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist laundry requests and their status changes.
//! - Provide the joined read model (`ApplicationDetails`) used by exports.
//!
//! # Invariants
//! - `received_at` comes from the column default and is never written by
//!   update paths.
//! - `update_status` touches only `status_code`.
//! - Reference existence is not checked here; the service owns that rule and
//!   foreign keys are the last line.

use super::status_repo::{parse_pollution_code, parse_status_code};
use super::{ensure_connection_ready, RepoError, RepoResult};
use crate::model::application::{
    Application, ApplicationDetails, ApplicationId, ApplicationStatusSummary, ClientSummary,
    PollutionStatusSummary,
};
use crate::model::contact::ClientId;
use crate::model::status::ApplicationStatusCode;
use rusqlite::{params, Connection, Row};

const APPLICATION_SELECT_SQL: &str = "SELECT
    id,
    client_id,
    item_count,
    pollution_code,
    status_code,
    received_at
FROM Application";

const APPLICATION_COLUMNS: &[&str] = &[
    "id",
    "client_id",
    "item_count",
    "pollution_code",
    "status_code",
    "received_at",
];

/// Repository interface for application persistence.
pub trait ApplicationRepository {
    /// All applications in id order.
    fn find_all(&self) -> RepoResult<Vec<Application>>;
    fn find_by_id(&self, id: ApplicationId) -> RepoResult<Option<Application>>;
    /// Applications owned by one client; empty when none.
    fn find_by_client_id(&self, client_id: ClientId) -> RepoResult<Vec<Application>>;
    /// Inserts when `application.id` is `None`, otherwise updates that row.
    ///
    /// The returned record always carries the stored `received_at`.
    fn save(&self, application: Application) -> RepoResult<Application>;
    /// Returns whether a row was affected.
    fn update_status(&self, id: ApplicationId, status: ApplicationStatusCode) -> RepoResult<bool>;
    fn delete(&self, id: ApplicationId) -> RepoResult<bool>;
    /// Every application joined with its client and lookup rows, in id order.
    fn find_all_details(&self) -> RepoResult<Vec<ApplicationDetails>>;
}

/// SQLite-backed application repository.
pub struct SqliteApplicationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteApplicationRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "Application", APPLICATION_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl ApplicationRepository for SqliteApplicationRepository<'_> {
    fn find_all(&self) -> RepoResult<Vec<Application>> {
        self.query_applications(&format!("{APPLICATION_SELECT_SQL} ORDER BY id ASC;"), None)
    }

    fn find_by_id(&self, id: ApplicationId) -> RepoResult<Option<Application>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{APPLICATION_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_application_row(row)?));
        }
        Ok(None)
    }

    fn find_by_client_id(&self, client_id: ClientId) -> RepoResult<Vec<Application>> {
        self.query_applications(
            &format!("{APPLICATION_SELECT_SQL} WHERE client_id = ?1 ORDER BY id ASC;"),
            Some(client_id),
        )
    }

    fn save(&self, mut application: Application) -> RepoResult<Application> {
        application.validate()?;

        let id = match application.id {
            Some(id) => {
                let changed = self.conn.execute(
                    "UPDATE Application
                     SET
                        client_id = ?1,
                        item_count = ?2,
                        pollution_code = ?3,
                        status_code = ?4
                     WHERE id = ?5;",
                    params![
                        application.client_id,
                        application.item_count,
                        application.pollution.as_str(),
                        application.status.as_str(),
                        id,
                    ],
                )?;
                if changed == 0 {
                    return Err(RepoError::NotFound {
                        entity: "Application",
                        id,
                    });
                }
                id
            }
            None => {
                self.conn.execute(
                    "INSERT INTO Application (client_id, item_count, pollution_code, status_code)
                     VALUES (?1, ?2, ?3, ?4);",
                    params![
                        application.client_id,
                        application.item_count,
                        application.pollution.as_str(),
                        application.status.as_str(),
                    ],
                )?;
                self.conn.last_insert_rowid()
            }
        };

        let received_at: i64 = self.conn.query_row(
            "SELECT received_at FROM Application WHERE id = ?1;",
            [id],
            |row| row.get(0),
        )?;
        application.id = Some(id);
        application.received_at = Some(received_at);
        Ok(application)
    }

    fn update_status(&self, id: ApplicationId, status: ApplicationStatusCode) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE Application SET status_code = ?1 WHERE id = ?2;",
            params![status.as_str(), id],
        )?;
        Ok(changed > 0)
    }

    fn delete(&self, id: ApplicationId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM Application WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn find_all_details(&self) -> RepoResult<Vec<ApplicationDetails>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                a.id AS application_id,
                a.item_count AS number_of_items,
                a.received_at AS time_of_receipt,
                c.id AS client_id,
                c.last_name AS client_last_name,
                c.name AS client_name,
                c.patronymic AS client_patronymic,
                c.phone AS client_phone,
                c.email AS client_email,
                p.code AS pollution_code,
                p.name AS pollution_name,
                p.comment AS pollution_comment,
                s.code AS status_code,
                s.name AS status_name,
                s.comment AS status_comment
             FROM Application a
             LEFT JOIN Client c ON c.id = a.client_id
             LEFT JOIN PollutionStatus p ON p.code = a.pollution_code
             LEFT JOIN ApplicationStatus s ON s.code = a.status_code
             ORDER BY a.id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut details = Vec::new();
        while let Some(row) = rows.next()? {
            details.push(parse_details_row(row)?);
        }
        Ok(details)
    }
}

impl SqliteApplicationRepository<'_> {
    fn query_applications(
        &self,
        sql: &str,
        client_id: Option<ClientId>,
    ) -> RepoResult<Vec<Application>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = match client_id {
            Some(client_id) => stmt.query([client_id])?,
            None => stmt.query([])?,
        };
        let mut applications = Vec::new();
        while let Some(row) = rows.next()? {
            applications.push(parse_application_row(row)?);
        }
        Ok(applications)
    }
}

fn parse_application_row(row: &Row<'_>) -> RepoResult<Application> {
    let pollution_text: String = row.get("pollution_code")?;
    let status_text: String = row.get("status_code")?;

    Ok(Application {
        id: Some(row.get("id")?),
        client_id: row.get("client_id")?,
        item_count: row.get("item_count")?,
        pollution: parse_pollution_code(&pollution_text)?,
        status: parse_status_code(&status_text)?,
        received_at: Some(row.get("received_at")?),
    })
}

fn parse_details_row(row: &Row<'_>) -> RepoResult<ApplicationDetails> {
    Ok(ApplicationDetails {
        application_id: row.get("application_id")?,
        number_of_items: row.get("number_of_items")?,
        time_of_receipt: row.get("time_of_receipt")?,
        client: ClientSummary {
            client_id: row.get("client_id")?,
            last_name: row.get("client_last_name")?,
            name: row.get("client_name")?,
            patronymic: row.get("client_patronymic")?,
            phone_number: row.get("client_phone")?,
            email: row.get("client_email")?,
        },
        pollution_status: PollutionStatusSummary {
            pollution_status_id: row.get("pollution_code")?,
            name: row.get("pollution_name")?,
            comment: row.get("pollution_comment")?,
        },
        application_status: ApplicationStatusSummary {
            application_status_id: row.get("status_code")?,
            name: row.get("status_name")?,
            comment: row.get("status_comment")?,
        },
    })
}
