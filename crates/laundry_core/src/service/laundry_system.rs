//! Laundry domain service.
//!
//! # Responsibility
//! - Enforce validation and referential rules storage does not guarantee.
//! - Compose repository calls into use-cases (registration, requests,
//!   status updates, deletion, login).
//! - Remove duplicate contacts once at start-up.
//!
//! # Invariants
//! - Every rejected command leaves storage untouched.
//! - An application is created only when its client and both lookup rows
//!   resolve and `item_count > 0`.
//! - Status transitions are unrestricted: any code may replace any other.
//! - Log events carry ids and counts only, never names, phones or emails.

use crate::model::application::{Application, ApplicationDetails, ApplicationId};
use crate::model::contact::{Admin, AdminId, Client, ClientId};
use crate::model::status::{
    ApplicationStatus, ApplicationStatusCode, PollutionLevel, PollutionStatus,
};
use crate::model::validation::{normalize_phone, ValidationError};
use crate::repo::admin_repo::{AdminRepository, SqliteAdminRepository};
use crate::repo::application_repo::{ApplicationRepository, SqliteApplicationRepository};
use crate::repo::client_repo::{ClientRepository, SqliteClientRepository};
use crate::repo::status_repo::{
    ApplicationStatusRepository, PollutionStatusRepository, SqliteApplicationStatusRepository,
    SqlitePollutionStatusRepository,
};
use crate::repo::RepoError;
use crate::service::session::Session;
use log::{info, warn};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors from laundry use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Malformed or missing input.
    Validation(ValidationError),
    /// Referenced client does not exist.
    ClientNotFound(ClientId),
    /// Referenced admin does not exist.
    AdminNotFound(AdminId),
    /// Pollution lookup row is missing.
    PollutionStatusNotFound(PollutionLevel),
    /// Application status lookup row is missing.
    ApplicationStatusNotFound(ApplicationStatusCode),
    /// Operation needs a client session.
    ClientSessionRequired,
    /// Storage failure, including UNIQUE violations on phone/email.
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "validation error: {err}"),
            Self::ClientNotFound(id) => write!(f, "client with id {id} does not exist"),
            Self::AdminNotFound(id) => write!(f, "admin with id {id} does not exist"),
            Self::PollutionStatusNotFound(code) => {
                write!(f, "pollution status {code} does not exist")
            }
            Self::ApplicationStatusNotFound(code) => {
                write!(f, "application status {code} does not exist")
            }
            Self::ClientSessionRequired => write!(f, "operation requires a client session"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound {
                entity: "Client",
                id,
            } => Self::ClientNotFound(id),
            RepoError::NotFound { entity: "Admin", id } => Self::AdminNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl ServiceError {
    /// Whether the error is a rejected input or unresolved reference, as
    /// opposed to a storage failure.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::Repo(_))
    }
}

/// Contact fields entered on registration, admin-add or profile edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub last_name: String,
    pub name: String,
    pub patronymic: String,
    pub phone: String,
    pub email: String,
}

impl ContactForm {
    pub fn new(
        last_name: impl Into<String>,
        name: impl Into<String>,
        patronymic: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            last_name: last_name.into(),
            name: name.into(),
            patronymic: patronymic.into(),
            phone: phone.into(),
            email: email.into(),
        }
    }

    fn into_client(self, id: Option<ClientId>) -> Client {
        let mut client = Client::new(
            self.last_name.trim(),
            self.name.trim(),
            self.patronymic.trim(),
            normalize_phone(&self.phone),
            self.email.trim(),
        );
        client.id = id;
        client
    }

    fn into_admin(self) -> Admin {
        Admin::new(
            self.last_name.trim(),
            self.name.trim(),
            self.patronymic.trim(),
            normalize_phone(&self.phone),
            self.email.trim(),
        )
    }
}

/// Request model for creating an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewApplication {
    pub client_id: ClientId,
    pub item_count: i64,
    pub pollution: PollutionLevel,
    pub status: ApplicationStatusCode,
}

/// Rows removed by duplicate cleanup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub clients_removed: usize,
    pub admins_removed: usize,
}

/// Domain service over the five laundry repositories.
pub struct LaundrySystem<'conn> {
    clients: SqliteClientRepository<'conn>,
    admins: SqliteAdminRepository<'conn>,
    applications: SqliteApplicationRepository<'conn>,
    pollution_statuses: SqlitePollutionStatusRepository<'conn>,
    application_statuses: SqliteApplicationStatusRepository<'conn>,
}

impl<'conn> LaundrySystem<'conn> {
    /// Builds the service over a migrated connection and runs duplicate
    /// cleanup once.
    pub fn open(conn: &'conn Connection) -> ServiceResult<Self> {
        let system = Self {
            clients: SqliteClientRepository::try_new(conn)?,
            admins: SqliteAdminRepository::try_new(conn)?,
            applications: SqliteApplicationRepository::try_new(conn)?,
            pollution_statuses: SqlitePollutionStatusRepository::try_new(conn)?,
            application_statuses: SqliteApplicationStatusRepository::try_new(conn)?,
        };
        system.cleanup_duplicates()?;
        Ok(system)
    }

    // Clients

    pub fn clients(&self) -> ServiceResult<Vec<Client>> {
        Ok(self.clients.find_all()?)
    }

    pub fn client(&self, id: ClientId) -> ServiceResult<Option<Client>> {
        Ok(self.clients.find_by_id(id)?)
    }

    /// Registers a client. Phone/email collisions surface as storage errors.
    pub fn create_client(&self, form: ContactForm) -> ServiceResult<Client> {
        let client = form.into_client(None);
        client.validate()?;
        let saved = self.clients.save(client)?;
        info!(
            "event=client_create module=service status=ok client_id={}",
            saved.id.unwrap_or_default()
        );
        Ok(saved)
    }

    /// Replaces every contact field of an existing client.
    pub fn update_client(&self, id: ClientId, form: ContactForm) -> ServiceResult<Client> {
        let client = form.into_client(Some(id));
        client.validate()?;
        let saved = self.clients.save(client)?;
        info!("event=client_update module=service status=ok client_id={id}");
        Ok(saved)
    }

    /// Deletes the client and all of its applications in one transaction.
    pub fn delete_client(&self, id: ClientId) -> ServiceResult<bool> {
        let removed = self.clients.delete(id)?;
        info!("event=client_delete module=service status=ok client_id={id} removed={removed}");
        Ok(removed)
    }

    // Admins

    pub fn admins(&self) -> ServiceResult<Vec<Admin>> {
        Ok(self.admins.find_all()?)
    }

    pub fn admin(&self, id: AdminId) -> ServiceResult<Option<Admin>> {
        Ok(self.admins.find_by_id(id)?)
    }

    pub fn create_admin(&self, form: ContactForm) -> ServiceResult<Admin> {
        let admin = form.into_admin();
        admin.validate()?;
        let saved = self.admins.save(admin)?;
        info!(
            "event=admin_create module=service status=ok admin_id={}",
            saved.id.unwrap_or_default()
        );
        Ok(saved)
    }

    pub fn delete_admin(&self, id: AdminId) -> ServiceResult<bool> {
        let removed = self.admins.delete(id)?;
        info!("event=admin_delete module=service status=ok admin_id={id} removed={removed}");
        Ok(removed)
    }

    // Applications

    pub fn applications(&self) -> ServiceResult<Vec<Application>> {
        Ok(self.applications.find_all()?)
    }

    pub fn application(&self, id: ApplicationId) -> ServiceResult<Option<Application>> {
        Ok(self.applications.find_by_id(id)?)
    }

    /// Lists a client's applications; the client itself must exist.
    pub fn applications_for_client(&self, client_id: ClientId) -> ServiceResult<Vec<Application>> {
        self.ensure_client_exists(client_id)?;
        Ok(self.applications.find_by_client_id(client_id)?)
    }

    /// Creates an application after resolving all three references.
    pub fn create_application(&self, request: &NewApplication) -> ServiceResult<Application> {
        self.ensure_client_exists(request.client_id)?;
        self.ensure_pollution_exists(request.pollution)?;
        self.ensure_status_exists(request.status)?;

        let application = Application::new(
            request.client_id,
            request.item_count,
            request.pollution,
            request.status,
        );
        if let Err(err) = application.validate() {
            warn!(
                "event=application_create module=service status=rejected reason=item_count client_id={}",
                request.client_id
            );
            return Err(err.into());
        }

        let saved = self.applications.save(application)?;
        info!(
            "event=application_create module=service status=ok application_id={} client_id={}",
            saved.id.unwrap_or_default(),
            saved.client_id
        );
        Ok(saved)
    }

    /// Sets a new status on an application.
    ///
    /// Returns `Ok(false)` when the application does not exist. An unknown
    /// status row is an error. Any transition is allowed, including to the
    /// current status.
    pub fn update_application_status(
        &self,
        id: ApplicationId,
        status: ApplicationStatusCode,
    ) -> ServiceResult<bool> {
        self.ensure_status_exists(status)?;
        let updated = self.applications.update_status(id, status)?;
        if updated {
            info!(
                "event=application_status module=service status=ok application_id={id} new_status={status}"
            );
        } else {
            warn!(
                "event=application_status module=service status=not_found application_id={id}"
            );
        }
        Ok(updated)
    }

    pub fn delete_application(&self, id: ApplicationId) -> ServiceResult<bool> {
        let removed = self.applications.delete(id)?;
        info!(
            "event=application_delete module=service status=ok application_id={id} removed={removed}"
        );
        Ok(removed)
    }

    /// Applications joined with client and lookup rows, for exports.
    pub fn application_details(&self) -> ServiceResult<Vec<ApplicationDetails>> {
        Ok(self.applications.find_all_details()?)
    }

    // Lookups

    pub fn pollution_statuses(&self) -> ServiceResult<Vec<PollutionStatus>> {
        Ok(self.pollution_statuses.find_all()?)
    }

    pub fn application_statuses(&self) -> ServiceResult<Vec<ApplicationStatus>> {
        Ok(self.application_statuses.find_all()?)
    }

    // Maintenance

    /// Keeps the lowest id per phone number among clients and, separately,
    /// among admins.
    pub fn cleanup_duplicates(&self) -> ServiceResult<CleanupReport> {
        let report = CleanupReport {
            clients_removed: self.clients.delete_duplicate_phones()?,
            admins_removed: self.admins.delete_duplicate_phones()?,
        };
        info!(
            "event=cleanup_duplicates module=service status=ok clients_removed={} admins_removed={}",
            report.clients_removed, report.admins_removed
        );
        Ok(report)
    }

    // Authentication

    /// First client whose first name matches case-insensitively and whose
    /// phone matches after trimming. Not a security mechanism.
    pub fn authenticate_client(&self, name: &str, phone: &str) -> ServiceResult<Option<Client>> {
        let found = self
            .clients
            .find_all()?
            .into_iter()
            .find(|client| client.matches_login(name, phone));
        Ok(found)
    }

    /// Admin counterpart of [`Self::authenticate_client`].
    pub fn authenticate_admin(&self, name: &str, phone: &str) -> ServiceResult<Option<Admin>> {
        let found = self
            .admins
            .find_all()?
            .into_iter()
            .find(|admin| admin.matches_login(name, phone));
        Ok(found)
    }

    pub fn login_client(&self, name: &str, phone: &str) -> ServiceResult<Option<Session>> {
        let session = self.authenticate_client(name, phone)?.map(Session::Client);
        log_login("client", session.is_some());
        Ok(session)
    }

    pub fn login_admin(&self, name: &str, phone: &str) -> ServiceResult<Option<Session>> {
        let session = self.authenticate_admin(name, phone)?.map(Session::Admin);
        log_login("admin", session.is_some());
        Ok(session)
    }

    // Session-scoped

    /// Own applications for a client session, every application for admins.
    pub fn session_applications(&self, session: &Session) -> ServiceResult<Vec<Application>> {
        match session {
            Session::Client(client) => self.applications_for_client(session_client_id(client)?),
            Session::Admin(_) => self.applications(),
        }
    }

    /// Creates an `IN_PROGRESS` application owned by the session's client.
    pub fn submit_application(
        &self,
        session: &Session,
        item_count: i64,
        pollution: PollutionLevel,
    ) -> ServiceResult<Application> {
        let client = session.client().ok_or(ServiceError::ClientSessionRequired)?;
        self.create_application(&NewApplication {
            client_id: session_client_id(client)?,
            item_count,
            pollution,
            status: ApplicationStatusCode::InProgress,
        })
    }

    /// Replaces the session client's profile and refreshes the session.
    pub fn update_profile(&self, session: &mut Session, form: ContactForm) -> ServiceResult<()> {
        let Session::Client(client) = session else {
            return Err(ServiceError::ClientSessionRequired);
        };
        let updated = self.update_client(session_client_id(client)?, form)?;
        *client = updated;
        Ok(())
    }

    /// Deletes the session's client with its applications, ending the session.
    pub fn delete_own_profile(&self, session: Session) -> ServiceResult<bool> {
        let Session::Client(client) = session else {
            return Err(ServiceError::ClientSessionRequired);
        };
        self.delete_client(session_client_id(&client)?)
    }

    fn ensure_client_exists(&self, id: ClientId) -> ServiceResult<()> {
        if self.clients.find_by_id(id)?.is_none() {
            warn!("event=reference_check module=service status=rejected reason=client_not_found client_id={id}");
            return Err(ServiceError::ClientNotFound(id));
        }
        Ok(())
    }

    fn ensure_pollution_exists(&self, code: PollutionLevel) -> ServiceResult<()> {
        if self.pollution_statuses.find_by_id(code)?.is_none() {
            warn!("event=reference_check module=service status=rejected reason=pollution_not_found code={code}");
            return Err(ServiceError::PollutionStatusNotFound(code));
        }
        Ok(())
    }

    fn ensure_status_exists(&self, code: ApplicationStatusCode) -> ServiceResult<()> {
        if self.application_statuses.find_by_id(code)?.is_none() {
            warn!("event=reference_check module=service status=rejected reason=status_not_found code={code}");
            return Err(ServiceError::ApplicationStatusNotFound(code));
        }
        Ok(())
    }
}

// Sessions are built from persisted rows, so a missing id means the record
// was constructed by hand.
fn session_client_id(client: &Client) -> ServiceResult<ClientId> {
    client.id.ok_or(ServiceError::ClientSessionRequired)
}

fn log_login(role: &'static str, ok: bool) {
    if ok {
        info!("event=login module=service status=ok role={role}");
    } else {
        warn!("event=login module=service status=rejected role={role}");
    }
}
