//! Core domain logic for the laundry record-keeping tool.
//! This crate is the single source of truth for business invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::LaundryConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::application::{
    Application, ApplicationDetails, ApplicationId, ApplicationStatusSummary, ClientSummary,
    PollutionStatusSummary,
};
pub use model::contact::{Admin, AdminId, Client, ClientId};
pub use model::status::{
    ApplicationStatus, ApplicationStatusCode, PollutionLevel, PollutionStatus, UnknownCodeError,
};
pub use model::validation::ValidationError;
pub use repo::admin_repo::{AdminRepository, SqliteAdminRepository};
pub use repo::application_repo::{ApplicationRepository, SqliteApplicationRepository};
pub use repo::client_repo::{ClientRepository, SqliteClientRepository};
pub use repo::status_repo::{
    ApplicationStatusRepository, PollutionStatusRepository, SqliteApplicationStatusRepository,
    SqlitePollutionStatusRepository,
};
pub use repo::{RepoError, RepoResult};
pub use service::laundry_system::{
    CleanupReport, ContactForm, LaundrySystem, NewApplication, ServiceError, ServiceResult,
};
pub use service::session::{Role, Session};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
