//! Application (laundry service request) records and the denormalized
//! read model consumed by exports.
//!
//! # Invariants
//! - `item_count > 0`.
//! - `received_at` is assigned by storage on insert and never rewritten.
//! - Only `status` changes after creation through the status-update path.

use super::contact::ClientId;
use super::status::{ApplicationStatusCode, PollutionLevel};
use super::validation::ValidationError;
use serde::{Deserialize, Serialize};

/// Storage-generated application identity.
pub type ApplicationId = i64;

/// Laundry service request owned by one client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    /// `None` until the first save.
    pub id: Option<ApplicationId>,
    pub client_id: ClientId,
    pub item_count: i64,
    pub pollution: PollutionLevel,
    pub status: ApplicationStatusCode,
    /// Receipt time in epoch milliseconds. `None` until the first save.
    pub received_at: Option<i64>,
}

impl Application {
    /// Creates an unsaved application.
    pub fn new(
        client_id: ClientId,
        item_count: i64,
        pollution: PollutionLevel,
        status: ApplicationStatusCode,
    ) -> Self {
        Self {
            id: None,
            client_id,
            item_count,
            pollution,
            status,
            received_at: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.item_count <= 0 {
            return Err(ValidationError::NonPositiveItemCount(self.item_count));
        }
        Ok(())
    }
}

/// Application joined with its client and both lookup rows.
///
/// Field names are the stable export names. Joined parts are `None` when
/// the referenced row is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationDetails {
    pub application_id: ApplicationId,
    pub number_of_items: i64,
    pub time_of_receipt: i64,
    pub client: ClientSummary,
    pub pollution_status: PollutionStatusSummary,
    pub application_status: ApplicationStatusSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSummary {
    pub client_id: Option<ClientId>,
    pub last_name: Option<String>,
    pub name: Option<String>,
    pub patronymic: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollutionStatusSummary {
    pub pollution_status_id: Option<String>,
    pub name: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationStatusSummary {
    pub application_status_id: Option<String>,
    pub name: Option<String>,
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::Application;
    use crate::model::status::{ApplicationStatusCode, PollutionLevel};
    use crate::model::validation::ValidationError;

    #[test]
    fn item_count_must_be_positive() {
        let zero = Application::new(1, 0, PollutionLevel::Low, ApplicationStatusCode::InProgress);
        assert_eq!(
            zero.validate(),
            Err(ValidationError::NonPositiveItemCount(0))
        );

        let one = Application::new(1, 1, PollutionLevel::Low, ApplicationStatusCode::InProgress);
        assert!(one.validate().is_ok());
    }
}
