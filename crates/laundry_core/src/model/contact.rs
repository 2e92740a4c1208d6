//! Client and admin records.
//!
//! Both share the same contact shape but live in independent tables and
//! never reference each other.

use super::validation::{validate_contact, ValidationError};
use serde::{Deserialize, Serialize};

/// Storage-generated client identity.
pub type ClientId = i64;
/// Storage-generated admin identity.
pub type AdminId = i64;

/// Laundry customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// `None` until the first save.
    pub id: Option<ClientId>,
    pub last_name: String,
    pub name: String,
    pub patronymic: String,
    /// 11 digits starting with `7`; unique among clients.
    pub phone: String,
    /// Unique among clients.
    pub email: String,
}

impl Client {
    /// Creates an unsaved client record.
    pub fn new(
        last_name: impl Into<String>,
        name: impl Into<String>,
        patronymic: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            last_name: last_name.into(),
            name: name.into(),
            patronymic: patronymic.into(),
            phone: phone.into(),
            email: email.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_contact(
            &self.last_name,
            &self.name,
            &self.patronymic,
            &self.phone,
            &self.email,
        )
    }

    /// Login check: first name case-insensitive, phone after trimming.
    pub fn matches_login(&self, name: &str, phone: &str) -> bool {
        login_matches(&self.name, &self.phone, name, phone)
    }
}

/// Laundry administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admin {
    /// `None` until the first save.
    pub id: Option<AdminId>,
    pub last_name: String,
    pub name: String,
    pub patronymic: String,
    /// 11 digits starting with `7`; unique among admins.
    pub phone: String,
    /// Unique among admins.
    pub email: String,
}

impl Admin {
    /// Creates an unsaved admin record.
    pub fn new(
        last_name: impl Into<String>,
        name: impl Into<String>,
        patronymic: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            last_name: last_name.into(),
            name: name.into(),
            patronymic: patronymic.into(),
            phone: phone.into(),
            email: email.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_contact(
            &self.last_name,
            &self.name,
            &self.patronymic,
            &self.phone,
            &self.email,
        )
    }

    /// Login check: first name case-insensitive, phone after trimming.
    pub fn matches_login(&self, name: &str, phone: &str) -> bool {
        login_matches(&self.name, &self.phone, name, phone)
    }
}

fn login_matches(stored_name: &str, stored_phone: &str, name: &str, phone: &str) -> bool {
    stored_name.trim().to_lowercase() == name.trim().to_lowercase()
        && stored_phone.trim() == phone.trim()
}
