//! Field-level validation rules for contact and application records.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^7[0-9]{10}$").expect("valid phone regex"));

/// Rejected input, reported to the caller as a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required name part is empty or whitespace-only.
    BlankField(&'static str),
    /// Phone is not 11 digits starting with `7`.
    InvalidPhone,
    /// Email lacks `@` or `.`.
    InvalidEmail,
    /// Application item count must be positive.
    NonPositiveItemCount(i64),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "{field} must not be blank"),
            Self::InvalidPhone => write!(
                f,
                "phone number must be 11 digits starting with 7, e.g. 79161234567"
            ),
            Self::InvalidEmail => write!(f, "email must contain `@` and `.`"),
            Self::NonPositiveItemCount(count) => {
                write!(f, "item count must be positive, got {count}")
            }
        }
    }
}

impl Error for ValidationError {}

/// Checks the shared contact shape of clients and admins.
///
/// Name parts are checked in display order: last name, first name, patronymic.
pub fn validate_contact(
    last_name: &str,
    name: &str,
    patronymic: &str,
    phone: &str,
    email: &str,
) -> Result<(), ValidationError> {
    ensure_not_blank("last_name", last_name)?;
    ensure_not_blank("name", name)?;
    ensure_not_blank("patronymic", patronymic)?;

    if !is_valid_phone(phone) {
        return Err(ValidationError::InvalidPhone);
    }
    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

/// Returns whether `phone` is an 11-digit number starting with `7`.
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

/// Returns whether `email` looks like an address.
///
/// Intentionally loose: only `@` and `.` are required.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    !email.is_empty() && email.contains('@') && email.contains('.')
}

/// Normalizes phone input for comparison and storage.
pub fn normalize_phone(phone: &str) -> String {
    phone.trim().to_string()
}

fn ensure_not_blank(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    Ok(())
}
