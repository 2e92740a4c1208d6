//! Laundry domain model.
//!
//! # Responsibility
//! - Define the plain records persisted by the repository layer.
//! - Own field-level validation rules shared by every write path.
//!
//! # Invariants
//! - `id == None` means "not persisted yet"; storage assigns identities.
//! - Status codes are closed enums; free-form strings never reach storage.

pub mod application;
pub mod contact;
pub mod status;
pub mod validation;
