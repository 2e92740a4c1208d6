//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into laundry use-cases.
//! - Keep console/UI callers decoupled from storage details.

pub mod laundry_system;
pub mod session;
