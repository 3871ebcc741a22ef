//! # SalonBook Core
//!
//! Domain types and the availability/conflict engine for the SalonBook
//! reservation service. This crate is storage- and framework-independent:
//! the scheduling logic operates on plain values so it can be exercised in
//! isolation from the database and the HTTP layer.

/// Error taxonomy shared across the workspace
pub mod errors;
/// Domain models and request/response types
pub mod models;
/// Availability computation and admission checks
pub mod scheduling;
