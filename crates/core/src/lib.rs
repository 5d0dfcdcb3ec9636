//! Domain types for the CueTime reservation service.
//!
//! This crate holds the models shared between the API and database layers:
//! reservations and their status state machine, billiard tables, users, the
//! half-open interval type used for conflict detection, and the error taxonomy.

pub mod errors;
pub mod models;
