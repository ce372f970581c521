//! Business logic services.
//!
//! Services hold no authoritative state: every decision point re-reads the
//! persisted row before mutating it, and relies on the database's own
//! transaction semantics for isolation.

pub mod auth;
pub mod orders;
pub mod reviews;
pub mod token;
