//! Bazaar Core - Shared domain types.
//!
//! This crate provides common types used across all Bazaar components:
//! - `api` - The marketplace HTTP backend
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. Everything here is usable from tests without any infrastructure.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, slugs, roles,
//!   and the order status state machine

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
