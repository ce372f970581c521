//! Database-backed domain models.
//!
//! These structs map one-to-one onto rows; request/response DTOs live in
//! the route modules that use them.

pub mod cart;
pub mod message;
pub mod order;
pub mod product;
pub mod review;
pub mod social;
pub mod user;
