//! Business logic services.
//!
//! Services borrow the database pool, compose repositories, and keep the
//! route handlers thin.

pub mod auth;
pub mod profile;
