//! Core types for Copperleaf.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod email;
pub mod id;

pub use address::AddressType;
pub use email::{Email, EmailError};
pub use id::*;
