//! Domain models for the storefront.
//!
//! These types represent validated domain objects separate from database
//! row types; the repositories in [`crate::db`] do the mapping.

pub mod customer;
pub mod session;
pub mod user;

pub use customer::{AddressFields, Country, Customer, CustomerAddress, CustomerFields};
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
