//! User domain types.

use chrono::{DateTime, Utc};

use copperleaf_core::{Email, UserId};

/// A storefront user (domain type).
///
/// The account identity. Profile data lives on the optional
/// [`Customer`](crate::models::customer::Customer) record; the password
/// credential is stored separately and only ever as a hash.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}
