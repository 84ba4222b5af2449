//! Customer profile and address domain types.

use chrono::{DateTime, Utc};

use copperleaf_core::{AddressId, AddressType, CountryId, UserId};

/// A customer profile record.
///
/// Keyed 1:1 by the owning user's ID; created lazily on the first profile
/// save, never deleted by this service.
#[derive(Debug, Clone)]
pub struct Customer {
    /// The owning user's ID (also the customer key).
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A customer's shipping or billing address.
#[derive(Debug, Clone)]
pub struct CustomerAddress {
    /// Database ID of this address.
    pub id: AddressId,
    /// The owning customer's key (the user's ID).
    pub customer_id: UserId,
    /// Whether this is the shipping or the billing address.
    pub kind: AddressType,
    pub address1: String,
    pub address2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country_id: CountryId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A country (read-only reference data).
#[derive(Debug, Clone)]
pub struct Country {
    pub id: CountryId,
    pub name: String,
}

/// Writable customer profile fields, used for both create and update.
#[derive(Debug, Clone)]
pub struct CustomerFields {
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
}

/// Writable address fields, used for both create and update.
///
/// The address kind is not part of the fields: it is fixed at creation and
/// never changed by an update.
#[derive(Debug, Clone)]
pub struct AddressFields {
    pub address1: String,
    pub address2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country_id: CountryId,
}
