//! Address kind discriminant.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Discriminant distinguishing the shipping and billing address of a customer.
///
/// A customer has at most one address of each kind. Stored in `PostgreSQL`
/// as the `address_type` enum (with the `postgres` feature).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "address_type", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum AddressType {
    Shipping,
    Billing,
}

impl AddressType {
    /// Stable string form, matching the database enum labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shipping => "shipping",
            Self::Billing => "billing",
        }
    }
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_str() {
        assert_eq!(AddressType::Shipping.as_str(), "shipping");
        assert_eq!(AddressType::Billing.as_str(), "billing");
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&AddressType::Billing).expect("serialize");
        assert_eq!(json, "\"billing\"");

        let parsed: AddressType = serde_json::from_str("\"shipping\"").expect("deserialize");
        assert_eq!(parsed, AddressType::Shipping);
    }
}
