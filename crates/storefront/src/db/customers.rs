//! Customer repository: profile records and their shipping/billing addresses.
//!
//! Customers are keyed 1:1 by `user_id`, and `customer_addresses.customer_id`
//! references that key. At most one address exists per kind per customer
//! (`UNIQUE (customer_id, address_type)`).

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use copperleaf_core::{AddressId, AddressType, CountryId, UserId};

use super::RepositoryError;
use crate::models::customer::{AddressFields, Customer, CustomerAddress, CustomerFields};

/// Raw `customers` row.
#[derive(sqlx::FromRow)]
struct CustomerRow {
    user_id: i32,
    first_name: String,
    last_name: String,
    phone: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(r: CustomerRow) -> Self {
        Self {
            user_id: UserId::new(r.user_id),
            first_name: r.first_name,
            last_name: r.last_name,
            phone: r.phone,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Raw `customer_addresses` row.
#[derive(sqlx::FromRow)]
struct AddressRow {
    id: i32,
    customer_id: i32,
    address_type: AddressType,
    address1: String,
    address2: Option<String>,
    city: String,
    state: String,
    zip: String,
    country_id: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AddressRow> for CustomerAddress {
    fn from(r: AddressRow) -> Self {
        Self {
            id: AddressId::new(r.id),
            customer_id: UserId::new(r.customer_id),
            kind: r.address_type,
            address1: r.address1,
            address2: r.address2,
            city: r.city,
            state: r.state,
            zip: r.zip,
            country_id: CountryId::new(r.country_id),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

const CUSTOMER_COLUMNS: &str = "user_id, first_name, last_name, phone, created_at, updated_at";
const ADDRESS_COLUMNS: &str = "id, customer_id, address_type, address1, address2, city, state, \
                               zip, country_id, created_at, updated_at";

/// Repository for customer and address database operations.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the customer record belonging to a user, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_user_id(
        &self,
        user_id: UserId,
    ) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE user_id = $1"
        ))
        .bind(user_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Customer::from))
    }

    /// Create a customer record for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already has a customer.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        user_id: UserId,
        fields: &CustomerFields,
    ) -> Result<Customer, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "INSERT INTO customers (user_id, first_name, last_name, phone) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {CUSTOMER_COLUMNS}"
        ))
        .bind(user_id.as_i32())
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(fields.phone.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("customer already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(row.into())
    }

    /// Update a user's customer record in place.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        user_id: UserId,
        fields: &CustomerFields,
    ) -> Result<Customer, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "UPDATE customers \
             SET first_name = $2, last_name = $3, phone = $4, updated_at = now() \
             WHERE user_id = $1 \
             RETURNING {CUSTOMER_COLUMNS}"
        ))
        .bind(user_id.as_i32())
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(fields.phone.as_deref())
        .fetch_optional(self.pool)
        .await?;

        row.map(Customer::from).ok_or(RepositoryError::NotFound)
    }

    /// Get a customer's address of the given kind, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_address(
        &self,
        customer_id: UserId,
        kind: AddressType,
    ) -> Result<Option<CustomerAddress>, RepositoryError> {
        let row = sqlx::query_as::<_, AddressRow>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM customer_addresses \
             WHERE customer_id = $1 AND address_type = $2"
        ))
        .bind(customer_id.as_i32())
        .bind(kind)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(CustomerAddress::from))
    }

    /// Create an address of the given kind for a customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if an address of this kind already
    /// exists for the customer (concurrent save).
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_address(
        &self,
        customer_id: UserId,
        kind: AddressType,
        fields: &AddressFields,
    ) -> Result<CustomerAddress, RepositoryError> {
        let row = sqlx::query_as::<_, AddressRow>(&format!(
            "INSERT INTO customer_addresses \
             (customer_id, address_type, address1, address2, city, state, zip, country_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(customer_id.as_i32())
        .bind(kind)
        .bind(&fields.address1)
        .bind(fields.address2.as_deref())
        .bind(&fields.city)
        .bind(&fields.state)
        .bind(&fields.zip)
        .bind(fields.country_id.as_i32())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(format!("{kind} address already exists"));
            }
            RepositoryError::Database(e)
        })?;

        Ok(row.into())
    }

    /// Update an existing address in place.
    ///
    /// The address kind is never changed by an update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_address(
        &self,
        address_id: AddressId,
        fields: &AddressFields,
    ) -> Result<CustomerAddress, RepositoryError> {
        let row = sqlx::query_as::<_, AddressRow>(&format!(
            "UPDATE customer_addresses \
             SET address1 = $2, address2 = $3, city = $4, state = $5, zip = $6, \
                 country_id = $7, updated_at = now() \
             WHERE id = $1 \
             RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(address_id.as_i32())
        .bind(&fields.address1)
        .bind(fields.address2.as_deref())
        .bind(&fields.city)
        .bind(&fields.state)
        .bind(&fields.zip)
        .bind(fields.country_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(CustomerAddress::from)
            .ok_or(RepositoryError::NotFound)
    }
}
