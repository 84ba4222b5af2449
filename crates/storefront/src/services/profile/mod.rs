//! Profile service.
//!
//! Assembles the profile page data and performs the profile/address upsert.
//! Customer and address records are created lazily on the first save and
//! updated in place afterwards; this service never deletes them.

use sqlx::PgPool;

use copperleaf_core::{AddressType, UserId};

use crate::db::RepositoryError;
use crate::db::countries::CountryRepository;
use crate::db::customers::CustomerRepository;
use crate::models::customer::{AddressFields, Country, Customer, CustomerAddress, CustomerFields};

/// Data backing the profile page.
///
/// Absent records stay absent here; the view layer decides how to render
/// placeholders for them.
#[derive(Debug)]
pub struct ProfilePage {
    /// The user's customer record, if a profile was ever saved.
    pub customer: Option<Customer>,
    /// Persisted shipping address, if any.
    pub shipping: Option<CustomerAddress>,
    /// Persisted billing address, if any.
    pub billing: Option<CustomerAddress>,
    /// All countries, sorted ascending by name.
    pub countries: Vec<Country>,
}

/// Profile service.
pub struct ProfileService<'a> {
    customers: CustomerRepository<'a>,
    countries: CountryRepository<'a>,
}

impl<'a> ProfileService<'a> {
    /// Create a new profile service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            customers: CustomerRepository::new(pool),
            countries: CountryRepository::new(pool),
        }
    }

    /// Load everything the profile page needs for a user.
    ///
    /// A user who never saved a profile has no customer record and therefore
    /// no addresses; both lookups short-circuit to `None` in that case.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if any lookup fails.
    pub async fn profile_page(&self, user_id: UserId) -> Result<ProfilePage, RepositoryError> {
        let customer = self.customers.get_by_user_id(user_id).await?;

        let (shipping, billing) = match &customer {
            Some(customer) => (
                self.customers
                    .get_address(customer.user_id, AddressType::Shipping)
                    .await?,
                self.customers
                    .get_address(customer.user_id, AddressType::Billing)
                    .await?,
            ),
            None => (None, None),
        };

        let countries = self.countries.list_all().await?;

        Ok(ProfilePage {
            customer,
            shipping,
            billing,
            countries,
        })
    }

    /// Persist a profile update: customer plus both addresses, each
    /// update-if-exists-else-create.
    ///
    /// Up to three writes. The customer record is upserted first so the
    /// address writes can reference its key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if any write fails.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        customer: &CustomerFields,
        shipping: &AddressFields,
        billing: &AddressFields,
    ) -> Result<(), RepositoryError> {
        let customer = match self.customers.get_by_user_id(user_id).await? {
            Some(_) => self.customers.update(user_id, customer).await?,
            None => self.customers.create(user_id, customer).await?,
        };

        self.upsert_address(customer.user_id, AddressType::Shipping, shipping)
            .await?;
        self.upsert_address(customer.user_id, AddressType::Billing, billing)
            .await?;

        Ok(())
    }

    async fn upsert_address(
        &self,
        customer_id: UserId,
        kind: AddressType,
        fields: &AddressFields,
    ) -> Result<(), RepositoryError> {
        match self.customers.get_address(customer_id, kind).await? {
            Some(existing) => {
                self.customers.update_address(existing.id, fields).await?;
            }
            None => {
                self.customers
                    .create_address(customer_id, kind, fields)
                    .await?;
            }
        }

        Ok(())
    }
}
