//! Country reference data.

use sqlx::PgPool;

use copperleaf_core::CountryId;

use super::RepositoryError;
use crate::models::customer::Country;

#[derive(sqlx::FromRow)]
struct CountryRow {
    id: i32,
    name: String,
}

/// Repository for country lookups.
///
/// Countries are read-only reference data used to populate the address
/// country selects.
pub struct CountryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CountryRepository<'a> {
    /// Create a new country repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all countries, sorted ascending by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Country>, RepositoryError> {
        let rows =
            sqlx::query_as::<_, CountryRow>("SELECT id, name FROM countries ORDER BY name ASC")
                .fetch_all(self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|r| Country {
                id: CountryId::new(r.id),
                name: r.name,
            })
            .collect())
    }
}
