//! Integration tests for Copperleaf.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and run migrations
//! sqlx migrate run --source crates/storefront/migrations
//!
//! # Start the storefront
//! cargo run -p copperleaf-storefront
//!
//! # Run the (ignored) integration tests
//! cargo test -p copperleaf-integration-tests -- --ignored
//! ```
//!
//! Tests talk to the server over HTTP and assert persisted state directly
//! against the database, so both must be reachable.

use reqwest::{Client, redirect};
use sqlx::PgPool;

/// The password [`register_user`] sets.
pub const TEST_PASSWORD: &str = "orchard gate 77";

/// Base URL for the storefront (configurable via environment).
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// HTTP client with a cookie store, following redirects.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// HTTP client with a cookie store that does NOT follow redirects,
/// for asserting on redirect responses themselves.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn client_no_redirect() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// Connect to the test database.
///
/// # Panics
///
/// Panics if no database URL is configured or the connection fails.
pub async fn test_pool() -> PgPool {
    let url = std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("STOREFRONT_DATABASE_URL or DATABASE_URL must be set");

    PgPool::connect(&url)
        .await
        .expect("Failed to connect to test database")
}

/// A unique throwaway email for one test run.
#[must_use]
pub fn unique_email() -> String {
    format!("test-{}@example.com", uuid::Uuid::new_v4())
}

/// Register (and thereby log in) a fresh user through the HTTP surface.
///
/// Returns the email; the session cookie lands in the client's cookie store.
///
/// # Panics
///
/// Panics if the registration request fails.
pub async fn register_user(client: &Client) -> String {
    let email = unique_email();
    let response = client
        .post(format!("{}/auth/register", storefront_base_url()))
        .form(&[
            ("email", email.as_str()),
            ("password", TEST_PASSWORD),
            ("password_confirm", TEST_PASSWORD),
        ])
        .send()
        .await
        .expect("Failed to register test user");

    assert!(
        response.status().is_success() || response.status().is_redirection(),
        "registration failed with {}",
        response.status()
    );

    email
}
