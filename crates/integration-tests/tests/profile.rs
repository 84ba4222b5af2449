//! Integration tests for the profile account area.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The storefront server running (cargo run -p copperleaf-storefront)
//!
//! Run with: cargo test -p copperleaf-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use copperleaf_integration_tests::{
    client, client_no_redirect, register_user, storefront_base_url, test_pool,
};

/// A complete, valid profile payload.
fn profile_payload(first_name: &str, country_id: i64) -> Value {
    json!({
        "first_name": first_name,
        "last_name": "Okafor",
        "phone": "+1 503 555 0144",
        "shipping": {
            "address1": "1 Fern Road",
            "city": "Portland",
            "state": "OR",
            "zip": "97201",
            "country_id": country_id,
        },
        "billing": {
            "address1": "2 Fern Road",
            "city": "Portland",
            "state": "OR",
            "zip": "97201",
            "country_id": country_id,
        },
    })
}

async fn user_id_by_email(pool: &sqlx::PgPool, email: &str) -> i32 {
    sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind(email)
        .fetch_one(pool)
        .await
        .expect("user row should exist")
}

async fn any_country_id(pool: &sqlx::PgPool) -> i64 {
    let id: i32 = sqlx::query_scalar("SELECT id FROM countries ORDER BY name LIMIT 1")
        .fetch_one(pool)
        .await
        .expect("countries should be seeded");
    i64::from(id)
}

async fn count_addresses(pool: &sqlx::PgPool, user_id: i32) -> i64 {
    sqlx::query_scalar("SELECT count(*) FROM customer_addresses WHERE customer_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .expect("count query should succeed")
}

// ============================================================================
// Upsert Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_first_profile_save_creates_customer_and_both_addresses() {
    let pool = test_pool().await;
    let http = client_no_redirect();
    let base_url = storefront_base_url();

    let email = register_user(&http).await;
    let user_id = user_id_by_email(&pool, &email).await;
    let country_id = any_country_id(&pool).await;

    // Fresh user: no customer, no addresses yet
    let customers: i64 =
        sqlx::query_scalar("SELECT count(*) FROM customers WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&pool)
            .await
            .expect("count query should succeed");
    assert_eq!(customers, 0);

    // Save the profile
    let response = http
        .post(format!("{base_url}/profile"))
        .json(&profile_payload("Jane", country_id))
        .send()
        .await
        .expect("profile save should not error");

    // Redirect back to the profile page
    assert!(response.status().is_redirection());
    let location = response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert_eq!(location, "/profile");

    // Exactly one customer and one address per kind, correctly linked
    let customers: i64 =
        sqlx::query_scalar("SELECT count(*) FROM customers WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&pool)
            .await
            .expect("count query should succeed");
    assert_eq!(customers, 1);
    assert_eq!(count_addresses(&pool, user_id).await, 2);

    let kinds: Vec<String> = sqlx::query_scalar(
        "SELECT address_type::text FROM customer_addresses \
         WHERE customer_id = $1 ORDER BY address_type",
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await
    .expect("kind query should succeed");
    assert_eq!(kinds, vec!["billing".to_string(), "shipping".to_string()]);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_second_profile_save_mutates_in_place() {
    let pool = test_pool().await;
    let http = client();
    let base_url = storefront_base_url();

    let email = register_user(&http).await;
    let user_id = user_id_by_email(&pool, &email).await;
    let country_id = any_country_id(&pool).await;

    for first_name in ["Jane", "Janet"] {
        let response = http
            .post(format!("{base_url}/profile"))
            .json(&profile_payload(first_name, country_id))
            .send()
            .await
            .expect("profile save should not error");
        assert!(response.status().is_success());
    }

    // Still exactly three records
    let customers: i64 =
        sqlx::query_scalar("SELECT count(*) FROM customers WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&pool)
            .await
            .expect("count query should succeed");
    assert_eq!(customers, 1);
    assert_eq!(count_addresses(&pool, user_id).await, 2);

    // And the customer reflects the second write
    let first_name: String =
        sqlx::query_scalar("SELECT first_name FROM customers WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&pool)
            .await
            .expect("customer row should exist");
    assert_eq!(first_name, "Janet");
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_missing_billing_address_is_created_on_save() {
    let pool = test_pool().await;
    let http = client();
    let base_url = storefront_base_url();

    let email = register_user(&http).await;
    let user_id = user_id_by_email(&pool, &email).await;
    let country_id = any_country_id(&pool).await;

    // Seed a customer with only a shipping address, bypassing the handler
    sqlx::query("INSERT INTO customers (user_id, first_name, last_name) VALUES ($1, 'Jane', 'Okafor')")
        .bind(user_id)
        .execute(&pool)
        .await
        .expect("seed customer");
    sqlx::query(
        "INSERT INTO customer_addresses \
         (customer_id, address_type, address1, city, state, zip, country_id) \
         VALUES ($1, 'shipping', '1 Fern Road', 'Portland', 'OR', '97201', $2)",
    )
    .bind(user_id)
    .bind(i32::try_from(country_id).expect("country id fits i32"))
    .execute(&pool)
    .await
    .expect("seed shipping address");

    let response = http
        .post(format!("{base_url}/profile"))
        .json(&profile_payload("Jane", country_id))
        .send()
        .await
        .expect("profile save should not error");
    assert!(response.status().is_success());

    // The shipping address was updated, and exactly one billing row appeared
    assert_eq!(count_addresses(&pool, user_id).await, 2);
    let billing: i64 = sqlx::query_scalar(
        "SELECT count(*) FROM customer_addresses \
         WHERE customer_id = $1 AND address_type = 'billing'",
    )
    .bind(user_id)
    .fetch_one(&pool)
    .await
    .expect("count query should succeed");
    assert_eq!(billing, 1);
}

// ============================================================================
// View & Flash Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_profile_view_renders_placeholders_for_fresh_user() {
    let http = client();
    let base_url = storefront_base_url();

    register_user(&http).await;

    let body = http
        .get(format!("{base_url}/profile"))
        .send()
        .await
        .expect("profile view should load")
        .text()
        .await
        .expect("profile view should have a body");

    // Both address blocks render even though nothing is persisted
    assert!(body.contains("Shipping address"));
    assert!(body.contains("Billing address"));
    assert!(body.contains("Select a country"));
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_flash_message_is_shown_exactly_once() {
    let pool = test_pool().await;
    let http = client();
    let base_url = storefront_base_url();

    register_user(&http).await;
    let country_id = any_country_id(&pool).await;

    let response = http
        .post(format!("{base_url}/profile"))
        .json(&profile_payload("Jane", country_id))
        .send()
        .await
        .expect("profile save should not error");
    // Redirect followed: the landing page shows the flash
    assert!(response.status().is_success());
    let body = response.text().await.expect("body");
    assert!(body.contains("Profile was successfully updated."));

    // The next render must not
    let body = http
        .get(format!("{base_url}/profile"))
        .send()
        .await
        .expect("profile view should load")
        .text()
        .await
        .expect("body");
    assert!(!body.contains("Profile was successfully updated."));
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_countries_render_in_alphabetical_order() {
    let http = client();
    let base_url = storefront_base_url();

    register_user(&http).await;

    let body = http
        .get(format!("{base_url}/profile"))
        .send()
        .await
        .expect("profile view should load")
        .text()
        .await
        .expect("body");

    let australia = body.find("Australia").expect("Australia in country list");
    let germany = body.find("Germany").expect("Germany in country list");
    let united_states = body
        .find("United States")
        .expect("United States in country list");
    assert!(australia < germany && germany < united_states);
}

// ============================================================================
// Validation & Auth Gate Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_invalid_profile_payload_returns_field_keyed_422() {
    let pool = test_pool().await;
    let http = client();
    let base_url = storefront_base_url();

    register_user(&http).await;
    let country_id = any_country_id(&pool).await;

    let mut payload = profile_payload("", country_id);
    payload["shipping"]["address1"] = json!("");
    payload["billing"]["country_id"] = json!(0);

    let response = http
        .post(format!("{base_url}/profile"))
        .json(&payload)
        .send()
        .await
        .expect("request should not error");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = response.json().await.expect("422 body should be JSON");
    let errors = body["errors"].as_object().expect("errors object");
    assert!(errors.contains_key("first_name"));
    assert!(errors.contains_key("shipping.address1"));
    assert!(errors.contains_key("billing.country_id"));
    // Valid fields are absent
    assert!(!errors.contains_key("last_name"));
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_profile_requires_login() {
    let http = client_no_redirect();
    let base_url = storefront_base_url();

    // Anonymous HTML request: redirected to login
    let response = http
        .get(format!("{base_url}/profile"))
        .send()
        .await
        .expect("request should not error");
    assert!(response.status().is_redirection());

    // Anonymous JSON request: plain 401
    let response = http
        .post(format!("{base_url}/profile"))
        .json(&json!({}))
        .send()
        .await
        .expect("request should not error");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
