//! Integration tests for password changes.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The storefront server running (cargo run -p copperleaf-storefront)
//!
//! Run with: cargo test -p copperleaf-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use copperleaf_integration_tests::{
    TEST_PASSWORD, client, client_no_redirect, register_user, storefront_base_url, test_pool,
};
use copperleaf_storefront::services::auth::verify_password;

const NEW_PASSWORD: &str = "copper kettle 42";

async fn stored_hash(pool: &sqlx::PgPool, email: &str) -> String {
    sqlx::query_scalar(
        "SELECT p.password_hash FROM user_passwords p \
         JOIN users u ON u.id = p.user_id WHERE u.email = $1",
    )
    .bind(email)
    .fetch_one(pool)
    .await
    .expect("password row should exist")
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_password_update_stores_verifiable_hash_not_plaintext() {
    let pool = test_pool().await;
    let http = client();
    let base_url = storefront_base_url();

    let email = register_user(&http).await;

    let response = http
        .post(format!("{base_url}/profile/password"))
        .json(&json!({
            "new_password": NEW_PASSWORD,
            "new_password_confirmation": NEW_PASSWORD,
        }))
        .send()
        .await
        .expect("password update should not error");
    assert!(response.status().is_success());

    let hash = stored_hash(&pool, &email).await;

    // Never the plaintext; always an argon2 PHC string the verifier accepts
    assert_ne!(hash, NEW_PASSWORD);
    assert!(hash.starts_with("$argon2"));
    assert!(verify_password(NEW_PASSWORD, &hash).is_ok());
    assert!(verify_password(TEST_PASSWORD, &hash).is_err());
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_password_update_flash_appears_on_next_profile_render() {
    let http = client();
    let base_url = storefront_base_url();

    register_user(&http).await;

    let response = http
        .post(format!("{base_url}/profile/password"))
        .json(&json!({
            "new_password": NEW_PASSWORD,
            "new_password_confirmation": NEW_PASSWORD,
        }))
        .send()
        .await
        .expect("password update should not error");
    assert!(response.status().is_success());

    let body = http
        .get(format!("{base_url}/profile"))
        .send()
        .await
        .expect("profile view should load")
        .text()
        .await
        .expect("body");
    assert!(body.contains("Your password was successfully updated."));
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_login_works_with_new_password_only() {
    let http = client_no_redirect();
    let base_url = storefront_base_url();

    let email = register_user(&http).await;

    let response = http
        .post(format!("{base_url}/profile/password"))
        .json(&json!({
            "new_password": NEW_PASSWORD,
            "new_password_confirmation": NEW_PASSWORD,
        }))
        .send()
        .await
        .expect("password update should not error");
    assert!(response.status().is_success());

    // Log out, then log back in with each password
    http.post(format!("{base_url}/auth/logout"))
        .send()
        .await
        .expect("logout should not error");

    let old = http
        .post(format!("{base_url}/auth/login"))
        .form(&[("email", email.as_str()), ("password", TEST_PASSWORD)])
        .send()
        .await
        .expect("login should not error");
    let old_location = old
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(old_location.contains("error=credentials"));

    let new = http
        .post(format!("{base_url}/auth/login"))
        .form(&[("email", email.as_str()), ("password", NEW_PASSWORD)])
        .send()
        .await
        .expect("login should not error");
    let new_location = new
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert_eq!(new_location, "/profile");
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_password_mismatch_rejected_with_422() {
    let http = client();
    let base_url = storefront_base_url();

    register_user(&http).await;

    let response = http
        .post(format!("{base_url}/profile/password"))
        .json(&json!({
            "new_password": "long enough password",
            "new_password_confirmation": "a different password",
        }))
        .send()
        .await
        .expect("request should not error");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = response.json().await.expect("422 body should be JSON");
    assert!(
        body["errors"]
            .as_object()
            .expect("errors object")
            .contains_key("new_password_confirmation")
    );
}
