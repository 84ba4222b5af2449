//! HTTP route handlers for the storefront account area.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health             - Liveness check
//! GET  /health/ready       - Readiness check (database)
//!
//! # Auth
//! GET  /auth/login         - Login page
//! POST /auth/login         - Login action
//! GET  /auth/register      - Register page
//! POST /auth/register      - Register action
//! POST /auth/logout        - Logout action
//!
//! # Profile (requires auth)
//! GET  /profile            - Profile page (customer, addresses, countries)
//! POST /profile            - Save profile + shipping/billing addresses
//! POST /profile/password   - Change password
//! ```

pub mod auth;
pub mod profile;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the profile routes router.
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(profile::view).post(profile::update))
        .route("/password", post(profile::update_password))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/profile", profile_routes())
}
