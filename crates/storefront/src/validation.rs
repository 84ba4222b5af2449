//! Request validation layer.
//!
//! Payload validation runs before handler code: the [`ValidatedJson`]
//! extractor deserializes the JSON body, runs [`Validate::validate`], and
//! rejects invalid input with a 422 response keyed by field. Handlers
//! therefore only ever receive validated data.
//!
//! The 422 body shape is stable:
//!
//! ```json
//! { "message": "The given data was invalid.", "errors": { "field": ["..."] } }
//! ```

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Field-keyed validation errors.
///
/// Accumulates every failing rule, not just the first, so the client can
/// mark up the whole form in one round trip. Fields are kept in a stable
/// (sorted) order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// Create an empty error set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an error set with a single entry.
    #[must_use]
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Record a failing rule for a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// True when no rule has failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Messages recorded for a field, if any.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&[String]> {
        self.errors.get(name).map(Vec::as_slice)
    }

    /// `Ok(())` when empty, `Err(self)` otherwise.
    ///
    /// # Errors
    ///
    /// Returns `self` if any rule has failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl IntoResponse for ValidationErrors {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "message": "The given data was invalid.",
            "errors": self.errors,
        });
        (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
    }
}

/// A payload that declares its own validation rules.
pub trait Validate {
    /// Check every rule, accumulating all failures.
    ///
    /// # Errors
    ///
    /// Returns the full field-keyed error set if any rule fails.
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// JSON extractor that validates the payload before the handler runs.
///
/// Deserialization failures (missing field, wrong type, malformed JSON) and
/// rule failures both surface as the 422 shape above, so handlers never see
/// invalid input.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                ValidationErrors::single("body", rejection.body_text()).into_response()
            })?;

        value.validate().map_err(IntoResponse::into_response)?;

        Ok(Self(value))
    }
}

// =============================================================================
// Rule helpers
// =============================================================================

/// Require a non-blank string field.
pub fn require_filled(errors: &mut ValidationErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, format!("The {field} field is required."));
    }
}

/// Cap a string field's length.
pub fn check_max_length(errors: &mut ValidationErrors, field: &str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.add(field, format!("The {field} may not exceed {max} characters."));
    }
}
