//! Profile route handlers.
//!
//! These routes require authentication. The profile form posts JSON with
//! nested `shipping` and `billing` objects; payloads pass through the
//! request validation layer before the handlers run.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::Redirect};
use serde::Deserialize;
use tower_sessions::Session;

use copperleaf_core::{AddressType, CountryId};

use crate::error::AppError;
use crate::filters;
use crate::middleware::auth::RequireAuth;
use crate::middleware::flash;
use crate::models::customer::{AddressFields, Country, Customer, CustomerAddress, CustomerFields};
use crate::services::auth::{AuthService, MIN_PASSWORD_LENGTH};
use crate::services::profile::ProfileService;
use crate::state::AppState;
use crate::validation::{
    Validate, ValidatedJson, ValidationErrors, check_max_length, require_filled,
};

/// Flash notice after a successful profile save.
const PROFILE_UPDATED: &str = "Profile was successfully updated.";

/// Flash notice after a successful password change.
const PASSWORD_UPDATED: &str = "Your password was successfully updated.";

const MAX_NAME_LENGTH: usize = 100;
const MAX_PHONE_LENGTH: usize = 32;
const MAX_LINE_LENGTH: usize = 255;
const MAX_ZIP_LENGTH: usize = 16;

// =============================================================================
// Request Types
// =============================================================================

/// Profile update payload: customer fields plus both address sub-objects.
#[derive(Debug, Deserialize)]
pub struct ProfileUpdateRequest {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub shipping: AddressPayload,
    pub billing: AddressPayload,
}

/// One address sub-object of the profile update payload.
#[derive(Debug, Deserialize)]
pub struct AddressPayload {
    pub address1: String,
    #[serde(default)]
    pub address2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country_id: i32,
}

impl AddressPayload {
    /// Validate this sub-object, keying failures as `<prefix>.<field>`.
    fn validate_under(&self, prefix: &str, errors: &mut ValidationErrors) {
        let field = |name: &str| format!("{prefix}.{name}");

        require_filled(errors, &field("address1"), &self.address1);
        check_max_length(errors, &field("address1"), &self.address1, MAX_LINE_LENGTH);
        if let Some(address2) = &self.address2 {
            check_max_length(errors, &field("address2"), address2, MAX_LINE_LENGTH);
        }
        require_filled(errors, &field("city"), &self.city);
        check_max_length(errors, &field("city"), &self.city, MAX_NAME_LENGTH);
        require_filled(errors, &field("state"), &self.state);
        check_max_length(errors, &field("state"), &self.state, MAX_NAME_LENGTH);
        require_filled(errors, &field("zip"), &self.zip);
        check_max_length(errors, &field("zip"), &self.zip, MAX_ZIP_LENGTH);
        if self.country_id < 1 {
            errors.add(
                field("country_id"),
                format!("The {prefix}.country_id field is required."),
            );
        }
    }

    fn to_fields(&self) -> AddressFields {
        AddressFields {
            address1: self.address1.clone(),
            address2: self.address2.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            zip: self.zip.clone(),
            country_id: CountryId::new(self.country_id),
        }
    }
}

impl Validate for ProfileUpdateRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        require_filled(&mut errors, "first_name", &self.first_name);
        check_max_length(&mut errors, "first_name", &self.first_name, MAX_NAME_LENGTH);
        require_filled(&mut errors, "last_name", &self.last_name);
        check_max_length(&mut errors, "last_name", &self.last_name, MAX_NAME_LENGTH);
        if let Some(phone) = &self.phone {
            check_max_length(&mut errors, "phone", phone, MAX_PHONE_LENGTH);
        }

        self.shipping.validate_under("shipping", &mut errors);
        self.billing.validate_under("billing", &mut errors);

        errors.into_result()
    }
}

impl ProfileUpdateRequest {
    fn customer_fields(&self) -> CustomerFields {
        CustomerFields {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            phone: self.phone.clone(),
        }
    }
}

/// Password change payload.
///
/// The current password is not requested here; whether to require it is the
/// validation owner's call and would be one more rule in `validate`.
#[derive(Debug, Deserialize)]
pub struct PasswordUpdateRequest {
    pub new_password: String,
    pub new_password_confirmation: String,
}

impl Validate for PasswordUpdateRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.new_password.len() < MIN_PASSWORD_LENGTH {
            errors.add(
                "new_password",
                format!("The new_password must be at least {MIN_PASSWORD_LENGTH} characters."),
            );
        }
        if self.new_password != self.new_password_confirmation {
            errors.add(
                "new_password_confirmation",
                "The new_password_confirmation does not match.",
            );
        }

        errors.into_result()
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Customer fields as rendered in the profile form.
#[derive(Clone)]
pub struct CustomerFormView {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

impl CustomerFormView {
    fn from_customer(customer: Option<&Customer>) -> Self {
        customer.map_or_else(
            || Self {
                first_name: String::new(),
                last_name: String::new(),
                phone: String::new(),
            },
            |c| Self {
                first_name: c.first_name.clone(),
                last_name: c.last_name.clone(),
                phone: c.phone.clone().unwrap_or_default(),
            },
        )
    }
}

/// One address block of the profile form.
///
/// For a user with no persisted address this is a placeholder: empty fields
/// tagged with the correct kind, so the form renders without a record.
#[derive(Clone)]
pub struct AddressFormView {
    pub kind: AddressType,
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country_id: Option<i32>,
}

impl AddressFormView {
    /// An empty, unsaved address block of the given kind.
    #[must_use]
    pub fn placeholder(kind: AddressType) -> Self {
        Self {
            kind,
            address1: String::new(),
            address2: String::new(),
            city: String::new(),
            state: String::new(),
            zip: String::new(),
            country_id: None,
        }
    }

    fn from_address(address: &CustomerAddress) -> Self {
        Self {
            kind: address.kind,
            address1: address.address1.clone(),
            address2: address.address2.clone().unwrap_or_default(),
            city: address.city.clone(),
            state: address.state.clone(),
            zip: address.zip.clone(),
            country_id: Some(address.country_id.as_i32()),
        }
    }

    fn from_page(address: Option<&CustomerAddress>, kind: AddressType) -> Self {
        address.map_or_else(|| Self::placeholder(kind), Self::from_address)
    }

    /// True when this address points at the given country (for `selected`).
    #[must_use]
    pub fn is_country(&self, id: i32) -> bool {
        self.country_id == Some(id)
    }
}

/// Country display data for the address selects.
#[derive(Clone)]
pub struct CountryOption {
    pub id: i32,
    pub name: String,
}

impl From<Country> for CountryOption {
    fn from(c: Country) -> Self {
        Self {
            id: c.id.as_i32(),
            name: c.name,
        }
    }
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "profile/view.html")]
pub struct ProfileTemplate {
    pub email: String,
    pub customer: CustomerFormView,
    pub shipping: AddressFormView,
    pub billing: AddressFormView,
    pub countries: Vec<CountryOption>,
    pub flash: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the profile page.
///
/// Renders the persisted addresses where they exist and typed placeholders
/// where they don't, plus the country list sorted by name. Consumes the
/// flash message, if one was set by a preceding save.
pub async fn view(
    State(state): State<AppState>,
    RequireAuth(current_user): RequireAuth,
    session: Session,
) -> Result<ProfileTemplate, AppError> {
    let page = ProfileService::new(state.pool())
        .profile_page(current_user.id)
        .await?;

    let flash = flash::take(&session).await;

    Ok(ProfileTemplate {
        email: current_user.email.to_string(),
        customer: CustomerFormView::from_customer(page.customer.as_ref()),
        shipping: AddressFormView::from_page(page.shipping.as_ref(), AddressType::Shipping),
        billing: AddressFormView::from_page(page.billing.as_ref(), AddressType::Billing),
        countries: page.countries.into_iter().map(CountryOption::from).collect(),
        flash,
    })
}

/// Save the profile: customer record plus both addresses, upserted.
///
/// Redirects back to the profile page with a flash notice on success.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(current_user): RequireAuth,
    session: Session,
    ValidatedJson(request): ValidatedJson<ProfileUpdateRequest>,
) -> Result<Redirect, AppError> {
    ProfileService::new(state.pool())
        .update_profile(
            current_user.id,
            &request.customer_fields(),
            &request.shipping.to_fields(),
            &request.billing.to_fields(),
        )
        .await?;

    if let Err(e) = flash::set(&session, PROFILE_UPDATED).await {
        tracing::warn!("Failed to set flash message: {}", e);
    }

    Ok(Redirect::to("/profile"))
}

/// Change the user's password.
///
/// Responds 200 with no body; the flash notice is visible on the next
/// profile render.
pub async fn update_password(
    State(state): State<AppState>,
    RequireAuth(current_user): RequireAuth,
    session: Session,
    ValidatedJson(request): ValidatedJson<PasswordUpdateRequest>,
) -> Result<(), AppError> {
    AuthService::new(state.pool())
        .change_password(current_user.id, &request.new_password)
        .await?;

    if let Err(e) = flash::set(&session, PASSWORD_UPDATED).await {
        tracing::warn!("Failed to set flash message: {}", e);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_address() -> AddressPayload {
        AddressPayload {
            address1: "1 Fern Road".to_owned(),
            address2: None,
            city: "Portland".to_owned(),
            state: "OR".to_owned(),
            zip: "97201".to_owned(),
            country_id: 1,
        }
    }

    fn valid_request() -> ProfileUpdateRequest {
        ProfileUpdateRequest {
            first_name: "Jane".to_owned(),
            last_name: "Okafor".to_owned(),
            phone: None,
            shipping: valid_address(),
            billing: valid_address(),
        }
    }

    #[test]
    fn test_valid_profile_request_passes() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_blank_names_rejected() {
        let mut request = valid_request();
        request.first_name = "   ".to_owned();
        request.last_name = String::new();

        let errors = request.validate().expect_err("should fail");
        assert!(errors.field("first_name").is_some());
        assert!(errors.field("last_name").is_some());
    }

    #[test]
    fn test_address_errors_keyed_by_prefix() {
        let mut request = valid_request();
        request.shipping.address1 = String::new();
        request.billing.country_id = 0;

        let errors = request.validate().expect_err("should fail");
        assert!(errors.field("shipping.address1").is_some());
        assert!(errors.field("billing.country_id").is_some());
        // The valid sub-object contributes nothing
        assert!(errors.field("billing.address1").is_none());
    }

    #[test]
    fn test_all_failures_reported_at_once() {
        let request = ProfileUpdateRequest {
            first_name: String::new(),
            last_name: String::new(),
            phone: None,
            shipping: AddressPayload {
                address1: String::new(),
                address2: None,
                city: String::new(),
                state: String::new(),
                zip: String::new(),
                country_id: 0,
            },
            billing: valid_address(),
        };

        let errors = request.validate().expect_err("should fail");
        for field in [
            "first_name",
            "last_name",
            "shipping.address1",
            "shipping.city",
            "shipping.state",
            "shipping.zip",
            "shipping.country_id",
        ] {
            assert!(errors.field(field).is_some(), "missing errors for {field}");
        }
    }

    #[test]
    fn test_password_too_short_rejected() {
        let request = PasswordUpdateRequest {
            new_password: "short".to_owned(),
            new_password_confirmation: "short".to_owned(),
        };

        let errors = request.validate().expect_err("should fail");
        assert!(errors.field("new_password").is_some());
    }

    #[test]
    fn test_password_confirmation_mismatch_rejected() {
        let request = PasswordUpdateRequest {
            new_password: "long enough password".to_owned(),
            new_password_confirmation: "a different password".to_owned(),
        };

        let errors = request.validate().expect_err("should fail");
        assert!(errors.field("new_password_confirmation").is_some());
    }

    #[test]
    fn test_valid_password_request_passes() {
        let request = PasswordUpdateRequest {
            new_password: "long enough password".to_owned(),
            new_password_confirmation: "long enough password".to_owned(),
        };

        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_placeholder_addresses_are_typed_and_empty() {
        let shipping = AddressFormView::placeholder(AddressType::Shipping);
        let billing = AddressFormView::placeholder(AddressType::Billing);

        assert_eq!(shipping.kind, AddressType::Shipping);
        assert_eq!(billing.kind, AddressType::Billing);
        assert!(shipping.address1.is_empty());
        assert!(shipping.country_id.is_none());
        assert!(!shipping.is_country(1));
    }
}
