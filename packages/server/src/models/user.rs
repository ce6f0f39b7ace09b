use serde::{Deserialize, Serialize};

use super::shared::{Pagination, validate_length};
use crate::entity::user;
use crate::error::AppError;

const MAX_EMAIL_LEN: usize = 254;
const MAX_NAME_LEN: usize = 150;

/// Request body for sign-up.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct SignupRequest {
    /// Login identifier; must be unique.
    #[schema(example = "julia@example.com")]
    pub email: String,
    /// Public handle (letters, digits and `.@+-_`).
    #[schema(example = "julia_child")]
    pub username: String,
    #[schema(example = "Julia")]
    pub first_name: String,
    #[schema(example = "Child")]
    pub last_name: String,
    /// Password (8-128 characters).
    #[schema(example = "b0eufBourguignon")]
    pub password: String,
}

pub fn validate_email(email: &str) -> Result<(), AppError> {
    let email = email.trim();
    let well_formed = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    let valid = well_formed
        && email.chars().count() <= MAX_EMAIL_LEN
        && !email.chars().any(char::is_whitespace);
    if !valid {
        return Err(AppError::Validation("Enter a valid email address".into()));
    }
    Ok(())
}

fn validate_username(username: &str) -> Result<(), AppError> {
    validate_length(username, "Username", MAX_NAME_LEN)?;
    if !username
        .trim()
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '@' | '+' | '-'))
    {
        return Err(AppError::Validation(
            "Username may contain only letters, digits and . @ + - _".into(),
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < 8 || password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be 8-128 characters".into(),
        ));
    }
    Ok(())
}

pub fn validate_signup_request(payload: &SignupRequest) -> Result<(), AppError> {
    validate_email(&payload.email)?;
    validate_username(&payload.username)?;
    validate_length(&payload.first_name, "First name", MAX_NAME_LEN)?;
    validate_length(&payload.last_name, "Last name", MAX_NAME_LEN)?;
    validate_password(&payload.password)
}

/// Successful sign-up response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SignupResponse {
    #[schema(example = 42)]
    pub id: i32,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<user::Model> for SignupResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

/// Request body for token login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[schema(example = "julia@example.com")]
    pub email: String,
    #[schema(example = "b0eufBourguignon")]
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.email.trim().is_empty() {
        return Err(AppError::Validation("Email must not be empty".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    Ok(())
}

/// Successful login response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct TokenResponse {
    /// JWT bearer token.
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub auth_token: String,
}

/// Request body for changing the caller's password.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct SetPasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Confirmation for deleting the caller's own account.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct DeleteAccountRequest {
    pub current_password: String,
}

/// Public user profile, personalised with the caller's subscription state.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UserResponse {
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "julia@example.com")]
    pub email: String,
    #[schema(example = "julia_child")]
    pub username: String,
    #[schema(example = "Julia")]
    pub first_name: String,
    #[schema(example = "Child")]
    pub last_name: String,
    /// Whether the caller follows this user. Always `false` for anonymous callers.
    pub is_subscribed: bool,
}

impl UserResponse {
    pub fn new(user: user::Model, is_subscribed: bool) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_subscribed,
        }
    }
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserListQuery {
    /// Page number (1-based).
    pub page: Option<u64>,
    /// Page size.
    pub limit: Option<u64>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UserListResponse {
    pub data: Vec<UserResponse>,
    pub pagination: Pagination,
}
