//! Signup and login.
//!
//! Both endpoints answer with a fresh bearer token. Login failures share one
//! message whether the email is unknown or the password is wrong.

use axum::{extract::Extension, http::StatusCode, Json};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::{
    normalize_email,
    types::{AuthResponse, LoginRequest, MessageResponse, SignupRequest, UserResponse},
    valid_email, valid_password, MIN_PASSWORD_LENGTH,
};
use crate::linkfeed::{
    credentials::{hash_password_blocking, verify_password_blocking},
    error::ApiError,
    storage::{SignupOutcome, User},
    AppState,
};

pub const DUPLICATE_EMAIL_MESSAGE: &str = "User with this email already exists";
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created, token issued", body = AuthResponse),
        (status = 400, description = "Invalid input or email already registered", body = MessageResponse),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn signup(
    Extension(state): Extension<Arc<AppState>>,
    payload: Option<Json<SignupRequest>>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let Some(Json(request)) = payload else {
        return Err(ApiError::invalid_input("Missing payload"));
    };

    debug!("signup: {:?}", request);

    let name = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::invalid_input("Name is required"));
    }

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return Err(ApiError::invalid_input("Invalid email address"));
    }

    if !valid_password(&request.password) {
        return Err(ApiError::invalid_input(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    let password_hash = hash_password_blocking(request.password).await?;

    let user = match state.store().insert_user(name, &email, &password_hash).await? {
        SignupOutcome::Created(user) => user,
        SignupOutcome::Conflict => {
            debug!("signup rejected: email already registered");
            return Err(ApiError::invalid_input(DUPLICATE_EMAIL_MESSAGE));
        }
    };

    let response = issue_response(&state, user, "User created successfully")?;

    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Invalid email or password", body = MessageResponse),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn login(
    Extension(state): Extension<Arc<AppState>>,
    payload: Option<Json<LoginRequest>>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Some(Json(request)) = payload else {
        return Err(ApiError::invalid_input("Missing payload"));
    };

    debug!("login: {:?}", request);

    let email = normalize_email(&request.email);
    if email.is_empty() || request.password.is_empty() {
        return Err(ApiError::invalid_input(INVALID_CREDENTIALS_MESSAGE));
    }

    let Some(record) = state.store().find_credentials(&email).await? else {
        debug!("login rejected: unknown email");
        return Err(ApiError::invalid_input(INVALID_CREDENTIALS_MESSAGE));
    };

    // A stored hash that fails to parse is our fault, not the caller's.
    let matches = verify_password_blocking(request.password, record.password_hash)
        .await
        .map_err(|err| ApiError::Internal(err.into()))?;

    if !matches {
        debug!("login rejected: wrong password");
        return Err(ApiError::invalid_input(INVALID_CREDENTIALS_MESSAGE));
    }

    let response = issue_response(&state, record.user, "Login successful")?;

    Ok(Json(response))
}

fn issue_response(state: &AppState, user: User, message: &str) -> Result<AuthResponse, ApiError> {
    let token = state
        .tokens()
        .issue(user.id)
        .map_err(|err| ApiError::Internal(err.into()))?;

    info!(user_id = %user.id, "{message}");

    Ok(AuthResponse {
        message: message.to_string(),
        token,
        user: UserResponse::from(user),
    })
}
