//! Bearer-token gate for protected routes.
//!
//! Flow Overview: read `Authorization: Bearer <token>`, verify the token, load
//! the user it names (without the password hash) and hand the resulting
//! [`Identity`] to the handler. Every failure short of a storage error is a
//! `401` with a uniform message, the failure kind is only logged.

use axum::{
    extract::{Extension, Request},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use super::{
    error::ApiError,
    storage::{Store, User},
    token::{TokenError, TokenService},
    AppState,
};

pub const MISSING_TOKEN_MESSAGE: &str = "Access denied. No token provided.";
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid token.";

/// Authenticated caller attached to the request extensions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<User> for Identity {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

impl From<&Identity> for User {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id,
            name: identity.name.clone(),
            email: identity.email.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no bearer token")]
    MissingToken,
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("token subject no longer exists")]
    UnknownUser,
    #[error("identity lookup failed: {0}")]
    Store(anyhow::Error),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken => Self::Unauthenticated(MISSING_TOKEN_MESSAGE),
            AuthError::Token(_) | AuthError::UnknownUser => {
                Self::Unauthenticated(INVALID_TOKEN_MESSAGE)
            }
            AuthError::Store(err) => Self::Internal(err),
        }
    }
}

/// Token from an `Authorization: Bearer <token>` header, if any.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Resolve request headers into an identity.
///
/// # Errors
/// `MissingToken`, `Token(..)` or `UnknownUser` for unauthenticated callers,
/// `Store` if the user lookup itself fails.
pub async fn authenticate(
    headers: &HeaderMap,
    tokens: &TokenService,
    store: &dyn Store,
) -> Result<Identity, AuthError> {
    let token = extract_bearer_token(headers).ok_or(AuthError::MissingToken)?;

    let user_id = tokens.verify(token)?;

    match store.find_user(user_id).await {
        Ok(Some(user)) => Ok(Identity::from(user)),
        Ok(None) => Err(AuthError::UnknownUser),
        Err(err) => Err(AuthError::Store(err)),
    }
}

/// Middleware adapter: runs [`authenticate`] and inserts the [`Identity`]
/// into the request extensions before the handler runs.
pub async fn auth_guard(
    Extension(state): Extension<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(request.headers(), state.tokens(), state.store()).await {
        Ok(identity) => {
            debug!(user_id = %identity.id, "request authenticated");
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(err) => {
            debug!("authentication rejected: {err}");
            ApiError::from(err).into_response()
        }
    }
}
