//! Authentication route handlers.
//!
//! Registration and login hash or verify passwords, which is CPU-bound, so
//! both run the credential work on tokio's blocking pool.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use printshare_core::{Email, UserId};

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, UserIdentity};
use crate::services::AuthService;
use crate::state::AppState;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Registration request body.
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Registration response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user_id: UserId,
    pub email: Email,
}

/// Login request body.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Generic success acknowledgement.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

// =============================================================================
// Handlers
// =============================================================================

/// Register a new account.
///
/// POST /api/auth/register
///
/// # Errors
///
/// Returns 400 on invalid input and 409 if the email is taken.
pub async fn register(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    let Json(req) = payload?;
    let password = SecretString::from(req.password);
    let credentials = state.credentials();

    let user = tokio::task::spawn_blocking(move || {
        AuthService::new(&credentials).register_user(&req.email, &req.name, &password)
    })
    .await
    .map_err(|e| AppError::Internal(format!("registration task failed: {e}")))??;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id: user.id,
            email: user.email,
        }),
    ))
}

/// Log in with email and password.
///
/// POST /api/auth/login
///
/// # Errors
///
/// Returns 401 if the credentials don't match.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<UserIdentity>> {
    let Json(req) = payload?;
    let password = SecretString::from(req.password);
    let credentials = state.credentials();

    let identity = tokio::task::spawn_blocking(move || {
        AuthService::new(&credentials).authenticate(&req.email, &password)
    })
    .await
    .map_err(|e| AppError::Internal(format!("login task failed: {e}")))??;

    let current_user = CurrentUser {
        id: identity.id,
        email: identity.email.clone(),
        name: identity.name.clone(),
    };
    set_current_user(&session, &current_user)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    set_sentry_user(&identity.id, Some(identity.email.as_str()));

    Ok(Json(identity))
}

/// End the current session.
///
/// POST /api/auth/logout
///
/// # Errors
///
/// Returns 500 if the session store fails.
pub async fn logout(session: Session) -> Result<Json<SuccessResponse>> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    clear_sentry_user();

    Ok(Json(SuccessResponse { success: true }))
}

/// The logged-in user.
///
/// GET /api/auth/me
///
/// # Errors
///
/// Returns 401 if not logged in or the account no longer exists.
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<UserIdentity>> {
    let credentials = state.credentials();
    let identity = AuthService::new(&credentials).get_user(user.id)?;
    Ok(Json(identity))
}
