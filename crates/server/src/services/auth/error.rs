//! Authentication error types.

use thiserror::Error;

/// Errors that can occur during registration and login.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] printshare_core::EmailError),

    /// Display name rejected.
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Another account already uses this email.
    #[error("an account with this email already exists")]
    DuplicateIdentity,

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
