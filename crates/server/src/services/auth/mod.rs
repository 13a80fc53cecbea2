//! Authentication service.
//!
//! Provides email + password registration and login on top of the
//! [`CredentialStore`].

mod credentials;
mod error;

pub use credentials::{CredentialStore, HashCost};
pub use error::AuthError;

use secrecy::{ExposeSecret, SecretString};
use tracing::{info, warn};

use printshare_core::{Email, UserId};

use crate::models::{User, UserIdentity};

/// Minimum password length, in characters.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Minimum display name length, in characters, after trimming.
const MIN_NAME_LENGTH: usize = 2;

/// Authentication service.
///
/// Validates user input and delegates storage and hashing to the credential
/// store. Hashing is CPU-bound; async callers should run these methods on the
/// blocking pool.
pub struct AuthService<'a> {
    credentials: &'a CredentialStore,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(credentials: &'a CredentialStore) -> Self {
        Self { credentials }
    }

    /// Register a new user with email, display name and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::InvalidName` if the name is too short.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::DuplicateIdentity` if the email is already registered.
    pub fn register_user(
        &self,
        email: &str,
        name: &str,
        password: &SecretString,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        let name = validate_name(name)?;
        validate_password(password.expose_secret())?;

        let user = self.credentials.register(email, name, password)?;
        info!(user_id = %user.id, "user registered");

        Ok(user)
    }

    /// Login with email and password.
    ///
    /// Unknown emails and wrong passwords are indistinguishable to the
    /// caller, and both cost one password verification.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub fn authenticate(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<UserIdentity, AuthError> {
        let Some(user) = self.credentials.find_by_email(email) else {
            self.credentials
                .verify_against_nobody(password.expose_secret());
            warn!("login failed: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !self
            .credentials
            .verify_password(password.expose_secret(), &user.password_hash)
        {
            warn!(user_id = %user.id, "login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        info!(user_id = %user.id, "user logged in");
        Ok(UserIdentity::from(&user))
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub fn get_user(&self, user_id: UserId) -> Result<UserIdentity, AuthError> {
        self.credentials
            .find_by_id(user_id)
            .map(|user| UserIdentity::from(&user))
            .ok_or(AuthError::UserNotFound)
    }
}

/// Validate and trim a display name.
fn validate_name(name: &str) -> Result<&str, AuthError> {
    let name = name.trim();
    if name.chars().count() < MIN_NAME_LENGTH {
        return Err(AuthError::InvalidName(format!(
            "name must be at least {MIN_NAME_LENGTH} characters"
        )));
    }
    Ok(name)
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}
