//! User domain types.
//!
//! [`User`] is the stored record and carries the password hash; it is never
//! serialized. [`UserIdentity`] is what leaves the process.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use printshare_core::{Email, UserId};

/// A registered marketplace account.
///
/// Immutable once created.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Normalized (trimmed, lowercase) email address.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// PHC-format Argon2id hash of the password.
    pub password_hash: String,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
}

/// Public projection of a [`User`], without credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: UserId,
    pub email: Email,
    pub name: String,
}

impl From<&User> for UserIdentity {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
}
