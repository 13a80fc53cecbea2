//! Credential storage: user records keyed by normalized email.

use std::sync::{Arc, OnceLock};

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use secrecy::{ExposeSecret, SecretString};

use printshare_core::{Email, IdGenerator, UserId};

use super::AuthError;
use crate::models::User;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
        }
    }
}

impl HashCost {
    /// The cheapest parameters Argon2 accepts. Only suitable for tests.
    #[must_use]
    pub const fn minimum() -> Self {
        Self {
            memory_kib: Params::MIN_M_COST,
            iterations: Params::MIN_T_COST,
        }
    }

    fn hasher(self) -> Result<Argon2<'static>, AuthError> {
        let params = Params::new(self.memory_kib, self.iterations, Params::DEFAULT_P_COST, None)
            .map_err(|_| AuthError::PasswordHash)?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Registered users, unique by normalized email.
///
/// Passwords are hashed on registration and the plaintext is dropped. User
/// records are never mutated or deleted.
pub struct CredentialStore {
    users: DashMap<UserId, User>,
    by_email: DashMap<Email, UserId>,
    ids: Arc<dyn IdGenerator>,
    hasher: Argon2<'static>,
    /// Hash verified against when a login names an unknown email.
    dummy_hash: OnceLock<Option<String>>,
}

impl CredentialStore {
    /// Create an empty store.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if `cost` is outside Argon2's limits.
    pub fn new(ids: Arc<dyn IdGenerator>, cost: HashCost) -> Result<Self, AuthError> {
        Ok(Self {
            users: DashMap::new(),
            by_email: DashMap::new(),
            ids,
            hasher: cost.hasher()?,
            dummy_hash: OnceLock::new(),
        })
    }

    /// Register a user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::DuplicateIdentity` if the email is taken.
    /// Returns `AuthError::PasswordHash` if hashing fails.
    pub fn register(
        &self,
        email: Email,
        name: &str,
        password: &SecretString,
    ) -> Result<User, AuthError> {
        // Cheap early exit; the entry check below is the authoritative one.
        if self.by_email.contains_key(&email) {
            return Err(AuthError::DuplicateIdentity);
        }

        let password_hash = self.hash(password.expose_secret())?;

        match self.by_email.entry(email) {
            Entry::Occupied(_) => Err(AuthError::DuplicateIdentity),
            Entry::Vacant(vacant) => {
                let user = User {
                    id: UserId::generate(self.ids.as_ref()),
                    email: vacant.key().clone(),
                    name: name.to_string(),
                    password_hash,
                    created_at: Utc::now(),
                };
                self.users.insert(user.id, user.clone());
                vacant.insert(user.id);
                Ok(user)
            }
        }
    }

    /// Look up a user by email, in any casing. Unparseable input finds nobody.
    #[must_use]
    pub fn find_by_email(&self, email: &str) -> Option<User> {
        let email = Email::parse(email).ok()?;
        let id = *self.by_email.get(&email)?;
        self.find_by_id(id)
    }

    #[must_use]
    pub fn find_by_id(&self, id: UserId) -> Option<User> {
        self.users.get(&id).map(|user| user.clone())
    }

    /// Check a raw password against a stored PHC hash.
    ///
    /// Malformed hashes verify as `false`.
    #[must_use]
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> bool {
        PasswordHash::new(stored_hash).is_ok_and(|parsed| {
            self.hasher
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
    }

    /// Burn one verification's worth of work for a login with no matching
    /// user.
    pub fn verify_against_nobody(&self, password: &str) {
        let dummy = self
            .dummy_hash
            .get_or_init(|| self.hash("printshare-unknown-user").ok());
        if let Some(hash) = dummy {
            let _ = self.verify_password(password, hash);
        }
    }

    /// Number of registered users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        self.hasher
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| AuthError::PasswordHash)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::thread;

    use printshare_core::SequentialIds;

    use super::*;

    fn store() -> CredentialStore {
        CredentialStore::new(Arc::new(SequentialIds::new()), HashCost::minimum()).unwrap()
    }

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    #[test]
    fn test_register_then_find_in_any_casing() {
        let store = store();
        let email = Email::parse("A@Example.com").unwrap();
        let user = store.register(email, "Alice", &secret("hunter22")).unwrap();

        assert_eq!(user.email.as_str(), "a@example.com");
        for lookup in ["a@example.com", "A@EXAMPLE.COM", "  a@Example.com "] {
            assert_eq!(store.find_by_email(lookup).unwrap().id, user.id);
        }
        assert_eq!(store.find_by_id(user.id).unwrap().name, "Alice");
    }

    #[test]
    fn test_password_is_hashed_and_verifies() {
        let store = store();
        let user = store
            .register(Email::parse("bob@example.com").unwrap(), "Bob", &secret("s3cret!"))
            .unwrap();

        assert_ne!(user.password_hash, "s3cret!");
        assert!(user.password_hash.starts_with("$argon2id$"));
        assert!(store.verify_password("s3cret!", &user.password_hash));
        assert!(!store.verify_password("S3cret!", &user.password_hash));
    }

    #[test]
    fn test_malformed_hash_verifies_false() {
        let store = store();
        assert!(!store.verify_password("anything", "not-a-phc-string"));
        assert!(!store.verify_password("anything", ""));
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let store = store();
        store
            .register(Email::parse("carol@example.com").unwrap(), "Carol", &secret("password1"))
            .unwrap();

        let err = store
            .register(Email::parse("CAROL@example.com").unwrap(), "Impostor", &secret("password2"))
            .unwrap_err();

        assert!(matches!(err, AuthError::DuplicateIdentity));
        assert_eq!(store.len(), 1);
        assert_eq!(store.find_by_email("carol@example.com").unwrap().name, "Carol");
    }

    #[test]
    fn test_concurrent_registration_of_one_email_admits_one() {
        let store = Arc::new(store());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    store
                        .register(
                            Email::parse("race@example.com").unwrap(),
                            &format!("Racer {i}"),
                            &secret("password"),
                        )
                        .is_ok()
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .filter_map(|h| h.join().ok())
            .filter(|ok| *ok)
            .count();
        assert_eq!(winners, 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_unknown_email_finds_nobody() {
        let store = store();
        assert!(store.find_by_email("ghost@example.com").is_none());
        assert!(store.find_by_email("not an email").is_none());
        store.verify_against_nobody("whatever");
    }

    #[test]
    fn test_rejects_out_of_range_cost() {
        let cost = HashCost {
            memory_kib: 1,
            iterations: 0,
        };
        assert!(matches!(
            CredentialStore::new(Arc::new(SequentialIds::new()), cost),
            Err(AuthError::PasswordHash)
        ));
    }
}
