//! User accounts for the login and register handlers.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{PoisonError, RwLock};

use serde::Deserialize;

const MIN_PASSWORD_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegisterError {
    #[error("username must not be empty")]
    EmptyUsername,
    #[error("password must be at least 3 characters")]
    PasswordTooShort,
    #[error("username already taken")]
    UsernameTaken,
}

/// Storage behind the account handlers.
///
/// Implementations are shared across connections and must handle concurrent
/// calls themselves.
pub trait UserStore: Send + Sync {
    fn register(&self, username: &str, password: &str) -> Result<(), RegisterError>;
    fn login(&self, username: &str, password: &str) -> bool;
}

#[derive(Deserialize)]
struct CredentialsFile {
    credentials: Vec<Credential>,
}

#[derive(Deserialize)]
struct Credential {
    username: String,
    password: String,
}

/// Process-lifetime user table, optionally seeded from a JSON file.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, String>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store from `{"credentials": [{"username", "password"}]}`.
    ///
    /// A missing or unreadable file yields an empty store.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let parsed = std::fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|text| Ok(serde_json::from_str::<CredentialsFile>(&text)?));

        match parsed {
            Ok(file) => {
                let users: HashMap<_, _> = file
                    .credentials
                    .into_iter()
                    .map(|c| (c.username, c.password))
                    .collect();
                tracing::info!(count = users.len(), path = %path.display(), "Loaded user credentials");
                Self {
                    users: RwLock::new(users),
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "No user credentials loaded");
                Self::new()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl UserStore for InMemoryUserStore {
    fn register(&self, username: &str, password: &str) -> Result<(), RegisterError> {
        if username.trim().is_empty() {
            return Err(RegisterError::EmptyUsername);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(RegisterError::PasswordTooShort);
        }

        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
        if users.contains_key(username) {
            return Err(RegisterError::UsernameTaken);
        }
        users.insert(username.to_string(), password.to_string());
        Ok(())
    }

    fn login(&self, username: &str, password: &str) -> bool {
        self.users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(username)
            .is_some_and(|stored| stored == password)
    }
}
