use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Keys of the persisted client state. Values are plain strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StateKey {
    Token,
    Username,
    Role,
    Theme,
    SelectedLanguage,
}

impl StateKey {
    pub const ALL: [StateKey; 5] = [
        StateKey::Token,
        StateKey::Username,
        StateKey::Role,
        StateKey::Theme,
        StateKey::SelectedLanguage,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StateKey::Token => "token",
            StateKey::Username => "username",
            StateKey::Role => "role",
            StateKey::Theme => "theme",
            StateKey::SelectedLanguage => "selectedLanguage",
        }
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StateKey {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StateKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| StorageError::Serialization(format!("unknown state key: {s}")))
    }
}

/// Process-wide key/value store for session token and UI preferences.
///
/// Last writer wins; no versioning.
#[async_trait]
pub trait ClientStateRepository: Send + Sync {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: StateKey) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn set(&self, key: StateKey, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn remove(&self, key: StateKey) -> Result<(), StorageError>;
}

/// Simple in-memory client state for tests and offline play.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    values: Arc<Mutex<HashMap<StateKey, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl ClientStateRepository for InMemoryRepository {
    async fn get(&self, key: StateKey) -> Result<Option<String>, StorageError> {
        let guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&key).cloned())
    }

    async fn set(&self, key: StateKey, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key, value.to_string());
        Ok(())
    }

    async fn remove(&self, key: StateKey) -> Result<(), StorageError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(&key);
        Ok(())
    }
}

/// Client state behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub client_state: Arc<dyn ClientStateRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let client_state: Arc<dyn ClientStateRepository> = Arc::new(InMemoryRepository::new());
        Self { client_state }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_remove_round_trip() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.get(StateKey::Token).await.unwrap(), None);

        repo.set(StateKey::Token, "abc").await.unwrap();
        repo.set(StateKey::Token, "def").await.unwrap();
        assert_eq!(repo.get(StateKey::Token).await.unwrap().as_deref(), Some("def"));

        repo.remove(StateKey::Token).await.unwrap();
        repo.remove(StateKey::Token).await.unwrap();
        assert_eq!(repo.get(StateKey::Token).await.unwrap(), None);
    }

    #[test]
    fn keys_use_browser_storage_names() {
        assert_eq!(StateKey::SelectedLanguage.as_str(), "selectedLanguage");
        assert_eq!("theme".parse::<StateKey>().unwrap(), StateKey::Theme);
        assert!("Theme".parse::<StateKey>().is_err());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let storage = Storage::in_memory();
        let other = storage.clone();
        storage
            .client_state
            .set(StateKey::Theme, "dark")
            .await
            .unwrap();
        assert_eq!(
            other.client_state.get(StateKey::Theme).await.unwrap().as_deref(),
            Some("dark")
        );
    }
}
