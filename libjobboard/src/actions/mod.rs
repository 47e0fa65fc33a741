//! Store actions for the job board
//!
//! [`JobBoard`] owns the store, the API client and the durable session
//! storage. Every remote operation is an async method that sends at most one
//! request (`login` chains a second) and writes its result into the store
//! through a typed mutation. All of them return `Result<T, ActionError>`;
//! the caller turns an error into user feedback with
//! [`ActionError::feedback`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use libjobboard::storage::MemoryStorage;
//! use libjobboard::transport::MockTransport;
//! use libjobboard::JobBoard;
//!
//! # async fn example() -> Result<(), libjobboard::ActionError> {
//! let board = JobBoard::new(Arc::new(MockTransport::new()), Arc::new(MemoryStorage::new()));
//! board.hydrate()?;
//!
//! let offers = board.load_all_job_offers().await?;
//! println!("{} offers", offers.len());
//! # Ok(())
//! # }
//! ```

mod applications;
mod offers;
mod session;

pub use applications::{APPLY_FAILED, APPLY_SUCCEEDED, UNAPPLY_FAILED, UNAPPLY_SUCCEEDED};
pub use session::{MISSING_FIELDS, PASSWORDS_DIFFER};

use std::sync::Arc;

use crate::api::ApiClient;
use crate::config::Config;
use crate::error::{ActionError, Result};
use crate::storage::{open_storage, TokenStorage};
use crate::store::events::{EventReceiver, StoreEvent};
use crate::store::{ClientState, Field, Store};
use crate::transport::{HttpTransport, Transport};

/// Storage key of the job board bearer token
pub const TOKEN_KEY: &str = "token";

/// Storage key of the serialized user that belongs to `token_key`
pub fn user_key(token_key: &str) -> String {
    format!("{}_user", token_key)
}

pub struct JobBoard {
    store: Arc<Store<ClientState>>,
    api: ApiClient,
    storage: Arc<dyn TokenStorage>,
    token_key: String,
    user_key: String,
}

impl JobBoard {
    pub fn new(transport: Arc<dyn Transport>, storage: Arc<dyn TokenStorage>) -> Self {
        Self {
            store: Arc::new(Store::new()),
            api: ApiClient::new(transport),
            storage,
            token_key: TOKEN_KEY.to_string(),
            user_key: user_key(TOKEN_KEY),
        }
    }

    /// Use an existing store instead of a fresh one
    pub fn with_store(mut self, store: Arc<Store<ClientState>>) -> Self {
        self.store = store;
        self
    }

    /// Keep the session under a different storage key
    pub fn with_token_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.user_key = user_key(&key);
        self.token_key = key;
        self
    }

    /// Build against the real backend described by `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = HttpTransport::new(&config.api.base_url, config.api.timeout())?;
        let storage = open_storage(&config.storage)?;
        tracing::debug!(
            "Job board at {} with {} session storage",
            transport.base_url(),
            storage.backend_name()
        );
        Ok(Self::new(Arc::new(transport), storage).with_token_key(&config.storage.token_key))
    }

    pub fn store(&self) -> &Arc<Store<ClientState>> {
        &self.store
    }

    /// Current state
    pub fn snapshot(&self) -> ClientState {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> EventReceiver<StoreEvent<Field>> {
        self.store.subscribe()
    }

    pub fn token_key(&self) -> &str {
        &self.token_key
    }

    /// Bearer token for an authenticated request
    ///
    /// The store is checked first, then durable storage. No token means
    /// `Unauthenticated`, before anything is sent.
    fn require_token(&self) -> std::result::Result<String, ActionError> {
        if let Some(token) = self
            .store
            .read(|state| state.token.clone())
            .filter(|token| !token.is_empty())
        {
            return Ok(token);
        }

        match self.storage.load(&self.token_key)? {
            Some(token) if !token.is_empty() => Ok(token),
            _ => {
                tracing::debug!("No session token available");
                Err(ActionError::Unauthenticated)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::store::Mutation;
    use crate::transport::MockTransport;

    fn board(storage: &MemoryStorage) -> JobBoard {
        JobBoard::new(Arc::new(MockTransport::new()), Arc::new(storage.clone()))
    }

    #[test]
    fn test_require_token_prefers_store() {
        let storage = MemoryStorage::new();
        storage.save(TOKEN_KEY, "stored").unwrap();
        let board = board(&storage);
        board.store().dispatch(Mutation::Hydrated {
            token: "in-memory".to_string(),
            user: None,
        });

        assert_eq!(board.require_token().unwrap(), "in-memory");
    }

    #[test]
    fn test_require_token_falls_back_to_storage() {
        let storage = MemoryStorage::new();
        storage.save(TOKEN_KEY, "stored").unwrap();

        assert_eq!(board(&storage).require_token().unwrap(), "stored");
    }

    #[test]
    fn test_require_token_missing() {
        let storage = MemoryStorage::new();
        storage.save(TOKEN_KEY, "").unwrap();

        assert_eq!(
            board(&storage).require_token(),
            Err(ActionError::Unauthenticated)
        );
    }

    #[test]
    fn test_custom_token_key() {
        let storage = MemoryStorage::new();
        storage.save("jwt", "custom").unwrap();
        let board = board(&storage).with_token_key("jwt");

        assert_eq!(board.token_key(), "jwt");
        assert_eq!(board.require_token().unwrap(), "custom");
    }

    #[test]
    fn test_shared_store() {
        let storage = MemoryStorage::new();
        let store = Arc::new(Store::new());
        let first = board(&storage).with_store(store.clone());
        let second = board(&storage).with_store(store);

        first.store().dispatch(Mutation::MessageLoaded("hola".to_string()));
        assert_eq!(second.snapshot().message.as_deref(), Some("hola"));
    }
}
