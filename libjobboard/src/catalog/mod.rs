//! Retail catalog client
//!
//! A second, independent bounded context next to the job board. It talks to
//! its own backend, keeps its session under `my_token`, and owns a separate
//! [`Store<CatalogState>`]; nothing here reads or writes [`crate::ClientState`].

mod state;

pub use state::{CatalogField, CatalogMutation, CatalogState, Coupon, Favorite, Product};

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::api::ApiClient;
use crate::config::CatalogConfig;
use crate::error::{ActionError, Result};
use crate::storage::TokenStorage;
use crate::store::events::{EventReceiver, StoreEvent};
use crate::store::Store;
use crate::transport::{ApiRequest, HttpTransport, Transport};

/// Storage key of the catalog bearer token
pub const CATALOG_TOKEN_KEY: &str = "my_token";

const LOAD_FAILED: &str = "Error al cargar el catálogo.";

#[derive(Deserialize)]
struct ProductsResponse {
    products: Vec<Product>,
}

#[derive(Deserialize)]
struct SupermarketResponse {
    supermarket: Vec<Product>,
}

#[derive(Deserialize)]
struct CouponsResponse {
    coupons: Vec<Coupon>,
}

#[derive(Deserialize)]
struct FavoritesResponse {
    favorites: Vec<Favorite>,
}

pub struct Catalog {
    store: Arc<Store<CatalogState>>,
    api: ApiClient,
    storage: Arc<dyn TokenStorage>,
    token_key: String,
}

impl Catalog {
    pub fn new(transport: Arc<dyn Transport>, storage: Arc<dyn TokenStorage>) -> Self {
        Self {
            store: Arc::new(Store::new()),
            api: ApiClient::new(transport),
            storage,
            token_key: CATALOG_TOKEN_KEY.to_string(),
        }
    }

    pub fn with_token_key(mut self, key: impl Into<String>) -> Self {
        self.token_key = key.into();
        self
    }

    /// Catalog backend from its config section, sharing the session storage
    pub fn from_config(
        config: &CatalogConfig,
        timeout: std::time::Duration,
        storage: Arc<dyn TokenStorage>,
    ) -> Result<Self> {
        let transport = HttpTransport::new(&config.base_url, timeout)?;
        Ok(Self::new(Arc::new(transport), storage).with_token_key(&config.token_key))
    }

    pub fn store(&self) -> &Arc<Store<CatalogState>> {
        &self.store
    }

    pub fn snapshot(&self) -> CatalogState {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> EventReceiver<StoreEvent<CatalogField>> {
        self.store.subscribe()
    }

    /// Copy the stored `my_token` into the store
    pub fn hydrate(&self) -> std::result::Result<Option<String>, ActionError> {
        let token = self
            .storage
            .load(&self.token_key)?
            .filter(|token| !token.is_empty());
        if let Some(token) = &token {
            self.store.dispatch(CatalogMutation::Hydrated(token.clone()));
        }
        Ok(token)
    }

    /// `GET /api/products`
    pub async fn load_products(&self) -> std::result::Result<Vec<Product>, ActionError> {
        let ticket = self.store.ticket(CatalogField::Products);
        let response: ProductsResponse = self.get("/api/products", None).await?;
        self.store
            .dispatch_fresh(ticket, CatalogMutation::ProductsLoaded(response.products.clone()));
        Ok(response.products)
    }

    /// `GET /api/supermarket`
    pub async fn load_supermarket(&self) -> std::result::Result<Vec<Product>, ActionError> {
        let ticket = self.store.ticket(CatalogField::Supermarket);
        let response: SupermarketResponse = self.get("/api/supermarket", None).await?;
        self.store.dispatch_fresh(
            ticket,
            CatalogMutation::SupermarketLoaded(response.supermarket.clone()),
        );
        Ok(response.supermarket)
    }

    /// `GET /api/coupons`
    pub async fn load_coupons(&self) -> std::result::Result<Vec<Coupon>, ActionError> {
        let ticket = self.store.ticket(CatalogField::Coupons);
        let response: CouponsResponse = self.get("/api/coupons", None).await?;
        self.store.dispatch_fresh(ticket, CatalogMutation::CouponsLoaded(response.coupons.clone()));
        Ok(response.coupons)
    }

    /// `GET /api/favorites` for the logged-in shopper
    pub async fn load_favorites(&self) -> std::result::Result<Vec<Favorite>, ActionError> {
        let ticket = self.store.ticket(CatalogField::Favorites);
        let token = self.require_token()?;
        let response: FavoritesResponse = self.get("/api/favorites", Some(token)).await?;
        self.store.dispatch_fresh(
            ticket,
            CatalogMutation::FavoritesLoaded(response.favorites.clone()),
        );
        Ok(response.favorites)
    }

    pub fn log_out(&self) -> std::result::Result<(), ActionError> {
        let removed = self.storage.remove(&self.token_key);
        self.store.dispatch(CatalogMutation::LoggedOut);
        removed.map_err(ActionError::from)
    }

    fn require_token(&self) -> std::result::Result<String, ActionError> {
        if let Some(token) = self
            .store
            .read(|state| state.token.clone())
            .filter(|token| !token.is_empty())
        {
            return Ok(token);
        }
        self.storage
            .load(&self.token_key)?
            .filter(|token| !token.is_empty())
            .ok_or(ActionError::Unauthenticated)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        bearer: Option<String>,
    ) -> std::result::Result<T, ActionError> {
        let mut request = ApiRequest::get(path);
        if let Some(token) = bearer {
            request = request.bearer(token);
        }
        self.api.fetch(request, LOAD_FAILED).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::transport::{HttpMethod, MockReply, MockTransport};
    use serde_json::json;

    fn catalog(transport: &MockTransport, storage: &MemoryStorage) -> Catalog {
        Catalog::new(Arc::new(transport.clone()), Arc::new(storage.clone()))
    }

    #[tokio::test]
    async fn test_load_products() {
        let transport = MockTransport::new().with_reply(
            HttpMethod::Get,
            "/api/products",
            MockReply::ok(json!({"products": [{"id": 1, "name": "Pan"}, {"id": 2}]})),
        );
        let catalog = catalog(&transport, &MemoryStorage::new());

        let products = catalog.load_products().await.unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(catalog.snapshot().products, products);
        assert!(catalog.snapshot().supermarket.is_empty());
    }

    #[tokio::test]
    async fn test_favorites_need_my_token() {
        let transport = MockTransport::new();
        let storage = MemoryStorage::new();
        // A job board session is not a catalog session
        storage.save("token", "job-board").unwrap();
        let catalog = catalog(&transport, &storage);

        let err = catalog.load_favorites().await.unwrap_err();

        assert!(err.is_unauthenticated());
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_favorites_with_hydrated_token() {
        let transport = MockTransport::new().with_reply(
            HttpMethod::Get,
            "/api/favorites",
            MockReply::ok(json!({"favorites": [{"id": 4}]})),
        );
        let storage = MemoryStorage::new();
        storage.save(CATALOG_TOKEN_KEY, "shopper").unwrap();
        let catalog = catalog(&transport, &storage);

        assert_eq!(catalog.hydrate().unwrap().as_deref(), Some("shopper"));
        let favorites = catalog.load_favorites().await.unwrap();

        assert_eq!(favorites.len(), 1);
        let sent = transport.requests_to("/api/favorites");
        assert_eq!(sent[0].bearer.as_deref(), Some("shopper"));
    }

    #[tokio::test]
    async fn test_failed_load_leaves_store_untouched() {
        let transport = MockTransport::new()
            .with_reply(
                HttpMethod::Get,
                "/api/coupons",
                MockReply::ok(json!({"coupons": [{"id": 1}]})),
            )
            .with_reply(HttpMethod::Get, "/api/coupons", MockReply::error(500, "caído"));
        let catalog = catalog(&transport, &MemoryStorage::new());

        catalog.load_coupons().await.unwrap();
        let err = catalog.load_coupons().await.unwrap_err();

        assert_eq!(err.to_string(), "caído");
        assert_eq!(catalog.snapshot().coupons.len(), 1);
    }

    #[test]
    fn test_log_out_removes_only_catalog_token() {
        let storage = MemoryStorage::new();
        storage.save("token", "job-board").unwrap();
        storage.save(CATALOG_TOKEN_KEY, "shopper").unwrap();
        let catalog = catalog(&MockTransport::new(), &storage);
        catalog.hydrate().unwrap();

        catalog.log_out().unwrap();

        assert!(catalog.snapshot().token.is_none());
        assert_eq!(storage.load(CATALOG_TOKEN_KEY).unwrap(), None);
        assert_eq!(storage.load("token").unwrap().as_deref(), Some("job-board"));
    }
}
