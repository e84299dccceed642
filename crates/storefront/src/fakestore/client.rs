//! HTTP client for the demo store API.
//!
//! Wraps `reqwest` with typed response deserialization and `moka` caching for
//! catalog reads. Cart reads are never cached so an explicit refresh always
//! reflects the service's current snapshot.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use superstore_core::{ProductId, UserId};

use crate::config::StoreApiConfig;
use crate::fakestore::StoreApiError;
use crate::fakestore::cache::CacheValue;
use crate::fakestore::types::{LoginResponse, Product, RemoteCart, User};

/// How long catalog reads stay cached.
const CACHE_TTL: Duration = Duration::from_secs(300); // 5 minutes

/// Maximum number of cached entries.
const CACHE_CAPACITY: u64 = 1000;

/// How much response body to keep in error values and logs.
const BODY_SNIPPET_LEN: usize = 200;

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

// =============================================================================
// StoreClient
// =============================================================================

/// Client for the demo store API.
///
/// Provides typed access to the product catalog, account carts, and the demo
/// token login. Catalog reads are cached for 5 minutes.
#[derive(Clone)]
pub struct StoreClient {
    inner: Arc<StoreClientInner>,
}

struct StoreClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<String, CacheValue>,
}

impl StoreClient {
    /// Create a new store API client.
    #[must_use]
    pub fn new(config: &StoreApiConfig) -> Self {
        Self::with_base_url(config.base_url.clone())
    }

    /// Create a client with an explicit base URL (for testing with wiremock).
    #[must_use]
    pub fn with_base_url(base_url: Url) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(StoreClientInner {
                client: reqwest::Client::new(),
                base_url,
                cache,
            }),
        }
    }

    /// Execute a GET request and deserialize the JSON response.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, StoreApiError> {
        let mut url = self.inner.base_url.join(path)?;
        for (key, value) in query {
            url.query_pairs_mut().append_pair(key, value);
        }

        let response = self.inner.client.get(url).send().await?;
        self.read_json(path, response).await
    }

    /// Execute a POST request with a JSON body and deserialize the response.
    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, StoreApiError> {
        let url = self.inner.base_url.join(path)?;
        let response = self.inner.client.post(url).json(body).send().await?;
        self.read_json(path, response).await
    }

    /// Check the response status and parse the body.
    ///
    /// Reads the body as text first so parse failures can log what the
    /// service actually returned.
    async fn read_json<T: DeserializeOwned>(
        &self,
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, StoreApiError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(BODY_SNIPPET_LEN).collect::<String>(),
                path,
                "store API returned non-success status"
            );
            return Err(StoreApiError::Api {
                status: status.as_u16(),
                body: body.chars().take(BODY_SNIPPET_LEN).collect(),
            });
        }

        // The demo API reports unknown resources as a 200 with an empty or
        // null body rather than a 404.
        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Err(StoreApiError::NotFound(path.to_string()));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(BODY_SNIPPET_LEN).collect::<String>(),
                path,
                "failed to parse store API response"
            );
            StoreApiError::Parse(e)
        })
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// Get the full product catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails; callers degrade to an
    /// empty catalog.
    #[instrument(skip(self))]
    pub async fn get_products(&self) -> Result<Vec<Product>, StoreApiError> {
        let cache_key = "products:all".to_string();

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let products: Vec<Product> = self.get_json("products", &[]).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Get a capped product list for featured sections.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_products_limited(&self, limit: u32) -> Result<Vec<Product>, StoreApiError> {
        let cache_key = format!("products:limit:{limit}");

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for limited products");
            return Ok(products);
        }

        let products: Vec<Product> = self
            .get_json("products", &[("limit", limit.to_string())])
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Get a single product by ID.
    ///
    /// # Errors
    ///
    /// Returns `StoreApiError::NotFound` if the product does not exist, or
    /// another variant if the API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product(&self, product_id: ProductId) -> Result<Product, StoreApiError> {
        let cache_key = format!("product:{product_id}");

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product: Product = self.get_json(&format!("products/{product_id}"), &[]).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    // =========================================================================
    // Cart Methods (not cached - the snapshot must be refreshable)
    // =========================================================================

    /// Get a user's cart snapshot.
    ///
    /// Read-only: this system never writes carts back to the service.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails; callers fall back to an
    /// empty remote cart.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_user_cart(&self, user_id: UserId) -> Result<RemoteCart, StoreApiError> {
        self.get_json(&format!("carts/{user_id}"), &[]).await
    }

    // =========================================================================
    // Account Methods
    // =========================================================================

    /// Authenticate against the demo API.
    ///
    /// # Errors
    ///
    /// Returns `StoreApiError::Api` with the service's status code when the
    /// credentials are rejected.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginResponse, StoreApiError> {
        self.post_json("auth/login", &LoginRequest { username, password })
            .await
    }

    /// Get the demo account records.
    ///
    /// Used after a successful login to resolve the account's user ID; the
    /// login endpoint only returns a token.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_users(&self) -> Result<Vec<User>, StoreApiError> {
        let cache_key = "users:all".to_string();

        if let Some(CacheValue::Users(users)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for users");
            return Ok(users);
        }

        let users: Vec<User> = self.get_json("users", &[]).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Users(users.clone()))
            .await;

        Ok(users)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> StoreClient {
        StoreClient::with_base_url(server.uri().parse().unwrap())
    }

    const PRODUCTS_JSON: &str = r#"[
        {
            "id": 1,
            "title": "Backpack",
            "price": 109.95,
            "description": "Everyday pack",
            "category": "men's clothing",
            "image": "https://example.com/1.jpg",
            "rating": { "rate": 3.9, "count": 120 }
        },
        {
            "id": 2,
            "title": "T-Shirt",
            "price": 22.3,
            "description": "Slim fit",
            "category": "men's clothing",
            "image": "https://example.com/2.jpg",
            "rating": { "rate": 4.1, "count": 259 }
        }
    ]"#;

    #[tokio::test]
    async fn test_get_products_caches_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(PRODUCTS_JSON, "application/json"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let first = client.get_products().await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].title, "Backpack");

        // Second call must be served from cache (the mock allows one request).
        let second = client.get_products().await.unwrap();
        assert_eq!(second, first);
    }

    #[tokio::test]
    async fn test_get_products_limited_sends_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .and(query_param("limit", "1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(PRODUCTS_JSON, "application/json"),
            )
            .mount(&server)
            .await;

        let client = test_client(&server);
        let products = client.get_products_limited(1).await.unwrap();
        assert_eq!(products.len(), 2);
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.get_products().await.unwrap_err();
        assert!(matches!(err, StoreApiError::Api { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_malformed_body_is_a_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw("{not json", "application/json"),
            )
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.get_products().await.unwrap_err();
        assert!(matches!(err, StoreApiError::Parse(_)));
    }

    #[tokio::test]
    async fn test_null_body_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products/99"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("null", "application/json"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.get_product(ProductId::new(99)).await.unwrap_err();
        assert!(matches!(err, StoreApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_get_user_cart() {
        let server = MockServer::start().await;
        let cart_json = r#"{
            "id": 1,
            "userId": 4,
            "products": [ { "productId": 1, "quantity": 2 } ]
        }"#;
        Mock::given(method("GET"))
            .and(path("/carts/4"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(cart_json, "application/json"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let cart = client.get_user_cart(UserId::new(4)).await.unwrap();
        assert_eq!(cart.user_id, UserId::new(4));
        assert_eq!(cart.products.len(), 1);
    }

    #[tokio::test]
    async fn test_login_posts_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_partial_json(
                serde_json::json!({ "username": "johnd" }),
            ))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(r#"{ "token": "abc123" }"#, "application/json"),
            )
            .mount(&server)
            .await;

        let client = test_client(&server);
        let response = client.login("johnd", "m38rmF$").await.unwrap();
        assert_eq!(response.token, "abc123");
    }

    #[tokio::test]
    async fn test_login_rejection_surfaces_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(401).set_body_string("username or password is incorrect"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.login("johnd", "wrong").await.unwrap_err();
        assert!(matches!(err, StoreApiError::Api { status: 401, .. }));
    }
}
