//! Client for the external demo store API.
//!
//! # Architecture
//!
//! - Plain REST-over-JSON via `reqwest`; responses deserialize into the wire
//!   types in [`types`]
//! - The external service is the source of truth for products and account
//!   carts - NO local sync, direct API calls
//! - In-memory caching via `moka` for catalog reads (5 minute TTL); cart
//!   reads are never cached so a refresh always hits the service
//!
//! # Endpoints
//!
//! - `GET /products` and `GET /products?limit=N` - the product catalog
//! - `GET /products/{id}` - a single product (quick-look fragment)
//! - `GET /carts/{userId}` - the signed-in user's cart snapshot (read-only)
//! - `POST /auth/login` - demo token login
//! - `GET /users` - demo account records (resolved after login)

mod cache;
mod client;
pub mod types;

pub use client::StoreClient;

use thiserror::Error;

/// Errors that can occur when talking to the demo store API.
#[derive(Debug, Error)]
pub enum StoreApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Request URL could not be constructed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The API returned a non-success status.
    #[error("API returned HTTP {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated for logging.
        body: String,
    },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_api_error_display() {
        let err = StoreApiError::NotFound("product 99".to_string());
        assert_eq!(err.to_string(), "Not found: product 99");

        let err = StoreApiError::Api {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "API returned HTTP 500: boom");
    }
}
