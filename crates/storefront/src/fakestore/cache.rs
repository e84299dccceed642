//! Cache types for store API responses.

use crate::fakestore::types::{Product, User};

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(Vec<Product>),
    Users(Vec<User>),
}
