//! Wire types for the demo store API.
//!
//! These mirror the JSON shapes the service returns. Field names are
//! camelCase on the wire; unknown fields are ignored so minor upstream
//! additions don't break deserialization.

use serde::{Deserialize, Serialize};

use superstore_core::{CartId, CartLine, Price, ProductId, UserId};

// =============================================================================
// Catalog Types
// =============================================================================

/// A catalog product.
///
/// Immutable from this system's perspective; sourced entirely from the
/// external catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog product ID.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Unit price.
    pub price: Price,
    /// Long-form description.
    pub description: String,
    /// Category slug (e.g., "electronics", "men's clothing").
    pub category: String,
    /// Product image URL.
    pub image: String,
    /// Aggregate customer rating.
    pub rating: Rating,
}

/// Aggregate rating for a product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    /// Average rating value (e.g., 4.5).
    pub rate: f64,
    /// Number of ratings.
    pub count: i64,
}

// =============================================================================
// Cart Types
// =============================================================================

/// A user's cart as reported by the external service.
///
/// Read-only here: this system never writes carts back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCart {
    /// Cart ID assigned by the service.
    pub id: CartId,
    /// Owning user.
    pub user_id: UserId,
    /// Cart contents.
    pub products: Vec<RemoteCartLine>,
}

/// A single line in a remote cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCartLine {
    /// The product this line refers to.
    pub product_id: ProductId,
    /// Number of units.
    pub quantity: u32,
}

impl RemoteCart {
    /// Convert the snapshot into domain cart lines.
    ///
    /// Zero-quantity lines are dropped; the cart invariant requires
    /// quantities of at least 1.
    #[must_use]
    pub fn into_lines(self) -> Vec<CartLine> {
        self.products
            .into_iter()
            .filter(|line| line.quantity >= 1)
            .map(|line| CartLine::new(line.product_id, line.quantity))
            .collect()
    }
}

// =============================================================================
// Account Types
// =============================================================================

/// A demo account record from `GET /users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Account ID.
    pub id: UserId,
    /// Login username.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Structured name.
    pub name: Name,
    /// Phone number, if present.
    #[serde(default)]
    pub phone: Option<String>,
}

/// A user's structured name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name {
    pub firstname: String,
    pub lastname: String,
}

/// Response from `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Bearer token. Opaque; the demo API issues it but no endpoint here
    /// requires it.
    pub token: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_product() {
        let json = r#"{
            "id": 1,
            "title": "Fjallraven - Foldsack No. 1 Backpack",
            "price": 109.95,
            "description": "Your perfect pack for everyday use.",
            "category": "men's clothing",
            "image": "https://fakestoreapi.com/img/81fPKd-2AYL._AC_SL1500_.jpg",
            "rating": { "rate": 3.9, "count": 120 }
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.price, Price::from_cents(10995));
        assert_eq!(product.category, "men's clothing");
        assert_eq!(product.rating.count, 120);
    }

    #[test]
    fn test_deserialize_remote_cart() {
        let json = r#"{
            "id": 1,
            "userId": 1,
            "date": "2020-03-02T00:00:00.000Z",
            "products": [
                { "productId": 1, "quantity": 4 },
                { "productId": 2, "quantity": 1 }
            ]
        }"#;

        let cart: RemoteCart = serde_json::from_str(json).unwrap();
        assert_eq!(cart.user_id, UserId::new(1));
        assert_eq!(cart.products.len(), 2);

        let lines = cart.into_lines();
        assert_eq!(lines, vec![
            CartLine::new(ProductId::new(1), 4),
            CartLine::new(ProductId::new(2), 1),
        ]);
    }

    #[test]
    fn test_into_lines_drops_zero_quantities() {
        let cart = RemoteCart {
            id: CartId::new(1),
            user_id: UserId::new(1),
            products: vec![
                RemoteCartLine {
                    product_id: ProductId::new(1),
                    quantity: 0,
                },
                RemoteCartLine {
                    product_id: ProductId::new(2),
                    quantity: 3,
                },
            ],
        };

        assert_eq!(cart.into_lines(), vec![CartLine::new(ProductId::new(2), 3)]);
    }

    #[test]
    fn test_deserialize_user() {
        let json = r#"{
            "id": 2,
            "email": "morrison@gmail.com",
            "username": "mor_2314",
            "password": "83r5^_",
            "name": { "firstname": "david", "lastname": "morrison" },
            "address": { "city": "kilcoole", "zipcode": "12926-3874" },
            "phone": "1-570-236-7033"
        }"#;

        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, UserId::new(2));
        assert_eq!(user.username, "mor_2314");
        assert_eq!(user.name.firstname, "david");
    }
}
