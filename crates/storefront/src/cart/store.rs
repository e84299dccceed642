//! Guest cart persistence over the session key-value store.

use tower_sessions::Session;
use tower_sessions::session::Error as SessionError;

use superstore_core::CartLine;

use crate::models::session::keys;

/// Reads and writes the guest cart under the `cart` session key.
///
/// The session is the visitor's key-value store; writes are last-write-wins
/// with no locking because the session has a single writer.
#[derive(Clone)]
pub struct CartStore {
    session: Session,
}

impl CartStore {
    /// Create a store over the request's session.
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    /// Read the guest cart.
    ///
    /// An absent key or a malformed payload reads as an empty cart - tolerated,
    /// not an error. Zero-quantity lines are filtered out to hold the cart
    /// invariant.
    pub async fn read(&self) -> Vec<CartLine> {
        let mut lines = self
            .session
            .get::<Vec<CartLine>>(keys::CART)
            .await
            .ok()
            .flatten()
            .unwrap_or_default();
        lines.retain(|line| line.quantity >= 1);
        lines
    }

    /// Persist the guest cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the session write fails.
    pub async fn write(&self, lines: &[CartLine]) -> Result<(), SessionError> {
        self.session.insert(keys::CART, lines).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use superstore_core::ProductId;
    use tower_sessions::MemoryStore;

    use super::*;

    fn test_session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_read_absent_key_is_empty() {
        let store = CartStore::new(test_session());
        assert!(store.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_write_then_read_roundtrip() {
        let store = CartStore::new(test_session());
        let lines = vec![
            CartLine::new(ProductId::new(1), 2),
            CartLine::new(ProductId::new(4), 1),
        ];

        store.write(&lines).await.unwrap();
        assert_eq!(store.read().await, lines);
    }

    #[tokio::test]
    async fn test_malformed_payload_reads_as_empty() {
        let session = test_session();
        session
            .insert(keys::CART, "definitely not a cart")
            .await
            .unwrap();

        let store = CartStore::new(session);
        assert!(store.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_zero_quantity_lines_are_filtered() {
        let session = test_session();
        session
            .insert(
                keys::CART,
                vec![
                    CartLine::new(ProductId::new(1), 0),
                    CartLine::new(ProductId::new(2), 2),
                ],
            )
            .await
            .unwrap();

        let store = CartStore::new(session);
        assert_eq!(store.read().await, vec![CartLine::new(ProductId::new(2), 2)]);
    }

    #[tokio::test]
    async fn test_write_is_last_write_wins() {
        let store = CartStore::new(test_session());
        store
            .write(&[CartLine::new(ProductId::new(1), 1)])
            .await
            .unwrap();
        store
            .write(&[CartLine::new(ProductId::new(2), 5)])
            .await
            .unwrap();

        assert_eq!(store.read().await, vec![CartLine::new(ProductId::new(2), 5)]);
    }
}
