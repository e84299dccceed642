//! Cart line and provenance types.
//!
//! A [`CartLine`] is the persisted unit of both cart collections: the guest
//! cart (session-persisted, mutable) and the remote cart (fetched from the
//! account service, read-only). [`Provenance`] records which collection(s)
//! contributed a reconciled line's quantity.

use serde::{Deserialize, Serialize};

use crate::ProductId;

/// A single cart entry: product identity plus quantity.
///
/// Quantities are at least 1; zero-quantity lines are filtered out at the
/// boundaries that read persisted or fetched data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// The product this line refers to.
    pub product_id: ProductId,
    /// Number of units.
    pub quantity: u32,
}

impl CartLine {
    /// Create a new cart line.
    #[must_use]
    pub const fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

/// Which cart collection(s) contributed a reconciled line's quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Quantity comes entirely from the guest cart.
    Local,
    /// Quantity comes entirely from the account cart.
    Api,
    /// Both collections contributed.
    Both,
}

impl Provenance {
    /// The provenance after merging a line from `source` into an entry that
    /// already carries `self`. Same source keeps the tag; mixing sources
    /// yields [`Provenance::Both`].
    #[must_use]
    pub const fn merged_with(self, source: Self) -> Self {
        match (self, source) {
            (Self::Local, Self::Local) => Self::Local,
            (Self::Api, Self::Api) => Self::Api,
            _ => Self::Both,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merged_with() {
        assert_eq!(
            Provenance::Api.merged_with(Provenance::Local),
            Provenance::Both
        );
        assert_eq!(
            Provenance::Local.merged_with(Provenance::Local),
            Provenance::Local
        );
        assert_eq!(
            Provenance::Api.merged_with(Provenance::Api),
            Provenance::Api
        );
        assert_eq!(
            Provenance::Both.merged_with(Provenance::Local),
            Provenance::Both
        );
    }

    #[test]
    fn test_cart_line_serde() {
        let line = CartLine::new(ProductId::new(3), 2);
        let json = serde_json::to_string(&line).expect("serializable");
        assert_eq!(json, r#"{"product_id":3,"quantity":2}"#);
        let back: CartLine = serde_json::from_str(&json).expect("deserializable");
        assert_eq!(back, line);
    }

    #[test]
    fn test_provenance_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&Provenance::Both).expect("serializable"),
            r#""both""#
        );
    }
}
