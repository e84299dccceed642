//! Merging the guest and remote carts into a single display list.

use std::collections::HashMap;

use superstore_core::{CartLine, Price, ProductId, Provenance};

use crate::fakestore::types::Product;

/// A reconciled, catalog-enriched cart line ready for display.
///
/// Derived data: recomputed whenever either cart collection or the catalog
/// changes, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayItem {
    /// The product this item refers to.
    pub product_id: ProductId,
    /// Resolved product title.
    pub title: String,
    /// Resolved unit price.
    pub price: Price,
    /// Resolved image URL.
    pub image: String,
    /// Resolved category.
    pub category: String,
    /// Summed quantity across contributing collections.
    pub quantity: u32,
    /// Which collection(s) contributed the quantity.
    pub provenance: Provenance,
}

impl DisplayItem {
    fn from_product(product: &Product, quantity: u32, provenance: Provenance) -> Self {
        Self {
            product_id: product.id,
            title: product.title.clone(),
            price: product.price,
            image: product.image.clone(),
            category: product.category.clone(),
            quantity,
            provenance,
        }
    }

    /// The unit price multiplied by the quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.line_total(self.quantity)
    }
}

/// Merge the guest and remote carts into one display list.
///
/// - When `is_logged_in` is false the remote collection is ignored entirely;
///   guest sessions never see account data.
/// - Lines whose product ID does not resolve in `catalog` are dropped.
/// - Lines sharing a product ID have their quantities summed, and the
///   provenance tag records which collection(s) contributed.
/// - Output order is insertion order: remote lines first, then guest lines.
///
/// The merge is deterministic and idempotent: the same inputs always produce
/// the same output. Duplicate product IDs within a single collection are not
/// expected but are summed as encountered.
#[must_use]
pub fn reconcile(
    local: &[CartLine],
    remote: &[CartLine],
    catalog: &[Product],
    is_logged_in: bool,
) -> Vec<DisplayItem> {
    let by_id: HashMap<ProductId, &Product> =
        catalog.iter().map(|product| (product.id, product)).collect();

    let mut items: Vec<DisplayItem> = Vec::new();
    let mut positions: HashMap<ProductId, usize> = HashMap::new();

    let remote = if is_logged_in { remote } else { &[] };

    for line in remote {
        merge_line(&mut items, &mut positions, &by_id, line, Provenance::Api);
    }
    for line in local {
        merge_line(&mut items, &mut positions, &by_id, line, Provenance::Local);
    }

    items
}

fn merge_line(
    items: &mut Vec<DisplayItem>,
    positions: &mut HashMap<ProductId, usize>,
    catalog: &HashMap<ProductId, &Product>,
    line: &CartLine,
    source: Provenance,
) {
    let Some(product) = catalog.get(&line.product_id) else {
        tracing::debug!(
            product_id = %line.product_id,
            "dropping cart line for product missing from catalog"
        );
        return;
    };

    if let Some(&position) = positions.get(&line.product_id) {
        if let Some(item) = items.get_mut(position) {
            item.quantity += line.quantity;
            item.provenance = item.provenance.merged_with(source);
        }
    } else {
        positions.insert(line.product_id, items.len());
        items.push(DisplayItem::from_product(product, line.quantity, source));
    }
}
