//! Mutations over the guest cart.
//!
//! These operate on the guest lines only; the remote cart is never written.
//! Callers persist the result via [`CartStore`](super::CartStore) immediately
//! after mutating and re-render the reconciled view.

use superstore_core::{CartLine, ProductId};

/// Add one unit of a product.
///
/// Increments the existing line's quantity, or inserts a new line with
/// quantity 1.
pub fn add(lines: &mut Vec<CartLine>, product_id: ProductId) {
    if let Some(line) = lines.iter_mut().find(|line| line.product_id == product_id) {
        line.quantity += 1;
    } else {
        lines.push(CartLine::new(product_id, 1));
    }
}

/// Remove a product's line entirely. No-op if absent.
pub fn remove(lines: &mut Vec<CartLine>, product_id: ProductId) {
    lines.retain(|line| line.product_id != product_id);
}

/// Overwrite a line's quantity.
///
/// A quantity of 0 is equivalent to [`remove`]. Setting a quantity for a
/// product with no guest line is a no-op.
pub fn set_quantity(lines: &mut Vec<CartLine>, product_id: ProductId, quantity: u32) {
    if quantity == 0 {
        remove(lines, product_id);
        return;
    }

    if let Some(line) = lines.iter_mut().find(|line| line.product_id == product_id) {
        line.quantity = quantity;
    }
}

/// Empty the guest cart.
pub fn clear(lines: &mut Vec<CartLine>) {
    lines.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: i32) -> ProductId {
        ProductId::new(value)
    }

    #[test]
    fn test_add_twice_yields_one_line_with_quantity_two() {
        let mut lines = Vec::new();
        add(&mut lines, id(7));
        add(&mut lines, id(7));

        assert_eq!(lines, vec![CartLine::new(id(7), 2)]);
    }

    #[test]
    fn test_add_inserts_separate_lines_per_product() {
        let mut lines = Vec::new();
        add(&mut lines, id(1));
        add(&mut lines, id(2));

        assert_eq!(
            lines,
            vec![CartLine::new(id(1), 1), CartLine::new(id(2), 1)]
        );
    }

    #[test]
    fn test_set_quantity_zero_removes_the_line() {
        let mut lines = vec![CartLine::new(id(3), 2)];
        set_quantity(&mut lines, id(3), 0);

        let mut expected = vec![CartLine::new(id(3), 2)];
        remove(&mut expected, id(3));
        assert_eq!(lines, expected);
        assert!(lines.is_empty());
    }

    #[test]
    fn test_set_quantity_overwrites() {
        let mut lines = vec![CartLine::new(id(3), 2)];
        set_quantity(&mut lines, id(3), 5);
        assert_eq!(lines, vec![CartLine::new(id(3), 5)]);
    }

    #[test]
    fn test_set_quantity_on_absent_product_is_a_noop() {
        let mut lines = vec![CartLine::new(id(1), 1)];
        set_quantity(&mut lines, id(9), 4);
        assert_eq!(lines, vec![CartLine::new(id(1), 1)]);
    }

    #[test]
    fn test_remove_absent_product_is_a_noop() {
        let mut lines = vec![CartLine::new(id(1), 1)];
        remove(&mut lines, id(9));
        assert_eq!(lines, vec![CartLine::new(id(1), 1)]);
    }

    #[test]
    fn test_clear_empties_the_cart() {
        let mut lines = vec![CartLine::new(id(1), 1), CartLine::new(id(2), 3)];
        clear(&mut lines);
        assert!(lines.is_empty());
    }
}
