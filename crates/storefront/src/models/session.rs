//! Session-related types.
//!
//! Types stored in the per-visitor session key-value store.

use serde::{Deserialize, Serialize};

use superstore_core::UserId;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the signed-in user.
/// Presence of this value is what makes a session "logged in"; guests have
/// none, and all their cart operations are purely local.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Account ID at the external service.
    pub id: UserId,
    /// Login username, shown in the navbar.
    pub username: String,
}

/// Session keys for persisted state.
pub mod keys {
    /// Key for the signed-in user identity.
    pub const CURRENT_USER: &str = "user";

    /// Key for the guest cart lines.
    pub const CART: &str = "cart";

    /// Key for the wishlist product IDs.
    pub const WISHLIST: &str = "wishlist";

    /// Key for the in-progress checkout draft.
    pub const CHECKOUT: &str = "checkout";
}
