//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Health check
//!
//! # Products
//! GET  /products               - Product listing (filter/sort/search)
//! GET  /products/{id}/quick-look - Quick look fragment (HTMX)
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart page (reconciled guest + account view)
//! POST /cart/add               - Add line (returns count, triggers cart-updated)
//! POST /cart/update            - Set quantity (returns cart_items fragment)
//! POST /cart/remove            - Remove line (returns cart_items fragment)
//! POST /cart/clear             - Clear guest cart (returns cart_items fragment)
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout
//! GET  /checkout               - Current checkout step
//! POST /checkout               - Save step fields, advance
//! POST /checkout/back          - Step back
//! POST /checkout/place         - Terminal acknowledgement (no order persisted)
//!
//! # Wishlist
//! GET  /wishlist               - Wishlist page
//! POST /wishlist/toggle        - Add/remove a product (fragment)
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login against the demo API
//! POST /auth/logout            - Clear the session identity
//!
//! # Newsletter
//! POST /newsletter/subscribe   - Acknowledgement fragment
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod home;
pub mod newsletter;
pub mod products;
pub mod wishlist;

use axum::{
    Router,
    routing::{get, post},
};
use tower_sessions::Session;

use crate::models::session::{CurrentUser, keys};
use crate::state::AppState;

/// Get the signed-in user from the session, if any.
///
/// A malformed stored identity reads as "guest" rather than an error.
pub(crate) async fn current_user(session: &Session) -> Option<CurrentUser> {
    session
        .get::<CurrentUser>(keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}/quick-look", get(products::quick_look))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show).post(checkout::advance))
        .route("/back", post(checkout::back))
        .route("/place", post(checkout::place))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/toggle", post(wishlist::toggle))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Product routes
        .nest("/products", product_routes())
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout routes
        .nest("/checkout", checkout_routes())
        // Wishlist routes
        .nest("/wishlist", wishlist_routes())
        // Auth routes
        .nest("/auth", auth_routes())
        // Newsletter signup
        .route("/newsletter/subscribe", post(newsletter::subscribe))
}
