//! Wishlist route handlers.
//!
//! The wishlist is a session-persisted list of product IDs, managed
//! independently of cart reconciliation. IDs are resolved against the
//! catalog on render; entries for unknown products are dropped, mirroring
//! the cart's orphan handling.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::IntoResponse,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use superstore_core::ProductId;

use crate::error::Result;
use crate::filters;
use crate::middleware::CspNonce;
use crate::models::session::{CurrentUser, keys};
use crate::routes::current_user;
use crate::routes::products::ProductCardView;
use crate::state::AppState;

/// Read the wishlist product IDs from the session.
///
/// An absent key or malformed payload reads as an empty wishlist.
pub(crate) async fn wishlist_ids(session: &Session) -> Vec<ProductId> {
    session
        .get::<Vec<ProductId>>(keys::WISHLIST)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

async fn write_wishlist(
    session: &Session,
    ids: &[ProductId],
) -> std::result::Result<(), tower_sessions::session::Error> {
    session.insert(keys::WISHLIST, ids).await
}

/// Toggle form data.
#[derive(Debug, Deserialize)]
pub struct ToggleForm {
    pub product_id: ProductId,
}

/// Wishlist page template.
#[derive(Template, WebTemplate)]
#[template(path = "wishlist/show.html")]
pub struct WishlistTemplate {
    pub user: Option<CurrentUser>,
    pub nonce: String,
    pub products: Vec<ProductCardView>,
}

/// Wishlist heart button fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/wishlist_button.html")]
pub struct WishlistButtonTemplate {
    pub product_id: ProductId,
    pub in_wishlist: bool,
}

/// Display the wishlist page.
#[instrument(skip(state, session, nonce))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
) -> impl IntoResponse {
    let catalog = match state.store().get_products().await {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::warn!("Failed to load catalog for wishlist: {e}");
            Vec::new()
        }
    };

    let ids = wishlist_ids(&session).await;
    let products: Vec<ProductCardView> = ids
        .iter()
        .filter_map(|id| catalog.iter().find(|product| product.id == *id))
        .map(|product| ProductCardView::from_product(product, &ids))
        .collect();

    WishlistTemplate {
        user: current_user(&session).await,
        nonce,
        products,
    }
}

/// Add or remove a product from the wishlist (HTMX).
///
/// Returns the heart button fragment reflecting the new state.
#[instrument(skip(session))]
pub async fn toggle(
    session: Session,
    Form(form): Form<ToggleForm>,
) -> Result<WishlistButtonTemplate> {
    let mut ids = wishlist_ids(&session).await;

    let in_wishlist = if ids.contains(&form.product_id) {
        ids.retain(|id| *id != form.product_id);
        false
    } else {
        ids.push(form.product_id);
        true
    };

    write_wishlist(&session, &ids).await?;

    Ok(WishlistButtonTemplate {
        product_id: form.product_id,
        in_wishlist,
    })
}
