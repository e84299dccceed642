//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::middleware::CspNonce;
use crate::models::session::CurrentUser;
use crate::routes::current_user;
use crate::routes::products::{ProductCardView, categories};
use crate::routes::wishlist::wishlist_ids;
use crate::state::AppState;

/// How many products the featured section shows.
const FEATURED_LIMIT: u32 = 4;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub user: Option<CurrentUser>,
    pub nonce: String,
    pub featured: Vec<ProductCardView>,
    pub categories: Vec<String>,
}

/// Display the home page.
///
/// Both catalog reads degrade to empty sections on failure; the page itself
/// never hard-fails on the demo API being down.
#[instrument(skip(state, session, nonce))]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
) -> impl IntoResponse {
    let featured = match state.store().get_products_limited(FEATURED_LIMIT).await {
        Ok(products) => products,
        Err(e) => {
            tracing::warn!("Failed to load featured products: {e}");
            Vec::new()
        }
    };

    let catalog = match state.store().get_products().await {
        Ok(products) => products,
        Err(e) => {
            tracing::warn!("Failed to load catalog for categories: {e}");
            Vec::new()
        }
    };

    let wishlist = wishlist_ids(&session).await;
    let featured = featured
        .iter()
        .map(|product| ProductCardView::from_product(product, &wishlist))
        .collect();

    HomeTemplate {
        user: current_user(&session).await,
        nonce,
        featured,
        categories: categories(&catalog),
    }
}
