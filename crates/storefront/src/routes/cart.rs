//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Every mutation touches the guest cart only, persists it to the session,
//! and re-renders the reconciled view; the response carries an
//! `HX-Trigger: cart-updated` event that dependent views (the navbar count
//! badge) subscribe to.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use superstore_core::{CartLine, Price, ProductId, Provenance};

use crate::cart::{CartStore, DisplayItem, mutate, reconcile};
use crate::filters;
use crate::middleware::CspNonce;
use crate::models::session::CurrentUser;
use crate::routes::current_user;
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub product_id: ProductId,
    pub title: String,
    pub category: String,
    pub image: String,
    pub quantity: u32,
    pub quantity_minus: u32,
    pub quantity_plus: u32,
    pub price: String,
    pub line_price: String,
    /// Provenance badge text; empty for purely local lines.
    pub source_badge: &'static str,
}

impl From<&DisplayItem> for CartItemView {
    fn from(item: &DisplayItem) -> Self {
        Self {
            product_id: item.product_id,
            title: item.title.clone(),
            category: item.category.clone(),
            image: item.image.clone(),
            quantity: item.quantity,
            quantity_minus: item.quantity.saturating_sub(1),
            quantity_plus: item.quantity.saturating_add(1),
            price: item.price.to_string(),
            line_price: item.line_total().to_string(),
            source_badge: match item.provenance {
                Provenance::Local => "",
                Provenance::Api => "Account",
                Provenance::Both => "Account + Local",
            },
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u32,
    /// True when any line has quantity from the account cart.
    pub includes_account_items: bool,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            subtotal: Price::ZERO.to_string(),
            item_count: 0,
            includes_account_items: false,
        }
    }

    fn from_items(items: &[DisplayItem]) -> Self {
        let subtotal: Price = items.iter().map(DisplayItem::line_total).sum();
        Self {
            item_count: items.iter().map(|item| item.quantity).sum(),
            includes_account_items: items
                .iter()
                .any(|item| item.provenance != Provenance::Local),
            items: items.iter().map(CartItemView::from).collect(),
            subtotal: subtotal.to_string(),
        }
    }
}

// =============================================================================
// Reconciliation Driver
// =============================================================================

/// Build the reconciled display items for the current session.
///
/// Partial readiness degrades per source: a failed catalog read acts as an
/// empty catalog (all lines unresolvable) and a failed remote cart read acts
/// as an empty account cart; both are logged, neither fails the page.
pub(crate) async fn reconciled_items(state: &AppState, session: &Session) -> Vec<DisplayItem> {
    let catalog = match state.store().get_products().await {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::warn!("Failed to load catalog for cart: {e}");
            Vec::new()
        }
    };

    let local = CartStore::new(session.clone()).read().await;

    let (remote, is_logged_in) = match current_user(session).await {
        Some(user) => match state.store().get_user_cart(user.id).await {
            Ok(cart) => (cart.into_lines(), true),
            Err(e) => {
                tracing::warn!(user_id = %user.id, "Failed to fetch account cart: {e}");
                (Vec::new(), true)
            }
        },
        None => (Vec::new(), false),
    };

    reconcile(&local, &remote, &catalog, is_logged_in)
}

async fn reconciled_view(state: &AppState, session: &Session) -> CartView {
    CartView::from_items(&reconciled_items(state, session).await)
}

// =============================================================================
// Forms
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: ProductId,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub user: Option<CurrentUser>,
    pub nonce: String,
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart page.
#[instrument(skip(state, session, nonce))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
) -> impl IntoResponse {
    let cart = reconciled_view(&state, &session).await;

    CartShowTemplate {
        user: current_user(&session).await,
        nonce,
        cart,
    }
}

/// Apply a mutation to the guest cart and persist it.
///
/// Session write failures are logged but don't fail the response; the
/// in-memory lines still render and the next successful write catches up
/// (last-write-wins).
async fn mutate_guest_cart(session: &Session, apply: impl FnOnce(&mut Vec<CartLine>)) {
    let store = CartStore::new(session.clone());
    let mut lines = store.read().await;
    apply(&mut lines);
    if let Err(e) = store.write(&lines).await {
        tracing::error!("Failed to persist guest cart: {e}");
    }
}

/// Add one unit of a product to the guest cart (HTMX).
///
/// Returns the count badge fragment with a trigger to update other views.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Response {
    mutate_guest_cart(&session, |lines| mutate::add(lines, form.product_id)).await;

    let cart = reconciled_view(&state, &session).await;
    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartCountTemplate {
            count: cart.item_count,
        },
    )
        .into_response()
}

/// Set a guest line's quantity (HTMX). Quantity 0 removes the line.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<UpdateCartForm>,
) -> Response {
    mutate_guest_cart(&session, |lines| {
        mutate::set_quantity(lines, form.product_id, form.quantity);
    })
    .await;

    let cart = reconciled_view(&state, &session).await;
    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate { cart },
    )
        .into_response()
}

/// Remove a guest line (HTMX).
///
/// Quantity contributed by the account cart is untouched and reappears on
/// the next reconciliation pass.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    mutate_guest_cart(&session, |lines| mutate::remove(lines, form.product_id)).await;

    let cart = reconciled_view(&state, &session).await;
    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate { cart },
    )
        .into_response()
}

/// Empty the guest cart (HTMX).
#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: Session) -> Response {
    mutate_guest_cart(&session, mutate::clear).await;

    let cart = reconciled_view(&state, &session).await;
    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate { cart },
    )
        .into_response()
}

/// Get the cart count badge (HTMX).
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let cart = reconciled_view(&state, &session).await;

    CartCountTemplate {
        count: cart.item_count,
    }
}
