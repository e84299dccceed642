//! Checkout route handlers.
//!
//! A three-step form: contact and shipping details, order review, payment.
//! The draft lives in the session; card fields are never stored. Placing the
//! order is terminal - an acknowledgement page with a reference number, no
//! persisted order and no payment processing.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;
use uuid::Uuid;

use superstore_core::Price;

use crate::cart::{CartStore, DisplayItem, mutate};
use crate::filters;
use crate::middleware::CspNonce;
use crate::models::session::{CurrentUser, keys};
use crate::routes::cart::{CartItemView, reconciled_items};
use crate::routes::current_user;
use crate::state::AppState;

/// Flat shipping charge, in cents.
const SHIPPING_FLAT_CENTS: i64 = 599;

/// Tax rate applied to the item subtotal.
const TAX_RATE_PERCENT: i64 = 8;

// =============================================================================
// Draft State
// =============================================================================

/// Contact and shipping details collected in step 1.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

/// In-progress checkout state, held under the `checkout` session key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutDraft {
    pub step: u8,
    pub contact: ContactInfo,
}

impl Default for CheckoutDraft {
    fn default() -> Self {
        Self {
            step: 1,
            contact: ContactInfo::default(),
        }
    }
}

async fn read_draft(session: &Session) -> CheckoutDraft {
    session
        .get::<CheckoutDraft>(keys::CHECKOUT)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

async fn write_draft(session: &Session, draft: &CheckoutDraft) {
    if let Err(e) = session.insert(keys::CHECKOUT, draft).await {
        tracing::error!("Failed to persist checkout draft: {e}");
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Order totals in decimal arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub subtotal: Price,
    pub shipping: Price,
    pub tax: Price,
    pub total: Price,
}

/// Compute order totals from the reconciled cart.
///
/// Flat shipping plus a percentage tax on the item subtotal. An empty cart
/// totals zero - no shipping charge on nothing.
#[must_use]
pub fn compute_totals(items: &[DisplayItem]) -> Totals {
    let subtotal: Price = items.iter().map(DisplayItem::line_total).sum();
    let shipping = if items.is_empty() {
        Price::ZERO
    } else {
        Price::from_cents(SHIPPING_FLAT_CENTS)
    };
    let tax = Price::new(
        (subtotal.amount() * Decimal::new(TAX_RATE_PERCENT, 2)).round_dp(2),
    );

    Totals {
        subtotal,
        shipping,
        tax,
        total: subtotal + shipping + tax,
    }
}

/// Totals formatted for templates.
pub struct TotalsView {
    pub subtotal: String,
    pub shipping: String,
    pub tax: String,
    pub total: String,
}

impl From<Totals> for TotalsView {
    fn from(totals: Totals) -> Self {
        Self {
            subtotal: totals.subtotal.to_string(),
            shipping: totals.shipping.to_string(),
            tax: totals.tax.to_string(),
            total: totals.total.to_string(),
        }
    }
}

// =============================================================================
// Forms
// =============================================================================

/// Posted on steps 1 and 2; contact fields are only present on step 1.
#[derive(Debug, Deserialize)]
pub struct StepForm {
    pub step: u8,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip: String,
    #[serde(default)]
    pub country: String,
}

/// Posted on step 3. Validated for shape, then discarded - nothing here is
/// stored or charged.
#[derive(Debug, Deserialize)]
pub struct PaymentForm {
    pub card_number: String,
    pub card_name: String,
    pub expiry: String,
    pub cvv: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Checkout page template; renders the step indicated by `step`.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub user: Option<CurrentUser>,
    pub nonce: String,
    pub step: u8,
    pub contact: ContactInfo,
    pub items: Vec<CartItemView>,
    pub totals: TotalsView,
    pub error: String,
}

/// Order acknowledgement template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/confirmation.html")]
pub struct ConfirmationTemplate {
    pub user: Option<CurrentUser>,
    pub nonce: String,
    pub reference: String,
    pub placed_at: String,
    pub total: String,
}

async fn render_checkout(
    state: &AppState,
    session: &Session,
    nonce: String,
    draft: CheckoutDraft,
    error: String,
) -> Response {
    let items = reconciled_items(state, session).await;
    if items.is_empty() {
        return Redirect::to("/cart").into_response();
    }

    let totals = compute_totals(&items);
    CheckoutTemplate {
        user: current_user(session).await,
        nonce,
        step: draft.step,
        contact: draft.contact,
        items: items.iter().map(CartItemView::from).collect(),
        totals: totals.into(),
        error,
    }
    .into_response()
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the current checkout step.
#[instrument(skip(state, session, nonce))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
) -> Response {
    let draft = read_draft(&session).await;
    render_checkout(&state, &session, nonce, draft, String::new()).await
}

/// Save the current step's fields and advance.
#[instrument(skip(state, session, nonce, form))]
pub async fn advance(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    Form(form): Form<StepForm>,
) -> Response {
    let mut draft = read_draft(&session).await;

    match form.step {
        1 => {
            let contact = ContactInfo {
                name: form.name.trim().to_string(),
                email: form.email.trim().to_string(),
                phone: form.phone.trim().to_string(),
                address: form.address.trim().to_string(),
                city: form.city.trim().to_string(),
                state: form.state.trim().to_string(),
                zip: form.zip.trim().to_string(),
                country: form.country.trim().to_string(),
            };

            if contact.name.is_empty() || contact.address.is_empty() {
                draft.step = 1;
                draft.contact = contact;
                return render_checkout(
                    &state,
                    &session,
                    nonce,
                    draft,
                    "Name and address are required.".to_string(),
                )
                .await;
            }
            if !is_plausible_email(&contact.email) {
                draft.step = 1;
                draft.contact = contact;
                return render_checkout(
                    &state,
                    &session,
                    nonce,
                    draft,
                    "Enter a valid email address.".to_string(),
                )
                .await;
            }

            draft.contact = contact;
            draft.step = 2;
        }
        2 => draft.step = 3,
        _ => draft.step = 1,
    }

    write_draft(&session, &draft).await;
    Redirect::to("/checkout").into_response()
}

/// Step back without losing saved fields.
#[instrument(skip(session))]
pub async fn back(session: Session) -> Response {
    let mut draft = read_draft(&session).await;
    draft.step = draft.step.saturating_sub(1).max(1);
    write_draft(&session, &draft).await;
    Redirect::to("/checkout").into_response()
}

/// Place the order: terminal acknowledgement, no backend effect.
///
/// Clears the guest cart and the checkout draft. Quantity that came from the
/// account cart reappears on the next reconciliation pass, since the remote
/// snapshot is never written.
#[instrument(skip(state, session, nonce, form))]
pub async fn place(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    Form(form): Form<PaymentForm>,
) -> Response {
    let items = reconciled_items(&state, &session).await;
    if items.is_empty() {
        return Redirect::to("/cart").into_response();
    }

    if let Err(message) = validate_payment(&form) {
        let mut draft = read_draft(&session).await;
        draft.step = 3;
        return render_checkout(&state, &session, nonce, draft, message).await;
    }

    let totals = compute_totals(&items);
    let reference = Uuid::new_v4().to_string();
    let placed_at = chrono::Utc::now().format("%B %-d, %Y %H:%M UTC").to_string();

    tracing::info!(
        reference = %reference,
        total = %totals.total,
        item_count = items.len(),
        "order acknowledged"
    );

    let store = CartStore::new(session.clone());
    let mut lines = store.read().await;
    mutate::clear(&mut lines);
    if let Err(e) = store.write(&lines).await {
        tracing::error!("Failed to clear guest cart after checkout: {e}");
    }
    if let Err(e) = session.remove::<CheckoutDraft>(keys::CHECKOUT).await {
        tracing::error!("Failed to clear checkout draft: {e}");
    }

    ConfirmationTemplate {
        user: current_user(&session).await,
        nonce,
        reference,
        placed_at,
        total: totals.total.to_string(),
    }
    .into_response()
}

// =============================================================================
// Validation
// =============================================================================

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

fn validate_payment(form: &PaymentForm) -> Result<(), String> {
    let digits: String = form
        .card_number
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    if digits.len() < 12 || digits.len() > 19 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err("Enter a valid card number.".to_string());
    }
    if form.card_name.trim().is_empty() {
        return Err("Enter the name on the card.".to_string());
    }
    if form.expiry.trim().is_empty() {
        return Err("Enter the card expiry.".to_string());
    }
    let cvv = form.cvv.trim();
    if cvv.len() < 3 || cvv.len() > 4 || !cvv.chars().all(|c| c.is_ascii_digit()) {
        return Err("Enter a valid security code.".to_string());
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use superstore_core::{ProductId, Provenance};

    use super::*;

    fn item(cents: i64, quantity: u32) -> DisplayItem {
        DisplayItem {
            product_id: ProductId::new(1),
            title: "Product".to_string(),
            price: Price::from_cents(cents),
            image: String::new(),
            category: String::new(),
            quantity,
            provenance: Provenance::Local,
        }
    }

    #[test]
    fn test_totals_add_flat_shipping_and_tax() {
        // Subtotal $100.00, shipping $5.99, tax $8.00.
        let totals = compute_totals(&[item(10000, 1)]);
        assert_eq!(totals.subtotal, Price::from_cents(10000));
        assert_eq!(totals.shipping, Price::from_cents(599));
        assert_eq!(totals.tax, Price::from_cents(800));
        assert_eq!(totals.total, Price::from_cents(11399));
    }

    #[test]
    fn test_totals_tax_rounds_to_cents() {
        // Subtotal $22.30 -> tax $1.784, rounded to $1.78.
        let totals = compute_totals(&[item(2230, 1)]);
        assert_eq!(totals.tax, Price::from_cents(178));
    }

    #[test]
    fn test_empty_cart_totals_zero() {
        let totals = compute_totals(&[]);
        assert_eq!(totals.total, Price::ZERO);
        assert_eq!(totals.shipping, Price::ZERO);
    }

    #[test]
    fn test_totals_sum_line_quantities() {
        let totals = compute_totals(&[item(1000, 3)]);
        assert_eq!(totals.subtotal, Price::from_cents(3000));
    }

    #[test]
    fn test_plausible_email() {
        assert!(is_plausible_email("jane@example.com"));
        assert!(!is_plausible_email("jane"));
        assert!(!is_plausible_email("jane@"));
        assert!(!is_plausible_email("jane@nodot"));
        assert!(!is_plausible_email("@example.com"));
    }

    #[test]
    fn test_validate_payment() {
        let valid = PaymentForm {
            card_number: "4242 4242 4242 4242".to_string(),
            card_name: "Jane Doe".to_string(),
            expiry: "12/28".to_string(),
            cvv: "123".to_string(),
        };
        assert!(validate_payment(&valid).is_ok());

        let bad_number = PaymentForm {
            card_number: "42".to_string(),
            ..clone_form(&valid)
        };
        assert!(validate_payment(&bad_number).is_err());

        let bad_cvv = PaymentForm {
            cvv: "12a".to_string(),
            ..clone_form(&valid)
        };
        assert!(validate_payment(&bad_cvv).is_err());
    }

    fn clone_form(form: &PaymentForm) -> PaymentForm {
        PaymentForm {
            card_number: form.card_number.clone(),
            card_name: form.card_name.clone(),
            expiry: form.expiry.clone(),
            cvv: form.cvv.clone(),
        }
    }
}
