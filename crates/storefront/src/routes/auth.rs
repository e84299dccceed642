//! Auth route handlers.
//!
//! Authentication is delegated to the demo API's token login. On success the
//! account record is resolved via the users endpoint (the login endpoint only
//! returns a token) and a minimal identity is stored in the session. Logout
//! clears the identity; the guest cart is left intact, so the session
//! continues as a guest.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::fakestore::StoreApiError;
use crate::filters;
use crate::middleware::CspNonce;
use crate::models::session::{CurrentUser, keys};
use crate::routes::current_user;
use crate::state::AppState;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub user: Option<CurrentUser>,
    pub nonce: String,
    /// Error message; empty when there is none.
    pub error: String,
    /// Username to repopulate after a failed attempt.
    pub username: String,
}

/// Display the login page.
#[instrument(skip(session, nonce))]
pub async fn login_page(session: Session, CspNonce(nonce): CspNonce) -> impl IntoResponse {
    LoginTemplate {
        user: current_user(&session).await,
        nonce,
        error: String::new(),
        username: String::new(),
    }
}

/// Log in against the demo API.
#[instrument(skip(state, session, nonce, form), fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    Form(form): Form<LoginForm>,
) -> Response {
    let username = form.username.trim().to_string();

    let render_error = |error: String, username: String| {
        LoginTemplate {
            user: None,
            nonce,
            error,
            username,
        }
        .into_response()
    };

    if username.is_empty() || form.password.is_empty() {
        return render_error("Enter a username and password.".to_string(), username);
    }

    match state.store().login(&username, &form.password).await {
        Ok(_response) => {}
        Err(StoreApiError::Api { status, .. }) if status == 401 || status == 400 => {
            return render_error("Invalid username or password.".to_string(), username);
        }
        Err(e) => {
            tracing::error!("Login request failed: {e}");
            return render_error(
                "Login is temporarily unavailable. Please try again.".to_string(),
                username,
            );
        }
    }

    // The login endpoint only returns a token; resolve the account record
    // for its user ID.
    let account = match state.store().get_users().await {
        Ok(users) => users.into_iter().find(|user| user.username == username),
        Err(e) => {
            tracing::error!("Failed to load account records: {e}");
            None
        }
    };

    let Some(account) = account else {
        return render_error(
            "Could not load your account details. Please try again.".to_string(),
            username,
        );
    };

    let user = CurrentUser {
        id: account.id,
        username: account.username,
    };

    if let Err(e) = session.insert(keys::CURRENT_USER, &user).await {
        tracing::error!("Failed to store session identity: {e}");
        return render_error(
            "Login is temporarily unavailable. Please try again.".to_string(),
            username,
        );
    }

    tracing::info!(user_id = %user.id, "login successful");
    Redirect::to("/").into_response()
}

/// Clear the session identity.
///
/// The guest cart and wishlist stay; the session continues as a guest.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> impl IntoResponse {
    if let Err(e) = session.remove::<CurrentUser>(keys::CURRENT_USER).await {
        tracing::error!("Failed to clear session identity: {e}");
    }

    Redirect::to("/")
}
