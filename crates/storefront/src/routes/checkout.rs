//! Checkout route handlers.
//!
//! `GET /checkout` shows a confirmation page once the guards pass;
//! `POST /checkout/validate` writes the order.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use auxilia_core::ShippingDetails;

use crate::error::AppError;
use crate::filters;
use crate::middleware::{OptionalAuth, PageContext, RequireAuth, flash};
use crate::routes::cart::CartView;
use crate::services::checkout::{CheckoutError, CheckoutService, CheckoutSummary};
use crate::state::AppState;

const LOGIN_REQUIRED: &str = "Vous devez être connecté pour passer une commande.";
const EMPTY_CART: &str = "Votre panier est vide.";
const TOTAL_TOO_LARGE: &str =
    "Le montant de la commande est trop élevé. Réduisez les quantités de votre panier.";
const INCOMPLETE_PROFILE: &str =
    "Veuillez compléter vos coordonnées de livraison et votre profil avant de passer commande.";

/// Checkout confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/confirm.html")]
pub struct CheckoutConfirmTemplate {
    pub ctx: PageContext,
    pub cart: CartView,
    pub shipping: ShippingDetails,
}

/// Order placed template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/success.html")]
pub struct CheckoutSuccessTemplate {
    pub ctx: PageContext,
}

/// Turn a failed guard into the redirect the visitor should see.
async fn guard_redirect(session: &Session, err: CheckoutError) -> Result<Response, AppError> {
    match err {
        CheckoutError::EmptyCart => {
            flash::warning(session, EMPTY_CART).await;
            Ok(Redirect::to("/cart").into_response())
        }
        CheckoutError::TotalTooLarge => {
            flash::error(session, TOTAL_TOO_LARGE).await;
            Ok(Redirect::to("/cart").into_response())
        }
        CheckoutError::IncompleteProfile => {
            flash::warning(session, INCOMPLETE_PROFILE).await;
            Ok(Redirect::to("/profile").into_response())
        }
        CheckoutError::UserNotFound => Err(AppError::Unauthorized("unknown user".to_string())),
        CheckoutError::Cart(e) => Err(e.into()),
        CheckoutError::Repository(e) => Err(AppError::Database(e)),
    }
}

/// Display the confirmation page, or redirect to whatever is missing.
///
/// Anonymous visitors go to the login page, an empty cart back to the cart,
/// and missing shipping details to the profile page.
#[instrument(skip(state, session, auth))]
pub async fn confirm(
    State(state): State<AppState>,
    session: Session,
    auth: OptionalAuth,
) -> Result<Response, AppError> {
    let Some(user) = auth.0 else {
        flash::error(&session, LOGIN_REQUIRED).await;
        return Ok(Redirect::to("/login").into_response());
    };

    let summary = CheckoutService::new(state.pool(), &session, user.id)
        .summary()
        .await;
    match summary {
        Ok(CheckoutSummary { contents, shipping }) => {
            // Loaded after the guards so their flashes survive the redirect
            Ok(CheckoutConfirmTemplate {
                ctx: PageContext::from_session(&session).await,
                cart: CartView::from(&contents),
                shipping,
            }
            .into_response())
        }
        Err(err) => guard_redirect(&session, err).await,
    }
}

/// Place the order and empty the cart.
#[instrument(skip(state, session, user))]
pub async fn validate(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<Response, AppError> {
    match CheckoutService::new(state.pool(), &session, user.id)
        .place_order()
        .await
    {
        Ok(_) => Ok(Redirect::to("/checkout/success").into_response()),
        Err(err) => guard_redirect(&session, err).await,
    }
}

/// Thank-you page.
pub async fn success(ctx: PageContext) -> impl IntoResponse {
    CheckoutSuccessTemplate { ctx }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::http::{StatusCode, header::LOCATION};
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::middleware::FlashLevel;

    #[tokio::test]
    async fn test_oversized_total_goes_back_to_cart_with_error() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);

        let response = guard_redirect(&session, CheckoutError::TotalTooLarge)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/cart");

        let flashes = flash::take(&session).await;
        assert_eq!(flashes.len(), 1);
        assert_eq!(flashes[0].level, FlashLevel::Error);
        assert_eq!(flashes[0].message, TOTAL_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_incomplete_profile_goes_to_profile() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);

        let response = guard_redirect(&session, CheckoutError::IncompleteProfile)
            .await
            .unwrap();
        assert_eq!(response.headers()[LOCATION], "/profile");
    }
}
