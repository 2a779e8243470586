//! Authentication route handlers.
//!
//! Password login and registration. A successful login merges the cart saved
//! on the account into the session cart; registration logs the new user in
//! through the same path.

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

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{PageContext, clear_current_user, flash, set_current_user};
use crate::models::User;
use crate::services::auth::{AuthError, AuthService, Registration};
use crate::services::cart::CartService;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub ctx: PageContext,
    pub error: Option<String>,
    pub email: String,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub ctx: PageContext,
    pub error: Option<String>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

// =============================================================================
// Session Setup
// =============================================================================

/// Put a freshly authenticated user in the session and merge their carts.
async fn start_session(state: &AppState, session: &Session, user: &User) -> Result<(), AppError> {
    set_current_user(session, &user.to_current_user()).await?;
    CartService::new(state.pool(), session, Some(user.id))
        .merge_on_login(&user.cart)
        .await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(())
}

/// Failures worth showing on the form; anything else is a server error.
fn form_error(err: AuthError) -> Result<String, AppError> {
    match err {
        AuthError::Repository(_) | AuthError::PasswordHash => Err(AppError::Auth(err)),
        other => Ok(other.user_message()),
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(ctx: PageContext) -> impl IntoResponse {
    LoginTemplate {
        ctx,
        error: None,
        email: String::new(),
    }
}

/// Handle login form submission.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    match AuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await
    {
        Ok(user) => {
            start_session(&state, &session, &user).await?;
            tracing::info!(user_id = %user.id, "User logged in");
            Ok(Redirect::to("/").into_response())
        }
        Err(err) => {
            tracing::warn!(error = %err, "Login failed");
            Ok(LoginTemplate {
                error: Some(form_error(err)?),
                email: form.email,
                ctx: PageContext::from_session(&session).await,
            }
            .into_response())
        }
    }
}

/// Handle logout. The cart stays on the account for the next login.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect, AppError> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/"))
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(ctx: PageContext) -> impl IntoResponse {
    RegisterTemplate {
        ctx,
        error: None,
        email: String::new(),
        first_name: String::new(),
        last_name: String::new(),
    }
}

/// Handle registration form submission.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let registration = Registration {
        email: &form.email,
        password: &form.password,
        password_confirm: &form.password_confirm,
        first_name: form.first_name.clone(),
        last_name: form.last_name.clone(),
    };

    match AuthService::new(state.pool()).register(registration).await {
        Ok(user) => {
            start_session(&state, &session, &user).await?;
            tracing::info!(user_id = %user.id, "User registered");
            flash::success(&session, "Bienvenue ! Votre compte a été créé.").await;
            Ok(Redirect::to("/").into_response())
        }
        Err(err) => {
            tracing::info!(error = %err, "Registration rejected");
            Ok(RegisterTemplate {
                error: Some(form_error(err)?),
                ctx: PageContext::from_session(&session).await,
                email: form.email,
                first_name: form.first_name.unwrap_or_default(),
                last_name: form.last_name.unwrap_or_default(),
            }
            .into_response())
        }
    }
}

#[cfg(test)]
mod tests {
    use auxilia_core::PasswordError;

    use super::*;

    #[test]
    fn test_form_error_keeps_user_facing_failures() {
        assert!(form_error(AuthError::InvalidCredentials).is_ok());
        assert!(form_error(AuthError::AccountDisabled).is_ok());
        assert!(form_error(AuthError::Password(PasswordError::Mismatch)).is_ok());
    }

    #[test]
    fn test_form_error_escalates_server_failures() {
        assert!(form_error(AuthError::PasswordHash).is_err());
    }

    #[test]
    fn test_disabled_and_invalid_messages_differ() {
        let disabled = form_error(AuthError::AccountDisabled).unwrap_or_default();
        let invalid = form_error(AuthError::InvalidCredentials).unwrap_or_default();
        assert_ne!(disabled, invalid);
    }
}
