//! Back-office login and logout.

use askama::Template;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::render;
use crate::error::AppError;
use crate::filters;
use crate::middleware::auth::current_admin;
use crate::middleware::{clear_current_admin, set_current_admin};
use crate::services::{AdminAuthError, AdminAuthService};
use crate::state::AppState;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Login page template.
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub email: String,
}

/// Display the login page, or go straight to the dashboard if signed in.
pub async fn login_page(session: Session) -> Result<Response, AppError> {
    if current_admin(&session).await.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    Ok(render(&LoginTemplate {
        error: None,
        email: String::new(),
    })?
    .into_response())
}

/// Check the credentials and open an admin session.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    match AdminAuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await
    {
        Ok(admin) => {
            set_current_admin(&session, &admin).await?;
            tracing::info!(admin_id = %admin.id, "Admin signed in");
            Ok(Redirect::to("/").into_response())
        }
        Err(AdminAuthError::Repository(e)) => Err(AppError::Database(e)),
        Err(AdminAuthError::PasswordHash) => {
            Err(AppError::Internal("password verification failed".to_string()))
        }
        Err(err) => {
            tracing::warn!(error = %err, "Admin sign-in refused");
            Ok(render(&LoginTemplate {
                error: Some(err.user_message().to_owned()),
                email: form.email,
            })?
            .into_response())
        }
    }
}

/// End the admin session.
pub async fn logout(session: Session) -> Result<Redirect, AppError> {
    clear_current_admin(&session).await?;
    Ok(Redirect::to("/login"))
}
