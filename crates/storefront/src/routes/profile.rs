//! Profile route handlers (signed-in users only).
//!
//! One page holds two forms: contact and shipping details, and a password
//! change. Both post back and redirect to `/profile` with a flash.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use auxilia_core::ProfileFields;

use crate::error::AppError;
use crate::filters;
use crate::middleware::{PageContext, RequireAuth, flash, refresh_current_user};
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Profile form data.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

impl ProfileForm {
    fn fields(self) -> (String, ProfileFields) {
        (
            self.email,
            ProfileFields {
                first_name: self.first_name,
                last_name: self.last_name,
                phone: self.phone,
                address: self.address,
                postal_code: self.postal_code,
                city: self.city,
                country: self.country,
            },
        )
    }
}

/// Password change form data.
#[derive(Debug, Deserialize)]
pub struct PasswordForm {
    pub current_password: String,
    pub new_password: String,
    pub new_password_confirm: String,
}

/// Profile form values as displayed.
#[derive(Clone, Default)]
pub struct ProfileView {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub postal_code: String,
    pub city: String,
    pub country: String,
    pub complete: bool,
}

impl ProfileView {
    fn new(email: &str, profile: &ProfileFields) -> Self {
        let value = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            email: email.to_owned(),
            first_name: value(&profile.first_name),
            last_name: value(&profile.last_name),
            phone: value(&profile.phone),
            address: value(&profile.address),
            postal_code: value(&profile.postal_code),
            city: value(&profile.city),
            country: value(&profile.country),
            complete: profile.shipping_details().is_some(),
        }
    }
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "profile/index.html")]
pub struct ProfileTemplate {
    pub ctx: PageContext,
    pub profile: ProfileView,
}

/// Form failures go back to the page as a flash; server faults propagate.
async fn reject(session: &Session, err: AuthError) -> Result<Redirect, AppError> {
    match err {
        AuthError::Repository(_) | AuthError::PasswordHash => Err(AppError::Auth(err)),
        AuthError::UserNotFound => Err(AppError::Unauthorized("unknown user".to_string())),
        other => {
            flash::error(session, other.user_message()).await;
            Ok(Redirect::to("/profile"))
        }
    }
}

/// Display the profile page.
#[instrument(skip(state, user, ctx), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ctx: PageContext,
) -> Result<impl IntoResponse, AppError> {
    let account = AuthService::new(state.pool()).get_user(user.id).await?;

    Ok(ProfileTemplate {
        ctx,
        profile: ProfileView::new(account.email.as_str(), &account.profile),
    })
}

/// Save email and profile fields.
#[instrument(skip(state, session, user, form), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<ProfileForm>,
) -> Result<Redirect, AppError> {
    let (email, fields) = form.fields();

    match AuthService::new(state.pool())
        .update_profile(user.id, &email, fields)
        .await
    {
        Ok(updated) => {
            refresh_current_user(&session, &updated.to_current_user()).await?;
            flash::success(&session, "Profil mis à jour.").await;
            tracing::info!("Profile updated");
            Ok(Redirect::to("/profile"))
        }
        Err(err) => reject(&session, err).await,
    }
}

/// Change the password after checking the current one.
#[instrument(skip(state, session, user, form), fields(user_id = %user.id))]
pub async fn change_password(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<PasswordForm>,
) -> Result<Redirect, AppError> {
    match AuthService::new(state.pool())
        .change_password(
            user.id,
            &form.current_password,
            &form.new_password,
            &form.new_password_confirm,
        )
        .await
    {
        Ok(()) => {
            flash::success(&session, "Mot de passe modifié.").await;
            tracing::info!("Password changed");
            Ok(Redirect::to("/profile"))
        }
        Err(err) => reject(&session, err).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_view_flags_incomplete_profile() {
        let view = ProfileView::new(
            "ada@example.com",
            &ProfileFields {
                first_name: Some("Ada".to_owned()),
                ..ProfileFields::default()
            },
        );
        assert_eq!(view.first_name, "Ada");
        assert_eq!(view.city, "");
        assert!(!view.complete);
    }

    #[test]
    fn test_profile_form_splits_email() {
        let form = ProfileForm {
            email: "ada@example.com".to_owned(),
            first_name: None,
            last_name: Some("Lovelace".to_owned()),
            phone: None,
            address: None,
            postal_code: None,
            city: Some("Paris".to_owned()),
            country: None,
        };
        let (email, fields) = form.fields();
        assert_eq!(email, "ada@example.com");
        assert_eq!(fields.city.as_deref(), Some("Paris"));
    }
}
