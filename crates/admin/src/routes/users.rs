//! User management route handlers.
//!
//! Every action redirects with a flash; guard refusals (own account,
//! administrator accounts) are reported the same way.

use askama::Template;
use axum::{
    Form,
    extract::{Path, State},
    response::{Html, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use auxilia_core::{ProfileFields, UserId, UserRole};

use super::render;
use super::views::{OrderRow, UserRow, rows};
use crate::db::{OrderRepository, UserRepository};
use crate::error::AppError;
use crate::filters;
use crate::middleware::{AdminPage, RequireAdmin, flash};
use crate::models::User;
use crate::services::{UserAdminError, UserAdminService, UserUpdate};
use crate::state::AppState;

const RECENT_ORDERS: usize = 5;

/// User listing template.
#[derive(Template)]
#[template(path = "users/index.html")]
pub struct UsersTemplate {
    pub page: AdminPage,
    pub users: Vec<UserRow>,
}

/// Profile values for display; absent fields are empty strings.
#[derive(Debug, Clone, Default)]
pub struct ProfileView {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub postal_code: String,
    pub city: String,
    pub country: String,
}

impl From<&ProfileFields> for ProfileView {
    fn from(profile: &ProfileFields) -> Self {
        let value = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            first_name: value(&profile.first_name),
            last_name: value(&profile.last_name),
            phone: value(&profile.phone),
            address: value(&profile.address),
            postal_code: value(&profile.postal_code),
            city: value(&profile.city),
            country: value(&profile.country),
        }
    }
}

/// User detail template.
#[derive(Template)]
#[template(path = "users/show.html")]
pub struct UserDetailTemplate {
    pub page: AdminPage,
    pub user: UserRow,
    pub profile: ProfileView,
    pub is_self: bool,
    pub recent_orders: Vec<OrderRow>,
    pub orders: Vec<OrderRow>,
}

/// User edit form template.
#[derive(Template)]
#[template(path = "users/edit.html")]
pub struct UserEditTemplate {
    pub page: AdminPage,
    pub user: UserRow,
    pub email: String,
    pub role: String,
    pub profile: ProfileView,
}

/// User edit form data.
#[derive(Debug, Deserialize)]
pub struct UserForm {
    pub email: String,
    pub role: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

impl UserForm {
    fn role(&self) -> Option<UserRole> {
        self.role.parse().ok()
    }

    fn profile(self) -> ProfileFields {
        ProfileFields {
            first_name: self.first_name,
            last_name: self.last_name,
            phone: self.phone,
            address: self.address,
            postal_code: self.postal_code,
            city: self.city,
            country: self.country,
        }
    }
}

async fn load_user(state: &AppState, id: UserId) -> Result<User, AppError> {
    UserRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {id}")))
}

/// Report a refused action as a flash, escalating server faults.
async fn refuse(session: &Session, err: UserAdminError, back: &str) -> Result<Redirect, AppError> {
    match err.user_message() {
        Some(message) => {
            tracing::warn!(error = %err, "User action refused");
            flash::error(session, message).await;
            Ok(Redirect::to(back))
        }
        None => Err(err.into()),
    }
}

/// List every account.
#[instrument(skip(state, page))]
pub async fn index(
    State(state): State<AppState>,
    page: AdminPage,
) -> Result<Html<String>, AppError> {
    let users = UserRepository::new(state.pool()).list().await?;
    render(&UsersTemplate {
        page,
        users: rows(&users),
    })
}

/// Display an account with its orders.
#[instrument(skip(state, page))]
pub async fn show(
    State(state): State<AppState>,
    page: AdminPage,
    Path(id): Path<i32>,
) -> Result<Html<String>, AppError> {
    let user_id = UserId::new(id);
    let user = load_user(&state, user_id).await?;
    let orders: Vec<OrderRow> = rows(
        &OrderRepository::new(state.pool())
            .list_for_user(user_id)
            .await?,
    );

    render(&UserDetailTemplate {
        is_self: page.admin.id == user_id,
        page,
        user: UserRow::from(&user),
        profile: ProfileView::from(&user.profile),
        recent_orders: orders.iter().take(RECENT_ORDERS).cloned().collect(),
        orders,
    })
}

/// Display the edit form.
#[instrument(skip(state, page))]
pub async fn edit_form(
    State(state): State<AppState>,
    page: AdminPage,
    Path(id): Path<i32>,
) -> Result<Html<String>, AppError> {
    let user = load_user(&state, UserId::new(id)).await?;

    render(&UserEditTemplate {
        page,
        email: user.email.to_string(),
        role: user.role.to_string(),
        profile: ProfileView::from(&user.profile),
        user: UserRow::from(&user),
    })
}

/// Save an edited account.
#[instrument(skip(state, session, _admin, form))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i32>,
    Form(form): Form<UserForm>,
) -> Result<Redirect, AppError> {
    let edit_path = format!("/users/{id}/edit");
    let Some(role) = form.role() else {
        flash::error(&session, "Rôle invalide.").await;
        return Ok(Redirect::to(&edit_path));
    };
    let email = form.email.clone();

    let result = UserAdminService::new(state.pool())
        .update(
            UserId::new(id),
            UserUpdate {
                email: &email,
                role,
                profile: form.profile(),
            },
        )
        .await;

    match result {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "User updated");
            flash::success(&session, "Utilisateur mis à jour.").await;
            Ok(Redirect::to(&format!("/users/{id}")))
        }
        Err(err) => refuse(&session, err, &edit_path).await,
    }
}

/// Delete an account.
#[instrument(skip(state, session, admin))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Redirect, AppError> {
    match UserAdminService::new(state.pool())
        .delete(admin.id, UserId::new(id))
        .await
    {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "User deleted");
            flash::success(&session, format!("Utilisateur {} supprimé.", user.email)).await;
            Ok(Redirect::to("/users"))
        }
        Err(err) => refuse(&session, err, &format!("/users/{id}")).await,
    }
}

/// Issue a temporary password, shown once in a flash.
#[instrument(skip(state, session, _admin))]
pub async fn reset_password(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Redirect, AppError> {
    let back = format!("/users/{id}");
    match UserAdminService::new(state.pool())
        .reset_password(UserId::new(id))
        .await
    {
        Ok(password) => {
            tracing::info!(user_id = id, "Temporary password issued");
            flash::success(
                &session,
                format!("Mot de passe réinitialisé. Mot de passe temporaire : {password}"),
            )
            .await;
            Ok(Redirect::to(&back))
        }
        Err(err) => refuse(&session, err, &back).await,
    }
}

/// Enable or disable an account.
#[instrument(skip(state, session, admin))]
pub async fn toggle_active(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Redirect, AppError> {
    let back = format!("/users/{id}");
    match UserAdminService::new(state.pool())
        .toggle_active(admin.id, UserId::new(id))
        .await
    {
        Ok(user) => {
            let message = if user.is_active {
                format!("Compte {} activé.", user.email)
            } else {
                format!("Compte {} désactivé.", user.email)
            };
            tracing::info!(user_id = %user.id, active = user.is_active, "User activation toggled");
            flash::success(&session, message).await;
            Ok(Redirect::to(&back))
        }
        Err(err) => refuse(&session, err, &back).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(role: &str) -> UserForm {
        UserForm {
            email: "ada@example.com".to_owned(),
            role: role.to_owned(),
            first_name: Some("Ada".to_owned()),
            last_name: None,
            phone: None,
            address: None,
            postal_code: None,
            city: Some("Paris".to_owned()),
            country: None,
        }
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!(form("admin").role(), Some(UserRole::Admin));
        assert_eq!(form("user").role(), Some(UserRole::User));
        assert_eq!(form("root").role(), None);
    }

    #[test]
    fn test_profile_from_form() {
        let profile = form("user").profile();
        assert_eq!(profile.first_name.as_deref(), Some("Ada"));
        assert_eq!(profile.city.as_deref(), Some("Paris"));
        assert!(profile.phone.is_none());
    }

    #[test]
    fn test_profile_view_blanks_missing_fields() {
        let view = ProfileView::from(&ProfileFields {
            last_name: Some("Lovelace".to_owned()),
            ..ProfileFields::default()
        });
        assert_eq!(view.last_name, "Lovelace");
        assert_eq!(view.first_name, "");
    }
}
