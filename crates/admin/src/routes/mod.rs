//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                         - Health check
//!
//! # Auth
//! GET  /login                          - Login page
//! POST /login                          - Password login (admins only)
//! POST /logout                         - Logout
//!
//! # Dashboard
//! GET  /                               - Counters and recent activity
//! GET  /dashboard                      - Same page
//!
//! # Products
//! GET  /products                       - Listing (?category=, ?stock=)
//! GET  /products/new                   - Creation form
//! POST /products                       - Create (multipart)
//! GET  /products/:id/edit              - Edit form
//! POST /products/:id                   - Update (multipart)
//! POST /products/:id/delete            - Delete with its image
//! POST /products/:id/toggle-featured   - Flip the featured flag (JSON)
//!
//! # Orders
//! GET  /orders                         - Listing (?status=)
//! GET  /orders/:id                     - Detail
//! POST /orders/:id/status              - Change status
//!
//! # Users
//! GET  /users                          - Listing
//! GET  /users/:id                      - Detail with orders
//! GET  /users/:id/edit                 - Edit form
//! POST /users/:id                      - Update
//! POST /users/:id/delete               - Delete
//! POST /users/:id/reset-password       - Issue a temporary password
//! POST /users/:id/toggle-active        - Enable or disable
//! ```

pub mod auth;
pub mod dashboard;
pub mod orders;
pub mod products;
pub mod users;
pub mod views;

use askama::Template;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    response::Html,
    routing::{get, post},
};

use crate::error::AppError;
use crate::services::uploads::MAX_IMAGE_BYTES;
use crate::state::AppState;

/// Room for the text fields next to a full-size image.
const PRODUCT_FORM_LIMIT: usize = MAX_IMAGE_BYTES + 64 * 1024;

/// Render a template to an HTML response.
///
/// # Errors
///
/// Returns `AppError::Internal` if rendering fails.
pub fn render<T: Template>(template: &T) -> Result<Html<String>, AppError> {
    template.render().map(Html).map_err(|e| {
        tracing::error!("Template render error: {}", e);
        AppError::Internal(format!("template render failed: {e}"))
    })
}

fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route("/new", get(products::new_form))
        .route("/{id}", post(products::update))
        .route("/{id}/edit", get(products::edit_form))
        .route("/{id}/delete", post(products::delete))
        .route("/{id}/toggle-featured", post(products::toggle_featured))
        .layer(DefaultBodyLimit::max(PRODUCT_FORM_LIMIT))
}

fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", post(orders::update_status))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::index))
        .route("/{id}", get(users::show).post(users::update))
        .route("/{id}/edit", get(users::edit_form))
        .route("/{id}/delete", post(users::delete))
        .route("/{id}/reset-password", post(users::reset_password))
        .route("/{id}/toggle-active", post(users::toggle_active))
}

/// Create all routes for the back-office.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Auth
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        // Dashboard
        .route("/", get(dashboard::dashboard))
        .route("/dashboard", get(dashboard::dashboard))
        // Management
        .nest("/products", product_routes())
        .nest("/orders", order_routes())
        .nest("/users", user_routes())
}
