//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Home page
//! GET  /health                  - Health check
//!
//! # Catalog
//! GET  /products                - Product listing (search, filter, sort, paginate)
//! GET  /api/products/search     - Live search suggestions (JSON)
//!
//! # Cart
//! GET  /cart                    - Cart page
//! GET  /cart/add/:id            - Add one unit (POST also accepted)
//! GET  /cart/remove/:id         - Remove one unit
//! GET  /cart/delete/:id         - Remove the line
//! POST /cart/delete-selection   - Remove ticked lines
//! GET  /cart/count              - Cart count badge (fragment)
//!
//! # Checkout (requires auth)
//! GET  /checkout                - Confirmation page
//! POST /checkout/validate       - Place the order
//! GET  /checkout/success        - Thank-you page
//!
//! # Auth
//! GET  /login                   - Login page
//! POST /login                   - Login action (rate limited)
//! GET  /register                - Register page
//! POST /register                - Register action (rate limited)
//! POST /logout                  - Logout action
//!
//! # Profile (requires auth)
//! GET  /profile                 - Profile and password forms
//! POST /profile                 - Update profile
//! POST /profile/password        - Change password
//! GET  /profile/orders          - Order history
//! GET  /profile/orders/:id      - Order detail
//!
//! # Pages
//! GET  /a-propos                - About page
//! GET  /contact                 - Contact form
//! POST /contact                 - Send the contact form
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod home;
pub mod orders;
pub mod pages;
pub mod products;
pub mod profile;

use axum::{
    Router,
    routing::{get, post},
};

use crate::config::StorefrontConfig;
use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router. Only the form posts are rate limited.
pub fn auth_routes(trust_proxy_headers: bool) -> Router<AppState> {
    let limiter = || auth_rate_limiter(trust_proxy_headers);
    Router::new()
        .route(
            "/login",
            get(auth::login_page).merge(post(auth::login).layer(limiter())),
        )
        .route(
            "/register",
            get(auth::register_page).merge(post(auth::register).layer(limiter())),
        )
        .route("/logout", post(auth::logout))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add/{id}", get(cart::add).post(cart::add))
        .route("/remove/{id}", get(cart::remove))
        .route("/delete/{id}", get(cart::delete))
        .route("/delete-selection", post(cart::delete_selection))
        .route("/count", get(cart::count))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::confirm))
        .route("/validate", post(checkout::validate))
        .route("/success", get(checkout::success))
}

/// Create the profile routes router.
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(profile::show).post(profile::update))
        .route("/password", post(profile::change_password))
        .route("/orders", get(orders::index))
        .route("/orders/{id}", get(orders::show))
}

/// Create all routes for the storefront.
pub fn routes(config: &StorefrontConfig) -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Catalog
        .route("/products", get(products::index))
        .route("/api/products/search", get(products::live_search))
        // Cart
        .nest("/cart", cart_routes())
        // Checkout
        .nest("/checkout", checkout_routes())
        // Account
        .nest("/profile", profile_routes())
        .merge(auth_routes(config.trust_proxy_headers))
        // Static pages
        .route("/a-propos", get(pages::about))
        .route("/contact", get(pages::contact_page).post(pages::contact))
}
