//! Integration tests for Auxilia.
//!
//! # Running Tests
//!
//! ```bash
//! # Migrate the database and start both servers
//! cargo run -p auxilia-cli -- migrate
//! cargo run -p auxilia-storefront &
//! cargo run -p auxilia-admin &
//!
//! # Run the ignored HTTP tests
//! cargo test -p auxilia-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - the database both servers use; fixtures are written here
//! - `STOREFRONT_BASE_URL` - defaults to `http://localhost:3000`
//! - `ADMIN_BASE_URL` - defaults to `http://localhost:3001`
//!
//! Every fixture uses a random email or product name and is removed by the
//! test that created it, so the suite can run against a development database.

use auxilia_core::password::hash_password;
use auxilia_core::{Price, UserRole};
use reqwest::{Client, StatusCode, redirect};
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use uuid::Uuid;

/// Password given to every fixture account.
pub const TEST_PASSWORD: &str = "integration-secret";

/// Base URL for the storefront (configurable via environment).
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Base URL for the back-office (configurable via environment).
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// HTTP client that keeps cookies and does not follow redirects, so tests
/// can assert on `Location`.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// The `Location` header of a redirect response.
#[must_use]
pub fn location(resp: &reqwest::Response) -> Option<&str> {
    resp.headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

/// Connect to the shared database.
///
/// # Panics
///
/// Panics if `DATABASE_URL` is unset or unreachable.
pub async fn pool() -> PgPool {
    let url = std::env::var("DATABASE_URL")
        .map(SecretString::from)
        .expect("DATABASE_URL must be set for integration tests");
    PgPool::connect(url.expose_secret())
        .await
        .expect("Failed to connect to database")
}

/// A fixture account.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: i32,
    pub email: String,
}

/// Insert an active account with [`TEST_PASSWORD`].
///
/// `complete_profile` fills every shipping field so checkout is allowed.
///
/// # Panics
///
/// Panics if the insert fails.
pub async fn create_user(pool: &PgPool, role: UserRole, complete_profile: bool) -> TestUser {
    let email = format!("it-{}@example.com", Uuid::new_v4().simple());
    let hash = hash_password(TEST_PASSWORD).expect("Failed to hash password");
    let field = |value: &'static str| complete_profile.then_some(value);

    let id: i32 = sqlx::query_scalar(
        r"
        INSERT INTO users
            (email, role, password_hash, first_name, last_name, phone, address, postal_code, city, country)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING id
        ",
    )
    .bind(&email)
    .bind(role)
    .bind(hash)
    .bind(field("Ada"))
    .bind(field("Lovelace"))
    .bind(field("0600000000"))
    .bind(field("1 rue de la Paix"))
    .bind(field("75002"))
    .bind(field("Paris"))
    .bind(field("France"))
    .fetch_one(pool)
    .await
    .expect("Failed to insert test user");

    TestUser { id, email }
}

/// Remove a fixture account. Its orders keep a `NULL` owner.
pub async fn delete_user(pool: &PgPool, user: &TestUser) {
    let _ = sqlx::query("DELETE FROM orders WHERE user_id = $1")
        .bind(user.id)
        .execute(pool)
        .await;
    let _ = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user.id)
        .execute(pool)
        .await;
}

/// Insert a product with a random name.
///
/// # Panics
///
/// Panics if the insert fails.
pub async fn create_product(pool: &PgPool, price: &str, stock: Option<i32>) -> i32 {
    let name = format!("IT product {}", Uuid::new_v4().simple());
    let price = Price::parse(price).expect("Invalid test price");

    sqlx::query_scalar(
        r"
        INSERT INTO product (name, description, price, stock, category)
        VALUES ($1, 'Integration fixture', $2, $3, 'Tests')
        RETURNING id
        ",
    )
    .bind(name)
    .bind(price.amount())
    .bind(stock)
    .fetch_one(pool)
    .await
    .expect("Failed to insert test product")
}

/// Remove a fixture product.
pub async fn delete_product(pool: &PgPool, id: i32) {
    let _ = sqlx::query("DELETE FROM product WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await;
}

/// Post the login form and return the response status.
///
/// # Panics
///
/// Panics if the request cannot be sent.
pub async fn login(client: &Client, base_url: &str, email: &str, password: &str) -> StatusCode {
    client
        .post(format!("{base_url}/login"))
        .form(&[("email", email), ("password", password)])
        .send()
        .await
        .expect("Failed to post login form")
        .status()
}
