//! Integration tests for the back-office.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database reachable through `DATABASE_URL`
//! - The admin server running (cargo run -p auxilia-admin)
//!
//! Run with: cargo test -p auxilia-integration-tests -- --ignored

use auxilia_core::UserRole;
use auxilia_integration_tests::{
    TEST_PASSWORD, TestUser, admin_base_url, client, create_product, create_user, delete_product,
    delete_user, location, login, pool,
};
use reqwest::{Client, StatusCode, header};
use serde_json::Value;
use sqlx::PgPool;

/// Create an admin and a client signed in as that admin.
async fn signed_in_admin(pool: &PgPool) -> (TestUser, Client) {
    let admin = create_user(pool, UserRole::Admin, false).await;
    let client = client();
    assert_eq!(
        login(&client, &admin_base_url(), &admin.email, TEST_PASSWORD).await,
        StatusCode::SEE_OTHER
    );
    (admin, client)
}

// ============================================================================
// Access control
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_anonymous_pages_redirect_to_login() {
    let client = client();
    let base_url = admin_base_url();

    for path in ["/", "/products", "/orders", "/users"] {
        let resp = client
            .get(format!("{base_url}{path}"))
            .send()
            .await
            .expect("Failed to get page");
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&resp), Some("/login"), "{path}");
    }
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_anonymous_json_request_is_401() {
    let client = client();
    let base_url = admin_base_url();

    let resp = client
        .post(format!("{base_url}/products/1/toggle-featured"))
        .header(header::ACCEPT, "application/json")
        .send()
        .await
        .expect("Failed to post toggle");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_customer_cannot_sign_in() {
    let pool = pool().await;
    let customer = create_user(&pool, UserRole::User, false).await;
    let client = client();
    let base_url = admin_base_url();

    // The form is shown again with an error
    assert_eq!(
        login(&client, &base_url, &customer.email, TEST_PASSWORD).await,
        StatusCode::OK
    );
    let resp = client
        .get(format!("{base_url}/"))
        .send()
        .await
        .expect("Failed to get dashboard");
    assert_eq!(location(&resp), Some("/login"));

    delete_user(&pool, &customer).await;
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_demoted_admin_loses_access_immediately() {
    let pool = pool().await;
    let (admin, client) = signed_in_admin(&pool).await;
    let base_url = admin_base_url();

    let resp = client
        .get(format!("{base_url}/products"))
        .send()
        .await
        .expect("Failed to get products");
    assert_eq!(resp.status(), StatusCode::OK);

    sqlx::query("UPDATE users SET role = 'user' WHERE id = $1")
        .bind(admin.id)
        .execute(&pool)
        .await
        .expect("Failed to demote admin");

    let resp = client
        .get(format!("{base_url}/products"))
        .send()
        .await
        .expect("Failed to get products");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/login"));

    // The session is gone, restoring the role does not revive it
    sqlx::query("UPDATE users SET role = 'admin' WHERE id = $1")
        .bind(admin.id)
        .execute(&pool)
        .await
        .expect("Failed to restore admin");
    let resp = client
        .get(format!("{base_url}/"))
        .send()
        .await
        .expect("Failed to get dashboard");
    assert_eq!(location(&resp), Some("/login"));

    delete_user(&pool, &admin).await;
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_disabled_admin_json_request_is_401() {
    let pool = pool().await;
    let (admin, client) = signed_in_admin(&pool).await;
    let base_url = admin_base_url();

    sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
        .bind(admin.id)
        .execute(&pool)
        .await
        .expect("Failed to disable admin");

    let resp = client
        .post(format!("{base_url}/products/1/toggle-featured"))
        .header(header::ACCEPT, "application/json")
        .send()
        .await
        .expect("Failed to post toggle");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    delete_user(&pool, &admin).await;
}

// ============================================================================
// Products
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_product_list_filters() {
    let pool = pool().await;
    let (admin, client) = signed_in_admin(&pool).await;
    let base_url = admin_base_url();

    for query in ["", "?stock=low", "?stock=out", "?category=Tests&stock=high", "?stock=bogus"] {
        let resp = client
            .get(format!("{base_url}/products{query}"))
            .send()
            .await
            .expect("Failed to get products");
        assert_eq!(resp.status(), StatusCode::OK, "{query}");
    }

    delete_user(&pool, &admin).await;
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_toggle_featured_returns_new_state() {
    let pool = pool().await;
    let (admin, client) = signed_in_admin(&pool).await;
    let product = create_product(&pool, "10", Some(4)).await;
    let base_url = admin_base_url();

    let resp = client
        .post(format!("{base_url}/products/{product}/toggle-featured"))
        .header(header::ACCEPT, "application/json")
        .send()
        .await
        .expect("Failed to toggle featured");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse JSON");
    assert_eq!(body, serde_json::json!({"id": product, "isFeatured": true}));

    let featured: bool = sqlx::query_scalar("SELECT is_featured FROM product WHERE id = $1")
        .bind(product)
        .fetch_one(&pool)
        .await
        .expect("Product should exist");
    assert!(featured);

    delete_product(&pool, product).await;
    delete_user(&pool, &admin).await;
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_create_product_rejects_invalid_form() {
    let pool = pool().await;
    let (admin, client) = signed_in_admin(&pool).await;
    let base_url = admin_base_url();

    let form = reqwest::multipart::Form::new()
        .text("name", "")
        .text("price", "-3")
        .text("category", "Nope");
    let resp = client
        .post(format!("{base_url}/products"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to post product");
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    delete_user(&pool, &admin).await;
}

// ============================================================================
// Orders
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_order_status_update() {
    let pool = pool().await;
    let (admin, client) = signed_in_admin(&pool).await;
    let customer = create_user(&pool, UserRole::User, true).await;
    let base_url = admin_base_url();

    let order: i32 =
        sqlx::query_scalar("INSERT INTO orders (user_id, total) VALUES ($1, 42) RETURNING id")
            .bind(customer.id)
            .fetch_one(&pool)
            .await
            .expect("Failed to insert order");

    let status = |pool: PgPool| async move {
        sqlx::query_scalar::<_, String>("SELECT status::text FROM orders WHERE id = $1")
            .bind(order)
            .fetch_one(&pool)
            .await
            .expect("Order should exist")
    };

    let resp = client
        .post(format!("{base_url}/orders/{order}/status"))
        .form(&[("status", "shipped")])
        .send()
        .await
        .expect("Failed to update status");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(status(pool.clone()).await, "shipped");

    // Unknown values are refused and leave the order alone
    client
        .post(format!("{base_url}/orders/{order}/status"))
        .form(&[("status", "lost")])
        .send()
        .await
        .expect("Failed to post bad status");
    assert_eq!(status(pool.clone()).await, "shipped");

    delete_user(&pool, &customer).await;
    delete_user(&pool, &admin).await;
}

// ============================================================================
// Users
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_admin_cannot_delete_or_disable_self() {
    let pool = pool().await;
    let (admin, client) = signed_in_admin(&pool).await;
    let base_url = admin_base_url();

    for action in ["delete", "toggle-active"] {
        client
            .post(format!("{base_url}/users/{}/{action}", admin.id))
            .send()
            .await
            .expect("Failed to post user action");
    }

    let active: bool = sqlx::query_scalar("SELECT is_active FROM users WHERE id = $1")
        .bind(admin.id)
        .fetch_one(&pool)
        .await
        .expect("Admin should still exist");
    assert!(active);

    delete_user(&pool, &admin).await;
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_reset_password_and_toggle_customer() {
    let pool = pool().await;
    let (admin, client) = signed_in_admin(&pool).await;
    let customer = create_user(&pool, UserRole::User, false).await;
    let base_url = admin_base_url();

    let hash = |pool: PgPool, id: i32| async move {
        sqlx::query_scalar::<_, String>("SELECT password_hash FROM users WHERE id = $1")
            .bind(id)
            .fetch_one(&pool)
            .await
            .expect("User should exist")
    };
    let before = hash(pool.clone(), customer.id).await;

    let resp = client
        .post(format!("{base_url}/users/{}/reset-password", customer.id))
        .send()
        .await
        .expect("Failed to reset password");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_ne!(hash(pool.clone(), customer.id).await, before);

    client
        .post(format!("{base_url}/users/{}/toggle-active", customer.id))
        .send()
        .await
        .expect("Failed to toggle user");
    let active: bool = sqlx::query_scalar("SELECT is_active FROM users WHERE id = $1")
        .bind(customer.id)
        .fetch_one(&pool)
        .await
        .expect("User should exist");
    assert!(!active);

    delete_user(&pool, &customer).await;
    delete_user(&pool, &admin).await;
}
