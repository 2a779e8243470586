//! Integration tests for the storefront cart and checkout.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database reachable through `DATABASE_URL`
//! - The storefront server running (cargo run -p auxilia-storefront)
//!
//! Run with: cargo test -p auxilia-integration-tests -- --ignored

use auxilia_core::UserRole;
use auxilia_integration_tests::{
    TEST_PASSWORD, client, create_product, create_user, delete_product, delete_user, location,
    login, pool, storefront_base_url,
};
use reqwest::{Client, StatusCode};
use serde_json::Value;

async fn cart_count(client: &Client, base_url: &str) -> String {
    client
        .get(format!("{base_url}/cart/count"))
        .send()
        .await
        .expect("Failed to get cart count")
        .text()
        .await
        .expect("Failed to read cart count")
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_health_endpoints() {
    let client = client();
    let base_url = storefront_base_url();

    let resp = client
        .get(format!("{base_url}/health"))
        .send()
        .await
        .expect("Failed to get health");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base_url}/health/ready"))
        .send()
        .await
        .expect("Failed to get readiness");
    assert_eq!(resp.status(), StatusCode::OK);
}

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_anonymous_cart_add_remove() {
    let pool = pool().await;
    let product = create_product(&pool, "12.50", Some(10)).await;
    let client = client();
    let base_url = storefront_base_url();

    for _ in 0..2 {
        let resp = client
            .get(format!("{base_url}/cart/add/{product}"))
            .send()
            .await
            .expect("Failed to add to cart");
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), Some("/cart"));
    }
    assert!(cart_count(&client, &base_url).await.contains(">2<"));

    let resp = client
        .get(format!("{base_url}/cart"))
        .send()
        .await
        .expect("Failed to get cart");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read cart");
    assert!(body.contains("25.00 €"));

    client
        .get(format!("{base_url}/cart/remove/{product}"))
        .send()
        .await
        .expect("Failed to remove from cart");
    assert!(cart_count(&client, &base_url).await.contains(">1<"));

    client
        .get(format!("{base_url}/cart/delete/{product}"))
        .send()
        .await
        .expect("Failed to delete cart line");
    assert!(cart_count(&client, &base_url).await.contains(">0<"));

    delete_product(&pool, product).await;
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_cart_add_stops_at_stock() {
    let pool = pool().await;
    let product = create_product(&pool, "4.00", Some(1)).await;
    let client = client();
    let base_url = storefront_base_url();

    for _ in 0..2 {
        let resp = client
            .get(format!("{base_url}/cart/add/{product}"))
            .send()
            .await
            .expect("Failed to add to cart");
        assert_eq!(location(&resp), Some("/cart"));
    }
    assert!(cart_count(&client, &base_url).await.contains(">1<"));

    delete_product(&pool, product).await;
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_cart_add_unknown_product_is_404() {
    let client = client();
    let base_url = storefront_base_url();

    let resp = client
        .get(format!("{base_url}/cart/add/2147483647"))
        .send()
        .await
        .expect("Failed to add to cart");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_checkout_requires_login() {
    let client = client();
    let base_url = storefront_base_url();

    let resp = client
        .get(format!("{base_url}/checkout"))
        .send()
        .await
        .expect("Failed to get checkout");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/login"));
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_checkout_with_incomplete_profile_redirects_to_profile() {
    let pool = pool().await;
    let user = create_user(&pool, UserRole::User, false).await;
    let product = create_product(&pool, "9.99", Some(3)).await;
    let client = client();
    let base_url = storefront_base_url();

    assert_eq!(
        login(&client, &base_url, &user.email, TEST_PASSWORD).await,
        StatusCode::SEE_OTHER
    );
    client
        .get(format!("{base_url}/cart/add/{product}"))
        .send()
        .await
        .expect("Failed to add to cart");

    let resp = client
        .get(format!("{base_url}/checkout"))
        .send()
        .await
        .expect("Failed to get checkout");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/profile"));

    delete_user(&pool, &user).await;
    delete_product(&pool, product).await;
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_checkout_places_order_and_empties_cart() {
    let pool = pool().await;
    let user = create_user(&pool, UserRole::User, true).await;
    let product = create_product(&pool, "19.90", Some(5)).await;
    let client = client();
    let base_url = storefront_base_url();

    // Anonymous cart merges into the account at login
    for _ in 0..3 {
        client
            .get(format!("{base_url}/cart/add/{product}"))
            .send()
            .await
            .expect("Failed to add to cart");
    }
    assert_eq!(
        login(&client, &base_url, &user.email, TEST_PASSWORD).await,
        StatusCode::SEE_OTHER
    );

    let resp = client
        .get(format!("{base_url}/checkout"))
        .send()
        .await
        .expect("Failed to get checkout");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read checkout page");
    assert!(body.contains("59.70 €"));

    let resp = client
        .post(format!("{base_url}/checkout/validate"))
        .send()
        .await
        .expect("Failed to validate checkout");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/checkout/success"));
    assert!(cart_count(&client, &base_url).await.contains(">0<"));

    let (status, total): (String, String) = sqlx::query_as(
        "SELECT status::text, total::text FROM orders WHERE user_id = $1",
    )
    .bind(user.id)
    .fetch_one(&pool)
    .await
    .expect("Order should exist");
    assert_eq!(status, "paid");
    assert_eq!(total, "59.70");

    let saved_cart: Value = sqlx::query_scalar("SELECT cart FROM users WHERE id = $1")
        .bind(user.id)
        .fetch_one(&pool)
        .await
        .expect("User should exist");
    assert_eq!(saved_cart, serde_json::json!({}));

    delete_user(&pool, &user).await;
    delete_product(&pool, product).await;
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_disabled_customer_is_signed_out() {
    let pool = pool().await;
    let user = create_user(&pool, UserRole::User, true).await;
    let client = client();
    let base_url = storefront_base_url();

    assert_eq!(
        login(&client, &base_url, &user.email, TEST_PASSWORD).await,
        StatusCode::SEE_OTHER
    );
    let resp = client
        .get(format!("{base_url}/profile"))
        .send()
        .await
        .expect("Failed to get profile");
    assert_eq!(resp.status(), StatusCode::OK);

    sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .expect("Failed to disable user");

    let resp = client
        .get(format!("{base_url}/profile"))
        .send()
        .await
        .expect("Failed to get profile");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/login"));

    delete_user(&pool, &user).await;
}

// ============================================================================
// Live search
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_live_search_short_term_is_empty() {
    let client = client();
    let base_url = storefront_base_url();

    let resp = client
        .get(format!("{base_url}/api/products/search?q=a"))
        .send()
        .await
        .expect("Failed to search");
    assert_eq!(resp.status(), StatusCode::OK);
    let hits: Value = resp.json().await.expect("Failed to parse JSON");
    assert_eq!(hits, serde_json::json!([]));
}
