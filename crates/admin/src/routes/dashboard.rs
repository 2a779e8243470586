//! Dashboard route handler.

use askama::Template;
use axum::{extract::State, response::Html};
use tracing::instrument;

use super::render;
use super::views::{OrderRow, ProductRow, UserRow, rows};
use crate::db::{OrderRepository, ProductRepository, UserRepository};
use crate::error::AppError;
use crate::filters;
use crate::middleware::AdminPage;
use crate::state::AppState;

const RECENT_LIMIT: i64 = 5;

/// Dashboard counters.
#[derive(Debug, Clone, Default)]
pub struct DashboardStats {
    pub products: u64,
    pub users: u64,
    pub orders: u64,
    pub low_stock: u64,
}

/// Dashboard template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub page: AdminPage,
    pub stats: DashboardStats,
    pub recent_products: Vec<ProductRow>,
    pub recent_users: Vec<UserRow>,
    pub recent_orders: Vec<OrderRow>,
}

/// Dashboard page handler.
#[instrument(skip(state, page))]
pub async fn dashboard(
    State(state): State<AppState>,
    page: AdminPage,
) -> Result<Html<String>, AppError> {
    let products = ProductRepository::new(state.pool());
    let users = UserRepository::new(state.pool());
    let orders = OrderRepository::new(state.pool());

    let (product_count, user_count, order_count, low_stock) = tokio::try_join!(
        products.count(),
        users.count(),
        orders.count(),
        products.low_stock_count(),
    )?;

    let (recent_products, recent_users, recent_orders) = tokio::try_join!(
        products.recent(RECENT_LIMIT),
        users.recent(RECENT_LIMIT),
        orders.recent(RECENT_LIMIT),
    )?;

    render(&DashboardTemplate {
        page,
        stats: DashboardStats {
            products: product_count,
            users: user_count,
            orders: order_count,
            low_stock,
        },
        recent_products: rows(&recent_products),
        recent_users: rows(&recent_users),
        recent_orders: rows(&recent_orders),
    })
}
