//! Order management route handlers.

use askama::Template;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{Html, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use auxilia_core::{OrderId, OrderStatus};

use super::render;
use super::views::{OrderRow, rows};
use crate::db::OrderRepository;
use crate::error::AppError;
use crate::filters;
use crate::middleware::{AdminPage, RequireAdmin, flash};
use crate::models::OrderItem;
use crate::state::AppState;

/// Listing filter. `all`, empty or unknown values mean no filter.
#[derive(Debug, Default, Deserialize)]
pub struct OrderQuery {
    pub status: Option<String>,
}

impl OrderQuery {
    fn status(&self) -> Option<OrderStatus> {
        self.status.as_deref().and_then(|s| s.parse().ok())
    }
}

/// An entry of the status dropdowns.
#[derive(Debug, Clone)]
pub struct StatusOption {
    pub value: &'static str,
    pub label: &'static str,
}

fn status_options() -> Vec<StatusOption> {
    OrderStatus::ALL
        .iter()
        .map(|s| StatusOption {
            value: s.as_str(),
            label: s.label(),
        })
        .collect()
}

/// Order listing template.
#[derive(Template)]
#[template(path = "orders/index.html")]
pub struct OrdersTemplate {
    pub page: AdminPage,
    pub orders: Vec<OrderRow>,
    pub status_options: Vec<StatusOption>,
    pub selected_status: String,
}

/// An order line for display.
#[derive(Debug, Clone)]
pub struct OrderLineView {
    pub product_id: Option<i32>,
    pub product_name: String,
    pub quantity: u32,
    pub price: String,
    pub line_total: String,
}

impl From<&OrderItem> for OrderLineView {
    fn from(item: &OrderItem) -> Self {
        Self {
            product_id: item.product_id.map(|id| id.as_i32()),
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            price: item.price.display(),
            line_total: item.line_total().display(),
        }
    }
}

/// Order detail template.
#[derive(Template)]
#[template(path = "orders/show.html")]
pub struct OrderDetailTemplate {
    pub page: AdminPage,
    pub order: OrderRow,
    pub items: Vec<OrderLineView>,
    pub status_options: Vec<StatusOption>,
}

/// List orders, newest first, optionally by status.
#[instrument(skip(state, page))]
pub async fn index(
    State(state): State<AppState>,
    page: AdminPage,
    Query(query): Query<OrderQuery>,
) -> Result<Html<String>, AppError> {
    let status = query.status();
    let orders = OrderRepository::new(state.pool()).list(status).await?;

    render(&OrdersTemplate {
        page,
        orders: rows(&orders),
        status_options: status_options(),
        selected_status: status.map(|s| s.as_str().to_owned()).unwrap_or_default(),
    })
}

/// Display an order with its lines.
#[instrument(skip(state, page))]
pub async fn show(
    State(state): State<AppState>,
    page: AdminPage,
    Path(id): Path<i32>,
) -> Result<Html<String>, AppError> {
    let order = OrderRepository::new(state.pool())
        .get(OrderId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    render(&OrderDetailTemplate {
        page,
        order: OrderRow::from(&order.order),
        items: rows(&order.items),
        status_options: status_options(),
    })
}

/// Status change form data.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// Change an order's status. Only known statuses are accepted.
#[instrument(skip(state, session, _admin, form))]
pub async fn update_status(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i32>,
    Form(form): Form<StatusForm>,
) -> Result<Redirect, AppError> {
    let back = format!("/orders/{id}");
    let Ok(status) = form.status.parse::<OrderStatus>() else {
        flash::error(&session, "Statut invalide.").await;
        return Ok(Redirect::to(&back));
    };

    OrderRepository::new(state.pool())
        .update_status(OrderId::new(id), status)
        .await?;

    tracing::info!(order_id = id, status = %status, "Order status changed");
    flash::success(
        &session,
        format!("Commande n°{id} : statut « {} ».", status.label()),
    )
    .await;
    Ok(Redirect::to(&back))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_means_no_filter() {
        let query = |s: &str| OrderQuery {
            status: Some(s.to_owned()),
        };
        assert_eq!(query("all").status(), None);
        assert_eq!(query("").status(), None);
        assert_eq!(query("shipped").status(), Some(OrderStatus::Shipped));
        assert_eq!(OrderQuery::default().status(), None);
    }

    #[test]
    fn test_status_options_cover_every_status() {
        let options = status_options();
        assert_eq!(options.len(), OrderStatus::ALL.len());
        assert_eq!(options[0].value, "pending");
    }
}
