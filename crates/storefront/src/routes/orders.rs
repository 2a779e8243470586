//! Order history route handlers (signed-in users only).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use auxilia_core::OrderId;

use crate::db::OrderRepository;
use crate::error::AppError;
use crate::filters;
use crate::middleware::{PageContext, RequireAuth, flash};
use crate::models::{Order, OrderItem};
use crate::state::AppState;

/// Order summary row for templates.
#[derive(Clone)]
pub struct OrderView {
    pub id: i32,
    pub ordered_at: String,
    pub status: String,
    pub status_class: &'static str,
    pub total: String,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.as_i32(),
            ordered_at: order.ordered_at.format("%d/%m/%Y %H:%M").to_string(),
            status: order.status.label().to_string(),
            status_class: order.status.as_str(),
            total: order.total.display(),
        }
    }
}

/// Order line for templates.
#[derive(Clone)]
pub struct OrderItemView {
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

impl From<&OrderItem> for OrderItemView {
    fn from(item: &OrderItem) -> Self {
        Self {
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            unit_price: item.price.display(),
            line_total: item.line_total().display(),
        }
    }
}

/// Order history template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub ctx: PageContext,
    pub orders: Vec<OrderView>,
}

/// Order detail template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub ctx: PageContext,
    pub order: OrderView,
    pub items: Vec<OrderItemView>,
}

/// List the user's orders, newest first.
#[instrument(skip(state, user, ctx), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ctx: PageContext,
) -> Result<impl IntoResponse, AppError> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    Ok(OrdersIndexTemplate {
        ctx,
        orders: orders.iter().map(OrderView::from).collect(),
    })
}

/// Show one order.
///
/// Orders belonging to someone else are reported exactly like missing ones.
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let Some(found) = OrderRepository::new(state.pool())
        .get_for_user(OrderId::new(id), user.id)
        .await?
    else {
        flash::error(&session, "Commande introuvable.").await;
        return Ok(Redirect::to("/profile/orders").into_response());
    };

    Ok(OrderShowTemplate {
        ctx: PageContext::from_session(&session).await,
        order: OrderView::from(&found.order),
        items: found.items.iter().map(OrderItemView::from).collect(),
    }
    .into_response())
}
