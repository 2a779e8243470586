//! Cart route handlers.
//!
//! Every change redirects back to the cart page. The cart itself lives in
//! the session (see `services::cart`).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, RawForm, State},
    response::{IntoResponse, Redirect},
};
use tower_sessions::Session;
use tracing::instrument;

use auxilia_core::ProductId;

use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::middleware::{OptionalAuth, PageContext, flash};
use crate::services::cart::{self, CartContents, CartError, CartService};
use crate::state::AppState;

const OUT_OF_STOCK: &str = "Ce produit n'est plus disponible dans cette quantité.";

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub product_id: i32,
    pub name: String,
    pub image_url: Option<String>,
    pub unit_price: String,
    pub quantity: u32,
    pub line_total: String,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total: String,
    pub item_count: u32,
}

impl From<&CartContents> for CartView {
    fn from(contents: &CartContents) -> Self {
        Self {
            lines: contents
                .lines
                .iter()
                .map(|line| CartLineView {
                    product_id: line.product.id.as_i32(),
                    name: line.product.name.clone(),
                    image_url: line.product.image_url(),
                    unit_price: line.product.price.display(),
                    quantity: line.quantity,
                    line_total: line.line_total.display(),
                })
                .collect(),
            total: contents.total.display(),
            item_count: contents.quantity_sum(),
        }
    }
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub ctx: PageContext,
    pub cart: CartView,
}

/// Cart count badge fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

fn user_id(auth: &OptionalAuth) -> Option<auxilia_core::UserId> {
    auth.0.as_ref().map(|user| user.id)
}

/// Display the cart page.
#[instrument(skip(state, session, auth, ctx))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    auth: OptionalAuth,
    ctx: PageContext,
) -> Result<impl IntoResponse, AppError> {
    let contents = CartService::new(state.pool(), &session, user_id(&auth))
        .contents()
        .await?;

    // The badge was computed before pruning; trust the resolved cart
    let ctx = PageContext {
        cart_count: contents.quantity_sum(),
        ..ctx
    };

    Ok(CartShowTemplate {
        ctx,
        cart: CartView::from(&contents),
    })
}

/// Add one unit of a product.
///
/// A product with no stock left is refused with a notice.
///
/// # Errors
///
/// Returns 404 if the product does not exist.
#[instrument(skip(state, session, auth))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    auth: OptionalAuth,
    Path(id): Path<i32>,
) -> Result<Redirect, AppError> {
    let product_id = ProductId::new(id);
    match CartService::new(state.pool(), &session, user_id(&auth))
        .add(product_id)
        .await
    {
        Ok(_) => {}
        Err(CartError::OutOfStock(_)) => {
            flash::warning(&session, OUT_OF_STOCK).await;
            return Ok(Redirect::to("/cart"));
        }
        Err(e) => return Err(e.into()),
    }

    let product = id.to_string();
    add_breadcrumb("cart", "Added product", Some(&[("product_id", product.as_str())]));
    Ok(Redirect::to("/cart"))
}

/// Remove one unit of a product.
#[instrument(skip(state, session, auth))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    auth: OptionalAuth,
    Path(id): Path<i32>,
) -> Result<Redirect, AppError> {
    CartService::new(state.pool(), &session, user_id(&auth))
        .decrement(ProductId::new(id))
        .await?;
    Ok(Redirect::to("/cart"))
}

/// Remove a product line.
#[instrument(skip(state, session, auth))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    auth: OptionalAuth,
    Path(id): Path<i32>,
) -> Result<Redirect, AppError> {
    CartService::new(state.pool(), &session, user_id(&auth))
        .delete(ProductId::new(id))
        .await?;
    Ok(Redirect::to("/cart"))
}

/// Product IDs ticked in the cart table. Accepts `ids` and `ids[]` keys;
/// anything that is not an integer is ignored.
fn selected_ids(body: &[u8]) -> Vec<ProductId> {
    url::form_urlencoded::parse(body)
        .filter(|(key, _)| key == "ids" || key == "ids[]")
        .filter_map(|(_, value)| value.trim().parse::<i32>().ok())
        .map(ProductId::new)
        .collect()
}

/// Remove every ticked line.
#[instrument(skip(state, session, auth, form))]
pub async fn delete_selection(
    State(state): State<AppState>,
    session: Session,
    auth: OptionalAuth,
    RawForm(form): RawForm,
) -> Result<Redirect, AppError> {
    let ids = selected_ids(&form);
    if !ids.is_empty() {
        CartService::new(state.pool(), &session, user_id(&auth))
            .delete_selection(ids)
            .await?;
        flash::success(&session, "Sélection supprimée.").await;
    }
    Ok(Redirect::to("/cart"))
}

/// Cart count badge fragment.
pub async fn count(session: Session) -> impl IntoResponse {
    CartCountTemplate {
        count: cart::count(&session).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selected_ids_accepts_both_key_styles() {
        let ids = selected_ids(b"ids=3&ids%5B%5D=5&ids=oops&other=9");
        assert_eq!(ids, vec![ProductId::new(3), ProductId::new(5)]);
    }

    #[test]
    fn test_selected_ids_empty_body() {
        assert!(selected_ids(b"").is_empty());
    }
}
