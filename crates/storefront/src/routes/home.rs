//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::db::ProductRepository;
use crate::error::AppError;
use crate::filters;
use crate::middleware::PageContext;
use crate::routes::products::ProductCard;
use crate::state::AppState;

/// Number of highlighted products on the home page.
const HIGHLIGHT_COUNT: i64 = 6;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub ctx: PageContext,
    pub products: Vec<ProductCard>,
}

/// Display the home page.
///
/// Shows featured products; until the back-office features any, the most
/// recently added products stand in.
#[instrument(skip(state, ctx))]
pub async fn home(
    State(state): State<AppState>,
    ctx: PageContext,
) -> Result<impl IntoResponse, AppError> {
    let repo = ProductRepository::new(state.pool());

    let mut products = repo.featured(HIGHLIGHT_COUNT).await?;
    if products.is_empty() {
        products = repo.latest(HIGHLIGHT_COUNT).await?;
    }

    Ok(HomeTemplate {
        ctx,
        products: products.iter().map(ProductCard::from).collect(),
    })
}
