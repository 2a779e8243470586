//! Catalog route handlers: listing with filters and the live search API.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use auxilia_core::catalog::{self, DEFAULT_LIMIT};
use auxilia_core::{CatalogParams, CatalogQuery, Price, SortDirection, SortField};

use crate::db::ProductRepository;
use crate::error::AppError;
use crate::filters;
use crate::middleware::PageContext;
use crate::models::Product;
use crate::state::AppState;

/// Minimum search term length for the live search box.
const LIVE_SEARCH_MIN_CHARS: usize = 2;
/// Maximum number of live search suggestions.
const LIVE_SEARCH_LIMIT: i64 = 5;
/// Page sizes offered in the catalog toolbar.
const LIMIT_CHOICES: [u32; 3] = [DEFAULT_LIMIT, 18, 36];

// =============================================================================
// Views
// =============================================================================

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductCard {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: String,
    pub image_url: Option<String>,
    pub available: bool,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i32(),
            name: product.name.clone(),
            description: product.description.clone().unwrap_or_default(),
            category: product.category.clone(),
            price: product.price.display(),
            image_url: product.image_url(),
            available: product.is_available(),
        }
    }
}

/// An `<option>` in a toolbar select.
#[derive(Clone)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    fn new(value: impl Into<String>, label: impl Into<String>, selected: bool) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            selected,
        }
    }
}

/// A numbered link in the pager.
#[derive(Clone)]
pub struct PageLink {
    pub number: u32,
    pub url: String,
    pub current: bool,
}

/// Pager display data.
#[derive(Clone)]
pub struct PagerView {
    pub links: Vec<PageLink>,
    pub previous_url: Option<String>,
    pub next_url: Option<String>,
    pub total: u64,
}

fn page_url(query: &CatalogQuery, page: u32) -> String {
    format!(
        "/products?{}",
        query.query_string_for_page(page, |s| urlencoding::encode(s).into_owned())
    )
}

impl PagerView {
    fn new<T>(page: &auxilia_core::Page<T>, query: &CatalogQuery) -> Self {
        Self {
            links: page
                .pages()
                .into_iter()
                .map(|number| PageLink {
                    number,
                    url: page_url(query, number),
                    current: number == page.page,
                })
                .collect(),
            previous_url: page
                .has_previous()
                .then(|| page_url(query, page.page - 1)),
            next_url: page.has_next().then(|| page_url(query, page.page + 1)),
            total: page.total,
        }
    }
}

fn sort_options(current: SortField) -> Vec<SelectOption> {
    [
        (SortField::Price, "Prix"),
        (SortField::Name, "Nom"),
        (SortField::Id, "Nouveautés"),
    ]
    .into_iter()
    .map(|(field, label)| SelectOption::new(field.as_str(), label, field == current))
    .collect()
}

fn direction_options(current: SortDirection) -> Vec<SelectOption> {
    [
        (SortDirection::Asc, "Croissant"),
        (SortDirection::Desc, "Décroissant"),
    ]
    .into_iter()
    .map(|(direction, label)| SelectOption::new(direction.as_str(), label, direction == current))
    .collect()
}

fn limit_options(current: u32) -> Vec<SelectOption> {
    let mut choices = LIMIT_CHOICES.to_vec();
    if !choices.contains(&current) {
        choices.push(current);
        choices.sort_unstable();
    }
    choices
        .into_iter()
        .map(|n| SelectOption::new(n.to_string(), format!("{n} par page"), n == current))
        .collect()
}

// =============================================================================
// Templates
// =============================================================================

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct CatalogTemplate {
    pub ctx: PageContext,
    pub products: Vec<ProductCard>,
    pub categories: Vec<SelectOption>,
    pub sort_options: Vec<SelectOption>,
    pub direction_options: Vec<SelectOption>,
    pub limit_options: Vec<SelectOption>,
    pub q: String,
    pub pager: PagerView,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the catalog.
///
/// Unknown sort fields, directions and out-of-range limits fall back to
/// their defaults instead of failing.
#[instrument(skip(state, ctx))]
pub async fn index(
    State(state): State<AppState>,
    ctx: PageContext,
    Query(params): Query<CatalogParams>,
) -> Result<impl IntoResponse, AppError> {
    let query = CatalogQuery::from(params);
    let page = ProductRepository::new(state.pool())
        .catalog(&query)
        .await?;

    let current_category = query.category.as_deref().unwrap_or_default();
    let mut categories = vec![SelectOption::new("", "Toutes les catégories", query.category.is_none())];
    categories.extend(state.categories().await?.iter().map(|c| {
        SelectOption::new(c.name.clone(), c.name.clone(), c.name == current_category)
    }));

    Ok(CatalogTemplate {
        ctx,
        pager: PagerView::new(&page, &query),
        products: page.items.iter().map(ProductCard::from).collect(),
        categories,
        sort_options: sort_options(query.sort),
        direction_options: direction_options(query.direction),
        limit_options: limit_options(query.limit),
        q: query.search.clone().unwrap_or_default(),
    })
}

/// Live search query parameters.
#[derive(Debug, Deserialize)]
pub struct LiveSearchQuery {
    #[serde(default)]
    pub q: String,
}

/// One live search suggestion.
#[derive(Debug, Serialize)]
pub struct SearchSuggestion {
    pub id: i32,
    pub name: String,
    pub price: String,
    pub image: Option<String>,
    pub url: String,
}

/// Live search suggestions as JSON.
///
/// Terms shorter than two characters return an empty list without touching
/// the database.
#[instrument(skip(state))]
pub async fn live_search(
    State(state): State<AppState>,
    Query(query): Query<LiveSearchQuery>,
) -> Result<Json<Vec<SearchSuggestion>>, AppError> {
    let term = query.q.trim();
    if term.chars().count() < LIVE_SEARCH_MIN_CHARS {
        return Ok(Json(Vec::new()));
    }

    let hits = ProductRepository::new(state.pool())
        .search_names(&catalog::like_pattern(term), LIVE_SEARCH_LIMIT)
        .await?;

    Ok(Json(
        hits.into_iter()
            .map(|hit| SearchSuggestion {
                url: format!("/products?q={}", urlencoding::encode(&hit.name)),
                id: hit.id,
                price: Price::new(hit.price).display(),
                image: hit
                    .image_name
                    .map(|name| format!("/uploads/products/{name}")),
                name: hit.name,
            })
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(params: CatalogParams) -> CatalogQuery {
        CatalogQuery::from(params)
    }

    #[test]
    fn test_limit_options_include_custom_limit() {
        let options = limit_options(50);
        let values: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, ["9", "18", "36", "50"]);
        assert!(options.iter().any(|o| o.selected && o.value == "50"));
    }

    #[test]
    fn test_sort_options_mark_current() {
        let options = sort_options(SortField::Name);
        assert_eq!(options.iter().filter(|o| o.selected).count(), 1);
        assert!(options.iter().any(|o| o.selected && o.value == "name"));
    }

    #[test]
    fn test_pager_links_keep_filters() {
        let q = query(CatalogParams {
            q: Some("fauteuil roulant".to_string()),
            category: Some("Mobilité".to_string()),
            page: Some("2".to_string()),
            ..CatalogParams::default()
        });
        let page = auxilia_core::Page::new(vec![(); 9], 25, q.page, q.limit);
        let pager = PagerView::new(&page, &q);

        assert_eq!(pager.links.len(), 3);
        assert!(pager.links[1].current);
        let previous = pager.previous_url.unwrap_or_default();
        assert!(previous.contains("q=fauteuil%20roulant"));
        assert!(previous.contains("category=Mobilit%C3%A9"));
        assert!(previous.ends_with("page=1"));
        assert!(pager.next_url.is_some());
    }
}
