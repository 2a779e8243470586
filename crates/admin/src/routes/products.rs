//! Product management route handlers.

use askama::Template;
use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, Path, Query, State, multipart::MultipartError},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use auxilia_core::{Price, ProductId, StockFilter};

use super::render;
use super::views::{ProductRow, rows};
use crate::db::products::{ProductFilter, ProductInput};
use crate::db::{CategoryRepository, ProductRepository};
use crate::error::AppError;
use crate::filters;
use crate::middleware::{AdminPage, RequireAdmin, flash};
use crate::models::{Category, CurrentAdmin, Product};
use crate::services::UploadError;
use crate::services::uploads::{delete_image, save_image};
use crate::state::AppState;

const MAX_NAME: usize = 255;
const MAX_DESCRIPTION: usize = 255;

// =============================================================================
// Listing
// =============================================================================

/// Listing filters from the query string. Unknown values mean "any".
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub stock: Option<String>,
}

impl ProductQuery {
    fn filter(&self) -> ProductFilter {
        ProductFilter {
            category: self
                .category
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_owned),
            stock: self.stock.as_deref().and_then(|s| s.parse().ok()),
        }
    }
}

/// An entry of the stock filter dropdown.
#[derive(Debug, Clone)]
pub struct StockOption {
    pub value: &'static str,
    pub label: &'static str,
}

/// Product listing template.
#[derive(Template)]
#[template(path = "products/index.html")]
pub struct ProductsTemplate {
    pub page: AdminPage,
    pub products: Vec<ProductRow>,
    pub categories: Vec<String>,
    pub stock_options: Vec<StockOption>,
    pub selected_category: String,
    pub selected_stock: String,
}

/// List products, newest first, with category and stock filters.
#[instrument(skip(state, page))]
pub async fn index(
    State(state): State<AppState>,
    page: AdminPage,
    Query(query): Query<ProductQuery>,
) -> Result<Html<String>, AppError> {
    let filter = query.filter();
    let repo = ProductRepository::new(state.pool());
    let (products, categories) = tokio::try_join!(repo.list(&filter), repo.distinct_categories())?;

    render(&ProductsTemplate {
        page,
        products: rows(&products),
        categories,
        stock_options: StockFilter::ALL
            .iter()
            .map(|s| StockOption {
                value: s.as_str(),
                label: s.label(),
            })
            .collect(),
        selected_category: filter.category.unwrap_or_default(),
        selected_stock: filter.stock.map(|s| s.as_str().to_owned()).unwrap_or_default(),
    })
}

// =============================================================================
// Form
// =============================================================================

/// Raw product form values, kept as typed for redisplay.
#[derive(Debug, Clone, Default)]
pub struct ProductFormValues {
    pub name: String,
    pub description: String,
    pub price: String,
    pub stock: String,
    pub category: String,
}

impl ProductFormValues {
    fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone().unwrap_or_default(),
            price: product.price.amount().to_string(),
            stock: product.stock.map(|n| n.to_string()).unwrap_or_default(),
            category: product.category.clone(),
        }
    }

    /// Check every field, collecting all problems at once.
    fn validate(&self, categories: &[Category]) -> Result<ProductInput, Vec<String>> {
        let mut errors = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push("Le nom est obligatoire.".to_owned());
        } else if name.chars().count() > MAX_NAME {
            errors.push(format!("Le nom ne doit pas dépasser {MAX_NAME} caractères."));
        }

        let description = self.description.trim();
        if description.chars().count() > MAX_DESCRIPTION {
            errors.push(format!(
                "La description ne doit pas dépasser {MAX_DESCRIPTION} caractères."
            ));
        }

        let price = if self.price.trim().is_empty() {
            errors.push("Le prix est obligatoire.".to_owned());
            None
        } else {
            Price::parse(&self.price)
                .inspect_err(|_| errors.push("Le prix doit être un nombre positif.".to_owned()))
                .ok()
        };

        let stock = match self.stock.trim() {
            "" => None,
            raw => match raw.parse::<i32>() {
                Ok(n) if n >= 0 => Some(n),
                _ => {
                    errors.push("Le stock doit être un entier positif.".to_owned());
                    None
                }
            },
        };

        let category = self.category.trim();
        if category.is_empty() {
            errors.push("La catégorie est obligatoire.".to_owned());
        } else if !categories.iter().any(|c| c.name == category) {
            errors.push("Catégorie inconnue.".to_owned());
        }

        match price {
            Some(price) if errors.is_empty() => Ok(ProductInput {
                name: name.to_owned(),
                description: (!description.is_empty()).then(|| description.to_owned()),
                price,
                stock,
                category: category.to_owned(),
            }),
            _ => Err(errors),
        }
    }
}

/// An image file attached to the form.
struct UploadedImage {
    file_name: String,
    bytes: Bytes,
}

struct ProductSubmission {
    values: ProductFormValues,
    image: Option<UploadedImage>,
}

fn multipart_error(err: &MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::Upload(UploadError::TooLarge)
    } else {
        AppError::BadRequest(err.body_text())
    }
}

/// Read the multipart body. An empty file input means "no new image".
async fn read_submission(mut multipart: Multipart) -> Result<ProductSubmission, AppError> {
    let mut values = ProductFormValues::default();
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        if name == "image" {
            let file_name = field.file_name().unwrap_or_default().to_owned();
            let bytes = field.bytes().await.map_err(|e| multipart_error(&e))?;
            if !bytes.is_empty() {
                image = Some(UploadedImage { file_name, bytes });
            }
            continue;
        }

        let text = field.text().await.map_err(|e| multipart_error(&e))?;
        match name.as_str() {
            "name" => values.name = text,
            "description" => values.description = text,
            "price" => values.price = text,
            "stock" => values.stock = text,
            "category" => values.category = text,
            _ => {}
        }
    }

    Ok(ProductSubmission { values, image })
}

/// Product create/edit form template.
#[derive(Template)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub page: AdminPage,
    pub heading: &'static str,
    pub action: String,
    pub values: ProductFormValues,
    pub categories: Vec<Category>,
    pub errors: Vec<String>,
    pub image_url: Option<String>,
}

struct FormPage<'a> {
    heading: &'static str,
    action: String,
    image_url: Option<String>,
    path: &'a str,
}

async fn render_form(
    state: &AppState,
    session: &Session,
    admin: CurrentAdmin,
    form: FormPage<'_>,
    values: ProductFormValues,
    errors: Vec<String>,
) -> Result<Response, AppError> {
    let categories = CategoryRepository::new(state.pool()).list().await?;
    let status = if errors.is_empty() {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };

    let html = render(&ProductFormTemplate {
        page: AdminPage::new(session, admin, form.path).await,
        heading: form.heading,
        action: form.action,
        values,
        categories,
        errors,
        image_url: form.image_url,
    })?;
    Ok((status, html).into_response())
}

/// Store the attached image, if any. Rejected files become form errors.
async fn store_image(
    state: &AppState,
    image: Option<&UploadedImage>,
) -> Result<Result<Option<String>, String>, AppError> {
    let Some(image) = image else {
        return Ok(Ok(None));
    };

    match save_image(state.images_dir(), &image.file_name, &image.bytes).await {
        Ok(name) => Ok(Ok(Some(name))),
        Err(err) => match err.user_message() {
            Some(message) => Ok(Err(message.to_owned())),
            None => Err(err.into()),
        },
    }
}

async fn load_product(state: &AppState, id: ProductId) -> Result<Product, AppError> {
    ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the creation form.
pub async fn new_form(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Response, AppError> {
    let form = FormPage {
        heading: "Nouveau produit",
        action: "/products".to_owned(),
        image_url: None,
        path: "/products/new",
    };
    render_form(&state, &session, admin, form, ProductFormValues::default(), Vec::new()).await
}

/// Create a product from the multipart form.
#[instrument(skip(state, session, admin, multipart))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let submission = read_submission(multipart).await?;
    let categories = CategoryRepository::new(state.pool()).list().await?;
    let form = FormPage {
        heading: "Nouveau produit",
        action: "/products".to_owned(),
        image_url: None,
        path: "/products/new",
    };

    let input = match submission.values.validate(&categories) {
        Ok(input) => input,
        Err(errors) => {
            return render_form(&state, &session, admin, form, submission.values, errors).await;
        }
    };
    let image_name = match store_image(&state, submission.image.as_ref()).await? {
        Ok(name) => name,
        Err(error) => {
            return render_form(&state, &session, admin, form, submission.values, vec![error])
                .await;
        }
    };

    let product = match ProductRepository::new(state.pool())
        .create(&input, image_name.as_deref())
        .await
    {
        Ok(product) => product,
        Err(e) => {
            if let Some(name) = &image_name {
                delete_image(state.images_dir(), name).await;
            }
            return Err(e.into());
        }
    };

    tracing::info!(product_id = %product.id, "Product created");
    flash::success(&session, format!("Produit « {} » créé.", product.name)).await;
    Ok(Redirect::to("/products").into_response())
}

/// Display the edit form.
pub async fn edit_form(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let product = load_product(&state, ProductId::new(id)).await?;
    let path = format!("/products/{id}/edit");
    let form = FormPage {
        heading: "Modifier le produit",
        action: format!("/products/{id}"),
        image_url: ProductRow::from(&product).image_url,
        path: &path,
    };
    render_form(
        &state,
        &session,
        admin,
        form,
        ProductFormValues::from_product(&product),
        Vec::new(),
    )
    .await
}

/// Update a product. A new image replaces the previous file.
#[instrument(skip(state, session, admin, multipart))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let product_id = ProductId::new(id);
    let existing = load_product(&state, product_id).await?;
    let submission = read_submission(multipart).await?;
    let categories = CategoryRepository::new(state.pool()).list().await?;
    let path = format!("/products/{id}/edit");
    let form = FormPage {
        heading: "Modifier le produit",
        action: format!("/products/{id}"),
        image_url: ProductRow::from(&existing).image_url,
        path: &path,
    };

    let input = match submission.values.validate(&categories) {
        Ok(input) => input,
        Err(errors) => {
            return render_form(&state, &session, admin, form, submission.values, errors).await;
        }
    };
    let new_image = match store_image(&state, submission.image.as_ref()).await? {
        Ok(name) => name,
        Err(error) => {
            return render_form(&state, &session, admin, form, submission.values, vec![error])
                .await;
        }
    };

    let updated = match ProductRepository::new(state.pool())
        .update(product_id, &input, new_image.as_deref())
        .await
    {
        Ok(product) => product,
        Err(e) => {
            if let Some(name) = &new_image {
                delete_image(state.images_dir(), name).await;
            }
            return Err(e.into());
        }
    };

    if let (Some(_), Some(old)) = (&new_image, &existing.image_name) {
        delete_image(state.images_dir(), old).await;
    }

    tracing::info!(product_id = %updated.id, "Product updated");
    flash::success(&session, format!("Produit « {} » mis à jour.", updated.name)).await;
    Ok(Redirect::to("/products").into_response())
}

/// Delete a product and its image file.
#[instrument(skip(state, session, _admin))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Redirect, AppError> {
    let image = ProductRepository::new(state.pool())
        .delete(ProductId::new(id))
        .await?;

    if let Some(name) = image {
        delete_image(state.images_dir(), &name).await;
    }

    tracing::info!(product_id = id, "Product deleted");
    flash::success(&session, "Produit supprimé.").await;
    Ok(Redirect::to("/products"))
}

/// Flip the featured flag and report the new state.
#[instrument(skip(state, _admin))]
pub async fn toggle_featured(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>, AppError> {
    let featured = ProductRepository::new(state.pool())
        .toggle_featured(ProductId::new(id))
        .await?;

    tracing::info!(product_id = id, featured, "Featured flag toggled");
    Ok(Json(serde_json::json!({ "id": id, "isFeatured": featured })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use auxilia_core::CategoryId;

    use super::*;

    fn categories() -> Vec<Category> {
        vec![Category {
            id: CategoryId::new(1),
            name: "Maison".to_owned(),
            slug: "maison".to_owned(),
        }]
    }

    fn values() -> ProductFormValues {
        ProductFormValues {
            name: "  Lampe  ".to_owned(),
            description: String::new(),
            price: "19,9".to_owned(),
            stock: String::new(),
            category: "Maison".to_owned(),
        }
    }

    #[test]
    fn test_valid_form() {
        let input = values().validate(&categories()).unwrap();
        assert_eq!(input.name, "Lampe");
        assert_eq!(input.description, None);
        assert_eq!(input.price, Price::new(Decimal::new(1990, 2)));
        assert_eq!(input.stock, None);
    }

    #[test]
    fn test_collects_every_error() {
        let form = ProductFormValues {
            name: String::new(),
            price: "-3".to_owned(),
            stock: "2.5".to_owned(),
            category: "Jardin".to_owned(),
            ..values()
        };
        let errors = form.validate(&categories()).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&"Catégorie inconnue.".to_owned()));
    }

    #[test]
    fn test_length_limits() {
        let form = ProductFormValues {
            description: "d".repeat(MAX_DESCRIPTION + 1),
            ..values()
        };
        assert!(form.validate(&categories()).is_err());

        let form = ProductFormValues {
            name: "n".repeat(MAX_NAME),
            ..values()
        };
        assert!(form.validate(&categories()).is_ok());
    }

    #[test]
    fn test_stock_must_be_non_negative() {
        let form = ProductFormValues {
            stock: "-1".to_owned(),
            ..values()
        };
        assert!(form.validate(&categories()).is_err());

        let form = ProductFormValues {
            stock: "0".to_owned(),
            ..values()
        };
        assert_eq!(form.validate(&categories()).unwrap().stock, Some(0));
    }

    #[test]
    fn test_query_filter_is_lenient() {
        let query = ProductQuery {
            category: Some("  ".to_owned()),
            stock: Some("bogus".to_owned()),
        };
        let filter = query.filter();
        assert!(filter.category.is_none());
        assert!(filter.stock.is_none());

        let query = ProductQuery {
            category: Some("Maison".to_owned()),
            stock: Some("low".to_owned()),
        };
        assert_eq!(query.filter().stock, Some(StockFilter::Low));
    }
}
