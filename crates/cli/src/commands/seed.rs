//! Seed the catalog from a YAML file.
//!
//! # File format
//!
//! ```yaml
//! categories:
//!   - name: Ordinateurs
//! products:
//!   - name: Ultrabook 14
//!     description: Portable léger, 16 Go de RAM
//!     price: "899.99"
//!     stock: 12
//!     category: Ordinateurs
//!     featured: true
//! ```
//!
//! Prices are quoted decimal strings. A product category that is not listed
//! under `categories` is created as well. Products whose name already exists
//! are skipped, so the command can be rerun safely.

use std::path::Path;

use serde::Deserialize;
use sqlx::{Postgres, Transaction};
use tracing::{error, info};

use auxilia_core::{Price, slugify};

use super::connect;

/// Longest accepted name, description, or category.
const MAX_TEXT: usize = 255;

/// Top-level structure of a catalog file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogFile {
    #[serde(default)]
    pub categories: Vec<CategoryEntry>,
    #[serde(default)]
    pub products: Vec<ProductEntry>,
}

/// A category to create.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryEntry {
    pub name: String,
}

/// A product to create.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductEntry {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: String,
    #[serde(default)]
    pub stock: Option<i32>,
    pub category: String,
    #[serde(default)]
    pub featured: bool,
}

impl CatalogFile {
    /// Every category name used by the file, in order of first appearance.
    fn category_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        let listed = self.categories.iter().map(|c| c.name.trim());
        let used = self.products.iter().map(|p| p.category.trim());
        for name in listed.chain(used) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

/// Check the whole file before touching the database.
fn validate(catalog: &CatalogFile) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen: Vec<&str> = Vec::new();

    for category in &catalog.categories {
        let name = category.name.trim();
        if name.is_empty() || name.chars().count() > MAX_TEXT {
            errors.push(format!("category {name:?}: name must be 1 to {MAX_TEXT} characters"));
        }
    }

    for product in &catalog.products {
        let name = product.name.trim();
        if name.is_empty() || name.chars().count() > MAX_TEXT {
            errors.push(format!("product {name:?}: name must be 1 to {MAX_TEXT} characters"));
        }
        if seen.contains(&name) {
            errors.push(format!("product {name:?}: listed twice"));
        }
        seen.push(name);

        if product
            .description
            .as_deref()
            .is_some_and(|d| d.chars().count() > MAX_TEXT)
        {
            errors.push(format!("product {name:?}: description too long"));
        }
        if let Err(e) = Price::parse(&product.price) {
            errors.push(format!("product {name:?}: {e}"));
        }
        if product.stock.is_some_and(|s| s < 0) {
            errors.push(format!("product {name:?}: stock cannot be negative"));
        }
        let category = product.category.trim();
        if category.is_empty() || category.chars().count() > MAX_TEXT {
            errors.push(format!("product {name:?}: category must be 1 to {MAX_TEXT} characters"));
        }
    }

    errors
}

/// Counts reported after seeding.
#[derive(Debug, Default)]
pub struct SeedResult {
    pub categories_inserted: u64,
    pub inserted: u64,
    pub skipped: u64,
}

/// Seed categories and products from a YAML file.
///
/// # Arguments
///
/// * `file_path` - Path to the YAML catalog
/// * `clear_existing` - If true, delete every product and category first
///
/// # Errors
///
/// Returns an error if `DATABASE_URL` is missing, the file cannot be read or
/// fails validation, or a database operation fails. Nothing is written unless
/// every row succeeds.
pub async fn catalog(file_path: &str, clear_existing: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading catalog from file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(path).await?;
    let catalog: CatalogFile = serde_yaml::from_str(&content)?;

    info!(
        categories = catalog.categories.len(),
        products = catalog.products.len(),
        "Parsed catalog"
    );

    let errors = validate(&catalog);
    if !errors.is_empty() {
        error!("Catalog validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    let pool = connect().await?;
    info!("Connected to database");

    let mut tx = pool.begin().await?;
    if clear_existing {
        clear(&mut tx).await?;
    }
    let result = seed(&mut tx, &catalog).await?;
    tx.commit().await?;

    info!("Seeding complete!");
    info!("  Categories inserted: {}", result.categories_inserted);
    info!("  Products inserted: {}", result.inserted);
    info!("  Products skipped (already exist): {}", result.skipped);

    Ok(())
}

async fn clear(tx: &mut Transaction<'_, Postgres>) -> Result<(), sqlx::Error> {
    // Order lines keep their name snapshot; product_id is set to NULL
    let products = sqlx::query("DELETE FROM product").execute(&mut **tx).await?;
    let categories = sqlx::query("DELETE FROM category").execute(&mut **tx).await?;
    info!(
        products = products.rows_affected(),
        categories = categories.rows_affected(),
        "Cleared existing catalog"
    );
    Ok(())
}

async fn seed(
    tx: &mut Transaction<'_, Postgres>,
    catalog: &CatalogFile,
) -> Result<SeedResult, Box<dyn std::error::Error>> {
    let mut result = SeedResult::default();

    for name in catalog.category_names() {
        let inserted = sqlx::query(
            "INSERT INTO category (name, slug) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(name)
        .bind(slugify(name))
        .execute(&mut **tx)
        .await?;
        result.categories_inserted += inserted.rows_affected();
    }

    for product in &catalog.products {
        let name = product.name.trim();
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM product WHERE name = $1)")
            .bind(name)
            .fetch_one(&mut **tx)
            .await?;
        if exists {
            info!(product = name, "Skipping existing product");
            result.skipped += 1;
            continue;
        }

        let price = Price::parse(&product.price)?;
        let description = product
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty());

        sqlx::query(
            r"
            INSERT INTO product (name, description, price, stock, category, is_featured)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(name)
        .bind(description)
        .bind(price.amount())
        .bind(product.stock)
        .bind(product.category.trim())
        .bind(product.featured)
        .execute(&mut **tx)
        .await?;
        result.inserted += 1;
    }

    Ok(result)
}
