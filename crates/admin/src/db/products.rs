//! Product repository: catalog writes and back-office listings.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use auxilia_core::{Price, ProductId, StockFilter};

use super::{RepositoryError, count_from_db};
use crate::models::Product;

const PRODUCT_COLUMNS: &str =
    "id, name, description, price, stock, category, image_name, is_featured, created_at";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    description: Option<String>,
    price: Decimal,
    stock: Option<i32>,
    category: String,
    image_name: Option<String>,
    is_featured: bool,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            price: Price::new(row.price),
            stock: row.stock,
            category: row.category,
            image_name: row.image_name,
            is_featured: row.is_featured,
            created_at: row.created_at,
        }
    }
}

// =============================================================================
// Inputs
// =============================================================================

/// Validated product form values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInput {
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub stock: Option<i32>,
    pub category: String,
}

/// Filters for the back-office product list.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub stock: Option<StockFilter>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Products matching the filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let mut query: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM product WHERE TRUE"));

        if let Some(category) = &filter.category {
            query.push(" AND category = ").push_bind(category.clone());
        }
        if let Some(bucket) = filter.stock {
            query.push(" AND ").push(bucket.sql_predicate());
        }
        query.push(" ORDER BY created_at DESC, id DESC");

        let rows = query
            .build_query_as::<ProductRow>()
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Most recently created products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent(&self, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product ORDER BY created_at DESC, id DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Category names actually used by products, sorted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn distinct_categories(&self) -> Result<Vec<String>, RepositoryError> {
        let names =
            sqlx::query_scalar::<_, String>("SELECT DISTINCT category FROM product ORDER BY category")
                .fetch_all(self.pool)
                .await?;
        Ok(names)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Insert a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        input: &ProductInput,
        image_name: Option<&str>,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO product (name, description, price, stock, category, image_name) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.stock)
        .bind(&input.category)
        .bind(image_name)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Update a product's fields, and its image name when `image_name` is `Some`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
        image_name: Option<&str>,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE product SET name = $2, description = $3, price = $4, stock = $5, \
             category = $6, image_name = COALESCE($7, image_name) \
             WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.stock)
        .bind(&input.category)
        .bind(image_name)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Delete a product, returning its image name so the file can go too.
    ///
    /// Order lines keep their snapshot; their product reference is nulled.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn delete(&self, id: ProductId) -> Result<Option<String>, RepositoryError> {
        let image: Option<Option<String>> =
            sqlx::query_scalar("DELETE FROM product WHERE id = $1 RETURNING image_name")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        image.ok_or(RepositoryError::NotFound)
    }

    /// Flip the featured flag and return its new value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn toggle_featured(&self, id: ProductId) -> Result<bool, RepositoryError> {
        sqlx::query_scalar::<_, bool>(
            "UPDATE product SET is_featured = NOT is_featured WHERE id = $1 RETURNING is_featured",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Total number of products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product")
            .fetch_one(self.pool)
            .await?;
        Ok(count_from_db(count))
    }

    /// Products with a tracked stock under the low threshold.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn low_stock_count(&self) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM product WHERE {}",
            StockFilter::Low.sql_predicate()
        ))
        .fetch_one(self.pool)
        .await?;
        Ok(count_from_db(count))
    }
}
