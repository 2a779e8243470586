//! Product repository for catalog reads.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use auxilia_core::{CatalogQuery, Page, Price, ProductId};

use super::{RepositoryError, count_from_db};
use crate::models::Product;

const PRODUCT_COLUMNS: &str = "p.id, p.name, p.description, p.price, p.stock, p.category, \
                               p.image_name, p.is_featured, p.created_at";

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

/// Lightweight row for the live search dropdown.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SearchHit {
    pub id: i32,
    pub name: String,
    pub price: Decimal,
    pub image_name: Option<String>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product reads.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product p WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Get every product whose ID is listed. Missing IDs are skipped.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product p WHERE p.id = ANY($1) ORDER BY p.id"
        ))
        .bind(ids)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Featured products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn featured(&self, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product p \
             WHERE p.is_featured \
             ORDER BY p.created_at DESC, p.id DESC \
             LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Most recently added products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn latest(&self, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product p ORDER BY p.id DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// One page of the catalog.
    ///
    /// The search term matches name or description, case-insensitively; the
    /// category must match exactly. Ordering columns come from the
    /// `SortField` whitelist only.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either query fails.
    pub async fn catalog(&self, query: &CatalogQuery) -> Result<Page<Product>, RepositoryError> {
        let mut count_qb: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM product p WHERE TRUE");
        push_catalog_filters(&mut count_qb, query);
        let total = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(self.pool)
            .await?;

        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT ");
        qb.push(PRODUCT_COLUMNS);
        qb.push(" FROM product p WHERE TRUE");
        push_catalog_filters(&mut qb, query);
        qb.push(" ORDER BY ")
            .push(query.sort.column())
            .push(" ")
            .push(query.direction.sql())
            .push(", p.id ASC");
        qb.push(" LIMIT ").push_bind(i64::from(query.limit));
        qb.push(" OFFSET ").push_bind(query.offset());

        let rows = qb
            .build_query_as::<ProductRow>()
            .fetch_all(self.pool)
            .await?;

        Ok(Page::new(
            rows.into_iter().map(Product::from).collect(),
            count_from_db(total),
            query.page,
            query.limit,
        ))
    }

    /// Name matches for the live search box.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search_names(
        &self,
        pattern: &str,
        limit: i64,
    ) -> Result<Vec<SearchHit>, RepositoryError> {
        let hits = sqlx::query_as::<_, SearchHit>(
            r"
            SELECT id, name, price, image_name
            FROM product
            WHERE name ILIKE $1 ESCAPE '\'
            ORDER BY name
            LIMIT $2
            ",
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(hits)
    }
}

fn push_catalog_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &CatalogQuery) {
    if let Some(pattern) = query.like_pattern() {
        qb.push(" AND (p.name ILIKE ")
            .push_bind(pattern.clone())
            .push(r" ESCAPE '\' OR p.description ILIKE ")
            .push_bind(pattern)
            .push(r" ESCAPE '\')");
    }
    if let Some(category) = &query.category {
        qb.push(" AND p.category = ").push_bind(category.clone());
    }
}
