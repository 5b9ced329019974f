//! # Product Repository
//!
//! Catalog entries used to prefill invoice rows. Invoices copy what they
//! need, so later catalog edits never reach issued invoices.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{money_from_sql, money_to_sql, percent_from_sql};
use billr_core::validation::{validate_name, validate_rate};
use billr_core::{GstRate, Product};

const ENTITY: &str = "Product";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
/// let catalog = repo.list(tenant_id).await?;
/// let row = catalog[0].to_line_item(dec!(10), "Meter");
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    tenant_id: String,
    name: String,
    hsn_code: String,
    default_price: String,
    default_gst: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = DbError;

    fn try_from(row: ProductRow) -> DbResult<Self> {
        let default_price = money_from_sql(ENTITY, "default_price", &row.default_price)?;
        let default_gst = GstRate::new(percent_from_sql(ENTITY, "default_gst", row.default_gst)?)
            .map_err(|e| DbError::corrupt(ENTITY, e))?;

        Ok(Product {
            id: row.id,
            tenant_id: row.tenant_id,
            name: row.name,
            hsn_code: row.hsn_code,
            default_price,
            default_gst,
            created_at: row.created_at,
        })
    }
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// The product as stored (name and HSN trimmed).
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        validate_name("product name", &product.name)?;
        validate_rate(product.default_price.amount())?;

        let stored = Product {
            name: product.name.trim().to_string(),
            hsn_code: product.hsn_code.trim().to_string(),
            ..product.clone()
        };

        debug!(
            tenant_id = %stored.tenant_id,
            product_id = %stored.id,
            name = %stored.name,
            "Inserting product"
        );

        sqlx::query(
            r#"
            INSERT INTO products (
                id, tenant_id, name, hsn_code, default_price, default_gst, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&stored.id)
        .bind(&stored.tenant_id)
        .bind(&stored.name)
        .bind(&stored.hsn_code)
        .bind(money_to_sql(stored.default_price))
        .bind(i64::from(stored.default_gst.percent()))
        .bind(stored.created_at)
        .execute(&self.pool)
        .await?;

        Ok(stored)
    }

    /// Gets a product of this account by ID.
    pub async fn get(&self, tenant_id: &str, id: &str) -> DbResult<Option<Product>> {
        let row: Option<ProductRow> = sqlx::query_as(
            r#"
            SELECT id, tenant_id, name, hsn_code, default_price, default_gst, created_at
            FROM products
            WHERE tenant_id = ?1 AND id = ?2
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Lists the account's catalog alphabetically.
    pub async fn list(&self, tenant_id: &str) -> DbResult<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            r#"
            SELECT id, tenant_id, name, hsn_code, default_price, default_gst, created_at
            FROM products
            WHERE tenant_id = ?1
            ORDER BY name COLLATE NOCASE
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(tenant_id = %tenant_id, count = rows.len(), "Listed products");
        rows.into_iter().map(Product::try_from).collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
