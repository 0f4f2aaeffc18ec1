//! SQLite-backed product store.
//!
//! One `products` table holds every record. Stock adjustments are a single
//! conditional `UPDATE ... RETURNING`, so the rule check and the write happen
//! in one statement and concurrent orders against the same product cannot
//! both pass the check on a stale value. A `CHECK (current_stock >= 0)`
//! constraint backs the invariant at the table level.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::instrument;

use stockroom_core::{DomainError, ProductId};
use stockroom_inventory::{OrderKind, StockOrder, apply_order};
use stockroom_products::{Category, NewProduct, Product, ProductPatch};

use super::r#trait::ProductStore;
use crate::error::{StoreError, map_sqlx_error};

const PRODUCT_COLUMNS: &str = "id, name, description, current_stock, unit_cost, sale_price, \
                               category, suppliers, created_at, updated_at";

/// SQLite-backed product store.
///
/// `SqlitePool` is `Send + Sync` and cheap to clone; connections are checked
/// out per statement and returned on drop.
#[derive(Debug, Clone)]
pub struct SqliteProductStore {
    pool: SqlitePool,
}

impl SqliteProductStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database at `url` and ensure the schema exists.
    ///
    /// `sqlite::memory:` databases live inside a single connection, so the pool
    /// is pinned to one long-lived connection for them.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| map_sqlx_error("connect", e))?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5));

        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections.max(1))
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Create the `products` table if it does not exist yet.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS products (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                name          TEXT    NOT NULL CHECK (length(name) BETWEEN 1 AND 100),
                description   TEXT    NULL CHECK (description IS NULL OR length(description) <= 500),
                current_stock INTEGER NOT NULL CHECK (current_stock >= 0),
                unit_cost     REAL    NOT NULL CHECK (unit_cost > 0),
                sale_price    REAL    NOT NULL CHECK (sale_price > 0),
                category      TEXT    NOT NULL CHECK (category IN
                                  ('clothing', 'accessories', 'collectibles', 'graphic_novels')),
                suppliers     TEXT    NOT NULL CHECK (length(suppliers) <= 200),
                created_at    TEXT    NOT NULL,
                updated_at    TEXT    NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("migrate", e))?;

        tracing::debug!("products table ready");
        Ok(())
    }

    async fn current_stock(&self, id: ProductId) -> Result<Option<i64>, StoreError> {
        let row = sqlx::query("SELECT current_stock FROM products WHERE id = ?1")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("current_stock", e))?;

        row.map(|r| r.try_get::<i64, _>("current_stock"))
            .transpose()
            .map_err(|e| map_sqlx_error("current_stock", e))
    }

    /// One atomic statement: check the stock rule and write in the same `UPDATE`.
    /// `None` means no row matched.
    async fn conditional_adjust(
        &self,
        id: ProductId,
        kind: OrderKind,
        quantity: i64,
    ) -> Result<Option<i64>, StoreError> {
        let now = encode_timestamp(Utc::now());

        let query = match kind {
            OrderKind::User => sqlx::query(
                r#"
                UPDATE products
                SET current_stock = current_stock - ?1, updated_at = ?2
                WHERE id = ?3 AND current_stock >= ?1
                RETURNING current_stock
                "#,
            )
            .bind(quantity)
            .bind(now)
            .bind(id.get()),
            // Upper guard keeps the INTEGER column from overflowing into REAL.
            OrderKind::Supplier => sqlx::query(
                r#"
                UPDATE products
                SET current_stock = current_stock + ?1, updated_at = ?2
                WHERE id = ?3 AND current_stock <= ?4
                RETURNING current_stock
                "#,
            )
            .bind(quantity)
            .bind(now)
            .bind(id.get())
            .bind(i64::MAX - quantity),
        };

        let row = query
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("adjust_stock", e))?;

        row.map(|r| r.try_get::<i64, _>("current_stock"))
            .transpose()
            .map_err(|e| map_sqlx_error("adjust_stock", e))
    }
}

#[async_trait]
impl ProductStore for SqliteProductStore {
    #[instrument(skip(self, fields), err)]
    async fn insert(&self, fields: NewProduct) -> Result<Product, StoreError> {
        let created_at = Utc::now();

        let row = sqlx::query(
            r#"
            INSERT INTO products (
                name,
                description,
                current_stock,
                unit_cost,
                sale_price,
                category,
                suppliers,
                created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            RETURNING id
            "#,
        )
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(fields.current_stock)
        .bind(fields.unit_cost)
        .bind(fields.sale_price)
        .bind(fields.category.as_str())
        .bind(&fields.suppliers)
        .bind(encode_timestamp(created_at))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert", e))?;

        let id: i64 = row
            .try_get("id")
            .map_err(|e| map_sqlx_error("insert", e))?;

        Ok(Product::create(ProductId::new(id), fields, created_at))
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn get(&self, id: ProductId) -> Result<Product, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get", e))?;

        match row {
            Some(row) => decode_product(&row),
            None => Err(StoreError::Domain(DomainError::NotFound)),
        }
    }

    #[instrument(skip(self), err)]
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id ASC LIMIT ?1 OFFSET ?2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list", e))?;

        rows.iter().map(decode_product).collect()
    }

    /// Single statement: absent fields fall back to the stored value via `COALESCE`.
    #[instrument(skip(self, patch), fields(product_id = %id), err)]
    async fn update(&self, id: ProductId, patch: ProductPatch) -> Result<Product, StoreError> {
        let (set_description, description) = match patch.description {
            Some(value) => (true, value),
            None => (false, None),
        };

        let row = sqlx::query(&format!(
            r#"
            UPDATE products SET
                name          = COALESCE(?1, name),
                description   = CASE WHEN ?2 THEN ?3 ELSE description END,
                current_stock = COALESCE(?4, current_stock),
                unit_cost     = COALESCE(?5, unit_cost),
                sale_price    = COALESCE(?6, sale_price),
                category      = COALESCE(?7, category),
                suppliers     = COALESCE(?8, suppliers),
                updated_at    = ?9
            WHERE id = ?10
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(patch.name)
        .bind(set_description)
        .bind(description)
        .bind(patch.current_stock)
        .bind(patch.unit_cost)
        .bind(patch.sale_price)
        .bind(patch.category.map(Category::as_str))
        .bind(patch.suppliers)
        .bind(encode_timestamp(Utc::now()))
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update", e))?;

        match row {
            Some(row) => decode_product(&row),
            None => Err(StoreError::Domain(DomainError::NotFound)),
        }
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn delete(&self, id: ProductId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Domain(DomainError::NotFound));
        }
        Ok(())
    }

    /// Re-runs the conditional update when the refusal turns out to be stale:
    /// a concurrent order moved the stock between the update and the re-read.
    /// Nothing was written in that case, so trying again is safe.
    #[instrument(skip(self), fields(product_id = %id, kind = %kind), err)]
    async fn adjust_stock(
        &self,
        id: ProductId,
        kind: OrderKind,
        quantity: i64,
    ) -> Result<i64, StoreError> {
        StockOrder::new(id, quantity).validate()?;

        loop {
            if let Some(new_stock) = self.conditional_adjust(id, kind, quantity).await? {
                return Ok(new_stock);
            }

            // Nothing matched: either the product is gone or the rule refused the order.
            let Some(current) = self.current_stock(id).await? else {
                return Err(StoreError::Domain(DomainError::NotFound));
            };
            apply_order(kind, current, quantity)?;
            tracing::debug!(current, "stock moved under the order; retrying");
        }
    }
}

fn encode_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

fn decode_timestamp(column: &str, raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::backend(format!("invalid {column} timestamp {raw:?}: {e}")))
}

fn decode_product(row: &SqliteRow) -> Result<Product, StoreError> {
    let get_err = |e| map_sqlx_error("decode_product", e);

    let category: String = row.try_get("category").map_err(get_err)?;
    let category = Category::from_str(&category)
        .map_err(|_| StoreError::backend(format!("unknown category {category:?} in products table")))?;

    let created_at: String = row.try_get("created_at").map_err(get_err)?;
    let updated_at: Option<String> = row.try_get("updated_at").map_err(get_err)?;

    Ok(Product {
        id: ProductId::new(row.try_get("id").map_err(get_err)?),
        name: row.try_get("name").map_err(get_err)?,
        description: row.try_get("description").map_err(get_err)?,
        current_stock: row.try_get("current_stock").map_err(get_err)?,
        unit_cost: row.try_get("unit_cost").map_err(get_err)?,
        sale_price: row.try_get("sale_price").map_err(get_err)?,
        category,
        suppliers: row.try_get("suppliers").map_err(get_err)?,
        created_at: decode_timestamp("created_at", &created_at)?,
        updated_at: updated_at
            .as_deref()
            .map(|raw| decode_timestamp("updated_at", raw))
            .transpose()?,
    })
}
