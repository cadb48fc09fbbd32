//! Catalog gateway: CRUD over the product collection with paginated listing.

use {
    async_trait::async_trait,
    serde::Deserialize,
    sqlx::{QueryBuilder, Row, Sqlite, SqlitePool, sqlite::SqliteRow},
};

use tienda_protocol::{Page, Product, ProductDraft, ProductPatch};

use crate::{StoreError, StoreResult};

pub const DEFAULT_PAGE_LIMIT: u32 = 10;
const MAX_PAGE_LIMIT: u32 = 100;

// ── Query types ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSort {
    Asc,
    Desc,
}

/// Listing filter. `available` restricts to products with stock on hand.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListFilter {
    pub category: Option<String>,
    pub available: Option<bool>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    pub limit: u32,
    pub page: u32,
    pub sort: Option<PriceSort>,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            page: 1,
            sort: None,
        }
    }
}

impl PageQuery {
    fn clamped(&self) -> (u32, u32) {
        let limit = self.limit.clamp(1, MAX_PAGE_LIMIT);
        let page = self.page.max(1);
        (limit, page)
    }
}

// ── Gateway contract ─────────────────────────────────────────────────────────

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list(&self, filter: &ListFilter, page: &PageQuery) -> StoreResult<Page<Product>>;
    /// Full snapshot in insertion order, for the realtime replay.
    async fn list_all(&self) -> StoreResult<Vec<Product>>;
    async fn get(&self, id: &str) -> StoreResult<Product>;
    async fn create(&self, draft: ProductDraft) -> StoreResult<Product>;
    async fn update(&self, id: &str, patch: ProductPatch) -> StoreResult<Product>;
    async fn delete(&self, id: &str) -> StoreResult<()>;
}

// ── SQLite implementation ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct SqliteCatalog {
    pool: SqlitePool,
}

impl SqliteCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn validate_draft(draft: &ProductDraft) -> StoreResult<()> {
    if draft.title.trim().is_empty() {
        return Err(StoreError::Validation("title must not be empty".into()));
    }
    if draft.price < 0.0 {
        return Err(StoreError::Validation("price must not be negative".into()));
    }
    if draft.stock < 0 {
        return Err(StoreError::Validation("stock must not be negative".into()));
    }
    Ok(())
}

fn product_from_row(row: &SqliteRow) -> Result<Product, sqlx::Error> {
    let thumbnails: String = row.try_get("thumbnails")?;
    Ok(Product {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        price: row.try_get("price")?,
        stock: row.try_get("stock")?,
        category: row.try_get("category")?,
        thumbnails: serde_json::from_str(&thumbnails).unwrap_or_default(),
    })
}

fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &ListFilter) {
    let mut keyword = " WHERE";
    if let Some(category) = filter.category.as_deref() {
        builder.push(keyword).push(" category = ").push_bind(category.to_string());
        keyword = " AND";
    }
    if let Some(available) = filter.available {
        let cmp = if available { " stock > 0" } else { " stock = 0" };
        builder.push(keyword).push(cmp);
    }
}

#[async_trait]
impl CatalogStore for SqliteCatalog {
    async fn list(&self, filter: &ListFilter, page: &PageQuery) -> StoreResult<Page<Product>> {
        let (limit, page_no) = page.clamped();

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) AS n FROM products");
        push_filter(&mut count, filter);
        let total: i64 = count.build().fetch_one(&self.pool).await?.try_get("n")?;
        let total = total.max(0) as u64;

        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT id, title, description, price, stock, category, thumbnails FROM products",
        );
        push_filter(&mut query, filter);
        query.push(match page.sort {
            Some(PriceSort::Asc) => " ORDER BY price ASC",
            Some(PriceSort::Desc) => " ORDER BY price DESC",
            None => " ORDER BY rowid",
        });
        query
            .push(" LIMIT ")
            .push_bind(i64::from(limit))
            .push(" OFFSET ")
            .push_bind(i64::from(limit) * i64::from(page_no - 1));

        let rows = query.build().fetch_all(&self.pool).await?;
        let items = rows
            .iter()
            .map(product_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        let total_pages = (total.div_ceil(u64::from(limit)) as u32).max(1);
        let has_prev_page = page_no > 1;
        let has_next_page = page_no < total_pages;
        Ok(Page {
            items,
            total,
            page: page_no,
            total_pages,
            has_prev_page,
            has_next_page,
            prev_page: has_prev_page.then(|| page_no - 1),
            next_page: has_next_page.then(|| page_no + 1),
        })
    }

    async fn list_all(&self) -> StoreResult<Vec<Product>> {
        let rows = sqlx::query(
            "SELECT id, title, description, price, stock, category, thumbnails
             FROM products ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .iter()
            .map(product_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn get(&self, id: &str) -> StoreResult<Product> {
        let row = sqlx::query(
            "SELECT id, title, description, price, stock, category, thumbnails
             FROM products WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound("product"))?;
        Ok(product_from_row(&row)?)
    }

    async fn create(&self, draft: ProductDraft) -> StoreResult<Product> {
        validate_draft(&draft)?;
        let product = Product {
            id: uuid::Uuid::new_v4().to_string(),
            title: draft.title,
            description: draft.description,
            price: draft.price,
            stock: draft.stock,
            category: draft.category,
            thumbnails: draft.thumbnails,
        };
        sqlx::query(
            "INSERT INTO products (id, title, description, price, stock, category, thumbnails)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&product.id)
        .bind(&product.title)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.stock)
        .bind(&product.category)
        .bind(serde_json::json!(product.thumbnails).to_string())
        .execute(&self.pool)
        .await?;
        Ok(product)
    }

    async fn update(&self, id: &str, patch: ProductPatch) -> StoreResult<Product> {
        let mut product = self.get(id).await?;
        if let Some(title) = patch.title {
            product.title = title;
        }
        if let Some(description) = patch.description {
            product.description = description;
        }
        if let Some(price) = patch.price {
            product.price = price;
        }
        if let Some(stock) = patch.stock {
            product.stock = stock;
        }
        if let Some(category) = patch.category {
            product.category = category;
        }
        if let Some(thumbnails) = patch.thumbnails {
            product.thumbnails = thumbnails;
        }
        validate_draft(&ProductDraft {
            title: product.title.clone(),
            description: product.description.clone(),
            price: product.price,
            stock: product.stock,
            category: product.category.clone(),
            thumbnails: product.thumbnails.clone(),
        })?;
        sqlx::query(
            "UPDATE products
             SET title = ?, description = ?, price = ?, stock = ?, category = ?, thumbnails = ?
             WHERE id = ?",
        )
        .bind(&product.title)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.stock)
        .bind(&product.category)
        .bind(serde_json::json!(product.thumbnails).to_string())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(product)
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("product"));
        }
        Ok(())
    }
}
