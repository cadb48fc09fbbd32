//! Cart gateway: a cart is a bag of `(product_id, quantity)` items.

use {
    serde::{Deserialize, Serialize},
    sqlx::{Row, SqlitePool},
};

use crate::{StoreError, StoreResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub id: String,
    pub items: Vec<CartItem>,
}

#[derive(Clone)]
pub struct Carts {
    pool: SqlitePool,
}

impl Carts {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self) -> StoreResult<Cart> {
        let id = uuid::Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO carts (id) VALUES (?)")
            .bind(&id)
            .execute(&self.pool)
            .await?;
        Ok(Cart { id, items: vec![] })
    }

    pub async fn get(&self, id: &str) -> StoreResult<Cart> {
        let exists = sqlx::query("SELECT id FROM carts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Err(StoreError::NotFound("cart"));
        }
        let rows = sqlx::query(
            "SELECT product_id, quantity FROM cart_items WHERE cart_id = ? ORDER BY rowid",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        let items = rows
            .iter()
            .map(|row| {
                Ok(CartItem {
                    product_id: row.try_get("product_id")?,
                    quantity: row.try_get("quantity")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;
        Ok(Cart {
            id: id.to_string(),
            items,
        })
    }

    /// Add `quantity` units of a product, accumulating onto any existing line.
    pub async fn add_item(&self, cart_id: &str, product_id: &str, quantity: i64) -> StoreResult<Cart> {
        if quantity <= 0 {
            return Err(StoreError::Validation("quantity must be positive".into()));
        }
        self.require_cart(cart_id).await?;
        self.require_product(product_id).await?;
        sqlx::query(
            "INSERT INTO cart_items (cart_id, product_id, quantity) VALUES (?, ?, ?)
             ON CONFLICT (cart_id, product_id) DO UPDATE SET quantity = quantity + excluded.quantity",
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity)
        .execute(&self.pool)
        .await?;
        self.get(cart_id).await
    }

    /// Replace the quantity of an existing line.
    pub async fn set_quantity(
        &self,
        cart_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> StoreResult<Cart> {
        if quantity <= 0 {
            return Err(StoreError::Validation("quantity must be positive".into()));
        }
        let result = sqlx::query(
            "UPDATE cart_items SET quantity = ? WHERE cart_id = ? AND product_id = ?",
        )
        .bind(quantity)
        .bind(cart_id)
        .bind(product_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("cart item"));
        }
        self.get(cart_id).await
    }

    pub async fn remove_item(&self, cart_id: &str, product_id: &str) -> StoreResult<Cart> {
        let result =
            sqlx::query("DELETE FROM cart_items WHERE cart_id = ? AND product_id = ?")
                .bind(cart_id)
                .bind(product_id)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("cart item"));
        }
        self.get(cart_id).await
    }

    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM carts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("cart"));
        }
        Ok(())
    }

    /// Total price of the cart at current catalog prices.
    pub async fn total(&self, id: &str) -> StoreResult<f64> {
        self.require_cart(id).await?;
        let row = sqlx::query(
            "SELECT COALESCE(SUM(ci.quantity * p.price), 0.0) AS total
             FROM cart_items ci JOIN products p ON p.id = ci.product_id
             WHERE ci.cart_id = ?",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("total")?)
    }

    async fn require_cart(&self, id: &str) -> StoreResult<()> {
        sqlx::query("SELECT id FROM carts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(|_| ())
            .ok_or(StoreError::NotFound("cart"))
    }

    async fn require_product(&self, id: &str) -> StoreResult<()> {
        sqlx::query("SELECT id FROM products WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(|_| ())
            .ok_or(StoreError::NotFound("product"))
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::catalog::{CatalogStore, SqliteCatalog},
        tienda_protocol::ProductDraft,
    };

    async fn fixtures() -> (Carts, String) {
        let pool = crate::connect("sqlite::memory:").await.unwrap();
        let catalog = SqliteCatalog::new(pool.clone());
        let product = catalog
            .create(ProductDraft {
                title: "Teclado".into(),
                description: String::new(),
                price: 20.0,
                stock: 5,
                category: String::new(),
                thumbnails: vec![],
            })
            .await
            .unwrap();
        (Carts::new(pool), product.id)
    }

    #[tokio::test]
    async fn add_item_accumulates_quantity() {
        let (carts, product_id) = fixtures().await;
        let cart = carts.create().await.unwrap();
        carts.add_item(&cart.id, &product_id, 2).await.unwrap();
        let cart = carts.add_item(&cart.id, &product_id, 3).await.unwrap();
        assert_eq!(cart.items, vec![CartItem {
            product_id,
            quantity: 5,
        }]);
    }

    #[tokio::test]
    async fn unknown_product_or_cart_is_not_found() {
        let (carts, product_id) = fixtures().await;
        let cart = carts.create().await.unwrap();
        assert!(matches!(
            carts.add_item(&cart.id, "nope", 1).await,
            Err(StoreError::NotFound("product"))
        ));
        assert!(matches!(
            carts.add_item("nope", &product_id, 1).await,
            Err(StoreError::NotFound("cart"))
        ));
    }

    #[tokio::test]
    async fn total_reflects_quantities_and_prices() {
        let (carts, product_id) = fixtures().await;
        let cart = carts.create().await.unwrap();
        carts.add_item(&cart.id, &product_id, 3).await.unwrap();
        assert_eq!(carts.total(&cart.id).await.unwrap(), 60.0);
    }

    #[tokio::test]
    async fn delete_cascades_to_items() {
        let (carts, product_id) = fixtures().await;
        let cart = carts.create().await.unwrap();
        carts.add_item(&cart.id, &product_id, 1).await.unwrap();
        carts.delete(&cart.id).await.unwrap();
        assert!(matches!(
            carts.get(&cart.id).await,
            Err(StoreError::NotFound("cart"))
        ));
    }

    #[tokio::test]
    async fn set_quantity_replaces_and_remove_deletes_line() {
        let (carts, product_id) = fixtures().await;
        let cart = carts.create().await.unwrap();
        carts.add_item(&cart.id, &product_id, 2).await.unwrap();
        let cart2 = carts.set_quantity(&cart.id, &product_id, 7).await.unwrap();
        assert_eq!(cart2.items[0].quantity, 7);
        let cart3 = carts.remove_item(&cart.id, &product_id).await.unwrap();
        assert!(cart3.items.is_empty());
    }
}
