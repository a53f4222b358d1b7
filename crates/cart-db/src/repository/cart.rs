//! # Cart Repository
//!
//! Database operations for carts and cart items.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cart Lifecycle                                    │
//! │                                                                         │
//! │  1. LOOKUP                                                             │
//! │     └── get_by_owner() → Option<CartSnapshot> (items by position)      │
//! │                                                                         │
//! │  2. FIRST SAVE                                                         │
//! │     └── insert_cart() → PersistedCart (cart + items, one transaction)  │
//! │                                                                         │
//! │  3. LATER SAVES                                                        │
//! │     └── update_totals()      → derived totals                          │
//! │     └── insert_item()        → appended at the next position           │
//! │     └── set_item_quantity()  → one item                                │
//! │     └── delete_item()        → one item                                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use cart_core::{
    CartSnapshot, CartTotals, ItemRecord, Money, OwnerContext, Percentage, PersistedCart,
};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};

// =============================================================================
// Rows
// =============================================================================

/// A row of the `carts` table.
#[derive(Debug, Clone, FromRow)]
pub struct CartRow {
    pub id: String,
    pub owner_key: String,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub discount_percentage_bps: i64,
    pub coupon_id: Option<String>,
    pub shipping_charges_cents: i64,
    pub net_total_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub round_off_cents: i64,
    pub payable_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CartRow {
    /// Rebuilds the stored totals.
    pub fn totals(&self) -> DbResult<CartTotals> {
        let bps = u32::try_from(self.discount_percentage_bps)
            .map_err(|_| DbError::invalid_data("discount_percentage_bps", "out of range"))?;

        Ok(CartTotals {
            subtotal: Money::from_cents(self.subtotal_cents),
            discount: Money::from_cents(self.discount_cents),
            discount_percentage: Percentage::from_bps(bps),
            coupon_id: self.coupon_id.clone(),
            shipping_charges: Money::from_cents(self.shipping_charges_cents),
            net_total: Money::from_cents(self.net_total_cents),
            tax: Money::from_cents(self.tax_cents),
            total: Money::from_cents(self.total_cents),
            round_off: Money::from_cents(self.round_off_cents),
            payable: Money::from_cents(self.payable_cents),
        })
    }
}

/// A row of the `cart_items` table.
#[derive(Debug, Clone, FromRow)]
pub struct ItemRow {
    pub id: String,
    pub cart_id: String,
    pub source_type: String,
    pub source_id: String,
    pub name: String,
    pub price_cents: i64,
    pub quantity: i64,
    pub position: i64,
}

impl TryFrom<ItemRow> for ItemRecord {
    type Error = DbError;

    fn try_from(row: ItemRow) -> DbResult<Self> {
        let quantity = u32::try_from(row.quantity)
            .ok()
            .filter(|quantity| *quantity >= 1)
            .ok_or_else(|| {
                DbError::invalid_data("quantity", format!("{} on item {}", row.quantity, row.id))
            })?;

        Ok(ItemRecord {
            id: Some(row.id),
            source_type: row.source_type,
            source_id: row.source_id,
            name: row.name,
            price: Money::from_cents(row.price_cents),
            quantity,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for cart database operations.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    /// Creates a new CartRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Loads the owner's cart with its items in display order.
    pub async fn get_by_owner(&self, owner: &OwnerContext) -> DbResult<Option<CartSnapshot>> {
        let cart: Option<CartRow> = sqlx::query_as(
            r#"
            SELECT
                id, owner_key,
                subtotal_cents, discount_cents, discount_percentage_bps, coupon_id,
                shipping_charges_cents, net_total_cents, tax_cents, total_cents,
                round_off_cents, payable_cents,
                created_at, updated_at
            FROM carts
            WHERE owner_key = ?1
            "#,
        )
        .bind(owner.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let Some(cart) = cart else {
            return Ok(None);
        };

        let items = self
            .items(&cart.id)
            .await?
            .into_iter()
            .map(ItemRecord::try_from)
            .collect::<DbResult<Vec<_>>>()?;

        Ok(Some(CartSnapshot {
            id: Some(cart.id.clone()),
            totals: cart.totals()?,
            items: Some(items),
        }))
    }

    /// Gets the item rows of a cart, ordered by position.
    pub async fn items(&self, cart_id: &str) -> DbResult<Vec<ItemRow>> {
        let items: Vec<ItemRow> = sqlx::query_as(
            r#"
            SELECT id, cart_id, source_type, source_id, name, price_cents, quantity, position
            FROM cart_items
            WHERE cart_id = ?1
            ORDER BY position
            "#,
        )
        .bind(cart_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Stores a new cart and its items in one transaction.
    ///
    /// Any cart the owner already had is deleted first, items included.
    pub async fn insert_cart(
        &self,
        owner: &OwnerContext,
        snapshot: &CartSnapshot,
    ) -> DbResult<PersistedCart> {
        let cart_id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let items = snapshot.items.as_deref().unwrap_or_default();
        let totals = &snapshot.totals;

        debug!(id = %cart_id, owner = %owner, items = items.len(), "Inserting cart");

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM carts WHERE owner_key = ?1")
            .bind(owner.as_str())
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO carts (
                id, owner_key,
                subtotal_cents, discount_cents, discount_percentage_bps, coupon_id,
                shipping_charges_cents, net_total_cents, tax_cents, total_cents,
                round_off_cents, payable_cents,
                created_at, updated_at
            ) VALUES (
                ?1, ?2,
                ?3, ?4, ?5, ?6,
                ?7, ?8, ?9, ?10,
                ?11, ?12,
                ?13, ?13
            )
            "#,
        )
        .bind(&cart_id)
        .bind(owner.as_str())
        .bind(totals.subtotal.cents())
        .bind(totals.discount.cents())
        .bind(i64::from(totals.discount_percentage.bps()))
        .bind(totals.coupon_id.as_deref())
        .bind(totals.shipping_charges.cents())
        .bind(totals.net_total.cents())
        .bind(totals.tax.cents())
        .bind(totals.total.cents())
        .bind(totals.round_off.cents())
        .bind(totals.payable.cents())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let mut item_ids = Vec::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            let item_id = Uuid::new_v4().to_string();

            sqlx::query(
                r#"
                INSERT INTO cart_items (
                    id, cart_id, source_type, source_id, name,
                    price_cents, quantity, position, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
                "#,
            )
            .bind(&item_id)
            .bind(&cart_id)
            .bind(&item.source_type)
            .bind(&item.source_id)
            .bind(&item.name)
            .bind(item.price.cents())
            .bind(i64::from(item.quantity))
            .bind(position as i64)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            item_ids.push(item_id);
        }

        tx.commit().await?;

        Ok(PersistedCart { cart_id, item_ids })
    }

    /// Overwrites the stored totals of a cart.
    pub async fn update_totals(&self, cart_id: &str, totals: &CartTotals) -> DbResult<()> {
        debug!(id = %cart_id, payable = %totals.payable, "Updating cart totals");

        let result = sqlx::query(
            r#"
            UPDATE carts SET
                subtotal_cents = ?2,
                discount_cents = ?3,
                discount_percentage_bps = ?4,
                coupon_id = ?5,
                shipping_charges_cents = ?6,
                net_total_cents = ?7,
                tax_cents = ?8,
                total_cents = ?9,
                round_off_cents = ?10,
                payable_cents = ?11,
                updated_at = ?12
            WHERE id = ?1
            "#,
        )
        .bind(cart_id)
        .bind(totals.subtotal.cents())
        .bind(totals.discount.cents())
        .bind(i64::from(totals.discount_percentage.bps()))
        .bind(totals.coupon_id.as_deref())
        .bind(totals.shipping_charges.cents())
        .bind(totals.net_total.cents())
        .bind(totals.tax.cents())
        .bind(totals.total.cents())
        .bind(totals.round_off.cents())
        .bind(totals.payable.cents())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Cart", cart_id));
        }

        Ok(())
    }

    /// Appends an item after the cart's last item and returns its id.
    pub async fn insert_item(&self, cart_id: &str, item: &ItemRecord) -> DbResult<String> {
        let item_id = Uuid::new_v4().to_string();

        debug!(
            id = %item_id,
            cart_id = %cart_id,
            source_id = %item.source_id,
            "Inserting cart item"
        );

        sqlx::query(
            r#"
            INSERT INTO cart_items (
                id, cart_id, source_type, source_id, name,
                price_cents, quantity, position, created_at, updated_at
            )
            SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7,
                COALESCE(MAX(position) + 1, 0), ?8, ?8
            FROM cart_items
            WHERE cart_id = ?2
            "#,
        )
        .bind(&item_id)
        .bind(cart_id)
        .bind(&item.source_type)
        .bind(&item.source_id)
        .bind(&item.name)
        .bind(item.price.cents())
        .bind(i64::from(item.quantity))
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(item_id)
    }

    /// Sets the quantity of one item.
    pub async fn set_item_quantity(&self, item_id: &str, quantity: u32) -> DbResult<()> {
        debug!(id = %item_id, quantity, "Updating cart item quantity");

        let result = sqlx::query(
            r#"
            UPDATE cart_items SET
                quantity = ?2,
                updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(item_id)
        .bind(i64::from(quantity))
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Cart item", item_id));
        }

        Ok(())
    }

    /// Deletes one item. Positions of the remaining items keep their order.
    pub async fn delete_item(&self, item_id: &str) -> DbResult<()> {
        debug!(id = %item_id, "Deleting cart item");

        let result = sqlx::query("DELETE FROM cart_items WHERE id = ?1")
            .bind(item_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Cart item", item_id));
        }

        Ok(())
    }

    /// Deletes the owner's cart and its items. Returns whether one existed.
    pub async fn delete_by_owner(&self, owner: &OwnerContext) -> DbResult<bool> {
        debug!(owner = %owner, "Deleting cart");

        let result = sqlx::query("DELETE FROM carts WHERE owner_key = ?1")
            .bind(owner.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn repo() -> CartRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().carts()
    }

    fn record(source_id: &str, price_cents: i64, quantity: u32) -> ItemRecord {
        ItemRecord {
            id: None,
            source_type: "product".to_string(),
            source_id: source_id.to_string(),
            name: format!("Product {}", source_id),
            price: Money::from_cents(price_cents),
            quantity,
        }
    }

    fn snapshot(items: Vec<ItemRecord>) -> CartSnapshot {
        let subtotal: i64 = items
            .iter()
            .map(|item| item.price.cents() * i64::from(item.quantity))
            .sum();

        CartSnapshot {
            id: None,
            totals: CartTotals {
                subtotal: Money::from_cents(subtotal),
                net_total: Money::from_cents(subtotal),
                total: Money::from_cents(subtotal),
                payable: Money::from_cents(subtotal),
                ..CartTotals::default()
            },
            items: Some(items),
        }
    }

    #[tokio::test]
    async fn test_missing_owner_has_no_cart() {
        let repo = repo().await;
        let owner = OwnerContext::from("nobody");

        assert_eq!(repo.get_by_owner(&owner).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_insert_and_load_cart() {
        let repo = repo().await;
        let owner = OwnerContext::from("session-1");
        let new_cart = snapshot(vec![record("a", 1000, 2), record("b", 500, 1)]);

        let persisted = repo.insert_cart(&owner, &new_cart).await.unwrap();
        assert_eq!(persisted.item_ids.len(), 2);

        let loaded = repo.get_by_owner(&owner).await.unwrap().unwrap();
        assert_eq!(loaded.id.as_deref(), Some(persisted.cart_id.as_str()));
        assert_eq!(loaded.totals, new_cart.totals);

        let items = loaded.items.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].source_id, "a");
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[0].id.as_deref(), Some(persisted.item_ids[0].as_str()));
        assert_eq!(items[1].price.cents(), 500);
    }

    #[tokio::test]
    async fn test_insert_replaces_previous_cart() {
        let repo = repo().await;
        let owner = OwnerContext::from("session-1");

        let first = repo.insert_cart(&owner, &snapshot(vec![record("a", 100, 1)])).await.unwrap();
        let second = repo.insert_cart(&owner, &snapshot(vec![])).await.unwrap();

        let loaded = repo.get_by_owner(&owner).await.unwrap().unwrap();
        assert_eq!(loaded.id, Some(second.cart_id));
        assert!(loaded.items.unwrap().is_empty());
        assert!(repo.items(&first.cart_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_totals() {
        let repo = repo().await;
        let owner = OwnerContext::from("session-1");
        let persisted = repo
            .insert_cart(&owner, &snapshot(vec![record("a", 4000, 1)]))
            .await
            .unwrap();

        let totals = CartTotals {
            subtotal: Money::from_cents(4000),
            discount: Money::from_cents(1000),
            discount_percentage: Percentage::from_bps(2500),
            coupon_id: Some("SPRING25".to_string()),
            net_total: Money::from_cents(3000),
            tax: Money::from_cents(300),
            total: Money::from_cents(3300),
            payable: Money::from_cents(3300),
            ..CartTotals::default()
        };
        repo.update_totals(&persisted.cart_id, &totals).await.unwrap();

        let loaded = repo.get_by_owner(&owner).await.unwrap().unwrap();
        assert_eq!(loaded.totals, totals);

        let err = repo.update_totals("ghost", &totals).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_item_operations_keep_order() {
        let repo = repo().await;
        let owner = OwnerContext::from("session-1");
        let persisted = repo
            .insert_cart(&owner, &snapshot(vec![record("a", 100, 1), record("b", 200, 1)]))
            .await
            .unwrap();

        let c_id = repo.insert_item(&persisted.cart_id, &record("c", 300, 1)).await.unwrap();
        repo.delete_item(&persisted.item_ids[0]).await.unwrap();
        repo.set_item_quantity(&c_id, 5).await.unwrap();
        let d_id = repo.insert_item(&persisted.cart_id, &record("d", 400, 1)).await.unwrap();

        let items = repo.get_by_owner(&owner).await.unwrap().unwrap().items.unwrap();
        let order: Vec<&str> = items.iter().map(|item| item.source_id.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "d"]);
        assert_eq!(items[1].quantity, 5);
        assert_eq!(items[2].id.as_deref(), Some(d_id.as_str()));
    }

    #[tokio::test]
    async fn test_unknown_items_are_not_found() {
        let repo = repo().await;

        assert!(matches!(
            repo.set_item_quantity("ghost", 2).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
        assert!(matches!(
            repo.delete_item("ghost").await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_item_for_missing_cart_violates_foreign_key() {
        let repo = repo().await;

        let err = repo.insert_item("ghost", &record("a", 100, 1)).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_negative_price_rejected_by_schema() {
        let repo = repo().await;
        let owner = OwnerContext::from("session-1");

        let err = repo
            .insert_cart(&owner, &snapshot(vec![record("a", -1, 1)]))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::CheckViolation { .. }));

        // The transaction rolled back.
        assert_eq!(repo.get_by_owner(&owner).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_by_owner() {
        let repo = repo().await;
        let owner = OwnerContext::from("session-1");
        let persisted = repo
            .insert_cart(&owner, &snapshot(vec![record("a", 100, 1)]))
            .await
            .unwrap();

        assert!(repo.delete_by_owner(&owner).await.unwrap());
        assert!(!repo.delete_by_owner(&owner).await.unwrap());
        assert!(repo.items(&persisted.cart_id).await.unwrap().is_empty());
    }
}
