use crate::domain::account::{Account, MoneyTransaction, TransactionStatus};
use crate::domain::cart::{Cart, CartItem};
use crate::domain::order::{Order, OrderItem};
use crate::domain::product::Product;
use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

pub type StoreRef = Arc<dyn CommerceStore>;

/// One page of results plus paging metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page: u32,
    pub per_page: u32,
}

/// The storage capability the engines consume.
///
/// Plain reads and writes run outside any transaction; everything that
/// must be atomic with a balance or stock mutation goes through a
/// [`StorageTx`] obtained from [`CommerceStore::begin`].
#[async_trait]
pub trait CommerceStore: Send + Sync {
    /// Opens a storage transaction. Writes staged on the returned handle
    /// become visible atomically at commit.
    async fn begin(&self) -> Result<Box<dyn StorageTx>>;

    /// Fails with `AccountAlreadyExists` if the user already has one.
    async fn insert_account(&self, account: Account) -> Result<()>;
    async fn get_account(&self, id: Uuid) -> Result<Option<Account>>;
    async fn get_account_by_user(&self, user_id: Uuid) -> Result<Option<Account>>;
    /// Audit trail for one account, oldest first.
    async fn get_money_transactions(&self, account_id: Uuid) -> Result<Vec<MoneyTransaction>>;

    async fn insert_product(&self, product: Product) -> Result<()>;
    async fn get_product(&self, id: Uuid) -> Result<Option<Product>>;
    async fn update_product(&self, product: Product) -> Result<()>;

    /// Returns the user's cart with its items in insertion order,
    /// creating an empty cart on first access.
    async fn get_or_create_cart(&self, user_id: Uuid) -> Result<Cart>;
    async fn add_cart_item(&self, item: CartItem) -> Result<()>;
    async fn remove_cart_item(&self, item_id: Uuid) -> Result<()>;

    async fn get_order(&self, id: Uuid) -> Result<Option<Order>>;
    /// Persists status, `updated_at`, and `paid_at`; items are immutable.
    async fn update_order(&self, order: Order) -> Result<()>;
    /// Newest-first page of a user's orders plus the total count.
    async fn get_user_orders(
        &self,
        user_id: Uuid,
        offset: u64,
        limit: u32,
    ) -> Result<(Vec<Order>, u64)>;
}

/// An open storage transaction: the unit-of-work boundary.
///
/// `*_for_update` reads take a row-level lock held until the transaction
/// ends, so no concurrent transaction can read the same row for update
/// before this one commits or rolls back. Dropping the handle without
/// committing is a rollback and releases all row locks.
#[async_trait]
pub trait StorageTx: Send {
    /// Locking read of an account row; `AccountNotFound` if missing.
    async fn account_for_update(&mut self, id: Uuid) -> Result<Account>;
    async fn update_balance(&mut self, id: Uuid, new_balance: i64) -> Result<()>;
    async fn insert_money_transaction(&mut self, record: MoneyTransaction) -> Result<()>;
    async fn set_money_transaction_status(
        &mut self,
        id: Uuid,
        status: TransactionStatus,
    ) -> Result<()>;

    /// Locking read of a product row; `ProductNotFound` if missing.
    async fn product_for_update(&mut self, id: Uuid) -> Result<Product>;
    async fn update_stock(&mut self, id: Uuid, new_stock: u32) -> Result<()>;

    async fn insert_order(&mut self, order: &Order) -> Result<()>;
    /// Batched insert of the order's line items.
    async fn insert_order_items(&mut self, items: &[OrderItem]) -> Result<()>;
    /// Deleting an item that no longer exists is a no-op.
    async fn delete_cart_item(&mut self, item_id: Uuid) -> Result<()>;

    async fn commit(self: Box<Self>) -> Result<()>;
    async fn rollback(self: Box<Self>) -> Result<()>;
}
