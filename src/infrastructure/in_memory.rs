use crate::domain::account::{Account, MoneyTransaction, TransactionStatus};
use crate::domain::cart::{Cart, CartItem};
use crate::domain::now_millis;
use crate::domain::order::{Order, OrderItem};
use crate::domain::ports::{CommerceStore, StorageTx};
use crate::domain::product::Product;
use crate::error::{CommerceError, Result};
use crate::infrastructure::locks::LockRegistry;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{OwnedMutexGuard, RwLock};
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    accounts: HashMap<Uuid, Account>,
    money_transactions: Vec<MoneyTransaction>,
    products: HashMap<Uuid, Product>,
    // Cart and order rows are stored without their items; `cart_items`
    // and `order_items` are the source of truth, assembled on read.
    carts: HashMap<Uuid, Cart>,
    cart_items: Vec<CartItem>,
    orders: HashMap<Uuid, Order>,
    order_items: Vec<OrderItem>,
}

impl Tables {
    fn assemble_cart(&self, cart: &Cart) -> Cart {
        let mut cart = cart.clone();
        cart.items = self
            .cart_items
            .iter()
            .filter(|item| item.cart_id == cart.id)
            .cloned()
            .collect();
        cart
    }

    fn assemble_order(&self, order: &Order) -> Order {
        let mut order = order.clone();
        order.items = self
            .order_items
            .iter()
            .filter(|item| item.order_id == order.id)
            .cloned()
            .collect();
        order
    }
}

/// A thread-safe in-memory implementation of the storage ports.
///
/// Tables live behind one `RwLock`; a [`StorageTx`] stages its writes in
/// a buffer and applies them under the write lock at commit, so a
/// transaction's effects become visible atomically or not at all. Row
/// locks are an internal [`LockRegistry`] whose guards the transaction
/// holds until it ends, mirroring SELECT ... FOR UPDATE semantics.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
    row_locks: Arc<LockRegistry>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommerceStore for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn StorageTx>> {
        Ok(Box::new(MemoryTx {
            tables: Arc::clone(&self.tables),
            row_locks: Arc::clone(&self.row_locks),
            guards: HashMap::new(),
            staged: Staged::default(),
        }))
    }

    async fn insert_account(&self, account: Account) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables
            .accounts
            .values()
            .any(|existing| existing.user_id == account.user_id)
        {
            return Err(CommerceError::AccountAlreadyExists);
        }
        tables.accounts.insert(account.id, account);
        Ok(())
    }

    async fn get_account(&self, id: Uuid) -> Result<Option<Account>> {
        let tables = self.tables.read().await;
        Ok(tables.accounts.get(&id).cloned())
    }

    async fn get_account_by_user(&self, user_id: Uuid) -> Result<Option<Account>> {
        let tables = self.tables.read().await;
        Ok(tables
            .accounts
            .values()
            .find(|account| account.user_id == user_id)
            .cloned())
    }

    async fn get_money_transactions(&self, account_id: Uuid) -> Result<Vec<MoneyTransaction>> {
        let tables = self.tables.read().await;
        Ok(tables
            .money_transactions
            .iter()
            .filter(|record| record.account_id == account_id)
            .cloned()
            .collect())
    }

    async fn insert_product(&self, product: Product) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.products.insert(product.id, product);
        Ok(())
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>> {
        let tables = self.tables.read().await;
        Ok(tables.products.get(&id).cloned())
    }

    async fn update_product(&self, product: Product) -> Result<()> {
        let mut tables = self.tables.write().await;
        if !tables.products.contains_key(&product.id) {
            return Err(CommerceError::ProductNotFound);
        }
        tables.products.insert(product.id, product);
        Ok(())
    }

    async fn get_or_create_cart(&self, user_id: Uuid) -> Result<Cart> {
        {
            let tables = self.tables.read().await;
            if let Some(cart) = tables.carts.values().find(|cart| cart.user_id == user_id) {
                return Ok(tables.assemble_cart(cart));
            }
        }
        let mut tables = self.tables.write().await;
        // Re-check under the write lock; a concurrent caller may have
        // created the cart between the two lock acquisitions.
        if let Some(cart) = tables.carts.values().find(|cart| cart.user_id == user_id) {
            return Ok(tables.assemble_cart(cart));
        }
        let cart = Cart::new(user_id);
        tables.carts.insert(cart.id, cart.clone());
        Ok(cart)
    }

    async fn add_cart_item(&self, item: CartItem) -> Result<()> {
        let mut tables = self.tables.write().await;
        let cart_id = item.cart_id;
        if !tables.carts.contains_key(&cart_id) {
            return Err(CommerceError::CartNotFound);
        }
        tables.cart_items.push(item);
        if let Some(cart) = tables.carts.get_mut(&cart_id) {
            cart.updated_at = now_millis();
        }
        Ok(())
    }

    async fn remove_cart_item(&self, item_id: Uuid) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.cart_items.retain(|item| item.id != item_id);
        Ok(())
    }

    async fn get_order(&self, id: Uuid) -> Result<Option<Order>> {
        let tables = self.tables.read().await;
        Ok(tables
            .orders
            .get(&id)
            .map(|order| tables.assemble_order(order)))
    }

    async fn update_order(&self, order: Order) -> Result<()> {
        let mut tables = self.tables.write().await;
        let row = tables
            .orders
            .get_mut(&order.id)
            .ok_or(CommerceError::OrderNotFound)?;
        row.status = order.status;
        row.updated_at = order.updated_at;
        row.paid_at = order.paid_at;
        Ok(())
    }

    async fn get_user_orders(
        &self,
        user_id: Uuid,
        offset: u64,
        limit: u32,
    ) -> Result<(Vec<Order>, u64)> {
        let tables = self.tables.read().await;
        let mut rows: Vec<&Order> = tables
            .orders
            .values()
            .filter(|order| order.user_id == user_id)
            .collect();
        // Millisecond timestamps can collide; the id tie-break keeps the
        // ordering deterministic.
        rows.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        let total = rows.len() as u64;
        let page = rows
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|order| tables.assemble_order(order))
            .collect();
        Ok((page, total))
    }
}

#[derive(Default)]
struct Staged {
    balances: HashMap<Uuid, i64>,
    money_transactions: Vec<MoneyTransaction>,
    transaction_status: HashMap<Uuid, TransactionStatus>,
    stock: HashMap<Uuid, u32>,
    orders: Vec<Order>,
    order_items: Vec<OrderItem>,
    deleted_cart_items: Vec<Uuid>,
}

/// Write-buffer transaction over [`InMemoryStore`].
///
/// Locking reads take the row's lock (re-entrant within one transaction)
/// and overlay this transaction's own staged writes on the committed
/// state. Dropped without commit, the buffer is discarded and the row
/// locks released.
struct MemoryTx {
    tables: Arc<RwLock<Tables>>,
    row_locks: Arc<LockRegistry>,
    guards: HashMap<String, OwnedMutexGuard<()>>,
    staged: Staged,
}

impl MemoryTx {
    async fn lock_row(&mut self, key: String) {
        if !self.guards.contains_key(&key) {
            let guard = self.row_locks.acquire(&key).await;
            self.guards.insert(key, guard);
        }
    }

    fn holds_row(&self, key: &str) -> bool {
        self.guards.contains_key(key)
    }
}

#[async_trait]
impl StorageTx for MemoryTx {
    async fn account_for_update(&mut self, id: Uuid) -> Result<Account> {
        self.lock_row(format!("account:{id}")).await;
        let tables = self.tables.read().await;
        let mut account = tables
            .accounts
            .get(&id)
            .cloned()
            .ok_or(CommerceError::AccountNotFound)?;
        if let Some(balance) = self.staged.balances.get(&id) {
            account.balance = *balance;
        }
        Ok(account)
    }

    async fn update_balance(&mut self, id: Uuid, new_balance: i64) -> Result<()> {
        // Invariant: balances are only written behind the row lock taken
        // by `account_for_update`.
        if !self.holds_row(&format!("account:{id}")) {
            return Err(CommerceError::Storage(
                "balance write without a locking read".into(),
            ));
        }
        let tables = self.tables.read().await;
        if !tables.accounts.contains_key(&id) {
            return Err(CommerceError::AccountNotFound);
        }
        drop(tables);
        self.staged.balances.insert(id, new_balance);
        Ok(())
    }

    async fn insert_money_transaction(&mut self, record: MoneyTransaction) -> Result<()> {
        self.staged.money_transactions.push(record);
        Ok(())
    }

    async fn set_money_transaction_status(
        &mut self,
        id: Uuid,
        status: TransactionStatus,
    ) -> Result<()> {
        self.staged.transaction_status.insert(id, status);
        Ok(())
    }

    async fn product_for_update(&mut self, id: Uuid) -> Result<Product> {
        self.lock_row(format!("product:{id}")).await;
        let tables = self.tables.read().await;
        let mut product = tables
            .products
            .get(&id)
            .cloned()
            .ok_or(CommerceError::ProductNotFound)?;
        if let Some(stock) = self.staged.stock.get(&id) {
            product.stock = *stock;
        }
        Ok(product)
    }

    async fn update_stock(&mut self, id: Uuid, new_stock: u32) -> Result<()> {
        if !self.holds_row(&format!("product:{id}")) {
            return Err(CommerceError::Storage(
                "stock write without a locking read".into(),
            ));
        }
        let tables = self.tables.read().await;
        if !tables.products.contains_key(&id) {
            return Err(CommerceError::ProductNotFound);
        }
        drop(tables);
        self.staged.stock.insert(id, new_stock);
        Ok(())
    }

    async fn insert_order(&mut self, order: &Order) -> Result<()> {
        self.staged.orders.push(order.clone());
        Ok(())
    }

    async fn insert_order_items(&mut self, items: &[OrderItem]) -> Result<()> {
        self.staged.order_items.extend_from_slice(items);
        Ok(())
    }

    async fn delete_cart_item(&mut self, item_id: Uuid) -> Result<()> {
        self.staged.deleted_cart_items.push(item_id);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let this = *self;
        let now = now_millis();
        let mut tables = this.tables.write().await;

        for (id, balance) in &this.staged.balances {
            if let Some(account) = tables.accounts.get_mut(id) {
                account.balance = *balance;
                account.updated_at = now;
            }
        }
        for (id, stock) in &this.staged.stock {
            if let Some(product) = tables.products.get_mut(id) {
                product.stock = *stock;
            }
        }

        let inserted: HashSet<Uuid> = this
            .staged
            .money_transactions
            .iter()
            .map(|record| record.id)
            .collect();
        for mut record in this.staged.money_transactions {
            if let Some(status) = this.staged.transaction_status.get(&record.id) {
                record.status = *status;
            }
            tables.money_transactions.push(record);
        }
        for (id, status) in &this.staged.transaction_status {
            if inserted.contains(id) {
                continue;
            }
            if let Some(record) = tables
                .money_transactions
                .iter_mut()
                .find(|record| record.id == *id)
            {
                record.status = *status;
            }
        }

        for mut order in this.staged.orders {
            order.items.clear();
            tables.orders.insert(order.id, order);
        }
        tables.order_items.extend(this.staged.order_items);

        let deleted: HashSet<Uuid> = this.staged.deleted_cart_items.into_iter().collect();
        tables.cart_items.retain(|item| !deleted.contains(&item.id));

        // Row locks in `this.guards` release when `this` drops, after
        // the write lock above.
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        // Dropping the buffer discards all staged writes and releases
        // the row locks.
        Ok(())
    }
}
