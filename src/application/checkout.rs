use crate::domain::cart::CartItem;
use crate::domain::order::{Order, OrderItem, OrderStatus};
use crate::domain::ports::{Page, StoreRef};
use crate::error::{CommerceError, Result};
use crate::infrastructure::locks::LockRegistry;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 100;

/// Converts cart selections into orders while decrementing stock.
///
/// Checkouts take the registry locks of every selected product in sorted
/// id order, so two checkouts over overlapping products serialize on
/// their common keys while disjoint checkouts run in parallel, and
/// overlapping selections can never deadlock. Inside the storage
/// transaction each product row is additionally read under a row-level
/// lock, which also guards against stock writers outside this engine.
#[derive(Clone)]
pub struct CheckoutEngine {
    store: StoreRef,
    locks: Arc<LockRegistry>,
}

impl CheckoutEngine {
    pub fn new(store: StoreRef, locks: Arc<LockRegistry>) -> Self {
        Self { store, locks }
    }

    /// Places an order for the given cart items.
    ///
    /// The selection must be a precise subset of the live cart: any id
    /// not currently present fails the whole call with `ItemsNotInCart`.
    /// On any failure the storage transaction rolls back; no stock
    /// decrement, order row, or cart mutation survives.
    #[instrument(skip(self, selected_item_ids), fields(selected = selected_item_ids.len()))]
    pub async fn create_order(
        &self,
        user_id: Uuid,
        cart_id: Uuid,
        selected_item_ids: &[Uuid],
    ) -> Result<Order> {
        if selected_item_ids.is_empty() {
            return Err(CommerceError::InvalidSelection);
        }

        let cart = self.store.get_or_create_cart(user_id).await?;
        if cart.id != cart_id {
            return Err(CommerceError::CartNotFound);
        }

        let mut seen = HashSet::new();
        let mut selected: Vec<CartItem> = Vec::with_capacity(selected_item_ids.len());
        let mut missing = Vec::new();
        for &item_id in selected_item_ids {
            if !seen.insert(item_id) {
                return Err(CommerceError::InvalidSelection);
            }
            match cart.item(item_id) {
                Some(item) => selected.push(item.clone()),
                None => missing.push(item_id),
            }
        }
        if !missing.is_empty() {
            return Err(CommerceError::ItemsNotInCart { item_ids: missing });
        }

        // Sorted acquisition order makes overlapping checkouts conflict
        // on their first common product instead of deadlocking.
        let mut product_ids: Vec<Uuid> = selected.iter().map(|item| item.product_id).collect();
        product_ids.sort();
        product_ids.dedup();
        let mut product_locks = Vec::with_capacity(product_ids.len());
        for product_id in &product_ids {
            product_locks.push(self.locks.acquire(&format!("product:{product_id}")).await);
        }

        let mut tx = self.store.begin().await?;
        let order_id = Uuid::new_v4();
        let mut items = Vec::with_capacity(selected.len());
        for cart_item in &selected {
            let product = tx.product_for_update(cart_item.product_id).await?;
            if product.stock < cart_item.quantity {
                return Err(CommerceError::InsufficientStock {
                    product: product.name,
                    available: product.stock,
                    requested: cart_item.quantity,
                });
            }
            tx.update_stock(product.id, product.stock - cart_item.quantity)
                .await?;
            items.push(OrderItem::snapshot(order_id, &product, cart_item.quantity));
        }

        let order = Order::new(order_id, user_id, cart.id, items)?;
        tx.insert_order(&order).await?;
        tx.insert_order_items(&order.items).await?;
        for cart_item in &selected {
            tx.delete_cart_item(cart_item.id).await?;
            debug!(item_id = %cart_item.id, "cart item consumed");
        }
        tx.commit().await?;

        info!(
            %order_id,
            %user_id,
            total_amount = order.total_amount,
            items = order.items.len(),
            "order created"
        );
        Ok(order)
    }

    /// Moves an order along its lifecycle, asserting ownership and the
    /// transition graph. Entering `Paid` stamps `paid_at`.
    #[instrument(skip(self))]
    pub async fn update_order_status(
        &self,
        user_id: Uuid,
        order_id: Uuid,
        new_status: OrderStatus,
    ) -> Result<Order> {
        let mut order = self
            .store
            .get_order(order_id)
            .await?
            .ok_or(CommerceError::OrderNotFound)?;
        if order.user_id != user_id {
            return Err(CommerceError::Unauthorized);
        }
        order.transition(new_status)?;
        self.store.update_order(order.clone()).await?;
        info!(%order_id, status = %order.status, "order status updated");
        Ok(order)
    }

    /// Ownership-checked single-order read.
    pub async fn get_order(&self, user_id: Uuid, order_id: Uuid) -> Result<Order> {
        let order = self
            .store
            .get_order(order_id)
            .await?
            .ok_or(CommerceError::OrderNotFound)?;
        if order.user_id != user_id {
            return Err(CommerceError::Unauthorized);
        }
        Ok(order)
    }

    /// Newest-first page of the user's orders. Page is clamped to >= 1
    /// and limit to 1..=100 (0 means the default of 10).
    pub async fn get_user_orders(
        &self,
        user_id: Uuid,
        page: u32,
        limit: u32,
    ) -> Result<Page<Order>> {
        let page = page.max(1);
        let per_page = match limit {
            0 => DEFAULT_PAGE_SIZE,
            n => n.min(MAX_PAGE_SIZE),
        };
        let offset = u64::from(page - 1) * u64::from(per_page);
        let (items, total_count) = self.store.get_user_orders(user_id, offset, per_page).await?;
        Ok(Page {
            items,
            total_count,
            page,
            per_page,
        })
    }
}
