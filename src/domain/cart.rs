use crate::domain::now_millis;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One product-quantity entry in a cart.
///
/// Consumed (deleted) by a successful checkout of the order it
/// contributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub product_id: Uuid,
    pub quantity: u32,
    pub created_at: i64,
}

impl CartItem {
    pub fn new(cart_id: Uuid, product_id: Uuid, quantity: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            cart_id,
            product_id,
            quantity,
            created_at: now_millis(),
        }
    }
}

/// A user's shopping cart, created lazily on first access.
///
/// Items keep insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<CartItem>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Cart {
    pub fn new(user_id: Uuid) -> Self {
        let now = now_millis();
        Self {
            id: Uuid::new_v4(),
            user_id,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn item(&self, item_id: Uuid) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == item_id)
    }
}
