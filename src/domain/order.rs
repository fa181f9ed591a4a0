use crate::domain::now_millis;
use crate::domain::product::Product;
use crate::error::CommerceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Shipped,
    Complete,
    Canceled,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Canceled)
    }

    /// Whether `next` is a legal successor in the order lifecycle:
    /// pending -> paid -> shipped -> complete, with canceled reachable
    /// from any non-terminal state.
    pub fn can_transition_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Pending, Self::Paid)
            | (Self::Paid, Self::Shipped)
            | (Self::Shipped, Self::Complete) => true,
            (from, Self::Canceled) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Shipped => "shipped",
            Self::Complete => "complete",
            Self::Canceled => "canceled",
        };
        f.write_str(name)
    }
}

/// A frozen snapshot of a product at purchase time.
///
/// Price and quantity are decoupled from the live product row, so later
/// catalog changes never retroactively alter a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: u32,
    /// Unit price in minor units, at the time of purchase.
    pub price: i64,
    pub created_at: i64,
}

impl OrderItem {
    pub fn snapshot(order_id: Uuid, product: &Product, quantity: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            product_id: product.id,
            quantity,
            price: product.price,
            created_at: now_millis(),
        }
    }

    pub fn line_total(&self) -> Option<i64> {
        self.price.checked_mul(i64::from(self.quantity))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub cart_id: Uuid,
    pub status: OrderStatus,
    /// Always equal to the sum of `items` line totals; enforced at
    /// construction and only mutated through [`Order::transition`].
    pub total_amount: i64,
    pub items: Vec<OrderItem>,
    pub created_at: i64,
    pub updated_at: i64,
    pub paid_at: Option<i64>,
}

impl Order {
    /// Builds a pending order from its item snapshots, computing the
    /// total. Fails only if the total overflows `i64`.
    pub fn new(
        id: Uuid,
        user_id: Uuid,
        cart_id: Uuid,
        items: Vec<OrderItem>,
    ) -> Result<Self, CommerceError> {
        let mut total_amount: i64 = 0;
        for item in &items {
            let line = item
                .line_total()
                .ok_or_else(|| CommerceError::Storage("order total overflow".into()))?;
            total_amount = total_amount
                .checked_add(line)
                .ok_or_else(|| CommerceError::Storage("order total overflow".into()))?;
        }
        let now = now_millis();
        Ok(Self {
            id,
            user_id,
            cart_id,
            status: OrderStatus::Pending,
            total_amount,
            items,
            created_at: now,
            updated_at: now,
            paid_at: None,
        })
    }

    /// Moves the order to `next`, rejecting transitions outside the
    /// lifecycle graph. Entering `Paid` stamps `paid_at`.
    pub fn transition(&mut self, next: OrderStatus) -> Result<(), CommerceError> {
        if !self.status.can_transition_to(next) {
            return Err(CommerceError::InvalidStatusTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = now_millis();
        if next == OrderStatus::Paid {
            self.paid_at = Some(self.updated_at);
        }
        Ok(())
    }
}
