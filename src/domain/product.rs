use crate::domain::now_millis;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A catalog product with a finite stock count.
///
/// Stock is decremented only inside the checkout engine, under a
/// row-level lock for the duration of the enclosing storage transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub sku: String,
    pub stock: u32,
    /// Unit price in minor units.
    pub price: i64,
    pub created_at: i64,
}

impl Product {
    pub fn new(name: impl Into<String>, sku: impl Into<String>, price: i64, stock: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            sku: sku.into(),
            stock,
            price,
            created_at: now_millis(),
        }
    }
}
