use crate::domain::order::OrderStatus;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, CommerceError>;

/// Failure modes of the commerce core.
///
/// Validation and authorization variants are raised before any lock or
/// storage transaction is taken; conflict variants mean the request was
/// well-formed but the current state forbids it.
#[derive(Error, Debug)]
pub enum CommerceError {
    #[error("transaction amount out of range")]
    InvalidAmount,
    #[error("no cart items selected")]
    InvalidSelection,
    #[error("account not found")]
    AccountNotFound,
    #[error("product not found")]
    ProductNotFound,
    #[error("order not found")]
    OrderNotFound,
    #[error("cart not found")]
    CartNotFound,
    #[error("account already exists for user")]
    AccountAlreadyExists,
    #[error("insufficient balance (available: {available}, requested: {requested})")]
    InsufficientBalance { available: i64, requested: i64 },
    #[error("insufficient stock for product: {product} (available: {available}, requested: {requested})")]
    InsufficientStock {
        product: String,
        available: u32,
        requested: u32,
    },
    #[error("selected items not in cart: {item_ids:?}")]
    ItemsNotInCart { item_ids: Vec<Uuid> },
    #[error("invalid order status transition: {from} -> {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },
    #[error("unauthorized")]
    Unauthorized,
    #[error("storage error: {0}")]
    Storage(String),
}
