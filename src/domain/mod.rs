//! Domain model: entities, value objects, and the storage ports the
//! application engines consume.

pub mod account;
pub mod cart;
pub mod order;
pub mod ports;
pub mod product;

/// Current wall-clock time as Unix milliseconds, the timestamp unit used
/// across the data model.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
