//! Application layer: the engines that orchestrate the commerce core.
//!
//! Each engine acquires the process-local locks for the rows it will
//! mutate, then drives one storage transaction through the domain ports.
//! The registry lock serializes same-resource requests within the
//! process; the storage-level row locks inside the transaction are the
//! cross-process safety net.

pub mod checkout;
pub mod ledger;
