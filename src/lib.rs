//! Transactional core of an e-commerce backend.
//!
//! Two engines carry the load-bearing logic: the [ledger
//! engine](application::ledger) mutates account balances while appending
//! an auditable transaction log, and the [checkout
//! engine](application::checkout) converts cart selections into orders
//! while decrementing finite product stock. Both serialize read-modify-
//! write cycles on shared rows through a keyed
//! [lock registry](infrastructure::locks) and drive an explicit storage
//! transaction defined by the [ports](domain::ports).

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
