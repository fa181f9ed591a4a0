//! Storage and locking infrastructure behind the domain ports.

pub mod in_memory;
pub mod locks;
