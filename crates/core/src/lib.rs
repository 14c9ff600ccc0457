//! Domain rules for the Night Shift block queue.
//!
//! This crate has zero internal dependencies and performs no I/O, so every
//! rule here can be exercised without a database.

pub mod block_queue;
pub mod category;
pub mod error;
pub mod pagination;
pub mod statistics;
pub mod task_ledger;
pub mod types;
