//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod block;
pub mod category;
pub mod quote;
pub mod task;

use nightshift_core::types::DbId;
use serde::Serialize;

/// Outcome of a bulk reorder: which ids were rewritten and which did not exist.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReorderResult {
    pub updated: Vec<DbId>,
    pub missing: Vec<DbId>,
}
