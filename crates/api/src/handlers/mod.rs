pub mod blocks;
pub mod categories;
pub mod quotes;
pub mod tasks;
