//! Queue-wide block statistics.

use serde::Serialize;

/// Aggregate block counts, recomputed from current state on every call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BlockStatistics {
    pub total_blocks: i64,
    /// Blocks that have tasks and none of them incomplete.
    pub completed_blocks: i64,
    /// Blocks with at least one incomplete task.
    pub active_blocks: i64,
    pub blocks_with_no_tasks: i64,
}

impl BlockStatistics {
    /// Derive the statistics from three counts taken in the same snapshot.
    pub fn from_counts(total_blocks: i64, blocks_with_tasks: i64, active_blocks: i64) -> Self {
        Self {
            total_blocks,
            completed_blocks: (blocks_with_tasks - active_blocks).max(0),
            active_blocks,
            blocks_with_no_tasks: (total_blocks - blocks_with_tasks).max(0),
        }
    }
}
