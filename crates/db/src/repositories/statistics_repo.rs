//! Read-only queue aggregates.

use nightshift_core::statistics::BlockStatistics;
use sqlx::PgPool;

pub struct StatisticsRepo;

impl StatisticsRepo {
    /// Count blocks by task state in one snapshot.
    pub async fn block_statistics(pool: &PgPool) -> Result<BlockStatistics, sqlx::Error> {
        let (total, with_tasks, active): (i64, i64, i64) = sqlx::query_as(
            "SELECT \
                COUNT(*), \
                COUNT(*) FILTER (WHERE EXISTS \
                    (SELECT 1 FROM tasks t WHERE t.block_id = b.id)), \
                COUNT(*) FILTER (WHERE EXISTS \
                    (SELECT 1 FROM tasks t WHERE t.block_id = b.id AND NOT t.completed)) \
             FROM blocks b",
        )
        .fetch_one(pool)
        .await?;

        Ok(BlockStatistics::from_counts(total, with_tasks, active))
    }
}
