//! Task completion transitions, time bounds, and block progress.
//!
//! Completing a block is two pure transitions over in-memory snapshots:
//! [`complete_all`] marks every incomplete task done, then [`reset_all`]
//! clears every task for the next cycle. [`cycle_block`] composes them and
//! reports both counts. The repository layer persists the resulting
//! snapshots inside one transaction.

use serde::Serialize;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Upper bound for estimated and actual minutes: one week.
pub const MAX_TASK_MINUTES: i32 = 10_080;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Estimated minutes must be positive and at most one week.
pub fn validate_estimated_minutes(minutes: i32) -> Result<(), CoreError> {
    if minutes <= 0 {
        return Err(CoreError::Validation(format!(
            "estimated_minutes must be positive, got {minutes}"
        )));
    }
    if minutes > MAX_TASK_MINUTES {
        return Err(CoreError::Validation(format!(
            "estimated_minutes cannot exceed {MAX_TASK_MINUTES} (1 week), got {minutes}"
        )));
    }
    Ok(())
}

/// Actual minutes must be non-negative and at most one week.
pub fn validate_actual_minutes(minutes: i32) -> Result<(), CoreError> {
    if !(0..=MAX_TASK_MINUTES).contains(&minutes) {
        return Err(CoreError::Validation(format!(
            "actual_minutes must be between 0 and {MAX_TASK_MINUTES}, got {minutes}"
        )));
    }
    Ok(())
}

/// Positions are zero-based.
pub fn validate_position(position: i32) -> Result<(), CoreError> {
    if position < 0 {
        return Err(CoreError::Validation(format!(
            "position must be >= 0, got {position}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Completion transitions
// ---------------------------------------------------------------------------

/// The completion-related state of one task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskCompletion {
    pub task_id: DbId,
    pub completed: bool,
    pub completed_at: Option<Timestamp>,
    pub actual_minutes: Option<i32>,
}

impl TaskCompletion {
    /// Mark the task complete. `completed_at` is only stamped on a
    /// false -> true transition. Returns whether the task transitioned.
    pub fn mark_complete(&mut self, now: Timestamp) -> bool {
        if self.completed {
            return false;
        }
        self.completed = true;
        self.completed_at = Some(now);
        true
    }

    /// Mark the task incomplete and clear `completed_at`. Recorded
    /// `actual_minutes` are kept. Returns whether the task transitioned.
    pub fn mark_incomplete(&mut self) -> bool {
        let was_completed = self.completed;
        self.completed = false;
        self.completed_at = None;
        was_completed
    }
}

/// CompleteAll: mark every incomplete task complete at `now`.
///
/// Already-complete tasks are untouched. Returns how many tasks changed.
pub fn complete_all(tasks: &mut [TaskCompletion], now: Timestamp) -> usize {
    tasks
        .iter_mut()
        .map(|task| task.mark_complete(now))
        .filter(|changed| *changed)
        .count()
}

/// ResetAll: mark every task incomplete and clear its recorded time so the
/// next cycle starts fresh.
///
/// Returns how many tasks were complete before the reset.
pub fn reset_all(tasks: &mut [TaskCompletion]) -> usize {
    tasks
        .iter_mut()
        .map(|task| {
            task.actual_minutes = None;
            task.mark_incomplete()
        })
        .filter(|changed| *changed)
        .count()
}

/// Counts reported by one complete-and-reset cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CycleOutcome {
    /// Tasks that were still open and got completed this cycle.
    pub tasks_completed: usize,
    /// Tasks cleared for the next cycle. Always the block's task count.
    pub tasks_reset: usize,
}

/// CompleteAll followed by ResetAll.
///
/// Final state is always "every task incomplete", whatever the input.
pub fn cycle_block(tasks: &mut [TaskCompletion], now: Timestamp) -> CycleOutcome {
    let tasks_completed = complete_all(tasks, now);
    let tasks_reset = reset_all(tasks);
    CycleOutcome {
        tasks_completed,
        tasks_reset,
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// `100 * completed / total`, rounded to two decimals. Zero when `total` is zero.
pub fn completion_percentage(completed: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let pct = completed as f64 / total as f64 * 100.0;
    (pct * 100.0).round() / 100.0
}

/// Raw per-block task aggregates, as counted by the persistence layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressCounts {
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub total_estimated_minutes: i64,
    pub total_actual_minutes: i64,
    pub remaining_estimated_minutes: i64,
}

/// Live progress snapshot for one block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockProgress {
    pub block_id: DbId,
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub completion_percentage: f64,
    pub total_estimated_minutes: i64,
    pub total_actual_minutes: i64,
    pub remaining_estimated_minutes: i64,
    pub is_complete: bool,
}

impl BlockProgress {
    pub fn from_counts(block_id: DbId, counts: ProgressCounts) -> Self {
        Self {
            block_id,
            total_tasks: counts.total_tasks,
            completed_tasks: counts.completed_tasks,
            completion_percentage: completion_percentage(
                counts.completed_tasks,
                counts.total_tasks,
            ),
            total_estimated_minutes: counts.total_estimated_minutes,
            total_actual_minutes: counts.total_actual_minutes,
            remaining_estimated_minutes: counts.remaining_estimated_minutes,
            is_complete: counts.total_tasks > 0 && counts.completed_tasks == counts.total_tasks,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn at(secs: i64) -> Timestamp {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn open_task(id: DbId) -> TaskCompletion {
        TaskCompletion {
            task_id: id,
            completed: false,
            completed_at: None,
            actual_minutes: None,
        }
    }

    fn done_task(id: DbId, when: Timestamp, minutes: i32) -> TaskCompletion {
        TaskCompletion {
            task_id: id,
            completed: true,
            completed_at: Some(when),
            actual_minutes: Some(minutes),
        }
    }

    // -- validation ----------------------------------------------------------

    #[test]
    fn estimated_minutes_bounds() {
        assert!(validate_estimated_minutes(1).is_ok());
        assert!(validate_estimated_minutes(MAX_TASK_MINUTES).is_ok());
        assert!(validate_estimated_minutes(0).is_err());
        assert!(validate_estimated_minutes(-5).is_err());
        assert!(validate_estimated_minutes(MAX_TASK_MINUTES + 1).is_err());
    }

    #[test]
    fn actual_minutes_bounds() {
        assert!(validate_actual_minutes(0).is_ok());
        assert!(validate_actual_minutes(10_080).is_ok());
        assert!(validate_actual_minutes(10_081).is_err());
        assert!(validate_actual_minutes(-1).is_err());
    }

    #[test]
    fn negative_position_rejected() {
        assert!(validate_position(0).is_ok());
        assert!(validate_position(-1).is_err());
    }

    // -- single-task transitions ---------------------------------------------

    #[test]
    fn completing_twice_keeps_first_timestamp() {
        let mut task = open_task(1);
        assert!(task.mark_complete(at(100)));
        assert!(!task.mark_complete(at(200)));
        assert_eq!(task.completed_at, Some(at(100)));
    }

    #[test]
    fn uncomplete_keeps_actual_minutes() {
        let mut task = done_task(1, at(100), 25);
        assert!(task.mark_incomplete());
        assert!(!task.completed);
        assert_eq!(task.completed_at, None);
        assert_eq!(task.actual_minutes, Some(25));
    }

    // -- complete_all / reset_all --------------------------------------------

    #[test]
    fn complete_all_only_touches_open_tasks() {
        let mut tasks = vec![open_task(1), done_task(2, at(50), 10), open_task(3)];
        let changed = complete_all(&mut tasks, at(100));

        assert_eq!(changed, 2);
        assert!(tasks.iter().all(|t| t.completed));
        assert_eq!(tasks[1].completed_at, Some(at(50)));
        assert_eq!(tasks[0].completed_at, Some(at(100)));
    }

    #[test]
    fn reset_all_clears_everything() {
        let mut tasks = vec![done_task(1, at(50), 10), open_task(2)];
        let changed = reset_all(&mut tasks);

        assert_eq!(changed, 1);
        for task in &tasks {
            assert!(!task.completed);
            assert_eq!(task.completed_at, None);
            assert_eq!(task.actual_minutes, None);
        }
    }

    // -- cycle_block ---------------------------------------------------------

    #[test]
    fn cycle_reports_fresh_completions_and_full_reset() {
        // N = 4 tasks, k = 3 incomplete.
        let mut tasks = vec![
            open_task(1),
            open_task(2),
            done_task(3, at(10), 5),
            open_task(4),
        ];
        let outcome = cycle_block(&mut tasks, at(100));

        assert_eq!(
            outcome,
            CycleOutcome {
                tasks_completed: 3,
                tasks_reset: 4,
            }
        );
        assert!(tasks.iter().all(|t| !t.completed && t.completed_at.is_none()));
    }

    #[test]
    fn cycle_on_fully_completed_block() {
        let mut tasks = vec![done_task(1, at(10), 5), done_task(2, at(20), 5)];
        let outcome = cycle_block(&mut tasks, at(100));
        assert_eq!(outcome.tasks_completed, 0);
        assert_eq!(outcome.tasks_reset, 2);
    }

    #[test]
    fn cycle_on_empty_block() {
        let outcome = cycle_block(&mut [], at(100));
        assert_eq!(outcome.tasks_completed, 0);
        assert_eq!(outcome.tasks_reset, 0);
    }

    // -- progress ------------------------------------------------------------

    #[test]
    fn percentage_is_zero_without_tasks() {
        assert_eq!(completion_percentage(0, 0), 0.0);
    }

    #[test]
    fn percentage_rounds_to_two_decimals() {
        assert_eq!(completion_percentage(1, 3), 33.33);
        assert_eq!(completion_percentage(2, 3), 66.67);
        assert_eq!(completion_percentage(4, 4), 100.0);
    }

    #[test]
    fn empty_block_progress_is_not_complete() {
        let progress = BlockProgress::from_counts(9, ProgressCounts::default());
        assert_eq!(progress.completion_percentage, 0.0);
        assert!(!progress.is_complete);
    }

    #[test]
    fn progress_from_counts() {
        let progress = BlockProgress::from_counts(
            9,
            ProgressCounts {
                total_tasks: 4,
                completed_tasks: 1,
                total_estimated_minutes: 100,
                total_actual_minutes: 30,
                remaining_estimated_minutes: 75,
            },
        );
        assert_eq!(progress.completion_percentage, 25.0);
        assert_eq!(progress.remaining_estimated_minutes, 75);
        assert!(!progress.is_complete);
    }
}
