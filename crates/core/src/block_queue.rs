//! Block queue numbering policy and block field rules.
//!
//! Blocks form a single queue ordered by `block_number` ascending. Numbers
//! live in the closed range `1..=15` and cycle: requeueing a block after the
//! current maximum wraps back to `1` instead of growing without bound.

use serde::Serialize;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Lowest valid queue position.
pub const MIN_BLOCK_NUMBER: i32 = 1;

/// Highest valid queue position. Also the queue capacity for auto-numbering.
pub const MAX_BLOCK_NUMBER: i32 = 15;

/// First day of the rotation.
pub const MIN_DAY_NUMBER: i32 = 1;

/// Last day of the rotation.
pub const MAX_DAY_NUMBER: i32 = 5;

/// Maximum length of a block title.
pub const MAX_BLOCK_TITLE_LEN: usize = 200;

/// PostgreSQL advisory lock ID serializing every operation that reads
/// `MAX(block_number)` and writes a number derived from it.
pub const QUEUE_LOCK_ID: i64 = 735_120_915;

// ---------------------------------------------------------------------------
// BlockNumber
// ---------------------------------------------------------------------------

/// A queue position guaranteed to be within `1..=15`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct BlockNumber(i32);

impl BlockNumber {
    pub const FIRST: BlockNumber = BlockNumber(MIN_BLOCK_NUMBER);
    pub const LAST: BlockNumber = BlockNumber(MAX_BLOCK_NUMBER);

    /// Validate a caller-supplied block number.
    pub fn new(value: i32) -> Result<Self, CoreError> {
        if (MIN_BLOCK_NUMBER..=MAX_BLOCK_NUMBER).contains(&value) {
            Ok(Self(value))
        } else {
            Err(CoreError::Validation(format!(
                "block_number must be between {MIN_BLOCK_NUMBER} and {MAX_BLOCK_NUMBER}, got {value}"
            )))
        }
    }

    pub fn get(self) -> i32 {
        self.0
    }

    /// The position one past `current_max`, wrapping `15 -> 1`.
    ///
    /// `None` (an empty queue) yields [`BlockNumber::FIRST`]. Values outside
    /// the range are folded back into it rather than rejected, so legacy rows
    /// can never push the queue out of bounds.
    pub fn next_after(current_max: Option<i32>) -> Self {
        match current_max {
            Some(max) => Self(max.rem_euclid(MAX_BLOCK_NUMBER) + 1),
            None => Self::FIRST,
        }
    }

    /// The cyclic successor of this position.
    pub fn successor(self) -> Self {
        Self::next_after(Some(self.0))
    }
}

impl std::fmt::Display for BlockNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pick the block number for a newly created (or cloned) block.
///
/// Starts at [`BlockNumber::next_after`] the current maximum and probes
/// forward cyclically until an unoccupied slot is found. Returns
/// [`CoreError::Capacity`] when all fifteen slots are taken.
pub fn assign_block_number(
    current_max: Option<i32>,
    occupied: &[i32],
) -> Result<BlockNumber, CoreError> {
    let mut candidate = BlockNumber::next_after(current_max);
    for _ in MIN_BLOCK_NUMBER..=MAX_BLOCK_NUMBER {
        if !occupied.contains(&candidate.get()) {
            return Ok(candidate);
        }
        candidate = candidate.successor();
    }
    Err(CoreError::Capacity(format!(
        "all {MAX_BLOCK_NUMBER} block numbers are in use; move or delete a block first"
    )))
}

// ---------------------------------------------------------------------------
// Field validation
// ---------------------------------------------------------------------------

/// Validate that a day number falls within the five-day rotation.
pub fn validate_day_number(day_number: i32) -> Result<(), CoreError> {
    if (MIN_DAY_NUMBER..=MAX_DAY_NUMBER).contains(&day_number) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "day_number must be between {MIN_DAY_NUMBER} and {MAX_DAY_NUMBER}, got {day_number}"
        )))
    }
}

/// Validate a block title: non-blank and at most [`MAX_BLOCK_TITLE_LEN`] chars.
pub fn validate_block_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("title must not be empty".to_string()));
    }
    if title.chars().count() > MAX_BLOCK_TITLE_LEN {
        return Err(CoreError::Validation(format!(
            "title must be at most {MAX_BLOCK_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    // -- BlockNumber::new ----------------------------------------------------

    #[test]
    fn accepts_range_bounds() {
        assert_eq!(BlockNumber::new(1).unwrap().get(), 1);
        assert_eq!(BlockNumber::new(15).unwrap().get(), 15);
    }

    #[test]
    fn rejects_zero_and_sixteen() {
        assert_matches!(BlockNumber::new(0), Err(CoreError::Validation(_)));
        assert_matches!(BlockNumber::new(16), Err(CoreError::Validation(_)));
        assert_matches!(BlockNumber::new(-3), Err(CoreError::Validation(_)));
    }

    // -- next_after ----------------------------------------------------------

    #[test]
    fn empty_queue_starts_at_one() {
        assert_eq!(BlockNumber::next_after(None), BlockNumber::FIRST);
    }

    #[test]
    fn increments_below_the_boundary() {
        assert_eq!(BlockNumber::next_after(Some(1)).get(), 2);
        assert_eq!(BlockNumber::next_after(Some(14)), BlockNumber::LAST);
    }

    #[test]
    fn wraps_at_fifteen() {
        assert_eq!(BlockNumber::next_after(Some(15)), BlockNumber::FIRST);
    }

    #[test]
    fn folds_out_of_range_maximums() {
        assert_eq!(BlockNumber::next_after(Some(0)).get(), 1);
        assert_eq!(BlockNumber::next_after(Some(30)).get(), 1);
        assert_eq!(BlockNumber::next_after(Some(-1)).get(), 15);
    }

    #[test]
    fn repeated_successors_stay_in_range() {
        let mut n = BlockNumber::FIRST;
        for _ in 0..100 {
            n = n.successor();
            assert!((MIN_BLOCK_NUMBER..=MAX_BLOCK_NUMBER).contains(&n.get()));
        }
        // 100 steps from 1 lands on 1 + (100 mod 15) = 11.
        assert_eq!(n.get(), 11);
    }

    // -- assign_block_number -------------------------------------------------

    #[test]
    fn assigns_one_past_max_when_free() {
        let n = assign_block_number(Some(3), &[1, 2, 3]).unwrap();
        assert_eq!(n.get(), 4);
    }

    #[test]
    fn wraps_to_first_free_slot() {
        let occupied: Vec<i32> = (1..=15).filter(|n| *n != 4).collect();
        let n = assign_block_number(Some(15), &occupied).unwrap();
        assert_eq!(n.get(), 4);
    }

    #[test]
    fn wrap_target_free_is_used_directly() {
        let n = assign_block_number(Some(15), &[2, 15]).unwrap();
        assert_eq!(n.get(), 1);
    }

    #[test]
    fn full_queue_is_capacity_error() {
        let occupied: Vec<i32> = (1..=15).collect();
        assert_matches!(
            assign_block_number(Some(15), &occupied),
            Err(CoreError::Capacity(_))
        );
    }

    // -- validate_day_number -------------------------------------------------

    #[test]
    fn day_number_bounds() {
        assert!(validate_day_number(1).is_ok());
        assert!(validate_day_number(5).is_ok());
        assert!(validate_day_number(0).is_err());
        assert!(validate_day_number(6).is_err());
    }

    #[test]
    fn day_number_error_names_the_field() {
        let err = validate_day_number(9).unwrap_err();
        assert!(err.to_string().contains("day_number"));
    }

    // -- validate_block_title ------------------------------------------------

    #[test]
    fn blank_title_rejected() {
        assert!(validate_block_title("   ").is_err());
        assert!(validate_block_title("Morning").is_ok());
    }

    #[test]
    fn overlong_title_rejected() {
        let title = "x".repeat(201);
        assert!(validate_block_title(&title).is_err());
    }
}
