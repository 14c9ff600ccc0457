//! Category validation and task category inheritance.
//!
//! A block's category is the category every one of its tasks must carry.
//! [`resolve_task_category`] decides what category a new task gets, given the
//! parent block's category and whatever the caller supplied.

use crate::error::CoreError;
use crate::types::DbId;

/// Maximum length of a category name.
pub const MAX_CATEGORY_NAME_LEN: usize = 100;

/// Validate a category color: `#RGB` or `#RRGGBB` hex.
pub fn validate_color(color: &str) -> Result<(), CoreError> {
    let Some(hex_part) = color.strip_prefix('#') else {
        return Err(CoreError::Validation(format!(
            "Invalid color '{color}'. Must start with '#'"
        )));
    };

    if hex_part.len() != 3 && hex_part.len() != 6 {
        return Err(CoreError::Validation(format!(
            "Invalid color '{color}'. Must be in #RGB or #RRGGBB hex format"
        )));
    }

    if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CoreError::Validation(format!(
            "Invalid color '{color}'. Must contain only hex digits after '#'"
        )));
    }

    Ok(())
}

/// Validate a category name: non-blank, at most [`MAX_CATEGORY_NAME_LEN`] chars.
pub fn validate_category_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("name must not be empty".to_string()));
    }
    if name.chars().count() > MAX_CATEGORY_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "name must be at most {MAX_CATEGORY_NAME_LEN} characters"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Inheritance
// ---------------------------------------------------------------------------

/// Why a task could not take a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryRejection {
    /// The parent block carries no category.
    BlockHasNoCategory,
    /// The caller asked for a category other than the block's.
    Mismatch { block_category: DbId, supplied: DbId },
}

impl std::fmt::Display for CategoryRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryRejection::BlockHasNoCategory => {
                write!(f, "category_id: block has no category to inherit")
            }
            CategoryRejection::Mismatch {
                block_category,
                supplied,
            } => write!(
                f,
                "category_id {supplied} does not match the block's category {block_category}"
            ),
        }
    }
}

/// Outcome of resolving a task's category against its parent block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryResolution {
    Inherited(DbId),
    Rejected(CategoryRejection),
}

impl CategoryResolution {
    /// Convert into the category id, or a validation error naming the rule.
    pub fn into_result(self) -> Result<DbId, CoreError> {
        match self {
            CategoryResolution::Inherited(id) => Ok(id),
            CategoryResolution::Rejected(reason) => Err(CoreError::Validation(reason.to_string())),
        }
    }
}

/// Decide which category a task under a block gets.
///
/// - Block without a category: always rejected, even if the caller supplies one.
/// - Caller supplies a different category than the block's: rejected.
/// - Otherwise the block's category is inherited.
pub fn resolve_task_category(
    block_category: Option<DbId>,
    supplied: Option<DbId>,
) -> CategoryResolution {
    let Some(block_category) = block_category else {
        return CategoryResolution::Rejected(CategoryRejection::BlockHasNoCategory);
    };

    match supplied {
        Some(supplied) if supplied != block_category => {
            CategoryResolution::Rejected(CategoryRejection::Mismatch {
                block_category,
                supplied,
            })
        }
        _ => CategoryResolution::Inherited(block_category),
    }
}
