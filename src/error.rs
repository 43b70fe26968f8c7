// =====================================================================
// File: error.rs
//
// Description:
//   Error types for the ordered-container core. Precondition violations
//   (end-cursor dereference, cross-tree cursor use, stale cursor, etc.)
//   are programmer errors and panic rather than returning a value here.
//   This module only covers the recoverable cases: deleting a key that
//   isn't present, and constructing an invalid branching factor.
// =====================================================================
use thiserror::Error;

/// Standard `Result` alias for fallible operations on an ordered container.
pub type OrderedResult<T> = Result<T, OrderedContainerError>;

/// Recoverable error conditions raised by the ordered-container core.
///
/// Precondition violations (dereferencing the end cursor, retreating from
/// begin, reusing a cursor across trees, or after a structural mutation)
/// are not represented here: they indicate a caller bug and panic with a
/// diagnostic message instead of returning a value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderedContainerError {
    /// `delete`/`erase`-style indexed removal was asked to remove a key
    /// that is not present. The tree is left unchanged.
    #[error("key not found")]
    KeyNotFound,

    /// A branching factor below the required minimum (`B >= 4`) was
    /// supplied to a tree constructor.
    #[error("branching factor must be >= {min}, got {actual}")]
    InvalidBranchingFactor { actual: usize, min: usize },
}
