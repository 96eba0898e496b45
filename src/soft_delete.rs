//! Shared outcome type for delete endpoints.
//!
//! Records that are still referenced by other rows (for example a member with
//! recorded transactions) are archived rather than deleted, so that history
//! keeps its names. Unreferenced records are removed outright.

/// How a delete request was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The record had no references and was removed from the database.
    Deleted,
    /// The record is still referenced and was marked inactive instead.
    Archived,
}
