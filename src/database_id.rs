//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;
/// The ID of a savings goal.
pub type GoalId = DatabaseId;
/// The ID of a ledger entry.
pub type TransactionId = DatabaseId;
