//! Canonical builder state.

use crate::value::Value;

/// Which statement the builder assembles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatementKind {
    #[default]
    Select,
    Delete,
}

/// `column = value`, rendered in insertion order and joined with `AND`.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub column: String,
    pub value: Value,
}

/// Accumulated query fragments.
///
/// The rendered statement is derived from these fields alone; see
/// [`render`](super::render::render).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryState {
    pub kind: StatementKind,
    /// Empty until a table has been confirmed by the catalog.
    pub table: String,
    /// Empty means all columns.
    pub selected_columns: Vec<String>,
    pub predicates: Vec<Predicate>,
    pub order_by: Option<String>,
    /// `None` means no LIMIT clause; a zero limit is never stored.
    pub limit: Option<u64>,
    /// Only consulted for `DELETE` without predicates.
    pub allow_delete_all: bool,
}
