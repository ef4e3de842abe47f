//! Ordering and windowing options for SELECT statements

use std::fmt;

/// Direction for ordering results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    /// Sort in ascending order (A-Z, 0-9)
    #[default]
    Ascending,
    /// Sort in descending order (Z-A, 9-0)
    Descending,
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "ASC"),
            Self::Descending => write!(f, "DESC"),
        }
    }
}

/// Ordering, limit, and offset applied to a SELECT.
///
/// `limit` and `offset` are interpolated into the statement as literal
/// integers; their `u64` type keeps the non-negative invariant at that
/// boundary. The ORDER BY column is quoted as an identifier, never
/// parameterized; the dialect cannot express a parameterized column name.
///
/// # Example
///
/// ```rust
/// use ods_store::repository::{OrderDirection, QueryOptions};
///
/// let options = QueryOptions::new()
///     .with_order_by("created_at")
///     .with_order(OrderDirection::Descending)
///     .with_limit(20)
///     .with_offset(40);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryOptions {
    /// Column to order by, quoted as an identifier when rendered
    pub order_by: Option<String>,
    /// Direction applied when `order_by` is set
    pub order: OrderDirection,
    /// Maximum number of rows to return
    pub limit: Option<u64>,
    /// Number of rows to skip
    pub offset: Option<u64>,
}

impl QueryOptions {
    /// Options with no ordering or windowing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Order results by the given column.
    #[must_use]
    pub fn with_order_by(mut self, column: impl Into<String>) -> Self {
        self.order_by = Some(column.into());
        self
    }

    /// Set the ordering direction.
    #[must_use]
    pub fn with_order(mut self, direction: OrderDirection) -> Self {
        self.order = direction;
        self
    }

    /// Cap the number of returned rows.
    #[must_use]
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skip the first `offset` rows.
    #[must_use]
    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }
}
