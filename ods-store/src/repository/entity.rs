//! Entity-to-column mapping
//!
//! Entities describe themselves through an explicit column-descriptor list
//! instead of runtime reflection: [`TableEntity::columns`] returns the
//! ordered `(column, value)` pairs that participate in INSERT and UPDATE
//! statements. A descriptor whose value is `None` marks an absent optional:
//! the store applies its default on insert and leaves the column unchanged
//! on update.
//!
//! # Example
//!
//! ```rust,ignore
//! impl TableEntity for GameServer {
//!     type Id = i32;
//!
//!     fn id_column() -> &'static str {
//!         "tag"
//!     }
//!
//!     fn id(&self) -> i32 {
//!         self.tag
//!     }
//!
//!     fn columns(&self) -> Result<Vec<Column>, EncodeError> {
//!         Ok(vec![
//!             Column::new("tag", self.tag),
//!             Column::json("roles", &self.roles)?,
//!             Column::optional("invite_url", self.invite_url.clone()),
//!         ])
//!     }
//! }
//! ```

use std::fmt;

use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::FromRow;

use super::builder::quote_ident;
use super::value::SqlValue;

/// A composite column value failed to serialize to JSON.
#[derive(Debug, thiserror::Error)]
#[error("failed to encode column \"{column}\": {source}")]
pub struct EncodeError {
    /// Column whose value could not be encoded
    pub column: &'static str,
    /// Underlying serialization failure
    #[source]
    pub source: serde_json::Error,
}

/// One entry in an entity's column-descriptor list.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name as declared in the table schema
    pub name: &'static str,
    /// `None` means absent: skipped on insert and update so the store can
    /// apply its default or leave the stored value unchanged
    pub value: Option<SqlValue>,
}

impl Column {
    /// A column with a present value.
    pub fn new(name: &'static str, value: impl Into<SqlValue>) -> Self {
        Self {
            name,
            value: Some(value.into()),
        }
    }

    /// A column backed by an optional field; `None` marks it absent.
    pub fn optional<V: Into<SqlValue>>(name: &'static str, value: Option<V>) -> Self {
        Self {
            name,
            value: value.map(Into::into),
        }
    }

    /// A column holding an explicit SQL NULL.
    pub fn null(name: &'static str) -> Self {
        Self {
            name,
            value: Some(SqlValue::Null),
        }
    }

    /// A column holding a composite value, serialized to JSONB.
    ///
    /// Serialization failures surface as [`EncodeError`] so a broken value
    /// never turns into a silent NULL write.
    pub fn json<T: Serialize>(name: &'static str, value: &T) -> Result<Self, EncodeError> {
        let value = SqlValue::json(value).map_err(|source| EncodeError {
            column: name,
            source,
        })?;
        Ok(Self {
            name,
            value: Some(value),
        })
    }
}

/// An entity persisted in a single table.
///
/// The identifier is discoverable both for equality filters
/// ([`TableEntity::id_column`] + [`TableEntity::id`]) and for exclusion from
/// UPDATE assignment lists. Row decoding goes through [`sqlx::FromRow`].
pub trait TableEntity: for<'r> FromRow<'r, PgRow> + Send + Sync + Unpin {
    /// Identifier type; string and integer keys are both supported.
    type Id: Into<SqlValue> + fmt::Display + Clone + Send + Sync;

    /// Column holding the identifier.
    fn id_column() -> &'static str {
        "id"
    }

    /// The entity's identifier value.
    fn id(&self) -> Self::Id;

    /// Ordered column descriptors for this entity instance.
    fn columns(&self) -> Result<Vec<Column>, EncodeError>;
}

/// Emit `(quoted names, values, placeholders)` for an INSERT.
///
/// Absent descriptors are skipped; the placeholder index is the 1-based
/// position among emitted values in iteration order, so the same ordering
/// drives the bind loop at execution.
pub(crate) fn insert_columns(columns: &[Column]) -> (Vec<String>, Vec<SqlValue>, Vec<String>) {
    let mut names = Vec::with_capacity(columns.len());
    let mut values = Vec::with_capacity(columns.len());
    let mut placeholders = Vec::with_capacity(columns.len());

    for column in columns {
        let Some(value) = &column.value else {
            continue;
        };
        names.push(quote_ident(column.name));
        values.push(value.clone());
        placeholders.push(format!("${}", values.len()));
    }

    (names, values, placeholders)
}

/// Emit `("name" = $n assignments, values)` for an UPDATE SET list.
///
/// The identifier column is excluded along with absent descriptors.
pub(crate) fn update_assignments(
    columns: &[Column],
    id_column: &str,
) -> (Vec<String>, Vec<SqlValue>) {
    let mut assignments = Vec::with_capacity(columns.len());
    let mut values = Vec::with_capacity(columns.len());

    for column in columns {
        if column.name == id_column {
            continue;
        }
        let Some(value) = &column.value else {
            continue;
        };
        values.push(value.clone());
        assignments.push(format!("{} = ${}", quote_ident(column.name), values.len()));
    }

    (assignments, values)
}
