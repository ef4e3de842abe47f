//! Filter algebra and WHERE-clause compiler
//!
//! Filters are an explicit tagged structure: every operator declares the
//! value shape it accepts, and compilation fails loudly on a mismatch
//! instead of silently dropping the condition. Field names are always
//! quoted as identifiers; values always travel through positional
//! placeholders. The one deliberate exception is [`Filter::raw`], an
//! unsafe escape hatch whose fragment is inserted verbatim and contributes
//! zero arguments; callers own sanitization of anything that reaches it.
//!
//! # Example
//!
//! ```rust
//! use ods_store::repository::Filter;
//!
//! let filters = vec![
//!     Filter::eq("status", "active"),
//!     Filter::is_in("region", vec!["eu", "na"]),
//!     Filter::or(vec![
//!         Filter::gt("members", 100_i64),
//!         Filter::eq("featured", true),
//!     ]),
//! ];
//! ```

use std::fmt;

use super::builder::quote_ident;
use super::error::RepositoryError;
use super::value::SqlValue;

/// Comparison operators for filter conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    /// Equal to (=)
    Equal,
    /// Not equal to (!=)
    NotEqual,
    /// Greater than (>)
    GreaterThan,
    /// Greater than or equal to (>=)
    GreaterThanOrEqual,
    /// Less than (<)
    LessThan,
    /// Less than or equal to (<=)
    LessThanOrEqual,
    /// Pattern matching (LIKE)
    Like,
    /// Case-insensitive pattern matching (ILIKE)
    ILike,
    /// Value is in a list (IN)
    In,
    /// Value is not in a list (NOT IN)
    NotIn,
    /// Disjunction of sub-filters
    Or,
    /// Verbatim SQL fragment
    Raw,
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equal => write!(f, "="),
            Self::NotEqual => write!(f, "!="),
            Self::GreaterThan => write!(f, ">"),
            Self::GreaterThanOrEqual => write!(f, ">="),
            Self::LessThan => write!(f, "<"),
            Self::LessThanOrEqual => write!(f, "<="),
            Self::Like => write!(f, "LIKE"),
            Self::ILike => write!(f, "ILIKE"),
            Self::In => write!(f, "IN"),
            Self::NotIn => write!(f, "NOT IN"),
            Self::Or => write!(f, "OR"),
            Self::Raw => write!(f, "RAW"),
        }
    }
}

/// Value shape attached to a filter
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Single scalar, consumed by comparison operators
    Value(SqlValue),
    /// Ordered sequence, consumed by IN / NOT IN
    List(Vec<SqlValue>),
    /// Sub-filters, consumed by OR
    Group(Vec<Filter>),
    /// Verbatim fragment, consumed by RAW
    Raw(String),
}

/// A single condition in a WHERE clause.
///
/// Conditions in a slice are implicitly AND-ed. `field` is unused for the
/// `Or` and `Raw` operators.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Field name, quoted as an identifier when compiled
    pub field: String,
    /// Comparison operator
    pub operator: FilterOperator,
    /// Value shape the operator consumes
    pub value: FilterValue,
}

impl Filter {
    /// Create a filter from its parts.
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: FilterValue) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    fn comparison(field: impl Into<String>, operator: FilterOperator, value: impl Into<SqlValue>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: FilterValue::Value(value.into()),
        }
    }

    /// `field = value`
    pub fn eq(field: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::comparison(field, FilterOperator::Equal, value)
    }

    /// `field != value`
    pub fn ne(field: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::comparison(field, FilterOperator::NotEqual, value)
    }

    /// `field > value`
    pub fn gt(field: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::comparison(field, FilterOperator::GreaterThan, value)
    }

    /// `field >= value`
    pub fn gte(field: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::comparison(field, FilterOperator::GreaterThanOrEqual, value)
    }

    /// `field < value`
    pub fn lt(field: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::comparison(field, FilterOperator::LessThan, value)
    }

    /// `field <= value`
    pub fn lte(field: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::comparison(field, FilterOperator::LessThanOrEqual, value)
    }

    /// `field LIKE pattern`
    pub fn like(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        let pattern: String = pattern.into();
        Self::comparison(field, FilterOperator::Like, pattern)
    }

    /// `field ILIKE pattern`
    pub fn ilike(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        let pattern: String = pattern.into();
        Self::comparison(field, FilterOperator::ILike, pattern)
    }

    /// `field IN (…)`
    pub fn is_in<V>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self
    where
        V: Into<SqlValue>,
    {
        Self {
            field: field.into(),
            operator: FilterOperator::In,
            value: FilterValue::List(values.into_iter().map(Into::into).collect()),
        }
    }

    /// `field NOT IN (…)`
    pub fn not_in<V>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self
    where
        V: Into<SqlValue>,
    {
        Self {
            field: field.into(),
            operator: FilterOperator::NotIn,
            value: FilterValue::List(values.into_iter().map(Into::into).collect()),
        }
    }

    /// Disjunction: `(sub1 OR sub2 OR …)`, each sub-filter compiled with its
    /// own operator.
    pub fn or(filters: Vec<Filter>) -> Self {
        Self {
            field: String::new(),
            operator: FilterOperator::Or,
            value: FilterValue::Group(filters),
        }
    }

    /// Verbatim SQL fragment; bypasses quoting and parameterization and
    /// contributes zero arguments. The caller is responsible for making
    /// sure nothing untrusted reaches this.
    pub fn raw(fragment: impl Into<String>) -> Self {
        Self {
            field: String::new(),
            operator: FilterOperator::Raw,
            value: FilterValue::Raw(fragment.into()),
        }
    }
}

/// Compile a filter list into `(" WHERE …" | "", args)`.
///
/// Placeholder numbering starts at `first_index` and stays contiguous and
/// ascending across the whole list, including across OR sub-groups, so the
/// argument vector always lines up with the placeholders.
pub(crate) fn where_clause(
    filters: &[Filter],
    first_index: usize,
) -> Result<(String, Vec<SqlValue>), RepositoryError> {
    if filters.is_empty() {
        return Ok((String::new(), Vec::new()));
    }

    let mut index = first_index;
    let mut args = Vec::new();
    let mut conditions = Vec::with_capacity(filters.len());

    for filter in filters {
        conditions.push(compile_condition(filter, &mut index, &mut args)?);
    }

    Ok((format!(" WHERE {}", conditions.join(" AND ")), args))
}

fn compile_condition(
    filter: &Filter,
    index: &mut usize,
    args: &mut Vec<SqlValue>,
) -> Result<String, RepositoryError> {
    match filter.operator {
        FilterOperator::In | FilterOperator::NotIn => match &filter.value {
            FilterValue::List(values) => {
                if values.is_empty() {
                    return Err(RepositoryError::QueryBuild(format!(
                        "{} filter on \"{}\" requires at least one value",
                        filter.operator, filter.field
                    )));
                }
                let placeholders: Vec<String> =
                    (0..values.len()).map(|i| format!("${}", *index + i)).collect();
                *index += values.len();
                args.extend(values.iter().cloned());
                Ok(format!(
                    "{} {} ({})",
                    quote_ident(&filter.field),
                    filter.operator,
                    placeholders.join(", ")
                ))
            }
            other => Err(shape_mismatch(filter, "a value list", other)),
        },
        FilterOperator::Or => match &filter.value {
            FilterValue::Group(group) => {
                if group.is_empty() {
                    return Err(RepositoryError::QueryBuild(
                        "OR filter requires at least one sub-filter".to_string(),
                    ));
                }
                let parts = group
                    .iter()
                    .map(|sub| compile_condition(sub, index, args))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(format!("({})", parts.join(" OR ")))
            }
            other => Err(shape_mismatch(filter, "a filter group", other)),
        },
        FilterOperator::Raw => match &filter.value {
            FilterValue::Raw(fragment) => Ok(fragment.clone()),
            other => Err(shape_mismatch(filter, "a raw fragment", other)),
        },
        _ => match &filter.value {
            FilterValue::Value(value) => {
                let placeholder = *index;
                *index += 1;
                args.push(value.clone());
                Ok(format!(
                    "{} {} ${placeholder}",
                    quote_ident(&filter.field),
                    filter.operator
                ))
            }
            other => Err(shape_mismatch(filter, "a scalar value", other)),
        },
    }
}

fn shape_mismatch(filter: &Filter, expected: &str, got: &FilterValue) -> RepositoryError {
    let got = match got {
        FilterValue::Value(_) => "a scalar value",
        FilterValue::List(_) => "a value list",
        FilterValue::Group(_) => "a filter group",
        FilterValue::Raw(_) => "a raw fragment",
    };
    RepositoryError::QueryBuild(format!(
        "{} filter on \"{}\" expects {expected}, got {got}",
        filter.operator, filter.field
    ))
}
