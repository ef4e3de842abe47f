//! SQL statement assembly
//!
//! [`QueryBuilder`] turns table identity, compiled filter fragments, and
//! column descriptors into complete statement strings plus their argument
//! vectors. Identifiers are always quoted; values always travel as
//! positional arguments. INSERT and UPDATE statements carry `RETURNING *`
//! so store-assigned defaults round-trip back into the entity.

use super::entity::{insert_columns, update_assignments, Column};
use super::error::RepositoryError;
use super::filter::{where_clause, Filter};
use super::options::QueryOptions;
use super::value::SqlValue;

/// Quote a table or column name as a SQL identifier.
///
/// Embedded double quotes are doubled, so the name can never be
/// misinterpreted as SQL syntax. Identifier quoting is independent of value
/// parameterization.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Builds parameterized statements for a single table.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    table: String,
}

impl QueryBuilder {
    /// Bind the builder to a table.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }

    /// The unquoted table name this builder targets.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// `SELECT * FROM <table><where>[ ORDER BY …][ LIMIT n][ OFFSET n]`
    ///
    /// LIMIT and OFFSET interpolate as literal integers; their `u64` type
    /// guarantees they are non-negative at this boundary.
    pub fn select(
        &self,
        filters: &[Filter],
        options: &QueryOptions,
    ) -> Result<(String, Vec<SqlValue>), RepositoryError> {
        let (fragment, args) = where_clause(filters, 1)?;
        let mut sql = format!("SELECT * FROM {}{}", quote_ident(&self.table), fragment);

        if let Some(column) = &options.order_by {
            sql.push_str(&format!(" ORDER BY {} {}", quote_ident(column), options.order));
        }
        if let Some(limit) = options.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = options.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }

        Ok((sql, args))
    }

    /// `INSERT INTO <table> (…) VALUES (…) RETURNING *`
    pub fn insert(&self, columns: &[Column]) -> Result<(String, Vec<SqlValue>), RepositoryError> {
        let (names, values, placeholders) = insert_columns(columns);
        if names.is_empty() {
            return Err(RepositoryError::QueryBuild(format!(
                "no insertable columns for table \"{}\"",
                self.table
            )));
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
            quote_ident(&self.table),
            names.join(", "),
            placeholders.join(", "),
        );
        Ok((sql, values))
    }

    /// `UPDATE <table> SET … WHERE <id_col> = $k RETURNING *`
    ///
    /// The identifier lands in the placeholder after the last assignment.
    pub fn update(
        &self,
        columns: &[Column],
        id_column: &str,
        id: SqlValue,
    ) -> Result<(String, Vec<SqlValue>), RepositoryError> {
        let (assignments, mut values) = update_assignments(columns, id_column);
        if assignments.is_empty() {
            return Err(RepositoryError::QueryBuild(format!(
                "no editable columns for update on \"{}\"",
                self.table
            )));
        }

        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ${} RETURNING *",
            quote_ident(&self.table),
            assignments.join(", "),
            quote_ident(id_column),
            values.len() + 1,
        );
        values.push(id);
        Ok((sql, values))
    }

    /// `INSERT … ON CONFLICT (…) DO UPDATE SET … RETURNING *`
    ///
    /// Conflict columns default to the identifier column when the slice is
    /// empty. The DO UPDATE assignments reference `EXCLUDED` so the
    /// statement binds each value exactly once.
    pub fn upsert(
        &self,
        columns: &[Column],
        conflict_columns: &[&str],
        id_column: &str,
    ) -> Result<(String, Vec<SqlValue>), RepositoryError> {
        let (names, values, placeholders) = insert_columns(columns);
        if names.is_empty() {
            return Err(RepositoryError::QueryBuild(format!(
                "no insertable columns for upsert on \"{}\"",
                self.table
            )));
        }

        let conflict: Vec<String> = if conflict_columns.is_empty() {
            vec![quote_ident(id_column)]
        } else {
            conflict_columns.iter().map(|c| quote_ident(c)).collect()
        };

        let assignments: Vec<String> = columns
            .iter()
            .filter(|c| c.value.is_some() && c.name != id_column)
            .map(|c| {
                let name = quote_ident(c.name);
                format!("{name} = EXCLUDED.{name}")
            })
            .collect();
        if assignments.is_empty() {
            return Err(RepositoryError::QueryBuild(format!(
                "upsert on \"{}\" requires at least one non-identifier column",
                self.table
            )));
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT ({}) DO UPDATE SET {} RETURNING *",
            quote_ident(&self.table),
            names.join(", "),
            placeholders.join(", "),
            conflict.join(", "),
            assignments.join(", "),
        );
        Ok((sql, values))
    }

    /// `DELETE FROM <table> WHERE <id_col> = $1`
    pub fn delete_by_id(&self, id_column: &str) -> String {
        format!(
            "DELETE FROM {} WHERE {} = $1",
            quote_ident(&self.table),
            quote_ident(id_column),
        )
    }

    /// `DELETE FROM <table><where>`
    pub fn delete_many(&self, filters: &[Filter]) -> Result<(String, Vec<SqlValue>), RepositoryError> {
        let (fragment, args) = where_clause(filters, 1)?;
        Ok((
            format!("DELETE FROM {}{}", quote_ident(&self.table), fragment),
            args,
        ))
    }

    /// `SELECT COUNT(*) FROM <table><where>`
    pub fn count(&self, filters: &[Filter]) -> Result<(String, Vec<SqlValue>), RepositoryError> {
        let (fragment, args) = where_clause(filters, 1)?;
        Ok((
            format!("SELECT COUNT(*) FROM {}{}", quote_ident(&self.table), fragment),
            args,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::OrderDirection;

    fn builder() -> QueryBuilder {
        QueryBuilder::new("servers")
    }

    fn sample_columns() -> Vec<Column> {
        vec![
            Column::new("tag", 7_i32),
            Column::new("name", "alpha"),
            Column::optional("invite_url", Option::<String>::None),
        ]
    }

    #[test]
    fn test_quote_ident_doubles_embedded_quotes() {
        assert_eq!(quote_ident("plain"), "\"plain\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_select_without_filters_or_options() {
        let (sql, args) = builder().select(&[], &QueryOptions::new()).unwrap();
        assert_eq!(sql, "SELECT * FROM \"servers\"");
        assert!(args.is_empty());
    }

    #[test]
    fn test_select_with_filters_and_options() {
        let filters = [Filter::eq("region", "eu")];
        let options = QueryOptions::new()
            .with_order_by("created_at")
            .with_order(OrderDirection::Descending)
            .with_limit(10)
            .with_offset(20);
        let (sql, args) = builder().select(&filters, &options).unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM \"servers\" WHERE \"region\" = $1 \
             ORDER BY \"created_at\" DESC LIMIT 10 OFFSET 20"
        );
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_order_by_column_is_quoted_not_parameterized() {
        let options = QueryOptions::new().with_order_by("na\"me");
        let (sql, args) = builder().select(&[], &options).unwrap();
        assert_eq!(sql, "SELECT * FROM \"servers\" ORDER BY \"na\"\"me\" ASC");
        assert!(args.is_empty());
    }

    #[test]
    fn test_insert_statement() {
        let (sql, args) = builder().insert(&sample_columns()).unwrap();
        assert_eq!(
            sql,
            "INSERT INTO \"servers\" (\"tag\", \"name\") VALUES ($1, $2) RETURNING *"
        );
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_insert_with_no_columns_fails() {
        let columns = [Column::optional("name", Option::<String>::None)];
        let err = builder().insert(&columns).unwrap_err();
        assert!(matches!(err, RepositoryError::QueryBuild(_)));
    }

    #[test]
    fn test_update_places_id_after_assignments() {
        let (sql, args) = builder()
            .update(&sample_columns(), "tag", SqlValue::Int(7))
            .unwrap();
        assert_eq!(
            sql,
            "UPDATE \"servers\" SET \"name\" = $1 WHERE \"tag\" = $2 RETURNING *"
        );
        assert_eq!(args, vec![SqlValue::Text("alpha".to_string()), SqlValue::Int(7)]);
    }

    #[test]
    fn test_update_with_no_editable_columns_fails() {
        let columns = [Column::new("tag", 7_i32)];
        let err = builder().update(&columns, "tag", SqlValue::Int(7)).unwrap_err();
        assert!(matches!(err, RepositoryError::QueryBuild(_)));
    }

    #[test]
    fn test_upsert_defaults_conflict_to_identifier() {
        let (sql, args) = builder().upsert(&sample_columns(), &[], "tag").unwrap();
        assert_eq!(
            sql,
            "INSERT INTO \"servers\" (\"tag\", \"name\") VALUES ($1, $2) \
             ON CONFLICT (\"tag\") DO UPDATE SET \"name\" = EXCLUDED.\"name\" RETURNING *"
        );
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_upsert_with_explicit_conflict_columns() {
        let (sql, _) = builder()
            .upsert(&sample_columns(), &["name", "region"], "tag")
            .unwrap();
        assert!(sql.contains("ON CONFLICT (\"name\", \"region\")"));
    }

    #[test]
    fn test_upsert_with_only_identifier_fails() {
        let columns = [Column::new("tag", 7_i32)];
        let err = builder().upsert(&columns, &[], "tag").unwrap_err();
        assert!(matches!(err, RepositoryError::QueryBuild(_)));
    }

    #[test]
    fn test_delete_by_id() {
        assert_eq!(
            builder().delete_by_id("tag"),
            "DELETE FROM \"servers\" WHERE \"tag\" = $1"
        );
    }

    #[test]
    fn test_delete_many_without_filters_targets_whole_table() {
        let (sql, args) = builder().delete_many(&[]).unwrap();
        assert_eq!(sql, "DELETE FROM \"servers\"");
        assert!(args.is_empty());
    }

    #[test]
    fn test_count_with_filters() {
        let filters = [Filter::gt("members", 100_i64)];
        let (sql, args) = builder().count(&filters).unwrap();
        assert_eq!(
            sql,
            "SELECT COUNT(*) FROM \"servers\" WHERE \"members\" > $1"
        );
        assert_eq!(args.len(), 1);
    }
}
