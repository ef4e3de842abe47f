//! Generic repository over a PostgreSQL table
//!
//! [`PgRepository`] is bound to one table name and one entity type at
//! construction and is immutable afterwards, so a single instance can be
//! shared freely across tasks. The pool handle it holds is the shared,
//! internally-synchronized sqlx pool; the repository itself carries no
//! locks and no per-call state.
//!
//! Operations are plain `async fn`s: dropping the returned future aborts
//! the in-flight statement, and deadlines are applied by wrapping a call in
//! `tokio::time::timeout`. Each non-transactional operation is a single
//! statement, so cancellation never leaves a partial write behind.

use std::marker::PhantomData;

use sqlx::PgPool;

use super::builder::QueryBuilder;
use super::entity::TableEntity;
use super::error::{Operation, RepositoryError, RepositoryResult};
use super::filter::Filter;
use super::options::QueryOptions;
use super::value::SqlValue;

const DEFAULT_PAGE_SIZE: u64 = 10;

/// Bind an argument vector onto a sqlx query in placeholder order.
///
/// Works for `query`, `query_as`, and `query_scalar` alike, which share no
/// bind trait.
macro_rules! bind_args {
    ($query:expr, $args:expr) => {{
        let mut query = $query;
        for value in $args {
            query = match value {
                SqlValue::Text(v) => query.bind(v.clone()),
                SqlValue::Int(v) => query.bind(*v),
                SqlValue::Float(v) => query.bind(*v),
                SqlValue::Bool(v) => query.bind(*v),
                SqlValue::Uuid(v) => query.bind(*v),
                SqlValue::Timestamp(v) => query.bind(*v),
                SqlValue::Json(v) => query.bind(v.clone()),
                SqlValue::Null => query.bind(Option::<String>::None),
            };
        }
        query
    }};
}

/// Clamp a 1-indexed page request into `(limit, offset)`.
pub(crate) fn page_window(page: u64, page_size: u64) -> (u64, u64) {
    let page = page.max(1);
    let page_size = if page_size == 0 {
        DEFAULT_PAGE_SIZE
    } else {
        page_size
    };
    (page_size, (page - 1) * page_size)
}

/// Generic CRUD/pagination/existence API for one table.
///
/// # Example
///
/// ```rust,no_run
/// use ods_store::models::GameServer;
/// use ods_store::repository::{Filter, PgRepository, QueryOptions};
///
/// # async fn example(pool: sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let servers: PgRepository<GameServer> = PgRepository::new(pool, "servers");
///
/// let active = servers
///     .find(&[Filter::eq("region", "eu")], &QueryOptions::new().with_limit(20))
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PgRepository<T> {
    pool: PgPool,
    builder: QueryBuilder,
    _entity: PhantomData<fn() -> T>,
}

impl<T: TableEntity> PgRepository<T> {
    /// Bind a repository to a pool and a table name.
    pub fn new(pool: PgPool, table: impl Into<String>) -> Self {
        Self {
            pool,
            builder: QueryBuilder::new(table),
            _entity: PhantomData,
        }
    }

    /// The table this repository targets.
    pub fn table(&self) -> &str {
        self.builder.table()
    }

    pub(crate) fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Fetch all entities matching the filters.
    ///
    /// No match is an empty vector, not an error.
    pub async fn find(
        &self,
        filters: &[Filter],
        options: &QueryOptions,
    ) -> RepositoryResult<Vec<T>> {
        let (sql, args) = self.builder.select(filters, options)?;
        tracing::debug!(table = %self.table(), query = %sql, "executing find");
        bind_args!(sqlx::query_as::<_, T>(&sql), &args)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::execution(Operation::Find, self.table(), e))
    }

    /// Fetch the first entity matching the filters, with an implicit
    /// `LIMIT 1`.
    ///
    /// Which row is first is non-deterministic unless the caller orders the
    /// query through [`Self::find`] instead.
    pub async fn find_one(&self, filters: &[Filter]) -> RepositoryResult<Option<T>> {
        let options = QueryOptions::new().with_limit(1);
        let (sql, args) = self.builder.select(filters, &options)?;
        tracing::debug!(table = %self.table(), query = %sql, "executing find_one");
        bind_args!(sqlx::query_as::<_, T>(&sql), &args)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::execution(Operation::FindOne, self.table(), e))
    }

    /// Fetch the entity with the given identifier.
    pub async fn find_by_id(&self, id: &T::Id) -> RepositoryResult<Option<T>> {
        let filters = [Filter::eq(T::id_column(), id.clone())];
        self.find_one(&filters).await
    }

    /// Insert the entity and return the row as persisted, including
    /// store-assigned defaults.
    pub async fn create(&self, entity: &T) -> RepositoryResult<T> {
        let columns = entity.columns()?;
        let (sql, args) = self.builder.insert(&columns)?;
        tracing::debug!(table = %self.table(), query = %sql, "executing create");
        bind_args!(sqlx::query_as::<_, T>(&sql), &args)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::execution(Operation::Create, self.table(), e))
    }

    /// Update the row with the given identifier from the entity's editable
    /// columns.
    ///
    /// Fails with [`RepositoryError::Validation`] before any store call
    /// when the entity has no editable columns, and with
    /// [`RepositoryError::NotFound`] when no row matches the identifier.
    pub async fn update(&self, id: &T::Id, entity: &T) -> RepositoryResult<T> {
        let columns = entity.columns()?;
        let editable = columns
            .iter()
            .any(|c| c.value.is_some() && c.name != T::id_column());
        if !editable {
            return Err(RepositoryError::Validation(format!(
                "no editable columns for update on \"{}\"",
                self.table()
            )));
        }

        let (sql, args) = self
            .builder
            .update(&columns, T::id_column(), id.clone().into())?;
        tracing::debug!(table = %self.table(), query = %sql, "executing update");
        bind_args!(sqlx::query_as::<_, T>(&sql), &args)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => RepositoryError::not_found(self.table(), id),
                other => RepositoryError::execution(Operation::Update, self.table(), other),
            })
    }

    /// Insert the entity, or update the existing row on a conflict key.
    ///
    /// `conflict_columns` defaults to the identifier column when empty.
    /// Called repeatedly with the same key, exactly one row results,
    /// reflecting the latest values.
    pub async fn upsert(&self, entity: &T, conflict_columns: &[&str]) -> RepositoryResult<T> {
        let columns = entity.columns()?;
        let (sql, args) = self
            .builder
            .upsert(&columns, conflict_columns, T::id_column())?;
        tracing::debug!(table = %self.table(), query = %sql, "executing upsert");
        bind_args!(sqlx::query_as::<_, T>(&sql), &args)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::execution(Operation::Upsert, self.table(), e))
    }

    /// Delete the row with the given identifier.
    ///
    /// Fails with [`RepositoryError::NotFound`] when no row was affected.
    pub async fn delete(&self, id: &T::Id) -> RepositoryResult<()> {
        let sql = self.builder.delete_by_id(T::id_column());
        let args: [SqlValue; 1] = [id.clone().into()];
        tracing::debug!(table = %self.table(), query = %sql, "executing delete");
        let result = bind_args!(sqlx::query(&sql), &args)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::execution(Operation::Delete, self.table(), e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found(self.table(), id));
        }
        Ok(())
    }

    /// Delete all rows matching the filters, returning how many went away.
    ///
    /// Zero matches is a success.
    pub async fn delete_many(&self, filters: &[Filter]) -> RepositoryResult<u64> {
        let (sql, args) = self.builder.delete_many(filters)?;
        tracing::debug!(table = %self.table(), query = %sql, "executing delete_many");
        let result = bind_args!(sqlx::query(&sql), &args)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::execution(Operation::DeleteMany, self.table(), e))?;
        Ok(result.rows_affected())
    }

    /// Count rows matching the filters.
    pub async fn count(&self, filters: &[Filter]) -> RepositoryResult<u64> {
        let (sql, args) = self.builder.count(filters)?;
        tracing::debug!(table = %self.table(), query = %sql, "executing count");
        let count: i64 = bind_args!(sqlx::query_scalar(&sql), &args)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::execution(Operation::Count, self.table(), e))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    /// Whether any row matches the filters.
    pub async fn exists(&self, filters: &[Filter]) -> RepositoryResult<bool> {
        Ok(self.count(filters).await? > 0)
    }

    /// Whether a row with the given identifier exists.
    pub async fn exists_with_id(&self, id: &T::Id) -> RepositoryResult<bool> {
        let filters = [Filter::eq(T::id_column(), id.clone())];
        self.exists(&filters).await
    }

    /// Fetch one page of results plus the total match count.
    ///
    /// `page` is 1-indexed and clamped to at least 1; a `page_size` of 0
    /// falls back to 10. The count and the page are two independent round
    /// trips, so the pair is not transactionally consistent under
    /// concurrent writes.
    pub async fn find_page(
        &self,
        filters: &[Filter],
        page: u64,
        page_size: u64,
        order_by: Option<&str>,
    ) -> RepositoryResult<(Vec<T>, u64)> {
        let (limit, offset) = page_window(page, page_size);
        let total = self.count(filters).await?;

        let mut options = QueryOptions::new().with_limit(limit).with_offset(offset);
        if let Some(column) = order_by {
            options = options.with_order_by(column);
        }
        let entities = self.find(filters, &options).await?;

        Ok((entities, total))
    }
}
