//! Transaction coordination
//!
//! A unit of work runs against one connection pinned for the duration of
//! the callback. Nothing the callback does is observable outside the call
//! unless the commit succeeds. Callers must not run unrelated long or
//! blocking work inside the callback; the pinned connection starves the
//! pool for as long as the callback holds it.

use futures::future::BoxFuture;
use sqlx::PgConnection;

use super::engine::PgRepository;
use super::entity::TableEntity;
use super::error::{RepositoryError, RepositoryResult};

impl<T: TableEntity> PgRepository<T> {
    /// Run `f` inside a transaction on the shared pool.
    ///
    /// If `f` fails, the transaction is rolled back; a rollback failure is
    /// combined with the original error rather than replacing it. If `f`
    /// succeeds, the transaction is committed and a commit failure surfaces
    /// as its own error.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use ods_store::models::GameServer;
    /// # use ods_store::repository::PgRepository;
    /// # async fn example(servers: PgRepository<GameServer>) -> Result<(), Box<dyn std::error::Error>> {
    /// servers
    ///     .with_transaction(|conn| {
    ///         Box::pin(async move {
    ///             sqlx::query("UPDATE servers SET members = members + 1 WHERE tag = $1")
    ///                 .bind(7_i32)
    ///                 .execute(&mut *conn)
    ///                 .await
    ///                 .map_err(|e| {
    ///                     ods_store::repository::RepositoryError::execution(
    ///                         ods_store::repository::Operation::Update,
    ///                         "servers",
    ///                         e,
    ///                     )
    ///                 })?;
    ///             Ok(())
    ///         })
    ///     })
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn with_transaction<R, F>(&self, f: F) -> RepositoryResult<R>
    where
        R: Send,
        F: for<'t> FnOnce(&'t mut PgConnection) -> BoxFuture<'t, RepositoryResult<R>> + Send,
    {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(RepositoryError::TransactionBegin)?;
        tracing::debug!(table = %self.table(), "transaction started");

        match f(&mut *tx).await {
            Ok(value) => {
                tx.commit()
                    .await
                    .map_err(RepositoryError::TransactionCommit)?;
                tracing::debug!(table = %self.table(), "transaction committed");
                Ok(value)
            }
            Err(err) => match tx.rollback().await {
                Ok(()) => {
                    tracing::warn!(table = %self.table(), error = %err, "transaction rolled back");
                    Err(err)
                }
                Err(rollback) => Err(RepositoryError::TransactionRollback {
                    source: Box::new(err),
                    rollback,
                }),
            },
        }
    }
}
