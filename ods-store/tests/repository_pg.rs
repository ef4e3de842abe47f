//! Live-database repository tests
//!
//! These exercise behavior only a real PostgreSQL instance can verify.
//! Point `DATABASE_URL` at a disposable database and run:
//!
//! ```text
//! DATABASE_URL=postgres://localhost:5432/ods_test cargo test -- --ignored
//! ```

use std::collections::HashMap;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use ods_store::models::GameServer;
use ods_store::repository::{Filter, Operation, PgRepository, RepositoryError, RepositoryResult};

async fn connect() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for live tests");
    PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("failed to connect to test database")
}

/// Recreate a server table so each test starts from a clean slate.
async fn reset_table(pool: &PgPool, table: &str) {
    sqlx::query(&format!("DROP TABLE IF EXISTS \"{table}\""))
        .execute(pool)
        .await
        .unwrap();
    sqlx::query(&format!(
        "CREATE TABLE \"{table}\" (
            tag INT PRIMARY KEY,
            roles JSONB NOT NULL,
            invite_url TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )"
    ))
    .execute(pool)
    .await
    .unwrap();
}

fn server(tag: i32, invite_url: Option<&str>) -> GameServer {
    let mut roles = HashMap::new();
    roles.insert(1001_i64, "member".to_string());
    GameServer {
        tag,
        roles,
        invite_url: invite_url.map(str::to_string),
        created_at: None,
    }
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance via DATABASE_URL"]
async fn create_returns_store_assigned_defaults() {
    let pool = connect().await;
    reset_table(&pool, "servers_create").await;
    let repo: PgRepository<GameServer> = PgRepository::new(pool, "servers_create");

    let created = repo.create(&server(1, None)).await.unwrap();
    assert_eq!(created.tag, 1);
    assert!(created.created_at.is_some(), "default must round-trip");
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance via DATABASE_URL"]
async fn delete_is_not_found_then_removes_the_row() {
    let pool = connect().await;
    reset_table(&pool, "servers_delete").await;
    let repo: PgRepository<GameServer> = PgRepository::new(pool, "servers_delete");

    let missing = repo.delete(&42).await.unwrap_err();
    assert!(matches!(missing, RepositoryError::NotFound { .. }));

    repo.create(&server(42, None)).await.unwrap();
    repo.delete(&42).await.unwrap();
    assert!(repo.find_by_id(&42).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance via DATABASE_URL"]
async fn failed_transaction_leaves_no_observable_write() {
    let pool = connect().await;
    reset_table(&pool, "servers_tx").await;
    let repo: PgRepository<GameServer> = PgRepository::new(pool, "servers_tx");

    let result: RepositoryResult<()> = repo
        .with_transaction(|conn| {
            Box::pin(async move {
                sqlx::query("INSERT INTO \"servers_tx\" (tag, roles) VALUES ($1, $2)")
                    .bind(99_i32)
                    .bind(serde_json::json!({"1001": "member"}))
                    .execute(&mut *conn)
                    .await
                    .map_err(|e| {
                        RepositoryError::execution(Operation::Create, "servers_tx", e)
                    })?;
                Err(RepositoryError::Validation("forced rollback".to_string()))
            })
        })
        .await;

    assert!(matches!(result, Err(RepositoryError::Validation(_))));
    let rows = repo
        .find(&[Filter::eq("tag", 99_i32)], &Default::default())
        .await
        .unwrap();
    assert!(rows.is_empty(), "rolled-back write must not be observable");
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance via DATABASE_URL"]
async fn committed_transaction_is_observable() {
    let pool = connect().await;
    reset_table(&pool, "servers_tx_ok").await;
    let repo: PgRepository<GameServer> = PgRepository::new(pool, "servers_tx_ok");

    repo.with_transaction(|conn| {
        Box::pin(async move {
            sqlx::query("INSERT INTO \"servers_tx_ok\" (tag, roles) VALUES ($1, $2)")
                .bind(7_i32)
                .bind(serde_json::json!({}))
                .execute(&mut *conn)
                .await
                .map_err(|e| {
                    RepositoryError::execution(Operation::Create, "servers_tx_ok", e)
                })?;
            Ok(())
        })
    })
    .await
    .unwrap();

    assert!(repo.exists_with_id(&7).await.unwrap());
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance via DATABASE_URL"]
async fn upsert_converges_to_one_row_with_latest_values() {
    let pool = connect().await;
    reset_table(&pool, "servers_upsert").await;
    let repo: PgRepository<GameServer> = PgRepository::new(pool, "servers_upsert");

    repo.upsert(&server(5, Some("https://example.test/old")), &[])
        .await
        .unwrap();
    let latest = repo
        .upsert(&server(5, Some("https://example.test/new")), &[])
        .await
        .unwrap();

    assert_eq!(latest.invite_url.as_deref(), Some("https://example.test/new"));
    assert_eq!(repo.count(&[]).await.unwrap(), 1);
    let stored = repo.find_by_id(&5).await.unwrap().unwrap();
    assert_eq!(stored.invite_url.as_deref(), Some("https://example.test/new"));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance via DATABASE_URL"]
async fn update_without_match_is_not_found() {
    let pool = connect().await;
    reset_table(&pool, "servers_update").await;
    let repo: PgRepository<GameServer> = PgRepository::new(pool, "servers_update");

    let err = repo
        .update(&12, &server(12, Some("https://example.test")))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
}
