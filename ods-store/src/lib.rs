//! # ods-store
//!
//! Generic PostgreSQL data-access engine for the ods services: a small
//! query-compiler that turns structured filters and entity column
//! descriptors into injection-safe, positionally-parameterized SQL, plus a
//! typed CRUD/pagination API over a shared sqlx pool.
//!
//! ## Features
//!
//! - **Filter algebra**: equality, range, pattern, set-membership,
//!   disjunction, and an explicit raw escape hatch
//! - **Entity mapping**: declarative column descriptors, no runtime
//!   reflection; composites stored as JSONB
//! - **Repositories**: generic over entity and identifier types, bound to
//!   one table at construction
//! - **Transactions**: begin/commit/rollback units of work with rollback
//!   error combination
//! - **Connection pooling**: retrying pool construction from layered
//!   configuration
//!
//! ## Example
//!
//! ```rust,no_run
//! use ods_store::models::GameServer;
//! use ods_store::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let pool = create_pool(&config.database).await?;
//!     let servers: PgRepository<GameServer> = PgRepository::new(pool, "servers");
//!
//!     let (page, total) = servers
//!         .find_page(&[Filter::eq("region", "eu")], 1, 25, Some("tag"))
//!         .await?;
//!     println!("{} of {total} servers", page.len());
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod observability;
pub mod repository;

/// Commonly used types, importable in one line
pub mod prelude {
    pub use crate::config::{Config, DatabaseConfig, ServiceConfig};
    pub use crate::database::create_pool;
    pub use crate::error::{Error, Result};
    pub use crate::observability::init_tracing;
    pub use crate::repository::{
        Column, EncodeError, Filter, FilterOperator, FilterValue, Operation, OrderDirection,
        PgRepository, QueryBuilder, QueryOptions, RepositoryError, RepositoryResult, SqlValue,
        TableEntity,
    };
}
