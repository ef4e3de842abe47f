//! Generic repository engine for PostgreSQL
//!
//! This module is the data-access core: it compiles structured filters and
//! entity column descriptors into positionally-parameterized SQL, executes
//! the statements against a shared pool, and maps rows back into typed
//! entities.
//!
//! # Features
//!
//! - **Filter algebra**: [`Filter`] constructors for equality, range,
//!   pattern, set-membership, disjunction, and a raw escape hatch
//! - **Entity mapping**: [`TableEntity`] column descriptors, no runtime
//!   reflection
//! - **Statement assembly**: [`QueryBuilder`] for
//!   SELECT/INSERT/UPDATE/UPSERT/DELETE/COUNT
//! - **CRUD engine**: [`PgRepository`] with pagination and existence checks
//! - **Transactions**: `with_transaction` with rollback error combination
//!
//! # Example
//!
//! ```rust,no_run
//! use ods_store::models::GameServer;
//! use ods_store::repository::{Filter, PgRepository, QueryOptions};
//!
//! # async fn example(pool: sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
//! let servers: PgRepository<GameServer> = PgRepository::new(pool, "servers");
//!
//! let (page, total) = servers
//!     .find_page(&[Filter::ilike("name", "%gaming%")], 1, 25, Some("tag"))
//!     .await?;
//! println!("{} of {total} servers", page.len());
//! # Ok(())
//! # }
//! ```

mod builder;
mod engine;
mod entity;
mod error;
mod filter;
mod options;
mod tx;
mod value;

pub use builder::QueryBuilder;
pub use engine::PgRepository;
pub use entity::{Column, EncodeError, TableEntity};
pub use error::{Operation, RepositoryError, RepositoryResult};
pub use filter::{Filter, FilterOperator, FilterValue};
pub use options::{OrderDirection, QueryOptions};
pub use value::SqlValue;
