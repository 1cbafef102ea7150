//! SQLite persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of domain repository ports
//! backed by SQLite via the Diesel ORM, with `r2d2` connection pooling and
//! embedded migrations.
//!
//! # Architecture
//!
//! - **Thin adapters**: Repository implementations only translate between
//!   Diesel models and domain types. No business logic resides here.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) are internal implementation details, never
//!   exposed to the domain layer.
//! - **Blocking isolation**: SQLite calls run on tokio's blocking pool via
//!   [`DbPool::run`], never on the async executor.
//! - **Strongly typed errors**: All database errors are mapped to domain
//!   persistence error types.
//!
//! # Example
//!
//! ```no_run
//! use coil_inventory::outbound::persistence::{DbPool, DieselCoilRepository, PoolConfig};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("coils.db")).await?;
//! let repo = DieselCoilRepository::new(pool);
//! # let _ = repo;
//! # Ok(())
//! # }
//! ```

mod diesel_basic_error_mapping;
mod diesel_coil_repository;
mod models;
mod pool;
mod schema;

pub use diesel_coil_repository::DieselCoilRepository;
pub use pool::{DbConnection, DbPool, PoolConfig, PoolError};
