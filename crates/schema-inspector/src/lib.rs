//! # schema-inspector
//!
//! Dialect-agnostic schema introspection.
//!
//! One query surface over the system catalogs of:
//!
//! - **MySQL / MariaDB** via `information_schema`
//! - **PostgreSQL and CockroachDB** via `pg_catalog`, honoring `search_path`
//! - **SQLite** via `sqlite_master` and the pragma table functions
//! - **Oracle** via the `ALL_*` dictionary views
//! - **SQL Server** via the `sys.*` catalog views
//!
//! Every answer comes back in the same records ([`TableInfo`], [`ColumnInfo`],
//! [`ForeignKeyInfo`], ...), so callers never branch on the engine.
//!
//! ## Example
//!
//! ```rust,no_run
//! use schema_inspector::{drivers, InspectConfig, Inspector, SchemaInspector};
//!
//! #[tokio::main]
//! async fn main() -> schema_inspector::Result<()> {
//!     let config = InspectConfig::load("inspector.yaml")?;
//!     let conn = drivers::connect(&config.connection).await?;
//!     let inspector = Inspector::resolve(conn.as_ref(), None)?;
//!     for table in inspector.overview().await? {
//!         println!("{} ({} columns)", table.table, table.columns.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod dialects;
pub mod drivers;
pub mod error;

// Re-exports for convenient access
pub use config::{ConnectionConfig, InspectConfig};
pub use crate::core::{
    ColumnInfo, ColumnRef, Connection, Dialect, ForeignKeyInfo, Placeholder, Row,
    SchemaInspector, SqlValue, Statement, TableInfo, TableOverview,
};
pub use dialects::{
    Inspector, MssqlInspector, MysqlInspector, OracleInspector, PgFlavor, PostgresInspector,
    SqliteInspector,
};
pub use error::{InspectError, Result};
