//! Dialect adapters and the dispatcher that picks one.
//!
//! - [`mysql`]: MySQL / MariaDB over `information_schema`
//! - [`postgres`]: PostgreSQL and CockroachDB over `pg_catalog`
//! - [`sqlite`]: SQLite over `sqlite_master` and the pragma functions
//! - [`oracle`]: Oracle over the `ALL_*` dictionary views
//! - [`mssql`]: SQL Server over `sys.*`
//!
//! [`Inspector`] wraps one adapter per variant and delegates every
//! [`SchemaInspector`] call, so callers get one concrete type regardless of the
//! engine behind the connection.

pub mod mssql;
pub mod mysql;
pub mod oracle;
pub mod postgres;
pub mod sqlite;

pub use mssql::MssqlInspector;
pub use mysql::MysqlInspector;
pub use oracle::OracleInspector;
pub use postgres::{PgFlavor, PostgresInspector};
pub use sqlite::SqliteInspector;

use std::fmt;

use async_trait::async_trait;
use tracing::debug;

use crate::core::{
    ColumnInfo, ColumnRef, Connection, Dialect, ForeignKeyInfo, SchemaInspector, TableInfo,
    TableOverview,
};
use crate::error::Result;

/// Enum-based static dispatch over the dialect adapters.
///
/// Both Postgres and CockroachDB live in the `Postgres` variant; the adapter's
/// [`PgFlavor`] tells them apart.
#[derive(Clone, Copy)]
pub enum Inspector<'c> {
    Mysql(MysqlInspector<'c>),
    Postgres(PostgresInspector<'c>),
    Sqlite(SqliteInspector<'c>),
    Oracle(OracleInspector<'c>),
    Mssql(MssqlInspector<'c>),
}

impl<'c> Inspector<'c> {
    /// Pick the adapter for `dialect`, or for the connection's own client
    /// identifier when no dialect is given.
    ///
    /// Names are matched exactly (`mysql`, `postgres`, `cockroachdb`, `sqlite`,
    /// `oracledb`, `mssql`); anything else fails with `UnknownDialect`.
    pub fn resolve(conn: &'c dyn Connection, dialect: Option<&str>) -> Result<Self> {
        let name = dialect.unwrap_or_else(|| conn.client());
        let dialect: Dialect = name.parse()?;
        debug!("Resolved dialect '{}' for {} connection", dialect, conn.client());
        Ok(Self::for_dialect(conn, dialect))
    }

    /// Adapter for a known dialect.
    pub fn for_dialect(conn: &'c dyn Connection, dialect: Dialect) -> Self {
        match dialect {
            Dialect::Mysql => Self::mysql(conn),
            Dialect::Postgres => Self::postgres(conn),
            Dialect::CockroachDb => Self::cockroachdb(conn),
            Dialect::Sqlite => Self::sqlite(conn),
            Dialect::Oracle => Self::oracledb(conn),
            Dialect::Mssql => Self::mssql(conn),
        }
    }

    pub fn mysql(conn: &'c dyn Connection) -> Self {
        Inspector::Mysql(MysqlInspector::new(conn))
    }

    pub fn postgres(conn: &'c dyn Connection) -> Self {
        Inspector::Postgres(PostgresInspector::new(conn))
    }

    pub fn cockroachdb(conn: &'c dyn Connection) -> Self {
        Inspector::Postgres(PostgresInspector::cockroach(conn))
    }

    pub fn sqlite(conn: &'c dyn Connection) -> Self {
        Inspector::Sqlite(SqliteInspector::new(conn))
    }

    pub fn oracledb(conn: &'c dyn Connection) -> Self {
        Inspector::Oracle(OracleInspector::new(conn))
    }

    pub fn mssql(conn: &'c dyn Connection) -> Self {
        Inspector::Mssql(MssqlInspector::new(conn))
    }

    /// Scope lookups to `schema` (database on MySQL, owner on Oracle).
    /// Ignored on SQLite.
    #[must_use]
    pub fn with_schema(self, schema: &'c str) -> Self {
        match self {
            Inspector::Mysql(i) => Inspector::Mysql(i.with_schema(schema)),
            Inspector::Postgres(i) => Inspector::Postgres(i.with_schema(schema)),
            Inspector::Sqlite(i) => Inspector::Sqlite(i.with_schema(schema)),
            Inspector::Oracle(i) => Inspector::Oracle(i.with_schema(schema)),
            Inspector::Mssql(i) => Inspector::Mssql(i.with_schema(schema)),
        }
    }
}

// The connection is not printable; the dialect identifies the adapter.
impl fmt::Debug for Inspector<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Inspector").field(&self.dialect()).finish()
    }
}

#[async_trait]
impl SchemaInspector for Inspector<'_> {
    fn dialect(&self) -> Dialect {
        match self {
            Inspector::Mysql(i) => i.dialect(),
            Inspector::Postgres(i) => i.dialect(),
            Inspector::Sqlite(i) => i.dialect(),
            Inspector::Oracle(i) => i.dialect(),
            Inspector::Mssql(i) => i.dialect(),
        }
    }

    async fn tables(&self) -> Result<Vec<String>> {
        match self {
            Inspector::Mysql(i) => i.tables().await,
            Inspector::Postgres(i) => i.tables().await,
            Inspector::Sqlite(i) => i.tables().await,
            Inspector::Oracle(i) => i.tables().await,
            Inspector::Mssql(i) => i.tables().await,
        }
    }

    async fn table_info(&self) -> Result<Vec<TableInfo>> {
        match self {
            Inspector::Mysql(i) => i.table_info().await,
            Inspector::Postgres(i) => i.table_info().await,
            Inspector::Sqlite(i) => i.table_info().await,
            Inspector::Oracle(i) => i.table_info().await,
            Inspector::Mssql(i) => i.table_info().await,
        }
    }

    async fn table_info_of(&self, table: &str) -> Result<TableInfo> {
        match self {
            Inspector::Mysql(i) => i.table_info_of(table).await,
            Inspector::Postgres(i) => i.table_info_of(table).await,
            Inspector::Sqlite(i) => i.table_info_of(table).await,
            Inspector::Oracle(i) => i.table_info_of(table).await,
            Inspector::Mssql(i) => i.table_info_of(table).await,
        }
    }

    async fn has_table(&self, table: &str) -> Result<bool> {
        match self {
            Inspector::Mysql(i) => i.has_table(table).await,
            Inspector::Postgres(i) => i.has_table(table).await,
            Inspector::Sqlite(i) => i.has_table(table).await,
            Inspector::Oracle(i) => i.has_table(table).await,
            Inspector::Mssql(i) => i.has_table(table).await,
        }
    }

    async fn columns(&self, table: Option<&str>) -> Result<Vec<ColumnRef>> {
        match self {
            Inspector::Mysql(i) => i.columns(table).await,
            Inspector::Postgres(i) => i.columns(table).await,
            Inspector::Sqlite(i) => i.columns(table).await,
            Inspector::Oracle(i) => i.columns(table).await,
            Inspector::Mssql(i) => i.columns(table).await,
        }
    }

    async fn column_info(&self, table: Option<&str>) -> Result<Vec<ColumnInfo>> {
        match self {
            Inspector::Mysql(i) => i.column_info(table).await,
            Inspector::Postgres(i) => i.column_info(table).await,
            Inspector::Sqlite(i) => i.column_info(table).await,
            Inspector::Oracle(i) => i.column_info(table).await,
            Inspector::Mssql(i) => i.column_info(table).await,
        }
    }

    async fn column_info_of(&self, table: &str, column: &str) -> Result<ColumnInfo> {
        match self {
            Inspector::Mysql(i) => i.column_info_of(table, column).await,
            Inspector::Postgres(i) => i.column_info_of(table, column).await,
            Inspector::Sqlite(i) => i.column_info_of(table, column).await,
            Inspector::Oracle(i) => i.column_info_of(table, column).await,
            Inspector::Mssql(i) => i.column_info_of(table, column).await,
        }
    }

    async fn primary(&self, table: &str) -> Result<Option<String>> {
        match self {
            Inspector::Mysql(i) => i.primary(table).await,
            Inspector::Postgres(i) => i.primary(table).await,
            Inspector::Sqlite(i) => i.primary(table).await,
            Inspector::Oracle(i) => i.primary(table).await,
            Inspector::Mssql(i) => i.primary(table).await,
        }
    }

    async fn foreign_keys(&self, table: Option<&str>) -> Result<Vec<ForeignKeyInfo>> {
        match self {
            Inspector::Mysql(i) => i.foreign_keys(table).await,
            Inspector::Postgres(i) => i.foreign_keys(table).await,
            Inspector::Sqlite(i) => i.foreign_keys(table).await,
            Inspector::Oracle(i) => i.foreign_keys(table).await,
            Inspector::Mssql(i) => i.foreign_keys(table).await,
        }
    }

    async fn has_column(&self, table: &str, column: &str) -> Result<bool> {
        match self {
            Inspector::Mysql(i) => i.has_column(table, column).await,
            Inspector::Postgres(i) => i.has_column(table, column).await,
            Inspector::Sqlite(i) => i.has_column(table, column).await,
            Inspector::Oracle(i) => i.has_column(table, column).await,
            Inspector::Mssql(i) => i.has_column(table, column).await,
        }
    }

    async fn overview(&self) -> Result<Vec<TableOverview>> {
        match self {
            Inspector::Mysql(i) => i.overview().await,
            Inspector::Postgres(i) => i.overview().await,
            Inspector::Sqlite(i) => i.overview().await,
            Inspector::Oracle(i) => i.overview().await,
            Inspector::Mssql(i) => i.overview().await,
        }
    }
}
