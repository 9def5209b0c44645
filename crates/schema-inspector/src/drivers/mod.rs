//! Connection bridges: [`Connection`] implementations over real driver crates.
//!
//! - [`postgres`]: tokio-postgres, for PostgreSQL and CockroachDB (feature `postgres`)
//! - [`mssql`]: tiberius, for SQL Server (feature `mssql`)
//! - [`mysql`]: sqlx, for MySQL and MariaDB (feature `mysql`)
//! - [`sqlite`]: sqlx, for SQLite (feature `sqlite`)
//! - [`common`]: SSL modes and TLS setup
//!
//! Oracle has no bridge; implement [`Connection`] over the driver of your
//! choice and report `oracledb` from `client()`.
//!
//! Bridges only execute statements and decode rows into [`Row`](crate::Row)s.
//! They never retry, and the caller decides how long a session lives.

pub mod common;
#[cfg(feature = "mssql")]
pub mod mssql;
#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use common::SslMode;
#[cfg(feature = "postgres")]
pub use common::TlsBuilder;
#[cfg(feature = "mssql")]
pub use mssql::MssqlConnection;
#[cfg(feature = "mysql")]
pub use mysql::MysqlConnection;
#[cfg(feature = "postgres")]
pub use postgres::PgConnection;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteConnection;

use crate::config::ConnectionConfig;
use crate::core::{Connection, Dialect};
use crate::error::{InspectError, Result};

/// Open a connection for `config` with the bridge matching its dialect.
///
/// # Errors
///
/// `Config` when the dialect has no bridge or its feature is not compiled in;
/// `CatalogQuery` when the driver cannot connect.
pub async fn connect(config: &ConnectionConfig) -> Result<Box<dyn Connection>> {
    match config.dialect()? {
        #[cfg(feature = "postgres")]
        Dialect::Postgres | Dialect::CockroachDb => {
            Ok(Box::new(postgres::PgConnection::connect(config).await?))
        }
        #[cfg(feature = "mssql")]
        Dialect::Mssql => Ok(Box::new(mssql::MssqlConnection::connect(config).await?)),
        #[cfg(feature = "mysql")]
        Dialect::Mysql => Ok(Box::new(mysql::MysqlConnection::connect(config).await?)),
        #[cfg(feature = "sqlite")]
        Dialect::Sqlite => Ok(Box::new(sqlite::SqliteConnection::connect(config).await?)),
        Dialect::Oracle => Err(InspectError::Config(
            "no built-in bridge for oracledb; supply your own Connection".into(),
        )),
        #[cfg(not(all(feature = "postgres", feature = "mssql", feature = "mysql", feature = "sqlite")))]
        other => Err(InspectError::Config(format!(
            "{} support is not compiled in (enable the `{}` feature)",
            other,
            feature_for(other)
        ))),
    }
}

#[cfg(not(all(feature = "postgres", feature = "mssql", feature = "mysql", feature = "sqlite")))]
fn feature_for(dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::Postgres | Dialect::CockroachDb => "postgres",
        Dialect::Mysql => "mysql",
        Dialect::Sqlite => "sqlite",
        Dialect::Mssql => "mssql",
        Dialect::Oracle => "oracledb",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InspectConfig;

    #[tokio::test]
    async fn test_oracle_has_no_bridge() {
        let config = InspectConfig::from_yaml(
            "connection:\n  dialect: oracledb\n  host: db\n  database: XE\n  user: app",
        )
        .unwrap();
        let err = connect(&config.connection).await.err().unwrap();
        assert!(matches!(err, InspectError::Config(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[cfg(not(feature = "mysql"))]
    #[tokio::test]
    async fn test_dialect_without_feature() {
        let config = InspectConfig::from_yaml(
            "connection:\n  dialect: mysql\n  host: db\n  database: app\n  user: app",
        )
        .unwrap();
        let err = connect(&config.connection).await.err().unwrap();
        assert!(matches!(err, InspectError::Config(m) if m.contains("`mysql` feature")));
    }

    #[cfg(feature = "sqlite")]
    #[tokio::test]
    async fn test_connect_sqlite_memory() {
        let config =
            InspectConfig::from_yaml("connection:\n  dialect: sqlite\n  path: \":memory:\"").unwrap();
        let conn = connect(&config.connection).await.unwrap();
        assert_eq!(conn.client(), "sqlite");
    }
}
