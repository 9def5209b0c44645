//! PostgreSQL / CockroachDB bridge over tokio-postgres.
//!
//! [`PgConnection`] wraps anything implementing [`GenericClient`], so a
//! `Transaction` works as well as a `Client`: every catalog statement then runs
//! inside that transaction and sees its uncommitted DDL.

use async_trait::async_trait;
use tokio_postgres::types::{ToSql, Type};
use tokio_postgres::{Client, GenericClient, NoTls};
use tracing::{debug, info, warn};

use crate::config::ConnectionConfig;
use crate::core::{Connection, Dialect, Row, SqlValue};
use crate::drivers::common::{SslMode, TlsBuilder};
use crate::error::{InspectError, Result};

const SEARCH_PATH_SQL: &str =
    "SELECT current_setting('search_path') AS search_path, current_user::text AS current_user";

/// A Postgres-family session usable by the inspector.
pub struct PgConnection<C = Client> {
    client: C,
    dialect: Dialect,
    search_path: Option<Vec<String>>,
}

impl<C> PgConnection<C>
where
    C: GenericClient + Send + Sync,
{
    /// Bridge reporting `postgres`.
    pub fn new(client: C) -> Self {
        Self {
            client,
            dialect: Dialect::Postgres,
            search_path: None,
        }
    }

    /// Bridge reporting `cockroachdb`.
    pub fn cockroach(client: C) -> Self {
        Self {
            dialect: Dialect::CockroachDb,
            ..Self::new(client)
        }
    }

    /// Report `path` instead of asking the server for its `search_path`.
    #[must_use]
    pub fn with_search_path(mut self, path: Vec<String>) -> Self {
        self.search_path = Some(path);
        self
    }

    /// Give back the wrapped client (or transaction, to commit or roll back).
    pub fn into_inner(self) -> C {
        self.client
    }
}

impl PgConnection<Client> {
    /// Open a session described by `config`. The connection task is spawned
    /// onto the current runtime and lives as long as the returned client.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let dialect = config.dialect()?;
        let mut pg_config = tokio_postgres::Config::new();
        pg_config.host(&config.host);
        pg_config.port(config.effective_port().unwrap_or(5432));
        pg_config.dbname(&config.database);
        pg_config.user(&config.user);
        pg_config.password(&config.password);
        pg_config.application_name("schema-inspector");

        let client = match TlsBuilder::new(SslMode::parse(&config.ssl_mode)?).build()? {
            None => {
                warn!("PostgreSQL TLS is disabled. Credentials will be transmitted in plaintext.");
                let (client, connection) = pg_config.connect(NoTls).await?;
                tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        warn!("PostgreSQL connection closed with error: {}", e);
                    }
                });
                client
            }
            Some(tls) => {
                let (client, connection) = pg_config.connect(tls).await?;
                tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        warn!("PostgreSQL connection closed with error: {}", e);
                    }
                });
                client
            }
        };

        info!("Connected to {}: {}", dialect, config.display_target());

        let conn = if dialect == Dialect::CockroachDb {
            PgConnection::cockroach(client)
        } else {
            PgConnection::new(client)
        };
        Ok(if config.search_path.is_empty() {
            conn
        } else {
            conn.with_search_path(config.search_path.clone())
        })
    }
}

#[async_trait]
impl<C> Connection for PgConnection<C>
where
    C: GenericClient + Send + Sync,
{
    fn client(&self) -> &str {
        self.dialect.name()
    }

    async fn query(&self, sql: &str, params: &[&str]) -> Result<Vec<Row>> {
        let params: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();
        let rows = self.client.query(sql, &params).await?;
        rows.iter().map(decode_row).collect()
    }

    async fn search_path(&self) -> Result<Vec<String>> {
        if let Some(path) = &self.search_path {
            return Ok(path.clone());
        }
        let row = self.client.query_one(SEARCH_PATH_SQL, &[]).await?;
        let setting: String = row.try_get("search_path")?;
        let user: String = row.try_get("current_user")?;
        let path = parse_search_path(&setting, &user);
        debug!("Server search_path '{}' resolved to {:?}", setting, path);
        Ok(path)
    }
}

/// Split a `search_path` setting, unquoting entries and expanding `"$user"`.
fn parse_search_path(setting: &str, user: &str) -> Vec<String> {
    setting
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let unquoted = entry
                .strip_prefix('"')
                .and_then(|e| e.strip_suffix('"'))
                .map(|e| e.replace("\"\"", "\""))
                .unwrap_or_else(|| entry.to_string());
            if unquoted == "$user" {
                user.to_string()
            } else {
                unquoted
            }
        })
        .collect()
}

fn decode_row(row: &tokio_postgres::Row) -> Result<Row> {
    let mut out = Row::with_capacity(row.len());
    for (idx, column) in row.columns().iter().enumerate() {
        let ty = column.type_();
        let fail = |e: tokio_postgres::Error| InspectError::decode(column.name(), e);

        let value: SqlValue = if *ty == Type::BOOL {
            row.try_get::<_, Option<bool>>(idx).map_err(fail)?.into()
        } else if *ty == Type::INT2 {
            row.try_get::<_, Option<i16>>(idx)
                .map_err(fail)?
                .map(i64::from)
                .into()
        } else if *ty == Type::INT4 {
            row.try_get::<_, Option<i32>>(idx).map_err(fail)?.into()
        } else if *ty == Type::INT8 {
            row.try_get::<_, Option<i64>>(idx).map_err(fail)?.into()
        } else if *ty == Type::OID {
            row.try_get::<_, Option<u32>>(idx)
                .map_err(fail)?
                .map(i64::from)
                .into()
        } else if *ty == Type::FLOAT4 {
            row.try_get::<_, Option<f32>>(idx)
                .map_err(fail)?
                .map(f64::from)
                .into()
        } else if *ty == Type::FLOAT8 {
            row.try_get::<_, Option<f64>>(idx).map_err(fail)?.into()
        } else if *ty == Type::CHAR {
            // the single-byte "char" type of pg_catalog flag columns
            row.try_get::<_, Option<i8>>(idx)
                .map_err(fail)?
                .map(|c| char::from(c as u8).to_string())
                .into()
        } else if *ty == Type::TEXT_ARRAY || *ty == Type::NAME_ARRAY || *ty == Type::VARCHAR_ARRAY {
            row.try_get::<_, Option<Vec<String>>>(idx).map_err(fail)?.into()
        } else {
            row.try_get::<_, Option<String>>(idx).map_err(fail)?.into()
        };
        out.push(column.name(), value);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_path() {
        assert_eq!(
            parse_search_path("\"$user\", public", "app"),
            vec!["app", "public"]
        );
        assert_eq!(
            parse_search_path("public,test", "app"),
            vec!["public", "test"]
        );
        assert_eq!(
            parse_search_path("\"My Schema\", public", "app"),
            vec!["My Schema", "public"]
        );
        assert!(parse_search_path("", "app").is_empty());
    }
}
