//! MySQL / MariaDB bridge over a small sqlx pool.

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow, MySqlSslMode};
use sqlx::{Column as _, Row as _, TypeInfo as _, ValueRef as _};
use tracing::info;

use crate::config::ConnectionConfig;
use crate::core::{Connection, Row, SqlValue};
use crate::error::{InspectError, Result};

/// A MySQL session usable by the inspector.
pub struct MysqlConnection {
    pool: MySqlPool,
}

impl MysqlConnection {
    /// Wrap an existing pool.
    pub fn from_pool(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Open a pool described by `config`.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.effective_port().unwrap_or(3306))
            .database(&config.database)
            .username(&config.user)
            .password(&config.password)
            .ssl_mode(MySqlSslMode::Preferred);

        let pool = MySqlPoolOptions::new()
            .max_connections(2)
            .connect_with(options)
            .await?;
        info!("Connected to mysql: {}", config.display_target());
        Ok(Self::from_pool(pool))
    }
}

#[async_trait]
impl Connection for MysqlConnection {
    fn client(&self) -> &str {
        "mysql"
    }

    async fn query(&self, sql: &str, params: &[&str]) -> Result<Vec<Row>> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = query.bind(*param);
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(decode_row).collect()
    }
}

fn decode_row(row: &MySqlRow) -> Result<Row> {
    let mut out = Row::with_capacity(row.len());
    for (idx, column) in row.columns().iter().enumerate() {
        let name = column.name();
        let fail = |e: sqlx::Error| InspectError::decode(name, e);

        if row.try_get_raw(idx).map_err(fail)?.is_null() {
            out.push(name, SqlValue::Null);
            continue;
        }

        let type_name = column.type_info().name();
        let value = match type_name {
            "BOOLEAN" => SqlValue::Bool(row.try_get_unchecked::<bool, _>(idx).map_err(fail)?),
            "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
                SqlValue::Int(row.try_get_unchecked::<i64, _>(idx).map_err(fail)?)
            }
            t if t.ends_with("UNSIGNED") => {
                let v = row.try_get_unchecked::<u64, _>(idx).map_err(fail)?;
                SqlValue::Int(i64::try_from(v).map_err(|e| InspectError::decode(name, e))?)
            }
            "FLOAT" | "DOUBLE" => SqlValue::Float(row.try_get_unchecked::<f64, _>(idx).map_err(fail)?),
            _ => SqlValue::Text(row.try_get_unchecked::<String, _>(idx).map_err(fail)?),
        };
        out.push(name, value);
    }
    Ok(out)
}
