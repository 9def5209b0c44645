//! SQL Server bridge over tiberius.
//!
//! A tiberius client needs `&mut self` to run a query, so the session sits
//! behind an async mutex and catalog statements run one at a time.

use async_trait::async_trait;
use tiberius::{AuthMethod, Client, ColumnData, Config, EncryptionLevel, ToSql};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{info, warn};

use crate::config::ConnectionConfig;
use crate::core::{Connection, Row, SqlValue};
use crate::error::{InspectError, Result};

/// The tiberius client type the bridge drives.
pub type TiberiusClient = Client<Compat<TcpStream>>;

/// A SQL Server session usable by the inspector.
pub struct MssqlConnection {
    client: Mutex<TiberiusClient>,
}

impl MssqlConnection {
    /// Wrap an already connected client.
    pub fn new(client: TiberiusClient) -> Self {
        Self {
            client: Mutex::new(client),
        }
    }

    /// Give back the client.
    pub fn into_inner(self) -> TiberiusClient {
        self.client.into_inner()
    }

    fn build_config(config: &ConnectionConfig) -> Config {
        let mut tds = Config::new();
        tds.host(&config.host);
        tds.port(config.effective_port().unwrap_or(1433));
        tds.database(&config.database);
        tds.application_name("schema-inspector");
        tds.authentication(AuthMethod::sql_server(&config.user, &config.password));

        if config.encrypt {
            tds.encryption(EncryptionLevel::Required);
        } else {
            warn!("SQL Server encryption is disabled. Credentials will be transmitted in plaintext.");
            tds.encryption(EncryptionLevel::NotSupported);
        }
        if config.trust_server_cert {
            tds.trust_cert();
        }
        tds
    }

    /// Open a session described by `config`.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let tds = Self::build_config(config);
        let tcp = TcpStream::connect(tds.get_addr())
            .await
            .map_err(|e| InspectError::catalog("mssql", e))?;
        tcp.set_nodelay(true).ok();

        let client = Client::connect(tds, tcp.compat_write()).await?;
        info!("Connected to mssql: {}", config.display_target());
        Ok(Self::new(client))
    }
}

#[async_trait]
impl Connection for MssqlConnection {
    fn client(&self) -> &str {
        "mssql"
    }

    async fn query(&self, sql: &str, params: &[&str]) -> Result<Vec<Row>> {
        let params: Vec<&dyn ToSql> = params.iter().map(|p| p as &dyn ToSql).collect();
        let mut client = self.client.lock().await;
        let rows = client.query(sql, &params).await?.into_first_result().await?;
        rows.iter().map(decode_row).collect()
    }
}

fn decode_row(row: &tiberius::Row) -> Result<Row> {
    let mut out = Row::with_capacity(row.len());
    for (column, data) in row.cells() {
        let value = match data {
            ColumnData::U8(v) => SqlValue::from(v.map(i64::from)),
            ColumnData::I16(v) => SqlValue::from(v.map(i64::from)),
            ColumnData::I32(v) => SqlValue::from(*v),
            ColumnData::I64(v) => SqlValue::from(*v),
            ColumnData::F32(v) => SqlValue::from(v.map(f64::from)),
            ColumnData::F64(v) => SqlValue::from(*v),
            ColumnData::Bit(v) => SqlValue::from(*v),
            ColumnData::String(v) => SqlValue::from(v.as_ref().map(|s| s.to_string())),
            ColumnData::Numeric(v) => SqlValue::from(
                v.as_ref()
                    .map(|n| n.value() as f64 / 10f64.powi(i32::from(n.scale()))),
            ),
            other => {
                return Err(InspectError::decode(
                    column.name(),
                    format!("unsupported catalog value {:?}", other),
                ))
            }
        };
        out.push(column.name(), value);
    }
    Ok(out)
}
