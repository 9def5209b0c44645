//! Configuration type definitions.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::Dialect;
use crate::error::Result;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectConfig {
    /// The database to inspect.
    pub connection: ConnectionConfig,
}

/// Where and how to connect.
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Dialect name (`mysql`, `postgres`, `cockroachdb`, `sqlite`, `oracledb`, `mssql`).
    pub dialect: String,

    /// Database host.
    #[serde(default)]
    pub host: String,

    /// Database port (default: the dialect's standard port).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Database name.
    #[serde(default)]
    pub database: String,

    /// Username.
    #[serde(default)]
    pub user: String,

    /// Password.
    #[serde(default)]
    pub password: String,

    /// Database file (SQLite only). `:memory:` opens an empty in-memory database.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Schema search path, most preferred first (Postgres family only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub search_path: Vec<String>,

    /// Inspect this schema instead of the connection's default scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// SSL mode for Postgres (default: "require").
    #[serde(default = "default_require")]
    pub ssl_mode: String,

    /// Encrypt the SQL Server connection (default: true).
    #[serde(default = "default_true")]
    pub encrypt: bool,

    /// Trust the SQL Server certificate without validation (default: false).
    #[serde(default)]
    pub trust_server_cert: bool,
}

impl ConnectionConfig {
    /// Parsed dialect.
    pub fn dialect(&self) -> Result<Dialect> {
        self.dialect.parse()
    }

    /// Configured port, else the dialect's default.
    pub fn effective_port(&self) -> Option<u16> {
        self.port
            .or_else(|| self.dialect().ok().and_then(Dialect::default_port))
    }

    /// `host:port/database` (or the file path) for log lines.
    pub fn display_target(&self) -> String {
        match &self.path {
            Some(path) => path.display().to_string(),
            None => format!(
                "{}:{}/{}",
                self.host,
                self.effective_port().unwrap_or_default(),
                self.database
            ),
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("dialect", &self.dialect)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("path", &self.path)
            .field("search_path", &self.search_path)
            .field("schema", &self.schema)
            .field("ssl_mode", &self.ssl_mode)
            .field("encrypt", &self.encrypt)
            .field("trust_server_cert", &self.trust_server_cert)
            .finish()
    }
}

// Default value functions for serde
fn default_require() -> String {
    "require".to_string()
}

fn default_true() -> bool {
    true
}
