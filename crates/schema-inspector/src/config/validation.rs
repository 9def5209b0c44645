//! Configuration validation.

use super::InspectConfig;
use crate::core::Dialect;
use crate::drivers::SslMode;
use crate::error::{InspectError, Result};

/// Validate the configuration.
pub fn validate(config: &InspectConfig) -> Result<()> {
    let conn = &config.connection;
    let dialect = conn.dialect()?;

    if dialect == Dialect::Sqlite {
        if conn.path.is_none() {
            return Err(InspectError::Config(
                "connection.path is required for sqlite".into(),
            ));
        }
    } else {
        if conn.host.is_empty() {
            return Err(InspectError::Config("connection.host is required".into()));
        }
        if conn.database.is_empty() {
            return Err(InspectError::Config(
                "connection.database is required".into(),
            ));
        }
        if conn.user.is_empty() {
            return Err(InspectError::Config("connection.user is required".into()));
        }
    }

    if let Some(0) = conn.port {
        return Err(InspectError::Config(
            "connection.port must be between 1 and 65535".into(),
        ));
    }

    if !conn.search_path.is_empty() && !dialect.uses_search_path() {
        return Err(InspectError::Config(format!(
            "connection.search_path is not supported for {}",
            dialect
        )));
    }
    if conn.search_path.iter().any(|s| s.trim().is_empty()) {
        return Err(InspectError::Config(
            "connection.search_path entries must not be empty".into(),
        ));
    }

    if dialect.uses_search_path() {
        SslMode::parse(&conn.ssl_mode)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConnectionConfig;
    use std::path::PathBuf;

    fn valid_config() -> InspectConfig {
        InspectConfig {
            connection: ConnectionConfig {
                dialect: "postgres".to_string(),
                host: "localhost".to_string(),
                port: None,
                database: "app".to_string(),
                user: "postgres".to_string(),
                password: "password".to_string(),
                path: None,
                search_path: Vec::new(),
                schema: None,
                ssl_mode: "disable".to_string(),
                encrypt: true,
                trust_server_cert: false,
            },
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_missing_host() {
        let mut config = valid_config();
        config.connection.host = "".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_missing_user() {
        let mut config = valid_config();
        config.connection.user = "".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_sqlite_requires_path() {
        let mut config = valid_config();
        config.connection.dialect = "sqlite".to_string();
        assert!(validate(&config).is_err());

        config.connection.path = Some(PathBuf::from(":memory:"));
        config.connection.host = "".to_string();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_search_path_only_for_postgres_family() {
        let mut config = valid_config();
        config.connection.search_path = vec!["public".to_string()];
        assert!(validate(&config).is_ok());

        config.connection.dialect = "cockroachdb".to_string();
        assert!(validate(&config).is_ok());

        config.connection.dialect = "mysql".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_invalid_ssl_mode() {
        let mut config = valid_config();
        config.connection.ssl_mode = "sometimes".to_string();
        assert!(matches!(validate(&config), Err(InspectError::Config(_))));

        // only checked where it is used
        config.connection.dialect = "mssql".to_string();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_port() {
        let mut config = valid_config();
        config.connection.port = Some(0);
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_debug_redacts_password() {
        let mut config = valid_config();
        config.connection.password = "super_secret_password_123".to_string();
        let debug_output = format!("{:?}", config.connection);
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_password_123"));
    }
}
