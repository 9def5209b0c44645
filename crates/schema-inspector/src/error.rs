//! Error types for the inspection library.

use thiserror::Error;

/// Main error type for schema inspection.
#[derive(Error, Debug)]
pub enum InspectError {
    /// Dialect name is not one of the supported identifiers
    #[error("Unknown dialect \"{0}\" (expected one of: mysql, postgres, cockroachdb, sqlite, oracledb, mssql)")]
    UnknownDialect(String),

    /// Single-table lookup against a table that is not in scope
    #[error("Table \"{0}\" does not exist")]
    TableNotFound(String),

    /// Single-column lookup against a column that is not in scope
    #[error("Column \"{column}\" does not exist in table \"{table}\"")]
    ColumnNotFound { table: String, column: String },

    /// The database rejected or failed a catalog query
    #[error("Catalog query failed ({dialect}): {message}")]
    CatalogQuery { dialect: String, message: String },

    /// A catalog row carried a value of an unexpected shape
    #[error("Could not decode catalog column {column}: {message}")]
    Decode { column: String, message: String },

    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file operations, sockets)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl InspectError {
    /// Create a CatalogQuery error tagged with the dialect that produced it
    pub fn catalog(dialect: impl Into<String>, message: impl std::fmt::Display) -> Self {
        InspectError::CatalogQuery {
            dialect: dialect.into(),
            message: message.to_string(),
        }
    }

    /// Create a Decode error
    pub fn decode(column: impl Into<String>, message: impl std::fmt::Display) -> Self {
        InspectError::Decode {
            column: column.into(),
            message: message.to_string(),
        }
    }

    /// Create a ColumnNotFound error
    pub fn column_not_found(table: impl Into<String>, column: impl Into<String>) -> Self {
        InspectError::ColumnNotFound {
            table: table.into(),
            column: column.into(),
        }
    }

    /// True for the two lookup failures that existence checks translate into `false`.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            InspectError::TableNotFound(_) | InspectError::ColumnNotFound { .. }
        )
    }

    /// Process exit code used by the command-line front end.
    pub fn exit_code(&self) -> u8 {
        match self {
            InspectError::TableNotFound(_) | InspectError::ColumnNotFound { .. } => 1,
            InspectError::UnknownDialect(_)
            | InspectError::Config(_)
            | InspectError::Io(_)
            | InspectError::Yaml(_) => 2,
            InspectError::CatalogQuery { .. } | InspectError::Decode { .. } => 3,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

#[cfg(feature = "postgres")]
impl From<tokio_postgres::Error> for InspectError {
    fn from(err: tokio_postgres::Error) -> Self {
        // db errors carry the server message; the Display impl only says "db error"
        match err.as_db_error() {
            Some(db) => InspectError::catalog("postgres", format!("{}: {}", db.code().code(), db.message())),
            None => InspectError::catalog("postgres", err),
        }
    }
}

#[cfg(feature = "mssql")]
impl From<tiberius::error::Error> for InspectError {
    fn from(err: tiberius::error::Error) -> Self {
        InspectError::catalog("mssql", err)
    }
}

#[cfg(any(feature = "mysql", feature = "sqlite"))]
impl From<sqlx::Error> for InspectError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::ColumnDecode { index, source } => InspectError::decode(index.clone(), source),
            _ => InspectError::catalog("sqlx", err),
        }
    }
}

/// Result type alias for inspection operations.
pub type Result<T> = std::result::Result<T, InspectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(InspectError::TableNotFound("users".into()).is_not_found());
        assert!(InspectError::column_not_found("users", "email").is_not_found());
        assert!(!InspectError::catalog("mysql", "boom").is_not_found());
        assert!(!InspectError::UnknownDialect("db2".into()).is_not_found());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(InspectError::TableNotFound("t".into()).exit_code(), 1);
        assert_eq!(InspectError::Config("bad".into()).exit_code(), 2);
        assert_eq!(InspectError::UnknownDialect("db2".into()).exit_code(), 2);
        assert_eq!(InspectError::catalog("postgres", "timeout").exit_code(), 3);
    }

    #[test]
    fn test_messages() {
        let err = InspectError::column_not_found("teams", "nope");
        assert_eq!(
            err.to_string(),
            "Column \"nope\" does not exist in table \"teams\""
        );

        let err = InspectError::catalog("sqlite", "no such table: x");
        assert!(err.format_detailed().starts_with("Error: Catalog query failed (sqlite)"));
    }
}
