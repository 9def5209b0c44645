//! Supported dialect identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InspectError;

use super::statement::Placeholder;

/// A database dialect this library can inspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Mysql,
    Postgres,
    #[serde(rename = "cockroachdb")]
    CockroachDb,
    Sqlite,
    #[serde(rename = "oracledb")]
    Oracle,
    Mssql,
}

impl Dialect {
    /// Every dialect, in the order they are documented.
    pub const ALL: [Dialect; 6] = [
        Dialect::Mysql,
        Dialect::Postgres,
        Dialect::CockroachDb,
        Dialect::Sqlite,
        Dialect::Oracle,
        Dialect::Mssql,
    ];

    /// The external identifier (`mysql`, `postgres`, `cockroachdb`, `sqlite`,
    /// `oracledb`, `mssql`).
    pub fn name(self) -> &'static str {
        match self {
            Dialect::Mysql => "mysql",
            Dialect::Postgres => "postgres",
            Dialect::CockroachDb => "cockroachdb",
            Dialect::Sqlite => "sqlite",
            Dialect::Oracle => "oracledb",
            Dialect::Mssql => "mssql",
        }
    }

    /// Bind-parameter syntax used in this dialect's catalog statements.
    pub fn placeholder(self) -> Placeholder {
        match self {
            Dialect::Mysql | Dialect::Sqlite => Placeholder::Question,
            Dialect::Postgres | Dialect::CockroachDb => Placeholder::Dollar,
            Dialect::Oracle => Placeholder::Colon,
            Dialect::Mssql => Placeholder::AtP,
        }
    }

    /// Default TCP port, where the dialect has one.
    pub fn default_port(self) -> Option<u16> {
        match self {
            Dialect::Mysql => Some(3306),
            Dialect::Postgres => Some(5432),
            Dialect::CockroachDb => Some(26257),
            Dialect::Sqlite => None,
            Dialect::Oracle => Some(1521),
            Dialect::Mssql => Some(1433),
        }
    }

    /// True for the dialects that resolve tables through a search path.
    pub fn uses_search_path(self) -> bool {
        matches!(self, Dialect::Postgres | Dialect::CockroachDb)
    }
}

impl FromStr for Dialect {
    type Err = InspectError;

    /// Exact, case-sensitive match on the external identifier.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dialect::ALL
            .into_iter()
            .find(|dialect| dialect.name() == s)
            .ok_or_else(|| InspectError::UnknownDialect(s.to_string()))
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
