//! Core traits for dialect-agnostic schema inspection.
//!
//! - [`Connection`]: the only thing the library needs from a driver
//! - [`SchemaInspector`]: the unified query surface every dialect implements
//!
//! # Design Patterns
//!
//! - **Strategy**: one `SchemaInspector` implementation per dialect
//! - **Template Method**: `has_column` and `overview` are composed from the
//!   other operations and shared by every dialect

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::Result;

use super::dialect::Dialect;
use super::schema::{ColumnInfo, ColumnRef, ForeignKeyInfo, TableInfo, TableOverview};
use super::value::Row;

/// A live database session the inspector can run catalog SQL on.
///
/// The inspector never opens, closes, pools or retries a connection; the
/// caller owns its lifecycle. A transaction handle is a valid `Connection`,
/// in which case every catalog statement runs inside that transaction.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Dialect identifier of the underlying client (`postgres`, `mssql`, ...).
    fn client(&self) -> &str;

    /// Execute `sql` with text parameters bound to the dialect's native
    /// placeholders and return every row.
    async fn query(&self, sql: &str, params: &[&str]) -> Result<Vec<Row>>;

    /// Configured schema search path, most preferred first.
    ///
    /// Only meaningful for the Postgres family; the default is empty.
    async fn search_path(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

/// Unified schema introspection.
///
/// Every method issues fresh catalog queries; nothing is cached between calls.
#[async_trait]
pub trait SchemaInspector: Send + Sync {
    /// Dialect this inspector speaks.
    fn dialect(&self) -> Dialect;

    /// Names of the base tables in scope.
    async fn tables(&self) -> Result<Vec<String>>;

    /// All tables in scope, ordered by name.
    async fn table_info(&self) -> Result<Vec<TableInfo>>;

    /// One table. Fails with `TableNotFound` when it is not in scope.
    async fn table_info_of(&self, table: &str) -> Result<TableInfo>;

    /// True iff `table` is one of [`tables`](Self::tables).
    async fn has_table(&self, table: &str) -> Result<bool>;

    /// Every (table, column) pair, or only those of `table`.
    async fn columns(&self, table: Option<&str>) -> Result<Vec<ColumnRef>>;

    /// Full column descriptions, or only those of `table`.
    async fn column_info(&self, table: Option<&str>) -> Result<Vec<ColumnInfo>>;

    /// One column. Fails with `ColumnNotFound` when it does not exist.
    async fn column_info_of(&self, table: &str, column: &str) -> Result<ColumnInfo>;

    /// Primary key column of `table`; the first key column for composite keys.
    async fn primary(&self, table: &str) -> Result<Option<String>>;

    /// Foreign keys declared on `table` (the referencing side), or all of them.
    async fn foreign_keys(&self, table: Option<&str>) -> Result<Vec<ForeignKeyInfo>>;

    /// True iff `column` exists in `table`.
    async fn has_column(&self, table: &str, column: &str) -> Result<bool> {
        match self.column_info_of(table, column).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Every table with its primary key and columns, ordered by table name.
    ///
    /// This is a template method built from `tables`, `column_info` and
    /// `primary`.
    async fn overview(&self) -> Result<Vec<TableOverview>> {
        let mut grouped: BTreeMap<String, Vec<ColumnInfo>> = self
            .tables()
            .await?
            .into_iter()
            .map(|table| (table, Vec::new()))
            .collect();

        for column in self.column_info(None).await? {
            if let Some(columns) = grouped.get_mut(&column.table) {
                columns.push(column);
            }
        }

        let mut overview = Vec::with_capacity(grouped.len());
        for (table, columns) in grouped {
            let primary = self.primary(&table).await?;
            overview.push(TableOverview {
                table,
                primary,
                columns,
            });
        }
        Ok(overview)
    }
}
