//! MySQL / MariaDB inspector over `information_schema`.
//!
//! Scope is the connection's current database (`DATABASE()`) unless a schema
//! override is given. Text columns are cast to `CHAR` and counts to `SIGNED`
//! so binary collations and unsigned widths decode uniformly.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::core::normalize::{
    mysql_default, mysql_enum_values, mysql_set_values, normalize_action, strip_type_args,
};
use crate::core::{
    ColumnInfo, ColumnRef, Connection, Dialect, ForeignKeyInfo, Row, SchemaInspector, Statement,
    TableInfo,
};
use crate::error::{InspectError, Result};

const TABLES_SQL: &str = r#"
    SELECT CAST(t.TABLE_NAME AS CHAR(255)) AS table_name,
           CAST(t.TABLE_COMMENT AS CHAR(2048)) AS table_comment
    FROM information_schema.TABLES t
    WHERE t.TABLE_TYPE = 'BASE TABLE'
      AND t.TABLE_SCHEMA = {schema}
      {table_filter}
    ORDER BY t.TABLE_NAME
"#;

const COLUMNS_SQL: &str = r#"
    SELECT CAST(c.TABLE_NAME AS CHAR(255)) AS table_name,
           CAST(c.COLUMN_NAME AS CHAR(255)) AS column_name
    FROM information_schema.COLUMNS c
    JOIN information_schema.TABLES t
      ON t.TABLE_SCHEMA = c.TABLE_SCHEMA
     AND t.TABLE_NAME = c.TABLE_NAME
     AND t.TABLE_TYPE = 'BASE TABLE'
    WHERE c.TABLE_SCHEMA = {schema}
      {table_filter}
    ORDER BY c.TABLE_NAME, c.ORDINAL_POSITION
"#;

// One row per column, plus one extra row per additional foreign key the
// column takes part in; rows are folded per (table, column) in order.
const COLUMN_INFO_SQL: &str = r#"
    SELECT CAST(c.TABLE_NAME AS CHAR(255)) AS table_name,
           CAST(c.COLUMN_NAME AS CHAR(255)) AS column_name,
           CAST(c.COLUMN_DEFAULT AS CHAR(4096)) AS column_default,
           CAST(c.COLUMN_TYPE AS CHAR(4096)) AS column_type,
           CAST(c.CHARACTER_MAXIMUM_LENGTH AS SIGNED) AS character_maximum_length,
           CAST(c.NUMERIC_PRECISION AS SIGNED) AS numeric_precision,
           CAST(c.NUMERIC_SCALE AS SIGNED) AS numeric_scale,
           CAST(c.IS_NULLABLE AS CHAR(3)) AS is_nullable,
           CAST(c.COLUMN_KEY AS CHAR(3)) AS column_key,
           CAST(c.EXTRA AS CHAR(255)) AS extra,
           CAST(c.GENERATION_EXPRESSION AS CHAR(4096)) AS generation_expression,
           CAST(c.COLUMN_COMMENT AS CHAR(1024)) AS column_comment,
           CAST(fk.REFERENCED_TABLE_NAME AS CHAR(255)) AS referenced_table_name,
           CAST(fk.REFERENCED_COLUMN_NAME AS CHAR(255)) AS referenced_column_name
    FROM information_schema.COLUMNS c
    JOIN information_schema.TABLES t
      ON t.TABLE_SCHEMA = c.TABLE_SCHEMA
     AND t.TABLE_NAME = c.TABLE_NAME
     AND t.TABLE_TYPE = 'BASE TABLE'
    LEFT JOIN information_schema.KEY_COLUMN_USAGE fk
      ON fk.TABLE_SCHEMA = c.TABLE_SCHEMA
     AND fk.TABLE_NAME = c.TABLE_NAME
     AND fk.COLUMN_NAME = c.COLUMN_NAME
     AND fk.REFERENCED_TABLE_NAME IS NOT NULL
    WHERE c.TABLE_SCHEMA = {schema}
      {table_filter}
    ORDER BY c.TABLE_NAME, c.ORDINAL_POSITION, fk.CONSTRAINT_NAME
"#;

const PRIMARY_SQL: &str = r#"
    SELECT CAST(k.COLUMN_NAME AS CHAR(255)) AS column_name
    FROM information_schema.KEY_COLUMN_USAGE k
    WHERE k.CONSTRAINT_NAME = 'PRIMARY'
      AND k.TABLE_SCHEMA = {schema}
      AND k.TABLE_NAME = {table}
    ORDER BY k.ORDINAL_POSITION
"#;

const FOREIGN_KEYS_SQL: &str = r#"
    SELECT CAST(rc.TABLE_NAME AS CHAR(255)) AS table_name,
           CAST(kcu.COLUMN_NAME AS CHAR(255)) AS column_name,
           CAST(kcu.REFERENCED_TABLE_NAME AS CHAR(255)) AS foreign_key_table,
           CAST(kcu.REFERENCED_COLUMN_NAME AS CHAR(255)) AS foreign_key_column,
           CAST(rc.CONSTRAINT_NAME AS CHAR(255)) AS constraint_name,
           CAST(rc.UPDATE_RULE AS CHAR(32)) AS on_update,
           CAST(rc.DELETE_RULE AS CHAR(32)) AS on_delete
    FROM information_schema.REFERENTIAL_CONSTRAINTS rc
    JOIN information_schema.KEY_COLUMN_USAGE kcu
      ON rc.CONSTRAINT_NAME = kcu.CONSTRAINT_NAME
     AND kcu.CONSTRAINT_SCHEMA = rc.CONSTRAINT_SCHEMA
     AND kcu.TABLE_NAME = rc.TABLE_NAME
    WHERE rc.CONSTRAINT_SCHEMA = {schema}
      {table_filter}
    ORDER BY rc.TABLE_NAME, rc.CONSTRAINT_NAME, kcu.ORDINAL_POSITION
"#;

/// Schema inspector for MySQL and MariaDB.
#[derive(Clone, Copy)]
pub struct MysqlInspector<'c> {
    conn: &'c dyn Connection,
    schema: Option<&'c str>,
}

impl<'c> MysqlInspector<'c> {
    pub fn new(conn: &'c dyn Connection) -> Self {
        Self { conn, schema: None }
    }

    /// Inspect `database` instead of the connection's current database.
    #[must_use]
    pub fn with_schema(mut self, database: &'c str) -> Self {
        self.schema = Some(database);
        self
    }

    fn statement(&self, template: &'static str) -> Statement {
        let stmt = Statement::new(template, Dialect::Mysql.placeholder());
        match self.schema {
            Some(database) => stmt.bind("schema", database),
            None => stmt.raw("schema", "DATABASE()"),
        }
    }

    async fn table_rows(&self, table: Option<&str>) -> Result<Vec<Row>> {
        self.statement(TABLES_SQL)
            .filter("table_filter", "t.TABLE_NAME", table)
            .fetch(self.conn, "tables")
            .await
    }
}

/// The database is the scope, so `schema` stays unset like the columns'.
fn table_info_from_row(row: &Row) -> Result<TableInfo> {
    Ok(TableInfo {
        name: row.required_text("table_name")?,
        schema: None,
        comment: row.text("table_comment")?.filter(|c| !c.is_empty()),
    })
}

fn column_from_row(row: &Row) -> Result<ColumnInfo> {
    let column_type = row.required_text("column_type")?;
    let column_key = row.text("column_key")?.unwrap_or_default();
    let extra = row.text("extra")?.unwrap_or_default();
    // DEFAULT_GENERATED marks expression defaults, not generated columns
    let generation_expression = row
        .text("generation_expression")?
        .filter(|expr| !expr.is_empty());
    let is_generated = extra.ends_with("GENERATED")
        && !extra.contains("DEFAULT_GENERATED")
        && generation_expression.is_some();

    let mut column = ColumnInfo::new(
        row.required_text("table_name")?,
        row.required_text("column_name")?,
        strip_type_args(&column_type),
    );
    column.default_value = mysql_default(row.text("column_default")?.as_deref());
    column.max_length = row.int("character_maximum_length")?;
    column.numeric_precision = row.int("numeric_precision")?;
    column.numeric_scale = row.int("numeric_scale")?;
    column.is_generated = is_generated;
    column.generation_expression = generation_expression.filter(|_| is_generated);
    column.is_nullable = row.flag("is_nullable")?;
    column.is_unique = column_key == "UNI";
    column.is_primary_key = column_key == "PRI";
    column.has_auto_increment = extra.contains("auto_increment");
    column.foreign_key_table = row.text("referenced_table_name")?;
    column.foreign_key_column = row.text("referenced_column_name")?;
    column.enum_values = mysql_enum_values(&column_type);
    column.set_values = mysql_set_values(&column_type);
    column.comment = Some(row.text("column_comment")?.unwrap_or_default());
    Ok(column)
}

/// Collapse the per-foreign-key duplicate rows; the first row of each
/// (table, column) pair wins.
fn fold_columns(rows: &[Row]) -> Result<Vec<ColumnInfo>> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut columns = Vec::with_capacity(rows.len());
    for row in rows {
        let column = column_from_row(row)?;
        if seen.insert((column.table.clone(), column.name.clone())) {
            columns.push(column);
        }
    }
    Ok(columns)
}

fn foreign_key_from_row(row: &Row) -> Result<ForeignKeyInfo> {
    Ok(ForeignKeyInfo {
        table: row.required_text("table_name")?,
        column: row.required_text("column_name")?,
        foreign_key_table: row.required_text("foreign_key_table")?,
        foreign_key_column: row.required_text("foreign_key_column")?,
        foreign_key_schema: None,
        constraint_name: row.text("constraint_name")?,
        on_delete: normalize_action(row.text("on_delete")?.as_deref()),
        on_update: normalize_action(row.text("on_update")?.as_deref()),
    })
}

#[async_trait]
impl SchemaInspector for MysqlInspector<'_> {
    fn dialect(&self) -> Dialect {
        Dialect::Mysql
    }

    async fn tables(&self) -> Result<Vec<String>> {
        self.table_rows(None)
            .await?
            .iter()
            .map(|row| row.required_text("table_name"))
            .collect()
    }

    async fn table_info(&self) -> Result<Vec<TableInfo>> {
        self.table_rows(None)
            .await?
            .iter()
            .map(table_info_from_row)
            .collect()
    }

    async fn table_info_of(&self, table: &str) -> Result<TableInfo> {
        let rows = self.table_rows(Some(table)).await?;
        match rows.first() {
            Some(row) => table_info_from_row(row),
            None => Err(InspectError::TableNotFound(table.to_string())),
        }
    }

    async fn has_table(&self, table: &str) -> Result<bool> {
        Ok(!self.table_rows(Some(table)).await?.is_empty())
    }

    async fn columns(&self, table: Option<&str>) -> Result<Vec<ColumnRef>> {
        self.statement(COLUMNS_SQL)
            .filter("table_filter", "c.TABLE_NAME", table)
            .fetch(self.conn, "columns")
            .await?
            .iter()
            .map(|row| {
                Ok(ColumnRef {
                    table: row.required_text("table_name")?,
                    column: row.required_text("column_name")?,
                })
            })
            .collect()
    }

    async fn column_info(&self, table: Option<&str>) -> Result<Vec<ColumnInfo>> {
        let rows = self
            .statement(COLUMN_INFO_SQL)
            .filter("table_filter", "c.TABLE_NAME", table)
            .fetch(self.conn, "column_info")
            .await?;
        fold_columns(&rows)
    }

    async fn column_info_of(&self, table: &str, column: &str) -> Result<ColumnInfo> {
        let rows = self
            .statement(COLUMN_INFO_SQL)
            .filter("table_filter", "c.TABLE_NAME", Some(table))
            .fetch(self.conn, "column_info")
            .await?;
        fold_columns(&rows)?
            .into_iter()
            .find(|c| c.name == column)
            .ok_or_else(|| InspectError::column_not_found(table, column))
    }

    async fn primary(&self, table: &str) -> Result<Option<String>> {
        let rows = self
            .statement(PRIMARY_SQL)
            .bind("table", table)
            .fetch(self.conn, "primary")
            .await?;
        match rows.first() {
            Some(row) => row.text("column_name"),
            None => Ok(None),
        }
    }

    async fn foreign_keys(&self, table: Option<&str>) -> Result<Vec<ForeignKeyInfo>> {
        self.statement(FOREIGN_KEYS_SQL)
            .filter("table_filter", "rc.TABLE_NAME", table)
            .fetch(self.conn, "foreign_keys")
            .await?
            .iter()
            .map(foreign_key_from_row)
            .collect()
    }
}
