//! SQL Server inspector over the `sys.*` catalog views.
//!
//! Scope is the caller's default schema (`SCHEMA_NAME()`) unless a schema
//! override is given.

use async_trait::async_trait;

use crate::core::normalize::{mssql_default, normalize_action, strip_wrapping_parens};
use crate::core::{
    ColumnInfo, ColumnRef, Connection, Dialect, ForeignKeyInfo, Row, SchemaInspector, Statement,
    TableInfo,
};
use crate::error::{InspectError, Result};

const TABLES_SQL: &str = r#"
    SELECT t.name AS table_name,
           s.name AS table_schema,
           CAST(ep.value AS NVARCHAR(4000)) AS table_comment
    FROM sys.tables t
    JOIN sys.schemas s ON s.schema_id = t.schema_id
    LEFT JOIN sys.extended_properties ep
      ON ep.class = 1
     AND ep.major_id = t.object_id
     AND ep.minor_id = 0
     AND ep.name = 'MS_Description'
    WHERE s.name = {schema}
      AND t.is_ms_shipped = 0
      {table_filter}
    ORDER BY t.name
"#;

const COLUMNS_SQL: &str = r#"
    SELECT t.name AS table_name,
           c.name AS column_name
    FROM sys.columns c
    JOIN sys.tables t ON t.object_id = c.object_id
    JOIN sys.schemas s ON s.schema_id = t.schema_id
    WHERE s.name = {schema}
      AND t.is_ms_shipped = 0
      {table_filter}
    ORDER BY t.name, c.column_id
"#;

const COLUMN_INFO_SQL: &str = r#"
    SELECT t.name AS table_name,
           s.name AS table_schema,
           c.name AS column_name,
           ty.name AS data_type,
           CAST(c.max_length AS INT) AS max_length,
           CAST(c.precision AS INT) AS numeric_precision,
           CAST(c.scale AS INT) AS numeric_scale,
           c.is_nullable AS is_nullable,
           CAST(CASE WHEN ic.column_id IS NULL THEN 0 ELSE 1 END AS BIT) AS is_identity,
           c.is_computed AS is_computed,
           cc.definition AS generation_expression,
           dc.definition AS default_value,
           CAST(ep.value AS NVARCHAR(4000)) AS column_comment
    FROM sys.columns c
    JOIN sys.tables t ON t.object_id = c.object_id
    JOIN sys.schemas s ON s.schema_id = t.schema_id
    JOIN sys.types ty ON ty.user_type_id = c.user_type_id
    LEFT JOIN sys.identity_columns ic
      ON ic.object_id = c.object_id
     AND ic.column_id = c.column_id
    LEFT JOIN sys.computed_columns cc
      ON cc.object_id = c.object_id
     AND cc.column_id = c.column_id
    LEFT JOIN sys.default_constraints dc
      ON dc.object_id = c.default_object_id
    LEFT JOIN sys.extended_properties ep
      ON ep.class = 1
     AND ep.major_id = c.object_id
     AND ep.minor_id = c.column_id
     AND ep.name = 'MS_Description'
    WHERE s.name = {schema}
      AND t.is_ms_shipped = 0
      {table_filter}
    ORDER BY t.name, c.column_id
"#;

// Primary keys and unique constraints are both backed by unique indexes.
const KEY_INDEXES_SQL: &str = r#"
    SELECT t.name AS table_name,
           c.name AS column_name,
           i.name AS index_name,
           i.is_primary_key AS is_primary_key,
           (SELECT COUNT(*)
              FROM sys.index_columns k
             WHERE k.object_id = i.object_id
               AND k.index_id = i.index_id
               AND k.is_included_column = 0) AS column_count
    FROM sys.indexes i
    JOIN sys.index_columns ic
      ON ic.object_id = i.object_id
     AND ic.index_id = i.index_id
     AND ic.is_included_column = 0
    JOIN sys.columns c
      ON c.object_id = ic.object_id
     AND c.column_id = ic.column_id
    JOIN sys.tables t ON t.object_id = i.object_id
    JOIN sys.schemas s ON s.schema_id = t.schema_id
    WHERE s.name = {schema}
      AND i.is_unique = 1
      AND i.has_filter = 0
      {table_filter}
    ORDER BY t.name, i.is_primary_key DESC, i.name, ic.key_ordinal
"#;

const PRIMARY_SQL: &str = r#"
    SELECT c.name AS column_name
    FROM sys.indexes i
    JOIN sys.index_columns ic
      ON ic.object_id = i.object_id
     AND ic.index_id = i.index_id
    JOIN sys.columns c
      ON c.object_id = ic.object_id
     AND c.column_id = ic.column_id
    JOIN sys.tables t ON t.object_id = i.object_id
    JOIN sys.schemas s ON s.schema_id = t.schema_id
    WHERE s.name = {schema}
      AND t.name = {table}
      AND i.is_primary_key = 1
    ORDER BY ic.key_ordinal
"#;

const FOREIGN_KEYS_SQL: &str = r#"
    SELECT t.name AS table_name,
           pc.name AS column_name,
           rt.name AS foreign_key_table,
           rc.name AS foreign_key_column,
           rs.name AS foreign_key_schema,
           fk.name AS constraint_name,
           fk.update_referential_action_desc AS on_update,
           fk.delete_referential_action_desc AS on_delete
    FROM sys.foreign_keys fk
    JOIN sys.foreign_key_columns fkc ON fkc.constraint_object_id = fk.object_id
    JOIN sys.tables t ON t.object_id = fk.parent_object_id
    JOIN sys.schemas s ON s.schema_id = t.schema_id
    JOIN sys.columns pc
      ON pc.object_id = fkc.parent_object_id
     AND pc.column_id = fkc.parent_column_id
    JOIN sys.tables rt ON rt.object_id = fk.referenced_object_id
    JOIN sys.schemas rs ON rs.schema_id = rt.schema_id
    JOIN sys.columns rc
      ON rc.object_id = fkc.referenced_object_id
     AND rc.column_id = fkc.referenced_column_id
    WHERE s.name = {schema}
      {table_filter}
    ORDER BY t.name, fk.name, fkc.constraint_column_id
"#;

/// Schema inspector for Microsoft SQL Server.
#[derive(Clone, Copy)]
pub struct MssqlInspector<'c> {
    conn: &'c dyn Connection,
    schema: Option<&'c str>,
}

impl<'c> MssqlInspector<'c> {
    pub fn new(conn: &'c dyn Connection) -> Self {
        Self { conn, schema: None }
    }

    /// Inspect `schema` instead of the caller's default schema.
    #[must_use]
    pub fn with_schema(mut self, schema: &'c str) -> Self {
        self.schema = Some(schema);
        self
    }

    fn statement(&self, template: &'static str) -> Statement {
        let stmt = Statement::new(template, Dialect::Mssql.placeholder());
        match self.schema {
            Some(schema) => stmt.bind("schema", schema),
            None => stmt.raw("schema", "SCHEMA_NAME()"),
        }
    }

    async fn table_rows(&self, table: Option<&str>) -> Result<Vec<Row>> {
        self.statement(TABLES_SQL)
            .filter("table_filter", "t.name", table)
            .fetch(self.conn, "tables")
            .await
    }
}

fn table_info_from_row(row: &Row) -> Result<TableInfo> {
    Ok(TableInfo {
        name: row.required_text("table_name")?,
        schema: row.text("table_schema")?,
        comment: row.text("table_comment")?,
    })
}

const CHARACTER_TYPES: &[&str] = &["char", "varchar", "binary", "varbinary"];
const NATIONAL_TYPES: &[&str] = &["nchar", "nvarchar"];
const NUMERIC_TYPES: &[&str] = &[
    "tinyint", "smallint", "int", "bigint", "decimal", "numeric", "float", "real", "money",
    "smallmoney",
];

fn column_from_row(row: &Row) -> Result<ColumnInfo> {
    let data_type = row.required_text("data_type")?;
    let mut column = ColumnInfo::new(
        row.required_text("table_name")?,
        row.required_text("column_name")?,
        data_type.clone(),
    );
    column.schema = row.text("table_schema")?;

    // sys.columns.max_length is in bytes; -1 marks (max) and is kept as is
    let bytes = row.int("max_length")?;
    let ty = data_type.to_ascii_lowercase();
    if CHARACTER_TYPES.contains(&ty.as_str()) {
        column.max_length = bytes;
    } else if NATIONAL_TYPES.contains(&ty.as_str()) {
        column.max_length = bytes.map(|b| if b > 0 { b / 2 } else { b });
    }
    if NUMERIC_TYPES.contains(&ty.as_str()) {
        column.numeric_precision = row.int("numeric_precision")?;
        column.numeric_scale = row.int("numeric_scale")?;
    }

    column.is_nullable = row.flag("is_nullable")?;
    column.has_auto_increment = row.flag("is_identity")?;
    column.comment = row.text("column_comment")?;

    if row.flag("is_computed")? {
        column.is_generated = true;
        column.generation_expression = row
            .text("generation_expression")?
            .map(|expr| strip_wrapping_parens(&expr).to_string());
    } else {
        column.default_value = mssql_default(row.text("default_value")?.as_deref());
    }
    Ok(column)
}

fn apply_key_indexes(columns: &mut [ColumnInfo], rows: &[Row]) -> Result<()> {
    for row in rows {
        let table = row.required_text("table_name")?;
        let name = row.required_text("column_name")?;
        let Some(column) = columns
            .iter_mut()
            .find(|c| c.table == table && c.name == name)
        else {
            continue;
        };
        column.is_primary_key |= row.flag("is_primary_key")?;
        column.is_unique |= row.int("column_count")? == Some(1);
    }
    Ok(())
}

fn foreign_key_from_row(row: &Row) -> Result<ForeignKeyInfo> {
    Ok(ForeignKeyInfo {
        table: row.required_text("table_name")?,
        column: row.required_text("column_name")?,
        foreign_key_table: row.required_text("foreign_key_table")?,
        foreign_key_column: row.required_text("foreign_key_column")?,
        foreign_key_schema: row.text("foreign_key_schema")?,
        constraint_name: row.text("constraint_name")?,
        on_delete: normalize_action(row.text("on_delete")?.as_deref()),
        on_update: normalize_action(row.text("on_update")?.as_deref()),
    })
}

#[async_trait]
impl SchemaInspector for MssqlInspector<'_> {
    fn dialect(&self) -> Dialect {
        Dialect::Mssql
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
        match self.table_rows(Some(table)).await?.first() {
            Some(row) => table_info_from_row(row),
            None => Err(InspectError::TableNotFound(table.to_string())),
        }
    }

    async fn has_table(&self, table: &str) -> Result<bool> {
        Ok(!self.table_rows(Some(table)).await?.is_empty())
    }

    async fn columns(&self, table: Option<&str>) -> Result<Vec<ColumnRef>> {
        self.statement(COLUMNS_SQL)
            .filter("table_filter", "t.name", table)
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
        let mut columns = self
            .statement(COLUMN_INFO_SQL)
            .filter("table_filter", "t.name", table)
            .fetch(self.conn, "column_info")
            .await?
            .iter()
            .map(column_from_row)
            .collect::<Result<Vec<_>>>()?;
        if columns.is_empty() {
            return Ok(columns);
        }

        let keys = self
            .statement(KEY_INDEXES_SQL)
            .filter("table_filter", "t.name", table)
            .fetch(self.conn, "key_indexes")
            .await?;
        apply_key_indexes(&mut columns, &keys)?;

        for fk in self.foreign_keys(table).await? {
            if let Some(column) = columns
                .iter_mut()
                .find(|c| c.table == fk.table && c.name == fk.column)
            {
                column.set_reference(&fk);
            }
        }
        Ok(columns)
    }

    async fn column_info_of(&self, table: &str, column: &str) -> Result<ColumnInfo> {
        self.column_info(Some(table))
            .await?
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
        rows.first()
            .map(|row| row.required_text("column_name"))
            .transpose()
    }

    async fn foreign_keys(&self, table: Option<&str>) -> Result<Vec<ForeignKeyInfo>> {
        self.statement(FOREIGN_KEYS_SQL)
            .filter("table_filter", "t.name", table)
            .fetch(self.conn, "foreign_keys")
            .await?
            .iter()
            .map(foreign_key_from_row)
            .collect()
    }
}
