//! PostgreSQL and CockroachDB inspector.
//!
//! Both flavors share this adapter. Scope is the schema search path reported
//! by the connection (`["public"]` when it reports none), resolved again on
//! every call. A table name present in several schemas of the path resolves to
//! the first of them, the same way unqualified names resolve in SQL.

mod queries;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::core::normalize::postgres_default;
use crate::core::{
    ColumnInfo, ColumnRef, Connection, Dialect, ForeignKeyInfo, Row, SchemaInspector, Statement,
    TableInfo,
};
use crate::error::{InspectError, Result};

pub use queries::{CatalogQuery, PgQueries, COCKROACH, POSTGRES};

/// Which member of the Postgres family is on the other end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PgFlavor {
    Postgres,
    Cockroach,
}

impl PgFlavor {
    pub fn dialect(self) -> Dialect {
        match self {
            PgFlavor::Postgres => Dialect::Postgres,
            PgFlavor::Cockroach => Dialect::CockroachDb,
        }
    }

    pub fn queries(self) -> &'static PgQueries {
        match self {
            PgFlavor::Postgres => &POSTGRES,
            PgFlavor::Cockroach => &COCKROACH,
        }
    }

    /// Whether a (raw) default expression hands out generated keys.
    fn is_key_generator(self, default: &str) -> bool {
        default.starts_with("nextval(")
            || (self == PgFlavor::Cockroach && default.starts_with("unique_rowid()"))
    }
}

/// Schema inspector for PostgreSQL and CockroachDB.
#[derive(Clone, Copy)]
pub struct PostgresInspector<'c> {
    conn: &'c dyn Connection,
    flavor: PgFlavor,
    schema: Option<&'c str>,
}

impl<'c> PostgresInspector<'c> {
    pub fn new(conn: &'c dyn Connection) -> Self {
        Self {
            conn,
            flavor: PgFlavor::Postgres,
            schema: None,
        }
    }

    /// Inspector using the CockroachDB query set.
    pub fn cockroach(conn: &'c dyn Connection) -> Self {
        Self {
            flavor: PgFlavor::Cockroach,
            ..Self::new(conn)
        }
    }

    /// Use `[schema]` as the search path instead of the connection's.
    #[must_use]
    pub fn with_schema(mut self, schema: &'c str) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn flavor(&self) -> PgFlavor {
        self.flavor
    }

    /// The search path this call runs against.
    pub async fn search_path(&self) -> Result<Vec<String>> {
        if let Some(schema) = self.schema {
            return Ok(vec![schema.to_string()]);
        }
        let path = self.conn.search_path().await?;
        if path.is_empty() {
            Ok(vec!["public".to_string()])
        } else {
            Ok(path)
        }
    }

    fn statement(&self, query: CatalogQuery, schemas: &[String], table: Option<&str>) -> Statement {
        Statement::new(query.sql, self.flavor.dialect().placeholder())
            .bind_list("schemas", schemas)
            .filter("table_filter", query.table_column, table)
    }

    /// First schema of `path` containing `table`.
    async fn locate(&self, path: &[String], table: &str) -> Result<Option<String>> {
        let rows = Statement::new(
            self.flavor.queries().locate_table.sql,
            self.flavor.dialect().placeholder(),
        )
        .bind_list("schemas", path)
        .bind("table", table)
        .fetch(self.conn, "locate_table")
        .await?;

        let found = rows
            .iter()
            .map(|row| row.required_text("table_schema"))
            .collect::<Result<Vec<_>>>()?;
        Ok(path.iter().find(|schema| found.contains(schema)).cloned())
    }

    /// Schemas to query: the whole path, or the one schema `table` resolves to.
    /// `None` when a table was named but is not on the path.
    async fn scope(&self, table: Option<&str>) -> Result<Option<Vec<String>>> {
        let path = self.search_path().await?;
        match table {
            None => Ok(Some(path)),
            Some(table) => Ok(self.locate(&path, table).await?.map(|schema| vec![schema])),
        }
    }

    async fn table_rows(&self, table: Option<&str>) -> Result<Vec<TableInfo>> {
        let path = self.search_path().await?;
        let rows = self
            .statement(self.flavor.queries().tables, &path, table)
            .fetch(self.conn, "tables")
            .await?;
        let tables = rows
            .iter()
            .map(|row| {
                Ok(TableInfo {
                    name: row.required_text("table_name")?,
                    schema: row.text("table_schema")?,
                    comment: row.text("comment")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(visible(tables, &path, |t| {
            (t.name.as_str(), t.schema.as_deref().unwrap_or_default())
        }))
    }

    fn column_from_row(&self, row: &Row) -> Result<ColumnInfo> {
        let raw_default = row.text("default_value")?;
        let is_identity = row.flag("is_identity")?;
        let generation_expression = row.text("generation_expression")?;

        let mut column = ColumnInfo::new(
            row.required_text("table_name")?,
            row.required_text("column_name")?,
            row.required_text("data_type")?,
        );
        column.schema = row.text("table_schema")?;
        column.has_auto_increment = is_identity
            || raw_default
                .as_deref()
                .is_some_and(|d| self.flavor.is_key_generator(d));
        column.default_value = postgres_default(raw_default.as_deref());
        column.is_generated = row.flag("is_generated")? && generation_expression.is_some();
        column.generation_expression = generation_expression.filter(|_| column.is_generated);
        column.is_nullable = row.flag("is_nullable")?;
        column.max_length = row.int("max_length")?;
        column.numeric_precision = row.int("numeric_precision")?;
        column.numeric_scale = row.int("numeric_scale")?;
        column.comment = row.text("comment")?;
        column.enum_values = row.labels("enum_values")?;
        Ok(column)
    }

    async fn column_info_in(&self, schemas: &[String], table: Option<&str>) -> Result<Vec<ColumnInfo>> {
        let queries = self.flavor.queries();
        let rows = self
            .statement(queries.column_info, schemas, table)
            .fetch(self.conn, "column_info")
            .await?;
        let mut columns = rows
            .iter()
            .map(|row| self.column_from_row(row))
            .collect::<Result<Vec<_>>>()?;

        let constraints = self
            .statement(queries.constraints, schemas, table)
            .fetch(self.conn, "constraints")
            .await?;
        apply_constraints(&mut columns, &constraints)?;

        Ok(visible(columns, schemas, |c| {
            (c.table.as_str(), c.schema.as_deref().unwrap_or_default())
        }))
    }
}

/// Keep, for every table name, only the entries from the earliest schema of
/// `path` that has it.
fn visible<T>(items: Vec<T>, path: &[String], key: impl Fn(&T) -> (&str, &str)) -> Vec<T> {
    let rank = |schema: &str| path.iter().position(|s| s == schema).unwrap_or(usize::MAX);

    let mut best: HashMap<String, usize> = HashMap::new();
    for item in &items {
        let (name, schema) = key(item);
        let r = rank(schema);
        best.entry(name.to_string())
            .and_modify(|b| *b = (*b).min(r))
            .or_insert(r);
    }

    items
        .into_iter()
        .filter(|item| {
            let (name, schema) = key(item);
            best.get(name) == Some(&rank(schema))
        })
        .collect()
}

/// Merge primary/unique/foreign constraint rows into the column records.
fn apply_constraints(columns: &mut [ColumnInfo], rows: &[Row]) -> Result<()> {
    let mut index: HashMap<(String, String, String), usize> = HashMap::new();
    for (i, column) in columns.iter().enumerate() {
        let key = (
            column.schema.clone().unwrap_or_default(),
            column.table.clone(),
            column.name.clone(),
        );
        index.insert(key, i);
    }

    for row in rows {
        let key = (
            row.text("table_schema")?.unwrap_or_default(),
            row.required_text("table_name")?,
            row.required_text("column_name")?,
        );
        let Some(&i) = index.get(&key) else {
            continue;
        };
        let column = &mut columns[i];
        let single = row.int("key_count")? == Some(1);

        match row.required_text("constraint_type")?.as_str() {
            "p" => {
                column.is_primary_key = true;
                column.is_unique |= single;
            }
            "u" => column.is_unique |= single,
            "f" => {
                if let (Some(table), Some(target)) = (
                    row.text("foreign_key_table")?,
                    row.text("foreign_key_column")?,
                ) {
                    if column.foreign_key_table.is_none() {
                        column.foreign_key_table = Some(table);
                        column.foreign_key_column = Some(target);
                        column.foreign_key_schema = row.text("foreign_key_schema")?;
                    }
                }
            }
            _ => {}
        }
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
        on_delete: row.text("on_delete")?,
        on_update: row.text("on_update")?,
    })
}

#[async_trait]
impl SchemaInspector for PostgresInspector<'_> {
    fn dialect(&self) -> Dialect {
        self.flavor.dialect()
    }

    async fn tables(&self) -> Result<Vec<String>> {
        Ok(self
            .table_rows(None)
            .await?
            .into_iter()
            .map(|t| t.name)
            .collect())
    }

    async fn table_info(&self) -> Result<Vec<TableInfo>> {
        self.table_rows(None).await
    }

    async fn table_info_of(&self, table: &str) -> Result<TableInfo> {
        self.table_rows(Some(table))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| InspectError::TableNotFound(table.to_string()))
    }

    async fn has_table(&self, table: &str) -> Result<bool> {
        Ok(!self.table_rows(Some(table)).await?.is_empty())
    }

    async fn columns(&self, table: Option<&str>) -> Result<Vec<ColumnRef>> {
        let Some(schemas) = self.scope(table).await? else {
            return Ok(Vec::new());
        };
        let rows = self
            .statement(self.flavor.queries().columns, &schemas, table)
            .fetch(self.conn, "columns")
            .await?;

        let mut refs = Vec::with_capacity(rows.len());
        for row in &rows {
            refs.push((
                ColumnRef {
                    table: row.required_text("table_name")?,
                    column: row.required_text("column_name")?,
                },
                row.required_text("table_schema")?,
            ));
        }
        Ok(visible(refs, &schemas, |(r, schema)| (r.table.as_str(), schema.as_str()))
            .into_iter()
            .map(|(r, _)| r)
            .collect())
    }

    async fn column_info(&self, table: Option<&str>) -> Result<Vec<ColumnInfo>> {
        match self.scope(table).await? {
            Some(schemas) => self.column_info_in(&schemas, table).await,
            None => Ok(Vec::new()),
        }
    }

    async fn column_info_of(&self, table: &str, column: &str) -> Result<ColumnInfo> {
        self.column_info(Some(table))
            .await?
            .into_iter()
            .find(|c| c.name == column)
            .ok_or_else(|| InspectError::column_not_found(table, column))
    }

    async fn primary(&self, table: &str) -> Result<Option<String>> {
        let Some(schemas) = self.scope(Some(table)).await? else {
            return Ok(None);
        };
        let rows = self
            .statement(self.flavor.queries().primary, &schemas, Some(table))
            .fetch(self.conn, "primary")
            .await?;
        match rows.first() {
            Some(row) => row.text("column_name"),
            None => Ok(None),
        }
    }

    async fn foreign_keys(&self, table: Option<&str>) -> Result<Vec<ForeignKeyInfo>> {
        let Some(schemas) = self.scope(table).await? else {
            return Ok(Vec::new());
        };
        let rows = self
            .statement(self.flavor.queries().foreign_keys, &schemas, table)
            .fetch(self.conn, "foreign_keys")
            .await?;

        let mut keys = Vec::with_capacity(rows.len());
        for row in &rows {
            keys.push((foreign_key_from_row(row)?, row.required_text("table_schema")?));
        }
        Ok(visible(keys, &schemas, |(fk, schema)| (fk.table.as_str(), schema.as_str()))
            .into_iter()
            .map(|(fk, _)| fk)
            .collect())
    }
}
