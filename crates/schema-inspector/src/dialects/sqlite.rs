//! SQLite inspector over `sqlite_master` and the table-valued pragma functions
//! (`pragma_table_xinfo`, `pragma_foreign_key_list`, `pragma_index_list`,
//! `pragma_index_info`).
//!
//! SQLite has no namespaces, no constraint names on foreign keys and no
//! catalog column for generation expressions or `AUTOINCREMENT`; the latter two
//! are recovered from the stored `CREATE TABLE` text.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::core::ddl::TableDefinition;
use crate::core::normalize::{normalize_action, sqlite_default, DeclaredType};
use crate::core::{
    ColumnInfo, ColumnRef, Connection, Dialect, ForeignKeyInfo, Row, SchemaInspector, Statement,
    TableInfo,
};
use crate::error::{InspectError, Result};

const TABLES_SQL: &str = r#"
    SELECT m.name AS table_name, m.sql AS sql
    FROM sqlite_master m
    WHERE m.type = 'table'
      AND m.name NOT LIKE 'sqlite_%'
      {table_filter}
    ORDER BY m.name
"#;

// hidden = 1 marks the hidden columns of virtual tables; 2 and 3 are
// generated columns, which are reported.
const COLUMNS_SQL: &str = r#"
    SELECT m.name AS table_name,
           p.cid AS cid,
           p.name AS column_name,
           p.type AS declared_type,
           p."notnull" AS not_null,
           p.dflt_value AS default_value,
           p.pk AS pk,
           p.hidden AS hidden
    FROM sqlite_master m
    JOIN pragma_table_xinfo(m.name) p
    WHERE m.type = 'table'
      AND m.name NOT LIKE 'sqlite_%'
      AND p.hidden <> 1
      {table_filter}
    ORDER BY m.name, p.cid
"#;

const UNIQUE_INDEXES_SQL: &str = r#"
    SELECT m.name AS table_name,
           il.name AS index_name,
           il.origin AS origin,
           ii.name AS column_name,
           (SELECT COUNT(*) FROM pragma_index_info(il.name)) AS column_count
    FROM sqlite_master m
    JOIN pragma_index_list(m.name) il
    JOIN pragma_index_info(il.name) ii
    WHERE m.type = 'table'
      AND m.name NOT LIKE 'sqlite_%'
      AND il."unique" = 1
      {table_filter}
    ORDER BY m.name, il.name
"#;

const FOREIGN_KEYS_SQL: &str = r#"
    SELECT m.name AS table_name,
           fk.id AS id,
           fk.seq AS seq,
           fk."table" AS foreign_key_table,
           fk."from" AS column_name,
           fk."to" AS foreign_key_column,
           fk.on_update AS on_update,
           fk.on_delete AS on_delete
    FROM sqlite_master m
    JOIN pragma_foreign_key_list(m.name) fk
    WHERE m.type = 'table'
      AND m.name NOT LIKE 'sqlite_%'
      {table_filter}
    ORDER BY m.name, fk.id, fk.seq
"#;

const PRIMARY_SQL: &str = r#"
    SELECT p.name AS column_name
    FROM pragma_table_xinfo({table}) p
    WHERE p.pk > 0
    ORDER BY p.pk
"#;

/// Schema inspector for SQLite.
#[derive(Clone, Copy)]
pub struct SqliteInspector<'c> {
    conn: &'c dyn Connection,
}

impl<'c> SqliteInspector<'c> {
    pub fn new(conn: &'c dyn Connection) -> Self {
        Self { conn }
    }

    /// SQLite has no schemas; the override is accepted and ignored.
    #[must_use]
    pub fn with_schema(self, _schema: &str) -> Self {
        self
    }

    fn statement(&self, template: &'static str, table: Option<&str>) -> Statement {
        Statement::new(template, Dialect::Sqlite.placeholder()).filter("table_filter", "m.name", table)
    }

    async fn table_rows(&self, table: Option<&str>) -> Result<Vec<Row>> {
        self.statement(TABLES_SQL, table)
            .fetch(self.conn, "tables")
            .await
    }

    async fn primary_keys(&self, table: &str) -> Result<Vec<String>> {
        Statement::new(PRIMARY_SQL, Dialect::Sqlite.placeholder())
            .bind("table", table)
            .fetch(self.conn, "primary")
            .await?
            .iter()
            .map(|row| row.required_text("column_name"))
            .collect()
    }

    async fn foreign_key_rows(&self, table: Option<&str>) -> Result<Vec<ForeignKeyInfo>> {
        let rows = self
            .statement(FOREIGN_KEYS_SQL, table)
            .fetch(self.conn, "foreign_keys")
            .await?;

        let mut parent_keys: HashMap<String, Vec<String>> = HashMap::new();
        let mut keys = Vec::with_capacity(rows.len());
        for row in &rows {
            let parent = row.required_text("foreign_key_table")?;
            let target = match row.text("foreign_key_column")? {
                Some(column) => column,
                // no explicit column: the parent's primary key, by position
                None => {
                    if !parent_keys.contains_key(&parent) {
                        let pk = self.primary_keys(&parent).await?;
                        parent_keys.insert(parent.clone(), pk);
                    }
                    let seq = row.int("seq")?.unwrap_or(0).max(0) as usize;
                    parent_keys
                        .get(&parent)
                        .and_then(|pk| pk.get(seq))
                        .cloned()
                        .ok_or_else(|| {
                            InspectError::decode(
                                "foreign_key_column",
                                format!("{} has no primary key to reference", parent),
                            )
                        })?
                }
            };

            keys.push(ForeignKeyInfo {
                table: row.required_text("table_name")?,
                column: row.required_text("column_name")?,
                foreign_key_table: parent,
                foreign_key_column: target,
                foreign_key_schema: None,
                constraint_name: None,
                on_delete: normalize_action(row.text("on_delete")?.as_deref()),
                on_update: normalize_action(row.text("on_update")?.as_deref()),
            });
        }
        Ok(keys)
    }
}

/// Per-table facts that only the `CREATE TABLE` text carries.
struct TableDdl {
    autoincrement: bool,
    autoincrement_columns: HashSet<String>,
    generated: HashMap<String, String>,
}

impl TableDdl {
    fn parse(sql: &str) -> Self {
        let table = TableDefinition::parse(sql);
        let mut ddl = TableDdl {
            autoincrement: table.autoincrement,
            autoincrement_columns: HashSet::new(),
            generated: HashMap::new(),
        };
        for def in &table.columns {
            if def.is_autoincrement() {
                ddl.autoincrement_columns.insert(def.name.to_ascii_lowercase());
            }
            if let Some(expr) = def.generation_expression() {
                ddl.generated.insert(def.name.to_ascii_lowercase(), expr.to_string());
            }
        }
        ddl
    }
}

#[async_trait]
impl SchemaInspector for SqliteInspector<'_> {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn tables(&self) -> Result<Vec<String>> {
        self.table_rows(None)
            .await?
            .iter()
            .map(|row| row.required_text("table_name"))
            .collect()
    }

    async fn table_info(&self) -> Result<Vec<TableInfo>> {
        Ok(self
            .tables()
            .await?
            .into_iter()
            .map(|name| TableInfo {
                name,
                schema: None,
                comment: None,
            })
            .collect())
    }

    async fn table_info_of(&self, table: &str) -> Result<TableInfo> {
        let rows = self.table_rows(Some(table)).await?;
        match rows.first() {
            Some(row) => Ok(TableInfo {
                name: row.required_text("table_name")?,
                schema: None,
                comment: None,
            }),
            None => Err(InspectError::TableNotFound(table.to_string())),
        }
    }

    async fn has_table(&self, table: &str) -> Result<bool> {
        Ok(!self.table_rows(Some(table)).await?.is_empty())
    }

    async fn columns(&self, table: Option<&str>) -> Result<Vec<ColumnRef>> {
        self.statement(COLUMNS_SQL, table)
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
            .statement(COLUMNS_SQL, table)
            .fetch(self.conn, "column_info")
            .await?;

        let mut ddl: HashMap<String, TableDdl> = HashMap::new();
        for row in self.table_rows(table).await? {
            let sql = row.text("sql")?.unwrap_or_default();
            ddl.insert(row.required_text("table_name")?, TableDdl::parse(&sql));
        }

        let mut pk_counts: HashMap<String, usize> = HashMap::new();
        for row in &rows {
            if row.int("pk")?.unwrap_or(0) > 0 {
                *pk_counts.entry(row.required_text("table_name")?).or_default() += 1;
            }
        }

        let mut unique: HashSet<(String, String)> = HashSet::new();
        for row in self
            .statement(UNIQUE_INDEXES_SQL, table)
            .fetch(self.conn, "unique_indexes")
            .await?
        {
            let implicit_pk = row.text("origin")?.as_deref() == Some("pk");
            if !implicit_pk && row.int("column_count")? == Some(1) {
                if let Some(column) = row.text("column_name")? {
                    unique.insert((row.required_text("table_name")?, column));
                }
            }
        }

        let foreign_keys = self.foreign_key_rows(table).await?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in &rows {
            let table_name = row.required_text("table_name")?;
            let name = row.required_text("column_name")?;
            let declared = row.text("declared_type")?.unwrap_or_default();
            let ty = DeclaredType::parse(&declared);
            let (max_length, precision, scale) = ty.sizes();
            let pk = row.int("pk")?.unwrap_or(0);
            let hidden = row.int("hidden")?.unwrap_or(0);

            let table_ddl = ddl.get(&table_name);
            let key = name.to_ascii_lowercase();
            let rowid_alias = pk == 1
                && pk_counts.get(&table_name) == Some(&1)
                && declared.eq_ignore_ascii_case("INTEGER");

            let mut column = ColumnInfo::new(table_name.clone(), name.clone(), ty.name);
            column.max_length = max_length;
            column.numeric_precision = precision;
            column.numeric_scale = scale;
            column.is_primary_key = pk > 0;
            column.is_nullable = !row.flag("not_null")? && !rowid_alias;
            column.is_unique = unique.contains(&(table_name.clone(), name.clone()));
            column.has_auto_increment = rowid_alias
                && table_ddl.is_some_and(|d| d.autoincrement || d.autoincrement_columns.contains(&key));

            let generation_expression = table_ddl.and_then(|d| d.generated.get(&key).cloned());
            column.is_generated = matches!(hidden, 2 | 3) && generation_expression.is_some();
            if column.is_generated {
                column.generation_expression = generation_expression;
            } else {
                column.default_value = sqlite_default(row.text("default_value")?.as_deref());
            }

            if let Some(fk) = foreign_keys
                .iter()
                .find(|fk| fk.table == table_name && fk.column == name)
            {
                column.set_reference(fk);
            }
            columns.push(column);
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
        Ok(self.primary_keys(table).await?.into_iter().next())
    }

    async fn foreign_keys(&self, table: Option<&str>) -> Result<Vec<ForeignKeyInfo>> {
        self.foreign_key_rows(table).await
    }
}
