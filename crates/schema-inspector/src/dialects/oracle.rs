//! Oracle inspector over the `ALL_*` data dictionary views.
//!
//! Scope is the session's current schema (`SYS_CONTEXT('USERENV',
//! 'CURRENT_SCHEMA')`) unless an owner override is given. Oracle folds unquoted
//! identifiers to upper case, so table names passed in are matched without
//! regard to case and every result carries the casing stored in the dictionary.

use async_trait::async_trait;

use crate::core::normalize::{normalize_action, oracle_default};
use crate::core::{
    ColumnInfo, ColumnRef, Connection, Dialect, ForeignKeyInfo, Row, SchemaInspector, Statement,
    TableInfo,
};
use crate::error::{InspectError, Result};

const CURRENT_SCHEMA: &str = "SYS_CONTEXT('USERENV', 'CURRENT_SCHEMA')";

const TABLES_SQL: &str = r#"
    SELECT t.TABLE_NAME AS table_name,
           t.OWNER AS table_schema,
           tc.COMMENTS AS table_comment
    FROM ALL_TABLES t
    LEFT JOIN ALL_TAB_COMMENTS tc
      ON tc.OWNER = t.OWNER
     AND tc.TABLE_NAME = t.TABLE_NAME
    WHERE UPPER(t.OWNER) = UPPER({owner})
      AND t.NESTED = 'NO'
      AND t.SECONDARY = 'N'
      AND t.DROPPED = 'NO'
      {table_filter}
    ORDER BY t.TABLE_NAME
"#;

const COLUMNS_SQL: &str = r#"
    SELECT c.TABLE_NAME AS table_name,
           c.COLUMN_NAME AS column_name
    FROM ALL_TAB_COLS c
    JOIN ALL_TABLES t
      ON t.OWNER = c.OWNER
     AND t.TABLE_NAME = c.TABLE_NAME
     AND t.DROPPED = 'NO'
    WHERE UPPER(c.OWNER) = UPPER({owner})
      AND c.HIDDEN_COLUMN = 'NO'
      {table_filter}
    ORDER BY c.TABLE_NAME, c.COLUMN_ID
"#;

const COLUMN_INFO_SQL: &str = r#"
    SELECT c.TABLE_NAME AS table_name,
           c.OWNER AS table_schema,
           c.COLUMN_NAME AS column_name,
           c.DATA_TYPE AS data_type,
           c.DATA_DEFAULT AS data_default,
           c.CHAR_LENGTH AS char_length,
           c.DATA_PRECISION AS data_precision,
           c.DATA_SCALE AS data_scale,
           c.NULLABLE AS nullable,
           c.VIRTUAL_COLUMN AS virtual_column,
           c.IDENTITY_COLUMN AS identity_column,
           cc.COMMENTS AS column_comment
    FROM ALL_TAB_COLS c
    JOIN ALL_TABLES t
      ON t.OWNER = c.OWNER
     AND t.TABLE_NAME = c.TABLE_NAME
     AND t.DROPPED = 'NO'
    LEFT JOIN ALL_COL_COMMENTS cc
      ON cc.OWNER = c.OWNER
     AND cc.TABLE_NAME = c.TABLE_NAME
     AND cc.COLUMN_NAME = c.COLUMN_NAME
    WHERE UPPER(c.OWNER) = UPPER({owner})
      AND c.HIDDEN_COLUMN = 'NO'
      {table_filter}
    ORDER BY c.TABLE_NAME, c.COLUMN_ID
"#;

// {kinds} narrows ALL_CONSTRAINTS.CONSTRAINT_TYPE: P (primary), U (unique),
// R (referential).
const CONSTRAINTS_SQL: &str = r#"
    SELECT ac.CONSTRAINT_TYPE AS constraint_type,
           ac.CONSTRAINT_NAME AS constraint_name,
           ac.TABLE_NAME AS table_name,
           acc.COLUMN_NAME AS column_name,
           (SELECT COUNT(*)
              FROM ALL_CONS_COLUMNS k
             WHERE k.OWNER = ac.OWNER
               AND k.CONSTRAINT_NAME = ac.CONSTRAINT_NAME) AS column_count,
           r.OWNER AS foreign_key_schema,
           r.TABLE_NAME AS foreign_key_table,
           rcc.COLUMN_NAME AS foreign_key_column,
           ac.DELETE_RULE AS delete_rule
    FROM ALL_CONSTRAINTS ac
    JOIN ALL_CONS_COLUMNS acc
      ON acc.OWNER = ac.OWNER
     AND acc.CONSTRAINT_NAME = ac.CONSTRAINT_NAME
     AND acc.TABLE_NAME = ac.TABLE_NAME
    LEFT JOIN ALL_CONSTRAINTS r
      ON r.OWNER = ac.R_OWNER
     AND r.CONSTRAINT_NAME = ac.R_CONSTRAINT_NAME
    LEFT JOIN ALL_CONS_COLUMNS rcc
      ON rcc.OWNER = r.OWNER
     AND rcc.CONSTRAINT_NAME = r.CONSTRAINT_NAME
     AND rcc.POSITION = acc.POSITION
    WHERE UPPER(ac.OWNER) = UPPER({owner})
      AND ac.CONSTRAINT_TYPE IN ({kinds})
      {table_filter}
    ORDER BY ac.TABLE_NAME, ac.CONSTRAINT_NAME, acc.POSITION
"#;

/// Schema inspector for Oracle Database.
#[derive(Clone, Copy)]
pub struct OracleInspector<'c> {
    conn: &'c dyn Connection,
    owner: Option<&'c str>,
}

impl<'c> OracleInspector<'c> {
    pub fn new(conn: &'c dyn Connection) -> Self {
        Self { conn, owner: None }
    }

    /// Inspect the objects of `owner` instead of the current schema.
    #[must_use]
    pub fn with_schema(mut self, owner: &'c str) -> Self {
        self.owner = Some(owner);
        self
    }

    fn statement(&self, template: &'static str) -> Statement {
        let stmt = Statement::new(template, Dialect::Oracle.placeholder());
        match self.owner {
            Some(owner) => stmt.bind("owner", owner),
            None => stmt.raw("owner", CURRENT_SCHEMA),
        }
    }

    /// Tables matching `table` without regard to case (or all of them).
    async fn table_rows(&self, table: Option<&str>) -> Result<Vec<Row>> {
        self.statement(TABLES_SQL)
            .filter_ignore_case("table_filter", "t.TABLE_NAME", table)
            .fetch(self.conn, "tables")
            .await
    }

    /// Stored spelling of `table`. An exact match wins over a case-folded one,
    /// so `"users"` and `USERS` stay distinct when both exist.
    async fn resolve(&self, table: &str) -> Result<Option<Row>> {
        let mut rows = self.table_rows(Some(table)).await?;
        let exact = rows
            .iter()
            .position(|row| row.text("table_name").ok().flatten().as_deref() == Some(table));
        Ok(match exact {
            Some(idx) => Some(rows.swap_remove(idx)),
            None if rows.is_empty() => None,
            None => Some(rows.swap_remove(0)),
        })
    }

    async fn resolve_name(&self, table: Option<&str>) -> Result<Scope> {
        match table {
            None => Ok(Scope::All),
            Some(table) => match self.resolve(table).await? {
                Some(row) => Ok(Scope::Table(row.required_text("table_name")?)),
                None => Ok(Scope::Missing),
            },
        }
    }

    async fn constraint_rows(&self, kinds: &'static str, table: Option<&str>) -> Result<Vec<Row>> {
        self.statement(CONSTRAINTS_SQL)
            .raw("kinds", kinds)
            .filter("table_filter", "ac.TABLE_NAME", table)
            .fetch(self.conn, "constraints")
            .await
    }
}

/// Result of resolving an optional table argument.
enum Scope {
    All,
    Table(String),
    Missing,
}

impl Scope {
    fn table(&self) -> Option<&str> {
        match self {
            Scope::Table(name) => Some(name),
            _ => None,
        }
    }
}

fn table_info_from_row(row: &Row) -> Result<TableInfo> {
    Ok(TableInfo {
        name: row.required_text("table_name")?,
        schema: row.text("table_schema")?,
        comment: row.text("table_comment")?,
    })
}

fn column_from_row(row: &Row) -> Result<ColumnInfo> {
    let mut column = ColumnInfo::new(
        row.required_text("table_name")?,
        row.required_text("column_name")?,
        row.required_text("data_type")?,
    );
    column.schema = row.text("table_schema")?;
    column.max_length = row.int("char_length")?.filter(|len| *len > 0);
    column.numeric_precision = row.int("data_precision")?;
    column.numeric_scale = row.int("data_scale")?;
    column.is_nullable = row.flag("nullable")?;
    column.comment = row.text("column_comment")?;

    let data_default = row.text("data_default")?;
    if row.flag("virtual_column")? {
        // generated only with a known expression, as on the other engines
        column.generation_expression = data_default
            .map(|expr| expr.trim().to_string())
            .filter(|expr| !expr.is_empty());
        column.is_generated = column.generation_expression.is_some();
    } else if row.flag("identity_column")? {
        // the default of an identity column is its internal ISEQ$$ sequence
        column.has_auto_increment = true;
    } else {
        column.default_value = oracle_default(data_default.as_deref());
    }
    Ok(column)
}

fn apply_constraints(columns: &mut [ColumnInfo], rows: &[Row]) -> Result<()> {
    for row in rows {
        let table = row.required_text("table_name")?;
        let name = row.required_text("column_name")?;
        let Some(column) = columns
            .iter_mut()
            .find(|c| c.table == table && c.name == name)
        else {
            continue;
        };

        let single = row.int("column_count")? == Some(1);
        match row.required_text("constraint_type")?.as_str() {
            "P" => {
                column.is_primary_key = true;
                column.is_unique |= single;
            }
            "U" => column.is_unique |= single,
            "R" => column.set_reference(&foreign_key_from_row(row)?),
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
        on_delete: normalize_action(row.text("delete_rule")?.as_deref()),
        // Oracle has no ON UPDATE clause; updates of referenced keys are restricted
        on_update: Some("NO ACTION".to_string()),
    })
}

#[async_trait]
impl SchemaInspector for OracleInspector<'_> {
    fn dialect(&self) -> Dialect {
        Dialect::Oracle
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
        match self.resolve(table).await? {
            Some(row) => table_info_from_row(&row),
            None => Err(InspectError::TableNotFound(table.to_string())),
        }
    }

    async fn has_table(&self, table: &str) -> Result<bool> {
        Ok(self.resolve(table).await?.is_some())
    }

    async fn columns(&self, table: Option<&str>) -> Result<Vec<ColumnRef>> {
        let scope = self.resolve_name(table).await?;
        if matches!(scope, Scope::Missing) {
            return Ok(Vec::new());
        }
        self.statement(COLUMNS_SQL)
            .filter("table_filter", "c.TABLE_NAME", scope.table())
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
        let scope = self.resolve_name(table).await?;
        if matches!(scope, Scope::Missing) {
            return Ok(Vec::new());
        }

        let mut columns = self
            .statement(COLUMN_INFO_SQL)
            .filter("table_filter", "c.TABLE_NAME", scope.table())
            .fetch(self.conn, "column_info")
            .await?
            .iter()
            .map(column_from_row)
            .collect::<Result<Vec<_>>>()?;

        let constraints = self
            .constraint_rows("'P', 'U', 'R'", scope.table())
            .await?;
        apply_constraints(&mut columns, &constraints)?;
        Ok(columns)
    }

    async fn column_info_of(&self, table: &str, column: &str) -> Result<ColumnInfo> {
        let columns = self.column_info(Some(table)).await?;
        columns
            .iter()
            .position(|c| c.name == column)
            .or_else(|| columns.iter().position(|c| c.name.eq_ignore_ascii_case(column)))
            .map(|idx| columns[idx].clone())
            .ok_or_else(|| InspectError::column_not_found(table, column))
    }

    async fn primary(&self, table: &str) -> Result<Option<String>> {
        let scope = self.resolve_name(Some(table)).await?;
        let Some(table) = scope.table() else {
            return Ok(None);
        };
        let rows = self.constraint_rows("'P'", Some(table)).await?;
        rows.first()
            .map(|row| row.required_text("column_name"))
            .transpose()
    }

    async fn foreign_keys(&self, table: Option<&str>) -> Result<Vec<ForeignKeyInfo>> {
        let scope = self.resolve_name(table).await?;
        if matches!(scope, Scope::Missing) {
            return Ok(Vec::new());
        }
        self.constraint_rows("'R'", scope.table())
            .await?
            .iter()
            .map(foreign_key_from_row)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{assert_consistent, ScriptedConnection};
    use crate::core::SqlValue;
    use pretty_assertions::assert_eq;

    // Oracle returns unquoted aliases in upper case
    fn table_row(name: &str) -> Row {
        Row::new()
            .with("TABLE_NAME", name)
            .with("TABLE_SCHEMA", "APP")
            .with("TABLE_COMMENT", SqlValue::Null)
    }

    fn column_row(table: &str, name: &str, data_type: &str) -> Row {
        Row::new()
            .with("TABLE_NAME", table)
            .with("TABLE_SCHEMA", "APP")
            .with("COLUMN_NAME", name)
            .with("DATA_TYPE", data_type)
            .with("DATA_DEFAULT", SqlValue::Null)
            .with("CHAR_LENGTH", 0i64)
            .with("DATA_PRECISION", SqlValue::Null)
            .with("DATA_SCALE", SqlValue::Null)
            .with("NULLABLE", "Y")
            .with("VIRTUAL_COLUMN", "NO")
            .with("IDENTITY_COLUMN", "NO")
            .with("COLUMN_COMMENT", SqlValue::Null)
    }

    fn constraint_row(kind: &str, name: &str, table: &str, column: &str, count: i64) -> Row {
        Row::new()
            .with("CONSTRAINT_TYPE", kind)
            .with("CONSTRAINT_NAME", name)
            .with("TABLE_NAME", table)
            .with("COLUMN_NAME", column)
            .with("COLUMN_COUNT", count)
            .with("FOREIGN_KEY_SCHEMA", SqlValue::Null)
            .with("FOREIGN_KEY_TABLE", SqlValue::Null)
            .with("FOREIGN_KEY_COLUMN", SqlValue::Null)
            .with("DELETE_RULE", SqlValue::Null)
    }

    fn team_fk() -> Row {
        constraint_row("R", "USERS_TEAM_FK", "USERS", "TEAM_ID", 1)
            .with("FOREIGN_KEY_SCHEMA", "APP")
            .with("FOREIGN_KEY_TABLE", "TEAMS")
            .with("FOREIGN_KEY_COLUMN", "ID")
            .with("DELETE_RULE", "CASCADE")
    }

    fn users_columns() -> Vec<Row> {
        vec![
            column_row("USERS", "ID", "NUMBER")
                .with("DATA_DEFAULT", "\"APP\".\"ISEQ$$_7301\".nextval")
                .with("DATA_PRECISION", 10i64)
                .with("DATA_SCALE", 0i64)
                .with("NULLABLE", "N")
                .with("IDENTITY_COLUMN", "YES"),
            column_row("USERS", "TEAM_ID", "NUMBER"),
            column_row("USERS", "EMAIL", "VARCHAR2")
                .with("CHAR_LENGTH", 255i64)
                .with("NULLABLE", "N")
                .with("COLUMN_COMMENT", "login address"),
            column_row("USERS", "STATUS", "VARCHAR2")
                .with("CHAR_LENGTH", 20i64)
                .with("DATA_DEFAULT", "'active' "),
            column_row("USERS", "EMAIL_UPPER", "VARCHAR2")
                .with("CHAR_LENGTH", 255i64)
                .with("DATA_DEFAULT", "UPPER(\"EMAIL\")")
                .with("VIRTUAL_COLUMN", "YES"),
        ]
    }

    fn users_connection() -> ScriptedConnection {
        ScriptedConnection::new("oracledb")
            .on("ALL_TAB_COMMENTS", vec![table_row("USERS")])
            .on("c.DATA_DEFAULT AS data_default", users_columns())
            .on(
                "ALL_CONSTRAINTS ac",
                vec![
                    constraint_row("P", "USERS_PK", "USERS", "ID", 1),
                    constraint_row("U", "USERS_EMAIL_UQ", "USERS", "EMAIL", 1),
                    team_fk(),
                ],
            )
    }

    #[tokio::test]
    async fn test_column_info_normalization() {
        let conn = users_connection();
        let inspector = OracleInspector::new(&conn);

        let columns = inspector.column_info(Some("users")).await.unwrap();
        assert_eq!(columns.len(), 5);

        let id = &columns[0];
        assert!(id.is_primary_key);
        assert!(id.is_unique);
        assert!(id.has_auto_increment);
        assert!(!id.is_nullable);
        assert_eq!(id.default_value, None);
        assert_eq!(id.numeric_precision, Some(10));
        assert_eq!(id.max_length, None);

        let team_id = &columns[1];
        assert_eq!(team_id.foreign_key_table.as_deref(), Some("TEAMS"));
        assert_eq!(team_id.foreign_key_column.as_deref(), Some("ID"));
        assert_eq!(team_id.foreign_key_schema.as_deref(), Some("APP"));

        let email = &columns[2];
        assert!(email.is_unique);
        assert_eq!(email.max_length, Some(255));
        assert_eq!(email.comment.as_deref(), Some("login address"));
        assert_eq!(email.schema.as_deref(), Some("APP"));

        assert_eq!(columns[3].default_value.as_deref(), Some("active"));

        let generated = &columns[4];
        assert!(generated.is_generated);
        assert_eq!(generated.generation_expression.as_deref(), Some("UPPER(\"EMAIL\")"));
        assert_eq!(generated.default_value, None);
    }

    #[tokio::test]
    async fn test_virtual_column_without_expression() {
        let conn = ScriptedConnection::new("oracledb")
            .on("ALL_TAB_COMMENTS", vec![table_row("USERS")])
            .on(
                "c.DATA_DEFAULT AS data_default",
                vec![
                    column_row("USERS", "HIDDEN_SUM", "NUMBER")
                        .with("DATA_DEFAULT", "  ")
                        .with("VIRTUAL_COLUMN", "YES"),
                    column_row("USERS", "OPAQUE", "NUMBER").with("VIRTUAL_COLUMN", "YES"),
                ],
            )
            .on("ALL_CONSTRAINTS ac", vec![]);
        let inspector = OracleInspector::new(&conn);

        for column in inspector.column_info(Some("users")).await.unwrap() {
            assert!(!column.is_generated, "{}", column.name);
            assert_eq!(column.generation_expression, None);
            assert_eq!(column.default_value, None);
        }
    }

    /// TEAMS and USERS, answering both scoped and unscoped statements.
    fn catalog_connection() -> ScriptedConnection {
        let teams = vec![
            column_row("TEAMS", "ID", "NUMBER").with("NULLABLE", "N"),
            column_row("TEAMS", "NAME", "VARCHAR2").with("CHAR_LENGTH", 100i64),
        ];
        let refs = |table: &str, names: &[&str]| -> Vec<Row> {
            names
                .iter()
                .map(|name| Row::new().with("TABLE_NAME", table).with("COLUMN_NAME", *name))
                .collect()
        };
        let teams_pk = || constraint_row("P", "TEAMS_PK", "TEAMS", "ID", 1);
        let users_pk = || constraint_row("P", "USERS_PK", "USERS", "ID", 1);

        ScriptedConnection::new("oracledb")
            .on_tables(
                "c.DATA_DEFAULT AS data_default",
                &[],
                &[("TEAMS", teams), ("USERS", users_columns())],
            )
            .on_tables(
                "IN ('P', 'U', 'R')",
                &[],
                &[
                    ("TEAMS", vec![teams_pk()]),
                    (
                        "USERS",
                        vec![
                            users_pk(),
                            constraint_row("U", "USERS_EMAIL_UQ", "USERS", "EMAIL", 1),
                            team_fk(),
                        ],
                    ),
                ],
            )
            .on_tables(
                "IN ('P')",
                &[],
                &[("TEAMS", vec![teams_pk()]), ("USERS", vec![users_pk()])],
            )
            .on_tables("IN ('R')", &[], &[("TEAMS", vec![]), ("USERS", vec![team_fk()])])
            .on_tables(
                "ALL_TAB_COLS c",
                &[],
                &[
                    ("TEAMS", refs("TEAMS", &["ID", "NAME"])),
                    ("USERS", refs("USERS", &["ID", "TEAM_ID", "EMAIL", "STATUS", "EMAIL_UPPER"])),
                ],
            )
            .on_tables(
                "ALL_TAB_COMMENTS",
                &[],
                &[("TEAMS", vec![table_row("TEAMS")]), ("USERS", vec![table_row("USERS")])],
            )
    }

    #[tokio::test]
    async fn test_operations_agree() {
        let conn = catalog_connection();
        assert_consistent(&OracleInspector::new(&conn)).await;
    }

    #[tokio::test]
    async fn test_lookups_use_stored_casing() {
        let conn = users_connection();
        let inspector = OracleInspector::new(&conn);
        inspector.column_info(Some("users")).await.unwrap();

        let executed = conn.executed();
        // resolution is case-insensitive, later filters use the dictionary name
        assert!(executed[0].0.contains("UPPER(t.TABLE_NAME) = UPPER(:1)"));
        assert!(executed[0].0.contains("SYS_CONTEXT('USERENV', 'CURRENT_SCHEMA')"));
        assert_eq!(executed[0].1, vec!["users"]);
        assert_eq!(executed[1].1, vec!["USERS"]);
        assert!(executed[2].0.contains("IN ('P', 'U', 'R')"));
        assert_eq!(executed[2].1, vec!["USERS"]);
    }

    #[tokio::test]
    async fn test_exact_case_wins() {
        let conn = ScriptedConnection::new("oracledb").on(
            "ALL_TAB_COMMENTS",
            vec![table_row("USERS"), table_row("users").with("TABLE_COMMENT", "quoted")],
        );
        let inspector = OracleInspector::new(&conn);

        let info = inspector.table_info_of("users").await.unwrap();
        assert_eq!(info.name, "users");
        assert_eq!(info.comment.as_deref(), Some("quoted"));

        let info = inspector.table_info_of("Users").await.unwrap();
        assert_eq!(info.name, "USERS");
    }

    #[tokio::test]
    async fn test_with_schema_binds_owner() {
        let conn = ScriptedConnection::new("oracledb")
            .on_params("ALL_TAB_COMMENTS", &["hr"], vec![table_row("EMPLOYEES")]);
        let inspector = OracleInspector::new(&conn).with_schema("hr");

        assert_eq!(inspector.tables().await.unwrap(), vec!["EMPLOYEES"]);
        assert!(conn.executed()[0].0.contains("UPPER(t.OWNER) = UPPER(:1)"));
    }

    #[tokio::test]
    async fn test_missing_table() {
        let conn = ScriptedConnection::new("oracledb").on("ALL_TAB_COMMENTS", vec![]);
        let inspector = OracleInspector::new(&conn);

        assert!(matches!(
            inspector.table_info_of("nope").await,
            Err(InspectError::TableNotFound(_))
        ));
        assert!(!inspector.has_table("nope").await.unwrap());
        assert!(inspector.column_info(Some("nope")).await.unwrap().is_empty());
        assert!(inspector.foreign_keys(Some("nope")).await.unwrap().is_empty());
        assert_eq!(inspector.primary("nope").await.unwrap(), None);
        assert!(matches!(
            inspector.column_info_of("nope", "id").await,
            Err(InspectError::ColumnNotFound { .. })
        ));
        // nothing past table resolution ran
        assert_eq!(conn.executed().len(), 6);
    }

    #[tokio::test]
    async fn test_primary_and_foreign_keys() {
        let conn = ScriptedConnection::new("oracledb")
            .on("ALL_TAB_COMMENTS", vec![table_row("USERS")])
            .on(
                "IN ('P')",
                vec![constraint_row("P", "USERS_PK", "USERS", "ID", 1)],
            )
            .on("IN ('R')", vec![team_fk()]);
        let inspector = OracleInspector::new(&conn);

        assert_eq!(inspector.primary("users").await.unwrap().as_deref(), Some("ID"));
        assert_eq!(
            inspector.foreign_keys(None).await.unwrap(),
            vec![ForeignKeyInfo {
                table: "USERS".into(),
                column: "TEAM_ID".into(),
                foreign_key_table: "TEAMS".into(),
                foreign_key_column: "ID".into(),
                foreign_key_schema: Some("APP".into()),
                constraint_name: Some("USERS_TEAM_FK".into()),
                on_delete: Some("CASCADE".into()),
                on_update: Some("NO ACTION".into()),
            }]
        );
    }
}
