//! SQLite bridge over sqlx.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column as _, Row as _, TypeInfo as _, ValueRef as _};
use tracing::info;

use crate::config::ConnectionConfig;
use crate::core::{Connection, Row, SqlValue};
use crate::error::{InspectError, Result};

/// A SQLite database usable by the inspector.
pub struct SqliteConnection {
    pool: SqlitePool,
}

impl SqliteConnection {
    /// Wrap an existing pool.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Open the database file at `path`; `:memory:` opens a private in-memory
    /// database. The file must already exist.
    pub async fn open(path: &Path) -> Result<Self> {
        let memory = path.as_os_str() == ":memory:";
        let options = if memory {
            SqliteConnectOptions::from_str("sqlite::memory:")?
        } else {
            SqliteConnectOptions::new().filename(path)
        };

        // every pooled connection to :memory: would be its own empty database,
        // and a reaped idle connection takes the data with it
        let pool_options = if memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(4)
        };
        let pool = pool_options.connect_with(options).await?;
        info!("Opened sqlite database: {}", path.display());
        Ok(Self::from_pool(pool))
    }

    /// Open the database named by `config.path`.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        match &config.path {
            Some(path) => Self::open(path).await,
            None => Err(InspectError::Config(
                "connection.path is required for sqlite".into(),
            )),
        }
    }
}

#[async_trait]
impl Connection for SqliteConnection {
    fn client(&self) -> &str {
        "sqlite"
    }

    async fn query(&self, sql: &str, params: &[&str]) -> Result<Vec<Row>> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = query.bind(*param);
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(decode_row).collect()
    }
}

// SQLite is dynamically typed: decode by the storage class of each value.
fn decode_row(row: &SqliteRow) -> Result<Row> {
    let mut out = Row::with_capacity(row.len());
    for (idx, column) in row.columns().iter().enumerate() {
        let name = column.name();
        let fail = |e: sqlx::Error| InspectError::decode(name, e);

        let raw = row.try_get_raw(idx).map_err(fail)?;
        if raw.is_null() {
            out.push(name, SqlValue::Null);
            continue;
        }

        let storage = raw.type_info().name().to_string();
        let value = match storage.as_str() {
            "INTEGER" | "BOOLEAN" => SqlValue::Int(row.try_get_unchecked::<i64, _>(idx).map_err(fail)?),
            "REAL" => SqlValue::Float(row.try_get_unchecked::<f64, _>(idx).map_err(fail)?),
            "BLOB" => {
                let bytes = row.try_get_unchecked::<Vec<u8>, _>(idx).map_err(fail)?;
                SqlValue::Text(String::from_utf8_lossy(&bytes).into_owned())
            }
            _ => SqlValue::Text(row.try_get_unchecked::<String, _>(idx).map_err(fail)?),
        };
        out.push(name, value);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::assert_consistent;
    use crate::core::{ColumnInfo, ColumnRef, ForeignKeyInfo, SchemaInspector};
    use crate::dialects::Inspector;
    use pretty_assertions::assert_eq;

    const FIXTURE: [&str; 3] = [
        "CREATE TABLE page_visits (request_path varchar(100), user_agent varchar(200), created_at datetime)",
        "CREATE TABLE \"teams\" (
            \"id\" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
            \"uuid\" varchar(36) NOT NULL UNIQUE,
            \"name\" varchar(100) DEFAULT NULL,
            \"description\" text,
            \"credits\" integer,
            \"created_at\" datetime,
            \"activated_at\" date
        )",
        "CREATE TABLE \"users\" (
            \"id\" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
            \"team_id\" integer NOT NULL,
            \"email\" varchar(100),
            \"password\" varchar(60),
            \"status\" varchar(60) DEFAULT 'active',
            FOREIGN KEY(\"team_id\") REFERENCES \"teams\"(\"id\") ON UPDATE CASCADE ON DELETE CASCADE
        )",
    ];

    async fn fixture() -> SqliteConnection {
        let conn = SqliteConnection::open(Path::new(":memory:")).await.unwrap();
        for ddl in FIXTURE {
            conn.query(ddl, &[]).await.unwrap();
        }
        conn
    }

    #[tokio::test]
    async fn test_tables_and_lookup() {
        let conn = fixture().await;
        let inspector = Inspector::resolve(&conn, None).unwrap();

        assert_eq!(
            inspector.tables().await.unwrap(),
            vec!["page_visits", "teams", "users"]
        );
        assert!(inspector.has_table("teams").await.unwrap());
        assert!(!inspector.has_table("foobar").await.unwrap());
        assert_eq!(inspector.table_info_of("teams").await.unwrap().name, "teams");
    }

    #[tokio::test]
    async fn test_columns_of_table_in_declaration_order() {
        let conn = fixture().await;
        let inspector = Inspector::resolve(&conn, None).unwrap();

        let columns: Vec<ColumnRef> = inspector.columns(Some("teams")).await.unwrap();
        let names: Vec<&str> = columns.iter().map(|c| c.column.as_str()).collect();
        assert_eq!(
            names,
            vec!["id", "uuid", "name", "description", "credits", "created_at", "activated_at"]
        );
        assert_eq!(inspector.columns(None).await.unwrap().len(), 15);
    }

    #[tokio::test]
    async fn test_column_info_against_real_catalog() {
        let conn = fixture().await;
        let inspector = Inspector::resolve(&conn, None).unwrap();

        let mut uuid = ColumnInfo::new("teams", "uuid", "varchar");
        uuid.max_length = Some(36);
        uuid.is_nullable = false;
        uuid.is_unique = true;
        assert_eq!(inspector.column_info_of("teams", "uuid").await.unwrap(), uuid);

        let id = inspector.column_info_of("teams", "id").await.unwrap();
        assert_eq!(id.data_type, "integer");
        assert!(id.is_primary_key);
        assert!(id.has_auto_increment);
        assert!(!id.is_nullable);
        assert!(!id.is_unique);

        let name = inspector.column_info_of("teams", "name").await.unwrap();
        assert_eq!(name.default_value, None);
        assert_eq!(name.max_length, Some(100));

        let status = inspector.column_info_of("users", "status").await.unwrap();
        assert_eq!(status.default_value.as_deref(), Some("active"));

        let team_id = inspector.column_info_of("users", "team_id").await.unwrap();
        assert_eq!(team_id.foreign_key_table.as_deref(), Some("teams"));
        assert_eq!(team_id.foreign_key_column.as_deref(), Some("id"));
        assert!(!team_id.is_nullable);
    }

    const SPELLINGS: [&str; 4] = [
        "CREATE TABLE g (a int, -- doubled, see b
            b int GENERATED ALWAYS AS (a * 2) VIRTUAL)",
        "CREATE TABLE lines (price real, qty integer, /* per line, AS (x) */
            total real AS (price * qty) STORED)",
        "CREATE TABLE équipe (id integer PRIMARY KEY, \"prénom\" text)",
        "CREATE TABLE [order items] (
            [item id] integer PRIMARY KEY AUTOINCREMENT,
            [qty] integer, -- libellé
            [double qty] integer AS ([qty] * 2),
            membre integer REFERENCES équipe(id)
        )",
    ];

    async fn spellings() -> SqliteConnection {
        let conn = SqliteConnection::open(Path::new(":memory:")).await.unwrap();
        for ddl in SPELLINGS {
            conn.query(ddl, &[]).await.unwrap();
        }
        conn
    }

    #[tokio::test]
    async fn test_operations_agree() {
        let conn = fixture().await;
        assert_consistent(&Inspector::resolve(&conn, None).unwrap()).await;

        let conn = spellings().await;
        assert_consistent(&Inspector::resolve(&conn, None).unwrap()).await;
    }

    #[tokio::test]
    async fn test_generated_column_after_comment() {
        let conn = spellings().await;
        let inspector = Inspector::resolve(&conn, None).unwrap();

        let names: Vec<String> = inspector
            .columns(Some("g"))
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.column)
            .collect();
        assert_eq!(names, vec!["a", "b"]);

        let b = inspector.column_info_of("g", "b").await.unwrap();
        assert!(b.is_generated);
        assert_eq!(b.generation_expression.as_deref(), Some("a * 2"));
        assert_eq!(b.default_value, None);
        assert!(!inspector.column_info_of("g", "a").await.unwrap().is_generated);
    }

    #[tokio::test]
    async fn test_stored_generated_column() {
        let conn = spellings().await;
        let inspector = Inspector::resolve(&conn, None).unwrap();

        let total = inspector.column_info_of("lines", "total").await.unwrap();
        assert!(total.is_generated);
        assert_eq!(total.generation_expression.as_deref(), Some("price * qty"));
        assert!(!inspector.column_info_of("lines", "qty").await.unwrap().is_generated);
    }

    #[tokio::test]
    async fn test_non_ascii_identifiers() {
        let conn = spellings().await;
        let inspector = Inspector::resolve(&conn, None).unwrap();

        let columns = inspector.column_info(None).await.unwrap();
        assert_eq!(columns.len(), 11);

        let prenom = inspector.column_info_of("équipe", "prénom").await.unwrap();
        assert_eq!(prenom.data_type, "text");
        assert!(!prenom.is_generated);

        let membre = inspector.column_info_of("order items", "membre").await.unwrap();
        assert_eq!(membre.foreign_key_table.as_deref(), Some("équipe"));
        assert_eq!(membre.foreign_key_column.as_deref(), Some("id"));
        assert!(!membre.is_generated);
        assert_eq!(inspector.primary("équipe").await.unwrap().as_deref(), Some("id"));
    }

    #[tokio::test]
    async fn test_bracket_quoted_names() {
        let conn = spellings().await;
        let inspector = Inspector::resolve(&conn, None).unwrap();

        assert!(inspector.has_table("order items").await.unwrap());

        let id = inspector.column_info_of("order items", "item id").await.unwrap();
        assert!(id.is_primary_key);
        assert!(id.has_auto_increment);
        assert!(!id.is_nullable);

        let double = inspector.column_info_of("order items", "double qty").await.unwrap();
        assert!(double.is_generated);
        assert_eq!(double.generation_expression.as_deref(), Some("[qty] * 2"));
        assert!(!inspector.column_info_of("order items", "qty").await.unwrap().is_generated);
    }

    #[tokio::test]
    async fn test_primary_and_foreign_keys() {
        let conn = fixture().await;
        let inspector = Inspector::resolve(&conn, None).unwrap();

        assert_eq!(inspector.primary("teams").await.unwrap().as_deref(), Some("id"));
        assert_eq!(inspector.primary("page_visits").await.unwrap(), None);

        assert_eq!(
            inspector.foreign_keys(None).await.unwrap(),
            vec![ForeignKeyInfo {
                table: "users".into(),
                column: "team_id".into(),
                foreign_key_table: "teams".into(),
                foreign_key_column: "id".into(),
                foreign_key_schema: None,
                constraint_name: None,
                on_delete: Some("CASCADE".into()),
                on_update: Some("CASCADE".into()),
            }]
        );
        assert!(inspector.foreign_keys(Some("teams")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_overview_groups_columns_by_table() {
        let conn = fixture().await;
        let inspector = Inspector::resolve(&conn, None).unwrap();

        let overview = inspector.overview().await.unwrap();
        assert_eq!(overview.len(), 3);
        assert_eq!(overview[1].table, "teams");
        assert_eq!(overview[1].primary.as_deref(), Some("id"));
        assert_eq!(overview[1].columns.len(), 7);
    }
}
