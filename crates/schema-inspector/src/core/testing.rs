//! Scripted in-memory connection for adapter tests.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{InspectError, Result};

use super::schema::{ColumnRef, ForeignKeyInfo};
use super::traits::{Connection, SchemaInspector};
use super::value::Row;

struct Script {
    fragment: String,
    params: Option<Vec<String>>,
    rows: Vec<Row>,
}

/// Answers catalog queries with canned rows, keyed by a SQL fragment and
/// optionally by the exact parameter list. Scripts are tried in the order
/// they were added; a query nothing matches fails like a database error.
pub(crate) struct ScriptedConnection {
    client: String,
    search_path: Vec<String>,
    scripts: Vec<Script>,
    log: Mutex<Vec<(String, Vec<String>)>>,
}

impl ScriptedConnection {
    pub fn new(client: &str) -> Self {
        Self {
            client: client.to_string(),
            search_path: Vec::new(),
            scripts: Vec::new(),
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn with_search_path(mut self, path: &[&str]) -> Self {
        self.search_path = path.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Rows for any statement containing `fragment`.
    pub fn on(mut self, fragment: &str, rows: Vec<Row>) -> Self {
        self.scripts.push(Script {
            fragment: fragment.to_string(),
            params: None,
            rows,
        });
        self
    }

    /// Rows for statements containing `fragment` bound with exactly `params`.
    pub fn on_params(mut self, fragment: &str, params: &[&str], rows: Vec<Row>) -> Self {
        self.scripts.push(Script {
            fragment: fragment.to_string(),
            params: Some(params.iter().map(|s| s.to_string()).collect()),
            rows,
        });
        self
    }

    /// Rows for `fragment` per table: bound with `scope` plus a table name the
    /// statement gets that table's rows, bound with `scope` alone all of them.
    pub fn on_tables(mut self, fragment: &str, scope: &[&str], tables: &[(&str, Vec<Row>)]) -> Self {
        for (table, rows) in tables {
            let mut params = scope.to_vec();
            params.push(*table);
            self = self.on_params(fragment, &params, rows.clone());
        }
        let all = tables.iter().flat_map(|(_, rows)| rows.iter().cloned()).collect();
        self.on_params(fragment, scope, all)
    }

    /// Every statement run so far, with its parameters.
    pub fn executed(&self) -> Vec<(String, Vec<String>)> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connection for ScriptedConnection {
    fn client(&self) -> &str {
        &self.client
    }

    async fn query(&self, sql: &str, params: &[&str]) -> Result<Vec<Row>> {
        let params: Vec<String> = params.iter().map(|s| s.to_string()).collect();
        self.log.lock().unwrap().push((sql.to_string(), params.clone()));

        self.scripts
            .iter()
            .find(|script| {
                sql.contains(&script.fragment)
                    && script.params.as_ref().map_or(true, |p| *p == params)
            })
            .map(|script| script.rows.clone())
            .ok_or_else(|| {
                InspectError::catalog(
                    self.client.clone(),
                    format!("no scripted response for {:?} with {:?}", sql, params),
                )
            })
    }

    async fn search_path(&self) -> Result<Vec<String>> {
        Ok(self.search_path.clone())
    }
}

fn sorted_refs(mut refs: Vec<ColumnRef>) -> Vec<ColumnRef> {
    refs.sort_by(|a, b| (&a.table, &a.column).cmp(&(&b.table, &b.column)));
    refs
}

fn sorted_keys(mut keys: Vec<ForeignKeyInfo>) -> Vec<ForeignKeyInfo> {
    keys.sort_by(|a, b| {
        (&a.table, &a.column, &a.constraint_name, &a.foreign_key_table)
            .cmp(&(&b.table, &b.column, &b.constraint_name, &b.foreign_key_table))
    });
    keys
}

/// Checks the properties that tie the read operations together on one
/// unchanging catalog:
///
/// - every read returns the same answer twice in a row
/// - `columns(t)` and `column_info(t)` name the same (table, column) pairs,
///   each once
/// - `foreign_keys(Some(t))` only holds keys of `t`, all found in
///   `foreign_keys(None)`, and the per-table lists add up to it
/// - `primary(t)` is `None` exactly when no column of `t` is a key column
pub async fn assert_consistent<I: SchemaInspector + ?Sized>(inspector: &I) {
    let tables = inspector.tables().await.unwrap();
    assert_eq!(inspector.tables().await.unwrap(), tables);
    assert_eq!(inspector.table_info().await.unwrap(), inspector.table_info().await.unwrap());
    assert_eq!(inspector.overview().await.unwrap(), inspector.overview().await.unwrap());

    let all_columns = inspector.column_info(None).await.unwrap();
    assert_eq!(inspector.column_info(None).await.unwrap(), all_columns);
    let all_refs = inspector.columns(None).await.unwrap();
    assert_eq!(inspector.columns(None).await.unwrap(), all_refs);
    assert_eq!(
        sorted_refs(all_refs),
        sorted_refs(all_columns.iter().map(|c| c.column_ref()).collect())
    );

    let all_keys = inspector.foreign_keys(None).await.unwrap();
    assert_eq!(inspector.foreign_keys(None).await.unwrap(), all_keys);

    let mut union = Vec::new();
    for table in &tables {
        let refs = inspector.columns(Some(table)).await.unwrap();
        let columns = inspector.column_info(Some(table)).await.unwrap();
        assert_eq!(inspector.column_info(Some(table)).await.unwrap(), columns);
        let pairs: Vec<ColumnRef> = columns.iter().map(|c| c.column_ref()).collect();
        let unique: HashSet<&ColumnRef> = pairs.iter().collect();
        assert_eq!(unique.len(), pairs.len(), "duplicate columns in {}", table);
        assert_eq!(sorted_refs(refs), sorted_refs(pairs));

        let primary = inspector.primary(table).await.unwrap();
        assert_eq!(inspector.primary(table).await.unwrap(), primary);
        assert_eq!(
            primary.is_none(),
            !columns.iter().any(|c| c.is_primary_key),
            "primary key of {}",
            table
        );
        if let Some(key) = &primary {
            assert!(columns.iter().any(|c| &c.name == key && c.is_primary_key));
        }

        let keys = inspector.foreign_keys(Some(table)).await.unwrap();
        for key in &keys {
            assert_eq!(&key.table, table);
            assert!(all_keys.contains(key), "{:?} missing from all keys", key);
        }
        union.extend(keys);
    }
    assert_eq!(sorted_keys(union), sorted_keys(all_keys));
}
