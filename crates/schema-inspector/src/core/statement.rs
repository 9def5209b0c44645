//! Catalog statement templates.
//!
//! Catalog SQL is written once per dialect with `{token}` markers. A
//! [`Statement`] fills the markers with placeholders in the dialect's native
//! syntax and collects the matching parameters in textual order, so the same
//! template serves both "all tables" and "one table" lookups.

use tracing::debug;

use crate::error::Result;

use super::traits::Connection;
use super::value::Row;

/// Bind-parameter syntax of a dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// `$1, $2, ...` (Postgres, CockroachDB)
    Dollar,
    /// `?` (MySQL, SQLite)
    Question,
    /// `@P1, @P2, ...` (SQL Server)
    AtP,
    /// `:1, :2, ...` (Oracle)
    Colon,
}

impl Placeholder {
    fn render(self, position: usize) -> String {
        match self {
            Placeholder::Dollar => format!("${}", position),
            Placeholder::Question => "?".to_string(),
            Placeholder::AtP => format!("@P{}", position),
            Placeholder::Colon => format!(":{}", position),
        }
    }
}

#[derive(Debug, Clone)]
enum Binding {
    Value(String),
    List(Vec<String>),
    Raw(String),
    Filter {
        column: &'static str,
        value: Option<String>,
        fold_case: bool,
    },
}

/// A catalog statement under construction.
#[derive(Debug, Clone)]
pub struct Statement {
    template: &'static str,
    style: Placeholder,
    bindings: Vec<(&'static str, Binding)>,
}

impl Statement {
    pub fn new(template: &'static str, style: Placeholder) -> Self {
        Self {
            template,
            style,
            bindings: Vec::new(),
        }
    }

    /// `{token}` becomes one placeholder bound to `value`.
    #[must_use]
    pub fn bind(mut self, token: &'static str, value: impl Into<String>) -> Self {
        self.bindings.push((token, Binding::Value(value.into())));
        self
    }

    /// `{token}` becomes a comma-separated placeholder list, one per value.
    #[must_use]
    pub fn bind_list(mut self, token: &'static str, values: &[String]) -> Self {
        self.bindings.push((token, Binding::List(values.to_vec())));
        self
    }

    /// `{token}` is replaced by literal SQL (never user input).
    #[must_use]
    pub fn raw(mut self, token: &'static str, sql: impl Into<String>) -> Self {
        self.bindings.push((token, Binding::Raw(sql.into())));
        self
    }

    /// `{token}` becomes `AND column = ?` when a value is given, nothing otherwise.
    #[must_use]
    pub fn filter(mut self, token: &'static str, column: &'static str, value: Option<&str>) -> Self {
        self.bindings.push((
            token,
            Binding::Filter {
                column,
                value: value.map(str::to_string),
                fold_case: false,
            },
        ));
        self
    }

    /// Like [`filter`](Self::filter), comparing `UPPER()` of both sides.
    #[must_use]
    pub fn filter_ignore_case(mut self, token: &'static str, column: &'static str, value: Option<&str>) -> Self {
        self.bindings.push((
            token,
            Binding::Filter {
                column,
                value: value.map(str::to_string),
                fold_case: true,
            },
        ));
        self
    }

    /// Render the SQL text and the parameters in placeholder order.
    ///
    /// Markers without a binding are copied through unchanged.
    pub fn build(&self) -> (String, Vec<String>) {
        let mut sql = String::with_capacity(self.template.len() + 32);
        let mut params: Vec<String> = Vec::new();
        let mut rest = self.template;

        while let Some(open) = rest.find('{') {
            sql.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let binding = after.find('}').and_then(|close| {
                let token = &after[..close];
                self.bindings
                    .iter()
                    .find(|(name, _)| *name == token)
                    .map(|(_, binding)| (close, binding))
            });

            let Some((close, binding)) = binding else {
                sql.push('{');
                rest = after;
                continue;
            };

            match binding {
                Binding::Value(value) => {
                    params.push(value.clone());
                    sql.push_str(&self.style.render(params.len()));
                }
                Binding::List(values) => {
                    let rendered: Vec<String> = values
                        .iter()
                        .map(|value| {
                            params.push(value.clone());
                            self.style.render(params.len())
                        })
                        .collect();
                    sql.push_str(&rendered.join(", "));
                }
                Binding::Raw(text) => sql.push_str(text),
                Binding::Filter {
                    column,
                    value: Some(value),
                    fold_case,
                } => {
                    params.push(value.clone());
                    let placeholder = self.style.render(params.len());
                    if *fold_case {
                        sql.push_str(&format!("AND UPPER({}) = UPPER({})", column, placeholder));
                    } else {
                        sql.push_str(&format!("AND {} = {}", column, placeholder));
                    }
                }
                Binding::Filter { value: None, .. } => {}
            }
            rest = &after[close + 1..];
        }
        sql.push_str(rest);
        (sql, params)
    }

    /// Run the statement on a connection.
    pub async fn fetch(&self, conn: &dyn Connection, what: &str) -> Result<Vec<Row>> {
        let (sql, params) = self.build();
        let params: Vec<&str> = params.iter().map(String::as_str).collect();
        let rows = conn.query(&sql, &params).await?;
        debug!(
            "{} catalog query '{}' returned {} rows",
            conn.client(),
            what,
            rows.len()
        );
        Ok(rows)
    }
}
