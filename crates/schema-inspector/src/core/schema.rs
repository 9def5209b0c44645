//! Unified metadata records returned by every dialect.
//!
//! These types are plain data: built fresh for each call, never holding a
//! connection, and serializable so the CLI can print them as JSON.

use serde::{Deserialize, Serialize};

/// A table visible in the inspected scope.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableInfo {
    /// Table name as stored in the catalog.
    pub name: String,
    /// Owning schema (None on SQLite).
    pub schema: Option<String>,
    /// Table comment, if any.
    pub comment: Option<String>,
}

/// A (table, column) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

/// Normalized description of one column.
///
/// The foreign key fields are a denormalized view of a single reference: when a
/// column takes part in several foreign keys only the first one found is shown
/// here. Use [`SchemaInspector::foreign_keys`](crate::SchemaInspector::foreign_keys)
/// for the complete list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub table: String,
    pub schema: Option<String>,

    /// Engine-native type name (e.g. `character varying`, `int unsigned`).
    pub data_type: String,

    /// Default expression after literal normalization.
    pub default_value: Option<String>,

    pub max_length: Option<i64>,
    pub numeric_precision: Option<i64>,
    pub numeric_scale: Option<i64>,

    pub is_generated: bool,
    pub generation_expression: Option<String>,

    pub is_nullable: bool,
    pub is_unique: bool,
    pub is_primary_key: bool,
    pub has_auto_increment: bool,

    pub foreign_key_column: Option<String>,
    pub foreign_key_table: Option<String>,
    pub foreign_key_schema: Option<String>,

    /// Labels of an enumerated type, in declaration order.
    pub enum_values: Option<Vec<String>>,

    /// Members of a MySQL `SET` column, in declaration order.
    pub set_values: Option<Vec<String>>,

    pub comment: Option<String>,
}

impl ColumnInfo {
    /// Create a nullable, unconstrained column; adapters fill in the rest.
    pub fn new(table: impl Into<String>, name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            data_type: data_type.into(),
            is_nullable: true,
            ..Default::default()
        }
    }

    /// Column reference for this column.
    pub fn column_ref(&self) -> ColumnRef {
        ColumnRef {
            table: self.table.clone(),
            column: self.name.clone(),
        }
    }

    /// Record a referenced column unless one is already set (first found wins).
    pub fn set_reference(&mut self, fk: &ForeignKeyInfo) {
        if self.foreign_key_table.is_some() {
            return;
        }
        self.foreign_key_table = Some(fk.foreign_key_table.clone());
        self.foreign_key_column = Some(fk.foreign_key_column.clone());
        self.foreign_key_schema = fk.foreign_key_schema.clone();
    }
}

/// One column of a foreign key constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyInfo {
    /// Referencing table.
    pub table: String,
    /// Referencing column.
    pub column: String,
    pub foreign_key_table: String,
    pub foreign_key_column: String,
    pub foreign_key_schema: Option<String>,
    /// Constraint name (None on SQLite, which does not expose one).
    pub constraint_name: Option<String>,
    pub on_delete: Option<String>,
    pub on_update: Option<String>,
}

/// Everything known about one table, as returned by `overview()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableOverview {
    pub table: String,
    pub primary: Option<String>,
    pub columns: Vec<ColumnInfo>,
}
