//! Core abstractions for dialect-agnostic schema inspection.
//!
//! - [`schema`]: the unified records (tables, columns, foreign keys)
//! - [`value`]: raw catalog rows as bridges hand them over
//! - [`normalize`]: typed row accessors and the shared pure parsers
//! - [`ddl`]: SQLite `CREATE TABLE` text, tokenized
//! - [`statement`]: catalog SQL templates with dialect placeholders
//! - [`dialect`]: the supported dialect identifiers
//! - [`traits`]: the `Connection` and `SchemaInspector` contracts
//!
//! Dialect adapters (`dialects/*`) implement `SchemaInspector` on top of these;
//! driver bridges (`drivers/*`) implement `Connection`.

pub mod ddl;
pub mod dialect;
pub mod normalize;
pub mod schema;
pub mod statement;
pub mod traits;
pub mod value;

#[cfg(test)]
pub(crate) mod testing;

pub use dialect::Dialect;
pub use schema::{ColumnInfo, ColumnRef, ForeignKeyInfo, TableInfo, TableOverview};
pub use statement::{Placeholder, Statement};
pub use traits::{Connection, SchemaInspector};
pub use value::{Row, SqlValue};
