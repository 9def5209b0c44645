//! Turning raw catalog rows into unified values.
//!
//! Two halves live here: typed accessors on [`Row`] that smooth over how engines
//! report flags and sizes, and the pure parsers each dialect uses to clean up
//! type names and default expressions.

use crate::error::{InspectError, Result};

use super::value::{Row, SqlValue};

impl Row {
    /// Nullable string. Numbers and booleans are rendered as text.
    pub fn text(&self, column: &str) -> Result<Option<String>> {
        match self.get(column) {
            None | Some(SqlValue::Null) => Ok(None),
            Some(SqlValue::Text(s)) => Ok(Some(s.clone())),
            Some(SqlValue::Int(v)) => Ok(Some(v.to_string())),
            Some(SqlValue::Float(v)) => Ok(Some(v.to_string())),
            Some(SqlValue::Bool(v)) => Ok(Some(v.to_string())),
            Some(other) => Err(unexpected(column, other, "text")),
        }
    }

    /// Non-null string.
    pub fn required_text(&self, column: &str) -> Result<String> {
        self.text(column)?
            .ok_or_else(|| InspectError::decode(column, "unexpected NULL"))
    }

    /// Nullable integer. Integral floats and numeric strings are accepted.
    pub fn int(&self, column: &str) -> Result<Option<i64>> {
        match self.get(column) {
            None | Some(SqlValue::Null) => Ok(None),
            Some(SqlValue::Int(v)) => Ok(Some(*v)),
            Some(SqlValue::Bool(v)) => Ok(Some(i64::from(*v))),
            Some(SqlValue::Float(v)) if v.fract() == 0.0 => Ok(Some(*v as i64)),
            Some(SqlValue::Text(s)) if s.trim().is_empty() => Ok(None),
            Some(SqlValue::Text(s)) => s
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|e| InspectError::decode(column, format!("{:?}: {}", s, e))),
            Some(other) => Err(unexpected(column, other, "integer")),
        }
    }

    /// Boolean flag. NULL and missing columns read as false.
    ///
    /// Accepts real booleans, integers (non-zero is true) and the textual
    /// spellings engines use: `YES`/`NO`, `Y`/`N`, `TRUE`/`FALSE`, `t`/`f`, `1`/`0`.
    pub fn flag(&self, column: &str) -> Result<bool> {
        match self.get(column) {
            None | Some(SqlValue::Null) => Ok(false),
            Some(SqlValue::Bool(v)) => Ok(*v),
            Some(SqlValue::Int(v)) => Ok(*v != 0),
            Some(SqlValue::Float(v)) => Ok(*v != 0.0),
            Some(SqlValue::Text(s)) => match s.trim().to_ascii_uppercase().as_str() {
                "YES" | "Y" | "TRUE" | "T" | "1" | "ON" => Ok(true),
                "NO" | "N" | "FALSE" | "F" | "0" | "OFF" | "" => Ok(false),
                _ => Err(InspectError::decode(column, format!("{:?} is not a flag", s))),
            },
            Some(other) => Err(unexpected(column, other, "flag")),
        }
    }

    /// Ordered list of labels from an array column or a Postgres array literal.
    pub fn labels(&self, column: &str) -> Result<Option<Vec<String>>> {
        match self.get(column) {
            None | Some(SqlValue::Null) => Ok(None),
            Some(SqlValue::TextArray(items)) => Ok(Some(items.clone())),
            Some(SqlValue::Text(s)) => parse_array_literal(s)
                .map(Some)
                .ok_or_else(|| InspectError::decode(column, format!("{:?} is not an array", s))),
            Some(other) => Err(unexpected(column, other, "text[]")),
        }
    }
}

fn unexpected(column: &str, value: &SqlValue, wanted: &str) -> InspectError {
    InspectError::decode(column, format!("expected {}, got {}", wanted, value.kind()))
}

/// Parse a Postgres array literal such as `{a,b,"c d"}`.
pub fn parse_array_literal(raw: &str) -> Option<Vec<String>> {
    let inner = raw.trim().strip_prefix('{')?.strip_suffix('}')?;
    if inner.is_empty() {
        return Some(Vec::new());
    }

    let mut items = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => quoted = !quoted,
            '\\' if quoted => current.extend(chars.next()),
            ',' if !quoted => items.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    items.push(current);
    Some(items)
}

// ===== Literal helpers =====

/// Remove one layer of surrounding quotes from a literal and unescape doubled
/// quotes. A SQL Server `N` prefix is dropped along with the quotes. Anything
/// that is not a complete quoted literal comes back trimmed but otherwise as-is.
pub fn strip_quotes(raw: &str) -> String {
    let trimmed = raw.trim();
    let body = match trimmed.strip_prefix(['N', 'n']) {
        Some(rest) if rest.starts_with('\'') => rest,
        _ => trimmed,
    };

    for quote in ['\'', '"'] {
        if body.len() >= 2 && body.starts_with(quote) && body.ends_with(quote) {
            let inner = &body[1..body.len() - 1];
            let doubled: String = [quote, quote].iter().collect();
            return inner.replace(&doubled, &quote.to_string());
        }
    }
    trimmed.to_string()
}

fn is_null_literal(s: &str) -> bool {
    s.trim().eq_ignore_ascii_case("NULL")
}

/// Remove the first parenthesized group (quote-aware) from a column type:
/// `int(10) unsigned` → `int unsigned`, `enum('a','b')` → `enum`.
pub fn strip_type_args(column_type: &str) -> String {
    let Some(open) = column_type.find('(') else {
        return column_type.trim().to_string();
    };
    let Some(close) = matching_paren(column_type, open) else {
        return column_type.trim().to_string();
    };

    let head = column_type[..open].trim_end();
    let tail = column_type[close + 1..].trim_start();
    if tail.is_empty() {
        head.to_string()
    } else {
        format!("{} {}", head, tail)
    }
}

/// Byte index of the `)` closing the `(` at `open`, skipping quoted text.
fn matching_paren(s: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (idx, c) in s[open..].char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"' | '`') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(open + idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// Normalize a referential action: upper case, underscores become spaces.
pub fn normalize_action(raw: Option<&str>) -> Option<String> {
    let action = raw?.trim();
    if action.is_empty() {
        return None;
    }
    Some(action.replace('_', " ").to_ascii_uppercase())
}

// ===== MySQL =====

/// Labels of a MySQL `enum(...)` column type, in declaration order.
pub fn mysql_enum_values(column_type: &str) -> Option<Vec<String>> {
    quoted_labels(column_type, "enum")
}

/// Members of a MySQL `set(...)` column type, in declaration order.
pub fn mysql_set_values(column_type: &str) -> Option<Vec<String>> {
    quoted_labels(column_type, "set")
}

fn quoted_labels(column_type: &str, keyword: &str) -> Option<Vec<String>> {
    let trimmed = column_type.trim();
    let head = trimmed.get(..keyword.len())?;
    if !head.eq_ignore_ascii_case(keyword) {
        return None;
    }
    let rest = trimmed[keyword.len()..].trim_start();
    if !rest.starts_with('(') {
        return None;
    }
    let close = matching_paren(rest, 0)?;
    let inner = &rest[1..close];

    let mut labels = Vec::new();
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\'' {
            // separators and whitespace between labels
            continue;
        }
        let mut label = String::new();
        while let Some(c) = chars.next() {
            match c {
                '\'' if chars.peek() == Some(&'\'') => {
                    chars.next();
                    label.push('\'');
                }
                '\'' => break,
                '\\' => label.extend(chars.next()),
                _ => label.push(c),
            }
        }
        labels.push(label);
    }
    Some(labels)
}

/// MySQL `COLUMN_DEFAULT`: unquoted NULL means no default, quotes are stripped.
pub fn mysql_default(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    if is_null_literal(raw) {
        return None;
    }
    Some(strip_quotes(raw))
}

// ===== Postgres / CockroachDB =====

/// Postgres default expression: sequence calls are kept verbatim, otherwise the
/// trailing `::type` (or CockroachDB `:::TYPE`) cast is removed and the literal
/// unquoted.
pub fn postgres_default(raw: Option<&str>) -> Option<String> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.starts_with("nextval(") {
        return Some(raw.to_string());
    }

    let literal = strip_cast(raw);
    if is_null_literal(literal) {
        return None;
    }
    Some(strip_quotes(literal))
}

/// Cut at the first `::` that is outside quotes and parentheses.
fn strip_cast(expr: &str) -> &str {
    let bytes = expr.as_bytes();
    let mut depth = 0i32;
    let mut in_quote = false;
    let mut idx = 0;
    while idx < bytes.len() {
        match bytes[idx] {
            b'\'' => in_quote = !in_quote,
            b'(' if !in_quote => depth += 1,
            b')' if !in_quote => depth -= 1,
            b':' if !in_quote && depth == 0 && bytes.get(idx + 1) == Some(&b':') => {
                return expr[..idx].trim_end();
            }
            _ => {}
        }
        idx += 1;
    }
    expr
}

// ===== SQL Server =====

/// Remove every layer of parentheses wrapping the whole expression.
pub fn strip_wrapping_parens(expr: &str) -> &str {
    let mut current = expr.trim();
    while current.starts_with('(') && matching_paren(current, 0) == Some(current.len() - 1) {
        current = current[1..current.len() - 1].trim();
    }
    current
}

/// SQL Server `sys.default_constraints.definition`: `((0))` → `0`,
/// `(N'active')` → `active`, `(getdate())` → `getdate()`.
pub fn mssql_default(raw: Option<&str>) -> Option<String> {
    let inner = strip_wrapping_parens(raw?);
    if is_null_literal(inner) {
        return None;
    }
    Some(strip_quotes(inner))
}

// ===== Oracle =====

/// Oracle `DATA_DEFAULT` (a LONG that usually carries trailing whitespace).
pub fn oracle_default(raw: Option<&str>) -> Option<String> {
    let raw = raw?.trim();
    if raw.is_empty() || is_null_literal(raw) {
        return None;
    }
    Some(strip_quotes(raw))
}

// ===== SQLite =====

/// SQLite `dflt_value` from `PRAGMA table_xinfo`.
pub fn sqlite_default(raw: Option<&str>) -> Option<String> {
    let raw = raw?.trim();
    if is_null_literal(raw) {
        return None;
    }
    Some(strip_quotes(raw))
}

/// A declared SQLite column type split into its name and numeric arguments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeclaredType {
    /// Lower-cased type name without the size suffix.
    pub name: String,
    pub args: Vec<i64>,
}

impl DeclaredType {
    /// Parse `VARCHAR(36)`, `decimal(8, 2)`, `int unsigned`, ...
    pub fn parse(declared: &str) -> Self {
        let lowered = declared.trim().to_ascii_lowercase();
        let args = lowered
            .find('(')
            .and_then(|open| matching_paren(&lowered, open).map(|close| &lowered[open + 1..close]))
            .map(|inner| {
                inner
                    .split(',')
                    .filter_map(|arg| arg.trim().parse::<i64>().ok())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            name: strip_type_args(&lowered),
            args,
        }
    }

    fn is_numeric(&self) -> bool {
        ["int", "dec", "num", "real", "floa", "doub"]
            .iter()
            .any(|needle| self.name.contains(needle))
    }

    /// `(max_length, numeric_precision, numeric_scale)` implied by the arguments.
    pub fn sizes(&self) -> (Option<i64>, Option<i64>, Option<i64>) {
        let first = self.args.first().copied();
        if self.is_numeric() {
            (None, first, self.args.get(1).copied())
        } else {
            (first, None, None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_flags_accept_engine_spellings() {
        let row = Row::new()
            .with("a", "YES")
            .with("b", "N")
            .with("c", 1i64)
            .with("d", false)
            .with("e", "t")
            .with("f", SqlValue::Null);

        assert!(row.flag("a").unwrap());
        assert!(!row.flag("b").unwrap());
        assert!(row.flag("c").unwrap());
        assert!(!row.flag("d").unwrap());
        assert!(row.flag("e").unwrap());
        assert!(!row.flag("f").unwrap());
        assert!(!row.flag("missing").unwrap());
    }

    #[test]
    fn test_flag_rejects_garbage() {
        let row = Row::new().with("a", "maybe");
        assert!(matches!(row.flag("a"), Err(InspectError::Decode { .. })));
    }

    #[test]
    fn test_int_accepts_strings_and_floats() {
        let row = Row::new()
            .with("a", "255")
            .with("b", 10.0)
            .with("c", SqlValue::Null)
            .with("d", "abc");

        assert_eq!(row.int("a").unwrap(), Some(255));
        assert_eq!(row.int("b").unwrap(), Some(10));
        assert_eq!(row.int("c").unwrap(), None);
        assert!(row.int("d").is_err());
    }

    #[test]
    fn test_labels_from_array_or_literal() {
        let row = Row::new()
            .with("a", vec!["admin".to_string(), "user".to_string()])
            .with("b", "{admin,\"power user\",guest}");

        assert_eq!(row.labels("a").unwrap(), Some(vec!["admin".into(), "user".into()]));
        assert_eq!(
            row.labels("b").unwrap(),
            Some(vec!["admin".into(), "power user".into(), "guest".into()])
        );
        assert_eq!(row.labels("missing").unwrap(), None);
    }

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("'active'"), "active");
        assert_eq!(strip_quotes("N'active'"), "active");
        assert_eq!(strip_quotes("'it''s'"), "it's");
        assert_eq!(strip_quotes("\"x\""), "x");
        assert_eq!(strip_quotes("0"), "0");
        assert_eq!(strip_quotes("getdate()"), "getdate()");
        assert_eq!(strip_quotes("''"), "");
    }

    #[test]
    fn test_strip_type_args() {
        assert_eq!(strip_type_args("int(10) unsigned"), "int unsigned");
        assert_eq!(strip_type_args("varchar(255)"), "varchar");
        assert_eq!(strip_type_args("enum('a)','b')"), "enum");
        assert_eq!(strip_type_args("datetime"), "datetime");
        assert_eq!(strip_type_args("decimal(8,2)"), "decimal");
    }

    #[test]
    fn test_mysql_enum_values_keep_order() {
        assert_eq!(
            mysql_enum_values("enum('admin','user','guest')"),
            Some(vec!["admin".into(), "user".into(), "guest".into()])
        );
        assert_eq!(
            mysql_enum_values("enum('it''s','a,b','back\\\\slash')"),
            Some(vec!["it's".into(), "a,b".into(), "back\\slash".into()])
        );
        assert_eq!(mysql_enum_values("enum('')"), Some(vec!["".into()]));
        assert_eq!(mysql_enum_values("varchar(255)"), None);
        assert_eq!(mysql_enum_values("set('a','b')"), None);
        assert_eq!(
            mysql_set_values("set('read','write')"),
            Some(vec!["read".into(), "write".into()])
        );
    }

    #[test]
    fn test_normalize_action() {
        assert_eq!(normalize_action(Some("SET_NULL")).as_deref(), Some("SET NULL"));
        assert_eq!(normalize_action(Some("cascade")).as_deref(), Some("CASCADE"));
        assert_eq!(normalize_action(Some("NO ACTION")).as_deref(), Some("NO ACTION"));
        assert_eq!(normalize_action(Some("")), None);
        assert_eq!(normalize_action(None), None);
    }

    #[test]
    fn test_mysql_default() {
        assert_eq!(mysql_default(Some("NULL")), None);
        assert_eq!(mysql_default(None), None);
        assert_eq!(mysql_default(Some("'active'")).as_deref(), Some("active"));
        assert_eq!(mysql_default(Some("active")).as_deref(), Some("active"));
        assert_eq!(
            mysql_default(Some("CURRENT_TIMESTAMP")).as_deref(),
            Some("CURRENT_TIMESTAMP")
        );
    }

    #[test]
    fn test_postgres_default() {
        assert_eq!(
            postgres_default(Some("nextval('teams_id_seq'::regclass)")).as_deref(),
            Some("nextval('teams_id_seq'::regclass)")
        );
        assert_eq!(
            postgres_default(Some("'active'::character varying")).as_deref(),
            Some("active")
        );
        assert_eq!(postgres_default(Some("'a::b'::text")).as_deref(), Some("a::b"));
        assert_eq!(postgres_default(Some("NULL::character varying")), None);
        assert_eq!(postgres_default(Some("now()")).as_deref(), Some("now()"));
        assert_eq!(postgres_default(Some("0")).as_deref(), Some("0"));
        assert_eq!(postgres_default(None), None);
    }

    #[test]
    fn test_cockroach_default_casts() {
        assert_eq!(postgres_default(Some("'active':::STRING")).as_deref(), Some("active"));
        assert_eq!(
            postgres_default(Some("unique_rowid()")).as_deref(),
            Some("unique_rowid()")
        );
        assert_eq!(postgres_default(Some("now():::TIMESTAMP")).as_deref(), Some("now()"));
    }

    #[test]
    fn test_mssql_default() {
        assert_eq!(strip_wrapping_parens("((0))"), "0");
        assert_eq!(strip_wrapping_parens("(a) + (b)"), "(a) + (b)");
        assert_eq!(mssql_default(Some("((0))")).as_deref(), Some("0"));
        assert_eq!(mssql_default(Some("(N'active')")).as_deref(), Some("active"));
        assert_eq!(mssql_default(Some("(getdate())")).as_deref(), Some("getdate()"));
        assert_eq!(mssql_default(Some("(NULL)")), None);
    }

    #[test]
    fn test_oracle_and_sqlite_defaults() {
        assert_eq!(oracle_default(Some("'active' \n")).as_deref(), Some("active"));
        assert_eq!(oracle_default(Some("NULL")), None);
        assert_eq!(sqlite_default(Some("'active'")).as_deref(), Some("active"));
        assert_eq!(sqlite_default(Some("NULL")), None);
        assert_eq!(
            sqlite_default(Some("CURRENT_TIMESTAMP")).as_deref(),
            Some("CURRENT_TIMESTAMP")
        );
    }

    #[test]
    fn test_declared_type() {
        let ty = DeclaredType::parse("VARCHAR(36)");
        assert_eq!(ty.name, "varchar");
        assert_eq!(ty.sizes(), (Some(36), None, None));

        let ty = DeclaredType::parse("decimal(8, 2)");
        assert_eq!(ty.name, "decimal");
        assert_eq!(ty.sizes(), (None, Some(8), Some(2)));

        let ty = DeclaredType::parse("integer");
        assert_eq!(ty.name, "integer");
        assert_eq!(ty.sizes(), (None, None, None));
    }

    #[test]
    fn test_non_ascii_text() {
        assert_eq!(strip_type_args("énum('é','ü') unsigned"), "énum unsigned");
        assert_eq!(
            mysql_enum_values("enum('café','naïve')"),
            Some(vec!["café".to_string(), "naïve".to_string()])
        );
        assert_eq!(postgres_default(Some("'été'::text")).as_deref(), Some("été"));
        assert_eq!(mssql_default(Some("(N'Zürich')")).as_deref(), Some("Zürich"));
        assert_eq!(DeclaredType::parse("texte(10) ñ").name, "texte ñ");
    }
}
