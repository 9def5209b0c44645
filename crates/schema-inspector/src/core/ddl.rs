//! Column facts that SQLite only keeps in the stored `CREATE TABLE` text.
//!
//! Generation expressions and `AUTOINCREMENT` have no catalog column, so the
//! DDL is tokenized with sqlparser's SQLite dialect. Comments, every identifier
//! quote style (`"x"`, `` `x` ``, `[x]`, `'x'`) and non-ASCII names come out of
//! the tokenizer the way SQLite reads them.

use sqlparser::dialect::SQLiteDialect;
use sqlparser::keywords::Keyword;
use sqlparser::tokenizer::{Token, Tokenizer, Whitespace};
use tracing::debug;

/// Leading keywords of table-level constraints inside the column list.
const TABLE_CONSTRAINT_KEYWORDS: [Keyword; 5] = [
    Keyword::CONSTRAINT,
    Keyword::PRIMARY,
    Keyword::UNIQUE,
    Keyword::CHECK,
    Keyword::FOREIGN,
];

/// The column list of a `CREATE TABLE` statement.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableDefinition {
    pub columns: Vec<ColumnDefinition>,
    /// `AUTOINCREMENT` appears somewhere in the body, including
    /// `PRIMARY KEY (id AUTOINCREMENT)` table constraints.
    pub autoincrement: bool,
}

/// One column definition from a `CREATE TABLE` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDefinition {
    /// Column name with identifier quotes removed.
    pub name: String,
    /// Everything after the name (type and constraints), comments dropped.
    pub definition: String,
    generation_expression: Option<String>,
    autoincrement: bool,
}

impl ColumnDefinition {
    /// Expression of a `GENERATED ALWAYS AS (...)` / `AS (...)` clause.
    pub fn generation_expression(&self) -> Option<&str> {
        self.generation_expression.as_deref()
    }

    /// True when the definition carries the `AUTOINCREMENT` keyword.
    pub fn is_autoincrement(&self) -> bool {
        self.autoincrement
    }
}

impl TableDefinition {
    /// Parse the body of a SQLite `CREATE TABLE` statement.
    ///
    /// Table-level constraints are skipped. Text without a column list
    /// (`CREATE TABLE x AS SELECT ...`) or that does not tokenize yields an
    /// empty definition.
    pub fn parse(create_sql: &str) -> Self {
        let tokens = tokenize(create_sql);
        let parts = body_parts(&tokens);

        Self {
            columns: parts.iter().filter_map(|part| column_definition(part)).collect(),
            autoincrement: parts.iter().flat_map(|part| part.iter()).any(is_autoincrement),
        }
    }
}

/// Tokens with comments replaced by a single space.
fn tokenize(sql: &str) -> Vec<Token> {
    let dialect = SQLiteDialect {};
    match Tokenizer::new(&dialect, sql).tokenize() {
        Ok(tokens) => tokens
            .into_iter()
            .map(|token| match token {
                Token::Whitespace(
                    Whitespace::SingleLineComment { .. } | Whitespace::MultiLineComment(_),
                ) => Token::Whitespace(Whitespace::Space),
                other => other,
            })
            .collect(),
        Err(e) => {
            debug!("Skipping CREATE TABLE text that does not tokenize: {}", e);
            Vec::new()
        }
    }
}

/// Comma-separated entries of the outermost parenthesized list.
fn body_parts(tokens: &[Token]) -> Vec<&[Token]> {
    let Some(open) = tokens.iter().position(|t| *t == Token::LParen) else {
        return Vec::new();
    };
    // `CREATE TABLE x AS SELECT f(...)` has no column list
    if tokens[..open].iter().any(|t| is_keyword(t, Keyword::AS)) {
        return Vec::new();
    }

    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = open + 1;
    for (idx, token) in tokens.iter().enumerate().skip(open + 1) {
        match token {
            Token::LParen => depth += 1,
            Token::RParen if depth == 0 => {
                parts.push(&tokens[start..idx]);
                return parts;
            }
            Token::RParen => depth -= 1,
            Token::Comma if depth == 0 => {
                parts.push(&tokens[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    Vec::new()
}

fn column_definition(part: &[Token]) -> Option<ColumnDefinition> {
    let (name_idx, first) = part
        .iter()
        .enumerate()
        .find(|(_, t)| !matches!(t, Token::Whitespace(_)))?;

    let name = match first {
        Token::Word(word) => {
            if word.quote_style.is_none() && TABLE_CONSTRAINT_KEYWORDS.contains(&word.keyword) {
                return None;
            }
            word.value.clone()
        }
        Token::SingleQuotedString(s) | Token::DoubleQuotedString(s) => s.clone(),
        _ => return None,
    };

    let rest = &part[name_idx + 1..];
    Some(ColumnDefinition {
        name,
        definition: render(rest),
        generation_expression: generation_expression(rest),
        autoincrement: rest.iter().any(is_autoincrement),
    })
}

fn generation_expression(tokens: &[Token]) -> Option<String> {
    let significant: Vec<(usize, &Token)> = tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| !matches!(t, Token::Whitespace(_)))
        .collect();

    significant.windows(2).find_map(|pair| match pair {
        [(_, as_kw), (open, Token::LParen)] if is_keyword(as_kw, Keyword::AS) => {
            let close = closing_paren(tokens, *open)?;
            Some(render(&tokens[open + 1..close]))
        }
        _ => None,
    })
}

/// Index of the `)` closing the `(` at `open`.
fn closing_paren(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, token) in tokens.iter().enumerate().skip(open) {
        match token {
            Token::LParen => depth += 1,
            Token::RParen => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

fn render(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(ToString::to_string)
        .collect::<String>()
        .trim()
        .to_string()
}

fn is_keyword(token: &Token, keyword: Keyword) -> bool {
    matches!(token, Token::Word(w) if w.quote_style.is_none() && w.keyword == keyword)
}

fn is_autoincrement(token: &Token) -> bool {
    matches!(token, Token::Word(w) if w.quote_style.is_none() && w.value.eq_ignore_ascii_case("AUTOINCREMENT"))
}
