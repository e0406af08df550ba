//! Statement Templates
//!
//! A [`Statement`] is compiled from a `'static` template. Named placeholders
//! (`:name`) are rewritten to positional `$N` parameters, which both SQLite
//! and PostgreSQL accept. Positional placeholders in the template itself are
//! rejected so every bound value has a name.
//!
//! Not placeholders:
//! - `::` (PostgreSQL casts)
//! - anything inside single-quoted literals or double-quoted identifiers

use crate::error::{QueryError, QueryResult};
use crate::value::{Params, Value};

// ============================================================================
// Result Columns
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Integer,
    Timestamp,
}

/// Typed result column a statement declares it returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnType,
    pub nullable: bool,
}

impl Column {
    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnType::Text,
            nullable: false,
        }
    }

    pub const fn integer(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnType::Integer,
            nullable: false,
        }
    }

    pub const fn timestamp(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnType::Timestamp,
            nullable: false,
        }
    }

    pub const fn nullable(self) -> Self {
        Self {
            nullable: true,
            ..self
        }
    }
}

// ============================================================================
// Statement
// ============================================================================

/// Compiled statement template
///
/// ```rust
/// use query::{Column, Statement};
///
/// let stmt = Statement::new("SELECT id FROM users WHERE username = :username")
///     .unwrap()
///     .returning([Column::text("id")]);
/// assert_eq!(stmt.sql(), "SELECT id FROM users WHERE username = $1");
/// assert_eq!(stmt.placeholders(), &["username"]);
/// ```
#[derive(Debug, Clone)]
pub struct Statement {
    template: &'static str,
    sql: String,
    placeholders: Vec<&'static str>,
    columns: Vec<Column>,
}

impl Statement {
    pub fn new(template: &'static str) -> QueryResult<Self> {
        let (sql, placeholders) = compile(template)?;
        Ok(Self {
            template,
            sql,
            placeholders,
            columns: Vec::new(),
        })
    }

    /// Declare the typed columns of each result row. Statements without
    /// columns report only the affected row count.
    pub fn returning(mut self, columns: impl IntoIterator<Item = Column>) -> Self {
        self.columns = columns.into_iter().collect();
        self
    }

    /// Original template, safe to log
    pub fn template(&self) -> &'static str {
        self.template
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Placeholder names in `$N` order
    pub fn placeholders(&self) -> &[&'static str] {
        &self.placeholders
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Values in `$N` order. Every placeholder must be bound, and every
    /// bound name must appear in the template.
    pub fn bind_order<'p>(&self, params: &'p Params) -> QueryResult<Vec<&'p Value>> {
        if let Some(extra) = params.names().find(|n| !self.placeholders.contains(n)) {
            return Err(QueryError::UnexpectedParameter(extra.to_string()));
        }

        self.placeholders
            .iter()
            .map(|name| {
                params
                    .get(name)
                    .ok_or_else(|| QueryError::MissingParameter(name.to_string()))
            })
            .collect()
    }
}

fn is_name_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

fn is_name_char(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

fn compile(template: &'static str) -> QueryResult<(String, Vec<&'static str>)> {
    let mut sql = String::with_capacity(template.len() + 8);
    let mut names: Vec<&'static str> = Vec::new();
    let mut quote: Option<char> = None;
    let mut chars = template.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if let Some(q) = quote {
            sql.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '\'' | '"' => {
                quote = Some(c);
                sql.push(c);
            }
            ':' => match chars.peek() {
                Some(&(_, ':')) => {
                    chars.next();
                    sql.push_str("::");
                }
                Some(&(_, next)) if is_name_start(next) => {
                    let start = i + 1;
                    let mut end = start;
                    while let Some(&(j, n)) = chars.peek() {
                        if !is_name_char(n) {
                            break;
                        }
                        end = j + n.len_utf8();
                        chars.next();
                    }

                    let name = &template[start..end];
                    let position = match names.iter().position(|n| *n == name) {
                        Some(index) => index + 1,
                        None => {
                            names.push(name);
                            names.len()
                        }
                    };
                    sql.push('$');
                    sql.push_str(&position.to_string());
                }
                _ => sql.push(c),
            },
            '$' | '?' => {
                return Err(QueryError::Template(format!(
                    "positional placeholder '{c}' at byte {i}, use :name"
                )));
            }
            _ => sql.push(c),
        }
    }

    if quote.is_some() {
        return Err(QueryError::Template("unterminated quoted section".to_string()));
    }

    Ok((sql, names))
}
