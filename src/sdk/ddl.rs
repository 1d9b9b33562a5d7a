//! Statement builder: ordered clause lists rendered into SQL text.
//!
//! Every option struct describes its statement by pushing clauses in grammar
//! order. Absent (`None`) values contribute nothing; present tokens are joined
//! with the statement's separator (a single space unless stated otherwise).

use crate::sdk::identifier::ObjectIdentifier;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SerializationError {
    #[error("required identifier {0} is not set")]
    MissingIdentifier(&'static str),
    #[error("unsupported value for {field}: {reason}")]
    UnsupportedValue { field: &'static str, reason: String },
}

/// Literal value of a parameter clause.
#[derive(Clone, Debug, PartialEq)]
pub enum SqlValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Text; quoted according to the clause's [`Quotes`].
    Text(String),
    /// Parenthesized, comma-separated list; quoting applies to each element.
    List(Vec<SqlValue>),
}

macro_rules! sql_value_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for SqlValue {
            fn from(v: $t) -> Self {
                SqlValue::Int(v as i64)
            }
        })*
    };
}

sql_value_from_int!(i32, i64, u32, u16);

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Float(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl<T: Into<SqlValue>> From<Vec<T>> for SqlValue {
    fn from(v: Vec<T>) -> Self {
        SqlValue::List(v.into_iter().map(Into::into).collect())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Quotes {
    #[default]
    None,
    Single,
}

/// Rendering options of a parameter clause.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParameterStyle {
    pub quotes: Quotes,
    /// `NAME = value` when true, `NAME value` otherwise.
    pub equals: bool,
}

impl Default for ParameterStyle {
    fn default() -> Self {
        Self {
            quotes: Quotes::None,
            equals: true,
        }
    }
}

impl ParameterStyle {
    pub fn single_quotes() -> Self {
        Self {
            quotes: Quotes::Single,
            equals: true,
        }
    }

    pub fn no_equals() -> Self {
        Self {
            quotes: Quotes::None,
            equals: false,
        }
    }

    pub fn quoted_no_equals() -> Self {
        Self {
            quotes: Quotes::Single,
            equals: false,
        }
    }
}

/// Rendering options of a list clause.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListStyle {
    pub separator: &'static str,
    pub parentheses: bool,
}

impl Default for ListStyle {
    fn default() -> Self {
        Self {
            separator: ", ",
            parentheses: true,
        }
    }
}

impl ListStyle {
    pub fn no_parentheses() -> Self {
        Self {
            separator: ", ",
            parentheses: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Clause {
    Static(&'static str),
    Parameter {
        name: &'static str,
        value: SqlValue,
        style: ParameterStyle,
    },
    Identifier {
        prefix: Option<&'static str>,
        name: String,
    },
    MissingIdentifier(&'static str),
    Nested {
        prefix: Option<&'static str>,
        statement: Statement,
    },
    List {
        prefix: Option<&'static str>,
        items: Vec<Statement>,
        style: ListStyle,
    },
}

/// Ordered clause list describing one SQL statement (or a fragment of one).
#[derive(Clone, Debug, PartialEq)]
pub struct Statement {
    clauses: Vec<Clause>,
    separator: &'static str,
}

impl Default for Statement {
    fn default() -> Self {
        Self::new()
    }
}

impl Statement {
    pub fn new() -> Self {
        Self {
            clauses: Vec::new(),
            separator: " ",
        }
    }

    /// Fragment whose tokens are joined with `, ` (e.g. the body of an `UNSET`).
    pub fn comma_separated() -> Self {
        Self {
            clauses: Vec::new(),
            separator: ", ",
        }
    }

    /// Literal text, always emitted.
    pub fn sql(mut self, text: &'static str) -> Self {
        self.clauses.push(Clause::Static(text));
        self
    }

    /// Literal text emitted only for `Some(true)`.
    pub fn keyword(mut self, text: &'static str, value: Option<bool>) -> Self {
        if value == Some(true) {
            self.clauses.push(Clause::Static(text));
        }
        self
    }

    /// `NAME = value` with unquoted value.
    pub fn parameter<V: Into<SqlValue>>(self, name: &'static str, value: Option<V>) -> Self {
        self.parameter_with(name, value, ParameterStyle::default())
    }

    /// `NAME = 'value'`.
    pub fn quoted_parameter<V: Into<SqlValue>>(self, name: &'static str, value: Option<V>) -> Self {
        self.parameter_with(name, value, ParameterStyle::single_quotes())
    }

    pub fn parameter_with<V: Into<SqlValue>>(
        mut self,
        name: &'static str,
        value: Option<V>,
        style: ParameterStyle,
    ) -> Self {
        if let Some(value) = value {
            self.clauses.push(Clause::Parameter {
                name,
                value: value.into(),
                style,
            });
        }
        self
    }

    /// Fully-qualified name of a required identifier.
    pub fn identifier<I: ObjectIdentifier>(mut self, id: &I) -> Self {
        self.clauses.push(Clause::Identifier {
            prefix: None,
            name: id.fully_qualified_name(),
        });
        self
    }

    /// Identifier that must be present; `None` fails rendering with [`SerializationError::MissingIdentifier`].
    pub fn required_identifier<I: ObjectIdentifier>(mut self, field: &'static str, id: Option<&I>) -> Self {
        self.clauses.push(match id {
            Some(id) => Clause::Identifier {
                prefix: None,
                name: id.fully_qualified_name(),
            },
            None => Clause::MissingIdentifier(field),
        });
        self
    }

    /// Optional identifier with a fixed leading keyword, e.g. `RENAME TO "db"."sc"."new"`.
    pub fn prefixed_identifier<I: ObjectIdentifier>(mut self, prefix: &'static str, id: Option<&I>) -> Self {
        if let Some(id) = id {
            self.clauses.push(Clause::Identifier {
                prefix: Some(prefix),
                name: id.fully_qualified_name(),
            });
        }
        self
    }

    /// Nested fragment rendered in place, optionally after a keyword (`SET ...`).
    pub fn nested<T: ToSql>(mut self, prefix: Option<&'static str>, value: Option<&T>) -> Self {
        if let Some(value) = value {
            self.clauses.push(Clause::Nested {
                prefix,
                statement: value.statement(),
            });
        }
        self
    }

    /// List of fragments joined by the style's separator.
    pub fn list<T: ToSql>(mut self, prefix: Option<&'static str>, items: Option<&[T]>, style: ListStyle) -> Self {
        if let Some(items) = items {
            self.clauses.push(Clause::List {
                prefix,
                items: items.iter().map(ToSql::statement).collect(),
                style,
            });
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Render the clauses in order into one SQL string.
    pub fn render(&self) -> Result<String, SerializationError> {
        let mut tokens = Vec::with_capacity(self.clauses.len());
        for clause in &self.clauses {
            let token = match clause {
                Clause::Static(text) => text.to_string(),
                Clause::Parameter { name, value, style } => {
                    let rendered = render_value(name, value, style.quotes)?;
                    if style.equals {
                        format!("{} = {}", name, rendered)
                    } else {
                        format!("{} {}", name, rendered)
                    }
                }
                Clause::Identifier { prefix, name } => with_prefix(*prefix, name.clone()),
                Clause::MissingIdentifier(field) => return Err(SerializationError::MissingIdentifier(field)),
                Clause::Nested { prefix, statement } => with_prefix(*prefix, statement.render()?),
                Clause::List { prefix, items, style } => {
                    let rendered = items
                        .iter()
                        .map(Statement::render)
                        .collect::<Result<Vec<_>, _>>()?
                        .join(style.separator);
                    let body = if style.parentheses {
                        format!("({})", rendered)
                    } else {
                        rendered
                    };
                    with_prefix(*prefix, body)
                }
            };
            if !token.is_empty() {
                tokens.push(token);
            }
        }
        Ok(tokens.join(self.separator))
    }
}

fn with_prefix(prefix: Option<&'static str>, body: String) -> String {
    match prefix {
        Some(p) if body.is_empty() => p.to_string(),
        Some(p) => format!("{} {}", p, body),
        None => body,
    }
}

fn render_value(field: &'static str, value: &SqlValue, quotes: Quotes) -> Result<String, SerializationError> {
    Ok(match value {
        SqlValue::Int(n) => n.to_string(),
        SqlValue::Float(f) => {
            if !f.is_finite() {
                return Err(SerializationError::UnsupportedValue {
                    field,
                    reason: format!("non-finite float {}", f),
                });
            }
            f.to_string()
        }
        SqlValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        SqlValue::Text(s) => match quotes {
            Quotes::Single => format!("'{}'", s.replace('\'', "''")),
            Quotes::None => s.clone(),
        },
        SqlValue::List(items) => {
            let mut out = String::from("(");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&render_value(field, item, quotes)?);
            }
            out.push(')');
            out
        }
    })
}

/// Option structs and fragments describe themselves as a [`Statement`].
pub trait ToSql {
    fn statement(&self) -> Statement;

    fn to_sql(&self) -> Result<String, SerializationError> {
        self.statement().render()
    }
}
