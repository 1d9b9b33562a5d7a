//! Hierarchical object identifiers and their fully-qualified, quoted string forms.

use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

/// Longest name the platform accepts for a single identifier component.
pub const MAX_IDENTIFIER_LENGTH: usize = 255;

/// Quote one identifier component (embedded quotes are doubled).
pub(crate) fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn valid_component(s: &str) -> bool {
    !s.is_empty() && s.chars().count() <= MAX_IDENTIFIER_LENGTH
}

/// Common surface of every identifier kind.
pub trait ObjectIdentifier: fmt::Debug + Clone + Send + Sync {
    fn name(&self) -> &str;

    /// Each component quoted and joined with `.`.
    fn fully_qualified_name(&self) -> String;

    /// Every component is non-empty and within the platform's length limit.
    fn is_valid(&self) -> bool;
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AccountObjectIdentifier {
    name: String,
}

impl AccountObjectIdentifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn parse(s: &str) -> Result<Self, IdentifierParseError> {
        let [name] = parse_exact::<1>(s)?;
        Ok(Self::new(name))
    }
}

impl ObjectIdentifier for AccountObjectIdentifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn fully_qualified_name(&self) -> String {
        quoted(&self.name)
    }

    fn is_valid(&self) -> bool {
        valid_component(&self.name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DatabaseObjectIdentifier {
    database_name: String,
    name: String,
}

impl DatabaseObjectIdentifier {
    pub fn new(database_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            database_name: database_name.into(),
            name: name.into(),
        }
    }

    pub fn parse(s: &str) -> Result<Self, IdentifierParseError> {
        let [database, name] = parse_exact::<2>(s)?;
        Ok(Self::new(database, name))
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    pub fn database_id(&self) -> AccountObjectIdentifier {
        AccountObjectIdentifier::new(self.database_name.clone())
    }
}

impl ObjectIdentifier for DatabaseObjectIdentifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn fully_qualified_name(&self) -> String {
        format!("{}.{}", quoted(&self.database_name), quoted(&self.name))
    }

    fn is_valid(&self) -> bool {
        valid_component(&self.database_name) && valid_component(&self.name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SchemaObjectIdentifier {
    database_name: String,
    schema_name: String,
    name: String,
}

impl SchemaObjectIdentifier {
    pub fn new(
        database_name: impl Into<String>,
        schema_name: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            database_name: database_name.into(),
            schema_name: schema_name.into(),
            name: name.into(),
        }
    }

    /// Identifier of `name` inside the given schema.
    pub fn in_schema(schema: &DatabaseObjectIdentifier, name: impl Into<String>) -> Self {
        Self::new(schema.database_name(), schema.name(), name)
    }

    pub fn parse(s: &str) -> Result<Self, IdentifierParseError> {
        let [database, schema, name] = parse_exact::<3>(s)?;
        Ok(Self::new(database, schema, name))
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    pub fn database_id(&self) -> AccountObjectIdentifier {
        AccountObjectIdentifier::new(self.database_name.clone())
    }

    pub fn schema_id(&self) -> DatabaseObjectIdentifier {
        DatabaseObjectIdentifier::new(self.database_name.clone(), self.schema_name.clone())
    }
}

impl ObjectIdentifier for SchemaObjectIdentifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn fully_qualified_name(&self) -> String {
        format!(
            "{}.{}.{}",
            quoted(&self.database_name),
            quoted(&self.schema_name),
            quoted(&self.name)
        )
    }

    fn is_valid(&self) -> bool {
        valid_component(&self.database_name)
            && valid_component(&self.schema_name)
            && valid_component(&self.name)
    }
}

/// Schema object identifier for overloaded routines: the argument types are part of its identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SchemaObjectIdentifierWithArguments {
    id: SchemaObjectIdentifier,
    argument_data_types: Vec<DataType>,
}

impl SchemaObjectIdentifierWithArguments {
    pub fn new(
        database_name: impl Into<String>,
        schema_name: impl Into<String>,
        name: impl Into<String>,
        argument_data_types: Vec<DataType>,
    ) -> Self {
        Self {
            id: SchemaObjectIdentifier::new(database_name, schema_name, name),
            argument_data_types,
        }
    }

    /// Parse `"db"."schema"."name"(TYPE, TYPE)`.
    pub fn parse(s: &str) -> Result<Self, IdentifierParseError> {
        let (parts, rest) = split_components(s)?;
        let [database, schema, name]: [String; 3] = parts
            .try_into()
            .map_err(|p: Vec<String>| IdentifierParseError::WrongPartCount { expected: 3, found: p.len() })?;
        let rest = rest.trim();
        let inner = rest
            .strip_prefix('(')
            .and_then(|r| r.strip_suffix(')'))
            .ok_or_else(|| IdentifierParseError::MissingArguments(s.to_string()))?;
        let argument_data_types = split_arguments(inner)
            .ok_or_else(|| IdentifierParseError::UnbalancedArguments(s.to_string()))?
            .into_iter()
            .map(DataType::parse)
            .collect();
        Ok(Self::new(database, schema, name, argument_data_types))
    }

    pub fn database_name(&self) -> &str {
        self.id.database_name()
    }

    pub fn schema_name(&self) -> &str {
        self.id.schema_name()
    }

    pub fn argument_data_types(&self) -> &[DataType] {
        &self.argument_data_types
    }

    pub fn schema_object_id(&self) -> &SchemaObjectIdentifier {
        &self.id
    }

    pub fn schema_id(&self) -> DatabaseObjectIdentifier {
        self.id.schema_id()
    }
}

impl ObjectIdentifier for SchemaObjectIdentifierWithArguments {
    fn name(&self) -> &str {
        self.id.name()
    }

    fn fully_qualified_name(&self) -> String {
        let args: Vec<String> = self.argument_data_types.iter().map(ToString::to_string).collect();
        format!("{}({})", self.id.fully_qualified_name(), args.join(", "))
    }

    fn is_valid(&self) -> bool {
        self.id.is_valid()
    }
}

/// Identifier of any kind, picked by its number of components.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AnyObjectIdentifier {
    Account(AccountObjectIdentifier),
    Database(DatabaseObjectIdentifier),
    Schema(SchemaObjectIdentifier),
    SchemaWithArguments(SchemaObjectIdentifierWithArguments),
}

impl AnyObjectIdentifier {
    /// `a`, `"a"."b"`, `"a"."b"."c"` or `"a"."b"."c"(T)`.
    pub fn parse(s: &str) -> Result<Self, IdentifierParseError> {
        let (parts, rest) = split_components(s)?;
        if !rest.is_empty() {
            return SchemaObjectIdentifierWithArguments::parse(s).map(Self::SchemaWithArguments);
        }
        match <[String; 3]>::try_from(parts) {
            Ok([database, schema, name]) => Ok(Self::Schema(SchemaObjectIdentifier::new(database, schema, name))),
            Err(parts) => match <[String; 2]>::try_from(parts) {
                Ok([database, name]) => Ok(Self::Database(DatabaseObjectIdentifier::new(database, name))),
                Err(parts) => match <[String; 1]>::try_from(parts) {
                    Ok([name]) => Ok(Self::Account(AccountObjectIdentifier::new(name))),
                    Err(parts) => Err(IdentifierParseError::WrongPartCount {
                        expected: 3,
                        found: parts.len(),
                    }),
                },
            },
        }
    }

    fn inner(&self) -> &dyn DynIdentifier {
        match self {
            Self::Account(id) => id,
            Self::Database(id) => id,
            Self::Schema(id) => id,
            Self::SchemaWithArguments(id) => id,
        }
    }
}

/// Object-safe view of [`ObjectIdentifier`].
trait DynIdentifier {
    fn dyn_name(&self) -> &str;
    fn dyn_fully_qualified_name(&self) -> String;
    fn dyn_is_valid(&self) -> bool;
}

impl<T: ObjectIdentifier> DynIdentifier for T {
    fn dyn_name(&self) -> &str {
        self.name()
    }

    fn dyn_fully_qualified_name(&self) -> String {
        self.fully_qualified_name()
    }

    fn dyn_is_valid(&self) -> bool {
        self.is_valid()
    }
}

impl ObjectIdentifier for AnyObjectIdentifier {
    fn name(&self) -> &str {
        self.inner().dyn_name()
    }

    fn fully_qualified_name(&self) -> String {
        self.inner().dyn_fully_qualified_name()
    }

    fn is_valid(&self) -> bool {
        self.inner().dyn_is_valid()
    }
}

macro_rules! any_from {
    ($($variant:ident => $t:ty),*) => {
        $(impl From<$t> for AnyObjectIdentifier {
            fn from(id: $t) -> Self {
                AnyObjectIdentifier::$variant(id)
            }
        })*
    };
}

any_from!(
    Account => AccountObjectIdentifier,
    Database => DatabaseObjectIdentifier,
    Schema => SchemaObjectIdentifier,
    SchemaWithArguments => SchemaObjectIdentifierWithArguments
);

macro_rules! display_as_fully_qualified {
    ($($t:ty),*) => {
        $(impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.fully_qualified_name())
            }
        })*
    };
}

display_as_fully_qualified!(
    AccountObjectIdentifier,
    DatabaseObjectIdentifier,
    SchemaObjectIdentifier,
    SchemaObjectIdentifierWithArguments,
    AnyObjectIdentifier
);

/// Column/argument data type, kept in the platform's upper-case spelling.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DataType(Cow<'static, str>);

impl DataType {
    pub const NUMBER: DataType = DataType(Cow::Borrowed("NUMBER"));
    pub const FLOAT: DataType = DataType(Cow::Borrowed("FLOAT"));
    pub const VARCHAR: DataType = DataType(Cow::Borrowed("VARCHAR"));
    pub const BOOLEAN: DataType = DataType(Cow::Borrowed("BOOLEAN"));
    pub const DATE: DataType = DataType(Cow::Borrowed("DATE"));
    pub const TIMESTAMP_NTZ: DataType = DataType(Cow::Borrowed("TIMESTAMP_NTZ"));
    pub const VARIANT: DataType = DataType(Cow::Borrowed("VARIANT"));
    pub const OBJECT: DataType = DataType(Cow::Borrowed("OBJECT"));
    pub const ARRAY: DataType = DataType(Cow::Borrowed("ARRAY"));

    /// Normalize case and inner whitespace: `number( 38, 0 )` -> `NUMBER(38, 0)`.
    pub fn parse(s: &str) -> Self {
        let collapsed = s.to_uppercase().split_whitespace().collect::<Vec<_>>().join(" ");
        let normalized = collapsed
            .replace(" (", "(")
            .replace("( ", "(")
            .replace(" )", ")")
            .replace(" ,", ",")
            .replace(",", ", ")
            .replace(",  ", ", ");
        DataType(Cow::Owned(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Split an argument list on top-level commas, so `VECTOR(FLOAT, 3)` stays one type.
/// `None` when the parentheses do not balance.
fn split_arguments(inner: &str) -> Option<Vec<&str>> {
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                args.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    args.push(&inner[start..]);
    Some(args.into_iter().map(str::trim).filter(|a| !a.is_empty()).collect())
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierParseError {
    #[error("empty identifier")]
    Empty,
    #[error("unterminated quoted identifier: {0}")]
    UnterminatedQuote(String),
    #[error("expected {expected} identifier parts, found {found}")]
    WrongPartCount { expected: usize, found: usize },
    #[error("unexpected trailing input in identifier: {0}")]
    Trailing(String),
    #[error("missing argument list in identifier: {0}")]
    MissingArguments(String),
    #[error("unbalanced parentheses in argument list: {0}")]
    UnbalancedArguments(String),
}

fn parse_exact<const N: usize>(s: &str) -> Result<[String; N], IdentifierParseError> {
    let (parts, rest) = split_components(s)?;
    if !rest.trim().is_empty() {
        return Err(IdentifierParseError::Trailing(rest.to_string()));
    }
    parts
        .try_into()
        .map_err(|p: Vec<String>| IdentifierParseError::WrongPartCount { expected: N, found: p.len() })
}

/// Split a dotted identifier into its unquoted components. Parsing stops at an
/// unquoted `(`; the remainder (argument list) is returned as the second value.
fn split_components(s: &str) -> Result<(Vec<String>, &str), IdentifierParseError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(IdentifierParseError::Empty);
    }
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = s.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => loop {
                match chars.next() {
                    Some((_, '"')) => {
                        if matches!(chars.peek(), Some((_, '"'))) {
                            chars.next();
                            current.push('"');
                        } else {
                            break;
                        }
                    }
                    Some((_, other)) => current.push(other),
                    None => return Err(IdentifierParseError::UnterminatedQuote(s.to_string())),
                }
            },
            '.' => parts.push(std::mem::take(&mut current)),
            '(' => {
                parts.push(std::mem::take(&mut current));
                return Ok((parts, &s[i..]));
            }
            other => current.push(other),
        }
    }
    parts.push(current);
    Ok((parts, ""))
}
