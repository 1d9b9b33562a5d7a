//! Pieces shared by every object type: object kinds, SHOW filters, and the
//! generic DROP / SHOW / DESCRIBE statements.

use crate::sdk::ddl::{ParameterStyle, Statement, ToSql};
use crate::sdk::identifier::{AccountObjectIdentifier, DatabaseObjectIdentifier, ObjectIdentifier};
use crate::sdk::validation::{check_identifier, Validate, ValidationError, ValidationErrors};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

/// Kinds of platform objects this SDK addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Account,
    Database,
    Schema,
    Table,
    View,
    Function,
    Procedure,
    Warehouse,
    Role,
    User,
    FileFormat,
    NetworkRule,
    PasswordPolicy,
    SessionPolicy,
}

impl ObjectType {
    /// Singular SQL keyword, e.g. `PASSWORD POLICY`.
    pub fn keyword(&self) -> &'static str {
        match self {
            ObjectType::Account => "ACCOUNT",
            ObjectType::Database => "DATABASE",
            ObjectType::Schema => "SCHEMA",
            ObjectType::Table => "TABLE",
            ObjectType::View => "VIEW",
            ObjectType::Function => "FUNCTION",
            ObjectType::Procedure => "PROCEDURE",
            ObjectType::Warehouse => "WAREHOUSE",
            ObjectType::Role => "ROLE",
            ObjectType::User => "USER",
            ObjectType::FileFormat => "FILE FORMAT",
            ObjectType::NetworkRule => "NETWORK RULE",
            ObjectType::PasswordPolicy => "PASSWORD POLICY",
            ObjectType::SessionPolicy => "SESSION POLICY",
        }
    }

    /// Plural keyword used by SHOW, e.g. `PASSWORD POLICIES`.
    pub fn plural(&self) -> &'static str {
        match self {
            ObjectType::Account => "ACCOUNTS",
            ObjectType::Database => "DATABASES",
            ObjectType::Schema => "SCHEMAS",
            ObjectType::Table => "TABLES",
            ObjectType::View => "VIEWS",
            ObjectType::Function => "FUNCTIONS",
            ObjectType::Procedure => "PROCEDURES",
            ObjectType::Warehouse => "WAREHOUSES",
            ObjectType::Role => "ROLES",
            ObjectType::User => "USERS",
            ObjectType::FileFormat => "FILE FORMATS",
            ObjectType::NetworkRule => "NETWORK RULES",
            ObjectType::PasswordPolicy => "PASSWORD POLICIES",
            ObjectType::SessionPolicy => "SESSION POLICIES",
        }
    }

    const ALL: [ObjectType; 14] = [
        ObjectType::Account,
        ObjectType::Database,
        ObjectType::Schema,
        ObjectType::Table,
        ObjectType::View,
        ObjectType::Function,
        ObjectType::Procedure,
        ObjectType::Warehouse,
        ObjectType::Role,
        ObjectType::User,
        ObjectType::FileFormat,
        ObjectType::NetworkRule,
        ObjectType::PasswordPolicy,
        ObjectType::SessionPolicy,
    ];
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for ObjectType {
    type Err = String;

    /// Accepts the keyword with spaces or underscores, any case (`file_format`, `FILE FORMAT`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase().replace('_', " ");
        ObjectType::ALL
            .into_iter()
            .find(|t| t.keyword() == wanted)
            .ok_or_else(|| format!("unknown object type: {}", s))
    }
}

/// `LIKE '<pattern>'`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Like {
    pub pattern: String,
}

impl Like {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self { pattern: pattern.into() }
    }
}

impl ToSql for Like {
    fn statement(&self) -> Statement {
        Statement::new().parameter_with("LIKE", Some(self.pattern.as_str()), ParameterStyle::quoted_no_equals())
    }
}

/// `IN ACCOUNT | IN DATABASE <db> | IN SCHEMA <db>.<schema>`
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum In {
    Account,
    Database(AccountObjectIdentifier),
    Schema(DatabaseObjectIdentifier),
}

impl ToSql for In {
    fn statement(&self) -> Statement {
        let statement = Statement::new().sql("IN");
        match self {
            In::Account => statement.sql("ACCOUNT"),
            In::Database(id) => statement.sql("DATABASE").identifier(id),
            In::Schema(id) => statement.sql("SCHEMA").identifier(id),
        }
    }
}

impl Validate for In {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errs = ValidationErrors::new();
        match self {
            In::Account => {}
            In::Database(id) => check_identifier(&mut errs, id),
            In::Schema(id) => check_identifier(&mut errs, id),
        }
        errs.into_result()
    }
}

/// `LIMIT <rows> [FROM '<name>']`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LimitFrom {
    pub rows: u32,
    pub from: Option<String>,
}

impl LimitFrom {
    pub fn new(rows: u32) -> Self {
        Self { rows, from: None }
    }

    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }
}

impl ToSql for LimitFrom {
    fn statement(&self) -> Statement {
        Statement::new()
            .parameter_with("LIMIT", Some(self.rows), ParameterStyle::no_equals())
            .parameter_with("FROM", self.from.as_deref(), ParameterStyle::quoted_no_equals())
    }
}

/// Binds a generic option struct to the object type it operates on.
pub struct ObjectOperation<'a, O> {
    pub object_type: ObjectType,
    pub options: &'a O,
}

impl<'a, O> ObjectOperation<'a, O> {
    pub fn new(object_type: ObjectType, options: &'a O) -> Self {
        Self { object_type, options }
    }
}

/// `DROP <type> [IF EXISTS] <name>`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DropOptions<I> {
    name: I,
    pub if_exists: Option<bool>,
}

impl<I: ObjectIdentifier> DropOptions<I> {
    pub fn new(name: I) -> Self {
        Self { name, if_exists: None }
    }

    pub fn with_if_exists(mut self, if_exists: bool) -> Self {
        self.if_exists = Some(if_exists);
        self
    }

    pub fn name(&self) -> &I {
        &self.name
    }
}

impl<I: ObjectIdentifier> ToSql for ObjectOperation<'_, DropOptions<I>> {
    fn statement(&self) -> Statement {
        Statement::new()
            .sql("DROP")
            .sql(self.object_type.keyword())
            .keyword("IF EXISTS", self.options.if_exists)
            .identifier(&self.options.name)
    }
}

impl<I: ObjectIdentifier> Validate for ObjectOperation<'_, DropOptions<I>> {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errs = ValidationErrors::new();
        check_identifier(&mut errs, &self.options.name);
        errs.into_result()
    }
}

/// `SHOW [TERSE] <types> [LIKE ..] [IN ..] [STARTS WITH ..] [LIMIT ..]`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShowOptions {
    pub terse: Option<bool>,
    pub like: Option<Like>,
    pub in_: Option<In>,
    pub starts_with: Option<String>,
    pub limit: Option<LimitFrom>,
}

impl ShowOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_terse(mut self, terse: bool) -> Self {
        self.terse = Some(terse);
        self
    }

    pub fn with_like(mut self, pattern: impl Into<String>) -> Self {
        self.like = Some(Like::new(pattern));
        self
    }

    pub fn with_in(mut self, in_: In) -> Self {
        self.in_ = Some(in_);
        self
    }

    pub fn with_starts_with(mut self, prefix: impl Into<String>) -> Self {
        self.starts_with = Some(prefix.into());
        self
    }

    pub fn with_limit(mut self, limit: LimitFrom) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl ToSql for ObjectOperation<'_, ShowOptions> {
    fn statement(&self) -> Statement {
        let o = self.options;
        Statement::new()
            .sql("SHOW")
            .keyword("TERSE", o.terse)
            .sql(self.object_type.plural())
            .nested(None, o.like.as_ref())
            .nested(None, o.in_.as_ref())
            .parameter_with("STARTS WITH", o.starts_with.as_deref(), ParameterStyle::quoted_no_equals())
            .nested(None, o.limit.as_ref())
    }
}

impl Validate for ObjectOperation<'_, ShowOptions> {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errs = ValidationErrors::new();
        if let Some(like) = &self.options.like {
            if like.pattern.is_empty() {
                errs.push(ValidationError::InvalidValue {
                    structure: "ShowOptions",
                    field: "Like",
                    reason: "pattern must not be empty".into(),
                });
            }
        }
        if let Some(in_) = &self.options.in_ {
            errs.extend_from(in_.validate());
        }
        errs.into_result()
    }
}

/// `DESCRIBE <type> <name>`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DescribeOptions<I> {
    name: I,
}

impl<I: ObjectIdentifier> DescribeOptions<I> {
    pub fn new(name: I) -> Self {
        Self { name }
    }
}

impl<I: ObjectIdentifier> ToSql for ObjectOperation<'_, DescribeOptions<I>> {
    fn statement(&self) -> Statement {
        Statement::new()
            .sql("DESCRIBE")
            .sql(self.object_type.keyword())
            .identifier(&self.options.name)
    }
}

impl<I: ObjectIdentifier> Validate for ObjectOperation<'_, DescribeOptions<I>> {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errs = ValidationErrors::new();
        check_identifier(&mut errs, &self.options.name);
        errs.into_result()
    }
}

/// One row of a property-style DESCRIBE output.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PropertyRow {
    pub property: String,
    pub value: Option<String>,
    pub default: Option<String>,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StringProperty {
    pub value: String,
    pub default_value: String,
    pub description: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IntProperty {
    pub value: Option<i64>,
    pub default_value: Option<i64>,
    pub description: String,
}

impl PropertyRow {
    pub fn to_string_property(&self) -> StringProperty {
        StringProperty {
            value: self.value.clone().unwrap_or_default(),
            default_value: self.default.clone().unwrap_or_default(),
            description: self.description.clone().unwrap_or_default(),
        }
    }

    /// Values that do not parse as integers (e.g. `null`) are left unset.
    pub fn to_int_property(&self) -> IntProperty {
        let parse = |v: &Option<String>| v.as_deref().and_then(|s| s.trim().parse::<i64>().ok());
        IntProperty {
            value: parse(&self.value),
            default_value: parse(&self.default),
            description: self.description.clone().unwrap_or_default(),
        }
    }
}

/// Reads a boolean cell sent either as a JSON boolean or as `"true"` / `"false"` text.
pub(crate) fn flexible_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Bool(b) => b,
        serde_json::Value::String(s) => s.eq_ignore_ascii_case("true"),
        _ => false,
    })
}
