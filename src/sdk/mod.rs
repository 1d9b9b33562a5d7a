//! SQL command SDK: identifiers, the statement builder, validation, the
//! client and the per-object operations.

pub mod client;
pub mod common;
pub mod ddl;
pub mod executor;
pub mod file_formats;
pub mod grants;
pub mod identifier;
pub mod network_rules;
pub mod password_policies;
pub mod session_policies;
pub mod sql_api;
pub mod users;
pub mod validation;

pub use client::{decode_rows, Client};
pub use common::{
    DescribeOptions, DropOptions, In, IntProperty, Like, LimitFrom, ObjectOperation, ObjectType, PropertyRow,
    ShowOptions, StringProperty,
};
pub use ddl::{ListStyle, ParameterStyle, Quotes, SerializationError, SqlValue, Statement, ToSql};
pub use executor::{Executor, PgExecutor, Row};
pub use sql_api::{SqlApiCredentials, SqlApiExecutor};
pub use identifier::{
    AccountObjectIdentifier, AnyObjectIdentifier, DataType, DatabaseObjectIdentifier, IdentifierParseError,
    ObjectIdentifier, SchemaObjectIdentifier, SchemaObjectIdentifierWithArguments,
};
pub use validation::{Validate, ValidationError, ValidationErrors};
