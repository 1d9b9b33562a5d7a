//! Managed resources.

mod network_rule;
mod password_policy;

pub use network_rule::NetworkRuleResource;
pub use password_policy::PasswordPolicyResource;

use crate::error::ProviderError;
use crate::provider::data::ResourceData;
use crate::provider::schema::{Attribute, AttributeType, Schema};
use crate::sdk::{ObjectIdentifier, SchemaObjectIdentifier};

/// `database`, `schema`, `name` and the computed `fully_qualified_name`.
pub(crate) fn schema_object_attributes(kind: &'static str) -> Schema {
    Schema::new()
        .attribute(
            "database",
            Attribute::required(AttributeType::String)
                .force_new()
                .description("The database in which to create the object."),
        )
        .attribute(
            "schema",
            Attribute::required(AttributeType::String)
                .force_new()
                .description("The schema in which to create the object."),
        )
        .attribute(
            "name",
            Attribute::required(AttributeType::String).description(kind),
        )
        .attribute(
            "fully_qualified_name",
            Attribute::computed(AttributeType::String).description("Fully qualified name of the object."),
        )
}

/// Identifier assembled from the configured `database`, `schema` and `name`.
pub(crate) fn configured_id(data: &ResourceData) -> Result<SchemaObjectIdentifier, ProviderError> {
    Ok(SchemaObjectIdentifier::new(
        data.require_string("database")?,
        data.require_string("schema")?,
        data.require_string("name")?,
    ))
}

/// Identifier stored as the resource id.
pub(crate) fn stored_id(data: &ResourceData) -> Result<SchemaObjectIdentifier, ProviderError> {
    SchemaObjectIdentifier::parse(data.id()).map_err(|e| ProviderError::Attribute {
        key: "id".into(),
        reason: e.to_string(),
    })
}

pub(crate) fn set_identity(data: &mut ResourceData, id: &SchemaObjectIdentifier) {
    data.set("database", id.database_name());
    data.set("schema", id.schema_name());
    data.set("name", id.name());
    data.set("fully_qualified_name", id.fully_qualified_name());
}
