use crate::error::{ProviderError, SdkError};
use crate::provider::context::ProviderContext;
use crate::provider::data::ResourceData;
use crate::provider::diagnostics::Diagnostics;
use crate::provider::schema::{Attribute, AttributeType, Schema};
use crate::provider::DataSource;
use crate::sdk::grants::{ShowGrantsOf, ShowGrantsOn, ShowGrantsOptions, ShowGrantsTo};
use crate::sdk::{AccountObjectIdentifier, AnyObjectIdentifier, ObjectType};
use async_trait::async_trait;
use serde_json::{Map, Value};

/// `snowflake_grants`: SHOW GRANTS in exactly one of its ON / TO / OF forms.
pub struct GrantsDataSource;

fn invalid(key: &str, reason: impl Into<String>) -> ProviderError {
    ProviderError::Attribute {
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn block_str<'a>(block: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    block.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn account_object(key: &str, name: &str) -> Result<AccountObjectIdentifier, ProviderError> {
    AccountObjectIdentifier::parse(name).map_err(|e| invalid(key, e.to_string()))
}

fn grants_on(block: &Map<String, Value>) -> Result<ShowGrantsOn, ProviderError> {
    if block.get("account").and_then(Value::as_bool) == Some(true) {
        return Ok(ShowGrantsOn::Account);
    }
    match (block_str(block, "object_type"), block_str(block, "object_name")) {
        (Some(object_type), Some(object_name)) => {
            let object_type: ObjectType = object_type
                .parse()
                .map_err(|e: String| invalid("grants_on.object_type", e))?;
            let name = AnyObjectIdentifier::parse(object_name)
                .map_err(|e| invalid("grants_on.object_name", e.to_string()))?;
            Ok(ShowGrantsOn::Object { object_type, name })
        }
        _ => Err(invalid(
            "grants_on",
            "requires either account = true or both object_type and object_name",
        )),
    }
}

fn grants_to(block: &Map<String, Value>) -> Result<ShowGrantsTo, ProviderError> {
    match (block_str(block, "role"), block_str(block, "user")) {
        (Some(role), None) => Ok(ShowGrantsTo::Role(account_object("grants_to.role", role)?)),
        (None, Some(user)) => Ok(ShowGrantsTo::User(account_object("grants_to.user", user)?)),
        _ => Err(invalid("grants_to", "requires exactly one of role or user")),
    }
}

fn grants_of(block: &Map<String, Value>) -> Result<ShowGrantsOf, ProviderError> {
    match block_str(block, "role") {
        Some(role) => Ok(ShowGrantsOf::Role(account_object("grants_of.role", role)?)),
        None => Err(invalid("grants_of", "requires role")),
    }
}

pub(crate) fn show_options(data: &ResourceData) -> Result<ShowGrantsOptions, ProviderError> {
    Ok(ShowGrantsOptions {
        on: data.get_block("grants_on").map(grants_on).transpose()?,
        to: data.get_block("grants_to").map(grants_to).transpose()?,
        of: data.get_block("grants_of").map(grants_of).transpose()?,
    })
}

async fn read_grants(ctx: &ProviderContext, data: &mut ResourceData) -> Result<(), ProviderError> {
    let opts = show_options(data)?;
    let grants = ctx.client.grants().show(&opts).await?;
    let items = grants
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<Value>, _>>()
        .map_err(SdkError::from)?;
    data.set("grants", items);
    data.set_id("grants_read");
    Ok(())
}

#[async_trait]
impl DataSource for GrantsDataSource {
    fn type_name(&self) -> &'static str {
        "snowflake_grants"
    }

    fn schema(&self) -> Schema {
        let on = Schema::new()
            .attribute(
                "account",
                Attribute::optional(AttributeType::Bool).description("Object hierarchy to list privileges on."),
            )
            .attribute(
                "object_name",
                Attribute::optional(AttributeType::String).description("Name of object to list privileges on."),
            )
            .attribute(
                "object_type",
                Attribute::optional(AttributeType::String).description("Type of object to list privileges on."),
            );
        let to = Schema::new()
            .attribute(
                "role",
                Attribute::optional(AttributeType::String).description("Lists all privileges and roles granted to the role."),
            )
            .attribute(
                "user",
                Attribute::optional(AttributeType::String).description("Lists all the roles granted to the user."),
            );
        let of = Schema::new().attribute(
            "role",
            Attribute::optional(AttributeType::String).description("Lists all users and roles to which the role has been granted."),
        );
        Schema::new()
            .attribute(
                "grants_on",
                Attribute::optional(AttributeType::Object(on))
                    .max_items(1)
                    .description("Lists all privileges that have been granted on an object or on an account."),
            )
            .attribute(
                "grants_to",
                Attribute::optional(AttributeType::Object(to))
                    .max_items(1)
                    .description("Lists all privileges granted to the object."),
            )
            .attribute(
                "grants_of",
                Attribute::optional(AttributeType::Object(of))
                    .max_items(1)
                    .description("Lists all objects to which the given object has been granted."),
            )
            .attribute(
                "grants",
                Attribute::computed(AttributeType::list_of(AttributeType::Map)).description("The list of grants"),
            )
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Diagnostics {
        match read_grants(ctx, data).await {
            Ok(()) => Diagnostics::new(),
            Err(e) => Diagnostics::from_err("error reading grants", e),
        }
    }
}
