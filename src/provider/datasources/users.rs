use crate::error::ProviderError;
use crate::provider::context::ProviderContext;
use crate::provider::data::ResourceData;
use crate::provider::diagnostics::Diagnostics;
use crate::provider::schema::{Attribute, AttributeType, Schema};
use crate::provider::DataSource;
use crate::sdk::users::{Parameter, ShowUserParametersOptions, User, UserDetails};
use crate::sdk::{LimitFrom, ShowOptions};
use async_trait::async_trait;
use serde_json::{json, Map, Value};

/// `snowflake_users`: SHOW USERS, optionally enriched with DESCRIBE and SHOW PARAMETERS output.
pub struct UsersDataSource;

fn show_options(data: &ResourceData) -> Result<ShowOptions, ProviderError> {
    let mut opts = ShowOptions::new();
    if let Some(like) = data.get_string("like") {
        opts = opts.with_like(like);
    }
    if let Some(prefix) = data.get_string("starts_with") {
        opts = opts.with_starts_with(prefix);
    }
    if let Some(limit) = data.get_block("limit") {
        let rows = limit
            .get("rows")
            .and_then(Value::as_i64)
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| ProviderError::Attribute {
                key: "limit.rows".into(),
                reason: "must be a non-negative integer".into(),
            })?;
        let mut limit_from = LimitFrom::new(rows);
        if let Some(from) = limit.get("from").and_then(Value::as_str).filter(|s| !s.is_empty()) {
            limit_from = limit_from.with_from(from);
        }
        opts = opts.with_limit(limit_from);
    }
    Ok(opts)
}

fn describe_output(details: &UserDetails) -> Value {
    let properties: Map<String, Value> = details
        .properties
        .iter()
        .map(|p| {
            (
                p.property.to_lowercase(),
                p.value.clone().map(Value::String).unwrap_or(Value::Null),
            )
        })
        .collect();
    json!([properties])
}

fn parameters_output(parameters: &[Parameter]) -> Value {
    let by_key: Map<String, Value> = parameters
        .iter()
        .map(|p| {
            (
                p.key.to_lowercase(),
                json!([{
                    "value": p.value,
                    "default": p.default,
                    "level": p.level,
                    "description": p.description,
                }]),
            )
        })
        .collect();
    json!([by_key])
}

async fn user_entry(
    ctx: &ProviderContext,
    user: &User,
    with_describe: bool,
    with_parameters: bool,
) -> Result<Value, ProviderError> {
    let users = ctx.client.users();
    let mut entry = Map::new();
    entry.insert(
        "show_output".into(),
        json!([serde_json::to_value(user).map_err(crate::error::SdkError::from)?]),
    );
    if with_describe {
        let details = users.describe(&user.id()).await?;
        entry.insert("describe_output".into(), describe_output(&details));
    }
    if with_parameters {
        let parameters = users
            .show_parameters(&ShowUserParametersOptions::new(user.id()))
            .await?;
        entry.insert("parameters".into(), parameters_output(&parameters));
    }
    Ok(Value::Object(entry))
}

async fn read_users(ctx: &ProviderContext, data: &mut ResourceData) -> Result<(), ProviderError> {
    let opts = show_options(data)?;
    let with_describe = data.get_bool("with_describe").unwrap_or(true);
    let with_parameters = data.get_bool("with_parameters").unwrap_or(true);
    let users = ctx.client.users().show(&opts).await?;
    let mut entries = Vec::with_capacity(users.len());
    for user in &users {
        entries.push(user_entry(ctx, user, with_describe, with_parameters).await?);
    }
    data.set("users", entries);
    data.set_id("users_read");
    Ok(())
}

#[async_trait]
impl DataSource for UsersDataSource {
    fn type_name(&self) -> &'static str {
        "snowflake_users"
    }

    fn schema(&self) -> Schema {
        let limit = Schema::new()
            .attribute(
                "rows",
                Attribute::required(AttributeType::Int).description("The maximum number of rows to return."),
            )
            .attribute(
                "from",
                Attribute::optional(AttributeType::String)
                    .description("Start listing after the object whose name matches this value."),
            );
        let user = Schema::new()
            .attribute(
                "show_output",
                Attribute::computed(AttributeType::list_of(AttributeType::Map)),
            )
            .attribute(
                "describe_output",
                Attribute::computed(AttributeType::list_of(AttributeType::Map)),
            )
            .attribute(
                "parameters",
                Attribute::computed(AttributeType::list_of(AttributeType::Map)),
            );
        Schema::new()
            .attribute(
                "like",
                Attribute::optional(AttributeType::String).description("Filters the output with a case-insensitive pattern."),
            )
            .attribute(
                "starts_with",
                Attribute::optional(AttributeType::String)
                    .description("Filters the output based on the string of characters that appear at the beginning of the object name."),
            )
            .attribute(
                "limit",
                Attribute::optional(AttributeType::Object(limit)).max_items(1),
            )
            .attribute(
                "with_describe",
                Attribute::optional(AttributeType::Bool)
                    .default_value(true)
                    .description("Runs DESC USER for each user returned by SHOW USERS."),
            )
            .attribute(
                "with_parameters",
                Attribute::optional(AttributeType::Bool)
                    .default_value(true)
                    .description("Runs SHOW PARAMETERS FOR USER for each user returned by SHOW USERS."),
            )
            .attribute(
                "users",
                Attribute::computed(AttributeType::list_of(AttributeType::Object(user)))
                    .description("Holds the aggregated output of all user details queries."),
            )
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Diagnostics {
        match read_users(ctx, data).await {
            Ok(()) => Diagnostics::new(),
            Err(e) => Diagnostics::from_err("error reading users", e),
        }
    }
}
