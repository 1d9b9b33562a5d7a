//! Demo: reads the `snowflake_users` and `snowflake_grants` data sources and prints their state.
//!
//! Run from repo root: `cargo run -p provider-demo -- [LIKE_PATTERN]`

use serde_json::{json, Value};
use snowflake_provider_sdk::{load_from_env, Provider, ProviderContext, ResourceData};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("snowflake_provider_sdk=info")),
        )
        .init();

    let config = load_from_env()?;
    let ctx = ProviderContext::connect(config).await?;
    let provider = Provider::new();

    let mut users = json!({"with_describe": false, "with_parameters": false});
    if let Some(pattern) = std::env::args().nth(1) {
        users["like"] = Value::String(pattern);
    }
    let grants = json!({"grants_on": {"account": true}});

    for (type_name, values) in [("snowflake_users", users), ("snowflake_grants", grants)] {
        let mut data = ResourceData::new(values.as_object().cloned().unwrap_or_default());
        let diags = provider.read_data_source(&ctx, type_name, &mut data).await;
        if diags.has_errors() {
            tracing::error!("{}: {}", type_name, diags);
            continue;
        }
        println!("{}", serde_json::to_string_pretty(&Value::Object(data.into_values()))?);
    }
    Ok(())
}
