use crate::config::PreviewFeature;
use crate::error::ProviderError;
use crate::provider::context::ProviderContext;
use crate::provider::data::ResourceData;
use crate::provider::diagnostics::Diagnostics;
use crate::provider::resources::{configured_id, schema_object_attributes, set_identity, stored_id};
use crate::provider::schema::{Attribute, AttributeType, Schema};
use crate::provider::Resource;
use crate::sdk::network_rules::{
    AlterNetworkRuleOptions, CreateNetworkRuleOptions, NetworkRuleMode, NetworkRuleSet, NetworkRuleType,
    NetworkRuleUnset,
};
use crate::sdk::{DropOptions, ObjectIdentifier};
use async_trait::async_trait;
use std::str::FromStr;

/// `snowflake_network_rule`.
pub struct NetworkRuleResource;

fn parse_enum<T: FromStr<Err = String>>(data: &ResourceData, key: &str) -> Result<T, ProviderError> {
    data.require_string(key)?
        .parse()
        .map_err(|reason| ProviderError::Attribute {
            key: key.to_string(),
            reason,
        })
}

async fn create_rule(ctx: &ProviderContext, data: &mut ResourceData) -> Result<(), ProviderError> {
    let id = configured_id(data)?;
    let rule_type: NetworkRuleType = parse_enum(data, "type")?;
    let mode: NetworkRuleMode = parse_enum(data, "mode")?;
    let mut opts = CreateNetworkRuleOptions::new(id.clone(), rule_type, data.get_string_list("value_list"), mode)
        .with_or_replace(true);
    if let Some(comment) = data.get_string("comment") {
        opts = opts.with_comment(comment);
    }
    ctx.client.network_rules().create(&opts).await?;
    data.set_id(id.fully_qualified_name());
    Ok(())
}

async fn update_rule(ctx: &ProviderContext, data: &mut ResourceData) -> Result<(), ProviderError> {
    let id = stored_id(data)?;
    let mut set = NetworkRuleSet::new();
    let mut unset = NetworkRuleUnset::new();
    if data.has_change("value_list") {
        let values = data.get_string_list("value_list");
        if values.is_empty() {
            unset = unset.with_value_list(true);
        } else {
            set = set.with_value_list(values);
        }
    }
    if data.has_change("comment") {
        match data.get_string("comment") {
            Some(comment) => set = set.with_comment(comment),
            None => unset = unset.with_comment(true),
        }
    }
    let rules = ctx.client.network_rules();
    if set.value_list.is_some() || set.comment.is_some() {
        rules
            .alter(&AlterNetworkRuleOptions::new(id.clone()).with_set(set))
            .await?;
    }
    if unset.value_list.is_some() || unset.comment.is_some() {
        rules.alter(&AlterNetworkRuleOptions::new(id).with_unset(unset)).await?;
    }
    Ok(())
}

#[async_trait]
impl Resource for NetworkRuleResource {
    fn type_name(&self) -> &'static str {
        "snowflake_network_rule"
    }

    fn schema(&self) -> Schema {
        schema_object_attributes("Specifies the identifier for the network rule.")
            .attribute(
                "name",
                Attribute::required(AttributeType::String)
                    .force_new()
                    .description("Specifies the identifier for the network rule."),
            )
            .attribute(
                "type",
                Attribute::required(AttributeType::String)
                    .force_new()
                    .description("One of IPV4, AWSVPCEID, AZURELINKID, HOST_PORT."),
            )
            .attribute(
                "value_list",
                Attribute::required(AttributeType::list_of(AttributeType::String))
                    .description("Network identifiers that will be allowed or blocked."),
            )
            .attribute(
                "mode",
                Attribute::required(AttributeType::String)
                    .force_new()
                    .description("One of INGRESS, INTERNAL_STAGE, EGRESS."),
            )
            .attribute(
                "comment",
                Attribute::optional(AttributeType::String).description("Specifies a comment for the network rule."),
            )
    }

    fn preview_feature(&self) -> Option<PreviewFeature> {
        Some(PreviewFeature::NetworkRuleResource)
    }

    async fn create(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Diagnostics {
        if let Err(e) = create_rule(ctx, data).await {
            return Diagnostics::from_err("error creating network rule", e);
        }
        self.read(ctx, data).await
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Diagnostics {
        let id = match stored_id(data) {
            Ok(id) => id,
            Err(e) => return e.into(),
        };
        let rules = ctx.client.network_rules();
        let rule = match rules.show_by_id_safely(&id).await {
            Ok(rule) => rule,
            Err(e) if e.is_not_found() => {
                tracing::warn!(id = %id, "network rule not found, removing from state");
                data.clear_id();
                let mut diags = Diagnostics::new();
                diags.add_warning(
                    "Failed to query network rule. Marking the resource as removed.",
                    format!("Network rule id: {}, Err: {}", id.fully_qualified_name(), e),
                );
                return diags;
            }
            Err(e) => return Diagnostics::from_err("error reading network rule", e),
        };
        let details = match rules.describe(&id).await {
            Ok(details) => details,
            Err(e) => return Diagnostics::from_err("error describing network rule", e),
        };
        set_identity(data, &rule.id());
        data.set("type", rule.rule_type);
        data.set("mode", rule.mode);
        data.set_optional_string("comment", rule.comment);
        data.set("value_list", details.value_list);
        Diagnostics::new()
    }

    async fn update(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Diagnostics {
        if let Err(e) = update_rule(ctx, data).await {
            return Diagnostics::from_err("error updating network rule", e);
        }
        self.read(ctx, data).await
    }

    async fn delete(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Diagnostics {
        let id = match stored_id(data) {
            Ok(id) => id,
            Err(e) => return e.into(),
        };
        let opts = DropOptions::new(id).with_if_exists(true);
        if let Err(e) = ctx.client.network_rules().drop(&opts).await {
            return Diagnostics::from_err("error deleting network rule", e);
        }
        data.clear_id();
        Diagnostics::new()
    }
}
