use crate::config::PreviewFeature;
use crate::error::ProviderError;
use crate::provider::context::ProviderContext;
use crate::provider::data::ResourceData;
use crate::provider::diagnostics::Diagnostics;
use crate::provider::resources::{configured_id, schema_object_attributes, set_identity, stored_id};
use crate::provider::schema::{Attribute, AttributeType, Schema};
use crate::provider::Resource;
use crate::sdk::password_policies::{
    AlterPasswordPolicyOptions, CreatePasswordPolicyOptions, PasswordParameter, PasswordPolicySet,
    PasswordPolicyUnset,
};
use crate::sdk::{DropOptions, ObjectIdentifier};
use async_trait::async_trait;

/// `snowflake_password_policy`.
pub struct PasswordPolicyResource;

fn attribute_name(parameter: PasswordParameter) -> &'static str {
    match parameter {
        PasswordParameter::MinLength => "min_length",
        PasswordParameter::MaxLength => "max_length",
        PasswordParameter::MinUpperCaseChars => "min_upper_case_chars",
        PasswordParameter::MinLowerCaseChars => "min_lower_case_chars",
        PasswordParameter::MinNumericChars => "min_numeric_chars",
        PasswordParameter::MinSpecialChars => "min_special_chars",
        PasswordParameter::MinAgeDays => "min_age_days",
        PasswordParameter::MaxAgeDays => "max_age_days",
        PasswordParameter::MaxRetries => "max_retries",
        PasswordParameter::LockoutTimeMins => "lockout_time_mins",
        PasswordParameter::History => "history",
    }
}

fn parameter_value(data: &ResourceData, parameter: PasswordParameter) -> Result<Option<i32>, ProviderError> {
    let key = attribute_name(parameter);
    data.get_i64(key)
        .map(|v| {
            i32::try_from(v).map_err(|_| ProviderError::Attribute {
                key: key.to_string(),
                reason: "is out of range".into(),
            })
        })
        .transpose()
}

async fn create_policy(ctx: &ProviderContext, data: &mut ResourceData) -> Result<(), ProviderError> {
    let id = configured_id(data)?;
    let mut opts = CreatePasswordPolicyOptions::new(id.clone());
    if data.get_bool("or_replace") == Some(true) {
        opts = opts.with_or_replace(true);
    }
    if data.get_bool("if_not_exists") == Some(true) {
        opts = opts.with_if_not_exists(true);
    }
    for parameter in PasswordParameter::ALL {
        if let Some(v) = parameter_value(data, parameter)? {
            opts = opts.with_parameter(parameter, v);
        }
    }
    if let Some(comment) = data.get_string("comment") {
        opts = opts.with_comment(comment);
    }
    ctx.client.password_policies().create(&opts).await?;
    data.set_id(id.fully_qualified_name());
    Ok(())
}

async fn update_policy(ctx: &ProviderContext, data: &mut ResourceData) -> Result<(), ProviderError> {
    let mut id = stored_id(data)?;
    let policies = ctx.client.password_policies();

    if data.has_change("name") {
        let new_id = configured_id(data)?;
        policies
            .alter(&AlterPasswordPolicyOptions::new(id.clone()).with_new_name(new_id.clone()))
            .await?;
        data.set_id(new_id.fully_qualified_name());
        id = new_id;
    }

    let mut set = PasswordPolicySet::new();
    let mut unset = PasswordPolicyUnset::new();
    for parameter in PasswordParameter::ALL {
        if !data.has_change(attribute_name(parameter)) {
            continue;
        }
        match parameter_value(data, parameter)? {
            Some(v) => set = set.with_parameter(parameter, v),
            None => unset = unset.with_parameter(parameter),
        }
    }
    if data.has_change("comment") {
        match data.get_string("comment") {
            Some(comment) => set = set.with_comment(comment),
            None => unset = unset.with_comment(true),
        }
    }
    if !set.parameters.is_empty() || set.comment.is_some() {
        policies
            .alter(&AlterPasswordPolicyOptions::new(id.clone()).with_set(set))
            .await?;
    }
    if !unset.parameters.is_empty() || unset.comment.is_some() {
        policies
            .alter(&AlterPasswordPolicyOptions::new(id).with_unset(unset))
            .await?;
    }
    Ok(())
}

#[async_trait]
impl Resource for PasswordPolicyResource {
    fn type_name(&self) -> &'static str {
        "snowflake_password_policy"
    }

    fn schema(&self) -> Schema {
        let mut schema = schema_object_attributes("Identifier for the password policy; must be unique for your account.")
            .attribute(
                "or_replace",
                Attribute::optional(AttributeType::Bool)
                    .default_value(false)
                    .description("Whether to override a previous password policy with the same name."),
            )
            .attribute(
                "if_not_exists",
                Attribute::optional(AttributeType::Bool)
                    .default_value(false)
                    .description("Prevent overwriting a previous password policy with the same name."),
            )
            .attribute(
                "comment",
                Attribute::optional(AttributeType::String).description("Adds a comment or overwrites an existing comment for the password policy."),
            );
        for parameter in PasswordParameter::ALL {
            schema = schema.attribute(
                attribute_name(parameter),
                Attribute::optional(AttributeType::Int).description(parameter.sql_name()),
            );
        }
        schema
    }

    fn preview_feature(&self) -> Option<PreviewFeature> {
        Some(PreviewFeature::PasswordPolicyResource)
    }

    async fn create(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Diagnostics {
        if let Err(e) = create_policy(ctx, data).await {
            return Diagnostics::from_err("error creating password policy", e);
        }
        self.read(ctx, data).await
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Diagnostics {
        let id = match stored_id(data) {
            Ok(id) => id,
            Err(e) => return e.into(),
        };
        let policies = ctx.client.password_policies();
        let policy = match policies.show_by_id_safely(&id).await {
            Ok(policy) => policy,
            Err(e) if e.is_not_found() => {
                tracing::warn!(id = %id, "password policy not found, removing from state");
                data.clear_id();
                let mut diags = Diagnostics::new();
                diags.add_warning(
                    "Failed to query password policy. Marking the resource as removed.",
                    format!("Password policy id: {}, Err: {}", id.fully_qualified_name(), e),
                );
                return diags;
            }
            Err(e) => return Diagnostics::from_err("error reading password policy", e),
        };
        set_identity(data, &policy.id());
        data.set_optional_string("comment", policy.comment);

        let details = match policies.describe(&id).await {
            Ok(details) => details,
            Err(e) => return Diagnostics::from_err("error describing password policy", e),
        };
        for parameter in PasswordParameter::ALL {
            if let Some(v) = details.parameter(parameter).and_then(|p| p.value) {
                data.set(attribute_name(parameter), v);
            }
        }
        Diagnostics::new()
    }

    async fn update(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Diagnostics {
        if let Err(e) = update_policy(ctx, data).await {
            return Diagnostics::from_err("error updating password policy", e);
        }
        self.read(ctx, data).await
    }

    async fn delete(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Diagnostics {
        let id = match stored_id(data) {
            Ok(id) => id,
            Err(e) => return e.into(),
        };
        let opts = DropOptions::new(id).with_if_exists(true);
        if let Err(e) = ctx.client.password_policies().drop(&opts).await {
            return Diagnostics::from_err("error deleting password policy", e);
        }
        data.clear_id();
        Diagnostics::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_parameter_has_an_int_attribute() {
        let schema = PasswordPolicyResource.schema();
        for parameter in PasswordParameter::ALL {
            let attribute = schema.get(attribute_name(parameter));
            assert_eq!(attribute.map(|a| &a.attribute_type), Some(&AttributeType::Int));
        }
        assert!(schema.get("name").is_some_and(|a| !a.force_new));
        assert!(schema.get("database").is_some_and(|a| a.force_new));
    }
}
