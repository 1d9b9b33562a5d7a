//! Users, their DESCRIBE properties and their parameters.

use crate::collections::find_first;
use crate::error::SdkError;
use crate::sdk::client::{not_exist_as_not_found, Client};
use crate::sdk::common::{flexible_bool, DescribeOptions, DropOptions, ObjectOperation, ObjectType, PropertyRow, ShowOptions};
use crate::sdk::ddl::{ParameterStyle, Statement, ToSql};
use crate::sdk::identifier::{AccountObjectIdentifier, ObjectIdentifier};
use crate::sdk::validation::{check_identifier, err_exactly_one_of, Validate, ValidationErrors};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateUserOptions {
    name: AccountObjectIdentifier,
    pub or_replace: Option<bool>,
    pub if_not_exists: Option<bool>,
    pub login_name: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub disabled: Option<bool>,
    pub comment: Option<String>,
}

impl CreateUserOptions {
    pub fn new(name: AccountObjectIdentifier) -> Self {
        Self {
            name,
            or_replace: None,
            if_not_exists: None,
            login_name: None,
            display_name: None,
            email: None,
            disabled: None,
            comment: None,
        }
    }

    pub fn with_or_replace(mut self, v: bool) -> Self {
        self.or_replace = Some(v);
        self
    }

    pub fn with_if_not_exists(mut self, v: bool) -> Self {
        self.if_not_exists = Some(v);
        self
    }

    pub fn with_login_name(mut self, v: impl Into<String>) -> Self {
        self.login_name = Some(v.into());
        self
    }

    pub fn with_display_name(mut self, v: impl Into<String>) -> Self {
        self.display_name = Some(v.into());
        self
    }

    pub fn with_email(mut self, v: impl Into<String>) -> Self {
        self.email = Some(v.into());
        self
    }

    pub fn with_disabled(mut self, v: bool) -> Self {
        self.disabled = Some(v);
        self
    }

    pub fn with_comment(mut self, v: impl Into<String>) -> Self {
        self.comment = Some(v.into());
        self
    }
}

impl ToSql for CreateUserOptions {
    fn statement(&self) -> Statement {
        Statement::new()
            .sql("CREATE")
            .keyword("OR REPLACE", self.or_replace)
            .sql("USER")
            .keyword("IF NOT EXISTS", self.if_not_exists)
            .identifier(&self.name)
            .quoted_parameter("LOGIN_NAME", self.login_name.as_deref())
            .quoted_parameter("DISPLAY_NAME", self.display_name.as_deref())
            .quoted_parameter("EMAIL", self.email.as_deref())
            .parameter("DISABLED", self.disabled)
            .quoted_parameter("COMMENT", self.comment.as_deref())
    }
}

impl Validate for CreateUserOptions {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errs = ValidationErrors::new();
        check_identifier(&mut errs, &self.name);
        if self.or_replace == Some(true) && self.if_not_exists == Some(true) {
            errs.push(err_exactly_one_of("CreateUserOptions", &["OrReplace", "IfNotExists"]));
        }
        errs.into_result()
    }
}

/// `SHOW PARAMETERS IN USER <name>`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShowUserParametersOptions {
    user: AccountObjectIdentifier,
    pub like: Option<String>,
}

impl ShowUserParametersOptions {
    pub fn new(user: AccountObjectIdentifier) -> Self {
        Self { user, like: None }
    }

    pub fn with_like(mut self, pattern: impl Into<String>) -> Self {
        self.like = Some(pattern.into());
        self
    }
}

impl ToSql for ShowUserParametersOptions {
    fn statement(&self) -> Statement {
        Statement::new()
            .sql("SHOW PARAMETERS")
            .parameter_with("LIKE", self.like.as_deref(), ParameterStyle::quoted_no_equals())
            .sql("IN USER")
            .identifier(&self.user)
    }
}

impl Validate for ShowUserParametersOptions {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errs = ValidationErrors::new();
        check_identifier(&mut errs, &self.user);
        errs.into_result()
    }
}

/// One row of `SHOW USERS`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct User {
    pub name: String,
    pub created_on: Option<DateTime<Utc>>,
    pub login_name: String,
    pub display_name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub comment: String,
    #[serde(deserialize_with = "flexible_bool")]
    pub disabled: bool,
    #[serde(deserialize_with = "flexible_bool")]
    pub must_change_password: bool,
    pub default_warehouse: String,
    pub default_namespace: String,
    pub default_role: String,
    pub owner: String,
    #[serde(deserialize_with = "flexible_bool")]
    pub has_password: bool,
    #[serde(rename = "type")]
    pub user_type: String,
}

impl User {
    pub fn id(&self) -> AccountObjectIdentifier {
        AccountObjectIdentifier::new(&self.name)
    }
}

/// `DESCRIBE USER` output: one property per row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserDetails {
    pub properties: Vec<PropertyRow>,
}

impl UserDetails {
    pub fn get(&self, property: &str) -> Option<&PropertyRow> {
        self.properties.iter().find(|p| p.property == property)
    }
}

/// One row of `SHOW PARAMETERS`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Parameter {
    pub key: String,
    pub value: String,
    pub default: String,
    pub level: String,
    pub description: String,
    #[serde(rename = "type")]
    pub parameter_type: String,
}

pub struct Users<'a> {
    client: &'a Client,
}

impl<'a> Users<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn create(&self, opts: &CreateUserOptions) -> Result<(), SdkError> {
        self.client.run(opts).await
    }

    pub async fn drop(&self, opts: &DropOptions<AccountObjectIdentifier>) -> Result<(), SdkError> {
        self.client.run(&ObjectOperation::new(ObjectType::User, opts)).await
    }

    pub async fn drop_safely(&self, id: &AccountObjectIdentifier) -> Result<(), SdkError> {
        self.client.drop_safely(ObjectType::User, id).await
    }

    pub async fn show(&self, opts: &ShowOptions) -> Result<Vec<User>, SdkError> {
        self.client.fetch(&ObjectOperation::new(ObjectType::User, opts)).await
    }

    pub async fn show_by_id(&self, id: &AccountObjectIdentifier) -> Result<User, SdkError> {
        let users = self.show(&ShowOptions::new().with_like(id.name())).await?;
        find_first(users, |u| u.id() == *id)
    }

    pub async fn show_by_id_safely(&self, id: &AccountObjectIdentifier) -> Result<User, SdkError> {
        not_exist_as_not_found(self.show_by_id(id).await)
    }

    pub async fn describe(&self, id: &AccountObjectIdentifier) -> Result<UserDetails, SdkError> {
        let opts = DescribeOptions::new(id.clone());
        let properties = self
            .client
            .fetch(&ObjectOperation::new(ObjectType::User, &opts))
            .await?;
        Ok(UserDetails { properties })
    }

    pub async fn show_parameters(&self, opts: &ShowUserParametersOptions) -> Result<Vec<Parameter>, SdkError> {
        self.client.fetch(opts).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::client::decode_rows;
    use crate::sdk::common::LimitFrom;
    use serde_json::json;

    #[test]
    fn create_quotes_text_parameters() {
        let opts = CreateUserOptions::new(AccountObjectIdentifier::new("u"))
            .with_if_not_exists(true)
            .with_login_name("login")
            .with_disabled(false)
            .with_comment("o'brien");
        assert_eq!(
            opts.to_sql().unwrap(),
            r#"CREATE USER IF NOT EXISTS "u" LOGIN_NAME = 'login' DISABLED = FALSE COMMENT = 'o''brien'"#
        );
    }

    #[test]
    fn show_with_starts_with_and_limit_from() {
        let opts = ShowOptions::new()
            .with_like("u%")
            .with_starts_with("u")
            .with_limit(LimitFrom::new(10).with_from("u1"));
        assert_eq!(
            ObjectOperation::new(ObjectType::User, &opts).to_sql().unwrap(),
            "SHOW USERS LIKE 'u%' STARTS WITH 'u' LIMIT 10 FROM 'u1'"
        );
    }

    #[test]
    fn show_parameters() {
        let opts = ShowUserParametersOptions::new(AccountObjectIdentifier::new("u"));
        assert_eq!(opts.to_sql().unwrap(), r#"SHOW PARAMETERS IN USER "u""#);
    }

    #[test]
    fn user_rows_accept_textual_booleans() {
        let serde_json::Value::Object(row) = json!({"name": "U", "disabled": "true", "has_password": false}) else {
            unreachable!()
        };
        let users: Vec<User> = decode_rows(vec![row]).unwrap();
        assert!(users[0].disabled);
        assert!(!users[0].has_password);
    }
}
