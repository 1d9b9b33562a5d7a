//! Session policies.

use crate::collections::find_first;
use crate::error::SdkError;
use crate::sdk::client::{not_exist_as_not_found, Client};
use crate::sdk::common::{DescribeOptions, DropOptions, ObjectOperation, ObjectType, ShowOptions};
use crate::sdk::ddl::{Statement, ToSql};
use crate::sdk::identifier::SchemaObjectIdentifier;
use crate::sdk::validation::{
    any_value_set, check_identifier, err_at_least_one_of, err_exactly_one_of, exactly_one_value_set, Validate,
    ValidationErrors,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateSessionPolicyOptions {
    name: SchemaObjectIdentifier,
    pub or_replace: Option<bool>,
    pub if_not_exists: Option<bool>,
    pub session_idle_timeout_mins: Option<i32>,
    pub session_ui_idle_timeout_mins: Option<i32>,
    pub comment: Option<String>,
}

impl CreateSessionPolicyOptions {
    pub fn new(name: SchemaObjectIdentifier) -> Self {
        Self {
            name,
            or_replace: None,
            if_not_exists: None,
            session_idle_timeout_mins: None,
            session_ui_idle_timeout_mins: None,
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

    pub fn with_session_idle_timeout_mins(mut self, v: i32) -> Self {
        self.session_idle_timeout_mins = Some(v);
        self
    }

    pub fn with_session_ui_idle_timeout_mins(mut self, v: i32) -> Self {
        self.session_ui_idle_timeout_mins = Some(v);
        self
    }

    pub fn with_comment(mut self, v: impl Into<String>) -> Self {
        self.comment = Some(v.into());
        self
    }

    pub fn name(&self) -> &SchemaObjectIdentifier {
        &self.name
    }
}

impl ToSql for CreateSessionPolicyOptions {
    fn statement(&self) -> Statement {
        Statement::new()
            .sql("CREATE")
            .keyword("OR REPLACE", self.or_replace)
            .sql("SESSION POLICY")
            .keyword("IF NOT EXISTS", self.if_not_exists)
            .identifier(&self.name)
            .parameter("SESSION_IDLE_TIMEOUT_MINS", self.session_idle_timeout_mins)
            .parameter("SESSION_UI_IDLE_TIMEOUT_MINS", self.session_ui_idle_timeout_mins)
            .quoted_parameter("COMMENT", self.comment.as_deref())
    }
}

impl Validate for CreateSessionPolicyOptions {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errs = ValidationErrors::new();
        check_identifier(&mut errs, &self.name);
        if self.or_replace == Some(true) && self.if_not_exists == Some(true) {
            errs.push(err_exactly_one_of("CreateSessionPolicyOptions", &["OrReplace", "IfNotExists"]));
        }
        errs.into_result()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionPolicySet {
    pub session_idle_timeout_mins: Option<i32>,
    pub session_ui_idle_timeout_mins: Option<i32>,
    pub comment: Option<String>,
}

impl SessionPolicySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session_idle_timeout_mins(mut self, v: i32) -> Self {
        self.session_idle_timeout_mins = Some(v);
        self
    }

    pub fn with_session_ui_idle_timeout_mins(mut self, v: i32) -> Self {
        self.session_ui_idle_timeout_mins = Some(v);
        self
    }

    pub fn with_comment(mut self, v: impl Into<String>) -> Self {
        self.comment = Some(v.into());
        self
    }
}

impl ToSql for SessionPolicySet {
    fn statement(&self) -> Statement {
        Statement::new()
            .parameter("SESSION_IDLE_TIMEOUT_MINS", self.session_idle_timeout_mins)
            .parameter("SESSION_UI_IDLE_TIMEOUT_MINS", self.session_ui_idle_timeout_mins)
            .quoted_parameter("COMMENT", self.comment.as_deref())
    }
}

impl Validate for SessionPolicySet {
    fn validate(&self) -> Result<(), ValidationErrors> {
        if !any_value_set(&[
            self.session_idle_timeout_mins.is_some(),
            self.session_ui_idle_timeout_mins.is_some(),
            self.comment.is_some(),
        ]) {
            return Err(err_at_least_one_of(
                "SessionPolicySet",
                &["SessionIdleTimeoutMins", "SessionUiIdleTimeoutMins", "Comment"],
            )
            .into());
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionPolicyUnset {
    pub session_idle_timeout_mins: Option<bool>,
    pub session_ui_idle_timeout_mins: Option<bool>,
    pub comment: Option<bool>,
}

impl SessionPolicyUnset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session_idle_timeout_mins(mut self, v: bool) -> Self {
        self.session_idle_timeout_mins = Some(v);
        self
    }

    pub fn with_session_ui_idle_timeout_mins(mut self, v: bool) -> Self {
        self.session_ui_idle_timeout_mins = Some(v);
        self
    }

    pub fn with_comment(mut self, v: bool) -> Self {
        self.comment = Some(v);
        self
    }
}

impl ToSql for SessionPolicyUnset {
    fn statement(&self) -> Statement {
        Statement::comma_separated()
            .keyword("SESSION_IDLE_TIMEOUT_MINS", self.session_idle_timeout_mins)
            .keyword("SESSION_UI_IDLE_TIMEOUT_MINS", self.session_ui_idle_timeout_mins)
            .keyword("COMMENT", self.comment)
    }
}

impl Validate for SessionPolicyUnset {
    fn validate(&self) -> Result<(), ValidationErrors> {
        if !any_value_set(&[
            self.session_idle_timeout_mins == Some(true),
            self.session_ui_idle_timeout_mins == Some(true),
            self.comment == Some(true),
        ]) {
            return Err(err_at_least_one_of(
                "SessionPolicyUnset",
                &["SessionIdleTimeoutMins", "SessionUiIdleTimeoutMins", "Comment"],
            )
            .into());
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlterSessionPolicyOptions {
    name: SchemaObjectIdentifier,
    pub if_exists: Option<bool>,
    pub rename_to: Option<SchemaObjectIdentifier>,
    pub set: Option<SessionPolicySet>,
    pub unset: Option<SessionPolicyUnset>,
}

impl AlterSessionPolicyOptions {
    pub fn new(name: SchemaObjectIdentifier) -> Self {
        Self {
            name,
            if_exists: None,
            rename_to: None,
            set: None,
            unset: None,
        }
    }

    pub fn with_if_exists(mut self, v: bool) -> Self {
        self.if_exists = Some(v);
        self
    }

    pub fn with_rename_to(mut self, id: SchemaObjectIdentifier) -> Self {
        self.rename_to = Some(id);
        self
    }

    pub fn with_set(mut self, set: SessionPolicySet) -> Self {
        self.set = Some(set);
        self
    }

    pub fn with_unset(mut self, unset: SessionPolicyUnset) -> Self {
        self.unset = Some(unset);
        self
    }
}

impl ToSql for AlterSessionPolicyOptions {
    fn statement(&self) -> Statement {
        Statement::new()
            .sql("ALTER SESSION POLICY")
            .keyword("IF EXISTS", self.if_exists)
            .identifier(&self.name)
            .prefixed_identifier("RENAME TO", self.rename_to.as_ref())
            .nested(Some("SET"), self.set.as_ref())
            .nested(Some("UNSET"), self.unset.as_ref())
    }
}

impl Validate for AlterSessionPolicyOptions {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errs = ValidationErrors::new();
        check_identifier(&mut errs, &self.name);
        if let Some(rename_to) = &self.rename_to {
            check_identifier(&mut errs, rename_to);
        }
        if !exactly_one_value_set(&[self.rename_to.is_some(), self.set.is_some(), self.unset.is_some()]) {
            errs.push(err_exactly_one_of("AlterSessionPolicyOptions", &["RenameTo", "Set", "Unset"]));
        }
        if let Some(set) = &self.set {
            errs.extend_from(set.validate());
        }
        if let Some(unset) = &self.unset {
            errs.extend_from(unset.validate());
        }
        errs.into_result()
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SessionPolicy {
    pub created_on: Option<DateTime<Utc>>,
    pub name: String,
    pub database_name: String,
    pub schema_name: String,
    pub kind: String,
    pub owner: String,
    pub comment: String,
    pub options: String,
    pub owner_role_type: String,
}

impl SessionPolicy {
    pub fn id(&self) -> SchemaObjectIdentifier {
        SchemaObjectIdentifier::new(&self.database_name, &self.schema_name, &self.name)
    }
}

/// Single-row output of `DESCRIBE SESSION POLICY`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SessionPolicyDescription {
    pub created_on: Option<DateTime<Utc>>,
    pub name: String,
    pub session_idle_timeout_mins: i32,
    pub session_ui_idle_timeout_mins: i32,
    pub comment: String,
}

pub struct SessionPolicies<'a> {
    client: &'a Client,
}

impl<'a> SessionPolicies<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn create(&self, opts: &CreateSessionPolicyOptions) -> Result<(), SdkError> {
        self.client.run(opts).await
    }

    pub async fn alter(&self, opts: &AlterSessionPolicyOptions) -> Result<(), SdkError> {
        self.client.run(opts).await
    }

    pub async fn drop(&self, opts: &DropOptions<SchemaObjectIdentifier>) -> Result<(), SdkError> {
        self.client
            .run(&ObjectOperation::new(ObjectType::SessionPolicy, opts))
            .await
    }

    pub async fn drop_safely(&self, id: &SchemaObjectIdentifier) -> Result<(), SdkError> {
        self.client.drop_safely(ObjectType::SessionPolicy, id).await
    }

    pub async fn show(&self, opts: &ShowOptions) -> Result<Vec<SessionPolicy>, SdkError> {
        self.client
            .fetch(&ObjectOperation::new(ObjectType::SessionPolicy, opts))
            .await
    }

    pub async fn show_by_id(&self, id: &SchemaObjectIdentifier) -> Result<SessionPolicy, SdkError> {
        self.client
            .show_by_schema_id(ObjectType::SessionPolicy, id, SessionPolicy::id)
            .await
    }

    pub async fn show_by_id_safely(&self, id: &SchemaObjectIdentifier) -> Result<SessionPolicy, SdkError> {
        not_exist_as_not_found(self.show_by_id(id).await)
    }

    pub async fn describe(&self, id: &SchemaObjectIdentifier) -> Result<SessionPolicyDescription, SdkError> {
        let opts = DescribeOptions::new(id.clone());
        let rows: Vec<SessionPolicyDescription> = self
            .client
            .fetch(&ObjectOperation::new(ObjectType::SessionPolicy, &opts))
            .await?;
        find_first(rows, |_| true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> SchemaObjectIdentifier {
        SchemaObjectIdentifier::new("db", "sc", "sp")
    }

    #[test]
    fn create_complete() {
        let opts = CreateSessionPolicyOptions::new(id())
            .with_if_not_exists(true)
            .with_session_idle_timeout_mins(5)
            .with_session_ui_idle_timeout_mins(34)
            .with_comment("c");
        assert_eq!(
            opts.to_sql().unwrap(),
            r#"CREATE SESSION POLICY IF NOT EXISTS "db"."sc"."sp" SESSION_IDLE_TIMEOUT_MINS = 5 SESSION_UI_IDLE_TIMEOUT_MINS = 34 COMMENT = 'c'"#
        );
    }

    #[test]
    fn create_rejects_or_replace_with_if_not_exists() {
        let err = CreateSessionPolicyOptions::new(id())
            .with_or_replace(true)
            .with_if_not_exists(true)
            .validate()
            .unwrap_err();
        assert!(err.contains(&err_exactly_one_of("CreateSessionPolicyOptions", &["OrReplace", "IfNotExists"])));
    }

    #[test]
    fn alter_rename_and_unset() {
        let new_id = SchemaObjectIdentifier::new("db", "sc", "sp2");
        let rename = AlterSessionPolicyOptions::new(id()).with_if_exists(true).with_rename_to(new_id);
        assert_eq!(
            rename.to_sql().unwrap(),
            r#"ALTER SESSION POLICY IF EXISTS "db"."sc"."sp" RENAME TO "db"."sc"."sp2""#
        );
        let unset = AlterSessionPolicyOptions::new(id())
            .with_unset(SessionPolicyUnset::new().with_session_idle_timeout_mins(true).with_comment(true));
        assert_eq!(
            unset.to_sql().unwrap(),
            r#"ALTER SESSION POLICY "db"."sc"."sp" UNSET SESSION_IDLE_TIMEOUT_MINS, COMMENT"#
        );
    }

    #[test]
    fn unset_of_only_false_flags_is_rejected() {
        let unset = SessionPolicyUnset::new()
            .with_session_idle_timeout_mins(false)
            .with_comment(false);
        let err = AlterSessionPolicyOptions::new(id()).with_unset(unset).validate().unwrap_err();
        assert!(err.contains(&err_at_least_one_of(
            "SessionPolicyUnset",
            &["SessionIdleTimeoutMins", "SessionUiIdleTimeoutMins", "Comment"]
        )));
    }

    #[test]
    fn alter_with_empty_set_names_every_field() {
        let err = AlterSessionPolicyOptions::new(id())
            .with_set(SessionPolicySet::new())
            .validate()
            .unwrap_err();
        assert_eq!(
            err.errors(),
            &[err_at_least_one_of(
                "SessionPolicySet",
                &["SessionIdleTimeoutMins", "SessionUiIdleTimeoutMins", "Comment"]
            )]
        );
    }
}
