//! Password policies: CREATE / ALTER / DROP / SHOW / DESCRIBE PASSWORD POLICY.

use crate::error::SdkError;
use crate::sdk::client::{not_exist_as_not_found, Client};
use crate::sdk::common::{DescribeOptions, DropOptions, ObjectOperation, ObjectType, PropertyRow, ShowOptions};
use crate::sdk::common::{IntProperty, StringProperty};
use crate::sdk::ddl::{Statement, ToSql};
use crate::sdk::identifier::SchemaObjectIdentifier;
use crate::sdk::validation::{
    check_identifier, err_at_least_one_of, err_exactly_one_of, exactly_one_value_set, Validate, ValidationErrors,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

/// Integer parameters of a password policy, declared in statement order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PasswordParameter {
    MinLength,
    MaxLength,
    MinUpperCaseChars,
    MinLowerCaseChars,
    MinNumericChars,
    MinSpecialChars,
    MinAgeDays,
    MaxAgeDays,
    MaxRetries,
    LockoutTimeMins,
    History,
}

impl PasswordParameter {
    pub const ALL: [PasswordParameter; 11] = [
        PasswordParameter::MinLength,
        PasswordParameter::MaxLength,
        PasswordParameter::MinUpperCaseChars,
        PasswordParameter::MinLowerCaseChars,
        PasswordParameter::MinNumericChars,
        PasswordParameter::MinSpecialChars,
        PasswordParameter::MinAgeDays,
        PasswordParameter::MaxAgeDays,
        PasswordParameter::MaxRetries,
        PasswordParameter::LockoutTimeMins,
        PasswordParameter::History,
    ];

    pub fn sql_name(&self) -> &'static str {
        match self {
            PasswordParameter::MinLength => "PASSWORD_MIN_LENGTH",
            PasswordParameter::MaxLength => "PASSWORD_MAX_LENGTH",
            PasswordParameter::MinUpperCaseChars => "PASSWORD_MIN_UPPER_CASE_CHARS",
            PasswordParameter::MinLowerCaseChars => "PASSWORD_MIN_LOWER_CASE_CHARS",
            PasswordParameter::MinNumericChars => "PASSWORD_MIN_NUMERIC_CHARS",
            PasswordParameter::MinSpecialChars => "PASSWORD_MIN_SPECIAL_CHARS",
            PasswordParameter::MinAgeDays => "PASSWORD_MIN_AGE_DAYS",
            PasswordParameter::MaxAgeDays => "PASSWORD_MAX_AGE_DAYS",
            PasswordParameter::MaxRetries => "PASSWORD_MAX_RETRIES",
            PasswordParameter::LockoutTimeMins => "PASSWORD_LOCKOUT_TIME_MINS",
            PasswordParameter::History => "PASSWORD_HISTORY",
        }
    }

    /// Name used in validation messages.
    pub fn field_name(&self) -> &'static str {
        match self {
            PasswordParameter::MinLength => "PasswordMinLength",
            PasswordParameter::MaxLength => "PasswordMaxLength",
            PasswordParameter::MinUpperCaseChars => "PasswordMinUpperCaseChars",
            PasswordParameter::MinLowerCaseChars => "PasswordMinLowerCaseChars",
            PasswordParameter::MinNumericChars => "PasswordMinNumericChars",
            PasswordParameter::MinSpecialChars => "PasswordMinSpecialChars",
            PasswordParameter::MinAgeDays => "PasswordMinAgeDays",
            PasswordParameter::MaxAgeDays => "PasswordMaxAgeDays",
            PasswordParameter::MaxRetries => "PasswordMaxRetries",
            PasswordParameter::LockoutTimeMins => "PasswordLockoutTimeMins",
            PasswordParameter::History => "PasswordHistory",
        }
    }

    fn from_sql_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.sql_name() == name)
    }
}

fn candidate_fields() -> Vec<&'static str> {
    PasswordParameter::ALL
        .iter()
        .map(PasswordParameter::field_name)
        .chain(std::iter::once("Comment"))
        .collect()
}

/// Parameter values; always rendered in [`PasswordParameter`] order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PasswordParameters(BTreeMap<PasswordParameter, i32>);

impl PasswordParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, parameter: PasswordParameter, value: i32) -> Self {
        self.0.insert(parameter, value);
        self
    }

    pub fn get(&self, parameter: PasswordParameter) -> Option<i32> {
        self.0.get(&parameter).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn append_to(&self, statement: Statement) -> Statement {
        self.0
            .iter()
            .fold(statement, |s, (p, v)| s.parameter(p.sql_name(), Some(*v)))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatePasswordPolicyOptions {
    name: SchemaObjectIdentifier,
    pub or_replace: Option<bool>,
    pub if_not_exists: Option<bool>,
    pub parameters: PasswordParameters,
    pub comment: Option<String>,
}

impl CreatePasswordPolicyOptions {
    pub fn new(name: SchemaObjectIdentifier) -> Self {
        Self {
            name,
            or_replace: None,
            if_not_exists: None,
            parameters: PasswordParameters::new(),
            comment: None,
        }
    }

    pub fn with_or_replace(mut self, or_replace: bool) -> Self {
        self.or_replace = Some(or_replace);
        self
    }

    pub fn with_if_not_exists(mut self, if_not_exists: bool) -> Self {
        self.if_not_exists = Some(if_not_exists);
        self
    }

    pub fn with_parameter(mut self, parameter: PasswordParameter, value: i32) -> Self {
        self.parameters = self.parameters.with(parameter, value);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn name(&self) -> &SchemaObjectIdentifier {
        &self.name
    }
}

impl ToSql for CreatePasswordPolicyOptions {
    fn statement(&self) -> Statement {
        let head = Statement::new()
            .sql("CREATE")
            .keyword("OR REPLACE", self.or_replace)
            .sql("PASSWORD POLICY")
            .keyword("IF NOT EXISTS", self.if_not_exists)
            .identifier(&self.name);
        self.parameters
            .append_to(head)
            .quoted_parameter("COMMENT", self.comment.as_deref())
    }
}

impl Validate for CreatePasswordPolicyOptions {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errs = ValidationErrors::new();
        check_identifier(&mut errs, &self.name);
        errs.into_result()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PasswordPolicySet {
    pub parameters: PasswordParameters,
    pub comment: Option<String>,
}

impl PasswordPolicySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameter(mut self, parameter: PasswordParameter, value: i32) -> Self {
        self.parameters = self.parameters.with(parameter, value);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

impl ToSql for PasswordPolicySet {
    fn statement(&self) -> Statement {
        self.parameters
            .append_to(Statement::new())
            .quoted_parameter("COMMENT", self.comment.as_deref())
    }
}

impl Validate for PasswordPolicySet {
    fn validate(&self) -> Result<(), ValidationErrors> {
        if self.parameters.is_empty() && self.comment.is_none() {
            return Err(err_at_least_one_of("PasswordPolicySet", &candidate_fields()).into());
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PasswordPolicyUnset {
    pub parameters: BTreeSet<PasswordParameter>,
    pub comment: Option<bool>,
}

impl PasswordPolicyUnset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameter(mut self, parameter: PasswordParameter) -> Self {
        self.parameters.insert(parameter);
        self
    }

    pub fn with_comment(mut self, comment: bool) -> Self {
        self.comment = Some(comment);
        self
    }
}

impl ToSql for PasswordPolicyUnset {
    fn statement(&self) -> Statement {
        self.parameters
            .iter()
            .fold(Statement::comma_separated(), |s, p| s.sql(p.sql_name()))
            .keyword("COMMENT", self.comment)
    }
}

impl Validate for PasswordPolicyUnset {
    fn validate(&self) -> Result<(), ValidationErrors> {
        if self.parameters.is_empty() && self.comment != Some(true) {
            return Err(err_at_least_one_of("PasswordPolicyUnset", &candidate_fields()).into());
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlterPasswordPolicyOptions {
    name: SchemaObjectIdentifier,
    pub if_exists: Option<bool>,
    pub new_name: Option<SchemaObjectIdentifier>,
    pub set: Option<PasswordPolicySet>,
    pub unset: Option<PasswordPolicyUnset>,
}

impl AlterPasswordPolicyOptions {
    pub fn new(name: SchemaObjectIdentifier) -> Self {
        Self {
            name,
            if_exists: None,
            new_name: None,
            set: None,
            unset: None,
        }
    }

    pub fn with_if_exists(mut self, if_exists: bool) -> Self {
        self.if_exists = Some(if_exists);
        self
    }

    pub fn with_new_name(mut self, new_name: SchemaObjectIdentifier) -> Self {
        self.new_name = Some(new_name);
        self
    }

    pub fn with_set(mut self, set: PasswordPolicySet) -> Self {
        self.set = Some(set);
        self
    }

    pub fn with_unset(mut self, unset: PasswordPolicyUnset) -> Self {
        self.unset = Some(unset);
        self
    }
}

impl ToSql for AlterPasswordPolicyOptions {
    fn statement(&self) -> Statement {
        Statement::new()
            .sql("ALTER PASSWORD POLICY")
            .keyword("IF EXISTS", self.if_exists)
            .identifier(&self.name)
            .prefixed_identifier("RENAME TO", self.new_name.as_ref())
            .nested(Some("SET"), self.set.as_ref())
            .nested(Some("UNSET"), self.unset.as_ref())
    }
}

impl Validate for AlterPasswordPolicyOptions {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errs = ValidationErrors::new();
        check_identifier(&mut errs, &self.name);
        if !exactly_one_value_set(&[self.set.is_some(), self.unset.is_some(), self.new_name.is_some()]) {
            errs.push(err_exactly_one_of("AlterPasswordPolicyOptions", &["Set", "Unset", "NewName"]));
        }
        if let Some(new_name) = &self.new_name {
            check_identifier(&mut errs, new_name);
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

/// One row of `SHOW PASSWORD POLICIES`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PasswordPolicy {
    pub created_on: Option<DateTime<Utc>>,
    pub name: String,
    pub database_name: String,
    pub schema_name: String,
    pub kind: String,
    pub owner: String,
    pub comment: String,
    pub owner_role_type: String,
}

impl PasswordPolicy {
    pub fn id(&self) -> SchemaObjectIdentifier {
        SchemaObjectIdentifier::new(&self.database_name, &self.schema_name, &self.name)
    }
}

/// `DESCRIBE PASSWORD POLICY` output.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PasswordPolicyDetails {
    pub name: Option<StringProperty>,
    pub owner: Option<StringProperty>,
    pub comment: Option<StringProperty>,
    pub parameters: BTreeMap<PasswordParameter, IntProperty>,
}

impl PasswordPolicyDetails {
    pub fn from_rows(rows: &[PropertyRow]) -> Self {
        let mut details = Self::default();
        for row in rows {
            match row.property.as_str() {
                "NAME" => details.name = Some(row.to_string_property()),
                "OWNER" => details.owner = Some(row.to_string_property()),
                "COMMENT" => details.comment = Some(row.to_string_property()),
                other => {
                    if let Some(p) = PasswordParameter::from_sql_name(other) {
                        details.parameters.insert(p, row.to_int_property());
                    }
                }
            }
        }
        details
    }

    pub fn parameter(&self, parameter: PasswordParameter) -> Option<&IntProperty> {
        self.parameters.get(&parameter)
    }
}

pub struct PasswordPolicies<'a> {
    client: &'a Client,
}

impl<'a> PasswordPolicies<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn create(&self, opts: &CreatePasswordPolicyOptions) -> Result<(), SdkError> {
        self.client.run(opts).await
    }

    pub async fn alter(&self, opts: &AlterPasswordPolicyOptions) -> Result<(), SdkError> {
        self.client.run(opts).await
    }

    pub async fn drop(&self, opts: &DropOptions<SchemaObjectIdentifier>) -> Result<(), SdkError> {
        self.client
            .run(&ObjectOperation::new(ObjectType::PasswordPolicy, opts))
            .await
    }

    pub async fn drop_safely(&self, id: &SchemaObjectIdentifier) -> Result<(), SdkError> {
        self.client.drop_safely(ObjectType::PasswordPolicy, id).await
    }

    pub async fn show(&self, opts: &ShowOptions) -> Result<Vec<PasswordPolicy>, SdkError> {
        self.client
            .fetch(&ObjectOperation::new(ObjectType::PasswordPolicy, opts))
            .await
    }

    pub async fn show_by_id(&self, id: &SchemaObjectIdentifier) -> Result<PasswordPolicy, SdkError> {
        self.client
            .show_by_schema_id(ObjectType::PasswordPolicy, id, PasswordPolicy::id)
            .await
    }

    pub async fn show_by_id_safely(&self, id: &SchemaObjectIdentifier) -> Result<PasswordPolicy, SdkError> {
        not_exist_as_not_found(self.show_by_id(id).await)
    }

    pub async fn describe(&self, id: &SchemaObjectIdentifier) -> Result<PasswordPolicyDetails, SdkError> {
        let opts = DescribeOptions::new(id.clone());
        let rows: Vec<PropertyRow> = self
            .client
            .fetch(&ObjectOperation::new(ObjectType::PasswordPolicy, &opts))
            .await?;
        Ok(PasswordPolicyDetails::from_rows(&rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::validation::ValidationError;

    fn id() -> SchemaObjectIdentifier {
        SchemaObjectIdentifier::new("db", "sc", "P")
    }

    #[test]
    fn create_renders_parameters_in_declaration_order() {
        let opts = CreatePasswordPolicyOptions::new(id())
            .with_if_not_exists(true)
            .with_parameter(PasswordParameter::MaxLength, 20)
            .with_parameter(PasswordParameter::MinLength, 8)
            .with_comment("test");
        assert_eq!(
            opts.to_sql().unwrap(),
            r#"CREATE PASSWORD POLICY IF NOT EXISTS "db"."sc"."P" PASSWORD_MIN_LENGTH = 8 PASSWORD_MAX_LENGTH = 20 COMMENT = 'test'"#
        );
    }

    #[test]
    fn alter_unset_is_comma_separated() {
        let opts = AlterPasswordPolicyOptions::new(id()).with_unset(
            PasswordPolicyUnset::new()
                .with_parameter(PasswordParameter::History)
                .with_parameter(PasswordParameter::MinLength)
                .with_comment(true),
        );
        assert_eq!(
            opts.to_sql().unwrap(),
            r#"ALTER PASSWORD POLICY "db"."sc"."P" UNSET PASSWORD_MIN_LENGTH, PASSWORD_HISTORY, COMMENT"#
        );
    }

    #[test]
    fn unset_comment_false_alone_is_rejected() {
        let err = AlterPasswordPolicyOptions::new(id())
            .with_unset(PasswordPolicyUnset::new().with_comment(false))
            .validate()
            .unwrap_err();
        assert!(err.contains(&err_at_least_one_of("PasswordPolicyUnset", &candidate_fields())));

        let unset = PasswordPolicyUnset::new()
            .with_parameter(PasswordParameter::MaxAgeDays)
            .with_comment(false);
        assert!(unset.validate().is_ok());
        assert_eq!(unset.to_sql().unwrap(), "PASSWORD_MAX_AGE_DAYS");
    }

    #[test]
    fn alter_requires_exactly_one_mode() {
        let err = AlterPasswordPolicyOptions::new(id()).validate().unwrap_err();
        assert!(err.contains(&err_exactly_one_of("AlterPasswordPolicyOptions", &["Set", "Unset", "NewName"])));

        let err = AlterPasswordPolicyOptions::new(id())
            .with_set(PasswordPolicySet::new())
            .with_new_name(SchemaObjectIdentifier::new("db", "sc", "Q"))
            .validate()
            .unwrap_err();
        assert_eq!(err.errors().len(), 2);
        assert!(matches!(
            err.errors()[1],
            ValidationError::AtLeastOneOf { structure: "PasswordPolicySet", .. }
        ));
    }

    #[test]
    fn details_collect_known_properties() {
        let rows = vec![
            PropertyRow {
                property: "NAME".into(),
                value: Some("P".into()),
                ..Default::default()
            },
            PropertyRow {
                property: "PASSWORD_MIN_LENGTH".into(),
                value: Some("12".into()),
                default: Some("14".into()),
                ..Default::default()
            },
            PropertyRow {
                property: "SOMETHING_NEW".into(),
                ..Default::default()
            },
        ];
        let details = PasswordPolicyDetails::from_rows(&rows);
        assert_eq!(details.name.unwrap().value, "P");
        let min = details.parameters.get(&PasswordParameter::MinLength).unwrap();
        assert_eq!((min.value, min.default_value), (Some(12), Some(14)));
        assert_eq!(details.parameters.len(), 1);
    }
}
