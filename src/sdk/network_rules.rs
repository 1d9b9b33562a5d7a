//! Network rules.

use crate::collections::find_first;
use crate::error::SdkError;
use crate::sdk::client::{not_exist_as_not_found, Client};
use crate::sdk::common::{DescribeOptions, DropOptions, ObjectOperation, ObjectType, ShowOptions};
use crate::sdk::ddl::{Statement, ToSql};
use crate::sdk::identifier::SchemaObjectIdentifier;
use crate::sdk::validation::{
    any_value_set, check_identifier, err_at_least_one_of, err_exactly_one_of, Validate, ValidationErrors,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NetworkRuleType {
    Ipv4,
    AwsVpcEndpointId,
    AzureLinkId,
    HostPort,
}

impl NetworkRuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkRuleType::Ipv4 => "IPV4",
            NetworkRuleType::AwsVpcEndpointId => "AWSVPCEID",
            NetworkRuleType::AzureLinkId => "AZURELINKID",
            NetworkRuleType::HostPort => "HOST_PORT",
        }
    }
}

impl FromStr for NetworkRuleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "IPV4" => Ok(NetworkRuleType::Ipv4),
            "AWSVPCEID" => Ok(NetworkRuleType::AwsVpcEndpointId),
            "AZURELINKID" => Ok(NetworkRuleType::AzureLinkId),
            "HOST_PORT" => Ok(NetworkRuleType::HostPort),
            _ => Err(format!("invalid network rule type: {}", s)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NetworkRuleMode {
    Ingress,
    InternalStage,
    Egress,
}

impl NetworkRuleMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkRuleMode::Ingress => "INGRESS",
            NetworkRuleMode::InternalStage => "INTERNAL_STAGE",
            NetworkRuleMode::Egress => "EGRESS",
        }
    }
}

impl FromStr for NetworkRuleMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "INGRESS" => Ok(NetworkRuleMode::Ingress),
            "INTERNAL_STAGE" => Ok(NetworkRuleMode::InternalStage),
            "EGRESS" => Ok(NetworkRuleMode::Egress),
            _ => Err(format!("invalid network rule mode: {}", s)),
        }
    }
}

impl fmt::Display for NetworkRuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for NetworkRuleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateNetworkRuleOptions {
    name: SchemaObjectIdentifier,
    pub or_replace: Option<bool>,
    pub rule_type: NetworkRuleType,
    pub value_list: Vec<String>,
    pub mode: NetworkRuleMode,
    pub comment: Option<String>,
}

impl CreateNetworkRuleOptions {
    pub fn new(
        name: SchemaObjectIdentifier,
        rule_type: NetworkRuleType,
        value_list: Vec<String>,
        mode: NetworkRuleMode,
    ) -> Self {
        Self {
            name,
            or_replace: None,
            rule_type,
            value_list,
            mode,
            comment: None,
        }
    }

    pub fn with_or_replace(mut self, v: bool) -> Self {
        self.or_replace = Some(v);
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

impl ToSql for CreateNetworkRuleOptions {
    fn statement(&self) -> Statement {
        Statement::new()
            .sql("CREATE")
            .keyword("OR REPLACE", self.or_replace)
            .sql("NETWORK RULE")
            .identifier(&self.name)
            .parameter("TYPE", Some(self.rule_type.as_str()))
            .quoted_parameter("VALUE_LIST", Some(self.value_list.clone()))
            .parameter("MODE", Some(self.mode.as_str()))
            .quoted_parameter("COMMENT", self.comment.as_deref())
    }
}

impl Validate for CreateNetworkRuleOptions {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errs = ValidationErrors::new();
        check_identifier(&mut errs, &self.name);
        errs.into_result()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NetworkRuleSet {
    pub value_list: Option<Vec<String>>,
    pub comment: Option<String>,
}

impl NetworkRuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value_list(mut self, values: Vec<String>) -> Self {
        self.value_list = Some(values);
        self
    }

    pub fn with_comment(mut self, v: impl Into<String>) -> Self {
        self.comment = Some(v.into());
        self
    }
}

impl ToSql for NetworkRuleSet {
    fn statement(&self) -> Statement {
        Statement::new()
            .quoted_parameter("VALUE_LIST", self.value_list.clone())
            .quoted_parameter("COMMENT", self.comment.as_deref())
    }
}

impl Validate for NetworkRuleSet {
    fn validate(&self) -> Result<(), ValidationErrors> {
        if !any_value_set(&[self.value_list.is_some(), self.comment.is_some()]) {
            return Err(err_at_least_one_of("NetworkRuleSet", &["ValueList", "Comment"]).into());
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NetworkRuleUnset {
    pub value_list: Option<bool>,
    pub comment: Option<bool>,
}

impl NetworkRuleUnset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value_list(mut self, v: bool) -> Self {
        self.value_list = Some(v);
        self
    }

    pub fn with_comment(mut self, v: bool) -> Self {
        self.comment = Some(v);
        self
    }
}

impl ToSql for NetworkRuleUnset {
    fn statement(&self) -> Statement {
        Statement::comma_separated()
            .keyword("VALUE_LIST", self.value_list)
            .keyword("COMMENT", self.comment)
    }
}

impl Validate for NetworkRuleUnset {
    fn validate(&self) -> Result<(), ValidationErrors> {
        if !any_value_set(&[self.value_list == Some(true), self.comment == Some(true)]) {
            return Err(err_at_least_one_of("NetworkRuleUnset", &["ValueList", "Comment"]).into());
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlterNetworkRuleOptions {
    name: SchemaObjectIdentifier,
    pub if_exists: Option<bool>,
    pub set: Option<NetworkRuleSet>,
    pub unset: Option<NetworkRuleUnset>,
}

impl AlterNetworkRuleOptions {
    pub fn new(name: SchemaObjectIdentifier) -> Self {
        Self {
            name,
            if_exists: None,
            set: None,
            unset: None,
        }
    }

    pub fn with_if_exists(mut self, v: bool) -> Self {
        self.if_exists = Some(v);
        self
    }

    pub fn with_set(mut self, set: NetworkRuleSet) -> Self {
        self.set = Some(set);
        self
    }

    pub fn with_unset(mut self, unset: NetworkRuleUnset) -> Self {
        self.unset = Some(unset);
        self
    }
}

impl ToSql for AlterNetworkRuleOptions {
    fn statement(&self) -> Statement {
        Statement::new()
            .sql("ALTER NETWORK RULE")
            .keyword("IF EXISTS", self.if_exists)
            .identifier(&self.name)
            .nested(Some("SET"), self.set.as_ref())
            .nested(Some("UNSET"), self.unset.as_ref())
    }
}

impl Validate for AlterNetworkRuleOptions {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errs = ValidationErrors::new();
        check_identifier(&mut errs, &self.name);
        if self.set.is_some() == self.unset.is_some() {
            errs.push(err_exactly_one_of("AlterNetworkRuleOptions", &["Set", "Unset"]));
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
pub struct NetworkRule {
    pub created_on: Option<DateTime<Utc>>,
    pub name: String,
    pub database_name: String,
    pub schema_name: String,
    pub owner: String,
    pub comment: String,
    #[serde(rename = "type")]
    pub rule_type: String,
    pub mode: String,
    pub entries_in_valuelist: i64,
    pub owner_role_type: String,
}

impl NetworkRule {
    pub fn id(&self) -> SchemaObjectIdentifier {
        SchemaObjectIdentifier::new(&self.database_name, &self.schema_name, &self.name)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NetworkRuleDetailsRow {
    created_on: Option<DateTime<Utc>>,
    name: String,
    database_name: String,
    schema_name: String,
    owner: String,
    comment: String,
    #[serde(rename = "type")]
    rule_type: String,
    mode: String,
    value_list: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NetworkRuleDetails {
    pub created_on: Option<DateTime<Utc>>,
    pub name: String,
    pub database_name: String,
    pub schema_name: String,
    pub owner: String,
    pub comment: String,
    pub rule_type: String,
    pub mode: String,
    pub value_list: Vec<String>,
}

impl From<NetworkRuleDetailsRow> for NetworkRuleDetails {
    fn from(row: NetworkRuleDetailsRow) -> Self {
        let value_list = row
            .value_list
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from)
            .collect();
        Self {
            created_on: row.created_on,
            name: row.name,
            database_name: row.database_name,
            schema_name: row.schema_name,
            owner: row.owner,
            comment: row.comment,
            rule_type: row.rule_type,
            mode: row.mode,
            value_list,
        }
    }
}

pub struct NetworkRules<'a> {
    client: &'a Client,
}

impl<'a> NetworkRules<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn create(&self, opts: &CreateNetworkRuleOptions) -> Result<(), SdkError> {
        self.client.run(opts).await
    }

    pub async fn alter(&self, opts: &AlterNetworkRuleOptions) -> Result<(), SdkError> {
        self.client.run(opts).await
    }

    pub async fn drop(&self, opts: &DropOptions<SchemaObjectIdentifier>) -> Result<(), SdkError> {
        self.client
            .run(&ObjectOperation::new(ObjectType::NetworkRule, opts))
            .await
    }

    pub async fn drop_safely(&self, id: &SchemaObjectIdentifier) -> Result<(), SdkError> {
        self.client.drop_safely(ObjectType::NetworkRule, id).await
    }

    pub async fn show(&self, opts: &ShowOptions) -> Result<Vec<NetworkRule>, SdkError> {
        self.client
            .fetch(&ObjectOperation::new(ObjectType::NetworkRule, opts))
            .await
    }

    pub async fn show_by_id(&self, id: &SchemaObjectIdentifier) -> Result<NetworkRule, SdkError> {
        self.client
            .show_by_schema_id(ObjectType::NetworkRule, id, NetworkRule::id)
            .await
    }

    pub async fn show_by_id_safely(&self, id: &SchemaObjectIdentifier) -> Result<NetworkRule, SdkError> {
        not_exist_as_not_found(self.show_by_id(id).await)
    }

    pub async fn describe(&self, id: &SchemaObjectIdentifier) -> Result<NetworkRuleDetails, SdkError> {
        let opts = DescribeOptions::new(id.clone());
        let rows: Vec<NetworkRuleDetailsRow> = self
            .client
            .fetch(&ObjectOperation::new(ObjectType::NetworkRule, &opts))
            .await?;
        find_first(rows, |_| true).map(NetworkRuleDetails::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> SchemaObjectIdentifier {
        SchemaObjectIdentifier::new("db", "sc", "rule")
    }

    #[test]
    fn create_always_emits_type_value_list_and_mode() {
        let opts = CreateNetworkRuleOptions::new(id(), NetworkRuleType::HostPort, vec![], NetworkRuleMode::Egress);
        assert_eq!(
            opts.to_sql().unwrap(),
            r#"CREATE NETWORK RULE "db"."sc"."rule" TYPE = HOST_PORT VALUE_LIST = () MODE = EGRESS"#
        );
        let opts = CreateNetworkRuleOptions::new(
            id(),
            NetworkRuleType::Ipv4,
            vec!["0.0.0.0".into(), "1.1.1.1".into()],
            NetworkRuleMode::Ingress,
        )
        .with_or_replace(true)
        .with_comment("c");
        assert_eq!(
            opts.to_sql().unwrap(),
            r#"CREATE OR REPLACE NETWORK RULE "db"."sc"."rule" TYPE = IPV4 VALUE_LIST = ('0.0.0.0', '1.1.1.1') MODE = INGRESS COMMENT = 'c'"#
        );
    }

    #[test]
    fn alter_set_and_unset() {
        let set = AlterNetworkRuleOptions::new(id())
            .with_if_exists(true)
            .with_set(NetworkRuleSet::new().with_value_list(vec!["1.1.1.1".into()]).with_comment("x"));
        assert_eq!(
            set.to_sql().unwrap(),
            r#"ALTER NETWORK RULE IF EXISTS "db"."sc"."rule" SET VALUE_LIST = ('1.1.1.1') COMMENT = 'x'"#
        );
        let unset = AlterNetworkRuleOptions::new(id()).with_unset(NetworkRuleUnset::new().with_value_list(true).with_comment(true));
        assert_eq!(
            unset.to_sql().unwrap(),
            r#"ALTER NETWORK RULE "db"."sc"."rule" UNSET VALUE_LIST, COMMENT"#
        );
    }

    #[test]
    fn unset_with_only_false_flags_is_empty() {
        let unset = NetworkRuleUnset::new().with_value_list(false).with_comment(false);
        assert!(unset.validate().is_err());
        let err = AlterNetworkRuleOptions::new(id()).with_unset(unset).validate().unwrap_err();
        assert!(err.contains(&err_at_least_one_of("NetworkRuleUnset", &["ValueList", "Comment"])));

        assert!(NetworkRuleUnset::new().with_value_list(false).with_comment(true).validate().is_ok());
    }

    #[test]
    fn alter_rejects_both_modes() {
        let err = AlterNetworkRuleOptions::new(id())
            .with_set(NetworkRuleSet::new().with_comment("x"))
            .with_unset(NetworkRuleUnset::new().with_comment(true))
            .validate()
            .unwrap_err();
        assert_eq!(err.errors().len(), 1);
    }

    #[test]
    fn details_split_value_list() {
        let row = NetworkRuleDetailsRow {
            value_list: "1.1.1.1, 2.2.2.2".into(),
            ..Default::default()
        };
        let details = NetworkRuleDetails::from(row);
        assert_eq!(details.value_list, vec!["1.1.1.1", "2.2.2.2"]);
        assert!(NetworkRuleDetails::from(NetworkRuleDetailsRow::default()).value_list.is_empty());
    }

    #[test]
    fn rule_kinds_parse() {
        assert_eq!("host_port".parse::<NetworkRuleType>().unwrap(), NetworkRuleType::HostPort);
        assert_eq!("INTERNAL_STAGE".parse::<NetworkRuleMode>().unwrap(), NetworkRuleMode::InternalStage);
        assert!("x".parse::<NetworkRuleMode>().is_err());
    }
}
