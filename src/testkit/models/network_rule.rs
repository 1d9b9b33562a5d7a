use crate::sdk::network_rules::{NetworkRuleMode, NetworkRuleType};
use crate::sdk::{ObjectIdentifier, SchemaObjectIdentifier};
use crate::testkit::config::{collect_set, Model, ModelMeta, Variable};
use std::collections::BTreeMap;

pub const NETWORK_RULE: &str = "snowflake_network_rule";

#[derive(Clone, Debug, PartialEq)]
pub struct NetworkRuleModel {
    pub comment: Option<Variable>,
    pub database: Option<Variable>,
    pub mode: Option<Variable>,
    pub name: Option<Variable>,
    pub schema: Option<Variable>,
    pub rule_type: Option<Variable>,
    pub value_list: Option<Variable>,
    meta: ModelMeta,
}

impl NetworkRuleModel {
    pub fn new(
        resource_name: impl Into<String>,
        id: &SchemaObjectIdentifier,
        rule_type: NetworkRuleType,
        value_list: &[&str],
        mode: NetworkRuleMode,
    ) -> Self {
        Self {
            comment: None,
            database: Some(Variable::string(id.database_name())),
            mode: Some(Variable::string(mode.as_str())),
            name: Some(Variable::string(id.name())),
            schema: Some(Variable::string(id.schema_name())),
            rule_type: Some(Variable::string(rule_type.as_str())),
            value_list: Some(Variable::list(value_list.iter().copied())),
            meta: ModelMeta::resource(NETWORK_RULE, resource_name),
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(Variable::string(comment));
        self
    }

    pub fn with_value_list(mut self, values: &[&str]) -> Self {
        self.value_list = Some(Variable::list(values.iter().copied()));
        self
    }

    pub fn with_depends_on<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.meta.depends_on = values.into_iter().map(Into::into).collect();
        self
    }
}

impl Model for NetworkRuleModel {
    fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    fn variables(&self) -> BTreeMap<String, Variable> {
        collect_set([
            ("comment", &self.comment),
            ("database", &self.database),
            ("mode", &self.mode),
            ("name", &self.name),
            ("schema", &self.schema),
            ("type", &self.rule_type),
            ("value_list", &self.value_list),
        ])
    }
}
