use crate::sdk::{
    AccountObjectIdentifier, DatabaseObjectIdentifier, ObjectIdentifier, ObjectType, SchemaObjectIdentifier,
    SchemaObjectIdentifierWithArguments,
};
use crate::testkit::config::{collect_set, Model, ModelMeta, Variable};
use std::collections::BTreeMap;

pub const GRANTS: &str = "snowflake_grants";

#[derive(Clone, Debug, PartialEq)]
pub struct GrantsModel {
    pub grants: Option<Variable>,
    pub grants_of: Option<Variable>,
    pub grants_on: Option<Variable>,
    pub grants_to: Option<Variable>,
    meta: ModelMeta,
}

impl GrantsModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            grants: None,
            grants_of: None,
            grants_on: None,
            grants_to: None,
            meta: ModelMeta::data_source(GRANTS, name),
        }
    }

    pub fn on_account(name: impl Into<String>) -> Self {
        Self::new(name).with_grants_on_value(Variable::object([("account", Variable::Bool(true))]))
    }

    /// Account-level names render bare, without quotes.
    pub fn on_account_object(name: impl Into<String>, id: &AccountObjectIdentifier, object_type: ObjectType) -> Self {
        Self::new(name).with_grants_on_object(id.name(), object_type)
    }

    pub fn on_database_object(name: impl Into<String>, id: &DatabaseObjectIdentifier, object_type: ObjectType) -> Self {
        Self::new(name).with_grants_on_object(&id.fully_qualified_name(), object_type)
    }

    pub fn on_schema_object(name: impl Into<String>, id: &SchemaObjectIdentifier, object_type: ObjectType) -> Self {
        Self::new(name).with_grants_on_object(&id.fully_qualified_name(), object_type)
    }

    pub fn on_schema_object_with_arguments(
        name: impl Into<String>,
        id: &SchemaObjectIdentifierWithArguments,
        object_type: ObjectType,
    ) -> Self {
        Self::new(name).with_grants_on_object(&id.fully_qualified_name(), object_type)
    }

    /// An empty `grants_on` block.
    pub fn on_empty(name: impl Into<String>) -> Self {
        Self::new(name).with_grants_on_value(Variable::Object(BTreeMap::new()))
    }

    pub fn to_role(name: impl Into<String>, role: &AccountObjectIdentifier) -> Self {
        Self::new(name).with_grants_to_value(Variable::object([("role", Variable::string(role.name()))]))
    }

    pub fn to_user(name: impl Into<String>, user: &AccountObjectIdentifier) -> Self {
        Self::new(name).with_grants_to_value(Variable::object([("user", Variable::string(user.name()))]))
    }

    pub fn of_role(name: impl Into<String>, role: &AccountObjectIdentifier) -> Self {
        Self::new(name).with_grants_of_value(Variable::object([("role", Variable::string(role.name()))]))
    }

    fn with_grants_on_object(self, object_name: &str, object_type: ObjectType) -> Self {
        self.with_grants_on_value(Variable::object([
            ("object_name", Variable::string(object_name)),
            ("object_type", Variable::string(object_type.keyword())),
        ]))
    }

    pub fn with_depends_on<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.meta.depends_on = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_grants_on_value(mut self, value: Variable) -> Self {
        self.grants_on = Some(value);
        self
    }

    pub fn with_grants_to_value(mut self, value: Variable) -> Self {
        self.grants_to = Some(value);
        self
    }

    pub fn with_grants_of_value(mut self, value: Variable) -> Self {
        self.grants_of = Some(value);
        self
    }
}

impl Model for GrantsModel {
    fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    fn variables(&self) -> BTreeMap<String, Variable> {
        collect_set([
            ("grants", &self.grants),
            ("grants_of", &self.grants_of),
            ("grants_on", &self.grants_on),
            ("grants_to", &self.grants_to),
        ])
    }
}
