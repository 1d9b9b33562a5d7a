use crate::testkit::config::{collect_set, Model, ModelMeta, Variable};
use std::collections::BTreeMap;

pub const USERS: &str = "snowflake_users";

#[derive(Clone, Debug, PartialEq)]
pub struct UsersModel {
    pub like: Option<Variable>,
    pub limit: Option<Variable>,
    pub starts_with: Option<Variable>,
    pub users: Option<Variable>,
    pub with_describe: Option<Variable>,
    pub with_parameters: Option<Variable>,
    meta: ModelMeta,
}

impl UsersModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            like: None,
            limit: None,
            starts_with: None,
            users: None,
            with_describe: None,
            with_parameters: None,
            meta: ModelMeta::data_source(USERS, name),
        }
    }

    pub fn with_default_meta() -> Self {
        Self::new(ModelMeta::DEFAULT_NAME)
    }

    pub fn with_depends_on<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.meta.depends_on = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_like(mut self, like: impl Into<String>) -> Self {
        self.like = Some(Variable::string(like));
        self
    }

    pub fn with_starts_with(mut self, starts_with: impl Into<String>) -> Self {
        self.starts_with = Some(Variable::string(starts_with));
        self
    }

    /// `limit { rows = .. from = .. }`
    pub fn with_limit(mut self, rows: i64, from: Option<&str>) -> Self {
        let mut block = BTreeMap::from([("rows".to_string(), Variable::Int(rows))]);
        if let Some(from) = from {
            block.insert("from".to_string(), Variable::string(from));
        }
        self.limit = Some(Variable::Object(block));
        self
    }

    pub fn with_with_describe(mut self, with_describe: bool) -> Self {
        self.with_describe = Some(Variable::Bool(with_describe));
        self
    }

    pub fn with_with_parameters(mut self, with_parameters: bool) -> Self {
        self.with_parameters = Some(Variable::Bool(with_parameters));
        self
    }

    pub fn with_like_value(mut self, value: Variable) -> Self {
        self.like = Some(value);
        self
    }

    pub fn with_limit_value(mut self, value: Variable) -> Self {
        self.limit = Some(value);
        self
    }

    pub fn with_starts_with_value(mut self, value: Variable) -> Self {
        self.starts_with = Some(value);
        self
    }

    pub fn with_users_value(mut self, value: Variable) -> Self {
        self.users = Some(value);
        self
    }

    pub fn with_with_describe_value(mut self, value: Variable) -> Self {
        self.with_describe = Some(value);
        self
    }

    pub fn with_with_parameters_value(mut self, value: Variable) -> Self {
        self.with_parameters = Some(value);
        self
    }
}

impl Model for UsersModel {
    fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    fn variables(&self) -> BTreeMap<String, Variable> {
        collect_set([
            ("like", &self.like),
            ("limit", &self.limit),
            ("starts_with", &self.starts_with),
            ("users", &self.users),
            ("with_describe", &self.with_describe),
            ("with_parameters", &self.with_parameters),
        ])
    }
}
