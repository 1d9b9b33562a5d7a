use crate::sdk::DatabaseObjectIdentifier;
use crate::sdk::ObjectIdentifier;
use crate::testkit::config::{collect_set, Model, ModelMeta, Variable};
use std::collections::BTreeMap;

pub const FILE_FORMATS: &str = "snowflake_file_formats";

#[derive(Clone, Debug, PartialEq)]
pub struct FileFormatsModel {
    pub database: Option<Variable>,
    pub file_formats: Option<Variable>,
    pub schema: Option<Variable>,
    meta: ModelMeta,
}

impl FileFormatsModel {
    /// Required attributes only.
    pub fn new(name: impl Into<String>, database: impl Into<String>, schema: impl Into<String>) -> Self {
        Self {
            database: Some(Variable::string(database)),
            file_formats: None,
            schema: Some(Variable::string(schema)),
            meta: ModelMeta::data_source(FILE_FORMATS, name),
        }
    }

    pub fn in_schema(name: impl Into<String>, schema: &DatabaseObjectIdentifier) -> Self {
        Self::new(name, schema.database_name(), schema.name())
    }

    pub fn with_depends_on<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.meta.depends_on = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_file_formats_value(mut self, value: Variable) -> Self {
        self.file_formats = Some(value);
        self
    }
}

impl Model for FileFormatsModel {
    fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    fn variables(&self) -> BTreeMap<String, Variable> {
        collect_set([
            ("database", &self.database),
            ("file_formats", &self.file_formats),
            ("schema", &self.schema),
        ])
    }
}
