//! Random identifiers inside a fixed test database and schema.

use crate::sdk::{
    AccountObjectIdentifier, DataType, DatabaseObjectIdentifier, SchemaObjectIdentifier,
    SchemaObjectIdentifierWithArguments,
};
use crate::testkit::random;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdsGenerator {
    database: String,
    schema: String,
    /// Appended to every generated name so leftovers are attributable to one run.
    suffix: String,
}

impl IdsGenerator {
    pub fn new(database: impl Into<String>, schema: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            schema: schema.into(),
            suffix: String::new(),
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn database_id(&self) -> AccountObjectIdentifier {
        AccountObjectIdentifier::new(&self.database)
    }

    pub fn schema_id(&self) -> DatabaseObjectIdentifier {
        DatabaseObjectIdentifier::new(&self.database, &self.schema)
    }

    pub fn alpha(&self) -> String {
        format!("{}{}", random::alpha(), self.suffix)
    }

    pub fn alpha_n(&self, n: usize) -> String {
        format!("{}{}", random::alpha_n(n), self.suffix)
    }

    pub fn random_account_object_identifier(&self) -> AccountObjectIdentifier {
        AccountObjectIdentifier::new(self.alpha())
    }

    pub fn random_database_object_identifier(&self) -> DatabaseObjectIdentifier {
        DatabaseObjectIdentifier::new(&self.database, self.alpha())
    }

    pub fn random_schema_object_identifier(&self) -> SchemaObjectIdentifier {
        SchemaObjectIdentifier::new(&self.database, &self.schema, self.alpha())
    }

    pub fn random_schema_object_identifier_in_schema(&self, schema: &DatabaseObjectIdentifier) -> SchemaObjectIdentifier {
        SchemaObjectIdentifier::in_schema(schema, self.alpha())
    }

    pub fn random_schema_object_identifier_with_arguments(
        &self,
        arguments: Vec<DataType>,
    ) -> SchemaObjectIdentifierWithArguments {
        SchemaObjectIdentifierWithArguments::new(&self.database, &self.schema, self.alpha(), arguments)
    }
}
