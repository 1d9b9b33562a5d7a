//! File formats.

use crate::error::SdkError;
use crate::sdk::client::Client;
use crate::sdk::common::{DropOptions, ObjectOperation, ObjectType, ShowOptions};
use crate::sdk::ddl::{Statement, ToSql};
use crate::sdk::identifier::SchemaObjectIdentifier;
use crate::sdk::validation::{check_identifier, err_exactly_one_of, Validate, ValidationErrors};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FileFormatType {
    Csv,
    Json,
    Avro,
    Orc,
    Parquet,
    Xml,
}

impl FileFormatType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormatType::Csv => "CSV",
            FileFormatType::Json => "JSON",
            FileFormatType::Avro => "AVRO",
            FileFormatType::Orc => "ORC",
            FileFormatType::Parquet => "PARQUET",
            FileFormatType::Xml => "XML",
        }
    }
}

impl FromStr for FileFormatType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CSV" => Ok(FileFormatType::Csv),
            "JSON" => Ok(FileFormatType::Json),
            "AVRO" => Ok(FileFormatType::Avro),
            "ORC" => Ok(FileFormatType::Orc),
            "PARQUET" => Ok(FileFormatType::Parquet),
            "XML" => Ok(FileFormatType::Xml),
            _ => Err(format!("invalid file format type: {}", s)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateFileFormatOptions {
    name: SchemaObjectIdentifier,
    pub or_replace: Option<bool>,
    pub temporary: Option<bool>,
    pub if_not_exists: Option<bool>,
    pub format_type: Option<FileFormatType>,
    pub comment: Option<String>,
}

impl CreateFileFormatOptions {
    pub fn new(name: SchemaObjectIdentifier) -> Self {
        Self {
            name,
            or_replace: None,
            temporary: None,
            if_not_exists: None,
            format_type: None,
            comment: None,
        }
    }

    pub fn with_or_replace(mut self, v: bool) -> Self {
        self.or_replace = Some(v);
        self
    }

    pub fn with_temporary(mut self, v: bool) -> Self {
        self.temporary = Some(v);
        self
    }

    pub fn with_if_not_exists(mut self, v: bool) -> Self {
        self.if_not_exists = Some(v);
        self
    }

    pub fn with_type(mut self, t: FileFormatType) -> Self {
        self.format_type = Some(t);
        self
    }

    pub fn with_comment(mut self, v: impl Into<String>) -> Self {
        self.comment = Some(v.into());
        self
    }
}

impl ToSql for CreateFileFormatOptions {
    fn statement(&self) -> Statement {
        Statement::new()
            .sql("CREATE")
            .keyword("OR REPLACE", self.or_replace)
            .keyword("TEMPORARY", self.temporary)
            .sql("FILE FORMAT")
            .keyword("IF NOT EXISTS", self.if_not_exists)
            .identifier(&self.name)
            .parameter("TYPE", self.format_type.map(|t| t.as_str()))
            .quoted_parameter("COMMENT", self.comment.as_deref())
    }
}

impl Validate for CreateFileFormatOptions {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errs = ValidationErrors::new();
        check_identifier(&mut errs, &self.name);
        if self.or_replace == Some(true) && self.if_not_exists == Some(true) {
            errs.push(err_exactly_one_of("CreateFileFormatOptions", &["OrReplace", "IfNotExists"]));
        }
        errs.into_result()
    }
}

/// One row of `SHOW FILE FORMATS`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FileFormat {
    pub created_on: Option<DateTime<Utc>>,
    pub name: String,
    pub database_name: String,
    pub schema_name: String,
    #[serde(rename = "type")]
    pub format_type: String,
    pub owner: String,
    pub comment: String,
    pub owner_role_type: String,
    pub format_options: String,
}

impl FileFormat {
    pub fn id(&self) -> SchemaObjectIdentifier {
        SchemaObjectIdentifier::new(&self.database_name, &self.schema_name, &self.name)
    }
}

pub struct FileFormats<'a> {
    client: &'a Client,
}

impl<'a> FileFormats<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn create(&self, opts: &CreateFileFormatOptions) -> Result<(), SdkError> {
        self.client.run(opts).await
    }

    pub async fn drop(&self, opts: &DropOptions<SchemaObjectIdentifier>) -> Result<(), SdkError> {
        self.client
            .run(&ObjectOperation::new(ObjectType::FileFormat, opts))
            .await
    }

    pub async fn drop_safely(&self, id: &SchemaObjectIdentifier) -> Result<(), SdkError> {
        self.client.drop_safely(ObjectType::FileFormat, id).await
    }

    pub async fn show(&self, opts: &ShowOptions) -> Result<Vec<FileFormat>, SdkError> {
        self.client
            .fetch(&ObjectOperation::new(ObjectType::FileFormat, opts))
            .await
    }

    pub async fn show_by_id(&self, id: &SchemaObjectIdentifier) -> Result<FileFormat, SdkError> {
        self.client
            .show_by_schema_id(ObjectType::FileFormat, id, FileFormat::id)
            .await
    }
}
