use crate::config::PreviewFeature;
use crate::provider::context::ProviderContext;
use crate::provider::data::ResourceData;
use crate::provider::diagnostics::Diagnostics;
use crate::provider::schema::{Attribute, AttributeType, Schema};
use crate::provider::DataSource;
use crate::sdk::{DatabaseObjectIdentifier, In, ObjectIdentifier, ShowOptions};
use async_trait::async_trait;
use serde_json::{json, Value};

/// `snowflake_file_formats`: every file format in one schema.
pub struct FileFormatsDataSource;

#[async_trait]
impl DataSource for FileFormatsDataSource {
    fn type_name(&self) -> &'static str {
        "snowflake_file_formats"
    }

    fn schema(&self) -> Schema {
        let file_format = Schema::new()
            .attribute("name", Attribute::computed(AttributeType::String))
            .attribute("database", Attribute::computed(AttributeType::String))
            .attribute("schema", Attribute::computed(AttributeType::String))
            .attribute("comment", Attribute::computed(AttributeType::String))
            .attribute("format_type", Attribute::computed(AttributeType::String));
        Schema::new()
            .attribute(
                "database",
                Attribute::required(AttributeType::String)
                    .description("The database from which to return the schemas from."),
            )
            .attribute(
                "schema",
                Attribute::required(AttributeType::String)
                    .description("The schema from which to return the file formats from."),
            )
            .attribute(
                "file_formats",
                Attribute::computed(AttributeType::list_of(AttributeType::Object(file_format)))
                    .description("The file formats in the schema"),
            )
    }

    fn preview_feature(&self) -> Option<PreviewFeature> {
        Some(PreviewFeature::FileFormatsDatasource)
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Diagnostics {
        let (database, schema) = match (data.require_string("database"), data.require_string("schema")) {
            (Ok(d), Ok(s)) => (d, s),
            (Err(e), _) | (_, Err(e)) => return e.into(),
        };
        let opts = ShowOptions::new().with_in(In::Schema(DatabaseObjectIdentifier::new(&database, &schema)));
        let formats = match ctx.client.file_formats().show(&opts).await {
            Ok(formats) => formats,
            Err(e) => {
                data.clear_id();
                return Diagnostics::from_err("error listing file formats", e);
            }
        };
        let items: Vec<Value> = formats
            .iter()
            .map(|f| {
                let id = f.id();
                json!({
                    "name": id.name(),
                    "database": id.database_name(),
                    "schema": id.schema_name(),
                    "comment": f.comment,
                    "format_type": f.format_type,
                })
            })
            .collect();
        data.set_id(format!("{}|{}", database, schema));
        data.set("file_formats", items);
        Diagnostics::new()
    }
}
