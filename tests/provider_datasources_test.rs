#[path = "support/fake_executor.rs"]
mod fake_executor;

use fake_executor::FakeExecutor;
use serde_json::{json, Value};
use snowflake_provider_sdk::config::{PreviewFeature, ProviderConfig};
use snowflake_provider_sdk::provider::{Provider, ProviderContext, ResourceData};
use snowflake_provider_sdk::testkit::models::{FileFormatsModel, GrantsModel, UsersModel};
use snowflake_provider_sdk::testkit::Model;

fn context(fake: &FakeExecutor, features: &[PreviewFeature]) -> ProviderContext {
    let config = ProviderConfig {
        database_url: "postgres://fake".into(),
        preview_features_enabled: features.iter().map(|f| f.to_string()).collect(),
        ..ProviderConfig::default()
    };
    ProviderContext::new(fake.client(), config)
}

#[tokio::test]
async fn file_formats_require_the_preview_feature() {
    let fake = FakeExecutor::new();
    let ctx = context(&fake, &[]);
    let mut data = ResourceData::new(FileFormatsModel::new("test", "db", "sc").values());

    let diags = Provider::new()
        .read_data_source(&ctx, "snowflake_file_formats", &mut data)
        .await;

    assert!(diags.has_errors());
    assert!(fake.executed_sql().is_empty());
}

#[tokio::test]
async fn file_formats_are_listed_per_schema() {
    let fake = FakeExecutor::new();
    fake.respond(
        "SHOW FILE FORMATS",
        vec![json!({
            "name": "CSV_FMT",
            "database_name": "db",
            "schema_name": "sc",
            "type": "CSV",
            "owner": "SYSADMIN",
            "comment": "csv files"
        })],
    );
    let ctx = context(&fake, &[PreviewFeature::FileFormatsDatasource]);
    let mut data = ResourceData::new(FileFormatsModel::new("test", "db", "sc").values());

    let diags = Provider::new()
        .read_data_source(&ctx, "snowflake_file_formats", &mut data)
        .await;

    assert!(!diags.has_errors(), "{}", diags);
    assert_eq!(fake.executed_sql(), vec![r#"SHOW FILE FORMATS IN SCHEMA "db"."sc""#]);
    assert_eq!(data.id(), "db|sc");
    assert_eq!(
        data.get("file_formats"),
        Some(&json!([{
            "name": "CSV_FMT",
            "database": "db",
            "schema": "sc",
            "comment": "csv files",
            "format_type": "CSV"
        }]))
    );
}

#[tokio::test]
async fn file_formats_failure_clears_the_id() {
    let fake = FakeExecutor::new();
    fake.fail_not_exist("SHOW FILE FORMATS");
    let ctx = context(&fake, &[PreviewFeature::FileFormatsDatasource]);
    let mut data = ResourceData::new(FileFormatsModel::new("test", "db", "sc").values());
    data.set_id("db|sc");

    let diags = Provider::new()
        .read_data_source(&ctx, "snowflake_file_formats", &mut data)
        .await;

    assert!(diags.has_errors());
    assert_eq!(data.id(), "");
}

#[tokio::test]
async fn users_are_enriched_with_describe_and_parameters() {
    let fake = FakeExecutor::new();
    fake.respond(
        "SHOW USERS",
        vec![json!({"name": "ALICE", "login_name": "ALICE", "disabled": "false"})],
    );
    fake.respond(
        "DESCRIBE USER",
        vec![
            json!({"property": "NAME", "value": "ALICE"}),
            json!({"property": "EMAIL", "value": null}),
        ],
    );
    fake.respond(
        "SHOW PARAMETERS",
        vec![json!({"key": "TIMEZONE", "value": "UTC", "default": "UTC", "level": "", "description": "tz"})],
    );
    let ctx = context(&fake, &[]);
    let model = UsersModel::with_default_meta().with_like("ALI%");
    let mut data = ResourceData::new(model.values());

    let diags = Provider::new().read_data_source(&ctx, "snowflake_users", &mut data).await;

    assert!(!diags.has_errors(), "{}", diags);
    assert_eq!(data.id(), "users_read");
    let sql = fake.executed_sql();
    assert_eq!(sql[0], "SHOW USERS LIKE 'ALI%'");
    assert_eq!(sql.len(), 3);

    let users = data.get("users").and_then(Value::as_array).cloned().unwrap_or_default();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["show_output"][0]["name"], "ALICE");
    assert_eq!(users[0]["show_output"][0]["disabled"], false);
    assert_eq!(users[0]["describe_output"][0]["name"], "ALICE");
    assert_eq!(users[0]["describe_output"][0]["email"], Value::Null);
    assert_eq!(users[0]["parameters"][0]["timezone"][0]["value"], "UTC");
}

#[tokio::test]
async fn users_without_details_only_run_show() {
    let fake = FakeExecutor::new();
    fake.respond("SHOW USERS", vec![json!({"name": "BOB"})]);
    let ctx = context(&fake, &[]);
    let model = UsersModel::with_default_meta()
        .with_with_describe(false)
        .with_with_parameters(false);
    let mut data = ResourceData::new(model.values());

    let diags = Provider::new().read_data_source(&ctx, "snowflake_users", &mut data).await;

    assert!(!diags.has_errors(), "{}", diags);
    assert_eq!(fake.executed_sql(), vec!["SHOW USERS"]);
    let users = data.get("users").and_then(Value::as_array).cloned().unwrap_or_default();
    assert!(users[0].get("describe_output").is_none());
}

#[tokio::test]
async fn grants_on_account() {
    let fake = FakeExecutor::new();
    fake.respond(
        "SHOW GRANTS ON ACCOUNT",
        vec![json!({
            "privilege": "CREATE DATABASE",
            "granted_on": "ACCOUNT",
            "name": "XY12345",
            "granted_to": "ROLE",
            "grantee_name": "SYSADMIN",
            "grant_option": "true",
            "granted_by": ""
        })],
    );
    let ctx = context(&fake, &[]);
    let mut data = ResourceData::new(GrantsModel::on_account("test").values());

    let diags = Provider::new().read_data_source(&ctx, "snowflake_grants", &mut data).await;

    assert!(!diags.has_errors(), "{}", diags);
    assert_eq!(fake.executed_sql(), vec!["SHOW GRANTS ON ACCOUNT"]);
    assert_eq!(data.id(), "grants_read");
    let grants = data.get("grants").and_then(Value::as_array).cloned().unwrap_or_default();
    assert_eq!(grants[0]["privilege"], "CREATE DATABASE");
    assert_eq!(grants[0]["grant_option"], true);
}

#[tokio::test]
async fn empty_grants_on_block_is_rejected() {
    let fake = FakeExecutor::new();
    let ctx = context(&fake, &[]);
    let mut data = ResourceData::new(GrantsModel::on_empty("test").values());

    let diags = Provider::new().read_data_source(&ctx, "snowflake_grants", &mut data).await;

    assert!(diags.has_errors());
    assert!(fake.executed_sql().is_empty());
}

#[tokio::test]
async fn unknown_data_source_is_an_error() {
    let fake = FakeExecutor::new();
    let ctx = context(&fake, &[]);
    let mut data = ResourceData::default();

    let diags = Provider::new()
        .read_data_source(&ctx, "snowflake_nothing", &mut data)
        .await;

    assert!(diags.has_errors());
    assert!(diags.to_string().contains("snowflake_nothing"));
}
