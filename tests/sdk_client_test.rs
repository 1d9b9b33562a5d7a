#[path = "support/fake_executor.rs"]
mod fake_executor;

use std::time::Duration;

use fake_executor::FakeExecutor;
use serde_json::json;
use snowflake_provider_sdk::error::SdkError;
use snowflake_provider_sdk::sdk::grants::{ShowGrantsOf, ShowGrantsOptions};
use snowflake_provider_sdk::sdk::password_policies::{
    AlterPasswordPolicyOptions, CreatePasswordPolicyOptions, PasswordParameter,
};
use snowflake_provider_sdk::sdk::session_policies::CreateSessionPolicyOptions;
use snowflake_provider_sdk::sdk::users::ShowUserParametersOptions;
use snowflake_provider_sdk::sdk::{AccountObjectIdentifier, DropOptions, SchemaObjectIdentifier};

fn policy_id() -> SchemaObjectIdentifier {
    SchemaObjectIdentifier::new("db", "sc", "P")
}

fn policy_row(name: &str) -> serde_json::Value {
    json!({
        "created_on": null,
        "name": name,
        "database_name": "db",
        "schema_name": "sc",
        "kind": "PASSWORD_POLICY",
        "owner": "ACCOUNTADMIN",
        "comment": "",
        "owner_role_type": "ROLE",
        "options": ""
    })
}

#[tokio::test]
async fn invalid_options_never_reach_the_database() {
    let fake = FakeExecutor::new();
    let client = fake.client();

    let err = client
        .password_policies()
        .alter(&AlterPasswordPolicyOptions::new(policy_id()))
        .await
        .unwrap_err();

    assert!(matches!(err, SdkError::Validation(_)));
    assert!(fake.executed_sql().is_empty());

    let err = client
        .session_policies()
        .create(
            &CreateSessionPolicyOptions::new(policy_id())
                .with_or_replace(true)
                .with_if_not_exists(true),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::Validation(_)));
    assert!(fake.executed_sql().is_empty());
}

#[tokio::test]
async fn create_executes_rendered_statement() {
    let fake = FakeExecutor::new();
    let client = fake.client();

    client
        .password_policies()
        .create(
            &CreatePasswordPolicyOptions::new(policy_id())
                .with_if_not_exists(true)
                .with_parameter(PasswordParameter::MinLength, 8),
        )
        .await
        .unwrap();

    assert_eq!(
        fake.executed_sql(),
        vec![r#"CREATE PASSWORD POLICY IF NOT EXISTS "db"."sc"."P" PASSWORD_MIN_LENGTH = 8"#]
    );
}

#[tokio::test]
async fn show_by_id_scans_for_exact_identifier() {
    let fake = FakeExecutor::new();
    fake.respond("SHOW PASSWORD POLICIES", vec![policy_row("p"), policy_row("P"), policy_row("P2")]);
    let client = fake.client();

    let policy = client.password_policies().show_by_id(&policy_id()).await.unwrap();

    assert_eq!(policy.name, "P");
    assert_eq!(policy.id(), policy_id());
    assert_eq!(
        fake.executed_sql(),
        vec![r#"SHOW PASSWORD POLICIES LIKE 'P' IN SCHEMA "db"."sc""#]
    );
}

#[tokio::test]
async fn show_by_id_without_exact_match_is_not_found() {
    let fake = FakeExecutor::new();
    fake.respond("SHOW PASSWORD POLICIES", vec![policy_row("p")]);
    let client = fake.client();

    let err = client.password_policies().show_by_id(&policy_id()).await.unwrap_err();
    assert!(matches!(err, SdkError::ObjectNotFound));
}

#[tokio::test]
async fn show_by_id_safely_folds_missing_parent_into_not_found() {
    let fake = FakeExecutor::new();
    fake.fail_not_exist("SHOW NETWORK RULES");
    let client = fake.client();

    let err = client
        .network_rules()
        .show_by_id_safely(&policy_id())
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::ObjectNotFound));
    assert!(err.is_not_found());
}

#[tokio::test]
async fn drop_safely_treats_missing_object_as_dropped() {
    let fake = FakeExecutor::new();
    fake.fail_not_exist("DROP PASSWORD POLICY");
    let client = fake.client();

    client.password_policies().drop_safely(&policy_id()).await.unwrap();
    assert_eq!(
        fake.executed_sql(),
        vec![r#"DROP PASSWORD POLICY IF EXISTS "db"."sc"."P""#]
    );

    let err = client
        .password_policies()
        .drop(&DropOptions::new(policy_id()))
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::ObjectNotExistOrAuthorized(_)));
}

#[tokio::test]
async fn statement_timeout_bounds_the_round_trip() {
    let fake = FakeExecutor::new();
    fake.set_delay(Duration::from_millis(500));
    let client = fake.client().with_statement_timeout(Duration::from_millis(20));

    let err = client.exec("SELECT 1").await.unwrap_err();
    assert!(matches!(err, SdkError::Timeout(d) if d == Duration::from_millis(20)));
}

#[tokio::test]
async fn describe_session_policy_decodes_the_single_row() {
    let fake = FakeExecutor::new();
    fake.respond(
        "DESCRIBE SESSION POLICY",
        vec![json!({
            "name": "P",
            "session_idle_timeout_mins": 30,
            "session_ui_idle_timeout_mins": 10,
            "comment": null,
            "extra_column": "ignored"
        })],
    );
    let client = fake.client();

    let description = client.session_policies().describe(&policy_id()).await.unwrap();

    assert_eq!(description.name, "P");
    assert_eq!(description.session_idle_timeout_mins, 30);
    assert_eq!(description.session_ui_idle_timeout_mins, 10);
    assert_eq!(description.comment, "");
}

#[tokio::test]
async fn grants_of_role_decode_text_booleans() {
    let fake = FakeExecutor::new();
    fake.respond(
        "SHOW GRANTS OF ROLE",
        vec![json!({
            "role": "ANALYST",
            "granted_to": "USER",
            "grantee_name": "ALICE",
            "granted_by": "SECURITYADMIN",
            "grant_option": "false"
        })],
    );
    let client = fake.client();

    let grants = client
        .grants()
        .show(&ShowGrantsOptions::of(ShowGrantsOf::Role(AccountObjectIdentifier::new("ANALYST"))))
        .await
        .unwrap();

    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0].role, "ANALYST");
    assert_eq!(grants[0].grantee_name, "ALICE");
    assert!(!grants[0].grant_option);
    assert_eq!(fake.executed_sql(), vec![r#"SHOW GRANTS OF ROLE "ANALYST""#]);
}

#[tokio::test]
async fn user_parameters_are_filtered_by_like() {
    let fake = FakeExecutor::new();
    fake.respond(
        "SHOW PARAMETERS",
        vec![json!({
            "key": "TIMEZONE",
            "value": "UTC",
            "default": "America/Los_Angeles",
            "level": "USER",
            "description": "time zone",
            "type": "STRING"
        })],
    );
    let client = fake.client();

    let params = client
        .users()
        .show_parameters(&ShowUserParametersOptions::new(AccountObjectIdentifier::new("u")).with_like("TIME%"))
        .await
        .unwrap();

    assert_eq!(params[0].key, "TIMEZONE");
    assert_eq!(params[0].parameter_type, "STRING");
    assert_eq!(fake.executed_sql(), vec![r#"SHOW PARAMETERS LIKE 'TIME%' IN USER "u""#]);
}
