#[path = "support/fake_executor.rs"]
mod fake_executor;

use fake_executor::FakeExecutor;
use serde_json::json;
use snowflake_provider_sdk::sdk::SchemaObjectIdentifier;
use snowflake_provider_sdk::testkit::helpers::NetworkRuleHelper;
use snowflake_provider_sdk::testkit::IdsGenerator;

#[tokio::test]
async fn network_rule_helper_creates_reads_back_and_drops() {
    let fake = FakeExecutor::new();
    fake.respond(
        "SHOW NETWORK RULES",
        vec![json!({
            "name": "RULE",
            "database_name": "DB",
            "schema_name": "SC",
            "type": "HOST_PORT",
            "mode": "EGRESS"
        })],
    );
    let helper = NetworkRuleHelper::new(fake.client(), IdsGenerator::new("DB", "SC"));
    let id = SchemaObjectIdentifier::new("DB", "SC", "RULE");

    let rule = helper.create_egress_with_identifier(id.clone()).await.unwrap();
    assert_eq!(rule.id(), id);
    assert_eq!(rule.rule_type, "HOST_PORT");

    helper.drop(&id).await.unwrap();
    assert_eq!(
        fake.executed_sql(),
        vec![
            r#"CREATE NETWORK RULE "DB"."SC"."RULE" TYPE = HOST_PORT VALUE_LIST = () MODE = EGRESS"#,
            r#"SHOW NETWORK RULES LIKE 'RULE' IN SCHEMA "DB"."SC""#,
            r#"DROP NETWORK RULE IF EXISTS "DB"."SC"."RULE""#,
        ]
    );
}

#[tokio::test]
async fn random_rule_without_a_matching_row_is_not_found() {
    let fake = FakeExecutor::new();
    let helper = NetworkRuleHelper::new(fake.client(), IdsGenerator::new("DB", "SC").with_suffix("_T"));

    let err = helper.create_ingress().await.unwrap_err();

    assert!(err.is_not_found());
    let sql = fake.executed_sql();
    assert!(sql[0].starts_with(r#"CREATE NETWORK RULE "DB"."SC"."#));
    assert!(sql[0].ends_with("TYPE = IPV4 VALUE_LIST = () MODE = INGRESS"));
}
