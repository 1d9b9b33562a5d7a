//! [`Executor`] over the platform's SQL API (`/api/v2/statements`) with key-pair JWT auth.

use crate::error::SdkError;
use crate::sdk::executor::{is_object_not_exist, Executor, Row};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

const AUTH_HEADER: &str = "Authorization";
const ACCEPT_HEADER: &str = "Accept";
const TOKEN_TYPE_HEADER: &str = "X-Snowflake-Authorization-Token-Type";
const USER_AGENT: &str = "snowflake-provider-sdk";

/// Code the SQL API returns while a statement is still running.
const STILL_RUNNING: &str = "333334";

/// Key-pair credentials and session defaults for the SQL API.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SqlApiCredentials {
    pub account: String,
    pub user: String,
    pub role: Option<String>,
    pub warehouse: Option<String>,
    /// PKCS#8 PEM of the user's RSA private key.
    pub private_key: String,
    /// `SHA256:...` fingerprint of the registered public key.
    pub public_key_fingerprint: String,
    /// Overrides `https://<account>.snowflakecomputing.com/api/v2/statements`.
    pub url: Option<String>,
}

impl SqlApiCredentials {
    fn validate(&self) -> Result<(), SdkError> {
        let missing = [
            ("account", self.account.is_empty()),
            ("user", self.user.is_empty()),
            ("private_key", self.private_key.is_empty()),
            ("public_key_fingerprint", self.public_key_fingerprint.is_empty()),
        ]
        .into_iter()
        .filter(|(_, empty)| *empty)
        .map(|(name, _)| name)
        .collect::<Vec<_>>();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(SdkError::Api {
                code: String::new(),
                message: format!("missing SQL API credentials: {}", missing.join(", ")),
            })
        }
    }
}

#[cfg_attr(test, allow(dead_code))]
#[derive(Debug, Serialize, Deserialize)]
struct JwtClaims {
    exp: usize,
    iat: usize,
    iss: String,
    sub: String,
}

#[derive(Serialize)]
struct StatementRequest<'a> {
    statement: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warehouse: Option<&'a str>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct StatementResponse {
    code: String,
    message: String,
    statement_handle: String,
    result_set_meta_data: Option<ResultSetMetaData>,
    data: Vec<Vec<Option<String>>>,
    stats: Option<Stats>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ResultSetMetaData {
    row_type: Vec<Column>,
    partition_info: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Column {
    name: String,
    #[serde(rename = "type")]
    column_type: String,
    scale: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Stats {
    num_rows_inserted: u64,
    num_rows_updated: u64,
    num_rows_deleted: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Partition {
    data: Vec<Vec<Option<String>>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorBody {
    code: String,
    message: String,
}

/// Sends each statement as one SQL API request and maps the typed text cells back to JSON.
#[derive(Clone)]
pub struct SqlApiExecutor {
    credentials: SqlApiCredentials,
    statement_timeout: Option<Duration>,
    http: reqwest::Client,
}

impl SqlApiExecutor {
    pub fn new(credentials: SqlApiCredentials) -> Result<Self, SdkError> {
        credentials.validate()?;
        Ok(Self {
            credentials,
            statement_timeout: None,
            http: reqwest::Client::new(),
        })
    }

    /// Server-side limit sent with every statement.
    pub fn with_statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout = Some(timeout);
        self
    }

    fn url(&self) -> String {
        self.credentials.url.clone().unwrap_or_else(|| {
            format!(
                "https://{}.snowflakecomputing.com/api/v2/statements",
                self.credentials.account
            )
        })
    }

    #[cfg(not(test))]
    fn token(&self) -> Result<String, SdkError> {
        use jsonwebtoken::{encode, get_current_timestamp, Algorithm, EncodingKey, Header};

        let qualified_user = format!(
            "{}.{}",
            self.credentials.account.to_uppercase(),
            self.credentials.user.to_uppercase()
        );
        let now = get_current_timestamp();
        let claims = JwtClaims {
            exp: (now + 3600) as usize,
            iat: now as usize,
            iss: format!("{}.{}", qualified_user, self.credentials.public_key_fingerprint),
            sub: qualified_user,
        };
        let key = EncodingKey::from_rsa_pem(self.credentials.private_key.as_bytes())?;
        Ok(encode(&Header::new(Algorithm::RS256), &claims, &key)?)
    }

    #[cfg(test)]
    fn token(&self) -> Result<String, SdkError> {
        Ok("FAKE_JWT".to_owned())
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder, SdkError> {
        Ok(builder
            .header(AUTH_HEADER, format!("Bearer {}", self.token()?))
            .header(ACCEPT_HEADER, "application/json")
            .header(TOKEN_TYPE_HEADER, "KEYPAIR_JWT")
            .header(reqwest::header::USER_AGENT, USER_AGENT))
    }

    async fn submit(&self, sql: &str) -> Result<StatementResponse, SdkError> {
        let body = StatementRequest {
            statement: sql,
            timeout: self.statement_timeout.map(|t| t.as_secs().max(1)),
            role: self.credentials.role.as_deref(),
            warehouse: self.credentials.warehouse.as_deref(),
        };
        let response = self.request(self.http.post(self.url()).json(&body))?.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(api_error(&text));
        }
        let parsed: StatementResponse = serde_json::from_str(&text)?;
        if status == reqwest::StatusCode::ACCEPTED || parsed.code == STILL_RUNNING {
            return Err(SdkError::Api {
                code: STILL_RUNNING.to_string(),
                message: format!("statement {} is still running", parsed.statement_handle),
            });
        }
        Ok(parsed)
    }

    /// Data of partition `index` (> 0) of a multi-partition result.
    async fn partition(&self, handle: &str, index: usize) -> Result<Vec<Vec<Option<String>>>, SdkError> {
        let url = format!("{}/{}", self.url(), handle);
        let response = self
            .request(self.http.get(url).query(&[("partition", index)]))?
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(api_error(&text));
        }
        Ok(serde_json::from_str::<Partition>(&text)?.data)
    }
}

#[async_trait]
impl Executor for SqlApiExecutor {
    async fn exec(&self, sql: &str) -> Result<u64, SdkError> {
        tracing::debug!(sql = %sql, "exec");
        let response = self.submit(sql).await?;
        Ok(response
            .stats
            .map(|s| s.num_rows_inserted + s.num_rows_updated + s.num_rows_deleted)
            .unwrap_or(0))
    }

    async fn query(&self, sql: &str) -> Result<Vec<Row>, SdkError> {
        tracing::debug!(sql = %sql, "query");
        let response = self.submit(sql).await?;
        let meta = response.result_set_meta_data.unwrap_or_default();
        let mut data = response.data;
        for index in 1..meta.partition_info.len() {
            data.extend(self.partition(&response.statement_handle, index).await?);
        }
        Ok(data.into_iter().map(|cells| to_row(&meta.row_type, cells)).collect())
    }
}

fn api_error(body: &str) -> SdkError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_else(|_| ErrorBody {
        message: body.to_string(),
        ..ErrorBody::default()
    });
    if is_object_not_exist(Some(&parsed.code), &parsed.message) {
        SdkError::ObjectNotExistOrAuthorized(parsed.message)
    } else {
        SdkError::Api {
            code: parsed.code,
            message: parsed.message,
        }
    }
}

fn to_row(columns: &[Column], cells: Vec<Option<String>>) -> Row {
    columns
        .iter()
        .zip(cells)
        .map(|(column, cell)| {
            let value = cell.map_or(Value::Null, |text| cell_to_value(column, text));
            (column.name.clone(), value)
        })
        .collect::<Map<String, Value>>()
}

/// The SQL API sends every cell as text; `rowType` says how to read it.
fn cell_to_value(column: &Column, text: String) -> Value {
    match column.column_type.as_str() {
        "fixed" if column.scale.unwrap_or(0) == 0 => text
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or(Value::String(text)),
        "fixed" | "real" => text
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::String(text)),
        "boolean" => Value::Bool(text.eq_ignore_ascii_case("true")),
        "timestamp_ltz" | "timestamp_ntz" | "timestamp_tz" => {
            epoch_timestamp(&text).map_or(Value::String(text), |t| Value::String(t.to_rfc3339()))
        }
        "date" => text
            .parse::<i64>()
            .ok()
            .and_then(|days| NaiveDate::from_ymd_opt(1970, 1, 1)?.checked_add_signed(chrono::Duration::days(days)))
            .map_or(Value::String(text), |d| Value::String(d.to_string())),
        _ => Value::String(text),
    }
}

/// `seconds.fraction` with an optional trailing timezone offset.
fn epoch_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let seconds = text.split_whitespace().next()?;
    let (whole, fraction) = seconds.split_once('.').unwrap_or((seconds, "0"));
    let secs: i64 = whole.parse().ok()?;
    let nanos: u32 = format!("{:0<9}", fraction).get(..9)?.parse().ok()?;
    DateTime::from_timestamp(secs, nanos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credentials(server: &MockServer) -> SqlApiCredentials {
        SqlApiCredentials {
            account: "my_account".into(),
            user: "user".into(),
            role: Some("SYSADMIN".into()),
            warehouse: Some("WH".into()),
            private_key: "private_key".into(),
            public_key_fingerprint: "SHA256:fp".into(),
            url: Some(format!("{}/api/v2/statements", server.uri())),
        }
    }

    #[test]
    fn empty_credentials_are_rejected() {
        let err = SqlApiExecutor::new(SqlApiCredentials::default()).err();
        match err {
            Some(SdkError::Api { message, .. }) => {
                assert!(message.contains("account, user, private_key, public_key_fingerprint"))
            }
            other => panic!("unexpected {:?}", other.map(|e| e.to_string())),
        }
    }

    #[test]
    fn default_url_uses_the_account_locator() {
        let executor = SqlApiExecutor::new(SqlApiCredentials {
            url: None,
            account: "xy12345".into(),
            user: "u".into(),
            private_key: "k".into(),
            public_key_fingerprint: "fp".into(),
            ..SqlApiCredentials::default()
        })
        .unwrap();
        assert_eq!(executor.url(), "https://xy12345.snowflakecomputing.com/api/v2/statements");
    }

    #[test]
    fn cells_follow_the_row_type() {
        let column = |t: &str, scale: Option<i64>| Column {
            name: "c".into(),
            column_type: t.into(),
            scale,
        };
        assert_eq!(cell_to_value(&column("fixed", Some(0)), "42".into()), json!(42));
        assert_eq!(cell_to_value(&column("fixed", Some(2)), "1.50".into()), json!(1.5));
        assert_eq!(cell_to_value(&column("boolean", None), "false".into()), json!(false));
        assert_eq!(cell_to_value(&column("text", None), "x".into()), json!("x"));
        assert_eq!(cell_to_value(&column("date", None), "19000".into()), json!("2022-01-08"));
        assert_eq!(
            cell_to_value(&column("timestamp_ltz", Some(9)), "1700000000.500000000".into()),
            json!("2023-11-14T22:13:20.500+00:00")
        );
        assert_eq!(
            cell_to_value(&column("timestamp_tz", Some(9)), "1700000000.000000000 1440".into()),
            json!("2023-11-14T22:13:20+00:00")
        );
    }

    #[tokio::test]
    async fn query_zips_row_type_with_data() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/statements"))
            .and(header("Authorization", "Bearer FAKE_JWT"))
            .and(header("X-Snowflake-Authorization-Token-Type", "KEYPAIR_JWT"))
            .and(body_partial_json(json!({
                "statement": "SHOW NETWORK RULES",
                "role": "SYSADMIN",
                "warehouse": "WH"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": "090001",
                "statementHandle": "h1",
                "resultSetMetaData": {
                    "rowType": [
                        {"name": "name", "type": "text"},
                        {"name": "entries_in_valuelist", "type": "fixed", "scale": 0},
                        {"name": "comment", "type": "text"}
                    ],
                    "partitionInfo": [{"rowCount": 1}]
                },
                "data": [["R", "2", null]]
            })))
            .mount(&server)
            .await;

        let executor = SqlApiExecutor::new(credentials(&server)).unwrap();
        let rows = executor.query("SHOW NETWORK RULES").await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], "R");
        assert_eq!(rows[0]["entries_in_valuelist"], 2);
        assert_eq!(rows[0]["comment"], Value::Null);
    }

    #[tokio::test]
    async fn later_partitions_are_fetched_by_handle() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/statements"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "statementHandle": "h2",
                "resultSetMetaData": {
                    "rowType": [{"name": "name", "type": "text"}],
                    "partitionInfo": [{"rowCount": 1}, {"rowCount": 1}]
                },
                "data": [["A"]]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v2/statements/h2"))
            .and(query_param("partition", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [["B"]]})))
            .mount(&server)
            .await;

        let executor = SqlApiExecutor::new(credentials(&server)).unwrap();
        let names: Vec<Value> = executor
            .query("SHOW USERS")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r["name"].clone())
            .collect();

        assert_eq!(names, vec![json!("A"), json!("B")]);
    }

    #[tokio::test]
    async fn missing_object_errors_are_classified() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "code": "002003",
                "sqlState": "02000",
                "message": "SQL compilation error:\nSchema 'DB.SC' does not exist or not authorized."
            })))
            .mount(&server)
            .await;

        let executor = SqlApiExecutor::new(credentials(&server)).unwrap();
        let err = executor.exec("DROP NETWORK RULE \"DB\".\"SC\".\"R\"").await.unwrap_err();

        assert!(matches!(err, SdkError::ObjectNotExistOrAuthorized(_)));
    }

    #[tokio::test]
    async fn other_compilation_errors_stay_api_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "code": "000904",
                "message": "SQL compilation error: error line 1 at position 7\ninvalid identifier 'NOPE'"
            })))
            .mount(&server)
            .await;

        let executor = SqlApiExecutor::new(credentials(&server)).unwrap();
        let err = executor.query("SELECT NOPE").await.unwrap_err();

        match err {
            SdkError::Api { code, .. } => assert_eq!(code, "000904"),
            other => panic!("unexpected {}", other),
        }
    }

    #[tokio::test]
    async fn exec_reports_affected_rows_and_rejects_async_statements() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"statement": "DELETE FROM T", "timeout": 30})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": "090001",
                "stats": {"numRowsDeleted": 3},
                "data": [["3"]]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"statement": "CALL SLOW()"})))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({
                "code": "333334",
                "statementHandle": "h3"
            })))
            .mount(&server)
            .await;

        let executor = SqlApiExecutor::new(credentials(&server))
            .unwrap()
            .with_statement_timeout(Duration::from_secs(30));

        assert_eq!(executor.exec("DELETE FROM T").await.unwrap(), 3);
        match executor.exec("CALL SLOW()").await.unwrap_err() {
            SdkError::Api { code, message } => {
                assert_eq!(code, "333334");
                assert!(message.contains("h3"));
            }
            other => panic!("unexpected {}", other),
        }
    }
}
