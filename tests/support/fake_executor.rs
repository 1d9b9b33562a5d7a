use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use snowflake_provider_sdk::error::SdkError;
use snowflake_provider_sdk::sdk::{Client, Executor, Row};

#[derive(Debug, Clone)]
enum Reply {
    Rows(Vec<Row>),
    NotExist(String),
}

#[derive(Debug, Clone)]
struct Rule {
    prefix: String,
    reply: Reply,
}

#[derive(Debug, Default)]
struct FakeExecutorState {
    executed_sql: Vec<String>,
    rules: Vec<Rule>,
    delay: Option<Duration>,
}

/// Records every statement; replies come from the most recently added rule
/// whose prefix matches, and default to no rows.
#[derive(Debug, Default, Clone)]
pub struct FakeExecutor {
    state: Arc<Mutex<FakeExecutorState>>,
}

#[allow(dead_code)]
impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn client(&self) -> Client {
        Client::new(Arc::new(self.clone()))
    }

    pub fn respond(&self, prefix: impl Into<String>, rows: Vec<Value>) {
        let rows = rows
            .into_iter()
            .map(|v| match v {
                Value::Object(map) => map,
                other => panic!("row must be an object: {}", other),
            })
            .collect();
        self.push(prefix.into(), Reply::Rows(rows));
    }

    pub fn fail_not_exist(&self, prefix: impl Into<String>) {
        let prefix = prefix.into();
        let message = format!("SQL compilation error: Object '{}' does not exist or not authorized.", prefix);
        self.push(prefix, Reply::NotExist(message));
    }

    pub fn set_delay(&self, delay: Duration) {
        self.state.lock().unwrap().delay = Some(delay);
    }

    pub fn executed_sql(&self) -> Vec<String> {
        self.state.lock().unwrap().executed_sql.clone()
    }

    pub fn clear(&self) {
        self.state.lock().unwrap().executed_sql.clear();
    }

    fn push(&self, prefix: String, reply: Reply) {
        self.state.lock().unwrap().rules.push(Rule { prefix, reply });
    }

    async fn run(&self, sql: &str) -> Result<Vec<Row>, SdkError> {
        let (reply, delay) = {
            let mut state = self.state.lock().unwrap();
            state.executed_sql.push(sql.to_string());
            let reply = state
                .rules
                .iter()
                .rev()
                .find(|r| sql.starts_with(&r.prefix))
                .map(|r| r.reply.clone());
            (reply, state.delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match reply {
            Some(Reply::Rows(rows)) => Ok(rows),
            Some(Reply::NotExist(message)) => Err(SdkError::ObjectNotExistOrAuthorized(message)),
            None => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl Executor for FakeExecutor {
    async fn exec(&self, sql: &str) -> Result<u64, SdkError> {
        self.run(sql).await.map(|rows| rows.len() as u64)
    }

    async fn query(&self, sql: &str) -> Result<Vec<Row>, SdkError> {
        self.run(sql).await
    }
}
