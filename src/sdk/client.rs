//! Client: runs option structs through validate, serialize, execute and decode.

use crate::collections::find_first;
use crate::error::SdkError;
use crate::sdk::common::{DropOptions, In, ObjectOperation, ObjectType, ShowOptions};
use crate::sdk::ddl::ToSql;
use crate::sdk::executor::{Executor, Row};
use crate::sdk::identifier::{ObjectIdentifier, SchemaObjectIdentifier};
use crate::sdk::file_formats::FileFormats;
use crate::sdk::grants::Grants;
use crate::sdk::network_rules::NetworkRules;
use crate::sdk::password_policies::PasswordPolicies;
use crate::sdk::session_policies::SessionPolicies;
use crate::sdk::users::Users;
use crate::sdk::validation::Validate;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct Client {
    executor: Arc<dyn Executor>,
    statement_timeout: Option<Duration>,
}

impl Client {
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self {
            executor,
            statement_timeout: None,
        }
    }

    /// Bound every round trip; an expired call fails with [`SdkError::Timeout`].
    pub fn with_statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout = Some(timeout);
        self
    }

    pub fn password_policies(&self) -> PasswordPolicies<'_> {
        PasswordPolicies::new(self)
    }

    pub fn session_policies(&self) -> SessionPolicies<'_> {
        SessionPolicies::new(self)
    }

    pub fn network_rules(&self) -> NetworkRules<'_> {
        NetworkRules::new(self)
    }

    pub fn file_formats(&self) -> FileFormats<'_> {
        FileFormats::new(self)
    }

    pub fn users(&self) -> Users<'_> {
        Users::new(self)
    }

    pub fn grants(&self) -> Grants<'_> {
        Grants::new(self)
    }

    /// Run raw SQL.
    pub async fn exec(&self, sql: &str) -> Result<u64, SdkError> {
        self.bounded(self.executor.exec(sql)).await
    }

    /// Run raw SQL and decode each row into `R` by column name.
    pub async fn query<R: DeserializeOwned>(&self, sql: &str) -> Result<Vec<R>, SdkError> {
        let rows = self.bounded(self.executor.query(sql)).await?;
        decode_rows(rows)
    }

    /// Validate, render and execute one option struct.
    pub(crate) async fn run<O>(&self, opts: &O) -> Result<(), SdkError>
    where
        O: Validate + ToSql + ?Sized,
    {
        opts.validate()?;
        let sql = opts.to_sql()?;
        self.exec(&sql).await?;
        Ok(())
    }

    /// Validate, render and query one option struct.
    pub(crate) async fn fetch<O, R>(&self, opts: &O) -> Result<Vec<R>, SdkError>
    where
        O: Validate + ToSql + ?Sized,
        R: DeserializeOwned,
    {
        opts.validate()?;
        let sql = opts.to_sql()?;
        self.query(&sql).await
    }

    /// `DROP <type> IF EXISTS <id>`, where an already missing parent also counts as dropped.
    pub(crate) async fn drop_safely<I: ObjectIdentifier>(&self, object_type: ObjectType, id: &I) -> Result<(), SdkError> {
        let opts = DropOptions::new(id.clone()).with_if_exists(true);
        ignore_object_not_exist(self.run(&ObjectOperation::new(object_type, &opts)).await)
    }

    /// SHOW filtered by `LIKE '<name>' IN SCHEMA <db>.<schema>`, then an exact scan on the identifier.
    pub(crate) async fn show_by_schema_id<R, F>(
        &self,
        object_type: ObjectType,
        id: &SchemaObjectIdentifier,
        id_of: F,
    ) -> Result<R, SdkError>
    where
        R: DeserializeOwned,
        F: Fn(&R) -> SchemaObjectIdentifier,
    {
        let opts = ShowOptions::new()
            .with_like(id.name())
            .with_in(In::Schema(id.schema_id()));
        let rows: Vec<R> = self.fetch(&ObjectOperation::new(object_type, &opts)).await?;
        find_first(rows, |row| id_of(row) == *id)
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, SdkError>
    where
        F: Future<Output = Result<T, SdkError>>,
    {
        match self.statement_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| SdkError::Timeout(limit))?,
            None => call.await,
        }
    }
}

/// Decode rows by column name. Unknown columns are ignored and null cells
/// leave the field at its default.
pub fn decode_rows<R: DeserializeOwned>(rows: Vec<Row>) -> Result<Vec<R>, SdkError> {
    rows.into_iter()
        .map(|row| {
            let present = row.into_iter().filter(|(_, v)| !v.is_null()).collect();
            serde_json::from_value(Value::Object(present)).map_err(SdkError::from)
        })
        .collect()
}

/// Treat "object does not exist" from the platform as success.
pub fn ignore_object_not_exist(result: Result<(), SdkError>) -> Result<(), SdkError> {
    match result {
        Err(SdkError::ObjectNotExistOrAuthorized(message)) => {
            tracing::debug!(%message, "object already gone");
            Ok(())
        }
        other => other,
    }
}

/// Fold "does not exist" execution errors into the not-found sentinel.
pub fn not_exist_as_not_found<T>(result: Result<T, SdkError>) -> Result<T, SdkError> {
    match result {
        Err(SdkError::ObjectNotExistOrAuthorized(_)) => Err(SdkError::ObjectNotFound),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default)]
    struct Thing {
        name: String,
        comment: String,
        size: i64,
    }

    #[test]
    fn decode_tolerates_unknown_and_null_columns() {
        let row = json!({"name": "A", "comment": null, "size": 3, "owner": "SYSADMIN"});
        let Value::Object(row) = row else { unreachable!() };
        let things: Vec<Thing> = decode_rows(vec![row]).unwrap();
        assert_eq!(
            things,
            vec![Thing {
                name: "A".into(),
                comment: String::new(),
                size: 3
            }]
        );
    }

    #[test]
    fn not_exist_is_folded() {
        let err = not_exist_as_not_found::<()>(Err(SdkError::ObjectNotExistOrAuthorized("x".into()))).unwrap_err();
        assert!(matches!(err, SdkError::ObjectNotFound));
        assert!(ignore_object_not_exist(Err(SdkError::ObjectNotExistOrAuthorized("x".into()))).is_ok());
        assert!(ignore_object_not_exist(Err(SdkError::ObjectNotFound)).is_err());
    }
}
