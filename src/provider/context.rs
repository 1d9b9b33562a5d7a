//! Shared state handed to every resource and data source operation.

use crate::config::{PreviewFeature, ProviderConfig};
use crate::error::ProviderError;
use crate::sdk::{Client, Executor, PgExecutor, SqlApiCredentials, SqlApiExecutor};
use std::sync::Arc;

#[derive(Clone)]
pub struct ProviderContext {
    pub client: Client,
    pub config: Arc<ProviderConfig>,
}

impl ProviderContext {
    pub fn new(client: Client, config: ProviderConfig) -> Self {
        Self {
            client,
            config: Arc::new(config),
        }
    }

    /// Build the executor described by `config`: the SQL API when an account is set, the pool otherwise.
    pub async fn connect(config: ProviderConfig) -> Result<Self, ProviderError> {
        crate::config::validate(&config)?;
        let executor: Arc<dyn Executor> = if config.uses_sql_api() {
            let mut executor = SqlApiExecutor::new(sql_api_credentials(&config))?;
            if let Some(timeout) = config.statement_timeout() {
                executor = executor.with_statement_timeout(timeout);
            }
            tracing::info!(account = ?config.account, "using the SQL API executor");
            Arc::new(executor)
        } else {
            Arc::new(PgExecutor::connect(&config.database_url, config.max_connections).await?)
        };
        let mut client = Client::new(executor);
        if let Some(timeout) = config.statement_timeout() {
            client = client.with_statement_timeout(timeout);
        }
        Ok(Self::new(client, config))
    }

    pub fn ensure_preview_feature(&self, feature: PreviewFeature) -> Result<(), ProviderError> {
        if self.config.is_preview_feature_enabled(feature) {
            Ok(())
        } else {
            Err(ProviderError::PreviewFeatureDisabled {
                feature: feature.to_string(),
            })
        }
    }
}

fn sql_api_credentials(config: &ProviderConfig) -> SqlApiCredentials {
    SqlApiCredentials {
        account: config.account.clone().unwrap_or_default(),
        user: config.user.clone().unwrap_or_default(),
        role: config.role.clone(),
        warehouse: config.warehouse.clone(),
        private_key: config.private_key.clone().unwrap_or_default(),
        public_key_fingerprint: config.public_key_fingerprint.clone().unwrap_or_default(),
        url: config.api_url.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[tokio::test]
    async fn account_config_connects_through_the_sql_api_without_a_database_url() {
        let config = ProviderConfig {
            account: Some("xy12345".into()),
            user: Some("deployer".into()),
            role: Some("SYSADMIN".into()),
            private_key: Some("pem".into()),
            public_key_fingerprint: Some("SHA256:abc".into()),
            api_url: Some("http://127.0.0.1:9/api/v2/statements".into()),
            ..ProviderConfig::default()
        };

        let ctx = ProviderContext::connect(config).await.unwrap();

        assert!(ctx.config.uses_sql_api());
        let credentials = sql_api_credentials(&ctx.config);
        assert_eq!(credentials.account, "xy12345");
        assert_eq!(credentials.role.as_deref(), Some("SYSADMIN"));
        assert_eq!(credentials.url.as_deref(), Some("http://127.0.0.1:9/api/v2/statements"));
    }

    #[tokio::test]
    async fn config_without_account_or_url_is_rejected() {
        let err = ProviderContext::connect(ProviderConfig::default()).await.err();
        assert!(matches!(
            err,
            Some(ProviderError::Config(ConfigError::Missing("account or database_url")))
        ));
    }
}
