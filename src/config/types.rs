//! Provider configuration types (JSON file or `SNOWFLAKE_*` environment).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProviderConfig {
    pub account: Option<String>,
    pub user: Option<String>,
    pub role: Option<String>,
    pub warehouse: Option<String>,
    /// PEM private key for key-pair auth against the SQL API; used when `account` is set.
    pub private_key: Option<String>,
    pub public_key_fingerprint: Option<String>,
    /// Overrides the account's SQL API endpoint.
    pub api_url: Option<String>,
    /// Connection string for the pooled driver; used when no `account` is set.
    pub database_url: String,
    pub max_connections: u32,
    /// Upper bound for one statement round trip; unset means no bound.
    pub statement_timeout_secs: Option<u64>,
    /// Names of preview resources and data sources the user opted into.
    pub preview_features_enabled: Vec<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            account: None,
            user: None,
            role: None,
            warehouse: None,
            private_key: None,
            public_key_fingerprint: None,
            api_url: None,
            database_url: String::new(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            statement_timeout_secs: None,
            preview_features_enabled: Vec::new(),
        }
    }
}

impl ProviderConfig {
    /// Statements go to the SQL API when an account is configured.
    pub fn uses_sql_api(&self) -> bool {
        self.account.is_some()
    }

    pub fn statement_timeout(&self) -> Option<Duration> {
        self.statement_timeout_secs.map(Duration::from_secs)
    }

    pub fn is_preview_feature_enabled(&self, feature: PreviewFeature) -> bool {
        self.preview_features_enabled
            .iter()
            .any(|f| f.eq_ignore_ascii_case(feature.as_str()))
    }
}

/// Resources and data sources that must be opted into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PreviewFeature {
    FileFormatsDatasource,
    NetworkRuleResource,
    PasswordPolicyResource,
}

impl PreviewFeature {
    pub const ALL: [PreviewFeature; 3] = [
        PreviewFeature::FileFormatsDatasource,
        PreviewFeature::NetworkRuleResource,
        PreviewFeature::PasswordPolicyResource,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PreviewFeature::FileFormatsDatasource => "snowflake_file_formats_datasource",
            PreviewFeature::NetworkRuleResource => "snowflake_network_rule_resource",
            PreviewFeature::PasswordPolicyResource => "snowflake_password_policy_resource",
        }
    }
}

impl fmt::Display for PreviewFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PreviewFeature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PreviewFeature::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| s.to_string())
    }
}
