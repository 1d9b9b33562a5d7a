//! Config validation.

use crate::config::{PreviewFeature, ProviderConfig};
use crate::error::ConfigError;

pub fn validate(config: &ProviderConfig) -> Result<(), ConfigError> {
    if config.uses_sql_api() {
        let required = [
            ("account", &config.account),
            ("user", &config.user),
            ("private_key", &config.private_key),
            ("public_key_fingerprint", &config.public_key_fingerprint),
        ];
        for (key, value) in required {
            if value.as_deref().map_or(true, |v| v.trim().is_empty()) {
                return Err(ConfigError::Missing(key));
            }
        }
    } else if config.database_url.trim().is_empty() {
        return Err(ConfigError::Missing("account or database_url"));
    }
    if config.max_connections == 0 {
        return Err(ConfigError::Invalid {
            key: "max_connections",
            reason: "must be at least 1".into(),
        });
    }
    if config.statement_timeout_secs == Some(0) {
        return Err(ConfigError::Invalid {
            key: "statement_timeout_secs",
            reason: "must be positive when set".into(),
        });
    }
    for name in &config.preview_features_enabled {
        name.parse::<PreviewFeature>()
            .map_err(ConfigError::UnknownPreviewFeature)?;
    }
    Ok(())
}
