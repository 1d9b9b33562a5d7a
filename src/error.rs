//! Typed errors for the SDK, configuration and provider layers.

use crate::sdk::{SerializationError, ValidationErrors};
use thiserror::Error;

/// Message fragment the platform uses when an object is missing or hidden from the current role.
pub const OBJECT_NOT_EXIST_OR_AUTHORIZED: &str = "does not exist or not authorized";

#[derive(Error, Debug)]
pub enum SdkError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Serialization(#[from] SerializationError),
    /// Raised by the platform for a statement that targets a missing object.
    #[error("object does not exist or not authorized: {0}")]
    ObjectNotExistOrAuthorized(String),
    /// A "show by identifier" scan matched no row.
    #[error("object not found")]
    ObjectNotFound,
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    /// Non-success response from the SQL API.
    #[error("sql api error {code}: {message}")]
    Api { code: String, message: String },
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("key-pair auth: {0}")]
    Auth(#[from] jsonwebtoken::errors::Error),
    #[error("decode: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("statement timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl SdkError {
    /// True for both the not-found sentinel and the platform's "does not exist" execution error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SdkError::ObjectNotFound | SdkError::ObjectNotExistOrAuthorized(_))
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing setting: {0}")]
    Missing(&'static str),
    #[error("invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
    #[error("unknown preview feature: {0}")]
    UnknownPreviewFeature(String),
    #[error("config load: {0}")]
    Load(String),
}

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error(transparent)]
    Sdk(#[from] SdkError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("attribute {key}: {reason}")]
    Attribute { key: String, reason: String },
    #[error("{feature} is currently a preview feature; enable it in preview_features_enabled to use it")]
    PreviewFeatureDisabled { feature: String },
}
