//! Snowflake provider SDK: typed SQL command builders, a pooled client and
//! resource / data source shims on top of them.

pub mod collections;
pub mod config;
pub mod error;
pub mod provider;
pub mod sdk;
pub mod testkit;

pub use collections::find_first;
pub use config::{load_from_env, load_from_file, PreviewFeature, ProviderConfig};
pub use error::{ConfigError, ProviderError, SdkError};
pub use provider::{DataSource, Diagnostics, Provider, ProviderContext, Resource, ResourceData};
pub use sdk::{Client, Executor, PgExecutor, SqlApiExecutor};
