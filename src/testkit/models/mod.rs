//! Configuration models for the provider's data sources and resources.

mod file_formats;
mod grants;
mod network_rule;
mod users;

pub use file_formats::{FileFormatsModel, FILE_FORMATS};
pub use grants::{GrantsModel, GRANTS};
pub use network_rule::{NetworkRuleModel, NETWORK_RULE};
pub use users::{UsersModel, USERS};
