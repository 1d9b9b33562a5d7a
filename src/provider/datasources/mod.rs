//! Read-only data sources.

mod file_formats;
mod grants;
mod users;

pub use file_formats::FileFormatsDataSource;
pub use grants::GrantsDataSource;
pub use users::UsersDataSource;
