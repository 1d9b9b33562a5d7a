//! `SHOW GRANTS` in its ON / TO / OF forms.

use crate::error::SdkError;
use crate::sdk::client::Client;
use crate::sdk::common::{flexible_bool, ObjectType};
use crate::sdk::ddl::{Statement, ToSql};
use crate::sdk::identifier::{AccountObjectIdentifier, AnyObjectIdentifier};
use crate::sdk::validation::{check_identifier, err_exactly_one_of, exactly_one_value_set, Validate, ValidationErrors};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShowGrantsOn {
    Account,
    Object {
        object_type: ObjectType,
        name: AnyObjectIdentifier,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShowGrantsTo {
    Role(AccountObjectIdentifier),
    User(AccountObjectIdentifier),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShowGrantsOf {
    Role(AccountObjectIdentifier),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShowGrantsOptions {
    pub on: Option<ShowGrantsOn>,
    pub to: Option<ShowGrantsTo>,
    pub of: Option<ShowGrantsOf>,
}

impl ShowGrantsOptions {
    pub fn on_account() -> Self {
        Self {
            on: Some(ShowGrantsOn::Account),
            ..Self::default()
        }
    }

    pub fn on_object(object_type: ObjectType, name: impl Into<AnyObjectIdentifier>) -> Self {
        Self {
            on: Some(ShowGrantsOn::Object {
                object_type,
                name: name.into(),
            }),
            ..Self::default()
        }
    }

    pub fn to(to: ShowGrantsTo) -> Self {
        Self {
            to: Some(to),
            ..Self::default()
        }
    }

    pub fn of(of: ShowGrantsOf) -> Self {
        Self {
            of: Some(of),
            ..Self::default()
        }
    }
}

impl ToSql for ShowGrantsOn {
    fn statement(&self) -> Statement {
        match self {
            ShowGrantsOn::Account => Statement::new().sql("ACCOUNT"),
            ShowGrantsOn::Object { object_type, name } => Statement::new().sql(object_type.keyword()).identifier(name),
        }
    }
}

impl ToSql for ShowGrantsTo {
    fn statement(&self) -> Statement {
        match self {
            ShowGrantsTo::Role(role) => Statement::new().sql("ROLE").identifier(role),
            ShowGrantsTo::User(user) => Statement::new().sql("USER").identifier(user),
        }
    }
}

impl ToSql for ShowGrantsOf {
    fn statement(&self) -> Statement {
        match self {
            ShowGrantsOf::Role(role) => Statement::new().sql("ROLE").identifier(role),
        }
    }
}

impl ToSql for ShowGrantsOptions {
    fn statement(&self) -> Statement {
        Statement::new()
            .sql("SHOW GRANTS")
            .nested(Some("ON"), self.on.as_ref())
            .nested(Some("TO"), self.to.as_ref())
            .nested(Some("OF"), self.of.as_ref())
    }
}

impl Validate for ShowGrantsOptions {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errs = ValidationErrors::new();
        if !exactly_one_value_set(&[self.on.is_some(), self.to.is_some(), self.of.is_some()]) {
            errs.push(err_exactly_one_of("ShowGrantsOptions", &["On", "To", "Of"]));
        }
        match &self.on {
            Some(ShowGrantsOn::Object { name, .. }) => check_identifier(&mut errs, name),
            Some(ShowGrantsOn::Account) | None => {}
        }
        match &self.to {
            Some(ShowGrantsTo::Role(id)) | Some(ShowGrantsTo::User(id)) => check_identifier(&mut errs, id),
            None => {}
        }
        if let Some(ShowGrantsOf::Role(id)) = &self.of {
            check_identifier(&mut errs, id);
        }
        errs.into_result()
    }
}

/// One row of `SHOW GRANTS`. `OF ROLE` rows fill `role` instead of `privilege` / `name`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Grant {
    pub created_on: Option<DateTime<Utc>>,
    pub privilege: String,
    pub granted_on: String,
    pub name: String,
    pub role: String,
    pub granted_to: String,
    pub grantee_name: String,
    #[serde(deserialize_with = "flexible_bool")]
    pub grant_option: bool,
    pub granted_by: String,
}

pub struct Grants<'a> {
    client: &'a Client,
}

impl<'a> Grants<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn show(&self, opts: &ShowGrantsOptions) -> Result<Vec<Grant>, SdkError> {
        self.client.fetch(opts).await
    }
}
