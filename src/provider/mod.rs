//! Resource and data source CRUD shims over the SDK client.
//!
//! [`Provider`] owns the registry and runs every operation the same way:
//! preview gate, schema defaults and validation, then the operation itself
//! inside a tracking span.

pub mod context;
pub mod data;
pub mod datasources;
pub mod diagnostics;
pub mod resources;
pub mod schema;

pub use context::ProviderContext;
pub use data::ResourceData;
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use schema::{Attribute, AttributeType, Schema};

use crate::config::PreviewFeature;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::Instrument;

#[async_trait]
pub trait Resource: Send + Sync {
    /// Type name used in configuration, e.g. `snowflake_network_rule`.
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    /// Feature that must be enabled before the resource can be used.
    fn preview_feature(&self) -> Option<PreviewFeature> {
        None
    }

    async fn create(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Diagnostics;

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Diagnostics;

    async fn update(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Diagnostics;

    async fn delete(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Diagnostics;
}

#[async_trait]
pub trait DataSource: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    fn preview_feature(&self) -> Option<PreviewFeature> {
        None
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Diagnostics;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
        })
    }
}

pub struct Provider {
    resources: BTreeMap<&'static str, Arc<dyn Resource>>,
    data_sources: BTreeMap<&'static str, Arc<dyn DataSource>>,
}

impl Default for Provider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider {
    /// Registry with every built-in resource and data source.
    pub fn new() -> Self {
        Self::empty()
            .with_resource(resources::PasswordPolicyResource)
            .with_resource(resources::NetworkRuleResource)
            .with_data_source(datasources::FileFormatsDataSource)
            .with_data_source(datasources::UsersDataSource)
            .with_data_source(datasources::GrantsDataSource)
    }

    pub fn empty() -> Self {
        Self {
            resources: BTreeMap::new(),
            data_sources: BTreeMap::new(),
        }
    }

    pub fn with_resource(mut self, resource: impl Resource + 'static) -> Self {
        self.resources.insert(resource.type_name(), Arc::new(resource));
        self
    }

    pub fn with_data_source(mut self, data_source: impl DataSource + 'static) -> Self {
        self.data_sources.insert(data_source.type_name(), Arc::new(data_source));
        self
    }

    pub fn resource_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.resources.keys().copied()
    }

    pub fn data_source_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.data_sources.keys().copied()
    }

    pub fn resource(&self, type_name: &str) -> Option<Arc<dyn Resource>> {
        self.resources.get(type_name).cloned()
    }

    pub fn data_source(&self, type_name: &str) -> Option<Arc<dyn DataSource>> {
        self.data_sources.get(type_name).cloned()
    }

    pub async fn create(&self, ctx: &ProviderContext, type_name: &str, data: &mut ResourceData) -> Diagnostics {
        self.apply(ctx, type_name, Operation::Create, data).await
    }

    pub async fn read(&self, ctx: &ProviderContext, type_name: &str, data: &mut ResourceData) -> Diagnostics {
        self.apply(ctx, type_name, Operation::Read, data).await
    }

    /// Changes to force-new attributes replace the object: delete, then create.
    pub async fn update(&self, ctx: &ProviderContext, type_name: &str, data: &mut ResourceData) -> Diagnostics {
        let Some(resource) = self.resources.get(type_name) else {
            return unknown("resource", type_name);
        };
        let replace = resource
            .schema()
            .force_new_attributes()
            .into_iter()
            .any(|key| data.has_change(key));
        if !replace {
            return self.apply(ctx, type_name, Operation::Update, data).await;
        }
        let mut diags = self.apply(ctx, type_name, Operation::Delete, data).await;
        if diags.has_errors() {
            return diags;
        }
        diags.extend(self.apply(ctx, type_name, Operation::Create, data).await);
        diags
    }

    pub async fn delete(&self, ctx: &ProviderContext, type_name: &str, data: &mut ResourceData) -> Diagnostics {
        self.apply(ctx, type_name, Operation::Delete, data).await
    }

    pub async fn read_data_source(
        &self,
        ctx: &ProviderContext,
        type_name: &str,
        data: &mut ResourceData,
    ) -> Diagnostics {
        let Some(data_source) = self.data_sources.get(type_name) else {
            return unknown("data source", type_name);
        };
        if let Err(e) = gate(ctx, data_source.preview_feature()) {
            return e;
        }
        let schema = data_source.schema();
        schema.apply_defaults(data.values_mut());
        if let Err(e) = schema.validate(data.values()) {
            return e.into();
        }
        let span = tracing::info_span!("data_source", type_name = type_name, operation = %Operation::Read);
        async {
            let diags = data_source.read(ctx, data).await;
            track(&diags);
            diags
        }
        .instrument(span)
        .await
    }

    async fn apply(
        &self,
        ctx: &ProviderContext,
        type_name: &str,
        op: Operation,
        data: &mut ResourceData,
    ) -> Diagnostics {
        let Some(resource) = self.resources.get(type_name) else {
            return unknown("resource", type_name);
        };
        if let Err(e) = gate(ctx, resource.preview_feature()) {
            return e;
        }
        if matches!(op, Operation::Create | Operation::Update) {
            let schema = resource.schema();
            schema.apply_defaults(data.values_mut());
            if let Err(e) = schema.validate(data.values()) {
                return e.into();
            }
        }
        let span = tracing::info_span!("resource", type_name = type_name, operation = %op, id = %data.id());
        async {
            let diags = match op {
                Operation::Create => resource.create(ctx, data).await,
                Operation::Read => resource.read(ctx, data).await,
                Operation::Update => resource.update(ctx, data).await,
                Operation::Delete => resource.delete(ctx, data).await,
            };
            track(&diags);
            diags
        }
        .instrument(span)
        .await
    }
}

fn gate(ctx: &ProviderContext, feature: Option<PreviewFeature>) -> Result<(), Diagnostics> {
    match feature {
        Some(f) => ctx.ensure_preview_feature(f).map_err(Diagnostics::from),
        None => Ok(()),
    }
}

fn track(diags: &Diagnostics) {
    if diags.has_errors() {
        tracing::warn!(errors = diags.errors().count(), "operation failed");
    } else {
        tracing::info!("operation done");
    }
}

fn unknown(kind: &str, type_name: &str) -> Diagnostics {
    Diagnostics::error(format!("unknown {} type {}", kind, type_name), "")
}
