//! Test support: configuration models and their text renderer, random
//! identifiers and helpers that manage test objects.

pub mod config;
pub mod helpers;
pub mod ids;
pub mod models;
pub mod random;

pub use config::{from_models, Model, ModelKind, ModelMeta, Variable};
pub use ids::IdsGenerator;
