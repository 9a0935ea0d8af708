//! Seedbed Core
//!
//! Turns declarative entity definitions into a live, named object graph
//! for tests:
//! - Definition Model produced by script evaluators
//! - Entity type table and property assignment
//! - Entity registry with typed lookup
//! - Recursive builder with ordered creation notifications

mod config;
mod definition;
mod entity;
mod error;
mod script;
mod value;

pub mod engine;

pub use config::{read_config, BuilderConfig, ConfigError};
pub use definition::{EntityDefinition, Literal, PropertyValue};
pub use engine::{
    BuildEvent, BuildMetrics, BuildReport, DuplicateNameError, EntityBuilder,
    EntityCreatedListener, EntityKey, EntityRegistry, LookupError, Phase,
};
pub use entity::{
    Entity, EntityType, EntityTypes, Instance, InstantiationError, IntoAny, PropertyError,
    TypeRegistrationError,
};
pub use error::{EntityBuildingError, ScriptError};
pub use script::{InMemoryScripts, ScriptEvaluator};
pub use value::{EntityRef, FromValue, Value, ValueError};

pub use chrono;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
