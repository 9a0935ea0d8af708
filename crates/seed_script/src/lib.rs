//! Seedbed Scripting
//!
//! Entity definition scripts in JavaScript, executed by QuickJS.
//!
//! ## Architecture
//!
//! - **Loader:** resource names resolve against a script root
//! - **Runtime:** fresh QuickJS context per script, DSL prelude installed
//! - **Export:** definitions cross the boundary as JSON and are decoded into
//!   the `seed_core` Definition Model
//!
//! ```ignore
//! let mut types = EntityTypes::new();
//! types.register::<BasicTestEntity>()?;
//!
//! let mut builder = seed_script::entity_builder(SeedConfig::load("seed.json")?, types);
//! builder.build_entities("testEntityDefinitions")?;
//! let entity = builder.entity_by_name::<BasicTestEntity>("basicEntity")?;
//! ```

mod config;
mod decode;
mod evaluator;
mod loader;
pub mod runtime;

#[cfg(test)]
mod entity_builder_tests;

pub use config::SeedConfig;
pub use evaluator::JsScriptEvaluator;
pub use loader::{ResourceLoader, ScriptSettings};
pub use rquickjs;

use seed_core::{EntityBuilder, EntityTypes};

/// Builder evaluating JavaScript resources below `config.scripts.root`.
pub fn entity_builder(config: SeedConfig, types: EntityTypes) -> EntityBuilder<JsScriptEvaluator> {
    EntityBuilder::with_config(JsScriptEvaluator::new(config.scripts), types, config.builder)
}
