//! Combined configuration for a script-driven builder

use crate::ScriptSettings;
use seed_core::{read_config, BuilderConfig, ConfigError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// ```json
/// {
///   "builder": { "clear_listeners_on_clear": false },
///   "scripts": { "root": "tests/fixtures", "default_extension": "js" }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub builder: BuilderConfig,
    pub scripts: ScriptSettings,
}

impl SeedConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json_str(&read_config(path.as_ref())?)
    }
}
