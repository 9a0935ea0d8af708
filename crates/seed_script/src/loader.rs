//! Script resource loading
//!
//! Resource names are relative paths resolved against a root directory, the
//! way test resources are looked up on a classpath.

use crate::runtime::DEFAULT_STACK_SIZE;
use seed_core::ScriptError;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Where script resources live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptSettings {
    pub root: PathBuf,
    /// Appended to resource names that have no extension.
    pub default_extension: String,
    /// Native stack of the script worker in bytes. Bounds how deeply
    /// `create()` calls can nest inside one script.
    pub stack_size: usize,
}

impl Default for ScriptSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            default_extension: "js".to_string(),
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

impl ScriptSettings {
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResourceLoader {
    settings: ScriptSettings,
}

impl ResourceLoader {
    pub fn new(settings: ScriptSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ScriptSettings {
        &self.settings
    }

    /// Map a resource name onto a file below the root.
    pub fn resolve(&self, resource: &str) -> Result<PathBuf, ScriptError> {
        let relative = Path::new(resource);
        let escapes_root = relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir));
        if resource.is_empty() || escapes_root {
            return Err(ScriptError::InvalidResourceName {
                resource: resource.to_string(),
            });
        }

        let mut path = self.settings.root.join(relative);
        if path.extension().is_none() && !self.settings.default_extension.is_empty() {
            path.set_extension(&self.settings.default_extension);
        }
        Ok(path)
    }

    /// Read the source text of `resource`.
    pub fn load(&self, resource: &str) -> Result<String, ScriptError> {
        let path = self.resolve(resource)?;
        if !path.is_file() {
            return Err(ScriptError::ResourceNotFound {
                resource: resource.to_string(),
                path,
            });
        }

        tracing::debug!(resource, path = %path.display(), "loading script resource");
        std::fs::read_to_string(&path).map_err(|source| ScriptError::Io {
            resource: resource.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loader() -> ResourceLoader {
        ResourceLoader::new(ScriptSettings::with_root(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/testdata"
        )))
    }

    #[test]
    fn appends_default_extension() {
        let path = loader().resolve("testEntityDefinitions").unwrap();
        assert!(path.ends_with("testdata/testEntityDefinitions.js"));

        let path = loader().resolve("nested/other.js").unwrap();
        assert!(path.ends_with("testdata/nested/other.js"));
    }

    #[test]
    fn rejects_names_outside_the_root() {
        for name in ["", "../secrets.js", "/etc/passwd", "a/../../b.js"] {
            assert!(
                matches!(
                    loader().resolve(name),
                    Err(ScriptError::InvalidResourceName { .. })
                ),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn loads_existing_resources() {
        let source = loader().load("testEntityDefinitions.js").unwrap();
        assert!(source.contains("basicEntity"));
    }

    #[test]
    fn missing_resource_reports_path() {
        let error = loader().load("doesNotExist").unwrap_err();
        assert!(matches!(error, ScriptError::ResourceNotFound { .. }));
        assert!(error.to_string().contains("doesNotExist.js"));
    }
}
