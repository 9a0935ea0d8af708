//! Script evaluation collaborator
//!
//! The builder never parses scripts itself. It asks a `ScriptEvaluator` for
//! the top-level definitions of a named resource and builds those.

use crate::{EntityDefinition, ScriptError};
use std::collections::HashMap;

pub trait ScriptEvaluator {
    /// Evaluate `resource` into its top-level definitions, in script order.
    fn evaluate(&mut self, resource: &str) -> Result<Vec<EntityDefinition>, ScriptError>;
}

impl<E: ScriptEvaluator + ?Sized> ScriptEvaluator for Box<E> {
    fn evaluate(&mut self, resource: &str) -> Result<Vec<EntityDefinition>, ScriptError> {
        (**self).evaluate(resource)
    }
}

/// Evaluator serving pre-built definitions by resource name.
#[derive(Default)]
pub struct InMemoryScripts {
    scripts: HashMap<String, Vec<EntityDefinition>>,
}

impl InMemoryScripts {
    pub fn new() -> Self {
        Self {
            scripts: HashMap::new(),
        }
    }

    pub fn insert(&mut self, resource: impl Into<String>, definitions: Vec<EntityDefinition>) {
        self.scripts.insert(resource.into(), definitions);
    }

    pub fn with(mut self, resource: impl Into<String>, definitions: Vec<EntityDefinition>) -> Self {
        self.insert(resource, definitions);
        self
    }
}

impl ScriptEvaluator for InMemoryScripts {
    fn evaluate(&mut self, resource: &str) -> Result<Vec<EntityDefinition>, ScriptError> {
        self.scripts
            .get(resource)
            .cloned()
            .ok_or_else(|| ScriptError::ResourceNotFound {
                resource: resource.to_string(),
                path: resource.into(),
            })
    }
}
