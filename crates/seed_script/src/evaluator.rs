use crate::decode::decode_definitions;
use crate::loader::{ResourceLoader, ScriptSettings};
use crate::runtime::ScriptRuntime;
use once_cell::unsync::OnceCell;
use seed_core::{EntityDefinition, ScriptError, ScriptEvaluator};

/// [`ScriptEvaluator`] for the JavaScript entity DSL.
///
/// ```js
/// create("BasicTestEntity", "basicEntity", {
///     string_property: "a string value",
///     integer_property: 5,
///     date_property: date(2015, 11, 18),
/// });
/// create("TestEntityWithToOneRelationship", "user", {
///     referenced_entity: ref("basicEntity"),
/// });
/// ```
pub struct JsScriptEvaluator {
    loader: ResourceLoader,
    runtime: OnceCell<ScriptRuntime>,
}

impl JsScriptEvaluator {
    pub fn new(settings: ScriptSettings) -> Self {
        Self {
            loader: ResourceLoader::new(settings),
            runtime: OnceCell::new(),
        }
    }

    pub fn loader(&self) -> &ResourceLoader {
        &self.loader
    }

    /// Evaluate script text directly; `resource` only labels errors.
    pub fn evaluate_source(
        &self,
        resource: &str,
        source: &str,
    ) -> Result<Vec<EntityDefinition>, ScriptError> {
        let runtime = self
            .runtime
            .get_or_try_init(|| ScriptRuntime::with_stack_size(self.loader.settings().stack_size))
            .map_err(|error| ScriptError::Evaluation {
                resource: resource.to_string(),
                message: error.to_string(),
            })?;

        let json = runtime
            .export_definitions(source)
            .map_err(|message| ScriptError::Evaluation {
                resource: resource.to_string(),
                message,
            })?;

        let definitions =
            decode_definitions(&json).map_err(|message| ScriptError::InvalidDefinition {
                resource: resource.to_string(),
                message,
            })?;
        tracing::debug!(resource, definitions = definitions.len(), "evaluated script");
        Ok(definitions)
    }
}

impl Default for JsScriptEvaluator {
    fn default() -> Self {
        Self::new(ScriptSettings::default())
    }
}

impl ScriptEvaluator for JsScriptEvaluator {
    fn evaluate(&mut self, resource: &str) -> Result<Vec<EntityDefinition>, ScriptError> {
        let source = self.loader.load(resource)?;
        self.evaluate_source(resource, &source)
    }
}
