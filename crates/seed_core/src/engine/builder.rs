use crate::engine::listener::Listeners;
use crate::{
    BuilderConfig, EntityBuildingError, EntityCreatedListener, EntityDefinition, EntityRef,
    EntityRegistry, EntityTypes, LookupError, PropertyValue, ScriptEvaluator, Value,
};
use seed_metrics::{time_scope, BuildEvent, Counter, Phase, PhaseProfiler};
use std::any::Any;
use std::rc::Rc;

/// Outcome of a successful build call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildReport {
    /// Entities registered by the call, nested and anonymous ones included.
    pub created: usize,
}

/// Counters and phase timings collected across builds.
#[derive(Debug, Default)]
pub struct BuildMetrics {
    pub counter: Counter,
    pub profiler: PhaseProfiler,
}

/// Builds entity graphs from scripts and serves them by name.
///
/// One builder is one build session: names are unique until [`clear`]
/// is called.
///
/// [`clear`]: EntityBuilder::clear
pub struct EntityBuilder<E = Box<dyn ScriptEvaluator>> {
    evaluator: E,
    types: EntityTypes,
    registry: EntityRegistry,
    listeners: Listeners,
    config: BuilderConfig,
    metrics: BuildMetrics,
}

impl<E: ScriptEvaluator> EntityBuilder<E> {
    pub fn new(evaluator: E, types: EntityTypes) -> Self {
        Self::with_config(evaluator, types, BuilderConfig::default())
    }

    pub fn with_config(evaluator: E, types: EntityTypes, config: BuilderConfig) -> Self {
        Self {
            evaluator,
            types,
            registry: EntityRegistry::new(),
            listeners: Listeners::default(),
            config,
            metrics: BuildMetrics::default(),
        }
    }

    /// Evaluate `resource` and build every entity it defines.
    ///
    /// Entities registered before a failure stay registered.
    pub fn build_entities(&mut self, resource: &str) -> Result<BuildReport, EntityBuildingError> {
        let span = tracing::info_span!("build_entities", resource);
        let _guard = span.enter();

        let evaluator = &mut self.evaluator;
        let evaluated = time_scope!(self.metrics.profiler, Phase::Evaluate, {
            evaluator.evaluate(resource)
        });
        self.metrics.counter.increment(BuildEvent::ScriptsEvaluated, 1);

        let definitions = match evaluated {
            Ok(definitions) => definitions,
            Err(error) => {
                tracing::warn!(%error, "script evaluation failed");
                self.metrics.counter.increment(BuildEvent::BuildsFailed, 1);
                return Err(error.into());
            }
        };

        self.build_definitions(&definitions)
    }

    /// Build already evaluated top-level definitions in order.
    pub fn build_definitions(
        &mut self,
        definitions: &[EntityDefinition],
    ) -> Result<BuildReport, EntityBuildingError> {
        let mut walk = Walk {
            types: &self.types,
            registry: &mut self.registry,
            listeners: &mut self.listeners,
            config: &self.config,
            counter: &mut self.metrics.counter,
            created: 0,
        };

        let result = time_scope!(self.metrics.profiler, Phase::Construct, {
            walk.build_all(definitions)
        });
        let created = walk.created;

        match result {
            Ok(()) => {
                tracing::info!(created, total = self.registry.len(), "entities built");
                Ok(BuildReport { created })
            }
            Err(error) => {
                tracing::warn!(%error, created, "entity build aborted");
                self.metrics.counter.increment(BuildEvent::BuildsFailed, 1);
                Err(error)
            }
        }
    }
}

impl<E> EntityBuilder<E> {
    /// Entity registered as `name`, which must be a `T`.
    pub fn entity_by_name<T: Any>(&self, name: &str) -> Result<Rc<T>, LookupError> {
        self.registry.lookup::<T>(name)
    }

    pub fn entity_by_name_any(&self, name: &str) -> Result<EntityRef, LookupError> {
        self.registry.lookup_any(name).cloned()
    }

    /// Every `T` built in this session, in creation order.
    pub fn entities_of<T: Any>(&self) -> Vec<Rc<T>> {
        self.registry.entities_of::<T>()
    }

    /// Listeners are called in the order they were added.
    pub fn add_entity_created_listener<L>(&mut self, listener: L)
    where
        L: EntityCreatedListener + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// End the session: forget all entities so their names can be reused.
    ///
    /// Listeners survive unless `clear_listeners_on_clear` is configured.
    pub fn clear(&mut self) {
        tracing::debug!(entities = self.registry.len(), "clearing entity registry");
        self.registry.clear();
        if self.config.clear_listeners_on_clear {
            self.listeners.clear();
        }
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn types(&self) -> &EntityTypes {
        &self.types
    }

    pub fn types_mut(&mut self) -> &mut EntityTypes {
        &mut self.types
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn metrics(&self) -> &BuildMetrics {
        &self.metrics
    }

    pub fn evaluator_mut(&mut self) -> &mut E {
        &mut self.evaluator
    }
}

/// Transient state of one build call.
struct Walk<'a> {
    types: &'a EntityTypes,
    registry: &'a mut EntityRegistry,
    listeners: &'a mut Listeners,
    config: &'a BuilderConfig,
    counter: &'a mut Counter,
    created: usize,
}

impl Walk<'_> {
    fn build_all(&mut self, definitions: &[EntityDefinition]) -> Result<(), EntityBuildingError> {
        for definition in definitions {
            self.build(definition)?;
        }
        Ok(())
    }

    /// Instantiate, resolve, assign, register, notify. Nested definitions go
    /// through all five steps before their parent is assigned.
    fn build(&mut self, definition: &EntityDefinition) -> Result<EntityRef, EntityBuildingError> {
        let label = self.label(definition);

        let mut instance = self.types.construct(&definition.type_name).map_err(|source| {
            EntityBuildingError::Instantiation {
                entity: label.clone(),
                source,
            }
        })?;

        let mut resolved = Vec::with_capacity(definition.properties.len());
        for (property, value) in &definition.properties {
            tracing::trace!(entity = %label, property = %property, "resolving property");
            resolved.push((property, self.resolve(value, &label)?));
        }

        for (property, value) in resolved {
            instance.set_property(property, value).map_err(|source| {
                EntityBuildingError::PropertyAssignment {
                    entity: label.clone(),
                    property: property.clone(),
                    source,
                }
            })?;
        }

        let entity = instance.into_shared(definition.name.as_deref());
        let key = self.registry.register(entity.clone())?;
        self.created += 1;
        self.counter.increment(BuildEvent::EntitiesCreated, 1);
        tracing::debug!(entity = %key, type_name = entity.type_name(), "registered entity");

        self.listeners
            .notify(&entity)
            .map_err(|source| EntityBuildingError::Listener {
                entity: label,
                source,
            })?;
        self.counter.increment(BuildEvent::ListenerNotifications, self.listeners.len());

        Ok(entity)
    }

    fn resolve(&mut self, value: &PropertyValue, owner: &str) -> Result<Value, EntityBuildingError> {
        match value {
            PropertyValue::Literal(literal) => Ok(Value::from(literal.clone())),
            PropertyValue::Reference(name) => self
                .registry
                .lookup_any(name)
                .map(|entity| Value::Entity(entity.clone()))
                .map_err(|_| EntityBuildingError::UnresolvedReference {
                    name: name.clone(),
                    referenced_from: owner.to_string(),
                }),
            PropertyValue::Nested(definition) => self.build(definition).map(Value::Entity),
            PropertyValue::List(items) => self.resolve_all(items, owner).map(Value::List),
            PropertyValue::Set(items) => self.resolve_all(items, owner).map(Value::Set),
        }
    }

    fn resolve_all(
        &mut self,
        items: &[PropertyValue],
        owner: &str,
    ) -> Result<Vec<Value>, EntityBuildingError> {
        items.iter().map(|item| self.resolve(item, owner)).collect()
    }

    fn label(&self, definition: &EntityDefinition) -> String {
        match &definition.name {
            Some(name) => name.clone(),
            None => format!("{} {}", self.config.anonymous_label, definition.type_name),
        }
    }
}
