use crate::EntityRef;
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// Registry key of an entity. Anonymous entities get a placeholder that no
/// caller can look up.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EntityKey {
    Named(String),
    Anonymous(u64),
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKey::Named(name) => write!(f, "{name}"),
            EntityKey::Anonymous(index) => write!(f, "#{index}"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("an entity named '{name}' is already registered")]
pub struct DuplicateNameError {
    pub name: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("no entity named '{name}'")]
    NotFound { name: String },

    #[error("entity '{name}' is a '{actual}', not a {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },
}

/// Name to instance index for one build session.
#[derive(Default)]
pub struct EntityRegistry {
    entries: Vec<RegisteredEntity>,
    by_name: HashMap<String, usize>,
    by_type: HashMap<TypeId, Vec<usize>>,
    next_anonymous: u64,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            by_name: HashMap::new(),
            by_type: HashMap::new(),
            next_anonymous: 0,
        }
    }

    /// Store `entity` under its name, or under a fresh placeholder when it
    /// has none. A name is written at most once per session.
    pub fn register(&mut self, entity: EntityRef) -> Result<EntityKey, DuplicateNameError> {
        let key = match entity.name() {
            Some(name) => {
                if self.by_name.contains_key(name) {
                    return Err(DuplicateNameError {
                        name: name.to_string(),
                    });
                }
                EntityKey::Named(name.to_string())
            }
            None => {
                let key = EntityKey::Anonymous(self.next_anonymous);
                self.next_anonymous += 1;
                key
            }
        };

        let index = self.entries.len();
        if let EntityKey::Named(name) = &key {
            self.by_name.insert(name.clone(), index);
        }
        self.by_type.entry(entity.type_id()).or_default().push(index);
        self.entries.push(RegisteredEntity {
            key: key.clone(),
            entity,
        });

        Ok(key)
    }

    /// Typed lookup. The stored instance must be exactly a `T`.
    pub fn lookup<T: Any>(&self, name: &str) -> Result<Rc<T>, LookupError> {
        let entity = self.lookup_any(name)?;
        entity.downcast::<T>().ok_or_else(|| LookupError::TypeMismatch {
            name: name.to_string(),
            expected: type_name::<T>(),
            actual: entity.type_name(),
        })
    }

    /// Untyped lookup.
    pub fn lookup_any(&self, name: &str) -> Result<&EntityRef, LookupError> {
        self.by_name
            .get(name)
            .map(|&index| &self.entries[index].entity)
            .ok_or_else(|| LookupError::NotFound {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// All entities of type `T`, named or not, in creation order.
    pub fn entities_of<T: Any>(&self) -> Vec<Rc<T>> {
        self.by_type
            .get(&TypeId::of::<T>())
            .into_iter()
            .flatten()
            .filter_map(|&index| self.entries[index].entity.downcast::<T>())
            .collect()
    }

    /// Named entities in creation order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|entry| match &entry.key {
            EntityKey::Named(name) => Some(name.as_str()),
            EntityKey::Anonymous(_) => None,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntityKey, &EntityRef)> {
        self.entries.iter().map(|entry| (&entry.key, &entry.entity))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget every entity. Placeholder numbering restarts as well.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.by_name.clear();
        self.by_type.clear();
        self.next_anonymous = 0;
    }
}

struct RegisteredEntity {
    key: EntityKey,
    entity: EntityRef,
}
