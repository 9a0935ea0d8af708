// entity.rs - Runtime entity type registration
//
// Entity types are identified by the name scripts use, not by Rust TypeIds.
// The builder only ever talks to `dyn Entity`; concrete types stay with the
// caller.

use crate::value::{EntityRef, Value, ValueError};
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;

/// Property assignment on a freshly constructed entity.
pub trait Entity: IntoAny {
    fn set_property(&mut self, property: &str, value: Value) -> Result<(), PropertyError>;
}

#[doc(hidden)]
pub trait IntoAny: Any {
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> IntoAny for T {
    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Entity that scripts can instantiate by name.
pub trait EntityType: Entity + Default {
    /// Name scripts use to refer to this type.
    const TYPE_NAME: &'static str;
}

#[derive(Debug, Error, PartialEq)]
pub enum PropertyError {
    #[error("unknown property '{property}'")]
    UnknownProperty { property: String },

    #[error("property '{property}' cannot take this value: {source}")]
    IncompatibleValue {
        property: String,
        #[source]
        source: ValueError,
    },
}

#[derive(Debug, Error, PartialEq)]
pub enum InstantiationError {
    #[error("entity type '{type_name}' is not registered")]
    UnknownType { type_name: String },
}

#[derive(Debug, Error, PartialEq)]
pub enum TypeRegistrationError {
    #[error("entity type '{type_name}' is already registered for {existing}")]
    Conflict {
        type_name: &'static str,
        existing: &'static str,
    },
}

/// Constructed entity that has not been registered yet.
pub struct Instance {
    pub(crate) type_name: &'static str,
    pub(crate) entity: Box<dyn Entity>,
}

impl Instance {
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn set_property(&mut self, property: &str, value: Value) -> Result<(), PropertyError> {
        self.entity.set_property(property, value)
    }

    /// Freeze the instance into a shared handle. No property can be set
    /// afterwards.
    pub(crate) fn into_shared(self, name: Option<&str>) -> EntityRef {
        EntityRef::new(name, self.type_name, Rc::from(self.entity.into_any()))
    }
}

#[derive(Clone, Copy)]
struct EntityMeta {
    type_name: &'static str,
    rust_type: TypeId,
    rust_name: &'static str,
    construct: fn() -> Box<dyn Entity>,
}

fn construct_default<T: EntityType>() -> Box<dyn Entity> {
    Box::new(T::default())
}

/// Table of entity types a builder can instantiate.
#[derive(Default)]
pub struct EntityTypes {
    types: HashMap<&'static str, EntityMeta>,
}

impl EntityTypes {
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    /// Register `T` under [`EntityType::TYPE_NAME`].
    ///
    /// Registering the same type twice is a no-op; a different Rust type
    /// under an existing name is rejected.
    pub fn register<T: EntityType>(&mut self) -> Result<&mut Self, TypeRegistrationError> {
        let meta = EntityMeta {
            type_name: T::TYPE_NAME,
            rust_type: TypeId::of::<T>(),
            rust_name: type_name::<T>(),
            construct: construct_default::<T>,
        };

        if let Some(existing) = self.types.get(T::TYPE_NAME) {
            if existing.rust_type != meta.rust_type {
                return Err(TypeRegistrationError::Conflict {
                    type_name: T::TYPE_NAME,
                    existing: existing.rust_name,
                });
            }
            return Ok(self);
        }

        tracing::trace!(type_name = T::TYPE_NAME, rust_type = meta.rust_name, "registered entity type");
        self.types.insert(T::TYPE_NAME, meta);
        Ok(self)
    }

    /// Instantiate the type registered as `type_name` with no properties set.
    pub fn construct(&self, type_name: &str) -> Result<Instance, InstantiationError> {
        let meta = self
            .types
            .get(type_name)
            .ok_or_else(|| InstantiationError::UnknownType {
                type_name: type_name.to_string(),
            })?;

        Ok(Instance {
            type_name: meta.type_name,
            entity: (meta.construct)(),
        })
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.types.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Helper macro to implement [`Entity`] and [`EntityType`] for a struct.
///
/// Each listed field becomes a property of the same name; its type must
/// implement [`FromValue`](crate::FromValue).
///
/// # Example
/// ```ignore
/// #[derive(Default)]
/// struct Customer { name: String, orders: Vec<Rc<Order>> }
///
/// define_entity!(Customer, "Customer", { name, orders });
/// ```
#[macro_export]
macro_rules! define_entity {
    ($ty:ty, $name:expr, { $($field:ident),* $(,)? }) => {
        impl $crate::Entity for $ty {
            fn set_property(
                &mut self,
                property: &str,
                value: $crate::Value,
            ) -> ::std::result::Result<(), $crate::PropertyError> {
                match property {
                    $(
                        stringify!($field) => {
                            self.$field = $crate::FromValue::from_value(value).map_err(|source| {
                                $crate::PropertyError::IncompatibleValue {
                                    property: property.to_string(),
                                    source,
                                }
                            })?;
                            Ok(())
                        }
                    )*
                    _ => Err($crate::PropertyError::UnknownProperty {
                        property: property.to_string(),
                    }),
                }
            }
        }

        impl $crate::EntityType for $ty {
            const TYPE_NAME: &'static str = $name;
        }
    };
}
