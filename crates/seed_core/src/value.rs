//! Resolved property values handed to entities.

use crate::Literal;
use chrono::{NaiveDate, NaiveDateTime};
use std::any::{Any, TypeId};
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// Shared handle to a constructed entity.
///
/// Cloning the handle never clones the entity: every clone points at the
/// instance that was registered.
#[derive(Clone)]
pub struct EntityRef {
    name: Option<Rc<str>>,
    type_name: &'static str,
    instance: Rc<dyn Any>,
}

impl EntityRef {
    pub(crate) fn new(name: Option<&str>, type_name: &'static str, instance: Rc<dyn Any>) -> Self {
        Self {
            name: name.map(Rc::from),
            type_name,
            instance,
        }
    }

    /// Caller-chosen name, `None` for anonymous entities.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Script-level type name the entity was constructed from.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Rust type of the stored instance.
    pub fn type_id(&self) -> TypeId {
        (*self.instance).type_id()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.instance.is::<T>()
    }

    /// Typed handle to the same instance.
    pub fn downcast<T: Any>(&self) -> Option<Rc<T>> {
        Rc::clone(&self.instance).downcast::<T>().ok()
    }

    pub fn ptr_eq(&self, other: &EntityRef) -> bool {
        Rc::ptr_eq(&self.instance, &other.instance)
    }
}

impl fmt::Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRef")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Property value after references and nested definitions were resolved.
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Entity(EntityRef),
    List(Vec<Value>),
    Set(Vec<Value>),
}

impl Value {
    /// Short description used in conversion errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::Entity(_) => "entity",
            Value::List(_) => "list",
            Value::Set(_) => "set",
        }
    }
}

impl From<Literal> for Value {
    fn from(literal: Literal) -> Self {
        match literal {
            Literal::Null => Value::Null,
            Literal::Bool(value) => Value::Bool(value),
            Literal::Int(value) => Value::Int(value),
            Literal::Float(value) => Value::Float(value),
            Literal::String(value) => Value::String(value),
            Literal::Date(value) => Value::Date(value),
            Literal::DateTime(value) => Value::DateTime(value),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ValueError {
    #[error("expected {expected} but found {found}")]
    Mismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("integer {value} does not fit into {expected}")]
    OutOfRange { expected: &'static str, value: i64 },

    #[error("expected entity of type {expected} but found '{found}'")]
    EntityMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

/// Conversion from a resolved [`Value`] into a field type.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, ValueError>;
}

fn mismatch<T>(expected: &'static str, value: &Value) -> Result<T, ValueError> {
    Err(ValueError::Mismatch {
        expected,
        found: value.kind(),
    })
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        Ok(value)
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::String(value) => Ok(value),
            other => mismatch("string", &other),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Bool(value) => Ok(value),
            other => mismatch("bool", &other),
        }
    }
}

macro_rules! impl_from_value_for_int {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self, ValueError> {
                    match value {
                        Value::Int(raw) => <$ty>::try_from(raw).map_err(|_| ValueError::OutOfRange {
                            expected: stringify!($ty),
                            value: raw,
                        }),
                        other => mismatch(stringify!($ty), &other),
                    }
                }
            }
        )+
    };
}

impl_from_value_for_int!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Float(value) => Ok(value),
            Value::Int(value) => Ok(value as f64),
            other => mismatch("f64", &other),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        f64::from_value(value).map(|value| value as f32)
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Date(value) => Ok(value),
            Value::DateTime(value) => Ok(value.date()),
            other => mismatch("date", &other),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::DateTime(value) => Ok(value),
            Value::Date(value) => Ok(value.and_time(chrono::NaiveTime::MIN)),
            other => mismatch("datetime", &other),
        }
    }
}

impl FromValue for EntityRef {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Entity(entity) => Ok(entity),
            other => mismatch("entity", &other),
        }
    }
}

impl<T: Any> FromValue for Rc<T> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        let entity = EntityRef::from_value(value)?;
        entity.downcast::<T>().ok_or(ValueError::EntityMismatch {
            expected: std::any::type_name::<T>(),
            found: entity.type_name(),
        })
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::List(items) | Value::Set(items) => items.into_iter().map(T::from_value).collect(),
            other => mismatch("collection", &other),
        }
    }
}
