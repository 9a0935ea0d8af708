//! JSON export of the DSL into the Definition Model.
//!
//! The export lists every definition in creation order. Top-level entries are
//! decoded in that order and nested entries are pulled in at their first use,
//! which is the order the builder visits them. A later use of an already
//! placed definition becomes a reference to its name.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use seed_core::{EntityDefinition, Literal, PropertyValue};
use serde::Deserialize;
use serde_json::{Map, Number, Value as Json};

#[derive(Debug, Deserialize)]
struct Exported {
    #[serde(rename = "type")]
    type_name: String,
    name: Option<String>,
    properties: Map<String, Json>,
    top_level: bool,
}

/// Tagged objects created by the prelude helpers.
#[derive(Debug, Deserialize)]
#[serde(tag = "__kind", rename_all = "lowercase")]
enum Descriptor {
    Entity {
        id: usize,
    },
    Ref {
        name: String,
    },
    Date {
        year: i32,
        month: u32,
        day: u32,
    },
    Datetime {
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    },
    Set {
        items: Vec<Json>,
    },
}

/// Decode the exported definitions into top-level definition trees.
pub(crate) fn decode_definitions(json: &str) -> Result<Vec<EntityDefinition>, String> {
    let exported: Vec<Exported> = serde_json::from_str(json).map_err(|error| error.to_string())?;
    let mut decoder = Decoder::new(exported);

    let roots: Vec<usize> = decoder
        .headers
        .iter()
        .enumerate()
        .filter(|(_, header)| header.top_level)
        .map(|(id, _)| id)
        .collect();
    let definitions = roots
        .into_iter()
        .map(|id| decoder.definition(id))
        .collect::<Result<Vec<_>, _>>()?;

    decoder.finish()?;
    Ok(definitions)
}

struct Header {
    type_name: String,
    name: Option<String>,
    top_level: bool,
}

struct Decoder {
    headers: Vec<Header>,
    /// Taken once the definition has been placed in a tree.
    pending: Vec<Option<Map<String, Json>>>,
}

impl Decoder {
    fn new(exported: Vec<Exported>) -> Self {
        let (headers, pending) = exported
            .into_iter()
            .map(|entry| {
                let header = Header {
                    type_name: entry.type_name,
                    name: entry.name,
                    top_level: entry.top_level,
                };
                (header, Some(entry.properties))
            })
            .unzip();
        Self { headers, pending }
    }

    fn definition(&mut self, id: usize) -> Result<EntityDefinition, String> {
        let properties = self
            .pending
            .get_mut(id)
            .and_then(Option::take)
            .ok_or_else(|| format!("definition {id} is not available"))?;
        let type_name = self.headers[id].type_name.clone();
        let name = self.headers[id].name.clone();

        let mut decoded = IndexMap::with_capacity(properties.len());
        for (property, value) in properties {
            let value = self
                .value(value)
                .map_err(|error| format!("property '{property}' of {type_name}: {error}"))?;
            decoded.insert(property, value);
        }
        Ok(EntityDefinition {
            type_name,
            name,
            properties: decoded,
        })
    }

    fn nested(&mut self, id: usize) -> Result<PropertyValue, String> {
        match self.pending.get(id) {
            None => Err(format!("unknown definition id {id}")),
            Some(Some(_)) => self.definition(id).map(PropertyValue::from),
            Some(None) => match &self.headers[id].name {
                Some(name) => Ok(PropertyValue::Reference(name.clone())),
                None => Err(format!(
                    "anonymous {} definition is used in more than one place; name it to share it",
                    self.headers[id].type_name
                )),
            },
        }
    }

    fn value(&mut self, value: Json) -> Result<PropertyValue, String> {
        match value {
            Json::Null => Ok(Literal::Null.into()),
            Json::Bool(value) => Ok(Literal::Bool(value).into()),
            Json::Number(number) => Ok(decode_number(&number).into()),
            Json::String(value) => Ok(Literal::String(value).into()),
            Json::Array(items) => self.items(items).map(PropertyValue::List),
            Json::Object(object) => {
                if !object.contains_key("__kind") {
                    return Err(
                        "plain objects are not property values; declare them with create()"
                            .to_string(),
                    );
                }
                let descriptor: Descriptor = serde_json::from_value(Json::Object(object))
                    .map_err(|error| error.to_string())?;
                self.descriptor(descriptor)
            }
        }
    }

    fn items(&mut self, items: Vec<Json>) -> Result<Vec<PropertyValue>, String> {
        items.into_iter().map(|item| self.value(item)).collect()
    }

    fn descriptor(&mut self, descriptor: Descriptor) -> Result<PropertyValue, String> {
        match descriptor {
            Descriptor::Entity { id } => self.nested(id),
            Descriptor::Ref { name } => Ok(PropertyValue::Reference(name)),
            Descriptor::Date { year, month, day } => date(year, month, day).map(Into::into),
            Descriptor::Datetime {
                year,
                month,
                day,
                hour,
                minute,
                second,
            } => {
                let time = NaiveTime::from_hms_opt(hour, minute, second)
                    .ok_or_else(|| format!("invalid time {hour:02}:{minute:02}:{second:02}"))?;
                Ok(NaiveDateTime::new(date(year, month, day)?, time).into())
            }
            Descriptor::Set { items } => self.items(items).map(PropertyValue::Set),
        }
    }

    /// Nested definitions nobody reached can only sit on a cycle.
    fn finish(&self) -> Result<(), String> {
        match self.pending.iter().position(Option::is_some) {
            Some(id) => {
                let header = &self.headers[id];
                Err(format!(
                    "{} definition {} is only reachable through a cycle of nested definitions",
                    header.type_name,
                    header.name.as_deref().unwrap_or("<anonymous>")
                ))
            }
            None => Ok(()),
        }
    }
}

fn decode_number(number: &Number) -> Literal {
    match number.as_i64() {
        Some(value) => Literal::Int(value),
        None => Literal::Float(number.as_f64().unwrap_or(f64::NAN)),
    }
}

fn date(year: i32, month: u32, day: u32) -> Result<NaiveDate, String> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| format!("invalid date {year:04}-{month:02}-{day:02}"))
}
