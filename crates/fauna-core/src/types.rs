//! Set expressions and history events
//!
//! Both are immutable value objects: a [`SetExpression`] carries an opaque
//! query tree selecting resources, an [`Event`] records one mutation of a
//! resource.

use crate::error::{Error, Result};
use crate::reference::Reference;
use crate::value::{Object, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque, serializable query expression selecting a set of resources
///
/// The database interprets the wrapped tree (for example a `match` against
/// an index). Equality is structural equality of that tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SetExpression(Box<Value>);

impl SetExpression {
    /// Wrap a query expression
    pub fn new(expression: impl Into<Value>) -> Self {
        Self(Box::new(expression.into()))
    }

    /// The wrapped expression
    pub fn expression(&self) -> &Value {
        &self.0
    }

    /// Consume and return the wrapped expression
    pub fn into_inner(self) -> Value {
        *self.0
    }
}

/// Kind of mutation recorded by an [`Event`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Delete,
    Update,
}

impl Action {
    /// Wire name of the action
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Delete => "delete",
            Action::Update => "update",
        }
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "create" => Ok(Action::Create),
            "delete" => Ok(Action::Delete),
            "update" => Ok(Action::Update),
            other => Err(Error::format(format!("unknown event action '{}'", other))),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded mutation of a resource
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Event {
    /// The mutated resource
    pub resource: Reference,

    /// Database timestamp of the mutation, in microseconds
    pub ts: i64,

    /// What happened to the resource
    pub action: Action,
}

impl Event {
    /// Create a new event
    pub fn new(resource: Reference, ts: i64, action: Action) -> Self {
        Self {
            resource,
            ts,
            action,
        }
    }

    /// Build an event from a decoded mapping with `resource`, `ts` and `action` keys
    pub fn from_value(value: &Value) -> Result<Self> {
        let map = value.as_object().ok_or_else(|| {
            Error::format(format!("event must be an object, found {}", value.type_name()))
        })?;

        let resource = required(map, "resource")?
            .as_reference()
            .cloned()
            .ok_or_else(|| Error::format("event resource must be a ref"))?;
        let ts = required(map, "ts")?
            .as_integer()
            .ok_or_else(|| Error::format("event ts must be an integer"))?;
        let action = required(map, "action")?
            .as_str()
            .ok_or_else(|| Error::format("event action must be a string"))?
            .parse()?;

        Ok(Self::new(resource, ts, action))
    }

    /// The generic mapping form: `{action, resource, ts}`
    pub fn to_value(&self) -> Value {
        let mut map = Object::new();
        map.insert("action".to_string(), Value::from(self.action.as_str()));
        map.insert("resource".to_string(), Value::Ref(self.resource.clone()));
        map.insert("ts".to_string(), Value::Integer(self.ts));
        Value::Object(map)
    }
}

impl From<Event> for Value {
    fn from(event: Event) -> Self {
        event.to_value()
    }
}

fn required<'a>(map: &'a Object, key: &str) -> Result<&'a Value> {
    map.get(key)
        .ok_or_else(|| Error::format(format!("missing '{}' key", key)))
}
