//! Tagged JSON encoding for driver values.
//!
//! Database-native types travel as single-key JSON objects whose key is a
//! reserved tag:
//!
//! | Type | JSON Representation |
//! |------|---------------------|
//! | Reference | `{"@ref": "classes/frogs/123"}` |
//! | SetExpression | `{"@set": <expression>}` |
//! | Timestamp | `{"@ts": "1970-01-01T00:00:00.123456789Z"}` |
//! | CalendarDate | `{"@date": "1970-01-01"}` |
//! | Object using a tag as a key | `{"@obj": {...}}` |
//!
//! Everything else maps to plain JSON. `decode(encode(v)) == v` holds for
//! every value whose floats are finite; NaN and infinities have no JSON form
//! and encode as `null`. Integers must fit in an `i64`.

use fauna_core::{
    CalendarDate, Error, Event, Object, Page, Reference, Result, SetExpression, Timestamp, Value,
};
use serde::de;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};
use tracing::warn;

/// Reserved tag keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Ref,
    Set,
    Ts,
    Date,
    Obj,
}

impl Tag {
    /// Recognize a reserved key
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "@ref" => Some(Tag::Ref),
            "@set" => Some(Tag::Set),
            "@ts" => Some(Tag::Ts),
            "@date" => Some(Tag::Date),
            "@obj" => Some(Tag::Obj),
            _ => None,
        }
    }

    /// The key as it appears on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Ref => "@ref",
            Tag::Set => "@set",
            Tag::Ts => "@ts",
            Tag::Date => "@date",
            Tag::Obj => "@obj",
        }
    }
}

/// Convert a Value to its wire JSON.
pub fn encode(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Boolean(b) => JsonValue::Bool(*b),
        Value::Integer(i) => JsonValue::Number((*i).into()),
        Value::Float(f) => float_to_json(*f),
        Value::String(s) => JsonValue::String(s.clone()),
        Value::Array(items) => JsonValue::Array(items.iter().map(encode).collect()),
        Value::Object(map) => {
            let fields = JsonValue::Object(encode_fields(map));
            if map.keys().any(|k| Tag::from_key(k).is_some()) {
                tagged(Tag::Obj, fields)
            } else {
                fields
            }
        }
        Value::Ref(r) => tagged(Tag::Ref, JsonValue::String(r.path())),
        Value::Set(set) => tagged(Tag::Set, encode(set.expression())),
        Value::Timestamp(ts) => tagged(Tag::Ts, JsonValue::String(ts.to_iso_string())),
        Value::Date(date) => tagged(Tag::Date, JsonValue::String(date.to_iso_string())),
    }
}

/// Convert wire JSON to a Value, recognizing reserved tags.
pub fn decode(json: &JsonValue) -> Result<Value> {
    match json {
        JsonValue::Null => Ok(Value::Null),
        JsonValue::Bool(b) => Ok(Value::Boolean(*b)),
        JsonValue::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Ok(Value::Integer(i)),
            (None, Some(f)) if n.is_f64() => Ok(Value::Float(f)),
            _ => Err(Error::format(format!("integer {} does not fit in 64 bits", n))),
        },
        JsonValue::String(s) => Ok(Value::String(s.clone())),
        JsonValue::Array(items) => items
            .iter()
            .map(decode)
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        JsonValue::Object(obj) => decode_object(obj),
    }
}

fn decode_object(obj: &Map<String, JsonValue>) -> Result<Value> {
    let Some((key, tag)) = obj
        .keys()
        .find_map(|k| Tag::from_key(k).map(|tag| (k, tag)))
    else {
        return decode_fields(obj).map(Value::Object);
    };

    if obj.len() != 1 {
        let keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        return Err(Error::format(format!(
            "'{}' must be the only key, found [{}]",
            key,
            keys.join(", ")
        )));
    }
    let payload = &obj[key];

    match tag {
        Tag::Ref => Reference::parse(tag_str(tag, payload)?)
            .map(Value::Ref)
            .map_err(|e| Error::format(format!("invalid @ref payload: {}", e))),
        Tag::Set => decode(payload).map(|expr| Value::Set(SetExpression::new(expr))),
        Tag::Ts => Timestamp::parse(tag_str(tag, payload)?).map(Value::Timestamp),
        Tag::Date => CalendarDate::parse(tag_str(tag, payload)?).map(Value::Date),
        Tag::Obj => match payload {
            JsonValue::Object(fields) => decode_fields(fields).map(Value::Object),
            other => Err(Error::format(format!(
                "@obj payload must be an object, found {}",
                json_type_name(other)
            ))),
        },
    }
}

fn decode_fields(obj: &Map<String, JsonValue>) -> Result<Object> {
    obj.iter()
        .map(|(k, v)| decode(v).map(|value| (k.clone(), value)))
        .collect()
}

fn encode_fields(map: &Object) -> Map<String, JsonValue> {
    map.iter().map(|(k, v)| (k.clone(), encode(v))).collect()
}

fn tag_str(tag: Tag, payload: &JsonValue) -> Result<&str> {
    payload.as_str().ok_or_else(|| {
        Error::format(format!(
            "{} payload must be a string, found {}",
            tag.as_str(),
            json_type_name(payload)
        ))
    })
}

fn tagged(tag: Tag, payload: JsonValue) -> JsonValue {
    let mut map = Map::with_capacity(1);
    map.insert(tag.as_str().to_string(), payload);
    JsonValue::Object(map)
}

/// Non-finite floats have no JSON form
fn float_to_json(f: f64) -> JsonValue {
    serde_json::Number::from_f64(f)
        .map(JsonValue::Number)
        .unwrap_or_else(|| {
            warn!("Encoding non-finite float {} as null", f);
            JsonValue::Null
        })
}

fn json_type_name(json: &JsonValue) -> &'static str {
    match json {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// Render a Value as compact wire JSON text. Keys are emitted in sorted order.
pub fn to_string(value: &Value) -> String {
    encode(value).to_string()
}

/// Parse wire JSON text into a Value.
pub fn from_str(s: &str) -> Result<Value> {
    let json: JsonValue =
        serde_json::from_str(s).map_err(|e| Error::Serialization(e.to_string()))?;
    decode(&json)
}

/// Wire form of an event: `{"action":..,"resource":{"@ref":..},"ts":..}`
pub fn encode_event(event: &Event) -> JsonValue {
    encode(&event.to_value())
}

/// Decode a raw event mapping.
pub fn decode_event(json: &JsonValue) -> Result<Event> {
    Event::from_value(&decode(json)?)
}

/// Decode a raw `{data, before?, after?}` page.
pub fn decode_page(json: &JsonValue) -> Result<Page> {
    Page::from_value(decode(json)?)
}

/// Wire form of a page; absent cursors are omitted.
pub fn encode_page(page: &Page) -> JsonValue {
    let mut map = Map::new();
    map.insert(
        "data".to_string(),
        JsonValue::Array(page.data.iter().map(encode).collect()),
    );
    if let Some(before) = &page.before {
        map.insert("before".to_string(), encode(before.as_value()));
    }
    if let Some(after) = &page.after {
        map.insert("after".to_string(), encode(after.as_value()));
    }
    JsonValue::Object(map)
}

/// A wrapper for Value that serializes through the tagged codec.
///
/// Use this to embed driver values in serde-derived request or response types.
#[derive(Debug, Clone, PartialEq)]
pub struct Tagged(pub Value);

impl Serialize for Tagged {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        encode(&self.0).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Tagged {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let json = JsonValue::deserialize(deserializer)?;
        decode(&json).map(Tagged).map_err(de::Error::custom)
    }
}

impl From<Value> for Tagged {
    fn from(v: Value) -> Self {
        Tagged(v)
    }
}

impl From<Tagged> for Value {
    fn from(v: Tagged) -> Self {
        v.0
    }
}
