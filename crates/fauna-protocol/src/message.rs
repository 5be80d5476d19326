//! Pagination and response message types

use crate::json::encode;
use fauna_core::{Cursor, Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Options sent with every page fetch
#[derive(Debug, Clone, PartialEq)]
pub struct PageOptions {
    /// Maximum number of elements per page
    pub size: usize,

    /// Fetch the page following this cursor
    pub after: Option<Cursor>,

    /// Fetch the page preceding this cursor
    pub before: Option<Cursor>,
}

impl PageOptions {
    /// Options for the first page of a set
    pub fn new(size: usize) -> Self {
        Self {
            size,
            after: None,
            before: None,
        }
    }

    /// Builder: continue after a cursor
    pub fn after(mut self, cursor: Cursor) -> Self {
        self.after = Some(cursor);
        self
    }

    /// Builder: continue before a cursor
    pub fn before(mut self, cursor: Cursor) -> Self {
        self.before = Some(cursor);
        self
    }

    /// Check if no cursor is set, i.e. the start of the set is requested
    pub fn is_initial(&self) -> bool {
        self.after.is_none() && self.before.is_none()
    }

    /// Wire form: `{"size": n, "after"?: cursor, "before"?: cursor}`
    pub fn to_json(&self) -> JsonValue {
        let mut map = Map::new();
        map.insert("size".to_string(), JsonValue::from(self.size));
        if let Some(after) = &self.after {
            map.insert("after".to_string(), encode(after.as_value()));
        }
        if let Some(before) = &self.before {
            map.insert("before".to_string(), encode(before.as_value()));
        }
        JsonValue::Object(map)
    }
}

/// Body of a database HTTP response
///
/// Successful queries carry `resource`, failed ones carry `errors`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// Raw query result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<JsonValue>,

    /// Errors reported by the database
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorDto>,
}

impl ResponseEnvelope {
    /// Parse a response body
    pub fn from_json(json: JsonValue) -> Result<Self> {
        serde_json::from_value(json).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// The raw resource, or the first reported error
    pub fn into_result(self) -> Result<JsonValue> {
        if let Some(err) = self.errors.into_iter().next() {
            return Err(err.into_error());
        }
        self.resource
            .ok_or_else(|| Error::format("response has neither resource nor errors"))
    }
}

/// One error reported by the database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDto {
    /// Error code
    pub code: String,

    /// Human-readable message
    pub description: String,

    /// Position of the failing sub-expression
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub position: Vec<JsonValue>,
}

impl ErrorDto {
    /// Create a new error entry
    pub fn new(code: &str, description: &str) -> Self {
        Self {
            code: code.to_string(),
            description: description.to_string(),
            position: Vec::new(),
        }
    }

    /// Map to the driver error type
    pub fn into_error(self) -> Error {
        match self.code.as_str() {
            error_codes::UNAVAILABLE => Error::Unavailable(self.description),
            _ => Error::QueryExecution {
                code: self.code,
                description: self.description,
            },
        }
    }
}

/// Common error codes
pub mod error_codes {
    pub const BAD_REQUEST: &str = "bad request";
    pub const INVALID_EXPRESSION: &str = "invalid expression";
    pub const INVALID_ARGUMENT: &str = "invalid argument";
    pub const NOT_FOUND: &str = "instance not found";
    pub const PERMISSION_DENIED: &str = "permission denied";
    pub const UNAUTHORIZED: &str = "unauthorized";
    pub const UNAVAILABLE: &str = "unavailable";
}
