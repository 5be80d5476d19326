//! Paginated results
//!
//! A [`Page`] is one slice of an ordered result stream. Its cursors are
//! opaque positions in that stream and are only ever handed back to the
//! database unchanged.

use crate::error::{Error, Result};
use crate::value::{Object, Value};

/// Opaque pagination token marking a position in a result stream
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cursor(Value);

impl Cursor {
    /// Wrap a decoded cursor value
    pub fn new(value: impl Into<Value>) -> Self {
        Self(value.into())
    }

    /// The cursor as received
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consume and return the cursor value
    pub fn into_value(self) -> Value {
        self.0
    }
}

/// One fetched slice of a paginated result
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T = Value> {
    /// Elements in the order the database returned them
    pub data: Vec<T>,

    /// Cursor for the preceding page, absent at the start of the set
    pub before: Option<Cursor>,

    /// Cursor for the following page, absent at the end of the set
    pub after: Option<Cursor>,
}

impl<T> Page<T> {
    /// Create a page
    pub fn new(data: Vec<T>, before: Option<Cursor>, after: Option<Cursor>) -> Self {
        Self {
            data,
            before,
            after,
        }
    }

    /// Replace every element by `f(element)`; cursors are kept as they are
    pub fn map_data<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            data: self.data.into_iter().map(f).collect(),
            before: self.before,
            after: self.after,
        }
    }

    /// Returns true if no page follows this one
    pub fn is_last(&self) -> bool {
        self.after.is_none()
    }

    /// Number of elements on this page
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the page carries no elements
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Page<Value> {
    /// Assemble a page from a decoded `{data, before?, after?}` mapping
    ///
    /// A `null` cursor counts as absent.
    pub fn from_value(value: Value) -> Result<Self> {
        let mut map = match value {
            Value::Object(map) => map,
            other => {
                return Err(Error::format(format!(
                    "page must be an object, found {}",
                    other.type_name()
                )));
            }
        };

        let data = match map.remove("data") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(Error::format(format!(
                    "page data must be an array, found {}",
                    other.type_name()
                )));
            }
            None => return Err(Error::format("page is missing 'data'")),
        };

        Ok(Self {
            data,
            before: take_cursor(&mut map, "before"),
            after: take_cursor(&mut map, "after"),
        })
    }
}

fn take_cursor(map: &mut Object, key: &str) -> Option<Cursor> {
    match map.remove(key) {
        None | Some(Value::Null) => None,
        Some(value) => Some(Cursor(value)),
    }
}
