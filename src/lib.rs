//! FaunaDB - Client data model and set pagination
//!
//! This is the main library crate that re-exports all driver components.

pub use fauna_core as core;
pub use fauna_protocol as protocol;
pub use fauna_query as query;

#[cfg(test)]
mod objects;

// Re-export commonly used types
pub use fauna_core::{
    Action, CalendarDate, Cursor, Error, Event, Object, Page, Reference, Result, SetExpression,
    Timestamp, Value,
};

pub use fauna_protocol::{decode, encode, PageOptions};
pub use fauna_query::{
    expr, set_iterator, set_stream, AsyncQueryExecutor, Expr, IteratorConfig, Mapping,
    QueryExecutor, SetIterator,
};
