//! FaunaDB Core Library
//!
//! This crate provides the tagged value model and error handling shared by
//! the FaunaDB driver crates.
//!
//! # Overview
//!
//! Values exchanged with the database are plain JSON shapes plus a closed
//! set of database-native types: resource references, set expressions,
//! nanosecond timestamps and calendar dates. Every type here is an
//! immutable value object with structural equality and hashing.
//!
//! # Modules
//!
//! - `value` - The decoded [`Value`] tree
//! - `reference` - Path-structured resource references
//! - `types` - Set expressions and history events
//! - `page` - Paginated result slices and cursors
//! - `temporal` - Timestamps and calendar dates
//! - `error` - Error types and result aliases

pub mod error;
pub mod page;
pub mod reference;
pub mod temporal;
pub mod types;
pub mod value;

pub use error::{Error, Result};
pub use page::{Cursor, Page};
pub use reference::Reference;
pub use temporal::{CalendarDate, Timestamp};
pub use types::{Action, Event, SetExpression};
pub use value::{Object, Value};
