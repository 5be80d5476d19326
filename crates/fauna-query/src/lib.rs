//! FaunaDB Set Iteration
//!
//! Walks remote sets page by page.
//!
//! # Overview
//!
//! The query crate provides:
//! - Builders for the expressions that drive pagination
//! - Cursor bookkeeping independent of any transport
//! - A blocking [`SetIterator`] over a [`QueryExecutor`]
//! - An async stream over an [`AsyncQueryExecutor`]
//! - Server-side and client-side element mapping

pub mod config;
pub mod executor;
pub mod expr;
pub mod pagination;
pub mod stream;

pub use config::{IteratorConfig, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use executor::{set_iterator, FnExecutor, QueryExecutor, SetIterator};
pub use expr::{paginate_query, Expr};
pub use pagination::{ClientMapper, CursorState, Mapping, PageWalker};
pub use stream::{set_stream, AsyncQueryExecutor, SetStream};
