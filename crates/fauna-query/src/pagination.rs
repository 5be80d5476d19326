//! Cursor bookkeeping shared by the blocking iterator and the async stream
//!
//! A [`PageWalker`] owns everything about a walk over a set except the
//! executor: the query, the cursor state, the client-side mapper and the
//! elements of the current page not yet handed out.

use crate::config::IteratorConfig;
use crate::expr::{self, Expr};
use fauna_core::{Cursor, Result, Value};
use fauna_protocol::{decode_page, PageOptions};
use serde_json::Value as JsonValue;
use std::collections::VecDeque;
use std::fmt;
use tracing::debug;

/// Position of a walk over a set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorState {
    /// Nothing fetched yet; the next fetch starts at the beginning of the set
    Initial,

    /// More data follows this cursor
    After(Cursor),

    /// The last page has been fetched
    Exhausted,
}

impl CursorState {
    /// Options for the next fetch, or `None` once exhausted
    pub fn page_options(&self, size: usize) -> Option<PageOptions> {
        match self {
            CursorState::Initial => Some(PageOptions::new(size)),
            CursorState::After(cursor) => Some(PageOptions::new(size).after(cursor.clone())),
            CursorState::Exhausted => None,
        }
    }

    /// Check if no further fetch will happen
    pub fn is_exhausted(&self) -> bool {
        matches!(self, CursorState::Exhausted)
    }
}

/// Client-side element transformation
pub type ClientMapper = Box<dyn FnMut(Value) -> Value + Send>;

/// How fetched elements are transformed before they are yielded
///
/// A walk uses at most one mapping.
#[derive(Default)]
pub enum Mapping {
    /// Elements are yielded as the database returns them
    #[default]
    None,

    /// A lambda expression the database applies to every element of a page
    Server(Expr),

    /// A function applied to every decoded element after the fetch
    Client(ClientMapper),
}

impl Mapping {
    /// Server-side mapping through `lambda`
    pub fn server(lambda: impl Into<Expr>) -> Self {
        Mapping::Server(lambda.into())
    }

    /// Client-side mapping through `f`
    pub fn client<F>(f: F) -> Self
    where
        F: FnMut(Value) -> Value + Send + 'static,
    {
        Mapping::Client(Box::new(f))
    }
}

impl fmt::Debug for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mapping::None => f.write_str("None"),
            Mapping::Server(lambda) => f.debug_tuple("Server").field(lambda).finish(),
            Mapping::Client(_) => f.write_str("Client(..)"),
        }
    }
}

/// Executor-independent state of a walk over a set
pub struct PageWalker {
    query: Expr,
    page_size: usize,
    mapper: Option<ClientMapper>,
    state: CursorState,
    buffer: VecDeque<Value>,
    pages_fetched: usize,
}

impl PageWalker {
    /// Start a walk over `set`
    pub fn new(set: Expr, mapping: Mapping, config: &IteratorConfig) -> Result<Self> {
        config.validate()?;

        let (query, mapper) = match mapping {
            Mapping::None => (set, None),
            Mapping::Server(lambda) => (expr::map(lambda, set), None),
            Mapping::Client(f) => (set, Some(f)),
        };

        Ok(Self {
            query,
            page_size: config.page_size,
            mapper,
            state: CursorState::Initial,
            buffer: VecDeque::new(),
            pages_fetched: 0,
        })
    }

    /// The expression handed to the executor on every fetch
    pub fn query(&self) -> &Expr {
        &self.query
    }

    /// Current cursor state
    pub fn state(&self) -> &CursorState {
        &self.state
    }

    /// Number of pages fetched successfully so far
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Number of fetched elements not yet handed out
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Next element of the current page
    pub fn pop(&mut self) -> Option<Value> {
        self.buffer.pop_front()
    }

    /// Options for the next fetch, or `None` once the set is exhausted
    pub fn next_options(&self) -> Option<PageOptions> {
        self.state.page_options(self.page_size)
    }

    /// Take in a raw page returned by the executor
    ///
    /// State is only touched once the page has decoded, so a failed page
    /// leaves the walk where it was.
    pub fn accept(&mut self, raw: &JsonValue) -> Result<()> {
        let page = decode_page(raw)?;
        let page = match self.mapper.as_mut() {
            Some(mapper) => page.map_data(|v| mapper(v)),
            None => page,
        };

        self.pages_fetched += 1;
        debug!(
            "Fetched page {} with {} elements (more: {})",
            self.pages_fetched,
            page.data.len(),
            page.after.is_some()
        );

        self.state = match page.after {
            Some(cursor) => CursorState::After(cursor),
            None => {
                debug!("Set exhausted after {} pages", self.pages_fetched);
                CursorState::Exhausted
            }
        };
        self.buffer.extend(page.data);
        Ok(())
    }

    /// Lower and upper bound of the remaining element count
    pub fn size_hint(&self) -> (usize, Option<usize>) {
        let buffered = self.buffer.len();
        if self.state.is_exhausted() {
            (buffered, Some(buffered))
        } else {
            (buffered, None)
        }
    }
}

impl fmt::Debug for PageWalker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageWalker")
            .field("query", &self.query)
            .field("page_size", &self.page_size)
            .field("client_mapper", &self.mapper.is_some())
            .field("state", &self.state)
            .field("buffered", &self.buffer.len())
            .field("pages_fetched", &self.pages_fetched)
            .finish()
    }
}
