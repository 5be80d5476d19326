//! Set Iteration
//!
//! Presents a remote, potentially unbounded set as a lazy sequence:
//! - Pages are fetched on demand, one at a time
//! - Elements come out in the order the database returns them
//! - A failed fetch leaves the cursor in place, so pulling again retries it

use crate::config::IteratorConfig;
use crate::expr::Expr;
use crate::pagination::{CursorState, Mapping, PageWalker};
use fauna_core::{Result, Value};
use fauna_protocol::PageOptions;
use serde_json::Value as JsonValue;
use std::iter::FusedIterator;
use std::sync::Arc;
use tracing::warn;

/// Capability that runs one page fetch against the database
///
/// `expression` is the set to page through, possibly wrapped in a
/// server-side `map`; [`crate::expr::paginate_query`] turns the pair into
/// the wire query. The returned JSON is the raw `{data, before?, after?}`
/// page. Cursors in `options` must be sent back exactly as received.
pub trait QueryExecutor {
    fn execute(&self, expression: &Expr, options: &PageOptions) -> Result<JsonValue>;
}

impl<E: QueryExecutor + ?Sized> QueryExecutor for &E {
    fn execute(&self, expression: &Expr, options: &PageOptions) -> Result<JsonValue> {
        (**self).execute(expression, options)
    }
}

impl<E: QueryExecutor + ?Sized> QueryExecutor for Box<E> {
    fn execute(&self, expression: &Expr, options: &PageOptions) -> Result<JsonValue> {
        (**self).execute(expression, options)
    }
}

impl<E: QueryExecutor + ?Sized> QueryExecutor for Arc<E> {
    fn execute(&self, expression: &Expr, options: &PageOptions) -> Result<JsonValue> {
        (**self).execute(expression, options)
    }
}

/// Adapts a closure into a [`QueryExecutor`]
pub struct FnExecutor<F>(pub F);

impl<F> QueryExecutor for FnExecutor<F>
where
    F: Fn(&Expr, &PageOptions) -> Result<JsonValue>,
{
    fn execute(&self, expression: &Expr, options: &PageOptions) -> Result<JsonValue> {
        (self.0)(expression, options)
    }
}

/// Lazy, forward-only iterator over the elements of a set
///
/// Not restartable: build a new iterator to walk the set again.
#[derive(Debug)]
pub struct SetIterator<E> {
    executor: E,
    walker: PageWalker,
}

impl<E: QueryExecutor> SetIterator<E> {
    /// Iterate over `set` without mapping
    pub fn new(executor: E, set: impl Into<Expr>, config: &IteratorConfig) -> Result<Self> {
        Self::with_mapping(executor, set, Mapping::None, config)
    }

    /// Iterate over `set`, transforming elements per `mapping`
    pub fn with_mapping(
        executor: E,
        set: impl Into<Expr>,
        mapping: Mapping,
        config: &IteratorConfig,
    ) -> Result<Self> {
        Ok(Self {
            executor,
            walker: PageWalker::new(set.into(), mapping, config)?,
        })
    }

    /// Current cursor state
    pub fn cursor_state(&self) -> &CursorState {
        self.walker.state()
    }

    /// Number of pages fetched successfully so far
    pub fn pages_fetched(&self) -> usize {
        self.walker.pages_fetched()
    }

    fn fetch(&mut self, options: PageOptions) -> Result<()> {
        let raw = self
            .executor
            .execute(self.walker.query(), &options)
            .inspect_err(|e| warn!("Page fetch failed: {}", e))?;
        self.walker.accept(&raw)
    }
}

impl<E: QueryExecutor> Iterator for SetIterator<E> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(value) = self.walker.pop() {
                return Some(Ok(value));
            }
            // Empty pages that still carry a cursor are skipped
            let options = self.walker.next_options()?;
            if let Err(e) = self.fetch(options) {
                return Some(Err(e));
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.walker.size_hint()
    }
}

impl<E: QueryExecutor> FusedIterator for SetIterator<E> {}

/// Iterate over `set` with the default configuration
pub fn set_iterator<E: QueryExecutor>(executor: E, set: impl Into<Expr>) -> Result<SetIterator<E>> {
    SetIterator::new(executor, set, &IteratorConfig::default())
}
