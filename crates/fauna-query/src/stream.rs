//! Async set iteration
//!
//! The same walk as [`crate::SetIterator`], driven by an async executor and
//! exposed as a [`futures::Stream`]. Polling suspends only while a page
//! fetch is pending.

use crate::config::IteratorConfig;
use crate::expr::Expr;
use crate::pagination::{Mapping, PageWalker};
use async_trait::async_trait;
use fauna_core::{Result, Value};
use fauna_protocol::PageOptions;
use futures::stream::{self, BoxStream, StreamExt};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::warn;

/// Async counterpart of [`crate::QueryExecutor`]
#[async_trait]
pub trait AsyncQueryExecutor: Send + Sync {
    async fn execute(&self, expression: &Expr, options: &PageOptions) -> Result<JsonValue>;
}

#[async_trait]
impl<E: AsyncQueryExecutor + ?Sized> AsyncQueryExecutor for Arc<E> {
    async fn execute(&self, expression: &Expr, options: &PageOptions) -> Result<JsonValue> {
        (**self).execute(expression, options).await
    }
}

/// Stream over the elements of a set
pub type SetStream = BoxStream<'static, Result<Value>>;

struct StreamState<E> {
    executor: E,
    walker: PageWalker,
}

/// Lazily stream the elements of `set`, transformed per `mapping`
///
/// An `Err` item leaves the cursor in place; polling again retries the
/// failed fetch.
pub fn set_stream<E>(
    executor: E,
    set: impl Into<Expr>,
    mapping: Mapping,
    config: &IteratorConfig,
) -> Result<SetStream>
where
    E: AsyncQueryExecutor + 'static,
{
    let state = StreamState {
        executor,
        walker: PageWalker::new(set.into(), mapping, config)?,
    };

    Ok(stream::unfold(state, |mut state| async move {
        loop {
            if let Some(value) = state.walker.pop() {
                return Some((Ok(value), state));
            }
            let options = state.walker.next_options()?;
            // The walker is not Sync, so nothing borrowed from it may be held across the await
            let query = state.walker.query().clone();
            let fetched = match state.executor.execute(&query, &options).await {
                Ok(raw) => state.walker.accept(&raw),
                Err(e) => Err(e),
            };
            if let Err(e) = fetched {
                warn!("Page fetch failed: {}", e);
                return Some((Err(e), state));
            }
        }
    })
    .fuse()
    .boxed())
}
