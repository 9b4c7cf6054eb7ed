//! Incremental filter engine
//!
//! The engine owns a frozen record collection and resolves a mutable query
//! string against it without ever blocking the caller. Keystrokes go in via
//! [`FilterEngine::set_query`]; after a debounce window the query is
//! committed and dispatched to one of two strategies:
//!
//! - plain text: case-insensitive substring match over every extracted
//!   field, on a background worker thread;
//! - text carrying the expression prefix (`/f` by default): the
//!   [`query`](crate::query) filter-expression language, evaluated over
//!   named fields.
//!
//! Results always land in committed-query order. Rapid re-queries restart
//! the debounce window; a result belonging to a superseded query is
//! discarded rather than applied. Expression errors and worker failures
//! degrade to showing the full collection with a logged diagnostic; the
//! caller's render path never sees an error and the busy flag never sticks.
//!
//! Each engine instance is self-contained: its own control thread, its own
//! lazily spawned worker, no shared globals. Dropping the engine joins both
//! threads.

mod cache;
mod control;
mod error;
mod state;
mod worker;

pub use error::EngineError;

use std::sync::Arc;
use std::sync::mpsc::{Sender, channel};
use std::thread::{Builder, JoinHandle};

use crate::config::EngineConfig;
use crate::engine::cache::ResultCache;
use crate::engine::control::{Control, ControlMsg};
use crate::engine::state::{Notify, Shared};
use crate::engine::worker::WorkerContext;
use crate::fields::{FieldSet, FieldSource};
use crate::matcher::Haystack;

/// A debounced, background-threaded incremental filter over a fixed record
/// collection
///
/// See the [module documentation](self) for the behavioral contract.
pub struct FilterEngine<T> {
    shared: Arc<Shared<T>>,
    control_tx: Sender<ControlMsg>,
    control: Option<JoinHandle<()>>,
}

impl<T> FilterEngine<T>
where
    T: FieldSource + Clone + Send + Sync + 'static,
{
    /// Create an engine over `records` with the default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the control thread cannot be spawned.
    pub fn new(records: Vec<T>) -> Result<Self, EngineError> {
        Self::build(records, EngineConfig::default(), None)
    }

    /// Create an engine with an explicit configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the control thread cannot be spawned.
    pub fn with_config(records: Vec<T>, config: EngineConfig) -> Result<Self, EngineError> {
        Self::build(records, config, None)
    }

    /// Create an engine whose `notify` callback fires after every committed
    /// result
    ///
    /// The callback runs on an engine thread; keep it cheap (wake an event
    /// loop, bump a counter).
    ///
    /// # Errors
    ///
    /// Returns an error if the control thread cannot be spawned.
    pub fn with_notify(
        records: Vec<T>,
        config: EngineConfig,
        notify: impl Fn() + Send + Sync + 'static,
    ) -> Result<Self, EngineError> {
        Self::build(records, config, Some(Arc::new(notify)))
    }

    fn build(
        records: Vec<T>,
        config: EngineConfig,
        notify: Option<Notify>,
    ) -> Result<Self, EngineError> {
        let records: Arc<[T]> = records.into();

        // Extract once; the collection is frozen for the engine's lifetime
        let mut haystacks = Vec::with_capacity(records.len());
        let mut field_sets = Vec::with_capacity(records.len());
        for record in records.iter() {
            let mut fields = FieldSet::new();
            record.collect_fields(&mut fields);
            haystacks.push(Haystack::from_fields(&fields));
            field_sets.push(fields);
        }

        let shared = Arc::new(Shared::new(records, notify));
        let ctx = WorkerContext {
            shared: shared.clone(),
            haystacks: haystacks.into(),
            field_sets: field_sets.into(),
            cache: Arc::new(ResultCache::new(config.cache_capacity)),
            parallel_min: config.parallel_min,
        };

        let (control_tx, control_rx) = channel();
        let control = Control::new(control_rx, config, ctx);
        let handle = Builder::new()
            .name("siftr-control".to_string())
            .spawn(move || control.run())
            .map_err(|source| EngineError::Spawn {
                name: "control",
                source,
            })?;

        Ok(Self {
            shared,
            control_tx,
            control: Some(handle),
        })
    }

    /// Record new raw input
    ///
    /// Never blocks and has no immediate effect on the committed result;
    /// the query only takes effect once it survives the debounce window.
    pub fn set_query(&self, text: &str) {
        if self
            .control_tx
            .send(ControlMsg::Query(text.to_string()))
            .is_err()
        {
            log::warn!("query ignored: engine control thread is gone");
        }
    }

    /// The most recently committed result, initially the full collection
    ///
    /// Ordered as the input collection; an empty result is an empty
    /// sequence, never an error.
    #[must_use]
    pub fn current_result(&self) -> Arc<[T]> {
        self.shared.current_result()
    }

    /// Number of records in the committed result, for row-count displays
    #[must_use]
    pub fn match_count(&self) -> usize {
        self.shared.current_result().len()
    }

    /// True while a dispatch for the latest committed query is outstanding
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.shared.is_busy()
    }
}

impl<T> Drop for FilterEngine<T> {
    fn drop(&mut self) {
        let _ = self.control_tx.send(ControlMsg::Shutdown);
        if let Some(handle) = self.control.take() {
            let _ = handle.join();
        }
    }
}
