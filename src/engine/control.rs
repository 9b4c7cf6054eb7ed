//! Debounce control thread
//!
//! Owns the debounce window and query classification. A query must survive
//! the window uncontested to become committed; every keystroke restarts the
//! timer, so at most one dispatch happens per pause in typing. Committed
//! queries are classified (empty / expression / substring), checked against
//! the result cache, and handed to the worker, which is spawned on first
//! use and torn down with the engine.

use std::sync::mpsc::{Receiver, RecvTimeoutError};

use crate::config::EngineConfig;
use crate::engine::cache::ResultCache;
use crate::engine::worker::{FilterRequest, WorkKind, Worker, WorkerContext, run_filter};

pub(crate) enum ControlMsg {
    Query(String),
    Shutdown,
}

pub(crate) struct Control<T> {
    rx: Receiver<ControlMsg>,
    config: EngineConfig,
    ctx: WorkerContext<T>,
    worker: Option<Worker>,
}

impl<T> Control<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(rx: Receiver<ControlMsg>, config: EngineConfig, ctx: WorkerContext<T>) -> Self {
        Self {
            rx,
            config,
            ctx,
            worker: None,
        }
    }

    /// Thread entry point; returns when the engine shuts down
    pub fn run(mut self) {
        let debounce = self.config.debounce();

        'outer: loop {
            let mut query = match self.rx.recv() {
                Ok(ControlMsg::Query(query)) => query,
                Ok(ControlMsg::Shutdown) | Err(_) => break,
            };

            // Restart the window on every keystroke; commit once it lapses
            loop {
                match self.rx.recv_timeout(debounce) {
                    Ok(ControlMsg::Query(next)) => query = next,
                    Ok(ControlMsg::Shutdown) => break 'outer,
                    Err(RecvTimeoutError::Timeout) => break,
                    Err(RecvTimeoutError::Disconnected) => break 'outer,
                }
            }

            self.commit(&query);
        }

        if let Some(worker) = self.worker.take() {
            worker.shutdown();
        }
    }

    /// Classify and resolve one committed query
    fn commit(&mut self, raw: &str) {
        let generation = self.ctx.shared.next_generation();
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            self.ctx.shared.apply_full(generation);
            return;
        }

        if let Some(rest) = trimmed.strip_prefix(self.config.expr_prefix.as_str()) {
            let rest = rest.trim();
            // Not yet a valid expression; keep showing everything
            if rest.chars().count() < self.config.min_expr_len {
                self.ctx.shared.apply_full(generation);
                return;
            }
            self.dispatch(
                generation,
                ResultCache::<T>::expr_key(rest),
                WorkKind::Expression(rest.to_string()),
            );
        } else {
            let needle = trimmed.to_lowercase();
            let key = ResultCache::<T>::substring_key(&needle);
            self.dispatch(generation, key, WorkKind::Substring(needle));
        }
    }

    fn dispatch(&mut self, generation: u64, cache_key: String, kind: WorkKind) {
        if let Some(result) = self.ctx.cache.get(&cache_key) {
            self.ctx.shared.apply(generation, result);
            return;
        }

        self.ctx.shared.set_busy(true);
        let request = FilterRequest { generation, kind };
        if let Some(request) = self.try_submit(request) {
            self.resolve_inline(&request);
        }
    }

    /// Hand the request to the worker, spawning it on first use
    ///
    /// Gives the request back when no worker could take it.
    fn try_submit(&mut self, request: FilterRequest) -> Option<FilterRequest> {
        if self.worker.is_none() {
            match Worker::spawn(self.ctx.clone()) {
                Ok(worker) => self.worker = Some(worker),
                Err(err) => {
                    log::warn!(
                        "failed to spawn filter worker ({err}), filtering on the control thread"
                    );
                    return Some(request);
                }
            }
        }

        let Some(worker) = self.worker.take() else {
            return Some(request);
        };
        match worker.submit(request) {
            Ok(()) => {
                self.worker = Some(worker);
                None
            }
            Err(request) => {
                // The worker thread is gone; a fresh one will be spawned on
                // the next dispatch
                log::warn!("filter worker unavailable, filtering on the control thread");
                Some(request)
            }
        }
    }

    /// Synchronous fallback when no worker is available; the caller's
    /// thread is never involved, so responsiveness only degrades for
    /// subsequent keystrokes
    fn resolve_inline(&self, request: &FilterRequest) {
        let result = run_filter(&request.kind, &self.ctx);
        self.ctx.shared.apply(request.generation, result);
    }
}
