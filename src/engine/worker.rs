//! Background filter worker
//!
//! A statically defined thread entry point, one worker per engine, spawned
//! lazily on the first dispatch. Requests carry the generation of the
//! commit that produced them; the worker collapses its queue to the newest
//! request before computing, and [`Shared::apply`] drops any result that
//! lost the race to a newer commit. Cancellation is soft: in-flight work is
//! never interrupted, its result is just discarded.

use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread::{Builder, JoinHandle};

use rayon::prelude::*;

use crate::engine::cache::ResultCache;
use crate::engine::error::EngineError;
use crate::engine::state::Shared;
use crate::fields::FieldSet;
use crate::matcher::{self, Haystack};
use crate::query::Expr;

/// One unit of filtering work, immutable once sent
pub(crate) struct FilterRequest {
    pub generation: u64,
    pub kind: WorkKind,
}

/// Strategy selected for a committed query
pub(crate) enum WorkKind {
    /// Case-insensitive substring scan; the needle is pre-lowercased
    Substring(String),
    /// Filter-expression source text, prefix already stripped
    Expression(String),
}

/// Everything the worker needs, cloned per spawn
pub(crate) struct WorkerContext<T> {
    pub shared: Arc<Shared<T>>,
    pub haystacks: Arc<[Haystack]>,
    pub field_sets: Arc<[FieldSet]>,
    pub cache: Arc<ResultCache<T>>,
    pub parallel_min: usize,
}

impl<T> Clone for WorkerContext<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
            haystacks: self.haystacks.clone(),
            field_sets: self.field_sets.clone(),
            cache: self.cache.clone(),
            parallel_min: self.parallel_min,
        }
    }
}

pub(crate) struct Worker {
    tx: Sender<FilterRequest>,
    handle: JoinHandle<()>,
}

impl Worker {
    /// Spawn the worker thread for `ctx`
    pub fn spawn<T>(ctx: WorkerContext<T>) -> Result<Self, EngineError>
    where
        T: Clone + Send + Sync + 'static,
    {
        let (tx, rx) = channel();
        let handle = Builder::new()
            .name("siftr-worker".to_string())
            .spawn(move || worker_loop(&rx, &ctx))
            .map_err(|source| EngineError::Spawn {
                name: "worker",
                source,
            })?;
        Ok(Self { tx, handle })
    }

    /// Hand a request to the worker; gives the request back if the worker
    /// thread is gone so the caller can fall back
    pub fn submit(&self, request: FilterRequest) -> Result<(), FilterRequest> {
        self.tx.send(request).map_err(|e| e.0)
    }

    /// Disconnect and join; the worker exits once its queue drains
    pub fn shutdown(self) {
        let Self { tx, handle } = self;
        drop(tx);
        let _ = handle.join();
    }
}

fn worker_loop<T>(rx: &Receiver<FilterRequest>, ctx: &WorkerContext<T>)
where
    T: Clone + Send + Sync + 'static,
{
    while let Ok(mut request) = rx.recv() {
        // Collapse the queue to the newest outstanding request; superseded
        // work is skipped before it costs anything
        while let Ok(newer) = rx.try_recv() {
            log::debug!(
                "skipping superseded filter request (generation {})",
                request.generation
            );
            request = newer;
        }
        if ctx.shared.is_stale(request.generation) {
            log::debug!(
                "skipping stale filter request (generation {})",
                request.generation
            );
            continue;
        }

        let result = run_filter(&request.kind, ctx);
        if !ctx.shared.apply(request.generation, result) {
            log::debug!(
                "discarding stale filter result (generation {})",
                request.generation
            );
        }
    }
}

/// Resolve one request to a result candidate
///
/// Shared between the worker loop and the control thread's synchronous
/// fallback. Expression failures degrade to the full collection; filtering
/// is a convenience, not a correctness-critical path.
pub(crate) fn run_filter<T>(kind: &WorkKind, ctx: &WorkerContext<T>) -> Arc<[T]>
where
    T: Clone + Send + Sync + 'static,
{
    match kind {
        WorkKind::Substring(needle) => {
            let indices = matcher::filter_indices(&ctx.haystacks, needle, ctx.parallel_min);
            let result = ctx.shared.materialize(&indices);
            ctx.cache
                .insert(ResultCache::<T>::substring_key(needle), result.clone());
            result
        }
        WorkKind::Expression(source) => match Expr::try_from(source.as_str()) {
            Ok(expr) => {
                let indices = eval_indices(&expr, &ctx.field_sets, ctx.parallel_min);
                let result = ctx.shared.materialize(&indices);
                ctx.cache
                    .insert(ResultCache::<T>::expr_key(source), result.clone());
                result
            }
            Err(err) => {
                log::warn!("filter expression rejected, showing all records: {err}");
                ctx.shared.records().clone()
            }
        },
    }
}

#[allow(clippy::cast_possible_truncation)]
fn eval_indices(expr: &Expr, field_sets: &[FieldSet], parallel_min: usize) -> Vec<u32> {
    if field_sets.len() >= parallel_min {
        field_sets
            .par_iter()
            .enumerate()
            .filter(|(_, fields)| expr.matches(fields))
            .map(|(i, _)| i as u32)
            .collect()
    } else {
        field_sets
            .iter()
            .enumerate()
            .filter(|(_, fields)| expr.matches(fields))
            .map(|(i, _)| i as u32)
            .collect()
    }
}
