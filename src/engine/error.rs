//! Engine-specific error types
//!
//! Construction is the only fallible part of the engine's public surface:
//! once running, every failure path inside the engine degrades to showing
//! the full collection and a logged diagnostic instead of surfacing an
//! error to the caller.

use thiserror::Error;

/// Engine-specific errors
#[derive(Debug, Error)]
pub enum EngineError {
    /// A background thread could not be spawned
    #[error("Failed to spawn {name} thread: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },
}
