//! Siftr - an incremental filter engine for interactive selection lists
//!
//! This library keeps a UI responsive while filtering potentially large
//! in-memory collections under rapid, cancel-prone user input. Keystrokes
//! are debounced, filtering runs on a background worker thread, and results
//! always apply in committed-query order: a stale result never overwrites a
//! newer one.
//!
//! ```
//! use siftr::{EngineConfig, FilterEngine};
//! use serde_json::json;
//!
//! let records = vec![
//!     json!({"id": "A1", "notes": "north"}),
//!     json!({"id": "B2", "notes": "south"}),
//! ];
//! let config = EngineConfig { debounce_ms: 10, ..EngineConfig::default() };
//! let engine = FilterEngine::with_config(records, config).unwrap();
//!
//! engine.set_query("nor");
//! # std::thread::sleep(std::time::Duration::from_millis(500));
//! # while engine.is_busy() { std::thread::sleep(std::time::Duration::from_millis(5)); }
//! assert_eq!(engine.match_count(), 1);
//! ```
//!
//! Records implement [`FieldSource`] to expose their searchable fields
//! (`serde_json::Value` works out of the box). Queries carrying the `/f`
//! prefix use the structured [`query`] expression language instead of
//! substring matching.

use thiserror::Error;

pub mod config;
pub mod engine;
pub mod fields;
pub mod matcher;
pub mod query;

#[cfg(test)]
pub mod testing;

pub use config::EngineConfig;
pub use engine::{EngineError, FilterEngine};
pub use fields::{Field, FieldSet, FieldSource, FieldValue};
pub use query::{Expr, ParseError};

/// Error enum, contains all failure states of the crate
#[derive(Debug, Error)]
pub enum SiftrError {
    /// Engine lifecycle error
    #[error("Engine error: {0}")]
    EngineError(#[from] engine::EngineError),
    /// Filter-expression parse error
    #[error("Filter expression error: {0}")]
    ExpressionError(#[from] query::ParseError),
    /// Represents a configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ::config::ConfigError),
    /// Represents an I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
