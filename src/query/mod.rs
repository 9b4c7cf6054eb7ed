//! Filter-expression language for advanced queries
//!
//! Queries carrying the engine's expression prefix (`/f` by default) are
//! parsed into a small structured syntax and evaluated over extracted record
//! fields instead of substring-matched:
//!
//! ```text
//! status = active
//! balance >= 250 & opened < 2025-01-01
//! city like "os*" | sites.name : harbor
//! !(code ~ "^X[0-9]+$")
//! ```
//!
//! Comparisons are `field OP value` with `=` `!=` `>` `>=` `<` `<=`
//! (numeric/date), `:` (contains), `~` (regex) and `like` (glob). Clauses
//! combine with `&`, `|`, `!` and parentheses; `&` binds tighter than `|`.
//! Values may be bare words, quoted strings, numbers or ISO dates; quoting
//! forces literal text comparison.
//!
//! Parsing is fallible and surfaced as [`ParseError`]; evaluation is total.

mod evaluator;
mod parser;
mod types;

pub use parser::{ParseError, parse};
pub use types::{CmpOp, Comparison, Expr, Operand};
