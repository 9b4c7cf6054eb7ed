use chrono::NaiveDate;
use glob::Pattern;
use regex::Regex;

/// A parsed filter expression
///
/// `&` binds tighter than `|`; `!` and parentheses tighter still.
#[derive(Debug, Clone)]
pub enum Expr {
    /// Every clause must match
    All(Vec<Expr>),
    /// At least one clause must match
    Any(Vec<Expr>),
    /// Negation
    Not(Box<Expr>),
    /// A single field comparison
    Cmp(Comparison),
}

/// One `field OP value` clause
#[derive(Debug, Clone)]
pub struct Comparison {
    pub field: String,
    pub op: CmpOp,
    pub operand: Operand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    /// `=` case-insensitive equality, with numeric/date coercion
    Eq,
    /// `!=`
    NotEq,
    /// `>` numeric or date
    Gt,
    /// `>=`
    Ge,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `:` case-insensitive substring containment
    Contains,
    /// `~` regular-expression match
    Matches,
    /// `like` glob-pattern match, case-insensitive
    Like,
}

/// The right-hand side of a comparison, typed at parse time
#[derive(Debug, Clone)]
pub enum Operand {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    /// Compiled for `~`; invalid patterns are parse errors
    Regex(Regex),
    /// Compiled (lowercased) for `like`
    Glob(Pattern),
}
