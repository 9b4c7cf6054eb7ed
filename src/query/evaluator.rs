use crate::fields::{FieldSet, FieldValue};
use crate::query::types::{CmpOp, Comparison, Expr, Operand};

impl Expr {
    /// Evaluate the expression against one record's fields
    ///
    /// Total: never panics, never errors. A comparison on a name the record
    /// does not carry is false, including for `!=`.
    #[must_use]
    pub fn matches(&self, fields: &FieldSet) -> bool {
        match self {
            Self::All(clauses) => clauses.iter().all(|c| c.matches(fields)),
            Self::Any(clauses) => clauses.iter().any(|c| c.matches(fields)),
            Self::Not(inner) => !inner.matches(fields),
            Self::Cmp(cmp) => cmp.matches(fields),
        }
    }
}

impl Comparison {
    /// True when any field carrying this comparison's name satisfies it
    #[must_use]
    pub fn matches(&self, fields: &FieldSet) -> bool {
        fields
            .values_named(&self.field)
            .any(|value| self.matches_value(value))
    }

    fn matches_value(&self, value: &FieldValue) -> bool {
        match (self.op, &self.operand) {
            (CmpOp::Eq, operand) => eq_value(value, operand),
            (CmpOp::NotEq, operand) => !eq_value(value, operand),
            (CmpOp::Contains, Operand::Text(needle)) => value
                .display_form()
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            (CmpOp::Gt, Operand::Number(n)) => value.to_number().is_some_and(|v| v > *n),
            (CmpOp::Ge, Operand::Number(n)) => value.to_number().is_some_and(|v| v >= *n),
            (CmpOp::Lt, Operand::Number(n)) => value.to_number().is_some_and(|v| v < *n),
            (CmpOp::Le, Operand::Number(n)) => value.to_number().is_some_and(|v| v <= *n),
            (CmpOp::Gt, Operand::Date(d)) => value.to_date().is_some_and(|v| v > *d),
            (CmpOp::Ge, Operand::Date(d)) => value.to_date().is_some_and(|v| v >= *d),
            (CmpOp::Lt, Operand::Date(d)) => value.to_date().is_some_and(|v| v < *d),
            (CmpOp::Le, Operand::Date(d)) => value.to_date().is_some_and(|v| v <= *d),
            (CmpOp::Matches, Operand::Regex(re)) => re.is_match(&value.display_form()),
            (CmpOp::Like, Operand::Glob(pattern)) => {
                pattern.matches(&value.display_form().to_lowercase())
            }
            // Operator/operand pairs the parser never produces
            _ => false,
        }
    }
}

fn eq_value(value: &FieldValue, operand: &Operand) -> bool {
    match operand {
        Operand::Number(n) => value.to_number() == Some(*n),
        Operand::Date(d) => value.to_date() == Some(*d),
        Operand::Text(t) => value.display_form().eq_ignore_ascii_case(t),
        Operand::Regex(_) | Operand::Glob(_) => false,
    }
}
