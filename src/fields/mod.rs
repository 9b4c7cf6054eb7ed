//! Record field extraction
//!
//! Filtering never inspects records directly. Each record type implements
//! [`FieldSource`], which projects the record into a flat [`FieldSet`] of
//! named values. The substring strategy matches against the display form of
//! every field; the expression strategy looks fields up by name with type
//! coercion.
//!
//! Nested collections (e.g. an account's sites) are flattened by the
//! implementor under dotted names such as `sites.name`, so they participate
//! in both strategies. A `FieldSet` may hold several fields with the same
//! name; name-based lookups yield all of them.

use chrono::NaiveDate;

/// A single extracted field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Free text
    Text(String),
    /// Numeric value (integers included)
    Number(f64),
    /// Calendar date
    Date(NaiveDate),
}

impl FieldValue {
    /// Textual form used for substring matching and display
    ///
    /// Whole numbers render without a trailing `.0` so a query like "42"
    /// matches a numeric field holding 42.
    #[must_use]
    pub fn display_form(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => format_number(*n),
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }

    /// Numeric interpretation, coercing text that parses as a number
    #[must_use]
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Date(_) => None,
        }
    }

    /// Date interpretation, coercing ISO-formatted text
    #[must_use]
    pub fn to_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            Self::Text(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok(),
            Self::Number(_) => None,
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// A named field extracted from a record
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub value: FieldValue,
}

/// The flat projection of one record, in extraction order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSet {
    fields: Vec<Field>,
}

impl FieldSet {
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Add a text field
    pub fn push_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push(Field {
            name: name.into(),
            value: FieldValue::Text(value.into()),
        });
    }

    /// Add a numeric field
    pub fn push_number(&mut self, name: impl Into<String>, value: f64) {
        self.fields.push(Field {
            name: name.into(),
            value: FieldValue::Number(value),
        });
    }

    /// Add a date field
    pub fn push_date(&mut self, name: impl Into<String>, value: NaiveDate) {
        self.fields.push(Field {
            name: name.into(),
            value: FieldValue::Date(value),
        });
    }

    /// All fields in extraction order
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// All values carrying the given name (duplicates included)
    pub fn values_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a FieldValue> + 'a {
        self.fields
            .iter()
            .filter(move |f| f.name == name)
            .map(|f| &f.value)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Projects a record into the set of fields eligible for filtering
///
/// Implementations decide which fields are searchable and how nested
/// structures flatten. Extraction runs once per record when an engine is
/// built, so it may clone freely.
pub trait FieldSource {
    /// Push every searchable field of `self` into `out`
    fn collect_fields(&self, out: &mut FieldSet);
}

/// Extraction for raw JSON records, as decoded from a REST payload
///
/// Top-level string, number and boolean members become fields under their
/// own key. One level of nesting is flattened: members of a nested object,
/// and of every object inside a nested array, are pushed under dotted names
/// (`parent.child`). Scalar array elements are pushed under the array's own
/// key. Deeper nesting and nulls are ignored.
impl FieldSource for serde_json::Value {
    fn collect_fields(&self, out: &mut FieldSet) {
        let Some(map) = self.as_object() else {
            return;
        };
        for (key, value) in map {
            match value {
                serde_json::Value::Array(items) => {
                    for item in items {
                        if let Some(child) = item.as_object() {
                            for (child_key, child_value) in child {
                                push_json_scalar(out, &format!("{key}.{child_key}"), child_value);
                            }
                        } else {
                            push_json_scalar(out, key, item);
                        }
                    }
                }
                serde_json::Value::Object(child) => {
                    for (child_key, child_value) in child {
                        push_json_scalar(out, &format!("{key}.{child_key}"), child_value);
                    }
                }
                _ => push_json_scalar(out, key, value),
            }
        }
    }
}

fn push_json_scalar(out: &mut FieldSet, name: &str, value: &serde_json::Value) {
    match value {
        serde_json::Value::String(s) => out.push_text(name, s.as_str()),
        serde_json::Value::Number(n) => {
            if let Some(f) = n.as_f64() {
                out.push_number(name, f);
            }
        }
        serde_json::Value::Bool(b) => out.push_text(name, if *b { "true" } else { "false" }),
        _ => {}
    }
}
