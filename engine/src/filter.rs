//! The single active filter deciding which rows are shown.

use crate::{FieldName, Record};
use serde::{Deserialize, Serialize};

/// An optional `(field, expected)` pair.
///
/// With no field the filter matches everything. With a field, a record
/// matches only if it has that field and its value is exactly `expected`
/// (same JSON type and value; `1`, `1.0` and `"1"` are all different). A
/// missing `expected` is compared as JSON null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub field: Option<FieldName>,
    pub expected: Option<serde_json::Value>,
}

impl Filter {
    /// The filter that matches every record.
    pub fn none() -> Self {
        Self::default()
    }

    /// Filter on `field == expected`.
    pub fn equals(field: impl Into<FieldName>, expected: serde_json::Value) -> Self {
        Self {
            field: Some(field.into()),
            expected: Some(expected),
        }
    }

    /// Whether the filter restricts anything.
    pub fn is_active(&self) -> bool {
        self.field.is_some()
    }

    /// Evaluate the filter against a record.
    ///
    /// A record lacking the filtered field is hidden: it has simply not been
    /// loaded far enough to tell.
    pub fn matches(&self, record: &Record) -> bool {
        let Some(field) = &self.field else {
            return true;
        };

        match (record.field(field), &self.expected) {
            (None, _) => false,
            (Some(value), Some(expected)) => value == expected,
            (Some(value), None) => value.is_null(),
        }
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.field, &self.expected) {
            (None, _) => write!(f, "<none>"),
            (Some(field), Some(expected)) => write!(f, "{field} == {expected}"),
            (Some(field), None) => write!(f, "{field} == null"),
        }
    }
}
