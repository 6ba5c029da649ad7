//! Error types for the torrent view engine.

use crate::{ColumnName, FieldName, RecordId};
use thiserror::Error;

/// All possible errors from the engine.
///
/// None of these are fatal: callers log them and carry on with a view that is
/// at worst temporarily stale.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Schema errors
    #[error("column already registered: {0}")]
    DuplicateColumn(ColumnName),

    #[error("column name is empty")]
    EmptyColumnName,

    #[error("column '{0}' declares a field with an empty name")]
    EmptyFieldName(ColumnName),

    #[error("column '{column}' lists field '{field}' more than once")]
    DuplicateField { column: ColumnName, field: FieldName },

    #[error("column not found: {0}")]
    UnknownColumn(ColumnName),

    #[error("field not declared by any column: {0}")]
    UnknownField(FieldName),

    #[error("field '{field}' declared as {existing} by an earlier column, got {declared}")]
    FieldTypeConflict {
        field: FieldName,
        existing: String,
        declared: String,
    },

    #[error("type mismatch for field '{field}': expected {expected}, got {got}")]
    TypeMismatch {
        field: FieldName,
        expected: String,
        got: String,
    },

    // Store errors
    #[error("record not found: {0}")]
    RecordNotFound(RecordId),

    #[error("record already exists: {0}")]
    RecordAlreadyExists(RecordId),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Error::RecordNotFound("abc".into());
        assert_eq!(err.to_string(), "record not found: abc");

        let err = Error::TypeMismatch {
            field: "progress".into(),
            expected: "Float".into(),
            got: "String".into(),
        };
        assert_eq!(
            err.to_string(),
            "type mismatch for field 'progress': expected Float, got String"
        );

        let err = Error::FieldTypeConflict {
            field: "state".into(),
            existing: "String".into(),
            declared: "Int".into(),
        };
        assert_eq!(
            err.to_string(),
            "field 'state' declared as String by an earlier column, got Int"
        );

        let err = Error::DuplicateField {
            column: "Progress".into(),
            field: "state".into(),
        };
        assert_eq!(
            err.to_string(),
            "column 'Progress' lists field 'state' more than once"
        );
    }
}
