//! Column schema: which remote fields each column of the view displays.
//!
//! The schema is the only place field names enter the engine, so it is also
//! where they are validated. Each field carries a declared [`FieldType`] that
//! incoming values are checked against, one field at a time.

use crate::{error::Result, ColumnName, Error, FieldName};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::warn;

/// Field types a status value can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Int,
    Float,
    Bool,
    /// Arbitrary nested JSON
    Json,
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::String => write!(f, "String"),
            FieldType::Int => write!(f, "Int"),
            FieldType::Float => write!(f, "Float"),
            FieldType::Bool => write!(f, "Bool"),
            FieldType::Json => write!(f, "Json"),
        }
    }
}

/// A remote field shown by a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDef {
    /// Remote field name
    pub name: FieldName,
    /// Declared value type
    pub field_type: FieldType,
}

impl FieldDef {
    /// Create a new field definition.
    pub fn new(name: impl Into<FieldName>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }

    /// Check a value against the declared type.
    ///
    /// Null is only accepted by [`FieldType::Json`]; a numeric field never
    /// accepts a string that looks like a number.
    pub fn check(&self, value: &serde_json::Value) -> Result<()> {
        let valid = match self.field_type {
            FieldType::String => value.is_string(),
            FieldType::Int => value.is_i64() || value.is_u64(),
            FieldType::Float => value.is_number(),
            FieldType::Bool => value.is_boolean(),
            FieldType::Json => true,
        };

        if valid {
            Ok(())
        } else {
            Err(Error::TypeMismatch {
                field: self.name.clone(),
                expected: self.field_type.to_string(),
                got: json_type_name(value).to_string(),
            })
        }
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "Null",
        serde_json::Value::Bool(_) => "Bool",
        serde_json::Value::Number(n) if n.is_i64() || n.is_u64() => "Int",
        serde_json::Value::Number(_) => "Float",
        serde_json::Value::String(_) => "String",
        serde_json::Value::Array(_) => "Array",
        serde_json::Value::Object(_) => "Object",
    }
}

/// A column of the view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDef {
    /// Column name, unique within a schema
    pub name: ColumnName,
    /// Remote fields rendered by this column, in cell order
    pub fields: Vec<FieldDef>,
    /// Toggled by the user through the column menu
    pub visible: bool,
    /// Internal columns are never shown nor synced
    pub hidden: bool,
}

impl ColumnDef {
    /// Create a visible column.
    pub fn new(name: impl Into<ColumnName>, fields: Vec<FieldDef>) -> Self {
        Self {
            name: name.into(),
            fields,
            visible: true,
            hidden: false,
        }
    }

    /// Create a hidden column. Hidden columns never take part in a poll.
    pub fn hidden(name: impl Into<ColumnName>, fields: Vec<FieldDef>) -> Self {
        Self {
            hidden: true,
            ..Self::new(name, fields)
        }
    }

    /// A column is syncable iff it is visible, not hidden, and has fields.
    pub fn is_syncable(&self) -> bool {
        self.visible && !self.hidden && !self.fields.is_empty()
    }

    /// Names of the fields this column displays.
    pub fn field_names(&self) -> impl Iterator<Item = &FieldName> {
        self.fields.iter().map(|f| &f.name)
    }

    /// Check whether this column displays the given field.
    pub fn shows(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.name == field)
    }
}

/// All columns of the view, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSchema {
    columns: Vec<ColumnDef>,
    /// Declared type per field, shared across columns
    field_types: HashMap<FieldName, FieldType>,
}

impl ColumnSchema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard torrent list columns.
    pub fn torrent_default() -> Self {
        let mut schema = Self::new();
        for column in default_columns() {
            if let Err(e) = schema.register(column) {
                warn!(error = %e, "Skipping default column");
            }
        }
        schema
    }

    /// Register a column.
    ///
    /// Rejects an empty or duplicate column name, an empty field name, a field
    /// listed twice in the same column, and a field that an earlier column
    /// declared with a different type. On error the schema is unchanged.
    pub fn register(&mut self, column: ColumnDef) -> Result<()> {
        if column.name.is_empty() {
            return Err(Error::EmptyColumnName);
        }
        if self.get(&column.name).is_some() {
            return Err(Error::DuplicateColumn(column.name));
        }

        let mut seen = BTreeSet::new();
        for field in &column.fields {
            if field.name.is_empty() {
                return Err(Error::EmptyFieldName(column.name.clone()));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(Error::DuplicateField {
                    column: column.name.clone(),
                    field: field.name.clone(),
                });
            }
            if let Some(existing) = self.field_types.get(&field.name) {
                if *existing != field.field_type {
                    return Err(Error::FieldTypeConflict {
                        field: field.name.clone(),
                        existing: existing.to_string(),
                        declared: field.field_type.to_string(),
                    });
                }
            }
        }

        for field in &column.fields {
            self.field_types
                .insert(field.name.clone(), field.field_type);
        }
        self.columns.push(column);
        Ok(())
    }

    /// Builder-style method to register a column.
    pub fn with_column(mut self, column: ColumnDef) -> Result<Self> {
        self.register(column)?;
        Ok(self)
    }

    /// Get a column by name.
    pub fn get(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// All columns in registration order.
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Columns that take part in a poll.
    pub fn syncable_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| c.is_syncable())
    }

    /// Union of the fields of all syncable columns, deduplicated.
    pub fn active_fields(&self) -> BTreeSet<FieldName> {
        self.syncable_columns()
            .flat_map(|c| c.field_names().cloned())
            .collect()
    }

    /// Columns displaying the given field, syncable or not.
    pub fn columns_for(&self, field: &str) -> Vec<&ColumnDef> {
        self.columns.iter().filter(|c| c.shows(field)).collect()
    }

    /// Show or hide a column.
    pub fn set_visible(&mut self, name: &str, visible: bool) -> Result<()> {
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| Error::UnknownColumn(name.to_string()))?;
        column.visible = visible;
        Ok(())
    }

    /// Declared type of a field.
    pub fn field_type(&self, field: &str) -> Option<FieldType> {
        self.field_types.get(field).copied()
    }

    /// Check whether any column declares the field.
    pub fn knows_field(&self, field: &str) -> bool {
        self.field_types.contains_key(field)
    }

    /// Validate one incoming value against its field's declared type.
    pub fn check_value(&self, field: &str, value: &serde_json::Value) -> Result<()> {
        let field_type = self
            .field_type(field)
            .ok_or_else(|| Error::UnknownField(field.to_string()))?;
        FieldDef::new(field, field_type).check(value)
    }
}

fn default_columns() -> Vec<ColumnDef> {
    use FieldType::*;

    let columns = [
        ("Name", vec![("state", String), ("name", String)]),
        ("Size", vec![("total_size", Int)]),
        ("Progress", vec![("progress", Float), ("state", String)]),
        ("Seeders", vec![("num_seeds", Int), ("total_seeds", Int)]),
        ("Peers", vec![("num_peers", Int), ("total_peers", Int)]),
        ("Down Speed", vec![("download_payload_rate", Float)]),
        ("Up Speed", vec![("upload_payload_rate", Float)]),
        ("ETA", vec![("eta", Int)]),
        ("Ratio", vec![("ratio", Float)]),
        ("Avail", vec![("distributed_copies", Float)]),
    ];

    columns
        .into_iter()
        .map(|(name, fields)| {
            let fields = fields
                .into_iter()
                .map(|(field, ty)| FieldDef::new(field, ty))
                .collect();
            ColumnDef::new(name, fields)
        })
        .collect()
}
