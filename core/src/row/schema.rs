/*
 * schema.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Mailrow, mail archive steps for row pipelines.
 *
 * Mailrow is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Mailrow is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Mailrow.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Ordered row schema (field name, type, originating step).

use crate::row::value::{Value, ValueError, ValueType};
use crate::row::Row;
use serde::{Deserialize, Serialize};

/// Metadata for one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMeta {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    /// Name of the step that added the field, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

impl FieldMeta {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            origin: None,
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }
}

/// Ordered list of fields. Consumers address columns positionally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowSchema {
    fields: Vec<FieldMeta>,
}

impl RowSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fields(fields: Vec<FieldMeta>) -> Self {
        Self { fields }
    }

    pub fn push(&mut self, field: FieldMeta) {
        self.fields.push(field);
    }

    pub fn fields(&self) -> &[FieldMeta] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&FieldMeta> {
        self.fields.get(index)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Position of the first field named `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Check width and per-column types of `row`.
    pub fn validate(&self, row: &Row) -> Result<(), ValueError> {
        if row.len() != self.fields.len() {
            return Err(ValueError::Width {
                expected: self.fields.len(),
                found: row.len(),
            });
        }
        for (field, value) in self.fields.iter().zip(row) {
            if !value.matches(field.value_type) {
                return Err(ValueError::Mismatch {
                    field: field.name.clone(),
                    expected: field.value_type,
                    found: value
                        .value_type()
                        .map(|t| t.to_string())
                        .unwrap_or_else(|| "null".to_string()),
                });
            }
        }
        Ok(())
    }

    /// Decode a JSON array into a row, positionally, against this schema.
    pub fn row_from_json(&self, json: &serde_json::Value) -> Result<Row, ValueError> {
        let cells = json.as_array().ok_or(ValueError::NotArray)?;
        if cells.len() != self.fields.len() {
            return Err(ValueError::Width {
                expected: self.fields.len(),
                found: cells.len(),
            });
        }
        self.fields
            .iter()
            .zip(cells)
            .map(|(f, cell)| Value::from_json(cell, f.value_type, &f.name))
            .collect()
    }

    pub fn row_to_json(row: &Row) -> serde_json::Value {
        serde_json::Value::Array(row.iter().map(Value::to_json).collect())
    }
}
