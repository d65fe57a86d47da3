/*
 * value.rs
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

//! Typed cell values and their JSON interchange form.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Boolean,
    Integer,
    Number,
    String,
    Timestamp,
    Binary,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Boolean => "boolean",
            ValueType::Integer => "integer",
            ValueType::Number => "number",
            ValueType::String => "string",
            ValueType::Timestamp => "timestamp",
            ValueType::Binary => "binary",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One cell of a row. `Null` is valid for every column type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Number(f64),
    String(String),
    Timestamp(DateTime<Utc>),
    Binary(Vec<u8>),
}

#[derive(Debug, Error, PartialEq)]
pub enum ValueError {
    #[error("field {field}: expected {expected}, got {found}")]
    Mismatch {
        field: String,
        expected: ValueType,
        found: String,
    },
    #[error("row has {found} values, schema has {expected} fields")]
    Width { expected: usize, found: usize },
    #[error("row is not a JSON array")]
    NotArray,
}

impl Value {
    /// Type of a non-null value; None for `Null`.
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Value::Null => None,
            Value::Boolean(_) => Some(ValueType::Boolean),
            Value::Integer(_) => Some(ValueType::Integer),
            Value::Number(_) => Some(ValueType::Number),
            Value::String(_) => Some(ValueType::String),
            Value::Timestamp(_) => Some(ValueType::Timestamp),
            Value::Binary(_) => Some(ValueType::Binary),
        }
    }

    /// True if this value may sit in a column of type `t`.
    pub fn matches(&self, t: ValueType) -> bool {
        self.value_type().map_or(true, |own| own == t)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Text form of a scalar; None for `Null` and `Binary`.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Null | Value::Binary(_) => None,
            Value::Boolean(b) => Some(if *b { "Y" } else { "N" }.to_string()),
            Value::Integer(i) => Some(i.to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) => Some(s.clone()),
            Value::Timestamp(t) => Some(t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Integer(i) => serde_json::Value::from(*i),
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Timestamp(t) => {
                serde_json::Value::String(t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            Value::Binary(b) => serde_json::Value::String(BASE64.encode(b)),
        }
    }

    /// Interpret a JSON cell as a value of type `t`. `field` is used in error messages.
    pub fn from_json(v: &serde_json::Value, t: ValueType, field: &str) -> Result<Value, ValueError> {
        if v.is_null() {
            return Ok(Value::Null);
        }
        let converted = match t {
            ValueType::Boolean => v.as_bool().map(Value::Boolean),
            ValueType::Integer => v.as_i64().map(Value::Integer),
            ValueType::Number => v.as_f64().map(Value::Number),
            ValueType::String => v.as_str().map(|s| Value::String(s.to_string())),
            ValueType::Timestamp => v
                .as_str()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| Value::Timestamp(dt.with_timezone(&Utc))),
            ValueType::Binary => v
                .as_str()
                .and_then(|s| BASE64.decode(s).ok())
                .map(Value::Binary),
        };
        converted.ok_or_else(|| ValueError::Mismatch {
            field: field.to_string(),
            expected: t,
            found: v.to_string(),
        })
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(o: Option<T>) -> Self {
        o.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Timestamp(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn null_matches_every_type() {
        for t in [ValueType::Boolean, ValueType::String, ValueType::Timestamp] {
            assert!(Value::Null.matches(t));
        }
        assert!(!Value::Integer(1).matches(ValueType::String));
    }

    #[test]
    fn timestamp_json_uses_rfc3339() {
        let t = Utc.with_ymd_and_hms(2014, 3, 9, 17, 30, 0).unwrap();
        let json = Value::Timestamp(t).to_json();
        assert_eq!(json, serde_json::json!("2014-03-09T17:30:00Z"));
        assert_eq!(Value::from_json(&json, ValueType::Timestamp, "date").unwrap(), Value::Timestamp(t));
    }

    #[test]
    fn timestamp_keeps_sub_millisecond_precision() {
        let t = Utc.with_ymd_and_hms(2014, 3, 9, 17, 30, 0).unwrap()
            + chrono::Duration::nanoseconds(123_456_789);
        let v = Value::Timestamp(t);
        let json = v.to_json();
        assert_eq!(json, serde_json::json!("2014-03-09T17:30:00.123456789Z"));
        assert_eq!(Value::from_json(&json, ValueType::Timestamp, "date").unwrap(), v);
        assert_eq!(v.to_text().as_deref(), Some("2014-03-09T17:30:00.123456789Z"));

        let micros = Value::Timestamp(Utc.with_ymd_and_hms(2014, 3, 9, 17, 30, 0).unwrap()
            + chrono::Duration::microseconds(250));
        let back = Value::from_json(&micros.to_json(), ValueType::Timestamp, "date").unwrap();
        assert_eq!(back, micros);
    }

    #[test]
    fn binary_json_is_base64() {
        let v = Value::Binary(b"PK\x03\x04".to_vec());
        assert_eq!(v.to_json(), serde_json::json!("UEsDBA=="));
    }

    #[test]
    fn mismatch_names_the_field() {
        let err = Value::from_json(&serde_json::json!("yes"), ValueType::Boolean, "read").unwrap_err();
        assert_eq!(
            err,
            ValueError::Mismatch {
                field: "read".to_string(),
                expected: ValueType::Boolean,
                found: "\"yes\"".to_string(),
            }
        );
    }

    #[test]
    fn option_into_value() {
        assert_eq!(Value::from(None::<String>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::String("x".to_string()));
    }
}
