/*
 * settings.rs
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

//! Flat step settings: ordered keys with string values.

use crate::step::error::StepError;
use serde_json::{Map, Value as JsonValue};

/// Settings of one step. The key set is fixed by the step kind; a missing value reads as "".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepSettings {
    entries: Vec<(String, String)>,
}

impl StepSettings {
    /// Settings with the given keys, all empty.
    pub fn with_keys(keys: &[&str]) -> Self {
        Self {
            entries: keys.iter().map(|k| (k.to_string(), String::new())).collect(),
        }
    }

    pub fn get(&self, key: &str) -> &str {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    /// Set `key`, appending it if the step does not define it yet.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Overwrite every known key from a JSON object. Unknown keys are ignored; known keys
    /// absent from `json` (or null) become "". Non-string scalars use their JSON text.
    pub fn load_json(&mut self, json: &JsonValue) -> Result<(), StepError> {
        let object = json
            .as_object()
            .ok_or_else(|| StepError::Settings(format!("expected a JSON object, got {}", json)))?;
        for (key, value) in self.entries.iter_mut() {
            *value = match object.get(key.as_str()) {
                None | Some(JsonValue::Null) => String::new(),
                Some(JsonValue::String(s)) => s.clone(),
                Some(other @ (JsonValue::Bool(_) | JsonValue::Number(_))) => other.to_string(),
                Some(other) => {
                    return Err(StepError::Settings(format!(
                        "setting {} must be a scalar, got {}",
                        key, other
                    )))
                }
            };
        }
        Ok(())
    }

    pub fn to_json(&self) -> JsonValue {
        let mut object = Map::new();
        for (k, v) in &self.entries {
            object.insert(k.clone(), JsonValue::String(v.clone()));
        }
        JsonValue::Object(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_and_unknown_keys() {
        let mut s = StepSettings::with_keys(&["fileName", "folder"]);
        s.set("folder", "/old");
        s.load_json(&json!({"fileName": "path", "extra": "ignored"})).unwrap();
        assert_eq!(s.get("fileName"), "path");
        assert_eq!(s.get("folder"), "");
        assert_eq!(s.get("extra"), "");
        assert_eq!(s.keys().collect::<Vec<_>>(), vec!["fileName", "folder"]);
    }

    #[test]
    fn scalars_are_stringified() {
        let mut s = StepSettings::with_keys(&["n"]);
        s.load_json(&json!({"n": 3})).unwrap();
        assert_eq!(s.get("n"), "3");
        assert!(s.load_json(&json!({"n": [1]})).is_err());
        assert!(s.load_json(&json!("x")).is_err());
    }

    #[test]
    fn json_form() {
        let mut s = StepSettings::with_keys(&["fileName"]);
        s.set("fileName", "archive");
        assert_eq!(s.to_json(), json!({"fileName": "archive"}));
    }
}
