/*
 * mod.rs
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

//! Pipeline steps: a capability interface the host orchestrator composes.

mod binary_file_output;
mod error;
mod pst_input;
mod settings;

pub use binary_file_output::BinaryFileOutputStep;
pub use error::StepError;
pub use pst_input::PstInputStep;
pub use settings::StepSettings;

use crate::config::MailrowConfig;
use crate::row::{Row, RowSchema};
use crate::walker::ArchiveWalker;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminant for step variants. The string id is what hosts store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepKind {
    #[serde(rename = "PstInputStep")]
    PstInput,
    #[serde(rename = "BinaryFileOutputStep")]
    BinaryFileOutput,
}

impl StepKind {
    pub fn id(&self) -> &'static str {
        match self {
            StepKind::PstInput => "PstInputStep",
            StepKind::BinaryFileOutput => "BinaryFileOutputStep",
        }
    }

    pub fn from_id(id: &str) -> Result<StepKind, StepError> {
        match id {
            "PstInputStep" => Ok(StepKind::PstInput),
            "BinaryFileOutputStep" => Ok(StepKind::BinaryFileOutput),
            other => Err(StepError::UnknownKind(other.to_string())),
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

/// One remark from `Step::check`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRemark {
    pub status: CheckStatus,
    pub message: String,
}

impl CheckRemark {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Ok,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Error,
            message: message.into(),
        }
    }
}

/// Receives output rows from a step.
pub trait RowSink {
    fn put_row(&mut self, row: Row) -> Result<(), StepError>;
}

impl RowSink for Vec<Row> {
    fn put_row(&mut self, row: Row) -> Result<(), StepError> {
        self.push(row);
        Ok(())
    }
}

/// A pipeline step. The host calls `prepare` once with the input schema, then
/// `process_row` per input row, then `dispose`.
pub trait Step: Send {
    fn name(&self) -> &str;

    fn kind(&self) -> StepKind;

    fn settings(&self) -> &StepSettings;

    /// Design-time checks against the input schema (None when the step has no input).
    fn check(&self, input: Option<&RowSchema>) -> Vec<CheckRemark>;

    fn describe_output_schema(&self, input: &RowSchema) -> RowSchema;

    fn prepare(&mut self, input: &RowSchema) -> Result<(), StepError>;

    fn process_row(&mut self, row: &Row, sink: &mut dyn RowSink) -> Result<(), StepError>;

    fn dispose(&mut self) {}
}

/// Remarks shared by both steps: input present, each field setting set and present.
pub(crate) fn check_field_settings(
    settings: &StepSettings,
    field_keys: &[&str],
    input: Option<&RowSchema>,
) -> Vec<CheckRemark> {
    let mut remarks = Vec::new();
    let input = match input {
        Some(schema) if !schema.is_empty() => {
            remarks.push(CheckRemark::ok("step receives input"));
            schema
        }
        _ => {
            remarks.push(CheckRemark::error("step receives no input"));
            return remarks;
        }
    };
    for key in field_keys {
        let field = settings.get(key);
        if field.is_empty() {
            remarks.push(CheckRemark::error(format!("setting {} is empty", key)));
        } else if input.index_of(field).is_none() {
            remarks.push(CheckRemark::error(format!(
                "field {:?} ({}) not found in input",
                field, key
            )));
        } else {
            remarks.push(CheckRemark::ok(format!("field {:?} ({}) found", field, key)));
        }
    }
    remarks
}

/// Index of the input field named by setting `key`.
pub(crate) fn resolve_field(
    step: &str,
    settings: &StepSettings,
    key: &'static str,
    input: &RowSchema,
) -> Result<usize, StepError> {
    let field = settings.get(key);
    input
        .index_of(field)
        .filter(|_| !field.is_empty())
        .ok_or_else(|| StepError::MissingField {
            step: step.to_string(),
            setting: key,
            field: field.to_string(),
        })
}

/// Build a step of `kind`. `settings` overrides the kind's defaults key by key.
pub fn create_step(
    kind: StepKind,
    name: &str,
    settings: Option<&StepSettings>,
    config: &MailrowConfig,
) -> Box<dyn Step> {
    match kind {
        StepKind::PstInput => {
            let mut step = PstInputStep::new(name, ArchiveWalker::from_config(config));
            if let Some(s) = settings {
                step.apply_settings(s);
            }
            Box::new(step)
        }
        StepKind::BinaryFileOutput => {
            let mut step = BinaryFileOutputStep::new(name);
            if let Some(s) = settings {
                step.apply_settings(s);
            }
            Box::new(step)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::{FieldMeta, ValueType};

    #[test]
    fn kind_ids() {
        assert_eq!(StepKind::from_id("PstInputStep").unwrap(), StepKind::PstInput);
        assert_eq!(StepKind::BinaryFileOutput.to_string(), "BinaryFileOutputStep");
        assert!(matches!(StepKind::from_id("Other"), Err(StepError::UnknownKind(_))));
        assert_eq!(serde_json::to_string(&StepKind::PstInput).unwrap(), "\"PstInputStep\"");
    }

    #[test]
    fn check_reports_missing_input_and_fields() {
        let mut settings = StepSettings::with_keys(&["fileName", "folder"]);
        settings.set("fileName", "path");
        settings.set("folder", "dir");

        let no_input = check_field_settings(&settings, &["fileName"], None);
        assert_eq!(no_input, vec![CheckRemark::error("step receives no input")]);

        let input = RowSchema::from_fields(vec![FieldMeta::new("path", ValueType::String)]);
        let remarks = check_field_settings(&settings, &["fileName", "folder"], Some(&input));
        let statuses: Vec<_> = remarks.iter().map(|r| r.status).collect();
        assert_eq!(statuses, vec![CheckStatus::Ok, CheckStatus::Ok, CheckStatus::Error]);
    }

    #[test]
    fn resolve_rejects_empty_setting() {
        let settings = StepSettings::with_keys(&["fileName"]);
        let input = RowSchema::from_fields(vec![FieldMeta::new("", ValueType::String)]);
        assert!(matches!(
            resolve_field("s", &settings, "fileName", &input),
            Err(StepError::MissingField { setting: "fileName", .. })
        ));
    }

    #[test]
    fn create_step_applies_settings() {
        let mut settings = StepSettings::with_keys(&["fileName"]);
        settings.set("fileName", "archive_path");
        let step = create_step(StepKind::PstInput, "read mail", Some(&settings), &MailrowConfig::default());
        assert_eq!(step.name(), "read mail");
        assert_eq!(step.kind(), StepKind::PstInput);
        assert_eq!(step.settings().get("fileName"), "archive_path");
    }
}
