/*
 * pst_input.rs
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

//! Mailbox input step: walks the archive named by each input row.

use crate::row::{Row, RowSchema, Value, ValueType};
use crate::step::{
    check_field_settings, resolve_field, CheckRemark, RowSink, Step, StepError, StepKind,
    StepSettings,
};
use crate::walker::{describe_output_schema, ArchiveWalker};
use std::path::Path;

const FILE_NAME: &str = "fileName";
const KEYS: &[&str] = &[FILE_NAME];

/// For every input row, emits one row per message of the archive whose path is in
/// the `fileName` field. A bad archive is logged and contributes no further rows.
pub struct PstInputStep {
    name: String,
    settings: StepSettings,
    walker: ArchiveWalker,
    path_index: Option<usize>,
    archives_failed: u64,
}

impl PstInputStep {
    pub fn new(name: impl Into<String>, walker: ArchiveWalker) -> Self {
        Self {
            name: name.into(),
            settings: StepSettings::with_keys(KEYS),
            walker,
            path_index: None,
            archives_failed: 0,
        }
    }

    /// Name of the input field that holds the archive path.
    pub fn with_file_name_field(mut self, field: &str) -> Self {
        self.settings.set(FILE_NAME, field);
        self
    }

    pub(crate) fn apply_settings(&mut self, settings: &StepSettings) {
        for key in settings.keys().filter(|k| KEYS.contains(k)) {
            self.settings.set(key, settings.get(key));
        }
    }

    /// Archives that failed to open or stopped early since `prepare`.
    pub fn archives_failed(&self) -> u64 {
        self.archives_failed
    }
}

impl Step for PstInputStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> StepKind {
        StepKind::PstInput
    }

    fn settings(&self) -> &StepSettings {
        &self.settings
    }

    fn check(&self, input: Option<&RowSchema>) -> Vec<CheckRemark> {
        let mut remarks = check_field_settings(&self.settings, KEYS, input);
        let field = self.settings.get(FILE_NAME);
        let path_field = input
            .and_then(|schema| schema.index_of(field).and_then(|i| schema.field(i)));
        if let Some(meta) = path_field.filter(|m| m.value_type != ValueType::String) {
            remarks.push(CheckRemark::warning(format!(
                "field {:?} holds {}, archive paths are read from its text form",
                field, meta.value_type
            )));
        }
        remarks
    }

    fn describe_output_schema(&self, input: &RowSchema) -> RowSchema {
        describe_output_schema(input, Some(&self.name))
    }

    fn prepare(&mut self, input: &RowSchema) -> Result<(), StepError> {
        self.path_index = Some(resolve_field(&self.name, &self.settings, FILE_NAME, input)?);
        self.archives_failed = 0;
        Ok(())
    }

    fn process_row(&mut self, row: &Row, sink: &mut dyn RowSink) -> Result<(), StepError> {
        let index = self
            .path_index
            .ok_or_else(|| StepError::NotPrepared(self.name.clone()))?;
        let path = match row.get(index).and_then(Value::to_text) {
            Some(p) if !p.trim().is_empty() => p,
            _ => {
                log::warn!("{}: row without archive path, skipped", self.name);
                return Ok(());
            }
        };
        let walk = match self.walker.walk(Path::new(&path), row.clone()) {
            Ok(walk) => walk,
            Err(e) => {
                log::error!("{}: {}", self.name, e);
                self.archives_failed += 1;
                return Ok(());
            }
        };
        for result in walk {
            match result {
                Ok(out) => sink.put_row(out)?,
                Err(e) => {
                    log::error!("{}: {}", self.name, e);
                    self.archives_failed += 1;
                    break;
                }
            }
        }
        Ok(())
    }

    fn dispose(&mut self) {
        if self.archives_failed > 0 {
            log::warn!("{}: {} archives failed", self.name, self.archives_failed);
        }
        self.path_index = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{AutoReader, MessageRecord};
    use crate::localstorage::memory::{MemoryFolder, JsonArchiveReader};
    use crate::row::{FieldMeta, ValueType};
    use crate::step::CheckStatus;
    use crate::walker::MESSAGE_COLUMN_COUNT;
    use std::fs;
    use std::sync::Arc;

    fn export(dir: &Path, name: &str, subjects: &[&str]) -> String {
        let mut inbox = MemoryFolder::new("Inbox");
        for s in subjects {
            inbox = inbox.with_message(MessageRecord {
                subject: s.to_string(),
                ..MessageRecord::default()
            });
        }
        let doc = serde_json::json!({ "root": MemoryFolder::new("root").with_folder(inbox) });
        let path = dir.join(name);
        fs::write(&path, serde_json::to_vec(&doc).unwrap()).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn step() -> PstInputStep {
        let mut reader = AutoReader::empty();
        reader.register(Box::new(JsonArchiveReader));
        PstInputStep::new("PST input", ArchiveWalker::new(Arc::new(reader)))
            .with_file_name_field("archive")
    }

    fn input() -> RowSchema {
        RowSchema::from_fields(vec![
            FieldMeta::new("id", ValueType::Integer),
            FieldMeta::new("archive", ValueType::String),
        ])
    }

    #[test]
    fn bad_archive_does_not_stop_later_rows() {
        let dir = tempfile::tempdir().unwrap();
        let good = export(dir.path(), "a.json", &["one", "two"]);
        let mut step = step();
        step.prepare(&input()).unwrap();

        let mut out: Vec<Row> = Vec::new();
        let missing = dir.path().join("missing.json").to_string_lossy().into_owned();
        step.process_row(&vec![Value::Integer(1), Value::from(missing)], &mut out).unwrap();
        step.process_row(&vec![Value::Integer(2), Value::Null], &mut out).unwrap();
        step.process_row(&vec![Value::Integer(3), Value::from(good)], &mut out).unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(step.archives_failed(), 1);
        let schema = step.describe_output_schema(&input());
        assert_eq!(schema.len(), 2 + MESSAGE_COLUMN_COUNT);
        for row in &out {
            assert_eq!(row[0], Value::Integer(3));
            schema.validate(row).unwrap();
        }
        assert_eq!(out[1][schema.index_of("subject").unwrap()], Value::from("two"));
        assert_eq!(out[0][schema.index_of("folder").unwrap()], Value::from("Inbox"));
    }

    #[test]
    fn prepare_requires_the_field() {
        let mut step = step().with_file_name_field("nope");
        assert!(matches!(step.prepare(&input()), Err(StepError::MissingField { .. })));
        let mut out: Vec<Row> = Vec::new();
        assert!(matches!(
            step.process_row(&vec![Value::Null, Value::Null], &mut out),
            Err(StepError::NotPrepared(_))
        ));
    }

    #[test]
    fn appended_fields_carry_step_origin() {
        let schema = step().describe_output_schema(&input());
        assert_eq!(schema.field(2).unwrap().origin.as_deref(), Some("PST input"));
    }

    #[test]
    fn non_string_path_field_is_a_warning() {
        let remarks = step().with_file_name_field("id").check(Some(&input()));
        assert!(remarks.iter().all(|r| r.status != CheckStatus::Error));
        let warning = remarks.iter().find(|r| r.status == CheckStatus::Warning).unwrap();
        assert!(warning.message.contains("integer"));
        assert!(step()
            .check(Some(&input()))
            .iter()
            .all(|r| r.status == CheckStatus::Ok));
    }
}
