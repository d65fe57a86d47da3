/*
 * binary_file_output.rs
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

//! Binary file output step: writes one field of each row to a file and reports whether
//! a file was created.

use crate::row::{FieldMeta, Row, RowSchema, Value, ValueType};
use crate::step::{
    check_field_settings, resolve_field, CheckRemark, RowSink, Step, StepError, StepKind,
    StepSettings,
};
use std::fs;
use std::path::{Component, Path, PathBuf};

const FILE_NAME: &str = "fileName";
const FOLDER: &str = "folder";
const FILE_CONTENT: &str = "fileContent";
const KEYS: &[&str] = &[FILE_NAME, FOLDER, FILE_CONTENT];

const CREATED: &str = "created";

#[derive(Debug, Clone, Copy)]
struct Indexes {
    file_name: usize,
    folder: usize,
    content: usize,
}

pub struct BinaryFileOutputStep {
    name: String,
    settings: StepSettings,
    indexes: Option<Indexes>,
}

impl BinaryFileOutputStep {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            settings: StepSettings::with_keys(KEYS),
            indexes: None,
        }
    }

    /// Input fields holding the target file name, target directory and content.
    pub fn with_fields(mut self, file_name: &str, folder: &str, content: &str) -> Self {
        self.settings.set(FILE_NAME, file_name);
        self.settings.set(FOLDER, folder);
        self.settings.set(FILE_CONTENT, content);
        self
    }

    pub(crate) fn apply_settings(&mut self, settings: &StepSettings) {
        for key in settings.keys().filter(|k| KEYS.contains(k)) {
            self.settings.set(key, settings.get(key));
        }
    }

    /// Write `content` to `folder/file_name`. Returns false when there is nothing to write.
    fn write_file(&self, row: &Row, ix: Indexes) -> Result<bool, StepError> {
        let bytes = match row.get(ix.content) {
            None | Some(Value::Null) => return Ok(false),
            Some(Value::Binary(b)) => b.clone(),
            Some(other) => other.to_text().unwrap_or_default().into_bytes(),
        };
        let file_name = match row.get(ix.file_name).and_then(Value::to_text) {
            Some(n) if !n.is_empty() => n,
            _ => {
                log::warn!("{}: row without file name, nothing written", self.name);
                return Ok(false);
            }
        };
        if !is_plain_file_name(&file_name) {
            return Err(StepError::InvalidFileName {
                step: self.name.clone(),
                name: file_name,
            });
        }
        let folder = row
            .get(ix.folder)
            .and_then(Value::to_text)
            .map(PathBuf::from)
            .unwrap_or_default();
        if !folder.as_os_str().is_empty() {
            fs::create_dir_all(&folder).map_err(|source| StepError::Io {
                path: folder.clone(),
                source,
            })?;
        }
        let path = folder.join(file_name);
        fs::write(&path, &bytes).map_err(|source| StepError::Io {
            path: path.clone(),
            source,
        })?;
        log::debug!("{}: wrote {} bytes to {}", self.name, bytes.len(), path.display());
        Ok(true)
    }
}

/// True when `name` is exactly one normal path component, so that it stays inside
/// the target directory.
fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}

impl Step for BinaryFileOutputStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> StepKind {
        StepKind::BinaryFileOutput
    }

    fn settings(&self) -> &StepSettings {
        &self.settings
    }

    fn check(&self, input: Option<&RowSchema>) -> Vec<CheckRemark> {
        check_field_settings(&self.settings, KEYS, input)
    }

    fn describe_output_schema(&self, input: &RowSchema) -> RowSchema {
        let mut output = input.clone();
        output.push(FieldMeta::new(CREATED, ValueType::Boolean).with_origin(self.name.as_str()));
        output
    }

    fn prepare(&mut self, input: &RowSchema) -> Result<(), StepError> {
        self.indexes = Some(Indexes {
            file_name: resolve_field(&self.name, &self.settings, FILE_NAME, input)?,
            folder: resolve_field(&self.name, &self.settings, FOLDER, input)?,
            content: resolve_field(&self.name, &self.settings, FILE_CONTENT, input)?,
        });
        Ok(())
    }

    fn process_row(&mut self, row: &Row, sink: &mut dyn RowSink) -> Result<(), StepError> {
        let ix = self
            .indexes
            .ok_or_else(|| StepError::NotPrepared(self.name.clone()))?;
        let created = self.write_file(row, ix)?;
        let mut out = Vec::with_capacity(row.len() + 1);
        out.extend_from_slice(row);
        out.push(Value::Boolean(created));
        sink.put_row(out)
    }

    fn dispose(&mut self) {
        self.indexes = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> RowSchema {
        RowSchema::from_fields(vec![
            FieldMeta::new("name", ValueType::String),
            FieldMeta::new("dir", ValueType::String),
            FieldMeta::new("data", ValueType::Binary),
        ])
    }

    fn step() -> BinaryFileOutputStep {
        let mut step = BinaryFileOutputStep::new("Write attachments").with_fields("name", "dir", "data");
        step.prepare(&input()).unwrap();
        step
    }

    #[test]
    fn writes_binary_into_new_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("out").join("2014");
        let mut step = step();
        let mut out: Vec<Row> = Vec::new();
        let row = vec![
            Value::from("a.bin"),
            Value::from(dir.to_string_lossy().into_owned()),
            Value::Binary(vec![0, 159, 146, 150]),
        ];
        step.process_row(&row, &mut out).unwrap();
        assert_eq!(fs::read(dir.join("a.bin")).unwrap(), vec![0, 159, 146, 150]);
        assert_eq!(out[0].len(), 4);
        assert_eq!(out[0][3], Value::Boolean(true));
        step.describe_output_schema(&input()).validate(&out[0]).unwrap();
    }

    #[test]
    fn null_content_is_not_created() {
        let tmp = tempfile::tempdir().unwrap();
        let mut step = step();
        let mut out: Vec<Row> = Vec::new();
        let row = vec![
            Value::from("b.txt"),
            Value::from(tmp.path().to_string_lossy().into_owned()),
            Value::Null,
        ];
        step.process_row(&row, &mut out).unwrap();
        assert!(!tmp.path().join("b.txt").exists());
        assert_eq!(out[0][3], Value::Boolean(false));
    }

    #[test]
    fn text_content_written_as_utf8() {
        let tmp = tempfile::tempdir().unwrap();
        let mut step = BinaryFileOutputStep::new("w").with_fields("name", "dir", "body");
        let schema = RowSchema::from_fields(vec![
            FieldMeta::new("name", ValueType::String),
            FieldMeta::new("dir", ValueType::String),
            FieldMeta::new("body", ValueType::String),
        ]);
        step.prepare(&schema).unwrap();
        let mut out: Vec<Row> = Vec::new();
        let row = vec![
            Value::from("c.txt"),
            Value::from(tmp.path().to_string_lossy().into_owned()),
            Value::from("déjà"),
        ];
        step.process_row(&row, &mut out).unwrap();
        assert_eq!(fs::read_to_string(tmp.path().join("c.txt")).unwrap(), "déjà");
    }

    #[test]
    fn output_schema_adds_created() {
        let schema = BinaryFileOutputStep::new("w").describe_output_schema(&input());
        assert_eq!(schema.index_of("created"), Some(3));
        assert_eq!(schema.field(3).unwrap().value_type, ValueType::Boolean);
    }

    #[test]
    fn file_name_must_stay_inside_folder() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("out");
        let mut step = step();
        for name in ["../escape.bin", "/tmp/abs.bin", "Re: a/b", "..", "."] {
            let mut out: Vec<Row> = Vec::new();
            let row = vec![
                Value::from(name),
                Value::from(dir.to_string_lossy().into_owned()),
                Value::Binary(vec![1]),
            ];
            match step.process_row(&row, &mut out) {
                Err(StepError::InvalidFileName { name: rejected, .. }) => assert_eq!(rejected, name),
                other => panic!("{:?} accepted: {:?}", name, other),
            }
            assert!(out.is_empty());
        }
        assert!(!tmp.path().join("escape.bin").exists());
        assert!(is_plain_file_name("Re: report.txt"));
    }
}
