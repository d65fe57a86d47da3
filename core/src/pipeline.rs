/*
 * pipeline.rs
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

//! Single-step runner: the host-side loop around a step, for embedding and tests.

use crate::config::MailrowConfig;
use crate::row::{Row, RowSchema};
use crate::step::{RowSink, Step, StepError};

/// Row counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub lines_read: u64,
    pub lines_written: u64,
}

/// Runs one step over a row source.
pub struct Transformation {
    feedback_size: u64,
}

impl Transformation {
    pub fn new(config: &MailrowConfig) -> Self {
        Self {
            feedback_size: config.feedback_size,
        }
    }

    /// Prepare `step`, feed it every row, then dispose it. The first step error ends the
    /// run (the step is still disposed).
    pub fn run<I>(
        &self,
        step: &mut dyn Step,
        input_schema: &RowSchema,
        rows: I,
        sink: &mut dyn RowSink,
    ) -> Result<RunStats, StepError>
    where
        I: IntoIterator<Item = Row>,
    {
        step.prepare(input_schema)?;
        let mut counting = CountingSink { inner: sink, count: 0 };
        let mut lines_read = 0u64;
        let result = rows.into_iter().try_for_each(|row| -> Result<(), StepError> {
            lines_read += 1;
            step.process_row(&row, &mut counting)?;
            if self.feedback_size > 0 && lines_read % self.feedback_size == 0 {
                log::info!("{}: linenr {}", step.name(), lines_read);
            }
            Ok(())
        });
        step.dispose();
        result?;
        let stats = RunStats {
            lines_read,
            lines_written: counting.count,
        };
        log::info!(
            "{}: finished, {} read, {} written",
            step.name(),
            stats.lines_read,
            stats.lines_written
        );
        Ok(stats)
    }
}

impl Default for Transformation {
    fn default() -> Self {
        Self::new(&MailrowConfig::default())
    }
}

struct CountingSink<'a> {
    inner: &'a mut dyn RowSink,
    count: u64,
}

impl RowSink for CountingSink<'_> {
    fn put_row(&mut self, row: Row) -> Result<(), StepError> {
        self.inner.put_row(row)?;
        self.count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::{FieldMeta, Value, ValueType};
    use crate::step::BinaryFileOutputStep;

    struct RefusingSink;

    impl RowSink for RefusingSink {
        fn put_row(&mut self, _row: Row) -> Result<(), StepError> {
            Err(StepError::Sink("downstream closed".to_string()))
        }
    }

    fn schema() -> RowSchema {
        RowSchema::from_fields(vec![
            FieldMeta::new("name", ValueType::String),
            FieldMeta::new("dir", ValueType::String),
            FieldMeta::new("data", ValueType::Binary),
        ])
    }

    #[test]
    fn counts_rows() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().to_string_lossy().into_owned();
        let rows = vec![
            vec![Value::from("a"), Value::from(dir.clone()), Value::Binary(b"1".to_vec())],
            vec![Value::from("b"), Value::from(dir), Value::Null],
        ];
        let mut step = BinaryFileOutputStep::new("out").with_fields("name", "dir", "data");
        let mut out: Vec<Row> = Vec::new();
        let stats = Transformation::default().run(&mut step, &schema(), rows, &mut out).unwrap();
        assert_eq!(stats, RunStats { lines_read: 2, lines_written: 2 });
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn sink_error_stops_run() {
        let rows = vec![vec![Value::from("a"), Value::Null, Value::Null]];
        let mut step = BinaryFileOutputStep::new("out").with_fields("name", "dir", "data");
        let err = Transformation::default()
            .run(&mut step, &schema(), rows, &mut RefusingSink)
            .unwrap_err();
        assert!(matches!(err, StepError::Sink(_)));
    }

    #[test]
    fn unprepared_settings_fail_before_reading() {
        let mut step = BinaryFileOutputStep::new("out");
        let mut out: Vec<Row> = Vec::new();
        let err = Transformation::default()
            .run(&mut step, &schema(), Vec::new(), &mut out)
            .unwrap_err();
        assert!(matches!(err, StepError::MissingField { .. }));
    }
}
