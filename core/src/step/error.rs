/*
 * error.rs
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

//! Step errors.

use crate::row::ValueError;
use crate::walker::WalkError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StepError {
    #[error("invalid settings: {0}")]
    Settings(String),
    /// A setting names a field the input schema does not have (or is empty).
    #[error("step {step}: setting {setting} names missing field {field:?}")]
    MissingField {
        step: String,
        setting: &'static str,
        field: String,
    },
    /// A file name from the row is not a single plain path component.
    #[error("step {step}: file name {name:?} must not contain path separators or be . or ..")]
    InvalidFileName { step: String, name: String },
    #[error("step {0} used before prepare")]
    NotPrepared(String),
    #[error("unknown step kind {0:?}")]
    UnknownKind(String),
    #[error(transparent)]
    Walk(#[from] WalkError),
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Value(#[from] ValueError),
    /// The consumer of output rows refused a row.
    #[error("row sink failed: {0}")]
    Sink(String),
}
