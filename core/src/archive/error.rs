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

//! Archive reader errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from an archive reader: opening, listing folders, or reading a message attribute.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Path does not exist.
    #[error("archive not found: {}", .0.display())]
    NotFound(PathBuf),
    /// No registered reader recognizes the path.
    #[error("unrecognized archive format: {}", .0.display())]
    UnknownFormat(PathBuf),
    /// The archive was recognized but its content is malformed.
    #[error("malformed archive: {0}")]
    Malformed(String),
    /// A single message attribute could not be read.
    #[error("cannot read attribute {attribute}: {reason}")]
    Attribute {
        attribute: &'static str,
        reason: String,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ArchiveError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    pub fn attribute(attribute: &'static str, reason: impl Into<String>) -> Self {
        Self::Attribute {
            attribute,
            reason: reason.into(),
        }
    }
}
