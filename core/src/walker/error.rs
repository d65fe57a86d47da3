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

//! Walk errors. Each carries the archive path; extraction errors also name the folder
//! and the message position within it.

use crate::archive::ArchiveError;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalkError {
    /// Missing, unreadable or unrecognized archive. Nothing was yielded.
    #[error("cannot open archive {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: ArchiveError,
    },
    /// Listing a folder's subfolders or messages failed. Ends the walk.
    #[error("cannot read folder {folder:?} in {}: {source}", path.display())]
    Read {
        path: PathBuf,
        folder: String,
        #[source]
        source: ArchiveError,
    },
    /// One message's attributes could not be read.
    #[error("cannot read message {position} of folder {folder:?} in {}: {source}", path.display())]
    Extraction {
        path: PathBuf,
        folder: String,
        /// Zero-based index of the message within its folder.
        position: usize,
        #[source]
        source: ArchiveError,
    },
}

impl WalkError {
    pub fn path(&self) -> &Path {
        match self {
            WalkError::Open { path, .. }
            | WalkError::Read { path, .. }
            | WalkError::Extraction { path, .. } => path,
        }
    }

    pub fn is_open_error(&self) -> bool {
        matches!(self, WalkError::Open { .. })
    }
}
