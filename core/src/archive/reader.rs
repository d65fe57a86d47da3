/*
 * reader.rs
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

//! Archive and ArchiveReader traits, plus the dispatching AutoReader.

use crate::archive::error::ArchiveError;
use crate::archive::folder::ArchiveFolder;
use crate::archive::kinds::ArchiveKind;
use crate::config::MailrowConfig;
use crate::localstorage::maildir::MaildirReader;
use crate::localstorage::memory::JsonArchiveReader;
use std::path::Path;

/// An opened archive. Owned by exactly one walk; dropped when the walk ends.
pub trait Archive: Send {
    /// Path the archive was opened from.
    fn path(&self) -> &Path;

    fn kind(&self) -> ArchiveKind;

    /// Root of the folder tree.
    fn root_folder(&self) -> Result<Box<dyn ArchiveFolder>, ArchiveError>;
}

/// Opens archives of one (or more) formats.
pub trait ArchiveReader: Send + Sync {
    /// True if this reader recognizes the path. Must not fail; cheap checks only.
    fn accepts(&self, path: &Path) -> bool;

    /// Open the archive at `path`.
    fn open(&self, path: &Path) -> Result<Box<dyn Archive>, ArchiveError>;
}

/// Reader that dispatches to the first registered reader accepting the path.
pub struct AutoReader {
    readers: Vec<Box<dyn ArchiveReader>>,
}

impl AutoReader {
    /// Empty reader: every open fails until readers are registered.
    pub fn empty() -> Self {
        Self { readers: Vec::new() }
    }

    /// Bundled readers (Maildir++ tree, JSON export) configured from `config`.
    pub fn from_config(config: &MailrowConfig) -> Self {
        let mut reader = Self::empty();
        reader.register(Box::new(MaildirReader::new(
            config.owner_addresses.clone(),
            config.body_prefix_chars,
        )));
        reader.register(Box::new(JsonArchiveReader));
        reader
    }

    /// Add a reader. Readers are tried in registration order.
    pub fn register(&mut self, reader: Box<dyn ArchiveReader>) {
        self.readers.push(reader);
    }
}

impl Default for AutoReader {
    fn default() -> Self {
        Self::from_config(&MailrowConfig::default())
    }
}

impl ArchiveReader for AutoReader {
    fn accepts(&self, path: &Path) -> bool {
        self.readers.iter().any(|r| r.accepts(path))
    }

    fn open(&self, path: &Path) -> Result<Box<dyn Archive>, ArchiveError> {
        if !path.exists() {
            return Err(ArchiveError::NotFound(path.to_path_buf()));
        }
        match self.readers.iter().find(|r| r.accepts(path)) {
            Some(reader) => reader.open(path),
            None => Err(ArchiveError::UnknownFormat(path.to_path_buf())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_is_not_found() {
        let reader = AutoReader::default();
        match reader.open(Path::new("/nonexistent/mailrow/archive.pst")) {
            Err(ArchiveError::NotFound(p)) => assert!(p.ends_with("archive.pst")),
            other => panic!("expected NotFound, got {:?}", other.err()),
        }
    }

    #[test]
    fn pst_without_registered_reader_is_unknown_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outlook.pst");
        std::fs::write(&path, b"!BDN").unwrap();
        let reader = AutoReader::default();
        assert!(!reader.accepts(&path));
        assert!(matches!(reader.open(&path), Err(ArchiveError::UnknownFormat(_))));
    }
}
