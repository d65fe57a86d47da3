/*
 * kinds.rs
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

//! Archive kind discriminants (Maildir tree, JSON export, PST). Used by readers and FFI.

use std::fmt;
use std::path::Path;

/// Discriminant for archive backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ArchiveKind {
    Maildir = 0,
    JsonExport = 1,
    /// Outlook personal folders (.pst / .ost). No reader is bundled; hosts register one.
    Pst = 2,
}

impl ArchiveKind {
    /// Guess the kind from the path alone (directory layout or file extension).
    pub fn detect(path: &Path) -> Option<ArchiveKind> {
        if path.is_dir() {
            let is_maildir = ["cur", "new", "tmp"].iter().all(|sub| path.join(sub).is_dir());
            return is_maildir.then_some(ArchiveKind::Maildir);
        }
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(ArchiveKind::JsonExport),
            "pst" | "ost" => Some(ArchiveKind::Pst),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArchiveKind::Maildir => "maildir",
            ArchiveKind::JsonExport => "json",
            ArchiveKind::Pst => "pst",
        }
    }
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_by_extension() {
        assert_eq!(ArchiveKind::detect(Path::new("/tmp/x/Mail.PST")), Some(ArchiveKind::Pst));
        assert_eq!(ArchiveKind::detect(Path::new("/tmp/x/export.json")), Some(ArchiveKind::JsonExport));
        assert_eq!(ArchiveKind::detect(Path::new("/tmp/x/notes.txt")), None);
    }

    #[test]
    fn detect_maildir_layout() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(ArchiveKind::detect(dir.path()), None);
        for sub in ["cur", "new", "tmp"] {
            std::fs::create_dir(dir.path().join(sub)).unwrap();
        }
        assert_eq!(ArchiveKind::detect(dir.path()), Some(ArchiveKind::Maildir));
    }
}
