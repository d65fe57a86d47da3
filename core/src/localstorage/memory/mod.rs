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

//! In-memory archive tree and the JSON export reader.
//!
//! Export format: `{ "root": { "name": "...", "folders": [ ... ], "messages": [ ... ] } }`,
//! each message a `MessageRecord` object (every attribute optional).

use crate::archive::{
    Archive, ArchiveError, ArchiveFolder, ArchiveKind, ArchiveMessage, ArchiveReader,
    MessageCursor, MessageRecord,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Folder description as exported, or as built by hosts and tests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryFolder {
    pub name: String,
    #[serde(default)]
    pub folders: Vec<MemoryFolder>,
    #[serde(default)]
    pub messages: Vec<MessageRecord>,
}

impl MemoryFolder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_folder(mut self, folder: MemoryFolder) -> Self {
        self.folders.push(folder);
        self
    }

    pub fn with_message(mut self, message: MessageRecord) -> Self {
        self.messages.push(message);
        self
    }

    /// Messages in this folder and all descendants.
    pub fn total_messages(&self) -> usize {
        self.messages.len() + self.folders.iter().map(MemoryFolder::total_messages).sum::<usize>()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ExportDocument {
    root: MemoryFolder,
}

/// Immutable node shared by folder handles.
#[derive(Debug)]
struct Node {
    name: String,
    children: Vec<Arc<Node>>,
    messages: Arc<Vec<MessageRecord>>,
}

impl Node {
    fn from_folder(folder: MemoryFolder) -> Node {
        Node {
            name: folder.name,
            children: folder
                .folders
                .into_iter()
                .map(|f| Arc::new(Node::from_folder(f)))
                .collect(),
            messages: Arc::new(folder.messages),
        }
    }
}

/// Archive whose whole tree is held in memory.
pub struct MemoryArchive {
    path: PathBuf,
    kind: ArchiveKind,
    root: Arc<Node>,
}

impl MemoryArchive {
    pub fn new(path: impl Into<PathBuf>, root: MemoryFolder) -> Self {
        Self {
            path: path.into(),
            kind: ArchiveKind::JsonExport,
            root: Arc::new(Node::from_folder(root)),
        }
    }

    /// Parse an export document. Malformed JSON or a missing `root` is `Malformed`.
    pub fn from_json(path: impl Into<PathBuf>, data: &[u8]) -> Result<Self, ArchiveError> {
        let path = path.into();
        let doc: ExportDocument = serde_json::from_slice(data)
            .map_err(|e| ArchiveError::malformed(format!("{}: {}", path.display(), e)))?;
        Ok(Self::new(path, doc.root))
    }

    /// Report a different kind (e.g. a host PST reader that materializes its tree).
    pub fn with_kind(mut self, kind: ArchiveKind) -> Self {
        self.kind = kind;
        self
    }
}

impl Archive for MemoryArchive {
    fn path(&self) -> &Path {
        &self.path
    }

    fn kind(&self) -> ArchiveKind {
        self.kind
    }

    fn root_folder(&self) -> Result<Box<dyn ArchiveFolder>, ArchiveError> {
        Ok(Box::new(MemoryFolderHandle {
            node: Arc::clone(&self.root),
        }))
    }
}

struct MemoryFolderHandle {
    node: Arc<Node>,
}

impl ArchiveFolder for MemoryFolderHandle {
    fn display_name(&self) -> &str {
        &self.node.name
    }

    fn subfolders(&self) -> Result<Vec<Box<dyn ArchiveFolder>>, ArchiveError> {
        Ok(self
            .node
            .children
            .iter()
            .map(|c| Box::new(MemoryFolderHandle { node: Arc::clone(c) }) as Box<dyn ArchiveFolder>)
            .collect())
    }

    fn content_count(&self) -> Result<usize, ArchiveError> {
        Ok(self.node.messages.len())
    }

    fn messages(&self) -> Result<MessageCursor, ArchiveError> {
        let messages = Arc::clone(&self.node.messages);
        Ok(Box::new((0..messages.len()).map(move |i| {
            Ok(Box::new(messages[i].clone()) as Box<dyn ArchiveMessage>)
        })))
    }
}

/// Opens `.json` export documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonArchiveReader;

impl ArchiveReader for JsonArchiveReader {
    fn accepts(&self, path: &Path) -> bool {
        path.is_file() && ArchiveKind::detect(path) == Some(ArchiveKind::JsonExport)
    }

    fn open(&self, path: &Path) -> Result<Box<dyn Archive>, ArchiveError> {
        let data = fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ArchiveError::NotFound(path.to_path_buf()),
            _ => ArchiveError::Io(e),
        })?;
        let archive = MemoryArchive::from_json(path, &data)?;
        log::debug!("opened JSON export {}", path.display());
        Ok(Box::new(archive))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = r#"{
        "root": {
            "name": "Top of Personal Folders",
            "folders": [
                {"name": "Inbox", "messages": [{"subject": "hello", "read": true, "descriptor_node_id": 2097220}]}
            ],
            "messages": [{"subject": "loose", "date": "2014-03-09T17:30:00Z"}]
        }
    }"#;

    #[test]
    fn open_export_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mail.json");
        fs::write(&path, EXPORT).unwrap();

        let reader = JsonArchiveReader;
        assert!(reader.accepts(&path));
        let archive = reader.open(&path).unwrap();
        assert_eq!(archive.kind(), ArchiveKind::JsonExport);
        let root = archive.root_folder().unwrap();
        assert_eq!(root.display_name(), "Top of Personal Folders");
        assert!(root.has_subfolders().unwrap());
        let inbox = root.subfolders().unwrap().remove(0);
        assert_eq!(inbox.content_count().unwrap(), 1);
        let m = inbox.messages().unwrap().next().unwrap().unwrap();
        assert_eq!(m.subject().unwrap(), "hello");
        assert!(m.is_read().unwrap());
        assert_eq!(m.descriptor_node_id().unwrap(), 2097220);
        assert_eq!(m.message_class().unwrap(), "");
    }

    #[test]
    fn missing_root_is_malformed() {
        let err = MemoryArchive::from_json("/x/mail.json", br#"{"folders": []}"#).err().unwrap();
        assert!(matches!(err, ArchiveError::Malformed(_)));
    }

    #[test]
    fn builder_counts_messages() {
        let tree = MemoryFolder::new("root")
            .with_folder(MemoryFolder::new("A").with_message(MessageRecord::default()))
            .with_message(MessageRecord::default());
        assert_eq!(tree.total_messages(), 2);
        let archive = MemoryArchive::new("/x/Outlook.pst", tree).with_kind(ArchiveKind::Pst);
        assert_eq!(archive.kind(), ArchiveKind::Pst);
        assert_eq!(archive.root_folder().unwrap().content_count().unwrap(), 1);
    }
}
