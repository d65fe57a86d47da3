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

//! Read-only Maildir++ archive (cur, new, tmp, `.Folder.Sub` subfolders).
//!
//! The root maildir is the folder `INBOX`; every `.A.B` directory is the folder `B`
//! under `A`. Missing intermediate folders are synthesized with no messages.

mod filename;
mod message;

use crate::archive::{
    Archive, ArchiveError, ArchiveFolder, ArchiveKind, ArchiveMessage, ArchiveReader,
    MessageCursor, UnreadableMessage,
};
use crate::localstorage::mailbox_name_codec;
use filename::MaildirFilename;
use message::{MaildirMessage, MessageOptions};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const HIERARCHY_DELIMITER: char = '/';
const MAILDIR_FOLDER_PREFIX: char = '.';
const INBOX: &str = "INBOX";

/// Opens Maildir++ directories.
pub struct MaildirReader {
    options: Arc<MessageOptions>,
}

impl MaildirReader {
    /// `owner_addresses` identify the archive owner for from_me / to_me / cc_me;
    /// `body_prefix_chars` bounds the synthesized body prefix.
    pub fn new(owner_addresses: Vec<String>, body_prefix_chars: usize) -> Self {
        Self {
            options: Arc::new(MessageOptions {
                owner_addresses,
                body_prefix_chars,
            }),
        }
    }
}

impl ArchiveReader for MaildirReader {
    fn accepts(&self, path: &Path) -> bool {
        ArchiveKind::detect(path) == Some(ArchiveKind::Maildir)
    }

    fn open(&self, path: &Path) -> Result<Box<dyn Archive>, ArchiveError> {
        if !path.exists() {
            return Err(ArchiveError::NotFound(path.to_path_buf()));
        }
        if !is_valid_maildir(path) {
            return Err(ArchiveError::malformed(format!(
                "{} is not a maildir (cur, new, tmp)",
                path.display()
            )));
        }
        let root = Arc::new(build_tree(path)?);
        log::debug!("opened maildir {}", path.display());
        Ok(Box::new(MaildirArchive {
            path: path.to_path_buf(),
            root,
            options: Arc::clone(&self.options),
        }))
    }
}

/// One node of the folder tree, built once when the archive is opened.
#[derive(Debug)]
struct FolderNode {
    name: String,
    /// Hierarchical name, e.g. `INBOX/Projects/2014`.
    full_name: String,
    /// Maildir directory; None for synthesized intermediate folders.
    dir: Option<PathBuf>,
    children: Vec<Arc<FolderNode>>,
}

/// Mutable tree used while scanning; children keyed by decoded name for name order.
#[derive(Default)]
struct PendingNode {
    dir: Option<PathBuf>,
    children: BTreeMap<String, PendingNode>,
}

impl PendingNode {
    fn insert(&mut self, components: &[String], dir: PathBuf) {
        match components.split_first() {
            None => self.dir = Some(dir),
            Some((head, rest)) => self.children.entry(head.clone()).or_default().insert(rest, dir),
        }
    }

    fn freeze(self, name: String, full_name: String) -> FolderNode {
        let children = self
            .children
            .into_iter()
            .map(|(child, node)| {
                let child_full = format!("{}{}{}", full_name, HIERARCHY_DELIMITER, child);
                Arc::new(node.freeze(child, child_full))
            })
            .collect();
        FolderNode {
            name,
            full_name,
            dir: self.dir,
            children,
        }
    }
}

fn is_valid_maildir(p: &Path) -> bool {
    p.is_dir() && p.join("cur").is_dir() && p.join("new").is_dir() && p.join("tmp").is_dir()
}

/// `.A.B` -> ["A", "B"], with each component decoded.
fn dir_to_components(dir_name: &str) -> Vec<String> {
    dir_name
        .trim_start_matches(MAILDIR_FOLDER_PREFIX)
        .split(MAILDIR_FOLDER_PREFIX)
        .filter(|s| !s.is_empty())
        .map(mailbox_name_codec::decode)
        .collect()
}

fn build_tree(root: &Path) -> Result<FolderNode, ArchiveError> {
    let mut pending = PendingNode {
        dir: Some(root.to_path_buf()),
        children: BTreeMap::new(),
    };
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.starts_with(MAILDIR_FOLDER_PREFIX) || name == "." || name == ".." {
            continue;
        }
        let path = entry.path();
        if !is_valid_maildir(&path) {
            continue;
        }
        let components = dir_to_components(&name);
        if !components.is_empty() {
            pending.insert(&components, path);
        }
    }
    Ok(pending.freeze(INBOX.to_string(), INBOX.to_string()))
}

struct MaildirArchive {
    path: PathBuf,
    root: Arc<FolderNode>,
    options: Arc<MessageOptions>,
}

impl Archive for MaildirArchive {
    fn path(&self) -> &Path {
        &self.path
    }

    fn kind(&self) -> ArchiveKind {
        ArchiveKind::Maildir
    }

    fn root_folder(&self) -> Result<Box<dyn ArchiveFolder>, ArchiveError> {
        Ok(Box::new(MaildirFolder {
            node: Arc::clone(&self.root),
            options: Arc::clone(&self.options),
        }))
    }
}

/// Folder over a single Maildir (cur + new).
struct MaildirFolder {
    node: Arc<FolderNode>,
    options: Arc<MessageOptions>,
}

impl MaildirFolder {
    /// Message files in cur then new, each directory in filename order.
    fn scan_messages(&self) -> Result<Vec<(PathBuf, MaildirFilename)>, ArchiveError> {
        let Some(dir) = &self.node.dir else {
            return Ok(Vec::new());
        };
        let mut entries = Vec::new();
        for sub in ["cur", "new"] {
            let sub_dir = dir.join(sub);
            if !sub_dir.is_dir() {
                continue;
            }
            let mut batch = Vec::new();
            for e in fs::read_dir(&sub_dir)? {
                let e = e?;
                let name = e.file_name().to_string_lossy().to_string();
                let path = e.path();
                if !path.is_file() {
                    continue;
                }
                if let Some(parsed) = MaildirFilename::parse(&name) {
                    batch.push((name, path, parsed));
                }
            }
            batch.sort_by(|a, b| a.0.cmp(&b.0));
            entries.extend(batch.into_iter().map(|(_, path, parsed)| (path, parsed)));
        }
        Ok(entries)
    }
}

impl ArchiveFolder for MaildirFolder {
    fn display_name(&self) -> &str {
        &self.node.name
    }

    fn subfolders(&self) -> Result<Vec<Box<dyn ArchiveFolder>>, ArchiveError> {
        Ok(self
            .node
            .children
            .iter()
            .map(|child| {
                Box::new(MaildirFolder {
                    node: Arc::clone(child),
                    options: Arc::clone(&self.options),
                }) as Box<dyn ArchiveFolder>
            })
            .collect())
    }

    fn has_subfolders(&self) -> Result<bool, ArchiveError> {
        Ok(!self.node.children.is_empty())
    }

    fn content_count(&self) -> Result<usize, ArchiveError> {
        Ok(self.scan_messages()?.len())
    }

    fn messages(&self) -> Result<MessageCursor, ArchiveError> {
        let entries = self.scan_messages()?;
        let folder_name = self.node.full_name.clone();
        let options = Arc::clone(&self.options);
        Ok(Box::new(entries.into_iter().map(move |(path, parsed)| {
            match MaildirMessage::load(&path, parsed, &folder_name, Arc::clone(&options)) {
                Ok(m) => Ok(Box::new(m) as Box<dyn ArchiveMessage>),
                Err(e) => {
                    log::debug!("cannot load {}: {}", path.display(), e);
                    Ok(Box::new(UnreadableMessage::new(format!("{}: {}", path.display(), e)))
                        as Box<dyn ArchiveMessage>)
                }
            }
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_maildir(p: &Path) {
        for sub in ["cur", "new", "tmp"] {
            fs::create_dir_all(p.join(sub)).unwrap();
        }
    }

    fn reader() -> MaildirReader {
        MaildirReader::new(vec!["me@example.com".to_string()], 255)
    }

    fn names(folders: &[Box<dyn ArchiveFolder>]) -> Vec<String> {
        folders.iter().map(|f| f.display_name().to_string()).collect()
    }

    #[test]
    fn tree_from_dot_directories() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        make_maildir(root);
        make_maildir(&root.join(".Work"));
        make_maildir(&root.join(".Archive.2014"));
        make_maildir(&root.join(".Re=C3=A7us"));
        fs::create_dir_all(root.join(".not-a-maildir")).unwrap();

        let archive = reader().open(root).unwrap();
        assert_eq!(archive.kind(), ArchiveKind::Maildir);
        let inbox = archive.root_folder().unwrap();
        assert_eq!(inbox.display_name(), "INBOX");
        let subs = inbox.subfolders().unwrap();
        assert_eq!(names(&subs), vec!["Archive", "Reçus", "Work"]);
        // Archive was synthesized for .Archive.2014
        assert_eq!(subs[0].content_count().unwrap(), 0);
        assert_eq!(names(&subs[0].subfolders().unwrap()), vec!["2014"]);
    }

    #[test]
    fn messages_cur_then_new_in_filename_order() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        make_maildir(root);
        fs::write(root.join("new").join("1000.a"), b"Subject: n\n\nx").unwrap();
        fs::write(root.join("cur").join("2000.b:2,S"), b"Subject: c2\n\nx").unwrap();
        fs::write(root.join("cur").join("1500.c:2,"), b"Subject: c1\n\nx").unwrap();
        fs::write(root.join("cur").join(".hidden"), b"junk").unwrap();

        let archive = reader().open(root).unwrap();
        let inbox = archive.root_folder().unwrap();
        assert_eq!(inbox.content_count().unwrap(), 3);
        let subjects: Vec<String> = inbox
            .messages()
            .unwrap()
            .map(|m| m.unwrap().subject().unwrap())
            .collect();
        assert_eq!(subjects, vec!["c1", "c2", "n"]);
    }

    #[test]
    fn vanished_file_is_unreadable_message() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        make_maildir(root);
        fs::write(root.join("cur").join("1000.a:2,"), b"Subject: gone\n\nx").unwrap();
        fs::write(root.join("cur").join("2000.b:2,"), b"Subject: kept\n\nx").unwrap();

        let archive = reader().open(root).unwrap();
        let mut cursor = archive.root_folder().unwrap().messages().unwrap();
        fs::remove_file(root.join("cur").join("1000.a:2,")).unwrap();
        let gone = cursor.next().unwrap().unwrap();
        assert!(matches!(gone.subject(), Err(ArchiveError::Attribute { .. })));
        assert_eq!(cursor.next().unwrap().unwrap().subject().unwrap(), "kept");
        assert!(cursor.next().is_none());
    }

    #[test]
    fn plain_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!reader().accepts(dir.path()));
        assert!(matches!(reader().open(dir.path()), Err(ArchiveError::Malformed(_))));
    }
}
