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

//! ArchiveWalker: one output row per message anywhere in an archive.
//!
//! Traversal is depth-first on an explicit stack. For each folder, all subfolders
//! (recursively, in archive order) are drained before the folder's own messages.
//! Rows are produced lazily; the archive handle lives exactly as long as the `Walk`.

mod columns;
mod error;

pub use columns::{describe_output_schema, MessageColumn, MESSAGE_COLUMNS, MESSAGE_COLUMN_COUNT};
pub use error::WalkError;

use crate::archive::{Archive, ArchiveFolder, ArchiveReader, AutoReader, MessageCursor};
use crate::config::{MailrowConfig, MessageErrorPolicy};
use crate::row::{Row, Value};
use columns::{message_block, output_row};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Stateless walker: every call to `walk` opens the archive afresh.
#[derive(Clone)]
pub struct ArchiveWalker {
    reader: Arc<dyn ArchiveReader>,
    policy: MessageErrorPolicy,
}

impl ArchiveWalker {
    pub fn new(reader: Arc<dyn ArchiveReader>) -> Self {
        Self {
            reader,
            policy: MessageErrorPolicy::default(),
        }
    }

    /// Walker over the bundled readers with the configured message-error policy.
    pub fn from_config(config: &MailrowConfig) -> Self {
        Self::new(Arc::new(AutoReader::from_config(config))).with_policy(config.on_message_error)
    }

    pub fn with_policy(mut self, policy: MessageErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Open `path` and return the lazy row sequence. Each row is `template` followed by
    /// the message columns. Open failures are returned here; read and extraction
    /// failures are yielded in-stream.
    pub fn walk(&self, path: &Path, template: Row) -> Result<Walk, WalkError> {
        let archive = self.reader.open(path).map_err(|source| WalkError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let root = archive.root_folder().map_err(|source| WalkError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("walking {} archive {}", archive.kind(), path.display());
        Ok(Walk {
            path: path.to_path_buf(),
            template,
            policy: self.policy,
            stack: vec![Frame::Expand(root)],
            current: None,
            rows: 0,
            skipped: 0,
            finished: false,
            _archive: archive,
        })
    }
}

enum Frame {
    /// Subfolders not yet listed.
    Expand(Box<dyn ArchiveFolder>),
    /// Subfolders done; messages next.
    Messages(Box<dyn ArchiveFolder>),
}

struct OpenCursor {
    folder: String,
    cursor: MessageCursor,
    position: usize,
}

/// Lazy sequence of output rows for one archive. Ends after the first error it yields.
pub struct Walk {
    path: PathBuf,
    template: Row,
    policy: MessageErrorPolicy,
    stack: Vec<Frame>,
    current: Option<OpenCursor>,
    rows: u64,
    skipped: u64,
    finished: bool,
    _archive: Box<dyn Archive>,
}

impl Walk {
    /// Rows produced so far.
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Messages skipped under `MessageErrorPolicy::Skip`.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    fn fail(&mut self, err: WalkError) -> Option<Result<Row, WalkError>> {
        self.finished = true;
        self.stack.clear();
        self.current = None;
        Some(Err(err))
    }

    fn read_error(&self, folder: &dyn ArchiveFolder, source: crate::archive::ArchiveError) -> WalkError {
        WalkError::Read {
            path: self.path.clone(),
            folder: folder.display_name().to_string(),
            source,
        }
    }

    /// Next message row of the open cursor, if any. A cursor that cannot advance is a
    /// read error under every policy; only failures reading one message may be skipped.
    fn next_from_cursor(&mut self) -> Option<Result<Row, WalkError>> {
        loop {
            let open = self.current.as_mut()?;
            let position = open.position;
            let message = match open.cursor.next() {
                Some(Ok(message)) => message,
                Some(Err(source)) => {
                    let err = WalkError::Read {
                        path: self.path.clone(),
                        folder: open.folder.clone(),
                        source,
                    };
                    return self.fail(err);
                }
                None => {
                    self.current = None;
                    return None;
                }
            };
            open.position += 1;
            match message_block(message.as_ref(), &open.folder) {
                Ok(block) => {
                    self.rows += 1;
                    return Some(Ok(output_row(&self.template, block)));
                }
                Err(source) => {
                    let err = WalkError::Extraction {
                        path: self.path.clone(),
                        folder: open.folder.clone(),
                        position,
                        source,
                    };
                    match self.policy {
                        MessageErrorPolicy::Abort => return self.fail(err),
                        MessageErrorPolicy::Skip => {
                            log::warn!("skipping message: {}", err);
                            self.skipped += 1;
                        }
                    }
                }
            }
        }
    }
}

impl Iterator for Walk {
    type Item = Result<Row, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            if let Some(row) = self.next_from_cursor() {
                return Some(row);
            }
            let Some(frame) = self.stack.pop() else {
                self.finished = true;
                log::info!(
                    "finished {}: {} rows, {} skipped",
                    self.path.display(),
                    self.rows,
                    self.skipped
                );
                return None;
            };
            match frame {
                Frame::Expand(folder) => {
                    let subfolders = match folder.subfolders() {
                        Ok(s) => s,
                        Err(e) => {
                            let err = self.read_error(folder.as_ref(), e);
                            return self.fail(err);
                        }
                    };
                    log::debug!(
                        "folder {:?}: {} subfolders",
                        folder.display_name(),
                        subfolders.len()
                    );
                    self.stack.push(Frame::Messages(folder));
                    self.stack
                        .extend(subfolders.into_iter().rev().map(Frame::Expand));
                }
                Frame::Messages(folder) => match folder.content_count() {
                    Ok(0) => {}
                    Ok(_) => match folder.messages() {
                        Ok(cursor) => {
                            self.current = Some(OpenCursor {
                                folder: folder.display_name().to_string(),
                                cursor,
                                position: 0,
                            });
                        }
                        Err(e) => {
                            let err = self.read_error(folder.as_ref(), e);
                            return self.fail(err);
                        }
                    },
                    Err(e) => {
                        let err = self.read_error(folder.as_ref(), e);
                        return self.fail(err);
                    }
                },
            }
        }
    }
}

/// Walk `path` with `walker` and collect all rows, stopping at the first error.
pub fn collect_rows(walker: &ArchiveWalker, path: &Path, template: &[Value]) -> Result<Vec<Row>, WalkError> {
    walker.walk(path, template.to_vec())?.collect()
}
