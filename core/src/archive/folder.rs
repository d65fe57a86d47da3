/*
 * folder.rs
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

//! Folder trait: a node of the archive tree, owning subfolders and messages.
//!
//! Handles are owned (`Box<dyn ArchiveFolder>`) so a walk can keep them on an
//! explicit stack without borrowing from the archive.

use crate::archive::error::ArchiveError;
use crate::archive::message::ArchiveMessage;

/// Lazily advanced sequence of messages in one folder, in archive-reported order.
pub type MessageCursor =
    Box<dyn Iterator<Item = Result<Box<dyn ArchiveMessage>, ArchiveError>> + Send>;

/// A folder in an archive (e.g. PST folder, Maildir++ mailbox).
pub trait ArchiveFolder: Send {
    /// Display name of this folder (not its full path).
    fn display_name(&self) -> &str;

    /// Direct child folders, in archive-reported order.
    fn subfolders(&self) -> Result<Vec<Box<dyn ArchiveFolder>>, ArchiveError>;

    /// Whether the folder has any child folders.
    fn has_subfolders(&self) -> Result<bool, ArchiveError> {
        Ok(!self.subfolders()?.is_empty())
    }

    /// Number of direct messages in this folder.
    fn content_count(&self) -> Result<usize, ArchiveError>;

    /// Cursor over the direct messages of this folder.
    fn messages(&self) -> Result<MessageCursor, ArchiveError>;
}
