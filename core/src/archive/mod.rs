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

//! Archive abstraction: Archive, ArchiveFolder, ArchiveMessage, ArchiveReader traits and types.
//!
//! This is the archive-reading capability the walker consumes. Backends live in
//! `localstorage`; hosts may register their own readers (e.g. PST) on an `AutoReader`.

mod error;
mod folder;
mod kinds;
mod message;
mod reader;

pub use error::ArchiveError;
pub use folder::{ArchiveFolder, MessageCursor};
pub use kinds::ArchiveKind;
pub use message::{ArchiveMessage, MessageRecord, UnreadableMessage};
pub use reader::{Archive, ArchiveReader, AutoReader};
