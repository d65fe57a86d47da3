/*
 * lib.rs
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

//! Mailrow core: walks hierarchical mail archives and turns every message into a row
//! for a row-streaming pipeline.
//!
//! - `archive`: the archive-reading capability (traits, `AutoReader`).
//! - `localstorage`: bundled backends (Maildir++ trees, JSON exports).
//! - `walker`: `ArchiveWalker`, the depth-first walk producing widened rows.
//! - `step`: pipeline steps (mailbox input, binary file output).
//! - `pipeline`: a single-step runner.

pub mod archive;
pub mod config;
pub mod localstorage;
pub mod message_id;
pub mod mime;
pub mod pipeline;
pub mod row;
pub mod step;
pub mod walker;

pub use archive::{
    Archive, ArchiveError, ArchiveFolder, ArchiveKind, ArchiveMessage, ArchiveReader, AutoReader,
    MessageCursor, MessageRecord, UnreadableMessage,
};
pub use config::{load_config, save_config, ConfigError, MailrowConfig, MessageErrorPolicy};
pub use pipeline::{RunStats, Transformation};
pub use row::{FieldMeta, Row, RowSchema, Value, ValueError, ValueType};
pub use step::{
    create_step, BinaryFileOutputStep, CheckRemark, CheckStatus, PstInputStep, RowSink, Step,
    StepError, StepKind, StepSettings,
};
pub use walker::{describe_output_schema, ArchiveWalker, Walk, WalkError, MESSAGE_COLUMNS};
