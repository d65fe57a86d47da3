/*
 * columns.rs
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

//! The fixed block of message columns appended to every template row.

use crate::archive::{ArchiveError, ArchiveMessage};
use crate::row::{FieldMeta, Row, RowSchema, Value, ValueType};

/// Name and type of one appended column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageColumn {
    pub name: &'static str,
    pub value_type: ValueType,
}

const fn column(name: &'static str, value_type: ValueType) -> MessageColumn {
    MessageColumn { name, value_type }
}

pub const MESSAGE_COLUMN_COUNT: usize = 25;

/// Appended columns in output order: `from_me` first, `descriptor_node_id` last.
pub const MESSAGE_COLUMNS: [MessageColumn; MESSAGE_COLUMN_COUNT] = [
    column("from_me", ValueType::Boolean),
    column("replied", ValueType::Boolean),
    column("read", ValueType::Boolean),
    column("forwarded", ValueType::Boolean),
    column("reply_requested", ValueType::Boolean),
    column("message_to_me", ValueType::Boolean),
    column("message_cc_me", ValueType::Boolean),
    column("message_class", ValueType::String),
    column("in_reply_to_id", ValueType::String),
    column("importance", ValueType::Integer),
    column("number_of_recipients", ValueType::Integer),
    column("number_of_attachments", ValueType::Integer),
    column("size", ValueType::Integer),
    column("bcc", ValueType::String),
    column("cc", ValueType::String),
    column("to", ValueType::String),
    column("sender_email_address", ValueType::String),
    column("sender_name", ValueType::String),
    column("body_prefix", ValueType::String),
    column("body_html", ValueType::String),
    column("body", ValueType::String),
    column("subject", ValueType::String),
    column("date", ValueType::Timestamp),
    column("folder", ValueType::String),
    column("descriptor_node_id", ValueType::Integer),
];

/// Input schema followed by the message columns. `origin` tags the appended fields.
pub fn describe_output_schema(input: &RowSchema, origin: Option<&str>) -> RowSchema {
    let mut output = input.clone();
    for c in MESSAGE_COLUMNS.iter() {
        let field = FieldMeta::new(c.name, c.value_type);
        output.push(match origin {
            Some(o) => field.with_origin(o),
            None => field,
        });
    }
    output
}

/// Read every attribute of `message` in column order. The first failing getter aborts.
pub(crate) fn message_block(
    message: &dyn ArchiveMessage,
    folder: &str,
) -> Result<Vec<Value>, ArchiveError> {
    Ok(vec![
        Value::Boolean(message.is_from_me()?),
        Value::Boolean(message.has_replied()?),
        Value::Boolean(message.is_read()?),
        Value::Boolean(message.has_forwarded()?),
        Value::Boolean(message.is_reply_requested()?),
        Value::Boolean(message.message_to_me()? != 0),
        Value::Boolean(message.message_cc_me()? != 0),
        Value::String(message.message_class()?),
        Value::from(message.in_reply_to_id()?),
        Value::Integer(message.importance()?),
        Value::Integer(message.number_of_recipients()?),
        Value::Integer(message.number_of_attachments()?),
        Value::Integer(message.message_size()?),
        Value::String(message.display_bcc()?),
        Value::String(message.display_cc()?),
        Value::String(message.display_to()?),
        Value::String(message.sender_email_address()?),
        Value::String(message.sender_name()?),
        Value::String(message.body_prefix()?),
        Value::String(message.body_html()?),
        Value::String(message.body()?),
        Value::String(message.subject()?),
        Value::from(message.client_submit_time()?),
        Value::String(folder.to_string()),
        Value::Integer(message.descriptor_node_id()?),
    ])
}

/// Template values followed by the message block, concatenated once.
pub(crate) fn output_row(template: &[Value], block: Vec<Value>) -> Row {
    let mut row = Vec::with_capacity(template.len() + block.len());
    row.extend_from_slice(template);
    row.extend(block);
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::MessageRecord;

    #[test]
    fn schema_appends_columns_in_order() {
        let input = RowSchema::from_fields(vec![FieldMeta::new("path", ValueType::String)]);
        let out = describe_output_schema(&input, Some("PST input"));
        assert_eq!(out.len(), 1 + MESSAGE_COLUMN_COUNT);
        assert_eq!(out.index_of("from_me"), Some(1));
        assert_eq!(out.index_of("folder"), Some(24));
        assert_eq!(out.index_of("descriptor_node_id"), Some(25));
        assert_eq!(out.field(23).unwrap().value_type, ValueType::Timestamp);
        assert_eq!(out.field(25).unwrap().origin.as_deref(), Some("PST input"));
        assert_eq!(out.field(0).unwrap().origin, None);
    }

    #[test]
    fn block_matches_column_types() {
        let record = MessageRecord {
            message_to_me: 4,
            subject: "s".to_string(),
            ..MessageRecord::default()
        };
        let block = message_block(&record, "Inbox").unwrap();
        assert_eq!(block.len(), MESSAGE_COLUMN_COUNT);
        for (value, c) in block.iter().zip(MESSAGE_COLUMNS.iter()) {
            assert!(value.matches(c.value_type), "{} has {:?}", c.name, value);
        }
        assert_eq!(block[5], Value::Boolean(true));
        assert_eq!(block[8], Value::Null);
        assert_eq!(block[22], Value::Null);
        assert_eq!(block[23], Value::from("Inbox"));
    }
}
