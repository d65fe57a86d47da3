/*
 * message.rs
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

//! Message trait and the owned attribute record.

use crate::archive::error::ArchiveError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A leaf message in an archive. Every getter may fail independently
/// (a backend may decode attributes lazily).
pub trait ArchiveMessage: Send {
    fn descriptor_node_id(&self) -> Result<i64, ArchiveError>;
    fn is_from_me(&self) -> Result<bool, ArchiveError>;
    fn has_replied(&self) -> Result<bool, ArchiveError>;
    fn is_read(&self) -> Result<bool, ArchiveError>;
    fn has_forwarded(&self) -> Result<bool, ArchiveError>;
    fn is_reply_requested(&self) -> Result<bool, ArchiveError>;
    /// Numeric flag; nonzero means the owner is a direct recipient.
    fn message_to_me(&self) -> Result<i64, ArchiveError>;
    /// Numeric flag; nonzero means the owner is in Cc.
    fn message_cc_me(&self) -> Result<i64, ArchiveError>;
    fn message_class(&self) -> Result<String, ArchiveError>;
    fn in_reply_to_id(&self) -> Result<Option<String>, ArchiveError>;
    /// 0 = low, 1 = normal, 2 = high.
    fn importance(&self) -> Result<i64, ArchiveError>;
    fn number_of_recipients(&self) -> Result<i64, ArchiveError>;
    fn number_of_attachments(&self) -> Result<i64, ArchiveError>;
    /// Message size in bytes.
    fn message_size(&self) -> Result<i64, ArchiveError>;
    fn display_bcc(&self) -> Result<String, ArchiveError>;
    fn display_cc(&self) -> Result<String, ArchiveError>;
    fn display_to(&self) -> Result<String, ArchiveError>;
    fn sender_email_address(&self) -> Result<String, ArchiveError>;
    fn sender_name(&self) -> Result<String, ArchiveError>;
    fn body_prefix(&self) -> Result<String, ArchiveError>;
    fn body_html(&self) -> Result<String, ArchiveError>;
    fn body(&self) -> Result<String, ArchiveError>;
    fn subject(&self) -> Result<String, ArchiveError>;
    fn client_submit_time(&self) -> Result<Option<DateTime<Utc>>, ArchiveError>;
}

/// Fully materialized message attributes. Used by the JSON export backend and by
/// backends that decode everything up front.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageRecord {
    pub descriptor_node_id: i64,
    pub from_me: bool,
    pub replied: bool,
    pub read: bool,
    pub forwarded: bool,
    pub reply_requested: bool,
    pub message_to_me: i64,
    pub message_cc_me: i64,
    pub message_class: String,
    pub in_reply_to_id: Option<String>,
    pub importance: i64,
    pub number_of_recipients: i64,
    pub number_of_attachments: i64,
    pub size: i64,
    pub bcc: String,
    pub cc: String,
    pub to: String,
    pub sender_email_address: String,
    pub sender_name: String,
    pub body_prefix: String,
    pub body_html: String,
    pub body: String,
    pub subject: String,
    pub date: Option<DateTime<Utc>>,
}

impl ArchiveMessage for MessageRecord {
    fn descriptor_node_id(&self) -> Result<i64, ArchiveError> {
        Ok(self.descriptor_node_id)
    }
    fn is_from_me(&self) -> Result<bool, ArchiveError> {
        Ok(self.from_me)
    }
    fn has_replied(&self) -> Result<bool, ArchiveError> {
        Ok(self.replied)
    }
    fn is_read(&self) -> Result<bool, ArchiveError> {
        Ok(self.read)
    }
    fn has_forwarded(&self) -> Result<bool, ArchiveError> {
        Ok(self.forwarded)
    }
    fn is_reply_requested(&self) -> Result<bool, ArchiveError> {
        Ok(self.reply_requested)
    }
    fn message_to_me(&self) -> Result<i64, ArchiveError> {
        Ok(self.message_to_me)
    }
    fn message_cc_me(&self) -> Result<i64, ArchiveError> {
        Ok(self.message_cc_me)
    }
    fn message_class(&self) -> Result<String, ArchiveError> {
        Ok(self.message_class.clone())
    }
    fn in_reply_to_id(&self) -> Result<Option<String>, ArchiveError> {
        Ok(self.in_reply_to_id.clone())
    }
    fn importance(&self) -> Result<i64, ArchiveError> {
        Ok(self.importance)
    }
    fn number_of_recipients(&self) -> Result<i64, ArchiveError> {
        Ok(self.number_of_recipients)
    }
    fn number_of_attachments(&self) -> Result<i64, ArchiveError> {
        Ok(self.number_of_attachments)
    }
    fn message_size(&self) -> Result<i64, ArchiveError> {
        Ok(self.size)
    }
    fn display_bcc(&self) -> Result<String, ArchiveError> {
        Ok(self.bcc.clone())
    }
    fn display_cc(&self) -> Result<String, ArchiveError> {
        Ok(self.cc.clone())
    }
    fn display_to(&self) -> Result<String, ArchiveError> {
        Ok(self.to.clone())
    }
    fn sender_email_address(&self) -> Result<String, ArchiveError> {
        Ok(self.sender_email_address.clone())
    }
    fn sender_name(&self) -> Result<String, ArchiveError> {
        Ok(self.sender_name.clone())
    }
    fn body_prefix(&self) -> Result<String, ArchiveError> {
        Ok(self.body_prefix.clone())
    }
    fn body_html(&self) -> Result<String, ArchiveError> {
        Ok(self.body_html.clone())
    }
    fn body(&self) -> Result<String, ArchiveError> {
        Ok(self.body.clone())
    }
    fn subject(&self) -> Result<String, ArchiveError> {
        Ok(self.subject.clone())
    }
    fn client_submit_time(&self) -> Result<Option<DateTime<Utc>>, ArchiveError> {
        Ok(self.date)
    }
}

/// Stand-in for a message whose content could not be loaded. The cursor can still
/// advance past it; every getter fails with the load error.
#[derive(Debug, Clone)]
pub struct UnreadableMessage {
    reason: String,
}

impl UnreadableMessage {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn fail<T>(&self, attribute: &'static str) -> Result<T, ArchiveError> {
        Err(ArchiveError::attribute(attribute, self.reason.clone()))
    }
}

impl ArchiveMessage for UnreadableMessage {
    fn descriptor_node_id(&self) -> Result<i64, ArchiveError> {
        self.fail("descriptor_node_id")
    }
    fn is_from_me(&self) -> Result<bool, ArchiveError> {
        self.fail("from_me")
    }
    fn has_replied(&self) -> Result<bool, ArchiveError> {
        self.fail("replied")
    }
    fn is_read(&self) -> Result<bool, ArchiveError> {
        self.fail("read")
    }
    fn has_forwarded(&self) -> Result<bool, ArchiveError> {
        self.fail("forwarded")
    }
    fn is_reply_requested(&self) -> Result<bool, ArchiveError> {
        self.fail("reply_requested")
    }
    fn message_to_me(&self) -> Result<i64, ArchiveError> {
        self.fail("message_to_me")
    }
    fn message_cc_me(&self) -> Result<i64, ArchiveError> {
        self.fail("message_cc_me")
    }
    fn message_class(&self) -> Result<String, ArchiveError> {
        self.fail("message_class")
    }
    fn in_reply_to_id(&self) -> Result<Option<String>, ArchiveError> {
        self.fail("in_reply_to_id")
    }
    fn importance(&self) -> Result<i64, ArchiveError> {
        self.fail("importance")
    }
    fn number_of_recipients(&self) -> Result<i64, ArchiveError> {
        self.fail("number_of_recipients")
    }
    fn number_of_attachments(&self) -> Result<i64, ArchiveError> {
        self.fail("number_of_attachments")
    }
    fn message_size(&self) -> Result<i64, ArchiveError> {
        self.fail("size")
    }
    fn display_bcc(&self) -> Result<String, ArchiveError> {
        self.fail("bcc")
    }
    fn display_cc(&self) -> Result<String, ArchiveError> {
        self.fail("cc")
    }
    fn display_to(&self) -> Result<String, ArchiveError> {
        self.fail("to")
    }
    fn sender_email_address(&self) -> Result<String, ArchiveError> {
        self.fail("sender_email_address")
    }
    fn sender_name(&self) -> Result<String, ArchiveError> {
        self.fail("sender_name")
    }
    fn body_prefix(&self) -> Result<String, ArchiveError> {
        self.fail("body_prefix")
    }
    fn body_html(&self) -> Result<String, ArchiveError> {
        self.fail("body_html")
    }
    fn body(&self) -> Result<String, ArchiveError> {
        self.fail("body")
    }
    fn subject(&self) -> Result<String, ArchiveError> {
        self.fail("subject")
    }
    fn client_submit_time(&self) -> Result<Option<DateTime<Utc>>, ArchiveError> {
        self.fail("date")
    }
}
