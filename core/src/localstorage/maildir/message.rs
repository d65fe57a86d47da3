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

//! One message file of a Maildir, read and parsed once when the cursor reaches it.

use super::filename::{Flag, MaildirFilename};
use crate::archive::{ArchiveError, ArchiveMessage};
use crate::message_id::{maildir_message_id, MessageId};
use crate::mime::{display_list, extract_body, parse_address_list, parse_date, split_entity};
use crate::mime::{Headers, Mailbox, MessageBody};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;
use std::sync::Arc;

const MESSAGE_CLASS: &str = "IPM.Note";

/// Importance levels as stored in PST (PidTagImportance).
const IMPORTANCE_LOW: i64 = 0;
const IMPORTANCE_NORMAL: i64 = 1;
const IMPORTANCE_HIGH: i64 = 2;

/// Per-reader settings shared by all messages of an archive.
#[derive(Debug)]
pub(super) struct MessageOptions {
    pub owner_addresses: Vec<String>,
    pub body_prefix_chars: usize,
}

pub(super) struct MaildirMessage {
    id: MessageId,
    filename: MaildirFilename,
    file_len: u64,
    headers: Headers,
    from: Vec<Mailbox>,
    to: Vec<Mailbox>,
    cc: Vec<Mailbox>,
    bcc: Vec<Mailbox>,
    body: MessageBody,
    options: Arc<MessageOptions>,
}

impl MaildirMessage {
    pub(super) fn load(
        path: &Path,
        filename: MaildirFilename,
        folder_name: &str,
        options: Arc<MessageOptions>,
    ) -> Result<Self, ArchiveError> {
        let raw = fs::read(path)?;
        let (headers, _) = split_entity(&raw);
        let addresses = |name: &str| {
            headers
                .get_joined(name)
                .map(|v| parse_address_list(&v))
                .unwrap_or_default()
        };
        let from = addresses("From");
        let to = addresses("To");
        let cc = addresses("Cc");
        let bcc = addresses("Bcc");
        let body = extract_body(&raw);
        Ok(Self {
            id: maildir_message_id(folder_name, &filename.base),
            file_len: raw.len() as u64,
            filename,
            headers,
            from,
            to,
            cc,
            bcc,
            body,
            options,
        })
    }

    fn is_owner(&self, mailboxes: &[Mailbox]) -> bool {
        mailboxes.iter().any(|m| {
            self.options
                .owner_addresses
                .iter()
                .any(|owner| m.is_address(owner))
        })
    }
}

/// `Importance: high` or `X-Priority: 1 (Highest)`; normal when absent or unrecognised.
fn importance_from_headers(headers: &Headers) -> i64 {
    if let Some(value) = headers.get("Importance") {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => return IMPORTANCE_HIGH,
            "low" => return IMPORTANCE_LOW,
            "normal" => return IMPORTANCE_NORMAL,
            _ => {}
        }
    }
    let priority = headers
        .get("X-Priority")
        .and_then(|v| v.trim().chars().next())
        .and_then(|c| c.to_digit(10));
    match priority {
        Some(1) | Some(2) => IMPORTANCE_HIGH,
        Some(4) | Some(5) => IMPORTANCE_LOW,
        _ => IMPORTANCE_NORMAL,
    }
}

impl ArchiveMessage for MaildirMessage {
    fn descriptor_node_id(&self) -> Result<i64, ArchiveError> {
        Ok(self.id.descriptor_node_id())
    }

    fn is_from_me(&self) -> Result<bool, ArchiveError> {
        Ok(self.is_owner(&self.from[..self.from.len().min(1)]))
    }

    fn has_replied(&self) -> Result<bool, ArchiveError> {
        Ok(self.filename.has(Flag::Replied))
    }

    fn is_read(&self) -> Result<bool, ArchiveError> {
        Ok(self.filename.has(Flag::Seen))
    }

    fn has_forwarded(&self) -> Result<bool, ArchiveError> {
        Ok(self.filename.has(Flag::Passed))
    }

    fn is_reply_requested(&self) -> Result<bool, ArchiveError> {
        Ok(self.headers.contains("Disposition-Notification-To")
            || self.headers.contains("Return-Receipt-To"))
    }

    fn message_to_me(&self) -> Result<i64, ArchiveError> {
        Ok(self.is_owner(&self.to) as i64)
    }

    fn message_cc_me(&self) -> Result<i64, ArchiveError> {
        Ok(self.is_owner(&self.cc) as i64)
    }

    fn message_class(&self) -> Result<String, ArchiveError> {
        Ok(MESSAGE_CLASS.to_string())
    }

    fn in_reply_to_id(&self) -> Result<Option<String>, ArchiveError> {
        Ok(self
            .headers
            .get("In-Reply-To")
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string))
    }

    fn importance(&self) -> Result<i64, ArchiveError> {
        Ok(importance_from_headers(&self.headers))
    }

    fn number_of_recipients(&self) -> Result<i64, ArchiveError> {
        Ok((self.to.len() + self.cc.len() + self.bcc.len()) as i64)
    }

    fn number_of_attachments(&self) -> Result<i64, ArchiveError> {
        Ok(self.body.attachment_count as i64)
    }

    fn message_size(&self) -> Result<i64, ArchiveError> {
        let size = self.filename.size.unwrap_or(self.file_len);
        i64::try_from(size).map_err(|_| ArchiveError::attribute("size", format!("{} overflows", size)))
    }

    fn display_bcc(&self) -> Result<String, ArchiveError> {
        Ok(display_list(&self.bcc))
    }

    fn display_cc(&self) -> Result<String, ArchiveError> {
        Ok(display_list(&self.cc))
    }

    fn display_to(&self) -> Result<String, ArchiveError> {
        Ok(display_list(&self.to))
    }

    fn sender_email_address(&self) -> Result<String, ArchiveError> {
        Ok(self.from.first().map(|m| m.address.clone()).unwrap_or_default())
    }

    fn sender_name(&self) -> Result<String, ArchiveError> {
        Ok(self
            .from
            .first()
            .map(|m| m.display().to_string())
            .unwrap_or_default())
    }

    fn body_prefix(&self) -> Result<String, ArchiveError> {
        Ok(self
            .body
            .plain
            .as_deref()
            .unwrap_or_default()
            .chars()
            .take(self.options.body_prefix_chars)
            .collect())
    }

    fn body_html(&self) -> Result<String, ArchiveError> {
        Ok(self.body.html.clone().unwrap_or_default())
    }

    fn body(&self) -> Result<String, ArchiveError> {
        Ok(self.body.plain.clone().unwrap_or_default())
    }

    fn subject(&self) -> Result<String, ArchiveError> {
        Ok(self.headers.get_decoded("Subject").unwrap_or_default())
    }

    fn client_submit_time(&self) -> Result<Option<DateTime<Utc>>, ArchiveError> {
        Ok(self.headers.get("Date").and_then(parse_date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const RAW: &[u8] = b"From: \"Jane Doe\" <jane@example.com>\r\n\
To: me@example.com, Bob <bob@example.org>\r\n\
Cc: ME@Example.com\r\n\
Subject: =?utf-8?q?Caf=C3=A9?= plans\r\n\
Date: Sun, 9 Mar 2014 18:30:00 +0100\r\n\
In-Reply-To: <a1@example.com>\r\n\
X-Priority: 1 (Highest)\r\n\
Disposition-Notification-To: jane@example.com\r\n\
\r\n\
See you at noon.\r\n";

    fn load(name: &str, raw: &[u8], owner: &str) -> MaildirMessage {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        fs::write(&path, raw).unwrap();
        let options = Arc::new(MessageOptions {
            owner_addresses: vec![owner.to_string()],
            body_prefix_chars: 3,
        });
        MaildirMessage::load(&path, MaildirFilename::parse(name).unwrap(), "INBOX/Work", options).unwrap()
    }

    #[test]
    fn attributes_from_headers_and_flags() {
        let m = load("1394386200.1.host,S=999:2,PS", RAW, "me@example.com");
        assert!(!m.is_from_me().unwrap());
        assert!(m.is_read().unwrap());
        assert!(m.has_forwarded().unwrap());
        assert!(!m.has_replied().unwrap());
        assert!(m.is_reply_requested().unwrap());
        assert_eq!(m.message_to_me().unwrap(), 1);
        assert_eq!(m.message_cc_me().unwrap(), 1);
        assert_eq!(m.message_class().unwrap(), "IPM.Note");
        assert_eq!(m.in_reply_to_id().unwrap().as_deref(), Some("<a1@example.com>"));
        assert_eq!(m.importance().unwrap(), IMPORTANCE_HIGH);
        assert_eq!(m.number_of_recipients().unwrap(), 3);
        assert_eq!(m.number_of_attachments().unwrap(), 0);
        assert_eq!(m.message_size().unwrap(), 999);
        assert_eq!(m.display_to().unwrap(), "me@example.com; Bob");
        assert_eq!(m.sender_name().unwrap(), "Jane Doe");
        assert_eq!(m.sender_email_address().unwrap(), "jane@example.com");
        assert_eq!(m.subject().unwrap(), "Café plans");
        assert_eq!(m.body().unwrap(), "See you at noon.\r\n");
        assert_eq!(m.body_prefix().unwrap(), "See");
        assert_eq!(m.body_html().unwrap(), "");
        assert_eq!(
            m.client_submit_time().unwrap(),
            Some(Utc.with_ymd_and_hms(2014, 3, 9, 17, 30, 0).unwrap())
        );
    }

    #[test]
    fn from_me_and_file_length_size() {
        let m = load("1.x", RAW, "jane@example.com");
        assert!(m.is_from_me().unwrap());
        assert_eq!(m.message_to_me().unwrap(), 0);
        assert_eq!(m.message_size().unwrap(), RAW.len() as i64);
    }

    #[test]
    fn descriptor_id_ignores_flags() {
        let a = load("7.y:2,", b"Subject: a\n\n", "me@x.org");
        let b = load("7.y:2,RS", b"Subject: a\n\n", "me@x.org");
        assert_eq!(a.descriptor_node_id().unwrap(), b.descriptor_node_id().unwrap());
        assert_eq!(a.client_submit_time().unwrap(), None);
        assert_eq!(a.importance().unwrap(), IMPORTANCE_NORMAL);
    }
}
