/*
 * message_id.rs
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

//! Stable message identifiers for file-backed archives.
//! A message is keyed by archive root, folder path and base filename (never by position
//! or the Message-ID header); the key hashes to the integer `descriptor_node_id`.

use sha2::{Digest, Sha256};
use std::fmt;

/// Opaque stable message key in URI form.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(uri_or_opaque: impl Into<String>) -> Self {
        Self(uri_or_opaque.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Non-negative 63-bit id: the first 8 bytes of SHA-256 of the key, high bit cleared.
    pub fn descriptor_node_id(&self) -> i64 {
        let digest = Sha256::digest(self.0.as_bytes());
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        (u64::from_be_bytes(head) & i64::MAX as u64) as i64
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Build MessageId for Maildir (folder path + base filename). The archive root is not part
/// of the key, so a copied or moved archive keeps its ids.
pub fn maildir_message_id(folder_path: &str, base_filename: &str) -> MessageId {
    MessageId::new(format!("maildir:///{}/{}", folder_path, base_filename))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maildir_id_form() {
        let id = maildir_message_id("INBOX/Projects", "1733356800000.1.host,S=10");
        assert_eq!(id.as_str(), "maildir:///INBOX/Projects/1733356800000.1.host,S=10");
    }

    #[test]
    fn descriptor_id_is_stable_and_non_negative() {
        let a = maildir_message_id("INBOX", "1.a").descriptor_node_id();
        let b = maildir_message_id("INBOX", "1.a").descriptor_node_id();
        let c = maildir_message_id("INBOX", "1.b").descriptor_node_id();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a >= 0 && c >= 0);
    }
}
