/*
 * filename.rs
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

//! Maildir filename parsing.
//! Format: <timestamp>.<unique>,S=<size>:2,<flags>  e.g. 1733356800000.12345.1,S=4523:2,RS

use std::collections::HashSet;

/// Standard Maildir info flags (cr.yp.to/proto/maildir.html).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    Draft,
    Flagged,
    /// P: resent, forwarded or bounced.
    Passed,
    /// R: replied to.
    Replied,
    Seen,
    Trashed,
}

/// Parsed Maildir filename (base, size, flags).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaildirFilename {
    /// Filename without the `:2,` info suffix. Stable across flag changes.
    pub base: String,
    pub timestamp: Option<u64>,
    pub size: Option<u64>,
    pub flags: HashSet<Flag>,
}

impl MaildirFilename {
    /// Parse a filename from cur/ or new/. None for dotfiles and empty names.
    pub fn parse(filename: &str) -> Option<Self> {
        if filename.is_empty() || filename.starts_with('.') {
            return None;
        }
        let (base, flags_part) = match filename.find(":2,") {
            Some(i) => (&filename[..i], &filename[i + 3..]),
            None => (filename, ""),
        };
        let size = base.find(",S=").and_then(|i| {
            let digits: String = base[i + 3..]
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            digits.parse().ok()
        });
        let timestamp = base.split('.').next().and_then(|t| t.parse().ok());

        let flags = flags_part
            .chars()
            .filter_map(|c| match c {
                'D' => Some(Flag::Draft),
                'F' => Some(Flag::Flagged),
                'P' => Some(Flag::Passed),
                'R' => Some(Flag::Replied),
                'S' => Some(Flag::Seen),
                'T' => Some(Flag::Trashed),
                _ => None,
            })
            .collect();

        Some(Self {
            base: base.to_string(),
            timestamp,
            size,
            flags,
        })
    }

    pub fn has(&self, flag: Flag) -> bool {
        self.flags.contains(&flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_name() {
        let f = MaildirFilename::parse("1733356800000.12345.1,S=4523:2,PRS").unwrap();
        assert_eq!(f.base, "1733356800000.12345.1,S=4523");
        assert_eq!(f.timestamp, Some(1733356800000));
        assert_eq!(f.size, Some(4523));
        assert!(f.has(Flag::Passed) && f.has(Flag::Replied) && f.has(Flag::Seen));
        assert!(!f.has(Flag::Draft));
    }

    #[test]
    fn parse_new_message_without_info() {
        let f = MaildirFilename::parse("1204680122.M2P13.host.example,S=120,W=124").unwrap();
        assert_eq!(f.size, Some(120));
        assert!(f.flags.is_empty());
        assert!(MaildirFilename::parse(".nfs0001").is_none());
    }

    #[test]
    fn non_numeric_timestamp() {
        let f = MaildirFilename::parse("msg-a:2,S").unwrap();
        assert_eq!(f.timestamp, None);
        assert!(f.has(Flag::Seen));
    }
}
