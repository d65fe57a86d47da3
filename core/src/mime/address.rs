/*
 * address.rs
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

//! RFC 5322 address lists (From, To, Cc, Bcc).

use std::fmt;

use super::rfc2047::decode_encoded_words;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailbox {
    pub display_name: Option<String>,
    /// local@domain, as written.
    pub address: String,
}

impl Mailbox {
    /// Name to show in a display list: the display name, else the address.
    pub fn display(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.address,
        }
    }

    pub fn is_address(&self, other: &str) -> bool {
        self.address.eq_ignore_ascii_case(other.trim())
    }
}

impl fmt::Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.display_name.as_deref() {
            Some(dn) if !dn.is_empty() => write!(f, "{} <{}>", dn, self.address),
            _ => f.write_str(&self.address),
        }
    }
}

/// Parse a comma-separated address list. Entries without an `@` are dropped;
/// group syntax (`team: a@x, b@y;`) is flattened.
pub fn parse_address_list(value: &str) -> Vec<Mailbox> {
    split_list(value)
        .into_iter()
        .filter_map(|entry| parse_mailbox(&entry))
        .collect()
}

/// Join display names with "; ".
pub fn display_list(mailboxes: &[Mailbox]) -> String {
    mailboxes
        .iter()
        .map(Mailbox::display)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Split at commas outside quotes and angle brackets, stripping group labels.
fn split_list(value: &str) -> Vec<String> {
    let mut entries = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut in_angle = false;
    let mut escaped = false;

    for c in value.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => {
                current.push(c);
                escaped = true;
            }
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            '<' if !in_quotes => {
                in_angle = true;
                current.push(c);
            }
            '>' if !in_quotes => {
                in_angle = false;
                current.push(c);
            }
            ':' if !in_quotes && !in_angle => current.clear(),
            ',' | ';' if !in_quotes && !in_angle => entries.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    entries.push(current);
    entries.retain(|e| !e.trim().is_empty());
    entries
}

fn parse_mailbox(entry: &str) -> Option<Mailbox> {
    let entry = entry.trim();
    let (name, address) = match (entry.rfind('<'), entry.rfind('>')) {
        (Some(open), Some(close)) if open < close => {
            (entry[..open].trim(), entry[open + 1..close].trim())
        }
        _ => ("", strip_address_comment(entry)),
    };
    let at = address.find('@')?;
    if at == 0 || at + 1 >= address.len() {
        return None;
    }
    let name = unquote(name);
    let display_name = if name.is_empty() {
        None
    } else {
        Some(decode_encoded_words(&name))
    };
    Some(Mailbox {
        display_name,
        address: address.to_string(),
    })
}

/// `user@host (Full Name)` keeps only the address.
fn strip_address_comment(s: &str) -> &str {
    match s.find('(') {
        Some(i) => s[..i].trim(),
        None => s,
    }
}

fn unquote(s: &str) -> String {
    let s = s.trim();
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        let mut out = String::with_capacity(s.len());
        let mut chars = s[1..s.len() - 1].chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            } else {
                out.push(c);
            }
        }
        out
    } else {
        s.to_string()
    }
}
