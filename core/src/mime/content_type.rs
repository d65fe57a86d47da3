/*
 * content_type.rs
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

//! Content-Type and Content-Disposition values (RFC 2045, RFC 2183).

use std::collections::HashMap;

use super::rfc2047::decode_encoded_words;
use super::utils::is_token;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    primary_type: String,
    sub_type: String,
    parameters: HashMap<String, String>,
}

impl ContentType {
    /// RFC 2045 default for parts without a Content-Type.
    pub fn text_plain() -> Self {
        Self {
            primary_type: "text".to_string(),
            sub_type: "plain".to_string(),
            parameters: HashMap::new(),
        }
    }

    pub fn primary_type(&self) -> &str {
        &self.primary_type
    }

    pub fn sub_type(&self) -> &str {
        &self.sub_type
    }

    pub fn is_primary_type(&self, t: &str) -> bool {
        self.primary_type.eq_ignore_ascii_case(t)
    }

    pub fn is_mime_type(&self, primary: &str, sub: &str) -> bool {
        self.is_primary_type(primary) && self.sub_type.eq_ignore_ascii_case(sub)
    }

    /// Parameter by case-insensitive name.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn charset(&self) -> Option<&str> {
        self.parameter("charset")
    }
}

/// Parse a Content-Type header value. None when the type is not `token/token`.
pub fn parse_content_type(value: &str) -> Option<ContentType> {
    let (type_part, params_part) = split_value(value);
    let (primary, sub) = type_part.split_once('/')?;
    let (primary, sub) = (primary.trim(), sub.trim());
    if !is_token(primary) || !is_token(sub) {
        return None;
    }
    Some(ContentType {
        primary_type: primary.to_ascii_lowercase(),
        sub_type: sub.to_ascii_lowercase(),
        parameters: parse_parameter_list(params_part),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDisposition {
    disposition_type: String,
    parameters: HashMap<String, String>,
}

impl ContentDisposition {
    pub fn is_attachment(&self) -> bool {
        self.disposition_type.eq_ignore_ascii_case("attachment")
    }

    pub fn filename(&self) -> Option<&str> {
        self.parameters.get("filename").map(String::as_str)
    }
}

pub fn parse_content_disposition(value: &str) -> Option<ContentDisposition> {
    let (type_part, params_part) = split_value(value);
    if !is_token(type_part) {
        return None;
    }
    Some(ContentDisposition {
        disposition_type: type_part.to_ascii_lowercase(),
        parameters: parse_parameter_list(params_part),
    })
}

fn split_value(value: &str) -> (&str, &str) {
    match value.split_once(';') {
        Some((a, b)) => (a.trim(), b.trim()),
        None => (value.trim(), ""),
    }
}

/// Parse `name=value; name="quoted value"`. Names are lowercased; malformed entries are skipped.
pub fn parse_parameter_list(params_part: &str) -> HashMap<String, String> {
    let mut parameters = HashMap::new();
    let bytes = params_part.as_bytes();
    let len = bytes.len();
    let mut pos = 0;

    while pos < len {
        while pos < len && (bytes[pos] == b';' || bytes[pos].is_ascii_whitespace()) {
            pos += 1;
        }
        if pos >= len {
            break;
        }
        let Some(eq) = bytes[pos..].iter().position(|&b| b == b'=') else {
            break;
        };
        let eq_abs = pos + eq;
        let name = params_part[pos..eq_abs].trim();
        pos = eq_abs + 1;
        while pos < len && bytes[pos] == b' ' {
            pos += 1;
        }
        let value = if pos < len && bytes[pos] == b'"' {
            pos += 1;
            let mut v = Vec::new();
            while pos < len {
                let c = bytes[pos];
                if c == b'\\' && pos + 1 < len {
                    v.push(bytes[pos + 1]);
                    pos += 2;
                } else if c == b'"' {
                    pos += 1;
                    break;
                } else {
                    v.push(c);
                    pos += 1;
                }
            }
            String::from_utf8_lossy(&v).into_owned()
        } else {
            let end = bytes[pos..]
                .iter()
                .position(|&b| b == b';')
                .map(|i| pos + i)
                .unwrap_or(len);
            let v = params_part[pos..end].trim().to_string();
            pos = end;
            v
        };
        if is_token(name) {
            parameters.insert(name.to_ascii_lowercase(), decode_encoded_words(&value));
        }
    }
    parameters
}
