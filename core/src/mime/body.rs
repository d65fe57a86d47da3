/*
 * body.rs
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

//! Extract the plain and HTML bodies of a message and count its attachments.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use super::content_type::{parse_content_disposition, parse_content_type, ContentType};
use super::headers::{split_entity, Headers};
use super::quoted_printable;
use super::rfc2047::charset_bytes_to_string;
use super::utils::is_valid_boundary;

const MAX_DEPTH: usize = 16;

/// Displayable parts of a message. The first text/plain and text/html leaves win.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageBody {
    pub plain: Option<String>,
    pub html: Option<String>,
    pub attachment_count: usize,
}

/// Walk the MIME tree of a complete message (headers included).
pub fn extract_body(raw: &[u8]) -> MessageBody {
    let mut body = MessageBody::default();
    let (headers, content) = split_entity(raw);
    visit_entity(&headers, content, 0, &mut body);
    body
}

fn visit_entity(headers: &Headers, content: &[u8], depth: usize, out: &mut MessageBody) {
    let content_type = headers
        .get("Content-Type")
        .and_then(parse_content_type)
        .unwrap_or_else(ContentType::text_plain);
    let disposition = headers
        .get("Content-Disposition")
        .and_then(parse_content_disposition);

    if content_type.is_primary_type("multipart") && depth < MAX_DEPTH {
        if let Some(boundary) = content_type.parameter("boundary").filter(|b| is_valid_boundary(b)) {
            for part in split_multipart(content, boundary) {
                let (part_headers, part_content) = split_entity(part);
                visit_entity(&part_headers, part_content, depth + 1, out);
            }
            return;
        }
    }

    let is_attachment = disposition
        .as_ref()
        .map(|d| d.is_attachment() || d.filename().is_some())
        .unwrap_or(false)
        || !content_type.is_primary_type("text");
    if is_attachment {
        out.attachment_count += 1;
        return;
    }

    let decoded = decode_transfer(headers.get("Content-Transfer-Encoding"), content);
    let text = charset_bytes_to_string(&decoded, content_type.charset());
    if content_type.is_mime_type("text", "html") {
        if out.html.is_none() {
            out.html = Some(text);
        }
    } else if out.plain.is_none() {
        out.plain = Some(text);
    }
}

/// Undo Content-Transfer-Encoding. Unknown encodings and 7bit/8bit/binary pass through.
pub fn decode_transfer(encoding: Option<&str>, content: &[u8]) -> Vec<u8> {
    match encoding.map(|e| e.trim().to_ascii_lowercase()).as_deref() {
        Some("base64") => {
            let compact: Vec<u8> = content
                .iter()
                .copied()
                .filter(|b| !b.is_ascii_whitespace())
                .collect();
            BASE64.decode(&compact).unwrap_or_else(|_| content.to_vec())
        }
        Some("quoted-printable") => quoted_printable::decode(content),
        _ => content.to_vec(),
    }
}

/// Body parts between `--boundary` delimiter lines, up to the closing `--boundary--`.
/// The preamble and epilogue are dropped.
fn split_multipart<'a>(content: &'a [u8], boundary: &str) -> Vec<&'a [u8]> {
    let delimiter = format!("--{}", boundary);
    let delimiter = delimiter.as_bytes();
    let mut parts = Vec::new();
    let mut part_start: Option<usize> = None;
    let mut line_start = 0;

    while line_start < content.len() {
        let line_end = content[line_start..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|i| line_start + i + 1)
            .unwrap_or(content.len());
        let line = trim_eol(&content[line_start..line_end]);
        if line.starts_with(delimiter) {
            let rest = &line[delimiter.len()..];
            let closing = rest.starts_with(b"--");
            if closing || rest.iter().all(|b| *b == b' ' || *b == b'\t') {
                if let Some(start) = part_start {
                    parts.push(trim_eol_before(content, start, line_start));
                }
                if closing {
                    return parts;
                }
                part_start = Some(line_end);
            }
        }
        line_start = line_end;
    }
    // Unterminated: keep the last part.
    if let Some(start) = part_start {
        parts.push(&content[start..]);
    }
    parts
}

fn trim_eol(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// The line break before a delimiter belongs to the delimiter.
fn trim_eol_before(content: &[u8], start: usize, end: usize) -> &[u8] {
    if end <= start {
        return &content[start..start];
    }
    trim_eol(&content[start..end])
}
