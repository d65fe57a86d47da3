/*
 * rfc2047.rs
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

//! RFC 2047 encoded-word decoding (e.g. =?charset?q?text?=) for header and parameter values.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use super::quoted_printable;

/// Expand encoded-words in `s`. Whitespace between two adjacent encoded-words is dropped
/// (RFC 2047 section 6.2); malformed words are copied through unchanged.
pub fn decode_encoded_words(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    let mut previous_was_word = false;

    while let Some(start) = rest.find("=?") {
        let literal = &rest[..start];
        match decode_one_encoded_word(&rest[start..]) {
            Some((decoded, consumed)) => {
                if !(previous_was_word && literal.trim().is_empty()) {
                    out.push_str(literal);
                }
                out.push_str(&decoded);
                rest = &rest[start + consumed..];
                previous_was_word = true;
            }
            None => {
                out.push_str(literal);
                out.push_str("=?");
                rest = &rest[start + 2..];
                previous_was_word = false;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Decode one encoded-word at the start of `s`. Returns the text and the bytes consumed.
fn decode_one_encoded_word(s: &str) -> Option<(String, usize)> {
    let body = s.strip_prefix("=?")?;
    let (charset, after_charset) = body.split_once('?')?;
    let (encoding, after_encoding) = after_charset.split_once('?')?;
    let end = after_encoding.find("?=")?;
    let payload = &after_encoding[..end];
    if charset.is_empty() || payload.contains(' ') {
        return None;
    }
    let consumed = 2 + charset.len() + 1 + encoding.len() + 1 + end + 2;
    // RFC 2231 language suffix: charset*lang
    let charset = charset.split('*').next().unwrap_or(charset);
    let bytes = match encoding {
        "B" | "b" => {
            let padded = format!("{}{}", payload.trim_end_matches('='), padding(payload));
            BASE64.decode(padded).ok()?
        }
        "Q" | "q" => decode_q(payload.as_bytes()),
        _ => return None,
    };
    Some((charset_bytes_to_string(&bytes, Some(charset)), consumed))
}

/// Restore padding some mailers omit.
fn padding(payload: &str) -> &'static str {
    match payload.trim_end_matches('=').len() % 4 {
        2 => "==",
        3 => "=",
        _ => "",
    }
}

/// Q encoding: `_` is space, the rest is quoted-printable.
fn decode_q(payload: &[u8]) -> Vec<u8> {
    let replaced: Vec<u8> = payload
        .iter()
        .map(|&b| if b == b'_' { b' ' } else { b })
        .collect();
    quoted_printable::decode(&replaced)
}

/// Decode bytes in `charset`. UTF-8, US-ASCII and the ISO-8859-1 family are recognised;
/// anything else is read as UTF-8 with replacement.
pub fn charset_bytes_to_string(bytes: &[u8], charset: Option<&str>) -> String {
    let charset = charset.unwrap_or("us-ascii").trim().to_ascii_lowercase();
    match charset.as_str() {
        "iso-8859-1" | "latin1" | "iso_8859-1" | "windows-1252" | "cp1252" => {
            bytes.iter().map(|&b| b as char).collect()
        }
        "us-ascii" | "ascii" => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => bytes.iter().map(|&b| b as char).collect(),
        },
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn q_and_b_words() {
        assert_eq!(decode_encoded_words("=?UTF-8?Q?caf=C3=A9_au_lait?="), "café au lait");
        assert_eq!(decode_encoded_words("=?utf-8?B?w6l0w6k=?="), "été");
        assert_eq!(decode_encoded_words("=?utf-8?B?w6l0w6k?="), "été");
    }

    #[test]
    fn adjacent_words_join() {
        assert_eq!(
            decode_encoded_words("Re: =?iso-8859-1?q?Fran=E7ois?= =?iso-8859-1?q?_Dupont?= (work)"),
            "Re: François Dupont (work)"
        );
    }

    #[test]
    fn malformed_word_is_literal() {
        assert_eq!(decode_encoded_words("50% =?off"), "50% =?off");
        assert_eq!(decode_encoded_words("=?x?z?abc?="), "=?x?z?abc?=");
    }

    #[test]
    fn latin1_charset() {
        assert_eq!(charset_bytes_to_string(&[0x63, 0x61, 0x66, 0xE9], Some("ISO-8859-1")), "café");
    }
}
