/*
 * mailbox_name_codec.rs
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

//! Decode Maildir++ folder names stored with =XX hex escapes
//! (non-ASCII bytes, path separators and Windows-forbidden characters).

fn hex_digit_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'A'..=b'F' => Some(c - b'A' + 10),
        b'a'..=b'f' => Some(c - b'a' + 10),
        _ => None,
    }
}

/// Decode one filesystem-encoded folder name component. Invalid escapes are kept literally.
pub fn decode(encoded: &str) -> String {
    if !encoded.contains('=') {
        return encoded.to_string();
    }
    let bytes = encoded.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'=' && i + 2 < bytes.len() {
            if let (Some(high), Some(low)) = (hex_digit_value(bytes[i + 1]), hex_digit_value(bytes[i + 2])) {
                result.push(high << 4 | low);
                i += 3;
                continue;
            }
        }
        result.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&result).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_escapes() {
        assert_eq!(decode("Re=C3=A7us"), "Reçus");
        assert_eq!(decode("a=2Fb"), "a/b");
        assert_eq!(decode("Plain"), "Plain");
    }

    #[test]
    fn escape_at_end() {
        assert_eq!(decode("x=41"), "xA");
        assert_eq!(decode("x=4"), "x=4");
        assert_eq!(decode("x="), "x=");
    }
}
