/*
 * utils.rs
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

//! MIME token and boundary character classes (RFC 2045, RFC 2046).

#[inline]
pub fn is_token_char(c: u8) -> bool {
    matches!(c,
        b'0'..=b'9' | b'A'..=b'Z' | b'a'..=b'z' |
        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' |
        b'^' | b'_' | b'`' | b'{' | b'|' | b'}' | b'~'
    )
}

/// True for a non-empty run of token characters.
pub fn is_token(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(is_token_char)
}

/// Boundary: 1 to 70 characters from the RFC 2046 set, spaces allowed except last.
pub fn is_valid_boundary(boundary: &str) -> bool {
    let b = boundary.as_bytes();
    (1..=70).contains(&b.len())
        && b.last() != Some(&b' ')
        && b.iter().all(|&c| {
            matches!(c,
                b'0'..=b'9' | b'A'..=b'Z' | b'a'..=b'z' |
                b'\'' | b'(' | b')' | b'+' | b'_' | b',' | b'-' | b'.' |
                b'/' | b':' | b'=' | b'?' | b' '
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens() {
        assert!(is_token("multipart"));
        assert!(!is_token("text/plain"));
        assert!(!is_token(""));
    }

    #[test]
    fn boundaries() {
        assert!(is_valid_boundary("----=_Part_0_1.2"));
        assert!(!is_valid_boundary("trailing "));
        assert!(!is_valid_boundary(&"x".repeat(71)));
    }
}
