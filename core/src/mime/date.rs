/*
 * date.rs
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

//! RFC 5322 date-time parsing (section 3.3), normalised to UTC.

use chrono::{DateTime, FixedOffset, Utc};

/// Parse a Date header value (e.g. "Fri, 21 Nov 1997 09:55:06 -0600").
/// Returns None on parse failure.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = strip_comment(value.trim());
    if value.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc2822(value)
        .ok()
        .or_else(|| parse_obsolete_date(value))
        .map(|dt| dt.with_timezone(&Utc))
}

/// Drop a trailing zone comment such as "(PST)".
fn strip_comment(value: &str) -> &str {
    match value.find('(') {
        Some(i) => value[..i].trim_end(),
        None => value,
    }
}

/// Obsolete forms: 2-digit year, optional seconds, named zones.
fn parse_obsolete_date(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = match value.split_once(',') {
        Some((_, rest)) => rest.trim(),
        None => value,
    };
    let value = convert_obsolete_timezone(value);
    let value = convert_two_digit_year(&value);
    DateTime::parse_from_str(&value, "%d %b %Y %H:%M:%S %z")
        .or_else(|_| DateTime::parse_from_str(&value, "%d %b %Y %H:%M %z"))
        .ok()
}

/// 00-49 becomes 2000-2049, 50-99 becomes 1950-1999 (RFC 5322 section 4.3).
fn convert_two_digit_year(s: &str) -> String {
    let mut parts: Vec<String> = s.split_whitespace().map(str::to_string).collect();
    if let Some(year) = parts.get_mut(2) {
        if year.len() == 2 && year.bytes().all(|b| b.is_ascii_digit()) {
            let yy: u32 = year.parse().unwrap_or(0);
            *year = if yy <= 49 { 2000 + yy } else { 1900 + yy }.to_string();
        }
    }
    parts.join(" ")
}

fn convert_obsolete_timezone(s: &str) -> String {
    const ZONES: &[(&str, &str)] = &[
        ("GMT", "+0000"),
        ("UT", "+0000"),
        ("UTC", "+0000"),
        ("Z", "+0000"),
        ("EST", "-0500"),
        ("EDT", "-0400"),
        ("CST", "-0600"),
        ("CDT", "-0500"),
        ("MST", "-0700"),
        ("MDT", "-0600"),
        ("PST", "-0800"),
        ("PDT", "-0700"),
    ];
    let mut parts: Vec<&str> = s.split_whitespace().collect();
    if let Some(last) = parts.last_mut() {
        if let Some((_, offset)) = ZONES.iter().find(|(name, _)| last.eq_ignore_ascii_case(name)) {
            *last = offset;
        }
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn rfc2822_date_to_utc() {
        assert_eq!(
            parse_date("Fri, 21 Nov 1997 09:55:06 -0600"),
            Some(Utc.with_ymd_and_hms(1997, 11, 21, 15, 55, 6).unwrap())
        );
    }

    #[test]
    fn obsolete_forms() {
        assert_eq!(
            parse_date("21 Nov 97 09:55 PST"),
            Some(Utc.with_ymd_and_hms(1997, 11, 21, 17, 55, 0).unwrap())
        );
        assert_eq!(
            parse_date("Mon, 3 Feb 2003 10:00:00 +0100 (CET)"),
            Some(Utc.with_ymd_and_hms(2003, 2, 3, 9, 0, 0).unwrap())
        );
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date(""), None);
    }
}
