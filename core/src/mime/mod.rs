/*
 * mod.rs
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

//! RFC 5322 and MIME parsing for messages stored as raw files.

mod address;
mod body;
mod content_type;
mod date;
mod headers;
mod quoted_printable;
mod rfc2047;
mod utils;

pub use address::{display_list, parse_address_list, Mailbox};
pub use body::{decode_transfer, extract_body, MessageBody};
pub use content_type::{
    parse_content_disposition, parse_content_type, parse_parameter_list, ContentDisposition,
    ContentType,
};
pub use date::parse_date;
pub use headers::{split_entity, Headers};
pub use rfc2047::{charset_bytes_to_string, decode_encoded_words};
pub use utils::{is_token, is_valid_boundary};
