//! Decoding of `AT+CMGL` listings.
//!
//! A listing is a run of two-line groups:
//!
//! ```text
//! +CMGL: 0,"REC UNREAD","+1234567890","23/10/15,10:20:30+00"
//! Hello World
//! ```
//!
//! Header fields are comma separated, but quoted fields may themselves
//! contain commas (the timestamp always does), so splitting is quote aware.

use crate::modem::commands::LIST_MARKER;
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::Serialize;
use std::borrow::Cow;
use tracing::warn;

/// Fields a header must carry to form a record.
const MIN_HEADER_FIELDS: usize = 4;

/// One stored message as listed by the modem.
///
/// `content` is kept exactly as received; see [`SmsRecord::decoded_content`]
/// for a display form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SmsRecord {
    pub index: String,
    pub status: String,
    pub sender: String,
    pub timestamp: String,
    pub content: String,
}

impl SmsRecord {
    /// Content for display, with UCS-2 hex payloads decoded.
    pub fn decoded_content(&self) -> Cow<'_, str> {
        decode_content(&self.content)
    }

    /// The service-centre timestamp, `yy/MM/dd,hh:mm:ss±zz`, where `zz` is
    /// the UTC offset in quarter hours.
    pub fn timestamp_parsed(&self) -> Option<DateTime<FixedOffset>> {
        parse_timestamp(&self.timestamp)
    }
}

/// Parse every well-formed record in a listing, in order.
///
/// Lines before the first header and malformed headers are skipped; they
/// never abort the parse.
pub fn parse_list(raw: &str) -> Vec<SmsRecord> {
    let lines: Vec<&str> = raw.split('\n').collect();
    let mut records = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();
        let Some(header) = line.strip_prefix(LIST_MARKER) else {
            i += 1;
            continue;
        };

        let fields = split_header(header.trim());
        if fields.len() < MIN_HEADER_FIELDS {
            warn!(line, fields = fields.len(), "skipping malformed listing header");
            i += 1;
            continue;
        }

        // A body that was filtered out of the reply leaves the next header
        // directly below this one; that header is not content.
        let content = lines
            .get(i + 1)
            .map(|l| l.trim())
            .filter(|l| !l.starts_with(LIST_MARKER));
        records.push(SmsRecord {
            index: fields[0].clone(),
            status: unquote(&fields[1]).to_string(),
            sender: unquote(&fields[2]).to_string(),
            timestamp: unquote(&fields[3]).to_string(),
            content: content.unwrap_or("").to_string(),
        });
        i += if content.is_some() { 2 } else { 1 };
    }

    records
}

/// Split a header on commas that are not inside double quotes.
///
/// Quote characters are kept in the returned fields; fields are trimmed and
/// empty ones dropped.
pub fn split_header(header: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in header.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            ',' if !in_quotes => {
                push_field(&mut fields, &current);
                current.clear();
            }
            _ => current.push(c),
        }
    }
    push_field(&mut fields, &current);

    fields
}

fn push_field(fields: &mut Vec<String>, raw: &str) {
    let field = raw.trim();
    if !field.is_empty() {
        fields.push(field.to_string());
    }
}

fn unquote(field: &str) -> &str {
    field.trim_matches('"')
}

/// Decode a UCS-2 (UTF-16BE) hex payload, or return `content` untouched.
///
/// Only content of even length made up solely of hex digits is attempted.
/// Anything that does not decode cleanly comes back as is.
pub fn decode_content(content: &str) -> Cow<'_, str> {
    if !looks_like_hex(content) {
        return Cow::Borrowed(content);
    }
    match decode_ucs2_hex(content) {
        Some(text) => Cow::Owned(text),
        None => Cow::Borrowed(content),
    }
}

fn looks_like_hex(content: &str) -> bool {
    !content.is_empty()
        && content.len() % 2 == 0
        && content.bytes().all(|b| b.is_ascii_hexdigit())
}

fn decode_ucs2_hex(content: &str) -> Option<String> {
    let bytes = hex::decode(content).ok()?;
    if bytes.len() % 2 != 0 {
        return None;
    }

    let units = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<Result<String, _>>()
        .ok()
}

fn parse_timestamp(timestamp: &str) -> Option<DateTime<FixedOffset>> {
    let split = timestamp.rfind(|c: char| c == '+' || c == '-')?;
    let (local, zone) = timestamp.split_at(split);
    let naive = NaiveDateTime::parse_from_str(local, "%y/%m/%d,%H:%M:%S").ok()?;
    let quarters: i32 = zone.parse().ok()?;
    let offset = FixedOffset::east_opt(quarters * 15 * 60)?;
    naive.and_local_timezone(offset).single()
}
