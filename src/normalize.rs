// src/normalize.rs
//! Row → Event normalization.
//!
//! Column positions are resolved against the live header row on every fetch,
//! so the sheet can be reordered or gain columns without code changes. Every
//! field read tolerates a missing column; the only hard requirement for a row
//! is a parseable effective end date.

use chrono::NaiveDate;
use once_cell::sync::OnceCell;
use regex::Regex;

use crate::event::{Contact, Event, EventKind, TimesOfDay};
use crate::media::extract_media_ref;

pub const UNTITLED_TITLE: &str = "Untitled Event";

/// Typed column accessor resolved once per fetch against the header row.
/// `None` means the column is absent from this sheet revision.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    pub title: Option<usize>,
    pub kind: Option<usize>,
    pub media_link: Option<usize>,
    pub description: Option<usize>,
    pub start_date: Option<usize>,
    pub end_date: Option<usize>,
    pub all_day: Option<usize>,
    pub morning: Option<usize>,
    pub afternoon: Option<usize>,
    pub evening: Option<usize>,
    pub location: Option<usize>,
    pub contact_details: Option<usize>,
    pub contact_instructions: Option<usize>,
    pub notes: Option<usize>,
    pub button_text: Option<usize>,
    pub button_link: Option<usize>,
}

/// Header matching is case-insensitive with all whitespace stripped, so
/// "Event Title", "EventTitle", and "event title " resolve identically.
fn header_key(h: &str) -> String {
    h.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase()
}

impl ColumnMap {
    pub fn resolve(headers: &[String]) -> Self {
        let keys: Vec<String> = headers.iter().map(|h| header_key(h)).collect();
        let find = |name: &str| keys.iter().position(|k| *k == header_key(name));
        Self {
            title: find("Event Title"),
            kind: find("Event Type"),
            media_link: find("Media Link"),
            description: find("Description"),
            start_date: find("Start Date"),
            end_date: find("End Date"),
            all_day: find("All Day"),
            morning: find("Morning Time"),
            afternoon: find("Afternoon Time"),
            evening: find("Evening Time"),
            location: find("Location"),
            contact_details: find("Contact Details"),
            contact_instructions: find("Contact Instructions"),
            notes: find("Notes"),
            button_text: find("Button Text"),
            button_link: find("Button Link"),
        }
    }
}

fn cell<'a>(row: &'a [String], idx: Option<usize>) -> &'a str {
    idx.and_then(|i| row.get(i)).map(String::as_str).unwrap_or("")
}

/// Clean a text cell: decode HTML entities, collapse whitespace, trim.
pub fn clean_cell(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s);
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    re_ws.replace_all(decoded.as_ref(), " ").trim().to_string()
}

/// Lenient calendar-date parse over the formats editors actually type.
pub fn parse_flexible_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    const FORMATS: &[&str] = &[
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%m/%d/%Y",
        "%B %d, %Y",
        "%b %d, %Y",
        "%d %B %Y",
    ];
    for f in FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, f) {
            return Some(d);
        }
    }
    // Sheet exports occasionally carry a full timestamp.
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    None
}

/// Re-emit a date cell as ISO `YYYY-MM-DD`; unparseable input passes through
/// unchanged so bad cells degrade to showing the raw text.
pub fn format_date(raw: &str) -> String {
    match parse_flexible_date(raw) {
        Some(d) => d.format("%Y-%m-%d").to_string(),
        None => raw.trim().to_string(),
    }
}

/// Expand a whole-cell compact time like `7pm` to `7:00 PM`. Anything else
/// (already-expanded times, ranges, free text) passes through unchanged.
pub fn format_time(raw: &str) -> String {
    static RE_COMPACT: OnceCell<Regex> = OnceCell::new();
    let re = RE_COMPACT.get_or_init(|| Regex::new(r"(?i)^(\d{1,2})\s*([ap]m)$").unwrap());
    let t = raw.trim();
    match re.captures(t) {
        Some(caps) => format!("{}:00 {}", &caps[1], caps[2].to_ascii_uppercase()),
        None => t.to_string(),
    }
}

fn is_truthy_flag(cell: &str) -> bool {
    let t = cell.trim();
    t.eq_ignore_ascii_case("true") || t.eq_ignore_ascii_case("yes")
}

/// Normalize one sheet row into an `Event`.
///
/// Returns `None` when the row has no usable date: the effective end date
/// (end column, else start column) must be present and parseable. This is a
/// filtering pre-condition, not an error; callers skip the row and continue.
pub fn normalize_row(row: &[String], columns: &ColumnMap) -> Option<Event> {
    let start_raw = cell(row, columns.start_date).trim();
    let end_raw = cell(row, columns.end_date).trim();
    let effective_end = if end_raw.is_empty() { start_raw } else { end_raw };
    if effective_end.is_empty() {
        return None;
    }
    parse_flexible_date(effective_end)?;

    let times = if is_truthy_flag(cell(row, columns.all_day)) {
        Some(TimesOfDay::all_day())
    } else {
        let slot = |idx: Option<usize>| {
            let v = cell(row, idx).trim();
            if v.is_empty() {
                None
            } else {
                Some(format_time(v))
            }
        };
        TimesOfDay::slots(
            slot(columns.morning),
            slot(columns.afternoon),
            slot(columns.evening),
        )
    };

    let contact_details = clean_cell(cell(row, columns.contact_details));
    let contact = if contact_details.is_empty() {
        None
    } else {
        let instructions = clean_cell(cell(row, columns.contact_instructions));
        Some(Contact {
            details: contact_details,
            instructions: if instructions.is_empty() {
                None
            } else {
                Some(instructions)
            },
        })
    };

    let opt = |idx: Option<usize>| {
        let v = clean_cell(cell(row, idx));
        if v.is_empty() {
            None
        } else {
            Some(v)
        }
    };

    let title = clean_cell(cell(row, columns.title));
    Some(Event {
        title: if title.is_empty() {
            UNTITLED_TITLE.to_string()
        } else {
            title
        },
        kind: EventKind::parse(cell(row, columns.kind)),
        media_ref: extract_media_ref(cell(row, columns.media_link)),
        description: clean_cell(cell(row, columns.description)),
        start_date: format_date(start_raw),
        end_date: format_date(effective_end),
        times_of_day: times,
        location: clean_cell(cell(row, columns.location)),
        notes: clean_cell(cell(row, columns.notes)),
        contact,
        action_label: opt(columns.button_text),
        action_link: opt(columns.button_link),
    })
}
