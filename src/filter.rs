// src/filter.rs
//! Date filtering and display ordering for normalized events.

use chrono::NaiveDate;

use crate::event::Event;
use crate::normalize::parse_flexible_date;

/// Events whose effective end date (end date, else start date) is on or
/// after `today`. The comparison is on calendar dates, so an event ending
/// today is still included. Events whose dates no longer parse are dropped
/// defensively; the normalizer should already have skipped them.
pub fn filter_upcoming(events: &[Event], today: NaiveDate) -> Vec<Event> {
    events
        .iter()
        .filter(|ev| matches!(effective_end(ev), Some(end) if end >= today))
        .cloned()
        .collect()
}

fn effective_end(ev: &Event) -> Option<NaiveDate> {
    let raw = if ev.end_date.trim().is_empty() {
        &ev.start_date
    } else {
        &ev.end_date
    };
    parse_flexible_date(raw)
}

/// Ascending by start date. The sort is stable, so same-day events keep
/// their source order; events with an unparseable start fall back to their
/// end date, and fully undated ones sort last.
pub fn sort_for_display(events: &mut [Event]) {
    events.sort_by_key(|ev| {
        parse_flexible_date(&ev.start_date)
            .or_else(|| parse_flexible_date(&ev.end_date))
            .unwrap_or(NaiveDate::MAX)
    });
}
