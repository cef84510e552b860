// src/project.rs
//! Event → render-ready card. Produces label strings and URLs only; the
//! embedding page owns all markup and styling.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::event::{Event, EventKind, MediaSource, TimesOfDay};
use crate::normalize::parse_flexible_date;

/// Flat, display-ready description of one event card.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderCard {
    pub title: String,
    pub date_range: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_line: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub action_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_href: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

pub fn project_card(event: &Event) -> RenderCard {
    let (action_label, action_href) = action_for(event);
    RenderCard {
        title: event.title.clone(),
        date_range: format_date_range(&event.start_date, &event.end_date),
        time_label: time_label(event.times_of_day.as_ref()),
        description: non_empty(&event.description),
        location: non_empty(&event.location),
        contact_line: contact_line(event),
        notes: non_empty(&event.notes),
        action_label,
        action_href,
        media_url: media_url(event),
        thumbnail_url: thumbnail_url(event),
    }
}

/// "August 1, 2024" for a single day; "August 1 - August 3, 2024" for a
/// range within one year; both dates in full otherwise. Unparseable dates
/// surface as the raw cell text.
fn format_date_range(start_raw: &str, end_raw: &str) -> String {
    let start = parse_flexible_date(start_raw);
    let end = parse_flexible_date(if end_raw.trim().is_empty() {
        start_raw
    } else {
        end_raw
    });
    match (start, end) {
        (Some(s), Some(e)) if s == e => long_date(s),
        (Some(s), Some(e)) if s.year() == e.year() => {
            format!("{} - {}", s.format("%B %-d"), long_date(e))
        }
        (Some(s), Some(e)) => format!("{} - {}", long_date(s), long_date(e)),
        _ => start_raw.trim().to_string(),
    }
}

fn long_date(d: NaiveDate) -> String {
    d.format("%B %-d, %Y").to_string()
}

/// "All Day", a lone slot's time, or a labelled slot list.
fn time_label(times: Option<&TimesOfDay>) -> Option<String> {
    match times? {
        TimesOfDay::AllDay { .. } => Some("All Day".to_string()),
        TimesOfDay::Slots {
            morning,
            afternoon,
            evening,
        } => {
            let labelled: Vec<(&str, &String)> = [
                ("Morning", morning),
                ("Afternoon", afternoon),
                ("Evening", evening),
            ]
            .into_iter()
            .filter_map(|(name, slot)| slot.as_ref().map(|t| (name, t)))
            .collect();
            match labelled.as_slice() {
                [] => None,
                [(_, only)] => Some((*only).clone()),
                many => Some(
                    many.iter()
                        .map(|(name, t)| format!("{name}: {t}"))
                        .collect::<Vec<_>>()
                        .join(", "),
                ),
            }
        }
    }
}

fn contact_line(event: &Event) -> Option<String> {
    let contact = event.contact.as_ref()?;
    Some(match &contact.instructions {
        Some(instructions) => format!("{} ({})", contact.details, instructions),
        None => contact.details.clone(),
    })
}

/// The URL the card's media (and default action) points at.
fn media_url(event: &Event) -> Option<String> {
    let id = event.media_ref.id.as_deref()?;
    let source = event.media_ref.source?;
    Some(match (event.kind, source) {
        (EventKind::Video, MediaSource::YouTube) => {
            format!("https://www.youtube.com/embed/{id}")
        }
        (EventKind::Video, MediaSource::Drive) => {
            format!("https://drive.google.com/file/d/{id}/preview")
        }
        (_, MediaSource::YouTube) => format!("https://www.youtube.com/watch?v={id}"),
        (_, MediaSource::Drive) => format!("https://drive.google.com/file/d/{id}/view"),
    })
}

fn thumbnail_url(event: &Event) -> Option<String> {
    let id = event.media_ref.id.as_deref()?;
    Some(match event.media_ref.source? {
        MediaSource::YouTube => format!("https://img.youtube.com/vi/{id}/hqdefault.jpg"),
        MediaSource::Drive => format!("https://drive.google.com/thumbnail?id={id}&sz=w1000"),
    })
}

/// Explicit sheet override wins; otherwise the label follows the media kind
/// and the link follows the media reference.
fn action_for(event: &Event) -> (String, Option<String>) {
    if let (Some(label), Some(link)) = (&event.action_label, &event.action_link) {
        return (label.clone(), Some(link.clone()));
    }
    let label = match event.kind {
        EventKind::Video => "Watch Video",
        EventKind::Image => "View Image",
        EventKind::Pdf => "View PDF",
        EventKind::Other => "View Details",
    };
    (label.to_string(), media_url(event))
}

fn non_empty(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}
