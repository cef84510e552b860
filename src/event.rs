// src/event.rs
//! The normalized event model shared by the ingest pipeline, the cache, and
//! the card projector. Wire names are camelCase to match the payloads the
//! site's pages already consume.

use serde::{Deserialize, Serialize};

/// One displayable calendar/promo entry derived from a single source row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub title: String,
    pub kind: EventKind,
    /// Always present; "no media" is `{id: null, source: null}`.
    #[serde(default)]
    pub media_ref: MediaRef,
    #[serde(default)]
    pub description: String,
    /// ISO `YYYY-MM-DD` when the source cell parsed, raw text otherwise.
    pub start_date: String,
    /// Defaults to `start_date` when the source column is blank; readers
    /// treat an empty value as "same day as the start".
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub times_of_day: Option<TimesOfDay>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub contact: Option<Contact>,
    /// Optional call-to-action override for the card button.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_link: Option<String>,
}

/// What the event's media attachment is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Video,
    Image,
    Pdf,
    Other,
}

impl EventKind {
    /// Lenient parse: blank defaults to `Pdf` (the sheet's historical
    /// convention), anything unrecognized becomes `Other`.
    pub fn parse(cell: &str) -> Self {
        match cell.trim().to_ascii_lowercase().as_str() {
            "" | "pdf" => EventKind::Pdf,
            "video" => EventKind::Video,
            "image" => EventKind::Image,
            _ => EventKind::Other,
        }
    }
}

// Manifests occasionally carry kinds this crate does not know; deserialize
// through the same lenient parse the normalizer uses.
impl<'de> Deserialize<'de> for EventKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(EventKind::parse(&s))
    }
}

/// Where a media id resolves (see `media::extract_media_ref`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaSource {
    #[serde(rename = "youtube")]
    YouTube,
    Drive,
}

/// (source kind, opaque id) pair for an event's image/video/document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    pub id: Option<String>,
    pub source: Option<MediaSource>,
}

/// Time-of-day info for an event. The enum makes the all-day flag and the
/// named slots mutually exclusive by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimesOfDay {
    AllDay {
        #[serde(rename = "allDay")]
        all_day: bool,
    },
    Slots {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        morning: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        afternoon: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        evening: Option<String>,
    },
}

impl TimesOfDay {
    pub fn all_day() -> Self {
        TimesOfDay::AllDay { all_day: true }
    }

    /// `None` when no slot is set, so callers can store `times_of_day: None`
    /// instead of an empty slots object.
    pub fn slots(
        morning: Option<String>,
        afternoon: Option<String>,
        evening: Option<String>,
    ) -> Option<Self> {
        if morning.is_none() && afternoon.is_none() && evening.is_none() {
            None
        } else {
            Some(TimesOfDay::Slots {
                morning,
                afternoon,
                evening,
            })
        }
    }

    pub fn is_all_day(&self) -> bool {
        matches!(self, TimesOfDay::AllDay { .. })
    }
}

/// Contact info attached to an event; built only when the details cell is
/// non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parse_is_lenient() {
        assert_eq!(EventKind::parse("Video"), EventKind::Video);
        assert_eq!(EventKind::parse(" image "), EventKind::Image);
        assert_eq!(EventKind::parse(""), EventKind::Pdf);
        assert_eq!(EventKind::parse("banner"), EventKind::Other);
    }

    #[test]
    fn times_of_day_serializes_as_flag_or_slots() {
        let all_day = serde_json::to_value(TimesOfDay::all_day()).unwrap();
        assert_eq!(all_day, serde_json::json!({"allDay": true}));

        let slots =
            TimesOfDay::slots(Some("9:00 AM".into()), None, Some("6:00 PM".into())).unwrap();
        let v = serde_json::to_value(&slots).unwrap();
        assert_eq!(
            v,
            serde_json::json!({"morning": "9:00 AM", "evening": "6:00 PM"})
        );
    }

    #[test]
    fn empty_slots_collapse_to_none() {
        assert_eq!(TimesOfDay::slots(None, None, None), None);
    }

    #[test]
    fn times_of_day_round_trips() {
        let parsed: TimesOfDay = serde_json::from_str(r#"{"allDay": true}"#).unwrap();
        assert!(parsed.is_all_day());

        let parsed: TimesOfDay = serde_json::from_str(r#"{"afternoon": "2:00 PM"}"#).unwrap();
        assert!(!parsed.is_all_day());
    }
}
