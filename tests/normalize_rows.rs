// tests/normalize_rows.rs
//! End-to-end normalization of a realistic sheet row.

use church_events_service::event::{Contact, EventKind, MediaSource, TimesOfDay};
use church_events_service::normalize::{normalize_row, ColumnMap};

fn headers() -> Vec<String> {
    [
        "Event Title",
        "Event Type",
        "Media Link",
        "Description",
        "Start Date",
        "End Date",
        "All Day",
        "Morning Time",
        "Afternoon Time",
        "Evening Time",
        "Location",
        "Contact Details",
        "Contact Instructions",
        "Notes",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[test]
fn youth_retreat_row_normalizes_fully() {
    let columns = ColumnMap::resolve(&headers());
    let row: Vec<String> = [
        "Youth Retreat",
        "Image",
        "https://drive.example/file/d/ABC123/view",
        "Fun weekend",
        "2024-08-01",
        "2024-08-03",
        "yes",
        "",
        "",
        "",
        "Camp Hall",
        "555-0100",
        "Call ahead",
        "Bring boots",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    let ev = normalize_row(&row, &columns).expect("row has a valid date");

    assert_eq!(ev.title, "Youth Retreat");
    assert_eq!(ev.kind, EventKind::Image);
    assert_eq!(ev.media_ref.id.as_deref(), Some("ABC123"));
    assert_eq!(ev.media_ref.source, Some(MediaSource::Drive));
    assert_eq!(ev.description, "Fun weekend");
    assert_eq!(ev.start_date, "2024-08-01");
    assert_eq!(ev.end_date, "2024-08-03");
    assert_eq!(ev.times_of_day, Some(TimesOfDay::all_day()));
    assert_eq!(ev.location, "Camp Hall");
    assert_eq!(
        ev.contact,
        Some(Contact {
            details: "555-0100".to_string(),
            instructions: Some("Call ahead".to_string()),
        })
    );
    assert_eq!(ev.notes, "Bring boots");
    assert_eq!(ev.action_label, None);
    assert_eq!(ev.action_link, None);
}

#[test]
fn blank_title_defaults_and_media_is_always_present() {
    let columns = ColumnMap::resolve(&headers());
    let row: Vec<String> = ["", "", "", "", "2024-08-01", "", "", "", "", "", "", "", "", ""]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let ev = normalize_row(&row, &columns).unwrap();
    assert_eq!(ev.title, "Untitled Event");
    assert_eq!(ev.kind, EventKind::Pdf);
    assert_eq!(ev.media_ref.id, None);
    assert_eq!(ev.media_ref.source, None);
    assert_eq!(ev.times_of_day, None);
    assert_eq!(ev.contact, None);
}

#[test]
fn serialized_event_uses_wire_names() {
    let columns = ColumnMap::resolve(&headers());
    let row: Vec<String> = [
        "Camp", "video", "https://youtu.be/dQw4w9WgXcQ", "", "2024-08-01", "2024-08-02", "", "9am",
        "", "", "", "", "", "",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    let ev = normalize_row(&row, &columns).unwrap();
    let v = serde_json::to_value(&ev).unwrap();

    assert_eq!(v["kind"], "video");
    assert_eq!(v["mediaRef"]["id"], "dQw4w9WgXcQ");
    assert_eq!(v["mediaRef"]["source"], "youtube");
    assert_eq!(v["startDate"], "2024-08-01");
    assert_eq!(v["endDate"], "2024-08-02");
    assert_eq!(v["timesOfDay"]["morning"], "9:00 AM");
    assert_eq!(v["contact"], serde_json::Value::Null);
}
