use chrono::{DateTime, NaiveDate, Utc};

use crate::models::interval::TimeInterval;

/// Either side of an event as the store reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTime {
    DateTime(DateTime<Utc>),
    /// All-day marker with no time component.
    Date(NaiveDate),
}

impl EventTime {
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            EventTime::DateTime(at) => Some(*at),
            EventTime::Date(_) => None,
        }
    }

    /// Date-only values anchor at midnight UTC.
    pub fn to_utc(&self) -> DateTime<Utc> {
        match self {
            EventTime::DateTime(at) => *at,
            EventTime::Date(date) => date.and_time(chrono::NaiveTime::MIN).and_utc(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
}

impl CalendarEvent {
    pub fn is_all_day(&self) -> bool {
        matches!(self.start, EventTime::Date(_))
    }

    pub fn has_title(&self, title: &str) -> bool {
        self.summary.as_deref() == Some(title)
    }
}

/// Placeholder event reserving visible free capacity. Start and end are
/// kept as reported, so a zero-length marker is still a keep event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeepEvent {
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl KeepEvent {
    /// `None` for anything that is not a timed event titled exactly `title`;
    /// a text query on the store also matches partial titles.
    pub fn from_event(event: &CalendarEvent, title: &str) -> Option<Self> {
        if !event.has_title(title) {
            return None;
        }
        let (Some(start), Some(end)) = (event.start.instant(), event.end.instant()) else {
            return None;
        };
        Some(Self {
            id: event.id.clone(),
            title: title.to_string(),
            start,
            end,
        })
    }
}

/// Payload for inserting a timed event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub summary: String,
    pub interval: TimeInterval,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn timed(id: &str, summary: &str, start_hour: u32, end_hour: u32) -> CalendarEvent {
        CalendarEvent {
            id: id.to_string(),
            summary: Some(summary.to_string()),
            start: EventTime::DateTime(Utc.with_ymd_and_hms(2026, 3, 2, start_hour, 0, 0).unwrap()),
            end: EventTime::DateTime(Utc.with_ymd_and_hms(2026, 3, 2, end_hour, 0, 0).unwrap()),
        }
    }

    #[test]
    fn keep_event_requires_exact_title() {
        let event = timed("e1", "⛔️ lunch", 9, 10);
        assert_eq!(KeepEvent::from_event(&event, "⛔️"), None);

        let event = timed("e2", "⛔️", 9, 10);
        let keep = KeepEvent::from_event(&event, "⛔️").unwrap();
        assert_eq!(keep.id, "e2");
        assert_eq!(keep.end, Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap());
    }

    #[test]
    fn zero_length_marker_is_still_a_keep_event() {
        let event = timed("e4", "⛔️", 9, 9);
        let keep = KeepEvent::from_event(&event, "⛔️").unwrap();
        assert_eq!(keep.start, keep.end);
    }

    #[test]
    fn all_day_events_are_not_keep_events() {
        let event = CalendarEvent {
            id: "e3".to_string(),
            summary: Some("⛔️".to_string()),
            start: EventTime::Date(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()),
            end: EventTime::Date(NaiveDate::from_ymd_opt(2026, 3, 3).unwrap()),
        };
        assert!(event.is_all_day());
        assert_eq!(KeepEvent::from_event(&event, "⛔️"), None);
    }

    #[test]
    fn date_only_time_anchors_at_midnight() {
        let time = EventTime::Date(NaiveDate::from_ymd_opt(2026, 3, 3).unwrap());
        assert_eq!(time.instant(), None);
        assert_eq!(time.to_utc(), Utc.with_ymd_and_hms(2026, 3, 3, 0, 0, 0).unwrap());
    }
}
