use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::Result;
use crate::models::event::CalendarEvent;
use crate::models::interval::TimeInterval;
use crate::service::calendar_store::{CalendarStore, EventQuery};

/// Pools the timed events of every calendar in the window into busy intervals.
/// Selects events overlapping the window (the provider's semantics), a
/// superset of those starting inside it. A failure on any one calendar fails
/// the whole call.
pub async fn collect_busy_intervals<S: CalendarStore + ?Sized>(
    store: &S,
    calendars: &[String],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Result<Vec<TimeInterval>> {
    let query = EventQuery::window(window_start, window_end);
    let mut busy = Vec::new();
    for calendar_id in calendars {
        let events = store.list_events(calendar_id, &query).await?;
        debug!(calendar = %calendar_id, count = events.len(), "fetched events");
        for event in &events {
            if let Some(interval) = busy_interval(event)? {
                busy.push(interval);
            }
        }
    }
    Ok(busy)
}

/// All-day events block nothing. A timed event with a date-only end falls
/// back to midnight of that date.
pub fn busy_interval(event: &CalendarEvent) -> Result<Option<TimeInterval>> {
    if event.is_all_day() {
        return Ok(None);
    }
    let start = event.start.to_utc();
    let end = event.end.to_utc();
    // Zero-length events can never overlap anything.
    if start == end {
        return Ok(None);
    }
    TimeInterval::new(start, end).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KeeperError;
    use crate::models::event::{EventTime, NewEvent};
    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone};
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FixedStore {
        events: HashMap<String, Vec<CalendarEvent>>,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CalendarStore for FixedStore {
        async fn list_events(&self, calendar_id: &str, _query: &EventQuery) -> Result<Vec<CalendarEvent>> {
            self.calls.lock().unwrap().push(calendar_id.to_string());
            self.events
                .get(calendar_id)
                .cloned()
                .ok_or_else(|| KeeperError::remote("list events", "calendar not found"))
        }

        async fn insert_event(&self, _calendar_id: &str, _event: &NewEvent) -> Result<String> {
            unreachable!("aggregation never inserts")
        }

        async fn delete_event(&self, _calendar_id: &str, _event_id: &str) -> Result<()> {
            unreachable!("aggregation never deletes")
        }
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, hour, 0, 0).unwrap()
    }

    fn timed(id: &str, start: u32, end: u32) -> CalendarEvent {
        CalendarEvent {
            id: id.to_string(),
            summary: Some("busy".to_string()),
            start: EventTime::DateTime(at(start)),
            end: EventTime::DateTime(at(end)),
        }
    }

    fn all_day(id: &str) -> CalendarEvent {
        CalendarEvent {
            id: id.to_string(),
            summary: Some("holiday".to_string()),
            start: EventTime::Date(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()),
            end: EventTime::Date(NaiveDate::from_ymd_opt(2026, 3, 3).unwrap()),
        }
    }

    #[tokio::test]
    async fn pools_timed_events_and_drops_all_day() {
        let store = FixedStore {
            events: HashMap::from([
                ("work".to_string(), vec![timed("a", 9, 10), all_day("b")]),
                ("home".to_string(), vec![timed("c", 9, 10), timed("d", 4, 5)]),
            ]),
            calls: Mutex::new(Vec::new()),
        };
        let calendars = vec!["work".to_string(), "home".to_string()];

        let busy = collect_busy_intervals(&store, &calendars, at(0), at(23)).await.unwrap();

        assert_eq!(busy.len(), 3);
        assert_eq!(busy.iter().filter(|b| b.start() == at(9)).count(), 2);
        assert_eq!(*store.calls.lock().unwrap(), calendars);
    }

    #[tokio::test]
    async fn one_failing_calendar_aborts_aggregation() {
        let store = FixedStore {
            events: HashMap::from([("work".to_string(), vec![timed("a", 9, 10)])]),
            calls: Mutex::new(Vec::new()),
        };
        let calendars = vec!["work".to_string(), "missing".to_string()];

        let result = collect_busy_intervals(&store, &calendars, at(0), at(23)).await;

        assert!(matches!(result, Err(KeeperError::RemoteStore { .. })));
    }

    #[test]
    fn timed_start_with_date_end_uses_midnight() {
        let event = CalendarEvent {
            id: "x".to_string(),
            summary: None,
            start: EventTime::DateTime(at(22)),
            end: EventTime::Date(NaiveDate::from_ymd_opt(2026, 3, 3).unwrap()),
        };
        let interval = busy_interval(&event).unwrap().unwrap();
        assert_eq!(interval.end(), Utc.with_ymd_and_hms(2026, 3, 3, 0, 0, 0).unwrap());
    }

    #[test]
    fn zero_length_events_are_ignored_and_reversed_ones_rejected() {
        assert_eq!(busy_interval(&timed("z", 9, 9)).unwrap(), None);
        assert!(matches!(
            busy_interval(&timed("r", 10, 9)),
            Err(KeeperError::InvalidInterval { .. })
        ));
    }
}
