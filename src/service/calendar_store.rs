use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::event::{CalendarEvent, NewEvent};

/// Filters for a list call. `None` bounds mean unbounded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventQuery {
    pub text: Option<String>,
    pub time_min: Option<DateTime<Utc>>,
    pub time_max: Option<DateTime<Utc>>,
}

impl EventQuery {
    pub fn window(time_min: DateTime<Utc>, time_max: DateTime<Utc>) -> Self {
        Self {
            text: None,
            time_min: Some(time_min),
            time_max: Some(time_max),
        }
    }

    pub fn titled(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Self::default()
        }
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }
}

/// Remote system of record for events. Window bounds select events that
/// overlap `[time_min, time_max)`.
#[async_trait]
pub trait CalendarStore: Send + Sync {
    async fn list_events(&self, calendar_id: &str, query: &EventQuery) -> Result<Vec<CalendarEvent>>;
    async fn insert_event(&self, calendar_id: &str, event: &NewEvent) -> Result<String>;
    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<()>;
}
