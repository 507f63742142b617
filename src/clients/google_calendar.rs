use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clients::credentials::CredentialProvider;
use crate::error::{KeeperError, Result};
use crate::models::event::{CalendarEvent, EventTime, NewEvent};
use crate::service::calendar_store::{CalendarStore, EventQuery};

pub const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3/";
const PAGE_SIZE: &str = "250";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireEventTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    date_time: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<NaiveDate>,
}

impl WireEventTime {
    fn into_event_time(self) -> Option<EventTime> {
        match (self.date_time, self.date) {
            (Some(at), _) => Some(EventTime::DateTime(at.with_timezone(&Utc))),
            (None, Some(date)) => Some(EventTime::Date(date)),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireEvent {
    id: String,
    summary: Option<String>,
    #[serde(default)]
    start: WireEventTime,
    #[serde(default)]
    end: WireEventTime,
}

impl WireEvent {
    fn into_event(self) -> Option<CalendarEvent> {
        let start = self.start.into_event_time();
        let end = self.end.into_event_time();
        match (start, end) {
            (Some(start), Some(end)) => Some(CalendarEvent {
                id: self.id,
                summary: self.summary,
                start,
                end,
            }),
            _ => {
                warn!(id = %self.id, "skipping event without start or end");
                None
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventsPage {
    #[serde(default)]
    items: Vec<WireEvent>,
    next_page_token: Option<String>,
}

#[derive(Debug, Serialize)]
struct InsertRequest<'a> {
    summary: &'a str,
    start: WireEventTime,
    end: WireEventTime,
}

impl<'a> InsertRequest<'a> {
    fn from_event(event: &'a NewEvent) -> Self {
        Self {
            summary: &event.summary,
            start: WireEventTime {
                date_time: Some(event.interval.start().fixed_offset()),
                date: None,
            },
            end: WireEventTime {
                date_time: Some(event.interval.end().fixed_offset()),
                date: None,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct InsertResponse {
    id: String,
}

/// Google Calendar v3 events API.
pub struct GoogleCalendarClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Arc<dyn CredentialProvider>,
}

impl GoogleCalendarClient {
    pub fn new(http: reqwest::Client, credentials: Arc<dyn CredentialProvider>) -> Result<Self> {
        Self::with_base_url(http, credentials, CALENDAR_API_BASE)
    }

    pub fn with_base_url(
        http: reqwest::Client,
        credentials: Arc<dyn CredentialProvider>,
        base_url: &str,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| KeeperError::remote("configure client", format!("invalid base url {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(KeeperError::remote("configure client", format!("{} cannot be a base url", base_url)));
        }
        Ok(Self {
            http,
            base_url,
            credentials,
        })
    }

    fn events_url(&self, calendar_id: &str, event_id: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `with_base_url`.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["calendars", calendar_id, "events"]);
            if let Some(event_id) = event_id {
                segments.push(event_id);
            }
        }
        url
    }

    async fn send(&self, operation: &'static str, request: reqwest::RequestBuilder) -> Result<String> {
        let token = self.credentials.access_token().await?;
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| KeeperError::remote(operation, e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| KeeperError::remote(operation, e))?;
        if !status.is_success() {
            return Err(KeeperError::remote(
                operation,
                format!("request failed with status {}: {}", status, text),
            ));
        }
        Ok(text)
    }
}

fn rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn list_params(query: &EventQuery, page_token: Option<&str>) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("singleEvents", "true".to_string()),
        ("orderBy", "startTime".to_string()),
        ("maxResults", PAGE_SIZE.to_string()),
    ];
    if let Some(text) = &query.text {
        params.push(("q", text.clone()));
    }
    if let Some(time_min) = query.time_min {
        params.push(("timeMin", rfc3339(time_min)));
    }
    if let Some(time_max) = query.time_max {
        params.push(("timeMax", rfc3339(time_max)));
    }
    if let Some(token) = page_token {
        params.push(("pageToken", token.to_string()));
    }
    params
}

fn parse_page(body: &str) -> Result<EventsPage> {
    serde_json::from_str(body).map_err(|e| KeeperError::remote("list events", format!("failed to parse JSON: {}", e)))
}

#[async_trait]
impl CalendarStore for GoogleCalendarClient {
    async fn list_events(&self, calendar_id: &str, query: &EventQuery) -> Result<Vec<CalendarEvent>> {
        let url = self.events_url(calendar_id, None);
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let params = list_params(query, page_token.as_deref());
            let body = self.send("list events", self.http.get(url.clone()).query(&params)).await?;
            let page = parse_page(&body)?;
            debug!(calendar = %calendar_id, items = page.items.len(), "listed event page");
            events.extend(page.items.into_iter().filter_map(WireEvent::into_event));
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        Ok(events)
    }

    async fn insert_event(&self, calendar_id: &str, event: &NewEvent) -> Result<String> {
        let body = InsertRequest::from_event(event);
        let url = self.events_url(calendar_id, None);
        let text = self.send("insert event", self.http.post(url).json(&body)).await?;
        let created: InsertResponse = serde_json::from_str(&text)
            .map_err(|e| KeeperError::remote("insert event", format!("failed to parse JSON: {}", e)))?;
        Ok(created.id)
    }

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<()> {
        let url = self.events_url(calendar_id, Some(event_id));
        self.send("delete event", self.http.delete(url)).await?;
        Ok(())
    }
}
