use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use rand::Rng;
use tracing::{debug, info};

use crate::config::KeeperConfig;
use crate::error::Result;
use crate::models::event::{KeepEvent, NewEvent};
use crate::models::interval::TimeInterval;
use crate::service::availability::find_available_slots;
use crate::service::calendar_store::{CalendarStore, EventQuery};
use crate::service::selector::select_slots;

/// Days ahead of today that get keep events.
pub const HORIZON_DAYS: u32 = 14;
/// Offsets `1..=RECENT_DAYS` use the recent-week quota.
pub const RECENT_DAYS: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaBucket {
    RecentWeek,
    OverWeek,
}

impl QuotaBucket {
    pub fn for_offset(offset: u32) -> Self {
        if offset <= RECENT_DAYS {
            QuotaBucket::RecentWeek
        } else {
            QuotaBucket::OverWeek
        }
    }

    pub fn quota(self, config: &KeeperConfig) -> usize {
        match self {
            QuotaBucket::RecentWeek => config.recent_week_quota,
            QuotaBucket::OverWeek => config.over_week_quota,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub bucket: QuotaBucket,
    pub existing: usize,
    pub quota: usize,
}

impl DayBucket {
    pub fn deficit(&self) -> usize {
        self.quota.saturating_sub(self.existing)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayOutcome {
    /// Too few free slots to advertise any of them.
    Skipped { free_slots: usize },
    /// Quota already met.
    Satisfied { existing: usize },
    Filled { existing: usize, inserted: Vec<TimeInterval> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayReport {
    pub date: NaiveDate,
    pub outcome: DayOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeepReport {
    pub purged: usize,
    pub days: Vec<DayReport>,
}

impl KeepReport {
    /// Whether the purge step deleted anything.
    pub fn updated(&self) -> bool {
        self.purged > 0
    }

    pub fn inserted(&self) -> usize {
        self.days
            .iter()
            .map(|day| match &day.outcome {
                DayOutcome::Filled { inserted, .. } => inserted.len(),
                _ => 0,
            })
            .sum()
    }
}

/// Maintains keep events on the keep calendar. Holds no state between runs;
/// every decision is re-derived from the store.
pub struct KeepService<'a, S: CalendarStore + ?Sized> {
    store: &'a S,
    config: &'a KeeperConfig,
}

impl<'a, S: CalendarStore + ?Sized> KeepService<'a, S> {
    pub fn new(store: &'a S, config: &'a KeeperConfig) -> Self {
        Self { store, config }
    }

    /// Purge, then fill the next `HORIZON_DAYS` days. Any store failure
    /// stops the run; whatever was already written stays written.
    pub async fn run<R: Rng + ?Sized>(&self, now: DateTime<Utc>, rng: &mut R) -> Result<KeepReport> {
        let purged = self.purge_past_keep_events(now).await?;
        let days = self.fill_horizon(now.date_naive(), rng).await?;
        let report = KeepReport { purged, days };
        info!(
            purged = report.purged,
            updated = report.updated(),
            inserted = report.inserted(),
            "keep run finished"
        );
        Ok(report)
    }

    /// Deletes keep events that ended strictly before `now`.
    pub async fn purge_past_keep_events(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut deleted = 0;
        for keep in self.keep_events(&EventQuery::titled(&self.config.keep_title)).await? {
            if keep.end < now {
                self.store.delete_event(&self.config.keep_calendar, &keep.id).await?;
                info!(id = %keep.id, end = %keep.end, "deleted past keep event");
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    /// Deletes every keep event regardless of when it happens.
    pub async fn remove_all_keep_events(&self) -> Result<usize> {
        let keeps = self.keep_events(&EventQuery::titled(&self.config.keep_title)).await?;
        for keep in &keeps {
            self.store.delete_event(&self.config.keep_calendar, &keep.id).await?;
            info!(id = %keep.id, start = %keep.start, "deleted keep event");
        }
        Ok(keeps.len())
    }

    /// Processes offsets `1..=HORIZON_DAYS` after `today` in order.
    pub async fn fill_horizon<R: Rng + ?Sized>(&self, today: NaiveDate, rng: &mut R) -> Result<Vec<DayReport>> {
        let mut days = Vec::with_capacity(HORIZON_DAYS as usize);
        for offset in 1..=HORIZON_DAYS {
            let date = today + Duration::days(i64::from(offset));
            let outcome = self.fill_day(date, QuotaBucket::for_offset(offset), rng).await?;
            days.push(DayReport { date, outcome });
        }
        Ok(days)
    }

    pub async fn fill_day<R: Rng + ?Sized>(
        &self,
        date: NaiveDate,
        bucket: QuotaBucket,
        rng: &mut R,
    ) -> Result<DayOutcome> {
        let config = self.config;
        let free = find_available_slots(
            self.store,
            &config.calendars,
            date,
            date,
            &config.grid,
            config.duration_minutes,
        )
        .await?;
        if free.len() < config.min_slots {
            debug!(%date, free_slots = free.len(), min_slots = config.min_slots, "skipping day");
            return Ok(DayOutcome::Skipped { free_slots: free.len() });
        }

        let day_start = date.and_time(NaiveTime::MIN).and_utc();
        let query = EventQuery::window(day_start, day_start + Duration::days(1)).with_text(&config.keep_title);
        let existing = self.keep_events(&query).await?.len();
        let day = DayBucket {
            date,
            bucket,
            existing,
            quota: bucket.quota(config),
        };
        let deficit = day.deficit();
        if deficit == 0 {
            debug!(%date, existing, quota = day.quota, "quota met");
            return Ok(DayOutcome::Satisfied { existing });
        }

        let chosen = select_slots(&free, deficit, rng);
        for slot in &chosen {
            let event = NewEvent {
                summary: config.keep_title.clone(),
                interval: *slot,
            };
            let id = self.store.insert_event(&config.keep_calendar, &event).await?;
            info!(%id, start = %slot.start(), end = %slot.end(), "inserted keep event");
        }
        info!(%date, existing, deficit, inserted = chosen.len(), "filled day");
        Ok(DayOutcome::Filled {
            existing,
            inserted: chosen,
        })
    }

    async fn keep_events(&self, query: &EventQuery) -> Result<Vec<KeepEvent>> {
        let events = self.store.list_events(&self.config.keep_calendar, query).await?;
        Ok(events
            .iter()
            .filter_map(|event| KeepEvent::from_event(event, &self.config.keep_title))
            .collect())
    }
}
