use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

use crate::error::Result;
use crate::models::interval::TimeInterval;
use crate::service::busy_set::collect_busy_intervals;
use crate::service::calendar_store::CalendarStore;
use crate::service::slot_grid::{slot_starts, GridSpec};

/// Keeps the candidate starts whose full `duration_minutes` span is clear of
/// every busy interval. Output follows input order.
pub fn free_slots(
    starts: &[DateTime<Utc>],
    duration_minutes: u32,
    busy: &[TimeInterval],
) -> Result<Vec<TimeInterval>> {
    let mut free = Vec::new();
    for start in starts {
        let slot = TimeInterval::starting_at(*start, duration_minutes)?;
        if !slot.overlaps_any(busy) {
            free.push(slot);
        }
    }
    Ok(free)
}

/// Free slots across `calendars` for `date_from..=date_to`.
pub async fn find_available_slots<S: CalendarStore + ?Sized>(
    store: &S,
    calendars: &[String],
    date_from: NaiveDate,
    date_to: NaiveDate,
    grid: &GridSpec,
    duration_minutes: u32,
) -> Result<Vec<TimeInterval>> {
    let window_start = date_from.and_time(NaiveTime::MIN).and_utc();
    let window_end = date_to.and_time(NaiveTime::MIN).and_utc() + Duration::days(1);
    let busy = collect_busy_intervals(store, calendars, window_start, window_end).await?;
    let starts = slot_starts(date_from, date_to, grid);
    free_slots(&starts, duration_minutes, &busy)
}
