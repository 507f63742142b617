use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};

/// Working-hour bounds and grid step for candidate generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSpec {
    /// UTC hour the first slot may start at.
    pub from_hour: u32,
    /// UTC hour every grid unit must end by.
    pub to_hour: u32,
    pub unit_minutes: u32,
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Candidate slot starts for every weekday in `date_from..=date_to`.
///
/// Starts run from `from_hour:00` in `unit_minutes` steps while the unit
/// still ends by `to_hour:00`. A window narrower than one unit yields nothing.
pub fn slot_starts(date_from: NaiveDate, date_to: NaiveDate, grid: &GridSpec) -> Vec<DateTime<Utc>> {
    let mut starts = Vec::new();
    if grid.unit_minutes == 0 {
        return starts;
    }
    let unit = Duration::minutes(i64::from(grid.unit_minutes));

    for date in date_from.iter_days().take_while(|date| *date <= date_to) {
        if is_weekend(date) {
            continue;
        }
        let midnight = date.and_time(NaiveTime::MIN).and_utc();
        let last_start = midnight + Duration::hours(i64::from(grid.to_hour)) - unit;
        let mut current = midnight + Duration::hours(i64::from(grid.from_hour));
        while current <= last_start {
            starts.push(current);
            current += unit;
        }
    }
    starts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    const WORKDAY: GridSpec = GridSpec {
        from_hour: 1,
        to_hour: 11,
        unit_minutes: 30,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn weekday_gets_half_hour_grid_inside_bounds() {
        // 2026-03-02 is a Monday.
        let starts = slot_starts(date(2026, 3, 2), date(2026, 3, 2), &WORKDAY);

        assert_eq!(starts.len(), 20);
        assert_eq!(starts[0], Utc.with_ymd_and_hms(2026, 3, 2, 1, 0, 0).unwrap());
        assert_eq!(starts[19], Utc.with_ymd_and_hms(2026, 3, 2, 10, 30, 0).unwrap());
        assert!(starts.windows(2).all(|pair| pair[1] - pair[0] == Duration::minutes(30)));
    }

    #[test]
    fn weekend_days_produce_nothing() {
        assert!(slot_starts(date(2026, 3, 7), date(2026, 3, 8), &WORKDAY).is_empty());
    }

    #[test]
    fn multi_week_range_skips_every_weekend() {
        let starts = slot_starts(date(2026, 3, 1), date(2026, 3, 21), &WORKDAY);

        assert_eq!(starts.len(), 15 * 20);
        assert!(starts.iter().all(|start| !is_weekend(start.date_naive())));
        assert!(starts.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn generation_is_repeatable() {
        let first = slot_starts(date(2026, 3, 2), date(2026, 3, 13), &WORKDAY);
        let second = slot_starts(date(2026, 3, 2), date(2026, 3, 13), &WORKDAY);
        assert_eq!(first, second);
    }

    #[test]
    fn window_smaller_than_unit_is_empty() {
        let grid = GridSpec {
            from_hour: 9,
            to_hour: 10,
            unit_minutes: 90,
        };
        assert!(slot_starts(date(2026, 3, 2), date(2026, 3, 2), &grid).is_empty());
    }

    #[test]
    fn uneven_unit_stops_before_bound() {
        let grid = GridSpec {
            from_hour: 9,
            to_hour: 10,
            unit_minutes: 25,
        };
        let starts = slot_starts(date(2026, 3, 2), date(2026, 3, 2), &grid);
        let minutes: Vec<u32> = starts.iter().map(|s| s.hour() * 60 + s.minute()).collect();
        assert_eq!(minutes, vec![540, 565]);
    }

    #[test]
    fn reversed_range_is_empty() {
        assert!(slot_starts(date(2026, 3, 3), date(2026, 3, 2), &WORKDAY).is_empty());
    }
}
