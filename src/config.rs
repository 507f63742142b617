use std::collections::HashMap;
use std::env;
use std::fs;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::service::slot_grid::GridSpec;

const DEFAULT_FROM_HOUR: u32 = 1;
const DEFAULT_TO_HOUR: u32 = 11;
const DEFAULT_DURATION_MINUTES: u32 = 30;
const DEFAULT_UNIT_MINUTES: u32 = 30;
const DEFAULT_MIN_SLOTS: usize = 10;
const DEFAULT_RECENT_WEEK_COUNT: usize = 8;
const DEFAULT_OVER_WEEK_COUNT: usize = 4;
const DEFAULT_KEEP_TITLE: &str = "⛔️";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// `KEY=value` pairs read from an env-style file.
#[derive(Debug, Default, Clone)]
pub struct AppConfig {
    values: HashMap<String, String>,
}

impl AppConfig {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_string(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut values = HashMap::new();
        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(ConfigError::Parse {
                    line: idx + 1,
                    content: line.to_string(),
                });
            };
            let key = key.trim();
            let mut value = value.trim().to_string();
            if value.len() >= 2
                && ((value.starts_with('"') && value.ends_with('"'))
                    || (value.starts_with('\'') && value.ends_with('\'')))
            {
                value = value[1..value.len() - 1].to_string();
            }
            values.insert(key.to_string(), value);
        }
        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    /// File value first, then the process environment.
    pub fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).or_else(|| env::var(key).ok())
    }
}

/// Everything the keep run needs, validated up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeeperConfig {
    /// Calendars whose events count as busy time.
    pub calendars: Vec<String>,
    /// Calendar that receives keep events.
    pub keep_calendar: String,
    pub keep_title: String,
    pub grid: GridSpec,
    pub duration_minutes: u32,
    /// Days with fewer free slots than this are left alone.
    pub min_slots: usize,
    pub recent_week_quota: usize,
    pub over_week_quota: usize,
}

impl KeeperConfig {
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let calendars: Vec<String> = get("CALENDARS")
            .unwrap_or_default()
            .split(',')
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect();
        if calendars.is_empty() {
            return Err(ConfigError::Missing("CALENDARS"));
        }
        let keep_calendar = non_empty(&get, "KEEP_EVENT_CALENDAR").ok_or(ConfigError::Missing("KEEP_EVENT_CALENDAR"))?;
        let keep_title = non_empty(&get, "KEEP_TITLE").unwrap_or_else(|| DEFAULT_KEEP_TITLE.to_string());

        let grid = GridSpec {
            from_hour: parse_or(&get, "FROM_HOUR", DEFAULT_FROM_HOUR)?,
            to_hour: parse_or(&get, "TO_HOUR", DEFAULT_TO_HOUR)?,
            unit_minutes: parse_or(&get, "UNIT_MINUTES", DEFAULT_UNIT_MINUTES)?,
        };
        if grid.to_hour > 24 {
            return Err(invalid("TO_HOUR", "must be at most 24"));
        }
        if grid.from_hour >= grid.to_hour {
            return Err(invalid("FROM_HOUR", "must be earlier than TO_HOUR"));
        }
        if grid.unit_minutes == 0 {
            return Err(invalid("UNIT_MINUTES", "must be positive"));
        }
        let duration_minutes = parse_or(&get, "DURATION_MINUTES", DEFAULT_DURATION_MINUTES)?;
        if duration_minutes == 0 {
            return Err(invalid("DURATION_MINUTES", "must be positive"));
        }

        Ok(Self {
            calendars,
            keep_calendar,
            keep_title,
            grid,
            duration_minutes,
            min_slots: parse_or(&get, "MIN_SLOTS", DEFAULT_MIN_SLOTS)?,
            recent_week_quota: parse_or(&get, "KEEP_RECENT_WEEK_COUNT", DEFAULT_RECENT_WEEK_COUNT)?,
            over_week_quota: parse_or(&get, "KEEP_OVER_WEEK_COUNT", DEFAULT_OVER_WEEK_COUNT)?,
        })
    }
}

/// Google OAuth settings. Which credential flow gets used is decided in `runtime`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleAuthConfig {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub token_uri: String,
}

impl GoogleAuthConfig {
    pub fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            access_token: non_empty(&get, "GOOGLE_ACCESS_TOKEN"),
            refresh_token: non_empty(&get, "GOOGLE_REFRESH_TOKEN"),
            client_id: non_empty(&get, "GOOGLE_CLIENT_ID"),
            client_secret: non_empty(&get, "GOOGLE_CLIENT_SECRET"),
            token_uri: non_empty(&get, "GOOGLE_TOKEN_URI").unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
        }
    }
}

fn non_empty<F>(get: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_or<F, T>(get: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty(get, key) {
        Some(raw) => raw.parse().map_err(|e: T::Err| invalid(key, e)),
        None => Ok(default),
    }
}

fn invalid(key: &'static str, reason: impl std::fmt::Display) -> ConfigError {
    ConfigError::Invalid {
        key,
        reason: reason.to_string(),
    }
}
