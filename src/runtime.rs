use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use crate::clients::credentials::{CredentialProvider, RefreshTokenCredentials, StaticToken};
use crate::clients::google_calendar::GoogleCalendarClient;
use crate::config::{GoogleAuthConfig, KeeperConfig};
use crate::error::{ConfigError, Result};
use crate::models::interval::TimeInterval;
use crate::service::availability::find_available_slots;
use crate::service::calendar_store::CalendarStore;
use crate::service::keep_service::{KeepReport, KeepService};

/// Refresh-token flow when its three settings are present, otherwise a
/// pre-issued access token.
pub fn credentials_from(
    auth: &GoogleAuthConfig,
    http: reqwest::Client,
) -> Result<Arc<dyn CredentialProvider>, ConfigError> {
    if let (Some(refresh_token), Some(client_id), Some(client_secret)) =
        (&auth.refresh_token, &auth.client_id, &auth.client_secret)
    {
        return Ok(Arc::new(RefreshTokenCredentials::new(
            http,
            auth.token_uri.clone(),
            client_id.clone(),
            client_secret.clone(),
            refresh_token.clone(),
        )));
    }
    match &auth.access_token {
        Some(token) => Ok(Arc::new(StaticToken::new(token.clone()))),
        None => Err(ConfigError::Missing(
            "GOOGLE_ACCESS_TOKEN or GOOGLE_REFRESH_TOKEN with GOOGLE_CLIENT_ID and GOOGLE_CLIENT_SECRET",
        )),
    }
}

pub fn google_store(auth: &GoogleAuthConfig) -> Result<GoogleCalendarClient> {
    let http = reqwest::Client::new();
    let credentials = credentials_from(auth, http.clone())?;
    GoogleCalendarClient::new(http, credentials)
}

pub async fn run_keep<S: CalendarStore + ?Sized>(store: &S, config: &KeeperConfig) -> Result<KeepReport> {
    let mut rng = StdRng::from_entropy();
    KeepService::new(store, config).run(Utc::now(), &mut rng).await
}

pub async fn run_remove_all<S: CalendarStore + ?Sized>(store: &S, config: &KeeperConfig) -> Result<usize> {
    let deleted = KeepService::new(store, config).remove_all_keep_events().await?;
    info!(deleted, calendar = %config.keep_calendar, "removed all keep events");
    Ok(deleted)
}

pub async fn run_slots<S: CalendarStore + ?Sized>(
    store: &S,
    config: &KeeperConfig,
    date_from: NaiveDate,
    date_to: NaiveDate,
) -> Result<Vec<TimeInterval>> {
    find_available_slots(
        store,
        &config.calendars,
        date_from,
        date_to,
        &config.grid,
        config.duration_minutes,
    )
    .await
}
