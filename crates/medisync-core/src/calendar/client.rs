//! Remote calendar operations: insert, update, delete.
//!
//! One [`EventRequest`] covers every time-of-day entry of a medicine; the
//! client maps each entry to its own remote event, updating in place where
//! an identifier is already stored and creating otherwise. Identifiers are
//! matched to time entries positionally.

use chrono::{Duration, NaiveDate};
use reqwest::Client;
use serde_json::json;

use crate::calendar::auth::{self, ServiceCredential};
use crate::calendar::recurrence::{build_rrule, parse_time_of_day};
use crate::config::SyncConfig;
use crate::error::{CalendarError, Result};
use crate::records::split_csv;

/// Time-of-day entries used when the record specifies none.
pub const DEFAULT_TIMES_PER_DAY: &[&str] = &["09:00"];

/// One create-or-update request for a medicine's reminder events.
#[derive(Debug, Clone)]
pub struct EventRequest {
    /// Event summary, e.g. "Take Medicine: Metformin".
    pub title: String,
    pub start_date: NaiveDate,
    /// Raw repetitiveness string; unrecognized values yield no recurrence.
    pub repetitiveness: String,
    /// Patient label for the event description.
    pub patient: Option<String>,
    /// Previously stored identifier CSV, matched positionally to the times.
    pub existing_ids: Option<String>,
    pub end_date: Option<NaiveDate>,
    /// Popup reminder lead time in minutes.
    pub reminder_minutes: u32,
    /// Pre-split time-of-day entries; empty means [`DEFAULT_TIMES_PER_DAY`].
    pub times_per_day: Vec<String>,
}

/// Client for the remote calendar API.
pub struct CalendarClient {
    http: Client,
    config: SyncConfig,
}

impl CalendarClient {
    /// Create a new client. No remote call happens until an operation runs.
    pub fn new(config: SyncConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Read the credential file and obtain a bearer token.
    async fn authorize(&self) -> Result<String> {
        self.config.validate()?;
        let credential = ServiceCredential::from_file(&self.config.credential_path)?;
        Ok(auth::access_token(&self.http, &credential).await?)
    }

    fn events_url(&self) -> String {
        format!(
            "{}/calendars/{}/events",
            self.config.api_base, self.config.calendar_id
        )
    }

    /// Create or update one event per time-of-day entry.
    ///
    /// Per-entry remote failures are logged and skipped; the loop always
    /// runs to completion. Returns the comma-joined identifiers that were
    /// obtained, `Ok(None)` when zero entries succeeded.
    ///
    /// # Errors
    ///
    /// Fails only when configuration or authentication fails -- that is
    /// terminal for the whole operation.
    pub async fn create_or_update_events(&self, request: &EventRequest) -> Result<Option<String>> {
        let token = self.authorize().await?;

        let times: Vec<String> = if request.times_per_day.is_empty() {
            DEFAULT_TIMES_PER_DAY.iter().map(|s| s.to_string()).collect()
        } else {
            request.times_per_day.clone()
        };

        let existing = request
            .existing_ids
            .as_deref()
            .map(split_csv)
            .unwrap_or_default();
        if existing.len() > times.len() {
            // Positional matching: the tail beyond the time entries is
            // never updated or deleted here and ends up orphaned remotely.
            log::warn!(
                "'{}': {} stored identifiers for {} time entries; extra events will be orphaned",
                request.title,
                existing.len(),
                times.len()
            );
        }

        let rrule = build_rrule(&request.repetitiveness, request.start_date, request.end_date);

        let mut synced_ids = Vec::new();
        for (idx, time_raw) in times.iter().enumerate() {
            let body = event_body(request, time_raw, rrule.as_deref(), &self.config.timezone);
            let result = match existing.get(idx) {
                Some(id) => self.update_event(&token, id, &body).await,
                None => self.insert_event(&token, &body).await,
            };
            match result {
                Ok(id) => synced_ids.push(id),
                Err(e) => log::warn!(
                    "Event sync failed for '{}' at {}: {}",
                    request.title,
                    time_raw,
                    e
                ),
            }
        }

        if synced_ids.is_empty() {
            Ok(None)
        } else {
            Ok(Some(synced_ids.join(",")))
        }
    }

    /// Delete every event named in the comma-separated identifier string.
    ///
    /// Each identifier is deleted independently; one failure does not block
    /// the rest. Returns `Ok(true)` when at least one deletion succeeded and
    /// `Ok(false)` when the input was empty (no remote call is made) or all
    /// deletions failed.
    ///
    /// # Errors
    ///
    /// Fails only when configuration or authentication fails.
    pub async fn delete_events(&self, event_ids: &str) -> Result<bool> {
        let ids = split_csv(event_ids);
        if ids.is_empty() {
            return Ok(false);
        }

        let token = self.authorize().await?;
        let mut deleted_any = false;
        for id in &ids {
            match self.delete_event(&token, id).await {
                Ok(()) => {
                    log::info!("Calendar event {id} deleted");
                    deleted_any = true;
                }
                Err(e) => log::warn!("Delete failed for {id}: {e}"),
            }
        }
        Ok(deleted_any)
    }

    async fn insert_event(
        &self,
        token: &str,
        body: &serde_json::Value,
    ) -> Result<String, CalendarError> {
        let response = self
            .http
            .post(self.events_url())
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        extract_event_id(response).await
    }

    async fn update_event(
        &self,
        token: &str,
        event_id: &str,
        body: &serde_json::Value,
    ) -> Result<String, CalendarError> {
        let response = self
            .http
            .put(format!("{}/{}", self.events_url(), event_id))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        extract_event_id(response).await
    }

    async fn delete_event(&self, token: &str, event_id: &str) -> Result<(), CalendarError> {
        let response = self
            .http
            .delete(format!("{}/{}", self.events_url(), event_id))
            .bearer_auth(token)
            .send()
            .await?;
        let status = response.status();
        // 404/410: the event is already gone, which is what deletion wants.
        if status.is_success() || status.as_u16() == 404 || status.as_u16() == 410 {
            Ok(())
        } else {
            Err(CalendarError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            })
        }
    }
}

/// Pull the event identifier out of a create/update response.
async fn extract_event_id(response: reqwest::Response) -> Result<String, CalendarError> {
    let status = response.status();
    let body: serde_json::Value = response.json().await?;

    if let Some(error) = body.get("error") {
        return Err(CalendarError::Api {
            status: status.as_u16(),
            message: error.to_string(),
        });
    }
    if !status.is_success() {
        return Err(CalendarError::Api {
            status: status.as_u16(),
            message: body.to_string(),
        });
    }

    if let Some(link) = body["htmlLink"].as_str() {
        log::info!("Calendar event synced: {link}");
    }

    body["id"]
        .as_str()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or(CalendarError::MissingEventId)
}

/// Build the event body for one time-of-day entry.
pub(crate) fn event_body(
    request: &EventRequest,
    time_raw: &str,
    rrule: Option<&str>,
    timezone: &str,
) -> serde_json::Value {
    let time = parse_time_of_day(time_raw);
    let start_dt = request.start_date.and_time(time);
    let end_dt = start_dt + Duration::hours(1);

    let mut body = json!({
        "summary": request.title,
        "description": format!(
            "Medicine reminder for patient {}",
            request.patient.as_deref().unwrap_or("")
        ),
        "start": {
            "dateTime": start_dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
            "timeZone": timezone,
        },
        "end": {
            "dateTime": end_dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
            "timeZone": timezone,
        },
        "reminders": {
            "useDefault": false,
            "overrides": [{"method": "popup", "minutes": request.reminder_minutes}],
        },
    });
    if let Some(rule) = rrule {
        body["recurrence"] = json!([rule]);
    }
    body
}
