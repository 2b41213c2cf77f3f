use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Rate limit exceeded")]
    RateLimited,
    #[error("Authentication failed")]
    AuthenticationFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventWindow {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    pub window: EventWindow,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    pub summary: String,
    pub description: String,
    pub start: EventDateTime,
    pub end: EventDateTime,
    pub color_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    pub date_time: String,
    pub time_zone: String,
}

impl EventDateTime {
    pub fn new(date_time: DateTime<FixedOffset>, time_zone: &str) -> Self {
        Self {
            date_time: date_time.to_rfc3339(),
            time_zone: time_zone.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEvent {
    pub id: String,
    pub summary: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleEvent {
    id: Option<String>,
    summary: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventListResponse {
    items: Option<Vec<GoogleEvent>>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CalendarApi {
    async fn list_events(
        &self,
        calendar_id: &str,
        query: &EventQuery,
    ) -> Result<Vec<RemoteEvent>, ApiError>;

    async fn insert_event(
        &self,
        calendar_id: &str,
        event: &EventPayload,
    ) -> Result<RemoteEvent, ApiError>;

    async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        event: &EventPayload,
    ) -> Result<(), ApiError>;
}

pub struct GoogleCalendarClient {
    base_url: String,
    access_token: String,
    client: reqwest::Client,
}

impl GoogleCalendarClient {
    pub fn new(access_token: String) -> Self {
        Self {
            base_url: "https://www.googleapis.com/calendar/v3".to_string(),
            access_token,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn events_url(&self, calendar_id: &str) -> String {
        format!("{}/calendars/{}/events", self.base_url, urlencoding::encode(calendar_id))
    }

    async fn check_status(response: reqwest::Response, subject: &str) -> Result<reqwest::Response, ApiError> {
        let status = response.status();

        if status == 401 {
            tracing::error!("Authentication failed for {}", subject);
            return Err(ApiError::AuthenticationFailed);
        }

        if status == 404 {
            tracing::error!("Not found: {}", subject);
            return Err(ApiError::NotFound(subject.to_string()));
        }

        if status == 429 {
            tracing::warn!("Rate limit exceeded");
            return Err(ApiError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await?;
            tracing::error!("Request for {} failed. Status: {}, Body: {}", subject, status, body);
            return Err(ApiError::RequestError(format!("Status {}: {}", status, body)));
        }

        Ok(response)
    }
}

#[async_trait]
impl CalendarApi for GoogleCalendarClient {
    async fn list_events(
        &self,
        calendar_id: &str,
        query: &EventQuery,
    ) -> Result<Vec<RemoteEvent>, ApiError> {
        let url = self.events_url(calendar_id);
        let time_min = query.window.start.to_rfc3339();
        let time_max = query.window.end.to_rfc3339();

        tracing::info!("Searching events matching {:?} from {} to {}", query.text, time_min, time_max);

        let response = self.client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[
                ("timeMin", time_min.as_str()),
                ("timeMax", time_max.as_str()),
                ("q", query.text.as_str()),
                ("singleEvents", "true"),
            ])
            .send()
            .await?;

        tracing::info!("List events response status: {}", response.status());
        let response = Self::check_status(response, calendar_id).await?;

        let event_list: EventListResponse = response.json().await?;

        let events: Vec<RemoteEvent> = event_list.items
            .unwrap_or_default()
            .into_iter()
            .filter_map(|ge| {
                ge.id.map(|id| RemoteEvent {
                    id,
                    summary: ge.summary,
                })
            })
            .collect();

        tracing::info!("Found {} matching events", events.len());
        Ok(events)
    }

    async fn insert_event(
        &self,
        calendar_id: &str,
        event: &EventPayload,
    ) -> Result<RemoteEvent, ApiError> {
        let url = self.events_url(calendar_id);

        tracing::info!("Creating event: {} on {}", event.summary, event.start.date_time);
        tracing::debug!("POST {} with payload: {:?}", url, event);

        let response = self.client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(event)
            .send()
            .await?;

        tracing::info!("Create event response status: {}", response.status());
        let response = Self::check_status(response, calendar_id).await?;

        let created: GoogleEvent = response.json().await?;
        let id = created.id.unwrap_or_default();
        tracing::info!("Event created successfully with ID: {:?}", id);

        Ok(RemoteEvent {
            id,
            summary: created.summary,
        })
    }

    async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        event: &EventPayload,
    ) -> Result<(), ApiError> {
        let url = format!("{}/{}", self.events_url(calendar_id), urlencoding::encode(event_id));

        tracing::info!("Updating event {}: {}", event_id, event.summary);
        tracing::debug!("PUT {} with payload: {:?}", url, event);

        let response = self.client
            .put(&url)
            .bearer_auth(&self.access_token)
            .json(event)
            .send()
            .await?;

        tracing::info!("Update event response status: {}", response.status());
        Self::check_status(response, event_id).await?;

        tracing::info!("Event {} updated successfully", event_id);
        Ok(())
    }
}
