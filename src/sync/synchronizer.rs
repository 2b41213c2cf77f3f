use chrono::{FixedOffset, NaiveDate, NaiveTime, TimeZone};
use thiserror::Error;

use crate::assignment::{Assignment, ColorCode};
use crate::sync::google_api::{
    ApiError, CalendarApi, EventDateTime, EventPayload, EventQuery, EventWindow,
};

pub const TIME_ZONE: &str = "Asia/Tokyo";
const UTC_OFFSET_SECONDS: i32 = 9 * 3600;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("API error: {0}")]
    ApiError(#[from] ApiError),
    #[error("Invalid due date {date:?}: {source}")]
    InvalidDate {
        date: String,
        source: chrono::ParseError,
    },
    #[error("Cannot place an event on {0}")]
    InvalidWindow(NaiveDate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Created,
    Updated,
}

pub fn tokyo_offset() -> FixedOffset {
    FixedOffset::east_opt(UTC_OFFSET_SECONDS).expect("UTC+9 is a valid offset")
}

impl EventWindow {
    pub fn for_due_date(date: NaiveDate) -> Option<Self> {
        let offset = tokyo_offset();
        let at = |hour| {
            let time = NaiveTime::from_hms_opt(hour, 0, 0)?;
            offset.from_local_datetime(&date.and_time(time)).single()
        };

        Some(Self {
            start: at(9)?,
            end: at(10)?,
        })
    }
}

pub struct Synchronizer<A: CalendarApi> {
    api: A,
    calendar_id: String,
}

impl<A: CalendarApi> Synchronizer<A> {
    pub fn new(api: A, calendar_id: String) -> Self {
        Self { api, calendar_id }
    }

    pub async fn sync(&self, assignment: &Assignment, color: ColorCode) -> Result<SyncOutcome, SyncError> {
        let due = assignment.due_date().map_err(|source| SyncError::InvalidDate {
            date: assignment.date.clone(),
            source,
        })?;
        let window = EventWindow::for_due_date(due).ok_or(SyncError::InvalidWindow(due))?;
        let payload = build_payload(assignment, color, window);

        let query = EventQuery {
            window,
            text: payload.summary.clone(),
        };
        let existing = self.api.list_events(&self.calendar_id, &query).await?;

        // Text search may return several hits; the first one wins.
        match existing.first() {
            Some(event) => {
                tracing::info!("Matched existing event {} ({:?})", event.id, event.summary);
                self.api.update_event(&self.calendar_id, &event.id, &payload).await?;
                Ok(SyncOutcome::Updated)
            }
            None => {
                self.api.insert_event(&self.calendar_id, &payload).await?;
                Ok(SyncOutcome::Created)
            }
        }
    }
}

pub fn build_payload(assignment: &Assignment, color: ColorCode, window: EventWindow) -> EventPayload {
    EventPayload {
        summary: assignment.summary(),
        description: assignment.description.clone(),
        start: EventDateTime::new(window.start, TIME_ZONE),
        end: EventDateTime::new(window.end, TIME_ZONE),
        color_id: color.color_id().to_string(),
    }
}
