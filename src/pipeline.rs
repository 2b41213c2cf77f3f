use chrono::{NaiveDate, Utc};
use thiserror::Error;

use crate::assignment::{Assignment, ColorCode, classify};
use crate::portal::calendar_page::{self, ExtractError, MONTH_VIEW_PATH};
use crate::portal::detail_page;
use crate::portal::session::{Credentials, PortalSession, SessionError};
use crate::storage::config::PortalConfig;
use crate::sync::google_api::CalendarApi;
use crate::sync::google_auth::AuthError;
use crate::sync::synchronizer::{SyncError, SyncOutcome, Synchronizer, tokyo_offset};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Login failed: {0}")]
    LoginFailed(#[source] SessionError),
    #[error("Portal request failed: {0}")]
    Portal(#[source] SessionError),
    #[error("Failed to read calendar page: {0}")]
    Extract(#[from] ExtractError),
    #[error("Google authentication failed: {0}")]
    Auth(#[from] AuthError),
    #[error("Calendar sync failed: {0}")]
    Sync(#[from] SyncError),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub created: usize,
    pub updated: usize,
}

pub fn today_in_tokyo() -> NaiveDate {
    Utc::now().with_timezone(&tokyo_offset()).date_naive()
}

pub async fn collect_assignments(portal: &PortalConfig) -> Result<Vec<Assignment>, PipelineError> {
    let credentials = Credentials {
        username: portal.username.clone(),
        password: portal.password.clone(),
    };

    let session = PortalSession::login(&portal.base_url, &credentials)
        .await
        .map_err(|err| match err {
            SessionError::LoginRejected { .. } | SessionError::MissingLoginToken => {
                PipelineError::LoginFailed(err)
            }
            other => PipelineError::Portal(other),
        })?;
    println!("Login succeeded");
    tracing::info!("Logged in to {}", session.root());

    let month_view = session.fetch(MONTH_VIEW_PATH).await.map_err(PipelineError::Portal)?;
    let stubs = calendar_page::extract(&month_view, &portal.keywords)?;

    let mut assignments = Vec::with_capacity(stubs.len());
    for stub in stubs {
        let assignment = detail_page::enrich(&session, stub)
            .await
            .map_err(PipelineError::Portal)?;
        assignments.push(assignment);
    }

    tracing::info!("Collected {} assignments", assignments.len());
    Ok(assignments)
}

pub fn color_for(assignment: &Assignment, today: NaiveDate) -> Result<ColorCode, SyncError> {
    let due = assignment.due_date().map_err(|source| SyncError::InvalidDate {
        date: assignment.date.clone(),
        source,
    })?;
    Ok(classify(assignment.completed, due, today))
}

pub async fn sync_assignments<A: CalendarApi>(
    synchronizer: &Synchronizer<A>,
    assignments: &[Assignment],
    today: NaiveDate,
) -> Result<SyncReport, PipelineError> {
    let mut report = SyncReport::default();

    for assignment in assignments {
        let color = color_for(assignment, today)?;

        match synchronizer.sync(assignment, color).await? {
            SyncOutcome::Created => {
                report.created += 1;
                println!("Event created: {}", assignment.summary());
            }
            SyncOutcome::Updated => {
                report.updated += 1;
                println!("Event updated: {}", assignment.summary());
            }
        }
    }

    tracing::info!("Sync finished: {} created, {} updated", report.created, report.updated);
    Ok(report)
}
