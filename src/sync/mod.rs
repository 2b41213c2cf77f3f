pub mod google_api;
pub mod google_auth;
pub mod synchronizer;

pub use google_api::{CalendarApi, GoogleCalendarClient};
pub use google_auth::GoogleAuthenticator;
pub use synchronizer::{SyncOutcome, Synchronizer};
