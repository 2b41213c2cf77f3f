pub mod calendar_page;
pub mod detail_page;
pub mod session;

pub use calendar_page::ExtractError;
pub use session::{Credentials, PortalSession, SessionError};
