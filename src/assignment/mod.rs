pub mod record;
pub mod status;

pub use record::{Assignment, AssignmentStub};
pub use status::{ColorCode, classify};
