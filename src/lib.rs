pub mod assignment;
pub mod pipeline;
pub mod portal;
pub mod storage;
pub mod sync;

pub use assignment::{Assignment, AssignmentStub, ColorCode};
pub use storage::config::Config;
