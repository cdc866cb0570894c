mod console;
pub mod models;
mod session;

pub use console::{Console, StdConsole};
pub use models::{SessionState, WorkItem};
pub use session::{ItemOutcome, WorkLog, CANCEL_INPUT};
