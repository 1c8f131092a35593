pub mod loader;
pub mod notice;
pub mod session;

pub use loader::{LoadOutcome, LoadReport, PendingLoad, ScenarioLoader};
pub use notice::{Action, Notice};
pub use session::Session;
