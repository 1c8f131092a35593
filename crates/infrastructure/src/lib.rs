pub mod scenario_store;
pub mod serializer;

pub use scenario_store::{SaveOutcome, ScenarioStore};
pub use serializer::{ImportReport, Serializer};
