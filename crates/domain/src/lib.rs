pub mod allocation;
pub mod cost_engine;
pub mod parameter_store;
pub mod rate_card;
pub mod report;

pub use allocation::{AllocationModel, AllocationWarning};
pub use cost_engine::{Aggregates, ComputedRow, CostEngine, CostReport};
pub use parameter_store::{apply_snapshot, ApplyReport, ParameterStore};
pub use rate_card::{effective_hourly_rate, RateCard};
pub use report::Insights;
