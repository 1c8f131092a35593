pub mod actor;
pub mod parameter;
pub mod scenario;
pub mod task;

pub use actor::{
    Actor, ActorId, Pricing, PricingMode, ANNUAL_PRORATING_HOURS, MONTHLY_PRORATING_HOURS,
};
pub use parameter::{InputSnapshot, ParameterKey, ParameterValue, KEY_SEPARATOR};
pub use scenario::{
    DataFrame, Scenario, ScenarioSummary, HOURS_COLUMN, PERIOD_COLUMN, TOTAL_COLUMN,
    WORKSTREAM_COLUMN,
};
pub use task::{AllocationKey, Percent, Task, TaskId};
