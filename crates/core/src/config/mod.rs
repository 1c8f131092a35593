pub mod app_config;
pub mod program;

pub use app_config::{AppConfig, ExportConfig};
pub use program::{PeriodConfig, ProgramConfig};
