use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

use budget_core::config::AppConfig;
use budget_core::{init_logging, LogFormat};

mod cli;
mod render;

use cli::CliApp;

fn main() -> Result<()> {
    let cli = CliApp::parse();

    // 加载配置
    let mut config = AppConfig::load(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("加载配置文件失败: {path}"),
        None => "加载配置失败".to_string(),
    })?;

    // 命令行参数覆盖配置中的日志设置
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(format) = cli.log_format.as_deref().and_then(LogFormat::parse) {
        config.logging.format = format;
    }
    init_logging(&config.logging)?;

    info!("预算模拟器启动");
    debug!(
        "参与方 {} 个, 时间段 {} 个",
        config.program.actors.len(),
        config.program.periods.len()
    );

    cli.run(config)
}
