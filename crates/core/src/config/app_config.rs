use std::path::Path;

use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use super::program::ProgramConfig;
use crate::errors::{BudgetError, BudgetResult};
use crate::logging::LoggingConfig;

/// 场景导出设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// 是否缩进输出，便于对比
    pub pretty: bool,
    pub default_file: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            default_file: "saved_scenarios.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub program: ProgramConfig,
    pub logging: LoggingConfig,
    pub export: ExportConfig,
}

impl AppConfig {
    /// 加载配置：内置默认值 <- TOML文件 <- BUDGET_ 前缀的环境变量
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_path {
            if Path::new(path).exists() {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            } else {
                return Err(anyhow::anyhow!("配置文件不存在: {}", path));
            }
        } else {
            let default_paths = ["budget.toml", "config/budget.toml"];
            if let Some(path) = default_paths.iter().find(|path| Path::new(path).exists()) {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("BUDGET")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder
            .build()
            .context("构建配置失败")?
            .try_deserialize()
            .context("反序列化配置失败")?;

        config.validate()?;

        Ok(config)
    }

    pub fn from_toml(toml_str: &str) -> BudgetResult<Self> {
        let config: AppConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> BudgetResult<String> {
        toml::to_string_pretty(self).map_err(|e| BudgetError::config_error(e.to_string()))
    }

    pub fn validate(&self) -> BudgetResult<()> {
        self.program.validate()?;
        if !self.logging.is_valid_level() {
            return Err(BudgetError::config_error(format!(
                "不支持的日志级别: {}",
                self.logging.level
            )));
        }
        if self.export.default_file.trim().is_empty() {
            return Err(BudgetError::config_error("导出文件名不能为空"));
        }
        Ok(())
    }
}
