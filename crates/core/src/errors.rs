use serde::Serialize;
use thiserror::Error;

/// 保存场景失败的原因
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SaveError {
    #[error("场景名称不能为空")]
    BlankName,

    #[error("尚无计算结果，请先运行模型")]
    NoComputedRows,

    #[error("计算结果不完整，缺少列: {column}")]
    MissingColumn { column: String },

    #[error("计算结果第 {row} 行的 {column} 不是有效数值")]
    InvalidValue { row: usize, column: String },
}

/// 删除场景失败的原因
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DeleteError {
    #[error("场景不存在: {name}")]
    NotFound { name: String },
}

/// 恢复场景参数时的问题，恢复本身不会中断
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LoadError {
    #[error("场景 '{scenario}' 中没有可识别的参数")]
    NoRecognizedKeys { scenario: String },

    #[error("场景 '{scenario}' 已恢复 {applied} 项参数，跳过 {skipped} 项")]
    PartiallyApplied {
        scenario: String,
        applied: usize,
        skipped: usize,
    },
}

/// 导入场景文件失败的原因，导入是原子的
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ImportError {
    #[error("无法解析JSON: {0}")]
    Parse(String),

    #[error("上传的JSON必须是以场景名称为键的对象，实际为{found}")]
    NotAnObject { found: &'static str },

    #[error("场景 '{name}' 的数据格式无效: {reason}")]
    InvalidScenario { name: String, reason: String },
}

/// 费率配置问题，引擎会跳过该参与方并标记
#[derive(Debug, Error, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigurationError {
    #[error("参与方 {actor} 的折算工时为零，无法换算时薪")]
    ZeroProratingHours { actor: String },

    #[error("参与方 {actor} 的折算工时无效: {value}")]
    InvalidProratingHours { actor: String, value: f64 },

    #[error("参与方 {actor} 的费率无效: {value}")]
    InvalidRate { actor: String, value: f64 },
}

/// 预算模拟器统一错误类型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BudgetError {
    #[error("保存场景失败: {0}")]
    Save(#[from] SaveError),

    #[error("删除场景失败: {0}")]
    Delete(#[from] DeleteError),

    #[error("加载场景失败: {0}")]
    Load(#[from] LoadError),

    #[error("导入场景失败: {0}")]
    Import(#[from] ImportError),

    #[error("费率配置错误: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("场景不存在: {name}")]
    ScenarioNotFound { name: String },

    #[error("参数 {key} 无效: {reason}")]
    InvalidParameter { key: String, reason: String },

    #[error("未知参数: {key}")]
    UnknownParameter { key: String },

    #[error("配置错误: {0}")]
    Config(String),

    #[error("序列化错误: {0}")]
    Serialization(String),

    #[error("文件操作失败: {0}")]
    Io(String),
}

/// 统一的Result类型
pub type BudgetResult<T> = std::result::Result<T, BudgetError>;

impl BudgetError {
    pub fn scenario_not_found<S: Into<String>>(name: S) -> Self {
        Self::ScenarioNotFound { name: name.into() }
    }

    pub fn invalid_parameter<K: Into<String>, R: Into<String>>(key: K, reason: R) -> Self {
        Self::InvalidParameter {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn unknown_parameter<K: Into<String>>(key: K) -> Self {
        Self::UnknownParameter { key: key.into() }
    }

    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// 由用户输入引起的错误，界面上提示即可
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            BudgetError::Save(_)
                | BudgetError::Delete(_)
                | BudgetError::Load(_)
                | BudgetError::Import(_)
                | BudgetError::ScenarioNotFound { .. }
                | BudgetError::InvalidParameter { .. }
                | BudgetError::UnknownParameter { .. }
        )
    }

    /// 单行提示信息
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        match message.lines().next() {
            Some(line) => line.trim_end().to_string(),
            None => message,
        }
    }
}

impl From<serde_json::Error> for BudgetError {
    fn from(err: serde_json::Error) -> Self {
        BudgetError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for BudgetError {
    fn from(err: std::io::Error) -> Self {
        BudgetError::Io(err.to_string())
    }
}

impl From<config::ConfigError> for BudgetError {
    fn from(err: config::ConfigError) -> Self {
        BudgetError::Config(err.to_string())
    }
}

impl From<toml::de::Error> for BudgetError {
    fn from(err: toml::de::Error) -> Self {
        BudgetError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_is_single_line() {
        let err = BudgetError::Import(ImportError::Parse("expected value\nat line 1".into()));
        let message = err.user_message();
        assert!(!message.contains('\n'));
        assert!(message.starts_with("导入场景失败"));
    }

    #[test]
    fn test_user_error_classification() {
        assert!(BudgetError::from(SaveError::BlankName).is_user_error());
        assert!(BudgetError::scenario_not_found("x").is_user_error());
        assert!(!BudgetError::Io("disk".into()).is_user_error());
        assert!(!BudgetError::from(ConfigurationError::ZeroProratingHours {
            actor: "GRESB".into()
        })
        .is_user_error());
    }

    #[test]
    fn test_nested_error_display() {
        let err: BudgetError = DeleteError::NotFound {
            name: "baseline".into(),
        }
        .into();
        assert_eq!(err.to_string(), "删除场景失败: 场景不存在: baseline");
    }
}
