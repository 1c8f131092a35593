use std::fmt;
use std::path::PathBuf;

use serde_json::Value;

/// 用户在一个周期内触发的操作
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// 原始键名与JSON值，键名可以是规范形式或旧版形式
    SetParameter { key: String, value: Value },
    Save { name: String },
    Delete { name: String },
    RequestLoad { name: String },
    Import { document: String },
    Export { path: PathBuf },
}

/// 操作结果的单行提示
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Info(String),
    Loaded(String),
    Warning(String),
    Error(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Success(message)
            | Notice::Info(message)
            | Notice::Loaded(message)
            | Notice::Warning(message)
            | Notice::Error(message) => message,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }

    pub fn level(&self) -> &'static str {
        match self {
            Notice::Success(_) => "success",
            Notice::Info(_) => "info",
            Notice::Loaded(_) => "loaded",
            Notice::Warning(_) => "warning",
            Notice::Error(_) => "error",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level(), self.message())
    }
}
