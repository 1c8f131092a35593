use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde_json::Value;

use super::actor::ActorId;
use super::task::{Percent, TaskId};
use crate::errors::{BudgetError, BudgetResult};

/// 参数快照：参数键字符串 -> 原始JSON值，保持插入顺序
pub type InputSnapshot = IndexMap<String, Value>;

/// 参数键之间的分隔符，工作流和参与方名称中不允许出现
pub const KEY_SEPARATOR: &str = "::";

const HOURS_PREFIX: &str = "hours";
const PERCENT_PREFIX: &str = "percent";
const RATE_PREFIX: &str = "rate";

/// 参数面板上的一个参数
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParameterKey {
    /// 工作流的总工时
    Hours(TaskId),
    /// 工作流分配给某参与方的百分比
    Percent(TaskId, ActorId),
    /// 参与方的费率金额
    Rate(ActorId),
}

impl ParameterKey {
    pub fn hours<T: Into<String>>(task: T) -> Self {
        ParameterKey::Hours(TaskId::new(task))
    }

    pub fn percent<T: Into<String>, A: Into<String>>(task: T, actor: A) -> Self {
        ParameterKey::Percent(TaskId::new(task), ActorId::new(actor))
    }

    pub fn rate<A: Into<String>>(actor: A) -> Self {
        ParameterKey::Rate(ActorId::new(actor))
    }

    /// 按参数类型校验原始JSON值
    pub fn coerce(&self, raw: &Value) -> BudgetResult<ParameterValue> {
        match self {
            ParameterKey::Hours(_) => integral(raw)
                .and_then(|value| u32::try_from(value).ok())
                .map(ParameterValue::Hours)
                .ok_or_else(|| self.rejected(raw, "工时必须是非负整数")),
            ParameterKey::Percent(..) => integral(raw)
                .and_then(|value| u8::try_from(value).ok())
                .and_then(Percent::new)
                .map(ParameterValue::Percent)
                .ok_or_else(|| self.rejected(raw, "百分比必须是 0-100 之间的整数")),
            ParameterKey::Rate(_) => raw
                .as_f64()
                .filter(|value| value.is_finite() && *value >= 0.0)
                .map(ParameterValue::Amount)
                .ok_or_else(|| self.rejected(raw, "费率必须是非负数")),
        }
    }

    /// 值的类型是否与参数匹配
    pub fn accepts(&self, value: &ParameterValue) -> bool {
        match (self, value) {
            (ParameterKey::Hours(_), ParameterValue::Hours(_)) => true,
            (ParameterKey::Percent(..), ParameterValue::Percent(_)) => true,
            (ParameterKey::Rate(_), ParameterValue::Amount(amount)) => {
                amount.is_finite() && *amount >= 0.0
            }
            _ => false,
        }
    }

    fn rejected(&self, raw: &Value, reason: &str) -> BudgetError {
        BudgetError::invalid_parameter(self.to_string(), format!("{reason} (收到 {raw})"))
    }
}

/// 整数，或小数部分为零的浮点数
fn integral(raw: &Value) -> Option<i64> {
    raw.as_i64().or_else(|| {
        raw.as_f64()
            .filter(|value| value.is_finite() && value.fract() == 0.0)
            .filter(|value| value.abs() <= i64::MAX as f64)
            .map(|value| value as i64)
    })
}

impl fmt::Display for ParameterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterKey::Hours(task) => write!(f, "{HOURS_PREFIX}{KEY_SEPARATOR}{task}"),
            ParameterKey::Percent(task, actor) => write!(
                f,
                "{PERCENT_PREFIX}{KEY_SEPARATOR}{task}{KEY_SEPARATOR}{actor}"
            ),
            ParameterKey::Rate(actor) => write!(f, "{RATE_PREFIX}{KEY_SEPARATOR}{actor}"),
        }
    }
}

impl FromStr for ParameterKey {
    type Err = BudgetError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = raw.split(KEY_SEPARATOR).collect();
        if parts.iter().skip(1).any(|part| part.is_empty()) {
            return Err(BudgetError::unknown_parameter(raw));
        }
        match parts.as_slice() {
            [HOURS_PREFIX, task] => Ok(ParameterKey::hours(*task)),
            [PERCENT_PREFIX, task, actor] => Ok(ParameterKey::percent(*task, *actor)),
            [RATE_PREFIX, actor] => Ok(ParameterKey::rate(*actor)),
            _ => Err(BudgetError::unknown_parameter(raw)),
        }
    }
}

/// 经过校验的参数值
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParameterValue {
    Hours(u32),
    Percent(Percent),
    Amount(f64),
}

impl ParameterValue {
    pub fn to_json(&self) -> Value {
        match *self {
            ParameterValue::Hours(hours) => Value::from(hours),
            ParameterValue::Percent(percent) => Value::from(percent.value()),
            ParameterValue::Amount(amount) => Value::from(amount),
        }
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            ParameterValue::Hours(hours) => f64::from(hours),
            ParameterValue::Percent(percent) => f64::from(percent.value()),
            ParameterValue::Amount(amount) => amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_string_form() {
        let key = ParameterKey::percent("2. OAD", "SAS New");
        assert_eq!(key.to_string(), "percent::2. OAD::SAS New");
        assert_eq!("percent::2. OAD::SAS New".parse::<ParameterKey>().unwrap(), key);
        assert_eq!(
            "hours::1. Validation Guidance Docs".parse::<ParameterKey>().unwrap(),
            ParameterKey::hours("1. Validation Guidance Docs")
        );
        assert_eq!(
            "rate::ESGDS".parse::<ParameterKey>().unwrap(),
            ParameterKey::rate("ESGDS")
        );
    }

    #[test]
    fn test_unrecognised_key_strings() {
        for raw in ["save_name_input", "hours::", "percent::a", "rate::a::b", "bogus::x"] {
            assert!(raw.parse::<ParameterKey>().is_err(), "{raw}");
        }
    }

    #[test]
    fn test_coerce_by_kind() {
        let hours = ParameterKey::hours("t");
        assert_eq!(hours.coerce(&json!(12)).unwrap(), ParameterValue::Hours(12));
        assert_eq!(hours.coerce(&json!(12.0)).unwrap(), ParameterValue::Hours(12));
        assert!(hours.coerce(&json!(-1)).is_err());
        assert!(hours.coerce(&json!(1.5)).is_err());
        assert!(hours.coerce(&json!("12")).is_err());

        let percent = ParameterKey::percent("t", "a");
        assert!(percent.coerce(&json!(100)).is_ok());
        assert!(percent.coerce(&json!(101)).is_err());
        assert!(percent.coerce(&json!(true)).is_err());

        let rate = ParameterKey::rate("a");
        assert_eq!(rate.coerce(&json!(25)).unwrap(), ParameterValue::Amount(25.0));
        assert!(rate.coerce(&json!(-0.5)).is_err());
    }

    #[test]
    fn test_accepts_matches_kind() {
        assert!(ParameterKey::hours("t").accepts(&ParameterValue::Hours(3)));
        assert!(!ParameterKey::hours("t").accepts(&ParameterValue::Amount(3.0)));
        assert!(!ParameterKey::rate("a").accepts(&ParameterValue::Amount(f64::NAN)));
    }
}
