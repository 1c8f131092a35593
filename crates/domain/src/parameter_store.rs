//! 参数面板的内存实现
//!
//! 每个工作流一个工时参数，每个 (工作流, 参与方) 一个百分比参数，
//! 每个参与方一个费率参数。面板只接受初始化时登记的参数。

use indexmap::IndexMap;
use tracing::{debug, warn};

use budget_core::config::ProgramConfig;
use budget_core::models::{ActorId, InputSnapshot, ParameterKey, ParameterValue, Percent};
use budget_core::{BudgetError, BudgetResult, ParameterSurface};

const LEGACY_HOURS_PREFIX: &str = "hours_";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterStore {
    values: IndexMap<ParameterKey, ParameterValue>,
    actors: Vec<ActorId>,
}

impl ParameterStore {
    /// 按项目定义登记全部参数：工时和百分比默认为0，费率取配置金额
    pub fn from_program(program: &ProgramConfig) -> Self {
        let actors: Vec<ActorId> = program.actors.iter().map(|actor| actor.id.clone()).collect();
        let mut values = IndexMap::new();

        for (_, task) in program.workstreams() {
            values.insert(ParameterKey::Hours(task.clone()), ParameterValue::Hours(0));
            for actor in &actors {
                values.insert(
                    ParameterKey::Percent(task.clone(), actor.clone()),
                    ParameterValue::Percent(Percent::ZERO),
                );
            }
        }
        for actor in &program.actors {
            values.insert(
                ParameterKey::Rate(actor.id.clone()),
                ParameterValue::Amount(actor.pricing.amount()),
            );
        }

        debug!("参数面板已登记 {} 个参数", values.len());
        Self { values, actors }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 按面板顺序导出当前全部参数值
    pub fn snapshot(&self) -> InputSnapshot {
        self.values
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_json()))
            .collect()
    }

    /// 旧版键名：`hours_<工作流>` 与 `<参与方>_<工作流>`
    fn resolve_legacy(&self, raw: &str) -> Option<ParameterKey> {
        if let Some(task) = raw.strip_prefix(LEGACY_HOURS_PREFIX) {
            let key = ParameterKey::hours(task);
            if self.contains(&key) {
                return Some(key);
            }
        }
        self.actors.iter().find_map(|actor| {
            let task = raw.strip_prefix(actor.as_str())?.strip_prefix('_')?;
            let key = ParameterKey::Percent(task.into(), actor.clone());
            self.contains(&key).then_some(key)
        })
    }
}

impl ParameterSurface for ParameterStore {
    fn contains(&self, key: &ParameterKey) -> bool {
        self.values.contains_key(key)
    }

    fn get(&self, key: &ParameterKey) -> Option<ParameterValue> {
        self.values.get(key).copied()
    }

    fn set(&mut self, key: &ParameterKey, value: ParameterValue) -> BudgetResult<()> {
        if !key.accepts(&value) {
            return Err(BudgetError::invalid_parameter(
                key.to_string(),
                format!("值类型不匹配: {value:?}"),
            ));
        }
        match self.values.get_mut(key) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(BudgetError::unknown_parameter(key.to_string())),
        }
    }

    fn keys(&self) -> Vec<ParameterKey> {
        self.values.keys().cloned().collect()
    }

    fn resolve_key(&self, raw: &str) -> Option<ParameterKey> {
        match raw.parse::<ParameterKey>() {
            Ok(key) => Some(key),
            Err(_) => self.resolve_legacy(raw),
        }
    }
}

/// 快照写入面板的结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplyReport {
    /// 已写入的参数
    pub applied: Vec<String>,
    /// 面板不识别的键
    pub ignored: Vec<String>,
    /// 值校验失败的键及原因
    pub rejected: Vec<(String, String)>,
}

impl ApplyReport {
    pub fn skipped(&self) -> usize {
        self.ignored.len() + self.rejected.len()
    }

    pub fn is_complete(&self) -> bool {
        self.skipped() == 0
    }
}

/// 把快照中的值写入面板
///
/// 只覆盖面板已识别的参数，未知键忽略，非法值拒绝；
/// 单个键失败不影响其他键。
pub fn apply_snapshot<S>(surface: &mut S, snapshot: &InputSnapshot) -> ApplyReport
where
    S: ParameterSurface + ?Sized,
{
    let mut report = ApplyReport::default();

    for (raw_key, raw_value) in snapshot {
        let key = match surface.resolve_key(raw_key) {
            Some(key) if surface.contains(&key) => key,
            _ => {
                debug!("忽略未识别的参数: {raw_key}");
                report.ignored.push(raw_key.clone());
                continue;
            }
        };

        let outcome = key
            .coerce(raw_value)
            .and_then(|value| surface.set(&key, value));
        match outcome {
            Ok(()) => report.applied.push(raw_key.clone()),
            Err(e) => {
                warn!("参数 {raw_key} 未恢复: {e}");
                report.rejected.push((raw_key.clone(), e.user_message()));
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use budget_core::config::PeriodConfig;
    use budget_core::models::{Actor, Pricing};
    use serde_json::json;

    fn small_program() -> ProgramConfig {
        ProgramConfig {
            actors: vec![
                Actor::new("SAS", "SAS", Pricing::hourly(30.0)),
                Actor::new("SAS New", "SAS", Pricing::hourly(25.0)),
            ],
            periods: vec![PeriodConfig::new("Q1", &["Intake", "Review"])],
        }
    }

    #[test]
    fn test_registers_every_parameter() {
        let store = ParameterStore::from_program(&small_program());
        // 2 工时 + 2x2 百分比 + 2 费率
        assert_eq!(store.len(), 8);
        assert_eq!(
            store.get(&ParameterKey::rate("SAS New")),
            Some(ParameterValue::Amount(25.0))
        );
        assert_eq!(
            store.get(&ParameterKey::hours("Review")),
            Some(ParameterValue::Hours(0))
        );
    }

    #[test]
    fn test_set_rejects_unknown_and_mismatched() {
        let mut store = ParameterStore::from_program(&small_program());
        assert!(store
            .set(&ParameterKey::hours("Nope"), ParameterValue::Hours(1))
            .is_err());
        assert!(store
            .set(&ParameterKey::hours("Intake"), ParameterValue::Amount(1.0))
            .is_err());
        assert!(store
            .set(&ParameterKey::hours("Intake"), ParameterValue::Hours(7))
            .is_ok());
    }

    #[test]
    fn test_legacy_keys_resolve_to_registered_parameters() {
        let store = ParameterStore::from_program(&small_program());
        assert_eq!(
            store.resolve_key("hours_Intake"),
            Some(ParameterKey::hours("Intake"))
        );
        assert_eq!(
            store.resolve_key("SAS New_Review"),
            Some(ParameterKey::percent("Review", "SAS New"))
        );
        assert_eq!(
            store.resolve_key("SAS_Review"),
            Some(ParameterKey::percent("Review", "SAS"))
        );
        assert_eq!(store.resolve_key("save_name_input"), None);
    }

    #[test]
    fn test_apply_snapshot_reports_each_key() {
        let mut store = ParameterStore::from_program(&small_program());
        let snapshot: InputSnapshot = [
            ("hours::Intake".to_string(), json!(40)),
            ("percent::Intake::SAS".to_string(), json!(150)),
            ("hours_Review".to_string(), json!(8)),
            ("save_name_input".to_string(), json!("draft")),
            ("hours::Unknown".to_string(), json!(3)),
        ]
        .into_iter()
        .collect();

        let report = apply_snapshot(&mut store, &snapshot);

        assert_eq!(report.applied, vec!["hours::Intake", "hours_Review"]);
        assert_eq!(report.ignored, vec!["save_name_input", "hours::Unknown"]);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].0, "percent::Intake::SAS");
        assert_eq!(report.skipped(), 3);
        assert_eq!(
            store.get(&ParameterKey::hours("Review")),
            Some(ParameterValue::Hours(8))
        );
        assert_eq!(
            store.get(&ParameterKey::percent("Intake", "SAS")),
            Some(ParameterValue::Percent(Percent::ZERO))
        );
    }

    #[test]
    fn test_snapshot_round_trips_through_apply() {
        let program = small_program();
        let mut source = ParameterStore::from_program(&program);
        source
            .set(&ParameterKey::hours("Intake"), ParameterValue::Hours(12))
            .unwrap();
        source
            .set(&ParameterKey::rate("SAS"), ParameterValue::Amount(31.5))
            .unwrap();

        let mut target = ParameterStore::from_program(&program);
        let report = apply_snapshot(&mut target, &source.snapshot());
        assert!(report.is_complete());
        assert_eq!(target, source);
    }
}
