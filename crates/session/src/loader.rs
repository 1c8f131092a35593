//! 场景恢复的两阶段协议
//!
//! `request_load` 只把场景的参数快照放进单槽待处理区，不接触参数面板；
//! 下一个计算周期开始、读取任何参数之前调用 `drain`，把快照写入面板。
//! 待处理区只有一个槽位，后到的请求覆盖先前未处理的请求。

use tracing::{debug, info, warn};

use budget_core::models::InputSnapshot;
use budget_core::{BudgetResult, LoadError, ParameterSurface};
use budget_domain::{apply_snapshot, ApplyReport};
use budget_infrastructure::ScenarioStore;

/// 等待下一周期写入的场景快照
#[derive(Debug, Clone, PartialEq)]
pub struct PendingLoad {
    pub name: String,
    pub snapshot: InputSnapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// 快照中的每个键都已写入
    Full,
    /// 部分键被忽略或拒绝
    Partial,
    /// 没有写入任何键
    NoOp,
}

/// 一次恢复的结果，只通知一次
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub scenario: String,
    pub outcome: LoadOutcome,
    pub apply: ApplyReport,
}

impl LoadReport {
    fn new(scenario: String, apply: ApplyReport) -> Self {
        // 空快照同样视为未恢复
        let outcome = if apply.applied.is_empty() {
            LoadOutcome::NoOp
        } else if apply.is_complete() {
            LoadOutcome::Full
        } else {
            LoadOutcome::Partial
        };
        Self {
            scenario,
            outcome,
            apply,
        }
    }

    pub fn error(&self) -> Option<LoadError> {
        match self.outcome {
            LoadOutcome::Full => None,
            LoadOutcome::Partial => Some(LoadError::PartiallyApplied {
                scenario: self.scenario.clone(),
                applied: self.apply.applied.len(),
                skipped: self.apply.skipped(),
            }),
            LoadOutcome::NoOp => Some(LoadError::NoRecognizedKeys {
                scenario: self.scenario.clone(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScenarioLoader {
    pending: Option<PendingLoad>,
    notice: Option<LoadReport>,
}

impl ScenarioLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记恢复请求；场景不存在时报错且不改变待处理区
    pub fn request_load(&mut self, store: &ScenarioStore, name: &str) -> BudgetResult<()> {
        let scenario = store.get(name)?;
        let request = PendingLoad {
            name: name.to_string(),
            snapshot: scenario.inputs.clone(),
        };
        if let Some(previous) = self.pending.replace(request) {
            debug!("恢复请求 '{}' 被 '{name}' 覆盖", previous.name);
        }
        Ok(())
    }

    pub fn pending(&self) -> Option<&PendingLoad> {
        self.pending.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// 每个周期开始时无条件调用；槽位在这一次尝试后清空
    pub fn drain<S>(&mut self, surface: &mut S) -> Option<&LoadReport>
    where
        S: ParameterSurface + ?Sized,
    {
        let PendingLoad { name, snapshot } = self.pending.take()?;

        let apply = apply_snapshot(surface, &snapshot);
        let report = LoadReport::new(name, apply);
        match report.error() {
            None => info!(
                "场景 '{}' 已恢复, 共 {} 项参数",
                report.scenario,
                report.apply.applied.len()
            ),
            Some(e) => warn!("{e}"),
        }

        self.notice = Some(report);
        self.notice.as_ref()
    }

    /// 取走最近一次恢复的结果，之后返回 None
    pub fn take_notice(&mut self) -> Option<LoadReport> {
        self.notice.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_classification() {
        let full = LoadReport::new(
            "a".into(),
            ApplyReport {
                applied: vec!["hours::x".into()],
                ..Default::default()
            },
        );
        assert_eq!(full.outcome, LoadOutcome::Full);
        assert_eq!(full.error(), None);

        let partial = LoadReport::new(
            "a".into(),
            ApplyReport {
                applied: vec!["hours::x".into()],
                ignored: vec!["old".into()],
                rejected: vec![],
            },
        );
        assert_eq!(partial.outcome, LoadOutcome::Partial);
        assert_eq!(
            partial.error(),
            Some(LoadError::PartiallyApplied {
                scenario: "a".into(),
                applied: 1,
                skipped: 1
            })
        );

        let none = LoadReport::new("a".into(), ApplyReport::default());
        assert_eq!(none.outcome, LoadOutcome::NoOp);
    }

    #[test]
    fn test_drain_without_request_is_noop() {
        struct Untouchable;
        impl ParameterSurface for Untouchable {
            fn contains(&self, _: &budget_core::models::ParameterKey) -> bool {
                unreachable!()
            }
            fn get(
                &self,
                _: &budget_core::models::ParameterKey,
            ) -> Option<budget_core::models::ParameterValue> {
                unreachable!()
            }
            fn set(
                &mut self,
                _: &budget_core::models::ParameterKey,
                _: budget_core::models::ParameterValue,
            ) -> BudgetResult<()> {
                unreachable!()
            }
            fn keys(&self) -> Vec<budget_core::models::ParameterKey> {
                unreachable!()
            }
            fn resolve_key(&self, _: &str) -> Option<budget_core::models::ParameterKey> {
                unreachable!()
            }
        }

        let mut loader = ScenarioLoader::new();
        assert!(loader.drain(&mut Untouchable).is_none());
        assert!(loader.take_notice().is_none());
    }
}
