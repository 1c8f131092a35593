use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::errors::{BudgetError, BudgetResult};
use crate::models::{
    Actor, Pricing, TaskId, HOURS_COLUMN, KEY_SEPARATOR, PERIOD_COLUMN, TOTAL_COLUMN,
    WORKSTREAM_COLUMN,
};

/// 计算结果表的固定列，参与方不能与之同名
const RESERVED_COLUMNS: [&str; 4] = [PERIOD_COLUMN, WORKSTREAM_COLUMN, HOURS_COLUMN, TOTAL_COLUMN];

/// 一个时间段及其包含的工作流
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodConfig {
    pub label: String,
    pub workstreams: Vec<String>,
}

impl PeriodConfig {
    pub fn new<L: Into<String>>(label: L, workstreams: &[&str]) -> Self {
        Self {
            label: label.into(),
            workstreams: workstreams.iter().map(|name| name.to_string()).collect(),
        }
    }
}

/// 项目定义：参与方及按时间顺序排列的时间段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgramConfig {
    pub actors: Vec<Actor>,
    /// 顺序即时间顺序，不按字母排序
    pub periods: Vec<PeriodConfig>,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            actors: vec![
                Actor::new("GRESB", "GRESB", Pricing::monthly(1000.0)),
                Actor::new("SAS New", "SAS", Pricing::hourly(25.0)),
                Actor::new("SAS Exp", "SAS", Pricing::hourly(40.0)),
                Actor::new("SAS Consl", "SAS", Pricing::hourly(60.0)),
                Actor::new("ESGDS", "ESGDS", Pricing::annual(15000.0)),
            ],
            periods: vec![
                PeriodConfig::new(
                    "Jan - March",
                    &[
                        "1. Validation Guidance Docs",
                        "2. OAD",
                        "3. Edge cases files",
                        "4. LLM output Refinement",
                    ],
                ),
                PeriodConfig::new(
                    "Apr - June",
                    &[
                        "5. PSC admin",
                        "6. PSC validation (Primary and QC)",
                        "7. PSC notes prep for GRESB calls",
                        "8. PSC call leads",
                        "9. Report generation",
                        "10. Queries on Front",
                    ],
                ),
                PeriodConfig::new(
                    "July - August",
                    &[
                        "11. Validation Admin",
                        "12. Primary Decisions",
                        "13. Secondary decisions",
                        "14. QC 10% of accepted",
                        "15. Same Doc ID - CC",
                        "16. YoY - CC",
                        "17. Sensitive managers - CC",
                        "18. Extra QC on LLM decisions",
                        "19. Escalations Set-up",
                    ],
                ),
                PeriodConfig::new(
                    "September",
                    &[
                        "20. All validation queries on Front",
                        "21. Re-Validate from AC - Primary",
                        "22. Re-Validate from AC - Secondary",
                        "23. Deem YoY mistake",
                        "24. Deem validation error",
                        "25. Update and maintain trackers",
                        "26. Revert Validation error decisions",
                        "27. Same Docs - CC",
                        "28. Manager level - CC",
                    ],
                ),
                PeriodConfig::new(
                    "October - December",
                    &[
                        "29. LLM Output refinement",
                        "30. Compile Outreach cases",
                        "31. Post-Validation tasks",
                    ],
                ),
            ],
        }
    }
}

impl ProgramConfig {
    /// 按时间段顺序遍历所有工作流
    pub fn workstreams(&self) -> impl Iterator<Item = (&PeriodConfig, TaskId)> + '_ {
        self.periods.iter().flat_map(|period| {
            period
                .workstreams
                .iter()
                .map(move |name| (period, TaskId::new(name.as_str())))
        })
    }

    pub fn period_labels(&self) -> Vec<&str> {
        self.periods.iter().map(|period| period.label.as_str()).collect()
    }

    pub fn validate(&self) -> BudgetResult<()> {
        if self.actors.is_empty() {
            return Err(BudgetError::config_error("至少需要配置一个参与方"));
        }
        if self.periods.is_empty() {
            return Err(BudgetError::config_error("至少需要配置一个时间段"));
        }

        let mut actor_ids = HashSet::new();
        for actor in &self.actors {
            validate_name("参与方", actor.id.as_str())?;
            if RESERVED_COLUMNS.contains(&actor.id.as_str()) {
                return Err(BudgetError::config_error(format!(
                    "参与方名称与结果表固定列冲突: {}",
                    actor.id
                )));
            }
            if !actor_ids.insert(actor.id.as_str()) {
                return Err(BudgetError::config_error(format!(
                    "参与方重复: {}",
                    actor.id
                )));
            }
            let amount = actor.pricing.amount();
            if !amount.is_finite() || amount < 0.0 {
                return Err(BudgetError::config_error(format!(
                    "参与方 {} 的金额无效: {amount}",
                    actor.id
                )));
            }
            // 折算工时为零时放行，由计算引擎跳过并标记
            if let Some(hours) = actor.pricing.prorating_hours() {
                if !hours.is_finite() || hours < 0.0 {
                    return Err(BudgetError::config_error(format!(
                        "参与方 {} 的折算工时无效: {hours}",
                        actor.id
                    )));
                }
            }
        }

        let mut labels = HashSet::new();
        let mut workstreams = HashSet::new();
        for period in &self.periods {
            if period.label.trim().is_empty() {
                return Err(BudgetError::config_error("时间段名称不能为空"));
            }
            if !labels.insert(period.label.as_str()) {
                return Err(BudgetError::config_error(format!(
                    "时间段重复: {}",
                    period.label
                )));
            }
            for name in &period.workstreams {
                validate_name("工作流", name)?;
                if !workstreams.insert(name.as_str()) {
                    return Err(BudgetError::config_error(format!("工作流重复: {name}")));
                }
            }
        }
        Ok(())
    }
}

fn validate_name(kind: &str, name: &str) -> BudgetResult<()> {
    if name.trim().is_empty() {
        return Err(BudgetError::config_error(format!("{kind}名称不能为空")));
    }
    if name.contains(KEY_SEPARATOR) {
        return Err(BudgetError::config_error(format!(
            "{kind}名称不能包含 '{KEY_SEPARATOR}': {name}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_program() {
        let program = ProgramConfig::default();
        assert!(program.validate().is_ok());
        assert_eq!(program.actors.len(), 5);
        assert_eq!(program.workstreams().count(), 31);
        assert_eq!(
            program.period_labels(),
            vec![
                "Jan - March",
                "Apr - June",
                "July - August",
                "September",
                "October - December"
            ]
        );
    }

    #[test]
    fn test_rejects_duplicate_workstreams() {
        let mut program = ProgramConfig::default();
        program.periods[1].workstreams.push("2. OAD".to_string());
        assert!(program.validate().is_err());
    }

    #[test]
    fn test_rejects_separator_in_names() {
        let mut program = ProgramConfig::default();
        program.actors[0].id = crate::models::ActorId::new("A::B");
        assert!(program.validate().is_err());
    }

    #[test]
    fn test_rejects_actor_named_after_fixed_column() {
        for reserved in RESERVED_COLUMNS {
            let mut program = ProgramConfig::default();
            program.actors[1].id = crate::models::ActorId::new(reserved);
            let err = program.validate().unwrap_err();
            assert!(err.to_string().contains(reserved));
        }

        let mut program = ProgramConfig::default();
        program.actors[1].id = crate::models::ActorId::new("Totals");
        assert!(program.validate().is_ok());
    }

    #[test]
    fn test_zero_prorating_hours_passes_validation() {
        let mut program = ProgramConfig::default();
        program.actors[0].pricing = Pricing::MonthlyProrated {
            monthly_cost: 1000.0,
            prorating_hours: 0.0,
        };
        assert!(program.validate().is_ok());
    }
}
