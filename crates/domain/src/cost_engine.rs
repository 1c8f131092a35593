//! 成本计算引擎
//!
//! 纯函数：相同的分配模型和费率表总是得到逐位相同的结果。
//! 行、列和汇总都按固定顺序累加，不依赖哈希表的遍历顺序。

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, warn};

use budget_core::models::{ActorId, Percent, TaskId};
use budget_core::ConfigurationError;

use crate::allocation::{AllocationModel, AllocationWarning};
use crate::rate_card::{effective_hourly_rate, RateCard};

/// 单个工作流的计算结果，随时可由输入重新计算
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComputedRow {
    pub task: TaskId,
    pub period: String,
    pub hours: u32,
    pub costs: IndexMap<ActorId, f64>,
    pub total: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Aggregates {
    /// 按时间顺序，没有工作流的时间段为0
    pub by_period: IndexMap<String, f64>,
    pub by_actor: IndexMap<ActorId, f64>,
    pub by_period_actor: IndexMap<String, IndexMap<ActorId, f64>>,
    pub by_team: IndexMap<String, f64>,
    pub total_hours: u64,
    pub workstream_count: usize,
    pub grand_total: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CostReport {
    pub rows: Vec<ComputedRow>,
    pub aggregates: Aggregates,
    pub warnings: Vec<AllocationWarning>,
    /// 因费率配置问题被跳过的参与方
    pub issues: Vec<ConfigurationError>,
}

pub struct CostEngine;

impl CostEngine {
    /// `hours × percent / 100 × effective_rate`
    pub fn cost(hours: u32, percent: Percent, effective_rate: f64) -> f64 {
        f64::from(hours) * f64::from(percent.value()) / 100.0 * effective_rate
    }

    pub fn compute(model: &AllocationModel, rates: &RateCard) -> CostReport {
        let mut issues = Vec::new();
        let resolved: Vec<(ActorId, Option<f64>)> = rates
            .actors()
            .iter()
            .map(|actor| match effective_hourly_rate(actor) {
                Ok(rate) => (actor.id.clone(), Some(rate)),
                Err(issue) => {
                    warn!("跳过参与方 {}: {issue}", actor.id);
                    issues.push(issue);
                    (actor.id.clone(), None)
                }
            })
            .collect();

        let rows: Vec<ComputedRow> = model
            .tasks()
            .iter()
            .map(|task| {
                let mut costs = IndexMap::with_capacity(resolved.len());
                let mut total = 0.0;
                for (actor, rate) in &resolved {
                    let cost = match rate {
                        Some(rate) => Self::cost(task.hours, model.percent(&task.id, actor), *rate),
                        None => 0.0,
                    };
                    total += cost;
                    costs.insert(actor.clone(), cost);
                }
                ComputedRow {
                    task: task.id.clone(),
                    period: task.period.clone(),
                    hours: task.hours,
                    costs,
                    total,
                }
            })
            .collect();

        let aggregates = Aggregates::from_rows(model.periods(), rates, &rows);
        let warnings = model.allocation_warnings();

        debug!(
            "成本计算完成: {} 行, 总成本 {:.2}, {} 条分配提示",
            rows.len(),
            aggregates.grand_total,
            warnings.len()
        );

        CostReport {
            rows,
            aggregates,
            warnings,
            issues,
        }
    }
}

impl Aggregates {
    fn from_rows(periods: &[String], rates: &RateCard, rows: &[ComputedRow]) -> Self {
        let zero_by_actor: IndexMap<ActorId, f64> = rates
            .actors()
            .iter()
            .map(|actor| (actor.id.clone(), 0.0))
            .collect();

        let mut aggregates = Aggregates {
            by_period: periods.iter().map(|period| (period.clone(), 0.0)).collect(),
            by_actor: zero_by_actor.clone(),
            by_period_actor: periods
                .iter()
                .map(|period| (period.clone(), zero_by_actor.clone()))
                .collect(),
            by_team: IndexMap::new(),
            total_hours: 0,
            workstream_count: rows.len(),
            grand_total: 0.0,
        };
        for actor in rates.actors() {
            aggregates.by_team.entry(actor.team.clone()).or_insert(0.0);
        }

        for row in rows {
            aggregates.total_hours += u64::from(row.hours);
            aggregates.grand_total += row.total;
            *aggregates.by_period.entry(row.period.clone()).or_insert(0.0) += row.total;

            let period_actor = aggregates
                .by_period_actor
                .entry(row.period.clone())
                .or_insert_with(|| zero_by_actor.clone());
            for (actor, cost) in &row.costs {
                *aggregates.by_actor.entry(actor.clone()).or_insert(0.0) += cost;
                *period_actor.entry(actor.clone()).or_insert(0.0) += cost;
            }
        }

        for actor in rates.actors() {
            let actor_total = aggregates.by_actor.get(&actor.id).copied().unwrap_or(0.0);
            *aggregates.by_team.entry(actor.team.clone()).or_insert(0.0) += actor_total;
        }

        aggregates
    }

    /// 参与方占总成本的百分比
    pub fn actor_share(&self, actor: &ActorId) -> f64 {
        if self.grand_total > 0.0 {
            self.by_actor.get(actor).copied().unwrap_or(0.0) / self.grand_total * 100.0
        } else {
            0.0
        }
    }

    pub fn average_cost_per_hour(&self) -> f64 {
        if self.total_hours > 0 {
            self.grand_total / self.total_hours as f64
        } else {
            0.0
        }
    }

    pub fn average_cost_per_workstream(&self) -> f64 {
        if self.workstream_count > 0 {
            self.grand_total / self.workstream_count as f64
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use budget_core::models::{Actor, Pricing, Task};

    fn engine_inputs() -> (AllocationModel, RateCard) {
        let rates = RateCard::new(vec![
            Actor::new("ActorA", "A", Pricing::hourly(25.0)),
            Actor::new("Monthly", "M", Pricing::monthly(1000.0)),
        ]);
        let mut model = AllocationModel::new(vec!["P1".into(), "P2".into()], rates.actor_ids());
        model.add_task(Task::new("t1", "P1", 100)).unwrap();
        model.add_task(Task::new("t2", "P1", 0)).unwrap();
        model
            .set_percent(
                &TaskId::new("t1"),
                &ActorId::new("ActorA"),
                Percent::new(50).unwrap(),
            )
            .unwrap();
        model
            .set_percent(
                &TaskId::new("t1"),
                &ActorId::new("Monthly"),
                Percent::new(20).unwrap(),
            )
            .unwrap();
        model
            .set_percent(
                &TaskId::new("t2"),
                &ActorId::new("ActorA"),
                Percent::new(100).unwrap(),
            )
            .unwrap();
        (model, rates)
    }

    #[test]
    fn test_row_costs() {
        let (model, rates) = engine_inputs();
        let report = CostEngine::compute(&model, &rates);

        let row = &report.rows[0];
        assert_eq!(row.costs[&ActorId::new("ActorA")], 1250.0);
        assert_eq!(row.costs[&ActorId::new("Monthly")], 125.0);
        assert_eq!(row.total, 1375.0);

        // 工时为0的行仍保留每个参与方的列
        let idle = &report.rows[1];
        assert_eq!(idle.costs.len(), 2);
        assert_eq!(idle.costs[&ActorId::new("ActorA")], 0.0);
        assert_eq!(idle.total, 0.0);
    }

    #[test]
    fn test_aggregates() {
        let (model, rates) = engine_inputs();
        let aggregates = CostEngine::compute(&model, &rates).aggregates;

        assert_eq!(aggregates.by_period["P1"], 1375.0);
        assert_eq!(aggregates.by_period["P2"], 0.0);
        assert_eq!(aggregates.by_actor[&ActorId::new("ActorA")], 1250.0);
        assert_eq!(aggregates.by_team["M"], 125.0);
        assert_eq!(aggregates.by_period_actor["P1"][&ActorId::new("Monthly")], 125.0);
        assert_eq!(aggregates.total_hours, 100);
        assert_eq!(aggregates.grand_total, 1375.0);
        assert_eq!(aggregates.average_cost_per_hour(), 13.75);
        assert_eq!(aggregates.average_cost_per_workstream(), 687.5);
    }

    #[test]
    fn test_empty_totals_do_not_divide_by_zero() {
        let aggregates = Aggregates::default();
        assert_eq!(aggregates.average_cost_per_hour(), 0.0);
        assert_eq!(aggregates.average_cost_per_workstream(), 0.0);
        assert_eq!(aggregates.actor_share(&ActorId::new("x")), 0.0);
    }
}
