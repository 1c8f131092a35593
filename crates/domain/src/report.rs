use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use budget_core::models::{
    DataFrame, ScenarioSummary, HOURS_COLUMN, PERIOD_COLUMN, TOTAL_COLUMN, WORKSTREAM_COLUMN,
};
use budget_core::SaveError;

use crate::cost_engine::{ComputedRow, CostReport};

/// 汇总区展示的关键指标
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub workstreams: usize,
    pub total_hours: u64,
    pub total_cost: f64,
    pub average_cost_per_hour: f64,
    pub average_cost_per_workstream: f64,
    pub team_totals: IndexMap<String, f64>,
    /// 各参与方占总成本的百分比
    pub actor_shares: IndexMap<String, f64>,
}

impl CostReport {
    /// 列顺序: Period, Workstream, Hours, 各参与方, Total
    pub fn columns(&self) -> Vec<String> {
        let mut columns = vec![
            PERIOD_COLUMN.to_string(),
            WORKSTREAM_COLUMN.to_string(),
            HOURS_COLUMN.to_string(),
        ];
        columns.extend(
            self.aggregates
                .by_actor
                .keys()
                .map(|actor| actor.to_string()),
        );
        columns.push(TOTAL_COLUMN.to_string());
        columns
    }

    pub fn to_frame(&self) -> DataFrame {
        let mut frame = DataFrame::new(self.columns());
        for row in &self.rows {
            let mut values = Vec::with_capacity(frame.columns.len());
            values.push(Value::from(row.period.as_str()));
            values.push(Value::from(row.task.as_str()));
            values.push(Value::from(row.hours));
            for actor in self.aggregates.by_actor.keys() {
                values.push(Value::from(row.costs.get(actor).copied().unwrap_or(0.0)));
            }
            values.push(Value::from(row.total));
            frame.push_row(values);
        }
        frame
    }

    pub fn actor_totals(&self) -> IndexMap<String, f64> {
        self.aggregates
            .by_actor
            .iter()
            .map(|(actor, total)| (actor.to_string(), *total))
            .collect()
    }

    /// 与保存场景时使用同一套校验
    pub fn summary(&self) -> Result<ScenarioSummary, SaveError> {
        ScenarioSummary::from_frame(&self.to_frame())
    }

    pub fn rows_for_period<'a>(
        &'a self,
        period: &'a str,
    ) -> impl Iterator<Item = &'a ComputedRow> + 'a {
        self.rows.iter().filter(move |row| row.period == period)
    }

    pub fn insights(&self) -> Insights {
        let aggregates = &self.aggregates;
        Insights {
            workstreams: aggregates.workstream_count,
            total_hours: aggregates.total_hours,
            total_cost: aggregates.grand_total,
            average_cost_per_hour: aggregates.average_cost_per_hour(),
            average_cost_per_workstream: aggregates.average_cost_per_workstream(),
            team_totals: aggregates.by_team.clone(),
            actor_shares: aggregates
                .by_actor
                .keys()
                .map(|actor| (actor.to_string(), aggregates.actor_share(actor)))
                .collect(),
        }
    }
}
