use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::parameter::InputSnapshot;
use crate::errors::SaveError;

pub const PERIOD_COLUMN: &str = "Period";
pub const WORKSTREAM_COLUMN: &str = "Workstream";
pub const HOURS_COLUMN: &str = "Hours";
pub const TOTAL_COLUMN: &str = "Total";

/// split 布局的表格：列名、行索引、行数据三个并列列表
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataFrame {
    pub columns: Vec<String>,
    pub index: Vec<usize>,
    pub data: Vec<Vec<Value>>,
}

impl DataFrame {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            index: Vec::new(),
            data: Vec::new(),
        }
    }

    /// 追加一行，行索引从 1 开始
    pub fn push_row(&mut self, row: Vec<Value>) {
        self.index.push(self.data.len() + 1);
        self.data.push(row);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 每行宽度与列数一致，索引与行数一致
    pub fn is_well_formed(&self) -> bool {
        self.index.len() == self.data.len()
            && self.data.iter().all(|row| row.len() == self.columns.len())
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// 数值列求和，缺列或出现非数值时报错
    pub fn numeric_sum(&self, name: &str) -> Result<f64, SaveError> {
        let position = self
            .column_position(name)
            .ok_or_else(|| SaveError::MissingColumn {
                column: name.to_string(),
            })?;
        let mut sum = 0.0;
        for (row_number, row) in self.data.iter().enumerate() {
            let value = row
                .get(position)
                .and_then(Value::as_f64)
                .filter(|value| value.is_finite())
                .ok_or_else(|| SaveError::InvalidValue {
                    row: row_number + 1,
                    column: name.to_string(),
                })?;
            sum += value;
        }
        Ok(sum)
    }
}

/// 场景摘要，列表展示时只读取这一部分
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub total_workstreams: usize,
    pub total_hours: f64,
    pub total_cost: f64,
}

impl ScenarioSummary {
    /// 从计算结果表生成摘要，同时校验表格是否可保存
    pub fn from_frame(frame: &DataFrame) -> Result<Self, SaveError> {
        if frame.is_empty() {
            return Err(SaveError::NoComputedRows);
        }
        let total_hours = frame.numeric_sum(HOURS_COLUMN)?;
        let total_cost = frame.numeric_sum(TOTAL_COLUMN)?;
        Ok(Self {
            total_workstreams: frame.len(),
            total_hours,
            total_cost,
        })
    }
}

/// 已保存的场景：参数快照 + 计算结果 + 摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub inputs: InputSnapshot,
    pub dataframe: DataFrame,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub actor_totals: IndexMap<String, f64>,
    pub summary: ScenarioSummary,
}

impl Scenario {
    pub fn new(inputs: InputSnapshot, dataframe: DataFrame, summary: ScenarioSummary) -> Self {
        Self {
            inputs,
            dataframe,
            actor_totals: IndexMap::new(),
            summary,
        }
    }

    pub fn with_actor_totals(mut self, actor_totals: IndexMap<String, f64>) -> Self {
        self.actor_totals = actor_totals;
        self
    }
}
