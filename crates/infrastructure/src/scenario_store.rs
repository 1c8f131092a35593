//! 会话内的场景存储
//!
//! 场景按名称精确匹配（不做大小写或空白归一化），按首次保存的顺序列出。
//! 每个操作要么完整生效，要么不修改存储。

use indexmap::IndexMap;
use tracing::{debug, info};

use budget_core::models::{DataFrame, InputSnapshot, Scenario, ScenarioSummary};
use budget_core::{BudgetError, BudgetResult, DeleteError, SaveError};

/// 保存结果：新建还是覆盖了同名场景
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Created,
    Replaced,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenarioStore {
    scenarios: IndexMap<String, Scenario>,
}

impl ScenarioStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.scenarios.contains_key(name)
    }

    /// 保存参数快照和计算结果，同名场景被整体替换
    pub fn save(
        &mut self,
        name: &str,
        inputs: InputSnapshot,
        dataframe: DataFrame,
        summary: ScenarioSummary,
    ) -> Result<SaveOutcome, SaveError> {
        self.save_scenario(name, Scenario::new(inputs, dataframe, summary))
    }

    pub fn save_scenario(&mut self, name: &str, scenario: Scenario) -> Result<SaveOutcome, SaveError> {
        Self::validate(name, &scenario)?;

        let outcome = match self.scenarios.insert(name.to_string(), scenario) {
            Some(_) => SaveOutcome::Replaced,
            None => SaveOutcome::Created,
        };
        info!("场景已保存: {name} ({outcome:?}), 当前共 {} 个", self.scenarios.len());
        Ok(outcome)
    }

    fn validate(name: &str, scenario: &Scenario) -> Result<(), SaveError> {
        if name.trim().is_empty() {
            return Err(SaveError::BlankName);
        }
        // 行数据过短时由数值列校验报告
        ScenarioSummary::from_frame(&scenario.dataframe)?;
        Ok(())
    }

    pub fn delete(&mut self, name: &str) -> Result<Scenario, DeleteError> {
        let removed = self
            .scenarios
            .shift_remove(name)
            .ok_or_else(|| DeleteError::NotFound {
                name: name.to_string(),
            })?;
        info!("场景已删除: {name}, 剩余 {} 个", self.scenarios.len());
        Ok(removed)
    }

    /// 名称到摘要的只读视图，不复制计算结果表
    pub fn list(&self) -> impl Iterator<Item = (&str, &ScenarioSummary)> + '_ {
        self.scenarios
            .iter()
            .map(|(name, scenario)| (name.as_str(), &scenario.summary))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.scenarios.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> BudgetResult<&Scenario> {
        self.scenarios
            .get(name)
            .ok_or_else(|| BudgetError::scenario_not_found(name))
    }

    pub fn scenarios(&self) -> &IndexMap<String, Scenario> {
        &self.scenarios
    }

    /// 合并一批已校验的场景，同名覆盖；返回被覆盖的名称
    pub fn merge(&mut self, incoming: IndexMap<String, Scenario>) -> Vec<String> {
        let mut replaced = Vec::new();
        for (name, scenario) in incoming {
            if self.scenarios.insert(name.clone(), scenario).is_some() {
                replaced.push(name);
            }
        }
        debug!("合并完成, 覆盖 {} 个, 当前共 {} 个", replaced.len(), self.scenarios.len());
        replaced
    }
}
