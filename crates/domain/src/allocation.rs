use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use budget_core::config::ProgramConfig;
use budget_core::models::{
    ActorId, AllocationKey, ParameterKey, ParameterValue, Percent, Task, TaskId,
};
use budget_core::{BudgetError, BudgetResult, ParameterSurface};

/// 分配总和超过100%的提示，不阻止计算
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationWarning {
    pub task: TaskId,
    pub total_percent: u32,
}

impl fmt::Display for AllocationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "工作流 {} 的分配总和为 {}%，超过100%，请调整",
            self.task, self.total_percent
        )
    }
}

/// 工作流、时间段、参与方及其分配比例
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllocationModel {
    periods: Vec<String>,
    actors: Vec<ActorId>,
    tasks: Vec<Task>,
    splits: HashMap<AllocationKey, Percent>,
}

impl AllocationModel {
    pub fn new(periods: Vec<String>, actors: Vec<ActorId>) -> Self {
        Self {
            periods,
            actors,
            tasks: Vec::new(),
            splits: HashMap::new(),
        }
    }

    /// 从参数面板组装模型，面板上缺失的参数按0处理
    pub fn assemble<S>(program: &ProgramConfig, surface: &S) -> BudgetResult<Self>
    where
        S: ParameterSurface + ?Sized,
    {
        let periods = program
            .period_labels()
            .into_iter()
            .map(str::to_string)
            .collect();
        let actors: Vec<ActorId> = program.actors.iter().map(|actor| actor.id.clone()).collect();
        let mut model = Self::new(periods, actors.clone());

        for (period, task_id) in program.workstreams() {
            let hours = match surface.get(&ParameterKey::Hours(task_id.clone())) {
                Some(ParameterValue::Hours(hours)) => hours,
                _ => 0,
            };
            model.add_task(Task {
                id: task_id.clone(),
                period: period.label.clone(),
                hours,
            })?;

            for actor in &actors {
                let key = ParameterKey::Percent(task_id.clone(), actor.clone());
                if let Some(ParameterValue::Percent(percent)) = surface.get(&key) {
                    model.set_percent(&task_id, actor, percent)?;
                }
            }
        }

        debug!(
            "组装分配模型: {} 个时间段, {} 个工作流, {} 个参与方",
            model.periods.len(),
            model.tasks.len(),
            model.actors.len()
        );
        Ok(model)
    }

    pub fn add_task(&mut self, task: Task) -> BudgetResult<()> {
        if !self.periods.iter().any(|period| period == &task.period) {
            return Err(BudgetError::invalid_parameter(
                task.id.to_string(),
                format!("未知时间段: {}", task.period),
            ));
        }
        if self.task(&task.id).is_some() {
            return Err(BudgetError::invalid_parameter(
                task.id.to_string(),
                "工作流重复",
            ));
        }
        self.tasks.push(task);
        Ok(())
    }

    pub fn set_percent(
        &mut self,
        task: &TaskId,
        actor: &ActorId,
        percent: Percent,
    ) -> BudgetResult<()> {
        if self.task(task).is_none() {
            return Err(BudgetError::unknown_parameter(task.to_string()));
        }
        if !self.actors.contains(actor) {
            return Err(BudgetError::unknown_parameter(actor.to_string()));
        }
        let key = AllocationKey::new(task.clone(), actor.clone());
        if percent == Percent::ZERO {
            self.splits.remove(&key);
        } else {
            self.splits.insert(key, percent);
        }
        Ok(())
    }

    /// 未登记的 (工作流, 参与方) 组合视为0
    pub fn percent(&self, task: &TaskId, actor: &ActorId) -> Percent {
        match self.splits.get(&AllocationKey::new(task.clone(), actor.clone())) {
            Some(percent) => *percent,
            None => Percent::ZERO,
        }
    }

    pub fn percent_total(&self, task: &TaskId) -> u32 {
        self.actors
            .iter()
            .map(|actor| u32::from(self.percent(task, actor).value()))
            .sum()
    }

    /// 每个超过100%的工作流产生一条提示
    pub fn allocation_warnings(&self) -> Vec<AllocationWarning> {
        self.tasks
            .iter()
            .filter_map(|task| {
                let total_percent = self.percent_total(&task.id);
                (total_percent > 100).then(|| {
                    let warning = AllocationWarning {
                        task: task.id.clone(),
                        total_percent,
                    };
                    warn!("{warning}");
                    warning
                })
            })
            .collect()
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn periods(&self) -> &[String] {
        &self.periods
    }

    pub fn actors(&self) -> &[ActorId] {
        &self.actors
    }
}
