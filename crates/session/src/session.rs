//! 计算周期驱动
//!
//! 会话显式持有参数面板、场景存储和恢复器。每个周期先执行 `drain`，
//! 再以只读方式组装分配模型并计算；参数只能在周期之间修改。

use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use budget_core::config::{AppConfig, ProgramConfig};
use budget_core::models::{InputSnapshot, ParameterKey, ParameterValue, Scenario};
use budget_core::{BudgetError, BudgetResult, ParameterSurface, SaveError};
use budget_domain::{
    apply_snapshot, AllocationModel, ApplyReport, CostEngine, CostReport, ParameterStore, RateCard,
};
use budget_infrastructure::{ImportReport, SaveOutcome, ScenarioStore, Serializer};

use crate::loader::ScenarioLoader;
use crate::notice::{Action, Notice};

/// 最近一个周期的输入与结果
#[derive(Debug, Clone)]
struct CycleResult {
    inputs: InputSnapshot,
    report: CostReport,
}

#[derive(Debug, Clone)]
pub struct Session {
    program: ProgramConfig,
    parameters: ParameterStore,
    scenarios: ScenarioStore,
    loader: ScenarioLoader,
    last_cycle: Option<CycleResult>,
    rerun_requested: bool,
    pretty_export: bool,
}

impl Session {
    pub fn new(program: ProgramConfig) -> BudgetResult<Self> {
        program.validate()?;
        let parameters = ParameterStore::from_program(&program);
        info!(
            "会话已创建: {} 个参与方, {} 个时间段, {} 个参数",
            program.actors.len(),
            program.periods.len(),
            parameters.len()
        );
        Ok(Self {
            program,
            parameters,
            scenarios: ScenarioStore::new(),
            loader: ScenarioLoader::new(),
            last_cycle: None,
            rerun_requested: false,
            pretty_export: true,
        })
    }

    pub fn from_config(config: &AppConfig) -> BudgetResult<Self> {
        let mut session = Self::new(config.program.clone())?;
        session.pretty_export = config.export.pretty;
        Ok(session)
    }

    pub fn program(&self) -> &ProgramConfig {
        &self.program
    }

    pub fn parameters(&self) -> &ParameterStore {
        &self.parameters
    }

    pub fn scenarios(&self) -> &ScenarioStore {
        &self.scenarios
    }

    pub fn loader(&self) -> &ScenarioLoader {
        &self.loader
    }

    pub fn report(&self) -> Option<&CostReport> {
        self.last_cycle.as_ref().map(|cycle| &cycle.report)
    }

    pub fn rerun_requested(&self) -> bool {
        self.rerun_requested
    }

    /// 运行一个计算周期
    ///
    /// 待处理的场景恢复在读取任何参数之前写入面板。
    pub fn run_cycle(&mut self) -> BudgetResult<&CostReport> {
        self.rerun_requested = false;
        self.loader.drain(&mut self.parameters);

        let parameters = &self.parameters;
        let model = AllocationModel::assemble(&self.program, parameters)?;
        let rates = RateCard::assemble(&self.program, parameters);
        let report = CostEngine::compute(&model, &rates);
        debug!(
            "周期完成: {} 行, 总成本 {:.2}",
            report.rows.len(),
            report.aggregates.grand_total
        );

        let cycle = self.last_cycle.insert(CycleResult {
            inputs: parameters.snapshot(),
            report,
        });
        Ok(&cycle.report)
    }

    /// 上一次恢复的一次性提示
    pub fn take_notice(&mut self) -> Option<Notice> {
        let report = self.loader.take_notice()?;
        let notice = match report.error() {
            None => Notice::Loaded(format!(
                "已加载场景 '{}' ({} 项参数)",
                report.scenario,
                report.apply.applied.len()
            )),
            Some(e) => Notice::Warning(e.to_string()),
        };
        Some(notice)
    }

    pub fn set_parameter(&mut self, key: &ParameterKey, value: ParameterValue) -> BudgetResult<()> {
        self.parameters.set(key, value)?;
        self.rerun_requested = true;
        Ok(())
    }

    /// 按原始键名和JSON值修改参数
    pub fn set_raw_parameter(&mut self, raw_key: &str, raw_value: &Value) -> BudgetResult<ParameterKey> {
        let key = self
            .parameters
            .resolve_key(raw_key)
            .filter(|key| self.parameters.contains(key))
            .ok_or_else(|| BudgetError::unknown_parameter(raw_key))?;
        let value = key.coerce(raw_value)?;
        self.set_parameter(&key, value)?;
        Ok(key)
    }

    /// 批量写入参数文件中的值，立即生效
    pub fn apply_inputs(&mut self, inputs: &InputSnapshot) -> ApplyReport {
        let report = apply_snapshot(&mut self.parameters, inputs);
        if !report.applied.is_empty() {
            self.rerun_requested = true;
        }
        report
    }

    /// 以最近一个周期的输入和结果保存场景
    pub fn save_scenario(&mut self, name: &str) -> BudgetResult<SaveOutcome> {
        let cycle = self.last_cycle.as_ref().ok_or(SaveError::NoComputedRows)?;
        if name.trim().is_empty() {
            return Err(SaveError::BlankName.into());
        }
        let summary = cycle.report.summary()?;
        let scenario = Scenario::new(cycle.inputs.clone(), cycle.report.to_frame(), summary)
            .with_actor_totals(cycle.report.actor_totals());
        Ok(self.scenarios.save_scenario(name, scenario)?)
    }

    pub fn delete_scenario(&mut self, name: &str) -> BudgetResult<Scenario> {
        let removed = self.scenarios.delete(name)?;
        self.rerun_requested = true;
        Ok(removed)
    }

    /// 登记恢复请求，参数在下一个周期开始时才会变化
    pub fn request_load(&mut self, name: &str) -> BudgetResult<()> {
        self.loader.request_load(&self.scenarios, name)?;
        self.rerun_requested = true;
        Ok(())
    }

    pub fn import_document(&mut self, document: &str) -> BudgetResult<ImportReport> {
        Ok(Serializer::import(document, &mut self.scenarios)?)
    }

    pub fn export_document(&self) -> BudgetResult<String> {
        Serializer::export(&self.scenarios, self.pretty_export)
    }

    pub fn export_to_path(&self, path: &Path) -> BudgetResult<()> {
        Serializer::export_to_path(&self.scenarios, path, self.pretty_export)
    }

    /// 在操作边界捕获所有错误，转换为单行提示
    pub fn handle(&mut self, action: Action) -> Notice {
        let result = match action {
            Action::SetParameter { key, value } => self
                .set_raw_parameter(&key, &value)
                .map(|key| Notice::Info(format!("参数 {key} 已更新"))),
            Action::Save { name } => self.save_scenario(&name).map(|outcome| match outcome {
                SaveOutcome::Created => Notice::Success(format!("场景 '{name}' 已保存")),
                SaveOutcome::Replaced => Notice::Success(format!("场景 '{name}' 已覆盖")),
            }),
            Action::Delete { name } => self
                .delete_scenario(&name)
                .map(|_| Notice::Success(format!("场景 '{name}' 已删除"))),
            Action::RequestLoad { name } => self
                .request_load(&name)
                .map(|()| Notice::Info(format!("场景 '{name}' 将在下一次计算前加载"))),
            Action::Import { document } => self.import_document(&document).map(|report| {
                Notice::Success(format!(
                    "已导入 {} 个场景, 覆盖 {} 个",
                    report.count(),
                    report.replaced.len()
                ))
            }),
            Action::Export { path } => self.export_to_path(&path).map(|()| {
                Notice::Success(format!(
                    "已导出 {} 个场景到 {}",
                    self.scenarios.len(),
                    path.display()
                ))
            }),
        };

        result.unwrap_or_else(|e| {
            debug!("操作失败: {e:?}");
            Notice::Error(e.user_message())
        })
    }
}
