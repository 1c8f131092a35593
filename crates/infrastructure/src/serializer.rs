//! 场景集合的JSON导出与合并导入
//!
//! 导出格式是以场景名称为键的对象，每个场景包含 `inputs`、
//! split 布局的 `dataframe`、`actor_totals` 和 `summary`。
//! 导入先完整解析和校验，全部通过后才写入存储。

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info, warn};

use budget_core::models::Scenario;
use budget_core::{BudgetError, BudgetResult, ImportError};

use crate::scenario_store::ScenarioStore;

/// 一次导入的结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    /// 按文件顺序导入的全部场景
    pub imported: Vec<String>,
    /// 其中覆盖了已有同名场景的
    pub replaced: Vec<String>,
}

impl ImportReport {
    pub fn count(&self) -> usize {
        self.imported.len()
    }
}

pub struct Serializer;

impl Serializer {
    pub fn export(store: &ScenarioStore, pretty: bool) -> BudgetResult<String> {
        let document = if pretty {
            serde_json::to_string_pretty(store.scenarios())?
        } else {
            serde_json::to_string(store.scenarios())?
        };
        debug!("导出 {} 个场景, {} 字节", store.len(), document.len());
        Ok(document)
    }

    /// 解析并校验文档，不接触任何存储
    pub fn parse(document: &str) -> Result<IndexMap<String, Scenario>, ImportError> {
        let value: Value =
            serde_json::from_str(document).map_err(|e| ImportError::Parse(e.to_string()))?;
        let entries = match value {
            Value::Object(entries) => entries,
            other => {
                return Err(ImportError::NotAnObject {
                    found: json_kind(&other),
                })
            }
        };

        let mut scenarios = IndexMap::with_capacity(entries.len());
        for (name, payload) in entries {
            if name.trim().is_empty() {
                return Err(ImportError::InvalidScenario {
                    name,
                    reason: "场景名称为空".to_string(),
                });
            }
            let scenario: Scenario = match serde_json::from_value(payload) {
                Ok(scenario) => scenario,
                Err(e) => {
                    return Err(ImportError::InvalidScenario {
                        name,
                        reason: e.to_string(),
                    })
                }
            };
            if !scenario.dataframe.is_well_formed() {
                return Err(ImportError::InvalidScenario {
                    name,
                    reason: "dataframe 的列、索引与行数据长度不一致".to_string(),
                });
            }
            scenarios.insert(name, scenario);
        }
        Ok(scenarios)
    }

    /// 合并导入：同名覆盖，失败时存储保持原样
    pub fn import(document: &str, store: &mut ScenarioStore) -> Result<ImportReport, ImportError> {
        let scenarios = Self::parse(document).inspect_err(|e| warn!("导入被拒绝: {e}"))?;
        let imported: Vec<String> = scenarios.keys().cloned().collect();
        let replaced = store.merge(scenarios);
        info!(
            "导入 {} 个场景 (覆盖 {} 个), 当前共 {} 个",
            imported.len(),
            replaced.len(),
            store.len()
        );
        Ok(ImportReport { imported, replaced })
    }

    pub fn export_to_path(store: &ScenarioStore, path: &Path, pretty: bool) -> BudgetResult<()> {
        let document = Self::export(store, pretty)?;
        fs::write(path, document)
            .map_err(|e| BudgetError::Io(format!("{}: {e}", path.display())))?;
        info!("场景已导出到 {}", path.display());
        Ok(())
    }

    pub fn import_from_path(path: &Path, store: &mut ScenarioStore) -> BudgetResult<ImportReport> {
        let document = fs::read_to_string(path)
            .map_err(|e| BudgetError::Io(format!("{}: {e}", path.display())))?;
        Ok(Self::import(&document, store)?)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "布尔值",
        Value::Number(_) => "数字",
        Value::String(_) => "字符串",
        Value::Array(_) => "数组",
        Value::Object(_) => "对象",
    }
}
