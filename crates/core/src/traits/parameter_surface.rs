use crate::errors::BudgetResult;
use crate::models::{ParameterKey, ParameterValue};

/// 参数面板的键值契约
///
/// 面板在每个计算周期内被读取；写入只能发生在周期开始之前
/// （场景恢复）或两个周期之间（用户编辑）。
pub trait ParameterSurface {
    /// 面板是否识别该参数
    fn contains(&self, key: &ParameterKey) -> bool;

    fn get(&self, key: &ParameterKey) -> Option<ParameterValue>;

    /// 写入已识别的参数，未知参数或类型不匹配时报错
    fn set(&mut self, key: &ParameterKey, value: ParameterValue) -> BudgetResult<()>;

    /// 所有已识别参数，按面板顺序
    fn keys(&self) -> Vec<ParameterKey>;

    /// 将快照中的字符串键解析为参数键
    fn resolve_key(&self, raw: &str) -> Option<ParameterKey>;
}
