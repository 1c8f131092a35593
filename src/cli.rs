use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};
use tracing::{debug, info};

use budget_core::config::AppConfig;
use budget_core::models::InputSnapshot;
use budget_session::{Action, Notice, Session};

use crate::render;

/// 验证项目人力成本预算模拟器
#[derive(Parser, Debug)]
#[command(name = "budget")]
#[command(version = "1.0.0")]
#[command(about = "验证项目人力成本预算模拟器")]
#[command(long_about = "按工作流工时和参与方分配比例计算人力成本，并保存、比较和导入导出场景")]
pub struct CliApp {
    #[command(subcommand)]
    pub command: Commands,

    /// 配置文件路径，缺省时依次查找 budget.toml 和 config/budget.toml
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// 日志级别，覆盖配置文件
    #[arg(short, long, global = true, value_parser = ["trace", "debug", "info", "warn", "error"])]
    pub log_level: Option<String>,

    /// 日志格式，覆盖配置文件
    #[arg(long, global = true, value_parser = ["json", "pretty", "compact"])]
    pub log_format: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 按给定参数计算成本
    Compute {
        #[command(flatten)]
        inputs: InputArgs,
        /// 以JSON输出计算结果
        #[arg(long)]
        json: bool,
    },
    /// 显示参与方、时间段和全部参数键
    Catalog,
    /// 场景管理
    Scenario(ScenarioCommands),
}

/// 参数来源：参数文件和逐项覆盖
#[derive(Args, Debug, Default)]
pub struct InputArgs {
    /// 参数文件（键到值的JSON对象）
    #[arg(short, long, value_name = "FILE")]
    pub params: Option<PathBuf>,

    /// 单项参数，例如 --set 'hours::2. OAD=120'
    #[arg(short, long = "set", value_name = "KEY=VALUE")]
    pub overrides: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ScenarioCommands {
    /// 场景文件，缺省取配置中的 export.default_file
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub action: ScenarioActions,
}

#[derive(Subcommand, Debug)]
pub enum ScenarioActions {
    /// 计算并保存为场景，同名覆盖
    Save {
        name: String,
        #[command(flatten)]
        inputs: InputArgs,
    },
    /// 列出场景摘要
    List,
    /// 显示场景的参数和计算结果
    Show {
        name: String,
        #[arg(long)]
        json: bool,
    },
    /// 删除场景
    Delete { name: String },
    /// 恢复场景参数并重新计算
    Load {
        name: String,
        #[arg(long)]
        json: bool,
    },
    /// 合并导入另一个场景文件，同名覆盖
    Import { source: PathBuf },
    /// 把全部场景导出到指定文件
    Export { destination: PathBuf },
}

impl CliApp {
    pub fn run(self, config: AppConfig) -> Result<()> {
        match self.command {
            Commands::Compute { inputs, json } => compute(&config, &inputs, json),
            Commands::Catalog => catalog(&config),
            Commands::Scenario(scenario) => handle_scenario_commands(scenario, &config),
        }
    }
}

fn compute(config: &AppConfig, inputs: &InputArgs, as_json: bool) -> Result<()> {
    let mut session = Session::from_config(config)?;
    apply_input_args(&mut session, inputs)?;
    let report = session.run_cycle()?;

    if as_json {
        let output = json!({
            "rows": report.rows,
            "aggregates": report.aggregates,
            "insights": report.insights(),
            "warnings": report.warnings,
            "issues": report.issues,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        render::print_report(report);
    }
    Ok(())
}

fn catalog(config: &AppConfig) -> Result<()> {
    let session = Session::from_config(config)?;
    render::print_catalog(session.program(), session.parameters());
    Ok(())
}

fn handle_scenario_commands(commands: ScenarioCommands, config: &AppConfig) -> Result<()> {
    let path = commands
        .file
        .unwrap_or_else(|| PathBuf::from(&config.export.default_file));
    let mut session = open_session(config, &path)?;

    match commands.action {
        ScenarioActions::Save { name, inputs } => {
            apply_input_args(&mut session, &inputs)?;
            session.run_cycle()?;
            finish(session.handle(Action::Save { name }))?;
            persist(&mut session, &path)?;
        }
        ScenarioActions::List => render::print_scenario_list(session.scenarios()),
        ScenarioActions::Show { name, json } => {
            let scenario = session.scenarios().get(&name)?;
            if json {
                println!("{}", serde_json::to_string_pretty(scenario)?);
            } else {
                render::print_scenario(&name, scenario);
            }
        }
        ScenarioActions::Delete { name } => {
            finish(session.handle(Action::Delete { name }))?;
            persist(&mut session, &path)?;
        }
        ScenarioActions::Load { name, json } => {
            finish(session.handle(Action::RequestLoad { name }))?;
            session.run_cycle()?;
            if let Some(notice) = session.take_notice() {
                eprintln!("{notice}");
            }
            if let Some(report) = session.report() {
                if json {
                    println!("{}", serde_json::to_string_pretty(report)?);
                } else {
                    render::print_report(report);
                }
            }
        }
        ScenarioActions::Import { source } => {
            let document = fs::read_to_string(&source)
                .with_context(|| format!("读取导入文件失败: {}", source.display()))?;
            finish(session.handle(Action::Import { document }))?;
            persist(&mut session, &path)?;
        }
        ScenarioActions::Export { destination } => {
            finish(session.handle(Action::Export { path: destination }))?;
        }
    }
    Ok(())
}

/// 打开会话并读入已有的场景文件
fn open_session(config: &AppConfig, path: &Path) -> Result<Session> {
    let mut session = Session::from_config(config)?;
    if path.exists() {
        let document = fs::read_to_string(path)
            .with_context(|| format!("读取场景文件失败: {}", path.display()))?;
        let report = session
            .import_document(&document)
            .map_err(|e| anyhow!(e.user_message()))
            .with_context(|| format!("场景文件无效: {}", path.display()))?;
        debug!("已读入 {} 个场景: {}", report.count(), path.display());
    } else {
        info!("场景文件不存在，将在保存时创建: {}", path.display());
    }
    Ok(session)
}

fn persist(session: &mut Session, path: &Path) -> Result<()> {
    finish(session.handle(Action::Export {
        path: path.to_path_buf(),
    }))
    .map(|_| ())
}

/// 打印操作提示，错误提示转为退出错误
fn finish(notice: Notice) -> Result<Notice> {
    if notice.is_error() {
        bail!("{}", notice.message());
    }
    eprintln!("{notice}");
    Ok(notice)
}

fn apply_input_args(session: &mut Session, inputs: &InputArgs) -> Result<()> {
    if let Some(path) = &inputs.params {
        let document = fs::read_to_string(path)
            .with_context(|| format!("读取参数文件失败: {}", path.display()))?;
        let snapshot: InputSnapshot = serde_json::from_str(&document)
            .with_context(|| format!("参数文件必须是键到值的JSON对象: {}", path.display()))?;
        let report = session.apply_inputs(&snapshot);
        info!(
            "参数文件已应用: {} 项, 忽略 {} 项, 拒绝 {} 项",
            report.applied.len(),
            report.ignored.len(),
            report.rejected.len()
        );
        for (key, reason) in &report.rejected {
            eprintln!("[warning] {key}: {reason}");
        }
    }

    for entry in &inputs.overrides {
        let (key, value) = parse_override(entry)?;
        finish(session.handle(Action::SetParameter { key, value }))?;
    }
    Ok(())
}

/// `KEY=VALUE`，值按JSON解析，解析失败时视为字符串
fn parse_override(entry: &str) -> Result<(String, Value)> {
    let (key, raw) = entry
        .rsplit_once('=')
        .ok_or_else(|| anyhow!("参数格式应为 KEY=VALUE: {entry}"))?;
    let value = serde_json::from_str(raw.trim()).unwrap_or_else(|_| Value::from(raw.trim()));
    Ok((key.trim().to_string(), value))
}
