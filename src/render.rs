//! 终端表格输出

use serde_json::Value;

use budget_core::config::ProgramConfig;
use budget_core::models::Scenario;
use budget_core::ParameterSurface;
use budget_domain::{CostReport, ParameterStore};
use budget_infrastructure::ScenarioStore;

const WORKSTREAM_WIDTH: usize = 40;
const NUMBER_WIDTH: usize = 12;

fn money(value: f64) -> String {
    format!("${value:.2}")
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut short: String = text.chars().take(width.saturating_sub(1)).collect();
        short.push('…');
        short
    }
}

pub fn print_report(report: &CostReport) {
    let actors: Vec<String> = report
        .aggregates
        .by_actor
        .keys()
        .map(|actor| actor.to_string())
        .collect();

    let mut header = format!(
        "{:<20} {:<width$} {:>8}",
        "时间段",
        "工作流",
        "工时",
        width = WORKSTREAM_WIDTH
    );
    for actor in &actors {
        header.push_str(&format!(" {:>NUMBER_WIDTH$}", truncate(actor, NUMBER_WIDTH)));
    }
    header.push_str(&format!(" {:>NUMBER_WIDTH$}", "合计"));
    println!("{header}");
    println!("{}", "-".repeat(header.chars().count()));

    let aggregates = &report.aggregates;
    for (period, period_total) in &aggregates.by_period {
        for row in report.rows_for_period(period) {
            let mut line = format!(
                "{:<20} {:<width$} {:>8}",
                truncate(&row.period, 20),
                truncate(row.task.as_str(), WORKSTREAM_WIDTH),
                row.hours,
                width = WORKSTREAM_WIDTH
            );
            for cost in row.costs.values() {
                line.push_str(&format!(" {:>NUMBER_WIDTH$}", money(*cost)));
            }
            line.push_str(&format!(" {:>NUMBER_WIDTH$}", money(row.total)));
            println!("{line}");
        }
        let subtotal = format!("{period} 小计: {}", money(*period_total));
        println!("{subtotal:>width$}", width = header.chars().count());
    }

    println!();
    println!("按时间段:");
    for (period, total) in &aggregates.by_period {
        println!("  {period:<24} {:>14}", money(*total));
    }
    println!("按参与方:");
    for (actor, total) in &aggregates.by_actor {
        println!(
            "  {:<24} {:>14} ({:.1}%)",
            actor.as_str(),
            money(*total),
            aggregates.actor_share(actor)
        );
    }
    println!("按团队:");
    for (team, total) in &aggregates.by_team {
        println!("  {team:<24} {:>14}", money(*total));
    }

    let insights = report.insights();
    println!();
    println!("工作流数: {}", insights.workstreams);
    println!("总工时: {}", insights.total_hours);
    println!("总成本: {}", money(insights.total_cost));
    println!("平均每小时成本: {}", money(insights.average_cost_per_hour));
    println!("平均每个工作流成本: {}", money(insights.average_cost_per_workstream));

    for warning in &report.warnings {
        println!("[warning] {warning}");
    }
    for issue in &report.issues {
        println!("[warning] {issue}");
    }
}

pub fn print_catalog(program: &ProgramConfig, parameters: &ParameterStore) {
    println!("{:<12} {:<10} {:<18} {:>12} {:>10}", "参与方", "团队", "计价方式", "金额", "折算工时");
    println!("{}", "-".repeat(66));
    for actor in &program.actors {
        let prorating = actor
            .pricing
            .prorating_hours()
            .map(|hours| format!("{hours}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<12} {:<10} {:<18} {:>12} {:>10}",
            actor.id.as_str(),
            actor.team,
            actor.pricing.mode().as_str(),
            money(actor.pricing.amount()),
            prorating
        );
    }

    println!();
    for period in &program.periods {
        println!("{}:", period.label);
        for workstream in &period.workstreams {
            println!("  {workstream}");
        }
    }

    println!();
    println!("参数键 ({} 个):", parameters.len());
    for key in parameters.keys() {
        let value = parameters
            .get(&key)
            .map(|value| value.to_json().to_string())
            .unwrap_or_default();
        println!("  {key} = {value}");
    }
}

pub fn print_scenario_list(store: &ScenarioStore) {
    if store.is_empty() {
        println!("暂无已保存的场景");
        return;
    }
    println!("{:<24} {:>10} {:>12} {:>16}", "场景", "工作流数", "总工时", "总成本");
    println!("{}", "-".repeat(66));
    for (name, summary) in store.list() {
        println!(
            "{:<24} {:>10} {:>12} {:>16}",
            truncate(name, 24),
            summary.total_workstreams,
            summary.total_hours,
            money(summary.total_cost)
        );
    }
}

pub fn print_scenario(name: &str, scenario: &Scenario) {
    println!("场景: {name}");
    println!("  工作流数: {}", scenario.summary.total_workstreams);
    println!("  总工时: {}", scenario.summary.total_hours);
    println!("  总成本: {}", money(scenario.summary.total_cost));

    if !scenario.actor_totals.is_empty() {
        println!("  参与方成本:");
        for (actor, total) in &scenario.actor_totals {
            println!("    {actor:<20} {:>14}", money(*total));
        }
    }

    println!("  非零参数:");
    for (key, value) in &scenario.inputs {
        let is_zero = value.as_f64().is_some_and(|number| number == 0.0);
        if !is_zero && !value.is_null() {
            println!("    {key} = {value}");
        }
    }

    println!("  计算结果:");
    println!("    {}", scenario.dataframe.columns.join(" | "));
    for (index, row) in scenario.dataframe.index.iter().zip(&scenario.dataframe.data) {
        let cells: Vec<String> = row.iter().map(cell).collect();
        println!("    {index}: {}", cells.join(" | "));
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => match number.as_f64() {
            Some(float) if !number.is_i64() && !number.is_u64() => format!("{float:.2}"),
            _ => number.to_string(),
        },
        other => other.to_string(),
    }
}
