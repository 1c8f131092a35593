//! 命令行端到端测试：每条命令都在临时目录中运行真实的二进制

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

fn budget(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_budget"))
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .args(["--log-level", "error"])
        .args(args)
        .output()
        .expect("无法启动 budget")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_compute_json_output() {
    let dir = TempDir::new().unwrap();
    let output = budget(
        dir.path(),
        &[
            "compute",
            "--json",
            "--set",
            "hours::2. OAD=100",
            "--set",
            "percent::2. OAD::SAS New=50",
            "--set",
            "percent::2. OAD::GRESB=20",
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let value: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["rows"][1]["costs"]["SAS New"], 1250.0);
    assert_eq!(value["rows"][1]["costs"]["GRESB"], 125.0);
    assert_eq!(value["aggregates"]["grand_total"], 1375.0);
}

#[test]
fn test_scenario_save_list_and_delete() {
    let dir = TempDir::new().unwrap();
    let save = budget(
        dir.path(),
        &["scenario", "save", "baseline", "--set", "hours::5. PSC admin=40"],
    );
    assert!(save.status.success(), "{}", String::from_utf8_lossy(&save.stderr));

    let file = dir.path().join("saved_scenarios.json");
    let document: Value = serde_json::from_str(&fs::read_to_string(&file).unwrap()).unwrap();
    assert_eq!(document["baseline"]["summary"]["total_hours"], 40.0);
    assert_eq!(document["baseline"]["dataframe"]["index"][0], 1);

    let list = budget(dir.path(), &["scenario", "list"]);
    assert!(stdout(&list).contains("baseline"));

    let missing = budget(dir.path(), &["scenario", "delete", "ghost"]);
    assert!(!missing.status.success());

    let delete = budget(dir.path(), &["scenario", "delete", "baseline"]);
    assert!(delete.status.success());
    let document: Value = serde_json::from_str(&fs::read_to_string(&file).unwrap()).unwrap();
    assert_eq!(document, serde_json::json!({}));
}

#[test]
fn test_import_rejects_array_document() {
    let dir = TempDir::new().unwrap();
    budget(dir.path(), &["scenario", "save", "keep"]);
    let upload = dir.path().join("upload.json");
    fs::write(&upload, "[1, 2]").unwrap();

    let output = budget(dir.path(), &["scenario", "import", upload.to_str().unwrap()]);
    assert!(!output.status.success());

    let file = dir.path().join("saved_scenarios.json");
    let document: Value = serde_json::from_str(&fs::read_to_string(&file).unwrap()).unwrap();
    assert!(document.get("keep").is_some());
}
