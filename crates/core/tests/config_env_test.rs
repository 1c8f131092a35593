//! 环境变量覆盖层。环境变量是进程级状态，这里只放一个测试函数。

use std::env;
use std::fs;

use budget_core::config::*;
use budget_core::LogFormat;
use tempfile::NamedTempFile;

#[test]
fn test_environment_overrides_single_fields() {
    env::set_var("BUDGET_LOGGING__LEVEL", "debug");

    // 没有配置文件时，只覆盖 level，其余保持默认值
    let config = AppConfig::load(None).unwrap();
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, LogFormat::Compact);
    assert_eq!(config.export, ExportConfig::default());
    assert_eq!(config.program, ProgramConfig::default());

    // 环境变量优先于文件，文件中的其它字段保留
    let temp_file = NamedTempFile::new().unwrap();
    fs::write(
        temp_file.path(),
        "[logging]\nlevel = \"warn\"\nformat = \"json\"\n",
    )
    .unwrap();
    let config = AppConfig::load(Some(temp_file.path().to_str().unwrap())).unwrap();
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, LogFormat::Json);

    env::set_var("BUDGET_EXPORT__DEFAULT_FILE", "team.json");
    let config = AppConfig::load(None).unwrap();
    assert_eq!(config.export.default_file, "team.json");
    assert!(config.export.pretty);

    env::remove_var("BUDGET_LOGGING__LEVEL");
    env::remove_var("BUDGET_EXPORT__DEFAULT_FILE");
}
