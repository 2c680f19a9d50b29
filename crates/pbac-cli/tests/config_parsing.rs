use std::{env, fs};

use pbac_cli::config::loader::load_config;
use pbac_core::config::{BindingKind, DuplicatePolicy};

#[test]
fn config_parsing_and_env_overrides_and_validation() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("pbac.toml");

    let toml_content = r#"
[logging]
level = "debug"

[pbac.expansion]
max_groups = 8
max_purposes = 128

[pbac.registry]
duplicates = "upsert"

[pbac.binding]
kind = "control_topic"

[pbac.binding.control_topic]
topic = "$sys/purposes"

[pbac.notifications]
topic_prefix = "$sys/notify/"
"#;
    fs::write(&path, toml_content).expect("write toml");

    // 1) Valid config parses, unspecified keys keep their defaults
    let cfg = load_config(path.to_str()).expect("should parse config");
    assert_eq!(cfg.logging.level, "debug");
    assert_eq!(cfg.pbac.expansion.max_groups, 8);
    assert_eq!(cfg.pbac.expansion.max_purposes, 128);
    assert_eq!(cfg.pbac.registry.duplicates, DuplicatePolicy::Upsert);
    assert_eq!(cfg.pbac.binding.kind, BindingKind::ControlTopic);
    assert_eq!(cfg.pbac.binding.control_topic.topic, "$sys/purposes");
    assert_eq!(cfg.pbac.binding.control_topic.filter_key, "MP-Filter");
    assert_eq!(cfg.pbac.notifications.topic_prefix, "$sys/notify/");
    assert!(cfg.pbac.notifications.enabled);

    // 2) Env override should win over file
    unsafe {
        env::set_var("PBAC__PBAC__EXPANSION__MAX_PURPOSES", "9");
    }
    let cfg_env = load_config(path.to_str()).expect("should parse config with env overrides");
    assert_eq!(cfg_env.pbac.expansion.max_purposes, 9);
    unsafe {
        env::remove_var("PBAC__PBAC__EXPANSION__MAX_PURPOSES");
    }

    // 3) Invalid config (zero limit) should error
    let invalid_path = dir.path().join("invalid.toml");
    let invalid_toml = r#"
[pbac.expansion]
max_groups = 0
"#;
    fs::write(&invalid_path, invalid_toml).expect("write invalid toml");
    let err = load_config(invalid_path.to_str()).expect_err("expected validation error");
    assert!(err.contains("max_groups must be > 0"));

    // 4) Explicit path that does not exist is an error
    let missing = dir.path().join("missing.toml");
    let err = load_config(missing.to_str()).expect_err("expected missing file error");
    assert!(err.contains("not found"));
}
