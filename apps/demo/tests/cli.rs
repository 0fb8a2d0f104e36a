//! 命令行行为测试

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn demo() -> Command {
    Command::cargo_bin("youpinitel-demo").unwrap()
}

#[test]
fn test_help() {
    demo()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--arm-busname"))
        .stdout(predicate::str::contains("--install-config"));
}

#[test]
fn test_missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    demo()
        .arg("-c")
        .arg(dir.path().join("nope.json"))
        .env("RUST_LOG", "info")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("unable to initialize application instance"));
}

#[test]
fn test_missing_minitel_port_fails() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");
    std::fs::write(
        &config,
        r#"{"minitel": {"port": "/dev/does-not-exist"}, "arm": {"busname": "org.pobot.nros"}}"#,
    )
    .unwrap();

    demo()
        .arg("-c")
        .arg(&config)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("/dev/does-not-exist"));
}

#[test]
fn test_install_config() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("sub").join("youpinitel-demo.json");

    demo()
        .arg("--install-config")
        .arg("-c")
        .arg(&target)
        .assert()
        .success();
    let installed = std::fs::read_to_string(&target).unwrap();
    assert!(installed.contains("\"minitel\""));

    // 已存在时保持不变
    std::fs::write(&target, "{}").unwrap();
    demo()
        .arg("--install-config")
        .arg("-c")
        .arg(&target)
        .assert()
        .success();
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "{}");
}

#[test]
fn test_invalid_generation_is_rejected() {
    demo()
        .args(["-g", "r2d2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("r2d2"));
}
