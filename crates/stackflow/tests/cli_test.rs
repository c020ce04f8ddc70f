#![allow(deprecated)] // cargo_bin is deprecated in newer assert_cmd releases

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

const CONFIG: &str = r#"
app "my-api"

container {
    port 8080
    image "public.ecr.aws/acme/api"
}

stage "prod" {
    aws account="123456789012" region="eu-west-1"
    vpc id="vpc-prod"
    route53 enable=#true domain="example.com" hostname="api"
    acm create=#false arn="arn:aws:acm:eu-west-1:123456789012:certificate/abc"
}

stage "preview" {
    aws account="123456789012" region="eu-west-1"
    vpc id="vpc-prod"
    route53 enable=#true domain="example.com" hostname="api"
}
"#;

fn stack(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("stack").unwrap();
    cmd.current_dir(dir)
        .env_remove("STACKFLOW_STAGE")
        .env_remove("STACKFLOW_CONFIG_PATH")
        .env_remove("APP_REVISION")
        .env_remove("RUST_LOG");
    cmd
}

/// Project directory with a config file and a populated lookup context
fn project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("stack.kdl"), CONFIG).unwrap();

    stack(dir.path())
        .args(["context", "add-network", "--id", "vpc-prod", "--name", "prod-vpc"])
        .args(["--private-subnet", "subnet-a", "--public-subnet", "subnet-b"])
        .assert()
        .success();
    stack(dir.path())
        .args(["context", "add-zone", "example.com", "Z0EXAMPLE"])
        .assert()
        .success();

    dir
}

#[test]
fn test_cli_help() {
    Command::cargo_bin("stack")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("context"));
}

#[test]
fn test_cli_version() {
    Command::cargo_bin("stack")
        .unwrap()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("stackflow"));
}

#[test]
fn test_plan_help() {
    Command::cargo_bin("stack")
        .unwrap()
        .args(["plan", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[STAGE]"))
        .stdout(predicate::str::contains("--revision"))
        .stdout(predicate::str::contains("--json"));
}

#[test]
fn test_invalid_command() {
    Command::cargo_bin("stack")
        .unwrap()
        .arg("invalid-command")
        .assert()
        .failure();
}

#[test]
fn test_validate_without_project() {
    let dir = tempfile::tempdir().unwrap();
    stack(dir.path())
        .args(["--config", "missing.kdl", "validate", "prod"])
        .assert()
        .failure();
}

#[test]
fn test_validate_stage() {
    let dir = project();
    stack(dir.path())
        .args(["validate", "prod"])
        .assert()
        .success()
        .stdout(predicate::str::contains("EcsAppMyApiProdStack"))
        .stdout(predicate::str::contains("api.example.com"));
}

#[test]
fn test_validate_requires_stage_choice() {
    let dir = project();
    stack(dir.path())
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("preview, prod"));
}

#[test]
fn test_plan_summary() {
    let dir = project();
    stack(dir.path())
        .args(["plan", "prod"])
        .assert()
        .success()
        .stdout(predicate::str::contains("EcsAppMyApiProdStack"))
        .stdout(predicate::str::contains("Listener"))
        .stdout(predicate::str::contains("AlarmCpuUtilization"))
        .stdout(predicate::str::contains("looked up"));
}

#[test]
fn test_plan_json() {
    let dir = project();
    let output = stack(dir.path())
        .args(["plan", "prod", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(plan["stack_name"], "EcsAppMyApiProdStack");
    assert_eq!(plan["certificate"]["source"], "imported");
    assert!(plan["nodes"].as_array().unwrap().len() > 10);
}

#[test]
fn test_plan_stage_from_env() {
    let dir = project();
    stack(dir.path())
        .env("STACKFLOW_STAGE", "prod")
        .arg("plan")
        .assert()
        .success()
        .stdout(predicate::str::contains("EcsAppMyApiProdStack"));
}

#[test]
fn test_preview_needs_revision() {
    let dir = project();
    stack(dir.path())
        .args(["plan", "preview"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("revision"));
}

#[test]
fn test_preview_revision_from_env() {
    let dir = project();
    stack(dir.path())
        .env("APP_REVISION", "42")
        .args(["plan", "preview"])
        .assert()
        .success()
        .stdout(predicate::str::contains("EcsAppMyApiPreview42Stack"))
        .stdout(predicate::str::contains("api-42.example.com"));
}

#[test]
fn test_plan_without_context_fails() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("stack.kdl"), CONFIG).unwrap();

    stack(dir.path())
        .args(["plan", "prod"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Network not found"));
}

#[test]
fn test_plan_output_file() {
    let dir = project();
    let out = dir.path().join("plan.json");

    stack(dir.path())
        .args(["plan", "prod", "--output"])
        .arg(&out)
        .assert()
        .success();

    let plan: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(plan["stage"], "prod");
}

#[test]
fn test_context_show() {
    let dir = project();
    stack(dir.path())
        .args(["context", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("vpc-prod"))
        .stdout(predicate::str::contains("Z0EXAMPLE"));

    assert!(dir.path().join(".stackflow/context.json").exists());
}

#[test]
fn test_context_remove_unknown_network() {
    let dir = project();
    stack(dir.path())
        .args(["context", "remove-network", "vpc-unknown"])
        .assert()
        .failure();
}
