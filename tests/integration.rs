#![allow(clippy::unwrap_used, reason = "test assertions")]

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use serde_yaml::Value;

fn oas_combine_cmd(fixture: &str) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_oas-combine"));
    cmd.current_dir(Path::new("tests/fixtures").join(fixture));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn run_with_stdin(mut cmd: Command, input: &str) -> Output {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(input.as_bytes()).unwrap();
    child.wait_with_output().unwrap()
}

fn stdout_yaml(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "run failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_yaml::from_slice(&output.stdout).unwrap()
}

fn string(s: &str) -> Value {
    Value::String(s.to_string())
}

#[test]
fn remote_refs_are_promoted_into_components() {
    let output = oas_combine_cmd("shops").args(["-i", "root.yaml"]).output().unwrap();
    let doc = stdout_yaml(&output);

    let responses = &doc["paths"]["/shops"]["get"]["responses"];
    assert_eq!(responses["200"]["$ref"], string("#/components/responses/ShopsResponse"));
    assert_eq!(responses["default"]["$ref"], string("#/components/responses/ErrorResponse"));

    let shops = &doc["components"]["responses"]["ShopsResponse"];
    assert_eq!(shops["description"], string("All shops"));
    assert_eq!(
        shops["content"]["application/json"]["schema"]["items"]["type"],
        string("object")
    );
    assert_eq!(
        doc["components"]["responses"]["ErrorResponse"]["description"],
        string("Something went wrong")
    );
    assert!(!String::from_utf8_lossy(&output.stdout).contains("otherfile.yaml"));
}

#[test]
fn inline_local_replaces_local_refs() {
    let output = oas_combine_cmd("shops")
        .args(["-i", "root.yaml", "--inline-local"])
        .output()
        .unwrap();
    let doc = stdout_yaml(&output);

    let ok = &doc["paths"]["/shops"]["get"]["responses"]["200"];
    assert_eq!(ok["description"], string("All shops"));
    assert_eq!(ok.get("$ref"), None);
    assert_eq!(doc["components"]["responses"]["ShopsResponse"], Value::Null);

    let fallback = &doc["paths"]["/shops"]["get"]["responses"]["default"];
    assert_eq!(fallback["description"], string("Something went wrong"));
    assert_eq!(fallback.get("$ref"), None);
}

#[test]
fn keep_local_preserves_inlined_targets() {
    let output = oas_combine_cmd("shops")
        .args(["-i", "root.yaml", "--inline-local", "--keep-local"])
        .output()
        .unwrap();
    let doc = stdout_yaml(&output);

    assert_eq!(
        doc["paths"]["/shops"]["get"]["responses"]["200"]["description"],
        string("All shops")
    );
    assert_eq!(
        doc["components"]["responses"]["ShopsResponse"]["description"],
        string("All shops")
    );
}

#[test]
fn stdin_resolves_relative_to_working_directory() {
    let input = std::fs::read_to_string("tests/fixtures/shops/root.yaml").unwrap();
    let output = run_with_stdin(oas_combine_cmd("shops"), &input);
    let doc = stdout_yaml(&output);
    assert_eq!(
        doc["components"]["responses"]["ShopsResponse"]["description"],
        string("All shops")
    );
}

#[test]
fn stdin_honours_ref_dir() {
    let input = std::fs::read_to_string("tests/fixtures/shops/root.yaml").unwrap();
    let mut cmd = oas_combine_cmd("broken");
    cmd.args(["--ref-dir", "../shops"]);
    let output = run_with_stdin(cmd, &input);
    let doc = stdout_yaml(&output);
    assert_eq!(
        doc["components"]["responses"]["ErrorResponse"]["description"],
        string("Something went wrong")
    );
}

#[test]
fn output_file_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let out_path = dir.path().join("combined.yaml");
    let output = oas_combine_cmd("shops")
        .args(["-i", "root.yaml", "-o"])
        .arg(&out_path)
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "run failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Wrote output YAML file to"));

    let doc: Value = serde_yaml::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
    assert_eq!(doc["info"]["title"], string("Shops"));
}

#[test]
fn missing_input_file_exits_11() {
    let output = oas_combine_cmd("shops").args(["-i", "absent.yaml"]).output().unwrap();
    assert_eq!(output.status.code(), Some(11));
    assert!(String::from_utf8_lossy(&output.stderr).contains("error:"));
}

#[test]
fn unwritable_output_exits_22() {
    let output = oas_combine_cmd("shops")
        .args(["-i", "root.yaml", "-o", "no-such-dir/out.yaml"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(22));
}

#[test]
fn invalid_root_document_exits_31() {
    let output = oas_combine_cmd("broken").args(["-i", "invalid.yaml"]).output().unwrap();
    assert_eq!(output.status.code(), Some(31));
}

#[test]
fn unresolvable_reference_exits_32() {
    let output = oas_combine_cmd("broken").args(["-i", "root.yaml"]).output().unwrap();
    assert_eq!(output.status.code(), Some(32));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("nowhere.yaml"), "stderr: {stderr}");
}
