use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn run_esf(dir: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_esf-bootstrap"))
        .args(args)
        .current_dir(dir)
        .env_remove("ESF_DYNAMODB_ENDPOINT")
        .env_remove("ESF_DYNAMODB_REGION")
        .env_remove("ESF_DYNAMODB_TABLE")
        .output()
        .expect("run esf-bootstrap")
}

#[test]
fn specs_all_writes_catalog_to_output_dir() {
    let tmp = tempdir().expect("tempdir");
    let out = run_esf(tmp.path(), &["specs", "--all", "--output-dir", "generated"]);
    assert!(
        out.status.success(),
        "specs --all failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Generating authentication-requirements.md..."));
    assert!(stdout.contains("All documents generated in: generated"));

    let entries = fs::read_dir(tmp.path().join("generated"))
        .expect("output dir created")
        .count();
    assert_eq!(entries, 8);
}

#[test]
fn specs_defaults_to_specs_directory() {
    let tmp = tempdir().expect("tempdir");
    let out = run_esf(tmp.path(), &["specs", "--auth", "--deployment"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(tmp.path().join("specs/authentication-requirements.md").is_file());
    assert!(tmp.path().join("specs/deployment-architectures.md").is_file());
    assert!(!tmp.path().join("specs/api-specifications.md").exists());
}

#[test]
fn specs_without_selection_prints_usage_and_succeeds() {
    let tmp = tempdir().expect("tempdir");
    let out = run_esf(tmp.path(), &["specs"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("--all"));
    assert!(stdout.contains("--disaster-recovery"));
    assert!(!tmp.path().join("specs").exists());
}

#[test]
fn specs_unknown_document_is_rejected_before_rendering() {
    let tmp = tempdir().expect("tempdir");
    let out = run_esf(tmp.path(), &["specs", "--auth", "--doc", "roadmap"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Unknown document: roadmap"));
    assert!(!tmp.path().join("specs").exists());
}

#[test]
fn specs_partial_failure_exits_non_zero_after_full_batch() {
    let tmp = tempdir().expect("tempdir");
    let out_dir = tmp.path().join("specs");
    fs::create_dir_all(out_dir.join("monitoring-requirements.md")).unwrap();

    let out = run_esf(tmp.path(), &["specs", "--all"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("1 of 8 documents failed"));
    assert!(out_dir.join("performance-requirements.md").is_file());
    assert!(out_dir.join("authentication-requirements.md").is_file());
}

#[test]
fn specs_json_format_emits_envelope() {
    let tmp = tempdir().expect("tempdir");
    let out = run_esf(tmp.path(), &["specs", "--api", "--format", "json"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let envelope: serde_json::Value =
        serde_json::from_slice(&out.stdout).expect("stdout is a single JSON document");
    assert_eq!(envelope["cmd"], "specs");
    assert_eq!(envelope["status"], "ok");
    assert_eq!(envelope["rendered"].as_array().map(|a| a.len()), Some(1));
    assert_eq!(envelope["rendered"][0]["name"], "api");
    assert_eq!(envelope["rendered"][0]["prior"]["kind"], "absent");
}

#[test]
fn specs_list_shows_catalog() {
    let tmp = tempdir().expect("tempdir");
    let out = run_esf(tmp.path(), &["specs", "list"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("disaster-recovery"));
    assert!(stdout.contains("performance-requirements.md"));
}

#[test]
fn init_table_has_no_in_process_backend() {
    let tmp = tempdir().expect("tempdir");
    let out = run_esf(tmp.path(), &["init-table", "--backend", "memory", "--table", "t1"]);
    assert!(!out.status.success());
    assert!(!String::from_utf8_lossy(&out.stdout).contains("created successfully"));
}

#[test]
fn init_table_rejects_bad_endpoint_config() {
    let tmp = tempdir().expect("tempdir");
    let out = run_esf(tmp.path(), &["init-table", "--endpoint", "localhost:8000"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("endpoint must be an http(s) URL"));
}

#[test]
fn init_table_unreachable_endpoint_fails_with_hint() {
    let tmp = tempdir().expect("tempdir");
    let out = run_esf(
        tmp.path(),
        &["init-table", "--endpoint", "http://127.0.0.1:9"],
    );
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("DynamoDB is not accessible at http://127.0.0.1:9"));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Checking if DynamoDB is running..."));
    assert!(!stdout.contains("DynamoDB is running\n"));
    assert!(stderr.contains("docker-compose -f docker/docker-compose.yml up -d"));
}

#[test]
fn version_prints_package_version() {
    let tmp = tempdir().expect("tempdir");
    let out = run_esf(tmp.path(), &["version"]);
    assert!(out.status.success());
    assert_eq!(
        String::from_utf8_lossy(&out.stdout).trim(),
        format!("v{}", env!("CARGO_PKG_VERSION"))
    );
}
