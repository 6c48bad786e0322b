use std::path::PathBuf;
use std::process::Command;

fn cohort() -> Command {
    Command::new(env!("CARGO_BIN_EXE_cohort"))
}

fn plan_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../plans")
        .join(name)
}

#[test]
fn generate_writes_one_json_line_per_record() {
    let output = cohort()
        .args(["generate", "--records", "25", "--seed", "3", "--plan"])
        .arg(plan_path("patients.plan.toml"))
        .env("RUST_LOG", "warn")
        .output()
        .expect("run cohort");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("utf8");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 25);
    for line in lines {
        let record: serde_json::Value = serde_json::from_str(line).expect("json line");
        let keys: Vec<&str> = record
            .as_object()
            .expect("object")
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys.len(), 4);
        assert!(record["age"].is_i64());
    }
}

#[test]
fn summary_goes_to_stderr() {
    let output = cohort()
        .args(["generate", "--summary", "--seed", "1", "--plan"])
        .arg(plan_path("patients.plan.toml"))
        .env("RUST_LOG", "off")
        .output()
        .expect("run cohort");
    assert!(output.status.success());
    let stderr = String::from_utf8(output.stderr).expect("utf8");
    assert!(stderr.contains("age (500 values)"));
    assert!(stderr.contains("60..=100"));
}

#[test]
fn report_file_holds_run_counters() {
    let dir = std::env::temp_dir().join(format!("cohort-report-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    let report_path = dir.join("report.json");

    let output = cohort()
        .args(["generate", "--records", "10", "--seed", "4", "--plan"])
        .arg(plan_path("patients.plan.toml"))
        .arg("--report")
        .arg(&report_path)
        .env("RUST_LOG", "off")
        .output()
        .expect("run cohort");
    assert!(output.status.success());

    let contents = std::fs::read_to_string(&report_path).expect("report written");
    let report: serde_json::Value = serde_json::from_str(&contents).expect("report json");
    assert_eq!(report["records_generated"], 10);
    assert_eq!(report["seed"], 4);
    assert_eq!(report["solver_calls"], 1);
}

#[test]
fn report_to_missing_directory_fails() {
    let report_path = std::env::temp_dir()
        .join(format!("cohort-missing-{}", std::process::id()))
        .join("nested")
        .join("report.json");

    let output = cohort()
        .args(["generate", "--records", "5", "--seed", "4", "--plan"])
        .arg(plan_path("patients.plan.toml"))
        .arg("--report")
        .arg(&report_path)
        .env("RUST_LOG", "off")
        .output()
        .expect("run cohort");
    assert!(!output.status.success());
}

#[test]
fn validate_fails_on_broken_plan() {
    let dir = std::env::temp_dir().join(format!("cohort-cli-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    let plan = dir.join("broken.plan.json");
    std::fs::write(
        &plan,
        r#"{"plan_version":"1","name":"x","records":0,"attributes":[]}"#,
    )
    .expect("write plan");

    let output = cohort()
        .args(["validate", "--plan"])
        .arg(&plan)
        .env("RUST_LOG", "off")
        .output()
        .expect("run cohort");
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).expect("utf8");
    assert!(stderr.contains("records_zero"));
}

#[test]
fn schema_is_json() {
    let output = cohort().arg("schema").output().expect("run cohort");
    assert!(output.status.success());
    let schema: serde_json::Value = serde_json::from_slice(&output.stdout).expect("schema json");
    assert_eq!(schema["title"], "DatasetPlan");
}
