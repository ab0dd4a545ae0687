//! CLI replay integration tests
//!
//! These tests drive the built `stasher` binary end to end: events in,
//! record lines out.

use std::fs;
use std::io::Write;
use std::process::{Command, Stdio};
use tempfile::TempDir;

const COMPLETION_EVENT: &str = r#"{"name":"process_action.action_controller","sequence_id":2,"duration":0.0,"payload":{"controller":"home","action":"index","params":{"foo":"bar"},"format":"application/json","method":"GET","path":"/home","status":200,"view_runtime":0.01,"db_runtime":0.02}}"#;

const EXPECTED_RESPONSE: &str = concat!(
    r#"{"@source":"source","@tags":["response"],"@fields":{"method":"GET","ip":null,"params":{"foo":"bar"},"#,
    r#""path":"/home","format":"application/json","controller":"home","action":"index","status":200,"#,
    r#""duration":0.0,"view":0.01,"db":0.02},"@timestamp":"timestamp"}"#,
    "\n"
);

fn stasher() -> Command {
    Command::new(env!("CARGO_BIN_EXE_stasher"))
}

#[test]
fn test_cli_replay_stdin_to_stdout() {
    let mut child = stasher()
        .args([
            "replay",
            "--source",
            "source",
            "--timestamp",
            "timestamp",
            "--log-profile",
            "test",
        ])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("Failed to spawn CLI");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(format!("{}\n", COMPLETION_EVENT).as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), EXPECTED_RESPONSE);
}

#[test]
fn test_cli_replay_file_with_config_appends_output() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("events.jsonl");
    let output = temp_dir.path().join("records.log");
    let config = temp_dir.path().join("stasher.toml");

    fs::write(
        &config,
        "source = \"source\"\ntimestamp = \"timestamp\"\ncustom_fields = [\"user\"]\n",
    )
    .unwrap();
    fs::write(
        &input,
        [
            r#"{"name":"sql.active_record","sequence_id":1,"payload":{"name":"SCHEMA","sql":"PRAGMA table_info(users)"}}"#,
            r#"{"name":"redirect_to.action_controller","sequence_id":2,"payload":{"location":"http://example.com","status":302}}"#,
            r#"{"name":"process_action.action_controller","sequence_id":3,"payload":{"status":302,"user":"user"}}"#,
            "",
        ]
        .join("\n"),
    )
    .unwrap();
    fs::write(&output, "previous\n").unwrap();

    let status = stasher()
        .args(["replay", "--log-profile", "test", "--input"])
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .arg("--config")
        .arg(&config)
        .env_remove("STASHER_SOURCE")
        .status()
        .expect("Failed to execute CLI");

    assert!(status.success());
    let written = fs::read_to_string(&output).unwrap();
    let lines: Vec<_> = written.lines().collect();
    assert_eq!(lines.len(), 2, "{written}");
    assert_eq!(lines[0], "previous");
    assert!(lines[1].contains(r#""location":"http://example.com""#), "{}", lines[1]);
    assert!(lines[1].contains(r#""user":"user""#), "{}", lines[1]);
    assert!(lines[1].contains(r#""status":302"#), "{}", lines[1]);
}

#[test]
fn test_cli_replay_env_overrides_config_source() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("events.jsonl");
    fs::write(&input, format!("{}\n", COMPLETION_EVENT)).unwrap();

    let output = stasher()
        .args(["replay", "--timestamp", "timestamp", "--log-profile", "test", "--input"])
        .arg(&input)
        .env("STASHER_SOURCE", "web-01:shop")
        .output()
        .expect("Failed to execute CLI");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with(r#"{"@source":"web-01:shop","#), "{stdout}");
}

#[test]
fn test_cli_replay_rejects_malformed_line() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("events.jsonl");
    fs::write(&input, format!("{}\n{{not json\n", COMPLETION_EVENT)).unwrap();

    let output = stasher()
        .args(["replay", "--log-profile", "test", "--input"])
        .arg(&input)
        .output()
        .expect("Failed to execute CLI");

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Invalid event at line 2"), "{stderr}");
}
