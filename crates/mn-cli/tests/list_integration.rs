//! Integration tests for the list command.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const MEETING_A: &str = r#"{
  "code": 0,
  "msg": "success",
  "data": {
    "list": [
      {"id": "6619deafdabc4707a470c3bb17e8b57e", "title": "Police source protect", "duration": 4593, "create_time": "2022-02-28 19:01:19"},
      {"id": "6619deafdabc4707a470c3bb17e8b57f", "title": "asd qwe", "duration": 6000, "create_time": "2022-02-28 20:01:19"}
    ],
    "page": {"page_now": 1, "page_size": 3000, "page_total": 7, "total_num": 20000}
  }
}"#;

const MEETING_B: &str = r#"{
  "code": 0,
  "msg": "success",
  "data": {
    "list": [
      {"id": "dc1e4811d8594f0bad6003307dd170b9", "title": "Player but movie major put idea", "duration": 1495, "create_time": "2022-02-17 11:41:22"}
    ],
    "page": {"page_now": 1, "page_size": 3000, "page_total": 7, "total_num": 20000}
  }
}"#;

fn write_file(dir: &Path, name: &str, contents: &str) {
    let mut file = std::fs::File::create(dir.join(name)).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
}

/// Writes both fixtures and a config pointing at them. `meeting-a` is the slower source.
fn setup(meeting_b: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "meeting-a.json", MEETING_A);
    write_file(dir.path(), "meeting-b.json", meeting_b);

    let config = format!(
        r#"
[[sources]]
type = "fixture"
name = "meeting-a"
path = "{a}"
delay_ms = 200

[[sources]]
type = "fixture"
name = "meeting-b"
path = "{b}"
"#,
        a = dir.path().join("meeting-a.json").display(),
        b = dir.path().join("meeting-b.json").display(),
    );
    write_file(dir.path(), "config.toml", &config);
    dir
}

fn mn(dir: &TempDir, args: &[&str]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_mn"));
    command
        .arg("--config")
        .arg(dir.path().join("config.toml"))
        .args(args)
        .env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join(".config"))
        .env("TZ", "UTC");
    for (key, _) in std::env::vars_os() {
        if key.to_string_lossy().starts_with("MN_") {
            command.env_remove(key);
        }
    }
    command.output().expect("Failed to run mn")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "mn failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn test_list_groups_fixture_sources_by_day() {
    let dir = setup(MEETING_B);
    let output = stdout(&mn(&dir, &["list"]));

    let expected = "\
Meeting Notes
▾ Monday, Feb 28
    Police source protect  07:01 pm - 08:17 pm
    asd qwe  08:01 pm - 09:41 pm
▾ Thursday, Feb 17
    Player but movie major put idea  11:41 am - 12:06 pm
";
    assert_eq!(output, expected);
}

#[test]
fn test_list_json_keeps_registration_order() {
    let dir = setup(MEETING_B);
    let output = stdout(&mn(&dir, &["list", "--json"]));
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();

    let sources: Vec<&str> = json["sources"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(sources, vec!["meeting-a", "meeting-b"]);
    assert_eq!(json["loading"], false);
    assert_eq!(json["segments"].as_array().unwrap().len(), 2);
}

#[test]
fn test_list_survives_failed_source() {
    let dir = setup(r#"{"code": -1, "msg": "meeting-b unavailable"}"#);
    let output = stdout(&mn(&dir, &["list", "--toggle", "Monday, Feb 28"]));

    assert!(output.contains("▸ Monday, Feb 28 (2 notes)"));
    assert!(!output.contains("Thursday, Feb 17"));
    assert!(output.contains("! meeting-b failed to load"));
}

#[test]
fn test_list_progress_reports_each_settle() {
    let dir = setup(MEETING_B);
    let output = stdout(&mn(&dir, &["list", "--progress"]));

    assert!(output.contains("2/2 sources settled, 3 notes"));
    assert!(output.contains("Meeting Notes"));
}

#[cfg(target_os = "linux")]
#[test]
fn test_user_config_comes_from_isolated_home() {
    let dir = setup(MEETING_B);
    let user_config = dir.path().join(".config").join("mn");
    std::fs::create_dir_all(&user_config).unwrap();
    write_file(&user_config, "config.toml", "request_timeout_secs = 7\n");

    // dirs resolves the config dir from XDG_CONFIG_HOME on Linux.
    let output = stdout(&mn(&dir, &["sources"]));
    assert!(output.starts_with("Sources (timeout 7s):"));
}

#[test]
fn test_sources_lists_config() {
    let dir = setup(MEETING_B);
    let output = stdout(&mn(&dir, &["sources"]));

    assert!(output.starts_with("Sources (timeout 30s):"));
    assert!(output.contains("- meeting-a: "));
    assert!(output.contains("- meeting-b: "));
}
