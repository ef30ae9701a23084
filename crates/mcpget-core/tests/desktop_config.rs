use serde_json::{Value, json};
use tempfile::TempDir;

use mcpget_core::config::{AppConfigStore, DesktopConfigFile, DesktopServerEntry};
use mcpget_core::types::LaunchConfig;

fn config_in(temp: &TempDir) -> DesktopConfigFile {
    DesktopConfigFile::new(temp.path().join("claude_desktop_config.json"))
}

fn read_raw(file: &DesktopConfigFile) -> Value {
    serde_json::from_slice(&std::fs::read(file.path()).unwrap()).unwrap()
}

#[test]
fn missing_file_reads_as_empty() {
    let temp = TempDir::new().unwrap();
    let file = config_in(&temp);

    assert!(file.read().is_empty());
    assert!(file.list().is_empty());
    assert!(!file.exists());
}

#[test]
fn malformed_json_reads_as_empty() {
    let temp = TempDir::new().unwrap();
    let file = config_in(&temp);
    std::fs::write(file.path(), "{ not json").unwrap();

    assert!(file.read().is_empty());
}

#[test]
fn non_object_root_reads_as_empty() {
    let temp = TempDir::new().unwrap();
    let file = config_in(&temp);
    std::fs::write(file.path(), "[1, 2, 3]").unwrap();

    assert!(file.read().is_empty());
}

#[test]
fn malformed_entries_are_skipped() {
    let temp = TempDir::new().unwrap();
    let file = config_in(&temp);
    let content = json!({
        "mcpServers": {
            "good": {"command": "npx", "args": ["-y", "pkg"]},
            "bad": {"command": "npx", "args": "not-a-list"}
        }
    });
    std::fs::write(file.path(), serde_json::to_vec(&content).unwrap()).unwrap();

    let servers = file.read();

    assert_eq!(servers.len(), 1);
    assert!(servers.contains_key("good"));
}

#[test]
fn writes_keep_entries_that_do_not_parse() {
    let temp = TempDir::new().unwrap();
    let file = config_in(&temp);
    let legacy = json!({"command": "node", "args": ["srv.js"], "env": {"PORT": 8080}});
    let content = json!({
        "mcpServers": {
            "legacy": legacy.clone(),
            "nulled": {"command": null},
            "old": {"command": "uvx"}
        }
    });
    std::fs::write(file.path(), serde_json::to_vec(&content).unwrap()).unwrap();

    file.upsert("filesystem", &LaunchConfig::new("npx")).unwrap();
    assert!(file.delete("old").unwrap());

    let raw = read_raw(&file);
    assert_eq!(raw["mcpServers"]["legacy"], legacy);
    assert_eq!(raw["mcpServers"]["nulled"], json!({"command": null}));
    assert_eq!(raw["mcpServers"]["filesystem"], json!({"command": "npx"}));
    assert!(raw["mcpServers"].get("old").is_none());
    assert_eq!(
        file.read().keys().collect::<Vec<_>>(),
        vec!["filesystem"]
    );
}

#[test]
fn empty_command_is_still_written() {
    let temp = TempDir::new().unwrap();
    let file = config_in(&temp);

    file.upsert("blank", &LaunchConfig::default()).unwrap();

    let raw = read_raw(&file);
    assert_eq!(raw["mcpServers"]["blank"], json!({"command": ""}));
}

#[test]
fn entries_without_args_or_env_read_as_empty() {
    let temp = TempDir::new().unwrap();
    let file = config_in(&temp);
    std::fs::write(file.path(), r#"{"mcpServers":{"bare":{"command":"uvx"}}}"#).unwrap();

    assert_eq!(file.get("bare"), Some(LaunchConfig::new("uvx")));
}

#[test]
fn upsert_omits_empty_args_and_env() {
    let temp = TempDir::new().unwrap();
    let file = config_in(&temp);

    file.upsert("bare", &LaunchConfig::new("uvx")).unwrap();

    let raw = read_raw(&file);
    assert_eq!(raw["mcpServers"]["bare"], json!({"command": "uvx"}));
}

#[test]
fn upsert_preserves_unrelated_keys_and_entries() {
    let temp = TempDir::new().unwrap();
    let file = config_in(&temp);
    let content = json!({
        "globalShortcut": "Ctrl+Space",
        "mcpServers": {
            "hand-added": {"command": "node", "args": ["a.js"], "disabled": true}
        }
    });
    std::fs::write(file.path(), serde_json::to_vec(&content).unwrap()).unwrap();

    file.upsert(
        "filesystem",
        &LaunchConfig::new("npx")
            .with_args(["-y", "fs"])
            .with_env("ROOT", "/tmp"),
    )
    .unwrap();

    let raw = read_raw(&file);
    assert_eq!(raw["globalShortcut"], "Ctrl+Space");
    assert_eq!(
        raw["mcpServers"]["hand-added"],
        json!({"command": "node", "args": ["a.js"], "disabled": true})
    );
    assert_eq!(
        raw["mcpServers"]["filesystem"],
        json!({"command": "npx", "args": ["-y", "fs"], "env": {"ROOT": "/tmp"}})
    );
}

#[test]
fn upsert_replaces_existing_entry_wholesale() {
    let temp = TempDir::new().unwrap();
    let file = config_in(&temp);
    file.upsert("srv", &LaunchConfig::new("a").with_env("K", "v"))
        .unwrap();

    file.upsert("srv", &LaunchConfig::new("b")).unwrap();

    assert_eq!(file.get("srv"), Some(LaunchConfig::new("b")));
}

#[test]
fn upsert_creates_parent_directories() {
    let temp = TempDir::new().unwrap();
    let file = DesktopConfigFile::new(temp.path().join("a").join("b").join("config.json"));

    file.upsert("srv", &LaunchConfig::new("node")).unwrap();

    assert!(file.exists());
}

#[test]
fn delete_reports_whether_entry_existed() {
    let temp = TempDir::new().unwrap();
    let file = config_in(&temp);
    file.upsert("srv", &LaunchConfig::new("node")).unwrap();

    assert!(file.delete("srv").unwrap());
    assert!(!file.delete("srv").unwrap());
    assert!(file.get("srv").is_none());
}

#[test]
fn delete_of_absent_entry_does_not_create_file() {
    let temp = TempDir::new().unwrap();
    let file = config_in(&temp);

    assert!(!file.delete("srv").unwrap());
    assert!(!file.exists());
}

#[test]
fn list_is_sorted_by_name() {
    let temp = TempDir::new().unwrap();
    let file = config_in(&temp);
    for name in ["zeta", "alpha", "mid"] {
        file.upsert(name, &LaunchConfig::new("node")).unwrap();
    }

    let names: Vec<String> = file.list().into_iter().map(|(name, _)| name).collect();

    assert_eq!(names, vec!["alpha", "mid", "zeta"]);
}

#[test]
fn last_writer_wins_on_interleaved_writes() {
    let temp = TempDir::new().unwrap();
    let first = config_in(&temp);
    let second = config_in(&temp);

    // `first` writes back a map read before `second` wrote.
    let mut stale = first.read();
    second.upsert("from-second", &LaunchConfig::new("b")).unwrap();
    stale.insert(
        "from-first".to_string(),
        DesktopServerEntry::from(&LaunchConfig::new("a")),
    );
    first.write(&stale).unwrap();

    let servers = first.read();
    assert!(servers.contains_key("from-first"));
    assert!(!servers.contains_key("from-second"));
}
