#![cfg(unix)]

use std::fs;

use serde_json::Value;

mod common;

use common::{path_str, Sandbox};

#[test]
fn first_run_creates_default_workspace_and_config() {
    let sandbox = Sandbox::new("alice");
    let (code, shown) = sandbox.json(&["workspace", "show"]);
    assert_eq!(code, 0, "{shown}");
    let workspace = sandbox.default_workspace();
    assert_eq!(shown["details"]["path"], path_str(&workspace));
    assert_eq!(shown["details"]["source"], "config");
    assert!(workspace.join("applied-icons").is_dir());

    let db: Value = serde_json::from_str(
        &fs::read_to_string(workspace.join("icon-manager-db.json")).expect("db"),
    )
    .expect("json");
    assert_eq!(db, serde_json::json!({ "iconApplications": {}, "lastId": 0 }));

    let config: Value = serde_json::from_str(
        &fs::read_to_string(sandbox.config_dir.join("config.json")).expect("config"),
    )
    .expect("json");
    assert_eq!(config["workspacePath"], path_str(&workspace));
}

#[test]
fn set_is_saved_for_later_runs() {
    let sandbox = Sandbox::new("alice");
    let target = sandbox.temp.path().join("shared-icons");
    let (code, set) = sandbox.json(&["workspace", "set", path_str(&target)]);
    assert_eq!(code, 0, "{set}");
    assert!(target.join("icon-manager-db.json").is_file());

    let (_, shown) = sandbox.json(&["workspace", "show"]);
    assert_eq!(shown["details"]["path"], path_str(&target));
}

#[test]
fn workspace_flag_is_not_saved() {
    let sandbox = Sandbox::new("alice");
    let other = sandbox.temp.path().join("one-off");
    let (code, shown) = sandbox.json(&["--workspace", path_str(&other), "workspace", "show"]);
    assert_eq!(code, 0);
    assert_eq!(shown["details"]["path"], path_str(&other));
    assert_eq!(shown["details"]["source"], "override");

    let (_, shown) = sandbox.json(&["workspace", "show"]);
    assert_eq!(shown["details"]["path"], path_str(&sandbox.default_workspace()));
}

#[test]
fn corrupt_database_is_reset() {
    let sandbox = Sandbox::new("alice");
    let workspace = sandbox.default_workspace();
    fs::create_dir_all(&workspace).expect("workspace");
    fs::write(workspace.join("icon-manager-db.json"), "{ not json").expect("corrupt");

    let (code, listed) = sandbox.json(&["list"]);
    assert_eq!(code, 0);
    assert_eq!(listed["details"]["icons"], serde_json::json!([]));
    let db: Value = serde_json::from_str(
        &fs::read_to_string(workspace.join("icon-manager-db.json")).expect("db"),
    )
    .expect("json");
    assert_eq!(db["lastId"], 0);
}

#[test]
fn unusable_explicit_workspace_fails() {
    let sandbox = Sandbox::new("alice");
    let blocker = sandbox.temp.path().join("blocker");
    fs::write(&blocker, b"not a directory").expect("blocker");
    let target = blocker.join("ws");

    let (code, payload) = sandbox.json(&["--workspace", path_str(&target), "list"]);
    assert_eq!(code, 2);
    assert_eq!(payload["status"], "error");
    assert!(payload["message"]
        .as_str()
        .expect("message")
        .contains("failed to open workspace"));
}

#[test]
fn unusable_saved_workspace_falls_back_to_default() {
    let sandbox = Sandbox::new("alice");
    let blocker = sandbox.temp.path().join("blocker");
    fs::write(&blocker, b"not a directory").expect("blocker");
    fs::create_dir_all(&sandbox.config_dir).expect("config dir");
    fs::write(
        sandbox.config_dir.join("config.json"),
        format!(r#"{{"workspacePath":"{}"}}"#, blocker.join("ws").display()),
    )
    .expect("config");

    let (code, shown) = sandbox.json(&["workspace", "show"]);
    assert_eq!(code, 0);
    assert_eq!(shown["details"]["source"], "default-fallback");
    assert_eq!(shown["details"]["path"], path_str(&sandbox.default_workspace()));
}
