mod support;

use predicates::prelude::*;
use support::TestHome;

#[test]
fn help_lists_command_groups() {
    let home = TestHome::new();
    home.cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("task"))
        .stdout(predicate::str::contains("template"))
        .stdout(predicate::str::contains("suggest"));
}

#[test]
fn first_run_seeds_and_persists_state() {
    let home = TestHome::new();
    let data = home.json(&["task", "list"]);
    assert_eq!(data["tasks"].as_array().map(Vec::len), Some(4));

    let persisted = home.read_state();
    assert_eq!(persisted["tasks"].as_array().map(Vec::len), Some(4));
    assert_eq!(persisted["templates"].as_array().map(Vec::len), Some(2));
    assert!(persisted["checklistItems"].is_array());
}

#[test]
fn add_toggle_and_remove_a_task() {
    let home = TestHome::new();
    let added = home.json(&[
        "task", "add", "Write tests", "-c", "work", "-p", "high", "-d", "2030-01-15",
    ]);
    let id = added["id"].as_str().expect("id").to_string();
    assert_eq!(added["category"], "Work");
    assert_eq!(added["priority"], "High");
    assert_eq!(added["completed"], false);

    let toggled = home.json(&["task", "toggle", &id[..8]]);
    assert_eq!(toggled["completed"], true);
    assert!(toggled["completionDate"].is_string());

    let persisted = home.read_state();
    let stored = persisted["tasks"]
        .as_array()
        .and_then(|tasks| tasks.iter().find(|task| task["id"] == id.as_str()))
        .cloned()
        .expect("task persisted");
    assert_eq!(stored["completed"], true);

    home.json(&["task", "rm", &id]);
    let listed = home.json(&["task", "list"]);
    assert!(listed["tasks"]
        .as_array()
        .is_some_and(|tasks| tasks.iter().all(|task| task["id"] != id.as_str())));
}

#[test]
fn short_titles_are_rejected() {
    let home = TestHome::new();
    home.cmd()
        .args(["task", "add", "ab"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("title"));
}

#[test]
fn unknown_task_id_is_a_user_error() {
    let home = TestHome::new();
    home.cmd()
        .args(["task", "toggle", "no-such-task", "--json"])
        .assert()
        .failure()
        .code(2)
        .stdout(predicate::str::contains("\"kind\": \"user_error\""));
}

#[test]
fn list_filters_by_category() {
    let home = TestHome::new();
    let data = home.json(&["task", "list", "-c", "health"]);
    let tasks = data["tasks"].as_array().cloned().unwrap_or_default();
    assert!(!tasks.is_empty());
    assert!(tasks.iter().all(|task| task["category"] == "Health"));
}

#[test]
fn checklist_refuses_a_sixth_item() {
    let home = TestHome::new();
    // Seed data holds two items.
    for text in ["one", "two", "three"] {
        let data = home.json(&["check", "add", text]);
        assert_eq!(data["added"], true);
    }

    home.cmd()
        .args(["check", "add", "overflow"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Checklist unchanged"))
        .stdout(predicate::str::contains("remove one first"));

    let data = home.json(&["check", "list"]);
    assert_eq!(data["items"].as_array().map(Vec::len), Some(5));
    assert_eq!(data["capacity"], 5);
}

#[test]
fn template_add_and_apply() {
    let home = TestHome::new();
    let template = home.json(&[
        "template",
        "add",
        "Evening Wind-down",
        "-t",
        "Read a book:personal:low",
        "-t",
        "Plan tomorrow:work:medium",
    ]);
    let id = template["id"].as_str().expect("template id").to_string();
    assert_eq!(template["tasks"].as_array().map(Vec::len), Some(2));

    let applied = home.json(&["template", "apply", &id]);
    let created = applied["created"].as_array().cloned().unwrap_or_default();
    assert_eq!(created.len(), 2);
    assert_eq!(created[0]["title"], "Read a book");
    assert_eq!(created[1]["category"], "Work");
    assert!(created.iter().all(|task| task["completed"] == false));

    let listed = home.json(&["task", "list"]);
    assert_eq!(listed["tasks"].as_array().map(Vec::len), Some(6));
}

#[test]
fn template_needs_a_real_name() {
    let home = TestHome::new();
    home.cmd()
        .args(["template", "add", "ab", "-t", "Stretch:health:low"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn stats_reports_streak_and_week() {
    let home = TestHome::new();
    let data = home.json(&["stats"]);
    assert!(data["streak"].as_u64().is_some());
    assert!(data["on_time_rate"].as_u64().is_some_and(|rate| rate <= 100));
    assert_eq!(data["total_completed"], 1);
    assert_eq!(data["week"].as_array().map(Vec::len), Some(7));
}

#[test]
fn suggest_falls_back_when_assistant_is_unreachable() {
    let home = TestHome::new();
    home.json(&["task", "add", "Morning standup", "-c", "work"]);
    home.json(&["task", "add", "Evening run", "-c", "health"]);

    let before = home.json(&["task", "list"]);
    let data = home.json(&["suggest", "--apply"]);
    assert_eq!(data["suggestion"]["source"], "fallback");
    assert_eq!(data["applied"], true);
    assert!(data["suggestion"]["ordered_task_ids"]
        .as_array()
        .is_some_and(|ids| ids.len() >= 2));

    // Applying the original order of today's tasks keeps them in place
    // relative to each other.
    let after = home.json(&["task", "list"]);
    let today_ids: Vec<serde_json::Value> = data["suggestion"]["ordered_task_ids"]
        .as_array()
        .cloned()
        .unwrap_or_default();
    let positions = |list: &serde_json::Value| -> Vec<serde_json::Value> {
        list["tasks"]
            .as_array()
            .map(|tasks| {
                tasks
                    .iter()
                    .map(|task| task["id"].clone())
                    .filter(|id| today_ids.contains(id))
                    .collect()
            })
            .unwrap_or_default()
    };
    assert_eq!(positions(&before), positions(&after));
}

#[test]
fn suggest_with_disabled_assistant_keeps_order() {
    let home = TestHome::new();
    home.write_config("[advisor]\nenabled = false\n");
    home.json(&["task", "add", "Morning standup"]);
    home.json(&["task", "add", "Evening run"]);

    let data = home.json(&["suggest"]);
    assert_eq!(data["suggestion"]["source"], "fallback");
    assert_eq!(data["applied"], false);
}

#[test]
fn reset_requires_confirmation() {
    let home = TestHome::new();
    home.json(&["task", "add", "Temporary task"]);

    home.cmd().arg("reset").assert().failure().code(2);

    let data = home.json(&["reset", "--yes"]);
    assert_eq!(data["tasks"], 4);
    assert_eq!(data["templates"], 2);
}

#[test]
fn invalid_config_file_is_reported() {
    let home = TestHome::new();
    home.write_config("[advisor]\ntimeout_secs = 9999\n");
    home.cmd()
        .args(["task", "list"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("timeout_secs"));
}

#[test]
fn unreadable_state_is_kept_and_reported() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new();
    let original = r#"{ "tasks": [{ "id": "1", "dueDate": "someday" }] }"#;
    std::fs::write(home.state_path(), original)?;

    home.cmd()
        .args(["task", "list", "--json"])
        .assert()
        .success()
        .stderr(predicate::str::contains("warning: state file"))
        .stderr(predicate::str::contains("moved to"));

    let kept: Vec<_> = std::fs::read_dir(home.path())?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().contains(".corrupt-"))
        .collect();
    assert_eq!(kept.len(), 1);
    assert_eq!(std::fs::read_to_string(kept[0].path())?, original);

    // The fresh seed state is readable again on the next run.
    home.cmd()
        .args(["task", "list"])
        .assert()
        .success()
        .stderr(predicate::str::contains("warning").not());
    Ok(())
}

#[test]
fn init_writes_default_config_once() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new();
    let path = home.path().join("conf").join("trackwise.toml");
    let path_arg = path.to_string_lossy().to_string();

    let data = home.json(&["init", "--config", &path_arg]);
    assert_eq!(data["written"], true);
    let config = trackwise::config::Config::load(&path)?;
    assert_eq!(config.advisor.base_url, "http://localhost:11434");

    std::fs::write(&path, "[advisor]\nmodel = \"mistral\"\n")?;
    let data = home.json(&["init", "--config", &path_arg]);
    assert_eq!(data["written"], false);
    assert_eq!(trackwise::config::Config::load(&path)?.advisor.model, "mistral");

    let data = home.json(&["init", "--config", &path_arg, "--force"]);
    assert_eq!(data["written"], true);
    assert_eq!(trackwise::config::Config::load(&path)?.advisor.model, "llama3.2");
    Ok(())
}
