#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;
use trackwise::model::{Category, CompletionState, Priority, Task, TaskTemplate, TemplateTask};

/// 2026-03-10 at the given hour, UTC.
pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap()
}

pub fn task(id: &str) -> Task {
    Task {
        id: id.to_string(),
        title: format!("Task {id}"),
        category: Category::Work,
        priority: Priority::Medium,
        due_date: at(10, 9),
        completion: CompletionState::Pending,
    }
}

pub fn completed_task(id: &str, due: DateTime<Utc>, done: DateTime<Utc>) -> Task {
    Task {
        due_date: due,
        completion: CompletionState::Completed { at: done },
        ..task(id)
    }
}

pub fn template(id: &str, titles: &[&str]) -> TaskTemplate {
    TaskTemplate {
        id: id.to_string(),
        name: format!("Template {id}"),
        tasks: titles
            .iter()
            .enumerate()
            .map(|(index, title)| TemplateTask {
                id: format!("{id}-{index}"),
                title: title.to_string(),
                category: Category::Health,
                priority: Priority::High,
            })
            .collect(),
    }
}

pub fn ids(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|task| task.id.as_str()).collect()
}

/// Isolated state + config files for CLI tests.
pub struct TestHome {
    dir: TempDir,
}

impl TestHome {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let home = Self { dir };
        home.write_config(
            r#"
[advisor]
base_url = "http://127.0.0.1:9"
timeout_secs = 2
"#,
        );
        home
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn state_path(&self) -> PathBuf {
        self.dir.path().join("trackwise_state.json")
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("trackwise.toml")
    }

    pub fn write_config(&self, contents: &str) {
        std::fs::write(self.config_path(), contents).expect("write config");
    }

    pub fn read_state(&self) -> serde_json::Value {
        let raw = std::fs::read_to_string(self.state_path()).expect("read state");
        serde_json::from_str(&raw).expect("parse state")
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("trackwise").expect("binary");
        cmd.env("TRACKWISE_STATE", self.state_path())
            .env("TRACKWISE_CONFIG", self.config_path())
            .env_remove("RUST_LOG");
        cmd
    }

    /// Run a command with `--json` and return the `data` payload.
    pub fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self
            .cmd()
            .args(args)
            .arg("--json")
            .output()
            .expect("run trackwise");
        assert!(
            output.status.success(),
            "trackwise {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        let envelope: serde_json::Value =
            serde_json::from_slice(&output.stdout).expect("json output");
        envelope["data"].clone()
    }
}
