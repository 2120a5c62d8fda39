//! trackwise init command.
//!
//! Writes a default `trackwise.toml` to `--config` or the platform config
//! directory. Does not touch the state file.

use std::path::PathBuf;

use serde::Serialize;

use crate::cli::{output_options, CommonOptions};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};

#[derive(Serialize)]
struct InitReport {
    config: PathBuf,
    written: bool,
}

pub fn run(force: bool, common: CommonOptions) -> Result<()> {
    let path = match &common.config {
        Some(path) => path.clone(),
        None => Config::default_path().ok_or_else(|| {
            Error::InvalidConfig(
                "cannot determine a config directory; pass --config".to_string(),
            )
        })?,
    };

    if path.exists() && !path.is_file() {
        return Err(Error::OperationFailed(format!(
            "config path exists but is not a file: {}",
            path.display()
        )));
    }

    let written = force || !path.exists();
    if written {
        Config::default().save(&path)?;
        tracing::debug!(path = %path.display(), "wrote default config");
    }

    let mut human = HumanOutput::new(if written {
        "trackwise init: wrote default config"
    } else {
        "trackwise init: nothing to do"
    });
    human.push_summary("Config", path.display().to_string());
    if !written {
        human.push_warning("config file already exists; pass --force to overwrite it");
    }

    emit_success(
        output_options(&common),
        "init",
        &InitReport {
            config: path,
            written,
        },
        Some(&human),
    )
}
