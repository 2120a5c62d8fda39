//! Output rendering shared by the trackwise commands.
//!
//! Every command produces a serializable payload plus an optional
//! [`HumanOutput`]. With `--json` the payload is wrapped in a versioned
//! envelope on stdout; otherwise the human rendering is printed.

use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};

pub const SCHEMA_VERSION: &str = "trackwise.v1";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

/// Plain-text report: a header, then optional summary, detail and
/// warning sections.
#[derive(Debug, Clone)]
pub struct HumanOutput {
    header: String,
    summary: Vec<(String, String)>,
    details: Vec<String>,
    warnings: Vec<String>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            summary: Vec::new(),
            details: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Add a `key: value` summary line. An empty value prints the key alone.
    pub fn push_summary(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.summary.push((key.into(), value.into()));
    }

    pub fn push_detail(&mut self, value: impl Into<String>) {
        self.details.push(value.into());
    }

    pub fn push_warning(&mut self, value: impl Into<String>) {
        self.warnings.push(value.into());
    }
}

impl fmt::Display for HumanOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.header)?;

        let summary: Vec<String> = self
            .summary
            .iter()
            .map(|(key, value)| {
                if value.is_empty() {
                    key.clone()
                } else {
                    format!("{key}: {value}")
                }
            })
            .collect();

        for (title, items) in [
            ("Summary", summary.as_slice()),
            ("Details", self.details.as_slice()),
            ("Warnings", self.warnings.as_slice()),
        ] {
            if items.is_empty() {
                continue;
            }
            write!(f, "\n\n{title}:")?;
            for item in items {
                write!(f, "\n- {item}")?;
            }
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct SuccessEnvelope<'a, T: Serialize> {
    schema_version: &'static str,
    command: &'a str,
    status: &'static str,
    data: &'a T,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    warnings: &'a [String],
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    schema_version: &'static str,
    command: &'a str,
    status: &'static str,
    error: ErrorBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<&'static str>,
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    code: i32,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        let envelope = SuccessEnvelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            data,
            warnings: human.map(|h| h.warnings.as_slice()).unwrap_or_default(),
        };
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    } else if let Some(human) = human.filter(|_| !options.quiet) {
        println!("{human}");
    }
    Ok(())
}

pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let hint = error_hint(err);
    if !json {
        eprintln!("error: {err}");
        if let Some(hint) = hint {
            eprintln!("hint: {hint}");
        }
        return Ok(());
    }

    let envelope = ErrorEnvelope {
        schema_version: SCHEMA_VERSION,
        command,
        status: "error",
        error: ErrorBody {
            message: err.to_string(),
            code: err.exit_code(),
            kind: err.kind(),
            details: err.details(),
        },
        hint,
    };
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

/// Warning not tied to a command result. Written to stderr so JSON on
/// stdout stays parseable.
pub fn emit_warning(options: OutputOptions, message: &str) {
    if !options.quiet {
        eprintln!("warning: {message}");
    }
}

fn error_hint(err: &Error) -> Option<&'static str> {
    match err {
        Error::TaskNotFound(_) => Some("trackwise task list"),
        Error::ChecklistItemNotFound(_) => Some("trackwise check list"),
        Error::TemplateNotFound(_) => Some("trackwise template list"),
        Error::AmbiguousId { .. } => Some("use more characters of the id"),
        Error::InvalidConfig(_) => Some("fix trackwise.toml then retry"),
        Error::LockFailed(_) => Some("another trackwise process may be writing; retry"),
        _ => None,
    }
}

pub fn format_human(output: &HumanOutput) -> String {
    output.to_string()
}

/// Best-effort command name for error envelopes, read before clap parses.
pub fn infer_command_name_from_args() -> String {
    command_name(std::env::args().skip(1))
}

fn command_name(mut args: impl Iterator<Item = String>) -> String {
    let mut command = None;
    while let Some(arg) = args.next() {
        if matches!(arg.as_str(), "--state" | "--config") {
            args.next();
        } else if !arg.starts_with('-') {
            command = Some(arg);
            break;
        }
    }

    match command {
        None => "trackwise".to_string(),
        Some(group) if matches!(group.as_str(), "task" | "check" | "template") => {
            match args.find(|arg| !arg.starts_with('-')) {
                Some(sub) => format!("{group} {sub}"),
                None => group,
            }
        }
        Some(command) => command,
    }
}
