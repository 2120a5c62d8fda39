//! Suggested task ordering from a language model.
//!
//! The advisor is an external collaborator. Callers build an
//! [`OrderRequest`], hand it to [`suggest_order`] (async, with a timeout)
//! or [`suggest_blocking`], and always get an [`OrderSuggestion`] back:
//! either a genuine suggestion or a fallback that keeps the original order
//! and explains why. The result feeds `Action::ReorderTasks` either way.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analytics::tasks_due_today;
use crate::config::AdvisorConfig;
use crate::model::Task;
use crate::state::Action;

/// Reasoning attached to a fallback suggestion.
pub const FALLBACK_REASONING: &str =
    "Could not generate an AI suggestion. Showing the original task order.";

/// Reasoning attached to the suggestion for an empty request.
pub const EMPTY_REASONING: &str = "There are no tasks to suggest an order for.";

/// Fewest tasks worth asking the advisor about.
pub const MIN_TASKS_FOR_SUGGESTION: usize = 2;

/// Errors from the ordering advisor.
#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("advisor is not available at {url}")]
    Unavailable { url: String },

    #[error("advisor request failed: {message}")]
    RequestFailed { message: String },

    #[error("failed to parse advisor response: {message}")]
    ParseError { message: String },

    #[error("advisor request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
}

/// One task as presented to the advisor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCandidate {
    pub id: String,
    pub title: String,
    pub category: String,
    pub priority: String,
    /// Calendar date, `YYYY-MM-DD`.
    pub due_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub tasks: Vec<OrderCandidate>,
}

impl OrderRequest {
    /// Candidates for `tasks`, with due dates rendered in `tz`.
    pub fn from_tasks<'a, Tz: TimeZone>(tasks: impl IntoIterator<Item = &'a Task>, tz: &Tz) -> Self {
        let tasks = tasks
            .into_iter()
            .map(|task| OrderCandidate {
                id: task.id.clone(),
                title: task.title.clone(),
                category: task.category.to_string(),
                priority: task.priority.to_string(),
                due_date: task
                    .due_date
                    .with_timezone(tz)
                    .date_naive()
                    .format("%Y-%m-%d")
                    .to_string(),
            })
            .collect();
        Self { tasks }
    }

    /// Every task due on the calendar day of `now`, completed or not, in
    /// stored order. A fallback over this request leaves the list as is.
    pub fn for_today<Tz: TimeZone>(tasks: &[Task], now: &DateTime<Tz>) -> Self {
        Self::from_tasks(tasks_due_today(tasks, now), &now.timezone())
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn task_ids(&self) -> Vec<String> {
        self.tasks.iter().map(|task| task.id.clone()).collect()
    }
}

/// Raw advisor answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub ordered_task_ids: Vec<String>,
    pub reasoning: String,
}

/// What the caller gets back: a real suggestion, or the original order
/// with an explanation of the failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum OrderSuggestion {
    Suggested {
        ordered_task_ids: Vec<String>,
        reasoning: String,
    },
    Fallback {
        ordered_task_ids: Vec<String>,
        reasoning: String,
    },
}

impl OrderSuggestion {
    pub fn fallback(request: &OrderRequest) -> Self {
        OrderSuggestion::Fallback {
            ordered_task_ids: request.task_ids(),
            reasoning: FALLBACK_REASONING.to_string(),
        }
    }

    pub fn ordered_task_ids(&self) -> &[String] {
        match self {
            OrderSuggestion::Suggested {
                ordered_task_ids, ..
            }
            | OrderSuggestion::Fallback {
                ordered_task_ids, ..
            } => ordered_task_ids,
        }
    }

    pub fn reasoning(&self) -> &str {
        match self {
            OrderSuggestion::Suggested { reasoning, .. }
            | OrderSuggestion::Fallback { reasoning, .. } => reasoning,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, OrderSuggestion::Fallback { .. })
    }

    /// The reorder action that applies this suggestion.
    pub fn to_action(&self) -> Action {
        Action::ReorderTasks(self.ordered_task_ids().to_vec())
    }
}

impl From<OrderResponse> for OrderSuggestion {
    fn from(response: OrderResponse) -> Self {
        OrderSuggestion::Suggested {
            ordered_task_ids: response.ordered_task_ids,
            reasoning: response.reasoning,
        }
    }
}

/// An external service that proposes an execution order.
pub trait OrderAdvisor: Send + Sync + 'static {
    fn suggest(&self, request: &OrderRequest) -> Result<OrderResponse, AdvisorError>;
}

fn empty_suggestion() -> OrderSuggestion {
    OrderSuggestion::Suggested {
        ordered_task_ids: Vec::new(),
        reasoning: EMPTY_REASONING.to_string(),
    }
}

/// Ask `advisor` synchronously, degrading to the original order on failure.
pub fn suggest_blocking<A: OrderAdvisor + ?Sized>(
    advisor: &A,
    request: &OrderRequest,
) -> OrderSuggestion {
    if request.is_empty() {
        return empty_suggestion();
    }
    match advisor.suggest(request) {
        Ok(response) => response.into(),
        Err(err) => {
            tracing::warn!(error = %err, "advisor failed; keeping original order");
            OrderSuggestion::fallback(request)
        }
    }
}

/// Ask `advisor` on the blocking pool, giving up after `timeout`.
///
/// Never fails: errors, panics, and timeouts all yield a fallback.
pub async fn suggest_order<A: OrderAdvisor>(
    advisor: Arc<A>,
    request: OrderRequest,
    timeout: Duration,
) -> OrderSuggestion {
    if request.is_empty() {
        return empty_suggestion();
    }

    let worker_request = request.clone();
    let call = tokio::task::spawn_blocking(move || advisor.suggest(&worker_request));

    let err = match tokio::time::timeout(timeout, call).await {
        Ok(Ok(Ok(response))) => return response.into(),
        Ok(Ok(Err(err))) => err,
        Ok(Err(join_err)) => AdvisorError::RequestFailed {
            message: join_err.to_string(),
        },
        Err(_) => AdvisorError::Timeout {
            timeout_secs: timeout.as_secs(),
        },
    };
    tracing::warn!(error = %err, "advisor failed; keeping original order");
    OrderSuggestion::fallback(&request)
}

/// Prevents a second suggestion request while one is outstanding.
#[derive(Debug, Default)]
pub struct SuggestionGate {
    busy: AtomicBool,
}

impl SuggestionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the gate. `None` while another request holds it.
    pub fn try_begin(&self) -> Option<SuggestionGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SuggestionGuard { gate: self })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the gate when dropped, whatever the outcome of the request.
#[derive(Debug)]
pub struct SuggestionGuard<'a> {
    gate: &'a SuggestionGate,
}

impl Drop for SuggestionGuard<'_> {
    fn drop(&mut self) {
        self.gate.busy.store(false, Ordering::Release);
    }
}

const SYSTEM_PROMPT: &str = "You are an expert productivity assistant. \
Your goal is to help users order their daily tasks for maximum efficiency.";

/// Prompt sent to the model for `request`.
pub fn build_prompt(request: &OrderRequest) -> String {
    let mut prompt = String::from(
        "Analyze the following list of tasks for today. Consider the priority, \
category and title of each task to decide the best order of execution.\n\nTasks:\n",
    );
    for task in &request.tasks {
        prompt.push_str(&format!(
            "- ID: {}, Title: \"{}\", Category: {}, Priority: {}, Due: {}\n",
            task.id, task.title, task.category, task.priority, task.due_date
        ));
    }
    prompt.push_str(
        "\nReturn a JSON object with two keys:\n\
1. \"orderedTaskIds\": an array of the task IDs in the order you suggest completing them.\n\
2. \"reasoning\": a short explanation (1-2 sentences) of your strategy.\n\n\
Put high-priority tasks first. Group tasks by category where possible to \
minimize context switching. Low-priority tasks should go last.",
    );
    prompt
}

/// Advisor backed by an Ollama server (`/api/generate`, JSON mode).
#[derive(Debug, Clone)]
pub struct OllamaAdvisor {
    base_url: String,
    model: String,
    timeout_secs: u64,
}

impl OllamaAdvisor {
    pub fn new(config: &AdvisorConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl OrderAdvisor for OllamaAdvisor {
    fn suggest(&self, request: &OrderRequest) -> Result<OrderResponse, AdvisorError> {
        let url = format!("{}/api/generate", self.base_url);
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build();

        let body = serde_json::json!({
            "model": self.model,
            "system": SYSTEM_PROMPT,
            "prompt": build_prompt(request),
            "format": "json",
            "stream": false,
        });

        let resp = agent
            .post(&url)
            .set("Content-Type", "application/json")
            .send_json(body)
            .map_err(|err| match err {
                ureq::Error::Transport(transport) => AdvisorError::Unavailable {
                    url: format!("{} ({transport})", self.base_url),
                },
                other => AdvisorError::RequestFailed {
                    message: other.to_string(),
                },
            })?;

        let envelope: serde_json::Value =
            resp.into_json().map_err(|err| AdvisorError::ParseError {
                message: err.to_string(),
            })?;
        let text = envelope["response"]
            .as_str()
            .ok_or_else(|| AdvisorError::ParseError {
                message: "missing 'response' field".to_string(),
            })?;

        parse_response(text)
    }
}

/// Parse the model's JSON answer.
pub fn parse_response(text: &str) -> Result<OrderResponse, AdvisorError> {
    serde_json::from_str(text.trim()).map_err(|err| AdvisorError::ParseError {
        message: err.to_string(),
    })
}
