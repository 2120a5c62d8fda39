mod support;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use support::{at, completed_task, ids, task};
use trackwise::advisor::{
    build_prompt, parse_response, suggest_blocking, suggest_order, AdvisorError, OrderAdvisor,
    OrderRequest, OrderResponse, OrderSuggestion, SuggestionGate, EMPTY_REASONING,
    FALLBACK_REASONING,
};
use trackwise::model::Task;
use trackwise::state::{apply_at, Action, TrackerState};

struct Reversing {
    calls: AtomicUsize,
}

impl OrderAdvisor for Reversing {
    fn suggest(&self, request: &OrderRequest) -> Result<OrderResponse, AdvisorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut ordered_task_ids = request.task_ids();
        ordered_task_ids.reverse();
        Ok(OrderResponse {
            ordered_task_ids,
            reasoning: "Reverse everything.".to_string(),
        })
    }
}

struct Failing;

impl OrderAdvisor for Failing {
    fn suggest(&self, _request: &OrderRequest) -> Result<OrderResponse, AdvisorError> {
        Err(AdvisorError::Unavailable {
            url: "http://127.0.0.1:9".to_string(),
        })
    }
}

struct Slow;

impl OrderAdvisor for Slow {
    fn suggest(&self, request: &OrderRequest) -> Result<OrderResponse, AdvisorError> {
        std::thread::sleep(Duration::from_millis(500));
        Ok(OrderResponse {
            ordered_task_ids: request.task_ids(),
            reasoning: "Too late.".to_string(),
        })
    }
}

fn todays_tasks() -> Vec<Task> {
    let mut first = task("first");
    first.due_date = at(10, 9);
    let mut second = task("second");
    second.due_date = at(10, 11);
    let mut third = task("third");
    third.due_date = at(10, 15);
    vec![first, second, third]
}

fn request() -> OrderRequest {
    OrderRequest::for_today(&todays_tasks(), &at(10, 12))
}

#[test]
fn request_covers_every_task_due_today() {
    let mut tasks = todays_tasks();
    tasks.push(completed_task("done", at(10, 9), at(10, 10)));
    let mut tomorrow = task("tomorrow");
    tomorrow.due_date = at(11, 9);
    tasks.push(tomorrow);

    let request = OrderRequest::for_today(&tasks, &at(10, 12));
    assert_eq!(request.task_ids(), vec!["first", "second", "third", "done"]);
    assert_eq!(request.tasks[0].due_date, "2026-03-10");
    assert_eq!(request.tasks[0].category, "Work");
    assert_eq!(request.tasks[0].priority, "Medium");
}

#[test]
fn request_serializes_with_camel_case_keys() -> Result<(), Box<dyn std::error::Error>> {
    let value = serde_json::to_value(request())?;
    assert_eq!(value["tasks"][0]["dueDate"], "2026-03-10");
    assert_eq!(value["tasks"][0]["id"], "first");
    Ok(())
}

#[test]
fn successful_suggestion_is_marked_suggested() {
    let advisor = Reversing {
        calls: AtomicUsize::new(0),
    };
    let suggestion = suggest_blocking(&advisor, &request());
    assert!(!suggestion.is_fallback());
    assert_eq!(suggestion.ordered_task_ids(), ["third", "second", "first"]);
    assert_eq!(suggestion.reasoning(), "Reverse everything.");
    assert_eq!(advisor.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn failure_falls_back_to_the_original_order() {
    let suggestion = suggest_blocking(&Failing, &request());
    assert!(suggestion.is_fallback());
    assert_eq!(suggestion.ordered_task_ids(), ["first", "second", "third"]);
    assert_eq!(suggestion.reasoning(), FALLBACK_REASONING);
}

#[test]
fn fallback_moves_todays_tasks_ahead_of_later_ones() {
    let mut later = task("later");
    later.due_date = at(12, 9);
    let mut tasks = vec![later];
    tasks.extend(todays_tasks());
    let state = TrackerState {
        tasks,
        ..TrackerState::default()
    };

    let request = OrderRequest::for_today(&state.tasks, &at(10, 12));
    let suggestion = suggest_blocking(&Failing, &request);
    let applied = apply_at(state.clone(), suggestion.to_action(), at(10, 12));
    assert_eq!(
        ids(&applied.tasks),
        vec!["first", "second", "third", "later"]
    );

    let suggested = suggest_blocking(
        &Reversing {
            calls: AtomicUsize::new(0),
        },
        &request,
    );
    let applied = apply_at(state, suggested.to_action(), at(10, 12));
    assert_eq!(
        ids(&applied.tasks),
        vec!["third", "second", "first", "later"]
    );
}

#[test]
fn fallback_keeps_todays_list_in_place() {
    let done = completed_task("done", at(10, 8), at(10, 9));
    let mut a = task("a");
    a.due_date = at(10, 10);
    let mut b = task("b");
    b.due_date = at(10, 11);
    let state = TrackerState {
        tasks: vec![done, a, b],
        ..TrackerState::default()
    };

    let request = OrderRequest::for_today(&state.tasks, &at(10, 12));
    assert_eq!(request.len(), 3);
    let suggestion = suggest_blocking(&Failing, &request);
    assert!(suggestion.is_fallback());
    assert_eq!(suggestion.reasoning(), FALLBACK_REASONING);

    let applied = apply_at(state.clone(), suggestion.to_action(), at(10, 12));
    assert_eq!(applied, state);
    assert_eq!(ids(&applied.tasks), vec!["done", "a", "b"]);
}

#[test]
fn empty_request_skips_the_advisor() {
    let advisor = Reversing {
        calls: AtomicUsize::new(0),
    };
    let suggestion = suggest_blocking(&advisor, &OrderRequest::default());
    assert!(suggestion.ordered_task_ids().is_empty());
    assert_eq!(suggestion.reasoning(), EMPTY_REASONING);
    assert_eq!(advisor.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn suggestion_converts_to_a_reorder_action() {
    let suggestion = OrderSuggestion::fallback(&request());
    assert_eq!(
        suggestion.to_action(),
        Action::ReorderTasks(vec![
            "first".to_string(),
            "second".to_string(),
            "third".to_string()
        ])
    );
}

#[tokio::test]
async fn async_suggestion_uses_the_advisor() {
    let advisor = Arc::new(Reversing {
        calls: AtomicUsize::new(0),
    });
    let suggestion = suggest_order(Arc::clone(&advisor), request(), Duration::from_secs(5)).await;
    assert!(!suggestion.is_fallback());
    assert_eq!(suggestion.ordered_task_ids(), ["third", "second", "first"]);
    assert_eq!(advisor.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn slow_advisor_times_out_into_fallback() {
    let suggestion = suggest_order(Arc::new(Slow), request(), Duration::from_millis(50)).await;
    assert!(suggestion.is_fallback());
    assert_eq!(suggestion.ordered_task_ids(), ["first", "second", "third"]);
}

#[tokio::test]
async fn async_failure_falls_back() {
    let suggestion = suggest_order(Arc::new(Failing), request(), Duration::from_secs(5)).await;
    assert!(suggestion.is_fallback());
    assert_eq!(suggestion.reasoning(), FALLBACK_REASONING);
}

#[test]
fn gate_rejects_overlapping_requests() {
    let gate = SuggestionGate::new();
    assert!(!gate.is_busy());
    {
        let guard = gate.try_begin();
        assert!(guard.is_some());
        assert!(gate.is_busy());
        assert!(gate.try_begin().is_none());
    }
    assert!(!gate.is_busy());
    assert!(gate.try_begin().is_some());
}

#[test]
fn prompt_lists_every_candidate() {
    let prompt = build_prompt(&request());
    for id in ["first", "second", "third"] {
        assert!(prompt.contains(&format!("ID: {id}")), "missing {id} in prompt");
    }
    assert!(prompt.contains("Due: 2026-03-10"));
    assert!(prompt.contains("orderedTaskIds"));
}

#[test]
fn parses_model_answers() -> Result<(), Box<dyn std::error::Error>> {
    let response = parse_response(
        r#"  {"orderedTaskIds": ["b", "a"], "reasoning": "High priority first."} "#,
    )?;
    assert_eq!(response.ordered_task_ids, vec!["b", "a"]);
    assert_eq!(response.reasoning, "High priority first.");

    let err = parse_response("I think you should start with b").unwrap_err();
    assert!(matches!(err, AdvisorError::ParseError { .. }));
    Ok(())
}
