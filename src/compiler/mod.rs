//! Event-to-action compiler.
//!
//! `compile` folds an ordered event stream into an [`ActionPlan`]. Events that
//! cannot be translated are logged and reported in [`Compilation::skipped`];
//! they never stop the fold. `compile_task` additionally checks the
//! task-start precondition and wraps the plan in a [`ReplayBundle`].

pub mod fragment;
pub mod selector;
pub mod translate;

pub use fragment::{attributes, read_fragment, FragmentInfo};
pub use selector::{synthesize, SelectorResult, TagMatch};
pub use translate::translate;

use crate::error::{CompileError, SkipReason};
use crate::models::{ActionPlan, EventKind, RecordedEvent, ReplayBundle};

/// An event that contributed no actions, and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEvent {
    pub index: usize,
    pub event_type: String,
    pub reason: SkipReason,
}

/// Result of folding an event stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compilation {
    pub plan: ActionPlan,
    pub skipped: Vec<SkippedEvent>,
}

/// Identity of the recorded task, taken from its task-start event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskHeader {
    pub task_id: String,
    pub task_description: String,
}

/// Translate every event in stream order and concatenate the actions
pub fn compile(events: &[RecordedEvent]) -> Compilation {
    events
        .iter()
        .enumerate()
        .fold(Compilation::default(), |mut acc, (index, event)| {
            match translate(event) {
                Ok(actions) => acc.plan.extend(actions),
                Err(reason) => {
                    tracing::warn!("Skipping event #{} ({}): {}", index, event.kind, reason);
                    acc.skipped.push(SkippedEvent {
                        index,
                        event_type: event.kind.to_string(),
                        reason,
                    });
                }
            }
            acc
        })
}

/// Check the task-start precondition, labelling events by stream position
pub fn validate_stream(events: &[RecordedEvent]) -> Result<TaskHeader, CompileError> {
    validate_labeled(events, |index| format!("event #{}", index))
}

/// Check the task-start precondition.
///
/// The stream must start with the only task-start event, and that event must
/// carry both a task id and a description. `label` names an event in
/// diagnostics (a file name when events come from disk).
pub fn validate_labeled<F>(events: &[RecordedEvent], label: F) -> Result<TaskHeader, CompileError>
where
    F: Fn(usize) -> String,
{
    let first = events.first().ok_or(CompileError::EmptyStream)?;

    let starts: Vec<usize> = events
        .iter()
        .enumerate()
        .filter(|(_, event)| event.kind == EventKind::TaskStart)
        .map(|(index, _)| index)
        .collect();

    match starts.as_slice() {
        [] => return Err(CompileError::MissingTaskStart),
        [_] => {}
        many => {
            return Err(CompileError::MultipleTaskStarts(
                many.iter().map(|&index| label(index)).collect(),
            ))
        }
    }

    if first.kind != EventKind::TaskStart {
        return Err(CompileError::TaskStartNotFirst {
            location: label(0),
            found: first.kind.to_string(),
        });
    }

    let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());
    match (non_empty(&first.task_id), non_empty(&first.task_description)) {
        (Some(task_id), Some(task_description)) => Ok(TaskHeader {
            task_id,
            task_description,
        }),
        _ => Err(CompileError::MissingTaskMetadata(label(0))),
    }
}

/// Validate and compile one recorded task into an exact-replay bundle
pub fn compile_task(events: &[RecordedEvent]) -> Result<ReplayBundle, CompileError> {
    let header = validate_stream(events)?;
    Ok(bundle_for(header, compile(events)))
}

/// Wrap a compiled plan with its task identity
pub fn bundle_for(header: TaskHeader, compilation: Compilation) -> ReplayBundle {
    if !compilation.skipped.is_empty() {
        tracing::info!(
            "Task {}: {} event(s) produced no actions",
            header.task_id,
            compilation.skipped.len()
        );
    }
    ReplayBundle::exact(header.task_description, header.task_id, compilation.plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Action;
    use serde_json::json;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    fn stream(values: serde_json::Value) -> Vec<RecordedEvent> {
        serde_json::from_value(values).unwrap()
    }

    fn recorded_session() -> Vec<RecordedEvent> {
        stream(json!([
            {
                "type": "task-start",
                "taskId": "kb-1",
                "taskDescription": "Find the top rated keyboard",
                "eventTarget": {},
                "allEvents": [{ "type": "task-start", "current_url": "https://shop.example/" }]
            },
            {
                "type": "submit",
                "taskId": "kb-1",
                "eventTarget": { "target": "<form role=\"search\">", "selector": "form[role=\"search\"]" },
                "allEvents": {
                    "k": { "value": "keyboard", "selector": "#search", "tag": "input", "type": "text" }
                }
            },
            { "type": "scroll", "taskId": "kb-1" },
            {
                "type": "click",
                "taskId": "kb-1",
                "eventTarget": { "target": "<span class=\"a-size\">Avg. Customer Review</span>" }
            },
            {
                "type": "task-finish",
                "taskId": "kb-1",
                "taskDescription": "Find the top rated keyboard"
            }
        ]))
    }

    #[test]
    fn test_compile_concatenates_in_stream_order() {
        let compilation = compile(&recorded_session());
        let names: Vec<_> = compilation.plan.iter().map(Action::name).collect();
        assert_eq!(
            names,
            vec![
                "open_tab",
                "wait_for_element",
                "input_text_by_selector",
                "send_keys",
                "wait_for_element",
                "click_element_by_text",
                "extract_content",
                "done",
            ]
        );
    }

    #[test]
    fn test_unknown_event_is_reported_not_fatal() {
        let compilation = compile(&recorded_session());
        assert_eq!(
            compilation.skipped,
            vec![SkippedEvent {
                index: 2,
                event_type: "scroll".to_string(),
                reason: SkipReason::UnknownEventType("scroll".to_string()),
            }]
        );
    }

    /// Shared buffer the test subscriber writes formatted log lines into
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn lines(&self) -> Vec<String> {
            String::from_utf8(self.0.lock().unwrap().clone())
                .unwrap()
                .lines()
                .map(String::from)
                .collect()
        }
    }

    #[test]
    fn test_unknown_event_logs_one_warning_and_leaves_plan_unchanged() {
        let events = stream(json!([{ "type": "scroll" }]));
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let compilation = tracing::subscriber::with_default(subscriber, || compile(&events));

        assert!(compilation.plan.is_empty());
        assert_eq!(compilation.skipped.len(), 1);
        let warnings: Vec<_> = logs
            .lines()
            .into_iter()
            .filter(|line| line.contains("WARN"))
            .collect();
        assert_eq!(warnings.len(), 1, "Expected one warning, got {:?}", warnings);
        assert!(warnings[0].contains("unknown event type 'scroll'"));
    }

    #[test]
    fn test_compile_is_deterministic() {
        let events = recorded_session();
        let first = serde_json::to_string(&compile(&events).plan).unwrap();
        let second = serde_json::to_string(&compile(&events).plan).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_task_start_only() {
        let events = stream(json!([{
            "type": "task-start",
            "taskId": "t",
            "taskDescription": "d",
            "allEvents": [{ "current_url": "https://example.com/" }]
        }]));
        let bundle = compile_task(&events).unwrap();
        assert_eq!(bundle.action_list.actions(), &[Action::open_tab("https://example.com/")]);
        assert_eq!(bundle.task_id, "t");
        assert_eq!(bundle.ultimate_goal, "d");
    }

    #[test]
    fn test_validate_rejects_missing_task_start() {
        let events = stream(json!([{ "type": "click" }]));
        assert_eq!(validate_stream(&events), Err(CompileError::MissingTaskStart));
        assert_eq!(validate_stream(&[]), Err(CompileError::EmptyStream));
    }

    #[test]
    fn test_validate_rejects_multiple_task_starts() {
        let events = stream(json!([
            { "type": "task-start", "taskId": "a", "taskDescription": "x" },
            { "type": "click" },
            { "type": "task-start", "taskId": "b", "taskDescription": "y" }
        ]));
        assert_eq!(
            validate_stream(&events),
            Err(CompileError::MultipleTaskStarts(vec![
                "event #0".to_string(),
                "event #2".to_string()
            ]))
        );
    }

    #[test]
    fn test_validate_rejects_late_task_start() {
        let events = stream(json!([
            { "type": "click" },
            { "type": "task-start", "taskId": "a", "taskDescription": "x" }
        ]));
        let err = validate_labeled(&events, |i| format!("file-{}.json", i)).unwrap_err();
        assert_eq!(
            err,
            CompileError::TaskStartNotFirst {
                location: "file-0.json".to_string(),
                found: "click".to_string(),
            }
        );
    }

    #[test]
    fn test_validate_requires_task_metadata() {
        let events = stream(json!([{ "type": "task-start", "taskId": "a", "taskDescription": "" }]));
        assert_eq!(
            validate_stream(&events),
            Err(CompileError::MissingTaskMetadata("event #0".to_string()))
        );
    }
}
