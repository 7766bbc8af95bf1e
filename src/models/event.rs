use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Kind of a recorded interaction, read from the recorder's `type` field.
///
/// A `type` that is not a string (null, a number) becomes `Unknown` carrying
/// its JSON text, so the event is reported like any other unknown kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value", into = "String")]
pub enum EventKind {
    TaskStart,
    Click,
    GoBackOrForward,
    Submit,
    InputChange,
    TaskFinish,
    /// A type with no translation rule (e.g. "scroll", "dblclick")
    Unknown(String),
}

impl EventKind {
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::TaskStart => "task-start",
            EventKind::Click => "click",
            EventKind::GoBackOrForward => "go-back-or-forward",
            EventKind::Submit => "submit",
            EventKind::InputChange => "input-change",
            EventKind::TaskFinish => "task-finish",
            EventKind::Unknown(other) => other,
        }
    }
}

impl Default for EventKind {
    fn default() -> Self {
        EventKind::Unknown(String::new())
    }
}

impl From<String> for EventKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "task-start" => EventKind::TaskStart,
            "click" => EventKind::Click,
            "go-back-or-forward" => EventKind::GoBackOrForward,
            "submit" => EventKind::Submit,
            "input-change" => EventKind::InputChange,
            "task-finish" => EventKind::TaskFinish,
            _ => EventKind::Unknown(value),
        }
    }
}

impl From<Value> for EventKind {
    fn from(value: Value) -> Self {
        match value {
            Value::String(name) => EventKind::from(name),
            other => EventKind::Unknown(other.to_string()),
        }
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The DOM element an event acted upon, as captured by the recorder
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetDescriptor {
    /// Element id at record time (often an empty string)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    /// Raw opening-tag fragment, or the destination URL for navigation events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Current form value; null when not applicable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Pre-resolved locator of the form (submit events only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
}

/// One control's contribution to a submitted form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlSnapshot {
    #[serde(default)]
    pub selector: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default, rename = "type")]
    pub control_type: Option<String>,
    /// Null when the control did not contribute (unchecked checkbox)
    #[serde(default)]
    pub value: Option<Value>,
}

/// An entry of the navigation history attached to task boundaries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigationEntry {
    #[serde(default)]
    pub current_url: Option<String>,
}

/// Payload of `allEvents`. Its shape depends on the event kind: a name-keyed
/// control map for submissions, a list for everything else, and sometimes an
/// empty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubEvents {
    Controls(Map<String, Value>),
    List(Vec<Value>),
    Other(Value),
}

/// One captured interaction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedEvent {
    #[serde(rename = "type", default)]
    pub kind: EventKind,
    #[serde(default)]
    pub event_target: Option<TargetDescriptor>,
    #[serde(default)]
    pub all_events: Option<SubEvents>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub task_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub task_description: Option<String>,
    /// Recorder fields the compiler does not read (eventHash, pageHTMLContent, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Text fields the recorder usually sends as strings but sometimes as numbers
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.map(|value| value_text(&value)))
}

impl RecordedEvent {
    /// First entry of the navigation history carried by task-start events.
    ///
    /// `None` when there is no history or the first entry is malformed; later
    /// entries are never consulted.
    pub fn first_navigation(&self) -> Option<NavigationEntry> {
        match &self.all_events {
            Some(SubEvents::List(items)) => items
                .first()
                .and_then(|item| serde_json::from_value(item.clone()).ok()),
            _ => None,
        }
    }

    /// Controls of a form submission in insertion order.
    ///
    /// Returns `None` when `allEvents` is not a control map. Entries that do not
    /// look like a control snapshot are dropped.
    pub fn controls(&self) -> Option<Vec<(String, ControlSnapshot)>> {
        match &self.all_events {
            Some(SubEvents::Controls(map)) => Some(
                map.iter()
                    .filter_map(|(name, raw)| {
                        serde_json::from_value::<ControlSnapshot>(raw.clone())
                            .ok()
                            .map(|control| (name.clone(), control))
                    })
                    .collect(),
            ),
            _ => None,
        }
    }
}

/// Render a recorded form value as the text an executor should type or select
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_kind_keeps_name() {
        let event: RecordedEvent = serde_json::from_value(json!({ "type": "scroll" })).unwrap();
        assert_eq!(event.kind, EventKind::Unknown("scroll".to_string()));
        assert_eq!(event.kind.to_string(), "scroll");
    }

    #[test]
    fn test_submit_controls_keep_insertion_order() {
        let event: RecordedEvent = serde_json::from_value(json!({
            "type": "submit",
            "taskId": "t1",
            "eventTarget": { "type": "submit", "target": "<form>", "selector": "form#search" },
            "allEvents": {
                "zeta": { "value": "a", "selector": "#zeta", "tag": "input", "type": "text" },
                "alpha": { "value": null, "selector": "#alpha", "tag": "input", "type": "checkbox" }
            },
            "pageHTMLContent": "<html></html>"
        }))
        .unwrap();

        let controls = event.controls().unwrap();
        let names: Vec<_> = controls.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert!(controls[1].1.value.is_none());
        assert_eq!(
            event.event_target.unwrap().selector.as_deref(),
            Some("form#search")
        );
        assert!(event.extra.contains_key("pageHTMLContent"));
    }

    #[test]
    fn test_navigation_history_and_empty_string_payload() {
        let start: RecordedEvent = serde_json::from_value(json!({
            "type": "task-start",
            "allEvents": [{ "type": "task-start", "current_url": "https://example.com/" }]
        }))
        .unwrap();
        assert_eq!(
            start.first_navigation().and_then(|entry| entry.current_url).as_deref(),
            Some("https://example.com/")
        );

        let nav: RecordedEvent = serde_json::from_value(json!({
            "type": "go-back-or-forward",
            "eventTarget": { "type": "navigation", "target": "https://example.com/a" },
            "allEvents": ""
        }))
        .unwrap();
        assert!(nav.controls().is_none());
        assert_eq!(nav.first_navigation(), None);
    }

    #[test]
    fn test_malformed_first_history_entry_is_not_skipped_over() {
        let start: RecordedEvent = serde_json::from_value(json!({
            "type": "task-start",
            "allEvents": ["garbage", { "current_url": "https://second.example/" }]
        }))
        .unwrap();
        assert_eq!(start.first_navigation(), None);
    }

    #[test]
    fn test_null_type_is_unknown() {
        let event: RecordedEvent = serde_json::from_value(json!({ "type": null })).unwrap();
        assert_eq!(event.kind, EventKind::Unknown("null".to_string()));
        assert_eq!(event.kind.to_string(), "null");
    }

    #[test]
    fn test_numeric_task_fields_are_read_as_text() {
        let event: RecordedEvent = serde_json::from_value(json!({
            "type": "click",
            "taskId": 42,
            "taskDescription": null,
            "eventTarget": { "target": "<button>Go</button>" }
        }))
        .unwrap();
        assert_eq!(event.kind, EventKind::Click);
        assert_eq!(event.task_id.as_deref(), Some("42"));
        assert_eq!(event.task_description, None);
    }

    #[test]
    fn test_value_text_renders_non_strings() {
        assert_eq!(value_text(&json!("hello")), "hello");
        assert_eq!(value_text(&json!(42)), "42");
        assert_eq!(value_text(&json!(true)), "true");
    }
}
