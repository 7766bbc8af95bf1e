use serde::{Deserialize, Serialize};

/// Wait applied before touching any element located by selector or text
pub const ELEMENT_TIMEOUT_MS: u64 = 5_000;
/// Wait applied after a history navigation, until the page body is back
pub const NAVIGATION_TIMEOUT_MS: u64 = 8_000;

/// Status text reported by the final `done` action of a replay
pub const DONE_TEXT: &str = "task executed successfully";

/// One primitive, replayable operation.
///
/// Serializes as `{"action": <name>, "action_params": {...}}`. Deserializing
/// any other action name fails, which is how an executor rejects unknown steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "action_params", rename_all = "snake_case")]
pub enum Action {
    WaitForElement {
        selector: String,
        timeout: u64,
    },
    ClickElementBySelector {
        css_selector: String,
    },
    ClickElementByText {
        text: String,
        /// `None` matches any element type
        element_type: Option<String>,
        nth: u32,
    },
    InputTextBySelector {
        selector: String,
        text: String,
    },
    SelectOptionBySelector {
        css_selector: String,
        value: String,
    },
    SendKeys {
        keys: String,
    },
    OpenTab {
        url: String,
    },
    GoToUrl {
        url: String,
    },
    ExtractContent {
        goal: String,
        should_strip_link_urls: bool,
    },
    Done {
        text: String,
        success: bool,
    },
}

impl Action {
    pub fn wait_for_element(selector: impl Into<String>, timeout: u64) -> Self {
        Action::WaitForElement {
            selector: selector.into(),
            timeout,
        }
    }

    pub fn click_by_selector(css_selector: impl Into<String>) -> Self {
        Action::ClickElementBySelector {
            css_selector: css_selector.into(),
        }
    }

    pub fn click_by_text(text: impl Into<String>, element_type: Option<String>) -> Self {
        Action::ClickElementByText {
            text: text.into(),
            element_type,
            nth: 0,
        }
    }

    pub fn input_text(selector: impl Into<String>, text: impl Into<String>) -> Self {
        Action::InputTextBySelector {
            selector: selector.into(),
            text: text.into(),
        }
    }

    pub fn select_option(css_selector: impl Into<String>, value: impl Into<String>) -> Self {
        Action::SelectOptionBySelector {
            css_selector: css_selector.into(),
            value: value.into(),
        }
    }

    pub fn send_keys(keys: impl Into<String>) -> Self {
        Action::SendKeys { keys: keys.into() }
    }

    pub fn open_tab(url: impl Into<String>) -> Self {
        Action::OpenTab { url: url.into() }
    }

    pub fn go_to_url(url: impl Into<String>) -> Self {
        Action::GoToUrl { url: url.into() }
    }

    pub fn extract_content(goal: impl Into<String>) -> Self {
        Action::ExtractContent {
            goal: goal.into(),
            should_strip_link_urls: false,
        }
    }

    pub fn done() -> Self {
        Action::Done {
            text: DONE_TEXT.to_string(),
            success: true,
        }
    }

    /// Name of the action in the executor's vocabulary
    pub fn name(&self) -> &'static str {
        match self {
            Action::WaitForElement { .. } => "wait_for_element",
            Action::ClickElementBySelector { .. } => "click_element_by_selector",
            Action::ClickElementByText { .. } => "click_element_by_text",
            Action::InputTextBySelector { .. } => "input_text_by_selector",
            Action::SelectOptionBySelector { .. } => "select_option_by_selector",
            Action::SendKeys { .. } => "send_keys",
            Action::OpenTab { .. } => "open_tab",
            Action::GoToUrl { .. } => "go_to_url",
            Action::ExtractContent { .. } => "extract_content",
            Action::Done { .. } => "done",
        }
    }
}

/// Ordered, flat list of actions. Order is replay order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionPlan(Vec<Action>);

impl ActionPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append actions after everything already planned
    pub fn extend(&mut self, actions: impl IntoIterator<Item = Action>) {
        self.0.extend(actions);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Action> {
        self.0.iter()
    }

    pub fn actions(&self) -> &[Action] {
        &self.0
    }
}

impl From<Vec<Action>> for ActionPlan {
    fn from(actions: Vec<Action>) -> Self {
        Self(actions)
    }
}

impl<'a> IntoIterator for &'a ActionPlan {
    type Item = &'a Action;
    type IntoIter = std::slice::Iter<'a, Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_action_envelope_shape() {
        let value = serde_json::to_value(Action::wait_for_element("#q", ELEMENT_TIMEOUT_MS)).unwrap();
        assert_eq!(
            value,
            json!({ "action": "wait_for_element", "action_params": { "selector": "#q", "timeout": 5000 } })
        );
    }

    #[test]
    fn test_click_by_text_wildcard_serializes_null() {
        let value = serde_json::to_value(Action::click_by_text("Next", None)).unwrap();
        assert_eq!(
            value["action_params"],
            json!({ "text": "Next", "element_type": null, "nth": 0 })
        );
    }

    #[test]
    fn test_unknown_action_name_rejected() {
        let result = serde_json::from_value::<Action>(json!({
            "action": "scroll_down",
            "action_params": { "amount": 500 }
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_name_matches_serialized_tag() {
        let actions = [
            Action::send_keys("Enter"),
            Action::extract_content("goal"),
            Action::done(),
            Action::select_option("select#size", "L"),
        ];
        for action in actions {
            let value = serde_json::to_value(&action).unwrap();
            assert_eq!(value["action"], action.name());
        }
    }
}
