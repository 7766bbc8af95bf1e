//! One translation rule per recorded event kind.
//!
//! Each rule turns a single event into the actions that replay it. Rules never
//! look at other events, so the plan is a plain concatenation of their output.

use super::fragment::read_fragment;
use super::selector::{synthesize, SelectorResult};
use crate::error::SkipReason;
use crate::models::{
    value_text, Action, EventKind, RecordedEvent, ELEMENT_TIMEOUT_MS, NAVIGATION_TIMEOUT_MS,
};

/// Input types typed into with the keyboard (empty means no `type` attribute)
const TEXT_INPUT_TYPES: [&str; 10] = [
    "text",
    "search",
    "password",
    "email",
    "number",
    "tel",
    "url",
    "date",
    "datetime-local",
    "",
];
const CHECKABLE_TYPES: [&str; 2] = ["checkbox", "radio"];
const BUTTON_TYPES: [&str; 3] = ["submit", "button", "image"];
/// Controls that cannot or need not be replayed
const IGNORED_TYPES: [&str; 3] = ["hidden", "file", "reset"];

pub type Translation = Result<Vec<Action>, SkipReason>;

/// How a form control is driven at replay time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ControlKind {
    Text,
    Checkable,
    Select,
    Button,
    Other,
}

fn classify(tag: &str, input_type: &str) -> ControlKind {
    match tag {
        "input" if TEXT_INPUT_TYPES.contains(&input_type) => ControlKind::Text,
        "input" if CHECKABLE_TYPES.contains(&input_type) => ControlKind::Checkable,
        "input" if BUTTON_TYPES.contains(&input_type) => ControlKind::Button,
        "textarea" => ControlKind::Text,
        "select" => ControlKind::Select,
        "button" => ControlKind::Button,
        _ => ControlKind::Other,
    }
}

/// Translate one event into the actions that replay it
pub fn translate(event: &RecordedEvent) -> Translation {
    match &event.kind {
        EventKind::TaskStart => task_start(event),
        EventKind::Click => click(event),
        EventKind::GoBackOrForward => go_back_or_forward(event),
        EventKind::Submit => submit(event),
        EventKind::InputChange => input_change(event),
        EventKind::TaskFinish => task_finish(event),
        EventKind::Unknown(kind) => Err(SkipReason::UnknownEventType(kind.clone())),
    }
}

fn locate(event: &RecordedEvent) -> Option<SelectorResult> {
    event.event_target.as_ref().and_then(synthesize)
}

fn task_start(event: &RecordedEvent) -> Translation {
    let url = event
        .first_navigation()
        .and_then(|entry| entry.current_url)
        .ok_or(SkipReason::MissingStartUrl)?;

    Ok(vec![Action::open_tab(url)])
}

fn click(event: &RecordedEvent) -> Translation {
    match locate(event).ok_or(SkipReason::UnresolvableSelector)? {
        SelectorResult::Css(css) => Ok(vec![
            Action::wait_for_element(css.clone(), ELEMENT_TIMEOUT_MS),
            Action::click_by_selector(css),
        ]),
        SelectorResult::Text { text, tag } => Ok(vec![
            Action::wait_for_element(format!(r#"{}:text("{}")"#, tag, text), ELEMENT_TIMEOUT_MS),
            Action::click_by_text(text, tag.element_type().map(String::from)),
        ]),
    }
}

fn go_back_or_forward(event: &RecordedEvent) -> Translation {
    let url = event
        .event_target
        .as_ref()
        .and_then(|target| target.target.clone())
        .ok_or(SkipReason::MissingNavigationUrl)?;

    Ok(vec![
        Action::go_to_url(url),
        Action::wait_for_element("body", NAVIGATION_TIMEOUT_MS),
    ])
}

fn submit(event: &RecordedEvent) -> Translation {
    let controls = event
        .controls()
        .filter(|controls| !controls.is_empty())
        .ok_or(SkipReason::EmptySubmission)?;

    let mut actions = Vec::new();
    let mut last_text_control: Option<String> = None;

    for (name, control) in controls {
        let Some(value) = control.value.as_ref() else {
            continue;
        };
        let selector = control.selector.as_deref().unwrap_or("").trim();
        let tag = control.tag.as_deref().unwrap_or("").to_lowercase();
        let input_type = control.control_type.as_deref().unwrap_or("").to_lowercase();

        if selector.is_empty() || IGNORED_TYPES.contains(&input_type.as_str()) {
            tracing::debug!("Ignoring form control '{}'", name);
            continue;
        }

        actions.push(Action::wait_for_element(selector, ELEMENT_TIMEOUT_MS));

        match classify(&tag, &input_type) {
            ControlKind::Text => {
                actions.push(Action::input_text(selector, value_text(value)));
                last_text_control = Some(selector.to_string());
            }
            ControlKind::Checkable | ControlKind::Button => {
                actions.push(Action::click_by_selector(selector));
            }
            ControlKind::Select => {
                actions.push(Action::select_option(selector, value_text(value)));
            }
            ControlKind::Other => {}
        }
    }

    // Enter in the last text field submits the form, even when a submit
    // button was also recorded.
    if last_text_control.is_some() {
        actions.push(Action::send_keys("Enter"));
    } else if let Some(form_selector) = event
        .event_target
        .as_ref()
        .and_then(|target| target.selector.as_deref())
        .filter(|selector| !selector.is_empty())
    {
        actions.push(Action::wait_for_element(form_selector, ELEMENT_TIMEOUT_MS));
        actions.push(Action::click_by_selector(form_selector));
    }

    Ok(actions)
}

fn input_change(event: &RecordedEvent) -> Translation {
    let Some(target) = event.event_target.as_ref() else {
        return Ok(Vec::new());
    };
    let Some(value) = target.value.as_ref() else {
        return Ok(Vec::new());
    };

    let locator = synthesize(target).ok_or(SkipReason::UnresolvableSelector)?;
    let css = locator
        .css()
        .ok_or(SkipReason::TextLocatorUnsupported)?
        .to_string();

    let info = read_fragment(target.target.as_deref().unwrap_or(""));
    let tag = info.tag.as_deref().unwrap_or("");
    let input_type = info.input_type.as_deref().unwrap_or("");

    if tag == "input" && IGNORED_TYPES.contains(&input_type) {
        return Ok(Vec::new());
    }

    let mut actions = vec![Action::wait_for_element(css.clone(), ELEMENT_TIMEOUT_MS)];
    match classify(tag, input_type) {
        ControlKind::Text => actions.push(Action::input_text(css, value_text(value))),
        ControlKind::Checkable => actions.push(Action::click_by_selector(css)),
        ControlKind::Select => actions.push(Action::select_option(css, value_text(value))),
        ControlKind::Button | ControlKind::Other => {}
    }

    Ok(actions)
}

fn task_finish(event: &RecordedEvent) -> Translation {
    let goal = event.task_description.clone().unwrap_or_default();
    Ok(vec![Action::extract_content(goal), Action::done()])
}
