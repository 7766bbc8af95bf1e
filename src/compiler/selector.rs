//! Locator synthesis for recorded targets.
//!
//! Strategies run in a fixed order and the first one that produces a locator
//! wins: stable id, stable attributes, tag-specific attributes, visible text.

use std::fmt;

use super::fragment::{attributes, read_fragment};
use crate::models::TargetDescriptor;

/// Attributes that usually survive re-renders, in priority order
pub const STABLE_ATTRIBUTES: [&str; 9] = [
    "data-testid",
    "data-test",
    "data-automation",
    "aria-label",
    "aria-controls",
    "data-bs-target",
    "name",
    "title",
    "placeholder",
];

/// Per-tag attributes that identify an element well enough, in priority order
const TAG_ATTRIBUTES: [(&str, &str); 5] = [
    ("img", "alt"),
    ("img", "src"),
    ("a", "href"),
    ("option", "value"),
    ("input", "value"),
];

/// Element type constraint of a text locator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagMatch {
    /// Any element (`*`)
    Any,
    Tag(String),
}

impl TagMatch {
    fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some(tag) => TagMatch::Tag(tag.to_string()),
            None => TagMatch::Any,
        }
    }

    /// Concrete tag name, `None` for the wildcard
    pub fn element_type(&self) -> Option<&str> {
        match self {
            TagMatch::Any => None,
            TagMatch::Tag(tag) => Some(tag),
        }
    }
}

impl fmt::Display for TagMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagMatch::Any => f.write_str("*"),
            TagMatch::Tag(tag) => f.write_str(tag),
        }
    }
}

/// Best locator found for a target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorResult {
    Css(String),
    Text { text: String, tag: TagMatch },
}

impl SelectorResult {
    pub fn css(&self) -> Option<&str> {
        match self {
            SelectorResult::Css(selector) => Some(selector),
            SelectorResult::Text { .. } => None,
        }
    }
}

/// Everything the strategies look at, extracted once per target
struct Candidate<'a> {
    target_id: Option<&'a str>,
    tag: Option<String>,
    text: Option<String>,
    attrs: Vec<(String, String)>,
}

impl Candidate<'_> {
    /// Non-empty value of an attribute
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value.as_str())
            .filter(|value| !value.is_empty())
    }

    fn tag_or_any(&self) -> &str {
        self.tag.as_deref().unwrap_or("*")
    }
}

type Strategy = fn(&Candidate<'_>) -> Option<SelectorResult>;

const STRATEGIES: [Strategy; 4] = [by_id, by_stable_attribute, by_tag_attribute, by_visible_text];

fn by_id(candidate: &Candidate<'_>) -> Option<SelectorResult> {
    candidate
        .target_id
        .filter(|id| !id.is_empty())
        .map(|id| SelectorResult::Css(format!("#{}", id)))
}

fn by_stable_attribute(candidate: &Candidate<'_>) -> Option<SelectorResult> {
    STABLE_ATTRIBUTES.iter().find_map(|name| {
        candidate.attr(name).map(|value| {
            SelectorResult::Css(format!(r#"{}[{}="{}"]"#, candidate.tag_or_any(), name, value))
        })
    })
}

fn by_tag_attribute(candidate: &Candidate<'_>) -> Option<SelectorResult> {
    let tag = candidate.tag.as_deref()?;
    TAG_ATTRIBUTES
        .iter()
        .filter(|(wanted, _)| *wanted == tag)
        .find_map(|(_, name)| {
            candidate
                .attr(name)
                .map(|value| SelectorResult::Css(format!(r#"{}[{}="{}"]"#, tag, name, value)))
        })
}

fn by_visible_text(candidate: &Candidate<'_>) -> Option<SelectorResult> {
    candidate.text.as_ref().map(|text| SelectorResult::Text {
        text: text.clone(),
        tag: TagMatch::from_tag(candidate.tag.as_deref()),
    })
}

/// Derive the most reliable locator for a recorded target.
///
/// Returns `None` when no strategy applies; the caller decides how to report it.
pub fn synthesize(target: &TargetDescriptor) -> Option<SelectorResult> {
    let raw_html = target.target.as_deref().unwrap_or("");
    let info = read_fragment(raw_html);
    let candidate = Candidate {
        target_id: target.target_id.as_deref(),
        tag: info.tag,
        text: info.text,
        attrs: attributes(raw_html),
    };

    STRATEGIES.iter().find_map(|strategy| strategy(&candidate))
}
