//! Pattern-based reading of the short HTML fragments the recorder captures.
//!
//! Fragments are an element's outer HTML trimmed to a few levels of children.
//! Only the first tag name and double-quoted attributes are extracted. No HTML
//! parsing, so attributes of nested children are read as if they were the
//! element's own.

use regex::Regex;
use std::sync::OnceLock;

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<\s*(\w+)[^>]*>").expect("tag pattern is valid"))
}

fn attr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)([\w:-]+)\s*=\s*"([^"]*?)""#).expect("attribute pattern is valid")
    })
}

fn strip_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("strip pattern is valid"))
}

fn whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern is valid"))
}

/// What the compiler needs to know about a target fragment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentInfo {
    /// Visible text with tags stripped and whitespace collapsed
    pub text: Option<String>,
    /// First opening tag, lower-cased
    pub tag: Option<String>,
    /// Only set for `input`; empty when the tag has no `type` attribute
    pub input_type: Option<String>,
}

/// Extract text, tag and input type from a raw fragment
pub fn read_fragment(raw_html: &str) -> FragmentInfo {
    if raw_html.is_empty() {
        return FragmentInfo::default();
    }

    let tag = tag_regex()
        .captures(raw_html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_lowercase());

    let input_type = if tag.as_deref() == Some("input") {
        Some(
            attr_regex()
                .captures_iter(raw_html)
                .find(|caps| caps[1].eq_ignore_ascii_case("type"))
                .map(|caps| caps[2].to_lowercase())
                .unwrap_or_default(),
        )
    } else {
        None
    };

    let stripped = strip_regex().replace_all(raw_html, "");
    let collapsed = whitespace_regex().replace_all(&stripped, " ");
    let text = Some(collapsed.trim().to_string()).filter(|t| !t.is_empty());

    FragmentInfo {
        text,
        tag,
        input_type,
    }
}

/// Double-quoted attributes of a fragment, names lower-cased.
///
/// Names keep the position of their first occurrence, but a repeated name
/// takes the value of its last one (the innermost element in a nested
/// fragment).
pub fn attributes(raw_html: &str) -> Vec<(String, String)> {
    let mut attrs: Vec<(String, String)> = Vec::new();
    for caps in attr_regex().captures_iter(raw_html) {
        let name = caps[1].to_lowercase();
        let value = caps[2].to_string();
        match attrs.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => attrs.push((name, value)),
        }
    }
    attrs
}
