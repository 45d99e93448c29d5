use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::model::config::AttributeSyntax;
use crate::model::task::{AttributeValue, Attributes};

/// `@key` or `@key(value)`, preceded by whitespace or start of text
static CLASSIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)@(\w[\w-]*)(?:\(([^)]*)\))?").expect("classic attribute pattern is valid")
});

/// `[key:: value]`
static STRUCTURED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*\[([^\[\]:]*)::([^\[\]]*)\]").expect("structured attribute pattern is valid")
});

/// `#tag`, preceded by whitespace or start of text
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)#([\w/-]+)").expect("tag pattern is valid")
});

/// Result of pulling attributes and tags out of a line remainder
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Extracted {
    pub text: String,
    pub attributes: Attributes,
    pub tags: Vec<String>,
}

/// Strip every attribute and `#tag` token from `remainder`.
///
/// Tokens that match the pattern but carry no usable key are removed
/// from the text and otherwise ignored.
pub fn extract(remainder: &str, syntax: AttributeSyntax) -> Extracted {
    let mut attributes = Attributes::new();

    let without_attrs = match syntax {
        AttributeSyntax::Classic => strip_matches(&CLASSIC_RE, remainder, |caps| {
            let key = caps[1].to_string();
            let value = match caps.get(2) {
                Some(v) => AttributeValue::Text(v.as_str().trim().to_string()),
                None => AttributeValue::Flag,
            };
            attributes.insert(key, value);
            true
        }),
        AttributeSyntax::Structured => strip_matches(&STRUCTURED_RE, remainder, |caps| {
            let key = caps[1].trim();
            if !key.is_empty() {
                attributes.insert(
                    key.to_string(),
                    AttributeValue::Text(caps[2].trim().to_string()),
                );
            }
            true
        }),
    };

    let mut tags = Vec::new();
    let text = strip_matches(&TAG_RE, &without_attrs, |caps| {
        let tag = &caps[1];
        // `#3` is an issue reference, not a tag
        if tag.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
        tags.push(tag.to_string());
        true
    });

    Extracted {
        text: text.trim().to_string(),
        attributes,
        tags,
    }
}

/// Rebuild a remainder: text, then tags, then one token per attribute.
///
/// A flag emits `@key` in classic syntax but `[key:: true]` in structured
/// syntax, which parses back as the text `"true"`.
pub fn compose(
    text: &str,
    attributes: &Attributes,
    tags: &[String],
    syntax: AttributeSyntax,
) -> String {
    let mut parts: Vec<String> = Vec::new();
    if !text.is_empty() {
        parts.push(text.to_string());
    }
    for tag in tags {
        parts.push(format!("#{}", tag));
    }
    for (key, value) in attributes {
        parts.push(attribute_token(key, value, syntax));
    }
    parts.join(" ")
}

/// A single attribute token in the given syntax
pub fn attribute_token(key: &str, value: &AttributeValue, syntax: AttributeSyntax) -> String {
    match (syntax, value) {
        (AttributeSyntax::Classic, AttributeValue::Flag) => format!("@{}", key),
        (AttributeSyntax::Classic, AttributeValue::Text(v)) => format!("@{}({})", key, v),
        (AttributeSyntax::Structured, AttributeValue::Flag) => format!("[{}:: true]", key),
        (AttributeSyntax::Structured, AttributeValue::Text(v)) => format!("[{}:: {}]", key, v),
    }
}

/// Remove every match for which `take` returns true, leaving other text intact
fn strip_matches<F>(re: &Regex, input: &str, mut take: F) -> String
where
    F: FnMut(&Captures) -> bool,
{
    let mut out = String::with_capacity(input.len());
    let mut last = 0;
    for caps in re.captures_iter(input) {
        let Some(m) = caps.get(0) else { continue };
        if take(&caps) {
            out.push_str(&input[last..m.start()]);
            last = m.end();
        }
    }
    out.push_str(&input[last..]);
    out
}
