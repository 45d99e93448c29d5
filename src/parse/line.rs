use std::sync::LazyLock;

use regex::Regex;

use crate::model::task::TaskStatus;

/// `  - [x] 2025-01-01: Remainder text`
static LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<indent>\s*)(?:(?P<marker>[-*]|\d+\.)(?:\s+|$))?(?:(?P<checkbox>\[.?\])(?:\s+|$))?(?:(?P<date>(?:\d{4}-)?\d{4}-\d{2}-\d{2}): )?(?P<rest>.*)$",
    )
    .expect("line pattern is valid")
});

/// The structural pieces of one raw line. Absent pieces are empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineStructure {
    pub indentation: String,
    /// `-`, `*` or `N.`
    pub list_marker: String,
    /// Checkbox token including brackets, e.g. `[x]`
    pub checkbox: String,
    /// Leading date without its `: ` separator
    pub date: String,
    /// Everything after the structural prefix
    pub line: String,
}

impl LineStructure {
    /// The task status, or `None` if this is not a task line
    pub fn status(&self) -> Option<TaskStatus> {
        TaskStatus::from_checkbox_token(&self.checkbox)
    }

    pub fn is_task(&self) -> bool {
        self.status().is_some()
    }

    pub fn set_status(&mut self, status: TaskStatus) {
        self.checkbox = status.checkbox_token().to_string();
    }

    /// Indent width in characters
    pub fn indent_level(&self) -> usize {
        self.indentation.chars().count()
    }
}

/// Split a raw line into its structure. Never fails: a line that does not
/// match keeps all of its text in `line`.
pub fn parse_line(raw: &str) -> LineStructure {
    match LINE_RE.captures(raw) {
        Some(caps) => {
            let group = |name: &str| {
                caps.name(name)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default()
            };
            LineStructure {
                indentation: group("indent"),
                list_marker: group("marker"),
                checkbox: group("checkbox"),
                date: group("date"),
                line: group("rest"),
            }
        }
        None => LineStructure {
            line: raw.to_string(),
            ..LineStructure::default()
        },
    }
}

/// Inverse of [`parse_line`]: one space after each present component,
/// `": "` after the date.
pub fn serialize_line(structure: &LineStructure) -> String {
    let mut out = structure.indentation.clone();
    if !structure.list_marker.is_empty() {
        out.push_str(&structure.list_marker);
        out.push(' ');
    }
    if !structure.checkbox.is_empty() {
        out.push_str(&structure.checkbox);
        out.push(' ');
    }
    if !structure.date.is_empty() {
        out.push_str(&structure.date);
        out.push_str(": ");
    }
    out.push_str(&structure.line);
    out
}
