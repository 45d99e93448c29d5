use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::model::document::DocumentRef;

/// Task checkbox status, ordered from most to least urgent.
///
/// The discriminants are part of the data model and must not be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum TaskStatus {
    AttentionRequired = 0,
    Todo = 1,
    InProgress = 2,
    Delegated = 3,
    Complete = 4,
    Canceled = 5,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 6] = [
        TaskStatus::AttentionRequired,
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Delegated,
        TaskStatus::Complete,
        TaskStatus::Canceled,
    ];

    /// The canonical checkbox token written for this status
    pub fn checkbox_token(self) -> &'static str {
        match self {
            TaskStatus::Todo => "[ ]",
            TaskStatus::Complete => "[x]",
            TaskStatus::InProgress => "[>]",
            TaskStatus::Canceled => "[-]",
            TaskStatus::Delegated => "[d]",
            TaskStatus::AttentionRequired => "[!]",
        }
    }

    /// Map a checkbox token (brackets included) to a status.
    /// Anything outside the table means the line is not a task.
    pub fn from_checkbox_token(token: &str) -> Option<TaskStatus> {
        match token {
            "[ ]" => Some(TaskStatus::Todo),
            "[x]" => Some(TaskStatus::Complete),
            "[>]" => Some(TaskStatus::InProgress),
            "[-]" | "[c]" | "[]" => Some(TaskStatus::Canceled),
            "[d]" => Some(TaskStatus::Delegated),
            "[!]" => Some(TaskStatus::AttentionRequired),
            _ => None,
        }
    }

    /// Complete and canceled tasks carry a completed-date attribute
    pub fn is_closed(self) -> bool {
        matches!(self, TaskStatus::Complete | TaskStatus::Canceled)
    }

    pub fn name(self) -> &'static str {
        match self {
            TaskStatus::AttentionRequired => "attention-required",
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Delegated => "delegated",
            TaskStatus::Complete => "complete",
            TaskStatus::Canceled => "canceled",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "attention-required" | "attention" | "!" => Ok(TaskStatus::AttentionRequired),
            "todo" => Ok(TaskStatus::Todo),
            "in-progress" | "active" | ">" => Ok(TaskStatus::InProgress),
            "delegated" => Ok(TaskStatus::Delegated),
            "complete" | "done" | "x" => Ok(TaskStatus::Complete),
            "canceled" | "cancelled" | "-" => Ok(TaskStatus::Canceled),
            other => Err(format!("unknown status: {}", other)),
        }
    }
}

/// Value of an inline attribute: `@key(value)` carries text, bare `@key` is a flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    Text(String),
    Flag,
}

impl AttributeValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            AttributeValue::Flag => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Text(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::Text(s)
    }
}

impl Serialize for AttributeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AttributeValue::Text(s) => serializer.serialize_str(s),
            AttributeValue::Flag => serializer.serialize_bool(true),
        }
    }
}

/// Inline attributes in source order
pub type Attributes = IndexMap<String, AttributeValue>;

/// A task parsed from one line of a document
#[derive(Debug, Clone)]
pub struct Task {
    pub status: TaskStatus,
    /// Line remainder with list marker, checkbox, date, attributes and tags removed
    pub text: String,
    pub document: DocumentRef,
    /// Zero-based line index at parse time. `None` for tasks built outside the parser.
    pub line: Option<usize>,
    /// Width of the leading whitespace, in characters
    pub indent: usize,
    pub attributes: Attributes,
    /// Hashtags without the `#`
    pub tags: Vec<String>,
    pub subtasks: Vec<Task>,
}

impl Task {
    /// Create a detached task (no line) for the given document
    pub fn new(status: TaskStatus, text: impl Into<String>, document: DocumentRef) -> Self {
        Task {
            status,
            text: text.into(),
            document,
            line: None,
            indent: 0,
            attributes: Attributes::new(),
            tags: Vec::new(),
            subtasks: Vec::new(),
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Depth-first iteration over this task and all of its subtasks
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    /// Point this task and every subtask at another document
    pub(crate) fn retarget(&mut self, document: &DocumentRef) {
        self.document = document.clone();
        for sub in &mut self.subtasks {
            sub.retarget(document);
        }
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.status == other.status
            && self.text == other.text
            && self.document.id() == other.document.id()
            && self.line == other.line
            && self.indent == other.indent
            && self.attributes == other.attributes
            && self.tags == other.tags
            && self.subtasks == other.subtasks
    }
}

impl Eq for Task {}

pub struct Walk<'a> {
    stack: Vec<&'a Task>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Task;

    fn next(&mut self) -> Option<&'a Task> {
        let task = self.stack.pop()?;
        self.stack.extend(task.subtasks.iter().rev());
        Some(task)
    }
}
