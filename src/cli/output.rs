use serde::Serialize;

use crate::model::task::{Attributes, Task, TaskStatus};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub status: TaskStatus,
    pub text: String,
    #[serde(skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<TaskJson>,
}

pub fn task_to_json(task: &Task) -> TaskJson {
    TaskJson {
        file: task.document.path().to_string(),
        line: task.line,
        status: task.status,
        text: task.text.clone(),
        attributes: task.attributes.clone(),
        tags: task.tags.clone(),
        subtasks: task.subtasks.iter().map(task_to_json).collect(),
    }
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

/// `notes/today.md:3  [x] Buy milk #shop due=2025-01-01`, subtasks indented
pub fn format_task_lines(task: &Task, depth: usize) -> Vec<String> {
    let mut line = format!(
        "{}:{}  {}{} {}",
        task.document.path(),
        task.line.map_or_else(|| "?".to_string(), |l| l.to_string()),
        "  ".repeat(depth),
        task.status.checkbox_token(),
        task.text
    );
    for tag in &task.tags {
        line.push_str(&format!(" #{}", tag));
    }
    for (key, value) in &task.attributes {
        match value.as_text() {
            Some(v) => line.push_str(&format!(" {}={}", key, v)),
            None => line.push_str(&format!(" {}", key)),
        }
    }

    let mut lines = vec![line];
    for sub in &task.subtasks {
        lines.extend(format_task_lines(sub, depth + 1));
    }
    lines
}
