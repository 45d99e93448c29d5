use chrono::{Local, NaiveDate};
use futures::future::join_all;
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::error::{TaskError, report};
use crate::model::config::{AttributeSyntax, TasksConfig};
use crate::model::document::DocumentRef;
use crate::model::task::{AttributeValue, Task, TaskStatus};
use crate::parse::attributes::{compose, extract};
use crate::parse::line::{LineStructure, parse_line, serialize_line};

// ---------------------------------------------------------------------------
// Field-level edits on a parsed line
// ---------------------------------------------------------------------------

/// Set or replace one attribute, keeping the position of an existing key
pub fn set_attribute(
    structure: &mut LineStructure,
    syntax: AttributeSyntax,
    key: &str,
    value: AttributeValue,
) {
    let mut parts = extract(&structure.line, syntax);
    parts.attributes.insert(key.to_string(), value);
    structure.line = compose(&parts.text, &parts.attributes, &parts.tags, syntax);
}

/// Remove one attribute. The line is left byte-for-byte alone when the key is absent.
pub fn remove_attribute(structure: &mut LineStructure, syntax: AttributeSyntax, key: &str) -> bool {
    let mut parts = extract(&structure.line, syntax);
    if parts.attributes.shift_remove(key).is_none() {
        return false;
    }
    structure.line = compose(&parts.text, &parts.attributes, &parts.tags, syntax);
    true
}

pub fn has_attribute(structure: &LineStructure, syntax: AttributeSyntax, key: &str) -> bool {
    extract(&structure.line, syntax).attributes.contains_key(key)
}

/// Change the checkbox and keep the completed-date attribute in step:
/// present with `today` for complete and canceled, absent otherwise.
pub fn apply_status(
    structure: &mut LineStructure,
    status: TaskStatus,
    config: &TasksConfig,
    today: NaiveDate,
) {
    structure.set_status(status);
    let key = &config.completed_date_attribute;
    if status.is_closed() {
        set_attribute(
            structure,
            config.attribute_syntax,
            key,
            AttributeValue::Text(date_str(today)),
        );
    } else {
        remove_attribute(structure, config.attribute_syntax, key);
    }
}

pub fn date_str(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `\r\n` if it appears anywhere in the document, otherwise `\n`
pub fn detect_eol(content: &str) -> &'static str {
    if content.contains("\r\n") { "\r\n" } else { "\n" }
}

// ---------------------------------------------------------------------------
// Read-modify-write against documents
// ---------------------------------------------------------------------------

/// Rewrites task lines in place.
///
/// Each call reads a document once, edits only the target lines, and writes
/// it back once. Nothing guards against a concurrent writer to the same
/// document; the last write wins.
#[derive(Debug, Clone)]
pub struct LineMutator<'a> {
    config: &'a TasksConfig,
    today: NaiveDate,
}

impl<'a> LineMutator<'a> {
    pub fn new(config: &'a TasksConfig) -> Self {
        LineMutator::with_today(config, Local::now().date_naive())
    }

    /// Use a fixed date for completed-date attributes
    pub fn with_today(config: &'a TasksConfig, today: NaiveDate) -> Self {
        LineMutator { config, today }
    }

    /// Apply `edit` to one task's line.
    ///
    /// A task without a known line is skipped with a warning.
    pub async fn update_task<F>(&self, task: &Task, edit: F) -> Result<(), TaskError>
    where
        F: FnOnce(&mut LineStructure),
    {
        if task.line.is_none() {
            warn!(path = task.document.path(), text = %task.text, "task has no line, skipping edit");
            return Ok(());
        }
        let mut edit = Some(edit);
        rewrite_lines(&task.document, &[task], |_, structure| {
            if let Some(f) = edit.take() {
                f(structure);
            }
        })
        .await
    }

    /// Apply `edit` to every task's line, one read and one write per document
    pub async fn batch_update<F>(&self, tasks: &[Task], edit: F) -> Result<(), TaskError>
    where
        F: Fn(&Task, &mut LineStructure),
    {
        let mut by_document: IndexMap<&str, (&DocumentRef, Vec<&Task>)> = IndexMap::new();
        for task in tasks {
            if task.line.is_none() {
                warn!(path = task.document.path(), text = %task.text, "task has no line, skipping edit");
                continue;
            }
            by_document
                .entry(task.document.id())
                .or_insert_with(|| (&task.document, Vec::new()))
                .1
                .push(task);
        }
        debug!(documents = by_document.len(), tasks = tasks.len(), "batch line update");

        let edit = &edit;
        let rewrites = by_document.values().map(|(document, tasks)| {
            rewrite_lines(document, tasks, |task, structure| edit(task, structure))
        });

        let mut first_err = None;
        for result in join_all(rewrites).await {
            if let Err(err) = result {
                match first_err {
                    None => first_err = Some(err),
                    Some(_) => report(&err),
                }
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub async fn update_status(&self, task: &Task, status: TaskStatus) -> Result<(), TaskError> {
        self.update_task(task, |s| apply_status(s, status, self.config, self.today))
            .await
    }

    pub async fn batch_update_status(
        &self,
        tasks: &[Task],
        status: TaskStatus,
    ) -> Result<(), TaskError> {
        self.batch_update(tasks, |_, s| {
            apply_status(s, status, self.config, self.today)
        })
        .await
    }

    pub async fn set_attribute(
        &self,
        task: &Task,
        key: &str,
        value: AttributeValue,
    ) -> Result<(), TaskError> {
        let syntax = self.config.attribute_syntax;
        self.update_task(task, |s| set_attribute(s, syntax, key, value))
            .await
    }

    pub async fn remove_attribute(&self, task: &Task, key: &str) -> Result<(), TaskError> {
        let syntax = self.config.attribute_syntax;
        self.update_task(task, |s| {
            remove_attribute(s, syntax, key);
        })
        .await
    }
}

/// Read `document`, rewrite the line of each task, write it back
async fn rewrite_lines<F>(document: &DocumentRef, tasks: &[&Task], mut edit: F) -> Result<(), TaskError>
where
    F: FnMut(&Task, &mut LineStructure),
{
    let content = document
        .read_content()
        .await
        .map_err(|e| TaskError::read(document.path(), e))?;
    let eol = detect_eol(&content);
    let mut lines: Vec<String> = content.split(eol).map(str::to_string).collect();

    for task in tasks {
        let Some(line) = task.line else { continue };
        let len = lines.len();
        let slot = lines.get_mut(line).ok_or_else(|| TaskError::LineOutOfRange {
            path: document.path().to_string(),
            line,
            len,
        })?;
        let mut structure = parse_line(slot);
        edit(task, &mut structure);
        *slot = serialize_line(&structure);
    }

    document
        .write_content(lines.join(eol))
        .await
        .map_err(|e| TaskError::write(document.path(), e))
}
