use chrono::{Local, NaiveDate};
use tracing::debug;

use crate::error::TaskError;
use crate::model::config::TasksConfig;
use crate::model::task::{AttributeValue, Attributes, Task, TaskStatus};
use crate::ops::line_mutator::{date_str, detect_eol, has_attribute, set_attribute};
use crate::parse::attributes::compose;
use crate::parse::line::{LineStructure, parse_line, serialize_line};

/// Creates follow-up tasks below existing ones
#[derive(Debug, Clone)]
pub struct FollowUpComposer<'a> {
    config: &'a TasksConfig,
    today: NaiveDate,
}

impl<'a> FollowUpComposer<'a> {
    pub fn new(config: &'a TasksConfig) -> Self {
        FollowUpComposer::with_today(config, Local::now().date_naive())
    }

    pub fn with_today(config: &'a TasksConfig, today: NaiveDate) -> Self {
        FollowUpComposer { config, today }
    }

    /// Text for a follow-up: the configured prefix, added once
    pub fn follow_up_text(&self, text: &str) -> String {
        let prefix = &self.config.follow_up.prefix;
        let base = text.strip_prefix(prefix.as_str()).unwrap_or(text);
        format!("{}{}", prefix, base)
    }

    /// Build the follow-up line for `task`, indented like `source`
    pub fn follow_up_line(&self, task: &Task, source: &LineStructure, due: Option<NaiveDate>) -> String {
        let cfg = self.config;
        let mut attributes = Attributes::new();
        if cfg.follow_up.copy_priority
            && let Some(priority) = task.attribute(&cfg.priority_attribute)
        {
            attributes.insert(cfg.priority_attribute.clone(), priority.clone());
        }
        if let Some(due) = due {
            attributes.insert(
                cfg.due_date_attribute.clone(),
                AttributeValue::Text(date_str(due)),
            );
        }
        let tags: &[String] = if cfg.follow_up.copy_tags { &task.tags } else { &[] };

        let structure = LineStructure {
            indentation: source.indentation.clone(),
            list_marker: if source.list_marker.is_empty() {
                "-".to_string()
            } else {
                source.list_marker.clone()
            },
            checkbox: TaskStatus::Todo.checkbox_token().to_string(),
            date: String::new(),
            line: compose(
                &self.follow_up_text(&task.text),
                &attributes,
                tags,
                cfg.attribute_syntax,
            ),
        };
        serialize_line(&structure)
    }

    /// Insert a follow-up after `task` and its sub-items, optionally
    /// completing `task` first. Returns the new line's index.
    pub async fn create(
        &self,
        task: &Task,
        due: Option<NaiveDate>,
        complete_original: bool,
    ) -> Result<usize, TaskError> {
        let line = task.line.ok_or_else(|| TaskError::MissingLine {
            text: task.text.clone(),
        })?;
        let document = &task.document;
        let content = document
            .read_content()
            .await
            .map_err(|e| TaskError::read(document.path(), e))?;
        let eol = detect_eol(&content);
        let mut lines: Vec<String> = content.split(eol).map(str::to_string).collect();

        let len = lines.len();
        let raw = lines.get(line).ok_or_else(|| TaskError::LineOutOfRange {
            path: document.path().to_string(),
            line,
            len,
        })?;
        let mut source = parse_line(raw);

        if complete_original {
            let syntax = self.config.attribute_syntax;
            let key = &self.config.completed_date_attribute;
            source.set_status(TaskStatus::Complete);
            if !has_attribute(&source, syntax, key) {
                set_attribute(&mut source, syntax, key, AttributeValue::Text(date_str(self.today)));
            }
            lines[line] = serialize_line(&source);
        }

        let at = insertion_point(&lines, line, source.indent_level());
        lines.insert(at, self.follow_up_line(task, &source, due));
        debug!(path = document.path(), line = at, "inserted follow-up");

        document
            .write_content(lines.join(eol))
            .await
            .map_err(|e| TaskError::write(document.path(), e))?;
        Ok(at)
    }
}

/// First line after `line` that is blank or not deeper than `indent`
pub fn insertion_point(lines: &[String], line: usize, indent: usize) -> usize {
    let mut idx = line + 1;
    while idx < lines.len() {
        let candidate = &lines[idx];
        if candidate.trim().is_empty() || parse_line(candidate).indent_level() <= indent {
            break;
        }
        idx += 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::memory_document::MemoryDocument;
    use crate::model::config::AttributeSyntax;
    use crate::model::document::DocumentRef;
    use crate::parse::document_parser::parse_document;
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 20).unwrap()
    }

    fn due() -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2025, 2, 1)
    }

    fn all_tasks(doc: &DocumentRef, content: &str) -> Vec<Task> {
        parse_document(content, doc, AttributeSyntax::Classic)
            .iter()
            .flat_map(|t| t.walk().cloned().collect::<Vec<_>>())
            .collect()
    }

    #[test]
    fn test_follow_up_after_subtasks_completing_original() {
        let content = "# Project\n\
                       \n\
                       - [ ] Draft plan\n\
                       notes\n\
                       - [ ] Email Sam @priority(high) #work\n\
                       \x20\x20- [ ] attach file\n\
                       \x20\x20\x20\x20more detail\n\
                       - [ ] Next thing\n";
        let doc = MemoryDocument::shared("p.md", content);
        let document: DocumentRef = doc.clone();
        let task = all_tasks(&document, content)
            .into_iter()
            .find(|t| t.line == Some(4))
            .unwrap();

        let config = TasksConfig::default();
        let composer = FollowUpComposer::with_today(&config, today());
        let at = block_on(composer.create(&task, due(), true)).unwrap();
        assert_eq!(at, 7);
        assert_eq!(
            doc.content(),
            "# Project\n\
             \n\
             - [ ] Draft plan\n\
             notes\n\
             - [x] Email Sam #work @priority(high) @completed(2025-01-20)\n\
             \x20\x20- [ ] attach file\n\
             \x20\x20\x20\x20more detail\n\
             - [ ] Follow up: Email Sam @priority(high) @due(2025-02-01)\n\
             - [ ] Next thing\n"
        );
        assert_eq!((doc.read_count(), doc.write_count()), (1, 1));
    }

    #[test]
    fn test_existing_completed_date_is_kept() {
        let content = "- [x] Done already @completed(2024-12-31)";
        let doc = MemoryDocument::shared("a.md", content);
        let document: DocumentRef = doc.clone();
        let task = all_tasks(&document, content).remove(0);

        let config = TasksConfig::default();
        let composer = FollowUpComposer::with_today(&config, today());
        block_on(composer.create(&task, None, true)).unwrap();
        assert_eq!(
            doc.content(),
            "- [x] Done already @completed(2024-12-31)\n- [ ] Follow up: Done already"
        );
    }

    #[test]
    fn test_prefix_is_not_doubled_and_indent_is_copied() {
        let content = "- [ ] Parent\n    * [>] Follow up: call back #phone\n";
        let doc = MemoryDocument::shared("a.md", content);
        let document: DocumentRef = doc.clone();
        let task = all_tasks(&document, content).remove(1);

        let mut config = TasksConfig::default();
        config.follow_up.copy_tags = true;
        let composer = FollowUpComposer::with_today(&config, today());
        let at = block_on(composer.create(&task, None, false)).unwrap();
        assert_eq!(at, 2);
        assert_eq!(
            doc.content(),
            "- [ ] Parent\n    * [>] Follow up: call back #phone\n    * [ ] Follow up: call back #phone\n"
        );
    }

    #[test]
    fn test_structured_follow_up_line() {
        let content = "1. [ ] Pay rent [priority:: high]";
        let doc = MemoryDocument::shared("a.md", content);
        let document: DocumentRef = doc.clone();
        let task = parse_document(content, &document, AttributeSyntax::Structured).remove(0);

        let config = TasksConfig {
            attribute_syntax: AttributeSyntax::Structured,
            ..TasksConfig::default()
        };
        let composer = FollowUpComposer::with_today(&config, today());
        let line = composer.follow_up_line(&task, &parse_line(content), due());
        assert_eq!(
            line,
            "1. [ ] Follow up: Pay rent [priority:: high] [due:: 2025-02-01]"
        );
    }

    #[test]
    fn test_task_without_line_fails() {
        let doc = MemoryDocument::shared("a.md", "- [ ] a");
        let task = Task::new(TaskStatus::Todo, "a", doc.clone());
        let config = TasksConfig::default();
        let composer = FollowUpComposer::with_today(&config, today());
        let err = block_on(composer.create(&task, None, false)).unwrap_err();
        assert!(matches!(err, TaskError::MissingLine { .. }));
        assert_eq!(doc.read_count(), 0);
    }

    #[test]
    fn test_insertion_point_stops_at_blank_line() {
        let lines: Vec<String> = ["- [ ] a", "  - [ ] b", "", "  stray"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(insertion_point(&lines, 0, 0), 2);
        assert_eq!(insertion_point(&lines, 1, 2), 2);
        assert_eq!(insertion_point(&lines, 3, 2), 4);
    }
}
