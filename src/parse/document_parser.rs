use crate::model::config::AttributeSyntax;
use crate::model::document::DocumentRef;
use crate::model::task::Task;
use crate::parse::attributes::extract;
use crate::parse::line::parse_line;

/// Parse every task in a document into a forest.
///
/// Lines are split on `\n` and numbered from zero. Nesting follows
/// indentation: a task becomes a subtask of the nearest preceding task that
/// is strictly less indented. Blank lines are skipped, and so are non-task
/// lines, which means prose between a parent and a deeper task does not
/// break the nesting. Only top-level tasks are returned; every other task is
/// owned by its parent's `subtasks`.
pub fn parse_document(content: &str, document: &DocumentRef, syntax: AttributeSyntax) -> Vec<Task> {
    // Parsed tasks in line order, with the slot of their parent
    let mut slots: Vec<Option<Task>> = Vec::new();
    let mut parents: Vec<Option<usize>> = Vec::new();
    let mut ancestors: Vec<usize> = Vec::new();

    for (line_idx, raw) in content.split('\n').enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        let structure = parse_line(raw);
        let Some(status) = structure.status() else {
            continue;
        };
        let indent = structure.indent_level();

        while let Some(&top) = ancestors.last() {
            let top_indent = slots[top].as_ref().map_or(0, |t| t.indent);
            if top_indent >= indent {
                ancestors.pop();
            } else {
                break;
            }
        }

        let extracted = extract(&structure.line, syntax);
        let task = Task {
            status,
            text: extracted.text,
            document: document.clone(),
            line: Some(line_idx),
            indent,
            attributes: extracted.attributes,
            tags: extracted.tags,
            subtasks: Vec::new(),
        };

        parents.push(ancestors.last().copied());
        ancestors.push(slots.len());
        slots.push(Some(task));
    }

    // Children always come after their parent, so moving from the back
    // finishes each subtree before its parent is moved.
    let mut roots = Vec::new();
    for idx in (0..slots.len()).rev() {
        let Some(task) = slots[idx].take() else {
            continue;
        };
        match parents[idx] {
            Some(parent) => {
                if let Some(p) = slots[parent].as_mut() {
                    p.subtasks.insert(0, task);
                }
            }
            None => roots.push(task),
        }
    }
    roots.reverse();
    roots
}
