mod watch;
pub use watch::cmd_watch;

use std::path::PathBuf;
use std::rc::Rc;

use chrono::NaiveDate;
use futures::executor::block_on;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::error::TaskError;
use crate::index::TaskIndex;
use crate::io::config_io;
use crate::io::fs_document::discover_documents;
use crate::model::config::TasksConfig;
use crate::model::document::DocumentRef;
use crate::model::task::{AttributeValue, Task, TaskStatus};
use crate::ops::{FollowUpComposer, LineMutator};

/// A loaded notes folder: its root, settings, and a populated index
pub struct Notes {
    pub root: PathBuf,
    pub config: TasksConfig,
    pub index: TaskIndex,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;
    let notes = open_notes(cli.dir.as_deref())?;

    match cli.command {
        // Read commands
        Commands::List => cmd_list(&notes, json),
        Commands::Watch => cmd_watch(notes, json),

        // Write commands
        Commands::Status(args) => cmd_status(&notes, args),
        Commands::Done(args) => cmd_done(&notes, args),
        Commands::Set(args) => cmd_set(&notes, args),
        Commands::Unset(args) => cmd_unset(&notes, args),
        Commands::FollowUp(args) => cmd_follow_up(&notes, args),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Resolve the notes root (the -C override or the working directory),
/// read its settings, and index every markdown file under it.
fn open_notes(dir: Option<&str>) -> Result<Notes, Box<dyn std::error::Error>> {
    let start = match dir {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir()?,
    };
    let root = std::fs::canonicalize(&start)
        .map_err(|e| format!("cannot resolve notes folder '{}': {}", start.display(), e))?;

    let config = config_io::load_config(&root)?;
    let documents: Vec<DocumentRef> = discover_documents(&root)?
        .into_iter()
        .map(|d| Rc::new(d) as DocumentRef)
        .collect();

    let mut index = TaskIndex::new(&config);
    block_on(index.load_all(documents));

    Ok(Notes {
        root,
        config,
        index,
    })
}

/// Document ids use forward slashes relative to the root
fn document_id(file: &str) -> String {
    file.trim_start_matches("./").replace('\\', "/")
}

/// Find the task parsed from `line` of `file`, at any nesting depth.
fn find_task(index: &TaskIndex, file: &str, line: usize) -> Result<Task, TaskError> {
    let id = document_id(file);
    let tasks = index.tasks();
    let found = tasks
        .iter()
        .flat_map(Task::walk)
        .find(|t| t.document.id() == id && t.line == Some(line))
        .cloned();
    found.ok_or(TaskError::TaskNotFound { path: id, line })
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{}' (expected YYYY-MM-DD)", s))
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(notes: &Notes, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let tasks = notes.index.tasks();

    if json {
        let out: Vec<TaskJson> = tasks.iter().map(task_to_json).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for task in tasks.iter() {
        for line in format_task_lines(task, 0) {
            println!("{}", line);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_status(notes: &Notes, args: StatusArgs) -> Result<(), Box<dyn std::error::Error>> {
    let status: TaskStatus = args.status.parse()?;
    let task = find_task(&notes.index, &args.file, args.line)?;

    block_on(LineMutator::new(&notes.config).update_status(&task, status))?;
    println!("{}:{} → {}", task.document.path(), args.line, status);
    Ok(())
}

fn cmd_done(notes: &Notes, args: DoneArgs) -> Result<(), Box<dyn std::error::Error>> {
    let tasks = args
        .lines
        .iter()
        .map(|&line| find_task(&notes.index, &args.file, line))
        .collect::<Result<Vec<_>, _>>()?;

    block_on(LineMutator::new(&notes.config).batch_update_status(&tasks, TaskStatus::Complete))?;
    for task in &tasks {
        println!("{}:{} → complete", task.document.path(), task.line.unwrap_or_default());
    }
    Ok(())
}

fn cmd_set(notes: &Notes, args: SetArgs) -> Result<(), Box<dyn std::error::Error>> {
    let task = find_task(&notes.index, &args.file, args.line)?;
    let value = match args.value {
        Some(v) => AttributeValue::Text(v),
        None => AttributeValue::Flag,
    };

    block_on(LineMutator::new(&notes.config).set_attribute(&task, &args.key, value))?;
    println!("{}:{} {} set", task.document.path(), args.line, args.key);
    Ok(())
}

fn cmd_unset(notes: &Notes, args: UnsetArgs) -> Result<(), Box<dyn std::error::Error>> {
    let task = find_task(&notes.index, &args.file, args.line)?;

    block_on(LineMutator::new(&notes.config).remove_attribute(&task, &args.key))?;
    println!("{}:{} {} removed", task.document.path(), args.line, args.key);
    Ok(())
}

fn cmd_follow_up(notes: &Notes, args: FollowUpArgs) -> Result<(), Box<dyn std::error::Error>> {
    let task = find_task(&notes.index, &args.file, args.line)?;
    let due = args.due.as_deref().map(parse_date).transpose()?;

    let composer = FollowUpComposer::new(&notes.config);
    let at = block_on(composer.create(&task, due, args.complete))?;
    println!("{}:{} follow-up added", task.document.path(), at);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::memory_document::MemoryDocument;

    fn index_with(path: &str, content: &str) -> TaskIndex {
        let mut index = TaskIndex::new(&TasksConfig::default());
        let doc: DocumentRef = MemoryDocument::shared(path, content);
        block_on(index.load_all(vec![doc]));
        index
    }

    #[test]
    fn test_find_task_at_any_depth() {
        let index = index_with("notes/a.md", "# Today\n- [ ] Parent\n  - [x] Child\n");
        let child = find_task(&index, "./notes/a.md", 2).unwrap();
        assert_eq!(child.text, "Child");
        assert_eq!(child.status, TaskStatus::Complete);
    }

    #[test]
    fn test_find_task_missing() {
        let index = index_with("a.md", "# Today\n- [ ] Parent\n");
        let err = find_task(&index, "a.md", 0).unwrap_err();
        assert_eq!(err.to_string(), "no task at a.md:0");
        assert!(find_task(&index, "b.md", 1).is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2025-02-01").unwrap(),
            NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()
        );
        assert!(parse_date("02/01/2025").is_err());
    }
}
