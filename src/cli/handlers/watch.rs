use std::rc::Rc;
use std::thread;
use std::time::Duration;

use futures::executor::block_on;

use crate::error::report;
use crate::index::ListenerResult;
use crate::io::watcher::{FolderWatcher, document_event};
use crate::model::task::Task;

use super::Notes;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Keep the index in step with the folder and print a summary after
/// every change. Runs until interrupted.
pub fn cmd_watch(mut notes: Notes, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let watcher = FolderWatcher::start(&notes.root)?;

    notes.index.subscribe(move |tasks: Rc<Vec<Task>>| async move {
        let total = tasks.iter().flat_map(Task::walk).count();
        let open = tasks
            .iter()
            .flat_map(Task::walk)
            .filter(|t| !t.status.is_closed())
            .count();
        if json {
            println!("{}", serde_json::json!({ "tasks": total, "open": open }));
        } else {
            println!("{} tasks ({} open)", total, open);
        }
        ListenerResult::Ok(())
    });

    eprintln!("watching {}", notes.root.display());
    loop {
        for event in watcher.poll() {
            let event = document_event(watcher.root(), event, |id| notes.index.is_tracked(id));
            if let Err(err) = block_on(notes.index.apply(event)) {
                report(&err);
            }
        }
        thread::sleep(POLL_INTERVAL);
    }
}
